//! Desktop notifications
//!
//! Best-effort only: the notifier process is spawned and reaped on a
//! background thread, and any failure is logged and swallowed so a batch is never interrupted
//! by the notification sink.

use std::io;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread;
use tracing::{debug, warn};

pub trait Notifier {
    fn notify(&self, title: &str, message: &str);
}

/// Raises a desktop notification (`notify-send` on Linux, `osascript` on
/// macOS). Other platforms get a debug log line only.
#[derive(Debug, Clone)]
pub struct DesktopNotifier {
    program_name: String,
}

impl DesktopNotifier {
    pub fn new(program_name: impl Into<String>) -> Self {
        Self {
            program_name: program_name.into(),
        }
    }

    fn body(&self, message: &str) -> String {
        format!("{}: {}", self.program_name, message)
    }
}

impl Notifier for DesktopNotifier {
    fn notify(&self, title: &str, message: &str) {
        let body = self.body(message);
        let Some(mut command) = notification_command(title, &body) else {
            debug!(title, message = %body, "No notification backend on this platform");
            return;
        };

        let spawned = command
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn();
        match spawned {
            Ok(child) => {
                reap_in_background(child);
            }
            Err(e) => warn!("⚠️  Could not show notification '{}': {}", title, e),
        }
    }
}

/// Wait for `child` on its own thread so the batch never blocks on it and
/// no zombie is left behind.
fn reap_in_background(mut child: Child) -> thread::JoinHandle<io::Result<ExitStatus>> {
    thread::spawn(move || child.wait())
}

#[cfg(target_os = "linux")]
fn notification_command(title: &str, body: &str) -> Option<Command> {
    let mut command = Command::new("notify-send");
    command.arg(title).arg(body);
    Some(command)
}

#[cfg(target_os = "macos")]
fn notification_command(title: &str, body: &str) -> Option<Command> {
    let script = format!(
        "display notification \"{}\" with title \"{}\"",
        applescript_escape(body),
        applescript_escape(title)
    );
    let mut command = Command::new("osascript");
    command.arg("-e").arg(script);
    Some(command)
}

#[cfg(not(any(target_os = "linux", target_os = "macos")))]
fn notification_command(_title: &str, _body: &str) -> Option<Command> {
    None
}

#[cfg_attr(not(target_os = "macos"), allow(dead_code))]
fn applescript_escape(text: &str) -> String {
    text.replace('\\', "\\\\").replace('"', "\\\"")
}

/// Discards every notification.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullNotifier;

impl Notifier for NullNotifier {
    fn notify(&self, title: &str, message: &str) {
        debug!(title, message, "Notification suppressed");
    }
}
