//! External tool execution
//!
//! Every subprocess the tools start (probe, remuxers) goes through the
//! [`ToolRunner`] trait so the conversion pipeline can be driven by a
//! scripted runner in tests. [`SystemToolRunner`] is the real thing: it
//! blocks until the child exits and captures both output pipes.

use crate::logging::log_external_tool;
use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::info;

#[derive(Error, Debug)]
pub enum ToolError {
    #[error("failed to start '{program}': {source}")]
    Spawn {
        program: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Captured result of a finished external process.
#[derive(Debug, Clone, Default)]
pub struct ToolOutput {
    /// `None` when the process was terminated by a signal.
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
    pub duration: Duration,
}

impl ToolOutput {
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }

    /// Both pipes joined for log output, stdout first.
    pub fn combined(&self) -> String {
        match (self.stdout.trim().is_empty(), self.stderr.trim().is_empty()) {
            (false, false) => format!("STDOUT:\n{}\n\nSTDERR:\n{}", self.stdout, self.stderr),
            (false, true) => self.stdout.clone(),
            _ => self.stderr.clone(),
        }
    }
}

pub trait ToolRunner {
    /// Run `program` with `args` to completion.
    ///
    /// A nonzero exit is not an error at this level; only a failure to
    /// start the process is.
    fn run(&self, program: &Path, args: &[OsString]) -> Result<ToolOutput, ToolError>;
}

/// Runs tools with `std::process::Command`, one at a time.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemToolRunner;

impl ToolRunner for SystemToolRunner {
    fn run(&self, program: &Path, args: &[OsString]) -> Result<ToolOutput, ToolError> {
        let command = command_line(program, args);
        info!("Executing command: {}", command);

        let start = Instant::now();
        // stdin is closed so ffmpeg never sits waiting for an interactive 'q'
        let output = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .output()
            .map_err(|source| ToolError::Spawn {
                program: program.to_path_buf(),
                source,
            })?;
        let duration = start.elapsed();

        let result = ToolOutput {
            exit_code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            duration,
        };

        log_external_tool(
            &tool_name(program),
            &command,
            &result.combined(),
            result.exit_code,
            duration,
        );

        Ok(result)
    }
}

/// Human-readable command line, used only for logging.
pub fn command_line(program: &Path, args: &[OsString]) -> String {
    let mut line = program.display().to_string();
    for arg in args {
        line.push(' ');
        line.push_str(&quote_for_log(arg));
    }
    line
}

fn quote_for_log(arg: &OsStr) -> String {
    let text = arg.to_string_lossy();
    if text.is_empty() || text.contains(char::is_whitespace) {
        format!("'{}'", text)
    } else {
        text.into_owned()
    }
}

fn tool_name(program: &Path) -> String {
    program
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| program.display().to_string())
}
