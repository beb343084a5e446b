//! Scripted stand-ins for the external tools and the notifier.

use shared_utils::notify::Notifier;
use shared_utils::tool_runner::{ToolError, ToolOutput, ToolRunner};
use std::cell::RefCell;
use std::collections::HashMap;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Answers probe calls from a table of per-file durations and plays the
/// converter by writing the output path (its last argument).
pub(crate) struct ScriptedRunner {
    probe: PathBuf,
    durations: HashMap<PathBuf, String>,
    converter_exit: i32,
    converter_missing: bool,
    write_output: bool,
    elapsed: Duration,
    calls: RefCell<Vec<(PathBuf, Vec<OsString>)>>,
}

impl ScriptedRunner {
    pub(crate) fn new(probe: impl Into<PathBuf>) -> Self {
        Self {
            probe: probe.into(),
            durations: HashMap::new(),
            converter_exit: 0,
            converter_missing: false,
            write_output: true,
            elapsed: Duration::from_millis(1500),
            calls: RefCell::new(Vec::new()),
        }
    }

    /// What the probe prints for `path`; unlisted paths make the probe fail.
    pub(crate) fn duration(mut self, path: impl Into<PathBuf>, stdout: &str) -> Self {
        self.durations.insert(path.into(), format!("{}\n", stdout));
        self
    }

    /// Converter exits with `code`, still leaving a partial output behind.
    pub(crate) fn converter_exit(mut self, code: i32) -> Self {
        self.converter_exit = code;
        self
    }

    pub(crate) fn converter_missing(mut self) -> Self {
        self.converter_missing = true;
        self
    }

    /// Converter reports success without writing anything.
    pub(crate) fn no_output(mut self) -> Self {
        self.write_output = false;
        self
    }

    pub(crate) fn converter_elapsed(mut self, elapsed: Duration) -> Self {
        self.elapsed = elapsed;
        self
    }

    pub(crate) fn calls(&self) -> Vec<(PathBuf, Vec<OsString>)> {
        self.calls.borrow().clone()
    }

    pub(crate) fn converter_calls(&self) -> usize {
        self.calls
            .borrow()
            .iter()
            .filter(|(program, _)| *program != self.probe)
            .count()
    }

    pub(crate) fn probe_calls(&self) -> usize {
        self.calls.borrow().len() - self.converter_calls()
    }
}

impl ToolRunner for ScriptedRunner {
    fn run(&self, program: &Path, args: &[OsString]) -> Result<ToolOutput, ToolError> {
        self.calls
            .borrow_mut()
            .push((program.to_path_buf(), args.to_vec()));
        let last = PathBuf::from(args.last().cloned().unwrap_or_default());

        if program == self.probe {
            return Ok(match self.durations.get(&last) {
                Some(stdout) => ToolOutput {
                    exit_code: Some(0),
                    stdout: stdout.clone(),
                    duration: Duration::from_millis(20),
                    ..Default::default()
                },
                None => ToolOutput {
                    exit_code: Some(1),
                    stderr: format!("{}: Invalid data found when processing input", last.display()),
                    ..Default::default()
                },
            });
        }

        if self.converter_missing {
            return Err(ToolError::Spawn {
                program: program.to_path_buf(),
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "No such file"),
            });
        }
        if self.write_output {
            std::fs::write(&last, b"converted").expect("scripted converter output");
        }
        Ok(ToolOutput {
            exit_code: Some(self.converter_exit),
            stdout: "Multiplexing took 1 second.\n".to_string(),
            stderr: if self.converter_exit == 0 {
                String::new()
            } else {
                "Error: the file could not be opened for writing".to_string()
            },
            duration: self.elapsed,
        })
    }
}

#[derive(Default)]
pub(crate) struct RecordingNotifier {
    messages: RefCell<Vec<(String, String)>>,
}

impl RecordingNotifier {
    pub(crate) fn messages(&self) -> Vec<(String, String)> {
        self.messages.borrow().clone()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, title: &str, message: &str) {
        self.messages
            .borrow_mut()
            .push((title.to_string(), message.to_string()));
    }
}
