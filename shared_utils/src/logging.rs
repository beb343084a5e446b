//! Logging Module
//!
//! tracing-based logging shared by the tools:
//! - every status line goes to stderr (with colour) and to a per-run log file
//! - summary report lines (target [`REPORT_TARGET`]) are printed on stdout by
//!   the report module, so they are sent to the log file only
//! - old run logs are pruned, keeping the most recent few
//! - external tool calls are logged with command, duration and exit code
//!
//! # Examples
//!
//! ```no_run
//! use shared_utils::logging::{LogConfig, init_logging};
//! use tracing::info;
//!
//! let log_file = init_logging("my_program", LogConfig::default()).expect("Failed to initialize logging");
//! info!("Program started, logging to {}", log_file.display());
//! ```

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing::{Level, Subscriber};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{
    filter, fmt, layer::SubscriberExt, registry::LookupSpan, util::SubscriberInitExt, EnvFilter,
    Layer,
};

/// Target used for summary lines that are already printed to stdout.
pub const REPORT_TARGET: &str = "run_report";

/// Settings for the per-run log file.
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Directory holding the run logs (defaults to the system temp dir).
    pub log_dir: PathBuf,
    /// Number of run logs kept per program.
    pub max_files: usize,
    pub level: Level,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            log_dir: std::env::temp_dir(),
            max_files: 20,
            level: Level::INFO,
        }
    }
}

impl LogConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_log_dir<P: AsRef<Path>>(mut self, dir: P) -> Self {
        self.log_dir = dir.as_ref().to_path_buf();
        self
    }

    pub fn with_max_files(mut self, count: usize) -> Self {
        self.max_files = count;
        self
    }

    pub fn with_level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }
}

/// Log file name for a run started at `timestamp`.
pub fn run_log_file_name(program_name: &str, timestamp: &chrono::DateTime<chrono::Local>) -> String {
    format!("{}_{}.log", program_name, timestamp.format("%Y%m%d_%H%M%S"))
}

/// Initialise the global subscriber and return the path of this run's log
/// file.
///
/// Can only succeed once per process. `RUST_LOG` overrides the level given
/// in `config`.
pub fn init_logging(program_name: &str, config: LogConfig) -> Result<PathBuf> {
    std::fs::create_dir_all(&config.log_dir)
        .with_context(|| format!("Failed to create log directory: {:?}", config.log_dir))?;

    let log_file_name = run_log_file_name(program_name, &chrono::Local::now());

    // one file per run, written synchronously so nothing is lost on a crash
    let file_appender = RollingFileAppender::builder()
        .rotation(Rotation::NEVER)
        .filename_prefix(&log_file_name)
        .build(&config.log_dir)
        .with_context(|| format!("Failed to open log file in {:?}", config.log_dir))?;

    let file_layer = fmt::layer()
        .with_writer(file_appender)
        .with_ansi(false)
        .with_target(true)
        .with_line_number(true);

    tracing_subscriber::registry()
        .with(env_filter(program_name, config.level))
        .with(file_layer)
        .with(stderr_layer())
        .try_init()
        .context("Logging was already initialised")?;

    let log_file = config.log_dir.join(&log_file_name);
    tracing::debug!(
        program = program_name,
        log_file = ?log_file,
        max_files = config.max_files,
        level = ?config.level,
        "Logging system initialized"
    );

    if let Err(e) = cleanup_old_logs(&config.log_dir, program_name, config.max_files) {
        tracing::warn!(error = %e, "Failed to prune old log files");
    }

    Ok(log_file)
}

/// Terminal-only logging for runs whose log file could not be opened.
pub fn init_stderr_logging(program_name: &str, level: Level) -> Result<()> {
    tracing_subscriber::registry()
        .with(env_filter(program_name, level))
        .with(stderr_layer())
        .try_init()
        .context("Logging was already initialised")
}

fn env_filter(program_name: &str, level: Level) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "{program}={level},shared_utils={level},{report}=info",
            program = program_name,
            level = level,
            report = REPORT_TARGET
        ))
    })
}

/// Coloured terminal output. Report lines are left to stdout.
fn stderr_layer<S>() -> impl Layer<S>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(true)
        .with_target(false)
        .with_line_number(false)
        .with_filter(filter::filter_fn(|meta| meta.target() != REPORT_TARGET))
}

/// Delete all but the `max_files` most recent logs of `program_name`.
fn cleanup_old_logs(log_dir: &Path, program_name: &str, max_files: usize) -> Result<()> {
    use std::fs;

    let entries = fs::read_dir(log_dir)
        .with_context(|| format!("Failed to read log directory: {:?}", log_dir))?;

    let mut log_files: Vec<(PathBuf, std::time::SystemTime)> = Vec::new();
    for entry in entries {
        let path = entry?.path();
        if !path.is_file() {
            continue;
        }
        let Some(file_name) = path.file_name() else {
            continue;
        };
        let file_name = file_name.to_string_lossy();
        if file_name.starts_with(program_name) && file_name.ends_with(".log") {
            if let Ok(modified) = fs::metadata(&path).and_then(|m| m.modified()) {
                log_files.push((path, modified));
            }
        }
    }

    if log_files.len() > max_files {
        // newest first
        log_files.sort_by(|a, b| b.1.cmp(&a.1));

        for (path, _) in log_files.iter().skip(max_files) {
            if let Err(e) = fs::remove_file(path) {
                tracing::warn!(path = ?path, error = %e, "Failed to remove old log file");
            } else {
                tracing::debug!(path = ?path, "Removed old log file");
            }
        }
    }

    Ok(())
}

/// Record one finished external tool invocation.
///
/// Successful runs log their output at debug level; failures log it at
/// error level together with the command line.
pub fn log_external_tool(
    tool_name: &str,
    command: &str,
    output: &str,
    exit_code: Option<i32>,
    duration: std::time::Duration,
) {
    match exit_code {
        Some(0) => {
            tracing::debug!(
                tool = tool_name,
                command = %command,
                duration_secs = duration.as_secs_f64(),
                exit_code = 0,
                "External tool completed successfully"
            );
            tracing::debug!(tool = tool_name, output = %output, "External tool output");
        }
        Some(code) => {
            tracing::error!(
                tool = tool_name,
                command = %command,
                duration_secs = duration.as_secs_f64(),
                exit_code = code,
                output = %output,
                "External tool failed"
            );
        }
        None => {
            tracing::error!(
                tool = tool_name,
                command = %command,
                duration_secs = duration.as_secs_f64(),
                output = %output,
                "External tool terminated without exit code"
            );
        }
    }
}
