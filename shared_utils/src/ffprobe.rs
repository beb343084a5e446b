//! FFprobe wrapper module
//!
//! Container-level duration probing used to verify a remux. Only the
//! `format=duration` entry is requested; per-stream durations are ignored.

use crate::common_utils::format_hms;
use crate::tool_runner::ToolRunner;
use std::ffi::OsString;
use std::fmt;
use std::path::Path;
use std::time::Duration;
use tracing::{error, info};

/// Outcome of a duration probe.
///
/// A file that genuinely reports zero seconds is kept apart from a probe
/// that could not produce a number at all.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DurationProbe {
    /// Duration truncated to whole seconds.
    Seconds(u64),
    ZeroDuration,
    Failed(String),
}

impl DurationProbe {
    /// Whole seconds for comparison, `None` if the probe failed.
    pub fn seconds(&self) -> Option<u64> {
        match self {
            DurationProbe::Seconds(s) => Some(*s),
            DurationProbe::ZeroDuration => Some(0),
            DurationProbe::Failed(_) => None,
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, DurationProbe::Failed(_))
    }
}

impl fmt::Display for DurationProbe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DurationProbe::Seconds(s) => write!(f, "{}s", s),
            DurationProbe::ZeroDuration => write!(f, "0s (empty container)"),
            DurationProbe::Failed(reason) => write!(f, "unknown ({})", reason),
        }
    }
}

/// Arguments for a container duration query against `path`.
pub fn duration_probe_args(path: &Path) -> Vec<OsString> {
    let mut args: Vec<OsString> = [
        "-v",
        "error",
        "-show_entries",
        "format=duration",
        "-of",
        "default=noprint_wrappers=1:nokey=1",
        "-i",
    ]
    .iter()
    .map(OsString::from)
    .collect();
    args.push(path.as_os_str().to_os_string());
    args
}

/// Parse ffprobe's bare duration output (e.g. `"10.416000\n"`).
pub fn parse_duration_output(stdout: &str) -> Result<f64, String> {
    let text = stdout.trim();
    if text.is_empty() {
        return Err("ffprobe printed no duration".to_string());
    }
    let secs = text
        .parse::<f64>()
        .map_err(|_| format!("unparseable duration '{}'", text))?;
    if !secs.is_finite() || secs < 0.0 {
        return Err(format!("invalid duration '{}'", text));
    }
    Ok(secs)
}

/// Probe the container duration of `path` with the probe binary at `probe`.
///
/// Never returns an error: any failure is logged and reported as
/// [`DurationProbe::Failed`].
pub fn probe_container_duration(
    runner: &dyn ToolRunner,
    probe: &Path,
    path: &Path,
) -> DurationProbe {
    let output = match runner.run(probe, &duration_probe_args(path)) {
        Ok(output) => output,
        Err(e) => {
            error!("❌ Error probing duration of '{}': {}", path.display(), e);
            return DurationProbe::Failed(e.to_string());
        }
    };

    if !output.success() {
        let reason = match output.stderr.trim() {
            "" => format!("exit code {:?}", output.exit_code),
            stderr => stderr.to_string(),
        };
        error!("❌ Error probing duration for '{}': {}", path.display(), reason);
        return DurationProbe::Failed(reason);
    }

    match parse_duration_output(&output.stdout) {
        Ok(secs) if secs == 0.0 => {
            info!("Duration of '{}': 0 seconds", path.display());
            DurationProbe::ZeroDuration
        }
        Ok(secs) => {
            let human = Duration::try_from_secs_f64(secs)
                .map(format_hms)
                .unwrap_or_else(|_| format!("{} seconds", secs));
            info!("Duration of '{}': {}, approximately", path.display(), human);
            DurationProbe::Seconds(secs.trunc() as u64)
        }
        Err(reason) => {
            error!("❌ Error probing duration for '{}': {}", path.display(), reason);
            DurationProbe::Failed(reason)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tool_runner::{ToolError, ToolOutput};

    struct FixedRunner(Result<ToolOutput, ()>);

    impl ToolRunner for FixedRunner {
        fn run(&self, program: &Path, _args: &[OsString]) -> Result<ToolOutput, ToolError> {
            self.0.clone().map_err(|_| ToolError::Spawn {
                program: program.to_path_buf(),
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "missing"),
            })
        }
    }

    fn stdout(text: &str) -> FixedRunner {
        FixedRunner(Ok(ToolOutput {
            exit_code: Some(0),
            stdout: text.to_string(),
            ..Default::default()
        }))
    }

    fn probe(runner: &FixedRunner) -> DurationProbe {
        probe_container_duration(runner, Path::new("ffprobe"), Path::new("movie.mp4"))
    }

    #[test]
    fn test_probe_args_request_container_duration_only() {
        let args = duration_probe_args(Path::new("a b.mkv"));
        let args: Vec<String> = args.iter().map(|a| a.to_string_lossy().into_owned()).collect();
        assert_eq!(
            args,
            [
                "-v",
                "error",
                "-show_entries",
                "format=duration",
                "-of",
                "default=noprint_wrappers=1:nokey=1",
                "-i",
                "a b.mkv"
            ]
        );
    }

    #[test]
    fn test_fraction_is_truncated() {
        assert_eq!(probe(&stdout("10.416000\n")), DurationProbe::Seconds(10));
        assert_eq!(probe(&stdout("10.999\n")), DurationProbe::Seconds(10));
        assert_eq!(probe(&stdout("0.5\n")), DurationProbe::Seconds(0));
    }

    #[test]
    fn test_zero_duration_is_not_failure() {
        let result = probe(&stdout("0.000000\n"));
        assert_eq!(result, DurationProbe::ZeroDuration);
        assert_eq!(result.seconds(), Some(0));
        assert!(!result.is_failed());
    }

    #[test]
    fn test_unparseable_output_fails() {
        let result = probe(&stdout("N/A\n"));
        assert!(result.is_failed());
        assert_eq!(result.seconds(), None);
        assert!(probe(&stdout("")).is_failed());
        assert!(probe(&stdout("-3.0")).is_failed());
    }

    #[test]
    fn test_nonzero_exit_fails() {
        let runner = FixedRunner(Ok(ToolOutput {
            exit_code: Some(1),
            stderr: "movie.mp4: Invalid data found when processing input".to_string(),
            ..Default::default()
        }));
        match probe(&runner) {
            DurationProbe::Failed(reason) => assert!(reason.contains("Invalid data")),
            other => panic!("expected failure, got {:?}", other),
        }
    }

    #[test]
    fn test_spawn_error_fails() {
        assert!(probe(&FixedRunner(Err(()))).is_failed());
    }
}
