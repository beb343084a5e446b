//! Conversion executor and failure cleanup

use crate::converter::{ConversionTarget, ConverterSpec};
use crate::errors::ConversionError;
use crate::pipeline::{FailureLog, RunState};
use shared_utils::notify::Notifier;
use shared_utils::tool_runner::{command_line, ToolRunner};
use std::path::Path;
use std::time::Duration;
use tracing::{error, info};

/// Run the converter for `target` once and wait for it.
///
/// On success the run statistics are updated and the elapsed time is
/// returned. On any failure the partial target is cleaned up, the source is
/// recorded in the failure log and the user is notified.
pub fn execute_conversion(
    runner: &dyn ToolRunner,
    notifier: &dyn Notifier,
    spec: &ConverterSpec,
    target: &ConversionTarget,
    state: &mut RunState,
) -> Result<Duration, ConversionError> {
    let source = target.source.as_path();
    let target_path = target.target_path();
    let args = spec.render(source, &target_path);

    let failure_reason = match runner.run(&spec.program, &args) {
        Ok(output) if output.success() => {
            state.stats.record(output.duration);
            info!(
                "✅ Conversion of '{}' to {} format complete",
                source.display(),
                target.container.display_name()
            );
            if !output.stdout.trim().is_empty() {
                info!("{}", output.stdout.trim_end());
            }
            return Ok(output.duration);
        }
        Ok(output) => {
            if !output.stderr.trim().is_empty() {
                error!("{}", output.stderr.trim_end());
            }
            if !output.stdout.trim().is_empty() {
                error!("{}", output.stdout.trim_end());
            }
            format!("exit code {:?}", output.exit_code)
        }
        Err(e) => e.to_string(),
    };

    error!(
        "❌ Error converting '{}' to {}: {}",
        source.display(),
        target.container.display_name(),
        failure_reason
    );
    info!(
        "Command that resulted in the error: {}",
        command_line(&spec.program, &args)
    );

    cleanup_failed_conversion(source, &target_path, &mut state.failures);
    notifier.notify(
        "Error",
        &format!("Error converting '{}'. Check the log.", source.display()),
    );

    Err(ConversionError::ExecutorFailure {
        converter: spec.kind.to_string(),
        path: source.to_path_buf(),
        reason: failure_reason,
    })
}

/// Remove whatever a failed converter left at `target_path` and record the
/// source as failed. Deletion problems are logged, never raised.
pub fn cleanup_failed_conversion(source: &Path, target_path: &Path, failures: &mut FailureLog) {
    if target_path.is_file() {
        info!(
            "'{}' was improperly done; deleting...",
            target_path.display()
        );
        match std::fs::remove_file(target_path) {
            Ok(()) => info!("🗑️  Deleted '{}'", target_path.display()),
            Err(e) => error!("❌ Failed to delete '{}': {}", target_path.display(), e),
        }
    }

    failures.record(source);
}
