//! Post-conversion verification
//!
//! A conversion is trusted when the target's container duration equals the
//! source's in whole seconds. Fractions are dropped on purpose: remuxing
//! commonly shifts the container duration by a few milliseconds.

use crate::errors::ConversionError;
use crate::pipeline::FailureLog;
use shared_utils::ffprobe::{probe_container_duration, DurationProbe};
use shared_utils::tool_runner::ToolRunner;
use std::path::Path;
use tracing::{error, info, warn};

/// Verify `target` against `source` and apply the deletion policy.
///
/// - durations equal: the source is deleted
/// - durations differ: the target is deleted and the source recorded as failed
/// - a probe failed or the target is missing: nothing is deleted
pub fn verify_conversion(
    runner: &dyn ToolRunner,
    probe: &Path,
    source: &Path,
    target: &Path,
    failures: &mut FailureLog,
) -> Result<(), ConversionError> {
    if !target.is_file() {
        error!("❌ Target file '{}' not found!", target.display());
        failures.record(source);
        return Err(ConversionError::MissingTargetAfterConversion(
            target.to_path_buf(),
        ));
    }

    let target_probe = probe_container_duration(runner, probe, target);
    let source_probe = probe_container_duration(runner, probe, source);

    let (target_secs, source_secs) = match (target_probe.seconds(), source_probe.seconds()) {
        (Some(t), Some(s)) => (t, s),
        _ => {
            let (path, probe) = if target_probe.is_failed() {
                (target, &target_probe)
            } else {
                (source, &source_probe)
            };
            warn!(
                "⚠️  Could not verify '{}': duration of '{}' is {}. Keeping both files.",
                target.display(),
                path.display(),
                probe
            );
            failures.record(source);
            return Err(ConversionError::ProbeFailure {
                path: path.to_path_buf(),
                reason: failure_reason(probe),
            });
        }
    };

    if target_secs == source_secs {
        info!(
            "✅ Conversion of '{}' to '{}' seems to be valid",
            source.display(),
            target.display()
        );
        match std::fs::remove_file(source) {
            Ok(()) => info!("🗑️  Deleted source file '{}'", source.display()),
            Err(e) => error!(
                "❌ Failed to delete the source file '{}': {}",
                source.display(),
                e
            ),
        }
        return Ok(());
    }

    error!(
        "❌ Duration mismatch of '{}' ({}s) with source ({}s). Skipping deleting '{}'.",
        target.display(),
        target_secs,
        source_secs,
        source.display()
    );
    failures.record(source);

    // either the source is damaged or the remux is; don't leave the suspect copy around
    match std::fs::remove_file(target) {
        Ok(()) => info!("🗑️  Deleted suspicious target file '{}'", target.display()),
        Err(e) => error!(
            "❌ Failed to delete suspicious target file '{}': {}",
            target.display(),
            e
        ),
    }

    Err(ConversionError::DurationMismatch {
        source_secs,
        target_secs,
    })
}

fn failure_reason(probe: &DurationProbe) -> String {
    match probe {
        DurationProbe::Failed(reason) => reason.clone(),
        other => other.to_string(),
    }
}
