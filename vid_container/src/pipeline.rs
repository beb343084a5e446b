//! Batch driver
//!
//! Each file goes through: existence checks → converter lookup → disk space
//! guard → converter → verification, and ends in exactly one [`FileState`].
//! Nothing is retried and no per-file error escapes the driver. The run-wide
//! accumulators live in [`RunState`], which is passed explicitly to every
//! stage.

use crate::config::ToolConfig;
use crate::converter::{ConversionTarget, TargetContainer};
use crate::errors::ConversionError;
use crate::executor::execute_conversion;
use crate::verifier::verify_conversion;
use shared_utils::batch::{dedup_inputs, expand_input, BatchResult};
use shared_utils::common_utils::{format_size_binary, get_extension_lowercase, SPACER};
use shared_utils::disk_space::{check_disk_space, volume_mount_point, SpaceCheck};
use shared_utils::notify::Notifier;
use shared_utils::report::RunSummary;
use shared_utils::tool_runner::ToolRunner;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// Successful converter runs and the wall time they took.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunStatistics {
    pub count: usize,
    pub total: Duration,
}

impl RunStatistics {
    pub fn record(&mut self, elapsed: Duration) {
        self.count += 1;
        self.total += elapsed;
    }
}

/// Sources that did not end up converted and verified, in the order they
/// failed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FailureLog(Vec<PathBuf>);

impl FailureLog {
    pub fn record(&mut self, source: &Path) {
        self.0.push(source.to_path_buf());
    }

    pub fn entries(&self) -> &[PathBuf] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[derive(Debug, Clone, Default)]
pub struct RunState {
    pub stats: RunStatistics,
    pub failures: FailureLog,
}

/// Verdict on a file the converter ran for and the verifier judged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConversionOutcome {
    Succeeded,
    DurationMismatch,
    ExecutorError,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    NotAFile,
    TargetExists(PathBuf),
    UnregisteredFormat(String),
    ConverterMissing(PathBuf),
    InsufficientDiskSpace {
        volume: PathBuf,
        required: u64,
        available: u64,
    },
    SpaceCheckFailed(String),
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::NotAFile => write!(f, "not a regular file"),
            SkipReason::TargetExists(path) => write!(f, "'{}' already exists", path.display()),
            SkipReason::UnregisteredFormat(ext) if ext.is_empty() => write!(f, "no extension"),
            SkipReason::UnregisteredFormat(ext) => write!(f, "unregistered format '.{}'", ext),
            SkipReason::ConverterMissing(path) => {
                write!(f, "no converter found at '{}'", path.display())
            }
            SkipReason::InsufficientDiskSpace {
                required,
                available,
                ..
            } => write!(
                f,
                "not enough disk space (need {}, available {})",
                format_size_binary(*required as f64),
                format_size_binary(*available as f64)
            ),
            SkipReason::SpaceCheckFailed(reason) => write!(f, "disk space unknown: {}", reason),
        }
    }
}

/// Terminal state of one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileState {
    Skipped(SkipReason),
    VerifiedSuccess,
    VerifiedFailure,
    ExecutorError,
    /// Converted, but a probe failed or the target vanished; both files kept.
    Unverified,
}

impl FileState {
    pub fn outcome(&self) -> Option<ConversionOutcome> {
        match self {
            FileState::VerifiedSuccess => Some(ConversionOutcome::Succeeded),
            FileState::VerifiedFailure => Some(ConversionOutcome::DurationMismatch),
            FileState::ExecutorError => Some(ConversionOutcome::ExecutorError),
            FileState::Skipped(_) | FileState::Unverified => None,
        }
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self, FileState::Skipped(_))
    }
}

#[derive(Debug, Clone, Default)]
pub struct RunReport {
    pub state: RunState,
    pub batch: BatchResult,
    pub files: Vec<(PathBuf, FileState)>,
}

impl RunReport {
    pub fn summary(&self, container: TargetContainer) -> RunSummary<'_> {
        RunSummary {
            batch: &self.batch,
            converted: self.state.stats.count,
            conversion_time: self.state.stats.total,
            failures: self.state.failures.entries(),
            container_label: container.display_name(),
        }
    }

    pub fn state_of(&self, path: &Path) -> Option<&FileState> {
        self.files
            .iter()
            .find(|(p, _)| p == path)
            .map(|(_, state)| state)
    }
}

/// Check the source's volume has room for the converted copy.
pub fn guard_disk_space(source: &Path, margin: f64) -> Result<SpaceCheck, ConversionError> {
    let check = check_disk_space(source, margin)?;
    if check.available {
        return Ok(check);
    }
    Err(ConversionError::InsufficientDiskSpace {
        volume: volume_mount_point(source).unwrap_or_else(|| source.to_path_buf()),
        required: check.required_bytes,
        available: check.free_bytes,
    })
}

pub struct Pipeline<'a> {
    config: &'a ToolConfig,
    container: TargetContainer,
    runner: &'a dyn ToolRunner,
    notifier: &'a dyn Notifier,
}

impl<'a> Pipeline<'a> {
    pub fn new(
        config: &'a ToolConfig,
        container: TargetContainer,
        runner: &'a dyn ToolRunner,
        notifier: &'a dyn Notifier,
    ) -> Self {
        Self {
            config,
            container,
            runner,
            notifier,
        }
    }

    /// Process every file named by `inputs`, directories recursively.
    pub fn run(&self, inputs: &[PathBuf]) -> RunReport {
        let mut report = RunReport::default();

        for input in dedup_inputs(inputs) {
            if input.is_dir() {
                info!("📂 Processing directory '{}'", input.display());
            }
            for file in expand_input(&input) {
                let file_state = self.process_file(&file, &mut report.state);
                match file_state.outcome() {
                    Some(ConversionOutcome::Succeeded) => report.batch.success(),
                    None if file_state.is_skipped() => report.batch.skip(),
                    // mismatches, converter errors and unverified conversions
                    _ => report.batch.fail(),
                }
                report.files.push((file, file_state));
            }
        }

        report
    }

    /// Take one file to a terminal state.
    pub fn process_file(&self, source: &Path, state: &mut RunState) -> FileState {
        let file_state = self.convert_one(source, state);
        info!("{}", SPACER);
        file_state
    }

    fn convert_one(&self, source: &Path, state: &mut RunState) -> FileState {
        if !source.is_file() {
            warn!("⚠️  '{}' is not a regular file; skipping", source.display());
            return FileState::Skipped(SkipReason::NotAFile);
        }

        let target = ConversionTarget::new(source, self.container);
        let target_path = target.target_path();
        if target_path.is_file() {
            info!(
                "⏭️ Target '{}' already exists. Skipping '{}'",
                target_path.display(),
                source.display()
            );
            return FileState::Skipped(SkipReason::TargetExists(target_path));
        }

        let Some(kind) = target.source_family().converter() else {
            let ext = get_extension_lowercase(source);
            info!(
                "⏭️ {} → SKIP (no converter for '.{}')",
                source.display(),
                ext
            );
            return FileState::Skipped(SkipReason::UnregisteredFormat(ext));
        };

        match guard_disk_space(source, self.config.disk_space_margin) {
            Ok(check) => debug!(
                free = check.free_bytes,
                required = check.required_bytes,
                "Disk space check passed for {}",
                source.display()
            ),
            Err(ConversionError::InsufficientDiskSpace {
                volume,
                required,
                available,
            }) => {
                error!(
                    "❌ Not enough disk space available in '{}'; need {}, available {}. Can't process '{}'.",
                    volume.display(),
                    format_size_binary(required as f64),
                    format_size_binary(available as f64),
                    source.display()
                );
                return FileState::Skipped(SkipReason::InsufficientDiskSpace {
                    volume,
                    required,
                    available,
                });
            }
            Err(e) => {
                error!("❌ Cannot check disk space for '{}': {}", source.display(), e);
                return FileState::Skipped(SkipReason::SpaceCheckFailed(e.to_string()));
            }
        }

        let spec = self.config.converter_spec(kind);
        if !spec.program.is_file() {
            error!("❌ No converter found at '{}'", spec.program.display());
            return FileState::Skipped(SkipReason::ConverterMissing(spec.program));
        }

        info!(
            "🎬 Converting '{}' to {} with {}",
            source.display(),
            self.container.display_name(),
            spec.kind
        );
        if let Err(e) = execute_conversion(self.runner, self.notifier, &spec, &target, state) {
            debug!(error = %e, "Conversion failed");
            return FileState::ExecutorError;
        }

        match verify_conversion(
            self.runner,
            &self.config.probe_binary_path,
            source,
            &target_path,
            &mut state.failures,
        ) {
            Ok(()) => FileState::VerifiedSuccess,
            Err(ConversionError::DurationMismatch { .. }) => FileState::VerifiedFailure,
            Err(e) => {
                error!("❌ {}", e);
                self.notifier.notify(
                    "Error",
                    &format!("Could not verify '{}'. Check the log.", source.display()),
                );
                FileState::Unverified
            }
        }
    }
}
