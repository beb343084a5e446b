//! Shared Utilities for the video container tools
//!
//! This crate provides the pieces that do not depend on a particular
//! target container:
//! - External tool execution behind a trait (real or scripted)
//! - FFprobe container duration probing
//! - Disk space guard
//! - Logging to terminal and per-run log file
//! - Desktop notifications
//! - Input expansion and batch tallies
//! - Summary reporting

pub mod batch;
pub mod common_utils;
pub mod disk_space;
pub mod ffprobe;
pub mod logging;
pub mod notify;
pub mod report;
pub mod tool_runner;

pub use batch::{collect_files, dedup_inputs, expand_input, BatchResult};
pub use common_utils::{format_hms, format_size_binary, get_extension_lowercase, SPACER};
pub use disk_space::{check_disk_space, has_room, SpaceCheck, DEFAULT_SPACE_MARGIN};
pub use ffprobe::{probe_container_duration, DurationProbe};
pub use notify::{DesktopNotifier, Notifier, NullNotifier};
pub use report::{print_summary_report, RunSummary};
pub use tool_runner::{SystemToolRunner, ToolError, ToolOutput, ToolRunner};
