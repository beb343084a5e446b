//! vid-container - batch remux into Matroska with duration verification
//!
//! Each input video is handed to a stream-copying converter (mkvmerge or
//! ffmpeg, chosen by extension). The source is only deleted once the new
//! container's duration matches it in whole seconds.
//!
//! ```rust,ignore
//! use vid_container::{Pipeline, TargetContainer, ToolConfig};
//! use shared_utils::{NullNotifier, SystemToolRunner};
//!
//! let config = ToolConfig::default();
//! let report = Pipeline::new(&config, TargetContainer::Mkv, &SystemToolRunner, &NullNotifier)
//!     .run(&["videos/".into()]);
//! ```

pub mod config;
pub mod converter;
pub mod errors;
pub mod executor;
pub mod pipeline;
pub mod verifier;

#[cfg(test)]
mod testing;

pub use config::ToolConfig;
pub use converter::{
    ArgToken, ConversionTarget, ConverterKind, ConverterSpec, SourceFamily, TargetContainer,
};
pub use errors::{ConfigError, ConversionError, Result};
pub use executor::{cleanup_failed_conversion, execute_conversion};
pub use pipeline::{
    ConversionOutcome, FailureLog, FileState, Pipeline, RunReport, RunState, RunStatistics,
    SkipReason,
};
pub use verifier::verify_conversion;
