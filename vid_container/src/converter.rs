//! Converter selection
//!
//! Source extensions map onto a closed set of [`SourceFamily`] variants;
//! each non-`Unsupported` family is handled by exactly one converter binary
//! with a fixed argument template.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use shared_utils::common_utils::{get_extension_lowercase, swap_extension};
use std::ffi::OsString;
use std::fmt;
use std::path::{Path, PathBuf};

/// Container formats a source can be converted into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum)]
pub enum TargetContainer {
    /// Matroska (.mkv)
    Mkv,
}

impl TargetContainer {
    pub fn extension(self) -> &'static str {
        match self {
            TargetContainer::Mkv => "mkv",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            TargetContainer::Mkv => "Matroska",
        }
    }

    /// Source families that have a converter into this container.
    pub fn source_families(self) -> &'static [SourceFamily] {
        match self {
            TargetContainer::Mkv => &[SourceFamily::MkvmergeSource, SourceFamily::FfmpegSource],
        }
    }

    /// Family of `extension` if it can be converted into this container,
    /// otherwise `Unsupported`.
    pub fn select(self, extension: &str) -> SourceFamily {
        let family = SourceFamily::from_extension(extension);
        if self.source_families().contains(&family) {
            family
        } else {
            SourceFamily::Unsupported
        }
    }
}

impl fmt::Display for TargetContainer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

const MKVMERGE_SOURCES: &[&str] = &["avi", "divx", "flv", "m4v", "mpg", "mpeg", "webm"];
const FFMPEG_SOURCES: &[&str] = &["mp4", "mts", "m2ts", "wmv"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceFamily {
    MkvmergeSource,
    FfmpegSource,
    Unsupported,
}

impl SourceFamily {
    /// Lookup keyed only by the lower-cased extension (no leading dot).
    pub fn from_extension(extension: &str) -> Self {
        let ext = extension.trim_start_matches('.').to_lowercase();
        if MKVMERGE_SOURCES.contains(&ext.as_str()) {
            SourceFamily::MkvmergeSource
        } else if FFMPEG_SOURCES.contains(&ext.as_str()) {
            SourceFamily::FfmpegSource
        } else {
            SourceFamily::Unsupported
        }
    }

    pub fn from_path(path: &Path) -> Self {
        Self::from_extension(&get_extension_lowercase(path))
    }

    pub fn extensions(self) -> &'static [&'static str] {
        match self {
            SourceFamily::MkvmergeSource => MKVMERGE_SOURCES,
            SourceFamily::FfmpegSource => FFMPEG_SOURCES,
            SourceFamily::Unsupported => &[],
        }
    }

    pub fn converter(self) -> Option<ConverterKind> {
        match self {
            SourceFamily::MkvmergeSource => Some(ConverterKind::Mkvmerge),
            SourceFamily::FfmpegSource => Some(ConverterKind::Ffmpeg),
            SourceFamily::Unsupported => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConverterKind {
    Mkvmerge,
    Ffmpeg,
}

impl ConverterKind {
    pub const ALL: [ConverterKind; 2] = [ConverterKind::Mkvmerge, ConverterKind::Ffmpeg];

    /// Executable name looked up on `PATH` when no path is configured.
    pub fn binary_name(self) -> &'static str {
        match self {
            ConverterKind::Mkvmerge => "mkvmerge",
            ConverterKind::Ffmpeg => "ffmpeg",
        }
    }

    pub fn template(self) -> Vec<ArgToken> {
        use ArgToken::{Input, Output};
        let lit = |s: &str| ArgToken::Literal(s.to_string());
        match self {
            ConverterKind::Mkvmerge => vec![Input, lit("--verbose"), lit("-o"), Output],
            // stream copy only; add "-c:s srt" here if a source's subtitle codec is rejected
            ConverterKind::Ffmpeg => vec![
                lit("-hide_banner"),
                lit("-i"),
                Input,
                lit("-codec"),
                lit("copy"),
                Output,
            ],
        }
    }
}

impl fmt::Display for ConverterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.binary_name())
    }
}

/// One token of a converter command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArgToken {
    Literal(String),
    Input,
    Output,
}

/// A converter binary and its argument template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConverterSpec {
    pub kind: ConverterKind,
    pub program: PathBuf,
    pub template: Vec<ArgToken>,
}

impl ConverterSpec {
    pub fn new(kind: ConverterKind, program: PathBuf) -> Self {
        Self {
            kind,
            program,
            template: kind.template(),
        }
    }

    /// Arguments with the placeholders substituted, in template order.
    pub fn render(&self, input: &Path, output: &Path) -> Vec<OsString> {
        self.template
            .iter()
            .map(|token| match token {
                ArgToken::Literal(s) => OsString::from(s),
                ArgToken::Input => input.as_os_str().to_os_string(),
                ArgToken::Output => output.as_os_str().to_os_string(),
            })
            .collect()
    }
}

/// A source file and the container it should end up in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionTarget {
    pub source: PathBuf,
    pub container: TargetContainer,
}

impl ConversionTarget {
    pub fn new(source: impl Into<PathBuf>, container: TargetContainer) -> Self {
        Self {
            source: source.into(),
            container,
        }
    }

    /// The source path with its extension swapped for the container's.
    pub fn target_path(&self) -> PathBuf {
        swap_extension(&self.source, self.container.extension())
    }

    pub fn source_family(&self) -> SourceFamily {
        self.container
            .select(&get_extension_lowercase(&self.source))
    }
}
