//! Common Utilities Module
//!
//! Small helpers shared by the conversion pipeline:
//! - extension handling (case-insensitive, swap for the target container)
//! - human-readable sizes and durations for the run log
//! - platform gate

use std::path::{Path, PathBuf};
use std::time::Duration;

/// Printed after every file so the log can be scanned per file.
pub const SPACER: &str = "----- ----- ----- ----- -----";

/// Lower-cased extension without the dot, empty when there is none.
///
/// Files fetched from servers or torrents often carry upper-case
/// extensions (`.MP4`), so every lookup goes through this.
///
/// # Examples
/// ```
/// use std::path::Path;
/// use shared_utils::common_utils::get_extension_lowercase;
///
/// assert_eq!(get_extension_lowercase(Path::new("clip.AVI")), "avi");
/// assert_eq!(get_extension_lowercase(Path::new("noext")), "");
/// ```
pub fn get_extension_lowercase(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .unwrap_or_default()
}

/// `path` with its last extension replaced by `extension`.
pub fn swap_extension(path: &Path, extension: &str) -> PathBuf {
    path.with_extension(extension)
}

/// Size in binary units, e.g. `1.5KiB`, `2.0GiB`.
pub fn format_size_binary(bytes: f64) -> String {
    let mut num = bytes;
    for unit in ["", "Ki", "Mi", "Gi", "Ti", "Pi", "Ei", "Zi"] {
        if num.abs() < 1024.0 {
            return format!("{:3.1}{}B", num, unit);
        }
        num /= 1024.0;
    }
    format!("{:.1}YiB", num)
}

/// Duration as `"1 hour(s) 2 minutes 3 seconds"`.
///
/// Sub-second durations keep two decimals; anything longer is rounded to
/// whole seconds.
pub fn format_hms(duration: Duration) -> String {
    let raw = duration.as_secs_f64();
    if raw > 0.0 && raw < 1.0 {
        return format!("{:.2} seconds", raw);
    }

    let whole = raw.round() as u64;
    let hours = whole / 3600;
    let minutes = (whole % 3600) / 60;
    let seconds = whole % 60;

    let mut text = String::new();
    if hours > 0 {
        text.push_str(&format!("{} hour(s) ", hours));
    }
    if minutes > 0 {
        text.push_str(&format!("{} minutes ", minutes));
    }
    text.push_str(&format!("{} seconds", seconds));
    text
}

/// Platforms the disk space guard can query (unix, through `statvfs`).
/// Windows is not supported.
pub fn is_supported_platform() -> bool {
    cfg!(unix)
}
