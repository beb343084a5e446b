//! Disk space guard
//!
//! A remux is assumed never to grow past `margin × source size` (1.2 by
//! default). That is a heuristic safety margin rather than a bound, so the
//! factor is a parameter. The comparison is strict and done in integer
//! per-mille arithmetic so the boundary behaves exactly.

use std::io;
use std::path::{Path, PathBuf};

pub const DEFAULT_SPACE_MARGIN: f64 = 1.2;

#[derive(Debug, Clone, PartialEq)]
pub struct SpaceCheck {
    pub available: bool,
    pub free_bytes: u64,
    pub source_bytes: u64,
    pub required_bytes: u64,
}

fn margin_permille(margin: f64) -> u128 {
    (margin * 1000.0).round().max(0.0) as u128
}

/// `true` iff `free_bytes > margin × source_bytes`.
pub fn has_room(free_bytes: u64, source_bytes: u64, margin: f64) -> bool {
    free_bytes as u128 * 1000 > source_bytes as u128 * margin_permille(margin)
}

/// `margin × source_bytes`, rounded up.
pub fn required_bytes(source_bytes: u64, margin: f64) -> u64 {
    let scaled = source_bytes as u128 * margin_permille(margin);
    u64::try_from(scaled.div_ceil(1000)).unwrap_or(u64::MAX)
}

/// Check whether the volume holding `source` can take its converted copy.
///
/// The target is written next to the source, so the source's directory is
/// the one queried.
pub fn check_disk_space(source: &Path, margin: f64) -> io::Result<SpaceCheck> {
    let source_bytes = std::fs::metadata(source)?.len();
    let free_bytes = free_space(&containing_dir(source))?;

    Ok(SpaceCheck {
        available: has_room(free_bytes, source_bytes, margin),
        free_bytes,
        source_bytes,
        required_bytes: required_bytes(source_bytes, margin),
    })
}

fn containing_dir(path: &Path) -> PathBuf {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

/// Bytes available to unprivileged users on the filesystem holding `path`.
#[cfg(unix)]
#[allow(clippy::unnecessary_cast)]
pub fn free_space(path: &Path) -> io::Result<u64> {
    use std::ffi::CString;
    use std::os::unix::ffi::OsStrExt;

    let c_path = CString::new(path.as_os_str().as_bytes())
        .map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, "path contains a NUL byte"))?;

    // SAFETY: statvfs only writes into the zeroed struct we own and reads the
    // NUL-terminated path.
    let mut stat: libc::statvfs = unsafe { std::mem::zeroed() };
    let ret = unsafe { libc::statvfs(c_path.as_ptr(), &mut stat) };
    if ret != 0 {
        return Err(io::Error::last_os_error());
    }

    Ok((stat.f_bavail as u64).saturating_mul(stat.f_frsize as u64))
}

#[cfg(not(unix))]
pub fn free_space(_path: &Path) -> io::Result<u64> {
    Err(io::Error::new(
        io::ErrorKind::Unsupported,
        "free space query is not supported on this platform",
    ))
}

/// Mount point of the filesystem holding `path`, used to name the volume in
/// "not enough space" reports.
#[cfg(unix)]
pub fn volume_mount_point(path: &Path) -> Option<PathBuf> {
    use std::os::unix::fs::MetadataExt;

    let canonical = path.canonicalize().ok()?;
    let device = std::fs::metadata(&canonical).ok()?.dev();

    let mut mount = canonical.as_path();
    for ancestor in canonical.ancestors().skip(1) {
        match std::fs::metadata(ancestor) {
            Ok(meta) if meta.dev() == device => mount = ancestor,
            _ => break,
        }
    }
    Some(mount.to_path_buf())
}

#[cfg(not(unix))]
pub fn volume_mount_point(path: &Path) -> Option<PathBuf> {
    path.ancestors().last().map(Path::to_path_buf)
}
