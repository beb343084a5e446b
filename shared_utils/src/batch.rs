//! Batch Processing Module
//!
//! Input expansion for the batch driver and per-run tallies.
//! Directories are walked recursively and every regular file becomes a
//! candidate; the extension filter happens later, in the converter lookup.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::warn;
use walkdir::WalkDir;

/// Drop repeated top-level paths, keeping the first occurrence's position.
pub fn dedup_inputs(paths: &[PathBuf]) -> Vec<PathBuf> {
    let mut seen = HashSet::new();
    let mut unique = Vec::with_capacity(paths.len());
    for path in paths {
        if seen.insert(path) {
            unique.push(path.clone());
        }
    }
    unique
}

/// Every regular file under `dir`, in a stable (file name) order.
pub fn collect_files(dir: &Path) -> Vec<PathBuf> {
    WalkDir::new(dir)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| match e {
            Ok(entry) => Some(entry),
            Err(err) => {
                warn!("⚠️  Cannot read {}: {}", dir.display(), err);
                None
            }
        })
        .filter(|e| e.path().is_file())
        .map(|e| e.into_path())
        .collect()
}

/// Expand one CLI argument: a directory becomes its files, anything else is
/// passed through for the driver to judge.
pub fn expand_input(path: &Path) -> Vec<PathBuf> {
    if path.is_dir() {
        collect_files(path)
    } else {
        vec![path.to_path_buf()]
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchResult {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub skipped: usize,
}

impl BatchResult {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn success(&mut self) {
        self.total += 1;
        self.succeeded += 1;
    }

    pub fn fail(&mut self) {
        self.total += 1;
        self.failed += 1;
    }

    pub fn skip(&mut self) {
        self.total += 1;
        self.skipped += 1;
    }

    /// Share of attempted (not skipped) files that converted cleanly.
    pub fn success_rate(&self) -> f64 {
        let attempted = self.succeeded + self.failed;
        if attempted == 0 {
            100.0
        } else {
            (self.succeeded as f64 / attempted as f64) * 100.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_dedup_keeps_first_occurrence_order() {
        let inputs = vec![
            PathBuf::from("b.avi"),
            PathBuf::from("a.mp4"),
            PathBuf::from("b.avi"),
            PathBuf::from("dir"),
            PathBuf::from("a.mp4"),
        ];
        assert_eq!(
            dedup_inputs(&inputs),
            vec![
                PathBuf::from("b.avi"),
                PathBuf::from("a.mp4"),
                PathBuf::from("dir")
            ]
        );
    }

    #[test]
    fn test_collect_files_is_recursive_and_extension_blind() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("season1/extras")).unwrap();
        fs::write(dir.path().join("movie.mp4"), b"x").unwrap();
        fs::write(dir.path().join("notes.txt"), b"x").unwrap();
        fs::write(dir.path().join("season1/e01.AVI"), b"x").unwrap();
        fs::write(dir.path().join("season1/extras/trailer.webm"), b"x").unwrap();

        let files = collect_files(dir.path());
        let names: Vec<String> = files
            .iter()
            .map(|p| p.strip_prefix(dir.path()).unwrap().display().to_string())
            .collect();

        assert_eq!(files.len(), 4);
        assert!(names.contains(&"notes.txt".to_string()));
        assert!(names.contains(&format!("season1{}e01.AVI", std::path::MAIN_SEPARATOR)));
        assert!(files.iter().all(|p| p.is_file()));
    }

    #[test]
    fn test_expand_input_passes_files_through() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("clip.avi");
        fs::write(&file, b"x").unwrap();

        assert_eq!(expand_input(&file), vec![file.clone()]);
        assert_eq!(expand_input(dir.path()), vec![file]);

        let missing = dir.path().join("missing.mp4");
        assert_eq!(expand_input(&missing), vec![missing.clone()]);
    }

    #[test]
    fn test_batch_result_tallies() {
        let mut result = BatchResult::new();
        result.success();
        result.success();
        result.fail();
        result.skip();

        assert_eq!(result.total, 4);
        assert_eq!(result.succeeded, 2);
        assert_eq!(result.failed, 1);
        assert_eq!(result.skipped, 1);
        assert_eq!(
            result.total,
            result.succeeded + result.failed + result.skipped
        );
    }

    #[test]
    fn test_success_rate_ignores_skips() {
        let mut result = BatchResult::new();
        assert!((result.success_rate() - 100.0).abs() < 0.01);

        result.success();
        result.fail();
        result.skip();
        result.skip();
        assert!(
            (result.success_rate() - 50.0).abs() < 0.01,
            "1 success, 1 fail should be 50%, got {}",
            result.success_rate()
        );
    }
}
