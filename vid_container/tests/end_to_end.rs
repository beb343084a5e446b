//! Drives the real subprocess path with shell scripts standing in for
//! ffprobe, ffmpeg and mkvmerge. A "video" here is a text file holding its
//! own duration, which the fake probe prints back.
#![cfg(unix)]

use shared_utils::notify::NullNotifier;
use shared_utils::tool_runner::SystemToolRunner;
use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;
use vid_container::{ConverterKind, FileState, Pipeline, SkipReason, TargetContainer, ToolConfig};

const FAKE_PROBE: &str = r#"#!/bin/sh
for last; do :; done
cat "$last"
"#;

// -hide_banner -i <in> -codec copy <out>
const FAKE_FFMPEG: &str = r#"#!/bin/sh
case "$3" in
  *bad*) echo 9.0 > "$6" ;;
  *) cp "$3" "$6" ;;
esac
"#;

// <in> --verbose -o <out>
const FAKE_MKVMERGE: &str = r#"#!/bin/sh
case "$1" in
  *clip*) echo partial > "$4"; echo "Error: broken index" >&2; exit 2 ;;
  *) cp "$1" "$4"; echo "Multiplexing took 0 seconds." ;;
esac
"#;

fn install_script(dir: &Path, name: &str, body: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, body).unwrap();
    fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
    path
}

fn video(dir: &Path, name: &str, duration: &str) -> PathBuf {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(&path, format!("{}\n", duration)).unwrap();
    path
}

#[test]
fn test_batch_with_real_subprocesses() {
    let tools = TempDir::new().unwrap();
    let media = TempDir::new().unwrap();

    let config = ToolConfig::default()
        .with_probe(install_script(tools.path(), "ffprobe", FAKE_PROBE))
        .with_converter(
            ConverterKind::Ffmpeg,
            install_script(tools.path(), "ffmpeg", FAKE_FFMPEG),
        )
        .with_converter(
            ConverterKind::Mkvmerge,
            install_script(tools.path(), "mkvmerge", FAKE_MKVMERGE),
        );

    let movie = video(media.path(), "movie.mp4", "10.4");
    let clip = video(media.path(), "clip.avi", "20.0");
    let bad = video(media.path(), "bad.wmv", "12.0");
    let show = video(media.path(), "shows/Episode 1.FLV", "1500.25");
    let notes = video(media.path(), "shows/notes.xyz", "0");

    let runner = SystemToolRunner;
    let notifier = NullNotifier;
    let pipeline = Pipeline::new(&config, TargetContainer::Mkv, &runner, &notifier);
    let report = pipeline.run(&[media.path().to_path_buf()]);

    assert_eq!(report.state_of(&movie), Some(&FileState::VerifiedSuccess));
    assert!(!movie.exists());
    assert!(movie.with_extension("mkv").is_file());

    assert_eq!(report.state_of(&clip), Some(&FileState::ExecutorError));
    assert!(clip.exists());
    assert!(!clip.with_extension("mkv").exists());

    assert_eq!(report.state_of(&bad), Some(&FileState::VerifiedFailure));
    assert!(bad.exists());
    assert!(!bad.with_extension("mkv").exists());

    assert_eq!(report.state_of(&show), Some(&FileState::VerifiedSuccess));
    assert!(show.with_extension("mkv").is_file());

    assert!(matches!(
        report.state_of(&notes),
        Some(FileState::Skipped(SkipReason::UnregisteredFormat(_)))
    ));
    assert!(notes.exists());

    // the failure log is in processing order (sorted walk)
    assert_eq!(report.state.failures.entries(), [bad.clone(), clip.clone()]);
    // bad.wmv was converted, just not verified
    assert_eq!(report.state.stats.count, 3);
    assert_eq!(report.batch.succeeded, 2);
    assert_eq!(report.batch.failed, 2);
    assert_eq!(report.batch.skipped, 1);

    // nothing left to do for the converted files; the failures are retried
    let again = pipeline.run(&[movie.with_extension("mkv"), clip.clone()]);
    assert!(matches!(
        again.state_of(&movie.with_extension("mkv")),
        Some(FileState::Skipped(SkipReason::TargetExists(_)))
    ));
    assert_eq!(again.state_of(&clip), Some(&FileState::ExecutorError));
    assert_eq!(again.state.failures.entries(), [clip]);
}

#[test]
fn test_cli_exits_with_error_without_paths() {
    let logs = TempDir::new().unwrap();

    let status = Command::new(env!("CARGO_BIN_EXE_vid-container"))
        .args(["--container", "mkv", "--no-notify", "--log-dir"])
        .arg(logs.path())
        .status()
        .unwrap();

    assert_eq!(status.code(), Some(1));
    let run_logs: Vec<_> = fs::read_dir(logs.path())
        .unwrap()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_name().to_string_lossy().starts_with("vid_container_"))
        .collect();
    assert_eq!(run_logs.len(), 1);
}

#[test]
fn test_cli_keeps_terminal_log_when_log_dir_is_unusable() {
    let dir = TempDir::new().unwrap();
    let blocker = dir.path().join("blocker");
    fs::write(&blocker, "not a directory").unwrap();
    let notes = video(dir.path(), "notes.xyz", "0");

    let output = Command::new(env!("CARGO_BIN_EXE_vid-container"))
        .args(["-c", "mkv", "--no-notify", "--log-dir"])
        .arg(&blocker)
        .arg(&notes)
        .env_remove("RUST_LOG")
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(0));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Logging to file disabled"), "{}", stderr);
    assert!(stderr.contains("notes.xyz"), "{}", stderr);
    assert!(notes.exists());
}

#[test]
fn test_cli_rejects_invalid_margin() {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("config.json");
    fs::write(&config, r#"{ "disk_space_margin": 0.5 }"#).unwrap();
    let input = video(dir.path(), "movie.mp4", "10.4");

    let status = Command::new(env!("CARGO_BIN_EXE_vid-container"))
        .args(["-c", "mkv", "--no-notify", "--log-dir"])
        .arg(dir.path())
        .arg("--config")
        .arg(&config)
        .arg(&input)
        .status()
        .unwrap();

    assert_eq!(status.code(), Some(1));
    assert!(input.exists());
}
