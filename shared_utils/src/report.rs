//! Report Module
//!
//! End-of-run summary: conversion count and time, per-state tallies and the
//! list of sources that failed. Printed on stdout and written to the run
//! log under [`REPORT_TARGET`].

use crate::batch::BatchResult;
use crate::common_utils::format_hms;
use crate::logging::REPORT_TARGET;
use console::style;
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;

/// Everything the summary needs from a finished run.
#[derive(Debug, Clone)]
pub struct RunSummary<'a> {
    pub batch: &'a BatchResult,
    pub converted: usize,
    pub conversion_time: Duration,
    pub failures: &'a [PathBuf],
    /// Display name of the target container, e.g. "Matroska".
    pub container_label: &'a str,
}

/// Plain-text summary lines, in print order.
pub fn summary_lines(summary: &RunSummary<'_>) -> Vec<String> {
    let mut lines = Vec::new();

    if summary.converted > 0 {
        lines.push(format!(
            "Converted a total of {} file(s) in {}",
            summary.converted,
            format_hms(summary.conversion_time)
        ));
    } else {
        lines.push(format!(
            "No files converted to {} format",
            summary.container_label
        ));
    }

    let batch = summary.batch;
    lines.push(format!(
        "Files: {} processed, {} verified, {} failed, {} skipped ({:.1}% success)",
        batch.total,
        batch.succeeded,
        batch.failed,
        batch.skipped,
        batch.success_rate()
    ));

    if !summary.failures.is_empty() {
        lines.push(format!(
            "Here's the list of files that failed to convert to {} format:",
            summary.container_label
        ));
        lines.extend(summary.failures.iter().map(|p| p.display().to_string()));
    }

    lines
}

pub fn print_summary_report(summary: &RunSummary<'_>) {
    let lines = summary_lines(summary);
    for line in &lines {
        info!(target: REPORT_TARGET, "{}", line);
    }

    let batch = summary.batch;
    println!();
    println!("╔══════════════════════════════════════════════════════════════╗");
    println!(
        "║  📊 {:<56} ║",
        format!("{} Conversion Summary", summary.container_label)
    );
    println!("╠══════════════════════════════════════════════════════════════╣");
    println!("║  📁 Files Processed:    {:>10}                           ║", batch.total);
    println!("║  ✅ Verified:           {:>10}                           ║", batch.succeeded);
    println!("║  ❌ Failed:             {:>10}                           ║", batch.failed);
    println!("║  ⏭️  Skipped:            {:>10}                           ║", batch.skipped);
    println!("╚══════════════════════════════════════════════════════════════╝");
    println!("{}", lines[0]);

    if !summary.failures.is_empty() {
        println!();
        println!("{}", style(&lines[2]).red().bold());
        for path in summary.failures {
            println!("   {}", path.display());
        }
    }
}
