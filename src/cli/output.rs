use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use std::collections::BTreeMap;

use crate::cleaner::TrashUsage;
use crate::common::format::{self, format_path, format_size, format_size_colored};
use crate::model::{category, Category, CleanupOutcome, CleanupSummary, Finding};
use crate::scanner::ScanResults;

/// Print scan results in human-readable format
pub fn print_scan_results(results: &ScanResults, detailed: bool) {
    println!();
    println!("{}  reclaim Scan Results", "🧹");
    println!("{}", "─".repeat(60).dimmed());
    println!(
        "  Scanned in {}  •  {} reclaimable  •  {}",
        format::format_duration(results.duration_secs).cyan(),
        format_size_colored(results.total_bytes()),
        format::format_count(results.findings.len()).dimmed()
    );
    println!("{}", "─".repeat(60).dimmed());
    println!();

    if results.findings.is_empty() {
        println!("  {} Nothing to reclaim.", "✨");
        print_warnings(&results.warnings);
        return;
    }

    let mut by_category: BTreeMap<&str, Vec<&Finding>> = BTreeMap::new();
    for finding in &results.findings {
        by_category.entry(finding.category_id.as_str()).or_default().push(finding);
    }

    for (category_id, findings) in &by_category {
        let name = category::find(category_id).map(|c| c.name).unwrap_or(category_id);
        println!(
            "  {} {:<32} {:>10}  ({})",
            "●".green(),
            name.bold(),
            format_size(results.bytes_for_category(category_id)),
            format::format_count(findings.len()).dimmed()
        );

        if detailed {
            for finding in findings {
                print_finding(finding);
            }
            println!();
        }
    }

    if results.total_by_drive.len() > 1 {
        println!();
        for (drive, bytes) in &results.total_by_drive {
            println!("    {} {:<20} {:>10}", "⛁".dimmed(), drive, format_size(*bytes));
        }
    }

    println!();
    print_warnings(&results.warnings);

    println!("{}", "─".repeat(60).dimmed());
    println!(
        "  {} Total reclaimable: {}",
        "💾",
        format_size_colored(results.total_bytes())
    );
    println!(
        "  {} Run {} to clean safely",
        "💡",
        "reclaim clean --all --dry-run".cyan()
    );
    println!();
}

fn print_finding(finding: &Finding) {
    let location = finding
        .path
        .as_deref()
        .map(format_path)
        .unwrap_or_else(|| finding.drive_root.clone());
    println!(
        "      {} {:<60} {:>10}",
        "↳".dimmed(),
        format::truncate(&location, 60),
        format_size(finding.size_bytes).dimmed()
    );
    let mut notes = vec![finding.reason.clone()];
    if finding.requires_elevation {
        notes.push("needs elevation".to_string());
    }
    if finding.requires_app_closed {
        notes.push("close the app first".to_string());
    }
    println!("        {}", notes.join(" • ").dimmed());
}

fn print_warnings(warnings: &[String]) {
    if warnings.is_empty() {
        return;
    }
    println!(
        "  {} {}",
        "⚠".yellow(),
        format!("{} warnings:", warnings.len()).yellow()
    );
    for warning in warnings {
        println!("    {} {}", "→".dimmed(), warning.dimmed());
    }
    println!();
}

/// Print scan results as JSON
pub fn print_scan_json(results: &ScanResults) {
    print_json(results);
}

/// Print a minimal summary
pub fn print_scan_quiet(results: &ScanResults) {
    println!(
        "{}  {}  {}",
        format_size(results.total_bytes()),
        results.findings.len(),
        results.warnings.len()
    );
}

/// What a cleanup would do, without doing it
pub fn print_clean_preview(selected: &[Finding]) {
    let bytes: u64 = selected.iter().map(|f| f.size_bytes).sum();
    println!();
    for finding in selected {
        let location = finding
            .path
            .as_deref()
            .map(format_path)
            .unwrap_or_else(|| finding.drive_root.clone());
        println!(
            "    {} {:<16} {:<50} {:>10}",
            "•".dimmed(),
            finding.verb.id().dimmed(),
            format::truncate(&location, 50),
            format_size(finding.size_bytes)
        );
    }
    println!();
    println!(
        "  {} Dry run: would clean {} ({}). No files modified.",
        "ℹ️",
        format::format_count(selected.len()),
        format_size(bytes)
    );
}

pub fn print_findings_json(findings: &[Finding]) {
    print_json(findings);
}

pub fn print_findings_quiet(findings: &[Finding]) {
    let bytes: u64 = findings.iter().map(|f| f.size_bytes).sum();
    println!("{}  {}", format_size(bytes), findings.len());
}

/// Machine-readable cleanup result
#[derive(Debug, Serialize)]
pub struct CleanReport<'a> {
    pub canceled: bool,
    pub summary: &'a CleanupSummary,
    pub outcomes: &'a [CleanupOutcome],
}

/// Print a cleanup report
pub fn print_clean_report(summary: &CleanupSummary, outcomes: &[CleanupOutcome], canceled: bool) {
    println!();
    if canceled {
        println!("  {} {}", "⏹".yellow(), "Cleanup canceled".yellow().bold());
    }
    println!(
        "  {} {} {}, {}",
        "✓".green(),
        "Reclaimed".bold(),
        format::format_count(summary.deleted).cyan(),
        format_size_colored(summary.deleted_bytes),
    );
    if summary.deleted_to_trash > 0 {
        println!("    {} {} sent to trash", "•".dimmed(), summary.deleted_to_trash);
    }
    if summary.deleted_permanently > 0 {
        println!("    {} {} deleted permanently", "•".dimmed(), summary.deleted_permanently);
    }

    if summary.skipped > 0 {
        println!(
            "  {} Skipped {} ({})",
            "⚠".yellow(),
            format::format_count(summary.skipped),
            format_size(summary.skipped_bytes)
        );
        for (label, count) in [
            ("in use", summary.in_use),
            ("access denied", summary.access_denied),
            ("too new", summary.too_new),
            ("other", summary.other),
        ] {
            if count > 0 {
                println!("    {} {} {}", "•".dimmed(), count, label);
            }
        }

        let failures: Vec<&CleanupOutcome> = outcomes.iter().filter(|o| !o.success).collect();
        println!();
        for outcome in failures.iter().take(10) {
            println!(
                "    {} [{}] {}",
                "→".dimmed(),
                format::format_outcome_category(outcome.category),
                outcome.message.dimmed()
            );
        }
        if failures.len() > 10 {
            println!("    ... and {} more", (failures.len() - 10).to_string().dimmed());
        }
    }
    println!();
}

pub fn print_clean_json(summary: &CleanupSummary, outcomes: &[CleanupOutcome], canceled: bool) {
    print_json(&CleanReport {
        canceled,
        summary,
        outcomes,
    });
}

pub fn print_clean_quiet(summary: &CleanupSummary) {
    println!(
        "{}  {}  {}",
        format_size(summary.deleted_bytes),
        summary.deleted,
        summary.skipped
    );
}

/// Print the category table with effective enabled state
pub fn print_categories(categories: &[(&Category, bool)]) {
    format::print_header("Categories");
    for (category, enabled) in categories {
        let state = if *enabled { "on".green() } else { "off".dimmed() };
        println!(
            "  {:<22} {:<24} {:<4} risk {}",
            category.id.cyan(),
            category.name,
            state,
            format::format_risk(category.risk)
        );
        println!("  {:<22} {}", "", category.description.dimmed());
    }
    println!();
}

/// Print trash usage per drive
pub fn print_trash_usage(usage: &[(String, Result<TrashUsage, String>)]) {
    format::print_header("Trash");
    for (drive, result) in usage {
        match result {
            Ok(u) => format::print_kv(
                drive,
                &format!("{} in {}", format_size(u.bytes), format::format_count(u.items as usize)),
            ),
            Err(e) => format::print_kv(drive, &format!("{}", e.red())),
        }
    }
    println!();
}

/// Bar for cleanup progress, hidden when `visible` is false
pub fn cleanup_progress_bar(total: usize, visible: bool) -> ProgressBar {
    if !visible {
        return ProgressBar::hidden();
    }
    let pb = ProgressBar::new(total as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("  {spinner:.cyan} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("━━░"),
    );
    pb
}

/// Spinner shown while discoverers run
pub fn scan_spinner(visible: bool) -> ProgressBar {
    if !visible {
        return ProgressBar::hidden();
    }
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("  {spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    pb.set_message("Scanning...");
    pb
}

fn print_json<T: Serialize + ?Sized>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{}", json),
        Err(e) => eprintln!("Error serializing results: {}", e),
    }
}
