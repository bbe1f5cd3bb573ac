//! Human and JSON rendering of a single pass report.

use anyhow::{Context, Result};
use colored::Colorize;

use folder_sync_engine::{SyncAction, SyncReport};

pub fn print_json(report: &SyncReport) -> Result<()> {
    println!(
        "{}",
        serde_json::to_string_pretty(report).context("failed to render sync report JSON")?
    );
    Ok(())
}

pub fn print_report(report: &SyncReport) {
    let prefix = if report.dry_run { "[dry-run] " } else { "" };
    let heading = format!(
        "{} → {}",
        report.source.display(),
        report.destination.display()
    );

    if report.is_noop() {
        println!("{prefix}{} '{heading}' — nothing to do", "✓".green());
        return;
    }

    let (mark, failures) = match report.failed() {
        0 => ("✓".green(), String::new()),
        n => ("✗".red(), format!(", {n} failed")),
    };
    println!(
        "{prefix}{mark} '{heading}' synced ({} copied, {} unchanged, {} dirs created, {} removed{failures})",
        report.copied(),
        report.unchanged(),
        report.created_dirs(),
        report.removed(),
    );

    for action in &report.actions {
        match action {
            SyncAction::Copied { path } => println!("  ✎  {}", path.display()),
            SyncAction::WouldCopy { path } => println!("  ~  {}", path.display()),
            SyncAction::CreatedDir { path } => println!("  +  {}/", path.display()),
            SyncAction::WouldCreateDir { path } => println!("  ~  {}/", path.display()),
            SyncAction::Removed { path } => println!("  {}  {}", "✗".red(), path.display()),
            SyncAction::WouldRemove { path } => println!("  ~  {} (remove)", path.display()),
            SyncAction::Skipped { path, reason } => {
                println!("  {}  {} ({reason})", "!".yellow(), path.display())
            }
            SyncAction::Failed { path, error } => {
                println!("  {}  {} ({error})", "✗".red(), path.display())
            }
            SyncAction::Unchanged { .. } => {}
        }
    }
}
