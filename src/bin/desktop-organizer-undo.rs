// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Desktop Organizer Undo Utility
//!
//! Moves organized items back to the desktop using the history log.

use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;

use desktop_organizer::history::History;

#[derive(Parser, Debug)]
#[command(name = "desktop-organizer-undo")]
#[command(version = "1.0.0")]
#[command(about = "Undo Desktop Organizer moves")]
struct Args {
    /// Path to history file
    #[arg(short = 'f', long, default_value = "desktop_organizer_history.jsonl")]
    history_file: PathBuf,

    /// Number of moves to undo (default: 1, use 0 for all)
    #[arg(short, long, default_value = "1")]
    count: usize,

    /// Dry run - show what would be undone without doing it
    #[arg(long)]
    dry_run: bool,

    /// List all entries in history
    #[arg(long)]
    list: bool,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    if !args.history_file.exists() {
        eprintln!("History file not found: {:?}", args.history_file);
        eprintln!("No moves to undo.");
        return Ok(());
    }

    let history = History::new(args.history_file.clone());

    if args.list {
        let entries = history
            .get_recent(usize::MAX)
            .with_context(|| format!("reading {:?}", args.history_file))?;
        if entries.is_empty() {
            println!("No history entries found.");
            return Ok(());
        }

        println!("Move History ({} entries):", entries.len());
        println!("{:-<80}", "");
        for (i, entry) in entries.iter().enumerate() {
            println!(
                "{:3}. [{}] {} -> {}{}",
                i + 1,
                entry.timestamp.format("%Y-%m-%d %H:%M:%S"),
                entry.original_path.display(),
                entry.new_path.display(),
                if entry.undone { " (undone)" } else { "" }
            );
            println!("     Category: {}", entry.category);
        }
        return Ok(());
    }

    let report = history
        .undo(args.count, args.dry_run)
        .with_context(|| format!("undoing moves from {:?}", args.history_file))?;

    if report.undone.is_empty() && report.skipped.is_empty() {
        println!("No moves to undo.");
        return Ok(());
    }

    for entry in &report.undone {
        let verb = if args.dry_run { "Would move back" } else { "Undone" };
        println!("  {}: {} -> {}", verb, entry.new_path.display(), entry.original_path.display());
    }
    for (entry, reason) in &report.skipped {
        eprintln!("  Skip: {} ({})", entry.new_path.display(), reason);
    }

    println!();
    if args.dry_run {
        println!("Dry run complete. {} move(s) would be undone.", report.undone.len());
    } else {
        println!("Done. {} undone, {} skipped.", report.undone.len(), report.skipped.len());
    }

    Ok(())
}
