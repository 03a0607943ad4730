// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! History management for undo support

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::Result;

/// A single move performed by an organize run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    pub original_path: PathBuf,
    pub new_path: PathBuf,
    pub category: String,
    #[serde(default)]
    pub undone: bool,
}

/// Outcome of an undo request
#[derive(Debug, Default)]
pub struct UndoReport {
    /// Entries moved back (or that would be, in a dry run)
    pub undone: Vec<HistoryEntry>,
    /// Entries left alone, with the reason
    pub skipped: Vec<(HistoryEntry, String)>,
}

/// History manager for tracking moves
pub struct History {
    path: PathBuf,
}

impl History {
    /// Create a new history manager
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Append an entry to the history
    pub fn append(&self, entry: &HistoryEntry) -> Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;

        let json = serde_json::to_string(entry)?;
        writeln!(file, "{}", json)?;

        Ok(())
    }

    /// Read all history entries
    pub fn read_all(&self) -> Result<Vec<HistoryEntry>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let file = File::open(&self.path)?;
        let reader = BufReader::new(file);

        let mut entries = Vec::new();
        for line in reader.lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str(&line) {
                Ok(entry) => entries.push(entry),
                Err(e) => {
                    warn!("Failed to parse history entry: {}", e);
                }
            }
        }

        Ok(entries)
    }

    /// Get the most recent N entries (newest first)
    pub fn get_recent(&self, count: usize) -> Result<Vec<HistoryEntry>> {
        let mut entries = self.read_all()?;
        entries.reverse();
        entries.truncate(count);
        Ok(entries)
    }

    /// Mark an entry as undone
    pub fn mark_undone(&self, id: &str) -> Result<()> {
        let entries = self.read_all()?;

        // Rewrite the entire file with the updated entry
        let file = File::create(&self.path)?;
        let mut writer = std::io::BufWriter::new(file);

        for mut entry in entries {
            if entry.id == id {
                entry.undone = true;
            }
            let json = serde_json::to_string(&entry)?;
            writeln!(writer, "{}", json)?;
        }
        writer.flush()?;

        Ok(())
    }

    /// Get entries that haven't been undone
    pub fn get_undoable(&self) -> Result<Vec<HistoryEntry>> {
        let entries = self.read_all()?;
        Ok(entries.into_iter().filter(|e| !e.undone).collect())
    }

    /// Move the `count` most recent items back where they came from
    /// (`0` means all of them)
    pub fn undo(&self, count: usize, dry_run: bool) -> Result<UndoReport> {
        let mut entries = self.get_undoable()?;
        entries.reverse();
        if count > 0 {
            entries.truncate(count);
        }

        let mut report = UndoReport::default();
        for entry in entries {
            if !entry.new_path.exists() {
                warn!("File not found (may have been moved/deleted): {:?}", entry.new_path);
                report.skipped.push((entry, "file not found".to_string()));
                continue;
            }
            if entry.original_path.exists() {
                warn!("Original path already exists: {:?}", entry.original_path);
                report.skipped.push((entry, "original path already exists".to_string()));
                continue;
            }

            if dry_run {
                report.undone.push(entry);
                continue;
            }

            match fs::rename(&entry.new_path, &entry.original_path) {
                Ok(()) => {
                    self.mark_undone(&entry.id)?;
                    info!("Undone: {:?} -> {:?}", entry.new_path, entry.original_path);
                    report.undone.push(entry);
                }
                Err(e) => {
                    warn!("Failed to undo {:?}: {}", entry.new_path, e);
                    report.skipped.push((entry, e.to_string()));
                }
            }
        }

        Ok(report)
    }

    /// Clear all history
    pub fn clear(&self) -> Result<()> {
        if self.path.exists() {
            fs::remove_file(&self.path)?;
        }
        Ok(())
    }

    /// Get history file path
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Create a new history entry
pub fn create_entry(
    id: String,
    original_path: PathBuf,
    new_path: PathBuf,
    category: String,
) -> HistoryEntry {
    HistoryEntry {
        id,
        timestamp: Utc::now(),
        original_path,
        new_path,
        category,
        undone: false,
    }
}
