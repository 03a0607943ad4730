// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Organize runs: classify the desktop, back it up, move items into
//! category folders or arrange them on the icon grid

use chrono::Local;
use serde::Serialize;
use std::collections::{BTreeSet, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, warn};
use walkdir::WalkDir;

use crate::classifier::{split_extension, Classification, Classifier, ItemDescriptor, MatchKind};
use crate::config::AppConfig;
use crate::history::{create_entry, History};
use crate::layout::positioner::{find_icon, IconPositioner};
use crate::layout::{GridLayout, PlacedItem};
use crate::scanner::Scanner;
use crate::Result;

/// A desktop entry together with its category
#[derive(Debug, Clone, Serialize)]
pub struct ClassifiedItem {
    #[serde(flatten)]
    pub item: ItemDescriptor,
    pub category: String,
    pub rule: MatchKind,
}

impl ClassifiedItem {
    fn new(item: ItemDescriptor, classification: Classification) -> Self {
        Self {
            item,
            category: classification.category,
            rule: classification.kind,
        }
    }
}

/// Result of moving items into category folders
#[derive(Debug, Default)]
pub struct MoveReport {
    pub total: usize,
    pub succeeded: usize,
    pub dry_run: bool,
    pub backup: Option<PathBuf>,
    pub failed: Vec<String>,
}

/// Result of arranging items on the grid
#[derive(Debug, Default)]
pub struct ArrangeReport {
    pub placed: Vec<PlacedItem>,
    /// Items with no matching icon on the desktop
    pub unresolved: Vec<String>,
    /// Items whose icon could not be moved
    pub failed: Vec<String>,
    pub dry_run: bool,
}

/// Drives one organize run over a desktop folder
pub struct Organizer {
    config: AppConfig,
    scanner: Scanner,
    classifier: Classifier,
    history: History,
}

impl Organizer {
    pub fn new(config: AppConfig) -> Result<Self> {
        let scanner = Scanner::from_config(&config)?;
        let classifier = Classifier::from_config(&config);
        let history = History::new(config.history_file.clone());
        Ok(Self {
            config,
            scanner,
            classifier,
            history,
        })
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn classifier(&self) -> &Classifier {
        &self.classifier
    }

    pub fn desktop(&self) -> &Path {
        self.scanner.desktop()
    }

    /// Desktop entries to organize.
    ///
    /// Category folders left by an earlier run are not items themselves. A
    /// folder counts as one when it carries a category name and is either
    /// empty or recorded in the history as a move destination. Other folders
    /// with a category name belong to the user and are classified like any
    /// other folder.
    pub fn scan(&self) -> Result<Vec<PathBuf>> {
        let entries = self.scanner.scan()?;
        let destinations = self.move_destinations();

        let items = entries
            .into_iter()
            .filter(|path| {
                let created = self.is_category_folder(path)
                    && (destinations.contains(path.as_path()) || is_empty_dir(path));
                if created {
                    debug!("Skipping category folder {:?}", path);
                }
                !created
            })
            .collect();
        Ok(items)
    }

    fn is_category_folder(&self, path: &Path) -> bool {
        path.is_dir()
            && path
                .file_name()
                .and_then(|n| n.to_str())
                .map_or(false, |n| self.classifier.table().is_category_label(n))
    }

    /// Folders earlier runs moved items into
    fn move_destinations(&self) -> HashSet<PathBuf> {
        match self.history.read_all() {
            Ok(entries) => entries
                .iter()
                .filter_map(|e| e.new_path.parent().map(Path::to_path_buf))
                .collect(),
            Err(e) => {
                warn!("Could not read history {:?}: {}", self.history.path(), e);
                HashSet::new()
            }
        }
    }

    /// Scan and classify every desktop entry
    pub fn classify_desktop(&self) -> Result<Vec<ClassifiedItem>> {
        let items = self
            .scan()?
            .iter()
            .map(|path| {
                let descriptor = self.scanner.describe(path, &self.classifier);
                let classification = self.classifier.classify_detailed(&descriptor);
                ClassifiedItem::new(descriptor, classification)
            })
            .collect();
        Ok(items)
    }

    /// Copy the given items into a timestamped backup folder.
    ///
    /// Returns `None` when backups are disabled or this is a dry run.
    pub fn create_backup(&self, items: &[ClassifiedItem]) -> Result<Option<PathBuf>> {
        if !self.config.create_backup || self.config.dry_run {
            return Ok(None);
        }

        let timestamp = Local::now().format("%Y%m%d_%H%M%S");
        let backup_path = self.config.backup_dir.join(format!("desktop_backup_{}", timestamp));
        fs::create_dir_all(&backup_path)?;

        for entry in items {
            let source = &entry.item.path;
            let target = backup_path.join(&entry.item.name);
            let copied = if entry.item.is_folder {
                copy_tree(source, &target)
            } else {
                fs::copy(source, &target).map(|_| ())
            };
            if let Err(e) = copied {
                warn!("Could not backup {}: {}", entry.item.name, e);
            }
        }

        info!("Backup created at: {:?}", backup_path);
        Ok(Some(backup_path))
    }

    /// Create a folder on the desktop for each category
    pub fn create_category_folders<'a, I>(&self, categories: I)
    where
        I: IntoIterator<Item = &'a str>,
    {
        for category in categories {
            let category_path = self.desktop().join(category);
            if category_path.exists() {
                continue;
            }
            if self.config.dry_run {
                info!("[DRY RUN] Would create folder: {}", category);
                continue;
            }
            match fs::create_dir(&category_path) {
                Ok(()) => info!("Created folder: {}", category),
                Err(e) => error!("Could not create folder {}: {}", category, e),
            }
        }
    }

    /// Move one item into its category folder. Returns false on failure.
    pub fn move_item(&self, entry: &ClassifiedItem) -> bool {
        if is_in_place(entry) {
            info!("{} is already the {} folder", entry.item.name, entry.category);
            return true;
        }

        let folder = self.desktop().join(&entry.category);
        let destination = unique_destination(&folder, &entry.item.name);
        let label = format!(
            "{}/{}",
            entry.category,
            destination.file_name().map(|n| n.to_string_lossy()).unwrap_or_default()
        );

        if self.config.dry_run {
            info!("[DRY RUN] Would move: {} -> {}", entry.item.name, label);
            return true;
        }

        if let Err(e) = fs::create_dir_all(&folder) {
            error!("Could not create folder {}: {}", entry.category, e);
            return false;
        }
        if let Err(e) = fs::rename(&entry.item.path, &destination) {
            error!("Could not move {}: {}", entry.item.name, e);
            return false;
        }
        info!("Moved: {} -> {}", entry.item.name, label);

        let record = create_entry(
            uuid::Uuid::new_v4().to_string(),
            entry.item.path.clone(),
            destination,
            entry.category.clone(),
        );
        if let Err(e) = self.history.append(&record) {
            warn!("Failed to record move of {} in history: {}", entry.item.name, e);
        }
        true
    }

    /// Back up, create category folders and move every item
    pub fn organize(&self, items: &[ClassifiedItem]) -> Result<MoveReport> {
        let mut report = MoveReport {
            total: items.len(),
            dry_run: self.config.dry_run,
            ..MoveReport::default()
        };

        report.backup = self.create_backup(items)?;

        let categories: BTreeSet<&str> = items.iter().map(|i| i.category.as_str()).collect();

        // User folders sitting where a category folder goes are moved out of
        // the way before anything is moved into that path
        let (occupying, rest): (Vec<&ClassifiedItem>, Vec<&ClassifiedItem>) = items.iter().partition(|i| {
            i.item.is_folder
                && !is_in_place(i)
                && categories.iter().any(|c| c.eq_ignore_ascii_case(&i.item.name))
        });

        for entry in occupying {
            self.record_move(entry, &mut report);
        }
        self.create_category_folders(categories.iter().copied());
        for entry in rest {
            self.record_move(entry, &mut report);
        }

        if report.dry_run {
            info!("Dry run completed. No changes made to desktop.");
        } else {
            info!("Desktop organization completed. {}/{} items processed.", report.succeeded, report.total);
        }
        Ok(report)
    }

    fn record_move(&self, entry: &ClassifiedItem, report: &mut MoveReport) {
        if self.move_item(entry) {
            report.succeeded += 1;
        } else {
            report.failed.push(entry.item.name.clone());
        }
    }

    /// Grid positions for the items, honouring `includeFolders`
    pub fn plan_layout(&self, items: &[ClassifiedItem]) -> Vec<PlacedItem> {
        let grid = &self.config.grid_layout;
        let layout = GridLayout::new(grid.clone());
        layout.plan(
            items
                .iter()
                .filter(|i| grid.include_folders || !i.item.is_folder)
                .map(|i| (i.item.name.as_str(), i.category.as_str())),
        )
    }

    /// Arrange the items on the desktop grid through `positioner`.
    ///
    /// Items without a matching icon are reported in
    /// [`ArrangeReport::unresolved`]; neither they nor single failed moves
    /// stop the run.
    pub fn arrange(&self, items: &[ClassifiedItem], positioner: &mut dyn IconPositioner) -> Result<ArrangeReport> {
        let mut report = ArrangeReport {
            dry_run: self.config.dry_run,
            ..ArrangeReport::default()
        };

        let icons = positioner.list_icon_positions()?;
        let mut claimed = HashSet::new();
        for placed in self.plan_layout(items) {
            let index = match find_icon(&icons, &placed.name, &claimed) {
                Some(index) => index,
                None => {
                    warn!("No desktop icon found for {}", placed.name);
                    report.unresolved.push(placed.name);
                    continue;
                }
            };
            claimed.insert(index);

            if report.dry_run {
                info!("[DRY RUN] Would place {} at ({}, {})", placed.name, placed.x, placed.y);
            } else if let Err(e) = positioner.set_icon_position(index, placed.x, placed.y) {
                error!("Could not position {}: {}", placed.name, e);
                report.failed.push(placed.name);
                continue;
            }
            report.placed.push(placed);
        }

        if !report.dry_run {
            positioner.refresh()?;
        }
        info!(
            "Arranged {} icons ({} unresolved, {} failed)",
            report.placed.len(),
            report.unresolved.len(),
            report.failed.len()
        );
        Ok(report)
    }
}

/// `folder/name`, or `folder/stem_N.ext` with the first free N
pub fn unique_destination(folder: &Path, name: &str) -> PathBuf {
    let candidate = folder.join(name);
    if !candidate.exists() {
        return candidate;
    }

    let (stem, extension) = split_extension(name);
    let mut counter = 1u32;
    loop {
        let candidate = folder.join(format!("{}_{}{}", stem, counter, extension));
        if !candidate.exists() {
            return candidate;
        }
        counter += 1;
    }
}

/// A folder whose own name is its category would be moved into itself
fn is_in_place(entry: &ClassifiedItem) -> bool {
    entry.item.is_folder && entry.item.name.eq_ignore_ascii_case(&entry.category)
}

fn is_empty_dir(path: &Path) -> bool {
    fs::read_dir(path).map_or(false, |mut entries| entries.next().is_none())
}

/// Recursively copy a folder
fn copy_tree(source: &Path, target: &Path) -> std::io::Result<()> {
    for entry in WalkDir::new(source) {
        let entry = entry?;
        let relative = entry
            .path()
            .strip_prefix(source)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;
        let destination = target.join(relative);

        if entry.file_type().is_dir() {
            fs::create_dir_all(&destination)?;
        } else {
            fs::copy(entry.path(), &destination)?;
        }
    }
    Ok(())
}
