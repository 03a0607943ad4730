// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Desktop scanning and item descriptors

use glob::{MatchOptions, Pattern};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::classifier::shortcut::resolve_shortcut_target;
use crate::classifier::{Classifier, ItemDescriptor};
use crate::config::AppConfig;
use crate::{OrganizerError, Result};

const TEMP_EXTENSIONS: [&str; 5] = [".tmp", ".part", ".crdownload", ".partial", ".download"];

const IGNORE_MATCH: MatchOptions = MatchOptions {
    case_sensitive: false,
    require_literal_separator: false,
    require_literal_leading_dot: false,
};

/// Lists desktop entries and turns them into [`ItemDescriptor`]s
#[derive(Debug, Clone)]
pub struct Scanner {
    desktop: PathBuf,
    ignore: Vec<Pattern>,
}

impl Scanner {
    /// Create a scanner; fails only on an invalid ignore pattern
    pub fn new(desktop: PathBuf, ignore_patterns: &[String]) -> Result<Self> {
        let ignore = ignore_patterns
            .iter()
            .map(|p| Pattern::new(p))
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(Self { desktop, ignore })
    }

    pub fn from_config(config: &AppConfig) -> Result<Self> {
        Self::new(config.desktop(), &config.ignore_files)
    }

    pub fn desktop(&self) -> &Path {
        &self.desktop
    }

    /// Check if a desktop entry should be considered at all
    pub fn should_process(&self, path: &Path) -> bool {
        let filename = match path.file_name().and_then(|n| n.to_str()) {
            Some(n) => n,
            None => return false,
        };

        // Skip hidden files
        if filename.starts_with('.') {
            return false;
        }

        // Skip partial downloads
        let lower = filename.to_lowercase();
        if TEMP_EXTENSIONS.iter().any(|ext| lower.ends_with(ext)) {
            return false;
        }

        !self.ignore.iter().any(|p| p.matches_with(filename, IGNORE_MATCH))
    }

    /// Immediate entries of the desktop, sorted by name
    pub fn scan(&self) -> Result<Vec<PathBuf>> {
        if !self.desktop.is_dir() {
            return Err(OrganizerError::DesktopNotFound(self.desktop.clone()));
        }

        let mut items: Vec<PathBuf> = std::fs::read_dir(&self.desktop)?
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .filter(|p| self.should_process(p))
            .collect();
        items.sort();

        info!("Found {} items on desktop", items.len());
        Ok(items)
    }

    /// Build the descriptor for one desktop entry.
    ///
    /// Shortcuts get their target resolved. Folders get a category tally of
    /// their direct files; an unreadable folder is left without one.
    pub fn describe(&self, path: &Path, classifier: &Classifier) -> ItemDescriptor {
        if !path.is_dir() {
            return describe_file(path);
        }

        let folder = ItemDescriptor::folder(file_name(path)).with_path(path);
        match self.read_children(path) {
            Ok(children) => {
                let summary = classifier.summarize(&children);
                debug!("Folder {:?} holds {} files", path, summary.total());
                folder.with_child_summary(Some(summary))
            }
            Err(e) => {
                warn!("Could not analyze folder contents for {:?}: {}", path, e);
                folder
            }
        }
    }

    /// Direct children of a folder; empty when the folder cannot be read
    pub fn list_children(&self, folder: &Path) -> Vec<ItemDescriptor> {
        self.read_children(folder).unwrap_or_else(|e| {
            warn!("Could not list {:?}: {}", folder, e);
            Vec::new()
        })
    }

    fn read_children(&self, folder: &Path) -> std::io::Result<Vec<ItemDescriptor>> {
        let mut children = Vec::new();
        for entry in std::fs::read_dir(folder)? {
            let path = entry?.path();
            if !self.should_process(&path) {
                continue;
            }
            if path.is_dir() {
                children.push(ItemDescriptor::folder(file_name(&path)).with_path(path));
            } else {
                children.push(describe_file(&path));
            }
        }
        children.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(children)
    }
}

fn describe_file(path: &Path) -> ItemDescriptor {
    let item = ItemDescriptor::file(file_name(path)).with_path(path);
    if item.is_shortcut() {
        let target = resolve_shortcut_target(path);
        item.with_shortcut_target(target)
    } else {
        item
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}
