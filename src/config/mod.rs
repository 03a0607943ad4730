// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Configuration management for the desktop organizer
//!
//! The configuration is a JSON document. Every field has a built-in default,
//! so a partial document (or no document at all) still yields a complete
//! [`AppConfig`]. Keys that are present override the defaults.

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::{OrganizerError, Result};

/// Category assigned to folders that match nothing, or that share a name
/// with the category they would land in.
pub const FOLDERS_CATEGORY: &str = "Folders";

/// Category assigned to anything the table cannot place.
pub const OTHER_CATEGORY: &str = "Other";

/// Main application configuration
#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct AppConfig {
    /// Desktop folder to organize (defaults to the user's desktop)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub desktop_path: Option<PathBuf>,

    /// Ordered category table
    #[serde(default)]
    pub categories: CategoryTable,

    /// Glob patterns for desktop entries that are never touched
    #[serde(default = "default_ignore_files")]
    pub ignore_files: Vec<String>,

    /// Log intended moves without performing them
    #[serde(default = "default_true")]
    pub dry_run: bool,

    /// Copy the desktop into the backup directory before moving anything
    #[serde(default = "default_true")]
    pub create_backup: bool,

    /// Prompt before organizing
    #[serde(default = "default_true")]
    pub ask_confirmation: bool,

    #[serde(default = "default_backup_dir")]
    pub backup_dir: PathBuf,

    #[serde(default = "default_history_file")]
    pub history_file: PathBuf,

    /// Where the plan positioner writes the computed icon layout
    #[serde(default = "default_layout_file")]
    pub layout_file: PathBuf,

    /// Icon grid settings
    #[serde(default)]
    pub grid_layout: GridConfig,
}

/// Icon grid settings
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct GridConfig {
    /// Arrange items on the grid instead of moving them into folders
    #[serde(default)]
    pub enabled: bool,
    /// Position folders as well as files
    #[serde(default = "default_true")]
    pub include_folders: bool,
    #[serde(default = "default_cell_width")]
    pub cell_width: u32,
    #[serde(default = "default_cell_height")]
    pub cell_height: u32,
    #[serde(default = "default_start")]
    pub start_x: u32,
    #[serde(default = "default_start")]
    pub start_y: u32,
    #[serde(default = "default_max_columns")]
    pub max_columns_per_category: u32,
    #[serde(default = "default_spacing_x")]
    pub category_spacing_x: u32,
    #[serde(default = "default_spacing_y")]
    pub category_spacing_y: u32,
    /// Visual order of the category blocks, three per row
    #[serde(default = "default_category_order")]
    pub category_order: Vec<String>,
}

/// One entry of the category table.
///
/// Extensions are stored lowercase with a leading dot, keywords lowercase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryRule {
    pub name: String,
    pub extensions: Vec<String>,
    pub keywords: Vec<String>,
}

impl CategoryRule {
    /// Build a rule, normalising extensions and keywords
    pub fn new<E, K>(name: impl Into<String>, extensions: E, keywords: K) -> Self
    where
        E: IntoIterator,
        E::Item: AsRef<str>,
        K: IntoIterator,
        K::Item: AsRef<str>,
    {
        let mut exts: Vec<String> = Vec::new();
        for ext in extensions {
            let ext = ext.as_ref().trim().to_lowercase();
            if ext.is_empty() || ext == "." {
                continue;
            }
            let ext = if ext.starts_with('.') { ext } else { format!(".{}", ext) };
            if !exts.contains(&ext) {
                exts.push(ext);
            }
        }

        let mut words: Vec<String> = Vec::new();
        for keyword in keywords {
            let keyword = keyword.as_ref().trim().to_lowercase();
            if !keyword.is_empty() && !words.contains(&keyword) {
                words.push(keyword);
            }
        }

        Self {
            name: name.into(),
            extensions: exts,
            keywords: words,
        }
    }

    pub fn has_extension(&self, extension: &str) -> bool {
        self.extensions.iter().any(|e| e == extension)
    }
}

/// Ordered category table. Iteration order decides every tie.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryTable {
    rules: Vec<CategoryRule>,
}

impl CategoryTable {
    /// Build a table; a repeated name replaces the earlier rule in place
    pub fn new(rules: Vec<CategoryRule>) -> Self {
        let mut table = Self { rules: Vec::with_capacity(rules.len()) };
        for rule in rules {
            table.insert(rule);
        }
        table
    }

    fn insert(&mut self, rule: CategoryRule) {
        match self.rules.iter_mut().find(|r| r.name == rule.name) {
            Some(existing) => *existing = rule,
            None => self.rules.push(rule),
        }
    }

    pub fn rules(&self) -> &[CategoryRule] {
        &self.rules
    }

    pub fn iter(&self) -> std::slice::Iter<'_, CategoryRule> {
        self.rules.iter()
    }

    pub fn get(&self, name: &str) -> Option<&CategoryRule> {
        self.rules.iter().find(|r| r.name == name)
    }

    pub fn names(&self) -> Vec<&str> {
        self.rules.iter().map(|r| r.name.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// True if `name` is a label this table can produce, including the
    /// built-in fallbacks. Case-insensitive.
    pub fn is_category_label(&self, name: &str) -> bool {
        name.eq_ignore_ascii_case(FOLDERS_CATEGORY)
            || name.eq_ignore_ascii_case(OTHER_CATEGORY)
            || self.rules.iter().any(|r| r.name.eq_ignore_ascii_case(name))
    }
}

impl<'a> IntoIterator for &'a CategoryTable {
    type Item = &'a CategoryRule;
    type IntoIter = std::slice::Iter<'a, CategoryRule>;

    fn into_iter(self) -> Self::IntoIter {
        self.rules.iter()
    }
}

#[derive(Deserialize, Serialize, Default)]
struct RuleBody {
    #[serde(default)]
    extensions: Vec<String>,
    #[serde(default)]
    keywords: Vec<String>,
}

impl<'de> Deserialize<'de> for CategoryTable {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        struct TableVisitor;

        impl<'de> Visitor<'de> for TableVisitor {
            type Value = CategoryTable;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of category name to extensions and keywords")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> std::result::Result<Self::Value, A::Error> {
                // Entries arrive in document order, which is the table order
                let mut rules = Vec::new();
                while let Some((name, body)) = map.next_entry::<String, RuleBody>()? {
                    rules.push(CategoryRule::new(name, body.extensions, body.keywords));
                }
                Ok(CategoryTable::new(rules))
            }
        }

        deserializer.deserialize_map(TableVisitor)
    }
}

impl Serialize for CategoryTable {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.rules.len()))?;
        for rule in &self.rules {
            let body = RuleBody {
                extensions: rule.extensions.clone(),
                keywords: rule.keywords.clone(),
            };
            map.serialize_entry(&rule.name, &body)?;
        }
        map.end()
    }
}

// Default value functions
fn default_true() -> bool { true }
fn default_backup_dir() -> PathBuf { PathBuf::from("backups") }
fn default_history_file() -> PathBuf { PathBuf::from("desktop_organizer_history.jsonl") }
fn default_layout_file() -> PathBuf { PathBuf::from("desktop_layout.json") }
fn default_cell_width() -> u32 { 80 }
fn default_cell_height() -> u32 { 90 }
fn default_start() -> u32 { 20 }
fn default_max_columns() -> u32 { 4 }
fn default_spacing_x() -> u32 { 360 }
fn default_spacing_y() -> u32 { 300 }

fn default_ignore_files() -> Vec<String> {
    vec![".DS_Store", "Thumbs.db", "desktop.ini"]
        .into_iter().map(String::from).collect()
}

fn default_category_order() -> Vec<String> {
    vec![
        "Gaming Tools", "Games", "Media Tools",
        "Coding Tools", "Hacking Tools", "Work Tools",
        "Computer System", "Documents", "Images",
        "Archives", "Folders", "Other",
    ].into_iter().map(String::from).collect()
}

impl Default for CategoryTable {
    fn default() -> Self {
        Self::new(vec![
            CategoryRule::new(
                "Gaming Tools",
                Vec::<&str>::new(),
                ["obs", "trackir", "stream deck", "discord", "gyazo", "streamlabs", "overlay", "capture"],
            ),
            CategoryRule::new(
                "Games",
                Vec::<&str>::new(),
                ["steam", "epic games", "ubisoft", "battle.net", "gog galaxy", "riot", "minecraft", "launcher", "game"],
            ),
            CategoryRule::new(
                "Media Tools",
                [".mp3", ".wav", ".flac", ".aac", ".ogg", ".mp4", ".mkv", ".mov", ".avi", ".wmv"],
                ["chrome", "firefox", "acrobat", "spotify", "vlc", "player", "music", "video"],
            ),
            CategoryRule::new(
                "Coding Tools",
                [".py", ".js", ".ts", ".rs", ".go", ".java", ".c", ".cpp", ".html", ".css", ".sh", ".ps1"],
                ["visual studio", "code", "docker", "terminal", "cygwin", "git", "python", "node", "script"],
            ),
            CategoryRule::new(
                "Hacking Tools",
                [".pcap", ".pcapng"],
                ["wireshark", "nmap", "burp", "metasploit", "ghidra", "hashcat", "kali"],
            ),
            CategoryRule::new(
                "Work Tools",
                Vec::<&str>::new(),
                ["nordvpn", "vpn", "teamviewer", "virtualbox", "vmware", "zoom", "teams", "slack", "outlook", "remote"],
            ),
            CategoryRule::new(
                "Computer System",
                [".exe", ".msi", ".bat", ".reg"],
                ["nvidia", "logitech", "driver", "setup", "installer", "control panel", "recycle", "settings"],
            ),
            CategoryRule::new(
                "Documents",
                [".pdf", ".doc", ".docx", ".txt", ".rtf", ".odt", ".md", ".xls", ".xlsx", ".csv", ".ppt", ".pptx"],
                ["document", "paper", "report", "manual", "resume", "invoice", "notes"],
            ),
            CategoryRule::new(
                "Images",
                [".jpg", ".jpeg", ".png", ".gif", ".bmp", ".tiff", ".svg", ".webp"],
                ["screenshot", "image", "picture", "wallpaper", "photo"],
            ),
            CategoryRule::new(
                "Archives",
                [".zip", ".rar", ".7z", ".tar", ".gz"],
                ["archive", "backup", "compressed"],
            ),
        ])
    }
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            include_folders: true,
            cell_width: default_cell_width(),
            cell_height: default_cell_height(),
            start_x: default_start(),
            start_y: default_start(),
            max_columns_per_category: default_max_columns(),
            category_spacing_x: default_spacing_x(),
            category_spacing_y: default_spacing_y(),
            category_order: default_category_order(),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            desktop_path: None,
            categories: CategoryTable::default(),
            ignore_files: default_ignore_files(),
            dry_run: true,
            create_backup: true,
            ask_confirmation: true,
            backup_dir: default_backup_dir(),
            history_file: default_history_file(),
            layout_file: default_layout_file(),
            grid_layout: GridConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from a JSON file.
    ///
    /// Never fails: a missing file yields the defaults, and an unreadable or
    /// malformed one is logged and replaced by the defaults as a whole.
    pub fn load(path: &Path) -> Self {
        if !path.exists() {
            info!("Config file not found at {:?}, using defaults", path);
            return Self::default();
        }

        match Self::load_strict(path) {
            Ok(config) => config,
            Err(e) => {
                warn!("Error loading config {:?}: {}. Using defaults.", path, e);
                Self::default()
            }
        }
    }

    /// Load configuration, reporting read and parse failures
    pub fn load_strict(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Parse a configuration document, filling missing keys from defaults
    pub fn from_json(content: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(content)
            .map_err(|e| OrganizerError::Config(format!("Failed to parse config: {}", e)))?;
        Ok(config.normalized())
    }

    /// Save configuration to a JSON file
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Desktop folder this run operates on
    pub fn desktop(&self) -> PathBuf {
        if let Some(ref path) = self.desktop_path {
            return path.clone();
        }
        dirs::desktop_dir()
            .or_else(|| dirs::home_dir().map(|home| home.join("Desktop")))
            .unwrap_or_else(|| PathBuf::from("Desktop"))
    }

    fn normalized(mut self) -> Self {
        if self.grid_layout.max_columns_per_category == 0 {
            warn!("gridLayout.maxColumnsPerCategory must be at least 1, using 1");
            self.grid_layout.max_columns_per_category = 1;
        }
        self
    }
}
