// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Purpose-based classification of desktop items
//!
//! Files are placed by an exact signal first (their extension), then by a
//! weighted keyword score over the name, then by MIME family. Shortcuts are
//! scored on their own name together with the name of the program they point
//! at. Folders are placed by keywords in their name, then by the dominant
//! category of the files directly inside them.

pub mod mime;
pub mod shortcut;

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;
use tracing::debug;

use crate::config::{AppConfig, CategoryRule, CategoryTable, FOLDERS_CATEGORY, OTHER_CATEGORY};

/// Extensions that only count as an exact signal when the name also carries
/// one of the category's keywords
const GATED_EXTENSIONS: [&str; 2] = [".exe", ".msi"];

const SHORTCUT_EXTENSION: &str = ".lnk";

/// Keyword scores are kept in half points: 2 per substring hit, 1 more for a
/// whole-word hit
const SUBSTRING_POINTS: u32 = 2;
const WHOLE_WORD_POINTS: u32 = 1;

/// A folder inherits a category when strictly more than 3/5 of its files
/// share it
const MAJORITY_NUMERATOR: usize = 3;
const MAJORITY_DENOMINATOR: usize = 5;

/// Everything the classifier needs to know about one desktop entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemDescriptor {
    /// File or folder name as shown on the desktop
    pub name: String,
    pub path: PathBuf,
    pub is_folder: bool,
    /// Lowercase extension with leading dot, empty for folders
    pub extension: String,
    /// Lowercase name without the extension
    pub stem: String,
    /// Target path of a `.lnk` shortcut, when it could be resolved
    pub shortcut_target: Option<String>,
    /// Categories of the folder's direct files, when they could be read
    pub child_summary: Option<ChildSummary>,
}

impl ItemDescriptor {
    /// Describe a file from its name
    pub fn file(name: impl Into<String>) -> Self {
        let name = name.into();
        let (stem, extension) = split_extension(&name);
        Self {
            stem: stem.to_lowercase(),
            extension: extension.to_lowercase(),
            path: PathBuf::from(&name),
            name,
            is_folder: false,
            shortcut_target: None,
            child_summary: None,
        }
    }

    /// Describe a folder from its name
    pub fn folder(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            stem: name.to_lowercase(),
            extension: String::new(),
            path: PathBuf::from(&name),
            name,
            is_folder: true,
            shortcut_target: None,
            child_summary: None,
        }
    }

    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = path.into();
        self
    }

    pub fn with_shortcut_target(mut self, target: Option<String>) -> Self {
        self.shortcut_target = target;
        self
    }

    pub fn with_child_summary(mut self, summary: Option<ChildSummary>) -> Self {
        self.child_summary = summary;
        self
    }

    pub fn is_shortcut(&self) -> bool {
        !self.is_folder && self.extension == SHORTCUT_EXTENSION
    }
}

/// Split `name` into stem and extension the way a path suffix works: the
/// last dot starts the extension unless it is the first character.
pub fn split_extension(name: &str) -> (&str, &str) {
    match name.rfind('.') {
        Some(idx) if idx > 0 && idx + 1 < name.len() => (&name[..idx], &name[idx..]),
        _ => (name, ""),
    }
}

/// Category tally of the files directly inside a folder
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChildSummary {
    counts: BTreeMap<String, usize>,
}

impl ChildSummary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, category: impl Into<String>) {
        *self.counts.entry(category.into()).or_insert(0) += 1;
    }

    pub fn counts(&self) -> &BTreeMap<String, usize> {
        &self.counts
    }

    pub fn total(&self) -> usize {
        self.counts.values().sum()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// The category held by strictly more than 60% of the files, if any
    pub fn dominant(&self) -> Option<&str> {
        let total = self.total();
        if total == 0 {
            return None;
        }

        let mut best: Option<(&str, usize)> = None;
        for (category, &count) in &self.counts {
            if best.map_or(true, |(_, c)| count > c) {
                best = Some((category.as_str(), count));
            }
        }

        best.filter(|&(_, count)| count * MAJORITY_DENOMINATOR > total * MAJORITY_NUMERATOR)
            .map(|(category, _)| category)
    }
}

impl FromIterator<String> for ChildSummary {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        let mut summary = Self::new();
        for category in iter {
            summary.add(category);
        }
        summary
    }
}

/// Which rule decided a classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchKind {
    Extension,
    Keyword,
    Shortcut,
    Mime,
    FolderName,
    FolderContents,
    SameNameGuard,
    Default,
}

impl fmt::Display for MatchKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            MatchKind::Extension => "extension",
            MatchKind::Keyword => "keyword score",
            MatchKind::Shortcut => "shortcut target",
            MatchKind::Mime => "MIME type",
            MatchKind::FolderName => "folder name",
            MatchKind::FolderContents => "content analysis",
            MatchKind::SameNameGuard => "same-name guard",
            MatchKind::Default => "default",
        };
        f.write_str(label)
    }
}

/// Category label plus the rule that produced it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Classification {
    pub category: String,
    pub kind: MatchKind,
}

impl Classification {
    fn new(category: impl Into<String>, kind: MatchKind) -> Self {
        Self {
            category: category.into(),
            kind,
        }
    }
}

/// Classifier over a fixed, ordered category table
#[derive(Debug, Clone)]
pub struct Classifier {
    table: CategoryTable,
}

impl Classifier {
    pub fn new(table: CategoryTable) -> Self {
        Self { table }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(config.categories.clone())
    }

    pub fn table(&self) -> &CategoryTable {
        &self.table
    }

    /// Category label for an item. Always non-empty.
    pub fn classify(&self, item: &ItemDescriptor) -> String {
        self.classify_detailed(item).category
    }

    /// Category label for an item together with the deciding rule
    pub fn classify_detailed(&self, item: &ItemDescriptor) -> Classification {
        let result = if item.is_folder {
            self.classify_folder(item)
        } else {
            self.classify_file(item)
        };

        debug!("Classified {} as {} by {}", item.name, result.category, result.kind);
        result
    }

    /// Classify the files among `children` and tally their categories.
    ///
    /// Sub-folders are ignored, so a folder's category depends on one level
    /// of contents only.
    pub fn summarize<'a, I>(&self, children: I) -> ChildSummary
    where
        I: IntoIterator<Item = &'a ItemDescriptor>,
    {
        children
            .into_iter()
            .filter(|child| !child.is_folder)
            .map(|child| self.classify_file(child).category)
            .collect()
    }

    fn classify_file(&self, item: &ItemDescriptor) -> Classification {
        if item.is_shortcut() {
            return self.classify_shortcut(item);
        }

        if let Some(rule) = self.match_extension(item) {
            return Classification::new(&rule.name, MatchKind::Extension);
        }

        if let Some(rule) = self.best_keyword_match(&item.stem) {
            return Classification::new(&rule.name, MatchKind::Keyword);
        }

        if let Some(class) = mime::mime_class(&item.extension) {
            return Classification::new(class.category(), MatchKind::Mime);
        }

        Classification::new(OTHER_CATEGORY, MatchKind::Default)
    }

    fn classify_shortcut(&self, item: &ItemDescriptor) -> Classification {
        let text = match item.shortcut_target.as_deref().map(target_stem) {
            Some(target) if !target.is_empty() => format!("{} {}", item.stem, target),
            _ => item.stem.clone(),
        };

        match self.best_keyword_match(&text) {
            Some(rule) => Classification::new(&rule.name, MatchKind::Shortcut),
            None => Classification::new(OTHER_CATEGORY, MatchKind::Default),
        }
    }

    fn classify_folder(&self, item: &ItemDescriptor) -> Classification {
        let name = item.name.to_lowercase();

        let result = if let Some(rule) = self.match_folder_name(&name) {
            Classification::new(&rule.name, MatchKind::FolderName)
        } else if let Some(category) = item.child_summary.as_ref().and_then(ChildSummary::dominant) {
            Classification::new(category, MatchKind::FolderContents)
        } else {
            Classification::new(FOLDERS_CATEGORY, MatchKind::Default)
        };

        // A folder must not end up inside a category folder of its own name
        if result.kind != MatchKind::Default && result.category.to_lowercase() == name {
            return Classification::new(FOLDERS_CATEGORY, MatchKind::SameNameGuard);
        }
        result
    }

    fn match_extension(&self, item: &ItemDescriptor) -> Option<&CategoryRule> {
        if item.extension.is_empty() {
            return None;
        }

        let gated = GATED_EXTENSIONS.contains(&item.extension.as_str());
        self.table.iter().find(|rule| {
            rule.has_extension(&item.extension)
                && (!gated || rule.keywords.iter().any(|k| !k.is_empty() && item.stem.contains(k.as_str())))
        })
    }

    fn match_folder_name(&self, name: &str) -> Option<&CategoryRule> {
        self.table
            .iter()
            .find(|rule| rule.keywords.iter().any(|k| !k.is_empty() && name.contains(k.as_str())))
    }

    /// Highest-scoring category for `text`; earlier categories win ties
    fn best_keyword_match(&self, text: &str) -> Option<&CategoryRule> {
        let mut best: Option<(&CategoryRule, u32)> = None;
        for rule in &self.table {
            let score = keyword_score(rule, text);
            if score > best.map_or(0, |(_, s)| s) {
                best = Some((rule, score));
            }
        }
        best.map(|(rule, _)| rule)
    }

    /// Keyword score of every category for `text`, in table order
    pub fn scores(&self, text: &str) -> Vec<(&str, f64)> {
        let text = text.to_lowercase();
        self.table
            .iter()
            .map(|rule| (rule.name.as_str(), f64::from(keyword_score(rule, &text)) / f64::from(SUBSTRING_POINTS)))
            .collect()
    }
}

/// Half-point keyword score of one category against lowercase `text`
fn keyword_score(rule: &CategoryRule, text: &str) -> u32 {
    let mut score = 0;
    for keyword in &rule.keywords {
        if keyword.is_empty() || !text.contains(keyword.as_str()) {
            continue;
        }
        score += SUBSTRING_POINTS;
        if is_whole_word(keyword, text) {
            score += WHOLE_WORD_POINTS;
        }
    }
    score
}

fn is_whole_word(keyword: &str, text: &str) -> bool {
    text == keyword
        || text.contains(&format!("{} ", keyword))
        || text.contains(&format!(" {}", keyword))
}

/// Lowercase file stem of a shortcut target, which may use either separator
fn target_stem(target: &str) -> String {
    let file_name = target.rsplit(['/', '\\']).next().unwrap_or(target);
    split_extension(file_name).0.to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> CategoryTable {
        CategoryTable::new(vec![
            CategoryRule::new("Documents", [".pdf", ".docx", ".exe"], ["report", "manual"]),
            CategoryRule::new("Images", [".jpg", ".png"], ["photo", "screenshot"]),
            CategoryRule::new("Games", Vec::<&str>::new(), ["steam", "game"]),
            CategoryRule::new("Gaming Tools", Vec::<&str>::new(), ["obs", "game"]),
            CategoryRule::new("Installers", [".msi"], ["setup"]),
        ])
    }

    fn classifier() -> Classifier {
        Classifier::new(table())
    }

    fn summary(entries: &[(&str, usize)]) -> ChildSummary {
        let mut summary = ChildSummary::new();
        for &(category, count) in entries {
            for _ in 0..count {
                summary.add(category);
            }
        }
        summary
    }

    #[test]
    fn test_split_extension() {
        assert_eq!(split_extension("vacation.jpg"), ("vacation", ".jpg"));
        assert_eq!(split_extension("archive.tar.gz"), ("archive.tar", ".gz"));
        assert_eq!(split_extension(".bashrc"), (".bashrc", ""));
        assert_eq!(split_extension("README"), ("README", ""));
        assert_eq!(split_extension("trailing."), ("trailing.", ""));
    }

    #[test]
    fn test_extension_wins_without_keywords() {
        let result = classifier().classify_detailed(&ItemDescriptor::file("vacation.JPG"));
        assert_eq!(result.category, "Images");
        assert_eq!(result.kind, MatchKind::Extension);
    }

    #[test]
    fn test_extension_beats_other_keywords() {
        // "report" belongs to Documents but the extension is an exact signal
        assert_eq!(classifier().classify(&ItemDescriptor::file("report.png")), "Images");
    }

    #[test]
    fn test_exe_needs_category_keyword() {
        let c = classifier();
        assert_eq!(c.classify(&ItemDescriptor::file("report_tool.exe")), "Documents");

        let random = c.classify_detailed(&ItemDescriptor::file("random.exe"));
        assert_ne!(random.kind, MatchKind::Extension);
        assert_eq!(random.category, OTHER_CATEGORY);
    }

    #[test]
    fn test_gated_exe_falls_through_to_scoring() {
        let result = classifier().classify_detailed(&ItemDescriptor::file("steam_helper.exe"));
        assert_eq!(result.category, "Games");
        assert_eq!(result.kind, MatchKind::Keyword);
    }

    #[test]
    fn test_msi_gating_uses_the_listing_category() {
        let c = classifier();
        assert_eq!(c.classify(&ItemDescriptor::file("setup_x64.msi")), "Installers");
        assert_eq!(c.classify(&ItemDescriptor::file("package.msi")), OTHER_CATEGORY);
    }

    #[test]
    fn test_keyword_tie_resolves_to_earlier_category() {
        // "game" scores equally for Games and Gaming Tools
        let result = classifier().classify_detailed(&ItemDescriptor::file("game"));
        assert_eq!(result.category, "Games");
        assert_eq!(result.kind, MatchKind::Keyword);
    }

    #[test]
    fn test_more_keywords_beat_table_order() {
        assert_eq!(classifier().classify(&ItemDescriptor::file("obs game capture")), "Gaming Tools");
    }

    #[test]
    fn test_whole_word_bonus() {
        let c = classifier();
        let scores = c.scores("steam library");
        assert_eq!(scores[2], ("Games", 1.5));

        let scores = c.scores("steamworks");
        assert_eq!(scores[2], ("Games", 1.0));

        let scores = c.scores("STEAM");
        assert_eq!(scores[2], ("Games", 1.5));
    }

    #[test]
    fn test_whole_word_bonus_breaks_substring_tie() {
        let table = CategoryTable::new(vec![
            CategoryRule::new("First", Vec::<&str>::new(), ["note"]),
            CategoryRule::new("Second", Vec::<&str>::new(), ["pad"]),
        ]);
        let c = Classifier::new(table);
        assert_eq!(c.classify(&ItemDescriptor::file("notepad")), "First");
        assert_eq!(c.classify(&ItemDescriptor::file("notebook pad")), "Second");
    }

    #[test]
    fn test_mime_fallback() {
        let c = classifier();
        let video = c.classify_detailed(&ItemDescriptor::file("holiday.webm"));
        assert_eq!(video.category, "Media Tools");
        assert_eq!(video.kind, MatchKind::Mime);
        assert_eq!(c.classify(&ItemDescriptor::file("todo.txt")), "Coding Tools");
    }

    #[test]
    fn test_unmatched_and_empty_names_default_to_other() {
        let c = classifier();
        assert_eq!(c.classify(&ItemDescriptor::file("zzz")), OTHER_CATEGORY);
        assert_eq!(c.classify(&ItemDescriptor::file("")), OTHER_CATEGORY);
        assert_eq!(c.classify(&ItemDescriptor::file(".hidden")), OTHER_CATEGORY);
        assert_eq!(c.classify(&ItemDescriptor::file("blob.qqqzz")), OTHER_CATEGORY);
    }

    #[test]
    fn test_empty_table_is_total() {
        let c = Classifier::new(CategoryTable::new(Vec::new()));
        assert_eq!(c.classify(&ItemDescriptor::file("anything.bin")), OTHER_CATEGORY);
        assert_eq!(c.classify(&ItemDescriptor::folder("Anything")), FOLDERS_CATEGORY);
    }

    #[test]
    fn test_shortcut_scores_name_and_target() {
        let c = classifier();
        let item = ItemDescriptor::file("Launcher.lnk")
            .with_shortcut_target(Some(r"C:\Program Files (x86)\Steam\steam.exe".to_string()));
        let result = c.classify_detailed(&item);
        assert_eq!(result.category, "Games");
        assert_eq!(result.kind, MatchKind::Shortcut);
    }

    #[test]
    fn test_shortcut_without_target_uses_own_name() {
        let c = classifier();
        assert_eq!(c.classify(&ItemDescriptor::file("OBS Studio.lnk")), "Gaming Tools");
        assert_eq!(c.classify(&ItemDescriptor::file("Unknown.lnk")), OTHER_CATEGORY);
    }

    #[test]
    fn test_shortcut_skips_extension_and_mime() {
        let table = CategoryTable::new(vec![CategoryRule::new("Links", [".lnk"], ["zzz"])]);
        let c = Classifier::new(table);
        assert_eq!(c.classify(&ItemDescriptor::file("Thing.lnk")), OTHER_CATEGORY);
    }

    #[test]
    fn test_target_stem() {
        assert_eq!(target_stem(r"C:\Tools\Wireshark.exe"), "wireshark");
        assert_eq!(target_stem("/usr/bin/nmap"), "nmap");
        assert_eq!(target_stem(""), "");
    }

    #[test]
    fn test_folder_name_keyword() {
        let result = classifier().classify_detailed(&ItemDescriptor::folder("Old Screenshots"));
        assert_eq!(result.category, "Images");
        assert_eq!(result.kind, MatchKind::FolderName);
    }

    #[test]
    fn test_folder_name_match_takes_first_category() {
        // Both Games and Gaming Tools list "game"; table order decides
        assert_eq!(classifier().classify(&ItemDescriptor::folder("My Games")), "Games");
    }

    #[test]
    fn test_same_name_guard() {
        let c = classifier();
        let by_contents = ItemDescriptor::folder("Images")
            .with_child_summary(Some(summary(&[("Images", 5)])));
        let result = c.classify_detailed(&by_contents);
        assert_eq!(result.category, FOLDERS_CATEGORY);
        assert_eq!(result.kind, MatchKind::SameNameGuard);

        let by_name = ItemDescriptor::folder("GAMES")
            .with_child_summary(Some(summary(&[("Images", 5)])));
        assert_eq!(c.classify(&by_name), FOLDERS_CATEGORY);
    }

    #[test]
    fn test_folder_majority() {
        let c = classifier();
        let item = ItemDescriptor::folder("Stuff")
            .with_child_summary(Some(summary(&[("Images", 7), ("Documents", 3)])));
        let result = c.classify_detailed(&item);
        assert_eq!(result.category, "Images");
        assert_eq!(result.kind, MatchKind::FolderContents);
    }

    #[test]
    fn test_folder_at_threshold_does_not_inherit() {
        let c = classifier();
        let item = ItemDescriptor::folder("Stuff")
            .with_child_summary(Some(summary(&[("Images", 6), ("Documents", 4)])));
        assert_eq!(c.classify(&item), FOLDERS_CATEGORY);

        let item = ItemDescriptor::folder("Stuff")
            .with_child_summary(Some(summary(&[("Images", 3), ("Documents", 2)])));
        assert_eq!(c.classify(&item), FOLDERS_CATEGORY);
    }

    #[test]
    fn test_empty_or_unreadable_folder() {
        let c = classifier();
        let empty = ItemDescriptor::folder("Stuff").with_child_summary(Some(ChildSummary::new()));
        assert_eq!(c.classify(&empty), FOLDERS_CATEGORY);

        let unreadable = ItemDescriptor::folder("Stuff");
        assert_eq!(c.classify(&unreadable), FOLDERS_CATEGORY);
    }

    #[test]
    fn test_summarize_ignores_subfolders() {
        let c = classifier();
        let children = vec![
            ItemDescriptor::file("a.jpg"),
            ItemDescriptor::file("b.png"),
            ItemDescriptor::file("c.jpg"),
            ItemDescriptor::folder("Nested Reports"),
            ItemDescriptor::folder("More Reports"),
        ];
        let summary = c.summarize(&children);
        assert_eq!(summary.total(), 3);
        assert_eq!(summary.dominant(), Some("Images"));
    }

    #[test]
    fn test_classification_is_deterministic() {
        let c = classifier();
        let item = ItemDescriptor::file("obs game capture");
        assert_eq!(c.classify(&item), c.classify(&item));
    }
}
