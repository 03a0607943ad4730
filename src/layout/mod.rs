// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Grid coordinates for category blocks of desktop icons
//!
//! Category blocks are laid out three per row in `categoryOrder`. Inside a
//! block, icons fill `maxColumnsPerCategory` columns and then wrap. Categories
//! missing from the order all share the slot right after the last known one.

pub mod positioner;

use serde::Serialize;
use std::collections::BTreeMap;

use crate::config::GridConfig;

/// Category blocks per grid row
pub const CATEGORIES_PER_ROW: u32 = 3;

// Bucket size used by the text rendering of a layout
const ASCII_CELL: u32 = 100;
const ASCII_COLUMN_WIDTH: usize = 10;
const ASCII_LABEL_CHARS: usize = 8;
// Items placed beyond this many buckets are left out of the picture
const ASCII_MAX_ROWS: u32 = 60;
const ASCII_MAX_COLUMNS: u32 = 30;

/// Pure grid-coordinate calculator
#[derive(Debug, Clone)]
pub struct GridLayout {
    config: GridConfig,
}

/// One item with its computed screen position
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlacedItem {
    pub name: String,
    pub category: String,
    /// Position of the item within its category block
    pub index: u32,
    pub x: u32,
    pub y: u32,
}

impl GridLayout {
    pub fn new(config: GridConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &GridConfig {
        &self.config
    }

    /// Slot of a category block; unknown categories go after all known ones
    pub fn category_index(&self, category: &str) -> u32 {
        let order = &self.config.category_order;
        let index = order.iter().position(|c| c == category).unwrap_or(order.len());
        u32::try_from(index).unwrap_or(u32::MAX)
    }

    /// Screen position of the `index`-th item of `category`
    pub fn position(&self, category: &str, index: u32) -> (u32, u32) {
        let c = &self.config;
        let columns = c.max_columns_per_category.max(1);

        let category_index = self.category_index(category);
        let category_row = category_index / CATEGORIES_PER_ROW;
        let category_col = category_index % CATEGORIES_PER_ROW;

        let base_x = c.start_x.saturating_add(category_col.saturating_mul(c.category_spacing_x));
        let base_y = c.start_y.saturating_add(category_row.saturating_mul(c.category_spacing_y));

        let item_row = index / columns;
        let item_col = index % columns;

        (
            base_x.saturating_add(item_col.saturating_mul(c.cell_width)),
            base_y.saturating_add(item_row.saturating_mul(c.cell_height)),
        )
    }

    /// Place `(name, category)` pairs, numbering items per category in
    /// input order
    pub fn plan<'a, I>(&self, items: I) -> Vec<PlacedItem>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut next_index: BTreeMap<&str, u32> = BTreeMap::new();
        let mut placed = Vec::new();

        for (name, category) in items {
            let slot = next_index.entry(category).or_insert(0);
            let index = *slot;
            *slot = slot.saturating_add(1);

            let (x, y) = self.position(category, index);
            placed.push(PlacedItem {
                name: name.to_string(),
                category: category.to_string(),
                index,
                x,
                y,
            });
        }

        placed
    }
}

/// Rough text picture of a layout, one character column per 10 px.
///
/// The picture covers at most `ASCII_MAX_COLUMNS` x `ASCII_MAX_ROWS` buckets
/// of 100 px; items further out are clipped.
pub fn render_ascii(plan: &[PlacedItem]) -> String {
    let mut grid: BTreeMap<u32, BTreeMap<u32, String>> = BTreeMap::new();
    for item in plan {
        let (row, column) = (item.y / ASCII_CELL, item.x / ASCII_CELL);
        if row >= ASCII_MAX_ROWS || column >= ASCII_MAX_COLUMNS {
            continue;
        }
        let label: String = item.name.chars().take(ASCII_LABEL_CHARS).collect();
        grid.entry(row).or_default().insert(column, label);
    }

    let max_y = match grid.keys().next_back() {
        Some(&y) => y,
        None => return String::new(),
    };
    let max_x = grid.values()
        .filter_map(|row| row.keys().next_back().copied())
        .max()
        .unwrap_or(0);

    let mut lines = Vec::new();
    for y in 0..=max_y {
        let mut line = String::new();
        for x in 0..=max_x {
            let cell = grid.get(&y).and_then(|row| row.get(&x)).map(String::as_str).unwrap_or("");
            line.push_str(&format!("{:<width$}", cell, width = ASCII_COLUMN_WIDTH));
        }
        lines.push(line.trim_end().to_string());
    }

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> GridConfig {
        GridConfig {
            enabled: true,
            include_folders: true,
            cell_width: 80,
            cell_height: 100,
            start_x: 20,
            start_y: 30,
            max_columns_per_category: 8,
            category_spacing_x: 700,
            category_spacing_y: 400,
            category_order: vec![
                "Gaming Tools".to_string(),
                "Games".to_string(),
                "Media Tools".to_string(),
                "Coding Tools".to_string(),
                "Work Tools".to_string(),
            ],
        }
    }

    #[test]
    fn test_first_category_origin() {
        let layout = GridLayout::new(config());
        assert_eq!(layout.position("Gaming Tools", 0), (20, 30));
    }

    #[test]
    fn test_category_blocks_three_per_row() {
        let layout = GridLayout::new(config());
        assert_eq!(layout.position("Games", 0), (720, 30));
        assert_eq!(layout.position("Media Tools", 0), (1420, 30));
        assert_eq!(layout.position("Coding Tools", 0), (20, 430));
        assert_eq!(layout.position("Work Tools", 0), (720, 430));
    }

    #[test]
    fn test_items_wrap_at_max_columns() {
        let layout = GridLayout::new(config());
        assert_eq!(layout.position("Gaming Tools", 7), (20 + 7 * 80, 30));
        assert_eq!(layout.position("Gaming Tools", 8), (20, 130));
        assert_eq!(layout.position("Gaming Tools", 17), (100, 230));
    }

    #[test]
    fn test_position_is_pure() {
        let layout = GridLayout::new(config());
        let first = layout.position("Coding Tools", 5);
        assert_eq!(first, layout.position("Coding Tools", 5));
        assert_eq!(first, (20 + 5 * 80, 430));
    }

    #[test]
    fn test_unknown_categories_share_next_slot() {
        let layout = GridLayout::new(config());
        // Five known categories, so unknown ones land at index 5: row 1, col 2
        assert_eq!(layout.category_index("Hacking Tools"), 5);
        assert_eq!(layout.position("Hacking Tools", 0), (1420, 430));
        assert_eq!(layout.position("Other", 0), layout.position("Hacking Tools", 0));
    }

    #[test]
    fn test_zero_columns_treated_as_one() {
        let mut cfg = config();
        cfg.max_columns_per_category = 0;
        let layout = GridLayout::new(cfg);
        assert_eq!(layout.position("Gaming Tools", 2), (20, 230));
    }

    #[test]
    fn test_plan_numbers_items_per_category() {
        let layout = GridLayout::new(config());
        let plan = layout.plan(vec![
            ("OBS Studio", "Gaming Tools"),
            ("Steam", "Games"),
            ("TrackIR", "Gaming Tools"),
            ("Epic Games", "Games"),
        ]);

        let indices: Vec<(&str, u32)> = plan.iter().map(|p| (p.name.as_str(), p.index)).collect();
        assert_eq!(indices, vec![("OBS Studio", 0), ("Steam", 0), ("TrackIR", 1), ("Epic Games", 1)]);
        assert_eq!((plan[2].x, plan[2].y), (100, 30));
        assert_eq!((plan[3].x, plan[3].y), (800, 30));
    }

    #[test]
    fn test_render_ascii() {
        let plan = vec![
            PlacedItem { name: "OBS Studio".into(), category: "A".into(), index: 0, x: 20, y: 30 },
            PlacedItem { name: "Steam".into(), category: "B".into(), index: 0, x: 210, y: 130 },
        ];
        let picture = render_ascii(&plan);
        let lines: Vec<&str> = picture.lines().collect();
        let second = format!("{:<20}Steam", "");
        assert_eq!(lines, vec!["OBS Stud", second.as_str()]);
        assert_eq!(render_ascii(&[]), "");
    }

    #[test]
    fn test_render_ascii_clips_far_items() {
        let mut cfg = config();
        cfg.category_spacing_x = u32::MAX / 2;
        cfg.category_spacing_y = u32::MAX / 2;
        let layout = GridLayout::new(cfg);
        let plan = layout.plan(vec![
            ("OBS Studio", "Gaming Tools"),
            ("Steam", "Games"),
            ("VS Code", "Coding Tools"),
        ]);
        assert_eq!(plan[1].x, u32::MAX / 2 + 20);

        let picture = render_ascii(&plan);
        assert_eq!(picture, "OBS Stud");
        assert!(picture.lines().count() <= ASCII_MAX_ROWS as usize);
    }
}
