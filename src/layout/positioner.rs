// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Icon positioning capability
//!
//! Moving icons on a real desktop is host-specific, so the organizer only
//! talks to an [`IconPositioner`]. The bundled [`PlanPositioner`] records the
//! requested layout and writes it out as JSON for a platform helper to apply.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::PathBuf;
use tracing::{debug, info};

use crate::classifier::split_extension;
use crate::{OrganizerError, Result};

/// An icon on the desktop and its current screen position
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IconPosition {
    pub index: usize,
    pub name: String,
    pub x: u32,
    pub y: u32,
}

/// Host capability for reading and moving desktop icons
pub trait IconPositioner {
    /// Current icons, addressed by index
    fn list_icon_positions(&mut self) -> Result<Vec<IconPosition>>;

    /// Move the icon at `index` to screen position `(x, y)`
    fn set_icon_position(&mut self, index: usize, x: u32, y: u32) -> Result<()>;

    /// Make pending moves visible
    fn refresh(&mut self) -> Result<()>;
}

/// Positioner that keeps the layout in memory and optionally writes it to a
/// JSON file on refresh
#[derive(Debug, Clone)]
pub struct PlanPositioner {
    icons: Vec<IconPosition>,
    output: Option<PathBuf>,
}

impl PlanPositioner {
    /// One icon per name, in the given order, all at the origin
    pub fn new<I, S>(names: I, output: Option<PathBuf>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let icons = names
            .into_iter()
            .enumerate()
            .map(|(index, name)| IconPosition { index, name: name.into(), x: 0, y: 0 })
            .collect();
        Self { icons, output }
    }

    pub fn icons(&self) -> &[IconPosition] {
        &self.icons
    }
}

impl IconPositioner for PlanPositioner {
    fn list_icon_positions(&mut self) -> Result<Vec<IconPosition>> {
        Ok(self.icons.clone())
    }

    fn set_icon_position(&mut self, index: usize, x: u32, y: u32) -> Result<()> {
        let icon = self.icons.get_mut(index).ok_or_else(|| {
            OrganizerError::Positioning(format!("No icon at index {}", index))
        })?;
        icon.x = x;
        icon.y = y;
        debug!("Planned {} at ({}, {})", icon.name, x, y);
        Ok(())
    }

    fn refresh(&mut self) -> Result<()> {
        if let Some(ref path) = self.output {
            let json = serde_json::to_string_pretty(&self.icons)?;
            std::fs::write(path, json)?;
            info!("Icon layout written to {:?}", path);
        }
        Ok(())
    }
}

/// Find the icon for a desktop item among those not yet `claimed`.
///
/// Exact name first, then case-insensitive, then ignoring the extension,
/// since shells usually hide `.lnk` and known file extensions in labels.
pub fn find_icon(icons: &[IconPosition], name: &str, claimed: &HashSet<usize>) -> Option<usize> {
    let free = || icons.iter().filter(|i| !claimed.contains(&i.index));

    if let Some(icon) = free().find(|i| i.name == name) {
        return Some(icon.index);
    }
    if let Some(icon) = free().find(|i| i.name.eq_ignore_ascii_case(name)) {
        return Some(icon.index);
    }

    let stem = split_extension(name).0;
    free().find(|i| i.name.eq_ignore_ascii_case(stem)).map(|i| i.index)
}
