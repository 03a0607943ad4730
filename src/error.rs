// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Error types for the desktop organizer

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for organizer operations
pub type Result<T> = std::result::Result<T, OrganizerError>;

/// Organizer error types
#[derive(Error, Debug)]
pub enum OrganizerError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("File system error: {0}")]
    FileSystem(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid ignore pattern: {0}")]
    Pattern(#[from] glob::PatternError),

    #[error("Desktop path not found: {}", .0.display())]
    DesktopNotFound(PathBuf),

    #[error("Icon positioning error: {0}")]
    Positioning(String),

    #[error("Operation cancelled by user")]
    Cancelled,
}
