// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Desktop Organizer: purpose-based desktop tidying
//!
//! Classifies desktop files and folders into categories such as
//! "Gaming Tools" or "Documents", then moves them into per-category folders
//! or arranges their icons in category blocks on a grid.

pub mod classifier;
pub mod config;
pub mod error;
pub mod history;
pub mod layout;
pub mod organizer;
pub mod scanner;

pub use classifier::{Classifier, ItemDescriptor};
pub use config::AppConfig;
pub use error::{OrganizerError, Result};
pub use layout::GridLayout;
pub use organizer::Organizer;
