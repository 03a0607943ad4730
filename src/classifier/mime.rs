// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Coarse MIME classes used as the last file-level fallback

/// Top-level MIME type families the classifier knows how to place
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MimeClass {
    Image,
    Video,
    Audio,
    Text,
}

impl MimeClass {
    /// Category label for this MIME family
    pub fn category(self) -> &'static str {
        match self {
            MimeClass::Image | MimeClass::Video | MimeClass::Audio => "Media Tools",
            MimeClass::Text => "Coding Tools",
        }
    }
}

/// Guess the MIME family of an extension (with or without the leading dot)
pub fn mime_class(extension: &str) -> Option<MimeClass> {
    let ext = extension.trim_start_matches('.');
    if ext.is_empty() {
        return None;
    }

    let mime = mime_guess::from_ext(ext).first()?;
    match mime.type_().as_str() {
        "image" => Some(MimeClass::Image),
        "video" => Some(MimeClass::Video),
        "audio" => Some(MimeClass::Audio),
        "text" => Some(MimeClass::Text),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_families() {
        assert_eq!(mime_class(".png"), Some(MimeClass::Image));
        assert_eq!(mime_class("webm"), Some(MimeClass::Video));
        assert_eq!(mime_class(".txt"), Some(MimeClass::Text));
    }

    #[test]
    fn test_unknown_or_empty() {
        assert_eq!(mime_class(""), None);
        assert_eq!(mime_class("."), None);
        assert_eq!(mime_class(".qqqzz"), None);
        assert_eq!(mime_class(".zip"), None);
    }

    #[test]
    fn test_category_labels() {
        assert_eq!(MimeClass::Audio.category(), "Media Tools");
        assert_eq!(MimeClass::Text.category(), "Coding Tools");
    }
}
