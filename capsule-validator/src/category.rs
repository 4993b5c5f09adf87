//! Closed vocabulary of item categories.
//!
//! Manifest authors write categories as Russian labels (`НОВОСТИ`, `ФОТО`, ...).
//! Parsing is case-insensitive; anything outside the vocabulary maps to
//! [`Category::Unknown`] so that display code matches exhaustively.

// Category labels are Cyrillic manifest keywords.
#![allow(clippy::non_ascii_literal)]

use std::fmt;

use serde::Serialize;

/// Category of an archive item, as declared in the manifest `type` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    News,
    Media,
    Meme,
    Photo,
    Video,
    Audio,
    Document,
    Text,
    Image,
    Link,
    Event,
    Personal,
    Education,
    Work,
    Hobby,
    /// Any label outside the vocabulary. Never carried by a parsed item.
    Unknown,
}

impl Category {
    /// Every known category, in manifest documentation order.
    pub const ALL: [Self; 15] = [
        Self::News,
        Self::Media,
        Self::Meme,
        Self::Photo,
        Self::Video,
        Self::Audio,
        Self::Document,
        Self::Text,
        Self::Image,
        Self::Link,
        Self::Event,
        Self::Personal,
        Self::Education,
        Self::Work,
        Self::Hobby,
    ];

    /// Parse a manifest label, ignoring case and surrounding whitespace.
    #[must_use]
    pub fn parse(label: &str) -> Self {
        let upper = label.trim().to_uppercase();
        Self::ALL
            .into_iter()
            .find(|c| c.label() == upper)
            .unwrap_or(Self::Unknown)
    }

    /// Canonical (upper-case) manifest label.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::News => "НОВОСТИ",
            Self::Media => "МЕДИА",
            Self::Meme => "МЕМ",
            Self::Photo => "ФОТО",
            Self::Video => "ВИДЕО",
            Self::Audio => "АУДИО",
            Self::Document => "ДОКУМЕНТ",
            Self::Text => "ТЕКСТ",
            Self::Image => "ИЗОБРАЖЕНИЕ",
            Self::Link => "ССЫЛКА",
            Self::Event => "СОБЫТИЕ",
            Self::Personal => "ЛИЧНОЕ",
            Self::Education => "ОБРАЗОВАНИЕ",
            Self::Work => "РАБОТА",
            Self::Hobby => "ХОББИ",
            Self::Unknown => "?",
        }
    }

    /// Emoji shown next to items of this category.
    #[must_use]
    pub fn emoji(self) -> &'static str {
        match self {
            Self::News => "\u{1F4F0}",
            Self::Media => "\u{1F3AC}",
            Self::Meme => "\u{1F602}",
            Self::Photo => "\u{1F4F7}",
            Self::Video => "\u{1F3A5}",
            Self::Audio => "\u{1F3B5}",
            Self::Document => "\u{1F4C4}",
            Self::Text => "\u{1F4DD}",
            Self::Image => "\u{1F5BC}",
            Self::Link => "\u{1F517}",
            Self::Event => "\u{1F4C5}",
            Self::Personal => "\u{1F464}",
            Self::Education => "\u{1F393}",
            Self::Work => "\u{1F4BC}",
            Self::Hobby => "\u{1F3A8}",
            Self::Unknown => "\u{2753}",
        }
    }

    #[must_use]
    pub fn is_known(self) -> bool {
        self != Self::Unknown
    }

    /// Comma-separated list of all labels, used in diagnostics.
    #[must_use]
    pub fn vocabulary() -> String {
        Self::ALL
            .iter()
            .map(|c| c.label())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
