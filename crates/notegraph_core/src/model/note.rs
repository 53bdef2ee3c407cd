//! Flat note and link records.
//!
//! # Responsibility
//! - Define the records returned by the flat store accessor.
//! - Provide language-aware content selection and link helpers.
//!
//! # Invariants
//! - `id` is stable and never reused for another note.
//! - A non-null `parent_id` should reference an existing note, but readers
//!   must tolerate dangling references.
//! - `Link::weight` lies in `[0, 100]` when written through the store.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable identifier of one note.
pub type NoteId = String;

/// Lowest accepted link weight.
pub const LINK_WEIGHT_MIN: f64 = 0.0;
/// Highest accepted link weight.
pub const LINK_WEIGHT_MAX: f64 = 100.0;

/// Content language selector for hierarchy rendering.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Lang {
    /// Primary `content` text.
    #[default]
    En,
    /// Secondary `content_zh` text, falling back to `content` when absent.
    Zh,
}

impl Lang {
    /// Parses a language code (`en` or `zh`, case-insensitive).
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "en" => Some(Self::En),
            "zh" => Some(Self::Zh),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::En => "en",
            Self::Zh => "zh",
        }
    }
}

/// One note in the flat store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    pub id: NoteId,
    /// Primary text.
    pub content: String,
    /// Optional secondary-language text.
    pub content_zh: Option<String>,
    /// Parent note id. `None` means the note is stored as a root.
    pub parent_id: Option<NoteId>,
}

impl Note {
    /// Creates a root note with a generated stable id.
    pub fn new(content: impl Into<String>) -> Self {
        Self::with_id(Uuid::new_v4().to_string(), content)
    }

    /// Creates a root note with a caller-provided id.
    ///
    /// Used by import paths where identity already exists externally.
    pub fn with_id(id: impl Into<NoteId>, content: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            content: content.into(),
            content_zh: None,
            parent_id: None,
        }
    }

    /// Sets the parent pointer.
    pub fn under(mut self, parent_id: impl Into<NoteId>) -> Self {
        self.parent_id = Some(parent_id.into());
        self
    }

    /// Sets the secondary-language text.
    pub fn with_content_zh(mut self, content_zh: impl Into<String>) -> Self {
        self.content_zh = Some(content_zh.into());
        self
    }

    /// Returns the text to display for `lang`.
    pub fn display_content(&self, lang: Lang) -> &str {
        match (lang, self.content_zh.as_deref()) {
            (Lang::Zh, Some(zh)) => zh,
            _ => self.content.as_str(),
        }
    }
}

/// Directed, weighted cross-reference between two notes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Link {
    pub from_id: NoteId,
    pub to_id: NoteId,
    pub description: Option<String>,
    pub weight: f64,
}

impl Link {
    pub fn new(from_id: impl Into<NoteId>, to_id: impl Into<NoteId>, weight: f64) -> Self {
        Self {
            from_id: from_id.into(),
            to_id: to_id.into(),
            description: None,
            weight,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Returns the endpoint opposite to `id`, if `id` is an endpoint.
    pub fn other_end(&self, id: &str) -> Option<&str> {
        if self.from_id == id {
            Some(self.to_id.as_str())
        } else if self.to_id == id {
            Some(self.from_id.as_str())
        } else {
            None
        }
    }
}

/// Link weight outside `[LINK_WEIGHT_MIN, LINK_WEIGHT_MAX]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InvalidWeight(pub f64);

impl Display for InvalidWeight {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "link weight {} is outside [{LINK_WEIGHT_MIN}, {LINK_WEIGHT_MAX}]",
            self.0
        )
    }
}

impl Error for InvalidWeight {}

/// Validates a link weight at the write boundary.
pub fn validate_weight(weight: f64) -> Result<f64, InvalidWeight> {
    if weight.is_finite() && (LINK_WEIGHT_MIN..=LINK_WEIGHT_MAX).contains(&weight) {
        Ok(weight)
    } else {
        Err(InvalidWeight(weight))
    }
}

#[cfg(test)]
mod tests {
    use super::{validate_weight, Lang, Link, Note};

    #[test]
    fn display_content_falls_back_to_primary_text() {
        let plain = Note::with_id("a", "hello");
        let bilingual = Note::with_id("b", "hello").with_content_zh("你好");

        assert_eq!(plain.display_content(Lang::Zh), "hello");
        assert_eq!(bilingual.display_content(Lang::Zh), "你好");
        assert_eq!(bilingual.display_content(Lang::En), "hello");
    }

    #[test]
    fn new_generates_distinct_ids() {
        let first = Note::new("a");
        let second = Note::new("a");
        assert_ne!(first.id, second.id);
        assert!(first.parent_id.is_none());
    }

    #[test]
    fn lang_parse_is_case_insensitive() {
        assert_eq!(Lang::parse(" ZH "), Some(Lang::Zh));
        assert_eq!(Lang::parse("en"), Some(Lang::En));
        assert_eq!(Lang::parse("fr"), None);
    }

    #[test]
    fn link_other_end_works_in_both_directions() {
        let link = Link::new("a", "b", 10.0);
        assert_eq!(link.other_end("a"), Some("b"));
        assert_eq!(link.other_end("b"), Some("a"));
        assert_eq!(link.other_end("z"), None);
    }

    #[test]
    fn validate_weight_rejects_out_of_range_values() {
        assert!(validate_weight(0.0).is_ok());
        assert!(validate_weight(100.0).is_ok());
        assert!(validate_weight(-0.5).is_err());
        assert!(validate_weight(100.5).is_err());
        assert!(validate_weight(f64::NAN).is_err());
    }

    #[test]
    fn generated_ids_are_unique() {
        assert_ne!(Note::new("x").id, Note::new("x").id);
    }
}
