//! Core domain types for sectioner documents.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SectionerError};

/// Prefix used for generated section identifiers (`expandable-0`, `expandable-1`, …).
const ID_PREFIX: &str = "expandable-";

// ---------------------------------------------------------------------------
// SectionState
// ---------------------------------------------------------------------------

/// The two states a section cycles through for the life of a document.
///
/// Rendering (classes, inline styles, toggle labels, collapse-control
/// visibility) is always derived *from* this enum — never parsed back out of
/// the markup once setup has run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SectionState {
    /// Hidden content, toggle reads the "expand" label.
    #[default]
    Collapsed,
    /// Visible content, toggle reads the "collapse" label.
    Expanded,
}

impl SectionState {
    /// The state a toggle click transitions into.
    pub fn toggled(self) -> Self {
        match self {
            Self::Collapsed => Self::Expanded,
            Self::Expanded => Self::Collapsed,
        }
    }

    /// Whether the section content is currently visible.
    pub fn is_expanded(self) -> bool {
        matches!(self, Self::Expanded)
    }

    /// Initial state from an "expanded by default" flag.
    pub fn from_flag(expanded: bool) -> Self {
        if expanded {
            Self::Expanded
        } else {
            Self::Collapsed
        }
    }
}

impl fmt::Display for SectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Collapsed => write!(f, "collapsed"),
            Self::Expanded => write!(f, "expanded"),
        }
    }
}

// ---------------------------------------------------------------------------
// SectionId
// ---------------------------------------------------------------------------

/// Identifier linking a section container (`id="…"`) to its toggle control
/// (`data-expands="…"`).
///
/// Generated ids are `expandable-N`; adopted documents may carry arbitrary
/// author-chosen ids, so the only requirement is that the value is attribute-safe.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String")]
pub struct SectionId(String);

impl SectionId {
    /// Validate and wrap an identifier.
    pub fn new(id: impl Into<String>) -> Result<Self> {
        let id = id.into();
        if id.is_empty() {
            return Err(SectionerError::validation("section id is empty"));
        }
        if let Some(c) = id
            .chars()
            .find(|c| c.is_whitespace() || matches!(c, '"' | '\'' | '<' | '>' | '&' | '='))
        {
            return Err(SectionerError::validation(format!(
                "section id {id:?} contains invalid character {c:?}"
            )));
        }
        Ok(Self(id))
    }

    /// Generate the N-th sequential identifier.
    pub fn numbered(n: u32) -> Self {
        Self(format!("{ID_PREFIX}{n}"))
    }

    /// The N in `expandable-N`, if this is a generated id.
    pub fn numeric_suffix(&self) -> Option<u32> {
        self.0.strip_prefix(ID_PREFIX)?.parse().ok()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for SectionId {
    type Err = SectionerError;

    fn from_str(s: &str) -> Result<Self> {
        Self::new(s)
    }
}

impl TryFrom<String> for SectionId {
    type Error = SectionerError;

    fn try_from(value: String) -> Result<Self> {
        Self::new(value)
    }
}

// ---------------------------------------------------------------------------
// Section
// ---------------------------------------------------------------------------

/// One expandable section: the ownership record tying the id, the current
/// state, and the cleaned inner content together.
///
/// `has_toggle` records whether a toggle control was attached at setup — a
/// section whose trigger host was missing still exists and can be driven
/// through the document API, it just has no control in the markup.
#[derive(Debug, Clone)]
pub struct Section {
    /// Unique id within the document; also the `id`/`data-expands` attribute value.
    pub id: SectionId,
    /// Current visibility state.
    pub state: SectionState,
    /// Cleaned inner content (delimiter lines removed), preserved verbatim.
    pub content: String,
    /// Whether a toggle control is rendered in the trigger host.
    pub has_toggle: bool,
}

impl Section {
    /// Introspection view without the content payload.
    pub fn summary(&self) -> SectionSummary {
        SectionSummary {
            id: self.id.clone(),
            state: self.state,
            has_toggle: self.has_toggle,
            content_bytes: self.content.len(),
        }
    }
}

/// Serializable per-section summary for host introspection (`sections --json`).
#[derive(Debug, Clone, Serialize)]
pub struct SectionSummary {
    pub id: SectionId,
    pub state: SectionState,
    pub has_toggle: bool,
    pub content_bytes: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn state_toggle_roundtrip() {
        let s = SectionState::Collapsed;
        assert_eq!(s.toggled(), SectionState::Expanded);
        assert_eq!(s.toggled().toggled(), s);
        assert!(!s.is_expanded());
        assert!(s.toggled().is_expanded());
    }

    #[test]
    fn state_from_flag() {
        assert_eq!(SectionState::from_flag(true), SectionState::Expanded);
        assert_eq!(SectionState::from_flag(false), SectionState::Collapsed);
        assert_eq!(SectionState::default(), SectionState::Collapsed);
    }

    #[test]
    fn state_serializes_lowercase() {
        let json = serde_json::to_string(&SectionState::Expanded).expect("serialize");
        assert_eq!(json, "\"expanded\"");
        let parsed: SectionState = serde_json::from_str("\"collapsed\"").expect("deserialize");
        assert_eq!(parsed, SectionState::Collapsed);
    }

    #[test]
    fn numbered_id_format_and_suffix() {
        let id = SectionId::numbered(7);
        assert_eq!(id.as_str(), "expandable-7");
        assert_eq!(id.numeric_suffix(), Some(7));

        let custom = SectionId::new("my-abstract").expect("valid id");
        assert_eq!(custom.numeric_suffix(), None);
    }

    #[test]
    fn id_rejects_attribute_unsafe_characters() {
        assert!(SectionId::new("").is_err());
        assert!(SectionId::new("a b").is_err());
        assert!(SectionId::new("a\"b").is_err());
        assert!(SectionId::new("a<b").is_err());
        assert!(SectionId::new("ok_id-1").is_ok());
    }

    #[test]
    fn id_roundtrip() {
        let id: SectionId = "expandable-3".parse().expect("parse id");
        assert_eq!(id.to_string(), "expandable-3");

        let json = serde_json::to_string(&id).expect("serialize");
        assert_eq!(json, "\"expandable-3\"");
        let parsed: SectionId = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(parsed, id);
    }

    #[test]
    fn id_deserialize_validates() {
        let result: std::result::Result<SectionId, _> = serde_json::from_str("\"a b\"");
        assert!(result.is_err());
    }

    #[test]
    fn summary_serialization() {
        let section = Section {
            id: SectionId::numbered(1),
            state: SectionState::Collapsed,
            content: "<p>Some text</p>".into(),
            has_toggle: true,
        };
        let json = serde_json::to_string(&section.summary()).expect("serialize");
        assert!(json.contains("\"id\":\"expandable-1\""));
        assert!(json.contains("\"state\":\"collapsed\""));
        assert!(json.contains("\"has_toggle\":true"));
    }
}
