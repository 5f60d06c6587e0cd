//! Document model over rewritten HTML.
//!
//! [`Document::setup`] runs the rewrite pass once, then owns both the text
//! and the recorded sections. State changes swap the affected section's
//! rendering (and its toggle label) directly in the text, so no re-parse
//! happens after setup and untouched markup keeps its bytes.

use tracing::{debug, instrument};

use sectioner_rewrite::{render, rewrite_document};
use sectioner_shared::{
    Result, Section, SectionId, SectionState, SectionSummary, SectionerError, WidgetOptions,
};

/// A document with its expandable sections and their states.
#[derive(Debug, Clone)]
pub struct Document {
    html: String,
    sections: Vec<Section>,
    options: WidgetOptions,
}

impl Document {
    /// Build a document from HTML text: rewrite marker regions, attach
    /// toggles, and record every section in document order.
    #[instrument(skip(html, options), fields(len = html.len()))]
    pub fn setup(html: &str, options: WidgetOptions) -> Result<Self> {
        let outcome = rewrite_document(html, &options)?;
        debug!(sections = outcome.sections.len(), "document ready");

        Ok(Self {
            html: outcome.html,
            sections: outcome.sections,
            options,
        })
    }

    /// Current document text.
    pub fn html(&self) -> &str {
        &self.html
    }

    /// Consume the document, returning its text.
    pub fn into_html(self) -> String {
        self.html
    }

    /// All sections in document order.
    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    /// Look up a section by id.
    pub fn section(&self, id: &SectionId) -> Option<&Section> {
        self.sections.iter().find(|s| &s.id == id)
    }

    /// Summaries for every section, in document order.
    pub fn summaries(&self) -> Vec<SectionSummary> {
        self.sections.iter().map(Section::summary).collect()
    }

    /// Flip a section between collapsed and expanded. Returns the new state.
    pub fn toggle(&mut self, id: &SectionId) -> Result<SectionState> {
        let idx = self.index_of(id)?;
        let new_state = self.sections[idx].state.toggled();
        self.set_state(idx, new_state);
        Ok(new_state)
    }

    /// Expand a section. Returns whether the state changed.
    pub fn expand(&mut self, id: &SectionId) -> Result<bool> {
        let idx = self.index_of(id)?;
        Ok(self.set_state(idx, SectionState::Expanded))
    }

    /// Collapse a section. Returns whether the state changed.
    pub fn collapse(&mut self, id: &SectionId) -> Result<bool> {
        let idx = self.index_of(id)?;
        Ok(self.set_state(idx, SectionState::Collapsed))
    }

    /// Expand every section. Returns how many changed state.
    pub fn expand_all(&mut self) -> usize {
        self.set_all(SectionState::Expanded)
    }

    /// Collapse every section. Returns how many changed state.
    pub fn collapse_all(&mut self) -> usize {
        self.set_all(SectionState::Collapsed)
    }

    fn set_all(&mut self, state: SectionState) -> usize {
        let mut changed = 0;
        for idx in 0..self.sections.len() {
            if self.set_state(idx, state) {
                changed += 1;
            }
        }
        changed
    }

    fn index_of(&self, id: &SectionId) -> Result<usize> {
        self.sections
            .iter()
            .position(|s| &s.id == id)
            .ok_or_else(|| SectionerError::validation(format!("unknown section id: {id}")))
    }

    /// Move one section to `state`, swapping its rendering and toggle label
    /// in the text. Returns whether anything changed.
    fn set_state(&mut self, idx: usize, state: SectionState) -> bool {
        let section = &mut self.sections[idx];
        if section.state == state {
            return false;
        }

        let section_before = render::render_section(section, &self.options);
        let anchor_before =
            render::render_toggle_anchor(&section.id, section.state, &self.options);

        section.state = state;

        let section_after = render::render_section(section, &self.options);
        let anchor_after = render::render_toggle_anchor(&section.id, state, &self.options);
        let has_toggle = section.has_toggle;

        debug!(id = %section.id, state = %state, "section state changed");

        self.html = self.html.replacen(&section_before, &section_after, 1);
        if has_toggle {
            self.html = self.html.replacen(&anchor_before, &anchor_after, 1);
        }
        true
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn fixture_path(name: &str) -> std::path::PathBuf {
        std::path::Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("../../../fixtures")
            .join(name)
    }

    fn load_fixture(name: &str) -> String {
        fs::read_to_string(fixture_path(name))
            .unwrap_or_else(|e| panic!("failed to read fixture {name}: {e}"))
    }

    fn setup_fixture(name: &str) -> Document {
        Document::setup(&load_fixture(name), WidgetOptions::default()).unwrap()
    }

    fn id(n: u32) -> SectionId {
        SectionId::numbered(n)
    }

    // --- Setup ---

    #[test]
    fn article_setup_records_one_section() {
        let doc = setup_fixture("html/article.html");

        assert_eq!(doc.sections().len(), 1);
        let section = &doc.sections()[0];
        assert_eq!(section.id.as_str(), "expandable-0");
        assert_eq!(section.state, SectionState::Collapsed);
        assert!(section.has_toggle);
        assert!(section.content.contains("spectral decomposition"));
        assert!(!section.content.contains("[expand]"));

        assert!(doc.html().contains(">+ Abstract</a>"));
        assert!(doc.html().contains("<h1>Spectral Methods for Oscillator Networks</h1>"));
    }

    #[test]
    fn plain_page_passes_through() {
        let input = load_fixture("html/plain.html");
        let mut doc = Document::setup(&input, WidgetOptions::default()).unwrap();

        assert!(doc.sections().is_empty());
        assert_eq!(doc.html(), input);
        assert_eq!(doc.expand_all(), 0);
    }

    #[test]
    fn legacy_output_adopts_cleanly() {
        let doc = setup_fixture("html/legacy.html");

        assert_eq!(doc.sections().len(), 1);
        assert!(doc.sections()[0].has_toggle);
        assert!(doc.html().contains("data-expands=\"expandable-0\""));
        assert_eq!(doc.html().matches("expand-link").count(), 1);

        // A second setup over the produced text changes nothing.
        let again = Document::setup(doc.html(), WidgetOptions::default()).unwrap();
        assert_eq!(doc.html(), again.html());
    }

    // --- State changes ---

    #[test]
    fn toggle_round_trips_to_identical_bytes() {
        let mut doc = setup_fixture("html/article.html");
        let baseline = doc.html().to_string();

        let state = doc.toggle(&id(0)).unwrap();
        assert_eq!(state, SectionState::Expanded);
        assert!(doc.html().contains("class=\"expand expanded\""));
        assert!(doc.html().contains(">\u{2212} Abstract</a>"));
        assert!(!doc.html().contains(">+ Abstract</a>"));

        let state = doc.toggle(&id(0)).unwrap();
        assert_eq!(state, SectionState::Collapsed);
        assert_eq!(doc.html(), baseline);
    }

    #[test]
    fn expand_is_idempotent() {
        let mut doc = setup_fixture("html/article.html");
        assert!(doc.expand(&id(0)).unwrap());
        let expanded = doc.html().to_string();
        assert!(!doc.expand(&id(0)).unwrap());
        assert_eq!(doc.html(), expanded);
    }

    #[test]
    fn unknown_id_is_an_error() {
        let mut doc = setup_fixture("html/article.html");
        let missing = SectionId::new("expandable-99").unwrap();
        assert!(doc.toggle(&missing).is_err());
        assert!(doc.expand(&missing).is_err());
        assert!(doc.collapse(&missing).is_err());
    }

    // --- Multiple sections ---

    #[test]
    fn multi_records_states_and_hosts() {
        let doc = setup_fixture("html/multi.html");

        assert_eq!(doc.sections().len(), 3);
        assert_eq!(doc.sections()[0].state, SectionState::Collapsed);
        assert_eq!(doc.sections()[1].state, SectionState::Collapsed);
        assert_eq!(doc.sections()[2].state, SectionState::Expanded);

        // The first marker opens the page, so there is no host to carry
        // its toggle.
        assert!(!doc.sections()[0].has_toggle);
        assert!(doc.sections()[1].has_toggle);
        assert!(doc.sections()[2].has_toggle);
    }

    #[test]
    fn expand_all_and_collapse_all_count_changes() {
        let mut doc = setup_fixture("html/multi.html");

        assert_eq!(doc.expand_all(), 2);
        assert!(doc.sections().iter().all(|s| s.state.is_expanded()));

        assert_eq!(doc.collapse_all(), 3);
        assert!(doc.sections().iter().all(|s| !s.state.is_expanded()));

        assert_eq!(doc.collapse_all(), 0);
    }

    #[test]
    fn toggling_one_section_leaves_others_alone() {
        let mut doc = setup_fixture("html/multi.html");
        doc.toggle(&id(1)).unwrap();

        assert_eq!(doc.sections()[1].state, SectionState::Expanded);
        assert_eq!(doc.sections()[0].state, SectionState::Collapsed);
        assert_eq!(doc.sections()[2].state, SectionState::Expanded);

        assert!(doc.html().contains("Second abstract."));
        // Section 2 started expanded and must still carry its label.
        assert_eq!(doc.html().matches(">\u{2212} Abstract</a>").count(), 2);
    }

    #[test]
    fn summaries_reflect_state() {
        let doc = setup_fixture("html/multi.html");
        let summaries = doc.summaries();

        assert_eq!(summaries.len(), 3);
        assert_eq!(summaries[0].id.as_str(), "expandable-0");
        assert_eq!(summaries[2].state, SectionState::Expanded);
        assert!(!summaries[0].has_toggle);
        assert!(summaries[1].content_bytes > 0);
    }

    #[test]
    fn section_lookup() {
        let doc = setup_fixture("html/multi.html");
        assert!(doc.section(&id(1)).is_some());
        assert!(doc.section(&id(9)).is_none());
    }
}
