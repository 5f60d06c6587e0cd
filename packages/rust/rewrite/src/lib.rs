//! Marker-region rewriting and toggle injection over HTML text.
//!
//! Takes a document as plain text, replaces marker containers with
//! collapsible section elements, and attaches a toggle control to the element
//! preceding each section. The document is parsed with `scraper` to locate
//! elements, but every replacement is spliced into the source string, so
//! markup outside the rewritten regions keeps its original bytes (doctype,
//! comments, and formatting included). Running the pass over its own output
//! changes nothing: previously written sections and toggles are adopted, not
//! duplicated.

mod inject;
mod markers;
pub mod render;

use tracing::{debug, instrument};

use sectioner_shared::{Result, Section, WidgetOptions};

/// Result of a full rewrite pass over a document.
#[derive(Debug, Clone)]
pub struct RewriteOutcome {
    /// Document text with sections substituted and toggles attached.
    pub html: String,
    /// Sections recorded during the pass, in document order.
    pub sections: Vec<Section>,
}

/// Rewrite marker regions into sections and attach their toggles.
///
/// Returns the rewritten text plus one [`Section`] record per region, in
/// document order. A document without regions passes through byte for byte.
#[instrument(skip(html, options), fields(len = html.len()))]
pub fn rewrite_document(html: &str, options: &WidgetOptions) -> Result<RewriteOutcome> {
    options.validate()?;

    let scan = markers::rewrite_regions(html, options)?;
    let mut sections = scan.sections;
    let html = inject::inject_toggles(scan.html, &mut sections, options)?;

    debug!(
        sections = sections.len(),
        toggles = sections.iter().filter(|s| s.has_toggle).count(),
        "rewrite complete"
    );

    Ok(RewriteOutcome { html, sections })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use sectioner_shared::SectionState;

    const ARTICLE: &str = "<!DOCTYPE html>\n<html>\n<body>\n\
        <h1>Paper</h1>\n\
        <p>The abstract follows.</p>\n\
        <div id=\"ExpandContent\">\n\
        <p>[expand]</p>\n\
        <p>We study collapsible regions.</p>\n\
        <p>[/expand]</p>\n\
        </div>\n\
        <p>Closing remarks.</p>\n\
        </body>\n</html>\n";

    #[test]
    fn full_pass_rewrites_region_and_attaches_toggle() {
        let options = WidgetOptions::default();
        let outcome = rewrite_document(ARTICLE, &options).unwrap();

        assert_eq!(outcome.sections.len(), 1);
        let section = &outcome.sections[0];
        assert_eq!(section.id.as_str(), "expandable-0");
        assert_eq!(section.state, SectionState::Collapsed);
        assert!(section.has_toggle);
        assert!(!section.content.contains("[expand]"));
        assert!(section.content.contains("We study collapsible regions."));

        // Surrounding document untouched.
        assert!(outcome.html.starts_with("<!DOCTYPE html>"));
        assert!(outcome.html.contains("<h1>Paper</h1>"));
        assert!(outcome.html.contains("<p>Closing remarks.</p>"));

        // The toggle sits inside the preceding paragraph.
        assert!(outcome.html.contains(
            "The abstract follows.<br>&nbsp;&nbsp;&nbsp;<span class=\"abstract-button\">"
        ));
        assert!(outcome.html.contains("data-expands=\"expandable-0\""));
        assert!(outcome.html.contains(">+ Abstract</a>"));
    }

    #[test]
    fn pass_is_idempotent() {
        let options = WidgetOptions::default();
        let first = rewrite_document(ARTICLE, &options).unwrap();
        let second = rewrite_document(&first.html, &options).unwrap();

        assert_eq!(first.html, second.html);
        assert_eq!(first.sections.len(), second.sections.len());
        assert_eq!(first.sections[0].id, second.sections[0].id);
        assert_eq!(first.sections[0].content, second.sections[0].content);
        assert!(second.sections[0].has_toggle);
    }

    #[test]
    fn plain_document_is_untouched() {
        let options = WidgetOptions::default();
        let html = "<!DOCTYPE html><html><body><p>No markers here.</p></body></html>";
        let outcome = rewrite_document(html, &options).unwrap();

        assert!(outcome.sections.is_empty());
        assert_eq!(outcome.html, html);
    }

    #[test]
    fn invalid_options_are_rejected() {
        let mut options = WidgetOptions::default();
        options.class_section = "not a class".into();
        assert!(rewrite_document("<p>x</p>", &options).is_err());
    }

    #[test]
    fn custom_markers_and_labels() {
        let mut options = WidgetOptions::default();
        options.marker_id = "SummaryContent".into();
        options.marker_open = "[summary]".into();
        options.marker_close = "[/summary]".into();
        options.label_expand = "+ Summary".into();

        let html = "<p>Lead.</p><div id=\"SummaryContent\">\
                    <p>[summary]</p><p>Details.</p><p>[/summary]</p></div>";
        let outcome = rewrite_document(html, &options).unwrap();

        assert_eq!(outcome.sections[0].content, "<p>Details.</p>");
        assert!(outcome.html.contains(">+ Summary</a>"));
    }

    #[test]
    fn collapse_button_present_when_enabled() {
        let mut options = WidgetOptions::default();
        options.collapse_button = true;

        let html = "<p>Lead.</p><div id=\"ExpandContent\"><p>Body.</p></div>";
        let outcome = rewrite_document(html, &options).unwrap();

        assert!(outcome.html.contains("<button class=\"collapse-btn\""));
        // Button markup lives inside the section element, not the record.
        assert_eq!(outcome.sections[0].content, "<p>Body.</p>");

        let again = rewrite_document(&outcome.html, &options).unwrap();
        assert_eq!(outcome.html, again.html);
        assert_eq!(again.html.matches("<button").count(), 1);
    }

    #[test]
    fn heading_host_receives_toggle() {
        let options = WidgetOptions::default();
        let html = "<h3>Title</h3><div id=\"ExpandContent\">\
                    <p>[expand]</p><p>Some text</p><p>[/expand]</p></div>";
        let outcome = rewrite_document(html, &options).unwrap();

        let section = &outcome.sections[0];
        assert_eq!(section.content, "<p>Some text</p>");
        assert!(section.has_toggle);
        assert!(outcome.html.starts_with("<h3>Title<br>"));
        assert!(outcome.html.contains(">+ Abstract</a></span></h3>"));
        assert!(
            outcome.html.contains("style=\"display: none;\"><p>Some text</p></div>")
        );
    }

    #[test]
    fn mixed_initial_states() {
        let options = WidgetOptions::default();
        let html = "<p>One.</p><div id=\"ExpandContent\"><p>A</p></div>\
                    <p>Two.</p><div id=\"ExpandContent\" data-expanded=\"true\"><p>B</p></div>";
        let outcome = rewrite_document(html, &options).unwrap();

        assert_eq!(outcome.sections[0].state, SectionState::Collapsed);
        assert_eq!(outcome.sections[1].state, SectionState::Expanded);
        assert!(outcome.html.contains(">+ Abstract</a>"));
        assert!(outcome.html.contains(">\u{2212} Abstract</a>"));
    }
}
