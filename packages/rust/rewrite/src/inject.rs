//! Toggle injection into trigger hosts.
//!
//! After the region pass has written every section, this pass walks the
//! recorded sections and appends a toggle control to each section's trigger
//! host (the element immediately before it). Hosts that already carry a
//! toggle are adopted instead of receiving a second one, so repeated passes
//! never stack controls.

use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, warn};

use sectioner_shared::{Result, Section, SectionerError, WidgetOptions};

use crate::render::{self, DATA_EXPANDS_ATTR};

/// Tags that cannot contain child markup; never used as trigger hosts.
const VOID_TAGS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source",
    "track", "wbr",
];

/// Append or adopt a toggle for every recorded section. Sections that end up
/// with a working toggle get `has_toggle` set; the rest are left toggle-less
/// and reachable only through the programmatic API.
pub(crate) fn inject_toggles(
    html: String,
    sections: &mut [Section],
    options: &WidgetOptions,
) -> Result<String> {
    let anchor_re = toggle_anchor_regex(&options.class_toggle)?;

    let mut result = html;
    for section in sections.iter_mut() {
        result = inject_for_section(result, section, options, &anchor_re)?;
    }
    Ok(result)
}

fn inject_for_section(
    html: String,
    section: &mut Section,
    options: &WidgetOptions,
    anchor_re: &Regex,
) -> Result<String> {
    let doc = Html::parse_document(&html);
    let selector_text = format!("div#{}.{}", section.id, options.class_section);
    let selector = Selector::parse(&selector_text).map_err(|e| {
        SectionerError::parse(format!("section selector {selector_text:?}: {e}"))
    })?;

    let Some(el) = doc.select(&selector).next() else {
        warn!(id = %section.id, "section missing from document, toggle skipped");
        return Ok(html);
    };

    let Some(host) = el.prev_siblings().find_map(ElementRef::wrap) else {
        debug!(id = %section.id, "no preceding element, toggle skipped");
        return Ok(html);
    };

    let tag = host.value().name();
    if VOID_TAGS.contains(&tag) {
        debug!(id = %section.id, tag, "void element cannot host a toggle, skipped");
        return Ok(html);
    }
    if is_section_like(&host, options) {
        debug!(id = %section.id, "preceding element is itself a section, toggle skipped");
        return Ok(html);
    }

    let host_outer = host.html();
    let closing = format!("</{tag}>");
    if !host_outer.ends_with(&closing) {
        warn!(id = %section.id, tag, "host serialization has no closing tag, toggle skipped");
        return Ok(html);
    }

    // Locate the host in the text, anchored on the section rendering the
    // region pass wrote. The host sits directly before it, separated by
    // whitespace at most.
    let section_html = render::render_section(section, options);
    let Some(section_pos) = html.find(&section_html) else {
        warn!(id = %section.id, "section rendering not found in text, toggle skipped");
        return Ok(html);
    };
    let lead = html[..section_pos].trim_end();
    if !lead.ends_with(&host_outer) {
        warn!(id = %section.id, "host markup does not line up with source text, toggle skipped");
        return Ok(html);
    }
    let host_start = lead.len() - host_outer.len();

    let association = format!("{DATA_EXPANDS_ATTR}=\"{}\"", section.id);
    let new_host = match anchor_re.find(&host_outer) {
        Some(found) => {
            let anchor = found.as_str();
            if anchor.contains(DATA_EXPANDS_ATTR) && !anchor.contains(&association) {
                debug!(id = %section.id, "host toggle bound to another section, skipped");
                return Ok(html);
            }
            // Either our own toggle from a previous pass or one written by an
            // earlier widget generation. Rewrite the anchor in place; its
            // shell stays as the author left it.
            let canonical = render::render_toggle_anchor(&section.id, section.state, options);
            host_outer.replacen(anchor, &canonical, 1)
        }
        None => {
            let mut updated = host_outer.clone();
            let insert_at = updated.len() - closing.len();
            updated.insert_str(
                insert_at,
                &render::render_toggle(&section.id, section.state, options),
            );
            updated
        }
    };

    section.has_toggle = true;
    if new_host == host_outer {
        // Already canonical for the current state.
        return Ok(html);
    }

    debug!(id = %section.id, host = tag, "toggle attached");

    let mut out = String::with_capacity(html.len() - host_outer.len() + new_host.len());
    out.push_str(&html[..host_start]);
    out.push_str(&new_host);
    out.push_str(&html[host_start + host_outer.len()..]);
    Ok(out)
}

/// True when the element is a marker container or an already written section.
/// Those never host a toggle for the section that follows them.
fn is_section_like(el: &ElementRef, options: &WidgetOptions) -> bool {
    if el.value().attr("id") == Some(options.marker_id.as_str()) {
        return true;
    }
    el.value()
        .classes()
        .any(|class| class == options.class_section)
}

/// Match an anchor carrying the toggle class, whatever else it carries.
fn toggle_anchor_regex(toggle_class: &str) -> Result<Regex> {
    Regex::new(&format!(
        r#"<a\s[^>]*class="[^"]*{}[^"]*"[^>]*>[^<]*</a>"#,
        regex::escape(toggle_class)
    ))
    .map_err(|e| SectionerError::parse(format!("toggle anchor pattern: {e}")))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markers;

    fn pass(html: &str, options: &WidgetOptions) -> (String, Vec<Section>) {
        let scan = markers::rewrite_regions(html, options).unwrap();
        let mut sections = scan.sections;
        let html = inject_toggles(scan.html, &mut sections, options).unwrap();
        (html, sections)
    }

    #[test]
    fn toggle_appended_to_preceding_paragraph() {
        let options = WidgetOptions::default();
        let html = "<p>Intro.</p><div id=\"ExpandContent\"><p>Body.</p></div>";
        let (out, sections) = pass(html, &options);

        assert!(sections[0].has_toggle);
        let expected_host = "<p>Intro.<br>&nbsp;&nbsp;&nbsp;<span class=\"abstract-button\"> \
                             <a href=\"#\" class=\"expand-link\" data-expands=\"expandable-0\" \
                             style=\"cursor: pointer; display: inline-block;\">+ Abstract</a></span></p>";
        assert!(out.starts_with(expected_host), "got: {out}");
        assert!(out.ends_with("<p>Body.</p></div>"));
    }

    #[test]
    fn host_located_across_whitespace() {
        let options = WidgetOptions::default();
        let html = "<p>Intro.</p>\n  <div id=\"ExpandContent\"><p>Body.</p></div>";
        let (out, sections) = pass(html, &options);

        assert!(sections[0].has_toggle);
        assert!(out.contains("+ Abstract</a></span></p>\n  <div class=\"expand\""));
    }

    #[test]
    fn expanded_section_gets_collapse_label() {
        let options = WidgetOptions::default();
        let html =
            "<p>Intro.</p><div id=\"ExpandContent\" data-expanded=\"true\"><p>Body.</p></div>";
        let (out, _) = pass(html, &options);
        assert!(out.contains(">\u{2212} Abstract</a>"));
    }

    #[test]
    fn no_preceding_element_skips_toggle() {
        let options = WidgetOptions::default();
        let html = "<div id=\"ExpandContent\"><p>Body.</p></div>";
        let (out, sections) = pass(html, &options);

        assert!(!sections[0].has_toggle);
        assert!(!out.contains("expand-link"));
    }

    #[test]
    fn void_host_skips_toggle() {
        let options = WidgetOptions::default();
        let html = "<hr><div id=\"ExpandContent\"><p>Body.</p></div>";
        let (out, sections) = pass(html, &options);

        assert!(!sections[0].has_toggle);
        assert!(out.starts_with("<hr>"));
        assert!(!out.contains("expand-link"));
    }

    #[test]
    fn adjacent_sections_do_not_host_each_other() {
        let options = WidgetOptions::default();
        let html = "<div id=\"ExpandContent\"><p>A</p></div>\
                    <div id=\"ExpandContent\"><p>B</p></div>";
        let (out, sections) = pass(html, &options);

        assert!(!sections[0].has_toggle);
        assert!(!sections[1].has_toggle);
        assert!(!out.contains("expand-link"));
    }

    #[test]
    fn host_with_unordered_attributes_is_matched() {
        let options = WidgetOptions::default();
        // Attribute order in the source is deliberately non-alphabetical;
        // locating host and region depends on it surviving a parse.
        let html = "<p title=\"lead\" class=\"intro\">Intro.</p>\
                    <div id=\"ExpandContent\" data-expanded=\"true\"><p>Body.</p></div>";
        let (out, sections) = pass(html, &options);

        assert_eq!(sections.len(), 1);
        assert!(sections[0].state.is_expanded());
        assert!(sections[0].has_toggle);
        assert!(out.starts_with("<p title=\"lead\" class=\"intro\">Intro.<br>"));
        assert!(out.contains(">\u{2212} Abstract</a>"));
    }

    #[test]
    fn rerun_does_not_duplicate_toggle() {
        let options = WidgetOptions::default();
        let html = "<p>Intro.</p><div id=\"ExpandContent\"><p>Body.</p></div>";
        let (first, _) = pass(html, &options);
        let (second, sections) = pass(&first, &options);

        assert_eq!(first, second);
        assert!(sections[0].has_toggle);
        assert_eq!(second.matches("expand-link").count(), 1);
    }

    #[test]
    fn legacy_toggle_upgraded_in_place() {
        let options = WidgetOptions::default();
        let html = "<p>Intro.<br>&nbsp;&nbsp;&nbsp;<span> \
                    <a href=\"#\" class=\"expand-link\">+ Abstract</a></span></p>\
                    <div class=\"expand\" id=\"expandable-0\" style=\"display: none;\"><p>Body.</p></div>";
        let (out, sections) = pass(html, &options);

        assert!(sections[0].has_toggle);
        // The bare span shell survives; only the anchor is rewritten.
        assert!(out.contains(
            "<span> <a href=\"#\" class=\"expand-link\" data-expands=\"expandable-0\" \
             style=\"cursor: pointer; display: inline-block;\">+ Abstract</a></span>"
        ));
        assert_eq!(out.matches("expand-link").count(), 1);
    }

    #[test]
    fn upgraded_toggle_label_follows_section_state() {
        let options = WidgetOptions::default();
        let html = "<p>Intro.<br>&nbsp;&nbsp;&nbsp;<span> \
                    <a href=\"#\" class=\"expand-link\">+ Abstract</a></span></p>\
                    <div class=\"expand expanded\" id=\"expandable-0\" style=\"display: block; height: auto;\"><p>Body.</p></div>";
        let (out, _) = pass(html, &options);
        assert!(out.contains(">\u{2212} Abstract</a>"));
        assert!(!out.contains(">+ Abstract</a>"));
    }

    #[test]
    fn toggle_bound_to_another_section_is_left_alone() {
        let options = WidgetOptions::default();
        let html = "<p>Intro.<br>&nbsp;&nbsp;&nbsp;<span> \
                    <a href=\"#\" class=\"expand-link\" data-expands=\"expandable-9\" \
                    style=\"cursor: pointer; display: inline-block;\">+ Abstract</a></span></p>\
                    <div class=\"expand\" id=\"expandable-0\" style=\"display: none;\"><p>Body.</p></div>";
        let (out, sections) = pass(html, &options);

        assert!(!sections[0].has_toggle);
        assert_eq!(out, html);
    }
}
