//! Marker-region recognition and replacement.
//!
//! Scans a document for marker containers (`div#ExpandContent` by default)
//! and for sections written by a previous pass, then replaces each region in
//! the source text with its canonical rendering. Replacement works the same
//! way throughout: serialize the matched element, locate that exact markup in
//! the source string, and splice in the substitute. Markup outside the
//! regions keeps its original bytes.

use std::collections::HashSet;

use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, warn};

use sectioner_shared::{Result, Section, SectionId, SectionState, SectionerError, WidgetOptions};

use crate::render;

/// Output of the region pass: rewritten text plus the recorded sections.
pub(crate) struct RegionScan {
    pub html: String,
    pub sections: Vec<Section>,
}

/// How a matched element entered the pass.
enum RegionKind {
    /// A marker container to rewrite into a fresh section.
    Marker,
    /// A section from a previous pass. `Some` keeps its id, `None` means the
    /// id collided with an earlier section and a fresh one is assigned.
    Adopted(Option<SectionId>),
    /// Matched inside another matched region. Left untouched.
    Nested,
    /// Carries the section class but no generated id. Not ours to rewrite.
    Foreign,
}

// ---------------------------------------------------------------------------
// Region pass
// ---------------------------------------------------------------------------

/// Replace every marker container and previously written section with its
/// canonical rendering, recording one [`Section`] per region in document
/// order. Text outside the regions is left untouched.
pub(crate) fn rewrite_regions(html: &str, options: &WidgetOptions) -> Result<RegionScan> {
    let selector_text = format!("div#{}, div.{}", options.marker_id, options.class_section);
    let selector = Selector::parse(&selector_text).map_err(|e| {
        SectionerError::parse(format!("region selector {selector_text:?}: {e}"))
    })?;

    let delimiters = DelimiterPatterns::compile(options)?;
    let button_re = collapse_button_regex(options)?;

    let doc = Html::parse_document(html);
    let matches: Vec<ElementRef> = doc.select(&selector).collect();

    if matches.is_empty() {
        // No regions; the document passes through byte for byte.
        return Ok(RegionScan {
            html: html.to_string(),
            sections: Vec::new(),
        });
    }

    let matched_nodes: HashSet<_> = matches.iter().map(|el| el.id()).collect();

    // First pass: classify each match and reserve adopted id numbers, so a
    // fresh id assigned later can never collide with an adopted one.
    let mut used_numbers: HashSet<u32> = HashSet::new();
    let mut kinds: Vec<RegionKind> = Vec::with_capacity(matches.len());

    for el in &matches {
        if el.ancestors().any(|a| matched_nodes.contains(&a.id())) {
            debug!("region nested inside another region, left untouched");
            kinds.push(RegionKind::Nested);
            continue;
        }

        if el.value().attr("id") == Some(options.marker_id.as_str()) {
            kinds.push(RegionKind::Marker);
            continue;
        }

        let generated_id = el.value().attr("id").and_then(|raw| {
            let id = SectionId::new(raw).ok()?;
            let number = id.numeric_suffix()?;
            Some((id, number))
        });

        match generated_id {
            Some((id, number)) if used_numbers.insert(number) => {
                kinds.push(RegionKind::Adopted(Some(id)));
            }
            Some((id, _)) => {
                warn!(id = %id, "duplicate section id, assigning a fresh one");
                kinds.push(RegionKind::Adopted(None));
            }
            None => {
                debug!("element with section class but no generated id, left untouched");
                kinds.push(RegionKind::Foreign);
            }
        }
    }

    // Second pass: splice replacements in document order.
    let mut result = html.to_string();
    let mut sections: Vec<Section> = Vec::new();
    let mut next_number: u32 = 0;

    for (el, kind) in matches.iter().zip(&kinds) {
        let (state, content, kept_id) = match kind {
            RegionKind::Nested | RegionKind::Foreign => continue,
            RegionKind::Marker => {
                let state = marker_state(el, options);
                let content = delimiters.strip(&el.inner_html());
                (state, content, None)
            }
            RegionKind::Adopted(kept_id) => {
                let state = adopted_state(el, options);
                let inner = el.inner_html();
                let without_button = button_re.replace_all(&inner, "");
                let content = delimiters.strip(&without_button);
                (state, content, kept_id.clone())
            }
        };

        let outer = el.html();
        if !result.contains(&outer) {
            warn!(
                bytes = outer.len(),
                "serialized region differs from source markup, left untouched"
            );
            continue;
        }

        let id = match kept_id {
            Some(id) => id,
            None => {
                while used_numbers.contains(&next_number) {
                    next_number += 1;
                }
                used_numbers.insert(next_number);
                SectionId::numbered(next_number)
            }
        };

        let section = Section {
            id,
            state,
            content,
            has_toggle: false,
        };
        let rendered = render::render_section(&section, options);
        result = result.replacen(&outer, &rendered, 1);
        sections.push(section);
    }

    debug!(sections = sections.len(), "region pass complete");

    Ok(RegionScan {
        html: result,
        sections,
    })
}

/// A fresh marker starts expanded only when its expanded attribute is the
/// literal string `"true"`.
fn marker_state(el: &ElementRef, options: &WidgetOptions) -> SectionState {
    SectionState::from_flag(el.value().attr(&options.expanded_attr) == Some("true"))
}

/// An adopted section's state is read back from its classes.
fn adopted_state(el: &ElementRef, options: &WidgetOptions) -> SectionState {
    SectionState::from_flag(
        el.value()
            .classes()
            .any(|class| class == options.class_expanded),
    )
}

// ---------------------------------------------------------------------------
// Delimiter patterns
// ---------------------------------------------------------------------------

/// Compiled patterns for the open and close delimiter paragraphs. Built per
/// pass because the delimiter text is configurable.
struct DelimiterPatterns {
    open: Regex,
    close: Regex,
}

impl DelimiterPatterns {
    fn compile(options: &WidgetOptions) -> Result<Self> {
        Ok(Self {
            open: delimiter_regex(&options.marker_open)?,
            close: delimiter_regex(&options.marker_close)?,
        })
    }

    /// Remove every delimiter paragraph from the text.
    fn strip(&self, text: &str) -> String {
        let without_open = self.open.replace_all(text, "");
        self.close.replace_all(&without_open, "").into_owned()
    }
}

/// Match a paragraph whose entire text is the delimiter, allowing surrounding
/// whitespace inside the tags.
fn delimiter_regex(marker: &str) -> Result<Regex> {
    Regex::new(&format!(r"<p>\s*{}\s*</p>", regex::escape(marker)))
        .map_err(|e| SectionerError::parse(format!("delimiter pattern for {marker:?}: {e}")))
}

/// Match a collapse button carrying the configured class, so adopted content
/// is recorded without the injected control.
fn collapse_button_regex(options: &WidgetOptions) -> Result<Regex> {
    Regex::new(&format!(
        r#"<button[^>]*class="[^"]*{}[^"]*"[^>]*>[^<]*</button>"#,
        regex::escape(&options.class_collapse_button)
    ))
    .map_err(|e| SectionerError::parse(format!("collapse button pattern: {e}")))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
