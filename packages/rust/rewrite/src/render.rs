//! Canonical markup rendering for sections and toggle controls.
//!
//! Every piece of markup the rewrite pass writes into a document is produced
//! here from a section's recorded state. Re-rendering a section for a given
//! state reproduces the exact bytes originally written for that state, which
//! is what makes state changes swappable by plain string replacement.

use sectioner_shared::{Section, SectionId, SectionState, WidgetOptions};

/// Attribute tying a control to its section by id.
pub const DATA_EXPANDS_ATTR: &str = "data-expands";

// ---------------------------------------------------------------------------
// Sections
// ---------------------------------------------------------------------------

/// Render the full section element for its current state.
pub fn render_section(section: &Section, options: &WidgetOptions) -> String {
    let class = match section.state {
        SectionState::Collapsed => options.class_section.clone(),
        SectionState::Expanded => {
            format!("{} {}", options.class_section, options.class_expanded)
        }
    };

    let style = if options.inline_styles {
        let css = match section.state {
            SectionState::Collapsed => "display: none;",
            SectionState::Expanded => "display: block; height: auto;",
        };
        format!(" style=\"{css}\"")
    } else {
        String::new()
    };

    let button = if options.collapse_button {
        render_collapse_button(&section.id, section.state, options)
    } else {
        String::new()
    };

    format!(
        "<div class=\"{class}\" id=\"{id}\"{style}>{content}{button}</div>",
        id = section.id,
        content = section.content,
    )
}

/// Render the collapse control that sits at the end of a section's content.
/// Hidden while the section is collapsed, visible while expanded.
fn render_collapse_button(id: &SectionId, state: SectionState, options: &WidgetOptions) -> String {
    let style = if options.inline_styles {
        let display = match state {
            SectionState::Collapsed => "none",
            SectionState::Expanded => "inline-block",
        };
        format!(" style=\"cursor: pointer; display: {display};\"")
    } else {
        String::new()
    };

    format!(
        "<button class=\"{class}\" {DATA_EXPANDS_ATTR}=\"{id}\"{style}>{label}</button>",
        class = options.class_collapse_button,
        label = escape_text(&options.label_collapse_button),
    )
}

// ---------------------------------------------------------------------------
// Toggles
// ---------------------------------------------------------------------------

/// Render the full toggle assembly appended to a trigger host: line break,
/// indent, and the wrapped anchor.
pub fn render_toggle(id: &SectionId, state: SectionState, options: &WidgetOptions) -> String {
    format!(
        "<br>&nbsp;&nbsp;&nbsp;<span class=\"{wrap}\"> {anchor}</span>",
        wrap = options.class_toggle_wrap,
        anchor = render_toggle_anchor(id, state, options),
    )
}

/// Render just the toggle anchor.
///
/// Kept separate from [`render_toggle`] so a state change can swap the anchor
/// without touching whatever shell wraps it (adopted toggles keep their own
/// wrappers).
pub fn render_toggle_anchor(
    id: &SectionId,
    state: SectionState,
    options: &WidgetOptions,
) -> String {
    let label = match state {
        SectionState::Collapsed => &options.label_expand,
        SectionState::Expanded => &options.label_collapse,
    };

    let style = if options.inline_styles {
        " style=\"cursor: pointer; display: inline-block;\""
    } else {
        ""
    };

    format!(
        "<a href=\"#\" class=\"{class}\" {DATA_EXPANDS_ATTR}=\"{id}\"{style}>{label}</a>",
        class = options.class_toggle,
        label = escape_text(label),
    )
}

/// Escape text content for embedding in markup.
fn escape_text(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
