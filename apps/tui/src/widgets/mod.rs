//! Reusable TUI widgets.

use ratatui::prelude::*;
use ratatui::widgets::{ListItem, Paragraph};

use sectioner_shared::{Section, SectionState};

/// Bottom status bar.
pub(crate) fn status_bar(msg: &str) -> Paragraph<'_> {
    Paragraph::new(format!(" {msg}"))
        .style(
            Style::default()
                .bg(Color::DarkGray)
                .fg(Color::White),
        )
}

/// One row of the section list: id, state, toggle marker, content preview.
pub(crate) fn section_line(section: &Section, selected: bool) -> ListItem<'static> {
    let style = if selected {
        Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD)
    } else if section.state.is_expanded() {
        Style::default().fg(Color::Green)
    } else {
        Style::default()
    };

    let prefix = if selected { "▸ " } else { "  " };
    let state = match section.state {
        SectionState::Collapsed => "collapsed",
        SectionState::Expanded => "expanded ",
    };
    let toggle = if section.has_toggle { "" } else { " (no toggle)" };

    ListItem::new(format!(
        "{prefix}{}  {state}{toggle}  {}",
        section.id,
        text_preview(&section.content, 48),
    ))
    .style(style)
}

/// Plain-text preview of section content: tags dropped, whitespace collapsed.
pub(crate) fn text_preview(html: &str, max_chars: usize) -> String {
    let mut text = String::new();
    let mut in_tag = false;
    for c in html.chars() {
        match c {
            '<' => in_tag = true,
            '>' => in_tag = false,
            c if !in_tag => text.push(c),
            _ => {}
        }
    }

    let mut preview = String::new();
    for word in text.split_whitespace() {
        if preview.chars().count() + word.chars().count() + 1 > max_chars {
            preview.push('…');
            break;
        }
        if !preview.is_empty() {
            preview.push(' ');
        }
        preview.push_str(word);
    }
    preview
}
