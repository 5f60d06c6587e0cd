//! Core TUI application state and event loop.

use std::io;
use std::path::PathBuf;
use std::time::Duration;

use color_eyre::eyre::{Result, eyre};
use crossterm::{
    event::{self, Event, KeyCode, KeyModifiers},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, List, ListItem, Paragraph};

use sectioner_core::Document;
use sectioner_shared::WidgetOptions;

use crate::widgets::{section_line, status_bar};

/// Application state.
pub(crate) struct App {
    /// File being edited.
    path: PathBuf,
    /// The rewritten document and its section states.
    doc: Document,
    /// Widget options, kept for reloads.
    options: WidgetOptions,
    /// Currently selected section index.
    selected: usize,
    /// Whether the app should quit.
    should_quit: bool,
    /// Status message shown in bottom bar.
    status: String,
    /// Whether help overlay is visible.
    show_help: bool,
    /// Whether the document differs from the file on disk.
    dirty: bool,
}

impl App {
    fn new(path: PathBuf, options: WidgetOptions) -> Result<Self> {
        let html = std::fs::read_to_string(&path)
            .map_err(|e| eyre!("cannot read '{}': {e}", path.display()))?;
        let doc = Document::setup(&html, options.clone())?;

        // The rewrite itself may already have changed the markup.
        let dirty = doc.html() != html;
        let count = doc.sections().len();

        Ok(Self {
            path,
            doc,
            options,
            selected: 0,
            should_quit: false,
            status: format!("{count} section(s) — press ? for help"),
            show_help: false,
            dirty,
        })
    }

    fn select_previous(&mut self) {
        if self.selected > 0 {
            self.selected -= 1;
        }
    }

    fn select_next(&mut self) {
        if self.selected + 1 < self.doc.sections().len() {
            self.selected += 1;
        }
    }

    fn toggle_selected(&mut self) {
        let Some(section) = self.doc.sections().get(self.selected) else {
            return;
        };
        let id = section.id.clone();

        match self.doc.toggle(&id) {
            Ok(state) => {
                self.dirty = true;
                self.status = format!("{id} is now {state} — press w to write");
            }
            Err(e) => self.status = format!("toggle failed: {e}"),
        }
    }

    fn expand_all(&mut self) {
        let changed = self.doc.expand_all();
        if changed > 0 {
            self.dirty = true;
        }
        self.status = format!("{changed} section(s) expanded");
    }

    fn collapse_all(&mut self) {
        let changed = self.doc.collapse_all();
        if changed > 0 {
            self.dirty = true;
        }
        self.status = format!("{changed} section(s) collapsed");
    }

    fn save(&mut self) {
        match std::fs::write(&self.path, self.doc.html()) {
            Ok(()) => {
                self.dirty = false;
                self.status = format!("Saved {}", self.path.display());
            }
            Err(e) => self.status = format!("save failed: {e}"),
        }
    }

    fn reload(&mut self) {
        let loaded = std::fs::read_to_string(&self.path)
            .map_err(|e| e.to_string())
            .and_then(|html| {
                Document::setup(&html, self.options.clone()).map_err(|e| e.to_string())
            });

        match loaded {
            Ok(doc) => {
                self.doc = doc;
                self.selected = 0;
                self.dirty = false;
                self.status = "Reloaded from disk".to_string();
            }
            Err(e) => self.status = format!("reload failed: {e}"),
        }
    }
}

/// Entry point — sets up terminal, runs event loop, restores terminal.
pub(crate) fn run(path: PathBuf, options: WidgetOptions) -> Result<()> {
    // Build the app first so setup errors print normally.
    let app = App::new(path, options)?;

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_app(&mut terminal, app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn run_app(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>, mut app: App) -> Result<()> {
    loop {
        terminal.draw(|f| draw(f, &app))?;

        // Poll for events with 100ms timeout for responsive UI
        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                handle_key(&mut app, key.code, key.modifiers);
            }
        }

        if app.should_quit {
            break;
        }
    }

    Ok(())
}

fn handle_key(app: &mut App, code: KeyCode, modifiers: KeyModifiers) {
    match code {
        KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => {
            app.should_quit = true;
            return;
        }
        KeyCode::Char('q') => {
            app.should_quit = true;
            return;
        }
        KeyCode::Char('?') => {
            app.show_help = !app.show_help;
            return;
        }
        KeyCode::Esc if app.show_help => {
            app.show_help = false;
            return;
        }
        _ => {}
    }

    // If help is showing, consume any key to dismiss
    if app.show_help {
        app.show_help = false;
        return;
    }

    match code {
        KeyCode::Up | KeyCode::Char('k') => app.select_previous(),
        KeyCode::Down | KeyCode::Char('j') => app.select_next(),
        KeyCode::Char(' ') | KeyCode::Enter => app.toggle_selected(),
        KeyCode::Char('e') => app.expand_all(),
        KeyCode::Char('c') => app.collapse_all(),
        KeyCode::Char('w') => app.save(),
        KeyCode::Char('r') => app.reload(),
        _ => {}
    }
}

fn draw(f: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(1),    // Section list
            Constraint::Length(1), // Status bar
        ])
        .split(f.area());

    let dirty_marker = if app.dirty { " [modified]" } else { "" };
    let header = Paragraph::new(format!(" {}{dirty_marker}", app.path.display()))
        .block(Block::default().borders(Borders::ALL).title(" sectioner "));
    f.render_widget(header, chunks[0]);

    draw_sections(f, app, chunks[1]);

    let bar = status_bar(&app.status);
    f.render_widget(bar, chunks[2]);

    if app.show_help {
        draw_help_overlay(f);
    }
}

fn draw_sections(f: &mut Frame, app: &App, area: Rect) {
    let sections = app.doc.sections();

    if sections.is_empty() {
        let empty = Paragraph::new(
            "No expandable sections in this file.\n\n\
             No marker containers were found when the file was loaded.",
        )
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL).title(" Sections "));
        f.render_widget(empty, area);
        return;
    }

    let items: Vec<ListItem> = sections
        .iter()
        .enumerate()
        .map(|(i, section)| section_line(section, i == app.selected))
        .collect();

    let list = List::new(items).block(
        Block::default()
            .borders(Borders::ALL)
            .title(format!(" Sections ({}) ", sections.len())),
    );
    f.render_widget(list, area);
}

fn draw_help_overlay(f: &mut Frame) {
    let area = centered_rect(60, 60, f.area());

    let help_text = vec![
        Line::from("Keybindings").style(Style::default().add_modifier(Modifier::BOLD)),
        Line::from(""),
        Line::from("  ↑/k ↓/j       Select section"),
        Line::from("  Space/Enter   Toggle selected section"),
        Line::from("  e / c         Expand / collapse all"),
        Line::from("  w             Write changes to the file"),
        Line::from("  r             Reload from disk"),
        Line::from("  ?             Toggle this help"),
        Line::from("  q / Ctrl-C    Quit"),
    ];

    let help = Paragraph::new(help_text)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Help — press any key to close ")
                .style(Style::default().bg(Color::DarkGray)),
        )
        .style(Style::default().fg(Color::White).bg(Color::DarkGray));

    // Clear background
    f.render_widget(ratatui::widgets::Clear, area);
    f.render_widget(help, area);
}

/// Create a centered rectangle with percentage width and height.
fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
