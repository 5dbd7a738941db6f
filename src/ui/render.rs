//! UI renderer implementation.
//!
//! Contains the top-level `render` entry point used by the terminal loop and the
//! layout helpers that split the screen into header, listing, preview and footer.

use crate::app::{AppState, PaneMode, StatusKind};
use crate::core::terminal::StatusLine;
use crate::core::{format_file_size, sanitize_to_exact_width};
use crate::ui::{icons::entry_icon, widgets};
use crate::utils::shorten_home_path;

use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
};

const SIZE_COLUMN: usize = 9;

/// Renders the entire terminal UI for ncview on each frame.
pub fn render(frame: &mut Frame, app: &AppState, status: &StatusLine) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(1),
            Constraint::Length(1),
        ])
        .split(frame.area());

    draw_header(frame, app, chunks[0]);

    match app.pane() {
        PaneMode::Hidden => draw_listing(frame, app, chunks[1]),
        PaneMode::FullScreen => draw_preview(frame, app, chunks[1]),
        PaneMode::Split => {
            let body = Layout::default()
                .direction(Direction::Horizontal)
                .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
                .split(chunks[1]);
            draw_listing(frame, app, body[0]);
            draw_preview(frame, app, body[1]);
        }
    }

    draw_footer(frame, app, status, chunks[2]);

    if let Some(overlay) = app.overlay() {
        widgets::draw_overlay(frame, overlay);
    }
}

fn draw_header(frame: &mut Frame, app: &AppState, area: Rect) {
    let mut spans = vec![Span::styled(
        shorten_home_path(app.nav().current_dir()),
        Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD),
    )];
    if let Some(pending) = app.nav().pending_dir() {
        spans.push(Span::styled(
            format!("  loading {}", shorten_home_path(pending)),
            Style::default().fg(Color::DarkGray),
        ));
    }
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn draw_listing(frame: &mut Frame, app: &AppState, area: Rect) {
    let block = Block::default().borders(Borders::ALL);
    let entries = app.nav().entries();

    if entries.is_empty() {
        let text = if app.is_scanning() { "" } else { "[Empty]" };
        frame.render_widget(Paragraph::new(text).block(block), area);
        return;
    }

    // borders plus icon and the spaces around it
    let name_width = (area.width as usize).saturating_sub(2 + 3 + SIZE_COLUMN);

    let items: Vec<ListItem> = entries
        .iter()
        .map(|entry| {
            let mut name = entry.name_str().into_owned();
            if entry.is_dir() {
                name.push('/');
            }
            if let Some(target) = entry.symlink_target() {
                name.push_str(" -> ");
                name.push_str(&target.to_string_lossy());
            }
            let size = if entry.is_degraded() {
                "?".to_string()
            } else {
                format_file_size(entry.size(), entry.is_dir())
            };

            let style = if entry.is_dir() {
                Style::default().fg(Color::Blue).add_modifier(Modifier::BOLD)
            } else if entry.is_symlink() {
                Style::default().fg(Color::Magenta)
            } else {
                Style::default()
            };

            ListItem::new(Line::from(vec![
                Span::styled(format!("{} ", entry_icon(entry)), style),
                Span::styled(sanitize_to_exact_width(&name, name_width), style),
                Span::styled(
                    format!(" {size:>width$}", width = SIZE_COLUMN - 1),
                    Style::default().fg(Color::DarkGray),
                ),
            ]))
        })
        .collect();

    let list = List::new(items)
        .block(block)
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED));
    let mut state = ListState::default().with_selected(Some(app.nav().selected_idx()));
    frame.render_stateful_widget(list, area, &mut state);
}

fn draw_preview(frame: &mut Frame, app: &AppState, area: Rect) {
    let preview = app.preview();
    let mut block = Block::default().borders(Borders::ALL);

    let Some(session) = preview.session() else {
        let text = if preview.is_loading() { "Loading..." } else { "" };
        frame.render_widget(Paragraph::new(text).block(block), area);
        return;
    };

    let name = session
        .path()
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    block = block.title(format!(" {name} [{}] ", session.handler()));

    let inner_width = area.width.saturating_sub(2) as usize;
    let inner_height = area.height.saturating_sub(2) as usize;
    let view = session.view();

    let mut lines: Vec<Line> = view
        .header
        .iter()
        .map(|h| {
            Line::from(Span::styled(
                sanitize_to_exact_width(h, inner_width),
                Style::default().fg(Color::Yellow),
            ))
        })
        .collect();
    let body_room = inner_height.saturating_sub(lines.len());
    lines.extend(
        view.lines
            .iter()
            .skip(session.scroll())
            .take(body_room)
            .map(|l| Line::raw(sanitize_to_exact_width(l, inner_width))),
    );

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn draw_footer(frame: &mut Frame, app: &AppState, status: &StatusLine, area: Rect) {
    if let Some(prompt) = app.input().prompt() {
        widgets::draw_prompt(frame, area, app.input().mode().label(), prompt);
        return;
    }

    let line = match status.message() {
        Some(msg) => {
            let style = match msg.kind {
                StatusKind::Error => Style::default().fg(Color::Red),
                StatusKind::Info => Style::default().fg(Color::Green),
            };
            Line::from(Span::styled(msg.text.clone(), style))
        }
        None => {
            let total = app.nav().entries().len();
            let position = if total == 0 {
                "0/0".to_string()
            } else {
                format!("{}/{}", app.nav().selected_idx() + 1, total)
            };
            Line::from(vec![
                Span::raw(app.summary()),
                Span::styled(format!("  {position}"), Style::default().fg(Color::DarkGray)),
            ])
        }
    };
    frame.render_widget(Paragraph::new(line), area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use ratatui::{Terminal, backend::TestBackend};
    use std::fs;
    use std::time::{Duration, Instant};
    use tempfile::tempdir;

    fn buffer_text(terminal: &Terminal<TestBackend>) -> String {
        let buffer = terminal.backend().buffer();
        buffer.content().iter().map(|c| c.symbol()).collect()
    }

    #[test]
    fn renders_listing_and_summary() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        fs::write(dir.path().join("report.csv"), "a,b\n1,2\n")?;
        fs::create_dir(dir.path().join("nested"))?;
        let config = Config::default();
        let mut app = AppState::from_dir(&config, dir.path(), None);

        let deadline = Instant::now() + Duration::from_secs(2);
        while app.nav().entries().len() < 2 && Instant::now() < deadline {
            app.tick(Instant::now());
            std::thread::sleep(Duration::from_millis(5));
        }

        let mut terminal = Terminal::new(TestBackend::new(100, 20))?;
        terminal.draw(|f| render(f, &app, &StatusLine::default()))?;
        let text = buffer_text(&terminal);

        assert!(text.contains("report.csv"));
        assert!(text.contains("nested/"));
        assert!(text.contains("1 dirs, 1 files | sort:name | hidden:off"));
        Ok(())
    }
}
