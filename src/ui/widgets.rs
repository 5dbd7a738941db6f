//! Small drawing helpers shared by the renderer: popups, pickers and the prompt line.

use crate::app::input::Prompt;
use crate::ui::overlays::{Overlay, Picker};

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph},
};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Centered rectangle taking the given percentages of `area`.
pub fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1])[1]
}

pub fn draw_overlay(frame: &mut Frame, overlay: &Overlay) {
    match overlay {
        Overlay::ConfirmDelete { targets } => {
            let prompt = match targets.as_slice() {
                [one] => format!(
                    "Delete '{}'? (y/n)",
                    one.file_name()
                        .map(|n| n.to_string_lossy().into_owned())
                        .unwrap_or_else(|| one.display().to_string())
                ),
                many => format!("Delete {} items? (y/n)", many.len()),
            };
            draw_confirm_popup(frame, frame.area(), overlay.title(), &prompt);
        }
        Overlay::ConfirmUnpin { pin, .. } => {
            let prompt = format!("Remove pin '{} ({})'? (y/n)", pin.name, pin.path.display());
            draw_confirm_popup(frame, frame.area(), overlay.title(), &prompt);
        }
        Overlay::Pins(picker) | Overlay::History(picker) => {
            draw_picker(frame, frame.area(), overlay.title(), picker);
        }
    }
}

pub fn draw_confirm_popup(frame: &mut Frame, area: Rect, title: &str, prompt: &str) {
    let popup_area = centered_rect(40, 20, area);
    frame.render_widget(Clear, popup_area);

    let block = Block::default()
        .title(title.to_string())
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Red));

    let text = Paragraph::new(format!("\n{prompt}"))
        .block(block)
        .alignment(Alignment::Center);

    frame.render_widget(text, popup_area);
}

pub fn draw_picker(frame: &mut Frame, area: Rect, title: &str, picker: &Picker) {
    let popup_area = centered_rect(60, 50, area);
    frame.render_widget(Clear, popup_area);

    let block = Block::default()
        .title(title.to_string())
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));

    if picker.items().is_empty() {
        frame.render_widget(
            Paragraph::new("Nothing here yet")
                .block(block)
                .alignment(Alignment::Center),
            popup_area,
        );
        return;
    }

    let items: Vec<ListItem> = picker
        .items()
        .iter()
        .map(|item| {
            ListItem::new(Line::from(vec![
                Span::styled(item.label.clone(), Style::default().add_modifier(Modifier::BOLD)),
                Span::styled(
                    format!("  {}", item.path.display()),
                    Style::default().fg(Color::DarkGray),
                ),
            ]))
        })
        .collect();

    let list = List::new(items)
        .block(block)
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED));
    let mut state = ListState::default().with_selected(Some(picker.selected_idx()));
    frame.render_stateful_widget(list, popup_area, &mut state);
}

/// Draws `label` followed by the prompt text on a single line and places the terminal
/// cursor inside it. `label` carries its own separator.
pub fn draw_prompt(frame: &mut Frame, area: Rect, label: &str, prompt: &Prompt) {
    let prefix = label.to_string();
    let prefix_width = prefix.width() as u16;
    let visible = area.width.saturating_sub(prefix_width + 1) as usize;
    let (shown, cursor_offset) = input_field_view(prompt.text(), prompt.cursor(), visible);

    let line = Line::from(vec![
        Span::styled(prefix, Style::default().fg(Color::Cyan)),
        Span::raw(shown.to_string()),
    ]);
    frame.render_widget(Paragraph::new(line), area);
    frame.set_cursor_position((area.x + prefix_width + cursor_offset as u16, area.y));
}

/// Returns the part of `text` that fits in `visible_width` and the cursor's column in it.
///
/// `cursor` counts chars. When the text overflows, the start is cut so the end stays visible,
/// unless the cursor sits left of that tail, in which case the window starts at the cursor.
fn input_field_view(text: &str, cursor: usize, visible_width: usize) -> (&str, usize) {
    let cursor_byte = text
        .char_indices()
        .nth(cursor)
        .map(|(i, _)| i)
        .unwrap_or(text.len());

    if text.width() <= visible_width {
        return (text, text[..cursor_byte].width());
    }

    let mut used = 0;
    let mut start = 0;
    for (idx, ch) in text.char_indices().rev() {
        used += ch.width().unwrap_or(0);
        if used > visible_width {
            start = idx + ch.len_utf8();
            break;
        }
    }

    if cursor_byte >= start {
        return (&text[start..], text[start..cursor_byte].width());
    }

    let mut end = cursor_byte;
    let mut used = 0;
    for (idx, ch) in text[cursor_byte..].char_indices() {
        used += ch.width().unwrap_or(0);
        if used > visible_width {
            break;
        }
        end = cursor_byte + idx + ch.len_utf8();
    }
    (&text[cursor_byte..end], 0)
}
