//! Shared UI components (status bar, modal helpers).
//!
//! Contains small building blocks reused by the table and dialog screens.
//!
use std::collections::{BTreeMap, BTreeSet};

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};

use crate::app::keymap::{KeyAction, Keymap};
use crate::app::{AppState, InputMode};

/// Render the bottom status bar: mode, count, activity and the newest toast.
pub fn render_status_bar(f: &mut Frame, area: Rect, app: &AppState) {
    let mode = match app.input_mode() {
        InputMode::Normal => "NORMAL",
        InputMode::Form => "FORM",
        InputMode::Modal => "MODAL",
    };
    let busy = if app.view.busy { "  working…" } else { "" };
    let mut spans = vec![Span::raw(format!(
        "mode: {mode}  users:{}  rows/page:{}{busy}",
        app.users().len(),
        app.rows_per_page,
    ))];
    if let Some(toast) = app.toasts.back() {
        let more = app.toasts.len().saturating_sub(1);
        let suffix = if more > 0 { format!(" (+{more})") } else { String::new() };
        spans.push(Span::raw("  │ "));
        spans.push(Span::styled(
            format!("{}{}", toast.message, suffix),
            Style::default()
                .fg(app.theme.level_color(toast.level))
                .add_modifier(Modifier::BOLD),
        ));
    }
    let p = Paragraph::new(Line::from(spans)).style(
        Style::default()
            .fg(app.theme.status_fg)
            .bg(app.theme.status_bg),
    );
    f.render_widget(p, area);
}

/// Compute a rectangle centered within `area` with a maximum size.
pub fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let x = area.x + area.width.saturating_sub(width) / 2;
    let y = area.y + area.height.saturating_sub(height) / 2;
    Rect {
        x,
        y,
        width: width.min(area.width),
        height: height.min(area.height),
    }
}

pub fn render_confirm_modal(f: &mut Frame, area: Rect, app: &AppState, message: &str, selected: usize) {
    let rect = centered_rect(52, 7, area);
    let yes = if selected == 0 { "[Yes]" } else { " Yes " };
    let no = if selected == 1 { "[No]" } else { " No " };
    let body = format!("{message}\n\n      {yes}    {no}\n  (y/n, ←/→ then Enter)");
    let p = Paragraph::new(body).wrap(Wrap { trim: false }).block(
        Block::default()
            .title("Confirm")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(app.theme.border)),
    );
    f.render_widget(Clear, rect);
    f.render_widget(p, rect);
}

/// Table bindings grouped by action, e.g. `"Delete user" -> {"Delete", "d"}`.
pub fn binding_rows(keymap: &Keymap) -> BTreeMap<&'static str, BTreeSet<String>> {
    let mut rows: BTreeMap<&'static str, BTreeSet<String>> = BTreeMap::new();
    for ((mods, code), action) in keymap.all_bindings() {
        if action == KeyAction::Ignore {
            continue;
        }
        rows.entry(action.describe())
            .or_default()
            .insert(Keymap::format_key(mods, code));
    }
    rows
}

/// Render the help modal: table bindings from the keymap plus fixed dialog keys.
pub fn render_help_modal(f: &mut Frame, area: Rect, app: &AppState) {
    let width = 70u16.min(area.width.saturating_sub(4)).max(40);
    let height = 24u16.min(area.height.saturating_sub(2)).max(12);
    let rect = centered_rect(width, height, area);

    let bold = Style::default().add_modifier(Modifier::BOLD);
    let italic = Style::default().add_modifier(Modifier::ITALIC);
    let mut lines: Vec<Line> = vec![Line::from(Span::styled("Users table:", bold))];
    for (label, keys) in binding_rows(&app.keymap) {
        let joined = keys.into_iter().collect::<Vec<_>>().join(", ");
        lines.push(Line::from(vec![
            Span::raw(format!("  {:>18} │ ", label)),
            Span::styled(joined, italic),
        ]));
    }
    lines.push(Line::raw(""));
    lines.push(Line::from(Span::styled("Form:", bold)));
    for (label, value) in [
        ("Next / prev field", "Tab, Down / BackTab, Up"),
        ("Toggle gender", "Space, Left, Right"),
        ("Submit", "Enter"),
        ("Cancel", "Esc"),
    ] {
        lines.push(Line::from(vec![
            Span::raw(format!("  {:>18} │ ", label)),
            Span::styled(value, italic),
        ]));
    }

    let p = Paragraph::new(lines).wrap(Wrap { trim: false }).block(
        Block::default()
            .title("Help (Esc to close)")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(app.theme.border)),
    );
    f.render_widget(Clear, rect);
    f.render_widget(p, rect);
}
