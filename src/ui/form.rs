//! The add/update dialog.

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};

use crate::app::AppState;
use crate::form::Field;
use crate::ui::components::centered_rect;

pub fn render_form_modal(f: &mut Frame, area: Rect, app: &AppState) {
    let form = &app.view.form;
    let theme = &app.theme;
    // Two lines per field (value + error) plus the button row and borders.
    let height = (Field::ALL.len() as u16) * 2 + 4;
    let rect = centered_rect(64, height, area);

    let mut lines: Vec<Line> = Vec::with_capacity(Field::ALL.len() * 2 + 2);
    for field in Field::ALL {
        let focused = form.focus() == Some(field);
        let marker = if focused { "▶ " } else { "  " };
        let mut value = form.value(field).to_string();
        if field == Field::Gender {
            value = format!("< {} >", value);
        } else if focused {
            value.push('_');
        }
        let label_style = if focused {
            Style::default().fg(theme.highlight_fg).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(theme.title)
        };
        lines.push(Line::from(vec![
            Span::styled(format!("{marker}{:<14}", field.label()), label_style),
            Span::styled(value, Style::default().fg(theme.text)),
        ]));
        match form.visible_error(field) {
            Some(msg) => lines.push(Line::from(Span::styled(
                format!("  {msg}"),
                Style::default().fg(theme.error),
            ))),
            None => lines.push(Line::raw("")),
        }
    }
    let busy = if app.view.busy { "  saving…" } else { "" };
    lines.push(Line::from(vec![
        Span::styled("  [Esc] Cancel    ", Style::default().fg(theme.muted)),
        Span::styled(
            format!("[Enter] {}", form.submit_label()),
            Style::default().fg(theme.highlight_fg).add_modifier(Modifier::BOLD),
        ),
        Span::styled(busy, Style::default().fg(theme.muted)),
    ]));

    let p = Paragraph::new(lines).block(
        Block::default()
            .title(form.title())
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme.border)),
    );
    f.render_widget(Clear, rect);
    f.render_widget(p, rect);
}
