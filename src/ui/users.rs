use ratatui::Frame;
use ratatui::layout::{Constraint, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::widgets::{Block, Borders, Cell, Paragraph, Row, Table, Wrap};

use crate::app::AppState;

/// Render the visible page of the users table, highlighting the selected row.
pub fn render_users_table(f: &mut Frame, area: Rect, app: &mut AppState) {
    let body_height = area.height.saturating_sub(3) as usize;
    if body_height > 0 {
        app.rows_per_page = body_height;
    }

    let users = app.users();
    let start = (app.selected_user_index / app.rows_per_page) * app.rows_per_page;
    let end = (start + app.rows_per_page).min(users.len());
    let slice = users.get(start..end).unwrap_or_default();

    let rows = slice.iter().enumerate().map(|(i, u)| {
        let style = if start + i == app.selected_user_index {
            Style::default()
                .fg(app.theme.highlight_fg)
                .bg(app.theme.highlight_bg)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(app.theme.text)
        };
        Row::new(vec![
            Cell::from(u.full_name.clone()),
            Cell::from(u.email.clone()),
            Cell::from(u.address.clone()),
            Cell::from(u.date_of_birth.clone()),
            Cell::from(u.phone_number.clone()),
            Cell::from(u.gender.as_str()),
        ])
        .style(style)
    });

    let widths = [
        Constraint::Percentage(20),
        Constraint::Percentage(24),
        Constraint::Percentage(22),
        Constraint::Length(12),
        Constraint::Length(16),
        Constraint::Length(7),
    ];
    let header = Row::new(vec![
        "Full Name",
        "Email",
        "Address",
        "Date Of Birth",
        "Phone Number",
        "Gender",
    ])
    .style(Style::default().fg(app.theme.title).add_modifier(Modifier::BOLD));

    let title = if !app.view.loaded {
        "Users (loading…)".to_string()
    } else if users.is_empty() {
        "Users (none)".to_string()
    } else {
        format!("Users {}/{}", app.selected_user_index + 1, users.len())
    };

    let table = Table::new(rows, widths)
        .header(header)
        .block(
            Block::default()
                .title(title)
                .borders(Borders::ALL)
                .border_style(Style::default().fg(app.theme.border)),
        )
        .column_spacing(1);

    f.render_widget(table, area);
}

pub fn render_user_details(f: &mut Frame, area: Rect, app: &AppState) {
    let text = match app.selected_user() {
        Some(u) => format!(
            "Id: {}\nFull name: {}\nEmail: {}\nAddress: {}\nDate of birth: {}\nPhone: {}\nGender: {}",
            u.id.map(|id| id.to_string()).unwrap_or_else(|| "-".into()),
            u.full_name,
            u.email,
            u.address,
            u.date_of_birth,
            u.phone_number,
            u.gender.label(),
        ),
        None => String::new(),
    };
    let p = Paragraph::new(text)
        .wrap(Wrap { trim: false })
        .style(Style::default().fg(app.theme.text))
        .block(
            Block::default()
                .title("Details")
                .borders(Borders::ALL)
                .border_style(Style::default().fg(app.theme.border)),
        );
    f.render_widget(p, area);
}
