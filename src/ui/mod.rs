pub mod components;
pub mod form;
pub mod users;

use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::style::Style;
use ratatui::widgets::{Block, Borders, Paragraph};

use crate::app::{AppState, ModalState};

pub fn render(f: &mut Frame, app: &mut AppState) {
    let root = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(5), Constraint::Length(1)].as_ref())
        .split(f.area());
    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(62), Constraint::Percentage(38)].as_ref())
        .split(root[1]);

    let p = Paragraph::new(format!(
        "{}  users:{}  a: add; Enter/v: view; d: delete; r: refresh; ?: help; q: quit",
        app.base_url,
        app.users().len()
    ))
    .block(
        Block::default()
            .title("userdesk")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(app.theme.border)),
    )
    .style(Style::default().fg(app.theme.header_fg).bg(app.theme.header_bg));
    f.render_widget(p, root[0]);

    users::render_users_table(f, body[0], app);
    users::render_user_details(f, body[1], app);
    components::render_status_bar(f, root[2], app);

    if app.view.form.is_open() {
        form::render_form_modal(f, f.area(), app);
    }
    match app.modal.clone() {
        Some(ModalState::Confirm { message, selected }) => {
            components::render_confirm_modal(f, f.area(), app, &message, selected);
        }
        Some(ModalState::Help) => components::render_help_modal(f, f.area(), app),
        None => {}
    }
}
