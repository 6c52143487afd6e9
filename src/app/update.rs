use std::time::{Duration, Instant};

use anyhow::Result;
use crossterm::event::{Event, EventStream, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use futures::StreamExt;
use ratatui::Terminal;
use ratatui::backend::Backend;
use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::api::UserApi;
use crate::app::keymap::KeyAction;
use crate::app::session::{self, Command, FormInput, Session};
use crate::app::{AppState, InputMode, ModalState};
use crate::form::Field;
use crate::ui;

const TICK: Duration = Duration::from_millis(250);

/// What a key press asks of the event loop.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Action {
    Quit,
    Send(Command),
}

pub async fn run_app<B, A>(terminal: &mut Terminal<B>, api: A, mut app: AppState) -> Result<()>
where
    B: Backend,
    A: UserApi + 'static,
{
    let (ui_tx, mut ui_rx) = mpsc::unbounded_channel();
    let session = session::spawn(api, ui_tx);
    let mut view_rx = session.view.clone();
    let mut events = EventStream::new();
    let mut tick = tokio::time::interval(TICK);
    info!(base_url = %app.base_url, "session started");

    loop {
        app.set_view(view_rx.borrow_and_update().clone());
        terminal.draw(|f| ui::render(f, &mut app))?;

        tokio::select! {
            ev = events.next() => match ev {
                Some(Ok(Event::Key(key))) if key.kind == KeyEventKind::Press => {
                    match handle_key(&mut app, key) {
                        Some(Action::Quit) => break,
                        Some(Action::Send(cmd)) => {
                            if !session.send(cmd) {
                                warn!("session is gone; exiting");
                                break;
                            }
                        }
                        None => {}
                    }
                }
                Some(Ok(_)) => {}
                Some(Err(e)) => return Err(e.into()),
                None => break,
            },
            Some(req) = ui_rx.recv() => app.handle_ui_request(req),
            changed = view_rx.changed() => {
                if changed.is_err() {
                    warn!("session ended unexpectedly");
                    break;
                }
            }
            _ = tick.tick() => app.expire_toasts(Instant::now()),
        }
    }

    // An unanswered prompt is a "no".
    app.answer_confirm(false);
    shutdown(session);
    Ok(())
}

fn shutdown(session: Session) {
    info!("session closed");
    session.shutdown();
}

/// Map a key press to UI state changes and, possibly, a command for the session.
pub fn handle_key(app: &mut AppState, key: KeyEvent) -> Option<Action> {
    let action = match app.input_mode() {
        InputMode::Modal => {
            handle_modal_key(app, key.code);
            None
        }
        InputMode::Form => handle_form_key(app, key),
        InputMode::Normal => handle_normal_key(app, key),
    };
    if let Some(Action::Send(cmd)) = &action {
        app.command_sent(cmd);
    }
    action
}

fn handle_normal_key(app: &mut AppState, key: KeyEvent) -> Option<Action> {
    let action = app.keymap.resolve(&key)?;
    let len = app.users().len();
    let rpp = app.rows_per_page.max(1);
    match action {
        KeyAction::Quit => return Some(Action::Quit),
        KeyAction::OpenHelp => app.modal = Some(ModalState::Help),
        KeyAction::AddUser => return Some(Action::Send(Command::Add)),
        KeyAction::ViewUser => {
            let id = app.selected_user()?.id?;
            return Some(Action::Send(Command::Edit(id)));
        }
        KeyAction::DeleteUser => {
            let id = app.selected_user()?.id?;
            return Some(Action::Send(Command::Delete(id)));
        }
        KeyAction::Refresh => return Some(Action::Send(Command::Refresh)),
        KeyAction::MoveUp => {
            app.selected_user_index = app.selected_user_index.saturating_sub(1);
        }
        KeyAction::MoveDown => {
            if app.selected_user_index + 1 < len {
                app.selected_user_index += 1;
            }
        }
        KeyAction::PageUp => {
            app.selected_user_index = app.selected_user_index.saturating_sub(rpp);
        }
        KeyAction::PageDown => {
            let new_idx = app.selected_user_index.saturating_add(rpp);
            app.selected_user_index = new_idx.min(len.saturating_sub(1));
        }
        KeyAction::Ignore => {}
    }
    None
}

fn handle_form_key(app: &AppState, key: KeyEvent) -> Option<Action> {
    let on_gender = app.view.form.focus() == Some(Field::Gender);
    let input = match key.code {
        KeyCode::Esc => return Some(Action::Send(Command::Cancel)),
        KeyCode::Enter => return Some(Action::Send(Command::Submit)),
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            return Some(Action::Send(Command::Cancel));
        }
        KeyCode::Tab | KeyCode::Down => FormInput::Next,
        KeyCode::BackTab | KeyCode::Up => FormInput::Prev,
        KeyCode::Left | KeyCode::Right if on_gender => FormInput::ToggleGender,
        KeyCode::Backspace => FormInput::Backspace,
        KeyCode::Char(c) => FormInput::Char(c),
        _ => return None,
    };
    Some(Action::Send(Command::Form(input)))
}

fn handle_modal_key(app: &mut AppState, code: KeyCode) {
    match &mut app.modal {
        Some(ModalState::Confirm { selected, .. }) => match code {
            KeyCode::Char('y') | KeyCode::Char('Y') => app.answer_confirm(true),
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => app.answer_confirm(false),
            KeyCode::Left | KeyCode::Right | KeyCode::Tab => *selected = 1 - (*selected).min(1),
            KeyCode::Enter => {
                let yes = *selected == 0;
                app.answer_confirm(yes);
            }
            _ => {}
        },
        Some(ModalState::Help) => match code {
            KeyCode::Esc | KeyCode::Char('?') | KeyCode::Char('q') | KeyCode::Enter => {
                app.modal = None;
            }
            _ => {}
        },
        None => {}
    }
}
