//! The session task: owns the [`UserList`] and runs every remote call off the
//! render loop.
//!
//! The UI sends [`Command`]s in; the session publishes a [`View`] snapshot
//! after each one. Toasts and confirmation prompts travel the other way as
//! [`UiRequest`]s, so a pending delete confirmation never stalls drawing.

use async_trait::async_trait;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::api::UserApi;
use crate::form::{Field, UserForm};
use crate::list::UserList;
use crate::model::{UserId, UserRecord};
use crate::notify::{Confirm, Level, Notifier};

/// Edits applied to the form buffer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FormInput {
    Char(char),
    Backspace,
    Next,
    Prev,
    Focus(Field),
    ToggleGender,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    Refresh,
    Add,
    Edit(UserId),
    Delete(UserId),
    Form(FormInput),
    Submit,
    Cancel,
}

impl Command {
    /// Whether handling this command may hit the network.
    fn is_remote(&self) -> bool {
        matches!(
            self,
            Command::Refresh | Command::Delete(_) | Command::Submit
        )
    }
}

/// What the UI draws.
#[derive(Clone, Debug, Default)]
pub struct View {
    pub users: Vec<UserRecord>,
    pub form: UserForm,
    /// A remote call is in flight.
    pub busy: bool,
    /// The first fetch has completed (successfully or not).
    pub loaded: bool,
    /// Number of commands applied so far, in the order they were sent.
    pub handled: u64,
}

/// Requests from the session to the UI loop.
#[derive(Debug)]
pub enum UiRequest {
    Toast { message: String, level: Level },
    Confirm { message: String, reply: oneshot::Sender<bool> },
}

/// [`Notifier`] that forwards toasts to the UI loop.
#[derive(Clone, Debug)]
pub struct ChannelNotifier {
    tx: mpsc::UnboundedSender<UiRequest>,
}

impl ChannelNotifier {
    pub fn new(tx: mpsc::UnboundedSender<UiRequest>) -> Self {
        Self { tx }
    }
}

impl Notifier for ChannelNotifier {
    fn notify(&self, message: &str, level: Level) {
        info!(%level, text = message, "notification");
        let _ = self.tx.send(UiRequest::Toast {
            message: message.to_string(),
            level,
        });
    }
}

/// [`Confirm`] that asks the UI loop and waits for its answer.
/// A UI that has gone away counts as "no".
#[derive(Clone, Debug)]
pub struct ChannelConfirm {
    tx: mpsc::UnboundedSender<UiRequest>,
}

impl ChannelConfirm {
    pub fn new(tx: mpsc::UnboundedSender<UiRequest>) -> Self {
        Self { tx }
    }
}

#[async_trait]
impl Confirm for ChannelConfirm {
    async fn confirm(&self, message: &str) -> bool {
        let (reply, answer) = oneshot::channel();
        let req = UiRequest::Confirm {
            message: message.to_string(),
            reply,
        };
        if self.tx.send(req).is_err() {
            return false;
        }
        answer.await.unwrap_or(false)
    }
}

pub struct Session {
    pub commands: mpsc::UnboundedSender<Command>,
    pub view: watch::Receiver<View>,
    task: JoinHandle<()>,
}

impl Session {
    pub fn send(&self, cmd: Command) -> bool {
        self.commands.send(cmd).is_ok()
    }

    /// Stop the session. Requests still in flight are dropped, not cancelled remotely.
    pub fn shutdown(self) {
        self.task.abort();
    }
}

/// Start the session task and perform the initial fetch.
pub fn spawn<A>(api: A, ui: mpsc::UnboundedSender<UiRequest>) -> Session
where
    A: UserApi + 'static,
{
    let list = UserList::new(api, ChannelNotifier::new(ui.clone()), ChannelConfirm::new(ui));
    let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
    let (view_tx, view_rx) = watch::channel(View {
        busy: true,
        ..View::default()
    });
    let task = tokio::spawn(run(list, cmd_rx, view_tx));
    Session {
        commands: cmd_tx,
        view: view_rx,
        task,
    }
}

async fn run<A, N, C>(
    mut list: UserList<A, N, C>,
    mut commands: mpsc::UnboundedReceiver<Command>,
    view: watch::Sender<View>,
) where
    A: UserApi,
    N: Notifier,
    C: Confirm,
{
    if let Err(e) = list.mount().await {
        warn!(error = %e, "initial user list fetch failed");
    }
    let mut handled = 0;
    publish(&list, &view, handled);

    while let Some(cmd) = commands.recv().await {
        debug!(?cmd, "session command");
        if cmd.is_remote() {
            view.send_modify(|v| v.busy = true);
        }
        apply(&mut list, cmd).await;
        handled += 1;
        publish(&list, &view, handled);
    }
    debug!("session command channel closed");
}

fn publish<A, N, C>(list: &UserList<A, N, C>, view: &watch::Sender<View>, handled: u64)
where
    A: UserApi,
    N: Notifier,
    C: Confirm,
{
    view.send_replace(View {
        users: list.users().to_vec(),
        form: list.form().clone(),
        busy: false,
        loaded: true,
        handled,
    });
}

async fn apply<A, N, C>(list: &mut UserList<A, N, C>, cmd: Command)
where
    A: UserApi,
    N: Notifier,
    C: Confirm,
{
    match cmd {
        Command::Refresh => {
            if let Err(e) = list.refresh().await {
                warn!(error = %e, "refresh failed");
            }
        }
        Command::Add => list.open_create(),
        Command::Edit(id) => {
            if !list.open_edit(id) {
                warn!(id, "edit requested for a user not in the list");
            }
        }
        Command::Delete(id) => {
            let outcome = list.delete(id).await;
            debug!(id, ?outcome, "delete handled");
        }
        Command::Form(input) => {
            let form = list.form_mut();
            match input {
                FormInput::Char(c) => form.input_char(c),
                FormInput::Backspace => form.backspace(),
                FormInput::Next => form.focus_next(),
                FormInput::Prev => form.focus_prev(),
                FormInput::Focus(field) => form.focus_field(field),
                FormInput::ToggleGender => form.toggle_gender(),
            }
        }
        Command::Submit => {
            let outcome = list.submit_form().await;
            debug!(?outcome, "form submit handled");
        }
        Command::Cancel => list.cancel_form().await,
    }
}
