//! Application state types and entry glue.
//!
//! Defines the enums and structs that model the TUI state on top of the
//! session snapshot, and re-exports the event loop as `run`.
//!
pub mod keymap;
pub mod session;
pub mod update;

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use ratatui::style::Color;
use tokio::sync::oneshot;

use crate::model::UserRecord;
use crate::notify::Level;
use keymap::Keymap;
use session::{Command, UiRequest, View};

/// At most this many toasts are kept; the oldest is evicted first.
pub const MAX_TOASTS: usize = 3;
pub const TOAST_TTL: Duration = Duration::from_secs(4);

/// Current input mode for key handling.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Form,
    Modal,
}

/// Color palette for theming the TUI.
#[derive(Clone, Copy, Debug)]
pub struct Theme {
    pub text: Color,
    pub muted: Color,
    pub title: Color,
    pub border: Color,
    pub header_bg: Color,
    pub header_fg: Color,
    pub status_bg: Color,
    pub status_fg: Color,
    pub highlight_fg: Color,
    pub highlight_bg: Color,
    pub success: Color,
    pub error: Color,
}

impl Theme {
    /// Catppuccin Mocha palette.
    pub fn mocha() -> Self {
        Self {
            text: Color::Rgb(0xcd, 0xd6, 0xf4),
            muted: Color::Rgb(0x7f, 0x84, 0x9c),
            title: Color::Rgb(0xcb, 0xa6, 0xf7),
            border: Color::Rgb(0x58, 0x5b, 0x70),
            header_bg: Color::Rgb(0x31, 0x32, 0x44),
            header_fg: Color::Rgb(0xb4, 0xbe, 0xfe),
            status_bg: Color::Rgb(0x45, 0x47, 0x5a),
            status_fg: Color::Rgb(0xcd, 0xd6, 0xf4),
            highlight_fg: Color::Rgb(0xf9, 0xe2, 0xaf),
            highlight_bg: Color::Rgb(0x45, 0x47, 0x5a),
            success: Color::Rgb(0xa6, 0xe3, 0xa1),
            error: Color::Rgb(0xf3, 0x8b, 0xa8),
        }
    }

    /// Load from a `key = value` file on top of `mocha`. Unknown keys are ignored.
    pub fn from_file(path: &str) -> Option<Self> {
        let contents = std::fs::read_to_string(path).ok()?;
        let mut theme = Self::mocha();
        for raw_line in contents.lines() {
            let line = raw_line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let Some((key, val)) = line.split_once('=') else {
                continue;
            };
            let Some(color) = Self::parse_color(val) else {
                continue;
            };
            match key.trim() {
                "text" => theme.text = color,
                "muted" => theme.muted = color,
                "title" => theme.title = color,
                "border" => theme.border = color,
                "header_bg" => theme.header_bg = color,
                "header_fg" => theme.header_fg = color,
                "status_bg" => theme.status_bg = color,
                "status_fg" => theme.status_fg = color,
                "highlight_fg" => theme.highlight_fg = color,
                "highlight_bg" => theme.highlight_bg = color,
                "success" => theme.success = color,
                "error" => theme.error = color,
                _ => {}
            }
        }
        Some(theme)
    }

    /// Theme from `path` if given and readable, otherwise `mocha`.
    pub fn load(path: Option<&str>) -> Self {
        path.and_then(Self::from_file).unwrap_or_else(Self::mocha)
    }

    /// Parse "#RRGGBB", "RRGGBB" or "reset".
    pub fn parse_color(s: &str) -> Option<Color> {
        let lower = s.trim().to_ascii_lowercase();
        if lower == "reset" {
            return Some(Color::Reset);
        }
        let hex = lower.strip_prefix('#').unwrap_or(lower.as_str());
        if hex.len() != 6 {
            return None;
        }
        let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
        let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
        let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
        Some(Color::Rgb(r, g, b))
    }

    pub fn level_color(&self, level: Level) -> Color {
        match level {
            Level::Success => self.success,
            Level::Error => self.error,
            Level::Warning => self.highlight_fg,
            Level::Info => self.status_fg,
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::mocha()
    }
}

#[derive(Clone, Debug)]
pub struct Toast {
    pub message: String,
    pub level: Level,
    pub shown_at: Instant,
}

/// Modal dialogs owned by the UI (the form dialog lives in the session view).
#[derive(Clone, Debug)]
pub enum ModalState {
    /// Yes/no prompt; `selected` 0 is Yes, 1 is No.
    Confirm { message: String, selected: usize },
    Help,
}

pub struct AppState {
    pub started_at: Instant,
    pub view: View,
    pub selected_user_index: usize,
    pub rows_per_page: usize,
    pub theme: Theme,
    pub keymap: Keymap,
    pub modal: Option<ModalState>,
    pub pending_confirm: Option<oneshot::Sender<bool>>,
    pub toasts: VecDeque<Toast>,
    pub base_url: String,
    /// Commands handed to the session so far.
    pub commands_sent: u64,
    /// An Add/Edit was sent but the session has not applied it yet; holds its
    /// position in the command stream.
    pub form_pending: Option<u64>,
}

impl AppState {
    pub fn new(theme: Theme, keymap: Keymap, base_url: impl Into<String>) -> Self {
        Self {
            started_at: Instant::now(),
            view: View::default(),
            selected_user_index: 0,
            rows_per_page: 10,
            theme,
            keymap,
            modal: None,
            pending_confirm: None,
            toasts: VecDeque::new(),
            base_url: base_url.into(),
            commands_sent: 0,
            form_pending: None,
        }
    }

    pub fn input_mode(&self) -> InputMode {
        if self.modal.is_some() {
            InputMode::Modal
        } else if self.view.form.is_open() || self.form_pending.is_some() {
            InputMode::Form
        } else {
            InputMode::Normal
        }
    }

    pub fn users(&self) -> &[UserRecord] {
        &self.view.users
    }

    pub fn selected_user(&self) -> Option<&UserRecord> {
        self.view.users.get(self.selected_user_index)
    }

    /// Adopt a new session snapshot, keeping the selection in range.
    pub fn set_view(&mut self, view: View) {
        if self.form_pending.is_some_and(|seq| view.handled >= seq) {
            self.form_pending = None;
        }
        self.view = view;
        let len = self.view.users.len();
        if self.selected_user_index >= len {
            self.selected_user_index = len.saturating_sub(1);
        }
    }

    /// Note a command on its way to the session. Keys typed after an Add/Edit
    /// belong to the form even before the session has opened it.
    pub fn command_sent(&mut self, cmd: &Command) {
        self.commands_sent += 1;
        if matches!(cmd, Command::Add | Command::Edit(_)) {
            self.form_pending = Some(self.commands_sent);
        }
    }

    pub fn handle_ui_request(&mut self, req: UiRequest) {
        match req {
            UiRequest::Toast { message, level } => self.push_toast(message, level),
            UiRequest::Confirm { message, reply } => self.open_confirm(message, reply),
        }
    }

    pub fn push_toast(&mut self, message: impl Into<String>, level: Level) {
        self.toasts.push_back(Toast {
            message: message.into(),
            level,
            shown_at: Instant::now(),
        });
        while self.toasts.len() > MAX_TOASTS {
            self.toasts.pop_front();
        }
    }

    pub fn expire_toasts(&mut self, now: Instant) {
        self.toasts
            .retain(|t| now.saturating_duration_since(t.shown_at) < TOAST_TTL);
    }

    /// Show a confirmation prompt. A prompt still open is answered "no".
    pub fn open_confirm(&mut self, message: String, reply: oneshot::Sender<bool>) {
        if let Some(prev) = self.pending_confirm.replace(reply) {
            let _ = prev.send(false);
        }
        self.modal = Some(ModalState::Confirm {
            message,
            selected: 1,
        });
    }

    pub fn answer_confirm(&mut self, yes: bool) {
        if let Some(reply) = self.pending_confirm.take() {
            let _ = reply.send(yes);
        }
        if matches!(self.modal, Some(ModalState::Confirm { .. })) {
            self.modal = None;
        }
    }
}

/// Re-export the application event loop entry function.
pub use update::run_app as run;
