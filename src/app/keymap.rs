//! Keybinding configuration: defaults, an optional `key = value` file, and
//! resolution of key presses to actions on the users table.
//!
//! Only the table screen is configurable. The form and confirmation dialogs
//! use fixed keys (see `update.rs`).

use std::collections::HashMap;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Semantic keyboard actions on the users table.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum KeyAction {
    Quit,
    OpenHelp,
    /// Open the form in create mode.
    AddUser,
    /// Open the selected record in the (editable) form.
    ViewUser,
    DeleteUser,
    Refresh,
    MoveUp,
    MoveDown,
    PageUp,
    PageDown,
    /// Swallow the key.
    Ignore,
}

impl KeyAction {
    /// Human description shown in the help dialog.
    pub fn describe(self) -> &'static str {
        match self {
            KeyAction::Quit => "Quit",
            KeyAction::OpenHelp => "Help",
            KeyAction::AddUser => "Add user",
            KeyAction::ViewUser => "View / edit user",
            KeyAction::DeleteUser => "Delete user",
            KeyAction::Refresh => "Refresh list",
            KeyAction::MoveUp => "Move up",
            KeyAction::MoveDown => "Move down",
            KeyAction::PageUp => "Page up",
            KeyAction::PageDown => "Page down",
            KeyAction::Ignore => "Ignore",
        }
    }
}

#[derive(Clone, Debug)]
pub struct Keymap {
    bindings: HashMap<(KeyModifiers, KeyCode), KeyAction>,
}

impl Keymap {
    pub fn new_defaults() -> Self {
        use KeyCode::*;
        use KeyModifiers as M;
        let mut bindings = HashMap::new();
        bindings.insert((M::NONE, Char('q')), KeyAction::Quit);
        bindings.insert((M::CONTROL, Char('c')), KeyAction::Quit);
        bindings.insert((M::NONE, Esc), KeyAction::Ignore);
        bindings.insert((M::NONE, Char('?')), KeyAction::OpenHelp);
        bindings.insert((M::NONE, Char('a')), KeyAction::AddUser);
        bindings.insert((M::NONE, Char('n')), KeyAction::AddUser);
        bindings.insert((M::NONE, Enter), KeyAction::ViewUser);
        bindings.insert((M::NONE, Char('v')), KeyAction::ViewUser);
        bindings.insert((M::NONE, Char('e')), KeyAction::ViewUser);
        bindings.insert((M::NONE, Char('d')), KeyAction::DeleteUser);
        bindings.insert((M::NONE, Delete), KeyAction::DeleteUser);
        bindings.insert((M::NONE, Char('r')), KeyAction::Refresh);
        bindings.insert((M::NONE, Up), KeyAction::MoveUp);
        bindings.insert((M::NONE, Down), KeyAction::MoveDown);
        bindings.insert((M::NONE, Char('k')), KeyAction::MoveUp);
        bindings.insert((M::NONE, Char('j')), KeyAction::MoveDown);
        bindings.insert((M::NONE, PageUp), KeyAction::PageUp);
        bindings.insert((M::NONE, PageDown), KeyAction::PageDown);
        Self { bindings }
    }

    /// Keymap from `path` if given and readable, otherwise the defaults.
    pub fn load(path: Option<&str>) -> Self {
        path.and_then(Self::from_file).unwrap_or_default()
    }

    /// Read `<Action> = <KeySpec>` lines on top of the defaults.
    /// `#` comments, blank lines and unparseable lines are skipped.
    pub fn from_file(path: &str) -> Option<Self> {
        let contents = std::fs::read_to_string(path).ok()?;
        Some(Self::from_config_str(&contents))
    }

    pub fn from_config_str(contents: &str) -> Self {
        let mut map = Self::default();
        for raw in contents.lines() {
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let Some((lhs, rhs)) = line.split_once('=') else {
                continue;
            };
            if let (Some(action), Some(key)) = (parse_action(lhs), parse_key(rhs)) {
                map.bindings.insert(key, action);
            }
        }
        map
    }

    pub fn resolve(&self, key: &KeyEvent) -> Option<KeyAction> {
        self.bindings.get(&(key.modifiers, key.code)).copied()
    }

    /// Snapshot of all bindings as ((modifiers, code), action) pairs.
    pub fn all_bindings(&self) -> Vec<((KeyModifiers, KeyCode), KeyAction)> {
        self.bindings.iter().map(|(k, v)| (*k, *v)).collect()
    }

    /// Format a key into a spec like "Ctrl+c" or "PageDown".
    pub fn format_key(mods: KeyModifiers, code: KeyCode) -> String {
        use KeyCode::*;
        let base = match code {
            Enter => "Enter".to_string(),
            Delete => "Delete".to_string(),
            Esc => "Esc".to_string(),
            Tab => "Tab".to_string(),
            BackTab => "BackTab".to_string(),
            Up => "Up".to_string(),
            Down => "Down".to_string(),
            Left => "Left".to_string(),
            Right => "Right".to_string(),
            PageUp => "PageUp".to_string(),
            PageDown => "PageDown".to_string(),
            Char(c) => c.to_string(),
            _ => format!("{:?}", code),
        };
        if mods.contains(KeyModifiers::CONTROL) {
            format!("Ctrl+{}", base)
        } else {
            base
        }
    }
}

impl Default for Keymap {
    fn default() -> Self {
        Self::new_defaults()
    }
}

fn parse_key(spec: &str) -> Option<(KeyModifiers, KeyCode)> {
    use KeyCode::*;
    let s = spec.trim();
    let (mods, rest) = match s.strip_prefix("Ctrl+") {
        Some(after) => (KeyModifiers::CONTROL, after),
        None => (KeyModifiers::NONE, s),
    };
    let code = match rest {
        "Enter" => Enter,
        "Delete" => Delete,
        "Esc" | "Escape" => Esc,
        "Tab" => Tab,
        "BackTab" => BackTab,
        "Up" => Up,
        "Down" => Down,
        "Left" => Left,
        "Right" => Right,
        "PageUp" => PageUp,
        "PageDown" => PageDown,
        _ => {
            let mut chars = rest.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => Char(c),
                _ => return None,
            }
        }
    };
    Some((mods, code))
}

fn parse_action(s: &str) -> Option<KeyAction> {
    match s.trim() {
        "Quit" => Some(KeyAction::Quit),
        "OpenHelp" => Some(KeyAction::OpenHelp),
        "AddUser" => Some(KeyAction::AddUser),
        "ViewUser" => Some(KeyAction::ViewUser),
        "DeleteUser" => Some(KeyAction::DeleteUser),
        "Refresh" => Some(KeyAction::Refresh),
        "MoveUp" => Some(KeyAction::MoveUp),
        "MoveDown" => Some(KeyAction::MoveDown),
        "PageUp" => Some(KeyAction::PageUp),
        "PageDown" => Some(KeyAction::PageDown),
        "Ignore" => Some(KeyAction::Ignore),
        _ => None,
    }
}
