//! キーバインドシステム
//!
//! どのフォーカスでも有効なグローバルコマンドのキー割り当て

use crossterm::event::{KeyCode as CrosstermKeyCode, KeyEvent, KeyModifiers as CrosstermModifiers};
use std::collections::HashMap;

/// キー入力の内部表現
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Key {
    /// 修飾キー
    pub modifiers: KeyModifiers,
    /// 基本キー
    pub code: KeyCode,
}

/// 修飾キーの組み合わせ
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct KeyModifiers {
    pub ctrl: bool,
    pub alt: bool,
    pub shift: bool,
}

/// 基本キーコード
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum KeyCode {
    Char(char),
    Enter,
    Backspace,
    Delete,
    Tab,
    Up,
    Down,
    Left,
    Right,
    Home,
    End,
    Esc,
    Unknown,
}

impl Key {
    pub fn plain(code: KeyCode) -> Self {
        Self {
            modifiers: KeyModifiers::default(),
            code,
        }
    }

    pub fn ctrl(ch: char) -> Self {
        Self {
            modifiers: KeyModifiers {
                ctrl: true,
                ..KeyModifiers::default()
            },
            code: KeyCode::Char(ch),
        }
    }

    pub fn alt(code: KeyCode) -> Self {
        Self {
            modifiers: KeyModifiers {
                alt: true,
                ..KeyModifiers::default()
            },
            code,
        }
    }

    /// 挿入可能な文字かどうかを判定
    pub fn is_insertable_char(&self) -> bool {
        matches!(self.code, KeyCode::Char(_)) && !self.modifiers.ctrl && !self.modifiers.alt
    }
}

impl From<KeyEvent> for Key {
    fn from(event: KeyEvent) -> Self {
        let shift = event.modifiers.contains(CrosstermModifiers::SHIFT);
        let code = match event.code {
            // Shift付きの文字は大文字として届くので shift 情報は落とす
            CrosstermKeyCode::Char(c) => KeyCode::Char(c),
            CrosstermKeyCode::Enter => KeyCode::Enter,
            CrosstermKeyCode::Backspace => KeyCode::Backspace,
            CrosstermKeyCode::Delete => KeyCode::Delete,
            CrosstermKeyCode::Tab => KeyCode::Tab,
            CrosstermKeyCode::Up => KeyCode::Up,
            CrosstermKeyCode::Down => KeyCode::Down,
            CrosstermKeyCode::Left => KeyCode::Left,
            CrosstermKeyCode::Right => KeyCode::Right,
            CrosstermKeyCode::Home => KeyCode::Home,
            CrosstermKeyCode::End => KeyCode::End,
            CrosstermKeyCode::Esc => KeyCode::Esc,
            _ => KeyCode::Unknown,
        };
        let is_char = matches!(code, KeyCode::Char(_));

        Self {
            modifiers: KeyModifiers {
                ctrl: event.modifiers.contains(CrosstermModifiers::CONTROL),
                alt: event.modifiers.contains(CrosstermModifiers::ALT),
                shift: shift && !is_char,
            },
            code: match code {
                KeyCode::Char(c) if event.modifiers.contains(CrosstermModifiers::CONTROL) => {
                    KeyCode::Char(c.to_ascii_lowercase())
                }
                other => other,
            },
        }
    }
}

/// グローバルコマンド
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    NewFile,
    Save,
    Quit,
    ToggleFiles,
    TogglePreview,
    FindFile,
    CloseTab,
    NextTab,
    PrevTab,
    ToggleFocus,
}

impl Action {
    /// メニュー表示用のキー表記
    pub fn shortcut(&self) -> &'static str {
        match self {
            Action::NewFile => "Ctrl+N",
            Action::Save => "Ctrl+S",
            Action::Quit => "Ctrl+Q",
            Action::ToggleFiles => "Ctrl+P",
            Action::TogglePreview => "Ctrl+V",
            Action::FindFile => "Ctrl+O",
            Action::CloseTab => "Ctrl+W",
            Action::NextTab => "Alt+Right",
            Action::PrevTab => "Alt+Left",
            Action::ToggleFocus => "Ctrl+L",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Action::NewFile => "New",
            Action::Save => "Save",
            Action::Quit => "Quit",
            Action::ToggleFiles => "Files",
            Action::TogglePreview => "Preview",
            Action::FindFile => "Find",
            Action::CloseTab => "Close",
            Action::NextTab => "Next tab",
            Action::PrevTab => "Prev tab",
            Action::ToggleFocus => "Focus",
        }
    }
}

/// キーマップ
#[derive(Debug, Clone)]
pub struct KeyMap {
    bindings: HashMap<Key, Action>,
}

impl KeyMap {
    pub fn new() -> Self {
        let mut bindings = HashMap::new();
        bindings.insert(Key::ctrl('n'), Action::NewFile);
        bindings.insert(Key::ctrl('s'), Action::Save);
        bindings.insert(Key::ctrl('q'), Action::Quit);
        bindings.insert(Key::ctrl('p'), Action::ToggleFiles);
        bindings.insert(Key::ctrl('v'), Action::TogglePreview);
        bindings.insert(Key::ctrl('o'), Action::FindFile);
        bindings.insert(Key::ctrl('w'), Action::CloseTab);
        bindings.insert(Key::alt(KeyCode::Right), Action::NextTab);
        bindings.insert(Key::alt(KeyCode::Left), Action::PrevTab);
        bindings.insert(Key::ctrl('l'), Action::ToggleFocus);
        Self { bindings }
    }

    pub fn lookup(&self, key: &Key) -> Option<Action> {
        self.bindings.get(key).copied()
    }

    /// メニュー表示順のアクション一覧
    pub fn menu(&self) -> [Action; 6] {
        [
            Action::NewFile,
            Action::Save,
            Action::FindFile,
            Action::ToggleFiles,
            Action::TogglePreview,
            Action::Quit,
        ]
    }
}

impl Default for KeyMap {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn global_chords_resolve() {
        let keymap = KeyMap::new();
        assert_eq!(keymap.lookup(&Key::ctrl('s')), Some(Action::Save));
        assert_eq!(keymap.lookup(&Key::ctrl('o')), Some(Action::FindFile));
        assert_eq!(keymap.lookup(&Key::alt(KeyCode::Right)), Some(Action::NextTab));
        assert_eq!(keymap.lookup(&Key::plain(KeyCode::Char('s'))), None);
    }

    #[test]
    fn crossterm_events_convert() {
        let event = KeyEvent::new(CrosstermKeyCode::Char('S'), CrosstermModifiers::CONTROL);
        assert_eq!(Key::from(event), Key::ctrl('s'));

        let shifted = KeyEvent::new(CrosstermKeyCode::Char('A'), CrosstermModifiers::SHIFT);
        let key = Key::from(shifted);
        assert_eq!(key, Key::plain(KeyCode::Char('A')));
        assert!(key.is_insertable_char());
    }
}
