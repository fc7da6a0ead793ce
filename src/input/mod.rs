//! 入力処理モジュール

pub mod keybinding;

pub use keybinding::{Action, Key, KeyCode, KeyMap, KeyModifiers};
