//! プレゼンテーションシェル
//!
//! キー入力をセッション操作に変換する。描画ライブラリには依存しないので、
//! フロントエンドはこの状態を読み取って描画するだけでよい。

pub mod cursor;

use crate::buffer::SlotId;
use crate::finder::Direction;
use crate::input::{Action, Key, KeyCode, KeyMap};
use crate::logging::DebugLogger;
use crate::session::EditorSession;

/// 入力フォーカス
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Editor,
    Files,
}

/// シェルの状態
pub struct Shell {
    session: EditorSession,
    keymap: KeyMap,
    focus: Focus,
    show_files: bool,
    show_preview: bool,
    /// 新規ファイルポップアップの入力（開いていなければ `None`）
    new_file_input: Option<String>,
    /// ファイル一覧のハイライト行
    file_cursor: usize,
    /// スロットごとのカーソル（バイトオフセット）
    cursors: Vec<usize>,
    /// ファインダー入力欄にフォーカスがあるか
    finder_focused: bool,
    running: bool,
    debug_log: Option<DebugLogger>,
}

impl Shell {
    pub fn new(session: EditorSession) -> Self {
        let slots = session.buffers().capacity();
        Self {
            session,
            keymap: KeyMap::new(),
            focus: Focus::Editor,
            show_files: true,
            show_preview: true,
            new_file_input: None,
            file_cursor: 0,
            cursors: vec![0; slots],
            finder_focused: false,
            running: true,
            debug_log: None,
        }
    }

    pub fn with_debug_log(mut self, logger: DebugLogger) -> Self {
        self.debug_log = Some(logger);
        self
    }

    pub fn session(&self) -> &EditorSession {
        &self.session
    }

    pub fn keymap(&self) -> &KeyMap {
        &self.keymap
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn focus(&self) -> Focus {
        self.focus
    }

    pub fn show_files(&self) -> bool {
        self.show_files
    }

    pub fn show_preview(&self) -> bool {
        self.show_preview
    }

    pub fn new_file_input(&self) -> Option<&str> {
        self.new_file_input.as_deref()
    }

    pub fn file_cursor(&self) -> usize {
        self.file_cursor
    }

    pub fn finder_focused(&self) -> bool {
        self.finder_focused
    }

    /// 表示中バッファのカーソル
    pub fn cursor(&self) -> usize {
        let slot = self.session.active_slot();
        cursor::clamp(self.session.active_buffer().content(), self.cursors[slot])
    }

    fn set_cursor(&mut self, at: usize) {
        let slot = self.session.active_slot();
        self.cursors[slot] = at;
    }

    /// 毎フレームの処理（初回走査とフォーカス要求の消費）
    pub fn frame(&mut self) {
        self.session.ensure_scanned();
        if self.session.fuzzy_take_focus() {
            self.finder_focused = true;
        }
        self.clamp_file_cursor();
    }

    fn clamp_file_cursor(&mut self) {
        let len = self.session.files().len();
        self.file_cursor = self.file_cursor.min(len.saturating_sub(1));
    }

    /// キー入力を処理
    pub fn handle_key(&mut self, key: Key) {
        let tag = self.dispatch(key);
        if let Some(logger) = &self.debug_log {
            if let Err(err) = logger.log_event(tag, &self.session.snapshot()) {
                log::warn!("debug log write failed: {}", err);
            }
        }
    }

    fn dispatch(&mut self, key: Key) -> &'static str {
        // エラーポップアップはモーダル
        if self.session.error_message().is_some() {
            if matches!(key.code, KeyCode::Enter | KeyCode::Esc) {
                self.session.dismiss_error();
            }
            return "error-popup";
        }

        if self.new_file_input.is_some() {
            self.handle_new_file_key(key);
            return "new-file";
        }

        if self.session.finder().is_open() {
            self.handle_finder_key(key);
            return "finder";
        }

        if let Some(action) = self.keymap.lookup(&key) {
            self.run_action(action);
            return "action";
        }

        match self.focus {
            Focus::Files if self.show_files => self.handle_files_key(key),
            _ => self.handle_editor_key(key),
        }
        "edit"
    }

    fn run_action(&mut self, action: Action) {
        match action {
            Action::NewFile => self.new_file_input = Some(String::new()),
            Action::Save => {
                let _ = self.session.save();
            }
            Action::Quit => self.running = false,
            Action::ToggleFiles => {
                self.show_files = !self.show_files;
                if !self.show_files {
                    self.focus = Focus::Editor;
                }
            }
            Action::TogglePreview => self.show_preview = !self.show_preview,
            Action::FindFile => self.session.fuzzy_open(),
            Action::CloseTab => {
                let slot = self.session.active_slot();
                if self.session.close(slot) {
                    self.cursors[slot] = 0;
                }
            }
            Action::NextTab => self.session.next_tab(),
            Action::PrevTab => self.session.prev_tab(),
            Action::ToggleFocus => {
                self.focus = match self.focus {
                    Focus::Editor if self.show_files => Focus::Files,
                    _ => Focus::Editor,
                };
            }
        }
    }

    fn handle_new_file_key(&mut self, key: Key) {
        let Some(input) = self.new_file_input.as_mut() else {
            return;
        };
        match key.code {
            KeyCode::Enter => {
                let name = std::mem::take(input);
                self.new_file_input = None;
                let _ = self.session.create(name.trim());
            }
            KeyCode::Esc => self.new_file_input = None,
            KeyCode::Backspace => {
                input.pop();
            }
            KeyCode::Char(c) if key.is_insertable_char() => input.push(c),
            _ => {}
        }
    }

    fn handle_finder_key(&mut self, key: Key) {
        match key.code {
            KeyCode::Esc => {
                self.session.fuzzy_cancel();
                self.finder_focused = false;
            }
            KeyCode::Enter => {
                if let Ok(Some(slot)) = self.session.fuzzy_commit() {
                    self.after_open(slot);
                }
                if !self.session.finder().is_open() {
                    self.finder_focused = false;
                }
            }
            KeyCode::Up => self.session.fuzzy_move(Direction::Up),
            KeyCode::Down => self.session.fuzzy_move(Direction::Down),
            KeyCode::Backspace => {
                let mut query = self.session.finder().query().to_string();
                query.pop();
                self.session.fuzzy_query_changed(&query);
            }
            KeyCode::Char(c) if key.is_insertable_char() => {
                let mut query = self.session.finder().query().to_string();
                query.push(c);
                self.session.fuzzy_query_changed(&query);
            }
            _ => {}
        }
    }

    fn handle_files_key(&mut self, key: Key) {
        let len = self.session.files().len();
        match key.code {
            KeyCode::Up => self.file_cursor = self.file_cursor.saturating_sub(1),
            KeyCode::Down => {
                if self.file_cursor + 1 < len {
                    self.file_cursor += 1;
                }
            }
            KeyCode::Enter => {
                if let Some(name) = self.session.files().get(self.file_cursor).cloned() {
                    if let Ok(slot) = self.session.open(&name) {
                        self.after_open(slot);
                        self.focus = Focus::Editor;
                    }
                }
            }
            KeyCode::Delete => {
                if let Some(name) = self.session.files().get(self.file_cursor).cloned() {
                    let _ = self.session.delete(&name);
                    self.clamp_file_cursor();
                }
            }
            _ => {}
        }
    }

    fn after_open(&mut self, slot: SlotId) {
        let len = self
            .session
            .buffers()
            .get(slot)
            .map(|b| b.content().len())
            .unwrap_or(0);
        self.cursors[slot] = self.cursors[slot].min(len);
    }

    fn handle_editor_key(&mut self, key: Key) {
        let at = self.cursor();
        let next = {
            let text = self.session.active_buffer().content();
            match key.code {
                KeyCode::Left => Some(cursor::prev_boundary(text, at)),
                KeyCode::Right => Some(cursor::next_boundary(text, at)),
                KeyCode::Up => Some(cursor::line_up(text, at)),
                KeyCode::Down => Some(cursor::line_down(text, at)),
                KeyCode::Home => Some(cursor::line_start(text, at)),
                KeyCode::End => Some(cursor::line_end(text, at)),
                _ => None,
            }
        };
        if let Some(next) = next {
            self.set_cursor(next);
            return;
        }

        match key.code {
            KeyCode::Char(c) if key.is_insertable_char() => {
                let mut buf = [0u8; 4];
                self.insert_at_cursor(c.encode_utf8(&mut buf));
            }
            KeyCode::Enter => self.insert_at_cursor("\n"),
            KeyCode::Tab => self.insert_at_cursor("\t"),
            KeyCode::Backspace => {
                let prev = cursor::prev_boundary(self.session.active_buffer().content(), at);
                let removed = self.session.delete_range(prev..at);
                self.set_cursor(at - removed);
            }
            KeyCode::Delete => {
                let next = cursor::next_boundary(self.session.active_buffer().content(), at);
                self.session.delete_range(at..next);
            }
            _ => {}
        }
    }

    fn insert_at_cursor(&mut self, text: &str) {
        let at = self.cursor();
        let inserted = self.session.insert_str(at, text);
        self.set_cursor(at + inserted);
    }

    /// セッションへの直接アクセス
    pub fn session_mut(&mut self) -> &mut EditorSession {
        &mut self.session
    }
}
