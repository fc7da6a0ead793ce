//! エディタセッション
//!
//! ディレクトリインデックス・バッファテーブル・表示中バッファ・ファジーファインダー・
//! エラーメッセージを一つの所有構造体にまとめ、すべての変更をメソッド経由で行う。
//! 失敗したファイル操作はエラースロットに記録され、他の状態は変わらない。

pub mod snapshot;

pub use snapshot::{BufferSnapshot, FinderSnapshot, SessionSnapshot};

use crate::buffer::{Buffer, BufferTable, SlotId, UNTITLED_NAME};
use crate::config::Config;
use crate::error::{AfaireError, ErrorSlot, Result};
use crate::file::{validate_file_name, DirectoryIndex, DirectoryStore};
use crate::finder::{Direction, FilterKind, FuzzyFinder};
use std::ops::Range;
use std::path::Path;

/// エディタの全状態
#[derive(Debug, Clone)]
pub struct EditorSession {
    config: Config,
    store: DirectoryStore,
    index: DirectoryIndex,
    buffers: BufferTable,
    finder: FuzzyFinder,
    error: ErrorSlot,
}

impl EditorSession {
    /// 設定からセッションを作成（ディレクトリの走査は初回描画時に行う）
    pub fn new(config: Config) -> Result<Self> {
        config.limits.validate()?;
        let limits = config.limits;

        Ok(Self {
            store: DirectoryStore::new(config.directory.clone()),
            index: DirectoryIndex::new(limits.max_files, limits.max_filename_len),
            buffers: BufferTable::new(limits.buffer_slots, limits.buffer_capacity),
            finder: FuzzyFinder::new(),
            error: ErrorSlot::new(),
            config,
        })
    }

    /// 既定設定でディレクトリを開く
    pub fn with_directory(directory: impl AsRef<Path>) -> Result<Self> {
        Self::new(Config::new(directory.as_ref()))
    }

    fn capture<T>(&mut self, result: Result<T>) -> Result<T> {
        if let Err(error) = &result {
            self.error.set(error);
        }
        result
    }

    // ---- 参照系 ----

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn directory(&self) -> &Path {
        self.store.root()
    }

    /// 既知のファイル名（走査順）
    pub fn files(&self) -> &[String] {
        self.index.entries()
    }

    pub fn buffers(&self) -> &BufferTable {
        &self.buffers
    }

    pub fn active_slot(&self) -> SlotId {
        self.buffers.current_slot()
    }

    pub fn active_buffer(&self) -> &Buffer {
        self.buffers.current()
    }

    pub fn finder(&self) -> &FuzzyFinder {
        &self.finder
    }

    pub fn filter(&self) -> FilterKind {
        self.config.filter
    }

    pub fn error_message(&self) -> Option<&str> {
        self.error.message()
    }

    /// 表示中バッファがこのファイルか（表示ラベルではなくファイル名で比較）
    pub fn is_open_file(&self, filename: &str) -> bool {
        self.buffers.current().filename() == Some(filename)
    }

    /// ファイルを開いているスロット
    pub fn slot_for(&self, filename: &str) -> Option<SlotId> {
        self.buffers.find_open(filename)
    }

    // ---- ディレクトリ ----

    /// ディレクトリを再走査
    pub fn scan_directory(&mut self) -> Result<()> {
        let result = self.index.scan(self.store.root());
        self.capture(result)
    }

    /// まだ一度も走査していなければ走査する
    pub fn ensure_scanned(&mut self) {
        if !self.index.has_scanned() {
            let _ = self.scan_directory();
        }
    }

    // ---- ファイル操作 ----

    /// ファイルを開いて表示中にする
    ///
    /// 既に開いていて未保存の変更があれば、読み直さずに切り替えるだけ。
    pub fn open(&mut self, filename: &str) -> Result<SlotId> {
        let result = self.open_inner(filename);
        self.capture(result)
    }

    fn open_inner(&mut self, filename: &str) -> Result<SlotId> {
        validate_file_name(filename, self.config.limits.max_filename_len)?;
        let capacity = self.config.limits.buffer_capacity;

        if let Some(slot) = self.buffers.find_open(filename) {
            let dirty = self.buffers.get(slot).map(Buffer::is_dirty).unwrap_or(false);
            if !dirty {
                let content = self.store.read_truncated(filename, capacity)?;
                if let Some(buffer) = self.buffers.get_mut(slot) {
                    buffer.load(content);
                }
            }
            self.buffers.set_current(slot);
            log::debug!("switched to open buffer {} (slot {})", filename, slot);
            return Ok(slot);
        }

        let slot = self
            .buffers
            .find_or_allocate(filename)
            .ok_or(AfaireError::BufferPoolExhausted {
                capacity: self.buffers.capacity(),
            })?;
        let content = self.store.read_truncated(filename, capacity)?;

        if let Some(buffer) = self.buffers.get_mut(slot) {
            buffer.activate(filename);
            buffer.load(content);
        }
        self.buffers.set_current(slot);
        log::info!("opened {} in slot {}", filename, slot);
        Ok(slot)
    }

    /// 空ファイルを作成する（開きはしない）
    ///
    /// 既存ファイルは切り詰められる。そのファイルを開いているバッファは空・変更なしになる。
    pub fn create(&mut self, filename: &str) -> Result<()> {
        let result = self.create_inner(filename);
        self.capture(result)
    }

    fn create_inner(&mut self, filename: &str) -> Result<()> {
        validate_file_name(filename, self.config.limits.max_filename_len)?;
        self.store.create_empty(filename)?;

        if let Some(slot) = self.buffers.find_open(filename) {
            if let Some(buffer) = self.buffers.get_mut(slot) {
                buffer.load(String::new());
            }
        }
        log::info!("created {}", filename);
        let _ = self.scan_directory();
        Ok(())
    }

    /// 表示中バッファを保存する
    ///
    /// 変更がなければ何もしない（`Ok(false)`）。書き込んだら `Ok(true)`。
    pub fn save(&mut self) -> Result<bool> {
        let result = self.save_inner();
        self.capture(result)
    }

    fn save_inner(&mut self) -> Result<bool> {
        let buffer = self.buffers.current();
        if !buffer.is_dirty() {
            return Ok(false);
        }
        let filename = buffer
            .filename()
            .ok_or_else(|| AfaireError::FileSaveFailed {
                path: UNTITLED_NAME.to_string(),
                message: "buffer is not associated with a file".to_string(),
            })?
            .to_string();

        self.store.write_exact(&filename, buffer.content())?;
        self.buffers.current_mut().set_dirty(false, true);
        log::info!("saved {}", filename);
        let _ = self.scan_directory();
        Ok(true)
    }

    /// ディスク上のファイルを削除する
    ///
    /// 表示中バッファのファイルなら内容と関連付けを消す。スロットは解放しない。
    pub fn delete(&mut self, filename: &str) -> Result<()> {
        let result = self.delete_inner(filename);
        self.capture(result)
    }

    fn delete_inner(&mut self, filename: &str) -> Result<()> {
        validate_file_name(filename, self.config.limits.max_filename_len)?;
        self.store.remove(filename)?;

        if self.is_open_file(filename) {
            self.buffers.current_mut().clear_file_association();
        }
        log::info!("deleted {}", filename);
        let _ = self.scan_directory();
        Ok(())
    }

    // ---- 編集 ----

    /// 表示中バッファが編集された
    pub fn mark_edited(&mut self) {
        self.buffers.current_mut().mark_edited();
    }

    /// 表示中バッファに挿入（容量に収まる分だけ）
    pub fn insert_str(&mut self, at: usize, text: &str) -> usize {
        let inserted = self.buffers.current_mut().insert_str(at, text);
        if inserted > 0 {
            self.mark_edited();
        }
        inserted
    }

    /// 表示中バッファの範囲を削除
    pub fn delete_range(&mut self, range: Range<usize>) -> usize {
        let removed = self.buffers.current_mut().delete_range(range);
        if removed > 0 {
            self.mark_edited();
        }
        removed
    }

    /// 表示中バッファの内容を置き換え
    pub fn replace_content(&mut self, text: &str) -> bool {
        let changed = self.buffers.current_mut().replace_content(text);
        if changed {
            self.mark_edited();
        }
        changed
    }

    // ---- タブ ----

    pub fn switch_to(&mut self, slot: SlotId) -> bool {
        self.buffers.set_current(slot)
    }

    /// タブを閉じる（未保存の変更は破棄される）
    pub fn close(&mut self, slot: SlotId) -> bool {
        let closed = self.buffers.close(slot);
        if closed {
            log::debug!("closed slot {}", slot);
        }
        closed
    }

    pub fn next_tab(&mut self) {
        let slot = self.buffers.next_tab();
        self.buffers.set_current(slot);
    }

    pub fn prev_tab(&mut self) {
        let slot = self.buffers.prev_tab();
        self.buffers.set_current(slot);
    }

    // ---- ファジーファインダー ----

    pub fn fuzzy_open(&mut self) {
        self.finder.open();
    }

    pub fn fuzzy_query_changed(&mut self, text: &str) {
        let filter = self.config.filter;
        self.finder.set_query(text, self.index.entries(), &filter);
    }

    pub fn fuzzy_move(&mut self, direction: Direction) {
        let filter = self.config.filter;
        self.finder.move_selection(direction, self.index.entries(), &filter);
    }

    /// 選択を確定してファイルを開き、ポップアップを閉じる
    ///
    /// 選択が一致範囲外なら何もせず `Ok(None)`。
    pub fn fuzzy_commit(&mut self) -> Result<Option<SlotId>> {
        if !self.finder.is_open() {
            return Ok(None);
        }
        let filter = self.config.filter;
        let Some(filename) = self.finder.resolve(self.index.entries(), &filter) else {
            return Ok(None);
        };
        self.finder.close();
        self.open(&filename).map(Some)
    }

    pub fn fuzzy_cancel(&mut self) {
        self.finder.close();
    }

    pub fn fuzzy_take_focus(&mut self) -> bool {
        self.finder.take_focus_request()
    }

    pub fn fuzzy_matches(&self) -> Vec<&str> {
        self.finder.matches(self.index.entries(), &self.config.filter)
    }

    pub fn fuzzy_match_count(&self) -> usize {
        self.finder.match_count(self.index.entries(), &self.config.filter)
    }

    // ---- エラー ----

    pub fn dismiss_error(&mut self) {
        self.error.dismiss();
    }

    /// 描画用のスナップショット
    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot::capture(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Limits;
    use std::fs;
    use tempfile::tempdir;

    fn session_with_limits(dir: &Path, limits: Limits) -> EditorSession {
        let mut config = Config::new(dir);
        config.limits = limits;
        EditorSession::new(config).unwrap()
    }

    #[test]
    fn error_is_captured_in_slot() {
        let dir = tempdir().unwrap();
        let mut session = EditorSession::with_directory(dir.path()).unwrap();

        assert!(session.open("missing.txt").is_err());
        assert!(session.error_message().unwrap().contains("missing.txt"));

        session.dismiss_error();
        assert_eq!(session.error_message(), None);
    }

    #[test]
    fn pool_exhaustion_surfaces_an_error() {
        let dir = tempdir().unwrap();
        for name in ["a", "b", "c"] {
            fs::write(dir.path().join(name), name).unwrap();
        }
        let mut session = session_with_limits(
            dir.path(),
            Limits {
                buffer_slots: 3,
                ..Limits::default()
            },
        );

        session.open("a").unwrap();
        session.open("b").unwrap();
        let result = session.open("c");
        assert_eq!(result, Err(AfaireError::BufferPoolExhausted { capacity: 3 }));
        assert!(session.is_open_file("b"));
    }

    #[test]
    fn reopening_dirty_buffer_keeps_edits() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("a.txt"), "disk").unwrap();
        let mut session = EditorSession::with_directory(dir.path()).unwrap();

        let slot = session.open("a.txt").unwrap();
        session.insert_str(4, "!");
        session.switch_to(0);

        assert_eq!(session.open("a.txt").unwrap(), slot);
        assert_eq!(session.active_buffer().content(), "disk!");
        assert!(session.active_buffer().is_dirty());
    }

    #[test]
    fn reopening_clean_buffer_reloads_from_disk() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("a.txt"), "v1").unwrap();
        let mut session = EditorSession::with_directory(dir.path()).unwrap();

        session.open("a.txt").unwrap();
        fs::write(dir.path().join("a.txt"), "v2").unwrap();
        session.open("a.txt").unwrap();
        assert_eq!(session.active_buffer().content(), "v2");
    }

    #[test]
    fn saving_scratch_buffer_fails_without_writing() {
        let dir = tempdir().unwrap();
        let mut session = EditorSession::with_directory(dir.path()).unwrap();
        session.insert_str(0, "scratch");

        match session.save() {
            Err(AfaireError::FileSaveFailed { path, .. }) => assert_eq!(path, UNTITLED_NAME),
            other => panic!("unexpected save result: {:?}", other),
        }
        assert!(session.active_buffer().is_dirty());
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn create_rejects_path_separators() {
        let dir = tempdir().unwrap();
        let mut session = EditorSession::with_directory(dir.path()).unwrap();
        assert!(matches!(
            session.create("../escape.txt"),
            Err(AfaireError::InvalidFileName { .. })
        ));
        assert!(session.error_message().is_some());
    }

    #[test]
    fn create_over_open_file_resets_its_buffer() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("a.txt"), "old").unwrap();
        let mut session = EditorSession::with_directory(dir.path()).unwrap();

        let slot = session.open("a.txt").unwrap();
        session.insert_str(0, "x");
        session.create("a.txt").unwrap();

        let buffer = session.buffers().get(slot).unwrap();
        assert_eq!(buffer.content(), "");
        assert!(!buffer.is_dirty());
        assert_eq!(buffer.display_label(), "  a.txt");
    }

    #[test]
    fn deleting_inactive_file_leaves_buffers_alone() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("a.txt"), "a").unwrap();
        fs::write(dir.path().join("b.txt"), "b").unwrap();
        let mut session = EditorSession::with_directory(dir.path()).unwrap();

        session.open("a.txt").unwrap();
        session.delete("b.txt").unwrap();
        assert_eq!(session.active_buffer().content(), "a");
        assert_eq!(session.files(), &["a.txt".to_string()]);
    }

    #[test]
    fn no_op_edits_do_not_mark_dirty() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("a.txt"), "abc").unwrap();
        let mut session = EditorSession::with_directory(dir.path()).unwrap();
        session.open("a.txt").unwrap();

        assert_eq!(session.delete_range(1..1), 0);
        assert!(!session.replace_content("abc"));
        assert!(!session.active_buffer().is_dirty());
    }

    #[test]
    fn fuzzy_commit_out_of_range_keeps_popup_open() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("a.txt"), "").unwrap();
        let mut session = EditorSession::with_directory(dir.path()).unwrap();
        session.scan_directory().unwrap();

        session.fuzzy_open();
        session.fuzzy_query_changed("zzz");
        assert_eq!(session.fuzzy_commit(), Ok(None));
        assert!(session.finder().is_open());
    }

    #[test]
    fn ensure_scanned_only_scans_once() {
        let dir = tempdir().unwrap();
        let mut session = EditorSession::with_directory(dir.path()).unwrap();
        session.ensure_scanned();
        assert!(session.files().is_empty());

        fs::write(dir.path().join("late.txt"), "").unwrap();
        session.ensure_scanned();
        assert!(session.files().is_empty());

        session.scan_directory().unwrap();
        assert_eq!(session.files(), &["late.txt".to_string()]);
    }
}
