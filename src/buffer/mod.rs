//! バッファ管理モジュール
//!
//! 固定容量のテキストバッファと、それを収めるスロットプールを提供

pub mod table;

pub use table::BufferTable;

use std::ops::Range;

/// バッファスロットの識別子
pub type SlotId = usize;

/// 起動時から常にアクティブなスクラッチバッファのスロット
pub const SCRATCH_SLOT: SlotId = 0;

/// ファイル名を持たないバッファの表示名
pub const UNTITLED_NAME: &str = "[scratch]";

/// 変更ありを示すラベル接頭辞
pub const DIRTY_MARKER: &str = "* ";
/// 変更なしのラベル接頭辞（同じ2文字幅）
pub const CLEAN_MARKER: &str = "  ";

/// `max` バイト以下に収まるよう、文字境界で切り詰める
pub fn truncate_at_char_boundary(text: &mut String, max: usize) {
    if text.len() <= max {
        return;
    }
    let mut end = max;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    text.truncate(end);
}

/// `index` 以下で最も近い文字境界
fn floor_char_boundary(text: &str, index: usize) -> usize {
    let mut index = index.min(text.len());
    while !text.is_char_boundary(index) {
        index -= 1;
    }
    index
}

/// 表示ラベルを生成
pub fn format_label(dirty: bool, filename: &str) -> String {
    let name = if filename.is_empty() { UNTITLED_NAME } else { filename };
    let marker = if dirty { DIRTY_MARKER } else { CLEAN_MARKER };
    format!("{}{}", marker, name)
}

/// 単一の編集セッション
#[derive(Debug, Clone)]
pub struct Buffer {
    /// スロットが使用中（タブとして表示される）か
    active: bool,
    /// 未保存の変更があるか
    dirty: bool,
    /// 関連ファイル名（空ならファイルなし）
    filename: String,
    /// 内容
    content: String,
    /// 最大バイト数
    capacity: usize,
    /// 表示ラベル（状態が変わった時だけ再生成）
    label: String,
    /// ラベル再生成の回数
    label_revision: u64,
}

impl Buffer {
    pub fn new(capacity: usize) -> Self {
        Self {
            active: false,
            dirty: false,
            filename: String::new(),
            content: String::with_capacity(capacity.min(4096)),
            capacity,
            label: format_label(false, ""),
            label_revision: 0,
        }
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// 関連ファイル名（なければ `None`）
    pub fn filename(&self) -> Option<&str> {
        if self.filename.is_empty() {
            None
        } else {
            Some(&self.filename)
        }
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// 残り容量（バイト）
    pub fn remaining(&self) -> usize {
        self.capacity.saturating_sub(self.content.len())
    }

    pub fn display_label(&self) -> &str {
        &self.label
    }

    pub fn label_revision(&self) -> u64 {
        self.label_revision
    }

    /// 変更フラグを設定
    ///
    /// `force` でなければ、状態が実際に変わった時だけラベルを作り直す。
    pub fn set_dirty(&mut self, dirty: bool, force: bool) {
        if force || self.dirty != dirty {
            self.dirty = dirty;
            self.refresh_label();
        }
    }

    /// 編集された（何度呼んでもラベル再生成は一回）
    pub fn mark_edited(&mut self) {
        self.set_dirty(true, false);
    }

    fn refresh_label(&mut self) {
        self.label = format_label(self.dirty, &self.filename);
        self.label_revision += 1;
    }

    /// スロットを使用中にし、ファイルを関連付ける
    pub(crate) fn activate(&mut self, filename: &str) {
        self.active = true;
        self.filename.clear();
        self.filename.push_str(filename);
    }

    /// 読み込んだ内容で完全に置き換え、変更なしにする
    pub(crate) fn load(&mut self, content: String) {
        self.content = content;
        truncate_at_char_boundary(&mut self.content, self.capacity);
        self.set_dirty(false, true);
    }

    /// 空・変更なし・未使用に戻す
    pub(crate) fn reset(&mut self) {
        self.active = false;
        self.filename.clear();
        self.content.clear();
        self.set_dirty(false, true);
    }

    /// 内容とファイルの関連付けを消す（変更フラグは維持）
    pub(crate) fn clear_file_association(&mut self) {
        self.filename.clear();
        self.content.clear();
        self.refresh_label();
    }

    /// 容量に収まる分だけ挿入し、挿入したバイト数を返す
    pub fn insert_str(&mut self, at: usize, text: &str) -> usize {
        let at = floor_char_boundary(&self.content, at);
        let mut fitted = text.to_string();
        truncate_at_char_boundary(&mut fitted, self.remaining());
        if fitted.is_empty() {
            return 0;
        }
        self.content.insert_str(at, &fitted);
        fitted.len()
    }

    /// 範囲を削除し、削除したバイト数を返す
    pub fn delete_range(&mut self, range: Range<usize>) -> usize {
        let start = floor_char_boundary(&self.content, range.start);
        let end = floor_char_boundary(&self.content, range.end.max(range.start));
        if start >= end {
            return 0;
        }
        self.content.replace_range(start..end, "");
        end - start
    }

    /// 内容全体を置き換える（容量で切り詰め）。内容が変わったかを返す
    pub fn replace_content(&mut self, text: &str) -> bool {
        let mut next = text.to_string();
        truncate_at_char_boundary(&mut next, self.capacity);
        if next == self.content {
            return false;
        }
        self.content = next;
        true
    }
}
