//! ファジーファインダーの状態管理
//!
//! 選択カーソルは絞り込み後の一致列に対する位置であり、元のインデックスではない。
//! 確定時は描画時と同じフィルタと入力で一致列を作り直して位置からファイル名を引く。

use super::matcher::FileFilter;

/// ポップアップの状態
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FinderState {
    Closed,
    Open,
}

/// カーソル移動方向
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
}

/// ファジーファインダー
#[derive(Debug, Clone)]
pub struct FuzzyFinder {
    state: FinderState,
    /// 検索クエリ
    query: String,
    /// 一致列内の選択位置（未選択は `None`）
    selection: Option<usize>,
    /// 入力フォーカス要求（開くたびに一度だけ消費される）
    focus_pending: bool,
}

impl FuzzyFinder {
    pub fn new() -> Self {
        Self {
            state: FinderState::Closed,
            query: String::new(),
            selection: None,
            focus_pending: false,
        }
    }

    pub fn state(&self) -> FinderState {
        self.state
    }

    pub fn is_open(&self) -> bool {
        self.state == FinderState::Open
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn selection(&self) -> Option<usize> {
        self.selection
    }

    /// Closed → Open。すでに開いていれば何もしない
    pub fn open(&mut self) {
        if self.is_open() {
            return;
        }
        self.state = FinderState::Open;
        self.selection = None;
        self.focus_pending = true;
    }

    /// Open → Closed。クエリと選択を両方クリアする
    pub fn close(&mut self) {
        self.state = FinderState::Closed;
        self.query.clear();
        self.selection = None;
        self.focus_pending = false;
    }

    /// フォーカス要求を消費（開いた直後の一回だけ true）
    pub fn take_focus_request(&mut self) -> bool {
        std::mem::take(&mut self.focus_pending)
    }

    /// 一致するファイル名を元の順序で返す
    pub fn matches<'a, F: FileFilter + ?Sized>(
        &self,
        candidates: &'a [String],
        filter: &F,
    ) -> Vec<&'a str> {
        candidates
            .iter()
            .filter(|name| filter.matches(&self.query, name))
            .map(String::as_str)
            .collect()
    }

    pub fn match_count<F: FileFilter + ?Sized>(&self, candidates: &[String], filter: &F) -> usize {
        candidates
            .iter()
            .filter(|name| filter.matches(&self.query, name))
            .count()
    }

    /// クエリを更新し、選択を新しい一致数の範囲に収める
    pub fn set_query<F: FileFilter + ?Sized>(&mut self, text: &str, candidates: &[String], filter: &F) {
        self.query.clear();
        self.query.push_str(text);
        let count = self.match_count(candidates, filter);
        self.selection = match self.selection {
            _ if count == 0 => None,
            Some(index) => Some(index.min(count - 1)),
            None => None,
        };
    }

    /// 選択を上下に動かす（折り返さず端で止まる）
    pub fn move_selection<F: FileFilter + ?Sized>(
        &mut self,
        direction: Direction,
        candidates: &[String],
        filter: &F,
    ) {
        let count = self.match_count(candidates, filter);
        if count == 0 {
            self.selection = None;
            return;
        }
        let current = self.effective_selection();
        let next = match direction {
            Direction::Up => current.saturating_sub(1),
            Direction::Down => current.saturating_add(1),
        };
        self.selection = Some(next.min(count - 1));
    }

    /// 未選択のときは先頭の一致を指しているとみなす
    pub fn effective_selection(&self) -> usize {
        self.selection.unwrap_or(0)
    }

    /// 選択位置を一致列から引き直してファイル名を得る
    pub fn resolve<F: FileFilter + ?Sized>(&self, candidates: &[String], filter: &F) -> Option<String> {
        let position = self.effective_selection();
        candidates
            .iter()
            .filter(|name| filter.matches(&self.query, name))
            .nth(position)
            .cloned()
    }
}

impl Default for FuzzyFinder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::finder::SubstringFilter;

    fn files(names: &[&str]) -> Vec<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    #[test]
    fn open_requests_focus_once() {
        let mut finder = FuzzyFinder::new();
        assert!(!finder.take_focus_request());

        finder.open();
        assert!(finder.take_focus_request());
        assert!(!finder.take_focus_request());

        finder.close();
        finder.open();
        assert!(finder.take_focus_request());
    }

    #[test]
    fn cursor_indexes_filtered_matches() {
        let candidates = files(&["apple.txt", "banana.txt", "grape.txt"]);
        let filter = SubstringFilter::default();
        let mut finder = FuzzyFinder::new();
        finder.open();
        finder.set_query("ap", &candidates, &filter);

        assert_eq!(finder.matches(&candidates, &filter), vec!["apple.txt", "grape.txt"]);
        finder.move_selection(Direction::Down, &candidates, &filter);
        finder.move_selection(Direction::Down, &candidates, &filter);
        assert_eq!(finder.selection(), Some(1));
        assert_eq!(finder.resolve(&candidates, &filter).as_deref(), Some("grape.txt"));
    }

    #[test]
    fn selection_clamps_without_wrapping() {
        let candidates = files(&["a1", "a2", "a3"]);
        let filter = SubstringFilter::default();
        let mut finder = FuzzyFinder::new();
        finder.open();

        for _ in 0..10 {
            finder.move_selection(Direction::Down, &candidates, &filter);
        }
        assert_eq!(finder.selection(), Some(2));

        for _ in 0..10 {
            finder.move_selection(Direction::Up, &candidates, &filter);
        }
        assert_eq!(finder.selection(), Some(0));
    }

    #[test]
    fn query_change_clamps_selection() {
        let candidates = files(&["note1", "note2", "todo"]);
        let filter = SubstringFilter::default();
        let mut finder = FuzzyFinder::new();
        finder.open();
        finder.move_selection(Direction::Down, &candidates, &filter);
        finder.move_selection(Direction::Down, &candidates, &filter);
        assert_eq!(finder.selection(), Some(2));

        finder.set_query("note", &candidates, &filter);
        assert_eq!(finder.selection(), Some(1));

        finder.set_query("zzz", &candidates, &filter);
        assert_eq!(finder.selection(), None);
        assert_eq!(finder.resolve(&candidates, &filter), None);
    }

    #[test]
    fn close_clears_query_and_selection() {
        let candidates = files(&["a", "b"]);
        let filter = SubstringFilter::default();
        let mut finder = FuzzyFinder::new();
        finder.open();
        finder.set_query("a", &candidates, &filter);
        finder.move_selection(Direction::Down, &candidates, &filter);

        finder.close();
        assert_eq!(finder.state(), FinderState::Closed);
        assert_eq!(finder.query(), "");
        assert_eq!(finder.selection(), None);
    }
}
