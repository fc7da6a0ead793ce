//! ファイル名フィルタ

use serde::{Deserialize, Serialize};

/// クエリと候補の組に対する真偽判定
///
/// 描画時と確定時で同じ判定を使うため、副作用を持ってはならない。
pub trait FileFilter {
    fn matches(&self, query: &str, candidate: &str) -> bool;
}

/// 部分文字列マッチ（空クエリはすべてに一致）
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SubstringFilter {
    pub case_sensitive: bool,
}

impl FileFilter for SubstringFilter {
    fn matches(&self, query: &str, candidate: &str) -> bool {
        if query.is_empty() {
            return true;
        }
        if self.case_sensitive {
            candidate.contains(query)
        } else {
            candidate.to_lowercase().contains(&query.to_lowercase())
        }
    }
}

/// クエリの文字が順番通りに現れればマッチ
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SubsequenceFilter {
    pub case_sensitive: bool,
}

impl FileFilter for SubsequenceFilter {
    fn matches(&self, query: &str, candidate: &str) -> bool {
        let mut remaining = candidate.chars();
        query.chars().all(|q| {
            remaining
                .by_ref()
                .any(|c| chars_equal(c, q, self.case_sensitive))
        })
    }
}

fn chars_equal(a: char, b: char, case_sensitive: bool) -> bool {
    if case_sensitive {
        return a == b;
    }
    a == b || a.to_lowercase().eq(b.to_lowercase())
}

/// 設定から選ぶフィルタ種別
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum FilterKind {
    Substring {
        #[serde(rename = "caseSensitive")]
        case_sensitive: bool,
    },
    Subsequence {
        #[serde(rename = "caseSensitive")]
        case_sensitive: bool,
    },
}

impl Default for FilterKind {
    fn default() -> Self {
        FilterKind::Substring {
            case_sensitive: false,
        }
    }
}

impl FilterKind {
    pub fn case_sensitive(&self) -> bool {
        match *self {
            FilterKind::Substring { case_sensitive } | FilterKind::Subsequence { case_sensitive } => {
                case_sensitive
            }
        }
    }

    pub fn with_case_sensitive(self, case_sensitive: bool) -> Self {
        match self {
            FilterKind::Substring { .. } => FilterKind::Substring { case_sensitive },
            FilterKind::Subsequence { .. } => FilterKind::Subsequence { case_sensitive },
        }
    }
}

impl FileFilter for FilterKind {
    fn matches(&self, query: &str, candidate: &str) -> bool {
        match *self {
            FilterKind::Substring { case_sensitive } => {
                SubstringFilter { case_sensitive }.matches(query, candidate)
            }
            FilterKind::Subsequence { case_sensitive } => {
                SubsequenceFilter { case_sensitive }.matches(query, candidate)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn substring_is_case_insensitive_by_default() {
        let filter = SubstringFilter::default();
        assert!(filter.matches("READ", "readme.md"));
        assert!(filter.matches("", "anything"));
        assert!(!filter.matches("xyz", "readme.md"));
    }

    #[test]
    fn substring_case_sensitive() {
        let filter = SubstringFilter { case_sensitive: true };
        assert!(!filter.matches("READ", "readme.md"));
        assert!(filter.matches("read", "readme.md"));
    }

    #[test]
    fn subsequence_requires_order() {
        let filter = SubsequenceFilter::default();
        assert!(filter.matches("rdm", "readme.md"));
        assert!(filter.matches("RMD", "readme.md"));
        assert!(!filter.matches("mdr", "readme.md"));
        assert!(filter.matches("", "x"));
    }

    #[test]
    fn filter_kind_delegates() {
        let kind = FilterKind::Subsequence { case_sensitive: false };
        assert!(kind.matches("tdo", "todo.txt"));
        assert!(!FilterKind::default().matches("tdo", "todo.txt"));
        assert!(kind.with_case_sensitive(true).case_sensitive());
    }
}
