//! ファジーファインダー
//!
//! ディレクトリインデックスをクエリで絞り込み、選択してファイルを開くポップアップの状態管理

pub mod matcher;
pub mod state;

pub use matcher::{FileFilter, FilterKind, SubsequenceFilter, SubstringFilter};
pub use state::{Direction, FinderState, FuzzyFinder};
