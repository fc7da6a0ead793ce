//! ファイル操作モジュール
//!
//! 単一のフラットなディレクトリを対象とする：
//! - サブディレクトリは辿らない
//! - 通常ファイルのみ扱う（シンボリックリンク・特殊ファイルは除外）
//! - インデックスは永続化せず、必要なたびに再スキャンする

pub mod index;
pub mod io;

pub use index::DirectoryIndex;
pub use io::{validate_file_name, DirectoryStore};
