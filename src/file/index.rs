//! ディレクトリインデックス
//!
//! 対象ディレクトリの通常ファイル名を OS の列挙順で保持する

use crate::buffer::truncate_at_char_boundary;
use crate::error::{AfaireError, Result};
use std::fs;
use std::path::Path;

/// 既知のファイル名一覧
#[derive(Debug, Clone)]
pub struct DirectoryIndex {
    entries: Vec<String>,
    capacity: usize,
    max_name_len: usize,
    scanned: bool,
}

impl DirectoryIndex {
    pub fn new(capacity: usize, max_name_len: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
            capacity,
            max_name_len,
            scanned: false,
        }
    }

    /// ディレクトリを走査して一覧を置き換える
    ///
    /// 開けない場合は一覧を空にしたまま `DirectoryOpenFailed` を返す。
    /// 容量を超えたファイルは黙って無視する。
    pub fn scan(&mut self, dir: &Path) -> Result<()> {
        self.entries.clear();
        self.scanned = true;

        let reader = fs::read_dir(dir).map_err(|e| AfaireError::DirectoryOpenFailed {
            path: dir.display().to_string(),
            message: e.to_string(),
        })?;

        for entry in reader {
            if self.entries.len() >= self.capacity {
                log::debug!(
                    "directory index full ({} entries), remaining files ignored",
                    self.capacity
                );
                break;
            }

            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    log::warn!("skipping unreadable directory entry: {}", err);
                    continue;
                }
            };

            // file_type() はシンボリックリンクを辿らない
            let is_regular = entry.file_type().map(|ft| ft.is_file()).unwrap_or(false);
            if !is_regular {
                continue;
            }

            let mut name = entry.file_name().to_string_lossy().into_owned();
            truncate_at_char_boundary(&mut name, self.max_name_len);
            self.entries.push(name);
        }

        log::debug!("scanned {}: {} files", dir.display(), self.entries.len());
        Ok(())
    }

    /// 一度でも走査したか
    pub fn has_scanned(&self) -> bool {
        self.scanned
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn lists_regular_files_only() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("a.txt"), "a").unwrap();
        fs::write(dir.path().join("b.txt"), "b").unwrap();
        fs::create_dir(dir.path().join("sub")).unwrap();
        fs::write(dir.path().join("sub").join("nested.txt"), "n").unwrap();

        let mut index = DirectoryIndex::new(64, 255);
        index.scan(dir.path()).unwrap();

        let mut names = index.entries().to_vec();
        names.sort();
        assert_eq!(names, vec!["a.txt".to_string(), "b.txt".to_string()]);
        assert!(index.has_scanned());
    }

    #[cfg(unix)]
    #[test]
    fn symlinks_are_excluded() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("real.txt"), "r").unwrap();
        std::os::unix::fs::symlink(dir.path().join("real.txt"), dir.path().join("link.txt")).unwrap();

        let mut index = DirectoryIndex::new(64, 255);
        index.scan(dir.path()).unwrap();
        assert_eq!(index.entries(), &["real.txt".to_string()]);
    }

    #[test]
    fn stops_silently_at_capacity() {
        let dir = tempdir().unwrap();
        for i in 0..10 {
            fs::write(dir.path().join(format!("{i}.txt")), "").unwrap();
        }

        let mut index = DirectoryIndex::new(4, 255);
        index.scan(dir.path()).unwrap();
        assert_eq!(index.entries().len(), 4);
    }

    #[test]
    fn long_names_are_truncated() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("abcdefghij.txt"), "").unwrap();

        let mut index = DirectoryIndex::new(64, 5);
        index.scan(dir.path()).unwrap();
        assert_eq!(index.entries(), &["abcde".to_string()]);
    }

    #[test]
    fn rescan_replaces_previous_contents() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("old.txt"), "").unwrap();

        let mut index = DirectoryIndex::new(64, 255);
        index.scan(dir.path()).unwrap();
        assert!(index.entries().contains(&"old.txt".to_string()));

        fs::remove_file(dir.path().join("old.txt")).unwrap();
        fs::write(dir.path().join("new.txt"), "").unwrap();
        index.scan(dir.path()).unwrap();
        assert_eq!(index.entries(), &["new.txt".to_string()]);
    }

    #[test]
    fn missing_directory_leaves_index_empty() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("a.txt"), "").unwrap();

        let mut index = DirectoryIndex::new(64, 255);
        index.scan(dir.path()).unwrap();
        assert_eq!(index.entries().len(), 1);

        let result = index.scan(&dir.path().join("missing"));
        assert!(matches!(result, Err(AfaireError::DirectoryOpenFailed { .. })));
        assert!(index.entries().is_empty());
    }
}
