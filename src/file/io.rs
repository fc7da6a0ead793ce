//! ファイルI/O操作
//!
//! 対象ディレクトリ直下のファイルに対する読み込み・保存・作成・削除

use crate::buffer::truncate_at_char_boundary;
use crate::error::{AfaireError, Result};
use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};

/// ファイル名を検証（空・パス区切り・`.`/`..`・長すぎる名前は不可）
pub fn validate_file_name(name: &str, max_len: usize) -> Result<()> {
    let invalid = name.is_empty()
        || name == "."
        || name == ".."
        || name.contains('/')
        || name.contains('\\')
        || name.contains('\0')
        || name.len() > max_len;

    if invalid {
        return Err(AfaireError::InvalidFileName {
            name: name.to_string(),
        });
    }
    Ok(())
}

/// 対象ディレクトリへのファイル操作
#[derive(Debug, Clone)]
pub struct DirectoryStore {
    root: PathBuf,
}

impl DirectoryStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn path_for(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }

    /// ファイル全体を読み込み、`capacity` バイトで切り詰める
    pub fn read_truncated(&self, name: &str, capacity: usize) -> Result<String> {
        let path = self.path_for(name);
        let open_failed = |message: String| AfaireError::FileOpenFailed {
            path: path.display().to_string(),
            message,
        };

        let file = fs::File::open(&path).map_err(|e| open_failed(e.to_string()))?;
        if file.metadata().map(|m| m.is_dir()).unwrap_or(false) {
            return Err(open_failed("is a directory".to_string()));
        }

        let mut bytes = Vec::new();
        file.take(capacity as u64)
            .read_to_end(&mut bytes)
            .map_err(|e| open_failed(e.to_string()))?;

        Ok(decode_truncated(bytes, capacity))
    }

    /// 内容をそのまま書き込む（末尾改行は付けない）
    ///
    /// 一時ファイルに書いてから置き換えるので、失敗しても元の内容は残る。
    pub fn write_exact(&self, name: &str, content: &str) -> Result<()> {
        let path = self.path_for(name);
        self.atomic_write(&path, content).map_err(|e| AfaireError::FileSaveFailed {
            path: path.display().to_string(),
            message: e.to_string(),
        })
    }

    /// 空ファイルを作成（既存ファイルは切り詰める）
    pub fn create_empty(&self, name: &str) -> Result<()> {
        let path = self.path_for(name);
        fs::File::create(&path)
            .map(|_| ())
            .map_err(|e| AfaireError::FileCreateFailed {
                path: path.display().to_string(),
                message: e.to_string(),
            })
    }

    pub fn remove(&self, name: &str) -> Result<()> {
        let path = self.path_for(name);
        fs::remove_file(&path).map_err(|e| AfaireError::FileDeleteFailed {
            path: path.display().to_string(),
            message: e.to_string(),
        })
    }

    fn atomic_write(&self, path: &Path, content: &str) -> std::io::Result<()> {
        let temp_path = temp_path_for(path);
        fs::write(&temp_path, content.as_bytes())?;
        fs::rename(&temp_path, path).map_err(|err| {
            let _ = fs::remove_file(&temp_path);
            err
        })
    }
}

fn temp_path_for(original: &Path) -> PathBuf {
    let name = original
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    original.with_file_name(format!(".{}_{}", name, std::process::id()))
}

/// UTF-8 として復号し、容量内に収める
///
/// 末尾で途切れたマルチバイト文字は捨て、不正なバイト列は置換文字にする。
fn decode_truncated(bytes: Vec<u8>, capacity: usize) -> String {
    match String::from_utf8(bytes) {
        Ok(text) => text,
        Err(err) => {
            let utf8 = err.utf8_error();
            let mut bytes = err.into_bytes();
            if utf8.error_len().is_none() {
                bytes.truncate(utf8.valid_up_to());
                // 切り詰め後は必ず妥当な UTF-8
                return String::from_utf8(bytes).unwrap_or_default();
            }
            log::warn!("file is not valid UTF-8; invalid bytes replaced");
            let mut text = String::from_utf8_lossy(&bytes).into_owned();
            truncate_at_char_boundary(&mut text, capacity);
            text
        }
    }
}
