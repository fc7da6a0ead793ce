//! 起動設定
//!
//! コマンドライン引数と環境変数から対象ディレクトリ・容量制限・ログ設定を組み立てる

use crate::error::{AfaireError, ConfigError, Result};
use crate::finder::FilterKind;
use crate::logging::{default_log_path, LogConfig};
use std::path::PathBuf;

/// 使用方法の表示
pub const USAGE: &str =
    "Usage: afaire [--debug-log [path]] [--filter substring|subsequence] [--case-sensitive] <folder>";

/// デバッグログを有効にする環境変数
pub const DEBUG_ENV: &str = "AFAIRE_DEBUG";

/// 固定容量の上限
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limits {
    /// ディレクトリインデックスが保持する最大ファイル数
    pub max_files: usize,
    /// ファイル名の最大バイト長
    pub max_filename_len: usize,
    /// バッファスロット数（スロット0はスクラッチ）
    pub buffer_slots: usize,
    /// 1バッファあたりの最大バイト数
    pub buffer_capacity: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_files: 64,
            max_filename_len: 255,
            buffer_slots: 16,
            buffer_capacity: 64 * 1024,
        }
    }
}

impl Limits {
    /// すべての上限が正であることを確認
    pub fn validate(&self) -> Result<()> {
        let checks = [
            ("max_files", self.max_files),
            ("max_filename_len", self.max_filename_len),
            ("buffer_slots", self.buffer_slots),
            ("buffer_capacity", self.buffer_capacity),
        ];
        for (key, value) in checks {
            if value == 0 {
                return Err(ConfigError::InvalidValue {
                    key: key.to_string(),
                    value: value.to_string(),
                }
                .into());
            }
        }
        Ok(())
    }
}

/// アプリケーション設定
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// 対象ディレクトリ
    pub directory: PathBuf,
    /// 容量制限
    pub limits: Limits,
    /// ファジーファインダーのフィルタ
    pub filter: FilterKind,
    /// ログ設定
    pub log: LogConfig,
}

impl Config {
    /// 対象ディレクトリのみ指定した既定設定
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
            limits: Limits::default(),
            filter: FilterKind::default(),
            log: LogConfig::default(),
        }
    }

    /// コマンドライン引数（プログラム名を除く）から設定を作成
    pub fn from_args<I, S>(args: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let args: Vec<String> = args.into_iter().map(|a| a.as_ref().to_string()).collect();
        let mut directory: Option<PathBuf> = None;
        let mut filter = FilterKind::default();
        let mut log = LogConfig::default();

        if std::env::var_os(DEBUG_ENV).is_some() {
            if let Some(path) = default_log_path() {
                log = log.with_debug_log(path);
            }
        }

        let mut iter = args.iter().peekable();
        while let Some(arg) = iter.next() {
            match arg.as_str() {
                "--debug-log" => {
                    // 続く引数がフォルダになり得るなら、フォルダを優先する
                    let folder_follows = directory.is_some()
                        || has_positional(iter.clone().skip(1).map(String::as_str));
                    let explicit = iter
                        .peek()
                        .filter(|next| !next.starts_with('-') && folder_follows)
                        .map(|next| PathBuf::from(next.as_str()));
                    let path = match explicit {
                        Some(path) => {
                            iter.next();
                            path
                        }
                        None => default_log_path().unwrap_or_else(|| PathBuf::from("debug.log")),
                    };
                    log = log.with_debug_log(path);
                }
                "--filter" => {
                    let value = iter.next().ok_or_else(|| ConfigError::InvalidValue {
                        key: "--filter".to_string(),
                        value: String::new(),
                    })?;
                    filter = match value.as_str() {
                        "substring" => FilterKind::Substring {
                            case_sensitive: filter.case_sensitive(),
                        },
                        "subsequence" => FilterKind::Subsequence {
                            case_sensitive: filter.case_sensitive(),
                        },
                        other => {
                            return Err(ConfigError::InvalidValue {
                                key: "--filter".to_string(),
                                value: other.to_string(),
                            }
                            .into())
                        }
                    };
                }
                "--case-sensitive" => filter = filter.with_case_sensitive(true),
                option if option.starts_with("--") => {
                    return Err(ConfigError::UnknownOption {
                        option: option.to_string(),
                    }
                    .into());
                }
                positional => {
                    if directory.is_some() {
                        return Err(ConfigError::InvalidValue {
                            key: "folder".to_string(),
                            value: positional.to_string(),
                        }
                        .into());
                    }
                    directory = Some(expand_directory(positional)?);
                }
            }
        }

        let directory = directory.ok_or(AfaireError::Config(ConfigError::MissingDirectory))?;
        let config = Self {
            directory,
            limits: Limits::default(),
            filter,
            log,
        };
        config.limits.validate()?;
        Ok(config)
    }

    /// 上書き設定とマージ（上書き側が優先）
    pub fn merged_with(&self, overrides: &ConfigOverrides) -> Config {
        Config {
            directory: overrides
                .directory
                .clone()
                .unwrap_or_else(|| self.directory.clone()),
            limits: overrides.limits.unwrap_or(self.limits),
            filter: overrides.filter.unwrap_or(self.filter),
            log: overrides.log.clone().unwrap_or_else(|| self.log.clone()),
        }
    }
}

/// 部分的な上書き設定
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigOverrides {
    pub directory: Option<PathBuf>,
    pub limits: Option<Limits>,
    pub filter: Option<FilterKind>,
    pub log: Option<LogConfig>,
}

/// オプション値を除いた位置引数が残っているか
fn has_positional<'a>(mut rest: impl Iterator<Item = &'a str>) -> bool {
    while let Some(arg) = rest.next() {
        match arg {
            "--filter" => {
                rest.next();
            }
            option if option.starts_with('-') => {}
            _ => return true,
        }
    }
    false
}

/// `~` と環境変数を展開
fn expand_directory(input: &str) -> Result<PathBuf> {
    shellexpand::full(input)
        .map(|expanded| PathBuf::from(expanded.as_ref()))
        .map_err(|err| {
            ConfigError::InvalidValue {
                key: "folder".to_string(),
                value: format!("{}: {}", input, err),
            }
            .into()
        })
}
