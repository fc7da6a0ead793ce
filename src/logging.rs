//! ロギングシステム
//!
//! `log` ファサードの出力先と、JSON Lines 形式のデバッグイベントログを提供

use serde::Serialize;
use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::{SystemTime, UNIX_EPOCH};

/// ログ出力設定
#[derive(Debug, Clone, PartialEq)]
pub struct LogConfig {
    /// 出力する最低レベル
    pub level: log::LevelFilter,
    /// 標準エラー出力へ書くか（TUI表示中は無効にする）
    pub output_stderr: bool,
    /// デバッグログの出力先
    pub debug_log_path: Option<PathBuf>,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: log::LevelFilter::Warn,
            output_stderr: false,
            debug_log_path: None,
        }
    }
}

impl LogConfig {
    /// デバッグログを有効にした設定
    pub fn with_debug_log(mut self, path: PathBuf) -> Self {
        self.level = log::LevelFilter::Debug;
        self.debug_log_path = Some(path);
        self
    }
}

/// 既定のデバッグログ出力先（`~/.afaire-log/debug.log`）
pub fn default_log_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".afaire-log").join("debug.log"))
}

/// 親ディレクトリを作成
pub(crate) fn ensure_parent_dir(path: &Path) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    Ok(())
}

/// `log` ファサードの出力先
#[derive(Debug)]
pub struct Logger {
    level: log::LevelFilter,
    output_stderr: bool,
    output_file: Option<Mutex<std::fs::File>>,
}

impl Logger {
    pub fn new(config: &LogConfig) -> Self {
        let output_file = config.debug_log_path.as_deref().and_then(|path| {
            ensure_parent_dir(path).ok()?;
            OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .ok()
                .map(Mutex::new)
        });

        Self {
            level: config.level,
            output_stderr: config.output_stderr,
            output_file,
        }
    }

    fn should_log(&self, level: log::Level) -> bool {
        level <= self.level
    }

    /// 標準エラーには平文、ファイルにはデバッグイベントと同じ JSON 行を書く
    fn write_record(&self, record: &log::Record) {
        if self.output_stderr {
            eprintln!("{} [{}] {}", record.level(), record.target(), record.args());
        }

        if let Some(file) = &self.output_file {
            let payload = serde_json::json!({
                "level": record.level().as_str(),
                "target": record.target(),
                "message": record.args().to_string()
            });
            if let Ok(line) = json_line("log", &payload) {
                if let Ok(mut file) = file.lock() {
                    let _ = writeln!(file, "{line}");
                }
            }
        }
    }
}

impl log::Log for Logger {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        self.should_log(metadata.level())
    }

    fn log(&self, record: &log::Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        self.write_record(record);
    }

    fn flush(&self) {
        if let Some(file) = &self.output_file {
            if let Ok(mut file) = file.lock() {
                let _ = file.flush();
            }
        }
    }
}

/// ロガーをインストール（二回目以降は何もしない）
pub fn init(config: &LogConfig) {
    let logger = Logger::new(config);
    if log::set_boxed_logger(Box::new(logger)).is_ok() {
        log::set_max_level(config.level);
    }
}

/// デバッグイベントを JSON Lines 形式で出力するロガー
pub struct DebugLogger {
    path: PathBuf,
}

impl DebugLogger {
    pub fn new(path: PathBuf) -> io::Result<Self> {
        ensure_parent_dir(&path)?;
        Ok(Self { path })
    }

    pub fn log_event<T: Serialize>(&self, tag: &str, payload: &T) -> io::Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;

        let line = json_line(tag, payload)?;
        writeln!(file, "{line}")?;
        Ok(())
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }
}

/// `{"tag", "ts", "payload"}` 形式の一行
fn json_line<T: Serialize>(tag: &str, payload: &T) -> serde_json::Result<String> {
    let record = serde_json::json!({
        "tag": tag,
        "ts": timestamp_ms(),
        "payload": payload
    });
    serde_json::to_string(&record)
}

fn timestamp_ms() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|dur| dur.as_millis())
        .unwrap_or_default()
}
