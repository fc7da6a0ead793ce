//! エラーハンドリングシステム
//!
//! afaire 全体で使用されるエラー型と、単一スロットのエラーメッセージ通知を定義
//! ファイル操作の失敗はすべて回復可能：メッセージを記録して状態は変更しない

use thiserror::Error;

/// アプリケーション全体のエラー型
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AfaireError {
    /// ディレクトリを開けない
    #[error("Could not open directory {path}: {message}")]
    DirectoryOpenFailed { path: String, message: String },

    /// ファイルを読み込めない
    #[error("Could not open file {path}: {message}")]
    FileOpenFailed { path: String, message: String },

    /// ファイルを作成できない
    #[error("Could not create file {path}: {message}")]
    FileCreateFailed { path: String, message: String },

    /// ファイルを保存できない
    #[error("Could not save file {path}: {message}")]
    FileSaveFailed { path: String, message: String },

    /// ファイルを削除できない
    #[error("Could not delete file {path}: {message}")]
    FileDeleteFailed { path: String, message: String },

    /// バッファプールが枯渇
    #[error("All {capacity} buffers are in use; close a tab first")]
    BufferPoolExhausted { capacity: usize },

    /// ファイル名が不正
    #[error("Invalid file name: {name:?}")]
    InvalidFileName { name: String },

    /// UI操作エラー
    #[error("UI operation failed: {0}")]
    Ui(#[from] UiError),

    /// 設定エラー
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// UI操作固有のエラー
#[derive(Error, Debug, Clone, PartialEq)]
pub enum UiError {
    #[error("Terminal initialization failed")]
    TerminalInit,

    #[error("Rendering failed: {component}")]
    RenderingFailed { component: String },
}

/// 設定固有のエラー
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("Missing target directory")]
    MissingDirectory,

    #[error("Unknown option: {option}")]
    UnknownOption { option: String },

    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: String, value: String },
}

/// プロジェクト標準のResult型
pub type Result<T> = std::result::Result<T, AfaireError>;

/// 単一スロットのエラーメッセージ
///
/// キューは持たない。新しいエラーは未確認の古いエラーを上書きする。
#[derive(Debug, Clone, Default)]
pub struct ErrorSlot {
    message: Option<String>,
}

impl ErrorSlot {
    pub fn new() -> Self {
        Self { message: None }
    }

    /// エラーを記録（最新のものが勝つ）
    pub fn set(&mut self, error: &AfaireError) {
        if let Some(previous) = self.message.take() {
            log::debug!("unacknowledged error overwritten: {}", previous);
        }
        log::warn!("{}", error);
        self.message = Some(error.to_string());
    }

    /// 現在のメッセージ
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    pub fn is_set(&self) -> bool {
        self.message.is_some()
    }

    /// ユーザーが確認したのでクリア
    pub fn dismiss(&mut self) {
        self.message = None;
    }
}

/// パニックハンドラの設定
///
/// ターミナルを raw モードのまま放置しないよう、出力前に復元する
pub fn setup_panic_handler() {
    std::panic::set_hook(Box::new(|panic_info| {
        let _ = crossterm::terminal::disable_raw_mode();
        let mut out = std::io::stdout();
        let _ = crossterm::execute!(out, crossterm::terminal::LeaveAlternateScreen);

        let location = panic_info
            .location()
            .map(|loc| format!("{}:{}", loc.file(), loc.line()))
            .unwrap_or_else(|| "unknown".to_string());

        let message: &str = if let Some(s) = panic_info.payload().downcast_ref::<&str>() {
            s
        } else if let Some(s) = panic_info.payload().downcast_ref::<String>() {
            s.as_str()
        } else {
            "Unknown panic payload"
        };

        log::error!("PANIC at {}: {}", location, message);
        eprintln!("PANIC at {}: {}", location, message);
        eprintln!("Stack trace: {}", std::backtrace::Backtrace::capture());
        std::process::exit(1);
    }));
}
