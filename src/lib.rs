//! afaire - flat-directory note editor
//!
//! 一つのディレクトリのファイル一覧・複数バッファのエディタ・ファジーファインダー

// コアモジュール
pub mod config;
pub mod error;
pub mod logging;

// データ層
pub mod buffer;
pub mod file;

// ロジック層
pub mod finder;
pub mod session;

// 表示層
pub mod frontend;
pub mod input;
pub mod shell;
pub mod ui;

// 公開API
pub use config::Config;
pub use error::{AfaireError, Result};
pub use frontend::TuiApplication;
pub use session::EditorSession;
