/// 共有エラー型とエラーハンドリング
pub mod errors;

/// 共有データベース接続管理
pub mod database;

/// 共有設定管理
pub mod config;

/// テーブル変更通知とクエリ購読
pub mod notify;

// 便利な再エクスポート
pub use config::{
    get_database_filename, get_environment, initialize_application, initialize_logging_system,
    load_environment_variables, log_initialization_complete, Environment, EnvironmentConfig,
    InitializationResult,
};
pub use database::{
    create_tables, get_database_path, initialize_database, initialize_database_in_memory,
};
pub use errors::{AppError, AppResult, ErrorSeverity};
pub use notify::{watch, Snapshots, TableChange, TableNotifier};
