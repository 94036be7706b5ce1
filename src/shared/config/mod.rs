/// 環境判定と環境変数の管理
pub mod environment;

/// アプリケーション初期化処理
pub mod initialization;

// 便利な再エクスポート
pub use environment::{
    get_database_filename, get_environment, initialize_logging_system,
    load_environment_variables, Environment, EnvironmentConfig,
};
pub use initialization::{
    ensure_app_data_directory, initialize_application, log_initialization_complete,
    InitializationResult,
};
