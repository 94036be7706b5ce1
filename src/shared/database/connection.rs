use crate::shared::config::{ensure_app_data_directory, get_database_filename, get_environment};
use crate::shared::errors::AppResult;
use rusqlite::Connection;
use std::path::{Path, PathBuf};

/// データベース接続を初期化し、テーブルを作成する
///
/// # 引数
/// * `database_path` - データベースファイルのパス
///
/// # 戻り値
/// データベース接続、または失敗時はエラー
///
/// # 処理内容
/// 1. データベース接続の開設
/// 2. 接続設定の適用
/// 3. テーブルとインデックスの作成
pub fn initialize_database(database_path: &Path) -> AppResult<Connection> {
    // データベース接続を開く
    let conn = Connection::open(database_path)?;

    // 接続設定を適用
    configure_connection(&conn)?;

    // テーブルを作成
    create_tables(&conn)?;

    log::info!("データベースを初期化しました: {database_path:?}");

    Ok(conn)
}

/// インメモリデータベース接続を初期化する（テストや一時利用向け）
///
/// # 戻り値
/// データベース接続、または失敗時はエラー
pub fn initialize_database_in_memory() -> AppResult<Connection> {
    let conn = Connection::open_in_memory()?;

    configure_connection(&conn)?;
    create_tables(&conn)?;

    Ok(conn)
}

/// アプリデータディレクトリ内のデータベースファイルパスを取得する
///
/// # 戻り値
/// データベースファイルのパス、または失敗時はエラー
pub fn get_database_path() -> AppResult<PathBuf> {
    // アプリケーションデータディレクトリを取得・作成
    let app_data_dir = ensure_app_data_directory()?;

    // 環境に応じたデータベースファイル名を決定
    let db_filename = get_database_filename(get_environment());
    let database_path = app_data_dir.join(db_filename);

    Ok(database_path)
}

/// 接続単位の設定を適用する
///
/// # 引数
/// * `conn` - データベース接続
///
/// # 戻り値
/// 成功時はOk(())、失敗時はエラー
///
/// # 設定内容
/// LIKE演算子を大文字小文字区別ありにする（支払先・説明の部分一致検索で使用）
fn configure_connection(conn: &Connection) -> AppResult<()> {
    conn.execute_batch("PRAGMA case_sensitive_like = ON")?;
    Ok(())
}

/// データベーステーブルを作成する
///
/// # 引数
/// * `conn` - データベース接続
///
/// # 戻り値
/// 成功時はOk(())、失敗時はエラー
pub fn create_tables(conn: &Connection) -> AppResult<()> {
    create_expenses_table(conn)?;
    create_indexes(conn)?;

    Ok(())
}

/// 経費テーブルを作成する
fn create_expenses_table(conn: &Connection) -> AppResult<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS expenses (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            date INTEGER NOT NULL,
            amount REAL NOT NULL,
            merchant TEXT NOT NULL,
            description TEXT,
            category TEXT,
            status TEXT NOT NULL
        )",
        [],
    )?;

    Ok(())
}

/// インデックスを作成する
fn create_indexes(conn: &Connection) -> AppResult<()> {
    // 経費テーブルのインデックス
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_expenses_date ON expenses(date)",
        [],
    )?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_expenses_status ON expenses(status)",
        [],
    )?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_expenses_merchant ON expenses(merchant)",
        [],
    )?;

    Ok(())
}
