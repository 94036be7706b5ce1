/// データベース接続とスキーマの管理
pub mod connection;

pub use connection::{
    create_tables, get_database_path, initialize_database, initialize_database_in_memory,
};
