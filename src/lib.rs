//! 経費データのローカル永続化とリアクティブクエリを提供するストア
//!
//! 単一の`expenses`テーブルをSQLite上で管理し、CRUD操作・集計クエリ・
//! テーブル変更に追従する購読クエリを提供します。購読クエリは書き込みの
//! コミットごとに最新の結果セット全体をスナップショットとして再配信します。

pub mod features;
pub mod shared;

// 主要な型の再エクスポート
pub use features::expenses::{Expense, ExpenseStore, EXPENSES_TABLE, STATUS_COMPLETE, STATUS_PENDING};
pub use shared::errors::{AppError, AppResult, ErrorSeverity};
pub use shared::notify::{Snapshots, TableNotifier};
