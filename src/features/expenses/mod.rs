/// 経費機能モジュール
///
/// このモジュールは経費管理に関連するすべての機能を提供します：
/// - 経費の作成、読み取り、更新、削除（CRUD操作）
/// - 経費データのバリデーション
/// - ステータス・カテゴリ・支払先・日付範囲・年月による経費取得
/// - 金額合計や件数などの集計クエリ
/// - テーブル変更に追従する購読クエリ
// サブモジュールの宣言
pub mod models;
pub mod repository;
pub mod store;

// 公開インターフェース：外部から使用可能な型と関数をエクスポート

// モデル
pub use models::{Expense, STATUS_COMPLETE, STATUS_PENDING};

// ストア（購読クエリを含む公開API）
pub use store::{ExpenseStore, EXPENSES_TABLE};

// リポジトリ（データベース操作）
pub use repository::{
    count_all, count_by_status, delete_all, delete_by_id, delete_by_status, find_all,
    find_by_category, find_by_date_range, find_by_id, find_by_merchant, find_by_month,
    find_by_status, find_recent, insert, insert_batch, list_categories, list_merchants, search,
    sum_amount, sum_amount_by_category, sum_amount_by_status, update, update_details,
    update_status,
};
