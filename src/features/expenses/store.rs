use crate::features::expenses::models::{Expense, STATUS_COMPLETE, STATUS_PENDING};
use crate::features::expenses::repository;
use crate::shared::database::{get_database_path, initialize_database, initialize_database_in_memory};
use crate::shared::errors::{AppError, AppResult};
use crate::shared::notify::{watch, Snapshots, TableNotifier};
use chrono::Local;
use rusqlite::Connection;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

/// 経費テーブル名（変更通知のキー）
pub const EXPENSES_TABLE: &str = "expenses";

/// 経費ストア
///
/// 経費テーブルを唯一の所有者として管理し、書き込み・集計・購読クエリを
/// 提供します。すべての書き込みはコミット後に変更通知を配信し、購読中の
/// クエリが最新の結果セットを再配信します。
pub struct ExpenseStore {
    conn: Arc<Mutex<Connection>>,
    notifier: Arc<TableNotifier>,
}

impl ExpenseStore {
    /// 初期化済みの接続からストアを作成する
    ///
    /// # 引数
    /// * `conn` - データベース接続
    /// * `notifier` - テーブル変更の通知器
    ///
    /// # 戻り値
    /// ストアインスタンス
    pub fn new(conn: Connection, notifier: Arc<TableNotifier>) -> Self {
        Self {
            conn: Arc::new(Mutex::new(conn)),
            notifier,
        }
    }

    /// 指定パスのデータベースでストアを開く
    ///
    /// # 引数
    /// * `database_path` - データベースファイルのパス
    ///
    /// # 戻り値
    /// ストアインスタンス、または失敗時はエラー
    pub fn open(database_path: &Path) -> AppResult<Self> {
        let conn = initialize_database(database_path)?;

        Ok(Self::new(conn, Arc::new(TableNotifier::new())))
    }

    /// 環境に応じた既定パスのデータベースでストアを開く
    ///
    /// # 戻り値
    /// ストアインスタンス、または失敗時はエラー
    pub fn open_default() -> AppResult<Self> {
        let database_path = get_database_path()?;

        Self::open(&database_path)
    }

    /// インメモリデータベースでストアを開く（テストや一時利用向け）
    ///
    /// # 戻り値
    /// ストアインスタンス、または失敗時はエラー
    pub fn open_in_memory() -> AppResult<Self> {
        let conn = initialize_database_in_memory()?;

        Ok(Self::new(conn, Arc::new(TableNotifier::new())))
    }

    /// 変更通知器を取得する
    ///
    /// # 戻り値
    /// このストアが使用している通知器
    pub fn notifier(&self) -> Arc<TableNotifier> {
        Arc::clone(&self.notifier)
    }

    /// データベース接続のロックを取得する
    fn lock(&self) -> AppResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| AppError::concurrency(format!("データベースロック取得失敗: {e}")))
    }

    // ========== 書き込み操作 ==========

    /// 経費を挿入する
    ///
    /// # 引数
    /// * `expense` - 挿入する経費（idが0の場合は自動採番）
    ///
    /// # 戻り値
    /// 採番されたID、または失敗時はエラー
    pub fn insert(&self, expense: &Expense) -> AppResult<i64> {
        validate_expense(expense)?;

        let id = {
            let conn = self.lock()?;
            repository::insert(&conn, expense)?
        };

        self.notifier.notify(EXPENSES_TABLE);
        log::debug!("経費を作成しました: id={id}");

        Ok(id)
    }

    /// 複数の経費を1トランザクションで挿入する
    ///
    /// # 引数
    /// * `expenses` - 挿入する経費のリスト
    ///
    /// # 戻り値
    /// 入力順に対応する採番済みIDのリスト、または失敗時はエラー
    ///
    /// # 挿入の仕様
    /// いずれかが失敗した場合は全体をロールバックし、1行も追加しない
    pub fn insert_batch(&self, expenses: &[Expense]) -> AppResult<Vec<i64>> {
        for expense in expenses {
            validate_expense(expense)?;
        }

        let ids = {
            let conn = self.lock()?;
            repository::insert_batch(&conn, expenses)?
        };

        self.notifier.notify(EXPENSES_TABLE);
        log::debug!("経費を{}件一括作成しました", ids.len());

        Ok(ids)
    }

    /// 詳細未入力の保留中経費を作成する
    ///
    /// # 引数
    /// * `date` - 発生日時（エポックミリ秒）
    /// * `amount` - 金額
    /// * `merchant` - 支払先
    ///
    /// # 戻り値
    /// 採番されたID、または失敗時はエラー
    pub fn create_pending(
        &self,
        date: i64,
        amount: f64,
        merchant: impl Into<String>,
    ) -> AppResult<i64> {
        self.insert(&Expense::pending(date, amount, merchant))
    }

    /// 経費を全カラム更新する
    ///
    /// # 引数
    /// * `expense` - 更新後の経費（idで対象行を特定）
    ///
    /// # 戻り値
    /// 成功時はOk(())、失敗時はエラー
    ///
    /// # 更新の仕様
    /// 存在しないidの場合は影響行数0のまま正常終了する
    pub fn update(&self, expense: &Expense) -> AppResult<()> {
        validate_expense(expense)?;

        {
            let conn = self.lock()?;
            repository::update(&conn, expense)?;
        }

        self.notifier.notify(EXPENSES_TABLE);

        Ok(())
    }

    /// 経費のステータスのみを更新する
    ///
    /// # 引数
    /// * `id` - 経費ID
    /// * `status` - 新しいステータス
    ///
    /// # 戻り値
    /// 成功時はOk(())、失敗時はエラー
    pub fn update_status(&self, id: i64, status: &str) -> AppResult<()> {
        {
            let conn = self.lock()?;
            repository::update_status(&conn, id, status)?;
        }

        self.notifier.notify(EXPENSES_TABLE);

        Ok(())
    }

    /// 経費の詳細（説明・カテゴリ・ステータス）を更新する
    ///
    /// # 引数
    /// * `id` - 経費ID
    /// * `description` - 新しい説明
    /// * `category` - 新しいカテゴリ
    /// * `status` - 新しいステータス
    ///
    /// # 戻り値
    /// 成功時はOk(())、失敗時はエラー
    pub fn update_details(
        &self,
        id: i64,
        description: Option<&str>,
        category: Option<&str>,
        status: &str,
    ) -> AppResult<()> {
        {
            let conn = self.lock()?;
            repository::update_details(&conn, id, description, category, status)?;
        }

        self.notifier.notify(EXPENSES_TABLE);

        Ok(())
    }

    /// 経費の詳細を更新し、入力状況に応じてステータスを遷移させる
    ///
    /// # 引数
    /// * `id` - 経費ID
    /// * `description` - 新しい説明
    /// * `category` - 新しいカテゴリ
    ///
    /// # 戻り値
    /// 成功時はOk(())、失敗時はエラー
    ///
    /// # ステータスの遷移
    /// 説明とカテゴリの両方が入力されている場合のみ入力完了とする
    pub fn complete_details(
        &self,
        id: i64,
        description: Option<&str>,
        category: Option<&str>,
    ) -> AppResult<()> {
        let has_details = description.map_or(false, |d| !d.trim().is_empty())
            && category.map_or(false, |c| !c.trim().is_empty());
        let status = if has_details {
            STATUS_COMPLETE
        } else {
            STATUS_PENDING
        };

        self.update_details(id, description, category, status)
    }

    /// 経費を削除する
    ///
    /// # 引数
    /// * `expense` - 削除する経費（idで対象行を特定）
    ///
    /// # 戻り値
    /// 成功時はOk(())、失敗時はエラー
    pub fn delete(&self, expense: &Expense) -> AppResult<()> {
        self.delete_by_id(expense.id)
    }

    /// 経費をIDで削除する
    ///
    /// # 引数
    /// * `id` - 経費ID
    ///
    /// # 戻り値
    /// 成功時はOk(())、失敗時はエラー
    ///
    /// # 削除の仕様
    /// 存在しないidの場合は影響行数0のまま正常終了する
    pub fn delete_by_id(&self, id: i64) -> AppResult<()> {
        {
            let conn = self.lock()?;
            repository::delete_by_id(&conn, id)?;
        }

        self.notifier.notify(EXPENSES_TABLE);

        Ok(())
    }

    /// 経費を全件削除する
    ///
    /// # 戻り値
    /// 成功時はOk(())、失敗時はエラー
    pub fn delete_all(&self) -> AppResult<()> {
        {
            let conn = self.lock()?;
            repository::delete_all(&conn)?;
        }

        self.notifier.notify(EXPENSES_TABLE);

        Ok(())
    }

    /// 指定ステータスの経費をすべて削除する
    ///
    /// # 引数
    /// * `status` - 削除対象のステータス
    ///
    /// # 戻り値
    /// 成功時はOk(())、失敗時はエラー
    pub fn delete_by_status(&self, status: &str) -> AppResult<()> {
        {
            let conn = self.lock()?;
            repository::delete_by_status(&conn, status)?;
        }

        self.notifier.notify(EXPENSES_TABLE);

        Ok(())
    }

    // ========== 読み取り操作 ==========

    /// IDで経費を取得する
    ///
    /// # 引数
    /// * `id` - 経費ID
    ///
    /// # 戻り値
    /// 経費（存在しない場合はNone）、または失敗時はエラー
    pub fn get_by_id(&self, id: i64) -> AppResult<Option<Expense>> {
        let conn = self.lock()?;
        repository::find_by_id(&conn, id)
    }

    /// 全経費の金額合計を取得する
    ///
    /// # 戻り値
    /// 金額合計（対象行が0件の場合はNone）、または失敗時はエラー
    pub fn sum_amount(&self) -> AppResult<Option<f64>> {
        let conn = self.lock()?;
        repository::sum_amount(&conn)
    }

    /// 指定ステータスの金額合計を取得する
    ///
    /// # 引数
    /// * `status` - ステータス
    ///
    /// # 戻り値
    /// 金額合計（対象行が0件の場合はNone）、または失敗時はエラー
    pub fn sum_amount_by_status(&self, status: &str) -> AppResult<Option<f64>> {
        let conn = self.lock()?;
        repository::sum_amount_by_status(&conn, status)
    }

    /// 指定カテゴリの金額合計を取得する
    ///
    /// # 引数
    /// * `category` - カテゴリ
    ///
    /// # 戻り値
    /// 金額合計（対象行が0件の場合はNone）、または失敗時はエラー
    pub fn sum_amount_by_category(&self, category: &str) -> AppResult<Option<f64>> {
        let conn = self.lock()?;
        repository::sum_amount_by_category(&conn, category)
    }

    /// 経費の件数を取得する
    ///
    /// # 戻り値
    /// 件数、または失敗時はエラー
    pub fn count_all(&self) -> AppResult<i64> {
        let conn = self.lock()?;
        repository::count_all(&conn)
    }

    /// 指定ステータスの経費件数を取得する
    ///
    /// # 引数
    /// * `status` - ステータス
    ///
    /// # 戻り値
    /// 件数、または失敗時はエラー
    pub fn count_by_status(&self, status: &str) -> AppResult<i64> {
        let conn = self.lock()?;
        repository::count_by_status(&conn, status)
    }

    /// 使用中のカテゴリ一覧を取得する
    ///
    /// # 戻り値
    /// 重複なしのカテゴリ一覧（NULLと空文字は除外、ソート済み）
    pub fn list_categories(&self) -> AppResult<Vec<String>> {
        let conn = self.lock()?;
        repository::list_categories(&conn)
    }

    /// 使用中の支払先一覧を取得する
    ///
    /// # 戻り値
    /// 重複なしの支払先一覧（ソート済み）
    pub fn list_merchants(&self) -> AppResult<Vec<String>> {
        let conn = self.lock()?;
        repository::list_merchants(&conn)
    }

    // ========== 購読クエリ ==========

    /// クエリを購読する共通処理
    fn watch_query<T, F>(&self, query: F) -> Snapshots<T>
    where
        T: Send + 'static,
        F: Fn(&Connection) -> AppResult<T> + Send + 'static,
    {
        let conn = Arc::clone(&self.conn);

        watch(&self.notifier, EXPENSES_TABLE, move || {
            let guard = conn
                .lock()
                .map_err(|e| AppError::concurrency(format!("データベースロック取得失敗: {e}")))?;
            query(&guard)
        })
    }

    /// 全経費を購読する（新しい日付順）
    ///
    /// # 戻り値
    /// スナップショットの購読ハンドル
    pub fn watch_all(&self) -> Snapshots<Vec<Expense>> {
        self.watch_query(repository::find_all)
    }

    /// 指定ステータスの経費を購読する（新しい日付順）
    ///
    /// # 引数
    /// * `status` - ステータス
    ///
    /// # 戻り値
    /// スナップショットの購読ハンドル
    pub fn watch_by_status(&self, status: &str) -> Snapshots<Vec<Expense>> {
        let status = status.to_string();
        self.watch_query(move |conn| repository::find_by_status(conn, &status))
    }

    /// 保留中の経費を購読する（新しい日付順）
    ///
    /// # 戻り値
    /// スナップショットの購読ハンドル
    pub fn watch_pending(&self) -> Snapshots<Vec<Expense>> {
        self.watch_by_status(STATUS_PENDING)
    }

    /// 入力完了の経費を購読する（新しい日付順）
    ///
    /// # 戻り値
    /// スナップショットの購読ハンドル
    pub fn watch_complete(&self) -> Snapshots<Vec<Expense>> {
        self.watch_by_status(STATUS_COMPLETE)
    }

    /// 指定カテゴリの経費を購読する（完全一致、新しい日付順）
    ///
    /// # 引数
    /// * `category` - カテゴリ
    ///
    /// # 戻り値
    /// スナップショットの購読ハンドル
    pub fn watch_by_category(&self, category: &str) -> Snapshots<Vec<Expense>> {
        let category = category.to_string();
        self.watch_query(move |conn| repository::find_by_category(conn, &category))
    }

    /// 支払先名の部分一致で経費を購読する（大文字小文字区別あり、新しい日付順）
    ///
    /// # 引数
    /// * `merchant` - 支払先名の部分文字列
    ///
    /// # 戻り値
    /// スナップショットの購読ハンドル
    pub fn watch_by_merchant(&self, merchant: &str) -> Snapshots<Vec<Expense>> {
        let merchant = merchant.to_string();
        self.watch_query(move |conn| repository::find_by_merchant(conn, &merchant))
    }

    /// 日付範囲の経費を購読する（両端含む、新しい日付順）
    ///
    /// # 引数
    /// * `start_date` - 開始日時（エポックミリ秒、含む）
    /// * `end_date` - 終了日時（エポックミリ秒、含む）
    ///
    /// # 戻り値
    /// スナップショットの購読ハンドル
    pub fn watch_by_date_range(&self, start_date: i64, end_date: i64) -> Snapshots<Vec<Expense>> {
        self.watch_query(move |conn| repository::find_by_date_range(conn, start_date, end_date))
    }

    /// 指定年月の経費を購読する（新しい日付順）
    ///
    /// # 引数
    /// * `month` - 年月（YYYY-MM形式）
    ///
    /// # 戻り値
    /// スナップショットの購読ハンドル
    pub fn watch_by_month(&self, month: &str) -> Snapshots<Vec<Expense>> {
        let month = month.to_string();
        self.watch_query(move |conn| repository::find_by_month(conn, &month))
    }

    /// 今月の経費を購読する（新しい日付順）
    ///
    /// # 戻り値
    /// スナップショットの購読ハンドル
    pub fn watch_current_month(&self) -> Snapshots<Vec<Expense>> {
        let month = Local::now().format("%Y-%m").to_string();
        self.watch_by_month(&month)
    }

    /// 支払先または説明の部分一致で経費を検索し購読する（新しい日付順）
    ///
    /// # 引数
    /// * `query` - 検索文字列
    ///
    /// # 戻り値
    /// スナップショットの購読ハンドル
    pub fn watch_search(&self, query: &str) -> Snapshots<Vec<Expense>> {
        let query = query.to_string();
        self.watch_query(move |conn| repository::search(conn, &query))
    }

    /// 指定日時以降の経費を購読する（新しい日付順）
    ///
    /// # 引数
    /// * `since` - しきい値日時（エポックミリ秒、含む）
    ///
    /// # 戻り値
    /// スナップショットの購読ハンドル
    pub fn watch_recent(&self, since: i64) -> Snapshots<Vec<Expense>> {
        self.watch_query(move |conn| repository::find_recent(conn, since))
    }

    /// 直近N日間の経費を購読する（新しい日付順）
    ///
    /// # 引数
    /// * `days` - 日数
    ///
    /// # 戻り値
    /// スナップショットの購読ハンドル
    pub fn watch_recent_days(&self, days: i64) -> Snapshots<Vec<Expense>> {
        let since = (Local::now() - chrono::Duration::days(days)).timestamp_millis();
        self.watch_recent(since)
    }
}

/// 経費のバリデーション
///
/// # 引数
/// * `expense` - 検証対象の経費
///
/// # 戻り値
/// バリデーション成功時はOk(())、失敗時はエラー
fn validate_expense(expense: &Expense) -> AppResult<()> {
    // バリデーション: 支払先は必須
    if expense.merchant.trim().is_empty() {
        return Err(AppError::validation("支払先は必須です"));
    }

    // バリデーション: 金額は有限の数値
    if !expense.amount.is_finite() {
        return Err(AppError::validation("金額が数値として不正です"));
    }

    Ok(())
}
