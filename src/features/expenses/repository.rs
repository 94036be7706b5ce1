use crate::features::expenses::models::Expense;
use crate::shared::errors::AppResult;
use rusqlite::{params, Connection, Row};

/// 取得系クエリで共通のカラム並び
const EXPENSE_COLUMNS: &str = "id, date, amount, merchant, description, category, status";

/// 行を経費モデルへ変換する
///
/// # 引数
/// * `row` - EXPENSE_COLUMNSの並びで取得した行
///
/// # 戻り値
/// 経費モデル、または失敗時はエラー
fn map_expense(row: &Row) -> rusqlite::Result<Expense> {
    Ok(Expense {
        id: row.get(0)?,
        date: row.get(1)?,
        amount: row.get(2)?,
        merchant: row.get(3)?,
        description: row.get(4)?,
        category: row.get(5)?,
        status: row.get(6)?,
    })
}

/// 経費一覧クエリを実行する
///
/// # 引数
/// * `conn` - データベース接続
/// * `sql` - EXPENSE_COLUMNSを取得するSELECT文
/// * `params` - バインドパラメータ
///
/// # 戻り値
/// 経費のリスト、または失敗時はエラー
fn select_expenses(
    conn: &Connection,
    sql: &str,
    params: &[&dyn rusqlite::ToSql],
) -> AppResult<Vec<Expense>> {
    let mut stmt = conn.prepare(sql)?;
    let rows = stmt.query_map(params, map_expense)?;

    rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
}

/// 経費を挿入する
///
/// # 引数
/// * `conn` - データベース接続
/// * `expense` - 挿入する経費（idが0の場合は自動採番）
///
/// # 戻り値
/// 採番されたID、または失敗時はエラー
///
/// # 挿入の仕様
/// idが0以外で既存行と重複する場合は競合エラーとなり、行は追加されない
pub fn insert(conn: &Connection, expense: &Expense) -> AppResult<i64> {
    if expense.id == 0 {
        conn.execute(
            "INSERT INTO expenses (date, amount, merchant, description, category, status)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                expense.date,
                expense.amount,
                expense.merchant,
                expense.description,
                expense.category,
                expense.status
            ],
        )?;

        Ok(conn.last_insert_rowid())
    } else {
        conn.execute(
            "INSERT INTO expenses (id, date, amount, merchant, description, category, status)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                expense.id,
                expense.date,
                expense.amount,
                expense.merchant,
                expense.description,
                expense.category,
                expense.status
            ],
        )?;

        Ok(expense.id)
    }
}

/// 複数の経費を1トランザクションで挿入する
///
/// # 引数
/// * `conn` - データベース接続
/// * `expenses` - 挿入する経費のリスト
///
/// # 戻り値
/// 入力順に対応する採番済みIDのリスト、または失敗時はエラー
///
/// # 挿入の仕様
/// いずれかの挿入が失敗した場合は全体をロールバックし、1行も追加しない
pub fn insert_batch(conn: &Connection, expenses: &[Expense]) -> AppResult<Vec<i64>> {
    let tx = conn.unchecked_transaction()?;

    let mut ids = Vec::with_capacity(expenses.len());
    for expense in expenses {
        ids.push(insert(&tx, expense)?);
    }

    tx.commit()?;

    Ok(ids)
}

/// 経費を全カラム更新する
///
/// # 引数
/// * `conn` - データベース接続
/// * `expense` - 更新後の経費（idで対象行を特定）
///
/// # 戻り値
/// 成功時はOk(())、失敗時はエラー
///
/// # 更新の仕様
/// 存在しないidの場合は影響行数0のまま正常終了する
pub fn update(conn: &Connection, expense: &Expense) -> AppResult<()> {
    conn.execute(
        "UPDATE expenses
         SET date = ?1, amount = ?2, merchant = ?3, description = ?4, category = ?5, status = ?6
         WHERE id = ?7",
        params![
            expense.date,
            expense.amount,
            expense.merchant,
            expense.description,
            expense.category,
            expense.status,
            expense.id
        ],
    )?;

    Ok(())
}

/// 経費のステータスのみを更新する
///
/// # 引数
/// * `conn` - データベース接続
/// * `id` - 経費ID
/// * `status` - 新しいステータス
///
/// # 戻り値
/// 成功時はOk(())、失敗時はエラー
pub fn update_status(conn: &Connection, id: i64, status: &str) -> AppResult<()> {
    conn.execute(
        "UPDATE expenses SET status = ?1 WHERE id = ?2",
        params![status, id],
    )?;

    Ok(())
}

/// 経費の詳細（説明・カテゴリ・ステータス）を更新する
///
/// # 引数
/// * `conn` - データベース接続
/// * `id` - 経費ID
/// * `description` - 新しい説明
/// * `category` - 新しいカテゴリ
/// * `status` - 新しいステータス
///
/// # 戻り値
/// 成功時はOk(())、失敗時はエラー
///
/// # 更新の仕様
/// 3カラムは単一のUPDATE文で同時に更新される
pub fn update_details(
    conn: &Connection,
    id: i64,
    description: Option<&str>,
    category: Option<&str>,
    status: &str,
) -> AppResult<()> {
    conn.execute(
        "UPDATE expenses SET description = ?1, category = ?2, status = ?3 WHERE id = ?4",
        params![description, category, status, id],
    )?;

    Ok(())
}

/// 経費をIDで削除する
///
/// # 引数
/// * `conn` - データベース接続
/// * `id` - 経費ID
///
/// # 戻り値
/// 成功時はOk(())、失敗時はエラー
///
/// # 削除の仕様
/// 存在しないidの場合は影響行数0のまま正常終了する
pub fn delete_by_id(conn: &Connection, id: i64) -> AppResult<()> {
    conn.execute("DELETE FROM expenses WHERE id = ?1", params![id])?;

    Ok(())
}

/// 経費を全件削除する
///
/// # 引数
/// * `conn` - データベース接続
///
/// # 戻り値
/// 成功時はOk(())、失敗時はエラー
pub fn delete_all(conn: &Connection) -> AppResult<()> {
    conn.execute("DELETE FROM expenses", [])?;

    Ok(())
}

/// 指定ステータスの経費をすべて削除する
///
/// # 引数
/// * `conn` - データベース接続
/// * `status` - 削除対象のステータス
///
/// # 戻り値
/// 成功時はOk(())、失敗時はエラー
pub fn delete_by_status(conn: &Connection, status: &str) -> AppResult<()> {
    conn.execute("DELETE FROM expenses WHERE status = ?1", params![status])?;

    Ok(())
}

/// IDで経費を取得する
///
/// # 引数
/// * `conn` - データベース接続
/// * `id` - 経費ID
///
/// # 戻り値
/// 経費（存在しない場合はNone）、または失敗時はエラー
pub fn find_by_id(conn: &Connection, id: i64) -> AppResult<Option<Expense>> {
    let sql = format!("SELECT {EXPENSE_COLUMNS} FROM expenses WHERE id = ?1");

    match conn.query_row(&sql, params![id], map_expense) {
        Ok(expense) => Ok(Some(expense)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// 経費を全件取得する（新しい日付順）
///
/// # 引数
/// * `conn` - データベース接続
///
/// # 戻り値
/// 経費のリスト、または失敗時はエラー
pub fn find_all(conn: &Connection) -> AppResult<Vec<Expense>> {
    let sql = format!("SELECT {EXPENSE_COLUMNS} FROM expenses ORDER BY date DESC, id DESC");

    select_expenses(conn, &sql, &[])
}

/// 指定ステータスの経費を取得する（新しい日付順）
///
/// # 引数
/// * `conn` - データベース接続
/// * `status` - ステータス
///
/// # 戻り値
/// 経費のリスト、または失敗時はエラー
pub fn find_by_status(conn: &Connection, status: &str) -> AppResult<Vec<Expense>> {
    let sql = format!(
        "SELECT {EXPENSE_COLUMNS} FROM expenses WHERE status = ?1 ORDER BY date DESC, id DESC"
    );

    select_expenses(conn, &sql, &[&status])
}

/// 指定カテゴリの経費を取得する（完全一致、新しい日付順）
///
/// # 引数
/// * `conn` - データベース接続
/// * `category` - カテゴリ
///
/// # 戻り値
/// 経費のリスト、または失敗時はエラー
pub fn find_by_category(conn: &Connection, category: &str) -> AppResult<Vec<Expense>> {
    let sql = format!(
        "SELECT {EXPENSE_COLUMNS} FROM expenses WHERE category = ?1 ORDER BY date DESC, id DESC"
    );

    select_expenses(conn, &sql, &[&category])
}

/// 支払先名の部分一致で経費を取得する（大文字小文字区別あり、新しい日付順）
///
/// # 引数
/// * `conn` - データベース接続
/// * `merchant` - 支払先名の部分文字列
///
/// # 戻り値
/// 経費のリスト、または失敗時はエラー
pub fn find_by_merchant(conn: &Connection, merchant: &str) -> AppResult<Vec<Expense>> {
    let sql = format!(
        "SELECT {EXPENSE_COLUMNS} FROM expenses
         WHERE merchant LIKE '%' || ?1 || '%'
         ORDER BY date DESC, id DESC"
    );

    select_expenses(conn, &sql, &[&merchant])
}

/// 日付範囲で経費を取得する（両端含む、新しい日付順）
///
/// # 引数
/// * `conn` - データベース接続
/// * `start_date` - 開始日時（エポックミリ秒、含む）
/// * `end_date` - 終了日時（エポックミリ秒、含む）
///
/// # 戻り値
/// 経費のリスト、または失敗時はエラー
pub fn find_by_date_range(
    conn: &Connection,
    start_date: i64,
    end_date: i64,
) -> AppResult<Vec<Expense>> {
    let sql = format!(
        "SELECT {EXPENSE_COLUMNS} FROM expenses
         WHERE date BETWEEN ?1 AND ?2
         ORDER BY date DESC, id DESC"
    );

    select_expenses(conn, &sql, &[&start_date, &end_date])
}

/// 指定年月の経費を取得する（新しい日付順）
///
/// # 引数
/// * `conn` - データベース接続
/// * `month` - 年月（YYYY-MM形式）
///
/// # 戻り値
/// 経費のリスト、または失敗時はエラー
///
/// # 年月の判定
/// エポックミリ秒のdateカラムをUTCの暦で年月に変換して比較する
pub fn find_by_month(conn: &Connection, month: &str) -> AppResult<Vec<Expense>> {
    let sql = format!(
        "SELECT {EXPENSE_COLUMNS} FROM expenses
         WHERE strftime('%Y-%m', datetime(date/1000, 'unixepoch')) = ?1
         ORDER BY date DESC, id DESC"
    );

    select_expenses(conn, &sql, &[&month])
}

/// 支払先または説明の部分一致で経費を検索する（新しい日付順）
///
/// # 引数
/// * `conn` - データベース接続
/// * `query` - 検索文字列
///
/// # 戻り値
/// 経費のリスト、または失敗時はエラー
pub fn search(conn: &Connection, query: &str) -> AppResult<Vec<Expense>> {
    let sql = format!(
        "SELECT {EXPENSE_COLUMNS} FROM expenses
         WHERE description LIKE '%' || ?1 || '%'
         OR merchant LIKE '%' || ?1 || '%'
         ORDER BY date DESC, id DESC"
    );

    select_expenses(conn, &sql, &[&query])
}

/// 指定日時以降の経費を取得する（新しい日付順）
///
/// # 引数
/// * `conn` - データベース接続
/// * `since` - しきい値日時（エポックミリ秒、含む）
///
/// # 戻り値
/// 経費のリスト、または失敗時はエラー
pub fn find_recent(conn: &Connection, since: i64) -> AppResult<Vec<Expense>> {
    let sql = format!(
        "SELECT {EXPENSE_COLUMNS} FROM expenses WHERE date >= ?1 ORDER BY date DESC, id DESC"
    );

    select_expenses(conn, &sql, &[&since])
}

/// 全経費の金額合計を取得する
///
/// # 引数
/// * `conn` - データベース接続
///
/// # 戻り値
/// 金額合計（対象行が0件の場合はNone）、または失敗時はエラー
pub fn sum_amount(conn: &Connection) -> AppResult<Option<f64>> {
    conn.query_row("SELECT SUM(amount) FROM expenses", [], |row| row.get(0))
        .map_err(Into::into)
}

/// 指定ステータスの金額合計を取得する
///
/// # 引数
/// * `conn` - データベース接続
/// * `status` - ステータス
///
/// # 戻り値
/// 金額合計（対象行が0件の場合はNone）、または失敗時はエラー
pub fn sum_amount_by_status(conn: &Connection, status: &str) -> AppResult<Option<f64>> {
    conn.query_row(
        "SELECT SUM(amount) FROM expenses WHERE status = ?1",
        params![status],
        |row| row.get(0),
    )
    .map_err(Into::into)
}

/// 指定カテゴリの金額合計を取得する
///
/// # 引数
/// * `conn` - データベース接続
/// * `category` - カテゴリ
///
/// # 戻り値
/// 金額合計（対象行が0件の場合はNone）、または失敗時はエラー
pub fn sum_amount_by_category(conn: &Connection, category: &str) -> AppResult<Option<f64>> {
    conn.query_row(
        "SELECT SUM(amount) FROM expenses WHERE category = ?1",
        params![category],
        |row| row.get(0),
    )
    .map_err(Into::into)
}

/// 経費の件数を取得する
///
/// # 引数
/// * `conn` - データベース接続
///
/// # 戻り値
/// 件数、または失敗時はエラー
pub fn count_all(conn: &Connection) -> AppResult<i64> {
    conn.query_row("SELECT COUNT(*) FROM expenses", [], |row| row.get(0))
        .map_err(Into::into)
}

/// 指定ステータスの経費件数を取得する
///
/// # 引数
/// * `conn` - データベース接続
/// * `status` - ステータス
///
/// # 戻り値
/// 件数、または失敗時はエラー
pub fn count_by_status(conn: &Connection, status: &str) -> AppResult<i64> {
    conn.query_row(
        "SELECT COUNT(*) FROM expenses WHERE status = ?1",
        params![status],
        |row| row.get(0),
    )
    .map_err(Into::into)
}

/// 使用中のカテゴリ一覧を取得する（五十音・アルファベット順）
///
/// # 引数
/// * `conn` - データベース接続
///
/// # 戻り値
/// 重複なしのカテゴリ一覧（NULLと空文字は除外）、または失敗時はエラー
pub fn list_categories(conn: &Connection) -> AppResult<Vec<String>> {
    let mut stmt = conn.prepare(
        "SELECT DISTINCT category FROM expenses
         WHERE category IS NOT NULL AND category != ''
         ORDER BY category",
    )?;
    let rows = stmt.query_map([], |row| row.get(0))?;

    rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
}

/// 使用中の支払先一覧を取得する（五十音・アルファベット順）
///
/// # 引数
/// * `conn` - データベース接続
///
/// # 戻り値
/// 重複なしの支払先一覧、または失敗時はエラー
pub fn list_merchants(conn: &Connection) -> AppResult<Vec<String>> {
    let mut stmt = conn.prepare("SELECT DISTINCT merchant FROM expenses ORDER BY merchant")?;
    let rows = stmt.query_map([], |row| row.get(0))?;

    rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
}
