use serde::{Deserialize, Serialize};

/// 保留中ステータス（詳細の入力待ち）
pub const STATUS_PENDING: &str = "pending";

/// 入力完了ステータス
pub const STATUS_COMPLETE: &str = "complete";

/// 経費データモデル
///
/// `id`が0のレコードは未採番を表し、挿入時にストアが一意なIDを自動採番する。
/// `status`は自由なタグ文字列であり、ストア側では列挙として強制しない。
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Expense {
    pub id: i64,
    /// 発生日時（エポックミリ秒）
    pub date: i64,
    pub amount: f64,
    pub merchant: String,
    pub description: Option<String>,
    pub category: Option<String>,
    pub status: String,
}

impl Expense {
    /// 詳細未入力の保留中経費を作成する（ID未採番）
    ///
    /// # 引数
    /// * `date` - 発生日時（エポックミリ秒）
    /// * `amount` - 金額
    /// * `merchant` - 支払先
    ///
    /// # 戻り値
    /// 保留中ステータスの経費
    pub fn pending(date: i64, amount: f64, merchant: impl Into<String>) -> Self {
        Self {
            id: 0,
            date,
            amount,
            merchant: merchant.into(),
            description: None,
            category: None,
            status: STATUS_PENDING.to_string(),
        }
    }

    /// 保留中（詳細の入力待ち）かどうか
    pub fn is_pending(&self) -> bool {
        self.status == STATUS_PENDING
    }

    /// 入力完了かどうか
    pub fn is_complete(&self) -> bool {
        self.status == STATUS_COMPLETE
    }

    /// 説明とカテゴリの両方が入力済みかどうか
    pub fn has_complete_details(&self) -> bool {
        self.description
            .as_deref()
            .map_or(false, |d| !d.trim().is_empty())
            && self
                .category
                .as_deref()
                .map_or(false, |c| !c.trim().is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expense_serialization() {
        // 経費データのシリアライゼーションテスト
        let expense = Expense {
            id: 1,
            date: 1_700_000_000_000,
            amount: 1000.0,
            merchant: "コンビニ".to_string(),
            description: Some("テスト経費".to_string()),
            category: Some("食費".to_string()),
            status: STATUS_COMPLETE.to_string(),
        };

        // JSONシリアライゼーション
        let json = serde_json::to_string(&expense).unwrap();
        assert!(json.contains("\"id\":1"));
        assert!(json.contains("\"amount\":1000.0"));
        assert!(json.contains("\"merchant\":\"コンビニ\""));

        // JSONデシリアライゼーション
        let deserialized: Expense = serde_json::from_str(&json).unwrap();
        assert_eq!(deserialized, expense);
    }

    #[test]
    fn test_deserialization_without_optional_fields() {
        // 説明とカテゴリなしのデシリアライゼーションテスト
        let json = r#"{
            "id": 0,
            "date": 1700000000000,
            "amount": 1500.0,
            "merchant": "Cafe",
            "description": null,
            "category": null,
            "status": "pending"
        }"#;

        let expense: Expense = serde_json::from_str(json).unwrap();
        assert_eq!(expense.description, None);
        assert_eq!(expense.category, None);
        assert!(expense.is_pending());
    }

    #[test]
    fn test_pending_constructor() {
        // 保留中経費の作成テスト
        let expense = Expense::pending(1_700_000_000_000, 42.5, "Cafe");

        assert_eq!(expense.id, 0);
        assert_eq!(expense.date, 1_700_000_000_000);
        assert_eq!(expense.amount, 42.5);
        assert_eq!(expense.merchant, "Cafe");
        assert_eq!(expense.description, None);
        assert_eq!(expense.category, None);
        assert!(expense.is_pending());
        assert!(!expense.is_complete());
    }

    #[test]
    fn test_has_complete_details() {
        let mut expense = Expense::pending(1000, 100.0, "Cafe");

        // 両方未入力の場合
        assert!(!expense.has_complete_details());

        // 説明のみ入力の場合
        expense.description = Some("ランチ".to_string());
        assert!(!expense.has_complete_details());

        // 両方入力済みの場合
        expense.category = Some("食費".to_string());
        assert!(expense.has_complete_details());

        // 空白のみの入力は未入力として扱う
        expense.category = Some("   ".to_string());
        assert!(!expense.has_complete_details());
    }
}
