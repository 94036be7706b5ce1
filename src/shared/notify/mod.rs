//! テーブル変更通知モジュール
//!
//! テーブル名をキーとした変更イベントの配信と、クエリ結果スナップショットの
//! 購読機能を提供します。通知器はストレージ層から独立した部品として設計されて
//! おり、単体でテスト可能です。

/// クエリ購読とスナップショット配信
pub mod subscription;

pub use subscription::{watch, Snapshots};

use tokio::sync::broadcast;

/// 変更通知チャネルの既定キャパシティ
const CHANGE_CHANNEL_CAPACITY: usize = 64;

/// テーブルの変更イベント
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableChange {
    /// 変更されたテーブル名
    pub table: &'static str,
}

/// テーブル単位の変更通知を配信するパブリッシャー
///
/// 書き込みのコミット後に`notify`を呼び出すと、全購読者へ変更イベントが
/// 配信されます。送信側は購読者の処理を待たずに即座に戻ります。
pub struct TableNotifier {
    sender: broadcast::Sender<TableChange>,
}

impl TableNotifier {
    /// 新しい通知器を作成する
    ///
    /// # 戻り値
    /// 通知器インスタンス
    pub fn new() -> Self {
        Self::with_capacity(CHANGE_CHANNEL_CAPACITY)
    }

    /// キャパシティを指定して通知器を作成する
    ///
    /// # 引数
    /// * `capacity` - 変更イベントのバッファ数
    ///
    /// # 戻り値
    /// 通知器インスタンス
    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// 変更イベントの受信を開始する
    ///
    /// # 戻り値
    /// 変更イベントの受信チャネル
    pub fn subscribe(&self) -> broadcast::Receiver<TableChange> {
        self.sender.subscribe()
    }

    /// テーブルの変更を全購読者へ通知する
    ///
    /// # 引数
    /// * `table` - 変更されたテーブル名
    pub fn notify(&self, table: &'static str) {
        // 購読者がいない場合のエラーは正常系として扱う
        if let Err(e) = self.sender.send(TableChange { table }) {
            log::debug!("変更通知の送信をスキップ（購読者なし）: {e}");
        }
    }

    /// 現在の購読者数を取得する
    ///
    /// # 戻り値
    /// 購読者数
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for TableNotifier {
    fn default() -> Self {
        Self::new()
    }
}
