use crate::shared::errors::AppResult;
use crate::shared::notify::TableNotifier;
use futures::Stream;
use std::pin::Pin;
use std::task::{Context, Poll};
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// クエリ結果のスナップショット列を受け取る購読ハンドル
///
/// 購読開始時点の結果セットが1件目として配信され、以降は対象テーブルへの
/// 書き込みがコミットされるたびに最新の結果セットが配信されます。
/// ハンドルを破棄すると購読は即座に終了し、以降のスナップショットは
/// 配信されません。
pub struct Snapshots<T> {
    receiver: mpsc::UnboundedReceiver<T>,
    worker: JoinHandle<()>,
}

impl<T> Snapshots<T> {
    /// 次のスナップショットを受け取る
    ///
    /// # 戻り値
    /// 次のスナップショット、または購読終了時はNone
    pub async fn recv(&mut self) -> Option<T> {
        self.receiver.recv().await
    }
}

impl<T> Drop for Snapshots<T> {
    fn drop(&mut self) {
        // 購読の放棄時はワーカータスクを停止する
        self.worker.abort();
    }
}

impl<T> Stream for Snapshots<T> {
    type Item = T;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<T>> {
        self.get_mut().receiver.poll_recv(cx)
    }
}

/// クエリを購読し、テーブル変更のたびに再実行して結果を配信する
///
/// # 引数
/// * `notifier` - テーブル変更の通知器
/// * `table` - 監視対象のテーブル名
/// * `query` - 再実行するクエリクロージャ
///
/// # 戻り値
/// スナップショットの購読ハンドル
///
/// # 配信の仕様
/// - 購読開始直後に初回スナップショットを配信する
/// - 対象テーブルの変更イベントごとに再クエリして配信する
/// - 通知を取りこぼした場合は最新スナップショット1件に集約する
/// - クエリが失敗した場合はエラーをログ出力して購読を終了する
pub fn watch<T, F>(notifier: &TableNotifier, table: &'static str, query: F) -> Snapshots<T>
where
    T: Send + 'static,
    F: Fn() -> AppResult<T> + Send + 'static,
{
    // 取りこぼしを防ぐため、初回クエリの前に購読を開始する
    let mut changes = notifier.subscribe();
    let (tx, rx) = mpsc::unbounded_channel();

    let worker = tokio::spawn(async move {
        // 初回スナップショットを配信
        if !run_and_send(table, &query, &tx) {
            return;
        }

        loop {
            match changes.recv().await {
                Ok(change) if change.table == table => {
                    if !run_and_send(table, &query, &tx) {
                        break;
                    }
                }
                // 他テーブルの変更は無視する
                Ok(_) => {}
                Err(RecvError::Lagged(skipped)) => {
                    log::debug!(
                        "変更通知を{skipped}件取りこぼしたため、最新スナップショットに集約します: table={table}"
                    );
                    if !run_and_send(table, &query, &tx) {
                        break;
                    }
                }
                Err(RecvError::Closed) => break,
            }
        }
    });

    Snapshots {
        receiver: rx,
        worker,
    }
}

/// クエリを実行して結果を送信する
///
/// # 戻り値
/// 購読を継続する場合はtrue
fn run_and_send<T, F>(table: &'static str, query: &F, tx: &mpsc::UnboundedSender<T>) -> bool
where
    F: Fn() -> AppResult<T>,
{
    match query() {
        Ok(snapshot) => tx.send(snapshot).is_ok(),
        Err(e) => {
            log::error!("購読クエリの再実行に失敗しました: table={table}, error={e}");
            false
        }
    }
}
