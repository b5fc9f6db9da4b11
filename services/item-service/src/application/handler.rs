//! Business logic handler
//!
//! 三种调用模式共用的业务逻辑，与传输层无关。

use std::sync::Arc;

use futures::{Stream, StreamExt};
use itemrpc_bootstrap::record_store_operation;
use itemrpc_errors::{AppError, AppResult};
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use crate::domain::entities::Item;
use crate::domain::repositories::ItemStore;
use crate::domain::services::validate_item;
use crate::domain::value_objects::ItemId;

pub struct ItemHandler {
    store: Arc<dyn ItemStore>,
}

impl ItemHandler {
    pub fn new(store: Arc<dyn ItemStore>) -> Self {
        Self { store }
    }

    /// 校验并接收一个条目，返回签发的 ID
    pub async fn create_item(&self, mut item: Item) -> AppResult<ItemId> {
        validate_item(&item).inspect_err(|e| warn!(error = %e, "Rejected item"))?;

        let id = ItemId::generate();
        item.assign_id(id.clone());

        let saved = self.store.save(&item).await;
        record_store_operation("save", saved.is_ok());
        saved.map_err(store_failure)?;

        info!(item_id = %id, name = %item.name, "Item accepted");
        Ok(id)
    }

    /// 查找单个条目，存储故障统一转为 Internal
    pub async fn find_item(&self, id: &ItemId) -> AppResult<Option<Item>> {
        let found = self.store.find_by_id(id).await;
        record_store_operation("find_by_id", found.is_ok());
        found.map_err(store_failure)
    }

    /// 按请求顺序逐个查找并推送命中的条目
    ///
    /// 未命中的 ID 直接跳过；接收端关闭（对端断开）时立即停止。
    /// 存储故障会推送一个错误后结束。返回已推送的条目数。
    pub async fn stream_items(
        &self,
        ids: Vec<ItemId>,
        tx: mpsc::Sender<AppResult<Item>>,
    ) -> AppResult<usize> {
        let mut sent = 0;

        for id in ids {
            match self.find_item(&id).await {
                Ok(Some(item)) => {
                    if tx.send(Ok(item)).await.is_err() {
                        debug!(sent, "Receiver dropped, stopping item stream");
                        return Ok(sent);
                    }
                    sent += 1;
                }
                Ok(None) => debug!(item_id = %id, "No stored item, skipping"),
                Err(e) => {
                    error!(item_id = %id, error = %e, "Lookup failed, aborting item stream");
                    let message = e.to_string();
                    let _ = tx.send(Err(e)).await;
                    return Err(AppError::internal(message));
                }
            }
        }

        Ok(sent)
    }

    /// 读取条目流直到结束，全部通过后一次性保存并按接收顺序返回 ID
    ///
    /// 任何一帧出错都会中止整个调用，之前签发的 ID 不会写入也不会返回。
    pub async fn ingest_items<S>(&self, frames: S) -> AppResult<Vec<ItemId>>
    where
        S: Stream<Item = AppResult<Item>> + Send,
    {
        let mut frames = std::pin::pin!(frames);
        let mut accepted = Vec::new();
        let mut ids = Vec::new();

        while let Some(frame) = frames.next().await {
            let mut item = frame?;
            validate_item(&item).inspect_err(|e| {
                warn!(error = %e, frame = accepted.len(), "Rejected item in client stream")
            })?;

            let id = ItemId::generate();
            item.assign_id(id.clone());
            accepted.push(item);
            ids.push(id);
        }

        let saved = self.store.save_batch(&accepted).await;
        record_store_operation("save_batch", saved.is_ok());
        saved.map_err(store_failure)?;

        info!(count = ids.len(), "Client stream accepted");
        Ok(ids)
    }
}

fn store_failure(err: AppError) -> AppError {
    match err {
        AppError::Internal(_) => err,
        other => AppError::internal(other.to_string()),
    }
}
