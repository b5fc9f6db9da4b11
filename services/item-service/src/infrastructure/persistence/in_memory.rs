//! 内存存储实现
//!
//! 用于演示和测试，进程退出即丢失。

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use itemrpc_errors::{AppError, AppResult};
use tokio::sync::RwLock;
use tracing::debug;

use crate::domain::entities::Item;
use crate::domain::repositories::ItemStore;
use crate::domain::value_objects::ItemId;

pub struct InMemoryItemStore {
    items: RwLock<HashMap<ItemId, Item>>,
}

impl InMemoryItemStore {
    pub fn new() -> Self {
        Self {
            items: RwLock::new(HashMap::new()),
        }
    }

    /// 用已有条目初始化，没有 ID 的条目会被忽略
    pub fn with_items(items: impl IntoIterator<Item = Item>) -> Self {
        let items = items
            .into_iter()
            .filter_map(|item| item.id.clone().map(|id| (id, item)))
            .collect();

        Self {
            items: RwLock::new(items),
        }
    }

    /// 预置三条演示数据，ID 为 "1"、"2"、"3"
    pub fn with_seed_data() -> Self {
        let now = Utc::now();
        Self::with_items([
            Item::new("Foo", 110, 3.2, false)
                .with_id(ItemId::from("1"))
                .with_created_at(now),
            Item::new("Bar", 220, 6.4, true)
                .with_id(ItemId::from("2"))
                .with_created_at(now),
            Item::new("Baz", 330, 9.6, false)
                .with_id(ItemId::from("3"))
                .with_created_at(now),
        ])
    }

    fn stamped(item: &Item) -> AppResult<(ItemId, Item)> {
        let id = item
            .id
            .clone()
            .ok_or_else(|| AppError::internal("cannot store an item without an id"))?;

        let mut stored = item.clone();
        stored.created_at.get_or_insert_with(Utc::now);
        Ok((id, stored))
    }
}

#[cfg(test)]
impl InMemoryItemStore {
    pub async fn len(&self) -> usize {
        self.items.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.items.read().await.is_empty()
    }
}

impl Default for InMemoryItemStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ItemStore for InMemoryItemStore {
    async fn find_by_id(&self, id: &ItemId) -> AppResult<Option<Item>> {
        Ok(self.items.read().await.get(id).cloned())
    }

    async fn save(&self, item: &Item) -> AppResult<()> {
        let (id, stored) = Self::stamped(item)?;
        debug!(item_id = %id, "Saving item");
        self.items.write().await.insert(id, stored);
        Ok(())
    }

    /// 整批要么全部写入，要么都不写
    async fn save_batch(&self, items: &[Item]) -> AppResult<()> {
        let stamped = items
            .iter()
            .map(Self::stamped)
            .collect::<AppResult<Vec<_>>>()?;

        let mut guard = self.items.write().await;
        guard.extend(stamped);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_seed_data_lookup() {
        let store = InMemoryItemStore::with_seed_data();
        assert_eq!(store.len().await, 3);

        let bar = store.find_by_id(&ItemId::from("2")).await.unwrap().unwrap();
        assert_eq!(bar.name, "Bar");
        assert_eq!(bar.number, 220);
        assert!(bar.is_active);
        assert!(bar.created_at.is_some());

        assert!(store.find_by_id(&ItemId::from("9")).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_save_stamps_created_at() {
        let store = InMemoryItemStore::new();
        let id = ItemId::generate();
        store
            .save(&Item::new("Foo", 1, 1.0, true).with_id(id.clone()))
            .await
            .unwrap();

        let stored = store.find_by_id(&id).await.unwrap().unwrap();
        assert!(stored.created_at.is_some());
    }

    #[tokio::test]
    async fn test_save_without_id_fails() {
        let store = InMemoryItemStore::new();
        let err = store.save(&Item::new("Foo", 1, 1.0, true)).await.unwrap_err();
        assert!(matches!(err, AppError::Internal(_)));
    }

    #[tokio::test]
    async fn test_batch_is_all_or_nothing() {
        let store = InMemoryItemStore::new();
        let batch = vec![
            Item::new("Foo", 1, 1.0, true).with_id(ItemId::generate()),
            Item::new("Bar", 2, 2.0, true),
        ];

        assert!(store.save_batch(&batch).await.is_err());
        assert!(store.is_empty().await);

        store.save_batch(&batch[..1]).await.unwrap();
        assert_eq!(store.len().await, 1);
    }
}
