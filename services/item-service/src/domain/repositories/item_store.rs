//! 条目存储接口

use async_trait::async_trait;
use itemrpc_errors::AppResult;

use crate::domain::entities::Item;
use crate::domain::value_objects::ItemId;

/// 条目存储接口
///
/// 处理器只依赖这个接口，内存实现和真实存储引擎可以互换。
#[async_trait]
pub trait ItemStore: Send + Sync {
    /// 根据 ID 查找条目
    async fn find_by_id(&self, id: &ItemId) -> AppResult<Option<Item>>;

    /// 保存一个已分配 ID 的条目
    async fn save(&self, item: &Item) -> AppResult<()>;

    /// 批量保存
    async fn save_batch(&self, items: &[Item]) -> AppResult<()> {
        for item in items {
            self.save(item).await?;
        }
        Ok(())
    }
}
