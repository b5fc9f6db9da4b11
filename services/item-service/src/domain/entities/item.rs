//! 商品条目实体

use chrono::{DateTime, Utc};

use crate::domain::value_objects::ItemId;

/// Item entity
///
/// `id` 由服务端分配，接收之前为空；`created_at` 由存储在写入时打上。
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Item {
    pub id: Option<ItemId>,
    pub name: String,
    pub number: i32,
    pub price: f64,
    pub is_active: bool,
    pub created_at: Option<DateTime<Utc>>,
}

impl Item {
    pub fn new(name: impl Into<String>, number: i32, price: f64, is_active: bool) -> Self {
        Self {
            id: None,
            name: name.into(),
            number,
            price,
            is_active,
            created_at: None,
        }
    }

    /// 分配服务端 ID，覆盖调用方带来的任何值
    pub fn assign_id(&mut self, id: ItemId) {
        self.id = Some(id);
    }

    pub fn with_id(mut self, id: ItemId) -> Self {
        self.assign_id(id);
        self
    }

    pub fn with_created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = Some(created_at);
        self
    }
}
