//! Proto <-> domain conversions

use chrono::{DateTime, Utc};

use crate::domain::entities::Item;
use crate::domain::value_objects::ItemId;
use crate::proto;

/// 请求中的条目转换为领域对象
///
/// `id` 和 `created_at` 由服务端负责，入站值被丢弃。缺失的条目按空条目处理。
pub fn item_from_proto(item: Option<proto::Item>) -> Item {
    let item = item.unwrap_or_default();
    Item::new(item.name, item.number, item.price, item.is_active)
}

pub fn item_to_proto(item: Item) -> proto::Item {
    proto::Item {
        id: item.id.map(ItemId::into_inner).unwrap_or_default(),
        name: item.name,
        number: item.number,
        price: item.price,
        is_active: item.is_active,
        created_at: item.created_at.map(timestamp_to_proto),
    }
}

pub fn timestamp_to_proto(at: DateTime<Utc>) -> prost_types::Timestamp {
    prost_types::Timestamp {
        seconds: at.timestamp(),
        nanos: at.timestamp_subsec_nanos() as i32,
    }
}

pub fn timestamp_from_proto(ts: &prost_types::Timestamp) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp(ts.seconds, u32::try_from(ts.nanos).ok()?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inbound_id_is_discarded() {
        let inbound = proto::Item {
            id: "client-chosen".to_string(),
            name: "Foo".to_string(),
            number: 300,
            price: 17.5,
            is_active: true,
            created_at: Some(prost_types::Timestamp { seconds: 1, nanos: 0 }),
        };

        let item = item_from_proto(Some(inbound));
        assert!(item.id.is_none());
        assert!(item.created_at.is_none());
        assert_eq!(item.name, "Foo");
        assert_eq!(item.number, 300);
        assert_eq!(item.price, 17.5);
        assert!(item.is_active);
    }

    #[test]
    fn test_missing_item_is_empty() {
        let item = item_from_proto(None);
        assert!(item.name.is_empty());
        assert_eq!(item.price, 0.0);
    }

    #[test]
    fn test_outbound_carries_id_and_timestamp() {
        let at = DateTime::from_timestamp(1_700_000_000, 123_000_000).unwrap();
        let item = Item::new("Bar", 220, 6.4, true)
            .with_id(ItemId::from("2"))
            .with_created_at(at);

        let out = item_to_proto(item);
        assert_eq!(out.id, "2");
        let ts = out.created_at.expect("timestamp");
        assert_eq!(timestamp_from_proto(&ts), Some(at));
    }

    #[test]
    fn test_unaccepted_item_has_empty_id() {
        assert!(item_to_proto(Item::new("Foo", 1, 1.0, false)).id.is_empty());
    }
}
