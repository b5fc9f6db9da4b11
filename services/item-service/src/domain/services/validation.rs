//! 条目校验
//!
//! 按顺序检查，第一条失败的规则即为结果。

use itemrpc_errors::{AppError, AppResult};

use crate::domain::entities::Item;

pub const NAME_REQUIRED: &str = "name must be present";
pub const PRICE_NOT_NEGATIVE: &str = "price must be positive";

/// 校验提交的条目
pub fn validate_item(item: &Item) -> AppResult<()> {
    if item.name.is_empty() {
        return Err(AppError::validation(NAME_REQUIRED));
    }

    if item.price.is_nan() || item.price < 0.0 {
        return Err(AppError::validation(PRICE_NOT_NEGATIVE));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rule(result: AppResult<()>) -> Option<String> {
        match result {
            Ok(()) => None,
            Err(AppError::Validation(msg)) => Some(msg),
            Err(other) => panic!("unexpected error kind: {other}"),
        }
    }

    #[test]
    fn test_empty_name_wins_over_price() {
        let item = Item::new("", 1, -10.0, false);
        assert_eq!(rule(validate_item(&item)).as_deref(), Some(NAME_REQUIRED));

        let item = Item::new("", 1, 5.0, false);
        assert_eq!(rule(validate_item(&item)).as_deref(), Some(NAME_REQUIRED));
    }

    #[test]
    fn test_negative_price_rejected() {
        for price in [-0.01, -1.0, -17.5, f64::MIN, f64::NEG_INFINITY] {
            let item = Item::new("Foo", 1, price, true);
            assert_eq!(rule(validate_item(&item)).as_deref(), Some(PRICE_NOT_NEGATIVE));
        }
    }

    #[test]
    fn test_nan_price_rejected() {
        let item = Item::new("Foo", 1, f64::NAN, true);
        assert_eq!(rule(validate_item(&item)).as_deref(), Some(PRICE_NOT_NEGATIVE));
    }

    #[test]
    fn test_valid_items_accepted() {
        for price in [0.0, -0.0, 0.01, 17.5, f64::MAX] {
            let item = Item::new("Foo", 300, price, true);
            assert!(validate_item(&item).is_ok(), "price {price} should pass");
        }
        // 只看 name 和 price
        assert!(validate_item(&Item::new("x", i32::MIN, 0.0, false)).is_ok());
    }

    #[test]
    fn test_validation_has_no_hidden_state() {
        let bad = Item::new("Foo", 1, -1.0, true);
        let good = Item::new("Foo", 1, 1.0, true);

        assert_eq!(rule(validate_item(&bad)), rule(validate_item(&bad)));
        assert!(validate_item(&good).is_ok());
        assert!(validate_item(&good).is_ok());
        assert_eq!(rule(validate_item(&bad)).as_deref(), Some(PRICE_NOT_NEGATIVE));
    }
}
