mod validation;

pub use validation::{validate_item, NAME_REQUIRED, PRICE_NOT_NEGATIVE};
