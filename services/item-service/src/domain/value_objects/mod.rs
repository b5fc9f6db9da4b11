mod ids;

pub use ids::ItemId;
