mod item_store;

pub use item_store::ItemStore;
