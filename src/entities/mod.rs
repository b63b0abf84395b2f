// Entity models consumed by the engine as read-only lookups

pub mod category;

pub use category::{Category, CategoryRegistry};
