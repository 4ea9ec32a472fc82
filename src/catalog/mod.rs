//! Schema-tolerant product catalog.
//!
//! - `schema`: raw serde shapes covering every historical JSON variant
//! - `store`: loaded catalog with family and SKU lookup indices
//! - `normalize`: small shape-normalization helpers
//! - `views`: per-page view models and their builders

pub mod normalize;
pub mod schema;
pub mod store;
pub mod views;

pub use store::{Catalog, ItemRef};
pub use views::{FamilyCard, FamilyPage, SeriesPage};
