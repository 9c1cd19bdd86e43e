//! Normalization layer
//!
//! Pure functions that turn platform-specific raw values into the canonical
//! catalog vocabulary. Nothing here touches the network or the database.

pub mod category;
pub mod claims;
pub mod engine;
pub mod ingredients;
pub mod pack_size;
pub mod pricing;
pub mod text;

pub use category::{CategoryInference, infer_category};
pub use engine::NormalizationEngine;
