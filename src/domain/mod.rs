//! Domain model: plain value objects with no transaction affinity.

mod category;
mod paper;

pub use category::{Category, CategoryIdentifier};
pub use paper::Paper;
