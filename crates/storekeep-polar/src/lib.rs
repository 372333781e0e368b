pub mod client;
pub mod error;
pub mod types;

pub use client::{CatalogPartitions, PolarClient};
pub use error::PolarError;
