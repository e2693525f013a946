//! service-core: Shared infrastructure for the tax plugins.
pub mod config;
pub mod error;
pub mod observability;

pub use serde;
pub use tracing;
