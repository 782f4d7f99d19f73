//! # API Shared
//!
//! Request and response types shared by the directory's HTTP surface.
//!
//! Contains:
//! - Wire types for the search-provider endpoint and error bodies (`types` module)
//! - Shared services like `HealthService`

pub mod health;
pub mod types;

pub use health::HealthService;
pub use types::*;
