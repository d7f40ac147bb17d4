//! v1 API Data Transfer Objects.
//!
//! These types define the wire format for the v1 REST API. They are kept
//! separate from the internal domain models in `src/models/` and handle
//! serialization, deserialization, and domain-model conversion.

pub mod advice;
pub mod common;
pub mod memories;
pub mod notes;
pub mod quotes;
pub mod users;

// Re-export all public types for convenient access via `dto::*`.
pub use advice::*;
pub use common::*;
pub use memories::*;
pub use notes::*;
pub use quotes::*;
pub use users::*;
