//! Custom extractors for Axum handlers.
//!
//! Reusable extractors that reject bad input with the standard error envelope.

pub mod uuid_path;
pub mod validated_json;
pub mod validated_query;

pub use uuid_path::UuidPath;
pub use validated_json::ValidatedJson;
pub use validated_query::ValidatedQuery;
