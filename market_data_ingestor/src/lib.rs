//! Market data ingestion: snapshot requests against a data vendor and decoding of
//! the returned payload into vendor-agnostic models.

pub mod errors;
pub mod models;
pub mod providers;
