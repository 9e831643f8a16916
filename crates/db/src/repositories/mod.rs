//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async query methods
//! that accept any PostgreSQL executor as the first argument: a `&PgPool`,
//! a pooled connection, or an open transaction.

pub mod owner_repo;
pub mod property_image_repo;
pub mod property_query;
pub mod property_repo;
pub mod property_trace_repo;

pub use owner_repo::OwnerRepo;
pub use property_image_repo::PropertyImageRepo;
pub use property_query::PropertyQuery;
pub use property_repo::PropertyRepo;
pub use property_trace_repo::PropertyTraceRepo;
