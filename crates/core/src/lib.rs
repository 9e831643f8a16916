//! Domain vocabulary for the real-estate listing service.
//!
//! This crate has no database dependency. It holds the error type, the
//! listing filter and pagination rules, partial-update helpers, and the
//! [`storage::FileStore`] capability used to persist uploaded files.

pub mod cancel;
pub mod config;
pub mod error;
pub mod fields;
pub mod filter;
pub mod money;
pub mod pagination;
pub mod sort;
pub mod storage;
pub mod types;
