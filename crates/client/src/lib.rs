//! Client code for shellcache.
//!
//! This crate provides the live HTTP network used by the offline cache
//! controller, plus URL canonicalization shared by the server.

pub mod fetch;

pub use fetch::{FetchClient, FetchConfig, UrlError, canonicalize, response_kind};
