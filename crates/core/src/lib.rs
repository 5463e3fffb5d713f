//! Core types and shared functionality for shellcache.
//!
//! This crate provides:
//! - The offline cache controller (install, activate, intercept)
//! - Cache store implementation with SQLite backend
//! - Request/response model and capability traits
//! - Unified error types
//! - Configuration structures

pub mod cache;
pub mod config;
pub mod error;
pub mod http;
pub mod store;
pub mod worker;

pub use cache::CacheDb;
pub use config::{AppConfig, ConfigError};
pub use error::Error;
pub use http::{Request, RequestMode, Response, ResponseKind};
pub use store::{CacheStore, Generation, GenerationState, Network};
pub use worker::{OfflineCacheController, ResponseSource, WorkerConfig};
