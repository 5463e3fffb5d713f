//! SQLite-backed cache store for generations and their entries.
//!
//! This module provides the persistent store behind the offline controller,
//! with async access via tokio-rusqlite. It supports:
//!
//! - Request keys derived from method and URL via SHA-256
//! - Atomic, all-or-nothing generation installs
//! - A single active generation, enforced by a partial unique index
//! - Automatic schema migrations

pub mod connection;
pub mod entries;
pub mod generations;
pub mod hash;
pub mod migrations;

use async_trait::async_trait;

pub use crate::Error;
use crate::http::{Request, Response};
use crate::store::{CacheStore, Generation};

pub use connection::CacheDb;

#[async_trait]
impl CacheStore for CacheDb {
    async fn generations(&self) -> Result<Vec<Generation>, Error> {
        self.list_generations().await
    }

    async fn active_generation(&self) -> Result<Option<String>, Error> {
        self.get_active_generation().await
    }

    async fn install_generation(&self, name: &str, entries: Vec<(Request, Response)>) -> Result<(), Error> {
        self.install_entries(name, entries).await
    }

    async fn promote(&self, name: &str) -> Result<(), Error> {
        self.promote_generation(name).await
    }

    async fn delete_generation(&self, name: &str) -> Result<bool, Error> {
        self.remove_generation(name).await
    }

    async fn clear_generation(&self, name: &str) -> Result<u64, Error> {
        self.clear_entries(name).await
    }

    async fn match_entry(&self, generation: &str, request: &Request) -> Result<Option<Response>, Error> {
        self.get_entry(generation, request).await
    }

    async fn put_entry(&self, generation: &str, request: &Request, response: &Response) -> Result<(), Error> {
        self.upsert_entry(generation, request, response).await
    }
}
