//! Persistence ports used by the signup workflow, plus the SQLite adapter.

pub mod sqlite;

#[cfg(test)]
pub mod memory;

use async_trait::async_trait;

use crate::models::{Account, Profile};
use crate::signup::rules::Field;

pub use sqlite::SqliteStore;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A UNIQUE constraint rejected the write.
    #[error("{0} is already taken")]
    Conflict(Field),
    #[error("record not found")]
    NotFound,
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("corrupt row: {0}")]
    Corrupt(String),
}

/// Uniqueness look-ups the validator runs before anything is written.
#[async_trait]
pub trait AccountLookup: Send + Sync {
    async fn username_taken(&self, username: &str) -> Result<bool, StoreError>;
    async fn email_taken(&self, email: &str) -> Result<bool, StoreError>;
}

#[async_trait]
pub trait SignupStore: AccountLookup {
    async fn begin(&self) -> Result<Box<dyn SignupTransaction>, StoreError>;
}

/// An open unit of work. Dropping it without `commit` discards every write.
#[async_trait]
pub trait SignupTransaction: Send {
    async fn insert_account(&mut self, account: &Account) -> Result<(), StoreError>;
    async fn insert_profile(&mut self, profile: &Profile) -> Result<(), StoreError>;
    async fn commit(self: Box<Self>) -> Result<(), StoreError>;
    async fn rollback(self: Box<Self>) -> Result<(), StoreError>;
}
