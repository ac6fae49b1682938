//! In-memory store with staged writes, for exercising the signup workflow
//! without a database.

use async_trait::async_trait;
use std::sync::{Arc, Mutex};

use super::{AccountLookup, SignupStore, SignupTransaction, StoreError};
use crate::models::{Account, Profile};
use crate::signup::rules::Field;

#[derive(Default)]
struct Tables {
    accounts: Vec<Account>,
    profiles: Vec<Profile>,
}

#[derive(Clone, Default)]
pub struct MemoryStore {
    tables: Arc<Mutex<Tables>>,
    fail_profile_insert: bool,
    /// Skip the pre-check so store-level conflicts can be provoked.
    blind_lookup: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_profile_insert(mut self) -> Self {
        self.fail_profile_insert = true;
        self
    }

    pub fn blind_lookup(mut self) -> Self {
        self.blind_lookup = true;
        self
    }

    pub fn accounts(&self) -> Vec<Account> {
        self.tables.lock().unwrap().accounts.clone()
    }

    pub fn profiles(&self) -> Vec<Profile> {
        self.tables.lock().unwrap().profiles.clone()
    }
}

#[async_trait]
impl AccountLookup for MemoryStore {
    async fn username_taken(&self, username: &str) -> Result<bool, StoreError> {
        if self.blind_lookup {
            return Ok(false);
        }
        let tables = self.tables.lock().unwrap();
        Ok(tables.accounts.iter().any(|a| a.username == username))
    }

    async fn email_taken(&self, email: &str) -> Result<bool, StoreError> {
        if self.blind_lookup {
            return Ok(false);
        }
        let tables = self.tables.lock().unwrap();
        Ok(tables.accounts.iter().any(|a| a.email == email))
    }
}

#[async_trait]
impl SignupStore for MemoryStore {
    async fn begin(&self) -> Result<Box<dyn SignupTransaction>, StoreError> {
        Ok(Box::new(MemoryTransaction {
            tables: self.tables.clone(),
            fail_profile_insert: self.fail_profile_insert,
            staged: Tables::default(),
        }))
    }
}

struct MemoryTransaction {
    tables: Arc<Mutex<Tables>>,
    fail_profile_insert: bool,
    staged: Tables,
}

#[async_trait]
impl SignupTransaction for MemoryTransaction {
    async fn insert_account(&mut self, account: &Account) -> Result<(), StoreError> {
        let tables = self.tables.lock().unwrap();
        let existing = tables.accounts.iter().chain(self.staged.accounts.iter());
        for other in existing {
            if other.username == account.username {
                return Err(StoreError::Conflict(Field::Username));
            }
            if other.email == account.email {
                return Err(StoreError::Conflict(Field::Email));
            }
        }
        drop(tables);
        self.staged.accounts.push(account.clone());
        Ok(())
    }

    async fn insert_profile(&mut self, profile: &Profile) -> Result<(), StoreError> {
        if self.fail_profile_insert {
            return Err(StoreError::Database(sqlx::Error::PoolTimedOut));
        }
        self.staged.profiles.push(profile.clone());
        Ok(())
    }

    async fn commit(self: Box<Self>) -> Result<(), StoreError> {
        let this = *self;
        let mut tables = this.tables.lock().unwrap();
        tables.accounts.extend(this.staged.accounts);
        tables.profiles.extend(this.staged.profiles);
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> Result<(), StoreError> {
        Ok(())
    }
}
