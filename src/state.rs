use std::sync::Arc;
use sqlx::SqlitePool;

use crate::services::{AccountAdmin, BcryptHasher, RandomTokenGenerator, SystemClock};
use crate::signup::SignupService;
use crate::store::SqliteStore;

#[derive(Clone)]
pub struct AppState {
    pub pool: SqlitePool,
    pub signup: SignupService,
    pub accounts: AccountAdmin,
}

impl AppState {
    pub fn new(pool: SqlitePool, bcrypt_cost: u32) -> Self {
        let store = SqliteStore::new(pool.clone());
        let hasher = Arc::new(BcryptHasher::new(bcrypt_cost));
        let tokens = Arc::new(RandomTokenGenerator);
        let clock = Arc::new(SystemClock);

        Self {
            pool,
            signup: SignupService::new(
                Arc::new(store.clone()),
                hasher.clone(),
                tokens.clone(),
                clock.clone(),
            ),
            accounts: AccountAdmin::new(store, hasher, tokens, clock),
        }
    }
}
