pub mod account_admin;
pub mod security;

pub use account_admin::{AccountAdmin, AdminError, BlockOutcome, EditContext, UpdateAccountForm};
pub use security::{BcryptHasher, Clock, PasswordHasher, RandomTokenGenerator, SystemClock, TokenGenerator};
