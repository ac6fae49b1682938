use regex::Regex;
use std::sync::{Arc, LazyLock};
use tracing::info;

use crate::models::{Account, Role};
use crate::services::{Clock, PasswordHasher, TokenGenerator};
use crate::signup::validator::is_valid_email;
use crate::signup::{ErrorKind, Field, ValidationErrors};
use crate::store::sqlite::AccountUpdate;
use crate::store::{SqliteStore, StoreError};

const USERNAME_MIN: usize = 3;
const USERNAME_MAX: usize = 25;
const EMAIL_MAX: usize = 255;
const PASSWORD_MIN: usize = 6;
const PASSWORD_MAX: usize = 72;

static USERNAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[-a-zA-Z0-9_.@]+$").expect("username pattern compiles"));

#[derive(Debug, thiserror::Error)]
pub enum AdminError {
    #[error("account not found")]
    NotFound,
    #[error(transparent)]
    Invalid(#[from] ValidationErrors),
    #[error("store error: {0}")]
    Store(StoreError),
    #[error("password hashing failed: {0}")]
    Hashing(#[from] bcrypt::BcryptError),
}

impl From<StoreError> for AdminError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound => AdminError::NotFound,
            StoreError::Conflict(field) => {
                let kind = if field == Field::Email {
                    ErrorKind::EmailTaken
                } else {
                    ErrorKind::UsernameTaken
                };
                AdminError::Invalid(ValidationErrors::single(field, kind))
            }
            other => AdminError::Store(other),
        }
    }
}

/// What the edit screen submits. An empty password leaves the current one.
#[derive(Debug, Clone, Default)]
pub struct UpdateAccountForm {
    pub username: String,
    pub email: String,
    pub password: String,
    pub roles: Vec<String>,
}

impl UpdateAccountForm {
    /// Builds the form from urlencoded pairs; `roles` may repeat.
    pub fn from_pairs(pairs: Vec<(String, String)>) -> Self {
        let mut form = Self::default();
        for (key, value) in pairs {
            match key.as_str() {
                "username" => form.username = value,
                "email" => form.email = value,
                "password" => form.password = value,
                "roles" | "roles[]" => {
                    if !value.is_empty() && !form.roles.contains(&value) {
                        form.roles.push(value)
                    }
                }
                _ => {}
            }
        }
        form
    }
}

/// Everything the edit screen needs about one account.
#[derive(Debug, Clone)]
pub struct EditContext {
    pub account: Account,
    pub roles: Vec<Role>,
    pub active_roles: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockOutcome {
    Blocked,
    Unblocked,
}

#[derive(Clone)]
pub struct AccountAdmin {
    store: SqliteStore,
    hasher: Arc<dyn PasswordHasher>,
    tokens: Arc<dyn TokenGenerator>,
    clock: Arc<dyn Clock>,
}

impl AccountAdmin {
    pub fn new(
        store: SqliteStore,
        hasher: Arc<dyn PasswordHasher>,
        tokens: Arc<dyn TokenGenerator>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            store,
            hasher,
            tokens,
            clock,
        }
    }

    async fn account(&self, id: &str) -> Result<Account, AdminError> {
        self.store.find_account(id).await?.ok_or(AdminError::NotFound)
    }

    pub async fn edit_context(&self, id: &str) -> Result<EditContext, AdminError> {
        let account = self.account(id).await?;
        let roles = self.store.list_roles().await?;
        let active_roles = self.store.active_roles(id).await?;
        Ok(EditContext {
            account,
            roles,
            active_roles,
        })
    }

    pub async fn update(&self, id: &str, form: &UpdateAccountForm) -> Result<Account, AdminError> {
        self.account(id).await?;

        let username = form.username.trim();
        let email = form.email.trim();
        let mut errors = ValidationErrors::new();

        let length = username.chars().count();
        if username.is_empty() {
            errors.add(Field::Username, ErrorKind::Required);
        } else if length < USERNAME_MIN {
            errors.add(Field::Username, ErrorKind::TooShort { min: USERNAME_MIN });
        } else if length > USERNAME_MAX {
            errors.add(Field::Username, ErrorKind::TooLong { max: USERNAME_MAX });
        } else if !USERNAME.is_match(username) {
            errors.add(Field::Username, ErrorKind::Invalid);
        } else if self.store.taken_by_other(Field::Username, username, id).await? {
            errors.add(Field::Username, ErrorKind::UsernameTaken);
        }

        if email.is_empty() {
            errors.add(Field::Email, ErrorKind::Required);
        } else if email.chars().count() > EMAIL_MAX {
            errors.add(Field::Email, ErrorKind::TooLong { max: EMAIL_MAX });
        } else if !is_valid_email(email) {
            errors.add(Field::Email, ErrorKind::InvalidEmail);
        } else if self.store.taken_by_other(Field::Email, email, id).await? {
            errors.add(Field::Email, ErrorKind::EmailTaken);
        }

        let password_length = form.password.chars().count();
        if !form.password.is_empty() {
            if password_length < PASSWORD_MIN {
                errors.add(Field::Password, ErrorKind::TooShort { min: PASSWORD_MIN });
            } else if password_length > PASSWORD_MAX {
                errors.add(Field::Password, ErrorKind::TooLong { max: PASSWORD_MAX });
            }
        }

        let known = self.store.list_roles().await?;
        if form
            .roles
            .iter()
            .any(|name| !known.iter().any(|role| &role.name == name))
        {
            errors.add(Field::Roles, ErrorKind::Invalid);
        }

        errors.into_result()?;

        let password_hash = if form.password.is_empty() {
            None
        } else {
            Some(self.hasher.hash(&form.password)?)
        };

        self.store
            .update_account(
                id,
                &AccountUpdate {
                    username,
                    email,
                    password_hash: password_hash.as_deref(),
                    roles: &form.roles,
                    updated_at: self.clock.now(),
                },
            )
            .await?;

        info!(user_id = %id, roles = ?form.roles, "Account updated by administrator");
        self.account(id).await
    }

    /// Marks the account as confirmed. Returns false when it already was.
    pub async fn confirm(&self, id: &str) -> Result<bool, AdminError> {
        self.account(id).await?;
        let changed = self.store.confirm(id, self.clock.now()).await?;
        if changed {
            info!(user_id = %id, "Account confirmed by administrator");
        }
        Ok(changed)
    }

    /// Blocks an active account, unblocks a blocked one. Blocking rotates
    /// the auth key so remembered logins stop working.
    pub async fn toggle_block(&self, id: &str) -> Result<BlockOutcome, AdminError> {
        let account = self.account(id).await?;
        let now = self.clock.now();
        // A concurrent toggle may have won the race; the row is then
        // already in the requested state and is left alone.
        if account.is_blocked() {
            if self.store.unblock(id, now).await? {
                info!(user_id = %id, "Account unblocked");
            }
            Ok(BlockOutcome::Unblocked)
        } else {
            if self.store.block(id, now, &self.tokens.generate()).await? {
                info!(user_id = %id, "Account blocked");
            }
            Ok(BlockOutcome::Blocked)
        }
    }
}
