use std::sync::Arc;
use tracing::{error, info};
use uuid::Uuid;

use super::rules::{self, ErrorKind, Field, ValidationErrors};
use super::validator::{self, conditional_value};
use crate::models::registration::present;
use crate::models::{Account, Profession, Profile, RegistrationInput, Scope};
use crate::services::{Clock, PasswordHasher, TokenGenerator};
use crate::store::{SignupStore, SignupTransaction, StoreError};

#[derive(Debug, thiserror::Error)]
pub enum SignupError {
    #[error(transparent)]
    Invalid(#[from] ValidationErrors),
    #[error("persistence failed: {0}")]
    Persistence(#[from] StoreError),
    #[error("password hashing failed: {0}")]
    Hashing(#[from] bcrypt::BcryptError),
}

/// Creates an account and its profile from a registration, both or neither.
#[derive(Clone)]
pub struct SignupService {
    store: Arc<dyn SignupStore>,
    hasher: Arc<dyn PasswordHasher>,
    tokens: Arc<dyn TokenGenerator>,
    clock: Arc<dyn Clock>,
}

impl SignupService {
    pub fn new(
        store: Arc<dyn SignupStore>,
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

    pub async fn signup(&self, mut input: RegistrationInput) -> Result<Account, SignupError> {
        input.normalize();

        if let Err(errors) = validator::validate(&input, self.store.as_ref()).await? {
            info!(fields = ?errors.field_names(), "Signup rejected");
            return Err(errors.into());
        }

        let profession = present(&input.profession).and_then(|p| p.parse::<Profession>().ok());
        let now = self.clock.now();
        let account = Account {
            id: Uuid::new_v4().to_string(),
            username: text(&input.username),
            email: text(&input.email),
            password_hash: self.hasher.hash(input.password.as_deref().unwrap_or_default())?,
            auth_key: self.tokens.generate(),
            scope: Scope::Frontend,
            confirmed_at: Some(now),
            blocked_at: None,
            created_at: now,
            updated_at: now,
        };
        let profile = build_profile(&account, &input, profession);

        let mut tx = self.store.begin().await?;

        if let Err(err) = tx.insert_account(&account).await {
            abort(tx).await;
            return Err(match err {
                StoreError::Conflict(field) => {
                    info!(field = %field, "Signup lost a uniqueness race");
                    ValidationErrors::single(field, taken_kind(field)).into()
                }
                other => {
                    error!(error = %other, "Failed to insert account");
                    other.into()
                }
            });
        }

        if let Err(err) = tx.insert_profile(&profile).await {
            error!(error = %err, user_id = %account.id, "Failed to insert profile");
            abort(tx).await;
            return Err(err.into());
        }

        tx.commit().await.map_err(|err| {
            error!(error = %err, user_id = %account.id, "Failed to commit signup");
            err
        })?;

        info!(user_id = %account.id, username = %account.username, "Account created");
        Ok(account)
    }
}

async fn abort(tx: Box<dyn SignupTransaction>) {
    if let Err(err) = tx.rollback().await {
        error!(error = %err, "Rollback failed");
    }
}

fn taken_kind(field: Field) -> ErrorKind {
    match field {
        Field::Email => ErrorKind::EmailTaken,
        _ => ErrorKind::UsernameTaken,
    }
}

fn text(value: &Option<String>) -> String {
    value.clone().unwrap_or_default()
}

/// Profile columns for the account. Profession-dependent columns are
/// blanked here whenever the profession does not carry them, whatever the
/// form sent.
pub fn build_profile(
    account: &Account,
    input: &RegistrationInput,
    profession: Option<Profession>,
) -> Profile {
    let kept = |field: Field| -> String {
        if rules::carries(profession, field) {
            conditional_value(input, field).unwrap_or_default().to_string()
        } else {
            String::new()
        }
    };

    Profile {
        user_id: account.id.clone(),
        name: text(&input.name),
        firstname: text(&input.firstname),
        public_email: account.email.clone(),
        salutation: text(&input.salutation),
        profession: profession.map(|p| p.as_str().to_string()).unwrap_or_default(),
        address: text(&input.address),
        city: text(&input.city),
        zipcode: text(&input.zipcode),
        phone: text(&input.phone),
        mobile: text(&input.mobile),
        workplace_type: kept(Field::WorkplaceType),
        workplace_name: kept(Field::WorkplaceName),
        riziv_number: kept(Field::RizivNumber),
        apb_number: kept(Field::ApbNumber),
        responsible_pneumologist: kept(Field::ResponsiblePneumologist),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::security::fixed::{FixedClock, FixedToken};
    use crate::services::BcryptHasher;
    use crate::signup::fixtures::complete;
    use crate::store::memory::MemoryStore;
    use chrono::{TimeZone, Utc};

    fn service(store: MemoryStore) -> SignupService {
        SignupService::new(
            Arc::new(store),
            Arc::new(BcryptHasher::new(4)),
            Arc::new(FixedToken("fixed-auth-key")),
            Arc::new(FixedClock(Utc.with_ymd_and_hms(2024, 5, 1, 9, 30, 0).unwrap())),
        )
    }

    #[tokio::test]
    async fn pharmacist_signup_creates_account_and_blanked_profile() {
        let store = MemoryStore::new();
        let mut input = complete("PHARMACIST");
        input.riziv_number = Some("should-be-dropped".into());
        input.workplace_type = Some("HOSPITAL".into());
        input.workplace_name = Some("Somewhere".into());
        input.responsible_pneumologist = Some("Dr. House".into());

        let account = service(store.clone()).signup(input).await.unwrap();

        assert_eq!(account.scope, Scope::Frontend);
        assert_eq!(account.auth_key, "fixed-auth-key");
        assert_eq!(
            account.confirmed_at,
            Some(Utc.with_ymd_and_hms(2024, 5, 1, 9, 30, 0).unwrap())
        );
        assert!(bcrypt::verify("abc123!", &account.password_hash).unwrap());

        let profiles = store.profiles();
        assert_eq!(profiles.len(), 1);
        let profile = &profiles[0];
        assert_eq!(profile.user_id, account.id);
        assert_eq!(profile.public_email, "a@b.com");
        assert_eq!(profile.apb_number, "AP123");
        assert_eq!(profile.riziv_number, "");
        assert_eq!(profile.workplace_type, "");
        assert_eq!(profile.workplace_name, "");
        assert_eq!(profile.responsible_pneumologist, "");
    }

    #[tokio::test]
    async fn nurse_keeps_workplace_and_pneumologist_fields() {
        let store = MemoryStore::new();
        let mut input = complete("NURSE");
        input.apb_number = Some("AP999".into());
        input.responsible_pneumologist = Some("  Dr. Janssens ".into());

        service(store.clone()).signup(input).await.unwrap();

        let profile = &store.profiles()[0];
        assert_eq!(profile.workplace_type, "HOSPITAL");
        assert_eq!(profile.workplace_name, "UZ Gent");
        assert_eq!(profile.riziv_number, "1-23456-78-901");
        assert_eq!(profile.apb_number, "");
        assert_eq!(profile.responsible_pneumologist, "Dr. Janssens");
    }

    #[tokio::test]
    async fn invalid_input_writes_nothing() {
        let store = MemoryStore::new();
        let mut input = complete("DOCTOR");
        input.riziv_number = None;

        let err = service(store.clone()).signup(input).await.unwrap_err();
        match err {
            SignupError::Invalid(errors) => {
                assert_eq!(errors.get(Field::RizivNumber), &[ErrorKind::Required])
            }
            other => panic!("unexpected error: {:?}", other),
        }
        assert!(store.accounts().is_empty());
        assert!(store.profiles().is_empty());
    }

    #[tokio::test]
    async fn second_signup_with_same_username_is_rejected() {
        let store = MemoryStore::new();
        let service = service(store.clone());
        service.signup(complete("DOCTOR")).await.unwrap();

        let mut again = complete("DOCTOR");
        again.email = Some("other@b.com".into());
        let err = service.signup(again).await.unwrap_err();

        match err {
            SignupError::Invalid(errors) => {
                assert_eq!(errors.get(Field::Username), &[ErrorKind::UsernameTaken]);
                assert!(!errors.has(Field::Email));
            }
            other => panic!("unexpected error: {:?}", other),
        }
        assert_eq!(store.accounts().len(), 1);
        assert_eq!(store.profiles().len(), 1);
    }

    #[tokio::test]
    async fn store_level_conflict_surfaces_as_validation_error() {
        let store = MemoryStore::new().blind_lookup();
        let service = service(store.clone());
        service.signup(complete("DOCTOR")).await.unwrap();

        let mut again = complete("DOCTOR");
        again.username = Some("someoneelse".into());
        let err = service.signup(again).await.unwrap_err();

        match err {
            SignupError::Invalid(errors) => {
                assert_eq!(errors.get(Field::Email), &[ErrorKind::EmailTaken])
            }
            other => panic!("unexpected error: {:?}", other),
        }
        assert_eq!(store.accounts().len(), 1);
    }

    #[tokio::test]
    async fn failed_profile_insert_leaves_no_account() {
        let store = MemoryStore::new().failing_profile_insert();

        let err = service(store.clone()).signup(complete("NURSE")).await.unwrap_err();

        assert!(matches!(err, SignupError::Persistence(_)));
        assert!(store.accounts().is_empty());
        assert!(store.profiles().is_empty());
    }
}
