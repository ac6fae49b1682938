mod common;

use chrono::Utc;
use sqlx::Row;
use uuid::Uuid;

use healthpro_users::signup::{ErrorKind, Field, SignupError};
use healthpro_users::models::{Account, Scope};
use healthpro_users::store::{SignupStore, SignupTransaction, SqliteStore, StoreError};

#[actix_web::test]
async fn pharmacist_signup_stores_account_and_blanked_profile() {
    let state = common::state().await;

    let account = state
        .signup
        .signup(common::registration("PHARMACIST"))
        .await
        .expect("signup succeeds");

    assert_eq!(account.username, "newuser");
    assert!(account.is_confirmed());
    assert!(!account.is_blocked());
    assert!(bcrypt::verify("abc123!", &account.password_hash).unwrap());

    let row = sqlx::query(
        "SELECT profession, workplace_type, workplace_name, riziv_number, apb_number, responsible_pneumologist \
         FROM profiles WHERE user_id = ?",
    )
    .bind(&account.id)
    .fetch_one(&state.pool)
    .await
    .unwrap();

    assert_eq!(row.get::<String, _>("profession"), "PHARMACIST");
    assert_eq!(row.get::<String, _>("apb_number"), "AP123");
    assert_eq!(row.get::<String, _>("workplace_type"), "");
    assert_eq!(row.get::<String, _>("workplace_name"), "");
    assert_eq!(row.get::<String, _>("riziv_number"), "");
    assert_eq!(row.get::<String, _>("responsible_pneumologist"), "");
}

#[actix_web::test]
async fn nurse_signup_keeps_workplace_and_pneumologist() {
    let state = common::state().await;

    let account = state
        .signup
        .signup(common::registration("NURSE"))
        .await
        .expect("signup succeeds");

    let profile = SqliteStore::new(state.pool.clone())
        .find_profile(&account.id)
        .await
        .unwrap()
        .expect("profile stored with the account");

    assert_eq!(profile.profession, "NURSE");
    assert_eq!(profile.workplace_type, "HOSPITAL");
    assert_eq!(profile.workplace_name, "UZ Gent");
    assert_eq!(profile.responsible_pneumologist, "Dr. Janssens");
    assert_eq!(profile.riziv_number, "1-23456-78-901");
    assert_eq!(profile.apb_number, "");
}

#[actix_web::test]
async fn duplicate_username_is_a_validation_error() {
    let state = common::state().await;
    state.signup.signup(common::registration("DOCTOR")).await.unwrap();

    let mut second = common::registration("DOCTOR");
    second.email = Some("other@b.com".into());

    match state.signup.signup(second).await {
        Err(SignupError::Invalid(errors)) => {
            assert_eq!(errors.get(Field::Username), &[ErrorKind::UsernameTaken]);
            assert!(!errors.has(Field::Email));
        }
        other => panic!("expected validation error, got {:?}", other.map(|a| a.id)),
    }

    let users: i64 = sqlx::query_scalar("SELECT COUNT(1) FROM users")
        .fetch_one(&state.pool)
        .await
        .unwrap();
    assert_eq!(users, 1);
}

#[actix_web::test]
async fn failed_profile_insert_leaves_no_account() {
    let state = common::state().await;
    sqlx::query(
        "CREATE TRIGGER reject_profiles BEFORE INSERT ON profiles \
         BEGIN SELECT RAISE(ABORT, 'profiles are read-only'); END;",
    )
    .execute(&state.pool)
    .await
    .unwrap();

    let result = state.signup.signup(common::registration("DOCTOR")).await;
    assert!(matches!(result, Err(SignupError::Persistence(_))));

    let users: i64 = sqlx::query_scalar("SELECT COUNT(1) FROM users")
        .fetch_one(&state.pool)
        .await
        .unwrap();
    let profiles: i64 = sqlx::query_scalar("SELECT COUNT(1) FROM profiles")
        .fetch_one(&state.pool)
        .await
        .unwrap();
    assert_eq!(users, 0);
    assert_eq!(profiles, 0);
}

#[actix_web::test]
async fn invalid_registration_writes_nothing() {
    let state = common::state().await;
    let mut input = common::registration("PHARMACIST");
    input.apb_number = None;
    input.agree_user_terms = Some(false);

    match state.signup.signup(input).await {
        Err(SignupError::Invalid(errors)) => {
            assert_eq!(errors.get(Field::ApbNumber), &[ErrorKind::Required]);
            assert_eq!(errors.get(Field::AgreeUserTerms), &[ErrorKind::MustBeChecked]);
        }
        other => panic!("expected validation error, got {:?}", other.map(|a| a.id)),
    }

    let users: i64 = sqlx::query_scalar("SELECT COUNT(1) FROM users")
        .fetch_one(&state.pool)
        .await
        .unwrap();
    assert_eq!(users, 0);
}

fn account(username: &str, email: &str) -> Account {
    let now = Utc::now();
    Account {
        id: Uuid::new_v4().to_string(),
        username: username.into(),
        email: email.into(),
        password_hash: "hash".into(),
        auth_key: "key".into(),
        scope: Scope::Frontend,
        confirmed_at: Some(now),
        blocked_at: None,
        created_at: now,
        updated_at: now,
    }
}

async fn insert_conflict(store: &SqliteStore, duplicate: &Account) -> StoreError {
    let mut tx = store.begin().await.unwrap();
    let err = tx
        .insert_account(duplicate)
        .await
        .expect_err("duplicate insert is rejected");
    tx.rollback().await.unwrap();
    err
}

#[actix_web::test]
async fn sqlite_unique_violations_map_to_conflicts() {
    let state = common::state().await;
    let store = SqliteStore::new(state.pool.clone());

    let mut tx = store.begin().await.unwrap();
    tx.insert_account(&account("newuser", "a@b.com")).await.unwrap();
    tx.commit().await.unwrap();

    let err = insert_conflict(&store, &account("newuser", "other@b.com")).await;
    assert!(matches!(err, StoreError::Conflict(Field::Username)), "got {:?}", err);

    let err = insert_conflict(&store, &account("otheruser", "a@b.com")).await;
    assert!(matches!(err, StoreError::Conflict(Field::Email)), "got {:?}", err);

    let users: i64 = sqlx::query_scalar("SELECT COUNT(1) FROM users")
        .fetch_one(&state.pool)
        .await
        .unwrap();
    assert_eq!(users, 1);
}
