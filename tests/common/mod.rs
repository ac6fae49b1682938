#![allow(dead_code)]

use serde_json::{json, Value};

use healthpro_users::db;
use healthpro_users::models::RegistrationInput;
use healthpro_users::state::AppState;

pub async fn state() -> AppState {
    // A single connection keeps the in-memory database alive and shared.
    let pool = db::init_pool("sqlite::memory:", 1)
        .await
        .expect("in-memory database");
    AppState::new(pool, 4)
}

pub fn registration_json(profession: &str) -> Value {
    let mut body = json!({
        "username": "newuser",
        "email": "a@b.com",
        "password": "abc123!",
        "password_repeat": "abc123!",
        "salutation": "Mr",
        "firstname": "Jan",
        "name": "Peeters",
        "profession": profession,
        "address": "Kerkstraat 1",
        "city": "Gent",
        "zipcode": "9000",
        "agree_user_terms": "1",
        "read_privacy_policy": "1",
        "profession_declaration": "1",
        "workplace_type": "HOSPITAL",
        "workplace_name": "UZ Gent",
        "riziv_number": "1-23456-78-901",
        "responsible_pneumologist": "Dr. Janssens"
    });
    if profession == "PHARMACIST" {
        body["apb_number"] = json!("AP123");
    }
    body
}

pub fn registration(profession: &str) -> RegistrationInput {
    serde_json::from_value(registration_json(profession)).expect("registration deserializes")
}
