use regex::Regex;
use std::sync::LazyLock;

use super::rules::{self, ErrorKind, Field, ValidationErrors};
use crate::models::registration::present;
use crate::models::{Profession, RegistrationInput, WorkplaceType};
use crate::store::{AccountLookup, StoreError};

pub const USERNAME_MIN: usize = 3;
pub const USERNAME_MAX: usize = 255;
const EMAIL_MAX: usize = 254;
const EMAIL_LOCAL_MAX: usize = 64;

static EMAIL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^[a-zA-Z0-9!#$%&'*+/=?^_`{|}~-]+(?:\.[a-zA-Z0-9!#$%&'*+/=?^_`{|}~-]+)*@(?:[a-zA-Z0-9](?:[a-zA-Z0-9-]*[a-zA-Z0-9])?\.)+[a-zA-Z0-9](?:[a-zA-Z0-9-]*[a-zA-Z0-9])?$",
    )
    .expect("email pattern compiles")
});

const PASSWORD_SYMBOLS: &str = "!@#$%^&*";
const PASSWORD_MIN: usize = 6;

pub(crate) fn is_valid_email(email: &str) -> bool {
    if email.len() > EMAIL_MAX {
        return false;
    }
    match email.rsplit_once('@') {
        Some((local, _)) if local.len() <= EMAIL_LOCAL_MAX => EMAIL.is_match(email),
        _ => false,
    }
}

/// At least six characters from letters, digits and `!@#$%^&*`, with at
/// least one digit and one of those symbols.
pub(crate) fn is_strong_password(password: &str) -> bool {
    let allowed = |c: char| c.is_ascii_alphanumeric() || PASSWORD_SYMBOLS.contains(c);
    password.chars().count() >= PASSWORD_MIN
        && password.chars().all(allowed)
        && password.chars().any(|c| c.is_ascii_digit())
        && password.chars().any(|c| PASSWORD_SYMBOLS.contains(c))
}

/// Collects every rule violation that can be decided from the input alone.
/// Expects an input that went through [`RegistrationInput::normalize`].
pub fn check_rules(input: &RegistrationInput) -> ValidationErrors {
    let mut errors = ValidationErrors::new();

    let required_text = [
        (Field::Salutation, &input.salutation),
        (Field::Name, &input.name),
        (Field::Firstname, &input.firstname),
        (Field::Email, &input.email),
        (Field::Address, &input.address),
        (Field::Profession, &input.profession),
        (Field::Username, &input.username),
        (Field::Password, &input.password),
    ];
    for (field, value) in required_text {
        if present(value).is_none() {
            errors.add(field, ErrorKind::Required);
        }
    }

    for (field, value) in [
        (Field::AgreeUserTerms, input.agree_user_terms),
        (Field::ReadPrivacyPolicy, input.read_privacy_policy),
        (Field::ProfessionDeclaration, input.profession_declaration),
    ] {
        match value {
            None => errors.add(field, ErrorKind::Required),
            Some(false) => errors.add(field, ErrorKind::MustBeChecked),
            Some(true) => {}
        }
    }

    if let Some(username) = present(&input.username) {
        let length = username.chars().count();
        if length < USERNAME_MIN {
            errors.add(Field::Username, ErrorKind::TooShort { min: USERNAME_MIN });
        } else if length > USERNAME_MAX {
            errors.add(Field::Username, ErrorKind::TooLong { max: USERNAME_MAX });
        }
    }

    if let Some(email) = present(&input.email) {
        if !is_valid_email(email) {
            errors.add(Field::Email, ErrorKind::InvalidEmail);
        }
    }

    for (field, value) in [
        (Field::Password, &input.password),
        (Field::PasswordRepeat, &input.password_repeat),
    ] {
        if let Some(password) = present(value) {
            if !is_strong_password(password) {
                errors.add(field, ErrorKind::Invalid);
            }
        }
    }

    if !errors.has(Field::Password) && input.password != input.password_repeat {
        errors.add(Field::Password, ErrorKind::PasswordMismatch);
    }

    let profession = present(&input.profession).map(str::parse::<Profession>);
    match profession {
        Some(Ok(profession)) => check_profession_fields(input, profession, &mut errors),
        Some(Err(())) => errors.add(Field::Profession, ErrorKind::Invalid),
        None => {}
    }

    errors
}

fn check_profession_fields(
    input: &RegistrationInput,
    profession: Profession,
    errors: &mut ValidationErrors,
) {
    for field in rules::required_for(profession) {
        if conditional_value(input, field).is_none() {
            errors.add(field, ErrorKind::Required);
        }
    }

    if !errors.has(Field::WorkplaceType) && rules::carries(Some(profession), Field::WorkplaceType) {
        if let Some(value) = present(&input.workplace_type) {
            if value.parse::<WorkplaceType>().is_err() {
                errors.add(Field::WorkplaceType, ErrorKind::Invalid);
            }
        }
    }
}

/// The submitted value of a profession-dependent field, if any.
pub(crate) fn conditional_value(input: &RegistrationInput, field: Field) -> Option<&str> {
    let value = match field {
        Field::WorkplaceType => &input.workplace_type,
        Field::WorkplaceName => &input.workplace_name,
        Field::RizivNumber => &input.riziv_number,
        Field::ApbNumber => &input.apb_number,
        Field::ResponsiblePneumologist => &input.responsible_pneumologist,
        _ => return None,
    };
    present(value)
}

/// Full validation pass: static and conditional rules first, then the
/// uniqueness look-ups for fields that are otherwise valid.
pub async fn validate<L>(
    input: &RegistrationInput,
    lookup: &L,
) -> Result<Result<(), ValidationErrors>, StoreError>
where
    L: AccountLookup + ?Sized,
{
    let mut errors = check_rules(input);

    if !errors.has(Field::Username) {
        if let Some(username) = present(&input.username) {
            if lookup.username_taken(username).await? {
                errors.add(Field::Username, ErrorKind::UsernameTaken);
            }
        }
    }

    if !errors.has(Field::Email) {
        if let Some(email) = present(&input.email) {
            if lookup.email_taken(email).await? {
                errors.add(Field::Email, ErrorKind::EmailTaken);
            }
        }
    }

    Ok(errors.into_result())
}
