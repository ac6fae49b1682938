//! Registration of health professionals: validation of the submitted form
//! and transactional creation of the account with its profile.

pub mod orchestrator;
pub mod rules;
pub mod validator;

pub use orchestrator::{SignupError, SignupService};
pub use rules::{ErrorKind, Field, ValidationErrors};

#[cfg(test)]
pub(crate) mod fixtures {
    use crate::models::RegistrationInput;

    /// A registration that passes every rule for the given profession.
    pub(crate) fn complete(profession: &str) -> RegistrationInput {
        let mut input = RegistrationInput {
            username: Some("newuser".into()),
            email: Some("a@b.com".into()),
            password: Some("abc123!".into()),
            password_repeat: Some("abc123!".into()),
            salutation: Some("Mr".into()),
            firstname: Some("Jan".into()),
            name: Some("Peeters".into()),
            profession: Some(profession.into()),
            address: Some("Kerkstraat 1".into()),
            city: Some("Gent".into()),
            zipcode: Some("9000".into()),
            agree_user_terms: Some(true),
            read_privacy_policy: Some(true),
            profession_declaration: Some(true),
            ..Default::default()
        };
        match profession {
            "PHARMACIST" => input.apb_number = Some("AP123".into()),
            "NURSE" | "PNEUMOLOGIST" => {
                input.workplace_type = Some("HOSPITAL".into());
                input.workplace_name = Some("UZ Gent".into());
                input.riziv_number = Some("1-23456-78-901".into());
            }
            _ => input.riziv_number = Some("1-23456-78-901".into()),
        }
        input
    }
}
