use actix_web::HttpRequest;

use crate::signup::rules::{ErrorKind, Field};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Locale {
    #[default]
    En,
    Nl,
}

fn parse_locale(tag: &str) -> Option<Locale> {
    let tag = tag.trim().to_ascii_lowercase();
    if tag.starts_with("nl") {
        Some(Locale::Nl)
    } else if tag.starts_with("en") {
        Some(Locale::En)
    } else {
        None
    }
}

pub fn detect_locale(req: &HttpRequest) -> Locale {
    if let Some(lang) = req.query_string().split('&').find_map(|kv| {
        let mut it = kv.splitn(2, '=');
        let k = it.next()?;
        let v = it.next()?;
        if k == "lang" { Some(v) } else { None }
    }) {
        return parse_locale(lang).unwrap_or_default();
    }

    if let Some(h) = req.headers().get("Accept-Language").and_then(|v| v.to_str().ok()) {
        if let Some(first) = h.split(',').next().and_then(parse_locale) {
            return first;
        }
    }

    Locale::En
}

pub fn label(locale: Locale, field: Field) -> &'static str {
    match (locale, field) {
        (Locale::En, Field::Username) => "Username",
        (Locale::En, Field::Email) => "Email",
        (Locale::En, Field::Password) => "Password",
        (Locale::En, Field::PasswordRepeat) => "Repeat password",
        (Locale::En, Field::Salutation) => "Salutation",
        (Locale::En, Field::Firstname) => "Firstname",
        (Locale::En, Field::Name) => "Name",
        (Locale::En, Field::Profession) => "Profession",
        (Locale::En, Field::WorkplaceType) => "Workplace",
        (Locale::En, Field::WorkplaceName) => "Workplace name",
        (Locale::En, Field::Address) => "Address",
        (Locale::En, Field::City) => "City",
        (Locale::En, Field::Zipcode) => "Zipcode",
        (Locale::En, Field::Phone) => "Phone",
        (Locale::En, Field::Mobile) => "Mobile",
        (Locale::En, Field::RizivNumber) => "Riziv number",
        (Locale::En, Field::ApbNumber) => "APB number",
        (Locale::En, Field::ResponsiblePneumologist) => "Responsible pneumologist",
        (Locale::En, Field::AgreeUserTerms) => "I agree with the user-terms",
        (Locale::En, Field::ReadPrivacyPolicy) => "I have read the privacy policy",
        (Locale::En, Field::ProfessionDeclaration) => {
            "I declare to be a registered doctor, nurse or pharmacist"
        }
        (Locale::En, Field::Roles) => "Role",

        (Locale::Nl, Field::Username) => "Gebruikersnaam",
        (Locale::Nl, Field::Email) => "E-mail",
        (Locale::Nl, Field::Password) => "Wachtwoord",
        (Locale::Nl, Field::PasswordRepeat) => "Herhaal wachtwoord",
        (Locale::Nl, Field::Salutation) => "Aanspreking",
        (Locale::Nl, Field::Firstname) => "Voornaam",
        (Locale::Nl, Field::Name) => "Naam",
        (Locale::Nl, Field::Profession) => "Beroep",
        (Locale::Nl, Field::WorkplaceType) => "Werkplaats",
        (Locale::Nl, Field::WorkplaceName) => "Naam werkplaats",
        (Locale::Nl, Field::Address) => "Adres",
        (Locale::Nl, Field::City) => "Gemeente",
        (Locale::Nl, Field::Zipcode) => "Postcode",
        (Locale::Nl, Field::Phone) => "Telefoon",
        (Locale::Nl, Field::Mobile) => "GSM",
        (Locale::Nl, Field::RizivNumber) => "RIZIV-nummer",
        (Locale::Nl, Field::ApbNumber) => "APB-nummer",
        (Locale::Nl, Field::ResponsiblePneumologist) => "Verantwoordelijke pneumoloog",
        (Locale::Nl, Field::AgreeUserTerms) => "Ik ga akkoord met de gebruiksvoorwaarden",
        (Locale::Nl, Field::ReadPrivacyPolicy) => "Ik heb de privacyverklaring gelezen",
        (Locale::Nl, Field::ProfessionDeclaration) => {
            "Ik verklaar een geregistreerde arts, verpleegkundige of apotheker te zijn"
        }
        (Locale::Nl, Field::Roles) => "Rol",
    }
}

pub fn error_message(locale: Locale, field: Field, kind: ErrorKind) -> String {
    let l = label(locale, field);
    match locale {
        Locale::En => match kind {
            ErrorKind::Required => format!("{} cannot be blank.", l),
            ErrorKind::TooShort { min } => {
                format!("{} should contain at least {} characters.", l, min)
            }
            ErrorKind::TooLong { max } => {
                format!("{} should contain at most {} characters.", l, max)
            }
            ErrorKind::InvalidEmail => format!("{} is not a valid email address.", l),
            ErrorKind::UsernameTaken => "This username has already been taken.".to_string(),
            ErrorKind::EmailTaken => "This email address has already been taken.".to_string(),
            ErrorKind::MustBeChecked => format!("{} must be equal to \"1\".", l),
            ErrorKind::Invalid => format!("{} is invalid.", l),
            ErrorKind::PasswordMismatch => format!(
                "{} must be equal to \"{}\".",
                l,
                label(locale, Field::PasswordRepeat)
            ),
        },
        Locale::Nl => match kind {
            ErrorKind::Required => format!("{} mag niet leeg zijn.", l),
            ErrorKind::TooShort { min } => {
                format!("{} moet minstens {} tekens bevatten.", l, min)
            }
            ErrorKind::TooLong { max } => format!("{} mag maximaal {} tekens bevatten.", l, max),
            ErrorKind::InvalidEmail => format!("{} is geen geldig e-mailadres.", l),
            ErrorKind::UsernameTaken => "Deze gebruikersnaam is al in gebruik.".to_string(),
            ErrorKind::EmailTaken => "Dit e-mailadres is al in gebruik.".to_string(),
            ErrorKind::MustBeChecked => format!("{} moet gelijk zijn aan \"1\".", l),
            ErrorKind::Invalid => format!("{} is ongeldig.", l),
            ErrorKind::PasswordMismatch => format!(
                "{} moet gelijk zijn aan \"{}\".",
                l,
                label(locale, Field::PasswordRepeat)
            ),
        },
    }
}

/// Static strings of the admin account screen.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Text {
    UpdateTitle,
    Confirm,
    Block,
    Unblock,
    BlockPrompt,
    UnblockPrompt,
    Save,
    Updated,
    Confirmed,
    Blocked,
    Unblocked,
    SignupFailed,
}

pub fn text(locale: Locale, key: Text) -> &'static str {
    match (locale, key) {
        (Locale::En, Text::UpdateTitle) => "Update user account",
        (Locale::En, Text::Confirm) => "Confirm",
        (Locale::En, Text::Block) => "Block",
        (Locale::En, Text::Unblock) => "Unblock",
        (Locale::En, Text::BlockPrompt) => "Are you sure to block this user?",
        (Locale::En, Text::UnblockPrompt) => "Are you sure to unblock this user?",
        (Locale::En, Text::Save) => "Save",
        (Locale::En, Text::Updated) => "Account details have been updated",
        (Locale::En, Text::Confirmed) => "User has been confirmed",
        (Locale::En, Text::Blocked) => "User has been blocked",
        (Locale::En, Text::Unblocked) => "User has been unblocked",
        (Locale::En, Text::SignupFailed) => "Signup failed",

        (Locale::Nl, Text::UpdateTitle) => "Gebruikersaccount bijwerken",
        (Locale::Nl, Text::Confirm) => "Bevestigen",
        (Locale::Nl, Text::Block) => "Blokkeren",
        (Locale::Nl, Text::Unblock) => "Deblokkeren",
        (Locale::Nl, Text::BlockPrompt) => "Weet je zeker dat je deze gebruiker wil blokkeren?",
        (Locale::Nl, Text::UnblockPrompt) => {
            "Weet je zeker dat je deze gebruiker wil deblokkeren?"
        }
        (Locale::Nl, Text::Save) => "Opslaan",
        (Locale::Nl, Text::Updated) => "De accountgegevens zijn bijgewerkt",
        (Locale::Nl, Text::Confirmed) => "De gebruiker is bevestigd",
        (Locale::Nl, Text::Blocked) => "De gebruiker is geblokkeerd",
        (Locale::Nl, Text::Unblocked) => "De gebruiker is gedeblokkeerd",
        (Locale::Nl, Text::SignupFailed) => "Registratie mislukt",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test::TestRequest;

    #[test]
    fn query_parameter_wins_over_header() {
        let req = TestRequest::default()
            .uri("/admin/users/1/update?lang=nl")
            .insert_header(("Accept-Language", "en-US,en;q=0.9"))
            .to_http_request();
        assert_eq!(detect_locale(&req), Locale::Nl);
    }

    #[test]
    fn header_is_used_without_query() {
        let req = TestRequest::default()
            .insert_header(("Accept-Language", "nl-BE,nl;q=0.9,en;q=0.8"))
            .to_http_request();
        assert_eq!(detect_locale(&req), Locale::Nl);

        let req = TestRequest::default()
            .insert_header(("Accept-Language", "fr-BE"))
            .to_http_request();
        assert_eq!(detect_locale(&req), Locale::En);
    }

    #[test]
    fn messages_use_field_labels() {
        assert_eq!(
            error_message(Locale::En, Field::RizivNumber, ErrorKind::Required),
            "Riziv number cannot be blank."
        );
        assert_eq!(
            error_message(Locale::En, Field::Username, ErrorKind::TooShort { min: 3 }),
            "Username should contain at least 3 characters."
        );
        assert_eq!(
            error_message(Locale::En, Field::Password, ErrorKind::PasswordMismatch),
            "Password must be equal to \"Repeat password\"."
        );
        assert_eq!(
            error_message(Locale::Nl, Field::Email, ErrorKind::EmailTaken),
            "Dit e-mailadres is al in gebruik."
        );
    }
}
