//! Field names, error kinds and the profession-dependent rule table.
//!
//! The table is the single source for which conditional fields a profession
//! carries and which of those it must fill in. The validator reads it to
//! decide what is required, the orchestrator reads it to blank whatever the
//! profession does not carry before the profile is written.

use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

use crate::i18n::{self, Locale};
use crate::models::Profession;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    Username,
    Email,
    Password,
    PasswordRepeat,
    Salutation,
    Firstname,
    Name,
    Profession,
    WorkplaceType,
    WorkplaceName,
    Address,
    City,
    Zipcode,
    Phone,
    Mobile,
    RizivNumber,
    ApbNumber,
    ResponsiblePneumologist,
    AgreeUserTerms,
    ReadPrivacyPolicy,
    ProfessionDeclaration,
    Roles,
}

impl Field {
    pub fn as_str(&self) -> &'static str {
        match self {
            Field::Username => "username",
            Field::Email => "email",
            Field::Password => "password",
            Field::PasswordRepeat => "password_repeat",
            Field::Salutation => "salutation",
            Field::Firstname => "firstname",
            Field::Name => "name",
            Field::Profession => "profession",
            Field::WorkplaceType => "workplace_type",
            Field::WorkplaceName => "workplace_name",
            Field::Address => "address",
            Field::City => "city",
            Field::Zipcode => "zipcode",
            Field::Phone => "phone",
            Field::Mobile => "mobile",
            Field::RizivNumber => "riziv_number",
            Field::ApbNumber => "apb_number",
            Field::ResponsiblePneumologist => "responsible_pneumologist",
            Field::AgreeUserTerms => "agree_user_terms",
            Field::ReadPrivacyPolicy => "read_privacy_policy",
            Field::ProfessionDeclaration => "profession_declaration",
            Field::Roles => "roles",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Required,
    TooShort { min: usize },
    TooLong { max: usize },
    InvalidEmail,
    UsernameTaken,
    EmailTaken,
    MustBeChecked,
    Invalid,
    PasswordMismatch,
}

/// Field-attributed validation failures, in field order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValidationErrors {
    errors: BTreeMap<Field, Vec<ErrorKind>>,
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "validation failed for: {}", self.field_names().join(", "))
    }
}

impl std::error::Error for ValidationErrors {}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn single(field: Field, kind: ErrorKind) -> Self {
        let mut errors = Self::new();
        errors.add(field, kind);
        errors
    }

    pub fn add(&mut self, field: Field, kind: ErrorKind) {
        self.errors.entry(field).or_default().push(kind);
    }

    pub fn has(&self, field: Field) -> bool {
        self.errors.contains_key(&field)
    }

    pub fn get(&self, field: Field) -> &[ErrorKind] {
        self.errors.get(&field).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn field_names(&self) -> Vec<&'static str> {
        self.errors.keys().map(Field::as_str).collect()
    }

    pub fn into_result(self) -> Result<(), ValidationErrors> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }

    /// Renders every error as a sentence in the given locale, keyed by the
    /// form field name.
    pub fn messages(&self, locale: Locale) -> BTreeMap<&'static str, Vec<String>> {
        self.errors
            .iter()
            .map(|(field, kinds)| {
                let rendered = kinds
                    .iter()
                    .map(|kind| i18n::error_message(locale, *field, *kind))
                    .collect();
                (field.as_str(), rendered)
            })
            .collect()
    }
}

/// Which professions a conditional field belongs to.
#[derive(Debug, Clone, Copy)]
pub enum Applies {
    OneOf(&'static [Profession]),
    AllExcept(&'static [Profession]),
}

impl Applies {
    pub fn matches(&self, profession: Profession) -> bool {
        match self {
            Applies::OneOf(list) => list.contains(&profession),
            Applies::AllExcept(list) => !list.contains(&profession),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ConditionalField {
    pub field: Field,
    pub applies: Applies,
    pub required: bool,
}

const WORKPLACE_PROFESSIONS: &[Profession] = &[Profession::Pneumologist, Profession::Nurse];

/// riziv_number is required for every profession except pharmacists, which
/// means nurses and pneumologists need it on top of their workplace fields.
pub const CONDITIONAL_FIELDS: &[ConditionalField] = &[
    ConditionalField {
        field: Field::WorkplaceType,
        applies: Applies::OneOf(WORKPLACE_PROFESSIONS),
        required: true,
    },
    ConditionalField {
        field: Field::WorkplaceName,
        applies: Applies::OneOf(WORKPLACE_PROFESSIONS),
        required: true,
    },
    ConditionalField {
        field: Field::ApbNumber,
        applies: Applies::OneOf(&[Profession::Pharmacist]),
        required: true,
    },
    ConditionalField {
        field: Field::RizivNumber,
        applies: Applies::AllExcept(&[Profession::Pharmacist]),
        required: true,
    },
    ConditionalField {
        field: Field::ResponsiblePneumologist,
        applies: Applies::OneOf(&[Profession::Nurse]),
        required: false,
    },
];

/// Conditional fields the profession has to fill in.
pub fn required_for(profession: Profession) -> impl Iterator<Item = Field> {
    CONDITIONAL_FIELDS
        .iter()
        .filter(move |rule| rule.required && rule.applies.matches(profession))
        .map(|rule| rule.field)
}

/// Whether a conditional field is kept for the profession. Fields that are
/// not conditional at all are always kept.
pub fn carries(profession: Option<Profession>, field: Field) -> bool {
    match CONDITIONAL_FIELDS.iter().find(|rule| rule.field == field) {
        None => true,
        Some(rule) => profession.map_or(false, |p| rule.applies.matches(p)),
    }
}
