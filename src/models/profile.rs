use serde::{Deserialize, Serialize};
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Profession {
    Pneumologist,
    Nurse,
    Pharmacist,
    Doctor,
}

impl Profession {
    pub const ALL: [Profession; 4] = [
        Profession::Pneumologist,
        Profession::Nurse,
        Profession::Pharmacist,
        Profession::Doctor,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Profession::Pneumologist => "PNEUMOLOGIST",
            Profession::Nurse => "NURSE",
            Profession::Pharmacist => "PHARMACIST",
            Profession::Doctor => "DOCTOR",
        }
    }
}

impl FromStr for Profession {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Profession::ALL
            .into_iter()
            .find(|p| p.as_str() == s)
            .ok_or(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WorkplaceType {
    Hospital,
    Private,
}

impl FromStr for WorkplaceType {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "HOSPITAL" => Ok(WorkplaceType::Hospital),
            "PRIVATE" => Ok(WorkplaceType::Private),
            _ => Err(()),
        }
    }
}

/// Personal and professional details, one row per account. Conditional
/// columns hold an empty string when they do not apply to the profession.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub user_id: String,
    pub name: String,
    pub firstname: String,
    pub public_email: String,
    pub salutation: String,
    pub profession: String,
    pub address: String,
    pub city: String,
    pub zipcode: String,
    pub phone: String,
    pub mobile: String,
    pub workplace_type: String,
    pub workplace_name: String,
    pub riziv_number: String,
    pub apb_number: String,
    pub responsible_pneumologist: String,
}
