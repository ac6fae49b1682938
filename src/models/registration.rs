use serde::{Deserialize, Deserializer};

/// Fields submitted by the signup form. Nothing here is trusted; the
/// validator decides what is usable and the orchestrator decides what is
/// stored.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RegistrationInput {
    #[serde(deserialize_with = "text")]
    pub username: Option<String>,
    #[serde(deserialize_with = "text")]
    pub email: Option<String>,
    #[serde(deserialize_with = "text")]
    pub password: Option<String>,
    #[serde(deserialize_with = "text")]
    pub password_repeat: Option<String>,
    #[serde(deserialize_with = "text")]
    pub salutation: Option<String>,
    #[serde(deserialize_with = "text")]
    pub firstname: Option<String>,
    #[serde(deserialize_with = "text")]
    pub name: Option<String>,
    #[serde(deserialize_with = "text")]
    pub profession: Option<String>,
    #[serde(deserialize_with = "text")]
    pub workplace_type: Option<String>,
    #[serde(deserialize_with = "text")]
    pub workplace_name: Option<String>,
    #[serde(deserialize_with = "text")]
    pub address: Option<String>,
    #[serde(deserialize_with = "text")]
    pub city: Option<String>,
    #[serde(deserialize_with = "text")]
    pub zipcode: Option<String>,
    #[serde(deserialize_with = "text")]
    pub phone: Option<String>,
    #[serde(deserialize_with = "text")]
    pub mobile: Option<String>,
    #[serde(deserialize_with = "text")]
    pub riziv_number: Option<String>,
    #[serde(deserialize_with = "text")]
    pub apb_number: Option<String>,
    #[serde(deserialize_with = "text")]
    pub order_of_pharmacists_number: Option<String>,
    #[serde(deserialize_with = "text")]
    pub responsible_pneumologist: Option<String>,
    #[serde(deserialize_with = "checkbox")]
    pub agree_user_terms: Option<bool>,
    #[serde(deserialize_with = "checkbox")]
    pub read_privacy_policy: Option<bool>,
    #[serde(deserialize_with = "checkbox")]
    pub profession_declaration: Option<bool>,
}

impl RegistrationInput {
    /// Trims the whitespace-normalized fields in place. Values that end up
    /// empty become `None` so they are treated as not submitted.
    pub fn normalize(&mut self) {
        for field in [
            &mut self.name,
            &mut self.firstname,
            &mut self.email,
            &mut self.address,
            &mut self.zipcode,
            &mut self.city,
            &mut self.phone,
            &mut self.mobile,
            &mut self.username,
            &mut self.workplace_name,
            &mut self.responsible_pneumologist,
        ] {
            if let Some(value) = field.take() {
                let trimmed = value.trim();
                if !trimmed.is_empty() {
                    *field = Some(trimmed.to_string());
                }
            }
        }
    }
}

/// Returns the value when it holds something other than whitespace.
pub(crate) fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.trim().is_empty())
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Scalar {
    Bool(bool),
    Integer(i64),
    Float(f64),
    Text(String),
}

// JSON clients send zipcodes and phone numbers as numbers.
fn text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Scalar>::deserialize(deserializer)?;
    Ok(value.map(|v| match v {
        Scalar::Bool(b) => b.to_string(),
        Scalar::Integer(n) => n.to_string(),
        Scalar::Float(n) => n.to_string(),
        Scalar::Text(s) => s,
    }))
}

// HTML checkboxes post "1", JSON clients tend to send 1 or true. A blank
// value counts as not submitted.
fn checkbox<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Scalar>::deserialize(deserializer)?;
    Ok(value.and_then(|v| match v {
        Scalar::Bool(b) => Some(b),
        Scalar::Integer(n) => Some(n == 1),
        Scalar::Float(n) => Some(n == 1.0),
        Scalar::Text(s) if s.trim().is_empty() => None,
        Scalar::Text(s) => Some(s.trim() == "1"),
    }))
}
