use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString, VariantArray};
use time::OffsetDateTime;
use validator::Validate;

#[derive(
    Serialize,
    Deserialize,
    EnumString,
    VariantArray,
    Display,
    AsRefStr,
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum RegistrationStatus {
    #[default]
    Pending,
    Confirmed,
    Cancelled,
}

/// Personal and contact details captured by the detailed registration form.
#[derive(Serialize, Deserialize, Validate, Clone, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct RegistrationDetails {
    #[validate(length(min = 1, message = "First name is required"))]
    pub first_name: String,
    #[validate(length(min = 1, message = "Last name is required"))]
    pub last_name: String,
    #[validate(email(message = "The email address is not valid"))]
    pub email: String,
    pub phone: String,
    pub address: String,
    pub city: String,
    pub emergency_contact: String,
    pub emergency_phone: String,
    pub special_requirements: String,
    pub dietary_restrictions: String,
    pub notes: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CustomRegistration {
    pub id: String,
    pub user_id: String,
    pub event_id: String,
    #[serde(default)]
    pub event_name: String,
    #[serde(flatten)]
    pub details: RegistrationDetails,
    #[serde(default)]
    pub payment_required: bool,
    #[serde(default)]
    pub notifications: bool,
    #[serde(default)]
    pub status: RegistrationStatus,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

#[derive(Validate, Clone, Debug, Default)]
pub struct CustomRegistrationInput {
    #[validate(length(min = 1, message = "A user is required for a registration"))]
    pub user_id: String,
    #[validate(length(min = 1, message = "An event is required for a registration"))]
    pub event_id: String,
    pub event_name: String,
    pub details: RegistrationDetails,
    pub payment_required: bool,
    pub notifications: bool,
    pub status: Option<RegistrationStatus>,
}
