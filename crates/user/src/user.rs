use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};
use time::{Duration, OffsetDateTime};

#[derive(
    Serialize, Deserialize, EnumString, Display, AsRefStr, Clone, Copy, Debug, Default, PartialEq, Eq,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Role {
    #[default]
    User,
    Admin,
}

/// Per-account notification toggles.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct UserPreferences {
    pub email_notifications: bool,
    pub event_reminders: bool,
    pub newsletter: bool,
}

impl Default for UserPreferences {
    fn default() -> Self {
        Self {
            email_notifications: true,
            event_reminders: true,
            newsletter: true,
        }
    }
}

fn default_active() -> bool {
    true
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    #[serde(default)]
    pub phone: String,
    /// Stored as entered.
    pub password: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub last_login: Option<OffsetDateTime>,
    #[serde(default = "default_active")]
    pub is_active: bool,
    #[serde(default)]
    pub preferences: UserPreferences,
    #[serde(default)]
    pub avatar: Option<String>,
    #[serde(default)]
    pub role: Role,
}

impl User {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    pub fn initials(&self) -> String {
        self.first_name
            .chars()
            .take(1)
            .chain(self.last_name.chars().take(1))
            .flat_map(char::to_uppercase)
            .collect()
    }

    /// Accounts created within the last seven days.
    pub fn is_new_at(&self, now: OffsetDateTime) -> bool {
        now - self.created_at <= Duration::days(7)
    }

    pub fn email_matches(&self, email: &str) -> bool {
        self.email.to_lowercase() == email.trim().to_lowercase()
    }

    pub fn can_receive_notifications(&self) -> bool {
        self.is_active && self.preferences.email_notifications
    }

    pub fn can_receive_reminders(&self) -> bool {
        self.is_active && self.preferences.event_reminders
    }

    pub fn can_receive_newsletter(&self) -> bool {
        self.is_active && self.preferences.newsletter
    }
}
