use std::sync::LazyLock;

use eventhub_shared::{Storage, generate_id, keys};
use regex::Regex;
use serde::Serialize;
use time::OffsetDateTime;
use validator::{Validate, ValidationError};

use crate::{Role, User, UserPreferences};

static RE_NAME: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[\p{L} ]+$").unwrap());
static RE_PHONE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\+?[1-9]\d{0,15}$").unwrap());
static RE_EMAIL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap());

/// At least one lowercase letter, one uppercase letter and one digit.
fn validate_password_complexity(password: &str) -> Result<(), ValidationError> {
    let has_uppercase = password.chars().any(char::is_uppercase);
    let has_lowercase = password.chars().any(char::is_lowercase);
    let has_number = password.chars().any(|c| c.is_ascii_digit());

    if !has_uppercase || !has_lowercase || !has_number {
        return Err(ValidationError::new("password_complexity").with_message(
            "Password must contain at least one uppercase letter, one lowercase letter and one number"
                .into(),
        ));
    }

    Ok(())
}

/// Optional; whitespace is ignored.
fn validate_phone(phone: &str) -> Result<(), ValidationError> {
    let compact = phone.split_whitespace().collect::<String>();
    if compact.is_empty() || RE_PHONE.is_match(&compact) {
        return Ok(());
    }

    Err(ValidationError::new("phone").with_message("The phone number is not valid".into()))
}

#[derive(Validate, Clone, Debug, Default)]
pub struct NewUser {
    #[validate(
        length(min = 2, max = 50, message = "First name must be between 2 and 50 characters"),
        regex(path = *RE_NAME, message = "First name may only contain letters and spaces")
    )]
    pub first_name: String,
    #[validate(
        length(min = 2, max = 50, message = "Last name must be between 2 and 50 characters"),
        regex(path = *RE_NAME, message = "Last name may only contain letters and spaces")
    )]
    pub last_name: String,
    #[validate(
        regex(path = *RE_EMAIL, message = "The email address is not valid"),
        length(max = 100, message = "The email address must be at most 100 characters")
    )]
    pub email: String,
    #[validate(custom(function = "validate_phone"))]
    pub phone: String,
    #[validate(
        length(min = 6, max = 128, message = "Password must be between 6 and 128 characters"),
        custom(function = "validate_password_complexity")
    )]
    pub password: String,
}

/// Profile patch; `None` keeps the stored value.
#[derive(Validate, Clone, Debug, Default)]
pub struct UpdateProfileInput {
    #[validate(
        length(min = 2, max = 50, message = "First name must be between 2 and 50 characters"),
        regex(path = *RE_NAME, message = "First name may only contain letters and spaces")
    )]
    pub first_name: Option<String>,
    #[validate(
        length(min = 2, max = 50, message = "Last name must be between 2 and 50 characters"),
        regex(path = *RE_NAME, message = "Last name may only contain letters and spaces")
    )]
    pub last_name: Option<String>,
    #[validate(
        regex(path = *RE_EMAIL, message = "The email address is not valid"),
        length(max = 100, message = "The email address must be at most 100 characters")
    )]
    pub email: Option<String>,
    #[validate(custom(function = "validate_phone"))]
    pub phone: Option<String>,
    pub avatar: Option<String>,
    pub preferences: Option<UserPreferences>,
}

#[derive(Validate, Clone, Debug, Default)]
pub struct ChangePasswordInput {
    pub current_password: String,
    #[validate(
        length(min = 6, max = 128, message = "Password must be between 6 and 128 characters"),
        custom(function = "validate_password_complexity")
    )]
    pub new_password: String,
    #[validate(must_match(other = "new_password", message = "Passwords do not match"))]
    pub confirm_password: String,
}

#[derive(Serialize, Clone, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UserStats {
    pub total: usize,
    pub active: usize,
    pub inactive: usize,
    pub new_this_week: usize,
}

/// Durable set of user accounts, persisted as one record under
/// [`keys::USERS`].
///
/// Every call reloads the record first, so accounts written by another
/// handle on the same storage are always visible.
#[derive(Debug, Clone)]
pub struct UserDirectory {
    storage: Storage,
}

impl UserDirectory {
    pub fn new(storage: Storage) -> Self {
        Self { storage }
    }

    fn save(&self, users: &[User]) -> bool {
        self.storage.set(keys::USERS, users)
    }

    pub fn list(&self) -> Vec<User> {
        self.storage.get(keys::USERS, Vec::new())
    }

    pub fn find_by_id(&self, id: &str) -> Option<User> {
        self.list().into_iter().find(|u| u.id == id)
    }

    pub fn find_by_email(&self, email: &str) -> Option<User> {
        self.list().into_iter().find(|u| u.email_matches(email))
    }

    pub fn create(&self, input: NewUser) -> eventhub_shared::Result<User> {
        input.validate()?;

        let mut users = self.list();
        if users.iter().any(|u| u.email_matches(&input.email)) {
            eventhub_shared::conflict!("An account with this email already exists");
        }

        let user = User {
            id: generate_id("user"),
            first_name: input.first_name.trim().to_owned(),
            last_name: input.last_name.trim().to_owned(),
            email: input.email.trim().to_owned(),
            phone: input.phone.trim().to_owned(),
            password: input.password,
            created_at: OffsetDateTime::now_utc(),
            last_login: None,
            is_active: true,
            preferences: UserPreferences::default(),
            avatar: None,
            role: Role::default(),
        };

        users.push(user.clone());
        if !self.save(&users) {
            eventhub_shared::bail!("Could not save the account");
        }

        tracing::info!(id = %user.id, "user created");

        Ok(user)
    }

    pub fn update(&self, id: &str, input: UpdateProfileInput) -> eventhub_shared::Result<User> {
        input.validate()?;

        let mut users = self.list();
        let Some(index) = users.iter().position(|u| u.id == id) else {
            eventhub_shared::not_found!("User");
        };

        let taken = input
            .email
            .as_deref()
            .is_some_and(|email| users.iter().any(|u| u.id != id && u.email_matches(email)));
        if taken {
            eventhub_shared::conflict!("An account with this email already exists");
        }

        let user = &mut users[index];
        if let Some(first_name) = input.first_name {
            user.first_name = first_name.trim().to_owned();
        }
        if let Some(last_name) = input.last_name {
            user.last_name = last_name.trim().to_owned();
        }
        if let Some(email) = input.email {
            user.email = email.trim().to_owned();
        }
        if let Some(phone) = input.phone {
            user.phone = phone.trim().to_owned();
        }
        if let Some(avatar) = input.avatar {
            user.avatar = Some(avatar).filter(|a| !a.is_empty());
        }
        if let Some(preferences) = input.preferences {
            user.preferences = preferences;
        }
        let updated = user.clone();

        if !self.save(&users) {
            eventhub_shared::bail!("Could not save the changes");
        }

        tracing::info!(id, "user profile updated");

        Ok(updated)
    }

    pub fn change_password(&self, id: &str, input: ChangePasswordInput) -> eventhub_shared::Result<()> {
        let mut users = self.list();
        let Some(user) = users.iter_mut().find(|u| u.id == id) else {
            eventhub_shared::not_found!("User");
        };

        if user.password != input.current_password {
            eventhub_shared::user!("The current password is incorrect");
        }

        input.validate()?;

        if input.new_password == input.current_password {
            eventhub_shared::user!("The new password must be different from the current one");
        }

        user.password = input.new_password;

        if !self.save(&users) {
            eventhub_shared::bail!("Could not save the new password");
        }

        tracing::info!(id, "user password changed");

        Ok(())
    }

    /// Hard delete. Returns false for an unknown id.
    pub fn remove(&self, id: &str) -> bool {
        let mut users = self.list();
        let before = users.len();
        users.retain(|u| u.id != id);

        if users.len() == before {
            return false;
        }

        let removed = self.save(&users);
        if removed {
            tracing::info!(id, "user removed");
        }

        removed
    }

    /// Soft removal and reactivation.
    pub fn set_active(&self, id: &str, active: bool) -> eventhub_shared::Result<User> {
        self.modify(id, |user| user.is_active = active)
            .inspect(|_| tracing::info!(id, active, "user activation changed"))
    }

    pub fn record_login(&self, id: &str) -> eventhub_shared::Result<User> {
        self.modify(id, |user| user.last_login = Some(OffsetDateTime::now_utc()))
    }

    fn modify(&self, id: &str, change: impl FnOnce(&mut User)) -> eventhub_shared::Result<User> {
        let mut users = self.list();
        let Some(user) = users.iter_mut().find(|u| u.id == id) else {
            eventhub_shared::not_found!("User");
        };

        change(user);
        let updated = user.clone();

        if !self.save(&users) {
            eventhub_shared::bail!("Could not save the account");
        }

        Ok(updated)
    }

    pub fn stats(&self) -> UserStats {
        let now = OffsetDateTime::now_utc();
        let users = self.list();
        let active = users.iter().filter(|u| u.is_active).count();

        UserStats {
            total: users.len(),
            active,
            inactive: users.len() - active,
            new_this_week: users.iter().filter(|u| u.is_new_at(now)).count(),
        }
    }
}
