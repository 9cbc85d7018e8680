use eventhub_registration::RegistrationLedger;
use time::Duration;
use validator::Validate;

use crate::{ChangePasswordInput, NewUser, SessionStore, UpdateProfileInput, User, UserDirectory};

pub const DEFAULT_SESSION_TIMEOUT: Duration = Duration::hours(24);
pub const DEFAULT_EXPIRY_WARNING: Duration = Duration::minutes(5);

const INVALID_CREDENTIALS: &str = "Invalid email or password";
const NOT_AUTHENTICATED: &str = "You must be logged in";

#[derive(Validate, Clone, Debug, Default)]
pub struct LoginInput {
    #[validate(length(min = 1, message = "Email is required"))]
    pub email: String,
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

#[derive(Debug, Clone)]
struct Authenticated {
    user: User,
    registrations: Vec<String>,
}

/// Anonymous or authenticated view over the accounts of one store.
///
/// The session record is checked on every access, so expiry and a logout
/// made through another handle are picked up lazily without a timer.
#[derive(Debug)]
pub struct AuthSession {
    directory: UserDirectory,
    sessions: SessionStore,
    ledger: RegistrationLedger,
    timeout: Duration,
    current: Option<Authenticated>,
}

impl AuthSession {
    /// Restores a valid session for an active user; anything else is cleared.
    pub fn new(
        directory: UserDirectory,
        sessions: SessionStore,
        ledger: RegistrationLedger,
        timeout: Duration,
    ) -> Self {
        let mut auth = Self {
            directory,
            sessions,
            ledger,
            timeout,
            current: None,
        };
        auth.restore();

        auth
    }

    fn restore(&mut self) {
        let Some(session) = self.sessions.current() else {
            return;
        };

        let user = self
            .sessions
            .is_valid(self.timeout)
            .then(|| self.directory.find_by_id(&session.user_id))
            .flatten()
            .filter(|u| u.is_active);

        match user {
            Some(user) => {
                tracing::debug!(user_id = %user.id, "session restored");
                self.hydrate(user);
            }
            None => {
                tracing::info!(user_id = %session.user_id, "stale session cleared");
                self.sessions.clear();
            }
        }
    }

    fn hydrate(&mut self, user: User) {
        let registrations = self.ledger.regular_for(&user.id);
        self.current = Some(Authenticated {
            user,
            registrations,
        });
    }

    /// Drops the in-memory user when the stored session no longer backs it,
    /// or when the account was removed or deactivated through another handle.
    fn check_session(&mut self) {
        let Some(current) = self.current.as_mut() else {
            return;
        };

        let backed = self.sessions.is_valid(self.timeout)
            && self
                .sessions
                .current()
                .is_some_and(|s| s.user_id == current.user.id);

        let user = backed
            .then(|| self.directory.find_by_id(&current.user.id))
            .flatten()
            .filter(|u| u.is_active);

        match user {
            Some(user) => current.user = user,
            None => {
                tracing::info!(user_id = %current.user.id, "session no longer valid");
                self.current = None;
                self.sessions.clear();
            }
        }
    }

    pub fn login(&mut self, input: LoginInput) -> eventhub_shared::Result<User> {
        input.validate()?;

        let Some(user) = self
            .directory
            .list()
            .into_iter()
            .find(|u| u.is_active && u.email_matches(&input.email))
        else {
            tracing::debug!("login rejected");
            eventhub_shared::user!("{INVALID_CREDENTIALS}");
        };

        if user.password != input.password {
            tracing::debug!(user_id = %user.id, "login rejected");
            eventhub_shared::user!("{INVALID_CREDENTIALS}");
        }

        let user = self.directory.record_login(&user.id)?;

        if !self.sessions.start(&user.id) {
            eventhub_shared::bail!("Could not save the session");
        }

        tracing::info!(user_id = %user.id, "user logged in");
        self.hydrate(user.clone());

        Ok(user)
    }

    pub fn logout(&mut self) {
        if let Some(current) = self.current.take() {
            tracing::info!(user_id = %current.user.id, "user logged out");
        }

        self.sessions.clear();
    }

    /// Creates the account without logging it in.
    pub fn register(&self, input: NewUser) -> eventhub_shared::Result<User> {
        self.directory.create(input)
    }

    pub fn is_authenticated(&mut self) -> bool {
        self.check_session();

        self.current.is_some()
    }

    pub fn require_authenticated(&mut self) -> bool {
        self.is_authenticated()
    }

    pub fn current_user(&mut self) -> Option<&User> {
        self.check_session();

        self.current.as_ref().map(|c| &c.user)
    }

    pub fn current_user_id(&mut self) -> Option<String> {
        self.current_user().map(|u| u.id.to_owned())
    }

    /// Regular registrations of the current user, re-read from the ledger.
    pub fn registrations(&mut self) -> &[String] {
        self.check_session();

        match self.current.as_mut() {
            Some(current) => {
                current.registrations = self.ledger.regular_for(&current.user.id);
                &current.registrations
            }
            None => &[],
        }
    }

    fn authenticated_id(&mut self) -> eventhub_shared::Result<String> {
        match self.current_user_id() {
            Some(id) => Ok(id),
            None => eventhub_shared::user!("{NOT_AUTHENTICATED}"),
        }
    }

    pub fn update_profile(&mut self, input: UpdateProfileInput) -> eventhub_shared::Result<User> {
        let id = self.authenticated_id()?;
        let user = self.directory.update(&id, input)?;

        if let Some(current) = self.current.as_mut() {
            current.user = user.clone();
        }

        Ok(user)
    }

    pub fn change_password(&mut self, input: ChangePasswordInput) -> eventhub_shared::Result<()> {
        let id = self.authenticated_id()?;
        self.directory.change_password(&id, input)?;

        if let (Some(current), Some(user)) = (self.current.as_mut(), self.directory.find_by_id(&id)) {
            current.user = user;
        }

        Ok(())
    }

    /// Hard-deletes an account; deleting the current one logs out.
    pub fn delete_account(&mut self, id: &str) -> eventhub_shared::Result<()> {
        if !self.directory.remove(id) {
            eventhub_shared::not_found!("User");
        }

        if self.current.as_ref().is_some_and(|c| c.user.id == id) {
            self.logout();
        }

        Ok(())
    }

    /// Deactivating the current user ends the session.
    pub fn set_active(&mut self, id: &str, active: bool) -> eventhub_shared::Result<User> {
        let user = self.directory.set_active(id, active)?;

        let is_current = self.current.as_ref().is_some_and(|c| c.user.id == id);
        if is_current && !active {
            self.logout();
        } else if let Some(current) = self.current.as_mut().filter(|c| c.user.id == id) {
            current.user = user.clone();
        }

        Ok(user)
    }

    /// Touches the session timestamp; false when not authenticated.
    pub fn extend_session(&mut self) -> bool {
        self.is_authenticated() && self.sessions.extend()
    }

    pub fn session_remaining(&mut self) -> Duration {
        if !self.is_authenticated() {
            return Duration::ZERO;
        }

        self.sessions.remaining(self.timeout)
    }

    pub fn is_session_expiring_soon(&mut self, threshold: Duration) -> bool {
        self.is_authenticated() && self.sessions.remaining(self.timeout) <= threshold
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}
