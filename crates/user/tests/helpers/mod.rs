use eventhub_registration::RegistrationLedger;
use eventhub_shared::Storage;
use eventhub_user::{
    AuthSession, DEFAULT_SESSION_TIMEOUT, LoginInput, NewUser, SessionStore, User, UserDirectory,
};

pub const PASSWORD: &str = "Secret123";

#[allow(dead_code)]
pub struct TestState {
    pub storage: Storage,
    pub directory: UserDirectory,
    pub sessions: SessionStore,
    pub ledger: RegistrationLedger,
}

pub fn setup_test_state() -> TestState {
    setup_with_storage(Storage::memory())
}

#[allow(dead_code)]
pub fn setup_with_storage(storage: Storage) -> TestState {
    TestState {
        directory: UserDirectory::new(storage.clone()),
        sessions: SessionStore::new(storage.clone()),
        ledger: RegistrationLedger::new(storage.clone()),
        storage,
    }
}

impl TestState {
    pub fn auth(&self) -> AuthSession {
        AuthSession::new(
            self.directory.clone(),
            self.sessions.clone(),
            self.ledger.clone(),
            DEFAULT_SESSION_TIMEOUT,
        )
    }
}

pub fn new_user(name: &str) -> NewUser {
    NewUser {
        first_name: capitalize(name),
        last_name: "Tester".to_owned(),
        email: format!("{name}@eventhub.localhost"),
        phone: String::new(),
        password: PASSWORD.to_owned(),
    }
}

fn capitalize(name: &str) -> String {
    let mut chars = name.chars();
    chars
        .next()
        .map(|first| first.to_uppercase().chain(chars).collect())
        .unwrap_or_default()
}

#[allow(dead_code)]
pub fn create_user(state: &TestState, name: &str) -> anyhow::Result<User> {
    Ok(state.directory.create(new_user(name))?)
}

#[allow(dead_code)]
pub fn login_input(name: &str) -> LoginInput {
    LoginInput {
        email: format!("{name}@eventhub.localhost"),
        password: PASSWORD.to_owned(),
    }
}

#[allow(dead_code)]
pub fn login(state: &TestState, name: &str) -> anyhow::Result<(AuthSession, User)> {
    let user = create_user(state, name)?;
    let mut auth = state.auth();
    auth.login(login_input(name))?;

    Ok((auth, user))
}
