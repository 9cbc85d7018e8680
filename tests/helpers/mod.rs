use std::{
    collections::HashSet,
    sync::{Arc, Mutex},
};

use eventhub::{App, RegistrationCoordinator};
use eventhub_event::{Event, EventCatalog};
use eventhub_shared::{KeyValueStore, MemoryStore, Storage, StorageError, keys};
use eventhub_user::{DEFAULT_SESSION_TIMEOUT, LoginInput, NewUser, User};
use time::{Duration, OffsetDateTime};

pub const PASSWORD: &str = "Secret123";

/// Memory store whose writes to selected keys can be made to fail.
#[derive(Default)]
pub struct FlakyStore {
    inner: MemoryStore,
    failing: Arc<Mutex<HashSet<String>>>,
}

impl KeyValueStore for FlakyStore {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.inner.read(key)
    }

    fn write(&self, key: &str, value: &str) -> Result<(), StorageError> {
        if self.failing.lock().unwrap().contains(key) {
            return Err(StorageError::Io(std::io::Error::other("write refused")));
        }

        self.inner.write(key, value)
    }

    fn delete(&self, key: &str) -> Result<(), StorageError> {
        self.inner.delete(key)
    }

    fn clear(&self) -> Result<(), StorageError> {
        self.inner.clear()
    }
}

pub struct TestState {
    pub app: App,
    failing: Arc<Mutex<HashSet<String>>>,
}

impl TestState {
    pub fn coordinator(&mut self) -> &mut RegistrationCoordinator {
        &mut self.app.coordinator
    }

    #[allow(dead_code)]
    pub fn fail_writes(&self, key: &str) {
        self.failing.lock().unwrap().insert(key.to_owned());
    }

    #[allow(dead_code)]
    pub fn restore_writes(&self) {
        self.failing.lock().unwrap().clear();
    }

    pub fn registered(&self, event_id: &str) -> u32 {
        EventCatalog::load(self.app.storage.clone())
            .by_id(event_id)
            .map(|e| e.registered)
            .unwrap_or_default()
    }

    /// Creates the account if needed and logs it in, replacing any session.
    pub fn login(&mut self, name: &str) -> anyhow::Result<User> {
        let email = format!("{name}@eventhub.localhost");
        if self.app.directory.find_by_email(&email).is_none() {
            self.app.directory.create(NewUser {
                first_name: "Test".to_owned(),
                last_name: "User".to_owned(),
                email: email.to_owned(),
                phone: String::new(),
                password: PASSWORD.to_owned(),
            })?;
        }

        let auth = self.app.auth();
        auth.logout();

        Ok(auth.login(LoginInput {
            email,
            password: PASSWORD.to_owned(),
        })?)
    }
}

pub fn setup(events: Vec<Event>) -> TestState {
    let store = FlakyStore::default();
    let failing = store.failing.clone();
    let storage = Storage::new(store);
    storage.set(keys::EVENTS, &events);

    TestState {
        app: App::new(storage, DEFAULT_SESSION_TIMEOUT),
        failing,
    }
}

pub fn event(id: &str, capacity: u32, registered: u32, days_from_now: i64) -> Event {
    Event {
        id: id.to_owned(),
        name: format!("Event {id}"),
        description: String::new(),
        category: "Música".to_owned(),
        date: OffsetDateTime::now_utc() + Duration::days(days_from_now),
        location: "Teatro Municipal".to_owned(),
        organizer: "EventHub".to_owned(),
        price: 0,
        capacity,
        registered,
        image: String::new(),
    }
}
