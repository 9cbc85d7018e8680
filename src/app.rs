use eventhub_event::EventCatalog;
use eventhub_registration::RegistrationLedger;
use eventhub_shared::{FileStore, Storage};
use eventhub_user::{AuthSession, PreferencesStore, SessionStore, UserDirectory};
use time::Duration;

use crate::{RegistrationCoordinator, config::Config};

/// Every component wired over one store.
#[derive(Debug)]
pub struct App {
    pub storage: Storage,
    pub directory: UserDirectory,
    pub preferences: PreferencesStore,
    pub coordinator: RegistrationCoordinator,
    pub expiry_warning: Duration,
}

impl App {
    pub fn new(storage: Storage, session_timeout: Duration) -> Self {
        let directory = UserDirectory::new(storage.clone());
        let ledger = RegistrationLedger::new(storage.clone());
        let auth = AuthSession::new(
            directory.clone(),
            SessionStore::new(storage.clone()),
            ledger.clone(),
            session_timeout,
        );
        let catalog = EventCatalog::load(storage.clone());

        Self {
            preferences: PreferencesStore::new(storage.clone()),
            coordinator: RegistrationCoordinator::new(catalog, ledger, auth),
            directory,
            storage,
            expiry_warning: eventhub_user::DEFAULT_EXPIRY_WARNING,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        tracing::debug!(path = %config.storage.path.display(), "opening store");

        let storage = Storage::new(FileStore::new(&config.storage.path));
        let mut app = Self::new(storage, config.session.timeout());
        app.expiry_warning = config.session.expiry_warning();

        app
    }

    pub fn auth(&mut self) -> &mut AuthSession {
        self.coordinator.auth()
    }
}
