use eventhub_shared::{Storage, keys, now_millis};
use serde::{Deserialize, Serialize};
use time::Duration;

/// The single active session of a store.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub user_id: String,
    /// Last-touched time, unix milliseconds.
    pub timestamp: i64,
}

impl Session {
    pub fn age_at(&self, now: i64) -> Duration {
        Duration::milliseconds(now.saturating_sub(self.timestamp))
    }
}

#[derive(Debug, Clone)]
pub struct SessionStore {
    storage: Storage,
}

impl SessionStore {
    pub fn new(storage: Storage) -> Self {
        Self { storage }
    }

    /// Missing and malformed records both read as no session.
    pub fn current(&self) -> Option<Session> {
        self.storage.find(keys::SESSION)
    }

    pub fn start(&self, user_id: &str) -> bool {
        let session = Session {
            user_id: user_id.to_owned(),
            timestamp: now_millis(),
        };

        let started = self.storage.set(keys::SESSION, &session);
        if started {
            tracing::debug!(user_id, "session started");
        }

        started
    }

    pub fn is_valid(&self, timeout: Duration) -> bool {
        self.current()
            .is_some_and(|session| session.age_at(now_millis()) < timeout)
    }

    /// Touches the current session; false when there is none.
    pub fn extend(&self) -> bool {
        let Some(mut session) = self.current() else {
            return false;
        };

        session.timestamp = now_millis();

        self.storage.set(keys::SESSION, &session)
    }

    /// Time left before the current session expires; zero when there is none.
    pub fn remaining(&self, timeout: Duration) -> Duration {
        let Some(session) = self.current() else {
            return Duration::ZERO;
        };

        (timeout - session.age_at(now_millis())).max(Duration::ZERO)
    }

    pub fn clear(&self) -> bool {
        self.storage.remove(keys::SESSION)
    }
}
