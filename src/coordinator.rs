use std::collections::BTreeSet;

use eventhub_event::{CountChange, Event, EventCatalog};
use eventhub_registration::{CustomRegistration, CustomRegistrationInput, RegistrationLedger};
use eventhub_user::AuthSession;
use serde::Serialize;
use time::OffsetDateTime;

#[derive(Debug, thiserror::Error)]
pub enum RegistrationError {
    #[error("You must be logged in to manage registrations")]
    NotAuthenticated,

    #[error("Event not found")]
    EventNotFound,

    #[error("This event is full")]
    EventFull,

    #[error("This event has already taken place")]
    EventPast,

    #[error("You are already registered for this event")]
    AlreadyRegistered,

    #[error("You are not registered for this event")]
    NotRegistered,

    #[error("The registration could not be saved")]
    Storage,

    #[error(transparent)]
    Rejected(#[from] eventhub_shared::Error),
}

/// An event whose stored count disagrees with the ledger.
#[derive(Serialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CountDrift {
    pub event_id: String,
    pub recorded: u32,
    pub actual: usize,
}

/// Keeps the ledger and each event's `registered` count in step.
///
/// Every check reloads the catalog and re-reads the ledger, so decisions are
/// made against what is stored now rather than what this handle last saw.
/// The ledger is written first; when the count update that follows fails,
/// the ledger write is undone and [`RegistrationError::Storage`] returned.
#[derive(Debug)]
pub struct RegistrationCoordinator {
    catalog: EventCatalog,
    ledger: RegistrationLedger,
    auth: AuthSession,
}

impl RegistrationCoordinator {
    pub fn new(catalog: EventCatalog, ledger: RegistrationLedger, auth: AuthSession) -> Self {
        Self {
            catalog,
            ledger,
            auth,
        }
    }

    pub fn catalog(&self) -> &EventCatalog {
        &self.catalog
    }

    pub fn catalog_mut(&mut self) -> &mut EventCatalog {
        &mut self.catalog
    }

    pub fn ledger(&self) -> &RegistrationLedger {
        &self.ledger
    }

    pub fn auth(&mut self) -> &mut AuthSession {
        &mut self.auth
    }

    fn user_id(&mut self) -> Result<String, RegistrationError> {
        self.auth
            .current_user_id()
            .ok_or(RegistrationError::NotAuthenticated)
    }

    fn fresh_event(&mut self, event_id: &str) -> Result<Event, RegistrationError> {
        self.catalog.reload();

        self.catalog
            .by_id(event_id)
            .cloned()
            .ok_or(RegistrationError::EventNotFound)
    }

    fn ensure_open(event: &Event) -> Result<(), RegistrationError> {
        if event.is_past_at(OffsetDateTime::now_utc()) {
            return Err(RegistrationError::EventPast);
        }

        if event.is_full() {
            return Err(RegistrationError::EventFull);
        }

        Ok(())
    }

    pub fn register(&mut self, event_id: &str) -> Result<(), RegistrationError> {
        let user_id = self.user_id()?;
        let event = self.fresh_event(event_id)?;

        if self.ledger.is_registered(&user_id, event_id) {
            return Err(RegistrationError::AlreadyRegistered);
        }

        Self::ensure_open(&event)?;

        if !self.ledger.add_regular(&user_id, event_id) {
            return Err(RegistrationError::Storage);
        }

        if !self
            .catalog
            .update_registration_count(event_id, CountChange::Increment)
        {
            tracing::error!(user_id = %user_id, event_id, "count update failed, undoing registration");
            self.ledger.remove_regular(&user_id, event_id);
            return Err(RegistrationError::Storage);
        }

        tracing::info!(user_id = %user_id, event_id, "registered for event");

        Ok(())
    }

    pub fn unregister(&mut self, event_id: &str) -> Result<(), RegistrationError> {
        let user_id = self.user_id()?;
        self.fresh_event(event_id)?;

        if !self.ledger.regular_for(&user_id).iter().any(|id| id == event_id) {
            return Err(RegistrationError::NotRegistered);
        }

        if !self.ledger.remove_regular(&user_id, event_id) {
            return Err(RegistrationError::Storage);
        }

        if !self
            .catalog
            .update_registration_count(event_id, CountChange::Decrement)
        {
            tracing::error!(user_id = %user_id, event_id, "count update failed, restoring registration");
            self.ledger.add_regular(&user_id, event_id);
            return Err(RegistrationError::Storage);
        }

        tracing::info!(user_id = %user_id, event_id, "unregistered from event");

        Ok(())
    }

    /// Either kind of registration counts.
    pub fn is_registered(&mut self, event_id: &str) -> bool {
        self.auth
            .current_user_id()
            .is_some_and(|user_id| self.ledger.is_registered(&user_id, event_id))
    }

    /// Detailed registration for the current user. The user, event name and
    /// payment flag are taken from the session and the catalog, not the input.
    pub fn register_custom(
        &mut self,
        mut input: CustomRegistrationInput,
    ) -> Result<CustomRegistration, RegistrationError> {
        let user_id = self.user_id()?;
        let event = self.fresh_event(&input.event_id)?;

        if self.ledger.is_registered(&user_id, &event.id) {
            return Err(RegistrationError::AlreadyRegistered);
        }

        Self::ensure_open(&event)?;

        input.user_id = user_id;
        input.event_name = event.name.to_owned();
        input.payment_required = !event.is_free();

        let registration = self.ledger.add_custom(input)?;

        if !self
            .catalog
            .update_registration_count(&event.id, CountChange::Increment)
        {
            tracing::error!(id = %registration.id, "count update failed, undoing registration");
            self.ledger.remove_custom(&registration.id);
            return Err(RegistrationError::Storage);
        }

        Ok(registration)
    }

    /// Only the owner can cancel.
    pub fn cancel_custom(&mut self, registration_id: &str) -> Result<(), RegistrationError> {
        let user_id = self.user_id()?;

        let Some(registration) = self
            .ledger
            .custom_by_id(registration_id)
            .filter(|r| r.user_id == user_id)
        else {
            return Err(RegistrationError::NotRegistered);
        };

        if !self.ledger.remove_custom(registration_id) {
            return Err(RegistrationError::Storage);
        }

        self.catalog.reload();
        if self.catalog.by_id(&registration.event_id).is_some()
            && !self
                .catalog
                .update_registration_count(&registration.event_id, CountChange::Decrement)
        {
            tracing::error!(id = registration_id, "count update failed, restoring registration");
            self.ledger.restore_custom(registration);
            return Err(RegistrationError::Storage);
        }

        tracing::info!(user_id = %user_id, id = registration_id, "custom registration cancelled");

        Ok(())
    }

    /// Events the current user holds any registration for; ids the catalog no
    /// longer knows are skipped.
    pub fn my_events(&mut self) -> Vec<Event> {
        let Some(user_id) = self.auth.current_user_id() else {
            return Vec::new();
        };

        self.catalog.reload();

        let mut seen = BTreeSet::new();
        self.ledger
            .regular_for(&user_id)
            .into_iter()
            .chain(
                self.ledger
                    .custom_for(&user_id)
                    .into_iter()
                    .map(|r| r.event_id),
            )
            .filter(|id| seen.insert(id.to_owned()))
            .filter_map(|id| self.catalog.by_id(&id).cloned())
            .collect()
    }

    /// Events whose stored count differs from the ledger. Nothing is rewritten.
    pub fn audit(&mut self) -> Vec<CountDrift> {
        self.catalog.reload();

        self.catalog
            .all()
            .iter()
            .filter_map(|event| {
                let actual = self.ledger.count_for(&event.id);
                (actual != event.registered as usize).then(|| CountDrift {
                    event_id: event.id.to_owned(),
                    recorded: event.registered,
                    actual,
                })
            })
            .collect()
    }

    /// Drops ledger entries that point at events the catalog no longer has.
    pub fn reconcile(&mut self) -> usize {
        self.catalog.reload();

        self.ledger
            .reconcile(self.catalog.all().iter().map(|e| e.id.as_str()))
    }
}
