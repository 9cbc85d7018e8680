use std::collections::{BTreeMap, HashSet};

use eventhub_shared::{Storage, generate_id, keys};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use time::{OffsetDateTime, format_description::well_known::Rfc3339};
use validator::Validate;

use crate::{CustomRegistration, CustomRegistrationInput, RegistrationStatus};

const LEDGER_VERSION: &str = "1.0.0";

/// userId -> event ids in insertion order.
pub type RegularRegistrations = BTreeMap<String, Vec<String>>;

/// registrationId -> record.
pub type CustomRegistrations = BTreeMap<String, CustomRegistration>;

#[derive(Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct Metadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    created: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    last_updated: Option<String>,
    #[serde(default)]
    version: String,
}

#[derive(Serialize, Deserialize, Default)]
struct Envelope<T> {
    #[serde(default)]
    registrations: T,
    #[serde(default)]
    metadata: Metadata,
}

fn timestamp() -> Option<String> {
    OffsetDateTime::now_utc().format(&Rfc3339).ok()
}

/// Durable user <-> event edges, both the bare kind and the detailed kind.
///
/// Every operation goes back to storage; nothing is cached, so two ledgers
/// over the same storage always agree.
#[derive(Debug, Clone)]
pub struct RegistrationLedger {
    storage: Storage,
}

impl RegistrationLedger {
    pub fn new(storage: Storage) -> Self {
        let ledger = Self { storage };
        ledger.ensure_storage(keys::REGISTRATIONS);
        ledger.ensure_storage(keys::CUSTOM_REGISTRATIONS);

        ledger
    }

    fn ensure_storage(&self, key: &str) {
        if self.storage.exists(key) {
            return;
        }

        tracing::debug!(key, "creating empty registration record");

        let envelope = Envelope::<BTreeMap<String, ()>> {
            registrations: BTreeMap::new(),
            metadata: Metadata {
                created: timestamp(),
                last_updated: None,
                version: LEDGER_VERSION.to_owned(),
            },
        };
        self.storage.set(key, &envelope);
    }

    fn load<T: DeserializeOwned + Default>(&self, key: &str) -> Envelope<T> {
        self.storage.find(key).unwrap_or_default()
    }

    /// Writes the envelope, then reads the raw bytes back and compares.
    fn save<T: Serialize>(&self, key: &str, envelope: &mut Envelope<T>) -> bool {
        envelope.metadata.last_updated = timestamp();
        envelope.metadata.version = LEDGER_VERSION.to_owned();

        let Ok(serialized) = serde_json::to_string(&*envelope) else {
            tracing::error!(key, "failed to encode registrations");
            return false;
        };

        if !self.storage.set_raw(key, &serialized) {
            return false;
        }

        let verified = self.storage.get_raw(key).as_deref() == Some(serialized.as_str());
        if !verified {
            tracing::error!(key, "registration write did not verify");
        }

        verified
    }

    pub fn all_regular(&self) -> RegularRegistrations {
        self.load(keys::REGISTRATIONS).registrations
    }

    pub fn regular_for(&self, user_id: &str) -> Vec<String> {
        self.all_regular().remove(user_id).unwrap_or_default()
    }

    /// Returns false without writing when the edge already exists.
    pub fn add_regular(&self, user_id: &str, event_id: &str) -> bool {
        let mut envelope = self.load::<RegularRegistrations>(keys::REGISTRATIONS);
        let events = envelope
            .registrations
            .entry(user_id.to_owned())
            .or_default();

        if events.iter().any(|id| id == event_id) {
            tracing::debug!(user_id, event_id, "already registered");
            return false;
        }

        events.push(event_id.to_owned());

        if !self.save(keys::REGISTRATIONS, &mut envelope) {
            return false;
        }

        let added = self.regular_for(user_id).iter().any(|id| id == event_id);
        if added {
            tracing::info!(user_id, event_id, "registration added");
        } else {
            tracing::error!(user_id, event_id, "registration missing after write");
        }

        added
    }

    pub fn remove_regular(&self, user_id: &str, event_id: &str) -> bool {
        let mut envelope = self.load::<RegularRegistrations>(keys::REGISTRATIONS);
        let Some(events) = envelope.registrations.get_mut(user_id) else {
            return false;
        };

        let Some(index) = events.iter().position(|id| id == event_id) else {
            return false;
        };

        events.remove(index);

        if !self.save(keys::REGISTRATIONS, &mut envelope) {
            return false;
        }

        let removed = !self.regular_for(user_id).iter().any(|id| id == event_id);
        if removed {
            tracing::info!(user_id, event_id, "registration removed");
        } else {
            tracing::error!(user_id, event_id, "registration still present after write");
        }

        removed
    }

    pub fn all_custom(&self) -> CustomRegistrations {
        self.load(keys::CUSTOM_REGISTRATIONS).registrations
    }

    /// Oldest first.
    pub fn custom_for(&self, user_id: &str) -> Vec<CustomRegistration> {
        let mut registrations = self
            .all_custom()
            .into_values()
            .filter(|r| r.user_id == user_id)
            .collect::<Vec<_>>();
        registrations.sort_by_key(|r| r.created_at);

        registrations
    }

    pub fn custom_by_id(&self, id: &str) -> Option<CustomRegistration> {
        self.all_custom().remove(id)
    }

    pub fn custom_for_event(&self, user_id: &str, event_id: &str) -> Option<CustomRegistration> {
        self.all_custom()
            .into_values()
            .find(|r| r.user_id == user_id && r.event_id == event_id)
    }

    pub fn add_custom(
        &self,
        input: CustomRegistrationInput,
    ) -> eventhub_shared::Result<CustomRegistration> {
        input.validate()?;

        let now = OffsetDateTime::now_utc();
        let registration = CustomRegistration {
            id: generate_id("reg"),
            user_id: input.user_id,
            event_id: input.event_id,
            event_name: input.event_name,
            details: input.details,
            payment_required: input.payment_required,
            notifications: input.notifications,
            status: input.status.unwrap_or_default(),
            created_at: now,
            updated_at: now,
        };

        let mut envelope = self.load::<CustomRegistrations>(keys::CUSTOM_REGISTRATIONS);
        envelope
            .registrations
            .insert(registration.id.to_owned(), registration.clone());

        if !self.save(keys::CUSTOM_REGISTRATIONS, &mut envelope) {
            eventhub_shared::bail!("Could not save the registration");
        }

        tracing::info!(
            id = %registration.id,
            user_id = %registration.user_id,
            event_id = %registration.event_id,
            "custom registration added"
        );

        Ok(registration)
    }

    pub fn remove_custom(&self, id: &str) -> bool {
        let mut envelope = self.load::<CustomRegistrations>(keys::CUSTOM_REGISTRATIONS);
        if envelope.registrations.remove(id).is_none() {
            return false;
        }

        let removed = self.save(keys::CUSTOM_REGISTRATIONS, &mut envelope)
            && self.custom_by_id(id).is_none();
        if removed {
            tracing::info!(id, "custom registration removed");
        }

        removed
    }

    /// Puts back a record exactly as it was, e.g. to undo a removal.
    pub fn restore_custom(&self, registration: CustomRegistration) -> bool {
        let mut envelope = self.load::<CustomRegistrations>(keys::CUSTOM_REGISTRATIONS);
        let id = registration.id.to_owned();
        envelope.registrations.insert(id.to_owned(), registration);

        let restored =
            self.save(keys::CUSTOM_REGISTRATIONS, &mut envelope) && self.custom_by_id(&id).is_some();
        if restored {
            tracing::info!(id = %id, "custom registration restored");
        }

        restored
    }

    pub fn set_custom_status(
        &self,
        id: &str,
        status: RegistrationStatus,
    ) -> eventhub_shared::Result<CustomRegistration> {
        let mut envelope = self.load::<CustomRegistrations>(keys::CUSTOM_REGISTRATIONS);
        let Some(registration) = envelope.registrations.get_mut(id) else {
            eventhub_shared::not_found!("Registration");
        };

        registration.status = status;
        registration.updated_at = OffsetDateTime::now_utc();
        let updated = registration.clone();

        if !self.save(keys::CUSTOM_REGISTRATIONS, &mut envelope) {
            eventhub_shared::bail!("Could not save the registration");
        }

        tracing::info!(id, status = %status, "custom registration status changed");

        Ok(updated)
    }

    /// True when either a regular edge or a custom record (any status) exists.
    pub fn is_registered(&self, user_id: &str, event_id: &str) -> bool {
        self.regular_for(user_id).iter().any(|id| id == event_id)
            || self.custom_for_event(user_id, event_id).is_some()
    }

    pub fn count_for(&self, event_id: &str) -> usize {
        let regular = self
            .all_regular()
            .values()
            .filter(|events| events.iter().any(|id| id == event_id))
            .count();
        let custom = self
            .all_custom()
            .values()
            .filter(|r| r.event_id == event_id)
            .count();

        regular + custom
    }

    /// Drops every regular and custom entry that references an event outside
    /// `valid_event_ids`. Returns how many entries were removed.
    pub fn reconcile<'a>(&self, valid_event_ids: impl IntoIterator<Item = &'a str>) -> usize {
        let valid = valid_event_ids.into_iter().collect::<HashSet<_>>();

        let mut regular = self.load::<RegularRegistrations>(keys::REGISTRATIONS);
        let mut dropped_regular = 0;
        for events in regular.registrations.values_mut() {
            let before = events.len();
            events.retain(|id| valid.contains(id.as_str()));
            dropped_regular += before - events.len();
        }

        let mut custom = self.load::<CustomRegistrations>(keys::CUSTOM_REGISTRATIONS);
        let before = custom.registrations.len();
        custom
            .registrations
            .retain(|_, r| valid.contains(r.event_id.as_str()));
        let dropped_custom = before - custom.registrations.len();

        if dropped_regular > 0 && !self.save(keys::REGISTRATIONS, &mut regular) {
            return 0;
        }

        if dropped_custom > 0 && !self.save(keys::CUSTOM_REGISTRATIONS, &mut custom) {
            return dropped_regular;
        }

        if dropped_regular + dropped_custom > 0 {
            tracing::warn!(
                regular = dropped_regular,
                custom = dropped_custom,
                "dropped registrations for unknown events"
            );
        }

        dropped_regular + dropped_custom
    }

    pub fn clear(&self) -> bool {
        let removed =
            self.storage.remove(keys::REGISTRATIONS) && self.storage.remove(keys::CUSTOM_REGISTRATIONS);
        self.ensure_storage(keys::REGISTRATIONS);
        self.ensure_storage(keys::CUSTOM_REGISTRATIONS);

        removed
    }
}
