use std::{borrow::Borrow, collections::BTreeSet};

use eventhub_shared::{Storage, keys};
use serde::Serialize;
use strum::{Display, EnumString};
use time::OffsetDateTime;

use crate::{Event, EventStatus, FilterUpdate, Filters};

#[derive(Serialize, Clone, Debug, PartialEq, Eq)]
pub struct EventStats {
    pub total: usize,
    pub available: usize,
    pub registrations: u64,
    pub categories: usize,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CountChange {
    Increment,
    Decrement,
}

#[derive(EnumString, Display, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[strum(serialize_all = "lowercase")]
pub enum SortBy {
    #[default]
    Date,
    Name,
    Price,
    Capacity,
    Registered,
}

#[derive(EnumString, Display, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[strum(serialize_all = "lowercase")]
pub enum Order {
    #[default]
    Asc,
    Desc,
}

/// Sorts in place; ties keep their relative order.
pub fn sort_events<E: Borrow<Event>>(events: &mut [E], by: SortBy, order: Order) {
    events.sort_by(|a, b| {
        let (a, b) = (a.borrow(), b.borrow());
        let ordering = match by {
            SortBy::Date => a.date.cmp(&b.date),
            SortBy::Name => a.name.to_lowercase().cmp(&b.name.to_lowercase()),
            SortBy::Price => a.price.cmp(&b.price),
            SortBy::Capacity => a.capacity.cmp(&b.capacity),
            SortBy::Registered => a.registered.cmp(&b.registered),
        };

        match order {
            Order::Asc => ordering,
            Order::Desc => ordering.reverse(),
        }
    });
}

/// The list of events plus the current filter selection.
///
/// Reads are served from memory; [`EventCatalog::reload`] picks up writes made
/// by another handle on the same storage.
#[derive(Debug)]
pub struct EventCatalog {
    storage: Storage,
    events: Vec<Event>,
    filters: Filters,
}

impl EventCatalog {
    /// Loads the persisted catalog, or an empty one when none exists.
    pub fn load(storage: Storage) -> Self {
        let events = storage.get(keys::EVENTS, Vec::new());
        tracing::debug!(count = events.len(), "event catalog loaded");

        Self {
            storage,
            events,
            filters: Filters::default(),
        }
    }

    /// Loads the persisted catalog; when none exists the seed is persisted
    /// and used instead.
    pub fn load_or_seed(storage: Storage, seed: impl FnOnce() -> Vec<Event>) -> Self {
        if storage.exists(keys::EVENTS) {
            return Self::load(storage);
        }

        let events = seed();
        if !storage.set(keys::EVENTS, &events) {
            tracing::warn!("seeded event catalog could not be persisted");
        }
        tracing::info!(count = events.len(), "event catalog seeded");

        Self {
            storage,
            events,
            filters: Filters::default(),
        }
    }

    pub fn reload(&mut self) {
        self.events = self.storage.get(keys::EVENTS, Vec::new());
    }

    fn save(&self) -> bool {
        self.storage.set(keys::EVENTS, &self.events)
    }

    pub fn all(&self) -> &[Event] {
        &self.events
    }

    pub fn by_id(&self, id: &str) -> Option<&Event> {
        self.events.iter().find(|e| e.id == id)
    }

    pub fn filters(&self) -> &Filters {
        &self.filters
    }

    /// Events matching the current filters.
    pub fn filtered(&self) -> Vec<&Event> {
        let now = OffsetDateTime::now_utc();

        self.events
            .iter()
            .filter(|e| self.filters.matches(e, now))
            .collect()
    }

    /// Merges `update` into the current filters and returns the matches.
    pub fn apply_filters(&mut self, update: FilterUpdate) -> Vec<&Event> {
        self.filters.merge(update);

        self.filtered()
    }

    pub fn clear_filters(&mut self) -> &[Event] {
        self.filters = Filters::default();

        &self.events
    }

    /// Free-text search over name, description, category, location and
    /// organizer; independent of the current filters.
    pub fn search(&self, query: &str) -> Vec<&Event> {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return self.events.iter().collect();
        }

        self.events
            .iter()
            .filter(|e| {
                [&e.name, &e.description, &e.category, &e.location, &e.organizer]
                    .iter()
                    .any(|field| field.to_lowercase().contains(&needle))
            })
            .collect()
    }

    pub fn categories(&self) -> Vec<String> {
        self.events
            .iter()
            .map(|e| e.category.to_owned())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    pub fn locations(&self) -> Vec<String> {
        self.events
            .iter()
            .map(|e| e.location.to_owned())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    pub fn stats(&self) -> EventStats {
        let now = OffsetDateTime::now_utc();

        EventStats {
            total: self.events.len(),
            available: self
                .events
                .iter()
                .filter(|e| !e.is_full() && e.date > now)
                .count(),
            registrations: self.events.iter().map(|e| u64::from(e.registered)).sum(),
            categories: self.categories().len(),
        }
    }

    /// Future events, soonest first.
    pub fn upcoming(&self, limit: usize) -> Vec<&Event> {
        let now = OffsetDateTime::now_utc();
        let mut events = self
            .events
            .iter()
            .filter(|e| e.date > now)
            .collect::<Vec<_>>();
        sort_events(&mut events, SortBy::Date, Order::Asc);
        events.truncate(limit);

        events
    }

    pub fn is_full(&self, id: &str) -> bool {
        self.by_id(id).is_some_and(Event::is_full)
    }

    pub fn is_past(&self, id: &str) -> bool {
        let now = OffsetDateTime::now_utc();

        self.by_id(id).is_some_and(|e| e.is_past_at(now))
    }

    pub fn status(&self, id: &str) -> Option<EventStatus> {
        let now = OffsetDateTime::now_utc();

        self.by_id(id).map(|e| e.status_at(now))
    }

    /// Moves the denormalized count by one, clamped to `[0, capacity]`.
    /// Returns false for an unknown id or when the write fails; a failed
    /// write leaves the in-memory count untouched.
    pub fn update_registration_count(&mut self, id: &str, change: CountChange) -> bool {
        let Some(index) = self.events.iter().position(|e| e.id == id) else {
            tracing::debug!(id, "count update for unknown event");
            return false;
        };

        let event = &mut self.events[index];
        let previous = event.registered;
        event.registered = match change {
            CountChange::Increment => previous.saturating_add(1).min(event.capacity),
            CountChange::Decrement => previous.saturating_sub(1).min(event.capacity),
        };
        let registered = event.registered;

        if !self.save() {
            self.events[index].registered = previous;
            return false;
        }

        tracing::debug!(id, previous, registered, "event registration count updated");

        true
    }

    /// Appends a new event; rejects a duplicate id, a zero capacity and a
    /// count above capacity.
    pub fn add(&mut self, event: Event) -> bool {
        if self.by_id(&event.id).is_some() {
            return false;
        }

        if event.capacity == 0 || event.registered > event.capacity {
            tracing::warn!(
                id = %event.id,
                capacity = event.capacity,
                registered = event.registered,
                "event rejected, count outside capacity"
            );
            return false;
        }

        self.events.push(event);
        if !self.save() {
            self.events.pop();
            return false;
        }

        true
    }
}
