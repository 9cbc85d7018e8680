use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};
use time::OffsetDateTime;

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub category: String,
    #[serde(with = "time::serde::rfc3339")]
    pub date: OffsetDateTime,
    pub location: String,
    #[serde(default)]
    pub organizer: String,
    /// Zero means free.
    #[serde(default)]
    pub price: u64,
    pub capacity: u32,
    /// Denormalized count, kept in step with the registration ledger by the
    /// registration coordinator.
    #[serde(default)]
    pub registered: u32,
    #[serde(default)]
    pub image: String,
}

impl Event {
    pub fn is_free(&self) -> bool {
        self.price == 0
    }

    pub fn is_full(&self) -> bool {
        self.registered >= self.capacity
    }

    pub fn is_past_at(&self, now: OffsetDateTime) -> bool {
        self.date < now
    }

    pub fn spots_left(&self) -> u32 {
        self.capacity.saturating_sub(self.registered)
    }

    pub fn status_at(&self, now: OffsetDateTime) -> EventStatus {
        if self.is_past_at(now) {
            EventStatus::Past
        } else if self.is_full() {
            EventStatus::Full
        } else {
            EventStatus::Available
        }
    }
}

#[derive(Serialize, EnumString, Display, AsRefStr, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum EventStatus {
    Past,
    Full,
    Available,
}
