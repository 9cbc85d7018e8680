use std::str::FromStr;

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};
use time::{Date, Duration, Month, OffsetDateTime, Time, UtcOffset};

use crate::Event;

/// Wildcard value for the category and location filters.
pub const ALL: &str = "all";

#[derive(
    Serialize, Deserialize, EnumString, Display, AsRefStr, Clone, Copy, Debug, PartialEq, Eq,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum DateFilter {
    Today,
    Week,
    Month,
}

impl DateFilter {
    /// Calendar buckets are computed on UTC days.
    pub fn matches(&self, date: OffsetDateTime, now: OffsetDateTime) -> bool {
        let now = now.to_offset(UtcOffset::UTC);
        let today = now.date().midnight().assume_utc();

        match self {
            DateFilter::Today => date.to_offset(UtcOffset::UTC).date() == now.date(),
            DateFilter::Week => date >= today && date <= today + Duration::days(7),
            DateFilter::Month => {
                let month_from_now = add_one_month(now.date())
                    .with_time(Time::MIDNIGHT)
                    .assume_utc();
                date >= today && date <= month_from_now
            }
        }
    }
}

/// Same day next month, clamped to the last day when it does not exist.
fn add_one_month(date: Date) -> Date {
    let (year, month) = match date.month() {
        Month::December => (date.year() + 1, Month::January),
        other => (date.year(), other.next()),
    };
    let day = date.day().min(month.length(year));

    Date::from_calendar_date(year, month, day).unwrap_or(date)
}

#[derive(Serialize, Clone, Debug, PartialEq, Eq)]
pub struct Filters {
    pub search: String,
    pub category: String,
    pub location: String,
    pub date: Option<DateFilter>,
}

impl Default for Filters {
    fn default() -> Self {
        Self {
            search: String::new(),
            category: ALL.to_owned(),
            location: ALL.to_owned(),
            date: None,
        }
    }
}

impl Filters {
    pub fn merge(&mut self, update: FilterUpdate) {
        if let Some(search) = update.search {
            self.search = search;
        }

        if let Some(category) = update.category {
            self.category = category;
        }

        if let Some(location) = update.location {
            self.location = location;
        }

        if let Some(date) = update.date {
            self.date = DateFilter::from_str(&date).ok();
        }
    }

    pub fn is_empty(&self) -> bool {
        self == &Filters::default()
    }

    pub fn matches(&self, event: &Event, now: OffsetDateTime) -> bool {
        self.matches_search(event)
            && (self.category == ALL || event.category == self.category)
            && (self.location == ALL || event.location == self.location)
            && self.date.is_none_or(|d| d.matches(event.date, now))
    }

    fn matches_search(&self, event: &Event) -> bool {
        if self.search.is_empty() {
            return true;
        }

        let needle = self.search.to_lowercase();

        [&event.name, &event.description, &event.location, &event.organizer]
            .iter()
            .any(|field| field.to_lowercase().contains(&needle))
    }
}

/// Partial filter change; `None` keeps the current value. An empty or
/// unknown `date` clears the date bucket.
#[derive(Deserialize, Clone, Debug, Default)]
pub struct FilterUpdate {
    pub search: Option<String>,
    pub category: Option<String>,
    pub location: Option<String>,
    pub date: Option<String>,
}
