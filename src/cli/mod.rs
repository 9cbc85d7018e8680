pub mod event;
pub mod registration;
pub mod user;

use eventhub_event::Event;
use time::{OffsetDateTime, format_description::well_known::Rfc3339};

pub(crate) fn print_event(event: &Event) {
    let date = event
        .date
        .format(&Rfc3339)
        .unwrap_or_else(|_| event.date.to_string());
    let status = event.status_at(OffsetDateTime::now_utc());

    println!(
        "{}  {}  [{}] {} @ {}  {}/{}  {}",
        event.id,
        date,
        event.category,
        event.name,
        event.location,
        event.registered,
        event.capacity,
        status
    );
}
