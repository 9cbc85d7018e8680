use eventhub_event::{Event, EventCatalog};
use eventhub_shared::Storage;
use time::{Duration, OffsetDateTime};

pub struct EventSeed {
    pub id: &'static str,
    pub name: &'static str,
    pub category: &'static str,
    pub location: &'static str,
    pub organizer: &'static str,
    pub days_from_now: i64,
    pub capacity: u32,
    pub registered: u32,
}

impl EventSeed {
    pub fn build(&self) -> Event {
        Event {
            id: self.id.to_owned(),
            name: self.name.to_owned(),
            description: format!("{} en vivo", self.name),
            category: self.category.to_owned(),
            date: OffsetDateTime::now_utc() + Duration::days(self.days_from_now),
            location: self.location.to_owned(),
            organizer: self.organizer.to_owned(),
            price: 0,
            capacity: self.capacity,
            registered: self.registered,
            image: String::new(),
        }
    }
}

pub const SEED: [EventSeed; 5] = [
    EventSeed {
        id: "event_jazz",
        name: "Festival de Jazz",
        category: "Música",
        location: "Teatro Municipal",
        organizer: "Jazz Society",
        days_from_now: 35,
        capacity: 400,
        registered: 320,
    },
    EventSeed {
        id: "event_cocina",
        name: "Taller de Cocina Italiana",
        category: "Gastronomía",
        location: "Escuela Culinaria",
        organizer: "Chef Mario",
        days_from_now: 3,
        capacity: 30,
        registered: 30,
    },
    EventSeed {
        id: "event_clasica",
        name: "Concierto de Música Clásica",
        category: "Música",
        location: "Auditorio Nacional",
        organizer: "Orquesta Sinfónica",
        days_from_now: 28,
        capacity: 600,
        registered: 420,
    },
    EventSeed {
        id: "event_pasado",
        name: "Maratón de la Ciudad",
        category: "Deportes",
        location: "Centro Histórico",
        organizer: "Alcaldía Municipal",
        days_from_now: -2,
        capacity: 1000,
        registered: 756,
    },
    EventSeed {
        id: "event_yoga",
        name: "Taller de Yoga",
        category: "Salud",
        location: "Teatro Municipal",
        organizer: "Yoga Center",
        days_from_now: 10,
        capacity: 40,
        registered: 0,
    },
];

pub fn seed_events() -> Vec<Event> {
    SEED.iter().map(EventSeed::build).collect()
}

pub fn setup_catalog() -> (Storage, EventCatalog) {
    let storage = Storage::memory();
    let catalog = EventCatalog::load_or_seed(storage.clone(), seed_events);

    (storage, catalog)
}

#[allow(dead_code)]
pub fn ids<'a>(events: impl IntoIterator<Item = &'a Event>) -> Vec<&'a str> {
    events.into_iter().map(|e| e.id.as_str()).collect()
}
