use eventhub_registration::{CustomRegistrationInput, RegistrationDetails, RegistrationLedger};
use eventhub_shared::Storage;

pub fn setup_ledger() -> (Storage, RegistrationLedger) {
    let storage = Storage::memory();
    let ledger = RegistrationLedger::new(storage.clone());

    (storage, ledger)
}

#[allow(dead_code)]
pub fn custom_input(user_id: &str, event_id: &str) -> CustomRegistrationInput {
    CustomRegistrationInput {
        user_id: user_id.to_owned(),
        event_id: event_id.to_owned(),
        event_name: format!("Event {event_id}"),
        details: RegistrationDetails {
            first_name: "Ana".to_owned(),
            last_name: "Lopez".to_owned(),
            email: "ana@eventhub.localhost".to_owned(),
            ..Default::default()
        },
        ..Default::default()
    }
}
