//! Record keys in the origin-scoped store. Each component owns exactly one
//! (the ledger owns two) and never writes another component's key.

pub const USERS: &str = "users";
pub const SESSION: &str = "session";
pub const REGISTRATIONS: &str = "eventhub_registrations";
pub const CUSTOM_REGISTRATIONS: &str = "eventhub_custom_registrations";
pub const EVENTS: &str = "eventhub_events";
pub const PREFERENCES: &str = "preferences";
