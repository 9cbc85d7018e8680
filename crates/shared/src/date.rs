use time::OffsetDateTime;
use ulid::Ulid;

pub const MILLIS_PER_DAY: i64 = 24 * 60 * 60 * 1000;

/// Current wall-clock time as unix milliseconds.
pub fn now_millis() -> i64 {
    to_millis(OffsetDateTime::now_utc())
}

pub fn to_millis(value: OffsetDateTime) -> i64 {
    (value.unix_timestamp_nanos() / 1_000_000) as i64
}

/// Opaque stable identifier, e.g. `user_01j9...`.
pub fn generate_id(prefix: &str) -> String {
    let id = Ulid::new().to_string().to_lowercase();
    if prefix.is_empty() {
        id
    } else {
        format!("{prefix}_{id}")
    }
}
