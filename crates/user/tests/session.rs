use eventhub_shared::{FileStore, Storage, keys, now_millis};
use eventhub_user::{AuthSession, DEFAULT_EXPIRY_WARNING, DEFAULT_SESSION_TIMEOUT, Session};
use temp_dir::TempDir;
use time::Duration;

mod helpers;

fn backdate(state: &helpers::TestState, user_id: &str, age: Duration) {
    state.storage.set(
        keys::SESSION,
        &Session {
            user_id: user_id.to_owned(),
            timestamp: now_millis() - age.whole_milliseconds() as i64,
        },
    );
}

#[test]
fn expired_session_is_cleared_on_construction() -> anyhow::Result<()> {
    let state = helpers::setup_test_state();
    let user = helpers::create_user(&state, "john")?;

    backdate(
        &state,
        &user.id,
        DEFAULT_SESSION_TIMEOUT + Duration::milliseconds(1),
    );

    let mut auth = state.auth();

    assert!(!auth.is_authenticated());
    assert!(state.sessions.current().is_none());

    Ok(())
}

#[test]
fn valid_session_is_restored() -> anyhow::Result<()> {
    let state = helpers::setup_test_state();
    let user = helpers::create_user(&state, "john")?;
    state.ledger.add_regular(&user.id, "event_1");

    backdate(&state, &user.id, Duration::hours(23));

    let mut auth = state.auth();

    assert_eq!(auth.current_user_id(), Some(user.id));
    assert_eq!(auth.registrations(), ["event_1"]);

    Ok(())
}

#[test]
fn session_for_missing_or_inactive_user_is_cleared() -> anyhow::Result<()> {
    let state = helpers::setup_test_state();

    backdate(&state, "user_gone", Duration::minutes(1));
    assert!(!state.auth().is_authenticated());
    assert!(state.sessions.current().is_none());

    let user = helpers::create_user(&state, "john")?;
    state.directory.set_active(&user.id, false)?;
    backdate(&state, &user.id, Duration::minutes(1));

    assert!(!state.auth().is_authenticated());
    assert!(state.sessions.current().is_none());

    Ok(())
}

#[test]
fn expiry_is_detected_lazily() -> anyhow::Result<()> {
    let state = helpers::setup_test_state();
    let (mut auth, user) = helpers::login(&state, "john")?;
    assert!(auth.is_authenticated());

    backdate(
        &state,
        &user.id,
        DEFAULT_SESSION_TIMEOUT + Duration::milliseconds(1),
    );

    assert!(!auth.is_authenticated());
    assert!(state.sessions.current().is_none());

    Ok(())
}

#[test]
fn logout_in_another_handle_is_observed() -> anyhow::Result<()> {
    let state = helpers::setup_test_state();
    let (mut first, _) = helpers::login(&state, "john")?;
    let mut second = state.auth();
    assert!(second.is_authenticated());

    second.logout();

    assert!(!first.is_authenticated());

    Ok(())
}

#[test]
fn extend_and_remaining() -> anyhow::Result<()> {
    let state = helpers::setup_test_state();
    let mut auth = state.auth();
    assert!(!auth.extend_session());
    assert_eq!(auth.session_remaining(), Duration::ZERO);
    assert!(!auth.is_session_expiring_soon(DEFAULT_EXPIRY_WARNING));

    let (mut auth, user) = helpers::login(&state, "john")?;
    backdate(
        &state,
        &user.id,
        DEFAULT_SESSION_TIMEOUT - Duration::minutes(2),
    );

    assert!(auth.session_remaining() <= Duration::minutes(2));
    assert!(auth.is_session_expiring_soon(DEFAULT_EXPIRY_WARNING));

    assert!(auth.extend_session());

    assert!(auth.session_remaining() > Duration::hours(23));
    assert!(!auth.is_session_expiring_soon(DEFAULT_EXPIRY_WARNING));

    Ok(())
}

#[test]
fn session_survives_restart_on_file_store() -> anyhow::Result<()> {
    let dir = TempDir::new()?;
    let path = dir.child("origin.json");

    let state = helpers::setup_with_storage(Storage::new(FileStore::new(&path)));
    let (_, user) = helpers::login(&state, "john")?;
    drop(state);

    let state = helpers::setup_with_storage(Storage::new(FileStore::new(&path)));
    let mut auth = AuthSession::new(
        state.directory.clone(),
        state.sessions.clone(),
        state.ledger.clone(),
        DEFAULT_SESSION_TIMEOUT,
    );

    assert_eq!(auth.current_user_id(), Some(user.id));

    Ok(())
}
