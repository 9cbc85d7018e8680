use eventhub::CountDrift;
use eventhub_shared::keys;

mod helpers;

#[test]
fn audit_reports_drift_without_fixing_it() -> anyhow::Result<()> {
    let mut state = helpers::setup(vec![
        helpers::event("event_1", 10, 0, 7),
        helpers::event("event_2", 10, 5, 7),
    ]);
    state.login("ana")?;
    state.coordinator().register("event_1")?;

    let drift = state.coordinator().audit();

    assert_eq!(
        drift,
        vec![CountDrift {
            event_id: "event_2".to_owned(),
            recorded: 5,
            actual: 0,
        }]
    );
    assert_eq!(state.registered("event_2"), 5);

    Ok(())
}

#[test]
fn reconcile_drops_registrations_for_removed_events() -> anyhow::Result<()> {
    let mut state = helpers::setup(vec![
        helpers::event("event_1", 10, 0, 7),
        helpers::event("event_2", 10, 0, 7),
    ]);
    let user = state.login("ana")?;
    state.coordinator().register("event_1")?;
    state.coordinator().register("event_2")?;

    let events = state
        .app
        .storage
        .get(keys::EVENTS, Vec::<eventhub_event::Event>::new())
        .into_iter()
        .filter(|e| e.id != "event_2")
        .collect::<Vec<_>>();
    state.app.storage.set(keys::EVENTS, &events);

    assert_eq!(state.coordinator().reconcile(), 1);
    assert_eq!(
        state.coordinator().ledger().regular_for(&user.id),
        ["event_1"]
    );
    assert_eq!(state.coordinator().reconcile(), 0);
    assert!(state.coordinator().audit().is_empty());

    Ok(())
}

#[test]
fn app_over_file_store_persists_across_restarts() -> anyhow::Result<()> {
    use eventhub::config::{Config, ObservabilityConfig, SessionConfig, StorageConfig};

    let dir = temp_dir::TempDir::new()?;
    let config = Config {
        storage: StorageConfig {
            path: dir.child("origin.json"),
        },
        session: SessionConfig {
            timeout_secs: 3600,
            expiry_warning_secs: 300,
        },
        observability: ObservabilityConfig::default(),
    };

    let mut app = eventhub::App::from_config(&config);
    app.coordinator
        .catalog_mut()
        .add(helpers::event("event_1", 10, 0, 7));
    app.directory.create(eventhub_user::NewUser {
        first_name: "Ana".to_owned(),
        last_name: "Lopez".to_owned(),
        email: "ana@x.com".to_owned(),
        phone: String::new(),
        password: "Abcdef1".to_owned(),
    })?;
    app.auth().login(eventhub_user::LoginInput {
        email: "ana@x.com".to_owned(),
        password: "Abcdef1".to_owned(),
    })?;
    app.coordinator.register("event_1")?;
    drop(app);

    let mut app = eventhub::App::from_config(&config);

    assert!(app.auth().is_authenticated());
    assert!(app.coordinator.is_registered("event_1"));
    assert_eq!(app.coordinator.catalog().by_id("event_1").unwrap().registered, 1);
    assert_eq!(app.expiry_warning, time::Duration::minutes(5));

    Ok(())
}
