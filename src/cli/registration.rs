use clap::Subcommand;
use eventhub::App;
use eventhub_registration::{CustomRegistrationInput, RegistrationDetails};

use super::print_event;

#[derive(Subcommand)]
pub enum CustomCommand {
    /// Register with contact details
    Add {
        event_id: String,
        #[arg(long)]
        first_name: String,
        #[arg(long)]
        last_name: String,
        #[arg(long)]
        email: String,
        #[arg(long, default_value = "")]
        phone: String,
        #[arg(long, default_value = "")]
        emergency_contact: String,
        #[arg(long, default_value = "")]
        emergency_phone: String,
        #[arg(long, default_value = "")]
        notes: String,
        #[arg(long)]
        notifications: bool,
    },
    /// Cancel a detailed registration by id
    Cancel { registration_id: String },
    List,
}

pub fn register(app: &mut App, event_id: &str) -> anyhow::Result<()> {
    app.coordinator.register(event_id)?;
    println!("registered for {event_id}");

    Ok(())
}

pub fn unregister(app: &mut App, event_id: &str) -> anyhow::Result<()> {
    app.coordinator.unregister(event_id)?;
    println!("unregistered from {event_id}");

    Ok(())
}

pub fn custom(app: &mut App, command: CustomCommand) -> anyhow::Result<()> {
    match command {
        CustomCommand::Add {
            event_id,
            first_name,
            last_name,
            email,
            phone,
            emergency_contact,
            emergency_phone,
            notes,
            notifications,
        } => {
            let registration = app.coordinator.register_custom(CustomRegistrationInput {
                event_id,
                details: RegistrationDetails {
                    first_name,
                    last_name,
                    email,
                    phone,
                    emergency_contact,
                    emergency_phone,
                    notes,
                    ..Default::default()
                },
                notifications,
                ..Default::default()
            })?;

            println!(
                "registration {} for {} ({}{})",
                registration.id,
                registration.event_name,
                registration.status,
                if registration.payment_required {
                    ", payment required"
                } else {
                    ""
                }
            );
        }
        CustomCommand::Cancel { registration_id } => {
            app.coordinator.cancel_custom(&registration_id)?;
            println!("cancelled {registration_id}");
        }
        CustomCommand::List => {
            let Some(user_id) = app.auth().current_user_id() else {
                anyhow::bail!("not logged in");
            };

            for registration in app.coordinator.ledger().custom_for(&user_id) {
                println!(
                    "{}  {}  {}  {}",
                    registration.id,
                    registration.event_id,
                    registration.event_name,
                    registration.status
                );
            }
        }
    }

    Ok(())
}

pub fn list(app: &mut App) -> anyhow::Result<()> {
    if !app.auth().require_authenticated() {
        anyhow::bail!("not logged in");
    }

    for event in app.coordinator.my_events() {
        print_event(&event);
    }

    Ok(())
}

pub fn audit(app: &mut App, reconcile: bool) -> anyhow::Result<()> {
    if reconcile {
        let dropped = app.coordinator.reconcile();
        println!("dropped {dropped} registrations for unknown events");
    }

    let drift = app.coordinator.audit();
    if drift.is_empty() {
        println!("all event counts match the ledger");
    }

    for d in drift {
        println!("{}  recorded {}  ledger {}", d.event_id, d.recorded, d.actual);
    }

    Ok(())
}
