use clap::Subcommand;
use eventhub::App;
use eventhub_user::{ChangePasswordInput, LoginInput, NewUser, UpdateProfileInput};

#[derive(Subcommand)]
pub enum UserCommand {
    /// Create an account (does not log in)
    Register {
        #[arg(long)]
        first_name: String,
        #[arg(long)]
        last_name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
        #[arg(long, default_value = "")]
        phone: String,
    },
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    Logout,
    /// Show the logged-in user and session time left
    Whoami,
    /// Update the logged-in user's profile
    Update {
        #[arg(long)]
        first_name: Option<String>,
        #[arg(long)]
        last_name: Option<String>,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        phone: Option<String>,
    },
    Password {
        #[arg(long)]
        current: String,
        #[arg(long)]
        new: String,
        #[arg(long)]
        confirm: String,
    },
    /// Activate or deactivate an account by email
    SetActive {
        email: String,
        #[arg(action = clap::ArgAction::Set)]
        active: bool,
    },
    /// Delete an account by email
    Delete { email: String },
    Stats,
}

pub fn run(app: &mut App, command: UserCommand) -> anyhow::Result<()> {
    match command {
        UserCommand::Register {
            first_name,
            last_name,
            email,
            password,
            phone,
        } => {
            let user = app.auth().register(NewUser {
                first_name,
                last_name,
                email,
                phone,
                password,
            })?;
            println!("created {} <{}> ({})", user.full_name(), user.email, user.id);
        }
        UserCommand::Login { email, password } => {
            let user = app.auth().login(LoginInput { email, password })?;
            println!("logged in as {}", user.full_name());
        }
        UserCommand::Logout => {
            app.auth().logout();
            println!("logged out");
        }
        UserCommand::Whoami => {
            let warning = app.expiry_warning;
            let auth = app.auth();
            let Some(user) = auth.current_user().cloned() else {
                println!("not logged in");
                return Ok(());
            };

            let remaining = auth.session_remaining();
            println!("{} <{}> [{}]", user.full_name(), user.email, user.initials());
            println!("session expires in {} min", remaining.whole_minutes());
            if auth.is_session_expiring_soon(warning) {
                println!("session is about to expire; log in again to keep working");
            }
            auth.extend_session();
        }
        UserCommand::Update {
            first_name,
            last_name,
            email,
            phone,
        } => {
            let user = app.auth().update_profile(UpdateProfileInput {
                first_name,
                last_name,
                email,
                phone,
                ..Default::default()
            })?;
            println!("updated {}", user.full_name());
        }
        UserCommand::Password {
            current,
            new,
            confirm,
        } => {
            app.auth().change_password(ChangePasswordInput {
                current_password: current,
                new_password: new,
                confirm_password: confirm,
            })?;
            println!("password changed");
        }
        UserCommand::SetActive { email, active } => {
            let Some(user) = app.directory.find_by_email(&email) else {
                anyhow::bail!("user {email} not found");
            };
            app.auth().set_active(&user.id, active)?;
            println!("{email} is now {}", if active { "active" } else { "inactive" });
        }
        UserCommand::Delete { email } => {
            let Some(user) = app.directory.find_by_email(&email) else {
                anyhow::bail!("user {email} not found");
            };
            app.auth().delete_account(&user.id)?;
            println!("deleted {email}");
        }
        UserCommand::Stats => {
            let stats = app.directory.stats();
            println!(
                "total {}  active {}  inactive {}  new this week {}",
                stats.total, stats.active, stats.inactive, stats.new_this_week
            );
        }
    }

    Ok(())
}
