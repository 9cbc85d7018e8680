mod auth;
mod directory;
mod preferences;
mod session;
mod user;

pub use auth::*;
pub use directory::*;
pub use preferences::*;
pub use session::*;
pub use user::*;
