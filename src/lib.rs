pub mod app;
pub mod config;
pub mod coordinator;
pub mod observability;

pub use app::App;
pub use coordinator::*;
