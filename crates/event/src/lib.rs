mod catalog;
mod event;
mod filter;

pub use catalog::*;
pub use event::*;
pub use filter::*;
