mod custom;
mod ledger;

pub use custom::*;
pub use ledger::*;
