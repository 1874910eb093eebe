mod harness;
mod reports;

pub use harness::*;
pub use reports::*;
