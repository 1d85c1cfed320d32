//! Shared types for the joblog model builder.

mod format;
mod key;
mod log;

pub use format::*;
pub use key::*;
pub use log::*;
