//! System-level modules
//!
//! Process-wide setup that is not part of the lookup logic itself.

pub mod logging;

pub use logging::init_logging;
