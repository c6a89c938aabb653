//! Mode routing
//!
//! - Server mode (HTTP host with session middleware)
//! - CLI mode (single lookup)

pub mod cli;
pub mod server;

pub use cli::run_lookup;
pub use server::run_server;
