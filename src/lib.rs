//! geosession - visitor location from IP, cached per session
//!
//! Resolves country, region and city for a visitor's IP address. The remote
//! GeoIP web service is asked first, the local MaxMind GeoLite2-City
//! database is the fallback. Results are written into the visitor's session
//! under fixed keys, and an IP already recorded in the session is never
//! looked up again.
//!
//! # Architecture
//! - `services`: GeoIP providers and the `LocationResolver`
//! - `session`: session store trait, in-memory session, session registry
//! - `api`: actix-web middleware and handlers for the demo host
//! - `config`: Configuration management
//! - `runtime`: Execution modes (server, one-off lookup)
//! - `system`: Logging setup
//! - `utils`: Client IP extraction

pub mod api;
pub mod config;
pub mod errors;
pub mod runtime;
pub mod services;
pub mod session;
pub mod system;
pub mod utils;
