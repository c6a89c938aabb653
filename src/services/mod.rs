//! Service layer for business logic
//!
//! Lookup logic shared by the HTTP host and the CLI.

pub mod geoip;
mod location;

pub use geoip::{ExternalApiProvider, GeoInfo, GeoIpLookup, MaxMindProvider};
pub use location::{LocationResolver, LookupSource, Resolution, SkipReason};
