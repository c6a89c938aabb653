pub mod geo_session;

pub use geo_session::{GeoSession, GeoSessionSettings, SessionId};
