//! GeoIP 服务模块
//!
//! 提供 IP 地址地理位置查询功能，支持：
//! - 外部 HTTP API（首选）
//! - MaxMind GeoLite2 本地数据库（fallback）

mod external_api;
mod maxmind;
mod provider;

pub use external_api::ExternalApiProvider;
pub use maxmind::MaxMindProvider;
pub use provider::{GeoInfo, GeoIpLookup};
