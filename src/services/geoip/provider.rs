//! GeoIP Provider 抽象层
//!
//! 远程 API 与本地 MaxMind 数据库实现同一个查询接口，
//! 由 `LocationResolver` 决定调用顺序。

use async_trait::async_trait;
use serde::Serialize;

use crate::errors::Result;

/// 地理位置信息
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GeoInfo {
    /// ISO 3166-1 alpha-2 国家代码 (e.g., "CN", "US")
    pub country: Option<String>,
    /// 行政区代码 (e.g., "CA", "BY")
    pub region: Option<String>,
    /// 城市名称
    pub city: Option<String>,
}

/// GeoIP 查询 trait
#[async_trait]
pub trait GeoIpLookup: Send + Sync {
    /// 查询 IP 地址的地理位置
    ///
    /// 网络、解析、数据库错误都以 `Err` 返回，不会 panic
    async fn lookup(&self, ip: &str) -> Result<GeoInfo>;

    /// 获取 provider 名称（用于日志）
    fn name(&self) -> &'static str;
}
