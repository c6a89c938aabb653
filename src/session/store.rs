//! 会话存储抽象
//!
//! 会话由宿主应用持有，解析器只通过 `SessionStore` 读写四个固定键。

use serde::Serialize;

use crate::services::GeoInfo;

/// 会话中保存的固定键
pub mod keys {
    pub const IP: &str = "sessionIP";
    pub const COUNTRY: &str = "sessionCountry";
    pub const REGION: &str = "sessionRegion";
    pub const CITY: &str = "sessionCity";
}

/// 宿主会话的最小接口（字符串键值）
pub trait SessionStore {
    fn get(&self, key: &str) -> Option<String>;

    fn set(&mut self, key: &str, value: String);

    fn remove(&mut self, key: &str);
}

/// 位置字段的只读访问器，任何 `SessionStore` 自动获得
pub trait SessionLocationExt: SessionStore {
    /// 上次解析过的 IP
    fn location_ip(&self) -> Option<String> {
        self.get(keys::IP)
    }

    /// ISO 3166-1 alpha-2 国家代码
    fn location_country(&self) -> Option<String> {
        self.get(keys::COUNTRY)
    }

    /// 最细一级行政区代码
    fn location_region(&self) -> Option<String> {
        self.get(keys::REGION)
    }

    fn location_city(&self) -> Option<String> {
        self.get(keys::CITY)
    }
}

impl<S: SessionStore + ?Sized> SessionLocationExt for S {}

/// 会话中位置记录的快照
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LocationRecord {
    pub ip: Option<String>,
    pub country: Option<String>,
    pub region: Option<String>,
    pub city: Option<String>,
}

impl LocationRecord {
    pub fn read<S: SessionStore + ?Sized>(session: &S) -> Self {
        Self {
            ip: session.location_ip(),
            country: session.location_country(),
            region: session.location_region(),
            city: session.location_city(),
        }
    }
}

/// 三个位置字段一起写入；`None` 会移除对应键，避免残留上一次的值
pub(crate) fn write_location<S: SessionStore + ?Sized>(session: &mut S, info: &GeoInfo) {
    put_or_remove(session, keys::COUNTRY, info.country.as_deref());
    put_or_remove(session, keys::REGION, info.region.as_deref());
    put_or_remove(session, keys::CITY, info.city.as_deref());
}

fn put_or_remove<S: SessionStore + ?Sized>(session: &mut S, key: &str, value: Option<&str>) {
    match value {
        Some(v) => session.set(key, v.to_string()),
        None => session.remove(key),
    }
}
