//! MaxMind GeoLite2 数据库实现
//!
//! 使用本地 MaxMind GeoLite2-City.mmdb 文件进行 IP 地理位置查询。
//! 启动时尝试打开一次；打开失败时查询返回错误，下次查询会在
//! blocking 线程池中重试，因此文件可以在进程启动之后再放到位。

use std::net::IpAddr;
use std::sync::Arc;

use arc_swap::ArcSwapOption;
use async_trait::async_trait;
use maxminddb::Reader;
use maxminddb::geoip2::City;
use tracing::{debug, trace, warn};

use super::provider::{GeoInfo, GeoIpLookup};
use crate::errors::{GeoSessionError, Result};

type MmdbReader = Reader<Vec<u8>>;

/// MaxMind GeoIP Provider
pub struct MaxMindProvider {
    path: String,
    reader: ArcSwapOption<MmdbReader>,
}

impl MaxMindProvider {
    /// 创建 Provider，不立即打开文件
    pub fn new(path: &str) -> Self {
        Self {
            path: path.to_string(),
            reader: ArcSwapOption::empty(),
        }
    }

    /// 创建 Provider 并立即打开数据库
    pub fn open(path: &str) -> Result<Self> {
        let provider = Self::new(path);
        let reader = open_reader(path)?;
        provider.reader.store(Some(Arc::new(reader)));
        Ok(provider)
    }

    /// 启动时预热：能打开就立即打开，否则退回懒加载
    pub fn open_or_lazy(path: &str) -> Self {
        match Self::open(path) {
            Ok(provider) => {
                debug!("GeoIP: Opened MaxMind database at {}", path);
                provider
            }
            Err(e) => {
                warn!("GeoIP: {}, local fallback will retry on each lookup", e);
                Self::new(path)
            }
        }
    }

    /// 数据库是否已打开
    pub fn is_loaded(&self) -> bool {
        self.reader.load().is_some()
    }

    /// 获取 reader；未打开时在 spawn_blocking 中读取整个文件
    async fn reader(&self) -> Result<Arc<MmdbReader>> {
        if let Some(reader) = self.reader.load_full() {
            return Ok(reader);
        }

        let path = self.path.clone();
        let reader = tokio::task::spawn_blocking(move || open_reader(&path))
            .await
            .map_err(|e| GeoSessionError::database_open(format!("open task failed: {}", e)))??;
        debug!("GeoIP: Opened MaxMind database at {}", self.path);

        let reader = Arc::new(reader);
        self.reader.store(Some(Arc::clone(&reader)));
        Ok(reader)
    }
}

fn open_reader(path: &str) -> Result<MmdbReader> {
    Reader::open_readfile(path)
        .map_err(|e| GeoSessionError::database_open(format!("{}: {}", path, e)))
}

fn lookup_in(reader: &MmdbReader, ip_addr: IpAddr) -> Result<GeoInfo> {
    let result = reader.lookup(ip_addr)?;
    if !result.has_data() {
        return Err(GeoSessionError::not_found(format!(
            "{} is not in the database",
            ip_addr
        )));
    }

    let Some(city): Option<City> = result.decode()? else {
        return Err(GeoSessionError::not_found(format!(
            "{} has no city record",
            ip_addr
        )));
    };

    Ok(geo_info_from_city(&city))
}

/// City 记录 → 国家 ISO 代码、最细一级行政区代码、英文城市名
fn geo_info_from_city(city: &City<'_>) -> GeoInfo {
    // 多级行政区时取最后一级（最细粒度）
    let region = city
        .subdivisions
        .last()
        .and_then(|s| s.iso_code)
        .map(String::from);

    GeoInfo {
        country: city.country.iso_code.map(String::from),
        region,
        city: city.city.names.english.map(String::from),
    }
}

#[async_trait]
impl GeoIpLookup for MaxMindProvider {
    async fn lookup(&self, ip: &str) -> Result<GeoInfo> {
        let ip_addr: IpAddr = ip.trim().parse()?;
        let reader = self.reader().await?;
        let info = lookup_in(&reader, ip_addr)?;

        trace!(
            "MaxMind lookup for {}: country={:?}, region={:?}, city={:?}",
            ip, info.country, info.region, info.city
        );

        Ok(info)
    }

    fn name(&self) -> &'static str {
        "MaxMind"
    }
}
