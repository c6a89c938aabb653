//! 访客位置解析
//!
//! 查询顺序：远程 API → 本地 MaxMind 数据库。结果写入会话，
//! 会话中的 `sessionIP` 作为去重键，同一会话同一 IP 只查询一次。

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, trace};

use super::geoip::{ExternalApiProvider, GeoInfo, GeoIpLookup, MaxMindProvider};
use crate::config::GeoIpConfig;
use crate::errors::{GeoSessionError, Result};
use crate::session::{SessionLocationExt, SessionStore, keys, write_location};

/// 结果来源
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookupSource {
    Remote,
    Local,
}

/// 跳过查询的原因
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    EmptyIp,
    AlreadyResolved,
}

/// `resolve_for_ip` 的结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Skipped(SkipReason),
    Resolved { source: LookupSource, info: GeoInfo },
}

pub struct LocationResolver {
    remote: Arc<dyn GeoIpLookup>,
    local: Arc<dyn GeoIpLookup>,
}

impl LocationResolver {
    pub fn new(remote: Arc<dyn GeoIpLookup>, local: Arc<dyn GeoIpLookup>) -> Self {
        Self { remote, local }
    }

    /// 根据配置创建：远程 ExternalApiProvider + 本地 MaxMindProvider
    ///
    /// 本地数据库在这里预热打开；打不开时留给查询时重试
    pub fn from_config(config: &GeoIpConfig) -> Self {
        let remote = ExternalApiProvider::new(
            &config.api_url,
            Duration::from_secs(config.timeout_secs),
        );
        let local = MaxMindProvider::open_or_lazy(&config.maxminddb_path);

        Self::new(Arc::new(remote), Arc::new(local))
    }

    pub fn remote_name(&self) -> &'static str {
        self.remote.name()
    }

    pub fn local_name(&self) -> &'static str {
        self.local.name()
    }

    /// 为会话解析 IP 位置
    ///
    /// - 空 IP 或与会话中缓存的 IP 相同：不查询，返回 `Skipped`
    /// - 否则先查远程，失败再查本地；成功的一路三个字段整体写入会话
    /// - 两路都失败：位置字段保持原值，返回 `LookupExhausted`
    ///
    /// 无论成功与否，查询后都会记录该 IP，同一会话内不会重复查询同一个 IP。
    pub async fn resolve_for_ip<S>(&self, session: &mut S, ip: &str) -> Result<Resolution>
    where
        S: SessionStore + ?Sized,
    {
        if ip.is_empty() {
            return Ok(Resolution::Skipped(SkipReason::EmptyIp));
        }

        if session.location_ip().as_deref() == Some(ip) {
            trace!("Location for {} already cached in session", ip);
            return Ok(Resolution::Skipped(SkipReason::AlreadyResolved));
        }

        let outcome = self.lookup(ip).await;
        if let Ok((_, ref info)) = outcome {
            write_location(session, info);
        }
        session.set(keys::IP, ip.to_string());

        let (source, info) = outcome?;
        Ok(Resolution::Resolved { source, info })
    }

    /// 远程 API 查询
    pub async fn remote_lookup(&self, ip: &str) -> Result<GeoInfo> {
        self.remote.lookup(ip).await
    }

    /// 本地数据库查询
    pub async fn local_lookup(&self, ip: &str) -> Result<GeoInfo> {
        self.local.lookup(ip).await
    }

    async fn lookup(&self, ip: &str) -> Result<(LookupSource, GeoInfo)> {
        let remote_err = match self.remote_lookup(ip).await {
            Ok(info) => return Ok((LookupSource::Remote, info)),
            Err(e) => e,
        };
        debug!(
            "GeoIP: {} lookup for {} failed ({}), falling back to {}",
            self.remote.name(),
            ip,
            remote_err,
            self.local.name()
        );

        match self.local_lookup(ip).await {
            Ok(info) => Ok((LookupSource::Local, info)),
            Err(local_err) => {
                debug!(
                    "GeoIP: {} lookup for {} failed ({})",
                    self.local.name(),
                    ip,
                    local_err
                );
                Err(GeoSessionError::lookup_exhausted(format!(
                    "{} [{}: {}; {}: {}]",
                    ip,
                    self.remote.name(),
                    remote_err,
                    self.local.name(),
                    local_err
                )))
            }
        }
    }
}
