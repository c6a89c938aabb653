//! 外部 GeoIP API 实现
//!
//! 使用外部 HTTP API 进行 IP 地理位置查询（如 freegeoip / ip-api.com）

use std::net::IpAddr;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{trace, warn};
use ureq::Agent;

use super::provider::{GeoInfo, GeoIpLookup};
use crate::errors::{GeoSessionError, Result};

/// 外部 API GeoIP Provider
pub struct ExternalApiProvider {
    api_url_template: String,
    agent: Agent,
}

impl ExternalApiProvider {
    /// 创建外部 API Provider
    ///
    /// `api_url_template` 使用 `{ip}` 作为占位符
    /// 例如: `http://freegeoip.net/json/{ip}`
    pub fn new(api_url_template: &str, timeout: Duration) -> Self {
        let agent = Agent::config_builder()
            .timeout_global(Some(timeout))
            .build()
            .into();

        Self {
            api_url_template: api_url_template.to_string(),
            agent,
        }
    }

    fn build_url(&self, ip: &IpAddr) -> String {
        self.api_url_template.replace("{ip}", &ip.to_string())
    }

    /// 从外部 API 获取 GeoIP 信息（同步，在 spawn_blocking 中调用）
    fn fetch_from_api_sync(agent: &Agent, url: &str) -> Result<GeoInfo> {
        // 非 2xx 状态码由 ureq 直接转换为 Err
        let resp = agent.get(url).call().map_err(|e| {
            GeoSessionError::remote_request(format!("GET \"{}\" failed: {}", url, e))
        })?;

        let body = resp.into_body().read_to_string().map_err(|e| {
            GeoSessionError::remote_response(format!("reading body from \"{}\": {}", url, e))
        })?;

        parse_api_response(&body)
    }
}

/// 解析 API 返回的 JSON
///
/// freegeoip 格式: {"country_code": "US", "region_code": "CA", "city": "Mountain View"}
/// ip-api.com 格式: {"countryCode": "US", "region": "CA", "city": "..."}，失败时 {"status": "fail"}
pub(crate) fn parse_api_response(body: &str) -> Result<GeoInfo> {
    let json: serde_json::Value = serde_json::from_str(body)?;

    if !json.is_object() {
        return Err(GeoSessionError::remote_response(
            "response body is not a JSON object",
        ));
    }

    if json["status"].as_str() == Some("fail") {
        let reason = json["message"].as_str().unwrap_or("unknown reason");
        return Err(GeoSessionError::remote_response(format!(
            "service reported failure: {}",
            reason
        )));
    }

    let field = |primary: &str, alternate: &str| {
        json[primary]
            .as_str()
            .or_else(|| json[alternate].as_str())
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from)
    };

    let Some(country) = field("country_code", "countryCode") else {
        return Err(GeoSessionError::not_found(
            "response carries no country code",
        ));
    };

    Ok(GeoInfo {
        country: Some(country),
        region: field("region_code", "region"),
        city: field("city", "city"),
    })
}

#[async_trait]
impl GeoIpLookup for ExternalApiProvider {
    async fn lookup(&self, ip: &str) -> Result<GeoInfo> {
        // 先校验 IP，避免把任意字符串拼进 URL
        let ip_addr: IpAddr = ip.trim().parse()?;
        let url = self.build_url(&ip_addr);
        let agent = self.agent.clone();

        // 使用 spawn_blocking 在线程池中执行同步 HTTP 请求
        let info = tokio::task::spawn_blocking(move || Self::fetch_from_api_sync(&agent, &url))
            .await
            .map_err(|e| {
                warn!("GeoIP spawn_blocking failed: {}", e);
                GeoSessionError::remote_request(format!("lookup task failed: {}", e))
            })??;

        trace!(
            "External API lookup for {}: country={:?}, region={:?}, city={:?}",
            ip, info.country, info.region, info.city
        );

        Ok(info)
    }

    fn name(&self) -> &'static str {
        "ExternalAPI"
    }
}
