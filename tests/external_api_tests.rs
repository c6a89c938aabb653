//! 远程 provider + 本地 fallback 的端到端测试
//!
//! 在 127.0.0.1 随机端口启动一个 actix-web 服务模拟 GeoIP API。

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use actix_web::{App, HttpResponse, HttpServer, web};
use geosession::errors::GeoSessionError;
use geosession::services::{
    ExternalApiProvider, GeoIpLookup, LocationResolver, LookupSource, MaxMindProvider, Resolution,
};
use geosession::session::{MemorySession, SessionLocationExt, SessionStore, keys};

async fn fake_geoip(path: web::Path<String>) -> HttpResponse {
    match path.as_str() {
        "8.8.8.8" => HttpResponse::Ok().json(serde_json::json!({
            "ip": "8.8.8.8",
            "country_code": "US",
            "country_name": "United States",
            "region_code": "CA",
            "region_name": "California",
            "city": "Mountain View"
        })),
        "1.1.1.1" => HttpResponse::Ok()
            .content_type("application/json")
            .body("{not json"),
        "9.9.9.9" => HttpResponse::TooManyRequests().finish(),
        _ => HttpResponse::NotFound().finish(),
    }
}

/// 启动模拟服务，返回监听地址
fn spawn_fake_service() -> SocketAddr {
    let server = HttpServer::new(|| App::new().route("/json/{ip}", web::get().to(fake_geoip)))
        .workers(1)
        .bind(("127.0.0.1", 0))
        .unwrap();
    let addr = server.addrs()[0];
    actix_rt::spawn(server.run());
    addr
}

fn provider_for(addr: SocketAddr) -> ExternalApiProvider {
    ExternalApiProvider::new(
        &format!("http://{}/json/{{ip}}", addr),
        Duration::from_secs(2),
    )
}

#[actix_rt::test]
async fn test_external_api_parses_service_response() {
    let addr = spawn_fake_service();
    let provider = provider_for(addr);

    let info = provider.lookup("8.8.8.8").await.unwrap();

    assert_eq!(info.country.as_deref(), Some("US"));
    assert_eq!(info.region.as_deref(), Some("CA"));
    assert_eq!(info.city.as_deref(), Some("Mountain View"));
}

#[actix_rt::test]
async fn test_external_api_malformed_body() {
    let addr = spawn_fake_service();
    let provider = provider_for(addr);

    let err = provider.lookup("1.1.1.1").await.unwrap_err();
    assert!(matches!(err, GeoSessionError::RemoteResponse(_)));
}

#[actix_rt::test]
async fn test_external_api_error_status() {
    let addr = spawn_fake_service();
    let provider = provider_for(addr);

    let err = provider.lookup("9.9.9.9").await.unwrap_err();
    assert!(matches!(err, GeoSessionError::RemoteRequest(_)));
}

#[actix_rt::test]
async fn test_resolver_with_real_providers_remote_path() {
    let addr = spawn_fake_service();
    let resolver = LocationResolver::new(
        Arc::new(provider_for(addr)),
        Arc::new(MaxMindProvider::new("/nonexistent/GeoLite2-City.mmdb")),
    );
    let mut session = MemorySession::new();

    let resolution = resolver.resolve_for_ip(&mut session, "8.8.8.8").await.unwrap();

    assert!(matches!(
        resolution,
        Resolution::Resolved {
            source: LookupSource::Remote,
            ..
        }
    ));
    assert_eq!(session.location_region().as_deref(), Some("CA"));
}

#[actix_rt::test]
async fn test_resolver_with_real_providers_both_fail() {
    let addr = spawn_fake_service();
    let resolver = LocationResolver::new(
        Arc::new(provider_for(addr)),
        Arc::new(MaxMindProvider::new("/nonexistent/GeoLite2-City.mmdb")),
    );
    let mut session = MemorySession::new();
    session.set(keys::COUNTRY, "NZ".to_string());

    let err = resolver
        .resolve_for_ip(&mut session, "1.1.1.1")
        .await
        .unwrap_err();

    assert!(matches!(err, GeoSessionError::LookupExhausted(_)));
    assert!(err.message().contains("ExternalAPI"));
    assert!(err.message().contains("MaxMind"));
    assert_eq!(session.location_country().as_deref(), Some("NZ"));
    assert_eq!(session.location_ip().as_deref(), Some("1.1.1.1"));
}
