use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use actix_web::{App, http::StatusCode, test as actix_test, web};
use async_trait::async_trait;
use geosession::api::middleware::{GeoSession, GeoSessionSettings};
use geosession::api::services::{AppStartTime, configure_routes};
use geosession::config::SessionConfig;
use geosession::errors::{GeoSessionError, Result};
use geosession::services::{GeoInfo, GeoIpLookup, LocationResolver};
use geosession::session::SessionRegistry;

// 模拟 provider：按 IP 返回国家代码，记录调用次数
#[derive(Default)]
struct CountingProvider {
    calls: AtomicUsize,
}

#[async_trait]
impl GeoIpLookup for CountingProvider {
    async fn lookup(&self, ip: &str) -> Result<GeoInfo> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match ip {
            "8.8.8.8" => Ok(GeoInfo {
                country: Some("US".to_string()),
                region: Some("CA".to_string()),
                city: Some("Mountain View".to_string()),
            }),
            "5.5.5.5" => Ok(GeoInfo {
                country: Some("DE".to_string()),
                region: None,
                city: Some("Berlin".to_string()),
            }),
            _ => Err(GeoSessionError::not_found(ip.to_string())),
        }
    }

    fn name(&self) -> &'static str {
        "Counting"
    }
}

struct Harness {
    remote: Arc<CountingProvider>,
    resolver: Arc<LocationResolver>,
    registry: Arc<SessionRegistry>,
}

impl Harness {
    fn new() -> Self {
        let remote = Arc::new(CountingProvider::default());
        let local = Arc::new(CountingProvider::default());
        let resolver = Arc::new(LocationResolver::new(remote.clone(), local));
        let registry = Arc::new(SessionRegistry::new(&SessionConfig::default()));
        Self {
            remote,
            resolver,
            registry,
        }
    }

    fn settings(skip_private: bool) -> GeoSessionSettings {
        GeoSessionSettings {
            cookie_name: "geo_sid".to_string(),
            skip_private,
            trusted_proxies: vec!["10.0.0.0/8".to_string()],
        }
    }
}

macro_rules! init_app {
    ($h:expr, $skip_private:expr) => {
        actix_test::init_service(
            App::new()
                .wrap(GeoSession::new(
                    $h.resolver.clone(),
                    $h.registry.clone(),
                    Harness::settings($skip_private),
                ))
                .app_data(web::Data::new($h.resolver.clone()))
                .app_data(web::Data::new($h.registry.clone()))
                .app_data(web::Data::new(AppStartTime {
                    started_at: std::time::Instant::now(),
                }))
                .configure(configure_routes),
        )
        .await
    };
}

#[actix_web::test]
async fn test_first_request_resolves_and_sets_cookie() {
    let h = Harness::new();
    let app = init_app!(h, true);

    let req = actix_test::TestRequest::get()
        .uri("/location")
        .peer_addr("8.8.8.8:40000".parse().unwrap())
        .to_request();
    let resp = actix_test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::OK);
    let cookie = resp
        .response()
        .cookies()
        .find(|c| c.name() == "geo_sid")
        .expect("session cookie should be set");
    assert!(!cookie.value().is_empty());

    let body: serde_json::Value = actix_test::read_body_json(resp).await;
    assert_eq!(body["ip"], "8.8.8.8");
    assert_eq!(body["country"], "US");
    assert_eq!(body["region"], "CA");
    assert_eq!(body["city"], "Mountain View");
    assert_eq!(h.remote.calls.load(Ordering::SeqCst), 1);
}

#[actix_web::test]
async fn test_returning_session_is_not_looked_up_again() {
    let h = Harness::new();
    let app = init_app!(h, true);

    let req = actix_test::TestRequest::get()
        .uri("/location")
        .peer_addr("8.8.8.8:40000".parse().unwrap())
        .to_request();
    let resp = actix_test::call_service(&app, req).await;
    let cookie = resp
        .response()
        .cookies()
        .find(|c| c.name() == "geo_sid")
        .unwrap()
        .into_owned();

    let req = actix_test::TestRequest::get()
        .uri("/location")
        .peer_addr("8.8.8.8:40001".parse().unwrap())
        .cookie(cookie)
        .to_request();
    let resp = actix_test::call_service(&app, req).await;

    // 已有会话不再下发 cookie
    assert!(resp.response().cookies().next().is_none());
    let body: serde_json::Value = actix_test::read_body_json(resp).await;
    assert_eq!(body["country"], "US");
    assert_eq!(h.remote.calls.load(Ordering::SeqCst), 1);
}

#[actix_web::test]
async fn test_ip_change_within_session_is_resolved() {
    let h = Harness::new();
    let app = init_app!(h, true);

    let req = actix_test::TestRequest::get()
        .uri("/location")
        .peer_addr("8.8.8.8:40000".parse().unwrap())
        .to_request();
    let resp = actix_test::call_service(&app, req).await;
    let cookie = resp
        .response()
        .cookies()
        .find(|c| c.name() == "geo_sid")
        .unwrap()
        .into_owned();

    let req = actix_test::TestRequest::get()
        .uri("/location")
        .peer_addr("5.5.5.5:40000".parse().unwrap())
        .cookie(cookie)
        .to_request();
    let body: serde_json::Value = actix_test::call_and_read_body_json(&app, req).await;

    assert_eq!(body["ip"], "5.5.5.5");
    assert_eq!(body["country"], "DE");
    assert!(body["region"].is_null());
    assert_eq!(body["city"], "Berlin");
}

#[actix_web::test]
async fn test_trusted_proxy_forwarded_ip_is_used() {
    let h = Harness::new();
    let app = init_app!(h, true);

    let req = actix_test::TestRequest::get()
        .uri("/location")
        .peer_addr("10.1.1.1:40000".parse().unwrap())
        .insert_header(("X-Forwarded-For", "8.8.8.8, 10.1.1.1"))
        .to_request();
    let body: serde_json::Value = actix_test::call_and_read_body_json(&app, req).await;

    assert_eq!(body["ip"], "8.8.8.8");
    assert_eq!(body["country"], "US");
}

#[actix_web::test]
async fn test_private_client_is_skipped() {
    let h = Harness::new();
    let app = init_app!(h, true);

    let req = actix_test::TestRequest::get()
        .uri("/location")
        .peer_addr("192.168.1.20:40000".parse().unwrap())
        .to_request();
    let body: serde_json::Value = actix_test::call_and_read_body_json(&app, req).await;

    assert!(body["ip"].is_null());
    assert!(body["country"].is_null());
    assert_eq!(h.remote.calls.load(Ordering::SeqCst), 0);
}

#[actix_web::test]
async fn test_unresolvable_ip_still_serves_response() {
    let h = Harness::new();
    let app = init_app!(h, false);

    let req = actix_test::TestRequest::get()
        .uri("/location")
        .peer_addr("192.168.1.20:40000".parse().unwrap())
        .to_request();
    let resp = actix_test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::OK);
    let body: serde_json::Value = actix_test::read_body_json(resp).await;
    assert_eq!(body["ip"], "192.168.1.20");
    assert!(body["country"].is_null());
}

#[actix_web::test]
async fn test_health_reports_providers() {
    let h = Harness::new();
    let app = init_app!(h, true);

    let req = actix_test::TestRequest::get()
        .uri("/health")
        .peer_addr("8.8.8.8:40000".parse().unwrap())
        .to_request();
    let body: serde_json::Value = actix_test::call_and_read_body_json(&app, req).await;

    assert_eq!(body["status"], "healthy");
    assert_eq!(body["remote_provider"], "Counting");
    assert_eq!(body["local_provider"], "Counting");
    assert_eq!(body["sessions"], 1);
}
