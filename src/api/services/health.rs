use std::sync::Arc;

use actix_web::{HttpResponse, Responder, web};
use serde::Serialize;
use tracing::trace;

use crate::services::LocationResolver;
use crate::session::SessionRegistry;

// 应用启动时间结构体
#[derive(Clone, Debug)]
pub struct AppStartTime {
    pub started_at: std::time::Instant,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub uptime_secs: u64,
    pub remote_provider: &'static str,
    pub local_provider: &'static str,
    pub sessions: u64,
}

pub struct HealthService;

impl HealthService {
    pub async fn health_check(
        resolver: web::Data<Arc<LocationResolver>>,
        registry: web::Data<Arc<SessionRegistry>>,
        app_start_time: web::Data<AppStartTime>,
    ) -> impl Responder {
        trace!("Received health check request");

        HttpResponse::Ok().json(HealthResponse {
            status: "healthy",
            uptime_secs: app_start_time.started_at.elapsed().as_secs(),
            remote_provider: resolver.remote_name(),
            local_provider: resolver.local_name(),
            sessions: registry.session_count(),
        })
    }
}
