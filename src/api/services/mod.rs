pub mod health;
pub mod location;

pub use health::{AppStartTime, HealthService};
pub use location::LocationService;

use actix_web::web;

/// 注册路由
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/location", web::get().to(LocationService::current_location))
        .route("/health", web::get().to(HealthService::health_check));
}
