//! Server mode
//!
//! This module contains the HTTP server startup logic.
//! It wires the location resolver and the session registry into
//! actix-web and starts listening.

use actix_web::{App, HttpServer, middleware::DefaultHeaders, web};
use anyhow::Result;
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

use crate::api::middleware::{GeoSession, GeoSessionSettings};
use crate::api::services::{AppStartTime, configure_routes};
use crate::config::StaticConfig;
use crate::services::LocationResolver;
use crate::session::SessionRegistry;

/// Run server mode
pub async fn run_server(config: &StaticConfig) -> Result<()> {
    let app_start_time = AppStartTime {
        started_at: Instant::now(),
    };

    let resolver = Arc::new(LocationResolver::from_config(&config.geoip));
    let registry = Arc::new(SessionRegistry::new(&config.session));
    let settings = GeoSessionSettings::from_config(config);

    info!(
        "GeoIP: {} at {} (timeout {}s), fallback {} at {}",
        resolver.remote_name(),
        config.geoip.api_url,
        config.geoip.timeout_secs,
        resolver.local_name(),
        config.geoip.maxminddb_path
    );

    if settings.trusted_proxies.is_empty() {
        warn!(
            "Client IP: Auto-detect mode enabled. \
             Connections from private IPs will use X-Forwarded-For. \
             To disable, configure geoip.trusted_proxies explicitly."
        );
    } else {
        info!(
            "Client IP: Explicit trusted proxies configured: {:?}",
            settings.trusted_proxies
        );
    }

    let cpu_count = config.server.cpu_count.clamp(1, 32);
    let bind_address = format!("{}:{}", config.server.host, config.server.port);

    let server = HttpServer::new(move || {
        App::new()
            .wrap(GeoSession::new(
                Arc::clone(&resolver),
                Arc::clone(&registry),
                settings.clone(),
            ))
            .wrap(DefaultHeaders::new().add(("Cache-Control", "no-cache, no-store, must-revalidate")))
            .app_data(web::Data::new(Arc::clone(&resolver)))
            .app_data(web::Data::new(Arc::clone(&registry)))
            .app_data(web::Data::new(app_start_time.clone()))
            .configure(configure_routes)
    })
    .workers(cpu_count)
    .bind(&bind_address)?;

    warn!("Starting server at http://{} with {} workers", bind_address, cpu_count);
    server.run().await?;

    Ok(())
}
