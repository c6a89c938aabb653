//! 会话位置中间件
//!
//! 每个请求：
//! 1. 根据 cookie 取出（或新建）会话
//! 2. 提取客户端 IP，交给 `LocationResolver` 解析
//! 3. 把 `LocationRecord` 放入 request extensions，供 handler 读取
//!
//! 解析失败只记日志，不影响响应。

use std::net::IpAddr;
use std::rc::Rc;
use std::sync::Arc;

use actix_service::{Service, Transform};
use actix_web::{
    Error, HttpMessage,
    cookie::{Cookie, SameSite},
    dev::{ServiceRequest, ServiceResponse},
};
use futures_util::future::{LocalBoxFuture, Ready, ready};
use tracing::{debug, trace};

use crate::config::StaticConfig;
use crate::services::{LocationResolver, Resolution};
use crate::session::{LocationRecord, MemorySession, SessionRegistry};
use crate::utils::{extract_client_ip, is_private_or_local};

/// 中间件行为设置
#[derive(Debug, Clone)]
pub struct GeoSessionSettings {
    pub cookie_name: String,
    pub skip_private: bool,
    pub trusted_proxies: Vec<String>,
}

impl GeoSessionSettings {
    pub fn from_config(config: &StaticConfig) -> Self {
        Self {
            cookie_name: config.session.cookie_name.clone(),
            skip_private: config.geoip.skip_private,
            trusted_proxies: config.geoip.trusted_proxies.clone(),
        }
    }
}

/// 会话 ID，可从 request extensions 中提取
#[derive(Clone, Debug)]
pub struct SessionId(pub String);

/// 会话位置中间件工厂
#[derive(Clone)]
pub struct GeoSession {
    resolver: Arc<LocationResolver>,
    registry: Arc<SessionRegistry>,
    settings: Rc<GeoSessionSettings>,
}

impl GeoSession {
    pub fn new(
        resolver: Arc<LocationResolver>,
        registry: Arc<SessionRegistry>,
        settings: GeoSessionSettings,
    ) -> Self {
        Self {
            resolver,
            registry,
            settings: Rc::new(settings),
        }
    }
}

impl<S, B> Transform<S, ServiceRequest> for GeoSession
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = GeoSessionService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(GeoSessionService {
            service: Rc::new(service),
            resolver: Arc::clone(&self.resolver),
            registry: Arc::clone(&self.registry),
            settings: Rc::clone(&self.settings),
        }))
    }
}

pub struct GeoSessionService<S> {
    service: Rc<S>,
    resolver: Arc<LocationResolver>,
    registry: Arc<SessionRegistry>,
    settings: Rc<GeoSessionSettings>,
}

impl<S, B> Service<ServiceRequest> for GeoSessionService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(
        &self,
        ctx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), Self::Error>> {
        self.service.poll_ready(ctx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let srv = Rc::clone(&self.service);
        let resolver = Arc::clone(&self.resolver);
        let registry = Arc::clone(&self.registry);
        let settings = Rc::clone(&self.settings);

        Box::pin(async move {
            let existing = req
                .cookie(&settings.cookie_name)
                .map(|c| c.value().to_string())
                .and_then(|id| registry.load(&id).map(|session| (id, session)));

            let (session_id, mut session, is_new) = match existing {
                Some((id, session)) => (id, session, false),
                None => (SessionRegistry::new_session_id(), MemorySession::new(), true),
            };

            let client_ip = extract_client_ip(req.request(), &settings.trusted_proxies);
            if let Some(ip) = client_ip.filter(|ip| should_resolve(ip, &settings)) {
                match resolver.resolve_for_ip(&mut session, &ip).await {
                    Ok(Resolution::Resolved { source, info }) => {
                        trace!("Session {} resolved {} via {:?}: {:?}", session_id, ip, source, info);
                    }
                    Ok(Resolution::Skipped(reason)) => {
                        trace!("Session {} skipped {}: {:?}", session_id, ip, reason);
                    }
                    Err(e) => debug!("Session {} location unresolved: {}", session_id, e),
                }
            }

            let record = LocationRecord::read(&session);
            registry.store(&session_id, session);

            // handler 可以通过 web::ReqData<LocationRecord> 获取
            req.extensions_mut().insert(record);
            req.extensions_mut().insert(SessionId(session_id.clone()));

            let mut res = srv.call(req).await?;

            if is_new {
                let mut cookie = Cookie::new(settings.cookie_name.clone(), session_id);
                cookie.set_path("/");
                cookie.set_http_only(true);
                cookie.set_same_site(SameSite::Lax);
                res.response_mut().add_cookie(&cookie)?;
            }

            Ok(res)
        })
    }
}

fn should_resolve(ip: &str, settings: &GeoSessionSettings) -> bool {
    if !settings.skip_private {
        return true;
    }
    match ip.parse::<IpAddr>() {
        Ok(addr) => !is_private_or_local(&addr),
        Err(_) => true,
    }
}
