use actix_web::{HttpResponse, Responder, web};
use tracing::trace;

use crate::session::LocationRecord;

/// Location Service
///
/// 只读取中间件已经写入 request extensions 的会话位置，不触发查询。
pub struct LocationService;

impl LocationService {
    pub async fn current_location(record: Option<web::ReqData<LocationRecord>>) -> impl Responder {
        let record = record.map(|r| r.into_inner()).unwrap_or_default();
        trace!("Serving session location: {:?}", record);
        HttpResponse::Ok().json(record)
    }
}
