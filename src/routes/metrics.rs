use crate::metrics::LoadMetrics;
use actix_web::{get, web, HttpResponse};

#[get("/metrics")]
pub async fn metrics_handler(metrics: web::Data<LoadMetrics>) -> HttpResponse {
    match metrics.render() {
        Ok(body) => HttpResponse::Ok()
            .content_type(prometheus::TEXT_FORMAT)
            .body(body),
        Err(err) => {
            tracing::error!("Failed to encode metrics: {:?}", err);
            HttpResponse::InternalServerError().finish()
        }
    }
}
