use crate::health::HealthChecker;
use actix_web::{get, web, HttpResponse};

/// Composite health report. Degraded dependencies still answer 200; the body
/// says which probe failed.
#[tracing::instrument(name = "Health check.", skip(checker))]
#[get("/")]
pub async fn health_check(checker: web::Data<HealthChecker>) -> HttpResponse {
    let report = checker.check_all().await;
    HttpResponse::Ok().json(report)
}
