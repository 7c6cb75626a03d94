use crate::health::HealthChecker;
use crate::metrics::LoadMetrics;
use crate::routes;
use actix_web::{dev::Server, error, web, App, HttpResponse, HttpServer};
use serde_json::json;
use std::net::TcpListener;
use tracing_actix_web::TracingLogger;

pub fn run(
    listener: TcpListener,
    health_checker: HealthChecker,
    metrics: LoadMetrics,
) -> Result<Server, std::io::Error> {
    let health_checker = web::Data::new(health_checker);
    let metrics = web::Data::new(metrics);

    let query_config = web::QueryConfig::default().error_handler(|err, _req| {
        let response = HttpResponse::BadRequest().json(json!({
            "statusCode": 400,
            "message": err.to_string(),
            "error": "Bad Request",
        }));
        error::InternalError::from_response(err, response).into()
    });

    let server = HttpServer::new(move || {
        App::new()
            .wrap(TracingLogger::default())
            .app_data(query_config.clone())
            .app_data(health_checker.clone())
            .app_data(metrics.clone())
            .service(routes::health_check)
            .service(routes::cpu_load_handler)
            .service(routes::metrics_handler)
    })
    .listen(listener)?
    .run();

    Ok(server)
}
