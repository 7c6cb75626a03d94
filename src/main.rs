use loadprobe::configuration::get_configuration;
use loadprobe::health::{self, HealthChecker};
use loadprobe::helpers;
use loadprobe::metrics::LoadMetrics;
use loadprobe::startup::run;
use loadprobe::telemetry::{get_subscriber, init_subscriber, init_tracer};
use std::net::TcpListener;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    let settings = get_configuration().expect("Failed to read configuration.");

    let telemetry = match init_tracer(&settings.telemetry) {
        Ok(handle) => handle,
        Err(err) => {
            init_subscriber(get_subscriber("loadprobe".into(), "info".into(), None));
            tracing::error!("Error starting OpenTelemetry SDK: {}", err);
            std::process::exit(1);
        }
    };
    init_subscriber(get_subscriber(
        "loadprobe".into(),
        "info".into(),
        Some(telemetry.tracer()),
    ));
    tracing::info!(
        service_name = %settings.telemetry.service_name,
        endpoint = %settings.telemetry.traces_endpoint,
        "OpenTelemetry SDK started successfully."
    );

    tracing::info!(
        db_host = %settings.database.host,
        db_port = settings.database.port,
        db_name = %settings.database.database_name,
        mongo_nodes = %settings.mongo.nodes,
        "Preparing store clients"
    );
    let pg_pool = helpers::postgres_pool(&settings);
    let mongo_client = helpers::mongo_client(&settings)
        .await
        .map_err(|err| std::io::Error::new(std::io::ErrorKind::InvalidInput, err))?;

    let probes = health::standard_probes(pg_pool, mongo_client, &settings);
    let health_checker = HealthChecker::new(probes)
        .map_err(|err| std::io::Error::new(std::io::ErrorKind::InvalidInput, err))?;
    let metrics = LoadMetrics::new()
        .map_err(|err| std::io::Error::new(std::io::ErrorKind::Other, err))?;

    let address = format!("{}:{}", settings.app_host, settings.app_port);
    tracing::info!("Start server at {:?}", &address);
    let listener = TcpListener::bind(&address)?;

    // Resolves once SIGINT or SIGTERM has drained the workers.
    let served = run(listener, health_checker, metrics)?.await;

    telemetry.shutdown().await;
    served
}
