mod checks;
mod models;
mod probes;

pub use checks::{HealthChecker, HealthError};
pub use models::{HealthReport, HealthStatus, ProbeDetail, ProbeResult, ProbeStatus, GREETING};
pub use probes::{
    DiskProbe, DiskUsage, HeapProbe, MongoProbe, PostgresProbe, Probe, ProbeError, RssProbe,
};

use crate::configuration::Settings;
use sqlx::PgPool;
use std::sync::Arc;

/// The five probes behind `GET /`.
pub fn standard_probes(
    pg_pool: PgPool,
    mongo_client: mongodb::Client,
    settings: &Settings,
) -> Vec<Arc<dyn Probe>> {
    let health = &settings.health;
    vec![
        Arc::new(PostgresProbe::new(pg_pool, health.ping_timeout())),
        Arc::new(MongoProbe::new(
            mongo_client,
            settings.mongo.database_name.clone(),
            health.ping_timeout(),
        )),
        Arc::new(DiskProbe::new(
            health.disk_path.as_str(),
            health.disk_threshold_percent,
        )),
        Arc::new(HeapProbe::new(health.heap_threshold_bytes)),
        Arc::new(RssProbe::new(health.rss_threshold_bytes)),
    ]
}
