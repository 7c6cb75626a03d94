#![allow(dead_code)]

use async_trait::async_trait;
use loadprobe::configuration::{get_configuration, Settings};
use loadprobe::health::{self, HealthChecker, Probe, ProbeError};
use loadprobe::helpers;
use loadprobe::metrics::LoadMetrics;
use std::sync::Arc;

pub struct TestApp {
    pub address: String,
}

/// Probe with a fixed outcome, standing in for a dependency the test does not
/// care about.
pub struct FixedProbe {
    pub name: &'static str,
    pub healthy: bool,
}

#[async_trait]
impl Probe for FixedProbe {
    fn name(&self) -> &str {
        self.name
    }

    async fn check(&self) -> Result<(), ProbeError> {
        if self.healthy {
            Ok(())
        } else {
            Err(ProbeError::Unavailable(format!("{} is down", self.name)))
        }
    }
}

pub fn fixed(name: &'static str, healthy: bool) -> Arc<dyn Probe> {
    Arc::new(FixedProbe { name, healthy })
}

/// Settings whose stores point at a closed local port.
pub fn unreachable_settings() -> Settings {
    let mut configuration = get_configuration().expect("Failed to get configuration");
    configuration.database.host = "127.0.0.1".to_string();
    configuration.database.port = 1;
    configuration.mongo.nodes = "127.0.0.1:1".to_string();
    configuration.mongo.replica_set = String::new();
    configuration.health.ping_timeout_ms = 1000;
    configuration
}

pub fn spawn_app_with_probes(probes: Vec<Arc<dyn Probe>>) -> TestApp {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("Failed to bind random port");
    let port = listener.local_addr().unwrap().port();
    let address = format!("http://127.0.0.1:{}", port);

    let health_checker = HealthChecker::new(probes).expect("Failed to build health checker");
    let metrics = LoadMetrics::new().expect("Failed to build metrics");

    let server = loadprobe::startup::run(listener, health_checker, metrics)
        .expect("Failed to bind address.");
    let _ = tokio::spawn(server);

    TestApp { address }
}

/// The production probe set, with both stores unreachable.
pub async fn spawn_app() -> TestApp {
    let configuration = unreachable_settings();
    let pg_pool = helpers::postgres_pool(&configuration);
    let mongo_client = helpers::mongo_client(&configuration)
        .await
        .expect("Failed to build mongo client");

    spawn_app_with_probes(health::standard_probes(
        pg_pool,
        mongo_client,
        &configuration,
    ))
}
