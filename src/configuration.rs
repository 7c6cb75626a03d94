use serde;
use sqlx::postgres::{PgConnectOptions, PgSslMode};
use sqlx::ConnectOptions;
use std::time::Duration;

#[derive(Debug, Clone, serde::Deserialize)]
pub struct Settings {
    pub app_port: u16,
    pub app_host: String,
    pub environment: String,
    pub database: DatabaseSettings,
    pub mongo: MongoSettings,
    pub telemetry: TelemetrySettings,
    pub health: HealthSettings,
}

#[derive(Debug, Clone, serde::Deserialize)]
pub struct DatabaseSettings {
    pub username: String,
    pub password: String,
    pub host: String,
    pub port: u16,
    pub database_name: String,
}

#[derive(Debug, Clone, serde::Deserialize)]
pub struct MongoSettings {
    /// Comma separated `host:port` list, e.g. `mongo1:27017,mongo2:27017`
    pub nodes: String,
    pub database_name: String,
    pub replica_set: String,
}

#[derive(Debug, Clone, serde::Deserialize)]
pub struct TelemetrySettings {
    pub service_name: String,
    pub traces_endpoint: String,
}

#[derive(Debug, Clone, serde::Deserialize)]
pub struct HealthSettings {
    pub ping_timeout_ms: u64,
    pub disk_path: String,
    pub disk_threshold_percent: f64,
    pub heap_threshold_bytes: u64,
    pub rss_threshold_bytes: u64,
}

impl Settings {
    /// SQL statements are logged only in development.
    pub fn is_development(&self) -> bool {
        self.environment.eq_ignore_ascii_case("development")
    }
}

impl DatabaseSettings {
    pub fn connect_options(&self, log_statements: bool) -> PgConnectOptions {
        let options = PgConnectOptions::new()
            .host(&self.host)
            .port(self.port)
            .username(&self.username)
            .password(&self.password)
            .database(&self.database_name)
            .ssl_mode(PgSslMode::Disable);

        if log_statements {
            options
        } else {
            options.disable_statement_logging()
        }
    }
}

impl MongoSettings {
    // Connection string: mongodb://<nodes>/<database_name>?replicaSet=<replica_set>&readPreference=secondaryPreferred
    pub fn connection_string(&self) -> String {
        let mut uri = format!("mongodb://{}/{}?", self.nodes, self.database_name);
        if !self.replica_set.is_empty() {
            uri.push_str(&format!("replicaSet={}&", self.replica_set));
        }
        uri.push_str("readPreference=secondaryPreferred");
        uri
    }
}

impl HealthSettings {
    pub fn ping_timeout(&self) -> Duration {
        Duration::from_millis(self.ping_timeout_ms)
    }
}

const MIB: i64 = 1024 * 1024;

pub fn get_configuration() -> Result<Settings, config::ConfigError> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    let env = |key: &str| std::env::var(key).ok();

    config::Config::builder()
        .set_default("app_host", "127.0.0.1")?
        .set_default("app_port", 3000)?
        .set_default("environment", "production")?
        .set_default("database.host", "localhost")?
        .set_default("database.port", 5432)?
        .set_default("database.username", "postgres")?
        .set_default("database.password", "postgres")?
        .set_default("database.database_name", "postgres")?
        .set_default("mongo.nodes", "localhost:27017")?
        .set_default("mongo.database_name", "test")?
        .set_default("mongo.replica_set", "")?
        .set_default("telemetry.service_name", "loadprobe")?
        .set_default("telemetry.traces_endpoint", "http://localhost:4318/v1/traces")?
        .set_default("health.ping_timeout_ms", 3000)?
        .set_default("health.disk_path", "/")?
        .set_default("health.disk_threshold_percent", 0.5)?
        .set_default("health.heap_threshold_bytes", 150 * MIB)?
        .set_default("health.rss_threshold_bytes", 150 * MIB)?
        // .json, .toml, .yaml, .yml
        .add_source(config::File::with_name("configuration").required(false))
        .set_override_option("app_host", env("APP_HOST"))?
        .set_override_option("app_port", env("APP_PORT"))?
        .set_override_option("environment", env("APP_ENVIRONMENT"))?
        .set_override_option("database.host", env("POSTGRES_HOST"))?
        .set_override_option("database.port", env("POSTGRES_PORT"))?
        .set_override_option("database.username", env("POSTGRES_USER"))?
        .set_override_option("database.password", env("POSTGRES_PASSWORD"))?
        .set_override_option("database.database_name", env("POSTGRES_DB"))?
        .set_override_option("mongo.nodes", env("MONGO_REPLICA_URI_NODES"))?
        .set_override_option("mongo.database_name", env("MONGO_DB_NAME"))?
        .set_override_option("mongo.replica_set", env("MONGO_REPLICA_SET_NAME"))?
        .set_override_option("telemetry.service_name", env("OTEL_SERVICE_NAME"))?
        .set_override_option(
            "telemetry.traces_endpoint",
            env("OTEL_EXPORTER_OTLP_TRACES_ENDPOINT"),
        )?
        .build()?
        .try_deserialize()
}
