//! Clients for the two stores the health check pings.
//!
//! Both connect lazily: the service starts even when a store is down, and the
//! health report shows which one.

use crate::configuration::Settings;
use mongodb::options::ClientOptions;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

pub fn postgres_pool(settings: &Settings) -> PgPool {
    let timeout = settings.health.ping_timeout();
    PgPoolOptions::new()
        .max_connections(5)
        .acquire_timeout(timeout)
        .connect_lazy_with(settings.database.connect_options(settings.is_development()))
}

pub async fn mongo_client(settings: &Settings) -> mongodb::error::Result<mongodb::Client> {
    let timeout = settings.health.ping_timeout();
    let mut options = ClientOptions::parse(settings.mongo.connection_string()).await?;
    options.app_name = Some(settings.telemetry.service_name.clone());
    options.connect_timeout = Some(timeout);
    options.server_selection_timeout = Some(timeout);

    mongodb::Client::with_options(options)
}
