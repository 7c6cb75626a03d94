pub mod configuration;
pub mod health;
pub mod helpers;
pub mod load;
pub mod metrics;
pub mod routes;
pub mod startup;
pub mod telemetry;
