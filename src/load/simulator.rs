use super::fibonacci::{fibonacci, FibonacciError};
use crate::metrics::LoadMetrics;
use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};
use serde::Serialize;
use serde_json::json;
use std::time::Instant;

pub const DEFAULT_N: i64 = 35;
pub const MAX_N: i64 = 45;

#[derive(Debug, Serialize)]
pub struct LoadResult {
    pub message: String,
    /// Decimal digits, so no precision is lost in JSON.
    pub result: String,
    pub duration_seconds: f64,
}

#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("{0}")]
    InvalidInput(String),
    #[error("fibonacci({n}) failed: {source}")]
    Calculation { n: u32, source: FibonacciError },
}

impl ResponseError for LoadError {
    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        let message = match self {
            Self::InvalidInput(msg) => msg.as_str(),
            Self::Calculation { .. } => {
                "Calculation failed due to recursion depth or other error."
            }
        };

        HttpResponse::build(status).json(json!({
            "statusCode": status.as_u16(),
            "message": message,
            "error": status.canonical_reason().unwrap_or("Error"),
        }))
    }

    fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidInput(_) => StatusCode::BAD_REQUEST,
            Self::Calculation { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

pub fn validate(n: i64) -> Result<u32, LoadError> {
    if n <= 0 {
        return Err(LoadError::InvalidInput(
            "Query parameter \"n\" must be a positive integer.".to_string(),
        ));
    }
    if n > MAX_N {
        return Err(LoadError::InvalidInput(format!(
            "\"n\" is too large and may cause excessive load or timeout (max recommended: {}).",
            MAX_N
        )));
    }
    // 1..=MAX_N always fits
    Ok(n as u32)
}

/// Runs one CPU-bound fibonacci computation and records it.
///
/// Every call counts as a request, rejected ones included. Only completed
/// computations are observed into the duration histogram.
pub fn simulate(n: i64, metrics: &LoadMetrics) -> Result<LoadResult, LoadError> {
    metrics.record_request();
    tracing::info!("Starting CPU-intensive task with n = {}...", n);

    let n = validate(n)?;

    let start = Instant::now();
    let result = fibonacci(n).map_err(|source| {
        tracing::error!(n, error = %source, "Error during Fibonacci calculation");
        LoadError::Calculation { n, source }
    })?;
    let duration = start.elapsed().as_secs_f64();
    metrics.observe_duration(duration);

    tracing::info!(
        n,
        duration_seconds = duration,
        "Finished CPU-intensive task with n = {}. Result: {}, Duration: {}s",
        n,
        result,
        duration
    );

    Ok(LoadResult {
        message: format!("CPU-intensive task completed for n = {}", n),
        result: result.to_string(),
        duration_seconds: duration,
    })
}
