use crate::load::{self, LoadError, LoadResult, DEFAULT_N};
use crate::metrics::LoadMetrics;
use actix_web::{get, web, Result};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct CpuLoadQuery {
    n: Option<i64>,
}

impl CpuLoadQuery {
    pub fn n(&self) -> i64 {
        self.n.unwrap_or(DEFAULT_N)
    }
}

#[tracing::instrument(name = "Simulate CPU load.", skip(metrics))]
#[get("/cpu-load")]
pub async fn cpu_load_handler(
    query: web::Query<CpuLoadQuery>,
    metrics: web::Data<LoadMetrics>,
) -> Result<web::Json<LoadResult>, LoadError> {
    load::simulate(query.n(), metrics.get_ref()).map(web::Json)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_n_defaults_to_35() {
        let query: CpuLoadQuery = serde_json::from_str("{}").unwrap();
        assert_eq!(query.n(), 35);

        let query: CpuLoadQuery = serde_json::from_str(r#"{"n": 12}"#).unwrap();
        assert_eq!(query.n(), 12);
    }
}
