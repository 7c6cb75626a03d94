use super::models::{HealthReport, ProbeResult};
use super::probes::Probe;
use futures::future::join_all;
use std::collections::HashSet;
use std::sync::Arc;
use tokio::time::timeout;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum HealthError {
    #[error("probe {0:?} is registered more than once")]
    DuplicateProbe(String),
}

pub struct HealthChecker {
    probes: Vec<Arc<dyn Probe>>,
}

impl HealthChecker {
    pub fn new(probes: Vec<Arc<dyn Probe>>) -> Result<Self, HealthError> {
        let mut seen = HashSet::new();
        for probe in &probes {
            if !seen.insert(probe.name().to_string()) {
                return Err(HealthError::DuplicateProbe(probe.name().to_string()));
            }
        }
        Ok(Self { probes })
    }

    /// Runs every probe on its own task and merges the outcomes. A slow or
    /// failing probe never prevents the others from reporting.
    #[tracing::instrument(name = "Check health", skip(self))]
    pub async fn check_all(&self) -> HealthReport {
        let names: Vec<String> = self
            .probes
            .iter()
            .map(|probe| probe.name().to_string())
            .collect();
        let tasks = self.probes.iter().map(|probe| {
            let probe = Arc::clone(probe);
            tokio::spawn(async move { run_probe(probe.as_ref()).await })
        });

        let mut report = HealthReport::new();
        for (name, joined) in names.into_iter().zip(join_all(tasks).await) {
            let result = joined.unwrap_or_else(|err| {
                tracing::error!(probe = %name, "Health probe task failed: {:?}", err);
                ProbeResult::down(name, format!("Probe task failed: {}", err))
            });
            report.add_probe(result);
        }

        if !report.is_healthy() {
            tracing::warn!(failed = ?report.error.keys().collect::<Vec<_>>(), "Health check failed");
        }
        report
    }
}

async fn run_probe(probe: &dyn Probe) -> ProbeResult {
    let name = probe.name().to_string();
    let outcome = match probe.timeout() {
        Some(limit) => match timeout(limit, probe.check()).await {
            Ok(outcome) => outcome,
            Err(_) => {
                tracing::warn!(probe = %name, "Health probe timed out");
                return ProbeResult::down(
                    name,
                    format!("timeout of {}ms exceeded", limit.as_millis()),
                );
            }
        },
        None => probe.check().await,
    };

    match outcome {
        Ok(()) => ProbeResult::up(name),
        Err(err) => ProbeResult::down(name, err.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::health::models::{HealthStatus, ProbeStatus};
    use crate::health::probes::ProbeError;
    use async_trait::async_trait;
    use std::time::Duration;

    enum Behaviour {
        Pass,
        Fail,
        Hang,
        Panic,
    }

    struct StubProbe {
        name: &'static str,
        behaviour: Behaviour,
    }

    #[async_trait]
    impl Probe for StubProbe {
        fn name(&self) -> &str {
            self.name
        }

        fn timeout(&self) -> Option<Duration> {
            Some(Duration::from_millis(50))
        }

        async fn check(&self) -> Result<(), ProbeError> {
            match self.behaviour {
                Behaviour::Pass => Ok(()),
                Behaviour::Fail => Err(ProbeError::Unreachable("connection refused".to_string())),
                Behaviour::Hang => {
                    tokio::time::sleep(Duration::from_secs(60)).await;
                    Ok(())
                }
                Behaviour::Panic => panic!("probe blew up"),
            }
        }
    }

    fn stub(name: &'static str, behaviour: Behaviour) -> Arc<dyn Probe> {
        Arc::new(StubProbe { name, behaviour })
    }

    #[tokio::test]
    async fn all_passing_probes_report_ok() {
        let checker = HealthChecker::new(vec![
            stub("postgres", Behaviour::Pass),
            stub("mongodb", Behaviour::Pass),
        ])
        .unwrap();

        let report = checker.check_all().await;
        assert_eq!(report.status, HealthStatus::Ok);
        assert_eq!(report.details.len(), 2);
        assert!(report.error.is_empty());
    }

    #[tokio::test]
    async fn failures_do_not_short_circuit() {
        let checker = HealthChecker::new(vec![
            stub("postgres", Behaviour::Pass),
            stub("mongodb", Behaviour::Fail),
            stub("storage", Behaviour::Hang),
            stub("memory_heap", Behaviour::Panic),
            stub("memory_rss", Behaviour::Pass),
        ])
        .unwrap();

        let report = checker.check_all().await;
        assert_eq!(report.status, HealthStatus::Error);
        assert_eq!(report.details.len(), 5);
        assert_eq!(report.info.len(), 2);
        assert_eq!(report.error.len(), 3);
        assert_eq!(
            report.error["mongodb"].message.as_deref(),
            Some("connection refused")
        );
        assert_eq!(
            report.error["storage"].message.as_deref(),
            Some("timeout of 50ms exceeded")
        );
        assert_eq!(report.details["memory_heap"].status, ProbeStatus::Down);
    }

    #[test]
    fn duplicate_names_are_rejected() {
        let result = HealthChecker::new(vec![
            stub("postgres", Behaviour::Pass),
            stub("postgres", Behaviour::Fail),
        ]);
        assert_eq!(
            result.err(),
            Some(HealthError::DuplicateProbe("postgres".to_string()))
        );
    }
}
