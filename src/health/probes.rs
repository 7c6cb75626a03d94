use async_trait::async_trait;
use mongodb::bson::doc;
use sqlx::PgPool;
use std::path::{Path, PathBuf};
use std::time::Duration;
use sysinfo::{Disks, ProcessRefreshKind, ProcessesToUpdate, System};

#[derive(Debug, thiserror::Error)]
pub enum ProbeError {
    #[error("{0}")]
    Unreachable(String),
    #[error("{0}")]
    ThresholdExceeded(String),
    #[error("{0}")]
    Unavailable(String),
}

/// One independent check contributing a named entry to the health report.
#[async_trait]
pub trait Probe: Send + Sync {
    fn name(&self) -> &str;

    /// Upper bound enforced by the caller. `None` runs the check unbounded.
    fn timeout(&self) -> Option<Duration> {
        None
    }

    async fn check(&self) -> Result<(), ProbeError>;
}

pub struct PostgresProbe {
    pool: PgPool,
    timeout: Duration,
}

impl PostgresProbe {
    pub fn new(pool: PgPool, timeout: Duration) -> Self {
        Self { pool, timeout }
    }
}

#[async_trait]
impl Probe for PostgresProbe {
    fn name(&self) -> &str {
        "postgres"
    }

    fn timeout(&self) -> Option<Duration> {
        Some(self.timeout)
    }

    #[tracing::instrument(name = "Ping postgres", skip(self))]
    async fn check(&self) -> Result<(), ProbeError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map(|_| ())
            .map_err(|err| {
                tracing::error!("Postgres health check failed: {:?}", err);
                ProbeError::Unreachable(err.to_string())
            })
    }
}

pub struct MongoProbe {
    client: mongodb::Client,
    database: String,
    timeout: Duration,
}

impl MongoProbe {
    pub fn new(client: mongodb::Client, database: String, timeout: Duration) -> Self {
        Self {
            client,
            database,
            timeout,
        }
    }
}

#[async_trait]
impl Probe for MongoProbe {
    fn name(&self) -> &str {
        "mongodb"
    }

    fn timeout(&self) -> Option<Duration> {
        Some(self.timeout)
    }

    #[tracing::instrument(name = "Ping mongodb", skip(self))]
    async fn check(&self) -> Result<(), ProbeError> {
        self.client
            .database(&self.database)
            .run_command(doc! { "ping": 1 }, None)
            .await
            .map(|_| ())
            .map_err(|err| {
                tracing::error!("MongoDB health check failed: {:?}", err);
                ProbeError::Unreachable(err.to_string())
            })
    }
}

/// Fails when the used share of the filesystem holding `path` exceeds
/// `threshold_percent` (0.0 to 1.0).
pub struct DiskProbe {
    path: PathBuf,
    threshold_percent: f64,
}

impl DiskProbe {
    /// Relative paths are resolved against the working directory, since mount
    /// points are always absolute.
    pub fn new(path: impl Into<PathBuf>, threshold_percent: f64) -> Self {
        let path = path.into();
        let path = std::fs::canonicalize(&path)
            .or_else(|_| std::path::absolute(&path))
            .unwrap_or(path);
        Self {
            path,
            threshold_percent,
        }
    }
}

#[async_trait]
impl Probe for DiskProbe {
    fn name(&self) -> &str {
        "storage"
    }

    #[tracing::instrument(name = "Check disk storage", skip(self))]
    async fn check(&self) -> Result<(), ProbeError> {
        let path = self.path.clone();
        let usage = tokio::task::spawn_blocking(move || disk_usage(&path))
            .await
            .map_err(|err| ProbeError::Unavailable(err.to_string()))?
            .ok_or_else(|| {
                ProbeError::Unavailable(format!(
                    "No filesystem found for {}",
                    self.path.display()
                ))
            })?;

        if usage.used_ratio() > self.threshold_percent {
            return Err(ProbeError::ThresholdExceeded(
                "Used disk storage exceeded the set threshold".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DiskUsage {
    pub total_bytes: u64,
    pub available_bytes: u64,
}

impl DiskUsage {
    pub fn used_ratio(&self) -> f64 {
        if self.total_bytes == 0 {
            return 1.0;
        }
        let used = self.total_bytes.saturating_sub(self.available_bytes);
        used as f64 / self.total_bytes as f64
    }
}

/// Usage of the mount with the longest mount point that contains `path`.
fn disk_usage(path: &Path) -> Option<DiskUsage> {
    let disks = Disks::new_with_refreshed_list();
    disks
        .list()
        .iter()
        .filter(|disk| path.starts_with(disk.mount_point()))
        .max_by_key(|disk| disk.mount_point().components().count())
        .map(|disk| DiskUsage {
            total_bytes: disk.total_space(),
            available_bytes: disk.available_space(),
        })
}

/// Size of the process data segment (`VmData`): heap, arenas and anonymous
/// private mappings.
pub struct HeapProbe {
    threshold_bytes: u64,
}

impl HeapProbe {
    pub fn new(threshold_bytes: u64) -> Self {
        Self { threshold_bytes }
    }
}

#[async_trait]
impl Probe for HeapProbe {
    fn name(&self) -> &str {
        "memory_heap"
    }

    #[tracing::instrument(name = "Check heap memory", skip(self))]
    async fn check(&self) -> Result<(), ProbeError> {
        let heap = tokio::task::spawn_blocking(data_segment_bytes)
            .await
            .map_err(|err| ProbeError::Unavailable(err.to_string()))?
            .ok_or_else(|| ProbeError::Unavailable("Heap size is unavailable".to_string()))?;

        if heap > self.threshold_bytes {
            return Err(ProbeError::ThresholdExceeded(
                "Used heap exceeded the set threshold".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(target_os = "linux")]
fn data_segment_bytes() -> Option<u64> {
    let status = std::fs::read_to_string("/proc/self/status").ok()?;
    parse_vm_data(&status)
}

#[cfg(not(target_os = "linux"))]
fn data_segment_bytes() -> Option<u64> {
    None
}

/// Reads the `VmData:` line of a `/proc/<pid>/status` document, in bytes.
fn parse_vm_data(status: &str) -> Option<u64> {
    let line = status.lines().find(|line| line.starts_with("VmData:"))?;
    let mut fields = line["VmData:".len()..].split_whitespace();
    let value: u64 = fields.next()?.parse().ok()?;
    match fields.next() {
        Some("kB") | None => Some(value * 1024),
        Some(_) => None,
    }
}

pub struct RssProbe {
    threshold_bytes: u64,
}

impl RssProbe {
    pub fn new(threshold_bytes: u64) -> Self {
        Self { threshold_bytes }
    }
}

#[async_trait]
impl Probe for RssProbe {
    fn name(&self) -> &str {
        "memory_rss"
    }

    #[tracing::instrument(name = "Check resident memory", skip(self))]
    async fn check(&self) -> Result<(), ProbeError> {
        let rss = tokio::task::spawn_blocking(resident_set_bytes)
            .await
            .map_err(|err| ProbeError::Unavailable(err.to_string()))?
            .ok_or_else(|| {
                ProbeError::Unavailable("Resident set size is unavailable".to_string())
            })?;

        if rss > self.threshold_bytes {
            return Err(ProbeError::ThresholdExceeded(
                "Used rss exceeded the set threshold".to_string(),
            ));
        }
        Ok(())
    }
}

fn resident_set_bytes() -> Option<u64> {
    let pid = sysinfo::get_current_pid().ok()?;
    let mut system = System::new();
    system.refresh_processes_specifics(
        ProcessesToUpdate::Some(&[pid]),
        false,
        ProcessRefreshKind::new().with_memory(),
    );
    system.process(pid).map(|process| process.memory())
}
