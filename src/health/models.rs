use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const GREETING: &str = "Hello, world";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ProbeStatus {
    Up,
    Down,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Ok,
    Error,
}

/// Outcome of one probe as it appears in the report maps.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProbeDetail {
    pub status: ProbeStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProbeResult {
    pub name: String,
    pub detail: ProbeDetail,
}

impl ProbeResult {
    pub fn up(name: String) -> Self {
        Self {
            name,
            detail: ProbeDetail {
                status: ProbeStatus::Up,
                message: None,
            },
        }
    }

    pub fn down(name: String, message: String) -> Self {
        Self {
            name,
            detail: ProbeDetail {
                status: ProbeStatus::Down,
                message: Some(message),
            },
        }
    }

    pub fn is_up(&self) -> bool {
        self.detail.status == ProbeStatus::Up
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthReport {
    pub message: String,
    pub status: HealthStatus,
    pub info: BTreeMap<String, ProbeDetail>,
    pub error: BTreeMap<String, ProbeDetail>,
    pub details: BTreeMap<String, ProbeDetail>,
}

impl HealthReport {
    pub fn new() -> Self {
        Self {
            message: GREETING.to_string(),
            status: HealthStatus::Ok,
            info: BTreeMap::new(),
            error: BTreeMap::new(),
            details: BTreeMap::new(),
        }
    }

    pub fn add_probe(&mut self, result: ProbeResult) {
        if result.is_up() {
            self.info.insert(result.name.clone(), result.detail.clone());
        } else {
            self.status = HealthStatus::Error;
            self.error.insert(result.name.clone(), result.detail.clone());
        }
        self.details.insert(result.name, result.detail);
    }

    pub fn is_healthy(&self) -> bool {
        self.status == HealthStatus::Ok
    }
}

impl Default for HealthReport {
    fn default() -> Self {
        Self::new()
    }
}
