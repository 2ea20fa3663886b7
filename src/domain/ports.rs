use crate::domain::model::{ServiceGraph, ServiceKind};
use crate::utils::error::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;

/// Where a launched service can be reached.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServiceEndpoint {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize)]
pub struct LaunchedService {
    pub name: String,
    pub kind: ServiceKind,
    pub endpoint: ServiceEndpoint,
    pub environment: BTreeMap<String, String>,
    pub external_url: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub started_at: DateTime<Utc>,
    /// Service names grouped by startup wave.
    pub waves: Vec<Vec<String>>,
    pub services: Vec<LaunchedService>,
    /// Teardown order; empty when the runtime did not wait for shutdown.
    pub stopped: Vec<String>,
}

impl RunSummary {
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn service(&self, name: &str) -> Option<&LaunchedService> {
        self.services.iter().find(|s| s.name == name)
    }
}

/// Executes a declared graph. Implementations own the services' lifecycle.
#[async_trait]
pub trait Runtime: Send + Sync {
    async fn run(&self, graph: &ServiceGraph) -> Result<RunSummary>;
}
