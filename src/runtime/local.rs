use crate::core::environment::{connection_environment, http_url};
use crate::domain::model::{ServiceGraph, ServiceKind};
use crate::domain::ports::{LaunchedService, RunSummary, Runtime, ServiceEndpoint};
use crate::runtime::plan::StartupPlan;
use crate::utils::error::{AppHostError, Result};
use crate::utils::validation::{validate_host, validate_range, Validate};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::{HashMap, HashSet};
use std::future::Future;

pub const DEFAULT_CACHE_PORT: u16 = 6379;
pub const DEFAULT_BASE_PORT: u16 = 5000;

#[derive(Debug, Clone)]
pub struct RuntimeOptions {
    pub host: String,
    /// First port handed to projects without a fixed port.
    pub base_port: u16,
    /// Block until Ctrl-C once everything has been launched.
    pub wait_for_shutdown: bool,
}

impl Default for RuntimeOptions {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            base_port: DEFAULT_BASE_PORT,
            wait_for_shutdown: false,
        }
    }
}

impl Validate for RuntimeOptions {
    fn validate(&self) -> Result<()> {
        validate_host("host", &self.host)?;
        validate_range("base_port", self.base_port, 1, u16::MAX)
    }
}

/// Local stand-in for an orchestration host: resolves startup order and
/// connection info and reports what it would launch.
#[derive(Debug, Clone, Default)]
pub struct LocalRuntime {
    options: RuntimeOptions,
}

impl LocalRuntime {
    pub fn new(options: RuntimeOptions) -> Self {
        Self { options }
    }

    /// Fixed ports are reserved first and must be unique. Caches then take the
    /// first free port from the well-known one, projects the first free port
    /// from `base_port`, in registration order.
    pub fn allocate_endpoints(&self, graph: &ServiceGraph) -> Result<HashMap<String, ServiceEndpoint>> {
        let mut used: HashSet<u16> = HashSet::new();
        for node in graph.nodes() {
            if let Some(port) = node.options.port {
                if !used.insert(port) {
                    return Err(AppHostError::ConfigError {
                        message: format!("Port {} is fixed by more than one service (again by '{}')", port, node.name),
                    });
                }
            }
        }

        let mut endpoints = HashMap::new();
        let mut next_cache_port = Some(DEFAULT_CACHE_PORT);
        let mut next_project_port = Some(self.options.base_port);

        for node in graph.nodes() {
            let port = match (node.options.port, node.kind) {
                (Some(port), _) => port,
                (None, ServiceKind::Cache) => next_free_port(&mut next_cache_port, &mut used, &node.name)?,
                (None, _) => next_free_port(&mut next_project_port, &mut used, &node.name)?,
            };

            endpoints.insert(
                node.name.clone(),
                ServiceEndpoint {
                    host: self.options.host.clone(),
                    port,
                },
            );
        }

        Ok(endpoints)
    }

    /// Launches `graph`; when waiting for shutdown, teardown starts once
    /// `shutdown` resolves.
    pub async fn run_until<F>(&self, graph: &ServiceGraph, shutdown: F) -> Result<RunSummary>
    where
        F: Future<Output = std::io::Result<()>> + Send,
    {
        let started_at = Utc::now();
        let plan = StartupPlan::resolve(graph)?;
        let endpoints = self.allocate_endpoints(graph)?;

        let mut services = Vec::with_capacity(graph.len());
        for (wave_number, wave) in plan.waves().iter().enumerate() {
            tracing::info!("Startup wave {}: {}", wave_number + 1, wave.join(", "));

            for name in wave {
                let node = graph.node(name).ok_or_else(|| AppHostError::UnknownNode {
                    name: name.clone(),
                })?;
                let environment = connection_environment(graph, name, &endpoints)?;
                let endpoint = endpoints
                    .get(name)
                    .cloned()
                    .ok_or_else(|| AppHostError::ConfigError {
                        message: format!("No endpoint allocated for '{}'", name),
                    })?;

                let external_url = (node.is_externally_reachable() && node.kind.is_project())
                    .then(|| http_url(&endpoint));

                tracing::info!(
                    "▶ {} ({}) on {}:{}",
                    name,
                    node.kind,
                    endpoint.host,
                    endpoint.port
                );
                for (key, value) in &environment {
                    tracing::debug!("  {}={}", key, value);
                }
                if let Some(url) = &external_url {
                    tracing::info!("  external endpoint: {}", url);
                }

                services.push(LaunchedService {
                    name: name.clone(),
                    kind: node.kind,
                    endpoint,
                    environment,
                    external_url,
                });
            }
        }

        let mut stopped = Vec::new();
        if self.options.wait_for_shutdown {
            tracing::info!("All services launched; press Ctrl-C to shut down");
            shutdown.await?;
            for service in services.iter().rev() {
                tracing::info!("■ stopping {}", service.name);
                stopped.push(service.name.clone());
            }
        }

        Ok(RunSummary {
            started_at,
            waves: plan.into_waves(),
            services,
            stopped,
        })
    }
}

fn next_free_port(next: &mut Option<u16>, used: &mut HashSet<u16>, name: &str) -> Result<u16> {
    loop {
        let port = next.ok_or_else(|| AppHostError::ConfigError {
            message: format!("No port left to allocate for '{}'", name),
        })?;
        *next = port.checked_add(1);
        if used.insert(port) {
            return Ok(port);
        }
    }
}

#[async_trait]
impl Runtime for LocalRuntime {
    async fn run(&self, graph: &ServiceGraph) -> Result<RunSummary> {
        self.run_until(graph, tokio::signal::ctrl_c()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::builder::ServiceGraphBuilder;
    use crate::domain::model::NodeOptions;

    #[test]
    fn test_port_allocation() {
        let mut builder = ServiceGraphBuilder::new();
        builder
            .add_node("cache", ServiceKind::Cache, NodeOptions::default())
            .unwrap();
        builder
            .add_node("api", ServiceKind::Backend, NodeOptions::default())
            .unwrap();
        builder
            .add_node("admin", ServiceKind::Backend, NodeOptions::default().with_port(9000))
            .unwrap();
        builder
            .add_node("web", ServiceKind::Frontend, NodeOptions::default())
            .unwrap();

        let runtime = LocalRuntime::new(RuntimeOptions {
            base_port: 7000,
            ..RuntimeOptions::default()
        });
        let endpoints = runtime.allocate_endpoints(&builder.build()).unwrap();

        assert_eq!(endpoints["cache"].port, 6379);
        assert_eq!(endpoints["api"].port, 7000);
        assert_eq!(endpoints["admin"].port, 9000);
        assert_eq!(endpoints["web"].port, 7001);
        assert_eq!(endpoints["web"].host, "localhost");
    }

    #[test]
    fn test_ports_never_collide() {
        let mut builder = ServiceGraphBuilder::new();
        builder
            .add_node("cache", ServiceKind::Cache, NodeOptions::default())
            .unwrap();
        builder
            .add_node("sessions", ServiceKind::Cache, NodeOptions::default())
            .unwrap();
        builder
            .add_node("api", ServiceKind::Backend, NodeOptions::default())
            .unwrap();
        builder
            .add_node("admin", ServiceKind::Backend, NodeOptions::default().with_port(5000))
            .unwrap();

        let endpoints = LocalRuntime::default()
            .allocate_endpoints(&builder.build())
            .unwrap();

        assert_eq!(endpoints["cache"].port, 6379);
        assert_eq!(endpoints["sessions"].port, 6380);
        assert_eq!(endpoints["admin"].port, 5000);
        assert_eq!(endpoints["api"].port, 5001);
    }

    #[test]
    fn test_duplicate_fixed_ports_are_rejected() {
        let mut builder = ServiceGraphBuilder::new();
        builder
            .add_node("api", ServiceKind::Backend, NodeOptions::default().with_port(8080))
            .unwrap();
        builder
            .add_node("web", ServiceKind::Frontend, NodeOptions::default().with_port(8080))
            .unwrap();

        let result = LocalRuntime::default().allocate_endpoints(&builder.build());
        assert!(matches!(result, Err(AppHostError::ConfigError { .. })));
    }

    #[test]
    fn test_running_out_of_ports() {
        let mut builder = ServiceGraphBuilder::new();
        builder
            .add_node("api", ServiceKind::Backend, NodeOptions::default())
            .unwrap();
        builder
            .add_node("web", ServiceKind::Frontend, NodeOptions::default())
            .unwrap();

        let runtime = LocalRuntime::new(RuntimeOptions {
            base_port: u16::MAX,
            ..RuntimeOptions::default()
        });
        let result = runtime.allocate_endpoints(&builder.build());
        assert!(matches!(result, Err(AppHostError::ConfigError { ref message }) if message.contains("web")));
    }

    #[tokio::test]
    async fn test_teardown_runs_in_reverse_startup_order() {
        let mut builder = ServiceGraphBuilder::new();
        builder
            .add_node("web", ServiceKind::Frontend, NodeOptions::default())
            .unwrap();
        builder
            .add_node("cache", ServiceKind::Cache, NodeOptions::default())
            .unwrap();
        builder.add_readiness_dependency("web", "cache").unwrap();

        let runtime = LocalRuntime::new(RuntimeOptions {
            wait_for_shutdown: true,
            ..RuntimeOptions::default()
        });
        let summary = runtime
            .run_until(&builder.build(), std::future::ready(Ok(())))
            .await
            .unwrap();

        assert_eq!(summary.waves, vec![vec!["cache"], vec!["web"]]);
        assert_eq!(summary.stopped, vec!["web", "cache"]);
    }

    #[tokio::test]
    async fn test_dry_run_skips_shutdown() {
        let mut builder = ServiceGraphBuilder::new();
        builder
            .add_node("cache", ServiceKind::Cache, NodeOptions::default())
            .unwrap();

        // Never resolves, so awaiting it would hang the test.
        let summary = LocalRuntime::default()
            .run_until(&builder.build(), std::future::pending())
            .await
            .unwrap();

        assert_eq!(summary.services.len(), 1);
        assert!(summary.stopped.is_empty());
    }

    #[test]
    fn test_options_validation() {
        assert!(RuntimeOptions::default().validate().is_ok());

        let bad_host = RuntimeOptions {
            host: "localhost:80/x".to_string(),
            ..RuntimeOptions::default()
        };
        assert!(bad_host.validate().is_err());

        let bad_port = RuntimeOptions {
            base_port: 0,
            ..RuntimeOptions::default()
        };
        assert!(bad_port.validate().is_err());
    }

    #[tokio::test]
    async fn test_run_reports_cycle() {
        let mut builder = ServiceGraphBuilder::new();
        builder
            .add_node("a", ServiceKind::Backend, NodeOptions::default())
            .unwrap();
        builder
            .add_node("b", ServiceKind::Backend, NodeOptions::default())
            .unwrap();
        builder.add_readiness_dependency("a", "b").unwrap();
        builder.add_readiness_dependency("b", "a").unwrap();

        let result = LocalRuntime::default().run(&builder.build()).await;
        assert!(matches!(result, Err(AppHostError::DependencyCycle { .. })));
    }
}
