use crate::domain::model::ServiceGraph;
use crate::domain::ports::{RunSummary, Runtime};
use crate::utils::error::Result;

/// Hands a declared graph over to a runtime.
pub struct AppHost<R: Runtime> {
    runtime: R,
}

impl<R: Runtime> AppHost<R> {
    pub fn new(runtime: R) -> Self {
        Self { runtime }
    }

    pub async fn run(&self, graph: ServiceGraph) -> Result<RunSummary> {
        tracing::info!(
            "Starting application with {} services ({} references, {} wait-for dependencies)",
            graph.len(),
            graph.reference_edges().len(),
            graph.readiness_edges().len()
        );
        for node in graph.externally_reachable() {
            tracing::info!("🌐 '{}' is externally reachable over HTTP", node.name);
        }

        let summary = self.runtime.run(&graph).await?;

        tracing::info!("Runtime finished; {} services were launched", summary.services.len());
        Ok(summary)
    }
}

/// Runs `graph` on `runtime`.
pub async fn run<R: Runtime>(runtime: R, graph: ServiceGraph) -> Result<RunSummary> {
    AppHost::new(runtime).run(graph).await
}
