use apphost::utils::validation::Validate;
use apphost::{
    default_topology, run, AppHost, AppHostError, LocalRuntime, Manifest, RunSummary, Runtime,
    RuntimeOptions, ServiceGraph,
};
use async_trait::async_trait;
use chrono::Utc;
use std::io::Write;
use std::sync::{Arc, Mutex};
use tempfile::NamedTempFile;

/// Records the graphs it is handed instead of launching anything.
#[derive(Default, Clone)]
struct RecordingRuntime {
    seen: Arc<Mutex<Vec<ServiceGraph>>>,
}

#[async_trait]
impl Runtime for RecordingRuntime {
    async fn run(&self, graph: &ServiceGraph) -> apphost::Result<RunSummary> {
        self.seen.lock().unwrap().push(graph.clone());
        Ok(RunSummary {
            started_at: Utc::now(),
            waves: Vec::new(),
            services: Vec::new(),
            stopped: Vec::new(),
        })
    }
}

#[tokio::test]
async fn test_apphost_hands_graph_to_runtime() {
    let runtime = RecordingRuntime::default();
    let graph = default_topology().unwrap();

    AppHost::new(runtime.clone()).run(graph.clone()).await.unwrap();

    let seen = runtime.seen.lock().unwrap();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0], graph);
}

#[tokio::test]
async fn test_local_runtime_launches_default_topology() {
    let summary = run(LocalRuntime::default(), default_topology().unwrap())
        .await
        .unwrap();

    assert_eq!(
        summary.waves,
        vec![
            vec!["cache".to_string(), "apiservice".to_string()],
            vec!["webfrontend".to_string()],
        ]
    );

    let cache = summary.service("cache").unwrap();
    assert_eq!(cache.endpoint.port, 6379);
    assert!(cache.environment.is_empty());
    assert!(cache.external_url.is_none());

    let api = summary.service("apiservice").unwrap();
    assert_eq!(api.endpoint.port, 5000);

    let web = summary.service("webfrontend").unwrap();
    assert_eq!(web.endpoint.port, 5001);
    assert_eq!(web.environment["ConnectionStrings__cache"], "localhost:6379");
    assert_eq!(
        web.environment["services__apiservice__http__0"],
        "http://localhost:5000"
    );
    assert_eq!(web.external_url.as_deref(), Some("http://localhost:5001"));
}

#[test]
fn test_manifest_self_wait_is_accepted_then_rejected_when_run() {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(
        br#"
[[services]]
name = "cache"
kind = "cache"

[[services]]
name = "worker"
kind = "backend"
references = ["cache"]
wait_for = ["worker"]
"#,
    )
    .unwrap();

    let manifest = Manifest::from_file(file.path()).unwrap();
    manifest.validate().unwrap();
    let graph = manifest.to_graph().unwrap();
    assert!(graph.node("worker").unwrap().waits_for("worker"));

    let result = tokio_test::block_on(run(LocalRuntime::default(), graph));
    match result {
        Err(AppHostError::DependencyCycle { nodes }) => assert_eq!(nodes, vec!["worker"]),
        other => panic!("expected a dependency cycle, got {:?}", other.map(|s| s.waves)),
    }
}

#[test]
fn test_graph_json_output() {
    let json = default_topology().unwrap().to_json().unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();

    let names: Vec<&str> = value["nodes"]
        .as_array()
        .unwrap()
        .iter()
        .map(|n| n["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["cache", "apiservice", "webfrontend"]);
}

#[tokio::test]
async fn test_launch_plan_json_output() {
    let summary = run(LocalRuntime::default(), default_topology().unwrap())
        .await
        .unwrap();
    let value: serde_json::Value = serde_json::from_str(&summary.to_json().unwrap()).unwrap();

    assert_eq!(value["waves"], serde_json::json!([["cache", "apiservice"], ["webfrontend"]]));
    assert_eq!(value["services"][2]["external_url"], "http://localhost:5001");
    assert_eq!(
        value["services"][2]["environment"]["ConnectionStrings__cache"],
        "localhost:6379"
    );
    assert_eq!(value["stopped"], serde_json::json!([]));
    assert!(value["started_at"].is_string());
}

#[tokio::test]
async fn test_manifest_file_runs_end_to_end() {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(
        br#"
[app]
name = "shop"

[[services]]
name = "storefront"
kind = "frontend"
external_http = true
references = ["catalog", "cache"]
wait_for = ["catalog"]
port = 8080

[[services]]
name = "catalog"
kind = "backend"
references = ["cache"]
wait_for = ["cache"]

[[services]]
name = "cache"
kind = "cache"
port = 6400
"#,
    )
    .unwrap();

    let graph = Manifest::from_file(file.path()).unwrap().to_graph().unwrap();
    let runtime = LocalRuntime::new(RuntimeOptions {
        host: "127.0.0.1".to_string(),
        base_port: 9100,
        wait_for_shutdown: false,
    });
    let summary = run(runtime, graph).await.unwrap();

    let order: Vec<&str> = summary.waves.iter().flatten().map(String::as_str).collect();
    assert_eq!(order, vec!["cache", "catalog", "storefront"]);

    let catalog = summary.service("catalog").unwrap();
    assert_eq!(catalog.endpoint.port, 9100);
    assert_eq!(catalog.environment["ConnectionStrings__cache"], "127.0.0.1:6400");

    let storefront = summary.service("storefront").unwrap();
    assert_eq!(storefront.environment.len(), 2);
    assert_eq!(
        storefront.environment["services__catalog__http__0"],
        "http://127.0.0.1:9100"
    );
    assert_eq!(storefront.external_url.as_deref(), Some("http://127.0.0.1:8080"));
}
