use anyhow::Context;
use apphost::utils::{logger, validation::Validate};
use apphost::{default_topology, AppHost, AppHostError, CliConfig, LocalRuntime, Manifest, ServiceGraph};
use clap::Parser;

fn load_graph(config: &CliConfig) -> apphost::Result<ServiceGraph> {
    match &config.manifest {
        Some(path) => {
            tracing::info!("📁 Loading manifest from: {}", path.display());
            let manifest = Manifest::from_file(path)?;
            manifest.validate()?;
            tracing::info!("Manifest '{}' declares {} services", manifest.app_name(), manifest.services.len());
            manifest.to_graph()
        }
        None => default_topology(),
    }
}

fn report_failure(stage: &str, e: &AppHostError) -> ! {
    tracing::error!("❌ {}: {}", stage, e);
    tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
    eprintln!("❌ {}: {}", stage, e);
    std::process::exit(1);
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = CliConfig::parse();

    if config.json_logs {
        logger::init_json_logger(config.verbose);
    } else {
        logger::init_cli_logger(config.verbose);
    }

    tracing::info!("Starting apphost");
    tracing::debug!("CLI config: {:?}", config);
    if !config.args.is_empty() {
        tracing::debug!("Pass-through arguments: {:?}", config.args);
    }

    if let Err(e) = config.validate() {
        report_failure("Configuration validation failed", &e);
    }

    let graph = match load_graph(&config) {
        Ok(graph) => graph,
        Err(e) => report_failure("Could not declare the service graph", &e),
    };

    if config.print_graph {
        println!("{}", graph.to_json().context("serializing service graph")?);
        return Ok(());
    }

    let host = AppHost::new(LocalRuntime::new(config.runtime_options()));
    let summary = host.run(graph).await.context("running the application")?;

    if config.dry_run {
        println!("{}", summary.to_json().context("serializing launch plan")?);
    }

    Ok(())
}
