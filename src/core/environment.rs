use crate::domain::model::{ServiceGraph, ServiceKind};
use crate::domain::ports::ServiceEndpoint;
use crate::utils::error::{AppHostError, Result};
use std::collections::{BTreeMap, HashMap};

pub fn connection_string_key(provider: &str) -> String {
    format!("ConnectionStrings__{}", provider)
}

pub fn service_discovery_key(provider: &str) -> String {
    format!("services__{}__http__0", provider)
}

pub fn http_url(endpoint: &ServiceEndpoint) -> String {
    format!("http://{}:{}", endpoint.host, endpoint.port)
}

/// Environment injected into `consumer`, one entry per referenced provider.
///
/// Caches are published as connection strings, projects through their HTTP
/// service discovery address.
pub fn connection_environment(
    graph: &ServiceGraph,
    consumer: &str,
    endpoints: &HashMap<String, ServiceEndpoint>,
) -> Result<BTreeMap<String, String>> {
    let node = graph.node(consumer).ok_or_else(|| AppHostError::UnknownNode {
        name: consumer.to_string(),
    })?;

    let mut environment = BTreeMap::new();
    for provider_name in &node.references {
        let provider = graph
            .node(provider_name)
            .ok_or_else(|| AppHostError::UnknownNode {
                name: provider_name.clone(),
            })?;
        let endpoint = endpoints
            .get(provider_name)
            .ok_or_else(|| AppHostError::ConfigError {
                message: format!("No endpoint allocated for '{}'", provider_name),
            })?;

        match provider.kind {
            ServiceKind::Cache => {
                environment.insert(
                    connection_string_key(provider_name),
                    format!("{}:{}", endpoint.host, endpoint.port),
                );
            }
            ServiceKind::Backend | ServiceKind::Frontend => {
                environment.insert(service_discovery_key(provider_name), http_url(endpoint));
            }
        }
    }

    Ok(environment)
}
