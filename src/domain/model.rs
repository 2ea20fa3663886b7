use crate::utils::error::Result;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ServiceKind {
    #[serde(rename = "cache")]
    Cache,
    #[serde(rename = "backend-project", alias = "backend")]
    Backend,
    #[serde(rename = "frontend-project", alias = "frontend")]
    Frontend,
}

impl ServiceKind {
    pub fn is_project(self) -> bool {
        matches!(self, ServiceKind::Backend | ServiceKind::Frontend)
    }
}

impl fmt::Display for ServiceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ServiceKind::Cache => "cache",
            ServiceKind::Backend => "backend-project",
            ServiceKind::Frontend => "frontend-project",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Exposure {
    /// HTTP endpoint reachable from outside the internal service network.
    ExternalHttp,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeOptions {
    pub port: Option<u16>,
    pub image: Option<String>,
    pub project_path: Option<String>,
}

impl NodeOptions {
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    pub fn with_image(mut self, image: impl Into<String>) -> Self {
        self.image = Some(image.into());
        self
    }

    pub fn with_project_path(mut self, path: impl Into<String>) -> Self {
        self.project_path = Some(path.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceNode {
    pub name: String,
    pub kind: ServiceKind,
    pub options: NodeOptions,
    /// Providers whose connection info is injected, in declaration order.
    pub references: Vec<String>,
    /// Providers that must be ready first, in declaration order.
    pub wait_for: Vec<String>,
    pub exposure: BTreeSet<Exposure>,
}

impl ServiceNode {
    pub fn new(name: impl Into<String>, kind: ServiceKind, options: NodeOptions) -> Self {
        Self {
            name: name.into(),
            kind,
            options,
            references: Vec::new(),
            wait_for: Vec::new(),
            exposure: BTreeSet::new(),
        }
    }

    pub fn is_externally_reachable(&self) -> bool {
        self.exposure.contains(&Exposure::ExternalHttp)
    }

    pub fn references(&self, provider: &str) -> bool {
        self.references.iter().any(|r| r == provider)
    }

    pub fn waits_for(&self, provider: &str) -> bool {
        self.wait_for.iter().any(|r| r == provider)
    }
}

/// A directed edge from the consuming service to the providing one.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Edge {
    pub consumer: String,
    pub provider: String,
}

/// Returned by registration; usable anywhere a service name is expected.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NodeHandle {
    index: usize,
    name: String,
}

impl NodeHandle {
    pub(crate) fn new(index: usize, name: String) -> Self {
        Self { index, name }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl AsRef<str> for NodeHandle {
    fn as_ref(&self) -> &str {
        &self.name
    }
}

/// Immutable snapshot produced by the graph builder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceGraph {
    nodes: Vec<ServiceNode>,
}

impl ServiceGraph {
    pub(crate) fn from_nodes(nodes: Vec<ServiceNode>) -> Self {
        Self { nodes }
    }

    pub fn nodes(&self) -> &[ServiceNode] {
        &self.nodes
    }

    pub fn node(&self, name: &str) -> Option<&ServiceNode> {
        self.nodes.iter().find(|n| n.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.node(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn reference_edges(&self) -> Vec<Edge> {
        self.nodes
            .iter()
            .flat_map(|n| {
                n.references.iter().map(move |p| Edge {
                    consumer: n.name.clone(),
                    provider: p.clone(),
                })
            })
            .collect()
    }

    pub fn readiness_edges(&self) -> Vec<Edge> {
        self.nodes
            .iter()
            .flat_map(|n| {
                n.wait_for.iter().map(move |p| Edge {
                    consumer: n.name.clone(),
                    provider: p.clone(),
                })
            })
            .collect()
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn externally_reachable(&self) -> impl Iterator<Item = &ServiceNode> {
        self.nodes.iter().filter(|n| n.is_externally_reachable())
    }
}
