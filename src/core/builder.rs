use crate::domain::model::{Exposure, NodeHandle, NodeOptions, ServiceGraph, ServiceKind, ServiceNode};
use crate::utils::error::{AppHostError, Result};
use std::collections::HashMap;

/// Accumulates services and the edges between them.
///
/// Every registration call either succeeds completely or leaves the builder
/// untouched. No cycle detection happens here; ordering problems surface when
/// a runtime tries to start the graph.
#[derive(Debug, Default)]
pub struct ServiceGraphBuilder {
    nodes: Vec<ServiceNode>,
    index: HashMap<String, usize>,
}

impl ServiceGraphBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_node(
        &mut self,
        name: impl Into<String>,
        kind: ServiceKind,
        options: NodeOptions,
    ) -> Result<NodeHandle> {
        let name = name.into();
        if self.index.contains_key(&name) {
            return Err(AppHostError::DuplicateName { name });
        }

        let position = self.nodes.len();
        tracing::debug!("Registering service '{}' ({})", name, kind);
        self.index.insert(name.clone(), position);
        self.nodes.push(ServiceNode::new(name.clone(), kind, options));

        Ok(NodeHandle::new(position, name))
    }

    /// Injects `provider`'s connection info into `consumer`.
    pub fn add_reference(&mut self, consumer: impl AsRef<str>, provider: impl AsRef<str>) -> Result<()> {
        let (consumer, provider) = (consumer.as_ref(), provider.as_ref());
        let (consumer_at, _) = self.resolve_pair(consumer, provider)?;

        let node = &mut self.nodes[consumer_at];
        if !node.references(provider) {
            tracing::debug!("'{}' references '{}'", consumer, provider);
            node.references.push(provider.to_string());
        }
        Ok(())
    }

    /// Defers `consumer`'s startup until `provider` reports ready.
    pub fn add_readiness_dependency(
        &mut self,
        consumer: impl AsRef<str>,
        provider: impl AsRef<str>,
    ) -> Result<()> {
        let (consumer, provider) = (consumer.as_ref(), provider.as_ref());
        let (consumer_at, _) = self.resolve_pair(consumer, provider)?;

        let node = &mut self.nodes[consumer_at];
        if !node.waits_for(provider) {
            tracing::debug!("'{}' waits for '{}'", consumer, provider);
            node.wait_for.push(provider.to_string());
        }
        Ok(())
    }

    pub fn mark_externally_reachable(&mut self, node: impl AsRef<str>) -> Result<()> {
        let at = self.resolve(node.as_ref())?;
        self.nodes[at].exposure.insert(Exposure::ExternalHttp);
        Ok(())
    }

    /// Snapshot of everything registered so far.
    pub fn build(&self) -> ServiceGraph {
        ServiceGraph::from_nodes(self.nodes.clone())
    }

    fn resolve(&self, name: &str) -> Result<usize> {
        self.index
            .get(name)
            .copied()
            .ok_or_else(|| AppHostError::UnknownNode {
                name: name.to_string(),
            })
    }

    fn resolve_pair(&self, consumer: &str, provider: &str) -> Result<(usize, usize)> {
        Ok((self.resolve(consumer)?, self.resolve(provider)?))
    }
}
