use crate::domain::model::ServiceGraph;
use crate::utils::error::{AppHostError, Result};
use std::collections::HashMap;

/// Startup order derived from the wait-for edges.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartupPlan {
    waves: Vec<Vec<String>>,
}

impl StartupPlan {
    /// Groups services into waves; every service starts after all the
    /// services it waits for. Within a wave, registration order is kept.
    pub fn resolve(graph: &ServiceGraph) -> Result<Self> {
        let mut pending: HashMap<&str, usize> = graph
            .nodes()
            .iter()
            .map(|n| (n.name.as_str(), n.wait_for.len()))
            .collect();

        let mut waves: Vec<Vec<String>> = Vec::new();
        let mut placed = 0;

        while placed < graph.len() {
            let wave: Vec<String> = graph
                .nodes()
                .iter()
                .filter(|n| pending.get(n.name.as_str()) == Some(&0))
                .map(|n| n.name.clone())
                .collect();

            if wave.is_empty() {
                let stuck = graph
                    .nodes()
                    .iter()
                    .filter(|n| pending.contains_key(n.name.as_str()))
                    .map(|n| n.name.clone())
                    .collect();
                return Err(AppHostError::DependencyCycle { nodes: stuck });
            }

            for name in &wave {
                pending.remove(name.as_str());
            }
            for node in graph.nodes() {
                if let Some(count) = pending.get_mut(node.name.as_str()) {
                    *count -= node.wait_for.iter().filter(|p| wave.contains(p)).count();
                }
            }

            placed += wave.len();
            waves.push(wave);
        }

        Ok(Self { waves })
    }

    pub fn waves(&self) -> &[Vec<String>] {
        &self.waves
    }

    /// Flattened startup order.
    pub fn order(&self) -> impl Iterator<Item = &str> {
        self.waves.iter().flatten().map(String::as_str)
    }

    pub fn into_waves(self) -> Vec<Vec<String>> {
        self.waves
    }
}
