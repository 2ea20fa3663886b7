use crate::core::builder::ServiceGraphBuilder;
use crate::domain::model::{NodeOptions, ServiceGraph, ServiceKind};
use crate::utils::error::{AppHostError, Result};
use crate::utils::validation::{validate_non_empty_string, validate_range, validate_service_name, Validate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::sync::OnceLock;

/// Declarative form of a service graph, loaded from TOML.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Manifest {
    pub app: Option<AppSection>,
    #[serde(default)]
    pub services: Vec<ServiceEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AppSection {
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServiceEntry {
    pub name: String,
    pub kind: ServiceKind,
    pub port: Option<u16>,
    pub image: Option<String>,
    pub project: Option<String>,
    #[serde(default)]
    pub external_http: bool,
    #[serde(default)]
    pub references: Vec<String>,
    #[serde(default)]
    pub wait_for: Vec<String>,
}

impl Manifest {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed = Self::substitute_env_vars(content);
        Ok(toml::from_str(&processed)?)
    }

    /// Replaces `${VAR}` with the variable's value; unset variables stay as written.
    fn substitute_env_vars(content: &str) -> String {
        static PLACEHOLDER: OnceLock<Regex> = OnceLock::new();
        let re = PLACEHOLDER.get_or_init(|| {
            Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)\}").expect("placeholder pattern is valid")
        });

        re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        })
        .into_owned()
    }

    pub fn app_name(&self) -> &str {
        self.app.as_ref().map(|a| a.name.as_str()).unwrap_or("apphost")
    }

    /// Registers every service first, then the edges, so entries may refer
    /// to services declared further down.
    pub fn to_graph(&self) -> Result<ServiceGraph> {
        let mut builder = ServiceGraphBuilder::new();

        for entry in &self.services {
            let mut options = NodeOptions {
                port: entry.port,
                ..NodeOptions::default()
            };
            if let Some(image) = &entry.image {
                options = options.with_image(image.clone());
            }
            if let Some(project) = &entry.project {
                options = options.with_project_path(project.clone());
            }
            builder.add_node(entry.name.clone(), entry.kind, options)?;
        }

        for entry in &self.services {
            for provider in &entry.references {
                builder.add_reference(&entry.name, provider)?;
            }
            for provider in &entry.wait_for {
                builder.add_readiness_dependency(&entry.name, provider)?;
            }
            if entry.external_http {
                builder.mark_externally_reachable(&entry.name)?;
            }
        }

        Ok(builder.build())
    }
}

impl Validate for Manifest {
    fn validate(&self) -> Result<()> {
        if let Some(app) = &self.app {
            validate_non_empty_string("app.name", &app.name)?;
        }

        if self.services.is_empty() {
            return Err(AppHostError::MissingConfigError {
                field: "services".to_string(),
            });
        }

        let mut fixed_ports: HashMap<u16, &str> = HashMap::new();
        for (i, entry) in self.services.iter().enumerate() {
            validate_service_name(&format!("services[{}].name", i), &entry.name)?;
            if let Some(port) = entry.port {
                let field = format!("services[{}].port", i);
                validate_range(&field, port, 1, u16::MAX)?;
                if let Some(owner) = fixed_ports.insert(port, &entry.name) {
                    return Err(AppHostError::InvalidConfigValueError {
                        field,
                        value: port.to_string(),
                        reason: format!("Port is already fixed for '{}'", owner),
                    });
                }
            }
            if entry.image.is_some() && entry.kind.is_project() {
                return Err(AppHostError::InvalidConfigValueError {
                    field: format!("services[{}].image", i),
                    value: entry.image.clone().unwrap_or_default(),
                    reason: "Only cache services run from a container image".to_string(),
                });
            }
        }

        Ok(())
    }
}
