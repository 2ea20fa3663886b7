pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod runtime;
pub mod utils;

#[cfg(feature = "cli")]
pub use crate::config::CliConfig;

pub use crate::app::topology::default_topology;
pub use crate::config::manifest::Manifest;
pub use crate::core::apphost::{run, AppHost};
pub use crate::core::builder::ServiceGraphBuilder;
pub use crate::domain::model::{Edge, Exposure, NodeHandle, NodeOptions, ServiceGraph, ServiceKind, ServiceNode};
pub use crate::domain::ports::{LaunchedService, RunSummary, Runtime, ServiceEndpoint};
pub use crate::runtime::{LocalRuntime, RuntimeOptions, StartupPlan};
pub use crate::utils::error::{AppHostError, Result};
