use crate::core::builder::ServiceGraphBuilder;
use crate::domain::model::{NodeOptions, ServiceGraph, ServiceKind};
use crate::utils::error::Result;

pub const CACHE: &str = "cache";
pub const API_SERVICE: &str = "apiservice";
pub const WEB_FRONTEND: &str = "webfrontend";

/// The built-in application: a Redis cache, the API backend and the web
/// frontend, which is the only service exposed outside the service network.
pub fn default_topology() -> Result<ServiceGraph> {
    let mut builder = ServiceGraphBuilder::new();

    let cache = builder.add_node(CACHE, ServiceKind::Cache, NodeOptions::default().with_image("redis"))?;

    let api = builder.add_node(
        API_SERVICE,
        ServiceKind::Backend,
        NodeOptions::default().with_project_path("BondBend.Aspire.ApiService"),
    )?;

    let web = builder.add_node(
        WEB_FRONTEND,
        ServiceKind::Frontend,
        NodeOptions::default().with_project_path("BondBend.Aspire.Web"),
    )?;
    builder.mark_externally_reachable(&web)?;
    builder.add_reference(&web, &cache)?;
    builder.add_readiness_dependency(&web, &cache)?;
    builder.add_reference(&web, &api)?;
    builder.add_readiness_dependency(&web, &api)?;

    Ok(builder.build())
}
