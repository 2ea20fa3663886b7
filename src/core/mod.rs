pub mod apphost;
pub mod builder;
pub mod environment;

pub use crate::domain::model::{Edge, NodeHandle, NodeOptions, ServiceGraph, ServiceKind, ServiceNode};
pub use crate::domain::ports::{RunSummary, Runtime};
pub use crate::utils::error::Result;
