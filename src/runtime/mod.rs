pub mod local;
pub mod plan;

pub use local::{LocalRuntime, RuntimeOptions};
pub use plan::StartupPlan;
