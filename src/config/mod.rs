pub mod manifest;

#[cfg(feature = "cli")]
pub use cli::CliConfig;

#[cfg(feature = "cli")]
mod cli {
    use crate::runtime::local::{RuntimeOptions, DEFAULT_BASE_PORT};
    use crate::utils::error::Result;
    use crate::utils::validation::{validate_host, validate_range, Validate};
    use clap::Parser;
    use serde::{Deserialize, Serialize};
    use std::path::PathBuf;

    #[derive(Debug, Clone, Serialize, Deserialize, Parser)]
    #[command(name = "apphost")]
    #[command(about = "Declares the cache, API and web services and hands them to a runtime")]
    pub struct CliConfig {
        /// TOML manifest to load instead of the built-in topology
        #[arg(long)]
        pub manifest: Option<PathBuf>,

        /// Resolve and report the launch plan, then exit
        #[arg(long)]
        pub dry_run: bool,

        /// Print the service graph as JSON and exit
        #[arg(long)]
        pub print_graph: bool,

        #[arg(long, default_value = "localhost")]
        pub host: String,

        #[arg(long, default_value_t = DEFAULT_BASE_PORT)]
        pub base_port: u16,

        #[arg(short, long, help = "Enable verbose output")]
        pub verbose: bool,

        #[arg(long, help = "Emit logs as JSON lines")]
        pub json_logs: bool,

        /// Passed through untouched to the hosted runtime
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        pub args: Vec<String>,
    }

    impl CliConfig {
        pub fn runtime_options(&self) -> RuntimeOptions {
            RuntimeOptions {
                host: self.host.clone(),
                base_port: self.base_port,
                wait_for_shutdown: !self.dry_run,
            }
        }
    }

    impl Validate for CliConfig {
        fn validate(&self) -> Result<()> {
            validate_host("host", &self.host)?;
            validate_range("base_port", self.base_port, 1, u16::MAX)
        }
    }

}
