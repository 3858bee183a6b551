pub mod toml_config;

pub use toml_config::SiteConfig;

#[cfg(feature = "cli")]
use clap::{Parser, Subcommand};

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Parser)]
#[command(name = "interior-site")]
#[command(about = "Marketing site backend and estimate calculator for an interior contractor")]
pub struct CliConfig {
    /// Path to TOML configuration file
    #[arg(short, long, default_value = "site.toml", env = "INTERIOR_SITE_CONFIG")]
    pub config: String,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Serve the site API over HTTP
    Serve {
        /// Override `server.bind` from the config file
        #[arg(long)]
        bind: Option<String>,

        /// Use a throwaway in-memory backend instead of the hosted tables
        #[arg(long)]
        in_memory: bool,
    },
    /// Walk through the estimate calculator in the terminal
    Estimate {
        /// Only print the estimate; never submit a lead
        #[arg(long)]
        dry_run: bool,
    },
}
