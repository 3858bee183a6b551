pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;
pub use config::SiteConfig;

pub use adapters::{InMemoryBackend, SupabaseClient};
pub use app::{create_router, AppState, TerminalWizard};
pub use core::wizard::EstimateWizard;
pub use utils::error::{Result, SiteError};
