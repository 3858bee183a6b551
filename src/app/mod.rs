// Outer surfaces: the JSON API and the terminal estimate wizard.

pub mod web;
pub mod wizard_cli;

pub use web::{create_router, AppState};
pub use wizard_cli::TerminalWizard;
