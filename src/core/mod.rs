pub mod admin;
pub mod landing;
pub mod portfolio;
pub mod pricing;
pub mod submission;
pub mod wizard;

pub use crate::domain::model::{EstimateInput, EstimateResult};
pub use crate::domain::ports::{
    AdminGate, Backend, LeadRepository, PortfolioRepository, ReviewRepository, SettingsStore,
};
pub use crate::utils::error::Result;
