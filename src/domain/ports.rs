use crate::domain::model::{Lead, LeadStatus, NewLead, NewPortfolio, Portfolio, Review};
use crate::utils::error::Result;
use async_trait::async_trait;

#[async_trait]
pub trait LeadRepository: Send + Sync {
    /// Newest first.
    async fn fetch_leads(&self) -> Result<Vec<Lead>>;
    /// Formats area/budget, assigns id, `신규` status and timestamp.
    async fn create_lead(&self, lead: NewLead) -> Result<Lead>;
    async fn update_lead_status(&self, id: i64, status: LeadStatus) -> Result<()>;
}

#[async_trait]
pub trait PortfolioRepository: Send + Sync {
    /// Newest first.
    async fn fetch_portfolios(&self) -> Result<Vec<Portfolio>>;
    async fn fetch_portfolio(&self, id: i64) -> Result<Option<Portfolio>>;
    async fn create_portfolio(&self, portfolio: NewPortfolio) -> Result<Portfolio>;
}

/// Key/value site settings. A missing key reads as an empty string.
#[async_trait]
pub trait SettingsStore: Send + Sync {
    async fn fetch_site_setting(&self, key: &str) -> Result<String>;
    async fn set_site_setting(&self, key: &str, value: &str) -> Result<()>;
}

#[async_trait]
pub trait ReviewRepository: Send + Sync {
    async fn fetch_reviews(&self) -> Result<Vec<Review>>;
}

/// Everything the site needs from the hosted table layer.
pub trait Backend: LeadRepository + PortfolioRepository + SettingsStore + ReviewRepository {}

impl<T> Backend for T where T: LeadRepository + PortfolioRepository + SettingsStore + ReviewRepository
{}

/// Capability check for the admin console.
pub trait AdminGate: Send + Sync {
    fn authenticate(&self, id: &str, password: &str) -> bool;
}
