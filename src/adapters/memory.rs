use crate::domain::model::{Lead, LeadStatus, NewLead, NewPortfolio, Portfolio, Review};
use crate::domain::ports::{LeadRepository, PortfolioRepository, ReviewRepository, SettingsStore};
use crate::utils::error::{Result, SiteError};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::Mutex;

#[derive(Debug, Default)]
struct Tables {
    leads: Vec<Lead>,
    portfolios: Vec<Portfolio>,
    reviews: Vec<Review>,
    settings: HashMap<String, String>,
    next_id: i64,
}

impl Tables {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }
}

/// Process-local stand-in for the hosted tables. Lists are kept newest first.
#[derive(Debug, Default)]
pub struct InMemoryBackend {
    tables: Mutex<Tables>,
    unavailable: AtomicBool,
}

impl InMemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_portfolios(portfolios: Vec<Portfolio>) -> Self {
        let next_id = portfolios.iter().map(|p| p.id).max().unwrap_or(0);
        Self {
            tables: Mutex::new(Tables {
                portfolios,
                next_id,
                ..Default::default()
            }),
            unavailable: AtomicBool::new(false),
        }
    }

    pub async fn add_review(&self, review: Review) {
        self.tables.lock().await.reviews.insert(0, review);
    }

    /// While set, every call fails as if the backend were down.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    pub async fn lead_count(&self) -> usize {
        self.tables.lock().await.leads.len()
    }

    fn check(&self, operation: &str) -> Result<()> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(SiteError::persistence(operation, "backend unavailable"));
        }
        Ok(())
    }
}

#[async_trait]
impl LeadRepository for InMemoryBackend {
    async fn fetch_leads(&self) -> Result<Vec<Lead>> {
        self.check("fetch_leads")?;
        Ok(self.tables.lock().await.leads.clone())
    }

    async fn create_lead(&self, lead: NewLead) -> Result<Lead> {
        self.check("create_lead")?;
        let mut tables = self.tables.lock().await;
        let created = Lead {
            id: tables.next_id(),
            area: lead.formatted_area(),
            budget: lead.formatted_budget(),
            client_name: lead.client_name,
            phone: lead.phone,
            email: lead.email,
            message: lead.message,
            business_type: lead.business_type,
            estimate_min: Some(lead.estimate_min),
            estimate_max: Some(lead.estimate_max),
            status: LeadStatus::New,
            created_at: Some(Utc::now()),
        };
        tables.leads.insert(0, created.clone());
        Ok(created)
    }

    async fn update_lead_status(&self, id: i64, status: LeadStatus) -> Result<()> {
        self.check("update_lead_status")?;
        let mut tables = self.tables.lock().await;
        let lead = tables
            .leads
            .iter_mut()
            .find(|l| l.id == id)
            .ok_or_else(|| SiteError::not_found("Lead", id))?;
        lead.status = status;
        Ok(())
    }
}

#[async_trait]
impl PortfolioRepository for InMemoryBackend {
    async fn fetch_portfolios(&self) -> Result<Vec<Portfolio>> {
        self.check("fetch_portfolios")?;
        Ok(self.tables.lock().await.portfolios.clone())
    }

    async fn fetch_portfolio(&self, id: i64) -> Result<Option<Portfolio>> {
        self.check("fetch_portfolio")?;
        let tables = self.tables.lock().await;
        Ok(tables.portfolios.iter().find(|p| p.id == id).cloned())
    }

    async fn create_portfolio(&self, portfolio: NewPortfolio) -> Result<Portfolio> {
        self.check("create_portfolio")?;
        let mut tables = self.tables.lock().await;
        let image_urls = portfolio.stored_image_urls();
        let created = Portfolio {
            id: tables.next_id(),
            name: portfolio.name,
            location: portfolio.location,
            area: portfolio.area,
            budget: portfolio.budget,
            industry: portfolio.industry,
            style: portfolio.style,
            duration: portfolio.duration,
            image_url: portfolio.image_url,
            image_urls,
            created_at: Some(Utc::now()),
        };
        tables.portfolios.insert(0, created.clone());
        Ok(created)
    }
}

#[async_trait]
impl SettingsStore for InMemoryBackend {
    async fn fetch_site_setting(&self, key: &str) -> Result<String> {
        self.check("fetch_site_setting")?;
        let tables = self.tables.lock().await;
        Ok(tables.settings.get(key).cloned().unwrap_or_default())
    }

    async fn set_site_setting(&self, key: &str, value: &str) -> Result<()> {
        self.check("set_site_setting")?;
        self.tables
            .lock()
            .await
            .settings
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}

#[async_trait]
impl ReviewRepository for InMemoryBackend {
    async fn fetch_reviews(&self) -> Result<Vec<Review>> {
        self.check("fetch_reviews")?;
        Ok(self.tables.lock().await.reviews.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_lead(name: &str) -> NewLead {
        NewLead {
            client_name: name.to_string(),
            phone: "010-0000-0000".to_string(),
            email: "x@example.com".to_string(),
            message: String::new(),
            business_type: "리테일".to_string(),
            area: 20,
            estimate_min: 3400,
            estimate_max: 4420,
        }
    }

    #[tokio::test]
    async fn test_leads_newest_first_with_defaults() {
        let backend = InMemoryBackend::new();
        backend.create_lead(new_lead("first")).await.unwrap();
        let second = backend.create_lead(new_lead("second")).await.unwrap();

        assert_eq!(second.status, LeadStatus::New);
        assert_eq!(second.area, "20평");
        assert!(second.created_at.is_some());

        let leads = backend.fetch_leads().await.unwrap();
        assert_eq!(leads[0].client_name, "second");
        assert_eq!(leads[1].client_name, "first");
    }

    #[tokio::test]
    async fn test_update_status_unknown_lead() {
        let backend = InMemoryBackend::new();
        let created = backend.create_lead(new_lead("a")).await.unwrap();
        backend
            .update_lead_status(created.id, LeadStatus::Contracted)
            .await
            .unwrap();
        assert_eq!(
            backend.fetch_leads().await.unwrap()[0].status,
            LeadStatus::Contracted
        );
        assert!(matches!(
            backend.update_lead_status(999, LeadStatus::Quoted).await,
            Err(SiteError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_unavailable_backend() {
        let backend = InMemoryBackend::new();
        backend.set_unavailable(true);
        assert!(matches!(
            backend.create_lead(new_lead("a")).await,
            Err(SiteError::PersistenceFailure { .. })
        ));
        backend.set_unavailable(false);
        assert!(backend.create_lead(new_lead("a")).await.is_ok());
        assert_eq!(backend.lead_count().await, 1);
    }
}
