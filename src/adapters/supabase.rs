//! REST client for the hosted table layer (PostgREST dialect).

use crate::config::toml_config::BackendConfig;
use crate::domain::model::{Lead, LeadStatus, NewLead, NewPortfolio, Portfolio, Review};
use crate::domain::ports::{LeadRepository, PortfolioRepository, ReviewRepository, SettingsStore};
use crate::utils::error::{Result, SiteError};
use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;

const LEADS: &str = "leads";
const PORTFOLIOS: &str = "portfolios";
const REVIEWS: &str = "reviews";
const SITE_SETTINGS: &str = "site_settings";

const NEWEST_FIRST: (&str, &str) = ("order", "created_at.desc");
const SELECT_ALL: (&str, &str) = ("select", "*");

#[derive(Debug, Clone)]
pub struct SupabaseClient {
    client: Client,
    base_url: String,
    api_key: String,
}

#[derive(Debug, Deserialize)]
struct SettingRow {
    #[serde(default)]
    value: Option<String>,
}

impl SupabaseClient {
    pub fn new(base_url: &str, api_key: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        })
    }

    pub fn from_config(config: &BackendConfig) -> Result<Self> {
        Self::new(&config.url, &config.anon_key, config.timeout())
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, table)
    }

    fn request(&self, method: Method, table: &str) -> RequestBuilder {
        self.client
            .request(method, self.table_url(table))
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
            .header("Accept", "application/json")
    }

    async fn send(&self, operation: &str, request: RequestBuilder) -> Result<Response> {
        let response = request.send().await.map_err(|e| {
            tracing::warn!("📡 {}: request failed: {}", operation, e);
            SiteError::persistence(operation, e.to_string())
        })?;
        tracing::debug!("📡 {}: API response status: {}", operation, response.status());

        if response.status().is_success() {
            Ok(response)
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            let error_msg = format!("API request failed with status: {} {}", status, body);
            tracing::warn!("❌ {}: {}", operation, error_msg);
            Err(SiteError::persistence(operation, error_msg))
        }
    }

    async fn rows<T: DeserializeOwned>(&self, operation: &str, request: RequestBuilder) -> Result<Vec<T>> {
        let response = self.send(operation, request).await?;
        response
            .json::<Vec<T>>()
            .await
            .map_err(|e| SiteError::persistence(operation, format!("unexpected payload: {}", e)))
    }

    async fn single<T: DeserializeOwned>(&self, operation: &str, request: RequestBuilder) -> Result<T> {
        self.rows(operation, request)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| SiteError::persistence(operation, "no row returned"))
    }
}

#[async_trait]
impl LeadRepository for SupabaseClient {
    async fn fetch_leads(&self) -> Result<Vec<Lead>> {
        let request = self.request(Method::GET, LEADS).query(&[SELECT_ALL, NEWEST_FIRST]);
        self.rows("fetch_leads", request).await
    }

    async fn create_lead(&self, lead: NewLead) -> Result<Lead> {
        let body = serde_json::json!({
            "client_name": lead.client_name,
            "phone": lead.phone,
            "email": lead.email,
            "message": lead.message,
            "business_type": lead.business_type,
            "area": lead.formatted_area(),
            "budget": lead.formatted_budget(),
            "estimate_min": lead.estimate_min,
            "estimate_max": lead.estimate_max,
            "status": LeadStatus::New,
        });
        let request = self
            .request(Method::POST, LEADS)
            .header("Prefer", "return=representation")
            .json(&body);
        self.single("create_lead", request).await
    }

    async fn update_lead_status(&self, id: i64, status: LeadStatus) -> Result<()> {
        let request = self
            .request(Method::PATCH, LEADS)
            .query(&[("id", format!("eq.{}", id))])
            .json(&serde_json::json!({ "status": status }));
        self.send("update_lead_status", request).await?;
        Ok(())
    }
}

#[async_trait]
impl PortfolioRepository for SupabaseClient {
    async fn fetch_portfolios(&self) -> Result<Vec<Portfolio>> {
        let request = self
            .request(Method::GET, PORTFOLIOS)
            .query(&[SELECT_ALL, NEWEST_FIRST]);
        self.rows("fetch_portfolios", request).await
    }

    async fn fetch_portfolio(&self, id: i64) -> Result<Option<Portfolio>> {
        let request = self
            .request(Method::GET, PORTFOLIOS)
            .query(&[SELECT_ALL])
            .query(&[("id", format!("eq.{}", id))]);
        let rows: Vec<Portfolio> = self.rows("fetch_portfolio", request).await?;
        Ok(rows.into_iter().next())
    }

    async fn create_portfolio(&self, portfolio: NewPortfolio) -> Result<Portfolio> {
        let body = serde_json::json!({
            "name": portfolio.name,
            "location": portfolio.location,
            "area": portfolio.area,
            "budget": portfolio.budget,
            "industry": portfolio.industry,
            "style": portfolio.style,
            "duration": portfolio.duration,
            "image_url": portfolio.image_url,
            "image_urls": portfolio.stored_image_urls(),
        });
        let request = self
            .request(Method::POST, PORTFOLIOS)
            .header("Prefer", "return=representation")
            .json(&body);
        self.single("create_portfolio", request).await
    }
}

#[async_trait]
impl SettingsStore for SupabaseClient {
    async fn fetch_site_setting(&self, key: &str) -> Result<String> {
        let request = self
            .request(Method::GET, SITE_SETTINGS)
            .query(&[("select", "value".to_string()), ("key", format!("eq.{}", key))]);
        let rows: Vec<SettingRow> = self.rows("fetch_site_setting", request).await?;
        Ok(rows
            .into_iter()
            .next()
            .and_then(|row| row.value)
            .unwrap_or_default())
    }

    async fn set_site_setting(&self, key: &str, value: &str) -> Result<()> {
        let body = serde_json::json!({
            "key": key,
            "value": value,
            "updated_at": chrono::Utc::now().to_rfc3339(),
        });
        let request = self
            .request(Method::POST, SITE_SETTINGS)
            .query(&[("on_conflict", "key")])
            .header("Prefer", "resolution=merge-duplicates,return=minimal")
            .json(&body);
        self.send("set_site_setting", request).await?;
        Ok(())
    }
}

#[async_trait]
impl ReviewRepository for SupabaseClient {
    async fn fetch_reviews(&self) -> Result<Vec<Review>> {
        let request = self
            .request(Method::GET, REVIEWS)
            .query(&[SELECT_ALL, NEWEST_FIRST]);
        self.rows("fetch_reviews", request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use httpmock::Method::PATCH;

    fn client(server: &MockServer) -> SupabaseClient {
        SupabaseClient::new(&server.base_url(), "test-key", Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn test_fetch_leads_sends_auth_and_order() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET)
                .path("/rest/v1/leads")
                .query_param("select", "*")
                .query_param("order", "created_at.desc")
                .header("apikey", "test-key")
                .header("Authorization", "Bearer test-key");
            then.status(200).json_body(serde_json::json!([
                {"id": 2, "client_name": "B", "status": "진행중", "created_at": "2025-02-02T00:00:00Z"},
                {"id": 1, "client_name": "A", "status": "신규", "created_at": "2025-02-01T00:00:00Z"}
            ]));
        });

        let leads = client(&server).fetch_leads().await.unwrap();

        mock.assert();
        assert_eq!(leads.len(), 2);
        assert_eq!(leads[0].id, 2);
        assert_eq!(leads[0].status, LeadStatus::InProgress);
        assert_eq!(leads[1].date(), "2025-02-01");
    }

    #[tokio::test]
    async fn test_create_lead_formats_area_and_budget() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(POST)
                .path("/rest/v1/leads")
                .header("Prefer", "return=representation")
                .json_body_partial(
                    r#"{"area": "30평", "budget": "6,300만원 ~ 8,190만원", "status": "신규", "business_type": "카페"}"#,
                );
            then.status(201).json_body(serde_json::json!([{
                "id": 11,
                "client_name": "홍길동",
                "business_type": "카페",
                "area": "30평",
                "budget": "6,300만원 ~ 8,190만원",
                "estimate_min": 6300,
                "estimate_max": 8190,
                "status": "신규",
                "created_at": "2025-02-11T09:30:00+00:00"
            }]));
        });

        let lead = client(&server)
            .create_lead(NewLead {
                client_name: "홍길동".to_string(),
                phone: "010-1234-5678".to_string(),
                email: "hong@example.com".to_string(),
                message: String::new(),
                business_type: "카페".to_string(),
                area: 30,
                estimate_min: 6300,
                estimate_max: 8190,
            })
            .await
            .unwrap();

        mock.assert();
        assert_eq!(lead.id, 11);
        assert_eq!(lead.estimate_max, Some(8190));
    }

    #[tokio::test]
    async fn test_server_error_becomes_persistence_failure() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/rest/v1/leads");
            then.status(503).body("unavailable");
        });

        let err = client(&server)
            .create_lead(NewLead {
                client_name: "a".to_string(),
                phone: "b".to_string(),
                email: "c".to_string(),
                message: String::new(),
                business_type: "오피스".to_string(),
                area: 10,
                estimate_min: 1500,
                estimate_max: 1950,
            })
            .await
            .unwrap_err();

        match err {
            SiteError::PersistenceFailure { operation, message } => {
                assert_eq!(operation, "create_lead");
                assert!(message.contains("503"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_fetch_portfolio_by_id() {
        let server = MockServer::start();
        let found = server.mock(|when, then| {
            when.method(GET)
                .path("/rest/v1/portfolios")
                .query_param("id", "eq.5");
            then.status(200).json_body(serde_json::json!([{
                "id": 5,
                "name": "성수 카페",
                "image_url": "https://img/5.jpg",
                "image_urls": "[\"https://img/5a.jpg\", \"https://img/5b.jpg\"]"
            }]));
        });
        let missing = server.mock(|when, then| {
            when.method(GET)
                .path("/rest/v1/portfolios")
                .query_param("id", "eq.6");
            then.status(200).json_body(serde_json::json!([]));
        });

        let api = client(&server);
        let portfolio = api.fetch_portfolio(5).await.unwrap().unwrap();
        assert_eq!(portfolio.image_urls.len(), 2);
        assert!(api.fetch_portfolio(6).await.unwrap().is_none());

        found.assert();
        missing.assert();
    }

    #[tokio::test]
    async fn test_create_portfolio_stores_all_images() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(POST)
                .path("/rest/v1/portfolios")
                .json_body_partial(
                    r#"{"image_url": "https://img/p.jpg", "image_urls": ["https://img/p.jpg", "https://img/q.jpg"]}"#,
                );
            then.status(201).json_body(serde_json::json!([{
                "id": 21,
                "name": "판교 오피스",
                "location": "판교",
                "image_url": "https://img/p.jpg",
                "image_urls": ["https://img/p.jpg", "https://img/q.jpg"]
            }]));
        });

        let created = client(&server)
            .create_portfolio(NewPortfolio {
                name: "판교 오피스".to_string(),
                location: "판교".to_string(),
                image_url: "https://img/p.jpg".to_string(),
                image_urls: vec!["https://img/q.jpg".to_string()],
                ..Default::default()
            })
            .await
            .unwrap();

        mock.assert();
        assert_eq!(created.id, 21);
    }

    #[tokio::test]
    async fn test_site_setting_roundtrip_requests() {
        let server = MockServer::start();
        let read = server.mock(|when, then| {
            when.method(GET)
                .path("/rest/v1/site_settings")
                .query_param("select", "value")
                .query_param("key", "eq.hero_image_url");
            then.status(200)
                .json_body(serde_json::json!([{"value": "https://img/hero.jpg"}]));
        });
        let write = server.mock(|when, then| {
            when.method(POST)
                .path("/rest/v1/site_settings")
                .query_param("on_conflict", "key")
                .header("Prefer", "resolution=merge-duplicates,return=minimal")
                .json_body_partial(r#"{"key": "hero_image_url", "value": "https://img/new.jpg"}"#);
            then.status(201);
        });

        let api = client(&server);
        assert_eq!(
            api.fetch_site_setting("hero_image_url").await.unwrap(),
            "https://img/hero.jpg"
        );
        api.set_site_setting("hero_image_url", "https://img/new.jpg")
            .await
            .unwrap();

        read.assert();
        write.assert();
    }

    #[tokio::test]
    async fn test_missing_setting_reads_empty() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/rest/v1/site_settings");
            then.status(200).json_body(serde_json::json!([]));
        });

        assert_eq!(client(&server).fetch_site_setting("hero_image_url").await.unwrap(), "");
    }

    #[tokio::test]
    async fn test_update_lead_status_patch() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(PATCH)
                .path("/rest/v1/leads")
                .query_param("id", "eq.9")
                .json_body(serde_json::json!({"status": "견적완료"}));
            then.status(204);
        });

        client(&server)
            .update_lead_status(9, LeadStatus::Quoted)
            .await
            .unwrap();
        mock.assert();
    }
}
