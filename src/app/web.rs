//! JSON API served with axum.

use crate::core::admin::{AdminConsole, AdminSession, SessionStore};
use crate::core::landing::{load_landing, LandingPage};
use crate::core::portfolio::{portfolio_detail, PortfolioFilter, PortfolioPager};
use crate::core::{pricing, submission};
use crate::domain::model::{ContactInfo, EstimateInput, LeadStatus, NewPortfolio};
use crate::domain::ports::{AdminGate, Backend};
use crate::utils::error::{ErrorCategory, SiteError};
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{Html, IntoResponse, Response};
use axum::routing::{get, patch, post, put};
use axum::{Json, Router};
use serde::Deserialize;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub const SESSION_HEADER: &str = "x-admin-session";

#[derive(Clone)]
pub struct AppState {
    pub backend: Arc<dyn Backend>,
    pub gate: Arc<dyn AdminGate>,
    pub sessions: Arc<SessionStore>,
}

impl AppState {
    pub fn new(backend: Arc<dyn Backend>, gate: Arc<dyn AdminGate>, sessions: SessionStore) -> Self {
        Self {
            backend,
            gate,
            sessions: Arc::new(sessions),
        }
    }

    fn session(&self, headers: &HeaderMap) -> Result<AdminSession, SiteError> {
        let token = headers
            .get(SESSION_HEADER)
            .and_then(|v| v.to_str().ok())
            .ok_or(SiteError::Unauthorized)?;
        self.sessions.validate(token)
    }
}

impl IntoResponse for SiteError {
    fn into_response(self) -> Response {
        let status = match self.category() {
            ErrorCategory::Validation => StatusCode::UNPROCESSABLE_ENTITY,
            ErrorCategory::NotFound => StatusCode::NOT_FOUND,
            ErrorCategory::Auth => StatusCode::UNAUTHORIZED,
            ErrorCategory::Persistence => StatusCode::BAD_GATEWAY,
            ErrorCategory::Config | ErrorCategory::System => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status.is_server_error() {
            tracing::error!("❌ {} (Severity: {:?})", self, self.severity());
        }
        let body = serde_json::json!({
            "error": self.to_string(),
            "message": self.user_friendly_message(),
            "suggestion": self.recovery_suggestion(),
        });
        (status, Json(body)).into_response()
    }
}

impl From<JsonRejection> for SiteError {
    fn from(rejection: JsonRejection) -> Self {
        SiteError::InvalidInput {
            field: "body".to_string(),
            value: String::new(),
            reason: rejection.body_text(),
        }
    }
}

type ApiResult<T> = Result<Json<T>, SiteError>;

/// Request bodies go through `SiteError` so malformed input gets the same JSON error shape.
type Payload<T> = Result<Json<T>, JsonRejection>;

/// Create the web router
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(index_handler))
        .route("/api/health", get(health_handler))
        .route("/api/home", get(home_handler))
        .route("/api/portfolios", get(portfolios_handler))
        .route("/api/portfolios/{id}", get(portfolio_detail_handler))
        .route("/api/estimate", post(estimate_handler))
        .route("/api/leads", post(create_lead_handler))
        .route("/api/admin/login", post(login_handler))
        .route("/api/admin/logout", post(logout_handler))
        .route("/api/admin/dashboard", get(dashboard_handler))
        .route("/api/admin/portfolios", post(add_portfolio_handler))
        .route("/api/admin/hero-image", put(hero_image_handler))
        .route("/api/admin/leads/{id}/status", patch(lead_status_handler))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

async fn index_handler() -> Html<&'static str> {
    Html(
        r#"<!DOCTYPE html>
<html lang="ko">
<head><meta charset="UTF-8"><title>Interior Studio API</title></head>
<body>
    <h1>Interior Studio API</h1>
    <ul>
        <li><a href="/api/home">/api/home</a> - hero image, featured projects, reviews</li>
        <li><a href="/api/portfolios">/api/portfolios</a> - filterable portfolio list</li>
        <li>/api/portfolios/{id} - project detail</li>
        <li>POST /api/estimate - price an estimate</li>
        <li>POST /api/leads - request a quote</li>
        <li>/api/admin/* - admin console</li>
    </ul>
</body>
</html>"#,
    )
}

async fn health_handler() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "healthy" }))
}

async fn home_handler(State(state): State<AppState>) -> Json<LandingPage> {
    Json(load_landing(state.backend.as_ref()).await)
}

#[derive(Debug, Default, Deserialize)]
struct PortfolioQuery {
    #[serde(default)]
    industry: String,
    #[serde(default)]
    style: String,
    /// Number of "load more" presses.
    #[serde(default)]
    more: usize,
}

async fn portfolios_handler(
    State(state): State<AppState>,
    Query(query): Query<PortfolioQuery>,
) -> ApiResult<crate::core::portfolio::PortfolioPage> {
    let projects = state.backend.fetch_portfolios().await?;
    let mut pager = PortfolioPager::new(projects);
    pager.set_filter(PortfolioFilter::new(&query.industry, &query.style));
    for _ in 0..query.more {
        if !pager.has_more() {
            break;
        }
        pager.load_more();
    }
    Ok(Json(pager.page()))
}

async fn portfolio_detail_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<crate::core::portfolio::PortfolioDetail> {
    Ok(Json(portfolio_detail(state.backend.as_ref(), &id).await?))
}

async fn estimate_handler(payload: Payload<EstimateInput>) -> ApiResult<serde_json::Value> {
    let Json(input) = payload?;
    let result = pricing::estimate_for(&input);
    Ok(Json(serde_json::json!({
        "low": result.low,
        "high": result.high,
        "display": input.category.map(|_| result.to_string()),
    })))
}

#[derive(Debug, Deserialize)]
struct LeadRequest {
    contact: ContactInfo,
    estimate: EstimateInput,
}

async fn create_lead_handler(
    State(state): State<AppState>,
    payload: Payload<LeadRequest>,
) -> Result<(StatusCode, Json<crate::domain::model::Lead>), SiteError> {
    let Json(request) = payload?;
    // 以伺服器端重新計算的金額為準
    let result = pricing::estimate_for(&request.estimate);
    let lead = submission::submit(
        state.backend.as_ref(),
        &request.contact,
        &request.estimate,
        result,
    )
    .await?;
    Ok((StatusCode::CREATED, Json(lead)))
}

#[derive(Debug, Deserialize)]
struct LoginRequest {
    id: String,
    password: String,
}

async fn login_handler(
    State(state): State<AppState>,
    payload: Payload<LoginRequest>,
) -> ApiResult<serde_json::Value> {
    let Json(request) = payload?;
    let session = state
        .sessions
        .login(state.gate.as_ref(), &request.id, &request.password)?;
    Ok(Json(serde_json::json!({
        "session": session.token(),
        "unlocked_at": session.unlocked_at(),
    })))
}

async fn logout_handler(State(state): State<AppState>, headers: HeaderMap) -> StatusCode {
    if let Some(token) = headers.get(SESSION_HEADER).and_then(|v| v.to_str().ok()) {
        state.sessions.logout(token);
    }
    StatusCode::NO_CONTENT
}

async fn dashboard_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> ApiResult<crate::core::admin::Dashboard> {
    let session = state.session(&headers)?;
    let console = AdminConsole::new(state.backend.as_ref(), &session);
    Ok(Json(console.dashboard().await?))
}

async fn add_portfolio_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Payload<NewPortfolio>,
) -> Result<(StatusCode, Json<crate::domain::model::Portfolio>), SiteError> {
    let session = state.session(&headers)?;
    let Json(draft) = payload?;
    let console = AdminConsole::new(state.backend.as_ref(), &session);
    let created = console.add_portfolio(draft).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

#[derive(Debug, Deserialize)]
struct HeroImageRequest {
    url: String,
}

async fn hero_image_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Payload<HeroImageRequest>,
) -> Result<StatusCode, SiteError> {
    let session = state.session(&headers)?;
    let Json(request) = payload?;
    AdminConsole::new(state.backend.as_ref(), &session)
        .set_hero_image(&request.url)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Deserialize)]
struct StatusRequest {
    status: LeadStatus,
}

async fn lead_status_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<i64>,
    payload: Payload<StatusRequest>,
) -> Result<StatusCode, SiteError> {
    let session = state.session(&headers)?;
    let Json(request) = payload?;
    AdminConsole::new(state.backend.as_ref(), &session)
        .update_lead_status(id, request.status)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
