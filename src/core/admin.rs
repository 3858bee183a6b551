use crate::domain::model::{Lead, LeadStatus, NewPortfolio, Portfolio, HERO_IMAGE_KEY};
use crate::domain::ports::{AdminGate, Backend};
use crate::utils::error::{Result, SiteError};
use crate::utils::validation::require_filled;
use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Compares against a configured id/password pair.
///
/// Low assurance: plaintext comparison, no rate limiting. Either secret left
/// blank disables login entirely.
#[derive(Debug, Clone, Default)]
pub struct StaticCredentialGate {
    id: Option<String>,
    password: Option<String>,
}

impl StaticCredentialGate {
    pub fn new(id: Option<String>, password: Option<String>) -> Self {
        Self { id, password }
    }

    pub fn is_configured(&self) -> bool {
        let filled = |v: &Option<String>| v.as_deref().is_some_and(|s| !s.trim().is_empty());
        filled(&self.id) && filled(&self.password)
    }
}

impl AdminGate for StaticCredentialGate {
    fn authenticate(&self, id: &str, password: &str) -> bool {
        if !self.is_configured() {
            return false;
        }
        self.id.as_deref() == Some(id) && self.password.as_deref() == Some(password)
    }
}

pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Proof that someone passed the admin gate. Only [`SessionStore`] creates these.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AdminSession {
    token: String,
    unlocked_at: DateTime<Utc>,
}

impl AdminSession {
    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn unlocked_at(&self) -> DateTime<Utc> {
        self.unlocked_at
    }
}

/// Upper bound on concurrently open admin sessions.
pub const MAX_SESSIONS: usize = 32;

/// In-process admin sessions keyed by opaque token.
///
/// Without a TTL a session lives until logout, like the browser-tab flag it
/// replaces.
pub struct SessionStore {
    sessions: Mutex<HashMap<String, AdminSession>>,
    clock: Arc<dyn Clock>,
    ttl: Option<Duration>,
}

impl SessionStore {
    pub fn new(ttl: Option<Duration>) -> Self {
        Self::with_clock(Arc::new(SystemClock), ttl)
    }

    pub fn with_clock(clock: Arc<dyn Clock>, ttl: Option<Duration>) -> Self {
        Self {
            sessions: Mutex::new(HashMap::new()),
            clock,
            ttl,
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, AdminSession>> {
        self.sessions.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn login<G>(&self, gate: &G, id: &str, password: &str) -> Result<AdminSession>
    where
        G: AdminGate + ?Sized,
    {
        if !gate.authenticate(id, password) {
            tracing::warn!("Admin login rejected");
            return Err(SiteError::Unauthorized);
        }

        let session = AdminSession {
            token: uuid::Uuid::new_v4().simple().to_string(),
            unlocked_at: self.clock.now(),
        };
        let mut sessions = self.lock();
        self.prune(&mut sessions);
        sessions.insert(session.token.clone(), session.clone());
        drop(sessions);
        tracing::info!("🔓 Admin session opened");
        Ok(session)
    }

    /// Drops expired sessions, then the oldest ones until there is room for one more.
    fn prune(&self, sessions: &mut HashMap<String, AdminSession>) {
        if let Some(ttl) = self.ttl {
            let now = self.clock.now();
            sessions.retain(|_, s| now - s.unlocked_at < ttl);
        }
        while sessions.len() >= MAX_SESSIONS {
            let oldest = sessions
                .values()
                .min_by_key(|s| s.unlocked_at)
                .map(|s| s.token.clone());
            match oldest {
                Some(token) => {
                    sessions.remove(&token);
                }
                None => break,
            }
        }
    }

    pub fn validate(&self, token: &str) -> Result<AdminSession> {
        let mut sessions = self.lock();
        let session = sessions.get(token).cloned().ok_or(SiteError::Unauthorized)?;

        if let Some(ttl) = self.ttl {
            if self.clock.now() - session.unlocked_at >= ttl {
                sessions.remove(token);
                tracing::info!("Admin session expired");
                return Err(SiteError::Unauthorized);
            }
        }
        Ok(session)
    }

    pub fn logout(&self, token: &str) -> bool {
        self.lock().remove(token).is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatusCount {
    pub status: LeadStatus,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dashboard {
    pub leads: Vec<Lead>,
    pub portfolios: Vec<Portfolio>,
    pub hero_image_url: String,
    pub status_counts: Vec<StatusCount>,
}

pub fn count_by_status(leads: &[Lead]) -> Vec<StatusCount> {
    LeadStatus::ALL
        .into_iter()
        .map(|status| StatusCount {
            status,
            count: leads.iter().filter(|l| l.status == status).count(),
        })
        .collect()
}

/// Admin operations. Construction requires a live session.
pub struct AdminConsole<'a, B: Backend + ?Sized> {
    backend: &'a B,
    session: &'a AdminSession,
}

impl<'a, B: Backend + ?Sized> AdminConsole<'a, B> {
    pub fn new(backend: &'a B, session: &'a AdminSession) -> Self {
        Self { backend, session }
    }

    pub async fn dashboard(&self) -> Result<Dashboard> {
        let (leads, portfolios, hero) = tokio::join!(
            self.backend.fetch_leads(),
            self.backend.fetch_portfolios(),
            self.backend.fetch_site_setting(HERO_IMAGE_KEY),
        );
        let leads = leads?;
        let status_counts = count_by_status(&leads);

        Ok(Dashboard {
            leads,
            portfolios: portfolios?,
            hero_image_url: hero?,
            status_counts,
        })
    }

    pub async fn add_portfolio(&self, draft: NewPortfolio) -> Result<Portfolio> {
        require_filled("name", &draft.name)?;
        require_filled("location", &draft.location)?;

        let created = self.backend.create_portfolio(draft).await?;
        tracing::info!(
            "➕ Portfolio #{} '{}' added (session {})",
            created.id,
            created.name,
            short_token(self.session)
        );
        Ok(created)
    }

    pub async fn set_hero_image(&self, url: &str) -> Result<()> {
        require_filled(HERO_IMAGE_KEY, url)?;
        self.backend
            .set_site_setting(HERO_IMAGE_KEY, url.trim())
            .await?;
        tracing::info!("🖼️ Hero image updated (session {})", short_token(self.session));
        Ok(())
    }

    pub async fn update_lead_status(&self, id: i64, status: LeadStatus) -> Result<()> {
        self.backend.update_lead_status(id, status).await?;
        tracing::info!("Lead #{} -> {}", id, status.label());
        Ok(())
    }
}

fn short_token(session: &AdminSession) -> &str {
    session.token.get(..8).unwrap_or(&session.token)
}
