use crate::core::portfolio::PortfolioCard;
use crate::domain::model::{Review, HERO_IMAGE_KEY};
use crate::domain::ports::{PortfolioRepository, ReviewRepository, SettingsStore};
use serde::Serialize;

pub const DEFAULT_HERO_IMAGE: &str = "https://images.unsplash.com/photo-1585503081214-2d3384d1f7b0?crop=entropy&cs=tinysrgb&fit=max&fm=jpg&q=80&w=1080";

/// Number of portfolio cards featured on the landing page.
pub const FEATURED_COUNT: usize = 3;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LandingPage {
    pub hero_image_url: String,
    pub featured: Vec<PortfolioCard>,
    pub reviews: Vec<Review>,
}

/// Builds the landing page. Never fails: each section falls back to its
/// built-in content when the backend errors or returns nothing.
pub async fn load_landing<B>(backend: &B) -> LandingPage
where
    B: PortfolioRepository + ReviewRepository + SettingsStore + ?Sized,
{
    let (portfolios, reviews, hero) = tokio::join!(
        backend.fetch_portfolios(),
        backend.fetch_reviews(),
        backend.fetch_site_setting(HERO_IMAGE_KEY),
    );

    let hero_image_url = match hero {
        Ok(url) if !url.trim().is_empty() => url.trim().to_string(),
        Ok(_) => DEFAULT_HERO_IMAGE.to_string(),
        Err(e) => {
            tracing::warn!("Hero image lookup failed, using default: {}", e);
            DEFAULT_HERO_IMAGE.to_string()
        }
    };

    let featured = match portfolios {
        Ok(list) => list.iter().take(FEATURED_COUNT).map(PortfolioCard::from).collect(),
        Err(e) => {
            tracing::warn!("Portfolio fetch failed for landing page: {}", e);
            Vec::new()
        }
    };

    let reviews = match reviews {
        Ok(list) if !list.is_empty() => list,
        Ok(_) => Review::samples(),
        Err(e) => {
            tracing::warn!("Review fetch failed, showing samples: {}", e);
            Review::samples()
        }
    };

    LandingPage {
        hero_image_url,
        featured,
        reviews,
    }
}
