use crate::domain::model::Portfolio;
use crate::domain::ports::PortfolioRepository;
use crate::utils::error::{Result, SiteError};
use serde::Serialize;

/// 顯示用的預設圖片 (資料列中的網址不是 http 開頭時使用)
pub const FALLBACK_IMAGE: &str = "https://images.unsplash.com/photo-1676716244847-3fae1a2afb5b?w=1080";

/// Visible window size and "load more" increment.
pub const PAGE_SIZE: usize = 6;

pub const ALL_LABEL: &str = "전체";
pub const INDUSTRIES: [&str; 5] = ["카페", "레스토랑", "오피스", "리테일", "호텔"];
pub const STYLES: [&str; 5] = ["모던", "미니멀", "럭셔리", "인더스트리얼", "빈티지"];

pub fn normalize_image_url(url: &str) -> String {
    if url.starts_with("http") {
        url.to_string()
    } else {
        FALLBACK_IMAGE.to_string()
    }
}

/// Additional images when present, otherwise the primary one.
pub fn gallery_images(portfolio: &Portfolio) -> Vec<String> {
    let raw: Vec<&String> = if portfolio.image_urls.is_empty() {
        std::iter::once(&portfolio.image_url)
            .filter(|u| !u.is_empty())
            .collect()
    } else {
        portfolio.image_urls.iter().collect()
    };
    raw.into_iter().map(|u| normalize_image_url(u)).collect()
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum FilterValue {
    #[default]
    All,
    Only(String),
}

impl FilterValue {
    /// `전체`, `all` and blank mean no filtering.
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed == ALL_LABEL || trimmed.eq_ignore_ascii_case("all") {
            FilterValue::All
        } else {
            FilterValue::Only(trimmed.to_string())
        }
    }

    pub fn matches(&self, value: &str) -> bool {
        match self {
            FilterValue::All => true,
            FilterValue::Only(expected) => expected == value,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PortfolioFilter {
    pub industry: FilterValue,
    pub style: FilterValue,
}

impl PortfolioFilter {
    pub fn new(industry: &str, style: &str) -> Self {
        Self {
            industry: FilterValue::parse(industry),
            style: FilterValue::parse(style),
        }
    }

    pub fn matches(&self, portfolio: &Portfolio) -> bool {
        self.industry.matches(&portfolio.industry) && self.style.matches(&portfolio.style)
    }

    /// Keeps the fetch order.
    pub fn apply<'a>(&self, projects: &'a [Portfolio]) -> Vec<&'a Portfolio> {
        projects.iter().filter(|p| self.matches(p)).collect()
    }
}

/// Filtered list with a growing "load more" window.
///
/// Changing the filter resets the window to [`PAGE_SIZE`].
#[derive(Debug, Clone)]
pub struct PortfolioPager {
    projects: Vec<Portfolio>,
    filter: PortfolioFilter,
    visible: usize,
}

impl PortfolioPager {
    pub fn new(projects: Vec<Portfolio>) -> Self {
        Self {
            projects,
            filter: PortfolioFilter::default(),
            visible: PAGE_SIZE,
        }
    }

    pub fn filter(&self) -> &PortfolioFilter {
        &self.filter
    }

    pub fn set_filter(&mut self, filter: PortfolioFilter) {
        if filter != self.filter {
            self.visible = PAGE_SIZE;
        }
        self.filter = filter;
    }

    pub fn filtered(&self) -> Vec<&Portfolio> {
        self.filter.apply(&self.projects)
    }

    pub fn total(&self) -> usize {
        self.filtered().len()
    }

    pub fn load_more(&mut self) {
        self.visible = (self.visible + PAGE_SIZE).min(self.total());
    }

    pub fn visible_items(&self) -> Vec<&Portfolio> {
        let mut items = self.filtered();
        items.truncate(self.visible);
        items
    }

    pub fn has_more(&self) -> bool {
        self.visible < self.total()
    }

    pub fn page(&self) -> PortfolioPage {
        let items: Vec<PortfolioCard> = self
            .visible_items()
            .into_iter()
            .map(PortfolioCard::from)
            .collect();
        PortfolioPage {
            total: self.total(),
            visible: items.len(),
            has_more: self.has_more(),
            items,
            filters: FilterChoices::catalog(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PortfolioCard {
    pub id: i64,
    pub title: String,
    pub location: String,
    pub area: String,
    pub price: String,
    pub industry: String,
    pub style: String,
    pub duration: String,
    pub image: String,
    pub tags: Vec<String>,
}

impl From<&Portfolio> for PortfolioCard {
    fn from(p: &Portfolio) -> Self {
        Self {
            id: p.id,
            title: p.name.clone(),
            location: p.location.clone(),
            area: p.area.clone(),
            price: p.budget.clone(),
            industry: p.industry.clone(),
            style: p.style.clone(),
            duration: p.duration.clone(),
            image: normalize_image_url(&p.image_url),
            tags: vec![p.industry.clone(), p.area.clone()],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PortfolioPage {
    pub total: usize,
    pub visible: usize,
    pub has_more: bool,
    pub items: Vec<PortfolioCard>,
    pub filters: FilterChoices,
}

/// Dropdown entries for the two filters, `전체` first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilterChoices {
    pub industries: Vec<&'static str>,
    pub styles: Vec<&'static str>,
}

impl FilterChoices {
    pub fn catalog() -> Self {
        let with_all = |values: &[&'static str]| -> Vec<&'static str> {
            std::iter::once(ALL_LABEL)
                .chain(values.iter().copied())
                .collect()
        };
        Self {
            industries: with_all(&INDUSTRIES),
            styles: with_all(&STYLES),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PortfolioDetail {
    #[serde(flatten)]
    pub portfolio: Portfolio,
    pub gallery: Vec<String>,
}

/// Resolves a route id like `"12"` into a project with its gallery.
pub async fn portfolio_detail<R>(repository: &R, raw_id: &str) -> Result<PortfolioDetail>
where
    R: PortfolioRepository + ?Sized,
{
    let id: i64 = raw_id
        .trim()
        .parse()
        .map_err(|_| SiteError::not_found("Portfolio", raw_id))?;

    let portfolio = repository
        .fetch_portfolio(id)
        .await?
        .ok_or_else(|| SiteError::not_found("Portfolio", id))?;

    let gallery = gallery_images(&portfolio);
    Ok(PortfolioDetail { portfolio, gallery })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn project(id: i64, industry: &str, style: &str) -> Portfolio {
        Portfolio {
            id,
            name: format!("프로젝트 {}", id),
            location: "서울 성수동".to_string(),
            area: "40평".to_string(),
            budget: "8,000만원".to_string(),
            industry: industry.to_string(),
            style: style.to_string(),
            duration: "4주".to_string(),
            image_url: format!("https://img.example.com/{}.jpg", id),
            image_urls: Vec::new(),
            created_at: None,
        }
    }

    fn catalog(n: i64) -> Vec<Portfolio> {
        (1..=n)
            .map(|i| {
                let industry = if i % 2 == 0 { "카페" } else { "오피스" };
                project(i, industry, "모던")
            })
            .collect()
    }

    #[test]
    fn test_page_carries_filter_choices() {
        let page = PortfolioPager::new(catalog(2)).page();
        assert_eq!(page.filters.industries[0], ALL_LABEL);
        assert_eq!(page.filters.industries.len(), INDUSTRIES.len() + 1);
        assert_eq!(page.filters.styles[1..], STYLES[..]);
    }

    #[test]
    fn test_filter_values() {
        assert_eq!(FilterValue::parse("전체"), FilterValue::All);
        assert_eq!(FilterValue::parse(" ALL "), FilterValue::All);
        assert_eq!(FilterValue::parse(""), FilterValue::All);
        assert_eq!(FilterValue::parse("카페"), FilterValue::Only("카페".to_string()));
    }

    #[test]
    fn test_filter_preserves_fetch_order() {
        let projects = catalog(10);
        let ids: Vec<i64> = PortfolioFilter::new("카페", "전체")
            .apply(&projects)
            .iter()
            .map(|p| p.id)
            .collect();
        assert_eq!(ids, vec![2, 4, 6, 8, 10]);

        assert!(PortfolioFilter::new("전체", "빈티지").apply(&projects).is_empty());
    }

    #[test]
    fn test_load_more_grows_and_caps() {
        let mut pager = PortfolioPager::new(catalog(14));
        assert_eq!(pager.visible_items().len(), 6);
        assert!(pager.has_more());

        pager.load_more();
        assert_eq!(pager.visible_items().len(), 12);
        pager.load_more();
        assert_eq!(pager.visible_items().len(), 14);
        assert!(!pager.has_more());
        pager.load_more();
        assert_eq!(pager.visible_items().len(), 14);
    }

    #[test]
    fn test_filter_change_resets_window() {
        let mut pager = PortfolioPager::new(catalog(30));
        pager.load_more();
        pager.load_more();
        assert_eq!(pager.visible_items().len(), 18);

        pager.set_filter(PortfolioFilter::new("카페", "전체"));
        let page = pager.page();
        assert_eq!(page.total, 15);
        assert_eq!(page.visible, 6);
        assert!(page.has_more);
        assert_eq!(page.items[0].id, 2);
    }

    #[test]
    fn test_same_filter_keeps_window() {
        let mut pager = PortfolioPager::new(catalog(30));
        pager.load_more();
        pager.set_filter(PortfolioFilter::default());
        assert_eq!(pager.visible_items().len(), 12);
    }

    #[test]
    fn test_gallery_prefers_additional_images() {
        let mut p = project(1, "카페", "모던");
        assert_eq!(gallery_images(&p), vec!["https://img.example.com/1.jpg"]);

        p.image_urls = vec!["https://img.example.com/a.jpg".to_string(), "local.png".to_string()];
        assert_eq!(
            gallery_images(&p),
            vec!["https://img.example.com/a.jpg".to_string(), FALLBACK_IMAGE.to_string()]
        );

        p.image_urls.clear();
        p.image_url.clear();
        assert!(gallery_images(&p).is_empty());
    }

    #[test]
    fn test_card_tags_and_image() {
        let mut p = project(3, "리테일", "미니멀");
        p.image_url = "/uploads/3.jpg".to_string();
        let card = PortfolioCard::from(&p);
        assert_eq!(card.tags, vec!["리테일", "40평"]);
        assert_eq!(card.image, FALLBACK_IMAGE);
        assert_eq!(card.price, "8,000만원");
    }
}
