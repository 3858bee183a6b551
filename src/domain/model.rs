use crate::utils::error::{Result, SiteError};
use chrono::{DateTime, Utc};
use serde::ser::SerializeStruct;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

/// 站台設定中 Hero 圖片的 key
pub const HERO_IMAGE_KEY: &str = "hero_image_url";

/// null 欄位視為預設值 (後端資料列常有 null)
fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BusinessCategory {
    Cafe,
    Restaurant,
    Office,
    Retail,
}

impl BusinessCategory {
    pub const ALL: [BusinessCategory; 4] = [
        BusinessCategory::Cafe,
        BusinessCategory::Restaurant,
        BusinessCategory::Office,
        BusinessCategory::Retail,
    ];

    /// 每坪基本單價 (萬元)
    pub fn base_rate(self) -> u64 {
        match self {
            BusinessCategory::Cafe => 180,
            BusinessCategory::Restaurant => 200,
            BusinessCategory::Office => 150,
            BusinessCategory::Retail => 170,
        }
    }

    pub fn key(self) -> &'static str {
        match self {
            BusinessCategory::Cafe => "cafe",
            BusinessCategory::Restaurant => "restaurant",
            BusinessCategory::Office => "office",
            BusinessCategory::Retail => "retail",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            BusinessCategory::Cafe => "카페",
            BusinessCategory::Restaurant => "레스토랑",
            BusinessCategory::Office => "오피스",
            BusinessCategory::Retail => "리테일",
        }
    }
}

impl fmt::Display for BusinessCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for BusinessCategory {
    type Err = SiteError;

    fn from_str(s: &str) -> Result<Self> {
        let needle = s.trim();
        BusinessCategory::ALL
            .into_iter()
            .find(|c| c.key().eq_ignore_ascii_case(needle) || c.label() == needle)
            .ok_or_else(|| SiteError::InvalidInput {
                field: "category".to_string(),
                value: s.to_string(),
                reason: "Unknown business category".to_string(),
            })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EstimateOption {
    Flooring,
    Lighting,
    Hvac,
    Furniture,
    Signage,
}

impl EstimateOption {
    pub const ALL: [EstimateOption; 5] = [
        EstimateOption::Flooring,
        EstimateOption::Lighting,
        EstimateOption::Hvac,
        EstimateOption::Furniture,
        EstimateOption::Signage,
    ];

    /// 每坪加價 (萬元)
    pub fn surcharge(self) -> u64 {
        match self {
            EstimateOption::Flooring => 30,
            EstimateOption::Lighting => 25,
            EstimateOption::Hvac => 50,
            EstimateOption::Furniture => 40,
            EstimateOption::Signage => 35,
        }
    }

    pub fn key(self) -> &'static str {
        match self {
            EstimateOption::Flooring => "flooring",
            EstimateOption::Lighting => "lighting",
            EstimateOption::Hvac => "hvac",
            EstimateOption::Furniture => "furniture",
            EstimateOption::Signage => "signage",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            EstimateOption::Flooring => "바닥재 시공",
            EstimateOption::Lighting => "조명 설치",
            EstimateOption::Hvac => "냉난방 시스템",
            EstimateOption::Furniture => "가구 제작",
            EstimateOption::Signage => "간판/사인물",
        }
    }
}

impl FromStr for EstimateOption {
    type Err = SiteError;

    fn from_str(s: &str) -> Result<Self> {
        let needle = s.trim();
        EstimateOption::ALL
            .into_iter()
            .find(|o| o.key().eq_ignore_ascii_case(needle) || o.label() == needle)
            .ok_or_else(|| SiteError::InvalidInput {
                field: "options".to_string(),
                value: s.to_string(),
                reason: "Unknown option".to_string(),
            })
    }
}

/// Add-on selection over the closed option catalog.
///
/// Serialized as `{"flooring": true, ...}`; keys outside the catalog are
/// rejected during deserialization.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    from = "BTreeMap<EstimateOption, bool>",
    into = "BTreeMap<EstimateOption, bool>"
)]
pub struct OptionSelection {
    selected: BTreeSet<EstimateOption>,
}

impl OptionSelection {
    pub fn set(&mut self, option: EstimateOption, on: bool) {
        if on {
            self.selected.insert(option);
        } else {
            self.selected.remove(&option);
        }
    }

    pub fn toggle(&mut self, option: EstimateOption) {
        let on = !self.is_selected(option);
        self.set(option, on);
    }

    pub fn is_selected(&self, option: EstimateOption) -> bool {
        self.selected.contains(&option)
    }

    pub fn selected(&self) -> impl Iterator<Item = EstimateOption> + '_ {
        self.selected.iter().copied()
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }
}

impl FromIterator<EstimateOption> for OptionSelection {
    fn from_iter<I: IntoIterator<Item = EstimateOption>>(iter: I) -> Self {
        Self {
            selected: iter.into_iter().collect(),
        }
    }
}

impl From<BTreeMap<EstimateOption, bool>> for OptionSelection {
    fn from(map: BTreeMap<EstimateOption, bool>) -> Self {
        map.into_iter().filter(|(_, on)| *on).map(|(o, _)| o).collect()
    }
}

impl From<OptionSelection> for BTreeMap<EstimateOption, bool> {
    fn from(selection: OptionSelection) -> Self {
        EstimateOption::ALL
            .into_iter()
            .map(|o| (o, selection.is_selected(o)))
            .collect()
    }
}

/// Floor area in 평, constrained to the slider grid: 10..=200 in steps of 5.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct AreaUnits(u32);

impl AreaUnits {
    pub const MIN: u32 = 10;
    pub const MAX: u32 = 200;
    pub const STEP: u32 = 5;
    pub const DEFAULT: u32 = 30;

    pub fn new(units: u32) -> Result<Self> {
        crate::utils::validation::validate_range("area", units, Self::MIN, Self::MAX)?;
        if units % Self::STEP != 0 {
            return Err(SiteError::InvalidInput {
                field: "area".to_string(),
                value: units.to_string(),
                reason: format!("Value must be a multiple of {}", Self::STEP),
            });
        }
        Ok(Self(units))
    }

    pub fn get(self) -> u32 {
        self.0
    }

    /// 1평 ≈ 3.3㎡
    pub fn square_meters(self) -> u32 {
        (f64::from(self.0) * 3.3).round() as u32
    }
}

impl Default for AreaUnits {
    fn default() -> Self {
        Self(Self::DEFAULT)
    }
}

impl TryFrom<u32> for AreaUnits {
    type Error = SiteError;

    fn try_from(units: u32) -> Result<Self> {
        Self::new(units)
    }
}

impl From<AreaUnits> for u32 {
    fn from(area: AreaUnits) -> Self {
        area.0
    }
}

impl fmt::Display for AreaUnits {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}평", self.0)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EstimateInput {
    #[serde(default)]
    pub category: Option<BusinessCategory>,
    #[serde(default)]
    pub area: AreaUnits,
    #[serde(default)]
    pub options: OptionSelection,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EstimateResult {
    pub low: u64,
    pub high: u64,
}

impl fmt::Display for EstimateResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}만원 ~ {}만원",
            format_thousands(self.low),
            format_thousands(self.high)
        )
    }
}

/// `1234567` -> `"1,234,567"`
pub fn format_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactInfo {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LeadStatus {
    #[default]
    #[serde(rename = "신규", alias = "new")]
    New,
    #[serde(rename = "진행중", alias = "in-progress")]
    InProgress,
    #[serde(rename = "견적완료", alias = "quoted")]
    Quoted,
    #[serde(rename = "계약완료", alias = "contracted")]
    Contracted,
}

impl LeadStatus {
    pub const ALL: [LeadStatus; 4] = [
        LeadStatus::New,
        LeadStatus::InProgress,
        LeadStatus::Quoted,
        LeadStatus::Contracted,
    ];

    pub fn label(self) -> &'static str {
        match self {
            LeadStatus::New => "신규",
            LeadStatus::InProgress => "진행중",
            LeadStatus::Quoted => "견적완료",
            LeadStatus::Contracted => "계약완료",
        }
    }
}

/// A persisted request-for-quote. Field names follow the `leads` table columns;
/// serialized rows also carry the derived `date`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Lead {
    pub id: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub client_name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub phone: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub email: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub message: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub business_type: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub area: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub budget: String,
    #[serde(default)]
    pub estimate_min: Option<u64>,
    #[serde(default)]
    pub estimate_max: Option<u64>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub status: LeadStatus,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl Lead {
    /// `YYYY-MM-DD`, empty when the row has no timestamp
    pub fn date(&self) -> String {
        self.created_at
            .map(|ts| ts.format("%Y-%m-%d").to_string())
            .unwrap_or_default()
    }
}

impl Serialize for Lead {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut row = serializer.serialize_struct("Lead", 13)?;
        row.serialize_field("id", &self.id)?;
        row.serialize_field("client_name", &self.client_name)?;
        row.serialize_field("phone", &self.phone)?;
        row.serialize_field("email", &self.email)?;
        row.serialize_field("message", &self.message)?;
        row.serialize_field("business_type", &self.business_type)?;
        row.serialize_field("area", &self.area)?;
        row.serialize_field("budget", &self.budget)?;
        row.serialize_field("estimate_min", &self.estimate_min)?;
        row.serialize_field("estimate_max", &self.estimate_max)?;
        row.serialize_field("status", &self.status)?;
        row.serialize_field("created_at", &self.created_at)?;
        row.serialize_field("date", &self.date())?;
        row.end()
    }
}

/// Payload handed to the lead collaborator; formatting happens there.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewLead {
    pub client_name: String,
    pub phone: String,
    pub email: String,
    pub message: String,
    pub business_type: String,
    pub area: u32,
    pub estimate_min: u64,
    pub estimate_max: u64,
}

impl NewLead {
    pub fn formatted_area(&self) -> String {
        format!("{}평", self.area)
    }

    pub fn formatted_budget(&self) -> String {
        EstimateResult {
            low: self.estimate_min,
            high: self.estimate_max,
        }
        .to_string()
    }
}

fn lenient_image_urls<'de, D>(deserializer: D) -> std::result::Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(parse_image_urls(raw.unwrap_or(serde_json::Value::Null)))
}

/// 圖片欄位可能是陣列、JSON 字串或 null；非字串項目一律丟棄
pub fn parse_image_urls(value: serde_json::Value) -> Vec<String> {
    match value {
        serde_json::Value::Array(items) => items
            .into_iter()
            .filter_map(|v| v.as_str().map(str::to_string))
            .collect(),
        serde_json::Value::String(s) => match serde_json::from_str::<serde_json::Value>(&s) {
            Ok(inner @ serde_json::Value::Array(_)) => parse_image_urls(inner),
            _ => Vec::new(),
        },
        _ => Vec::new(),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Portfolio {
    pub id: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub location: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub area: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub budget: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub industry: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub style: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub duration: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub image_url: String,
    #[serde(default, deserialize_with = "lenient_image_urls")]
    pub image_urls: Vec<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewPortfolio {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub area: String,
    #[serde(default)]
    pub budget: String,
    #[serde(default)]
    pub industry: String,
    #[serde(default)]
    pub style: String,
    #[serde(default)]
    pub duration: String,
    #[serde(default)]
    pub image_url: String,
    #[serde(default)]
    pub image_urls: Vec<String>,
}

impl NewPortfolio {
    /// Primary image followed by the additional ones, blanks removed.
    pub fn stored_image_urls(&self) -> Vec<String> {
        std::iter::once(&self.image_url)
            .chain(self.image_urls.iter())
            .filter(|u| !u.trim().is_empty())
            .cloned()
            .collect()
    }
}

fn rating_or_five<'de, D>(deserializer: D) -> std::result::Result<u8, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<u8>::deserialize(deserializer)?.unwrap_or(5))
}

fn default_rating() -> u8 {
    5
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Review {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub business: String,
    #[serde(default = "default_rating", deserialize_with = "rating_or_five")]
    pub rating: u8,
    #[serde(default, deserialize_with = "null_as_default")]
    pub comment: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub image: String,
}

impl Review {
    /// Shown on the landing page while the reviews table is empty.
    pub fn samples() -> Vec<Review> {
        let sample = |name: &str, business: &str, comment: &str, image: &str| Review {
            id: None,
            name: name.to_string(),
            business: business.to_string(),
            rating: 5,
            comment: comment.to_string(),
            image: image.to_string(),
        };
        vec![
            sample(
                "김민준",
                "카페 운영",
                "3주 만에 완공되었고, 디자인이 정말 만족스럽습니다. 손님들 반응이 정말 좋아요!",
                "https://images.unsplash.com/photo-1507003211169-0a1dd7228f2d?w=100&h=100&fit=crop",
            ),
            sample(
                "박서연",
                "오피스 대표",
                "예산 내에서 최고의 결과물을 만들어주셨습니다. 직원들이 너무 좋아해요.",
                "https://images.unsplash.com/photo-1494790108377-be9c29b29330?w=100&h=100&fit=crop",
            ),
            sample(
                "이준호",
                "레스토랑 사장",
                "A/S까지 완벽하게 챙겨주시는 모습에 감동했습니다. 추천합니다!",
                "https://images.unsplash.com/photo-1500648767791-00dcc994a43e?w=100&h=100&fit=crop",
            ),
        ]
    }
}
