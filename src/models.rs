//! Data structures and types for CineGraph
//!
//! Contains the shared models used across the application organized by domain:
//! - **Titles**: search/trending summaries and full movie metadata
//! - **Availability**: region-scoped watch offers grouped by category
//! - **Regions**: the fixed set of supported country codes

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

// =============================================================================
// Title Models
// =============================================================================

/// Genre tag attached to a title
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Genre {
    pub id: u64,
    pub name: String,
}

/// Subset of title fields returned by search, trending and recommendations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TitleSummary {
    pub id: u64,
    pub title: String,
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default)]
    pub vote_average: Option<f32>,
    #[serde(default)]
    pub overview: Option<String>,
}

impl TitleSummary {
    pub fn year(&self) -> Option<u16> {
        self.release_date.as_deref().and_then(extract_year)
    }
}

impl fmt::Display for TitleSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let year_str = self.year().map(|y| format!(" ({})", y)).unwrap_or_default();
        match self.vote_average {
            Some(rating) if rating > 0.0 => {
                write!(f, "{}{} ⭐ {:.1}", self.title, year_str, rating)
            }
            _ => write!(f, "{}{}", self.title, year_str),
        }
    }
}

/// Full movie metadata. Replaced wholesale on every fetch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Title {
    pub id: u64,
    pub title: String,
    #[serde(default)]
    pub overview: Option<String>,
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default)]
    pub vote_average: Option<f32>,
    #[serde(default)]
    pub runtime: Option<u32>,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default)]
    pub backdrop_path: Option<String>,
    #[serde(default)]
    pub genres: Vec<Genre>,
    #[serde(default)]
    pub tagline: Option<String>,
}

impl Title {
    pub fn year(&self) -> Option<u16> {
        self.release_date.as_deref().and_then(extract_year)
    }

    /// Rating clamped to the 0-10 scale
    pub fn rating(&self) -> Option<f32> {
        self.vote_average.map(|r| r.clamp(0.0, 10.0))
    }

    pub fn genre_names(&self) -> Vec<&str> {
        self.genres.iter().map(|g| g.name.as_str()).collect()
    }
}

impl fmt::Display for Title {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.title)?;
        if let Some(year) = self.year() {
            write!(f, " ({})", year)?;
        }
        if let Some(runtime) = self.runtime.filter(|r| *r > 0) {
            write!(f, " - {}h {}m", runtime / 60, runtime % 60)?;
        }
        if let Some(rating) = self.rating().filter(|r| *r > 0.0) {
            write!(f, " - ⭐ {:.1}", rating)?;
        }
        Ok(())
    }
}

/// Source title plus the titles recommended from it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendations {
    pub source: Title,
    pub titles: Vec<TitleSummary>,
}

// =============================================================================
// Availability Models
// =============================================================================

/// How a provider offers a title
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OfferCategory {
    Subscription,
    Rent,
    Buy,
}

impl OfferCategory {
    pub const ALL: [OfferCategory; 3] = [
        OfferCategory::Subscription,
        OfferCategory::Rent,
        OfferCategory::Buy,
    ];
}

impl fmt::Display for OfferCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OfferCategory::Subscription => write!(f, "Stream"),
            OfferCategory::Rent => write!(f, "Rent"),
            OfferCategory::Buy => write!(f, "Buy"),
        }
    }
}

/// A single provider offer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AvailabilityOffer {
    pub provider_id: u64,
    pub provider_name: String,
    #[serde(default)]
    pub logo_path: Option<String>,
    #[serde(default)]
    pub link: Option<String>,
}

/// Where a title can be watched in one region.
///
/// A record is always keyed by a single region; offers from two regions are
/// never merged into one value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StreamingAvailability {
    pub title_id: u64,
    pub region: Region,
    #[serde(default)]
    pub subscription: Vec<AvailabilityOffer>,
    #[serde(default)]
    pub rent: Vec<AvailabilityOffer>,
    #[serde(default)]
    pub buy: Vec<AvailabilityOffer>,
    #[serde(default)]
    pub external_link: Option<String>,
}

impl StreamingAvailability {
    /// Record with no offers, used when the region has no data
    pub fn empty(title_id: u64, region: Region) -> Self {
        Self {
            title_id,
            region,
            subscription: Vec::new(),
            rent: Vec::new(),
            buy: Vec::new(),
            external_link: None,
        }
    }

    pub fn offers(&self, category: OfferCategory) -> &[AvailabilityOffer] {
        match category {
            OfferCategory::Subscription => &self.subscription,
            OfferCategory::Rent => &self.rent,
            OfferCategory::Buy => &self.buy,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.subscription.is_empty() && self.rent.is_empty() && self.buy.is_empty()
    }
}

// =============================================================================
// Region Models
// =============================================================================

/// Supported regions: (code, display name)
pub const REGIONS: &[(&str, &str)] = &[
    ("US", "United States"),
    ("IN", "India"),
    ("GB", "United Kingdom"),
    ("CA", "Canada"),
    ("AU", "Australia"),
    ("DE", "Germany"),
    ("FR", "France"),
    ("ES", "Spain"),
    ("IT", "Italy"),
    ("BR", "Brazil"),
    ("MX", "Mexico"),
    ("JP", "Japan"),
    ("KR", "South Korea"),
    ("SG", "Singapore"),
    ("AE", "United Arab Emirates"),
    ("NL", "Netherlands"),
    ("SE", "Sweden"),
    ("NO", "Norway"),
    ("DK", "Denmark"),
    ("FI", "Finland"),
    ("PL", "Poland"),
    ("TR", "Turkey"),
    ("ZA", "South Africa"),
    ("AR", "Argentina"),
    ("CL", "Chile"),
    ("CO", "Colombia"),
    ("ID", "Indonesia"),
    ("TH", "Thailand"),
    ("MY", "Malaysia"),
    ("PH", "Philippines"),
    ("NZ", "New Zealand"),
    ("IE", "Ireland"),
    ("PT", "Portugal"),
    ("GR", "Greece"),
    ("CZ", "Czech Republic"),
    ("HU", "Hungary"),
    ("RO", "Romania"),
    ("AT", "Austria"),
    ("CH", "Switzerland"),
    ("BE", "Belgium"),
    ("HK", "Hong Kong"),
];

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegionError {
    #[error("Unsupported region code: {0:?}")]
    Unsupported(String),
}

/// Two-letter country code from the supported set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(into = "String")]
pub struct Region(&'static str);

impl Region {
    pub const US: Region = Region("US");
    pub const GB: Region = Region("GB");
    pub const IN: Region = Region("IN");

    /// Parse a code case-insensitively
    pub fn parse(code: &str) -> Result<Self, RegionError> {
        let wanted = code.trim().to_ascii_uppercase();
        REGIONS
            .iter()
            .find(|(c, _)| *c == wanted)
            .map(|(c, _)| Region(c))
            .ok_or_else(|| RegionError::Unsupported(code.to_string()))
    }

    pub fn code(&self) -> &'static str {
        self.0
    }

    pub fn name(&self) -> &'static str {
        REGIONS
            .iter()
            .find(|(c, _)| *c == self.0)
            .map(|(_, n)| *n)
            .unwrap_or(self.0)
    }

    pub fn all() -> impl Iterator<Item = Region> {
        REGIONS.iter().map(|(c, _)| Region(c))
    }

    /// Regions whose code or name contains `query` (case-insensitive)
    pub fn filter(query: &str) -> Vec<Region> {
        let needle = query.trim().to_lowercase();
        Self::all()
            .filter(|r| {
                needle.is_empty()
                    || r.code().to_lowercase().contains(&needle)
                    || r.name().to_lowercase().contains(&needle)
            })
            .collect()
    }
}

impl Default for Region {
    fn default() -> Self {
        Region::US
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

impl<'de> Deserialize<'de> for Region {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let code = String::deserialize(deserializer)?;
        Region::parse(&code).map_err(serde::de::Error::custom)
    }
}

impl TryFrom<String> for Region {
    type Error = RegionError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Region::parse(&value)
    }
}

impl From<Region> for String {
    fn from(region: Region) -> String {
        region.0.to_string()
    }
}

impl std::str::FromStr for Region {
    type Err = RegionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Region::parse(s)
    }
}

/// Extract year from a date string like "2022-03-04"
pub fn extract_year(date: &str) -> Option<u16> {
    date.get(..4).and_then(|y| y.parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_year() {
        assert_eq!(extract_year("2022-03-04"), Some(2022));
        assert_eq!(extract_year(""), None);
        assert_eq!(extract_year("abc"), None);
    }

    #[test]
    fn test_region_parse_is_case_insensitive() {
        assert_eq!(Region::parse("gb"), Ok(Region::GB));
        assert_eq!(Region::parse(" in "), Ok(Region::IN));
        assert_eq!(Region::parse("US").map(|r| r.name()), Ok("United States"));
    }

    #[test]
    fn test_region_rejects_unknown_codes() {
        assert!(Region::parse("XX").is_err());
        assert!(Region::parse("").is_err());
        assert!(Region::parse("USA").is_err());
    }

    #[test]
    fn test_region_serde_uses_code() {
        let json = serde_json::to_string(&Region::GB).unwrap();
        assert_eq!(json, "\"GB\"");
        let parsed: Region = serde_json::from_str("\"de\"").unwrap();
        assert_eq!(parsed.code(), "DE");
        assert!(serde_json::from_str::<Region>("\"ZZ\"").is_err());
    }

    #[test]
    fn test_availability_deserializes_region_field() {
        let json = r#"{"title_id": 78, "region": "gb", "subscription": [{"provider_id": 8, "provider_name": "Netflix"}]}"#;
        let availability: StreamingAvailability = serde_json::from_str(json).unwrap();
        assert_eq!(availability.region, Region::GB);
        assert_eq!(availability.subscription[0].provider_name, "Netflix");
        assert!(availability.rent.is_empty());

        let bad = r#"{"title_id": 78, "region": "ZZ"}"#;
        assert!(serde_json::from_str::<StreamingAvailability>(bad).is_err());
    }

    #[test]
    fn test_region_filter_matches_name_or_code() {
        let kingdom = Region::filter("kingdom");
        assert_eq!(kingdom, vec![Region::GB]);
        assert!(Region::filter("").len() == REGIONS.len());
        assert!(Region::filter("ch").contains(&Region::parse("CH").unwrap()));
    }

    #[test]
    fn test_title_display() {
        let title = Title {
            id: 1,
            title: "The Batman".into(),
            overview: None,
            release_date: Some("2022-03-01".into()),
            vote_average: Some(7.8),
            runtime: Some(176),
            poster_path: None,
            backdrop_path: None,
            genres: vec![],
            tagline: None,
        };
        assert_eq!(title.to_string(), "The Batman (2022) - 2h 56m - ⭐ 7.8");
    }

    #[test]
    fn test_availability_empty() {
        let availability = StreamingAvailability::empty(7, Region::US);
        assert!(availability.is_empty());
        for category in OfferCategory::ALL {
            assert!(availability.offers(category).is_empty());
        }
    }
}
