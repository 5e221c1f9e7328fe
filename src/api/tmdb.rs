//! TMDB (The Movie Database) API client
//!
//! Talks to TMDB directly and shapes responses the same way the CineGraph
//! service does, so it can stand in for `BackendClient` when no service is
//! configured.
//! API docs: https://developer.themoviedb.org/docs

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;

use super::catalog::{ApiError, ApiResult, CatalogApi};
use crate::models::{AvailabilityOffer, Genre, Region, StreamingAvailability, Title, TitleSummary};

const TMDB_BASE_URL: &str = "https://api.themoviedb.org/3";
const IMAGE_BASE_URL: &str = "https://image.tmdb.org/t/p/";
const GEOLOCATION_URL: &str = "https://ipapi.co/json/";

const SEARCH_LIMIT: usize = 10;
const TRENDING_LIMIT: usize = 12;
const RECOMMENDATIONS_LIMIT: usize = 10;

/// Search URL prefixes for well-known providers, keyed by TMDB provider id
const PROVIDER_SEARCH_URLS: &[(u64, &str)] = &[
    (8, "https://www.netflix.com/search?q="),
    (337, "https://www.disneyplus.com/search?q="),
    (384, "https://www.hbomax.com/search?q="),
    (531, "https://www.paramountplus.com/search/?query="),
    (15, "https://tv.apple.com/search?q="),
    (9, "https://www.amazon.com/s?k="),
    (10, "https://www.amazon.com/s?k="),
    (2, "https://tv.apple.com/search?q="),
    (3, "https://play.google.com/store/search?q="),
    (192, "https://www.youtube.com/results?search_query="),
    (386, "https://www.peacocktv.com/search?q="),
    (350, "https://www.apple.com/apple-tv-plus/"),
    (1899, "https://www.max.com/search?q="),
];
const FALLBACK_SEARCH_URL: &str = "https://www.google.com/search?q=";

/// TMDB API client
pub struct TmdbClient {
    api_key: String,
    base_url: String,
    geolocation_url: String,
    client: reqwest::Client,
    max_retries: u32,
}

impl TmdbClient {
    /// Create a new TMDB client with the given API key
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::with_base_url(api_key, TMDB_BASE_URL)
    }

    /// Create a client with a custom base URL (for testing)
    pub fn with_base_url(api_key: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: base_url.into(),
            geolocation_url: GEOLOCATION_URL.to_string(),
            client: reqwest::Client::builder()
                .timeout(Duration::from_secs(30))
                .build()
                .unwrap_or_default(),
            max_retries: 3,
        }
    }

    /// Override the IP geolocation endpoint (for testing)
    pub fn with_geolocation_url(mut self, url: impl Into<String>) -> Self {
        self.geolocation_url = url.into();
        self
    }

    /// Make an authenticated GET request with retry logic for rate limits
    async fn get<T: for<'de> Deserialize<'de>>(&self, endpoint: &str) -> ApiResult<T> {
        let url = format!("{}{}", self.base_url, endpoint);
        let mut retries = 0;

        loop {
            let response = self
                .client
                .get(&url)
                .query(&[("api_key", self.api_key.as_str())])
                .header("Accept", "application/json")
                .send()
                .await?;

            match response.status() {
                StatusCode::OK => {
                    let body = response.text().await?;
                    return serde_json::from_str(&body).map_err(|e| {
                        ApiError::InvalidResponse(format!("JSON parse error: {}", e))
                    });
                }
                StatusCode::TOO_MANY_REQUESTS => {
                    retries += 1;
                    if retries >= self.max_retries {
                        return Err(ApiError::RateLimited);
                    }

                    // Get Retry-After header or default to exponential backoff
                    let wait_secs = response
                        .headers()
                        .get("Retry-After")
                        .and_then(|v| v.to_str().ok())
                        .and_then(|s| s.parse::<u64>().ok())
                        .unwrap_or(2u64.pow(retries));

                    tracing::warn!(endpoint, wait_secs, "TMDB rate limited, backing off");
                    tokio::time::sleep(Duration::from_secs(wait_secs)).await;
                }
                status => return Err(ApiError::from_status(status)),
            }
        }
    }

    async fn movie_list(&self, endpoint: &str) -> ApiResult<Vec<MovieRaw>> {
        let response: ListResponse = self.get(endpoint).await?;
        Ok(response.results)
    }
}

#[async_trait]
impl CatalogApi for TmdbClient {
    async fn search(&self, query: &str) -> ApiResult<Vec<TitleSummary>> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(Vec::new());
        }
        let endpoint = format!("/search/movie?query={}&page=1", urlencoding::encode(query));
        let results = self.movie_list(&endpoint).await?;
        Ok(into_summaries(results, SEARCH_LIMIT, "w185"))
    }

    async fn trending(&self) -> ApiResult<Vec<TitleSummary>> {
        let results = self.movie_list("/trending/movie/week").await?;
        Ok(into_summaries(results, TRENDING_LIMIT, "w342"))
    }

    async fn movie(&self, id: u64) -> ApiResult<Title> {
        let response: MovieDetailRaw = self.get(&format!("/movie/{}", id)).await?;
        Ok(response.into_title())
    }

    async fn streaming(&self, id: u64, region: Region) -> ApiResult<StreamingAvailability> {
        let providers: WatchProvidersResponse =
            self.get(&format!("/movie/{}/watch/providers", id)).await?;

        let mut availability = StreamingAvailability::empty(id, region);
        availability.external_link = Some(format!(
            "https://www.themoviedb.org/movie/{}/watch?locale={}",
            id,
            region.code()
        ));

        let Some(entry) = providers.results.get(region.code()) else {
            return Ok(availability);
        };

        // Deep links are provider searches for the title
        let movie_title = match self.movie(id).await {
            Ok(title) => title.title,
            Err(e) => {
                tracing::warn!(id, error = %e, "title lookup failed, offers will have no links");
                String::new()
            }
        };
        availability.subscription = into_offers(&entry.flatrate, &movie_title);
        availability.rent = into_offers(&entry.rent, &movie_title);
        availability.buy = into_offers(&entry.buy, &movie_title);
        Ok(availability)
    }

    async fn recommendations(&self, id: u64) -> ApiResult<Vec<TitleSummary>> {
        let mut results = self
            .movie_list(&format!("/movie/{}/recommendations?page=1", id))
            .await?;
        if results.is_empty() {
            results = self
                .movie_list(&format!("/movie/{}/similar?page=1", id))
                .await?;
        }
        Ok(into_summaries(results, RECOMMENDATIONS_LIMIT, "w342"))
    }

    async fn geolocate(&self) -> ApiResult<String> {
        let response = self
            .client
            .get(&self.geolocation_url)
            .header("Accept", "application/json")
            .send()
            .await?;
        if response.status() != StatusCode::OK {
            return Err(ApiError::from_status(response.status()));
        }
        let raw: GeolocationRaw = response
            .json()
            .await
            .map_err(|e| ApiError::InvalidResponse(e.to_string()))?;
        raw.country_code
            .ok_or_else(|| ApiError::InvalidResponse("missing country_code".into()))
    }
}

// =============================================================================
// Response Structures (internal deserialization)
// =============================================================================

#[derive(Debug, Deserialize)]
struct ListResponse {
    #[serde(default)]
    results: Vec<MovieRaw>,
}

#[derive(Debug, Deserialize)]
struct MovieRaw {
    id: u64,
    title: Option<String>,
    release_date: Option<String>,
    poster_path: Option<String>,
    vote_average: Option<f32>,
    overview: Option<String>,
}

impl MovieRaw {
    fn into_summary(self, poster_size: &str) -> TitleSummary {
        TitleSummary {
            id: self.id,
            title: self.title.unwrap_or_default(),
            release_date: self.release_date.filter(|d| !d.is_empty()),
            poster_path: image_url(self.poster_path.as_deref(), poster_size),
            vote_average: self.vote_average,
            overview: self.overview,
        }
    }
}

fn into_summaries(results: Vec<MovieRaw>, limit: usize, poster_size: &str) -> Vec<TitleSummary> {
    results
        .into_iter()
        .take(limit)
        .map(|m| m.into_summary(poster_size))
        .collect()
}

#[derive(Debug, Deserialize)]
struct MovieDetailRaw {
    id: u64,
    title: Option<String>,
    overview: Option<String>,
    release_date: Option<String>,
    vote_average: Option<f32>,
    poster_path: Option<String>,
    backdrop_path: Option<String>,
    runtime: Option<u32>,
    #[serde(default)]
    genres: Vec<GenreRaw>,
    tagline: Option<String>,
}

impl MovieDetailRaw {
    fn into_title(self) -> Title {
        Title {
            id: self.id,
            title: self.title.unwrap_or_default(),
            overview: self.overview,
            release_date: self.release_date.filter(|d| !d.is_empty()),
            vote_average: self.vote_average,
            runtime: self.runtime,
            poster_path: image_url(self.poster_path.as_deref(), "w500"),
            backdrop_path: image_url(self.backdrop_path.as_deref(), "w1280"),
            genres: self
                .genres
                .into_iter()
                .map(|g| Genre { id: g.id, name: g.name })
                .collect(),
            tagline: self.tagline.filter(|t| !t.is_empty()),
        }
    }
}

#[derive(Debug, Deserialize)]
struct GenreRaw {
    id: u64,
    name: String,
}

#[derive(Debug, Deserialize)]
struct WatchProvidersResponse {
    #[serde(default)]
    results: HashMap<String, RegionProvidersRaw>,
}

#[derive(Debug, Default, Deserialize)]
struct RegionProvidersRaw {
    #[serde(default)]
    flatrate: Vec<ProviderRaw>,
    #[serde(default)]
    rent: Vec<ProviderRaw>,
    #[serde(default)]
    buy: Vec<ProviderRaw>,
}

#[derive(Debug, Deserialize)]
struct ProviderRaw {
    provider_id: u64,
    provider_name: String,
    logo_path: Option<String>,
}

fn into_offers(providers: &[ProviderRaw], movie_title: &str) -> Vec<AvailabilityOffer> {
    providers
        .iter()
        .map(|p| AvailabilityOffer {
            provider_id: p.provider_id,
            provider_name: p.provider_name.clone(),
            logo_path: image_url(p.logo_path.as_deref(), "w92"),
            link: provider_link(p.provider_id, movie_title),
        })
        .collect()
}

fn provider_link(provider_id: u64, movie_title: &str) -> Option<String> {
    if movie_title.is_empty() {
        return None;
    }
    let prefix = PROVIDER_SEARCH_URLS
        .iter()
        .find(|(id, _)| *id == provider_id)
        .map(|(_, url)| *url)
        .unwrap_or(FALLBACK_SEARCH_URL);
    Some(format!("{}{}", prefix, movie_title.replace(' ', "+")))
}

#[derive(Debug, Deserialize)]
struct GeolocationRaw {
    country_code: Option<String>,
}

/// Expand a TMDB image path into a full URL
fn image_url(path: Option<&str>, size: &str) -> Option<String> {
    path.filter(|p| !p.is_empty())
        .map(|p| format!("{}{}{}", IMAGE_BASE_URL, size, p))
}
