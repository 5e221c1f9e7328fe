//! Client for the CineGraph metadata service
//!
//! The service fronts TMDB and exposes pre-shaped JSON under `/api`:
//! search, trending, movie detail, per-country watch providers,
//! recommendations and IP geolocation.

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use std::time::Duration;

use super::catalog::{ApiError, ApiResult, CatalogApi};
use crate::models::{AvailabilityOffer, Region, StreamingAvailability, Title, TitleSummary};

/// HTTP client for the `/api` service
pub struct BackendClient {
    base_url: String,
    client: reqwest::Client,
}

impl BackendClient {
    /// Create a client for a service root such as `http://localhost:8001`
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            base_url,
            client: reqwest::Client::builder()
                .timeout(Duration::from_secs(30))
                .build()
                .unwrap_or_default(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn get<T: for<'de> Deserialize<'de>>(&self, endpoint: &str) -> ApiResult<T> {
        let url = format!("{}/api{}", self.base_url, endpoint);
        tracing::debug!(%url, "catalog request");

        let response = self
            .client
            .get(&url)
            .header("Accept", "application/json")
            .send()
            .await?;

        match response.status() {
            StatusCode::OK => {
                let body = response.text().await?;
                serde_json::from_str(&body)
                    .map_err(|e| ApiError::InvalidResponse(format!("JSON parse error: {}", e)))
            }
            status => Err(ApiError::from_status(status)),
        }
    }
}

#[async_trait]
impl CatalogApi for BackendClient {
    async fn search(&self, query: &str) -> ApiResult<Vec<TitleSummary>> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(Vec::new());
        }
        let endpoint = format!("/search?query={}", urlencoding::encode(query));
        self.get(&endpoint).await
    }

    async fn trending(&self) -> ApiResult<Vec<TitleSummary>> {
        self.get("/trending").await
    }

    async fn movie(&self, id: u64) -> ApiResult<Title> {
        self.get(&format!("/movie/{}", id)).await
    }

    async fn streaming(&self, id: u64, region: Region) -> ApiResult<StreamingAvailability> {
        let endpoint = format!("/movie/{}/streaming?country={}", id, region.code());
        let raw: StreamingRaw = self.get(&endpoint).await?;
        raw.into_availability(id, region)
    }

    async fn recommendations(&self, id: u64) -> ApiResult<Vec<TitleSummary>> {
        self.get(&format!("/movie/{}/recommendations", id)).await
    }

    async fn geolocate(&self) -> ApiResult<String> {
        let raw: GeolocationRaw = self.get("/geolocation").await?;
        Ok(raw.country_code)
    }
}

// =============================================================================
// Response Structures (internal deserialization)
// =============================================================================

#[derive(Debug, Deserialize)]
struct StreamingRaw {
    country: String,
    #[serde(default)]
    subscription: Vec<AvailabilityOffer>,
    #[serde(default)]
    rent: Vec<AvailabilityOffer>,
    #[serde(default)]
    buy: Vec<AvailabilityOffer>,
    tmdb_link: Option<String>,
}

impl StreamingRaw {
    fn into_availability(self, title_id: u64, requested: Region) -> ApiResult<StreamingAvailability> {
        // The record must describe the region we asked for, never another one
        if !self.country.eq_ignore_ascii_case(requested.code()) {
            return Err(ApiError::InvalidResponse(format!(
                "asked for {} availability, got {}",
                requested, self.country
            )));
        }
        Ok(StreamingAvailability {
            title_id,
            region: requested,
            subscription: self.subscription,
            rent: self.rent,
            buy: self.buy,
            external_link: self.tmdb_link,
        })
    }
}

#[derive(Debug, Deserialize)]
struct GeolocationRaw {
    country_code: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_trailing_slash() {
        let client = BackendClient::new("http://localhost:8001/");
        assert_eq!(client.base_url(), "http://localhost:8001");
    }

    #[test]
    fn test_streaming_rejects_other_region() {
        let raw = StreamingRaw {
            country: "GB".into(),
            subscription: vec![],
            rent: vec![],
            buy: vec![],
            tmdb_link: None,
        };
        assert!(raw.into_availability(1, Region::US).is_err());
    }

    #[tokio::test]
    async fn test_blank_search_skips_request() {
        // Unroutable base URL: any request would fail
        let client = BackendClient::new("http://127.0.0.1:9");
        let results = client.search("   ").await.unwrap();
        assert!(results.is_empty());
    }
}
