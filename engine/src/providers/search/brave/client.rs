//! Brave Search client for web and image queries.

use reqwest::{Client, StatusCode};
use tracing::{debug, warn};

use super::config::BraveSearchConfig;
use super::messages::{ImageSearchResponse, WebSearchResponse};
use crate::providers::base::{
    ImageHit, ImageSearch, ProviderError, ProviderResult, SearchHit, SearchOptions, TextSearch,
};

/// User-Agent header value for API requests.
const USER_AGENT: &str = concat!("colloquy-engine/", env!("CARGO_PKG_VERSION"));

/// Client for the Brave Search web and image endpoints.
pub struct BraveSearch {
    config: BraveSearchConfig,
    http: Client,
}

impl BraveSearch {
    /// Create a client. Fails fast on invalid configuration.
    pub fn new(config: BraveSearchConfig) -> ProviderResult<Self> {
        config.validate().map_err(ProviderError::Auth)?;

        let http = Client::builder()
            .timeout(config.timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| ProviderError::Transport(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { config, http })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{path}", self.config.base_url.trim_end_matches('/'))
    }

    /// Map a region code onto Brave's `country` parameter. The engine's
    /// worldwide default ("wt-wt") becomes Brave's `ALL`.
    fn country(region: &str) -> String {
        match region.to_lowercase().as_str() {
            "" | "wt-wt" | "worldwide" => "ALL".to_string(),
            other => other.to_uppercase(),
        }
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        query: &str,
        options: &SearchOptions,
    ) -> ProviderResult<T> {
        debug!(%query, path, "sending search request");

        let count = options.max_results.to_string();
        let country = Self::country(&options.region);
        let response = self
            .http
            .get(self.endpoint(path))
            .header("X-Subscription-Token", &self.config.api_key)
            .header("Accept", "application/json")
            .query(&[
                ("q", query),
                ("count", count.as_str()),
                ("safesearch", options.safesearch.as_str()),
                ("country", country.as_str()),
            ])
            .send()
            .await
            .map_err(|e| ProviderError::from_reqwest(e, self.config.timeout))?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(ProviderError::Auth(format!(
                "search request rejected with {status}"
            )));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let snippet: String = body.chars().take(200).collect();
            warn!(%status, path, "search request failed");
            return Err(ProviderError::Transport(format!("{status}: {snippet}")));
        }

        response
            .json()
            .await
            .map_err(|e| ProviderError::Malformed(format!("undecodable search body: {e}")))
    }
}

#[async_trait::async_trait]
impl TextSearch for BraveSearch {
    async fn search(&self, query: &str, options: &SearchOptions) -> ProviderResult<Vec<SearchHit>> {
        let decoded: WebSearchResponse = self
            .get_json("/res/v1/web/search", query, options)
            .await?;

        let hits = decoded
            .web
            .map(|web| web.results)
            .unwrap_or_default()
            .into_iter()
            .take(options.max_results)
            .map(|result| SearchHit {
                title: result.title,
                snippet: result.description,
                url: result.url,
            })
            .collect();
        Ok(hits)
    }
}

#[async_trait::async_trait]
impl ImageSearch for BraveSearch {
    async fn search_images(
        &self,
        query: &str,
        options: &SearchOptions,
    ) -> ProviderResult<Vec<ImageHit>> {
        let decoded: ImageSearchResponse = self
            .get_json("/res/v1/images/search", query, options)
            .await?;

        let hits = decoded
            .results
            .into_iter()
            .filter_map(|result| {
                let image_url = result.image_url()?.to_string();
                Some(ImageHit {
                    image_url,
                    title: result.title,
                    source_url: result.url,
                })
            })
            .take(options.max_results)
            .collect();
        Ok(hits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_rejects_empty_api_key() {
        let result = BraveSearch::new(BraveSearchConfig::new(""));
        assert!(matches!(result, Err(ProviderError::Auth(_))));
    }

    #[test]
    fn test_country_mapping() {
        assert_eq!(BraveSearch::country("wt-wt"), "ALL");
        assert_eq!(BraveSearch::country("worldwide"), "ALL");
        assert_eq!(BraveSearch::country(""), "ALL");
        assert_eq!(BraveSearch::country("de"), "DE");
    }

    #[test]
    fn test_endpoint_join() {
        let client =
            BraveSearch::new(BraveSearchConfig::new("token").with_base_url("http://localhost:9/"))
                .unwrap();
        assert_eq!(
            client.endpoint("/res/v1/web/search"),
            "http://localhost:9/res/v1/web/search"
        );
    }
}
