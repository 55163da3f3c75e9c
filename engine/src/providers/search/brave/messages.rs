//! Response payloads for the Brave Search API.
//!
//! Only the fields the engine consumes are modelled; the API returns far
//! richer envelopes that serde is free to skip.

use serde::Deserialize;

// =============================================================================
// Web search
// =============================================================================

/// Envelope returned by `/res/v1/web/search`.
#[derive(Debug, Deserialize)]
pub struct WebSearchResponse {
    #[serde(default)]
    pub web: Option<WebResults>,
}

#[derive(Debug, Deserialize)]
pub struct WebResults {
    #[serde(default)]
    pub results: Vec<WebResult>,
}

#[derive(Debug, Deserialize)]
pub struct WebResult {
    #[serde(default)]
    pub title: String,
    pub url: String,
    #[serde(default)]
    pub description: String,
}

// =============================================================================
// Image search
// =============================================================================

/// Envelope returned by `/res/v1/images/search`.
#[derive(Debug, Deserialize)]
pub struct ImageSearchResponse {
    #[serde(default)]
    pub results: Vec<ImageResult>,
}

#[derive(Debug, Deserialize)]
pub struct ImageResult {
    #[serde(default)]
    pub title: Option<String>,
    /// Page the image appears on.
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub properties: Option<ImageProperties>,
    #[serde(default)]
    pub thumbnail: Option<Thumbnail>,
}

#[derive(Debug, Deserialize)]
pub struct ImageProperties {
    /// Direct URL of the full-size image.
    #[serde(default)]
    pub url: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Thumbnail {
    #[serde(default)]
    pub src: Option<String>,
}

impl ImageResult {
    /// Best available direct image URL: full-size first, thumbnail fallback.
    pub fn image_url(&self) -> Option<&str> {
        self.properties
            .as_ref()
            .and_then(|p| p.url.as_deref())
            .or_else(|| self.thumbnail.as_ref().and_then(|t| t.src.as_deref()))
            .filter(|u| !u.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_web_response_deserialization() {
        let raw = r#"{
            "type": "search",
            "web": {"results": [
                {"title": "Moon landing", "url": "https://en.wikipedia.org/wiki/Moon_landing", "description": "July 1969"}
            ]}
        }"#;
        let response: WebSearchResponse = serde_json::from_str(raw).unwrap();
        let results = response.web.unwrap().results;
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].title, "Moon landing");
    }

    #[test]
    fn test_web_response_without_web_section() {
        let response: WebSearchResponse = serde_json::from_str(r#"{"type": "search"}"#).unwrap();
        assert!(response.web.is_none());
    }

    #[test]
    fn test_image_result_prefers_full_size_url() {
        let raw = r#"{
            "title": "Solar array",
            "url": "https://example.com/page",
            "properties": {"url": "https://img.example.com/full.jpg"},
            "thumbnail": {"src": "https://img.example.com/thumb.jpg"}
        }"#;
        let result: ImageResult = serde_json::from_str(raw).unwrap();
        assert_eq!(result.image_url(), Some("https://img.example.com/full.jpg"));
    }

    #[test]
    fn test_image_result_falls_back_to_thumbnail() {
        let raw = r#"{"thumbnail": {"src": "https://img.example.com/thumb.jpg"}}"#;
        let result: ImageResult = serde_json::from_str(raw).unwrap();
        assert_eq!(result.image_url(), Some("https://img.example.com/thumb.jpg"));
    }

    #[test]
    fn test_image_result_empty_urls_rejected() {
        let raw = r#"{"properties": {"url": ""}}"#;
        let result: ImageResult = serde_json::from_str(raw).unwrap();
        assert_eq!(result.image_url(), None);
    }
}
