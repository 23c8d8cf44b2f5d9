//! HTTP client for the HenrikDev Valorant API.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, USER_AGENT};
use reqwest::Client;
use serde::de::DeserializeOwned;
use tracing::{debug, info};
use url::Url;

use super::{ProviderError, StatsProvider};
use crate::models::{ApiEnvelope, Handle, MmrData, Rating, StoredMatch, UNRANKED};

/// Configuration for the provider client.
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    /// API root, e.g. `https://api.henrikdev.xyz/valorant/v1`
    pub base_url: String,

    /// Region segment used in every request
    pub region: String,

    /// Static credential sent as the `Authorization` header
    pub api_key: Option<String>,

    /// Per-request timeout
    pub timeout: Duration,

    /// User agent string
    pub user_agent: String,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.henrikdev.xyz/valorant/v1".to_string(),
            region: "na".to_string(),
            api_key: None,
            timeout: Duration::from_secs(15),
            user_agent: format!("squad-board/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// Provider client backed by reqwest.
pub struct HenrikClient {
    client: Client,
    config: ProviderConfig,
}

impl HenrikClient {
    /// Create a new client with the given configuration.
    pub fn new(config: ProviderConfig) -> Result<Self, ProviderError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&config.user_agent)
                .unwrap_or_else(|_| HeaderValue::from_static("squad-board")),
        );
        if let Some(key) = config.api_key.as_deref().filter(|k| !k.is_empty()) {
            let mut value = HeaderValue::from_str(key)
                .map_err(|_| ProviderError::InvalidApiKey)?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }

        let client = Client::builder()
            .timeout(config.timeout)
            .default_headers(headers)
            .build()?;

        Ok(Self { client, config })
    }

    /// `{base}/mmr/{region}/{name}/{tag}`
    pub fn mmr_url(&self, handle: &Handle) -> Result<Url, ProviderError> {
        self.endpoint(&["mmr", &self.config.region, handle.name(), handle.tag()])
    }

    /// `{base}/stored-matches/{region}/{name}/{tag}?size={size}`
    pub fn stored_matches_url(&self, handle: &Handle, size: usize) -> Result<Url, ProviderError> {
        let mut url = self.endpoint(&[
            "stored-matches",
            &self.config.region,
            handle.name(),
            handle.tag(),
        ])?;
        url.query_pairs_mut().append_pair("size", &size.to_string());
        Ok(url)
    }

    /// Append path segments to the base URL, percent-encoding each one.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, ProviderError> {
        let mut url = Url::parse(&self.config.base_url)
            .map_err(|e| ProviderError::InvalidUrl(format!("{}: {}", self.config.base_url, e)))?;
        url.path_segments_mut()
            .map_err(|_| ProviderError::InvalidUrl(self.config.base_url.clone()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: Url,
    ) -> Result<ApiEnvelope<T>, ProviderError> {
        info!("Fetching {}", url);

        let response = self.client.get(url.as_str()).send().await?;

        let status = response.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse().ok())
                .unwrap_or(60);

            return Err(ProviderError::RateLimited {
                retry_after_secs: retry_after,
            });
        }

        let body = response.text().await?;

        if !status.is_success() {
            let message = if body.trim().is_empty() {
                status.canonical_reason().unwrap_or("Unknown").to_string()
            } else {
                body
            };
            return Err(ProviderError::HttpStatus {
                status: status.as_u16(),
                message,
            });
        }

        debug!("Received {} bytes from {}", body.len(), url);
        parse_envelope(&body)
    }
}

/// Decode a response body. The API can answer 200 with an error status
/// inside the envelope, which is treated like the HTTP status it names.
pub fn parse_envelope<T: DeserializeOwned>(body: &str) -> Result<ApiEnvelope<T>, ProviderError> {
    let envelope: ApiEnvelope<T> =
        serde_json::from_str(body).map_err(|e| ProviderError::Malformed(e.to_string()))?;

    match envelope.status {
        Some(status) if !(200..300).contains(&status) => Err(ProviderError::HttpStatus {
            status,
            message: format!("API reported status {}", status),
        }),
        _ => Ok(envelope),
    }
}

/// Apply fallbacks to a rating payload. Zero values count as missing, so a
/// zero `elo` falls through to `ranking_in_tier`.
pub fn rating_from_mmr(data: Option<MmrData>) -> Rating {
    let data = data.unwrap_or_default();

    Rating {
        tier_label: data
            .currenttierpatched
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| UNRANKED.to_string()),
        tier_ordinal: data.currenttier.unwrap_or(0),
        rating: data
            .elo
            .filter(|&v| v > 0)
            .or(data.ranking_in_tier)
            .unwrap_or(0),
    }
}

#[async_trait]
impl StatsProvider for HenrikClient {
    fn name(&self) -> &'static str {
        "henrikdev"
    }

    async fn fetch_rating(&self, handle: &Handle) -> Result<Rating, ProviderError> {
        let envelope: ApiEnvelope<MmrData> = self.get_json(self.mmr_url(handle)?).await?;
        Ok(rating_from_mmr(envelope.data))
    }

    async fn fetch_matches(
        &self,
        handle: &Handle,
        size: usize,
    ) -> Result<Vec<StoredMatch>, ProviderError> {
        let url = self.stored_matches_url(handle, size)?;
        let envelope: ApiEnvelope<Vec<StoredMatch>> = self.get_json(url).await?;
        Ok(envelope.data.unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(base_url: &str) -> HenrikClient {
        HenrikClient::new(ProviderConfig {
            base_url: base_url.to_string(),
            api_key: Some("HDEV-test".to_string()),
            ..Default::default()
        })
        .unwrap()
    }

    #[test]
    fn test_envelope_status_is_checked() {
        let ok: ApiEnvelope<MmrData> = parse_envelope(r#"{"status": 200, "data": {}}"#).unwrap();
        assert!(ok.data.is_some());

        let bare: ApiEnvelope<MmrData> = parse_envelope(r#"{"data": {}}"#).unwrap();
        assert!(bare.status.is_none());

        let err = parse_envelope::<MmrData>(r#"{"status": 404, "errors": []}"#).unwrap_err();
        assert!(matches!(err, ProviderError::HttpStatus { status: 404, .. }));
    }

    #[test]
    fn test_envelope_rejects_non_json() {
        let err = parse_envelope::<MmrData>("<html>").unwrap_err();
        assert!(matches!(err, ProviderError::Malformed(_)));
    }

    #[test]
    fn test_mmr_url_encodes_segments() {
        let client = client("https://api.henrikdev.xyz/valorant/v1");
        let url = client.mmr_url(&Handle::new("Sova Main", "NA1")).unwrap();
        assert_eq!(
            url.as_str(),
            "https://api.henrikdev.xyz/valorant/v1/mmr/na/Sova%20Main/NA1"
        );
    }

    #[test]
    fn test_stored_matches_url_with_trailing_slash() {
        let client = client("https://api.henrikdev.xyz/valorant/v1/");
        let url = client
            .stored_matches_url(&Handle::new("jett", "EU#W"), 200)
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://api.henrikdev.xyz/valorant/v1/stored-matches/na/jett/EU%23W?size=200"
        );
    }

    #[test]
    fn test_invalid_base_url() {
        let client = client("not a url");
        assert!(matches!(
            client.mmr_url(&Handle::new("a", "b")),
            Err(ProviderError::InvalidUrl(_))
        ));
    }

    #[test]
    fn test_rating_fallbacks() {
        assert_eq!(rating_from_mmr(None), Rating::default());

        let rating = rating_from_mmr(Some(MmrData {
            currenttier: Some(18),
            currenttierpatched: Some("Diamond 1".to_string()),
            ranking_in_tier: Some(42),
            elo: Some(1542),
        }));
        assert_eq!(rating.tier_label, "Diamond 1");
        assert_eq!(rating.tier_ordinal, 18);
        assert_eq!(rating.rating, 1542);
    }

    #[test]
    fn test_rating_uses_ranking_in_tier_without_elo() {
        let rating = rating_from_mmr(Some(MmrData {
            currenttier: None,
            currenttierpatched: Some(String::new()),
            ranking_in_tier: Some(37),
            elo: Some(0),
        }));
        assert_eq!(rating.tier_label, "Unranked");
        assert_eq!(rating.rating, 37);
    }

    #[test]
    fn test_provider_config_default() {
        let config = ProviderConfig::default();
        assert_eq!(config.region, "na");
        assert!(config.api_key.is_none());
        assert!(config.user_agent.starts_with("squad-board/"));
    }
}
