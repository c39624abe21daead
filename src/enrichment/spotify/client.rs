//! Spotify HTTP client
//!
//! Uses the client-credentials flow: the token is fetched lazily, cached
//! until shortly before it expires, and refreshed once when a search comes
//! back 401.
//!
//! See: https://developer.spotify.com/documentation/web-api/tutorials/client-credentials-flow

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::header;
use tokio::sync::Mutex;

use super::{adapter, dto};
use crate::config::{Credentials, SpotifySettings};
use crate::enrichment::domain::{Candidate, ProviderError, ProviderId};
use crate::enrichment::http::ProviderHttp;
use crate::enrichment::traits::MusicProvider;

pub const DEFAULT_API_URL: &str = "https://api.spotify.com/v1";
pub const DEFAULT_TOKEN_URL: &str = "https://accounts.spotify.com/api/token";

/// Refresh this long before Spotify says the token expires
const EXPIRY_MARGIN: Duration = Duration::from_secs(60);

/// Results requested per search
const SEARCH_LIMIT: u32 = 10;

#[derive(Debug)]
struct CachedToken {
    access_token: String,
    expires_at: Instant,
}

impl CachedToken {
    fn is_fresh(&self) -> bool {
        Instant::now() < self.expires_at
    }
}

/// Spotify Web API client
#[derive(Debug)]
pub struct SpotifyClient {
    http: ProviderHttp,
    api_url: String,
    token_url: String,
    client_id: Option<String>,
    client_secret: Option<String>,
    market: Option<String>,
    /// Held across a refresh so concurrent searches wait for one token request
    token: Mutex<Option<CachedToken>>,
}

impl SpotifyClient {
    pub fn new(
        http: ProviderHttp,
        client_id: Option<String>,
        client_secret: Option<String>,
    ) -> Self {
        Self {
            http,
            api_url: DEFAULT_API_URL.to_string(),
            token_url: DEFAULT_TOKEN_URL.to_string(),
            client_id,
            client_secret,
            market: None,
            token: Mutex::new(None),
        }
    }

    /// Client from the config file sections
    pub fn from_settings(
        http: ProviderHttp,
        credentials: &Credentials,
        settings: &SpotifySettings,
    ) -> Self {
        let mut client = Self::new(
            http,
            credentials.spotify_client_id.clone(),
            credentials.spotify_client_secret.clone(),
        )
        .with_market(settings.market.clone());

        if let Some(api_url) = &settings.common.base_url {
            client.api_url = api_url.trim_end_matches('/').to_string();
        }
        if let Some(token_url) = &settings.token_url {
            client.token_url = token_url.clone();
        }
        client
    }

    /// Point the client at different endpoints (testing)
    pub fn with_endpoints(
        mut self,
        api_url: impl Into<String>,
        token_url: impl Into<String>,
    ) -> Self {
        self.api_url = api_url.into();
        self.token_url = token_url.into();
        self
    }

    pub fn with_market(mut self, market: Option<String>) -> Self {
        self.market = market.filter(|m| !m.trim().is_empty());
        self
    }

    /// Current access token, fetching a new one when missing or stale
    async fn access_token(&self) -> Result<String, ProviderError> {
        let mut cached = self.token.lock().await;

        if let Some(token) = cached.as_ref()
            && token.is_fresh()
        {
            return Ok(token.access_token.clone());
        }

        let fresh = self.request_token().await?;
        let lifetime = Duration::from_secs(fresh.expires_in).saturating_sub(EXPIRY_MARGIN);
        tracing::debug!(
            provider = %ProviderId::Spotify,
            expires_in = fresh.expires_in,
            "Obtained access token"
        );

        let access_token = fresh.access_token;
        *cached = Some(CachedToken {
            access_token: access_token.clone(),
            expires_at: Instant::now() + lifetime,
        });
        Ok(access_token)
    }

    /// Drop the cached token if it is still the one that was rejected
    async fn invalidate_token(&self, rejected: &str) {
        let mut cached = self.token.lock().await;
        if cached
            .as_ref()
            .is_some_and(|token| token.access_token == rejected)
        {
            *cached = None;
        }
    }

    async fn request_token(&self) -> Result<dto::TokenResponse, ProviderError> {
        let (Some(client_id), Some(client_secret)) = (&self.client_id, &self.client_secret) else {
            return Err(ProviderError::Auth(
                "Spotify client id and secret are not configured".to_string(),
            ));
        };

        let url = &self.token_url;
        let token = self
            .http
            .fetch_json::<dto::TokenResponse, _>(|client| {
                client
                    .post(url)
                    .basic_auth(client_id, Some(client_secret))
                    .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                    .body("grant_type=client_credentials")
            })
            .await?;

        token.ok_or_else(|| ProviderError::Auth("Spotify token request was rejected".to_string()))
    }

    /// GET /v1/search, refreshing the token once on 401
    async fn search(
        &self,
        query: &str,
        kind: &str,
    ) -> Result<Option<dto::SearchResponse>, ProviderError> {
        let token = self.access_token().await?;

        match self.send_search(&token, query, kind).await {
            Err(ProviderError::Auth(reason)) => {
                tracing::debug!(
                    provider = %ProviderId::Spotify,
                    "Access token rejected, refreshing: {}",
                    reason
                );
                self.invalidate_token(&token).await;
                let token = self.access_token().await?;
                self.send_search(&token, query, kind).await
            }
            other => other,
        }
    }

    async fn send_search(
        &self,
        token: &str,
        query: &str,
        kind: &str,
    ) -> Result<Option<dto::SearchResponse>, ProviderError> {
        let url = format!("{}/search", self.api_url);
        let limit = SEARCH_LIMIT.to_string();

        self.http
            .fetch_json(|client| {
                let mut params = vec![("q", query), ("type", kind), ("limit", limit.as_str())];
                if let Some(market) = &self.market {
                    params.push(("market", market.as_str()));
                }
                client.get(&url).bearer_auth(token).query(&params)
            })
            .await
    }
}

#[async_trait]
impl MusicProvider for SpotifyClient {
    fn id(&self) -> ProviderId {
        ProviderId::Spotify
    }

    async fn search_album(
        &self,
        artist: &str,
        title: &str,
    ) -> Result<Vec<Candidate>, ProviderError> {
        let query = format!("album:{title} artist:{artist}");
        Ok(self
            .search(&query, "album")
            .await?
            .map(adapter::albums)
            .transpose()?
            .unwrap_or_default())
    }

    async fn search_album_by_title(&self, title: &str) -> Result<Vec<Candidate>, ProviderError> {
        let query = format!("album:{title}");
        Ok(self
            .search(&query, "album")
            .await?
            .map(adapter::albums)
            .transpose()?
            .unwrap_or_default())
    }

    async fn search_track(
        &self,
        artist: &str,
        title: &str,
    ) -> Result<Vec<Candidate>, ProviderError> {
        let query = format!("track:{title} artist:{artist}");
        Ok(self
            .search(&query, "track")
            .await?
            .map(adapter::tracks)
            .transpose()?
            .unwrap_or_default())
    }

    async fn search_artist(&self, artist: &str) -> Result<Vec<Candidate>, ProviderError> {
        let query = format!("artist:{artist}");
        Ok(self
            .search(&query, "artist")
            .await?
            .map(adapter::artists)
            .transpose()?
            .unwrap_or_default())
    }

    async fn verify(&self) -> Result<(), ProviderError> {
        self.access_token().await.map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enrichment::cascade::FallbackOrchestrator;
    use crate::enrichment::domain::{EnrichmentRequest, MatchType};
    use crate::test_utils::test_http;
    use wiremock::matchers::{header as header_is, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const TOKEN_BODY: &str =
        r#"{"access_token": "token-1", "token_type": "Bearer", "expires_in": 3600}"#;

    const ALBUM_BODY: &str = r#"{"albums": {"items": [{
        "id": "2noRn2Aes5aoNVsU6iWThc",
        "name": "Discovery",
        "artists": [{"name": "Daft Punk"}],
        "external_urls": {"spotify": "https://open.spotify.com/album/2noRn2Aes5aoNVsU6iWThc"}
    }], "total": 1}}"#;

    fn client(server: &MockServer) -> SpotifyClient {
        SpotifyClient::new(
            test_http(ProviderId::Spotify),
            Some("id".to_string()),
            Some("secret".to_string()),
        )
        .with_endpoints(format!("{}/v1", server.uri()), format!("{}/api/token", server.uri()))
    }

    async fn mount_token(server: &MockServer) {
        Mock::given(method("POST"))
            .and(path("/api/token"))
            .respond_with(ResponseTemplate::new(200).set_body_string(TOKEN_BODY))
            .mount(server)
            .await;
    }

    #[test]
    fn test_blank_market_is_ignored() {
        let client = SpotifyClient::new(test_http(ProviderId::Spotify), None, None)
            .with_market(Some("  ".to_string()));
        assert!(client.market.is_none());
    }

    #[tokio::test]
    async fn test_album_search_with_token() {
        let server = MockServer::start().await;
        mount_token(&server).await;
        Mock::given(method("GET"))
            .and(path("/v1/search"))
            .and(query_param("type", "album"))
            .and(query_param("q", "album:Discovery artist:Daft Punk"))
            .and(header_is("authorization", "Bearer token-1"))
            .respond_with(ResponseTemplate::new(200).set_body_string(ALBUM_BODY))
            .mount(&server)
            .await;

        let candidates = client(&server).search_album("Daft Punk", "Discovery").await.unwrap();

        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].match_type, MatchType::Album);
        assert_eq!(
            candidates[0].url,
            "https://open.spotify.com/album/2noRn2Aes5aoNVsU6iWThc"
        );
    }

    #[tokio::test]
    async fn test_token_is_cached_between_searches() {
        let server = MockServer::start().await;
        mount_token(&server).await;
        Mock::given(method("GET"))
            .and(path("/v1/search"))
            .respond_with(
                ResponseTemplate::new(200).set_body_string(r#"{"artists": {"items": []}}"#),
            )
            .mount(&server)
            .await;

        let client = client(&server);
        client.search_artist("Daft Punk").await.unwrap();
        client.search_artist("Justice").await.unwrap();

        let requests = server.received_requests().await.unwrap();
        let token_requests = requests.iter().filter(|r| r.url.path() == "/api/token").count();
        assert_eq!(token_requests, 1);
    }

    #[tokio::test]
    async fn test_market_is_sent() {
        let server = MockServer::start().await;
        mount_token(&server).await;
        Mock::given(method("GET"))
            .and(path("/v1/search"))
            .and(query_param("market", "DE"))
            .respond_with(
                ResponseTemplate::new(200).set_body_string(r#"{"artists": {"items": []}}"#),
            )
            .expect(1)
            .mount(&server)
            .await;

        let client = client(&server).with_market(Some("DE".to_string()));
        assert!(client.search_artist("Kraftwerk").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_title_only_search_finds_album_after_qualified_miss() {
        let server = MockServer::start().await;
        mount_token(&server).await;
        Mock::given(method("GET"))
            .and(path("/v1/search"))
            .and(query_param("q", "album:Discovery artist:Daft Punk"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"{"albums": {"items": [{"id": "5uRdvUR7xCnHmUW8n64n9y", "name": "Homework",
                    "artists": [{"name": "Daft Punk"}],
                    "external_urls": {
                        "spotify": "https://open.spotify.com/album/5uRdvUR7xCnHmUW8n64n9y"
                    }}]}}"#,
            ))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/v1/search"))
            .and(query_param("q", "album:Discovery"))
            .respond_with(ResponseTemplate::new(200).set_body_string(ALBUM_BODY))
            .expect(1)
            .mount(&server)
            .await;

        let client = client(&server);
        let request = EnrichmentRequest::new("Daft Punk", "Discovery");
        let result = FallbackOrchestrator::default()
            .resolve_result(&client, &request)
            .await;

        assert_eq!(result.match_type, Some(MatchType::Album));
        assert_eq!(
            result.link.as_deref(),
            Some("https://open.spotify.com/album/2noRn2Aes5aoNVsU6iWThc")
        );
    }

    #[tokio::test]
    async fn test_401_refreshes_token_once() {
        let server = MockServer::start().await;
        mount_token(&server).await;
        Mock::given(method("GET"))
            .and(path("/v1/search"))
            .respond_with(ResponseTemplate::new(401))
            .up_to_n_times(1)
            .with_priority(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/v1/search"))
            .respond_with(ResponseTemplate::new(200).set_body_string(ALBUM_BODY))
            .mount(&server)
            .await;

        let candidates = client(&server).search_album("Daft Punk", "Discovery").await.unwrap();

        assert_eq!(candidates.len(), 1);
        let requests = server.received_requests().await.unwrap();
        let token_requests = requests.iter().filter(|r| r.url.path() == "/api/token").count();
        assert_eq!(token_requests, 2);
    }

    #[tokio::test]
    async fn test_second_401_is_auth_error() {
        let server = MockServer::start().await;
        mount_token(&server).await;
        Mock::given(method("GET"))
            .and(path("/v1/search"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let result = client(&server).search_artist("Daft Punk").await;

        assert!(matches!(result, Err(ProviderError::Auth(_))));
        let requests = server.received_requests().await.unwrap();
        let searches = requests.iter().filter(|r| r.url.path() == "/v1/search").count();
        assert_eq!(searches, 2);
    }

    #[tokio::test]
    async fn test_rejected_credentials_fail_verify() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/token"))
            .respond_with(
                ResponseTemplate::new(400).set_body_string(r#"{"error": "invalid_client"}"#),
            )
            .mount(&server)
            .await;

        let result = client(&server).verify().await;

        assert!(matches!(result, Err(ProviderError::Auth(_))));
    }

    #[tokio::test]
    async fn test_missing_credentials_fail_without_request() {
        let server = MockServer::start().await;
        let client = SpotifyClient::new(test_http(ProviderId::Spotify), None, None)
            .with_endpoints(server.uri(), format!("{}/api/token", server.uri()));

        let result = client.verify().await;

        assert!(matches!(result, Err(ProviderError::Auth(_))));
        assert!(server.received_requests().await.unwrap().is_empty());
    }
}
