//! Backend access for the theatre client
//!
//! Tokens are only ever sent to the stream and expiry-check endpoints and
//! only an 8-character prefix is logged.

use async_trait::async_trait;
use cshield_common::api::{
    endpoints, AuthRequest, AuthResponse, ErrorResponse, ExpiryCheckResponse, StatusResponse,
};
use cshield_common::ClientConfig;
use tracing::debug;

use crate::Result;

const USER_AGENT: &str = concat!("cshield-theatre/", env!("CARGO_PKG_VERSION"));

/// Loggable form of a playback token
pub fn token_prefix(token: &str) -> &str {
    match token.char_indices().nth(8) {
        Some((idx, _)) => &token[..idx],
        None => token,
    }
}

/// Theatre-side backend operations
#[async_trait]
pub trait TheatreApi: Send + Sync {
    /// Exchange an access key for a playback token
    async fn authenticate(&self, key: &str) -> Result<AuthResponse>;

    /// Ask the backend whether a token's window has ended
    async fn check_expiry(&self, token: &str) -> Result<ExpiryCheckResponse>;

    /// Current movie availability
    async fn status(&self) -> Result<StatusResponse>;

    /// Media URL handed to the surface; no request is made
    fn stream_url(&self, token: &str) -> Result<String>;
}

/// reqwest-backed [`TheatreApi`]
#[derive(Clone)]
pub struct HttpTheatreApi {
    config: ClientConfig,
    client: reqwest::Client,
}

impl HttpTheatreApi {
    pub fn new(config: &ClientConfig) -> Result<Self> {
        config.validate()?;
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(config.request_timeout())
            .build()?;
        Ok(Self {
            config: config.clone(),
            client,
        })
    }

    /// Turn a response into `T`, or into `Error::Server` with the backend's message
    async fn parse<T: serde::de::DeserializeOwned>(response: reqwest::Response) -> Result<T> {
        let status = response.status();
        if !status.is_success() {
            let message = match response.json::<ErrorResponse>().await {
                Ok(body) => body.error,
                Err(_) => String::new(),
            };
            debug!(status = status.as_u16(), "Backend refused request");
            return Err(cshield_common::Error::Server {
                status: status.as_u16(),
                message,
            }
            .into());
        }
        response
            .json::<T>()
            .await
            .map_err(|e| cshield_common::Error::Protocol(e.to_string()).into())
    }
}

#[async_trait]
impl TheatreApi for HttpTheatreApi {
    async fn authenticate(&self, key: &str) -> Result<AuthResponse> {
        let url = self.config.endpoint_url(endpoints::AUTHENTICATE)?;
        let response = self
            .client
            .post(url)
            .json(&AuthRequest { key: key.to_string() })
            .send()
            .await?;
        Self::parse(response).await
    }

    async fn check_expiry(&self, token: &str) -> Result<ExpiryCheckResponse> {
        debug!(token = token_prefix(token), "Checking token expiry");
        let url = self.config.endpoint_url(&endpoints::check_expiry(token))?;
        let response = self.client.get(url).send().await?;
        Self::parse(response).await
    }

    async fn status(&self) -> Result<StatusResponse> {
        let url = self.config.endpoint_url(endpoints::STATUS)?;
        let response = self.client.get(url).send().await?;
        Self::parse(response).await
    }

    fn stream_url(&self, token: &str) -> Result<String> {
        Ok(self.config.endpoint_url(&endpoints::stream(token))?.to_string())
    }
}
