use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use serde_json::Value;

use crate::error::PokedexError;

pub trait PokeApiClient: Send + Sync {
    /// One GET, body decoded as JSON. No retries.
    fn fetch(&self, url: &str) -> Result<Value, PokedexError>;
}

#[derive(Clone)]
pub struct PokeApiHttpClient {
    client: Client,
}

impl PokeApiHttpClient {
    pub fn new(timeout: Option<Duration>) -> Result<Self, PokedexError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&format!("pokedex-reports/{}", env!("CARGO_PKG_VERSION")))
                .map_err(|err| PokedexError::PokeApiHttp(err.to_string()))?,
        );
        let mut builder = Client::builder().default_headers(headers);
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|err| PokedexError::PokeApiHttp(err.to_string()))?;
        Ok(Self { client })
    }

    fn handle_status(
        response: reqwest::blocking::Response,
    ) -> Result<reqwest::blocking::Response, PokedexError> {
        if response.status().is_success() {
            return Ok(response);
        }
        let status = response.status().as_u16();
        let message = response
            .text()
            .unwrap_or_else(|_| "PokeAPI request failed".to_string());
        Err(PokedexError::PokeApiStatus { status, message })
    }
}

impl PokeApiClient for PokeApiHttpClient {
    fn fetch(&self, url: &str) -> Result<Value, PokedexError> {
        tracing::debug!("GET {url}");
        let response = self
            .client
            .get(url)
            .send()
            .map_err(|err| PokedexError::PokeApiHttp(err.to_string()))?;
        let response = Self::handle_status(response)?;
        let body = response
            .bytes()
            .map_err(|err| PokedexError::PokeApiHttp(err.to_string()))?;
        serde_json::from_slice(&body).map_err(|err| PokedexError::PokeApiDecode {
            url: url.to_string(),
            message: err.to_string(),
        })
    }
}
