// This file is part of the terraform-provider-tabular project
//
// Copyright (C) ANEO, 2024-2024. All rights reserved.
//
// Licensed under the Apache License, Version 2.0 (the "License")
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::fmt::Debug;
use std::time::{Duration, Instant};

use reqwest::header::CONTENT_TYPE;
use reqwest::StatusCode;
use serde::Deserialize;
use tokio::sync::Mutex;
use url::Url;

use super::error::{ClientError, Result};

/// Tokens are refreshed this long before they actually expire
const EXPIRY_MARGIN: Duration = Duration::from_secs(30);

/// OAuth2 client credentials, given as `client_id:client_secret`
#[derive(Clone, PartialEq, Eq)]
pub struct Credential {
    pub client_id: String,
    pub client_secret: String,
}

impl Credential {
    pub fn parse(credential: &str) -> Result<Self> {
        match credential.split_once(':') {
            Some((client_id, client_secret)) => Ok(Self {
                client_id: client_id.to_owned(),
                client_secret: client_secret.to_owned(),
            }),
            None => Err(ClientError::InvalidCredential),
        }
    }
}

impl Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credential")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .finish()
    }
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<u64>,
}

struct CachedToken {
    access_token: String,
    expires_at: Option<Instant>,
}

impl CachedToken {
    fn is_fresh(&self) -> bool {
        self.expires_at
            .map_or(true, |at| Instant::now() + EXPIRY_MARGIN < at)
    }
}

/// Fetches and caches bearer tokens from the token endpoint
pub(crate) struct TokenCache {
    token_endpoint: Url,
    credential: Credential,
    cached: Mutex<Option<CachedToken>>,
}

impl TokenCache {
    pub(crate) fn new(token_endpoint: Url, credential: Credential) -> Self {
        Self {
            token_endpoint,
            credential,
            cached: Mutex::new(None),
        }
    }

    pub(crate) async fn bearer(&self, http: &reqwest::Client) -> Result<String> {
        let mut cached = self.cached.lock().await;
        if let Some(token) = cached.as_ref().filter(|token| token.is_fresh()) {
            return Ok(token.access_token.clone());
        }

        let token = self.fetch(http).await?;
        let access_token = token.access_token.clone();
        *cached = Some(token);
        Ok(access_token)
    }

    /// Drop the cached token so the next request fetches a new one
    pub(crate) async fn invalidate(&self) {
        *self.cached.lock().await = None;
    }

    async fn fetch(&self, http: &reqwest::Client) -> Result<CachedToken> {
        tracing::debug!("requesting access token from {}", self.token_endpoint);
        let form = url::form_urlencoded::Serializer::new(String::new())
            .append_pair("grant_type", "client_credentials")
            .append_pair("client_id", &self.credential.client_id)
            .append_pair("client_secret", &self.credential.client_secret)
            .finish();

        let response = http
            .post(self.token_endpoint.clone())
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(form)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if status.is_server_error() || status == StatusCode::TOO_MANY_REQUESTS {
            return Err(ClientError::Http { status, body });
        }
        if !status.is_success() {
            return Err(ClientError::Auth(format!("[{}] {}", status.as_u16(), body)));
        }

        let token: TokenResponse = serde_json::from_str(&body)?;
        Ok(CachedToken {
            access_token: token.access_token,
            expires_at: token
                .expires_in
                .map(|secs| Instant::now() + Duration::from_secs(secs)),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_credential() {
        let credential = Credential::parse("abc:def:ghi").unwrap();
        assert_eq!(credential.client_id, "abc");
        assert_eq!(credential.client_secret, "def:ghi");
    }

    #[test]
    fn parse_credential_without_separator() {
        assert!(matches!(
            Credential::parse("abcdef"),
            Err(ClientError::InvalidCredential)
        ));
    }

    #[test]
    fn debug_hides_secret() {
        let credential = Credential::parse("id:super-secret").unwrap();
        let debug = format!("{credential:?}");
        assert!(debug.contains("id"));
        assert!(!debug.contains("super-secret"));
    }

    #[test]
    fn token_freshness() {
        let stale = CachedToken {
            access_token: "t".into(),
            expires_at: Some(Instant::now() + Duration::from_secs(10)),
        };
        let fresh = CachedToken {
            access_token: "t".into(),
            expires_at: Some(Instant::now() + Duration::from_secs(3600)),
        };
        let forever = CachedToken {
            access_token: "t".into(),
            expires_at: None,
        };
        assert!(!stale.is_fresh());
        assert!(fresh.is_fresh());
        assert!(forever.is_fresh());
    }
}
