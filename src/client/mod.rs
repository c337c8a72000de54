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

//! HTTP client for the Tabular REST API
//!
//! Two API generations are exposed by the platform:
//! the workspace API rooted at `/ws/v1` (roles, members, warehouse listing)
//! and the organization API rooted at `/v2/organizations/{org}` (everything else).

mod auth;
mod credentials;
mod error;
mod grants;
pub mod models;
mod retry;
mod roles;
mod warehouses;

use reqwest::header::CONTENT_TYPE;
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use url::Url;

use auth::TokenCache;

pub use auth::Credential;
pub use error::{ClientError, Result};
pub use grants::{grant_changes, GrantTarget};
pub use retry::RetryPolicy;

pub const DEFAULT_ENDPOINT: &str = "https://api.tabular.io";
pub const DEFAULT_TOKEN_ENDPOINT: &str = "https://api.tabular.io/ws/v1/oauth/tokens";

/// Everything needed to build a [`Client`]
#[derive(Debug, Clone)]
pub struct ClientSettings {
    pub endpoint: String,
    pub token_endpoint: String,
    pub organization_id: String,
    /// `client_id:client_secret`
    pub credential: String,
    pub retry: RetryPolicy,
}

pub struct Client {
    http: reqwest::Client,
    endpoint: Url,
    organization_id: String,
    tokens: TokenCache,
    retry: RetryPolicy,
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("endpoint", &self.endpoint.as_str())
            .field("organization_id", &self.organization_id)
            .finish_non_exhaustive()
    }
}

impl Client {
    pub fn new(settings: ClientSettings) -> Result<Self> {
        let credential = Credential::parse(&settings.credential)?;
        let endpoint = Url::parse(&settings.endpoint)?;
        if endpoint.cannot_be_a_base() {
            return Err(ClientError::Endpoint(settings.endpoint));
        }
        let token_endpoint = Url::parse(&settings.token_endpoint)?;

        let http = reqwest::Client::builder()
            .user_agent(concat!(
                "terraform-provider-tabular/",
                env!("CARGO_PKG_VERSION")
            ))
            .build()?;

        Ok(Self {
            http,
            endpoint,
            organization_id: settings.organization_id,
            tokens: TokenCache::new(token_endpoint, credential),
            retry: settings.retry,
        })
    }

    pub fn organization_id(&self) -> &str {
        &self.organization_id
    }

    fn url(&self, prefix: &[&str], segments: &[&str]) -> Result<Url> {
        let mut url = self.endpoint.clone();
        url.path_segments_mut()
            .map_err(|()| ClientError::Endpoint(self.endpoint.to_string()))?
            .pop_if_empty()
            .extend(prefix)
            .extend(segments);
        Ok(url)
    }

    /// Url on the workspace API
    pub(crate) fn ws(&self, segments: &[&str]) -> Result<Url> {
        self.url(&["ws", "v1"], segments)
    }

    /// Url on the organization API
    pub(crate) fn org(&self, segments: &[&str]) -> Result<Url> {
        self.url(&["v2", "organizations", &self.organization_id], segments)
    }

    async fn send_once(&self, method: &Method, url: &Url, body: Option<&[u8]>) -> Result<String> {
        let token = self.tokens.bearer(&self.http).await?;
        let mut request = self
            .http
            .request(method.clone(), url.clone())
            .bearer_auth(token);
        if let Some(body) = body {
            request = request
                .header(CONTENT_TYPE, "application/json")
                .body(body.to_vec());
        }

        let response = request.send().await?;
        let status = response.status();
        let text = response.text().await?;

        if status.is_success() {
            Ok(text)
        } else {
            if status == StatusCode::UNAUTHORIZED {
                self.tokens.invalidate().await;
            }
            tracing::debug!("{method} {url} answered {status}");
            Err(ClientError::Http { status, body: text })
        }
    }

    /// Send a request through the retry policy and return the raw response body
    pub(crate) async fn send<B>(&self, method: Method, url: Url, body: Option<&B>) -> Result<String>
    where
        B: Serialize + ?Sized,
    {
        let body = body.map(serde_json::to_vec).transpose()?;
        tracing::debug!("{method} {url}");
        self.retry
            .retry(|| self.send_once(&method, &url, body.as_deref()))
            .await
    }

    pub(crate) async fn get<T: DeserializeOwned>(&self, url: Url) -> Result<T> {
        let body = self.send::<()>(Method::GET, url, None).await?;
        Ok(serde_json::from_str(&body)?)
    }

    /// Same as [`Client::get`], a 404 is mapped to `None`
    pub(crate) async fn get_optional<T: DeserializeOwned>(&self, url: Url) -> Result<Option<T>> {
        match self.get(url).await {
            Ok(value) => Ok(Some(value)),
            Err(err) if err.is_not_found() => Ok(None),
            Err(err) => Err(err),
        }
    }

    pub(crate) async fn post<B, T>(&self, url: Url, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let body = self.send(Method::POST, url, Some(body)).await?;
        Ok(serde_json::from_str(&body)?)
    }

    /// Send a request whose response body is irrelevant
    pub(crate) async fn execute<B>(&self, method: Method, url: Url, body: Option<&B>) -> Result<()>
    where
        B: Serialize + ?Sized,
    {
        self.send(method, url, body).await.map(drop)
    }

    pub(crate) async fn delete(&self, url: Url) -> Result<()> {
        self.execute::<()>(Method::DELETE, url, None).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(endpoint: &str) -> Client {
        Client::new(ClientSettings {
            endpoint: endpoint.into(),
            token_endpoint: DEFAULT_TOKEN_ENDPOINT.into(),
            organization_id: "org-1".into(),
            credential: "id:secret".into(),
            retry: RetryPolicy::none(),
        })
        .unwrap()
    }

    #[test]
    fn urls_are_rooted_on_the_endpoint() {
        let client = client("https://api.example.com/");
        assert_eq!(
            client.ws(&["grants", "roles", "admin"]).unwrap().as_str(),
            "https://api.example.com/ws/v1/grants/roles/admin"
        );
        assert_eq!(
            client.org(&["warehouses", "w1"]).unwrap().as_str(),
            "https://api.example.com/v2/organizations/org-1/warehouses/w1"
        );
    }

    #[test]
    fn path_segments_are_escaped() {
        let client = client("https://api.example.com");
        assert_eq!(
            client.ws(&["grants", "roles", "data eng/ops"]).unwrap().as_str(),
            "https://api.example.com/ws/v1/grants/roles/data%20eng%2Fops"
        );
    }

    #[test]
    fn rejects_bad_settings() {
        let settings = ClientSettings {
            endpoint: "mailto:someone".into(),
            token_endpoint: DEFAULT_TOKEN_ENDPOINT.into(),
            organization_id: "org-1".into(),
            credential: "id:secret".into(),
            retry: RetryPolicy::none(),
        };
        assert!(matches!(
            Client::new(settings.clone()),
            Err(ClientError::Endpoint(_))
        ));
        assert!(matches!(
            Client::new(ClientSettings {
                endpoint: DEFAULT_ENDPOINT.into(),
                credential: "no-separator".into(),
                ..settings
            }),
            Err(ClientError::InvalidCredential)
        ));
    }
}
