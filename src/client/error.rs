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

use reqwest::StatusCode;
use thiserror::Error;

/// Errors raised while talking to the Tabular API
#[derive(Debug, Error)]
pub enum ClientError {
    /// The API answered with a non-success status
    #[error("[{}] {body}", status.as_u16())]
    Http { status: StatusCode, body: String },
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("invalid response payload: {0}")]
    Json(#[from] serde_json::Error),
    #[error("authentication failed: {0}")]
    Auth(String),
    #[error("invalid url: {0}")]
    Url(#[from] url::ParseError),
    #[error("endpoint {0} cannot be used as a base url")]
    Endpoint(String),
    #[error("bad credential provided")]
    InvalidCredential,
}

impl ClientError {
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ClientError::Http { status, .. } => Some(*status),
            ClientError::Transport(err) => err.status(),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(StatusCode::NOT_FOUND)
    }

    /// Transient failures worth another attempt: connection errors, throttling and server errors
    pub fn is_retryable(&self) -> bool {
        match self {
            ClientError::Http { status, .. } => {
                status.is_server_error() || *status == StatusCode::TOO_MANY_REQUESTS
            }
            ClientError::Transport(err) => {
                err.is_connect()
                    || err.is_timeout()
                    || err.is_request()
                    || err.status().is_some_and(|s| s.is_server_error())
            }
            _ => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, ClientError>;

#[cfg(test)]
mod tests {
    use super::*;

    fn http(code: u16) -> ClientError {
        ClientError::Http {
            status: StatusCode::from_u16(code).unwrap(),
            body: "boom".into(),
        }
    }

    #[test]
    fn http_error_display() {
        assert_eq!(http(409).to_string(), "[409] boom");
    }

    #[test]
    fn endpoint_error_display() {
        let err = ClientError::Endpoint("mailto:ops@example.com".into());
        assert_eq!(
            err.to_string(),
            "endpoint mailto:ops@example.com cannot be used as a base url"
        );
        assert!(!err.is_retryable());
    }

    #[test]
    fn not_found() {
        assert!(http(404).is_not_found());
        assert!(!http(403).is_not_found());
        assert!(!ClientError::InvalidCredential.is_not_found());
    }

    #[test]
    fn retryable_statuses() {
        assert!(http(500).is_retryable());
        assert!(http(503).is_retryable());
        assert!(http(429).is_retryable());
        assert!(!http(400).is_retryable());
        assert!(!http(404).is_retryable());
        assert!(!ClientError::Auth("denied".into()).is_retryable());
    }
}
