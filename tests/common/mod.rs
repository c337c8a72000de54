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

#![allow(dead_code)]

use serde_json::json;
use terraform_provider_tabular::client::{Client, ClientSettings, RetryPolicy};
use terraform_provider_tabular::ClientHandle;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const ORG: &str = "org-1";
pub const TOKEN: &str = "test-token";

pub fn init_tracing() {
    _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_test_writer()
        .try_init();
}

/// Mock Tabular API answering the token exchange
pub async fn tabular() -> MockServer {
    init_tracing();
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/oauth/tokens"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": TOKEN,
            "expires_in": 3600
        })))
        .mount(&server)
        .await;
    server
}

pub fn settings(server: &MockServer) -> ClientSettings {
    ClientSettings {
        endpoint: server.uri(),
        token_endpoint: format!("{}/oauth/tokens", server.uri()),
        organization_id: ORG.to_owned(),
        credential: "client:secret".to_owned(),
        retry: RetryPolicy::none(),
    }
}

pub fn handle(server: &MockServer) -> ClientHandle {
    ClientHandle::from(Client::new(settings(server)).expect("valid settings"))
}

pub fn org_path(suffix: &str) -> String {
    format!("/v2/organizations/{ORG}{suffix}")
}
