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

mod common;

use std::time::Duration;

use serde_json::json;
use terraform_provider_tabular::client::models::LookupBy;
use terraform_provider_tabular::client::{Client, ClientError, RetryPolicy};
use wiremock::matchers::{body_string_contains, header, method, path, query_param};
use wiremock::{Mock, ResponseTemplate};

use common::{org_path, settings, tabular, TOKEN};

#[tokio::test]
async fn token_is_fetched_once_and_sent_as_bearer() {
    let server = tabular().await;
    Mock::given(method("POST"))
        .and(path("/oauth/tokens"))
        .and(body_string_contains("grant_type=client_credentials"))
        .and(body_string_contains("client_id=client"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": TOKEN,
            "expires_in": 3600
        })))
        .with_priority(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/ws/v1/grants/roles/analysts"))
        .and(header("authorization", format!("Bearer {TOKEN}").as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "r1",
            "name": "analysts"
        })))
        .expect(2)
        .mount(&server)
        .await;

    let client = Client::new(settings(&server)).unwrap();
    for _ in 0..2 {
        let role = client.get_role("analysts").await.unwrap().unwrap();
        assert_eq!(role.id, "r1");
        assert!(role.children.is_empty());
    }
}

#[tokio::test]
async fn rejected_credential_is_an_auth_error() {
    let server = wiremock::MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/oauth/tokens"))
        .respond_with(ResponseTemplate::new(401).set_body_string("invalid_client"))
        .mount(&server)
        .await;

    let client = Client::new(settings(&server)).unwrap();
    let err = client.get_role("analysts").await.unwrap_err();
    assert!(matches!(err, ClientError::Auth(_)), "{err}");
}

#[tokio::test]
async fn missing_objects_are_none() {
    let server = tabular().await;
    Mock::given(method("GET"))
        .and(path(org_path("/warehouses/w1/databases/raw_events")))
        .and(query_param("type", "name"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let client = Client::new(settings(&server)).unwrap();
    let database = client
        .get_database("w1", "raw_events", LookupBy::Name)
        .await
        .unwrap();
    assert!(database.is_none());
}

#[tokio::test]
async fn server_errors_are_retried() {
    let server = tabular().await;
    Mock::given(method("GET"))
        .and(path(org_path("/warehouses/w1")))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(2)
        .with_priority(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(org_path("/warehouses/w1")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "w1",
            "name": "lakehouse",
            "region": "us-west-2"
        })))
        .mount(&server)
        .await;

    let mut settings = settings(&server);
    settings.retry = RetryPolicy {
        initial_interval: Duration::from_millis(1),
        max_interval: Duration::from_millis(5),
        max_elapsed: Duration::from_secs(5),
        ..Default::default()
    };
    let client = Client::new(settings).unwrap();
    let warehouse = client.get_warehouse("w1").await.unwrap().unwrap();
    assert_eq!(warehouse.region.as_deref(), Some("us-west-2"));
}

#[tokio::test]
async fn client_errors_are_not_retried() {
    let server = tabular().await;
    Mock::given(method("POST"))
        .and(path("/ws/v1/grants/roles"))
        .respond_with(ResponseTemplate::new(409).set_body_string("role already exists"))
        .expect(1)
        .mount(&server)
        .await;

    let mut settings = settings(&server);
    settings.retry = RetryPolicy {
        initial_interval: Duration::from_millis(1),
        ..Default::default()
    };
    let client = Client::new(settings).unwrap();
    let err = client.create_role("analysts").await.unwrap_err();
    assert_eq!(err.to_string(), "[409] role already exists");
}

#[tokio::test]
async fn unavailable_token_endpoint_is_retried() {
    common::init_tracing();
    let server = wiremock::MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/oauth/tokens"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .with_priority(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/oauth/tokens"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": TOKEN,
            "expires_in": 3600
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/ws/v1/grants/roles/analysts"))
        .and(header("authorization", format!("Bearer {TOKEN}").as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "r1",
            "name": "analysts"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let mut settings = settings(&server);
    settings.retry = RetryPolicy {
        initial_interval: Duration::from_millis(1),
        max_interval: Duration::from_millis(5),
        max_elapsed: Duration::from_secs(5),
        ..Default::default()
    };
    let client = Client::new(settings).unwrap();
    let role = client.get_role("analysts").await.unwrap().unwrap();
    assert_eq!(role.id, "r1");
}

#[tokio::test]
async fn unavailable_token_endpoint_reports_its_status() {
    let server = wiremock::MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/oauth/tokens"))
        .respond_with(ResponseTemplate::new(429).set_body_string("slow down"))
        .mount(&server)
        .await;

    let client = Client::new(settings(&server)).unwrap();
    let err = client.get_role("analysts").await.unwrap_err();
    assert!(err.is_retryable(), "{err}");
    assert_eq!(err.to_string(), "[429] slow down");
}
