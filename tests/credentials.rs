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

use serde_json::json;
use terraform_provider_tabular::resources::{
    AwsRoleMappingResource, ServiceAccountResource, ServiceAccountState,
};
use tf_provider::value::{Value, ValueString};
use tf_provider::{Diagnostics, Resource};
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, ResponseTemplate};

use common::{handle, org_path, tabular};

fn service_account() -> ServiceAccountState<'static> {
    ServiceAccountState {
        id: ValueString::from("key-1"),
        name: ValueString::from("ingest"),
        role_id: ValueString::from("r1"),
        credential_key: ValueString::from("key-1"),
        credential_secret: ValueString::from("first-secret"),
    }
}

#[tokio::test]
async fn service_account_create_stores_the_secret() {
    let server = tabular().await;
    Mock::given(method("POST"))
        .and(path(org_path("/service-accounts")))
        .and(body_json(json!({"name": "ingest", "roleId": "r1"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "credentialId": "key-1",
            "credentialSecret": "first-secret"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let resource = ServiceAccountResource::new(handle(&server));
    let mut diags = Diagnostics::default();
    let planned = ServiceAccountState {
        id: Value::Unknown,
        credential_key: Value::Unknown,
        credential_secret: Value::Unknown,
        ..service_account()
    };
    let (state, _) = resource
        .create(
            &mut diags,
            Value::Value(planned),
            Value::Null,
            Default::default(),
            Default::default(),
        )
        .await
        .unwrap();
    assert_eq!(state.unwrap_or_default(), service_account());
}

#[tokio::test]
async fn service_account_secret_is_only_refreshed_when_returned() {
    let server = tabular().await;
    Mock::given(method("GET"))
        .and(path(org_path("/credentials/key-1")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "key": "key-1",
            "name": "ingest",
            "roleId": "r1"
        })))
        .up_to_n_times(1)
        .with_priority(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(org_path("/credentials/key-1")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "key": "key-1",
            "name": "ingest",
            "roleId": "r1",
            "encodedSecret": "rotated-secret"
        })))
        .mount(&server)
        .await;

    let resource = ServiceAccountResource::new(handle(&server));
    let mut diags = Diagnostics::default();

    let (state, _) = resource
        .read(
            &mut diags,
            Value::Value(service_account()),
            Default::default(),
            Default::default(),
        )
        .await
        .unwrap();
    assert_eq!(state, Value::Value(service_account()));

    let (state, _) = resource
        .read(&mut diags, state, Default::default(), Default::default())
        .await
        .unwrap();
    assert_eq!(
        state.unwrap_or_default().credential_secret,
        ValueString::from("rotated-secret")
    );
    assert!(diags.errors.is_empty(), "{diags:?}");
}

#[tokio::test]
async fn deleted_service_account_is_removed_from_state() {
    let server = tabular().await;
    Mock::given(method("GET"))
        .and(path(org_path("/credentials/key-1")))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;

    let resource = ServiceAccountResource::new(handle(&server));
    let mut diags = Diagnostics::default();
    let (state, _) = resource
        .read(
            &mut diags,
            Value::Value(service_account()),
            Default::default(),
            Default::default(),
        )
        .await
        .unwrap();
    assert!(state.is_null());
    assert!(diags.errors.is_empty());
}

#[tokio::test]
async fn role_mapping_import_recovers_the_arn_from_its_name() {
    let server = tabular().await;
    Mock::given(method("GET"))
        .and(path(org_path("/credentials/key-7")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "key": "key-7",
            "name": "r1-arn:aws:iam::123456789012:role/etl",
            "roleId": "r1"
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(org_path("/credentials/key-8")))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let resource = AwsRoleMappingResource::new(handle(&server));
    let mut diags = Diagnostics::default();
    let (state, _) = resource.import(&mut diags, "key-7".into()).await.unwrap();
    let state = state.unwrap_or_default();
    assert_eq!(state.id, ValueString::from("key-7"));
    assert_eq!(state.role_id, ValueString::from("r1"));
    assert_eq!(
        state.aws_role_arn,
        ValueString::from("arn:aws:iam::123456789012:role/etl")
    );

    assert!(resource.import(&mut diags, "key-8".into()).await.is_none());
    assert_eq!(diags.errors[0].summary, "AWS role mapping not found");
}
