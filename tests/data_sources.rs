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
use terraform_provider_tabular::data_sources::{
    AwsIamPolicyDataSource, AwsIamPolicyState, ComputeConfigDataSource, ComputeConfigState,
    RoleDataSource, RoleDataSourceState, S3StorageProfileDataSource,
    S3StorageProfileDataSourceState, WarehouseDataSource, WarehouseDataSourceState,
};
use tf_provider::value::{Value, ValueString};
use tf_provider::{DataSource, Diagnostics};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use common::{handle, org_path, tabular, ORG};

async fn mount_warehouses(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/ws/v1/warehouses"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": "w0", "name": "sandbox", "region": "eu-west-1"},
            {"id": "w1", "name": "lakehouse", "region": "us-west-2"}
        ])))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path(org_path("/warehouses/w1")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "w1",
            "name": "lakehouse",
            "organizationId": ORG,
            "storageProfile": "sp-1",
            "region": "us-west-2"
        })))
        .mount(server)
        .await;
}

#[tokio::test]
async fn warehouse_by_name() {
    let server = tabular().await;
    mount_warehouses(&server).await;

    let data_source = WarehouseDataSource::new(handle(&server));
    let mut diags = Diagnostics::default();
    let config = WarehouseDataSourceState {
        name: ValueString::from("lakehouse"),
        ..Default::default()
    };
    let state = data_source
        .read(&mut diags, config, Default::default())
        .await
        .unwrap();
    assert_eq!(state.id, ValueString::from("w1"));
    assert_eq!(state.storage_profile, ValueString::from("sp-1"));
    assert_eq!(state.organization_id, ValueString::from(ORG));
}

#[tokio::test]
async fn unknown_warehouse_name() {
    let server = tabular().await;
    mount_warehouses(&server).await;

    let data_source = WarehouseDataSource::new(handle(&server));
    let mut diags = Diagnostics::default();
    let config = WarehouseDataSourceState {
        name: ValueString::from("archive"),
        ..Default::default()
    };
    assert!(data_source
        .read(&mut diags, config, Default::default())
        .await
        .is_none());
    assert_eq!(diags.errors[0].summary, "Warehouse not found");
    assert!(diags.errors[0].detail.contains("archive"));
}

#[tokio::test]
async fn warehouse_needs_exactly_one_identifier() {
    let data_source = WarehouseDataSource::new(Default::default());
    let mut diags = Diagnostics::default();
    let both = WarehouseDataSourceState {
        id: ValueString::from("w1"),
        name: ValueString::from("lakehouse"),
        ..Default::default()
    };
    assert!(data_source.validate(&mut diags, both).await.is_none());
    assert!(data_source
        .validate(&mut diags, WarehouseDataSourceState::default())
        .await
        .is_none());
    assert_eq!(diags.errors.len(), 2);
}

#[tokio::test]
async fn compute_config_for_a_named_warehouse() {
    let server = tabular().await;
    mount_warehouses(&server).await;

    let data_source = ComputeConfigDataSource::new(handle(&server));
    let mut diags = Diagnostics::default();
    let config = ComputeConfigState {
        warehouse_name: ValueString::from("lakehouse"),
        ..Default::default()
    };
    let state = data_source
        .read(&mut diags, config, Default::default())
        .await
        .unwrap();
    assert_eq!(state.warehouse_id, ValueString::from("w1"));

    let Value::Value(spark_config) = state.spark_config else {
        panic!("spark_config should be set");
    };
    let spark_config: serde_json::Value = serde_json::from_str(&spark_config).unwrap();
    assert_eq!(
        spark_config[1]["Properties"]["spark.sql.catalog.lakehouse.uri"],
        "https://iam-gw.us-west-2.tabular.io/ws/"
    );
}

#[tokio::test]
async fn assume_role_policy_uses_the_organization() {
    let server = tabular().await;
    let data_source = AwsIamPolicyDataSource::new(handle(&server));
    let mut diags = Diagnostics::default();
    let config = AwsIamPolicyState {
        bucket: ValueString::from("lake"),
        ..Default::default()
    };
    let state = data_source
        .read(&mut diags, config, Default::default())
        .await
        .unwrap();
    assert_eq!(state.id, ValueString::from("lake"));

    let Value::Value(policy) = state.assume_role_policy else {
        panic!("assume_role_policy should be set");
    };
    let policy: serde_json::Value = serde_json::from_str(&policy).unwrap();
    assert_eq!(
        policy["Statement"][0]["Condition"]["StringEquals"]["sts:ExternalId"],
        ORG
    );
}

#[tokio::test]
async fn role_by_name() {
    let server = tabular().await;
    Mock::given(method("GET"))
        .and(path("/ws/v1/grants/roles/analysts"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "r1",
            "name": "analysts"
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/ws/v1/grants/roles/ghosts"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let data_source = RoleDataSource::new(handle(&server));
    let mut diags = Diagnostics::default();
    let config = RoleDataSourceState {
        id: Value::Null,
        name: ValueString::from("analysts"),
    };
    let state = data_source
        .read(&mut diags, config, Default::default())
        .await
        .unwrap();
    assert_eq!(state.id, ValueString::from("r1"));

    let config = RoleDataSourceState {
        id: Value::Null,
        name: ValueString::from("ghosts"),
    };
    assert!(data_source
        .read(&mut diags, config, Default::default())
        .await
        .is_none());
    assert_eq!(diags.errors[0].summary, "Role not found");
}

#[tokio::test]
async fn storage_profile_by_bucket() {
    let server = tabular().await;
    Mock::given(method("GET"))
        .and(path(org_path("/storage-profiles/lake")))
        .and(query_param("type", "name"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "sp-1",
            "organizationId": ORG,
            "accountId": "123456789012",
            "region": "us-west-2",
            "bucket": "lake",
            "roleArn": "arn:aws:iam::123456789012:role/lake",
            "externalId": "ext-42"
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(org_path("/storage-profiles/swamp")))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let data_source = S3StorageProfileDataSource::new(handle(&server));
    let mut diags = Diagnostics::default();
    let config = S3StorageProfileDataSourceState {
        name: ValueString::from("lake"),
        ..Default::default()
    };
    let state = data_source
        .read(&mut diags, config, Default::default())
        .await
        .unwrap();
    assert_eq!(state.id, ValueString::from("sp-1"));
    assert_eq!(state.account_id, ValueString::from("123456789012"));
    assert_eq!(state.external_id, ValueString::from("ext-42"));

    let config = S3StorageProfileDataSourceState {
        name: ValueString::from("swamp"),
        ..Default::default()
    };
    assert!(data_source
        .read(&mut diags, config, Default::default())
        .await
        .is_none());
    assert_eq!(diags.errors[0].summary, "S3 Storage Profile not found");
}
