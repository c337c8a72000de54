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

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tf_provider::schema::{Block, Description, Schema};
use tf_provider::value::{Value, ValueEmpty, ValueString};
use tf_provider::{map, AttributePath, Diagnostics, Resource};

use crate::client::models::{LookupBy, StorageProfile};
use crate::provider::ClientHandle;
use crate::utils::{optional, require, ReportError};

use super::{changed, computed_string, present, required_string};

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct S3StorageProfileState<'a> {
    #[serde(borrow = "'a")]
    pub id: ValueString<'a>,
    pub region: ValueString<'a>,
    pub s3_bucket_name: ValueString<'a>,
    pub role_arn: ValueString<'a>,
    pub external_id: ValueString<'a>,
}

impl S3StorageProfileState<'_> {
    fn refresh(&mut self, profile: StorageProfile) {
        self.id = ValueString::from(profile.id);
        if profile.region.is_some() {
            self.region = optional(profile.region);
        }
        if profile.bucket.is_some() {
            self.s3_bucket_name = optional(profile.bucket);
        }
        if profile.role_arn.is_some() {
            self.role_arn = optional(profile.role_arn);
        }
        self.external_id = optional(profile.external_id);
    }
}

#[derive(Debug, Clone)]
pub struct S3StorageProfileResource {
    client: ClientHandle,
}

impl S3StorageProfileResource {
    pub fn new(client: ClientHandle) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Resource for S3StorageProfileResource {
    type State<'a> = Value<S3StorageProfileState<'a>>;
    type PrivateState<'a> = ValueEmpty;
    type ProviderMetaState<'a> = ValueEmpty;

    fn schema(&self, _diags: &mut Diagnostics) -> Option<Schema> {
        Some(Schema {
            version: 1,
            block: Block {
                version: 1,
                description: Description::plain("A Tabular S3 storage profile"),
                attributes: map! {
                    "id" => computed_string("Storage profile ID"),
                    "region" => required_string("AWS region of the bucket"),
                    "s3_bucket_name" => required_string("Name of the S3 bucket"),
                    "role_arn" => required_string("ARN of the role Tabular assumes to access the bucket"),
                    "external_id" => computed_string("External ID to use in the role trust policy")
                },
                ..Default::default()
            },
        })
    }

    async fn validate<'a>(&self, _diags: &mut Diagnostics, _config: Self::State<'a>) -> Option<()> {
        Some(())
    }

    async fn read<'a>(
        &self,
        diags: &mut Diagnostics,
        state: Self::State<'a>,
        private_state: Self::PrivateState<'a>,
        _provider_meta_state: Self::ProviderMetaState<'a>,
    ) -> Option<(Self::State<'a>, Self::PrivateState<'a>)> {
        let Value::Value(mut state) = state else {
            return Some((state, private_state));
        };
        let client = self.client.get(diags).await?;
        let id = require(diags, &state.id, "id")?.to_owned();

        let Some(profile) = client
            .get_storage_profile(&id, LookupBy::Id)
            .await
            .or_report(diags, "Error reading storage profile")?
        else {
            tracing::info!("storage profile {id} no longer exists");
            return Some((Value::Null, private_state));
        };

        state.refresh(profile);
        Some((Value::Value(state), private_state))
    }

    async fn plan_create<'a>(
        &self,
        diags: &mut Diagnostics,
        proposed_state: Self::State<'a>,
        _config_state: Self::State<'a>,
        _provider_meta_state: Self::ProviderMetaState<'a>,
    ) -> Option<(Self::State<'a>, Self::PrivateState<'a>)> {
        let mut state = present(diags, proposed_state)?;
        state.id = ValueString::Unknown;
        state.external_id = ValueString::Unknown;
        Some((Value::Value(state), Default::default()))
    }

    async fn plan_update<'a>(
        &self,
        diags: &mut Diagnostics,
        prior_state: Self::State<'a>,
        proposed_state: Self::State<'a>,
        _config_state: Self::State<'a>,
        prior_private_state: Self::PrivateState<'a>,
        _provider_meta_state: Self::ProviderMetaState<'a>,
    ) -> Option<(Self::State<'a>, Self::PrivateState<'a>, Vec<AttributePath>)> {
        let prior = present(diags, prior_state)?;
        let mut state = present(diags, proposed_state)?;

        let replace = changed(&[
            ("region", prior.region != state.region),
            ("s3_bucket_name", prior.s3_bucket_name != state.s3_bucket_name),
            ("role_arn", prior.role_arn != state.role_arn),
        ]);
        if replace.is_empty() {
            state.id = prior.id;
            state.external_id = prior.external_id;
        } else {
            state.id = ValueString::Unknown;
            state.external_id = ValueString::Unknown;
        }
        Some((Value::Value(state), prior_private_state, replace))
    }

    async fn plan_destroy<'a>(
        &self,
        _diags: &mut Diagnostics,
        _prior_state: Self::State<'a>,
        prior_private_state: Self::PrivateState<'a>,
        _provider_meta_state: Self::ProviderMetaState<'a>,
    ) -> Option<Self::PrivateState<'a>> {
        Some(prior_private_state)
    }

    async fn create<'a>(
        &self,
        diags: &mut Diagnostics,
        planned_state: Self::State<'a>,
        _config_state: Self::State<'a>,
        planned_private_state: Self::PrivateState<'a>,
        _provider_meta_state: Self::ProviderMetaState<'a>,
    ) -> Option<(Self::State<'a>, Self::PrivateState<'a>)> {
        let mut state = present(diags, planned_state)?;
        let client = self.client.get(diags).await?;
        let region = require(diags, &state.region, "region")?;
        let bucket = require(diags, &state.s3_bucket_name, "s3_bucket_name")?;
        let role_arn = require(diags, &state.role_arn, "role_arn")?;

        let profile = client
            .create_storage_profile(region, bucket, role_arn)
            .await
            .or_report(diags, "Error creating storage profile")?;

        state.refresh(profile);
        Some((Value::Value(state), planned_private_state))
    }

    async fn update<'a>(
        &self,
        diags: &mut Diagnostics,
        _prior_state: Self::State<'a>,
        planned_state: Self::State<'a>,
        _config_state: Self::State<'a>,
        planned_private_state: Self::PrivateState<'a>,
        _provider_meta_state: Self::ProviderMetaState<'a>,
    ) -> Option<(Self::State<'a>, Self::PrivateState<'a>)> {
        let state = present(diags, planned_state)?;
        Some((Value::Value(state), planned_private_state))
    }

    async fn destroy<'a>(
        &self,
        diags: &mut Diagnostics,
        prior_state: Self::State<'a>,
        _planned_private_state: Self::PrivateState<'a>,
        _provider_meta_state: Self::ProviderMetaState<'a>,
    ) -> Option<()> {
        let state = present(diags, prior_state)?;
        let client = self.client.get(diags).await?;
        let id = require(diags, &state.id, "id")?;
        client
            .delete_storage_profile(id)
            .await
            .or_report(diags, "Error deleting storage profile")
    }

    async fn import<'a>(
        &self,
        diags: &mut Diagnostics,
        id: String,
    ) -> Option<(Self::State<'a>, Self::PrivateState<'a>)> {
        let client = self.client.get(diags).await?;
        let Some(profile) = client
            .get_storage_profile(&id, LookupBy::Id)
            .await
            .or_report(diags, "Error reading storage profile")?
        else {
            diags.root_error(
                "Storage profile not found",
                format!("Could not find storage profile {id}"),
            );
            return None;
        };

        let mut state = S3StorageProfileState::default();
        state.refresh(profile);
        Some((Value::Value(state), Default::default()))
    }
}
