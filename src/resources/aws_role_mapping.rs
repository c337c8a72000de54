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

//! Mapping of an AWS IAM role onto a Tabular role

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tf_provider::schema::{Block, Description, Schema};
use tf_provider::value::{Value, ValueEmpty, ValueString};
use tf_provider::{map, AttributePath, Diagnostics, Resource};

use crate::client::models::Credential;
use crate::provider::ClientHandle;
use crate::utils::{optional, require, ReportError};

use super::{changed, computed_string, present, required_string};

fn mapping_name(role_id: &str, aws_role_arn: &str) -> String {
    format!("{role_id}-{aws_role_arn}")
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct AwsRoleMappingState<'a> {
    #[serde(borrow = "'a")]
    pub id: ValueString<'a>,
    pub name: ValueString<'a>,
    pub role_id: ValueString<'a>,
    pub aws_role_arn: ValueString<'a>,
}

impl AwsRoleMappingState<'_> {
    fn refresh(&mut self, credential: Credential) {
        self.id = ValueString::from(credential.key);
        if credential.name.is_some() {
            self.name = optional(credential.name);
        }
        if credential.role_id.is_some() {
            self.role_id = optional(credential.role_id);
        }
    }
}

#[derive(Debug, Clone)]
pub struct AwsRoleMappingResource {
    client: ClientHandle,
}

impl AwsRoleMappingResource {
    pub fn new(client: ClientHandle) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Resource for AwsRoleMappingResource {
    type State<'a> = Value<AwsRoleMappingState<'a>>;
    type PrivateState<'a> = ValueEmpty;
    type ProviderMetaState<'a> = ValueEmpty;

    fn schema(&self, _diags: &mut Diagnostics) -> Option<Schema> {
        Some(Schema {
            version: 1,
            block: Block {
                version: 1,
                description: Description::plain("Maps an AWS IAM role to a Tabular role"),
                attributes: map! {
                    "id" => computed_string("Mapping ID (the credential key)"),
                    "name" => computed_string("Mapping name"),
                    "role_id" => required_string("Tabular role ID"),
                    "aws_role_arn" => required_string("ARN of the AWS IAM role")
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

        let Some(credential) = client
            .get_credential(&id)
            .await
            .or_report(diags, "Error reading AWS role mapping")?
        else {
            tracing::info!("AWS role mapping {id} no longer exists");
            return Some((Value::Null, private_state));
        };

        state.refresh(credential);
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
        state.name = match (&state.role_id, &state.aws_role_arn) {
            (Value::Value(role_id), Value::Value(arn)) => {
                ValueString::from(mapping_name(role_id, arn))
            }
            _ => ValueString::Unknown,
        };
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
            ("role_id", prior.role_id != state.role_id),
            ("aws_role_arn", prior.aws_role_arn != state.aws_role_arn),
        ]);
        if replace.is_empty() {
            state.id = prior.id;
            state.name = prior.name;
        } else {
            state.id = ValueString::Unknown;
            state.name = ValueString::Unknown;
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
        let role_id = require(diags, &state.role_id, "role_id")?;
        let aws_role_arn = require(diags, &state.aws_role_arn, "aws_role_arn")?;
        let name = mapping_name(role_id, aws_role_arn);

        let created = client
            .create_iam_role_mapping(&name, aws_role_arn, role_id)
            .await
            .or_report(diags, "Error creating AWS role mapping")?;

        state.id = ValueString::from(created.credential_id);
        state.name = ValueString::from(name);
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
            .delete_credential(id)
            .await
            .or_report(diags, "Error deleting AWS role mapping")
    }

    async fn import<'a>(
        &self,
        diags: &mut Diagnostics,
        id: String,
    ) -> Option<(Self::State<'a>, Self::PrivateState<'a>)> {
        let client = self.client.get(diags).await?;
        let Some(credential) = client
            .get_credential(&id)
            .await
            .or_report(diags, "Error reading AWS role mapping")?
        else {
            diags.root_error(
                "AWS role mapping not found",
                format!("Could not find AWS role mapping {id}"),
            );
            return None;
        };

        let mut state = AwsRoleMappingState::default();
        state.refresh(credential);
        // the credential does not expose the ARN, recover it from the name
        if let (Value::Value(role_id), Value::Value(name)) = (&state.role_id, &state.name) {
            if let Some(arn) = name.strip_prefix(&format!("{role_id}-")) {
                state.aws_role_arn = ValueString::from(arn.to_owned());
            }
        }
        Some((Value::Value(state), Default::default()))
    }
}
