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
use tf_provider::schema::{Attribute, AttributeConstraint, AttributeType, Block, Description, Schema};
use tf_provider::value::{Value, ValueBool, ValueEmpty, ValueString};
use tf_provider::{map, AttributePath, Diagnostics, Resource};

use crate::provider::ClientHandle;
use crate::utils::{require, ReportError};

use super::{computed_string, present, required_string};

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct RoleState<'a> {
    #[serde(borrow = "'a")]
    pub id: ValueString<'a>,
    pub name: ValueString<'a>,
    pub force_destroy: ValueBool,
}

#[derive(Debug, Clone)]
pub struct RoleResource {
    client: ClientHandle,
}

impl RoleResource {
    pub fn new(client: ClientHandle) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Resource for RoleResource {
    type State<'a> = Value<RoleState<'a>>;
    type PrivateState<'a> = ValueEmpty;
    type ProviderMetaState<'a> = ValueEmpty;

    fn schema(&self, _diags: &mut Diagnostics) -> Option<Schema> {
        Some(Schema {
            version: 1,
            block: Block {
                version: 1,
                description: Description::plain("A Tabular Role"),
                attributes: map! {
                    "id" => computed_string("Role ID (uuid)"),
                    "name" => required_string("Role Name"),
                    "force_destroy" => Attribute {
                        attr_type: AttributeType::Bool,
                        description: Description::plain(
                            "Delete the role even if users, roles or privileges are still attached to it"
                        ),
                        constraint: AttributeConstraint::Optional,
                        ..Default::default()
                    }
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
        let name = require(diags, &state.name, "name")?.to_owned();

        let Some(role) = client
            .get_role(&name)
            .await
            .or_report(diags, "Error reading role")?
        else {
            tracing::info!("role {name} no longer exists");
            return Some((Value::Null, private_state));
        };

        state.id = ValueString::from(role.id);
        state.name = ValueString::from(role.name);
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
        state.id = prior.id;
        Some((Value::Value(state), prior_private_state, vec![]))
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
        let name = require(diags, &state.name, "name")?.to_owned();

        let role = client
            .create_role(&name)
            .await
            .or_report(diags, "Error creating role")?;

        state.id = ValueString::from(role.id);
        Some((Value::Value(state), planned_private_state))
    }

    async fn update<'a>(
        &self,
        diags: &mut Diagnostics,
        prior_state: Self::State<'a>,
        planned_state: Self::State<'a>,
        _config_state: Self::State<'a>,
        planned_private_state: Self::PrivateState<'a>,
        _provider_meta_state: Self::ProviderMetaState<'a>,
    ) -> Option<(Self::State<'a>, Self::PrivateState<'a>)> {
        let prior = present(diags, prior_state)?;
        let mut state = present(diags, planned_state)?;
        let client = self.client.get(diags).await?;

        let old_name = require(diags, &prior.name, "name")?;
        let new_name = require(diags, &state.name, "name")?;
        if old_name != new_name {
            client
                .rename_role(old_name, new_name)
                .await
                .or_report(diags, "Error renaming role")?;
        }

        state.id = prior.id;
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
        let name = require(diags, &state.name, "name")?;
        let force = state.force_destroy.unwrap_or(false);

        if let Err(err) = client.delete_role(name, force).await {
            diags.root_error(
                "Error deleting role",
                format!(
                    "{err}. Does the role still have any users/roles/permissions attached to it?"
                ),
            );
            return None;
        }
        Some(())
    }

    async fn import<'a>(
        &self,
        diags: &mut Diagnostics,
        id: String,
    ) -> Option<(Self::State<'a>, Self::PrivateState<'a>)> {
        let client = self.client.get(diags).await?;
        let Some(role) = client
            .get_role(&id)
            .await
            .or_report(diags, "Error reading role")?
        else {
            diags.root_error("Role not found", format!("Could not find role {id}"));
            return None;
        };

        let state = RoleState {
            id: ValueString::from(role.id),
            name: ValueString::from(role.name),
            force_destroy: Value::Null,
        };
        Some((Value::Value(state), Default::default()))
    }
}
