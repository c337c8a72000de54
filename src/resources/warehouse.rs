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

use crate::provider::ClientHandle;
use crate::utils::{optional, require, ReportError};

use super::{changed, computed_string, present, required_string};

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct WarehouseState<'a> {
    #[serde(borrow = "'a")]
    pub id: ValueString<'a>,
    pub name: ValueString<'a>,
    pub storage_profile: ValueString<'a>,
}

/// Warehouses cannot be modified in place: any change replaces them
#[derive(Debug, Clone)]
pub struct WarehouseResource {
    client: ClientHandle,
}

impl WarehouseResource {
    pub fn new(client: ClientHandle) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Resource for WarehouseResource {
    type State<'a> = Value<WarehouseState<'a>>;
    type PrivateState<'a> = ValueEmpty;
    type ProviderMetaState<'a> = ValueEmpty;

    fn schema(&self, _diags: &mut Diagnostics) -> Option<Schema> {
        Some(Schema {
            version: 1,
            block: Block {
                version: 1,
                description: Description::plain("A Tabular Warehouse"),
                attributes: map! {
                    "id" => computed_string("Warehouse ID"),
                    "name" => required_string("Warehouse Name"),
                    "storage_profile" => required_string("Storage profile ID backing the warehouse")
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

        let Some(warehouse) = client
            .get_warehouse(&id)
            .await
            .or_report(diags, "Error reading warehouse")?
        else {
            tracing::info!("warehouse {id} no longer exists");
            return Some((Value::Null, private_state));
        };

        state.id = ValueString::from(warehouse.id);
        if warehouse.name.is_some() {
            state.name = optional(warehouse.name);
        }
        if warehouse.storage_profile.is_some() {
            state.storage_profile = optional(warehouse.storage_profile);
        }
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

        let replace = changed(&[
            ("name", prior.name != state.name),
            ("storage_profile", prior.storage_profile != state.storage_profile),
        ]);
        state.id = if replace.is_empty() {
            prior.id
        } else {
            ValueString::Unknown
        };
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
        let name = require(diags, &state.name, "name")?;
        let storage_profile = require(diags, &state.storage_profile, "storage_profile")?;

        let warehouse = client
            .create_warehouse(name, storage_profile)
            .await
            .or_report(diags, "Error creating warehouse")?;

        state.id = ValueString::from(warehouse.id);
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
            .delete_warehouse(id)
            .await
            .or_report(diags, "Error deleting warehouse")
    }

    async fn import<'a>(
        &self,
        diags: &mut Diagnostics,
        id: String,
    ) -> Option<(Self::State<'a>, Self::PrivateState<'a>)> {
        let client = self.client.get(diags).await?;
        let Some(warehouse) = client
            .get_warehouse(&id)
            .await
            .or_report(diags, "Error reading warehouse")?
        else {
            diags.root_error("Warehouse not found", format!("Could not find warehouse {id}"));
            return None;
        };

        let state = WarehouseState {
            id: ValueString::from(warehouse.id),
            name: optional(warehouse.name),
            storage_profile: optional(warehouse.storage_profile),
        };
        Some((Value::Value(state), Default::default()))
    }
}
