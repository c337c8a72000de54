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
use tf_provider::value::{ValueEmpty, ValueString};
use tf_provider::{map, DataSource, Diagnostics};

use crate::provider::ClientHandle;
use crate::resources::computed_string;
use crate::utils::optional;

use super::{exactly_one, optional_computed_string, resolve_warehouse};

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct WarehouseDataSourceState<'a> {
    #[serde(borrow = "'a")]
    pub id: ValueString<'a>,
    pub name: ValueString<'a>,
    pub organization_id: ValueString<'a>,
    pub storage_profile: ValueString<'a>,
    pub region: ValueString<'a>,
}

/// Warehouse looked up by id or by name
#[derive(Debug, Clone)]
pub struct WarehouseDataSource {
    client: ClientHandle,
}

impl WarehouseDataSource {
    pub fn new(client: ClientHandle) -> Self {
        Self { client }
    }
}

#[async_trait]
impl DataSource for WarehouseDataSource {
    type State<'a> = WarehouseDataSourceState<'a>;
    type ProviderMetaState<'a> = ValueEmpty;

    fn schema(&self, _diags: &mut Diagnostics) -> Option<Schema> {
        Some(Schema {
            version: 1,
            block: Block {
                version: 1,
                description: Description::plain("Warehouse data source"),
                attributes: map! {
                    "id" => optional_computed_string("Warehouse ID"),
                    "name" => optional_computed_string("Warehouse Name"),
                    "organization_id" => computed_string("Organization ID"),
                    "storage_profile" => computed_string("Storage Profile ID"),
                    "region" => computed_string("Warehouse Region")
                },
                ..Default::default()
            },
        })
    }

    async fn validate<'a>(&self, diags: &mut Diagnostics, config: Self::State<'a>) -> Option<()> {
        if config.id.is_unknown() || config.name.is_unknown() {
            return Some(());
        }
        exactly_one(diags, ("id", &config.id), ("name", &config.name))
    }

    async fn read<'a>(
        &self,
        diags: &mut Diagnostics,
        config: Self::State<'a>,
        _provider_meta_state: Self::ProviderMetaState<'a>,
    ) -> Option<Self::State<'a>> {
        let client = self.client.get(diags).await?;
        let warehouse = resolve_warehouse(
            &client,
            diags,
            config.id.as_deref_option(),
            config.name.as_deref_option(),
        )
        .await?;

        Some(WarehouseDataSourceState {
            id: ValueString::from(warehouse.id),
            name: optional(warehouse.name),
            organization_id: optional(warehouse.organization_id),
            storage_profile: optional(warehouse.storage_profile),
            region: optional(warehouse.region),
        })
    }
}
