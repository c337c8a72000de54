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
use crate::resources::{computed_string, required_string};
use crate::utils::{require, ReportError};

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct RoleDataSourceState<'a> {
    #[serde(borrow = "'a")]
    pub id: ValueString<'a>,
    pub name: ValueString<'a>,
}

#[derive(Debug, Clone)]
pub struct RoleDataSource {
    client: ClientHandle,
}

impl RoleDataSource {
    pub fn new(client: ClientHandle) -> Self {
        Self { client }
    }
}

#[async_trait]
impl DataSource for RoleDataSource {
    type State<'a> = RoleDataSourceState<'a>;
    type ProviderMetaState<'a> = ValueEmpty;

    fn schema(&self, _diags: &mut Diagnostics) -> Option<Schema> {
        Some(Schema {
            version: 1,
            block: Block {
                version: 1,
                description: Description::plain("Role data source"),
                attributes: map! {
                    "id" => computed_string("Role ID (uuid)"),
                    "name" => required_string("Role Name")
                },
                ..Default::default()
            },
        })
    }

    async fn read<'a>(
        &self,
        diags: &mut Diagnostics,
        config: Self::State<'a>,
        _provider_meta_state: Self::ProviderMetaState<'a>,
    ) -> Option<Self::State<'a>> {
        let client = self.client.get(diags).await?;
        let name = require(diags, &config.name, "name")?;

        let Some(role) = client
            .get_role(name)
            .await
            .or_report(diags, "Error fetching role")?
        else {
            diags.root_error("Role not found", format!("Could not find role {name}"));
            return None;
        };

        Some(RoleDataSourceState {
            id: ValueString::from(role.id),
            name: ValueString::from(role.name),
        })
    }
}
