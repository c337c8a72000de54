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

use crate::client::models::{Database, LookupBy};
use crate::provider::ClientHandle;
use crate::utils::{is_uuid, require, split_id, ReportError};

use super::legacy::find_database;
use super::{changed, computed_string, present, required_string};

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct DatabaseState<'a> {
    #[serde(borrow = "'a")]
    pub id: ValueString<'a>,
    pub warehouse_id: ValueString<'a>,
    pub name: ValueString<'a>,
    pub location: ValueString<'a>,
}

impl DatabaseState<'_> {
    /// Copy `database` into the state, failing when it has no location
    fn refresh(&mut self, diags: &mut Diagnostics, database: Database) -> Option<()> {
        if database.location().is_none() {
            diags.root_error(
                "Database location not found",
                format!("Database {} has no location property", database.name),
            );
            return None;
        }
        self.set(database);
        Some(())
    }

    fn set(&mut self, database: Database) {
        self.location = match database.location() {
            Some(location) => ValueString::from(location.to_owned()),
            None => ValueString::Null,
        };
        self.id = ValueString::from(database.id);
        self.name = ValueString::from(database.name);
        if let Some(warehouse_id) = database.warehouse_id {
            self.warehouse_id = ValueString::from(warehouse_id);
        }
    }
}

#[derive(Debug, Clone)]
pub struct DatabaseResource {
    client: ClientHandle,
}

impl DatabaseResource {
    pub fn new(client: ClientHandle) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Resource for DatabaseResource {
    type State<'a> = Value<DatabaseState<'a>>;
    type PrivateState<'a> = ValueEmpty;
    type ProviderMetaState<'a> = ValueEmpty;

    fn schema(&self, _diags: &mut Diagnostics) -> Option<Schema> {
        Some(Schema {
            version: 1,
            block: Block {
                version: 1,
                description: Description::plain("A Tabular Database"),
                attributes: map! {
                    "id" => computed_string("Database ID"),
                    "warehouse_id" => required_string("Warehouse ID"),
                    "name" => required_string("Database Name"),
                    "location" => computed_string("Storage location of the database")
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
        let warehouse_id = require(diags, &state.warehouse_id, "warehouse_id")?.to_owned();
        let id = require(diags, &state.id, "id")?.to_owned();

        let Some(database) = client
            .get_database(&warehouse_id, &id, LookupBy::Id)
            .await
            .or_report(diags, "Error reading database")?
        else {
            tracing::info!("database {warehouse_id}/{id} no longer exists");
            return Some((Value::Null, private_state));
        };

        state.refresh(diags, database)?;
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
        state.location = ValueString::Unknown;
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
            ("warehouse_id", prior.warehouse_id != state.warehouse_id),
            ("name", prior.name != state.name),
        ]);
        if replace.is_empty() {
            state.id = prior.id;
            state.location = prior.location;
        } else {
            state.id = ValueString::Unknown;
            state.location = ValueString::Unknown;
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
        let warehouse_id = require(diags, &state.warehouse_id, "warehouse_id")?.to_owned();
        let name = require(diags, &state.name, "name")?.to_owned();

        let created = client
            .create_database(&warehouse_id, &name)
            .await
            .or_report(diags, "Error creating database")?;

        // the location is not always part of the creation answer
        let database = if created.location().is_some() {
            created
        } else {
            let fetched = client
                .get_database(&warehouse_id, &created.id, LookupBy::Id)
                .await
                .or_report(diags, "Error reading database")?;
            fetched.unwrap_or(created)
        };

        // the database exists now: keep it in state even without a location
        if database.location().is_none() {
            diags.root_warning(
                "Database location not found",
                format!(
                    "Database {} did not have the location table property set",
                    database.name
                ),
            );
        }
        state.set(database);
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
        let warehouse_id = require(diags, &state.warehouse_id, "warehouse_id")?;
        let id = require(diags, &state.id, "id")?;
        client
            .delete_database(warehouse_id, id)
            .await
            .or_report(diags, "Error deleting database")
    }

    async fn import<'a>(
        &self,
        diags: &mut Diagnostics,
        id: String,
    ) -> Option<(Self::State<'a>, Self::PrivateState<'a>)> {
        let [warehouse_id, database] = split_id::<2>(diags, &id, "warehouse_id/database_id")?;
        if !is_uuid(warehouse_id) {
            diags.root_error(
                "Invalid Import Identifier",
                format!("warehouse_id and database_id must be uuids. Got: {id}"),
            );
            return None;
        }

        let client = self.client.get(diags).await?;
        let database = find_database(&client, diags, warehouse_id, database).await?;

        let mut state = DatabaseState {
            warehouse_id: ValueString::from(warehouse_id.to_owned()),
            ..Default::default()
        };
        state.refresh(diags, database)?;
        Some((Value::Value(state), Default::default()))
    }
}
