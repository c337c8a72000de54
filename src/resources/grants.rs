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

//! Privileges granted to a role on a database or a warehouse

use std::collections::HashMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tf_provider::schema::{Attribute, AttributeConstraint, AttributeType, Block, Description, Schema};
use tf_provider::value::{Value, ValueEmpty, ValueSet, ValueString};
use tf_provider::{map, AttributePath, Diagnostics, Resource};

use crate::client::models::GrantChange;
use crate::client::{grant_changes, Client, GrantTarget};
use crate::provider::ClientHandle;
use crate::utils::{
    difference, is_uuid, known_values, refreshed_set, require, split_id, validate_privileges,
    ReportError, DATABASE_PRIVILEGES, WAREHOUSE_PRIVILEGES,
};

use super::legacy::{find_database, find_role_id};
use super::{changed, computed_string, present, required_string};

/// Known privileges of a state, split by grant option
#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct Privileges {
    plain: Vec<String>,
    with_grant: Vec<String>,
}

impl Privileges {
    fn new(privileges: &ValueSet<ValueString<'_>>, with_grant: &ValueSet<ValueString<'_>>) -> Self {
        Self {
            plain: known_values(privileges),
            with_grant: known_values(with_grant),
        }
    }

    fn minus(&self, other: &Self) -> Self {
        Self {
            plain: difference(&self.plain, &other.plain),
            with_grant: difference(&self.with_grant, &other.with_grant),
        }
    }

    /// Part of `self` that survives revoking everything `planned` drops
    fn kept(&self, planned: &Self) -> Self {
        self.minus(&self.minus(planned))
    }

    fn changes(&self, role_id: &str) -> Vec<GrantChange> {
        let mut changes = grant_changes(role_id, &self.plain, false);
        changes.extend(grant_changes(role_id, &self.with_grant, true));
        changes
    }
}

/// Outcome of a reconciliation that went at least through the revoke step
#[derive(Debug, PartialEq, Eq)]
enum Reconciled {
    Done,
    /// Granting failed: only the privileges listed here are still held
    Revoked(Privileges),
}

/// Revoke what is no longer planned, then grant what is new
async fn reconcile(
    client: &Client,
    diags: &mut Diagnostics,
    target: GrantTarget<'_>,
    role_id: &str,
    prior: &Privileges,
    planned: &Privileges,
) -> Option<Reconciled> {
    let revoked = prior.minus(planned).changes(role_id);
    let granted = planned.minus(prior).changes(role_id);
    tracing::debug!(
        "{target}: revoking {} and granting {} privileges for role {role_id}",
        revoked.len(),
        granted.len()
    );

    client
        .revoke(target, &revoked)
        .await
        .or_report(diags, "Error revoking privileges")?;
    match client
        .grant(target, &granted)
        .await
        .or_report(diags, "Error granting privileges")
    {
        Some(()) => Some(Reconciled::Done),
        None => Some(Reconciled::Revoked(prior.kept(planned))),
    }
}

fn grants_schema(description: &str, kind: &str, target: HashMap<String, Attribute>) -> Schema {
    let mut attributes: HashMap<String, Attribute> = map! {
        "id" => computed_string("Grants ID"),
        "role_id" => required_string("Role ID"),
        "privileges" => Attribute {
            attr_type: AttributeType::Set(AttributeType::String.into()),
            description: Description::plain(format!("{kind} privileges granted to the role")),
            constraint: AttributeConstraint::Optional,
            ..Default::default()
        },
        "privileges_with_grant" => Attribute {
            attr_type: AttributeType::Set(AttributeType::String.into()),
            description: Description::plain(format!(
                "{kind} privileges granted to the role, which it can grant to other roles"
            )),
            constraint: AttributeConstraint::Optional,
            ..Default::default()
        }
    };
    attributes.extend(target);

    Schema {
        version: 1,
        block: Block {
            version: 1,
            description: Description::plain(description),
            attributes,
            ..Default::default()
        },
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct RoleDatabaseGrantsState<'a> {
    #[serde(borrow = "'a")]
    pub id: ValueString<'a>,
    pub role_id: ValueString<'a>,
    pub warehouse_id: ValueString<'a>,
    pub database_id: ValueString<'a>,
    pub privileges: ValueSet<ValueString<'a>>,
    pub privileges_with_grant: ValueSet<ValueString<'a>>,
}

impl RoleDatabaseGrantsState<'_> {
    fn privileges(&self) -> Privileges {
        Privileges::new(&self.privileges, &self.privileges_with_grant)
    }

    fn keep(&mut self, kept: Privileges) {
        self.privileges = refreshed_set(&self.privileges, kept.plain.into_iter().collect());
        self.privileges_with_grant =
            refreshed_set(&self.privileges_with_grant, kept.with_grant.into_iter().collect());
    }
}

#[derive(Debug, Clone)]
pub struct RoleDatabaseGrantsResource {
    client: ClientHandle,
}

impl RoleDatabaseGrantsResource {
    pub fn new(client: ClientHandle) -> Self {
        Self { client }
    }

    async fn refresh(
        &self,
        diags: &mut Diagnostics,
        state: &mut RoleDatabaseGrantsState<'_>,
    ) -> Option<()> {
        let client = self.client.get(diags).await?;
        let warehouse_id = require(diags, &state.warehouse_id, "warehouse_id")?.to_owned();
        let database_id = require(diags, &state.database_id, "database_id")?.to_owned();
        let role_id = require(diags, &state.role_id, "role_id")?.to_owned();

        let target = GrantTarget::Database {
            warehouse_id: &warehouse_id,
            database_id: &database_id,
        };
        let grants = client
            .get_grants(target, &role_id)
            .await
            .or_report(diags, "Error reading database grants")?;

        state.id = ValueString::from(format!("{warehouse_id}/{database_id}/{role_id}"));
        state.privileges = refreshed_set(&state.privileges, grants.privileges);
        state.privileges_with_grant =
            refreshed_set(&state.privileges_with_grant, grants.privileges_with_grant);
        Some(())
    }
}

#[async_trait]
impl Resource for RoleDatabaseGrantsResource {
    type State<'a> = Value<RoleDatabaseGrantsState<'a>>;
    type PrivateState<'a> = ValueEmpty;
    type ProviderMetaState<'a> = ValueEmpty;

    fn schema(&self, _diags: &mut Diagnostics) -> Option<Schema> {
        Some(grants_schema(
            "Privileges granted to a role on a database",
            "Database",
            map! {
                "warehouse_id" => required_string("Warehouse ID"),
                "database_id" => required_string("Database ID")
            },
        ))
    }

    async fn validate<'a>(&self, diags: &mut Diagnostics, config: Self::State<'a>) -> Option<()> {
        let Value::Value(config) = config else {
            return Some(());
        };
        for (attr, set) in [
            ("privileges", &config.privileges),
            ("privileges_with_grant", &config.privileges_with_grant),
        ] {
            validate_privileges(diags, attr, set, DATABASE_PRIVILEGES, "Database");
        }

        if diags.errors.is_empty() {
            Some(())
        } else {
            None
        }
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
        self.refresh(diags, &mut state).await?;
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
            ("role_id", prior.role_id != state.role_id),
            ("warehouse_id", prior.warehouse_id != state.warehouse_id),
            ("database_id", prior.database_id != state.database_id),
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
        let warehouse_id = require(diags, &state.warehouse_id, "warehouse_id")?;
        let database_id = require(diags, &state.database_id, "database_id")?;
        let role_id = require(diags, &state.role_id, "role_id")?;

        let target = GrantTarget::Database {
            warehouse_id,
            database_id,
        };
        client
            .grant(target, &state.privileges().changes(role_id))
            .await
            .or_report(diags, "Error granting privileges")?;

        state.id = ValueString::from(format!("{warehouse_id}/{database_id}/{role_id}"));
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
        let warehouse_id = require(diags, &state.warehouse_id, "warehouse_id")?;
        let database_id = require(diags, &state.database_id, "database_id")?;
        let role_id = require(diags, &state.role_id, "role_id")?;

        let target = GrantTarget::Database {
            warehouse_id,
            database_id,
        };
        let reconciled = reconcile(
            &client,
            diags,
            target,
            role_id,
            &prior.privileges(),
            &state.privileges(),
        )
        .await?;

        state.id = ValueString::from(format!("{warehouse_id}/{database_id}/{role_id}"));
        if let Reconciled::Revoked(kept) = reconciled {
            state.keep(kept);
        }
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
        let database_id = require(diags, &state.database_id, "database_id")?;
        let role_id = require(diags, &state.role_id, "role_id")?;

        let target = GrantTarget::Database {
            warehouse_id,
            database_id,
        };
        client
            .revoke(target, &state.privileges().changes(role_id))
            .await
            .or_report(diags, "Error revoking privileges")
    }

    async fn import<'a>(
        &self,
        diags: &mut Diagnostics,
        id: String,
    ) -> Option<(Self::State<'a>, Self::PrivateState<'a>)> {
        let [warehouse_id, database, role_name] =
            split_id::<3>(diags, &id, "warehouse_id/database_id/role_name")?;
        if !is_uuid(warehouse_id) {
            diags.root_error(
                "Invalid Import Identifier",
                format!("warehouse_id must be a uuid. Got: {warehouse_id}"),
            );
            return None;
        }

        let client = self.client.get(diags).await?;
        let database = find_database(&client, diags, warehouse_id, database).await?;
        let role_id = find_role_id(&client, diags, role_name).await?;

        let mut state = RoleDatabaseGrantsState {
            role_id: ValueString::from(role_id),
            warehouse_id: ValueString::from(warehouse_id.to_owned()),
            database_id: ValueString::from(database.id),
            privileges: Value::Value(Default::default()),
            privileges_with_grant: Value::Value(Default::default()),
            ..Default::default()
        };
        self.refresh(diags, &mut state).await?;
        Some((Value::Value(state), Default::default()))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct RoleWarehouseGrantsState<'a> {
    #[serde(borrow = "'a")]
    pub id: ValueString<'a>,
    pub role_id: ValueString<'a>,
    pub warehouse_id: ValueString<'a>,
    pub privileges: ValueSet<ValueString<'a>>,
    pub privileges_with_grant: ValueSet<ValueString<'a>>,
}

impl RoleWarehouseGrantsState<'_> {
    fn privileges(&self) -> Privileges {
        Privileges::new(&self.privileges, &self.privileges_with_grant)
    }

    fn keep(&mut self, kept: Privileges) {
        self.privileges = refreshed_set(&self.privileges, kept.plain.into_iter().collect());
        self.privileges_with_grant =
            refreshed_set(&self.privileges_with_grant, kept.with_grant.into_iter().collect());
    }
}

#[derive(Debug, Clone)]
pub struct RoleWarehouseGrantsResource {
    client: ClientHandle,
}

impl RoleWarehouseGrantsResource {
    pub fn new(client: ClientHandle) -> Self {
        Self { client }
    }

    async fn refresh(
        &self,
        diags: &mut Diagnostics,
        state: &mut RoleWarehouseGrantsState<'_>,
    ) -> Option<()> {
        let client = self.client.get(diags).await?;
        let warehouse_id = require(diags, &state.warehouse_id, "warehouse_id")?.to_owned();
        let role_id = require(diags, &state.role_id, "role_id")?.to_owned();

        let target = GrantTarget::Warehouse {
            warehouse_id: &warehouse_id,
        };
        let grants = client
            .get_grants(target, &role_id)
            .await
            .or_report(diags, "Error reading warehouse grants")?;

        state.id = ValueString::from(format!("{warehouse_id}/{role_id}"));
        state.privileges = refreshed_set(&state.privileges, grants.privileges);
        state.privileges_with_grant =
            refreshed_set(&state.privileges_with_grant, grants.privileges_with_grant);
        Some(())
    }
}

#[async_trait]
impl Resource for RoleWarehouseGrantsResource {
    type State<'a> = Value<RoleWarehouseGrantsState<'a>>;
    type PrivateState<'a> = ValueEmpty;
    type ProviderMetaState<'a> = ValueEmpty;

    fn schema(&self, _diags: &mut Diagnostics) -> Option<Schema> {
        Some(grants_schema(
            "Privileges granted to a role on a warehouse",
            "Warehouse",
            map! {
                "warehouse_id" => required_string("Warehouse ID")
            },
        ))
    }

    async fn validate<'a>(&self, diags: &mut Diagnostics, config: Self::State<'a>) -> Option<()> {
        let Value::Value(config) = config else {
            return Some(());
        };
        for (attr, set) in [
            ("privileges", &config.privileges),
            ("privileges_with_grant", &config.privileges_with_grant),
        ] {
            validate_privileges(diags, attr, set, WAREHOUSE_PRIVILEGES, "Warehouse");
        }

        if diags.errors.is_empty() {
            Some(())
        } else {
            None
        }
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
        self.refresh(diags, &mut state).await?;
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
            ("role_id", prior.role_id != state.role_id),
            ("warehouse_id", prior.warehouse_id != state.warehouse_id),
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
        let warehouse_id = require(diags, &state.warehouse_id, "warehouse_id")?;
        let role_id = require(diags, &state.role_id, "role_id")?;

        client
            .grant(
                GrantTarget::Warehouse { warehouse_id },
                &state.privileges().changes(role_id),
            )
            .await
            .or_report(diags, "Error granting privileges")?;

        state.id = ValueString::from(format!("{warehouse_id}/{role_id}"));
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
        let warehouse_id = require(diags, &state.warehouse_id, "warehouse_id")?;
        let role_id = require(diags, &state.role_id, "role_id")?;

        let reconciled = reconcile(
            &client,
            diags,
            GrantTarget::Warehouse { warehouse_id },
            role_id,
            &prior.privileges(),
            &state.privileges(),
        )
        .await?;

        state.id = ValueString::from(format!("{warehouse_id}/{role_id}"));
        if let Reconciled::Revoked(kept) = reconciled {
            state.keep(kept);
        }
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
        let role_id = require(diags, &state.role_id, "role_id")?;

        client
            .revoke(
                GrantTarget::Warehouse { warehouse_id },
                &state.privileges().changes(role_id),
            )
            .await
            .or_report(diags, "Error revoking privileges")
    }

    async fn import<'a>(
        &self,
        diags: &mut Diagnostics,
        id: String,
    ) -> Option<(Self::State<'a>, Self::PrivateState<'a>)> {
        let [warehouse_id, role_name] = split_id::<2>(diags, &id, "warehouse_id/role_name")?;

        let client = self.client.get(diags).await?;
        let role_id = find_role_id(&client, diags, role_name).await?;

        let mut state = RoleWarehouseGrantsState {
            role_id: ValueString::from(role_id),
            warehouse_id: ValueString::from(warehouse_id.to_owned()),
            privileges: Value::Value(Default::default()),
            privileges_with_grant: Value::Value(Default::default()),
            ..Default::default()
        };
        self.refresh(diags, &mut state).await?;
        Some((Value::Value(state), Default::default()))
    }
}
