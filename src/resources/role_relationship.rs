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

use crate::client::models::Role;
use crate::provider::ClientHandle;
use crate::utils::{require, split_id, ReportError};

use super::{changed, present, required_string};

fn has_child(parent: &Role, child: &str) -> bool {
    parent.children.iter().any(|role| role.name == child)
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct RoleRelationshipState<'a> {
    #[serde(borrow = "'a")]
    pub parent_role_name: ValueString<'a>,
    pub child_role_name: ValueString<'a>,
}

/// Nesting of a child role under a parent role
#[derive(Debug, Clone)]
pub struct RoleRelationshipResource {
    client: ClientHandle,
}

impl RoleRelationshipResource {
    pub fn new(client: ClientHandle) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Resource for RoleRelationshipResource {
    type State<'a> = Value<RoleRelationshipState<'a>>;
    type PrivateState<'a> = ValueEmpty;
    type ProviderMetaState<'a> = ValueEmpty;

    fn schema(&self, _diags: &mut Diagnostics) -> Option<Schema> {
        Some(Schema {
            version: 1,
            block: Block {
                version: 1,
                description: Description::plain("Parent/child relationship between two roles"),
                attributes: map! {
                    "parent_role_name" => required_string("Name of the parent role"),
                    "child_role_name" => required_string("Name of the child role")
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
        let Value::Value(state) = state else {
            return Some((state, private_state));
        };
        let client = self.client.get(diags).await?;
        let parent = require(diags, &state.parent_role_name, "parent_role_name")?;
        let child = require(diags, &state.child_role_name, "child_role_name")?;

        let role = client
            .get_role(parent)
            .await
            .or_report(diags, "Error reading role")?;
        if !role.is_some_and(|role| has_child(&role, child)) {
            tracing::info!("role {child} is no longer a child of {parent}");
            return Some((Value::Null, private_state));
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
        let state = present(diags, proposed_state)?;
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
        let state = present(diags, proposed_state)?;

        let replace = changed(&[
            ("parent_role_name", prior.parent_role_name != state.parent_role_name),
            ("child_role_name", prior.child_role_name != state.child_role_name),
        ]);
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
        let state = present(diags, planned_state)?;
        let client = self.client.get(diags).await?;
        let parent = require(diags, &state.parent_role_name, "parent_role_name")?;
        let child = require(diags, &state.child_role_name, "child_role_name")?;

        client
            .add_role_child(parent, child)
            .await
            .or_report(diags, "Error adding child role")?;
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
        let parent = require(diags, &state.parent_role_name, "parent_role_name")?;
        let child = require(diags, &state.child_role_name, "child_role_name")?;
        client
            .remove_role_child(parent, child)
            .await
            .or_report(diags, "Error removing child role")
    }

    async fn import<'a>(
        &self,
        diags: &mut Diagnostics,
        id: String,
    ) -> Option<(Self::State<'a>, Self::PrivateState<'a>)> {
        let [parent, child] = split_id::<2>(diags, &id, "parent_role_name/child_role_name")?;

        let client = self.client.get(diags).await?;
        let role = client
            .get_role(parent)
            .await
            .or_report(diags, "Error reading role")?;
        if !role.is_some_and(|role| has_child(&role, child)) {
            diags.root_error(
                "Role relationship not found",
                format!("Role {child} is not a child of role {parent}"),
            );
            return None;
        }

        let state = RoleRelationshipState {
            parent_role_name: ValueString::from(parent.to_owned()),
            child_role_name: ValueString::from(child.to_owned()),
        };
        Some((Value::Value(state), Default::default()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn role(name: &str, children: &[&str]) -> Role {
        Role {
            id: format!("{name}-id"),
            name: name.to_owned(),
            children: children.iter().map(|child| role(child, &[])).collect(),
            members: vec![],
        }
    }

    #[test]
    fn children_are_matched_by_name() {
        let parent = role("engineering", &["data", "platform"]);
        assert!(has_child(&parent, "data"));
        assert!(!has_child(&parent, "finance"));
        assert!(!has_child(&role("empty", &[]), "data"));
    }
}
