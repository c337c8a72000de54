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

//! Users attached to a role, with or without the admin option

use std::collections::{BTreeSet, HashMap};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tf_provider::schema::{Attribute, AttributeConstraint, AttributeType, Block, Description, Schema};
use tf_provider::value::{Value, ValueEmpty, ValueSet, ValueString};
use tf_provider::{map, AttributePath, Diagnostics, Resource};

use crate::client::models::Role;
use crate::client::Client;
use crate::provider::ClientHandle;
use crate::utils::{difference, known_values, refreshed_set, require, value_set, ReportError};

use super::{changed, present, required_string};

/// Resolve member emails to their ids, reporting every unknown email
fn member_ids(
    diags: &mut Diagnostics,
    org_members: &HashMap<String, String>,
    emails: &[String],
    attr: &'static str,
) -> Vec<String> {
    emails
        .iter()
        .filter_map(|email| match org_members.get(email) {
            Some(id) => Some(id.clone()),
            None => {
                diags.error(
                    "Member Not Found",
                    format!("Could not find user with email {email} in org"),
                    AttributePath::new(attr).key(email.clone()),
                );
                None
            }
        })
        .collect()
}

/// Emails of the role members, split by admin option
fn split_members(role: Role) -> (BTreeSet<String>, BTreeSet<String>) {
    let (admins, members): (Vec<_>, Vec<_>) =
        role.members.into_iter().partition(|member| member.with_admin);
    (
        admins.into_iter().map(|member| member.email).collect(),
        members.into_iter().map(|member| member.email).collect(),
    )
}

fn members_set(description: &str) -> Attribute {
    Attribute {
        attr_type: AttributeType::Set(AttributeType::String.into()),
        description: Description::plain(description),
        constraint: AttributeConstraint::Optional,
        ..Default::default()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct RoleMembershipState<'a> {
    #[serde(borrow = "'a")]
    pub role_name: ValueString<'a>,
    pub admin_members: ValueSet<ValueString<'a>>,
    pub members: ValueSet<ValueString<'a>>,
}

#[derive(Debug, Clone)]
pub struct RoleMembershipResource {
    client: ClientHandle,
}

impl RoleMembershipResource {
    pub fn new(client: ClientHandle) -> Self {
        Self { client }
    }

    async fn org_members(
        client: &Client,
        diags: &mut Diagnostics,
    ) -> Option<HashMap<String, String>> {
        client
            .org_member_ids()
            .await
            .or_report(diags, "Unable to fetch org members")
    }
}

#[async_trait]
impl Resource for RoleMembershipResource {
    type State<'a> = Value<RoleMembershipState<'a>>;
    type PrivateState<'a> = ValueEmpty;
    type ProviderMetaState<'a> = ValueEmpty;

    fn schema(&self, _diags: &mut Diagnostics) -> Option<Schema> {
        Some(Schema {
            version: 1,
            block: Block {
                version: 1,
                description: Description::plain("Members of a Tabular role"),
                attributes: map! {
                    "role_name" => required_string("Name of the role"),
                    "admin_members" => members_set("Emails of the members allowed to manage the role"),
                    "members" => members_set("Emails of the members of the role")
                },
                ..Default::default()
            },
        })
    }

    async fn validate<'a>(&self, diags: &mut Diagnostics, config: Self::State<'a>) -> Option<()> {
        let Value::Value(config) = config else {
            return Some(());
        };
        if !config.admin_members.is_value() || !config.members.is_value() {
            return Some(());
        }

        let members = known_values(&config.members);
        let both = known_values(&config.admin_members)
            .into_iter()
            .filter(|email| members.contains(email))
            .collect::<Vec<_>>();
        if both.is_empty() {
            Some(())
        } else {
            diags.root_error(
                "Invalid Configuration",
                format!(
                    "Found members present in both admin_members and members: [{}]",
                    both.join(", ")
                ),
            );
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
        let client = self.client.get(diags).await?;
        let role_name = require(diags, &state.role_name, "role_name")?.to_owned();

        let Some(role) = client
            .get_role(&role_name)
            .await
            .or_report(diags, "Error fetching role")?
        else {
            tracing::info!("role {role_name} no longer exists");
            return Some((Value::Null, private_state));
        };

        let (admins, members) = split_members(role);
        state.admin_members = refreshed_set(&state.admin_members, admins);
        state.members = refreshed_set(&state.members, members);
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
        let replace = changed(&[("role_name", prior.role_name != state.role_name)]);
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
        let role_name = require(diags, &state.role_name, "role_name")?;

        let org_members = Self::org_members(&client, diags).await?;
        let admin_ids = member_ids(
            diags,
            &org_members,
            &known_values(&state.admin_members),
            "admin_members",
        );
        let ids = member_ids(diags, &org_members, &known_values(&state.members), "members");
        if !diags.errors.is_empty() {
            return None;
        }

        client
            .add_role_members(role_name, &admin_ids, &ids)
            .await
            .or_report(diags, "Error adding role members")?;
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
        let state = present(diags, planned_state)?;
        let client = self.client.get(diags).await?;
        let role_name = require(diags, &state.role_name, "role_name")?;

        let prior_admins = known_values(&prior.admin_members);
        let prior_members = known_values(&prior.members);
        let planned_admins = known_values(&state.admin_members);
        let planned_members = known_values(&state.members);

        let org_members = Self::org_members(&client, diags).await?;
        let mut removed = member_ids(
            diags,
            &org_members,
            &difference(&prior_admins, &planned_admins),
            "admin_members",
        );
        removed.extend(member_ids(
            diags,
            &org_members,
            &difference(&prior_members, &planned_members),
            "members",
        ));
        let added_admins = member_ids(
            diags,
            &org_members,
            &difference(&planned_admins, &prior_admins),
            "admin_members",
        );
        let added = member_ids(
            diags,
            &org_members,
            &difference(&planned_members, &prior_members),
            "members",
        );
        if !diags.errors.is_empty() {
            return None;
        }

        client
            .remove_role_members(role_name, &removed)
            .await
            .or_report(diags, "Error removing role members")?;
        client
            .add_role_members(role_name, &added_admins, &added)
            .await
            .or_report(diags, "Error adding role members")?;
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
        let role_name = require(diags, &state.role_name, "role_name")?;

        let org_members = Self::org_members(&client, diags).await?;
        let mut ids = member_ids(
            diags,
            &org_members,
            &known_values(&state.admin_members),
            "admin_members",
        );
        ids.extend(member_ids(
            diags,
            &org_members,
            &known_values(&state.members),
            "members",
        ));
        if !diags.errors.is_empty() {
            return None;
        }

        client
            .remove_role_members(role_name, &ids)
            .await
            .or_report(diags, "Error removing role members")
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
            .or_report(diags, "Error fetching role")?
        else {
            diags.root_error("Role not found", format!("Could not find role {id}"));
            return None;
        };

        let (admins, members) = split_members(role);
        let state = RoleMembershipState {
            role_name: ValueString::from(id),
            admin_members: value_set(admins),
            members: value_set(members),
        };
        Some((Value::Value(state), Default::default()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::models::Member;

    fn emails(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn unknown_emails_are_reported() {
        let org = HashMap::from([
            ("ada@example.com".to_string(), "u1".to_string()),
            ("bob@example.com".to_string(), "u2".to_string()),
        ]);
        let mut diags = Diagnostics::default();
        let ids = member_ids(
            &mut diags,
            &org,
            &emails(&["bob@example.com", "eve@example.com"]),
            "members",
        );
        assert_eq!(ids, ["u2"]);
        assert_eq!(diags.errors.len(), 1);
    }

    #[test]
    fn members_split_by_admin_option() {
        let member = |email: &str, with_admin| Member {
            id: email.to_uppercase(),
            email: email.to_owned(),
            with_admin,
        };
        let role = Role {
            members: vec![member("a@x.io", true), member("b@x.io", false), member("c@x.io", false)],
            ..Default::default()
        };
        let (admins, members) = split_members(role);
        assert_eq!(admins, BTreeSet::from(["a@x.io".to_string()]));
        assert_eq!(members.len(), 2);
    }

    #[tokio::test]
    async fn overlapping_sets_are_rejected() {
        let resource = RoleMembershipResource::new(Default::default());
        let mut diags = Diagnostics::default();
        let config = Value::Value(RoleMembershipState {
            role_name: ValueString::from("analysts"),
            admin_members: value_set(emails(&["a@x.io", "b@x.io"])),
            members: value_set(emails(&["b@x.io", "c@x.io"])),
        });
        assert!(resource.validate(&mut diags, config).await.is_none());
        assert_eq!(diags.errors.len(), 1);

        let mut diags = Diagnostics::default();
        let config = Value::Value(RoleMembershipState {
            role_name: ValueString::from("analysts"),
            admin_members: value_set(emails(&["a@x.io"])),
            members: Value::Null,
        });
        assert!(resource.validate(&mut diags, config).await.is_some());
    }
}
