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

use std::collections::HashMap;

use reqwest::Method;

use super::models::{Member, Role, RoleMemberChange, RoleNameRequest};
use super::{Client, Result};

impl Client {
    pub async fn get_role(&self, name: &str) -> Result<Option<Role>> {
        self.get_optional(self.ws(&["grants", "roles", name])?)
            .await
    }

    pub async fn create_role(&self, name: &str) -> Result<Role> {
        tracing::info!("creating role {name}");
        self.post(
            self.ws(&["grants", "roles"])?,
            &RoleNameRequest { role_name: name },
        )
        .await
    }

    pub async fn rename_role(&self, name: &str, new_name: &str) -> Result<()> {
        tracing::info!("renaming role {name} to {new_name}");
        self.execute(
            Method::PUT,
            self.ws(&["grants", "roles", name])?,
            Some(&RoleNameRequest {
                role_name: new_name,
            }),
        )
        .await
    }

    pub async fn delete_role(&self, name: &str, force: bool) -> Result<()> {
        tracing::info!("deleting role {name} (force: {force})");
        let mut url = self.ws(&["grants", "roles", name])?;
        url.query_pairs_mut()
            .append_pair("force", if force { "true" } else { "false" });
        self.delete(url).await
    }

    pub async fn add_role_child(&self, parent: &str, child: &str) -> Result<()> {
        tracing::info!("adding role {child} under {parent}");
        self.execute(
            Method::PUT,
            self.ws(&["grants", "roles", parent, "children"])?,
            Some(&RoleNameRequest { role_name: child }),
        )
        .await
    }

    pub async fn remove_role_child(&self, parent: &str, child: &str) -> Result<()> {
        tracing::info!("removing role {child} from {parent}");
        self.execute(
            Method::DELETE,
            self.ws(&["grants", "roles", parent, "children"])?,
            Some(&RoleNameRequest { role_name: child }),
        )
        .await
    }

    /// Members of the organization, keyed by email
    pub async fn org_member_ids(&self) -> Result<HashMap<String, String>> {
        let members: Option<Vec<Member>> = self.get_optional(self.ws(&["grants", "members"])?).await?;
        Ok(members
            .unwrap_or_default()
            .into_iter()
            .map(|member| (member.email, member.id))
            .collect())
    }

    pub async fn add_role_members(
        &self,
        role: &str,
        admin_ids: &[String],
        member_ids: &[String],
    ) -> Result<()> {
        if admin_ids.is_empty() && member_ids.is_empty() {
            return Ok(());
        }
        let changes = admin_ids
            .iter()
            .map(|id| (id, true))
            .chain(member_ids.iter().map(|id| (id, false)))
            .map(|(id, with_admin)| RoleMemberChange {
                member_id: id,
                with_admin,
            })
            .collect::<Vec<_>>();

        tracing::info!("adding {} members to role {role}", changes.len());
        self.execute(
            Method::PUT,
            self.ws(&["grants", "roles", role, "members"])?,
            Some(&changes),
        )
        .await
    }

    pub async fn remove_role_members(&self, role: &str, member_ids: &[String]) -> Result<()> {
        if member_ids.is_empty() {
            return Ok(());
        }
        tracing::info!("removing {} members from role {role}", member_ids.len());
        self.execute(
            Method::DELETE,
            self.ws(&["grants", "roles", role, "members"])?,
            Some(member_ids),
        )
        .await
    }
}
