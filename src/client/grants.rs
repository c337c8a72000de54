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

use std::fmt::Display;

use reqwest::Method;

use super::models::{Authorizations, GrantChange, Grants};
use super::{Client, Result};

/// Object on which privileges are granted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GrantTarget<'a> {
    Warehouse {
        warehouse_id: &'a str,
    },
    Database {
        warehouse_id: &'a str,
        database_id: &'a str,
    },
}

impl<'a> GrantTarget<'a> {
    fn base(&self) -> Vec<&'a str> {
        match *self {
            GrantTarget::Warehouse { warehouse_id } => vec!["warehouses", warehouse_id],
            GrantTarget::Database {
                warehouse_id,
                database_id,
            } => vec!["warehouses", warehouse_id, "databases", database_id],
        }
    }
}

impl Display for GrantTarget<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GrantTarget::Warehouse { warehouse_id } => write!(f, "warehouse {warehouse_id}"),
            GrantTarget::Database {
                warehouse_id,
                database_id,
            } => write!(f, "database {warehouse_id}/{database_id}"),
        }
    }
}

impl Client {
    /// Privileges currently held by `role_id` on `target`
    pub async fn get_grants(&self, target: GrantTarget<'_>, role_id: &str) -> Result<Grants> {
        let mut segments = target.base();
        segments.extend(["roles", role_id, "grants"]);
        let auths: Option<Authorizations> = self.get_optional(self.org(&segments)?).await?;
        Ok(auths
            .unwrap_or_default()
            .authorizations
            .into_iter()
            .collect())
    }

    pub async fn grant(&self, target: GrantTarget<'_>, changes: &[GrantChange]) -> Result<()> {
        self.change_grants(Method::POST, target, changes).await
    }

    pub async fn revoke(&self, target: GrantTarget<'_>, changes: &[GrantChange]) -> Result<()> {
        self.change_grants(Method::DELETE, target, changes).await
    }

    async fn change_grants(
        &self,
        method: Method,
        target: GrantTarget<'_>,
        changes: &[GrantChange],
    ) -> Result<()> {
        if changes.is_empty() {
            return Ok(());
        }
        tracing::info!("{method} {} grants on {target}", changes.len());
        let mut segments = target.base();
        segments.push("grants");
        self.execute(method, self.org(&segments)?, Some(changes))
            .await
    }
}

/// Build the request body for a batch of privileges
pub fn grant_changes<'p, I>(role_id: &str, privileges: I, with_grant: bool) -> Vec<GrantChange>
where
    I: IntoIterator<Item = &'p String>,
{
    privileges
        .into_iter()
        .map(|privilege| GrantChange {
            role_id: role_id.to_owned(),
            privilege: privilege.clone(),
            with_grant,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grant_target_paths() {
        let wh = GrantTarget::Warehouse { warehouse_id: "w" };
        let db = GrantTarget::Database {
            warehouse_id: "w",
            database_id: "d",
        };
        assert_eq!(wh.base(), ["warehouses", "w"]);
        assert_eq!(db.base(), ["warehouses", "w", "databases", "d"]);
        assert_eq!(db.to_string(), "database w/d");
    }

    #[test]
    fn builds_changes() {
        let privileges = vec!["LIST_TABLES".to_string(), "CREATE_TABLE".to_string()];
        let changes = grant_changes("r1", &privileges, true);
        assert_eq!(changes.len(), 2);
        assert!(changes.iter().all(|c| c.role_id == "r1" && c.with_grant));
        assert_eq!(changes[1].privilege, "CREATE_TABLE");
    }
}
