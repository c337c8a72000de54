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

use std::collections::{BTreeSet, HashMap};

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Role {
    #[serde(default)]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub children: Vec<Role>,
    #[serde(default)]
    pub members: Vec<Member>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Member {
    pub id: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub with_admin: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RoleMemberChange<'a> {
    pub member_id: &'a str,
    pub with_admin: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RoleNameRequest<'a> {
    pub role_name: &'a str,
}

/// Entry of the workspace warehouse listing
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WarehouseSummary {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub region: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Warehouse {
    pub id: String,
    pub name: Option<String>,
    pub organization_id: Option<String>,
    pub storage_profile: Option<String>,
    pub region: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CreateWarehouse<'a> {
    pub name: &'a str,
    pub storage_profile_id: &'a str,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Database {
    pub id: String,
    pub name: String,
    pub warehouse_id: Option<String>,
    #[serde(default)]
    pub properties: HashMap<String, String>,
}

impl Database {
    pub fn location(&self) -> Option<&str> {
        self.properties.get("location").map(String::as_str)
    }
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct CreateDatabase<'a> {
    pub name: &'a str,
}

/// How a path key should be interpreted by lookup endpoints
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookupBy {
    Id,
    Name,
}

impl LookupBy {
    pub fn as_str(self) -> &'static str {
        match self {
            LookupBy::Id => "id",
            LookupBy::Name => "name",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Authorization {
    pub privilege: String,
    #[serde(default)]
    pub with_grant: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct Authorizations {
    #[serde(default)]
    pub authorizations: Vec<Authorization>,
}

/// Privileges held by a role on a warehouse or database, split by grant option
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Grants {
    pub privileges: BTreeSet<String>,
    pub privileges_with_grant: BTreeSet<String>,
}

impl FromIterator<Authorization> for Grants {
    fn from_iter<I: IntoIterator<Item = Authorization>>(iter: I) -> Self {
        let mut grants = Grants::default();
        for auth in iter {
            if auth.with_grant {
                grants.privileges_with_grant.insert(auth.privilege);
            } else {
                grants.privileges.insert(auth.privilege);
            }
        }
        grants
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GrantChange {
    pub role_id: String,
    pub privilege: String,
    pub with_grant: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StorageProfile {
    pub id: String,
    pub organization_id: Option<String>,
    pub account_id: Option<String>,
    pub region: Option<String>,
    pub bucket: Option<String>,
    pub role_arn: Option<String>,
    pub external_id: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CreateStorageProfile<'a> {
    pub region: &'a str,
    pub bucket: &'a str,
    pub role_arn: &'a str,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CreateServiceAccount<'a> {
    pub name: &'a str,
    pub role_id: &'a str,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CreateIamRoleMapping<'a> {
    pub name: &'a str,
    pub aws_role_arn: &'a str,
    pub role_id: &'a str,
}

/// Freshly issued credential; the secret is only returned once
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedCredential {
    pub credential_id: String,
    pub credential_secret: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Credential {
    pub key: String,
    pub name: Option<String>,
    pub role_id: Option<String>,
    pub encoded_secret: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grants_split_by_grant_option() {
        let auths: Authorizations = serde_json::from_str(
            r#"{"authorizations": [
                {"privilege": "LIST_TABLES", "withGrant": false},
                {"privilege": "CREATE_TABLE", "withGrant": true},
                {"privilege": "MODIFY_DATABASE"}
            ]}"#,
        )
        .unwrap();
        let grants: Grants = auths.authorizations.into_iter().collect();
        assert_eq!(
            grants.privileges.into_iter().collect::<Vec<_>>(),
            ["LIST_TABLES", "MODIFY_DATABASE"]
        );
        assert_eq!(
            grants.privileges_with_grant.into_iter().collect::<Vec<_>>(),
            ["CREATE_TABLE"]
        );
    }

    #[test]
    fn database_location() {
        let db: Database = serde_json::from_str(
            r#"{"id": "d1", "name": "raw", "properties": {"location": "s3://bucket/raw"}}"#,
        )
        .unwrap();
        assert_eq!(db.location(), Some("s3://bucket/raw"));
        assert_eq!(Database::default().location(), None);
    }

    #[test]
    fn role_defaults_missing_lists() {
        let role: Role = serde_json::from_str(r#"{"id": "r1", "name": "admin"}"#).unwrap();
        assert!(role.children.is_empty());
        assert!(role.members.is_empty());
    }
}
