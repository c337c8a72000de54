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

//! Resolution of name based identifiers.
//!
//! Earlier releases keyed databases by name and grants by role name.
//! Importing with those identifiers resolves them to the ids used today.

use tf_provider::Diagnostics;

use crate::client::models::{Database, LookupBy};
use crate::client::Client;
use crate::utils::{is_uuid, ReportError};

/// Fetch a database from either its id or its name
pub(crate) async fn find_database(
    client: &Client,
    diags: &mut Diagnostics,
    warehouse_id: &str,
    key: &str,
) -> Option<Database> {
    let by = if is_uuid(key) {
        LookupBy::Id
    } else {
        tracing::info!("resolving database {key} by name");
        LookupBy::Name
    };

    let database = client
        .get_database(warehouse_id, key, by)
        .await
        .or_report(diags, "Error reading database")?;
    if database.is_none() {
        diags.root_error(
            "Database not found",
            format!("Could not find database {key} in warehouse {warehouse_id}"),
        );
    }
    database
}

pub(crate) async fn find_role_id(
    client: &Client,
    diags: &mut Diagnostics,
    role_name: &str,
) -> Option<String> {
    let role = client
        .get_role(role_name)
        .await
        .or_report(diags, "Error reading role")?;
    match role {
        Some(role) => Some(role.id),
        None => {
            diags.root_error("Role not found", format!("Could not find role {role_name}"));
            None
        }
    }
}
