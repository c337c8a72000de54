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


//! Read-only data sources

mod aws_iam_policy;
mod compute_config;
mod role;
mod s3_storage_profile;
mod warehouse;

pub use aws_iam_policy::{AwsIamPolicyDataSource, AwsIamPolicyState};
pub use compute_config::{ComputeConfigDataSource, ComputeConfigState};
pub use role::{RoleDataSource, RoleDataSourceState};
pub use s3_storage_profile::{S3StorageProfileDataSource, S3StorageProfileDataSourceState};
pub use warehouse::{WarehouseDataSource, WarehouseDataSourceState};

use tf_provider::schema::{Attribute, AttributeConstraint, AttributeType, Description};
use tf_provider::value::ValueString;
use tf_provider::Diagnostics;

use crate::client::models::Warehouse;
use crate::client::Client;
use crate::utils::ReportError;

pub(crate) fn optional_computed_string(description: &str) -> Attribute {
    Attribute {
        attr_type: AttributeType::String,
        description: Description::plain(description),
        constraint: AttributeConstraint::OptionalComputed,
        ..Default::default()
    }
}

/// Check that exactly one of the two identifiers is given
pub(crate) fn exactly_one(
    diags: &mut Diagnostics,
    (first, a): (&str, &ValueString<'_>),
    (second, b): (&str, &ValueString<'_>),
) -> Option<()> {
    if a.is_null() == b.is_null() {
        diags.root_error(
            "Invalid Configuration",
            format!("Exactly one of `{first}` or `{second}` must be specified"),
        );
        None
    } else {
        Some(())
    }
}

/// Find a warehouse from its id, or from its name when no id is given
pub(crate) async fn resolve_warehouse(
    client: &Client,
    diags: &mut Diagnostics,
    id: Option<&str>,
    name: Option<&str>,
) -> Option<Warehouse> {
    if let Some(id) = id {
        let warehouse = client
            .get_warehouse(id)
            .await
            .or_report(diags, "Error reading warehouse")?;
        if warehouse.is_none() {
            diags.root_error("Warehouse not found", format!("Could not find warehouse {id}"));
        }
        return warehouse;
    }

    let Some(name) = name else {
        diags.root_error_short("Warehouse id or name is required");
        return None;
    };
    let warehouses = client
        .list_warehouses()
        .await
        .or_report(diags, "Failed fetching warehouses")?;
    let Some(summary) = warehouses.into_iter().find(|warehouse| warehouse.name == name) else {
        diags.root_error(
            "Warehouse not found",
            format!("Could not find warehouse with name {name}"),
        );
        return None;
    };

    let details = client
        .get_warehouse(&summary.id)
        .await
        .or_report(diags, "Error reading warehouse")?
        .unwrap_or_default();
    Some(Warehouse {
        id: summary.id,
        name: Some(summary.name),
        organization_id: details.organization_id,
        storage_profile: details.storage_profile,
        region: details.region.or(Some(summary.region)),
    })
}
