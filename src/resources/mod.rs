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

//! Managed resources
//!
//! Resource states are wrapped in [`Value`] so that a read can answer [`Value::Null`]
//! when the remote object disappeared, which tells Terraform to drop it from the state.

mod aws_role_mapping;
mod database;
mod grants;
mod legacy;
mod role;
mod role_membership;
mod role_relationship;
mod s3_storage_profile;
mod service_account;
mod warehouse;

pub use aws_role_mapping::{AwsRoleMappingResource, AwsRoleMappingState};
pub use database::{DatabaseResource, DatabaseState};
pub use grants::{
    RoleDatabaseGrantsResource, RoleDatabaseGrantsState, RoleWarehouseGrantsResource,
    RoleWarehouseGrantsState,
};
pub use role::{RoleResource, RoleState};
pub use role_membership::{RoleMembershipResource, RoleMembershipState};
pub use role_relationship::{RoleRelationshipResource, RoleRelationshipState};
pub use s3_storage_profile::{S3StorageProfileResource, S3StorageProfileState};
pub use service_account::{ServiceAccountResource, ServiceAccountState};
pub use warehouse::{WarehouseResource, WarehouseState};

use tf_provider::schema::{Attribute, AttributeConstraint, AttributeType, Description};
use tf_provider::value::Value;
use tf_provider::{AttributePath, Diagnostics};

/// Unwrap a state that must be present
pub(crate) fn present<T>(diags: &mut Diagnostics, state: Value<T>) -> Option<T> {
    match state {
        Value::Value(state) => Some(state),
        Value::Null => {
            diags.root_error_short("Resource state is null");
            None
        }
        Value::Unknown => {
            diags.root_error_short("Resource state is unknown");
            None
        }
    }
}

/// Paths of the attributes flagged as changed
pub(crate) fn changed(attributes: &[(&'static str, bool)]) -> Vec<AttributePath> {
    attributes
        .iter()
        .filter(|(_, changed)| *changed)
        .map(|(name, _)| AttributePath::new(*name))
        .collect()
}

pub(crate) fn computed_string(description: &str) -> Attribute {
    Attribute {
        attr_type: AttributeType::String,
        description: Description::plain(description),
        constraint: AttributeConstraint::Computed,
        ..Default::default()
    }
}

pub(crate) fn required_string(description: &str) -> Attribute {
    Attribute {
        attr_type: AttributeType::String,
        description: Description::plain(description),
        constraint: AttributeConstraint::Required,
        ..Default::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn changed_paths() {
        let paths = changed(&[("name", true), ("id", false), ("region", true)]);
        assert_eq!(
            paths,
            vec![AttributePath::new("name"), AttributePath::new("region")]
        );
    }

    #[test]
    fn present_state() {
        let mut diags = Diagnostics::default();
        assert_eq!(present(&mut diags, Value::Value(3)), Some(3));
        assert_eq!(present::<i32>(&mut diags, Value::Null), None);
        assert_eq!(present::<i32>(&mut diags, Value::Unknown), None);
        assert_eq!(diags.errors.len(), 2);
    }
}
