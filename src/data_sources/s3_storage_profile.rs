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
use tf_provider::value::{ValueEmpty, ValueString};
use tf_provider::{map, DataSource, Diagnostics};

use crate::client::models::LookupBy;
use crate::provider::ClientHandle;
use crate::resources::{computed_string, required_string};
use crate::utils::{optional, require, ReportError};

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct S3StorageProfileDataSourceState<'a> {
    #[serde(borrow = "'a")]
    pub id: ValueString<'a>,
    pub name: ValueString<'a>,
    pub organization_id: ValueString<'a>,
    pub account_id: ValueString<'a>,
    pub region: ValueString<'a>,
    pub role_arn: ValueString<'a>,
    pub external_id: ValueString<'a>,
}

/// Storage profile looked up by bucket name
#[derive(Debug, Clone)]
pub struct S3StorageProfileDataSource {
    client: ClientHandle,
}

impl S3StorageProfileDataSource {
    pub fn new(client: ClientHandle) -> Self {
        Self { client }
    }
}

#[async_trait]
impl DataSource for S3StorageProfileDataSource {
    type State<'a> = S3StorageProfileDataSourceState<'a>;
    type ProviderMetaState<'a> = ValueEmpty;

    fn schema(&self, _diags: &mut Diagnostics) -> Option<Schema> {
        Some(Schema {
            version: 1,
            block: Block {
                version: 1,
                description: Description::plain("S3 storage profile data source"),
                attributes: map! {
                    "id" => computed_string("Storage profile ID"),
                    "name" => required_string("Storage profile bucket name"),
                    "organization_id" => computed_string("Tabular Organization ID"),
                    "account_id" => computed_string("Storage profile AWS Account ID"),
                    "region" => computed_string("Storage profile region"),
                    "role_arn" => computed_string("Storage profile AWS Role Arn"),
                    "external_id" => computed_string("External ID")
                },
                ..Default::default()
            },
        })
    }

    async fn read<'a>(
        &self,
        diags: &mut Diagnostics,
        config: Self::State<'a>,
        _provider_meta_state: Self::ProviderMetaState<'a>,
    ) -> Option<Self::State<'a>> {
        let client = self.client.get(diags).await?;
        let bucket = require(diags, &config.name, "name")?;

        let Some(profile) = client
            .get_storage_profile(bucket, LookupBy::Name)
            .await
            .or_report(diags, "Error reading storage profile")?
        else {
            diags.root_error(
                "S3 Storage Profile not found",
                format!("Could not find storage profile for bucket {bucket}"),
            );
            return None;
        };

        Some(S3StorageProfileDataSourceState {
            id: ValueString::from(profile.id),
            name: ValueString::from(bucket.to_owned()),
            organization_id: optional(profile.organization_id),
            account_id: optional(profile.account_id),
            region: optional(profile.region),
            role_arn: optional(profile.role_arn),
            external_id: optional(profile.external_id),
        })
    }
}
