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

use super::models::{
    CreateIamRoleMapping, CreateServiceAccount, CreateStorageProfile, CreatedCredential,
    Credential, LookupBy, StorageProfile,
};
use super::{Client, Result};

impl Client {
    pub async fn create_storage_profile(
        &self,
        region: &str,
        bucket: &str,
        role_arn: &str,
    ) -> Result<StorageProfile> {
        tracing::info!("creating storage profile for bucket {bucket}");
        self.post(
            self.org(&["storage-profiles"])?,
            &CreateStorageProfile {
                region,
                bucket,
                role_arn,
            },
        )
        .await
    }

    pub async fn get_storage_profile(&self, key: &str, by: LookupBy) -> Result<Option<StorageProfile>> {
        let mut url = self.org(&["storage-profiles", key])?;
        url.query_pairs_mut().append_pair("type", by.as_str());
        self.get_optional(url).await
    }

    pub async fn delete_storage_profile(&self, id: &str) -> Result<()> {
        tracing::info!("deleting storage profile {id}");
        self.delete(self.org(&["storage-profiles", id])?).await
    }

    pub async fn create_service_account(&self, name: &str, role_id: &str) -> Result<CreatedCredential> {
        tracing::info!("creating service account {name}");
        self.post(
            self.org(&["service-accounts"])?,
            &CreateServiceAccount { name, role_id },
        )
        .await
    }

    pub async fn create_iam_role_mapping(
        &self,
        name: &str,
        aws_role_arn: &str,
        role_id: &str,
    ) -> Result<CreatedCredential> {
        tracing::info!("mapping {aws_role_arn} to role {role_id}");
        self.post(
            self.org(&["iam-role-mappings"])?,
            &CreateIamRoleMapping {
                name,
                aws_role_arn,
                role_id,
            },
        )
        .await
    }

    pub async fn get_credential(&self, key: &str) -> Result<Option<Credential>> {
        self.get_optional(self.org(&["credentials", key])?).await
    }

    pub async fn delete_credential(&self, key: &str) -> Result<()> {
        tracing::info!("deleting credential {key}");
        self.delete(self.org(&["credentials", key])?).await
    }
}
