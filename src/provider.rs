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
use std::sync::Arc;

use async_trait::async_trait;
use tf_provider::schema::Schema;
use tf_provider::value::ValueEmpty;
use tf_provider::{map, Diagnostics, DynamicDataSource, DynamicResource, Provider};
use tokio::sync::RwLock;

use crate::client::Client;
use crate::config::ProviderConfig;
use crate::data_sources::{
    AwsIamPolicyDataSource, ComputeConfigDataSource, RoleDataSource, S3StorageProfileDataSource,
    WarehouseDataSource,
};
use crate::resources::{
    AwsRoleMappingResource, DatabaseResource, RoleDatabaseGrantsResource, RoleMembershipResource,
    RoleRelationshipResource, RoleResource, RoleWarehouseGrantsResource,
    S3StorageProfileResource, ServiceAccountResource, WarehouseResource,
};
use crate::utils::ReportError;

/// Client shared between the provider and every resource and data source.
///
/// Resources are instantiated before the provider is configured,
/// so the client is only filled in by [`Provider::configure`].
#[derive(Debug, Clone, Default)]
pub struct ClientHandle(Arc<RwLock<Option<Arc<Client>>>>);

impl ClientHandle {
    pub async fn set(&self, client: Client) {
        *self.0.write().await = Some(Arc::new(client));
    }

    pub async fn get(&self, diags: &mut Diagnostics) -> Option<Arc<Client>> {
        let client = self.0.read().await.clone();
        if client.is_none() {
            diags.root_error(
                "Provider not configured",
                "The tabular provider must be configured before its resources and data sources can be used",
            );
        }
        client
    }
}

impl From<Client> for ClientHandle {
    fn from(client: Client) -> Self {
        Self(Arc::new(RwLock::new(Some(Arc::new(client)))))
    }
}

#[derive(Debug, Default, Clone)]
pub struct TabularProvider {
    client: ClientHandle,
}

impl TabularProvider {
    pub fn client(&self) -> &ClientHandle {
        &self.client
    }
}

#[async_trait]
impl Provider for TabularProvider {
    type Config<'a> = ProviderConfig<'a>;
    type MetaState<'a> = ValueEmpty;

    fn schema(&self, _diags: &mut Diagnostics) -> Option<Schema> {
        Some(ProviderConfig::schema())
    }

    async fn validate<'a>(&self, _diags: &mut Diagnostics, _config: Self::Config<'a>) -> Option<()> {
        Some(())
    }

    async fn configure<'a>(
        &self,
        diags: &mut Diagnostics,
        terraform_version: String,
        config: Self::Config<'a>,
    ) -> Option<()> {
        tracing::info!("configuring tabular provider for terraform {terraform_version}");
        let settings = config.settings(diags, |key| std::env::var(key).ok())?;
        let client = Client::new(settings).or_report(diags, "Failed setting up Tabular Client")?;
        tracing::debug!("using {client:?}");
        self.client.set(client).await;
        Some(())
    }

    fn get_resources(
        &self,
        _diags: &mut Diagnostics,
    ) -> Option<HashMap<String, Box<dyn DynamicResource>>> {
        let client = &self.client;
        Some(map! {
            "role" => RoleResource::new(client.clone()),
            "warehouse" => WarehouseResource::new(client.clone()),
            "database" => DatabaseResource::new(client.clone()),
            "role_database_grants" => RoleDatabaseGrantsResource::new(client.clone()),
            "role_warehouse_grants" => RoleWarehouseGrantsResource::new(client.clone()),
            "s3_storage_profile" => S3StorageProfileResource::new(client.clone()),
            "service_account" => ServiceAccountResource::new(client.clone()),
            "aws_role_mapping" => AwsRoleMappingResource::new(client.clone()),
            "role_relationship" => RoleRelationshipResource::new(client.clone()),
            "role_membership" => RoleMembershipResource::new(client.clone()),
        })
    }

    fn get_data_sources(
        &self,
        _diags: &mut Diagnostics,
    ) -> Option<HashMap<String, Box<dyn DynamicDataSource>>> {
        let client = &self.client;
        Some(map! {
            "role" => RoleDataSource::new(client.clone()),
            "warehouse" => WarehouseDataSource::new(client.clone()),
            "s3_storage_profile" => S3StorageProfileDataSource::new(client.clone()),
            "aws_iam_policy" => AwsIamPolicyDataSource::new(client.clone()),
            "compute_config" => ComputeConfigDataSource::new(client.clone()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn unconfigured_client_is_reported() {
        let provider = TabularProvider::default();
        let mut diags = Diagnostics::default();
        assert!(provider.client().get(&mut diags).await.is_none());
        assert_eq!(diags.errors.len(), 1);
        assert_eq!(diags.errors[0].summary, "Provider not configured");
    }

    #[test]
    fn registers_every_resource_and_data_source() {
        let provider = TabularProvider::default();
        let mut diags = Diagnostics::default();
        let resources = provider.get_resources(&mut diags).unwrap();
        let data_sources = provider.get_data_sources(&mut diags).unwrap();
        assert_eq!(resources.len(), 10);
        assert_eq!(data_sources.len(), 5);
        assert!(resources.contains_key("role_database_grants"));
        assert!(data_sources.contains_key("aws_iam_policy"));
        for (name, resource) in &resources {
            assert!(resource.schema(&mut diags).is_some(), "{name}");
        }
        for (name, data_source) in &data_sources {
            assert!(data_source.schema(&mut diags).is_some(), "{name}");
        }
        assert!(diags.errors.is_empty());
    }
}
