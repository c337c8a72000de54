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

//! Spark settings for reaching a warehouse through the IAM gateway

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value as Json};
use tf_provider::schema::{Block, Description, Schema};
use tf_provider::value::{ValueEmpty, ValueString};
use tf_provider::{map, DataSource, Diagnostics};

use crate::provider::ClientHandle;
use crate::resources::computed_string;
use crate::utils::optional;

use super::{exactly_one, optional_computed_string, resolve_warehouse};

pub fn spark_config(warehouse: &str, region: &str) -> Json {
    let catalog = format!("spark.sql.catalog.{warehouse}");
    json!([
        {
            "Classification": "iceberg-defaults",
            "Properties": {
                "iceberg.enabled": "true"
            }
        },
        {
            "Classification": "spark-defaults",
            "Properties": {
                catalog.clone(): "org.apache.iceberg.spark.SparkCatalog",
                format!("{catalog}.catalog-impl"): "org.apache.iceberg.rest.RESTCatalog",
                format!("{catalog}.rest.sigv4-enabled"): "true",
                format!("{catalog}.uri"): format!("https://iam-gw.{region}.tabular.io/ws/"),
                format!("{catalog}.warehouse"): warehouse,
                "spark.sql.defaultCatalog": warehouse,
                "spark.sql.extensions": "org.apache.iceberg.spark.extensions.IcebergSparkSessionExtensions"
            }
        }
    ])
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct ComputeConfigState<'a> {
    #[serde(borrow = "'a")]
    pub id: ValueString<'a>,
    pub warehouse_id: ValueString<'a>,
    pub warehouse_name: ValueString<'a>,
    pub spark_config: ValueString<'a>,
}

#[derive(Debug, Clone)]
pub struct ComputeConfigDataSource {
    client: ClientHandle,
}

impl ComputeConfigDataSource {
    pub fn new(client: ClientHandle) -> Self {
        Self { client }
    }
}

#[async_trait]
impl DataSource for ComputeConfigDataSource {
    type State<'a> = ComputeConfigState<'a>;
    type ProviderMetaState<'a> = ValueEmpty;

    fn schema(&self, _diags: &mut Diagnostics) -> Option<Schema> {
        Some(Schema {
            version: 1,
            block: Block {
                version: 1,
                description: Description::plain("Compute configuration of a warehouse"),
                attributes: map! {
                    "id" => computed_string("Warehouse ID"),
                    "warehouse_id" => optional_computed_string("Warehouse ID"),
                    "warehouse_name" => optional_computed_string("Warehouse Name"),
                    "spark_config" => computed_string("Spark Config that can be used to configure compute")
                },
                ..Default::default()
            },
        })
    }

    async fn validate<'a>(&self, diags: &mut Diagnostics, config: Self::State<'a>) -> Option<()> {
        if config.warehouse_id.is_unknown() || config.warehouse_name.is_unknown() {
            return Some(());
        }
        exactly_one(
            diags,
            ("warehouse_id", &config.warehouse_id),
            ("warehouse_name", &config.warehouse_name),
        )
    }

    async fn read<'a>(
        &self,
        diags: &mut Diagnostics,
        config: Self::State<'a>,
        _provider_meta_state: Self::ProviderMetaState<'a>,
    ) -> Option<Self::State<'a>> {
        let client = self.client.get(diags).await?;
        let warehouse = resolve_warehouse(
            &client,
            diags,
            config.warehouse_id.as_deref_option(),
            config.warehouse_name.as_deref_option(),
        )
        .await?;

        let name = warehouse.name.clone().unwrap_or_default();
        let region = warehouse.region.clone().unwrap_or_default();
        let spark_config = match serde_json::to_string_pretty(&spark_config(&name, &region)) {
            Ok(config) => config,
            Err(err) => {
                diags.root_error("Failed to render spark config", err.to_string());
                return None;
            }
        };

        Some(ComputeConfigState {
            id: ValueString::from(warehouse.id.clone()),
            warehouse_id: ValueString::from(warehouse.id),
            warehouse_name: optional(warehouse.name),
            spark_config: ValueString::from(spark_config),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spark_config_is_named_after_the_warehouse() {
        let config = spark_config("lakehouse", "us-west-2");
        assert_eq!(config[0]["Properties"]["iceberg.enabled"], "true");

        let spark = &config[1]["Properties"];
        assert_eq!(config[1]["Classification"], "spark-defaults");
        assert_eq!(
            spark["spark.sql.catalog.lakehouse.uri"],
            "https://iam-gw.us-west-2.tabular.io/ws/"
        );
        assert_eq!(spark["spark.sql.catalog.lakehouse.warehouse"], "lakehouse");
        assert_eq!(spark["spark.sql.defaultCatalog"], "lakehouse");
        assert_eq!(
            spark["spark.sql.catalog.lakehouse"],
            "org.apache.iceberg.spark.SparkCatalog"
        );
    }
}
