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
    CreateDatabase, CreateWarehouse, Database, LookupBy, Warehouse, WarehouseSummary,
};
use super::{Client, Result};

impl Client {
    /// Workspace listing of every warehouse visible to the credential
    pub async fn list_warehouses(&self) -> Result<Vec<WarehouseSummary>> {
        self.get(self.ws(&["warehouses"])?).await
    }

    pub async fn get_warehouse(&self, id: &str) -> Result<Option<Warehouse>> {
        self.get_optional(self.org(&["warehouses", id])?).await
    }

    pub async fn create_warehouse(&self, name: &str, storage_profile_id: &str) -> Result<Warehouse> {
        tracing::info!("creating warehouse {name}");
        self.post(
            self.org(&["warehouses"])?,
            &CreateWarehouse {
                name,
                storage_profile_id,
            },
        )
        .await
    }

    pub async fn delete_warehouse(&self, id: &str) -> Result<()> {
        tracing::info!("deleting warehouse {id}");
        self.delete(self.org(&["warehouses", id])?).await
    }

    pub async fn get_database(
        &self,
        warehouse_id: &str,
        key: &str,
        by: LookupBy,
    ) -> Result<Option<Database>> {
        let mut url = self.org(&["warehouses", warehouse_id, "databases", key])?;
        url.query_pairs_mut().append_pair("type", by.as_str());
        self.get_optional(url).await
    }

    pub async fn create_database(&self, warehouse_id: &str, name: &str) -> Result<Database> {
        tracing::info!("creating database {name} in warehouse {warehouse_id}");
        self.post(
            self.org(&["warehouses", warehouse_id, "databases"])?,
            &CreateDatabase { name },
        )
        .await
    }

    pub async fn delete_database(&self, warehouse_id: &str, database_id: &str) -> Result<()> {
        tracing::info!("deleting database {database_id} from warehouse {warehouse_id}");
        self.delete(self.org(&["warehouses", warehouse_id, "databases", database_id])?)
            .await
    }
}
