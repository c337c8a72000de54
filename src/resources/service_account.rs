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
use tf_provider::schema::{Attribute, AttributeConstraint, AttributeType, Block, Description, Schema};
use tf_provider::value::{Value, ValueEmpty, ValueString};
use tf_provider::{map, AttributePath, Diagnostics, Resource};

use crate::client::models::Credential;
use crate::provider::ClientHandle;
use crate::utils::{optional, require, ReportError};

use super::{changed, computed_string, present, required_string};

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct ServiceAccountState<'a> {
    #[serde(borrow = "'a")]
    pub id: ValueString<'a>,
    pub name: ValueString<'a>,
    pub role_id: ValueString<'a>,
    pub credential_key: ValueString<'a>,
    pub credential_secret: ValueString<'a>,
}

impl ServiceAccountState<'_> {
    fn refresh(&mut self, credential: Credential) {
        self.id = ValueString::from(credential.key.clone());
        self.credential_key = ValueString::from(credential.key);
        if credential.name.is_some() {
            self.name = optional(credential.name);
        }
        if credential.role_id.is_some() {
            self.role_id = optional(credential.role_id);
        }
        if credential.encoded_secret.is_some() {
            self.credential_secret = optional(credential.encoded_secret);
        }
    }
}

/// Service account authenticating with a client credential
#[derive(Debug, Clone)]
pub struct ServiceAccountResource {
    client: ClientHandle,
}

impl ServiceAccountResource {
    pub fn new(client: ClientHandle) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Resource for ServiceAccountResource {
    type State<'a> = Value<ServiceAccountState<'a>>;
    type PrivateState<'a> = ValueEmpty;
    type ProviderMetaState<'a> = ValueEmpty;

    fn schema(&self, _diags: &mut Diagnostics) -> Option<Schema> {
        Some(Schema {
            version: 1,
            block: Block {
                version: 1,
                description: Description::plain("A Tabular service account"),
                attributes: map! {
                    "id" => computed_string("Service account ID (the credential key)"),
                    "name" => required_string("Service account name"),
                    "role_id" => required_string("Role assumed by the service account"),
                    "credential_key" => computed_string("Client ID of the credential"),
                    "credential_secret" => Attribute {
                        attr_type: AttributeType::String,
                        description: Description::plain("Client secret of the credential"),
                        constraint: AttributeConstraint::Computed,
                        sensitive: true,
                        ..Default::default()
                    }
                },
                ..Default::default()
            },
        })
    }

    async fn validate<'a>(&self, _diags: &mut Diagnostics, _config: Self::State<'a>) -> Option<()> {
        Some(())
    }

    async fn read<'a>(
        &self,
        diags: &mut Diagnostics,
        state: Self::State<'a>,
        private_state: Self::PrivateState<'a>,
        _provider_meta_state: Self::ProviderMetaState<'a>,
    ) -> Option<(Self::State<'a>, Self::PrivateState<'a>)> {
        let Value::Value(mut state) = state else {
            return Some((state, private_state));
        };
        let client = self.client.get(diags).await?;
        let id = require(diags, &state.id, "id")?.to_owned();

        let Some(credential) = client
            .get_credential(&id)
            .await
            .or_report(diags, "Error reading service account")?
        else {
            tracing::info!("service account {id} no longer exists");
            return Some((Value::Null, private_state));
        };

        state.refresh(credential);
        Some((Value::Value(state), private_state))
    }

    async fn plan_create<'a>(
        &self,
        diags: &mut Diagnostics,
        proposed_state: Self::State<'a>,
        _config_state: Self::State<'a>,
        _provider_meta_state: Self::ProviderMetaState<'a>,
    ) -> Option<(Self::State<'a>, Self::PrivateState<'a>)> {
        let mut state = present(diags, proposed_state)?;
        state.id = ValueString::Unknown;
        state.credential_key = ValueString::Unknown;
        state.credential_secret = ValueString::Unknown;
        Some((Value::Value(state), Default::default()))
    }

    async fn plan_update<'a>(
        &self,
        diags: &mut Diagnostics,
        prior_state: Self::State<'a>,
        proposed_state: Self::State<'a>,
        _config_state: Self::State<'a>,
        prior_private_state: Self::PrivateState<'a>,
        _provider_meta_state: Self::ProviderMetaState<'a>,
    ) -> Option<(Self::State<'a>, Self::PrivateState<'a>, Vec<AttributePath>)> {
        let prior = present(diags, prior_state)?;
        let mut state = present(diags, proposed_state)?;

        let replace = changed(&[
            ("name", prior.name != state.name),
            ("role_id", prior.role_id != state.role_id),
        ]);
        if replace.is_empty() {
            state.id = prior.id;
            state.credential_key = prior.credential_key;
            state.credential_secret = prior.credential_secret;
        } else {
            state.id = ValueString::Unknown;
            state.credential_key = ValueString::Unknown;
            state.credential_secret = ValueString::Unknown;
        }
        Some((Value::Value(state), prior_private_state, replace))
    }

    async fn plan_destroy<'a>(
        &self,
        _diags: &mut Diagnostics,
        _prior_state: Self::State<'a>,
        prior_private_state: Self::PrivateState<'a>,
        _provider_meta_state: Self::ProviderMetaState<'a>,
    ) -> Option<Self::PrivateState<'a>> {
        Some(prior_private_state)
    }

    async fn create<'a>(
        &self,
        diags: &mut Diagnostics,
        planned_state: Self::State<'a>,
        _config_state: Self::State<'a>,
        planned_private_state: Self::PrivateState<'a>,
        _provider_meta_state: Self::ProviderMetaState<'a>,
    ) -> Option<(Self::State<'a>, Self::PrivateState<'a>)> {
        let mut state = present(diags, planned_state)?;
        let client = self.client.get(diags).await?;
        let name = require(diags, &state.name, "name")?;
        let role_id = require(diags, &state.role_id, "role_id")?;

        let created = client
            .create_service_account(name, role_id)
            .await
            .or_report(diags, "Error creating service account")?;

        state.id = ValueString::from(created.credential_id.clone());
        state.credential_key = ValueString::from(created.credential_id);
        state.credential_secret = optional(created.credential_secret);
        Some((Value::Value(state), planned_private_state))
    }

    async fn update<'a>(
        &self,
        diags: &mut Diagnostics,
        _prior_state: Self::State<'a>,
        planned_state: Self::State<'a>,
        _config_state: Self::State<'a>,
        planned_private_state: Self::PrivateState<'a>,
        _provider_meta_state: Self::ProviderMetaState<'a>,
    ) -> Option<(Self::State<'a>, Self::PrivateState<'a>)> {
        let state = present(diags, planned_state)?;
        Some((Value::Value(state), planned_private_state))
    }

    async fn destroy<'a>(
        &self,
        diags: &mut Diagnostics,
        prior_state: Self::State<'a>,
        _planned_private_state: Self::PrivateState<'a>,
        _provider_meta_state: Self::ProviderMetaState<'a>,
    ) -> Option<()> {
        let state = present(diags, prior_state)?;
        let client = self.client.get(diags).await?;
        let id = require(diags, &state.id, "id")?;
        client
            .delete_credential(id)
            .await
            .or_report(diags, "Error deleting service account")
    }

    async fn import<'a>(
        &self,
        diags: &mut Diagnostics,
        id: String,
    ) -> Option<(Self::State<'a>, Self::PrivateState<'a>)> {
        let client = self.client.get(diags).await?;
        let Some(credential) = client
            .get_credential(&id)
            .await
            .or_report(diags, "Error reading service account")?
        else {
            diags.root_error(
                "Service account not found",
                format!("Could not find service account {id}"),
            );
            return None;
        };

        let mut state = ServiceAccountState::default();
        state.refresh(credential);
        Some((Value::Value(state), Default::default()))
    }
}
