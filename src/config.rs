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

use serde::{Deserialize, Serialize};
use tf_provider::schema::{Attribute, AttributeConstraint, AttributeType, Block, Description, Schema};
use tf_provider::value::{Value, ValueString};
use tf_provider::{map, AttributePath, Diagnostics};

use crate::client::{ClientSettings, RetryPolicy, DEFAULT_ENDPOINT, DEFAULT_TOKEN_ENDPOINT};

/// Provider block
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ProviderConfig<'a> {
    #[serde(borrow = "'a")]
    pub endpoint: ValueString<'a>,
    pub token_endpoint: ValueString<'a>,
    pub credential: ValueString<'a>,
    pub organization_id: ValueString<'a>,
}

/// A provider attribute that can fall back on an environment variable
#[derive(Debug, Clone, Copy)]
pub struct ConfigOption {
    pub name: &'static str,
    pub env: &'static str,
    pub default: Option<&'static str>,
    /// Diagnostic summary when the option cannot be resolved
    pub summary: &'static str,
}

pub const ENDPOINT: ConfigOption = ConfigOption {
    name: "endpoint",
    env: "TABULAR_ENDPOINT",
    default: Some(DEFAULT_ENDPOINT),
    summary: "Endpoint Invalid",
};

pub const TOKEN_ENDPOINT: ConfigOption = ConfigOption {
    name: "token_endpoint",
    env: "TABULAR_TOKEN_ENDPOINT",
    default: Some(DEFAULT_TOKEN_ENDPOINT),
    summary: "Token Endpoint Invalid",
};

pub const ORGANIZATION_ID: ConfigOption = ConfigOption {
    name: "organization_id",
    env: "TABULAR_ORGANIZATION_ID",
    default: None,
    summary: "Organization ID Invalid",
};

pub const CREDENTIAL: ConfigOption = ConfigOption {
    name: "credential",
    env: "TABULAR_CREDENTIAL",
    default: None,
    summary: "Credential Invalid",
};

/// Configured value first, then the environment, then the default
pub fn resolve_option<F>(value: &ValueString<'_>, option: &ConfigOption, lookup: F) -> Result<String, String>
where
    F: Fn(&str) -> Option<String>,
{
    match value {
        Value::Unknown => Err(format!(
            "{} depends on values that cannot be known until apply time",
            option.name
        )),
        Value::Value(value) if !value.is_empty() => Ok(value.to_string()),
        _ => match (lookup(option.env), option.default) {
            (Some(value), _) => Ok(value),
            (None, Some(default)) => Ok(default.to_owned()),
            (None, None) => Err(format!(
                "{name} must have a value. Either set {name} in provider config or set the {env} environment variable",
                name = option.name,
                env = option.env
            )),
        },
    }
}

impl ProviderConfig<'_> {
    pub fn schema() -> Schema {
        Schema {
            version: 1,
            block: Block {
                description: Description::plain("Interact with the Tabular data platform"),
                attributes: map! {
                    "endpoint" => Attribute {
                        attr_type: AttributeType::String,
                        description: Description::plain(format!(
                            "Tabular API endpoint. Defaults to {DEFAULT_ENDPOINT}, can be set with the TABULAR_ENDPOINT environment variable"
                        )),
                        constraint: AttributeConstraint::Optional,
                        ..Default::default()
                    },
                    "token_endpoint" => Attribute {
                        attr_type: AttributeType::String,
                        description: Description::plain(format!(
                            "OAuth token endpoint. Defaults to {DEFAULT_TOKEN_ENDPOINT}, can be set with the TABULAR_TOKEN_ENDPOINT environment variable"
                        )),
                        constraint: AttributeConstraint::Optional,
                        ..Default::default()
                    },
                    "credential" => Attribute {
                        attr_type: AttributeType::String,
                        description: Description::plain(
                            "Tabular credential (client_id:client_secret), can be set with the TABULAR_CREDENTIAL environment variable"
                        ),
                        constraint: AttributeConstraint::Optional,
                        sensitive: true,
                        ..Default::default()
                    },
                    "organization_id" => Attribute {
                        attr_type: AttributeType::String,
                        description: Description::plain(
                            "Tabular organization id, can be set with the TABULAR_ORGANIZATION_ID environment variable"
                        ),
                        constraint: AttributeConstraint::Optional,
                        ..Default::default()
                    }
                },
                ..Default::default()
            },
        }
    }

    /// Resolve every option, reporting each failure on its own attribute
    pub fn settings<F>(&self, diags: &mut Diagnostics, lookup: F) -> Option<ClientSettings>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut resolve = |value: &ValueString<'_>, option: &ConfigOption| {
            match resolve_option(value, option, &lookup) {
                Ok(value) => Some(value),
                Err(detail) => {
                    diags.error(option.summary, detail, AttributePath::new(option.name));
                    None
                }
            }
        };

        let endpoint = resolve(&self.endpoint, &ENDPOINT);
        let token_endpoint = resolve(&self.token_endpoint, &TOKEN_ENDPOINT);
        let organization_id = resolve(&self.organization_id, &ORGANIZATION_ID);
        let credential = resolve(&self.credential, &CREDENTIAL);

        Some(ClientSettings {
            endpoint: endpoint?,
            token_endpoint: token_endpoint?,
            organization_id: organization_id?,
            credential: credential?,
            retry: RetryPolicy::default(),
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn env(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn configured_value_wins() {
        let value = ValueString::from("https://custom.example.com");
        let resolved = resolve_option(&value, &ENDPOINT, env(&[("TABULAR_ENDPOINT", "https://env")]));
        assert_eq!(resolved.unwrap(), "https://custom.example.com");
    }

    #[test]
    fn falls_back_to_environment_then_default() {
        let resolved = resolve_option(&Value::Null, &ENDPOINT, env(&[("TABULAR_ENDPOINT", "https://env")]));
        assert_eq!(resolved.unwrap(), "https://env");

        let empty = ValueString::from("");
        let resolved = resolve_option(&empty, &ENDPOINT, env(&[]));
        assert_eq!(resolved.unwrap(), DEFAULT_ENDPOINT);
    }

    #[test]
    fn missing_required_option() {
        let err = resolve_option(&Value::Null, &CREDENTIAL, env(&[])).unwrap_err();
        assert_eq!(
            err,
            "credential must have a value. Either set credential in provider config or set the TABULAR_CREDENTIAL environment variable"
        );
    }

    #[test]
    fn unknown_option() {
        let err = resolve_option(&Value::Unknown, &ORGANIZATION_ID, env(&[])).unwrap_err();
        assert_eq!(
            err,
            "organization_id depends on values that cannot be known until apply time"
        );
    }

    #[test]
    fn settings_report_every_missing_option() {
        let mut diags = Diagnostics::default();
        let config = ProviderConfig::default();
        assert!(config.settings(&mut diags, env(&[])).is_none());
        assert_eq!(diags.errors.len(), 2);
    }

    #[test]
    fn settings_from_environment() {
        let mut diags = Diagnostics::default();
        let config = ProviderConfig {
            organization_id: ValueString::from("org-1"),
            ..Default::default()
        };
        let settings = config
            .settings(&mut diags, env(&[("TABULAR_CREDENTIAL", "id:secret")]))
            .unwrap();
        assert!(diags.errors.is_empty());
        assert_eq!(settings.endpoint, DEFAULT_ENDPOINT);
        assert_eq!(settings.token_endpoint, DEFAULT_TOKEN_ENDPOINT);
        assert_eq!(settings.organization_id, "org-1");
        assert_eq!(settings.credential, "id:secret");
    }
}
