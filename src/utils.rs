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

use std::borrow::Cow;
use std::collections::BTreeSet;

use tf_provider::value::{Value, ValueSet, ValueString};
use tf_provider::{AttributePath, Diagnostics};

use crate::client::ClientError;

pub const DATABASE_PRIVILEGES: &[&str] = &[
    "MODIFY_DATABASE",
    "LIST_TABLES",
    "CREATE_TABLE",
    "FUTURE_SELECT",
    "FUTURE_UPDATE",
    "FUTURE_DROP_TABLE",
    "FUTURE_MANAGE_GRANTS_DATABASE",
    "FUTURE_MANAGE_GRANTS_TABLE",
];

pub const WAREHOUSE_PRIVILEGES: &[&str] = &[
    "CREATE_DATABASE",
    "LIST_DATABASES",
    "MODIFY_WAREHOUSE",
    "FUTURE_MODIFY_DATABASE",
    "FUTURE_LIST_TABLES",
    "FUTURE_CREATE_TABLE",
    "FUTURE_SELECT",
    "FUTURE_UPDATE",
    "FUTURE_DROP_TABLE",
];

/// Elements of `a` that are not in `b`, in the order of `a`
pub fn difference<T: PartialEq + Clone>(a: &[T], b: &[T]) -> Vec<T> {
    a.iter().filter(|x| !b.contains(x)).cloned().collect()
}

pub fn is_uuid(value: &str) -> bool {
    uuid::Uuid::parse_str(value).is_ok()
}

/// Record client failures as root diagnostics
pub(crate) trait ReportError<T> {
    fn or_report(self, diags: &mut Diagnostics, summary: &'static str) -> Option<T>;
}

impl<T> ReportError<T> for Result<T, ClientError> {
    fn or_report(self, diags: &mut Diagnostics, summary: &'static str) -> Option<T> {
        match self {
            Ok(value) => Some(value),
            Err(err) => {
                tracing::error!("{summary}: {err}");
                diags.root_error(summary, err.to_string());
                None
            }
        }
    }
}

pub(crate) fn optional<'a>(value: Option<String>) -> ValueString<'a> {
    value.map_or(Value::Null, ValueString::from)
}

/// Known elements of a set of strings
pub(crate) fn known_values(set: &ValueSet<ValueString<'_>>) -> Vec<String> {
    set.iter()
        .flatten()
        .filter_map(|item| item.as_deref_option().map(str::to_owned))
        .collect()
}

pub fn value_set<'a, I>(items: I) -> ValueSet<ValueString<'a>>
where
    I: IntoIterator<Item = String>,
{
    Value::Value(
        items
            .into_iter()
            .map(|item| Value::Value(Cow::Owned(item)))
            .collect(),
    )
}

/// Set read back from the API, kept null when it was null before and came back empty
pub(crate) fn refreshed_set<'a>(
    previous: &ValueSet<ValueString<'_>>,
    items: BTreeSet<String>,
) -> ValueSet<ValueString<'a>> {
    if items.is_empty() && previous.is_null() {
        Value::Null
    } else {
        value_set(items)
    }
}

/// Check every element of `set` against the `allowed` privileges
pub(crate) fn validate_privileges(
    diags: &mut Diagnostics,
    attr: &'static str,
    set: &ValueSet<ValueString<'_>>,
    allowed: &[&str],
    kind: &str,
) {
    let Value::Value(set) = set else {
        return;
    };
    for privilege in set {
        match privilege {
            Value::Value(privilege) => {
                if !allowed.contains(&privilege.as_ref()) {
                    diags.error(
                        format!("Invalid {kind} privilege"),
                        format!(
                            "{privilege} is not a valid privilege. Valid privileges are [{}]",
                            allowed.join(", ")
                        ),
                        AttributePath::new(attr).key(privilege.to_string()),
                    );
                }
            }
            Value::Null => {
                diags.error(
                    "Invalid privileges",
                    "Cannot specify null privilege",
                    AttributePath::new(attr),
                );
                return;
            }
            Value::Unknown => (),
        }
    }
}

/// Split an import identifier into exactly `N` non-empty parts separated by `/`
pub(crate) fn split_id<'s, const N: usize>(
    diags: &mut Diagnostics,
    id: &'s str,
    expected: &str,
) -> Option<[&'s str; N]> {
    let parts = id.split('/').collect::<Vec<_>>();
    if parts.iter().any(|part| part.is_empty()) {
        diags.root_error(
            "Unexpected Import Identifier",
            format!("Expected import identifier with format: {expected}. Got: {id}"),
        );
        return None;
    }
    match parts.try_into() {
        Ok(parts) => Some(parts),
        Err(_) => {
            diags.root_error(
                "Unexpected Import Identifier",
                format!("Expected import identifier with format: {expected}. Got: {id}"),
            );
            None
        }
    }
}

/// Fail when a required input is not known yet
pub(crate) fn require<'v>(
    diags: &mut Diagnostics,
    value: &'v ValueString<'_>,
    attr: &'static str,
) -> Option<&'v str> {
    match value {
        Value::Value(value) => Some(value.as_ref()),
        Value::Null => {
            diags.error_short(format!("`{attr}` cannot be null"), AttributePath::new(attr));
            None
        }
        Value::Unknown => {
            diags.error_short(
                format!("`{attr}` is not known"),
                AttributePath::new(attr),
            );
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(items: &[&str]) -> ValueSet<ValueString<'static>> {
        value_set(items.iter().map(|s| s.to_string()))
    }

    #[test]
    fn difference_keeps_order() {
        let a = ["c", "a", "b", "d"];
        let b = ["a", "d", "z"];
        assert_eq!(difference(&a, &b), ["c", "b"]);
        assert!(difference(&b, &b).is_empty());
        assert_eq!(difference(&b, &[]), b);
    }

    #[test]
    fn uuids() {
        assert!(is_uuid("5c1a4d36-8e0a-4e1f-9f5b-5b8a8e4a3a11"));
        assert!(!is_uuid("raw_events"));
    }

    #[test]
    fn valid_privileges() {
        let mut diags = Diagnostics::default();
        validate_privileges(
            &mut diags,
            "privileges",
            &set(&["LIST_TABLES", "CREATE_TABLE"]),
            DATABASE_PRIVILEGES,
            "Database",
        );
        assert!(diags.errors.is_empty());
    }

    #[test]
    fn invalid_privileges_are_reported_individually() {
        let mut diags = Diagnostics::default();
        validate_privileges(
            &mut diags,
            "privileges",
            &set(&["LIST_TABLES", "CREATE_DATABASE", "DROP_EVERYTHING"]),
            DATABASE_PRIVILEGES,
            "Database",
        );
        assert_eq!(diags.errors.len(), 2);
    }

    #[test]
    fn warehouse_privileges_differ_from_database_ones() {
        let mut diags = Diagnostics::default();
        validate_privileges(
            &mut diags,
            "privileges",
            &set(&["CREATE_DATABASE", "FUTURE_MODIFY_DATABASE"]),
            WAREHOUSE_PRIVILEGES,
            "Warehouse",
        );
        assert!(diags.errors.is_empty());
        validate_privileges(
            &mut diags,
            "privileges",
            &set(&["MODIFY_DATABASE"]),
            WAREHOUSE_PRIVILEGES,
            "Warehouse",
        );
        assert_eq!(diags.errors.len(), 1);
    }

    #[test]
    fn null_and_unknown_privileges() {
        let mut diags = Diagnostics::default();
        let unknown = Value::Value([Value::Unknown].into_iter().collect());
        validate_privileges(&mut diags, "privileges", &unknown, DATABASE_PRIVILEGES, "Database");
        validate_privileges(&mut diags, "privileges", &Value::Null, DATABASE_PRIVILEGES, "Database");
        assert!(diags.errors.is_empty());

        let null = Value::Value([Value::Null].into_iter().collect());
        validate_privileges(&mut diags, "privileges", &null, DATABASE_PRIVILEGES, "Database");
        assert_eq!(diags.errors.len(), 1);
    }

    #[test]
    fn split_import_ids() {
        let mut diags = Diagnostics::default();
        assert_eq!(
            split_id::<3>(&mut diags, "w/d/r", "warehouse_id/database_id/role_name"),
            Some(["w", "d", "r"])
        );
        assert_eq!(split_id::<2>(&mut diags, "w/d/r", "a/b"), None);
        assert_eq!(split_id::<2>(&mut diags, "w/", "a/b"), None);
        assert_eq!(diags.errors.len(), 2);
    }

    #[test]
    fn refreshed_sets() {
        assert!(refreshed_set(&Value::Null, BTreeSet::new()).is_null());
        assert_eq!(
            refreshed_set(&set(&[]), BTreeSet::new()),
            Value::Value(BTreeSet::new())
        );
        let items = BTreeSet::from(["A".to_string()]);
        assert_eq!(known_values(&refreshed_set(&Value::Null, items)), ["A"]);
    }
}
