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

//! IAM policies letting Tabular reach an S3 bucket

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value as Json};
use tf_provider::schema::{Block, Description, Schema};
use tf_provider::value::{ValueEmpty, ValueString};
use tf_provider::{map, DataSource, Diagnostics};

use crate::provider::ClientHandle;
use crate::resources::{computed_string, required_string};
use crate::utils::require;

/// AWS account Tabular signs requests from
const TABULAR_ACCOUNT: &str = "237881912361";

fn bucket_policy(bucket: &str, bucket_actions: &[&str], object_actions: &[&str]) -> Json {
    json!({
        "Version": "2012-10-17",
        "Statement": [
            {
                "Effect": "Allow",
                "Action": bucket_actions,
                "Resource": [format!("arn:aws:s3:::{bucket}")]
            },
            {
                "Effect": "Allow",
                "Action": object_actions,
                "Resource": [format!("arn:aws:s3:::{bucket}/*")]
            }
        ]
    })
}

pub fn read_write_policy(bucket: &str) -> Json {
    bucket_policy(
        bucket,
        &[
            "s3:ListBucket",
            "s3:GetBucketLocation",
            "s3:GetBucketNotification",
            "s3:PutBucketNotification",
        ],
        &[
            "s3:PutObject",
            "s3:GetObject",
            "s3:DeleteObject",
            "s3:PutObjectAcl",
            "s3:AbortMultipartUpload",
        ],
    )
}

pub fn read_only_policy(bucket: &str) -> Json {
    bucket_policy(
        bucket,
        &[
            "s3:ListBucket",
            "s3:GetBucketLocation",
            "s3:GetBucketNotification",
        ],
        &["s3:GetObject"],
    )
}

/// Trust policy of the role Tabular assumes, `external_id` being the organization id
pub fn assume_role_policy(external_id: &str) -> Json {
    json!({
        "Version": "2008-10-17",
        "Statement": [
            {
                "Effect": "Allow",
                "Principal": {
                    "AWS": format!("arn:aws:iam::{TABULAR_ACCOUNT}:root")
                },
                "Action": ["sts:AssumeRole", "sts:TagSession"],
                "Condition": {
                    "StringEquals": {
                        "sts:ExternalId": external_id
                    },
                    "ArnLike": {
                        "aws:PrincipalArn": format!(
                            "arn:aws:iam::{TABULAR_ACCOUNT}:role/TabularSignerServiceRole*"
                        )
                    }
                }
            }
        ]
    })
}

fn render(diags: &mut Diagnostics, policy: &Json) -> Option<String> {
    match serde_json::to_string_pretty(policy) {
        Ok(policy) => Some(policy),
        Err(err) => {
            diags.root_error("Failed to render policy", err.to_string());
            None
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct AwsIamPolicyState<'a> {
    #[serde(borrow = "'a")]
    pub id: ValueString<'a>,
    pub bucket: ValueString<'a>,
    pub iam_read_write_policy: ValueString<'a>,
    pub iam_read_only_policy: ValueString<'a>,
    pub assume_role_policy: ValueString<'a>,
}

#[derive(Debug, Clone)]
pub struct AwsIamPolicyDataSource {
    client: ClientHandle,
}

impl AwsIamPolicyDataSource {
    pub fn new(client: ClientHandle) -> Self {
        Self { client }
    }
}

#[async_trait]
impl DataSource for AwsIamPolicyDataSource {
    type State<'a> = AwsIamPolicyState<'a>;
    type ProviderMetaState<'a> = ValueEmpty;

    fn schema(&self, _diags: &mut Diagnostics) -> Option<Schema> {
        Some(Schema {
            version: 1,
            block: Block {
                version: 1,
                description: Description::plain("AWS IAM policies granting Tabular access to a bucket"),
                attributes: map! {
                    "id" => computed_string("Bucket name"),
                    "bucket" => required_string("Name of the S3 bucket"),
                    "iam_read_write_policy" => computed_string("IAM policy for read/write access"),
                    "iam_read_only_policy" => computed_string("IAM policy for read only access"),
                    "assume_role_policy" => computed_string("Trust policy allowing Tabular to assume the role")
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
        let bucket = require(diags, &config.bucket, "bucket")?.to_owned();

        let read_write = render(diags, &read_write_policy(&bucket))?;
        let read_only = render(diags, &read_only_policy(&bucket))?;
        let assume_role = render(diags, &assume_role_policy(client.organization_id()))?;

        Some(AwsIamPolicyState {
            id: ValueString::from(bucket.clone()),
            bucket: ValueString::from(bucket),
            iam_read_write_policy: ValueString::from(read_write),
            iam_read_only_policy: ValueString::from(read_only),
            assume_role_policy: ValueString::from(assume_role),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn read_write_policy_targets_bucket_and_objects() {
        let policy = read_write_policy("lake");
        let statements = policy["Statement"].as_array().unwrap();
        assert_eq!(statements[0]["Resource"][0], "arn:aws:s3:::lake");
        assert_eq!(statements[1]["Resource"][0], "arn:aws:s3:::lake/*");
        assert_eq!(statements[0]["Action"].as_array().unwrap().len(), 4);
        assert_eq!(statements[1]["Action"].as_array().unwrap().len(), 5);
    }

    #[test]
    fn read_only_policy_cannot_write() {
        let policy = read_only_policy("lake").to_string();
        assert!(policy.contains("s3:GetObject"));
        assert!(!policy.contains("s3:PutObject"));
        assert!(!policy.contains("s3:PutBucketNotification"));
    }

    #[test]
    fn assume_role_uses_external_id() {
        let policy = assume_role_policy("org-42");
        let statement = &policy["Statement"][0];
        assert_eq!(policy["Version"], "2008-10-17");
        assert_eq!(statement["Condition"]["StringEquals"]["sts:ExternalId"], "org-42");
        assert_eq!(statement["Principal"]["AWS"], "arn:aws:iam::237881912361:root");
    }
}
