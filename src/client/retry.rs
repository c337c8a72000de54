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

use std::future::Future;
use std::time::Duration;

use backoff::{ExponentialBackoff, ExponentialBackoffBuilder};

use super::error::{ClientError, Result};

/// Exponential backoff with jitter
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    pub initial_interval: Duration,
    pub multiplier: f64,
    /// Each delay is drawn in `interval * [1 - randomization_factor, 1 + randomization_factor]`
    pub randomization_factor: f64,
    pub max_interval: Duration,
    /// Give up once the next delay would go past this budget
    pub max_elapsed: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            initial_interval: Duration::from_millis(500),
            multiplier: 2.0,
            randomization_factor: 0.5,
            max_interval: Duration::from_secs(60),
            max_elapsed: Duration::from_secs(5 * 60),
        }
    }
}

impl RetryPolicy {
    /// Policy that never retries
    pub fn none() -> Self {
        Self {
            max_elapsed: Duration::ZERO,
            ..Default::default()
        }
    }

    fn backoff(&self) -> ExponentialBackoff {
        ExponentialBackoffBuilder::new()
            .with_initial_interval(self.initial_interval)
            .with_multiplier(self.multiplier)
            .with_randomization_factor(self.randomization_factor)
            .with_max_interval(self.max_interval)
            .with_max_elapsed_time(Some(self.max_elapsed))
            .build()
    }

    /// Run `op` until it succeeds, fails permanently, or the elapsed budget is spent
    pub async fn retry<T, F, Fut>(&self, mut op: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        if self.max_elapsed.is_zero() {
            return op().await;
        }

        let mut attempt = 0u32;
        let result = backoff::future::retry_notify(
            self.backoff(),
            || {
                attempt += 1;
                let fut = op();
                async move { fut.await.map_err(classify) }
            },
            |err: ClientError, delay: Duration| {
                tracing::warn!(
                    "request failed ({err}), retrying in {}ms",
                    delay.as_millis()
                );
            },
        )
        .await;

        if let Err(err) = &result {
            if err.is_retryable() {
                tracing::warn!("giving up after {attempt} attempts: {err}");
            }
        }
        result
    }
}

fn classify(err: ClientError) -> backoff::Error<ClientError> {
    if err.is_retryable() {
        backoff::Error::transient(err)
    } else {
        backoff::Error::permanent(err)
    }
}
