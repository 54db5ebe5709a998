// Licensed to the Apache Software Foundation (ASF) under one
// or more contributor license agreements.  See the NOTICE file
// distributed with this work for additional information
// regarding copyright ownership.  The ASF licenses this file
// to you under the Apache License, Version 2.0 (the
// "License"); you may not use this file except in compliance
// with the License.  You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing,
// software distributed under the License is distributed on an
// "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied.  See the License for the
// specific language governing permissions and limitations
// under the License.

use crate::constants::*;
use solarnet_core::Context;

/// Config for the datum loader.
///
/// Numbers are kept as strings as found in the environment: values that do
/// not parse fall back to the loader defaults when applied with
/// [`DatumLoader::with_config`](crate::DatumLoader::with_config).
#[derive(Clone, Debug, Default)]
pub struct Config {
    /// `pagination_size` will be loaded from
    ///
    /// - this field if it's `is_some`
    /// - env value: [`SOLARNETWORK_PAGINATION_SIZE`]
    pub pagination_size: Option<String>,
    /// `concurrency` will be loaded from
    ///
    /// - this field if it's `is_some`
    /// - env value: [`SOLARNETWORK_CONCURRENCY`]
    pub concurrency: Option<String>,
    /// `proxy_url` will be loaded from
    ///
    /// - this field if it's `is_some`
    /// - env value: [`SOLARNETWORK_PROXY_URL`]
    pub proxy_url: Option<String>,
}

impl Config {
    /// Load config from env.
    pub fn from_env(mut self, ctx: &Context) -> Self {
        if let Some(v) = ctx.env_var(SOLARNETWORK_PAGINATION_SIZE) {
            self.pagination_size.get_or_insert(v);
        }
        if let Some(v) = ctx.env_var(SOLARNETWORK_CONCURRENCY) {
            self.concurrency.get_or_insert(v);
        }
        if let Some(v) = ctx.env_var(SOLARNETWORK_PROXY_URL) {
            self.proxy_url.get_or_insert(v);
        }

        self
    }
}
