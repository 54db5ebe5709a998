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
use solarnet_core::utils::Redact;
use solarnet_core::{Context, Environment, Result};
use std::fmt::{Debug, Formatter};

/// Config for SNWS2 signing.
#[derive(Clone, Default)]
pub struct Config {
    /// `token_id` will be loaded from
    ///
    /// - this field if it's `is_some`
    /// - env value: [`SOLARNETWORK_TOKEN_ID`]
    pub token_id: Option<String>,
    /// `secret` will be loaded from
    ///
    /// - this field if it's `is_some`
    /// - env value: [`SOLARNETWORK_TOKEN_SECRET`]
    pub secret: Option<String>,
    /// `host` will be loaded from
    ///
    /// - this field if it's `is_some`
    /// - env value: [`SOLARNETWORK_HOST`]
    ///
    /// Either a bare host name or a full origin such as
    /// `http://localhost:8080`.
    pub host: Option<String>,
}

impl Debug for Config {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("token_id", &Redact::from(&self.token_id))
            .field("secret", &Redact::from(&self.secret))
            .field("host", &self.host)
            .finish()
    }
}

impl Config {
    /// Load config from env.
    pub fn from_env(mut self, ctx: &Context) -> Self {
        if let Some(v) = ctx.env_var(SOLARNETWORK_TOKEN_ID) {
            self.token_id.get_or_insert(v);
        }
        if let Some(v) = ctx.env_var(SOLARNETWORK_TOKEN_SECRET) {
            self.secret.get_or_insert(v);
        }
        if let Some(v) = ctx.env_var(SOLARNETWORK_HOST) {
            self.host.get_or_insert(v);
        }

        self
    }

    /// Set the token id.
    pub fn with_token_id(mut self, token_id: impl Into<String>) -> Self {
        self.token_id = Some(token_id.into());
        self
    }

    /// Set the token secret.
    pub fn with_secret(mut self, secret: impl Into<String>) -> Self {
        self.secret = Some(secret.into());
        self
    }

    /// Set the host.
    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    /// The environment described by `host`, the default one when unset.
    pub fn environment(&self) -> Result<Environment> {
        match &self.host {
            None => Ok(Environment::default()),
            Some(host) if host.contains("://") => host.parse(),
            Some(host) => Ok(Environment::new(host.as_str())),
        }
    }
}
