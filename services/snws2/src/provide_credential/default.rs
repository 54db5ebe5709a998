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

use crate::provide_credential::{ConfigCredentialProvider, EnvCredentialProvider};
use crate::{Config, Credential};
use async_trait::async_trait;
use solarnet_core::{Context, ProvideCredential, ProvideCredentialChain, Result};
use std::sync::Arc;

/// DefaultCredentialProvider loads the token from the environment.
///
/// It is a chain that only holds an [`EnvCredentialProvider`] by default.
/// Other sources can be tried first with [`push_front`](Self::push_front).
#[derive(Debug)]
pub struct DefaultCredentialProvider {
    chain: ProvideCredentialChain<Credential>,
}

impl Default for DefaultCredentialProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Arc<Config>> for DefaultCredentialProvider {
    fn from(config: Arc<Config>) -> Self {
        Self::new().push_front(ConfigCredentialProvider::new(config))
    }
}

impl DefaultCredentialProvider {
    /// Create a new `DefaultCredentialProvider` instance.
    pub fn new() -> Self {
        let chain = ProvideCredentialChain::new().push(EnvCredentialProvider::new());

        Self { chain }
    }

    /// Create with a custom credential chain.
    pub fn with_chain(chain: ProvideCredentialChain<Credential>) -> Self {
        Self { chain }
    }

    /// Add a credential provider to the front of the default chain.
    ///
    /// ```no_run
    /// use solarnet_snws2::{DefaultCredentialProvider, StaticCredentialProvider};
    ///
    /// let provider = DefaultCredentialProvider::new()
    ///     .push_front(StaticCredentialProvider::new("token", "secret"));
    /// ```
    pub fn push_front(
        mut self,
        provider: impl ProvideCredential<Credential = Credential> + 'static,
    ) -> Self {
        self.chain = self.chain.push_front(provider);
        self
    }
}

#[async_trait]
impl ProvideCredential for DefaultCredentialProvider {
    type Credential = Credential;

    async fn provide_credential(&self, ctx: &Context) -> Result<Option<Self::Credential>> {
        self.chain.provide_credential(ctx).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::*;
    use crate::StaticCredentialProvider;
    use solarnet_core::StaticEnv;
    use std::collections::HashMap;

    fn env_context(envs: HashMap<String, String>) -> Context {
        Context::new().with_env(StaticEnv { envs })
    }

    #[tokio::test]
    async fn test_default_loader_without_env() -> anyhow::Result<()> {
        let _ = env_logger::builder().is_test(true).try_init();

        let loader = DefaultCredentialProvider::new();
        let credential = loader.provide_credential(&env_context(HashMap::new())).await?;

        assert!(credential.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn test_default_loader_with_env() -> anyhow::Result<()> {
        let _ = env_logger::builder().is_test(true).try_init();

        let ctx = env_context(HashMap::from_iter([
            (SOLARNETWORK_TOKEN_ID.to_string(), "token_id".to_string()),
            (SOLARNETWORK_TOKEN_SECRET.to_string(), "secret".to_string()),
        ]));

        let loader = DefaultCredentialProvider::new();
        let credential = loader.provide_credential(&ctx).await?.unwrap();

        assert_eq!("token_id", credential.token_id);
        assert_eq!("secret", credential.secret);
        Ok(())
    }

    #[tokio::test]
    async fn test_default_loader_push_front_wins() -> anyhow::Result<()> {
        let _ = env_logger::builder().is_test(true).try_init();

        let ctx = env_context(HashMap::from_iter([
            (SOLARNETWORK_TOKEN_ID.to_string(), "env_token".to_string()),
            (SOLARNETWORK_TOKEN_SECRET.to_string(), "env_secret".to_string()),
        ]));

        let loader = DefaultCredentialProvider::new()
            .push_front(StaticCredentialProvider::new("static_token", "static_secret"));
        let credential = loader.provide_credential(&ctx).await?.unwrap();
        assert_eq!("static_token", credential.token_id);

        let config = Config::default()
            .with_token_id("config_token")
            .with_secret("config_secret");
        let loader = DefaultCredentialProvider::from(Arc::new(config));
        let credential = loader.provide_credential(&ctx).await?.unwrap();
        assert_eq!("config_token", credential.token_id);
        Ok(())
    }
}
