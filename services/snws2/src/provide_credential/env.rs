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
use crate::Credential;
use async_trait::async_trait;
use solarnet_core::{Context, ProvideCredential, Result};

/// EnvCredentialProvider loads the token from environment variables.
///
/// This provider looks for the following environment variables:
/// - `SOLARNETWORK_TOKEN_ID`: the security token id
/// - `SOLARNETWORK_TOKEN_SECRET`: the security token secret
#[derive(Debug, Default, Clone)]
pub struct EnvCredentialProvider;

impl EnvCredentialProvider {
    /// Create a new EnvCredentialProvider.
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ProvideCredential for EnvCredentialProvider {
    type Credential = Credential;

    async fn provide_credential(&self, ctx: &Context) -> Result<Option<Self::Credential>> {
        let envs = ctx.env_vars();

        match (
            envs.get(SOLARNETWORK_TOKEN_ID),
            envs.get(SOLARNETWORK_TOKEN_SECRET),
        ) {
            (Some(token_id), Some(secret)) => Ok(Some(Credential::new(token_id, secret))),
            _ => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use solarnet_core::StaticEnv;
    use std::collections::HashMap;

    #[tokio::test]
    async fn test_env_credential_provider() -> anyhow::Result<()> {
        let envs = HashMap::from([
            (SOLARNETWORK_TOKEN_ID.to_string(), "test_token".to_string()),
            (
                SOLARNETWORK_TOKEN_SECRET.to_string(),
                "test_secret".to_string(),
            ),
        ]);
        let ctx = Context::new().with_env(StaticEnv { envs });

        let provider = EnvCredentialProvider::new();
        let cred = provider.provide_credential(&ctx).await?;
        assert!(cred.is_some());
        let cred = cred.unwrap();
        assert_eq!(cred.token_id, "test_token");
        assert_eq!(cred.secret, "test_secret");

        Ok(())
    }

    #[tokio::test]
    async fn test_env_credential_provider_partial_credentials() -> anyhow::Result<()> {
        // Only the token id.
        let envs = HashMap::from([(SOLARNETWORK_TOKEN_ID.to_string(), "test_token".to_string())]);
        let ctx = Context::new().with_env(StaticEnv { envs });

        let provider = EnvCredentialProvider::new();
        let cred = provider.provide_credential(&ctx).await?;
        assert!(cred.is_none());

        Ok(())
    }
}
