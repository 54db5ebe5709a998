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

use solarnet_core::utils::Redact;
use solarnet_core::SigningCredential;
use std::fmt::{Debug, Formatter};

/// Credential of a SolarNetwork security token.
#[derive(Default, Clone)]
pub struct Credential {
    /// Security token id, sent as the `Credential` of the authorization.
    pub token_id: String,
    /// Security token secret, only ever used to derive signing keys.
    pub secret: String,
}

impl Credential {
    /// Create a credential from a token id and secret.
    pub fn new(token_id: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            token_id: token_id.into(),
            secret: secret.into(),
        }
    }
}

impl Debug for Credential {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credential")
            .field("token_id", &Redact::from(&self.token_id))
            .field("secret", &Redact::from(&self.secret))
            .finish()
    }
}

impl SigningCredential for Credential {
    fn is_valid(&self) -> bool {
        !self.token_id.is_empty() && !self.secret.is_empty()
    }
}
