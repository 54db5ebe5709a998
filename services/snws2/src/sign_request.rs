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

use crate::constants::{DIGEST, X_SN_DATE};
use crate::{AuthorizationBuilder, Credential};
use async_trait::async_trait;
use http::header::{AUTHORIZATION, DATE};
use http::HeaderValue;
use log::debug;
use solarnet_core::hash::base64_decode;
use solarnet_core::time::{now, DateTime};
use solarnet_core::{Context, Error, Result, SignRequest};

/// RequestSigner signs `http` requests with SNWS2.
///
/// The request gets an `X-SN-Date` header and a sensitive `Authorization`
/// header. Bodies are not available to the signer: requests with a body
/// should carry a `Digest: sha-256=<base64>` header, whose digest is then
/// signed as the content hash.
#[derive(Debug, Default)]
pub struct RequestSigner {
    signed_header_names: Vec<String>,
    time: Option<DateTime>,
}

impl RequestSigner {
    /// Create a new RequestSigner.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sign these headers in addition to the mandatory ones.
    pub fn with_signed_header_names<S: Into<String>>(
        mut self,
        names: impl IntoIterator<Item = S>,
    ) -> Self {
        self.signed_header_names = names.into_iter().map(Into::into).collect();
        self
    }

    /// Specify the signing time.
    ///
    /// # Note
    ///
    /// We should always take current time to sign requests.
    /// Only use this function for testing.
    #[cfg(test)]
    pub fn with_time(mut self, time: DateTime) -> Self {
        self.time = Some(time);
        self
    }

    fn get_time(&self) -> DateTime {
        self.time.unwrap_or_else(now)
    }

    fn authorization_builder(
        &self,
        req: &http::request::Parts,
        cred: &Credential,
    ) -> Result<AuthorizationBuilder> {
        if req.uri.authority().is_none() {
            return Err(Error::request_invalid(
                "request without authority cannot be signed",
            ));
        }

        let mut builder = AuthorizationBuilder::new(cred.token_id.as_str());
        builder
            .date(self.get_time())
            .method(req.method.clone())
            .sn_date(true)
            .signed_header_names(self.signed_header_names.iter().cloned())
            .url(&req.uri.to_string(), false)?;

        for (name, value) in req.headers.iter() {
            if name == AUTHORIZATION || name == DATE || name == X_SN_DATE {
                continue;
            }
            builder.header(name.as_str(), value.to_str()?)?;
        }

        if let Some(digest) = req.headers.get(DIGEST) {
            if let Some(v) = digest.to_str()?.strip_prefix("sha-256=") {
                builder.content_sha256(base64_decode(v)?);
            }
        }

        Ok(builder)
    }
}

#[async_trait]
impl SignRequest for RequestSigner {
    type Credential = Credential;

    async fn sign_request(
        &self,
        _: &Context,
        req: &mut http::request::Parts,
        credential: Option<&Self::Credential>,
    ) -> Result<()> {
        let Some(cred) = credential else {
            debug!("no credential available, request left unsigned");
            return Ok(());
        };

        let builder = self.authorization_builder(req, cred)?;
        let authorization = builder.build(&cred.secret);

        req.headers.insert(
            X_SN_DATE,
            HeaderValue::from_str(&builder.request_date_header_value())?,
        );
        let mut value = HeaderValue::from_str(&authorization)?;
        value.set_sensitive(true);
        req.headers.insert(AUTHORIZATION, value);

        Ok(())
    }
}
