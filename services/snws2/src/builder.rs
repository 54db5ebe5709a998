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

use crate::canonical::{canonical_header_names, canonical_query_string};
use crate::constants::{DIGEST, SNWS2, SNWS2_ALGORITHM, X_SN_DATE};
use crate::key::{derive_signing_key, SigningKey};
use http::header::{CONTENT_TYPE, DATE, HOST};
use http::{HeaderMap, HeaderName, HeaderValue, Method, Uri};
use log::debug;
use solarnet_core::hash::{
    base64_encode, hex_hmac_sha256, hex_sha256, sha256, EMPTY_STRING_SHA256_HEX,
};
use solarnet_core::time::{format_http_date, format_iso8601, now, DateTime};
use solarnet_core::utils::Redact;
use solarnet_core::{Environment, Error, Result};
use std::fmt::{Debug, Formatter};

/// AuthorizationBuilder computes SNWS2 `Authorization` header values.
///
/// A builder is meant to live as long as its token: configure a request,
/// build, then [`reset`](Self::reset) and configure the next one. The saved
/// signing key survives resets, so a key derived once can sign every request
/// of its 7 day validity window without touching the secret again.
///
/// ```
/// use solarnet_snws2::AuthorizationBuilder;
///
/// # fn main() -> solarnet_core::Result<()> {
/// let mut builder = AuthorizationBuilder::new("my-token");
/// builder.save_signing_key("my-secret");
///
/// builder
///     .reset()
///     .sn_date(true)
///     .url("https://data.solarnetwork.net/solarquery/api/v1/sec/datum/list?nodeIds=1", false)?;
/// let authorization = builder.build_with_saved_key()?;
/// assert!(authorization.starts_with("SNWS2 Credential=my-token,"));
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct AuthorizationBuilder {
    token_id: String,
    host: String,

    method: Method,
    path: String,
    request_date: DateTime,
    headers: HeaderMap,
    query: Vec<(String, String)>,
    content_digest: Option<Vec<u8>>,
    signed_header_names: Vec<String>,

    signing_key: Option<SigningKey>,
}

impl Debug for AuthorizationBuilder {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthorizationBuilder")
            .field("token_id", &Redact::from(&self.token_id))
            .field("host", &self.host)
            .field("method", &self.method)
            .field("path", &self.path)
            .field("request_date", &self.request_date)
            .field("headers", &self.headers)
            .field("query", &self.query)
            .field("signed_header_names", &self.signed_header_names)
            .field("signing_key", &self.signing_key)
            .finish()
    }
}

impl AuthorizationBuilder {
    /// Create a builder for `token_id` against the default environment.
    pub fn new(token_id: impl Into<String>) -> Self {
        Self {
            token_id: token_id.into(),
            host: Environment::default().host_with_port(),

            method: Method::GET,
            path: "/".to_string(),
            request_date: now(),
            headers: HeaderMap::new(),
            query: Vec::new(),
            content_digest: None,
            signed_header_names: Vec::new(),

            signing_key: None,
        }
    }

    /// Use the host of `environment`.
    pub fn with_environment(mut self, environment: &Environment) -> Self {
        self.host = environment.host_with_port();
        self
    }

    /// The token this builder signs for.
    pub fn token_id(&self) -> &str {
        &self.token_id
    }

    /// Clear all per request state.
    ///
    /// Method goes back to `GET`, path to `/`, the request date to now, and
    /// headers, query parameters, content digest and extra signed header
    /// names are dropped. The token, host and saved signing key are kept.
    pub fn reset(&mut self) -> &mut Self {
        self.method = Method::GET;
        self.path = "/".to_string();
        self.request_date = now();
        self.headers.clear();
        self.query.clear();
        self.content_digest = None;
        self.signed_header_names.clear();
        self
    }

    /// Set the HTTP method.
    pub fn method(&mut self, method: Method) -> &mut Self {
        self.method = method;
        self
    }

    /// Set the request path, as it appears on the wire.
    pub fn path(&mut self, path: impl Into<String>) -> &mut Self {
        self.path = path.into();
        self
    }

    /// Set the host, including a port when it is not the default one.
    pub fn host(&mut self, host: impl Into<String>) -> &mut Self {
        self.host = host.into();
        self
    }

    /// Set the request date.
    ///
    /// An `X-SN-Date` header already present is refreshed to match.
    pub fn date(&mut self, date: DateTime) -> &mut Self {
        self.request_date = date;
        if self.headers.contains_key(X_SN_DATE) {
            let value = self.request_date_header_value();
            self.headers.insert(X_SN_DATE, http_date_value(&value));
        }
        self
    }

    /// The request date.
    pub fn request_date(&self) -> DateTime {
        self.request_date
    }

    /// The request date formatted as an HTTP date, the value to send in the
    /// `Date` or `X-SN-Date` header.
    pub fn request_date_header_value(&self) -> String {
        format_http_date(self.request_date)
    }

    /// Sign with `X-SN-Date` instead of `Date`.
    ///
    /// Browsers do not allow scripts to set `Date`, so SolarNetwork accepts
    /// `X-SN-Date` in its place.
    pub fn sn_date(&mut self, enabled: bool) -> &mut Self {
        if enabled {
            let value = self.request_date_header_value();
            self.headers.insert(X_SN_DATE, http_date_value(&value));
        } else {
            self.headers.remove(X_SN_DATE);
            self.signed_header_names
                .retain(|v| !v.eq_ignore_ascii_case(X_SN_DATE));
        }
        self
    }

    /// Whether `X-SN-Date` is signed instead of `Date`.
    pub fn use_sn_date(&self) -> bool {
        self.headers.contains_key(X_SN_DATE)
            || self
                .signed_header_names
                .iter()
                .any(|v| v.eq_ignore_ascii_case(X_SN_DATE))
    }

    /// Configure method-independent request details from a full URL.
    ///
    /// The path and the decoded query parameters are taken from `url`. The
    /// host is taken too unless `ignore_host` is set, which is what requests
    /// sent through a proxy need: the signature must cover the API host,
    /// not the proxy's.
    pub fn url(&mut self, url: &str, ignore_host: bool) -> Result<&mut Self> {
        let uri: Uri = url.parse().map_err(|e| {
            Error::request_invalid(format!("failed to parse url {url}")).with_source(e)
        })?;

        if !ignore_host {
            let host = uri.host().ok_or_else(|| {
                Error::request_invalid(format!("url {url} without host is invalid for signing"))
            })?;
            let mut env = Environment::new(host);
            if let Some(scheme) = uri.scheme_str() {
                env = env.with_protocol(scheme);
            }
            if let Some(port) = uri.port_u16() {
                env = env.with_port(port);
            }
            self.host = env.host_with_port();
        }

        if let Some(query) = uri.query() {
            self.query.extend(
                form_urlencoded::parse(query.as_bytes())
                    .map(|(k, v)| (k.into_owned(), v.into_owned())),
            );
        }

        self.path = match uri.path() {
            "" => "/".to_string(),
            v => v.to_string(),
        };
        Ok(self)
    }

    /// Set the `Content-Type` header.
    pub fn content_type(&mut self, content_type: &str) -> Result<&mut Self> {
        self.headers
            .insert(CONTENT_TYPE, HeaderValue::from_str(content_type)?);
        Ok(self)
    }

    /// Add a header value.
    ///
    /// Names are case-insensitive. `Host` updates the signed host instead of
    /// being stored.
    pub fn header(&mut self, name: &str, value: &str) -> Result<&mut Self> {
        let name = HeaderName::from_bytes(name.as_bytes())?;
        if name == HOST {
            self.host = value.to_string();
            return Ok(self);
        }

        self.headers.append(name, HeaderValue::from_str(value)?);
        Ok(self)
    }

    /// Add several header values.
    pub fn headers<K, V>(&mut self, headers: impl IntoIterator<Item = (K, V)>) -> Result<&mut Self>
    where
        K: AsRef<str>,
        V: AsRef<str>,
    {
        for (k, v) in headers {
            self.header(k.as_ref(), v.as_ref())?;
        }
        Ok(self)
    }

    /// Add a query parameter value.
    pub fn query_param(&mut self, key: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.query.push((key.into(), value.into()));
        self
    }

    /// Add several query parameter values.
    pub fn query_params<K, V>(&mut self, params: impl IntoIterator<Item = (K, V)>) -> &mut Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.query
            .extend(params.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    /// Sign these headers in addition to the mandatory ones.
    pub fn signed_header_names<S: Into<String>>(
        &mut self,
        names: impl IntoIterator<Item = S>,
    ) -> &mut Self {
        self.signed_header_names = names.into_iter().map(Into::into).collect();
        self
    }

    /// Set the SHA-256 digest of the request body.
    pub fn content_sha256(&mut self, digest: impl Into<Vec<u8>>) -> &mut Self {
        self.content_digest = Some(digest.into());
        self
    }

    /// Digest `body` and set it as the content digest.
    ///
    /// The `Digest: sha-256=<base64>` header is set at the same time: the
    /// digest is signed through the canonical request and must also be
    /// sent for the service to verify it.
    pub fn compute_content_digest(&mut self, body: &[u8]) -> &mut Self {
        let digest = sha256(body);
        let value = format!("sha-256={}", base64_encode(&digest));
        self.headers.insert(
            DIGEST,
            HeaderValue::from_str(&value).expect("base64 digest must be a valid header value"),
        );
        self.content_sha256(digest)
    }

    /// Headers configured so far, including `X-SN-Date` and `Digest` when set.
    pub fn header_map(&self) -> &HeaderMap {
        &self.headers
    }

    /// The sorted lower-cased names of the headers that will be signed.
    pub fn canonical_header_names(&self) -> Vec<String> {
        canonical_header_names(&self.headers, &self.signed_header_names, self.use_sn_date())
    }

    /// Build the canonical request string for the current state.
    pub fn build_canonical_request_data(&self) -> String {
        self.compute_canonical_request_data(&self.canonical_header_names())
    }

    /// Build the canonical request string signing `header_names`, which
    /// must be sorted and lower-cased.
    pub fn compute_canonical_request_data(&self, header_names: &[String]) -> String {
        // 256 is specially chosen to avoid reallocation for most requests.
        let mut s = String::with_capacity(256);

        s.push_str(self.method.as_str());
        s.push('\n');
        s.push_str(&self.path);
        s.push('\n');
        s.push_str(&canonical_query_string(&self.query));
        s.push('\n');
        for name in header_names {
            s.push_str(name);
            s.push(':');
            s.push_str(self.canonical_header_value(name).trim());
            s.push('\n');
        }
        s.push_str(&header_names.join(";"));
        s.push('\n');
        match &self.content_digest {
            Some(digest) => s.push_str(&hex::encode(digest)),
            None => s.push_str(EMPTY_STRING_SHA256_HEX),
        }

        s
    }

    fn canonical_header_value(&self, name: &str) -> String {
        // The date is never taken from the headers: only the live request
        // date may be signed.
        if name == DATE.as_str() || name == X_SN_DATE {
            return self.request_date_header_value();
        }
        if name == HOST.as_str() {
            return self.host.clone();
        }
        self.headers
            .get(name)
            .map(|v| String::from_utf8_lossy(v.as_bytes()).to_string())
            .unwrap_or_default()
    }

    /// Build the data to sign from a canonical request string.
    ///
    /// ```text
    /// SNWS2-HMAC-SHA256
    /// 20170425T143000Z
    /// <hex(sha256(canonical_request))>
    /// ```
    pub fn compute_signature_data(&self, canonical_request: &str) -> String {
        format!(
            "{SNWS2_ALGORITHM}\n{}\n{}",
            format_iso8601(self.request_date),
            hex_sha256(canonical_request.as_bytes())
        )
    }

    /// Derive the signing key of `secret` for the request date.
    pub fn compute_signing_key(&self, secret: &str) -> Vec<u8> {
        derive_signing_key(secret, self.request_date)
    }

    /// Derive and save the signing key of `secret` for the request date.
    pub fn save_signing_key(&mut self, secret: &str) -> &mut Self {
        self.signing_key = Some(SigningKey::derive(secret, self.request_date));
        self
    }

    /// Save an externally obtained signing key derived for `date`.
    pub fn set_signing_key(&mut self, key: impl Into<Vec<u8>>, date: DateTime) -> &mut Self {
        self.signing_key = Some(SigningKey::new(key, date));
        self
    }

    /// The saved signing key, if any.
    pub fn signing_key(&self) -> Option<&SigningKey> {
        self.signing_key.as_ref()
    }

    /// Expiration of the saved signing key, if any.
    pub fn signing_key_expiration(&self) -> Option<DateTime> {
        self.signing_key.as_ref().map(SigningKey::expiration)
    }

    /// Whether a saved signing key exists and has not expired.
    pub fn signing_key_valid(&self) -> bool {
        self.signing_key.as_ref().is_some_and(SigningKey::is_valid)
    }

    /// Build the `Authorization` header value with `secret`.
    pub fn build(&self, secret: &str) -> String {
        self.build_with_key(&self.compute_signing_key(secret))
    }

    /// Build the `Authorization` header value with the saved signing key.
    ///
    /// Fails when no key was saved. An expired key is still used: the
    /// service decides whether it accepts it.
    pub fn build_with_saved_key(&self) -> Result<String> {
        let key = self
            .signing_key
            .as_ref()
            .ok_or_else(|| Error::signing_key_missing("no saved signing key"))?;
        Ok(self.build_with_key(key.as_bytes()))
    }

    /// Build the `Authorization` header value with a signing key.
    ///
    /// The key is not saved.
    pub fn build_with_key(&self, signing_key: &[u8]) -> String {
        let header_names = self.canonical_header_names();
        let canonical_request = self.compute_canonical_request_data(&header_names);
        debug!("calculated canonical request: {canonical_request}");

        let signature_data = self.compute_signature_data(&canonical_request);
        debug!("calculated signature data: {signature_data}");

        let signature = hex_hmac_sha256(signing_key, signature_data.as_bytes());

        format!(
            "{SNWS2} Credential={},SignedHeaders={},Signature={signature}",
            self.token_id,
            header_names.join(";"),
        )
    }
}

fn http_date_value(value: &str) -> HeaderValue {
    HeaderValue::from_str(value).expect("http date must be a valid header value")
}
