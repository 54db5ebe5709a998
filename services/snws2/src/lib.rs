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

//! SolarNetwork SNWS2 signing implementation.
//!
//! This crate computes the `Authorization` header values SolarNetwork
//! expects for token authenticated requests.
//!
//! ## Overview
//!
//! An SNWS2 signature is an HMAC-SHA256 over a canonical form of the request:
//! method, path, sorted query parameters, a fixed set of headers and the
//! SHA-256 of the body. The HMAC key is derived from the token secret and the
//! request date, and stays valid for 7 days, so it can be derived once and
//! saved instead of keeping the secret around.
//!
//! There are two ways to use it:
//!
//! - [`AuthorizationBuilder`] for full control over what is signed, with a
//!   saved signing key reused across requests.
//! - [`RequestSigner`] with a credential provider, driven by
//!   `solarnet_core::Signer`, to sign `http` requests directly.
//!
//! ## Example
//!
//! ```no_run
//! use solarnet_core::{Context, Result, Signer};
//! use solarnet_snws2::{DefaultCredentialProvider, RequestSigner};
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     // Reads SOLARNETWORK_TOKEN_ID and SOLARNETWORK_TOKEN_SECRET.
//!     let signer = Signer::new(
//!         Context::new(),
//!         DefaultCredentialProvider::new(),
//!         RequestSigner::new(),
//!     );
//!
//!     let mut req = http::Request::get(
//!         "https://data.solarnetwork.net/solarquery/api/v1/sec/datum/list?nodeIds=1",
//!     )
//!     .body(())
//!     .unwrap()
//!     .into_parts()
//!     .0;
//!
//!     signer.sign(&mut req).await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Credential Sources
//!
//! ```bash
//! export SOLARNETWORK_TOKEN_ID=your-token-id
//! export SOLARNETWORK_TOKEN_SECRET=your-token-secret
//! export SOLARNETWORK_HOST=data.solarnetwork.net  # Optional
//! ```

// Make sure all our public APIs have docs.
#![warn(missing_docs)]

mod constants;
pub use constants::{
    SOLARNETWORK_HOST, SOLARNETWORK_TOKEN_ID, SOLARNETWORK_TOKEN_SECRET, X_SN_DATE,
};

mod canonical;
pub use canonical::canonical_query_string;
pub use canonical::encode_component;

mod key;
pub use key::derive_signing_key;
pub use key::SigningKey;

mod builder;
pub use builder::AuthorizationBuilder;

mod config;
pub use config::Config;

mod credential;
pub use credential::Credential;

mod provide_credential;
pub use provide_credential::*;

mod sign_request;
pub use sign_request::RequestSigner;
