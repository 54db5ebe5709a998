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

use crate::constants::{SIGNING_KEY_VALIDITY_DAYS, SNWS2, SNWS2_REQUEST};
use solarnet_core::hash::hmac_sha256;
use solarnet_core::time::{format_date, now, start_of_day, DateTime};
use std::fmt::{Debug, Formatter};

/// Derive the SNWS2 signing key for `secret` on the UTC calendar day of `date`.
///
/// ```text
/// HMAC-SHA256(HMAC-SHA256("SNWS2" + secret, "YYYYMMDD"), "snws2_request")
/// ```
///
/// Only the date participates, so every time of the same day yields the
/// same key.
pub fn derive_signing_key(secret: &str, date: DateTime) -> Vec<u8> {
    let secret = format!("{SNWS2}{secret}");
    let sign_date = hmac_sha256(secret.as_bytes(), format_date(date).as_bytes());
    hmac_sha256(&sign_date, SNWS2_REQUEST.as_bytes())
}

/// A derived signing key together with its expiration.
#[derive(Clone, PartialEq, Eq)]
pub struct SigningKey {
    key: Vec<u8>,
    expiration: DateTime,
}

impl SigningKey {
    /// Wrap an already derived key.
    ///
    /// The key expires 7 days after `date` truncated to UTC midnight, or at
    /// the latest representable time.
    pub fn new(key: impl Into<Vec<u8>>, date: DateTime) -> Self {
        let expiration = start_of_day(date)
            .checked_add_signed(chrono::TimeDelta::days(SIGNING_KEY_VALIDITY_DAYS))
            .unwrap_or(DateTime::MAX_UTC);
        Self {
            key: key.into(),
            expiration,
        }
    }

    /// Derive a key from `secret` for `date`.
    pub fn derive(secret: &str, date: DateTime) -> Self {
        Self::new(derive_signing_key(secret, date), date)
    }

    /// The raw key bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.key
    }

    /// When this key stops being valid.
    pub fn expiration(&self) -> DateTime {
        self.expiration
    }

    /// Whether the key is still valid now.
    pub fn is_valid(&self) -> bool {
        self.is_valid_at(now())
    }

    /// Whether the key is still valid at `time`.
    pub fn is_valid_at(&self, time: DateTime) -> bool {
        time < self.expiration
    }
}

impl Debug for SigningKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SigningKey")
            .field("key", &"***")
            .field("expiration", &self.expiration)
            .finish()
    }
}
