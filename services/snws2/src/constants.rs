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

use percent_encoding::AsciiSet;
use percent_encoding::NON_ALPHANUMERIC;

// Authorization scheme.
pub const SNWS2: &str = "SNWS2";
pub const SNWS2_ALGORITHM: &str = "SNWS2-HMAC-SHA256";
pub const SNWS2_REQUEST: &str = "snws2_request";

// Headers used by SNWS2, lower-cased as they appear in canonical requests.
/// Header carrying the request date in place of `Date`.
pub const X_SN_DATE: &str = "x-sn-date";
pub const DIGEST: &str = "digest";
pub const CONTENT_MD5: &str = "content-md5";

// Signing keys stay valid for this many days after their date.
pub const SIGNING_KEY_VALIDITY_DAYS: i64 = 7;

/// Env value of the security token id.
pub const SOLARNETWORK_TOKEN_ID: &str = "SOLARNETWORK_TOKEN_ID";
/// Env value of the security token secret.
pub const SOLARNETWORK_TOKEN_SECRET: &str = "SOLARNETWORK_TOKEN_SECRET";
/// Env value of the API host.
pub const SOLARNETWORK_HOST: &str = "SOLARNETWORK_HOST";

/// AsciiSet for canonical query parameters.
///
/// Every byte except the unreserved characters `A-Z a-z 0-9 - . _ ~` is
/// escaped, which is stricter than `encodeURIComponent` style encoding
/// because `! ' ( ) *` are escaped as well.
pub static SNWS2_QUERY_ENCODE_SET: AsciiSet = NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');
