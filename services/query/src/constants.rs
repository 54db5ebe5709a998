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

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC};

/// Env value of the datum loader pagination size.
pub const SOLARNETWORK_PAGINATION_SIZE: &str = "SOLARNETWORK_PAGINATION_SIZE";
/// Env value of the datum loader concurrency.
pub const SOLARNETWORK_CONCURRENCY: &str = "SOLARNETWORK_CONCURRENCY";
/// Env value of the datum loader proxy url.
pub const SOLARNETWORK_PROXY_URL: &str = "SOLARNETWORK_PROXY_URL";

pub const DEFAULT_PAGINATION_SIZE: usize = 1000;

pub const SOLARQUERY_PATH: &str = "/solarquery/api/v1";

pub const MISSING_DATA_MESSAGE: &str =
    "One or more requests did not return a result, but no error was reported.";

/// AsciiSet for query parameter values in generated URLs.
///
/// Same as `encodeURIComponent`: `- _ . ! ~ * ' ( )` stay unescaped.
pub static URI_COMPONENT_ENCODE_SET: AsciiSet = NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

pub fn encode_uri_component(s: &str) -> String {
    percent_encoding::utf8_percent_encode(s, &URI_COMPONENT_ENCODE_SET).to_string()
}
