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

//! Canonical request pieces for SNWS2.

use crate::constants::{CONTENT_MD5, DIGEST, SNWS2_QUERY_ENCODE_SET, X_SN_DATE};
use http::header::{CONTENT_TYPE, DATE, HOST};
use http::HeaderMap;
use percent_encoding::utf8_percent_encode;
use std::collections::BTreeSet;

/// Percent encode a query key or value with the strict SNWS2 encoder.
pub fn encode_component(s: &str) -> String {
    utf8_percent_encode(s, &SNWS2_QUERY_ENCODE_SET).to_string()
}

/// Build the canonical query string.
///
/// Pairs are sorted by key then value in byte order, so the result never
/// depends on insertion order. Every value of a multi-valued key yields its
/// own `key=value` pair.
///
/// ```text
/// [(b, 2), (a, 1), (b, 1)] => "a=1&b=1&b=2"
/// ```
pub fn canonical_query_string(query: &[(String, String)]) -> String {
    let mut pairs: Vec<&(String, String)> = query.iter().collect();
    pairs.sort();

    let mut s = String::with_capacity(16);
    for (idx, (k, v)) in pairs.into_iter().enumerate() {
        if idx != 0 {
            s.push('&');
        }
        s.push_str(&encode_component(k));
        s.push('=');
        s.push_str(&encode_component(v));
    }
    s
}

/// Compute the sorted, lower-cased names of the headers to sign.
///
/// `host` is always signed, as is exactly one of `date` or `x-sn-date`.
/// `content-md5`, `content-type` and `digest` are signed when present, and
/// `extra` names are always added, except for the date header not in use.
pub fn canonical_header_names(
    headers: &HeaderMap,
    extra: &[String],
    use_sn_date: bool,
) -> Vec<String> {
    let (date, unused_date) = if use_sn_date {
        (X_SN_DATE, DATE.as_str())
    } else {
        (DATE.as_str(), X_SN_DATE)
    };

    let mut names = BTreeSet::new();
    names.insert(HOST.as_str().to_string());
    names.insert(date.to_string());
    for name in [CONTENT_MD5, CONTENT_TYPE.as_str(), DIGEST] {
        if headers.contains_key(name) {
            names.insert(name.to_string());
        }
    }
    for name in extra {
        let name = name.to_lowercase();
        if name != unused_date {
            names.insert(name);
        }
    }

    names.into_iter().collect()
}
