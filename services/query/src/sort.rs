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

use crate::constants::encode_uri_component;

/// A sort key for query results.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortDescriptor {
    key: String,
    descending: bool,
}

impl SortDescriptor {
    /// Sort ascending by `key`.
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            descending: false,
        }
    }

    /// Sort descending by `key`.
    pub fn descending(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            descending: true,
        }
    }

    /// The sort key.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Whether the order is descending.
    pub fn is_descending(&self) -> bool {
        self.descending
    }

    /// Encode as the query parameters of the sort at `index`.
    ///
    /// ```
    /// use solarnet_query::SortDescriptor;
    ///
    /// assert_eq!(
    ///     SortDescriptor::descending("created").to_uri_encoding(1),
    ///     "sorts%5B1%5D.sortKey=created&sorts%5B1%5D.descending=true"
    /// );
    /// ```
    pub fn to_uri_encoding(&self, index: usize) -> String {
        let mut s = format!(
            "sorts%5B{index}%5D.sortKey={}",
            encode_uri_component(&self.key)
        );
        if self.descending {
            s.push_str(&format!("&sorts%5B{index}%5D.descending=true"));
        }
        s
    }
}

/// Encode a list of sorts, indexed from zero.
pub(crate) fn sorts_to_uri_encoding(sorts: &[SortDescriptor]) -> String {
    sorts
        .iter()
        .enumerate()
        .map(|(i, v)| v.to_uri_encoding(i))
        .collect::<Vec<_>>()
        .join("&")
}
