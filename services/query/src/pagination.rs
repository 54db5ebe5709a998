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

/// Result window of a query.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Pagination {
    /// Maximum number of results. `0` leaves it to the service.
    pub max: usize,
    /// Offset of the first result.
    pub offset: usize,
    /// Ask the service to skip counting the total number of results.
    pub without_total_results_count: bool,
}

impl Pagination {
    /// Create a window of `max` results starting at `offset`.
    pub fn new(max: usize, offset: usize) -> Self {
        Self {
            max,
            offset,
            without_total_results_count: false,
        }
    }

    /// Skip counting the total number of results.
    pub fn with_without_total_results_count(mut self, v: bool) -> Self {
        self.without_total_results_count = v;
        self
    }

    /// Encode as query parameters.
    ///
    /// A zero offset is left out.
    pub fn to_uri_encoding(&self) -> String {
        let mut params = Vec::with_capacity(3);
        if self.max > 0 {
            params.push(format!("max={}", self.max));
        }
        if self.offset > 0 {
            params.push(format!("offset={}", self.offset));
        }
        if self.without_total_results_count {
            params.push("withoutTotalResultsCount=true".to_string());
        }
        params.join("&")
    }
}
