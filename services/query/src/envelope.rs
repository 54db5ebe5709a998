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

use serde::Deserialize;

/// The JSON envelope of every SolarNetwork API response.
///
/// ```json
/// { "success": true, "message": null, "data": { ... } }
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Response<D> {
    /// Whether the request succeeded.
    #[serde(default)]
    pub success: bool,
    /// Error message when `success` is false.
    #[serde(default)]
    pub message: Option<String>,
    /// Response data.
    #[serde(default = "Option::default")]
    pub data: Option<D>,
}

/// One page of query results.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageData<T> {
    /// Total number of results, when the service counted them.
    #[serde(default)]
    pub total_results: Option<usize>,
    /// Offset of the first result of this page.
    #[serde(default)]
    pub starting_offset: usize,
    /// Number of results in this page.
    #[serde(default)]
    pub returned_result_count: usize,
    /// The results.
    #[serde(default = "Vec::new")]
    pub results: Vec<T>,
}
