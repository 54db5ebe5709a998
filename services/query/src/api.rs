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

use crate::constants::{encode_uri_component, SOLARQUERY_PATH};
use crate::{DatumFilter, DatumReadingType, Pagination, SortDescriptor};
use solarnet_core::{Environment, Error, Result};

/// SolarQueryApi builds SolarQuery URLs for an [`Environment`].
///
/// ```
/// use solarnet_core::Environment;
/// use solarnet_query::{DatumFilter, SolarQueryApi};
///
/// let api = SolarQueryApi::new(Environment::default());
/// assert_eq!(
///     api.list_datum_url(&DatumFilter::new().with_node_id(1), &[], None),
///     "https://data.solarnetwork.net/solarquery/api/v1/sec/datum/list?nodeIds=1"
/// );
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SolarQueryApi {
    environment: Environment,
    public: bool,
    node_id: Option<u64>,
}

impl SolarQueryApi {
    /// Create URLs for the secured API of `environment`.
    pub fn new(environment: Environment) -> Self {
        Self {
            environment,
            public: false,
            node_id: None,
        }
    }

    /// Use the public, unauthenticated API instead of the secured one.
    pub fn with_public(mut self, public: bool) -> Self {
        self.public = public;
        self
    }

    /// Default node id for node specific URLs.
    pub fn with_node_id(mut self, node_id: u64) -> Self {
        self.node_id = Some(node_id);
        self
    }

    /// The environment URLs are built for.
    pub fn environment(&self) -> &Environment {
        &self.environment
    }

    /// Whether URLs target the public API.
    pub fn is_public(&self) -> bool {
        self.public
    }

    /// The base URL of every query endpoint, for example
    /// `https://data.solarnetwork.net/solarquery/api/v1/sec`.
    pub fn base_url(&self) -> String {
        format!(
            "{}{SOLARQUERY_PATH}/{}",
            self.environment.origin(),
            if self.public { "pub" } else { "sec" }
        )
    }

    /// URL listing datum matching `filter`.
    pub fn list_datum_url(
        &self,
        filter: &DatumFilter,
        sorts: &[SortDescriptor],
        pagination: Option<&Pagination>,
    ) -> String {
        self.url_with_query(
            "/datum/list",
            None,
            &filter.to_uri_encoding_with_sorting(sorts, pagination),
        )
    }

    /// URL of datum readings matching `filter`.
    pub fn datum_reading_url(
        &self,
        reading_type: DatumReadingType,
        filter: &DatumFilter,
        sorts: &[SortDescriptor],
        pagination: Option<&Pagination>,
    ) -> String {
        self.url_with_query(
            "/datum/reading",
            Some(format!("readingType={}", reading_type.name())),
            &filter.to_uri_encoding_with_sorting(sorts, pagination),
        )
    }

    /// URL of the most recent datum matching `filter`.
    pub fn most_recent_datum_url(
        &self,
        filter: &DatumFilter,
        sorts: &[SortDescriptor],
        pagination: Option<&Pagination>,
    ) -> String {
        self.url_with_query(
            "/datum/mostRecent",
            None,
            &filter.to_uri_encoding_with_sorting(sorts, pagination),
        )
    }

    /// URL of the date range of the data of a node.
    ///
    /// `node_id` falls back to the default node id. Fails with
    /// "No node ID available." when neither is set.
    pub fn reportable_interval_url(
        &self,
        node_id: Option<u64>,
        source_ids: &[String],
    ) -> Result<String> {
        let node_id = node_id
            .or(self.node_id)
            .ok_or_else(|| Error::config_invalid("No node ID available."))?;

        let mut query = format!("nodeId={node_id}");
        if !source_ids.is_empty() {
            query.push_str("&sourceIds=");
            query.push_str(&encode_uri_component(&source_ids.join(",")));
        }
        Ok(self.url_with_query("/range/interval", None, &query))
    }

    fn url_with_query(&self, path: &str, first: Option<String>, query: &str) -> String {
        let mut url = self.base_url();
        url.push_str(path);

        let mut sep = '?';
        for part in first.iter().map(String::as_str).chain([query]) {
            if part.is_empty() {
                continue;
            }
            url.push(sep);
            url.push_str(part);
            sep = '&';
        }
        url
    }
}
