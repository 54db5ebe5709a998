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
use crate::sort::sorts_to_uri_encoding;
use crate::{Aggregation, Pagination, SortDescriptor};
use chrono::NaiveDateTime;
use solarnet_core::time::{format_naive_url_date, format_url_date, DateTime};

/// Criteria of a datum query.
///
/// A plain value: the datum loader keeps its own copy, and page windows are
/// passed separately as a [`Pagination`], so a filter is never modified by
/// the queries it is used for.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DatumFilter {
    /// Node ids to match.
    pub node_ids: Vec<u64>,
    /// Source ids to match, wildcards allowed.
    pub source_ids: Vec<String>,
    /// User ids to match.
    pub user_ids: Vec<u64>,
    /// Aggregation of results.
    pub aggregation: Option<Aggregation>,
    /// Inclusive start date.
    pub start_date: Option<DateTime>,
    /// Exclusive end date.
    pub end_date: Option<DateTime>,
    /// Inclusive start date, in each node's local time zone.
    pub local_start_date: Option<NaiveDateTime>,
    /// Exclusive end date, in each node's local time zone.
    pub local_end_date: Option<NaiveDateTime>,
    /// Path into the datum sample to return.
    pub data_path: Option<String>,
    /// Only return the most recent datum of each source.
    pub most_recent: bool,
    /// Ask the service to skip counting the total number of results.
    pub without_total_results_count: bool,
}

impl DatumFilter {
    /// Create an empty filter.
    pub fn new() -> Self {
        Self::default()
    }

    /// Match a single node.
    pub fn with_node_id(mut self, node_id: u64) -> Self {
        self.node_ids = vec![node_id];
        self
    }

    /// Match these nodes.
    pub fn with_node_ids(mut self, node_ids: impl IntoIterator<Item = u64>) -> Self {
        self.node_ids = node_ids.into_iter().collect();
        self
    }

    /// Match a single source.
    pub fn with_source_id(mut self, source_id: impl Into<String>) -> Self {
        self.source_ids = vec![source_id.into()];
        self
    }

    /// Match these sources.
    pub fn with_source_ids<S: Into<String>>(
        mut self,
        source_ids: impl IntoIterator<Item = S>,
    ) -> Self {
        self.source_ids = source_ids.into_iter().map(Into::into).collect();
        self
    }

    /// Match these users.
    pub fn with_user_ids(mut self, user_ids: impl IntoIterator<Item = u64>) -> Self {
        self.user_ids = user_ids.into_iter().collect();
        self
    }

    /// Aggregate results.
    pub fn with_aggregation(mut self, aggregation: Aggregation) -> Self {
        self.aggregation = Some(aggregation);
        self
    }

    /// Set the start date.
    pub fn with_start_date(mut self, date: DateTime) -> Self {
        self.start_date = Some(date);
        self
    }

    /// Set the end date.
    pub fn with_end_date(mut self, date: DateTime) -> Self {
        self.end_date = Some(date);
        self
    }

    /// Set the local start date.
    pub fn with_local_start_date(mut self, date: NaiveDateTime) -> Self {
        self.local_start_date = Some(date);
        self
    }

    /// Set the local end date.
    pub fn with_local_end_date(mut self, date: NaiveDateTime) -> Self {
        self.local_end_date = Some(date);
        self
    }

    /// Set the data path.
    pub fn with_data_path(mut self, path: impl Into<String>) -> Self {
        self.data_path = Some(path.into());
        self
    }

    /// Only return the most recent datum of each source.
    pub fn with_most_recent(mut self, v: bool) -> Self {
        self.most_recent = v;
        self
    }

    /// Skip counting the total number of results.
    pub fn with_without_total_results_count(mut self, v: bool) -> Self {
        self.without_total_results_count = v;
        self
    }

    /// The node id, when the filter matches exactly one node.
    pub fn node_id(&self) -> Option<u64> {
        match self.node_ids.as_slice() {
            [id] => Some(*id),
            _ => None,
        }
    }

    /// Encode as query parameters.
    pub fn to_uri_encoding(&self) -> String {
        self.to_uri_encoding_with_sorting(&[], None)
    }

    /// Encode as query parameters, followed by sorts and a pagination window.
    ///
    /// Parameters always come in the same order, empty ones left out:
    /// `nodeIds`, `sourceIds`, `userIds`, `aggregation`, `startDate`,
    /// `endDate`, `localStartDate`, `localEndDate`, `dataPath`, `mostRecent`,
    /// `withoutTotalResultsCount`, sorts, pagination.
    pub fn to_uri_encoding_with_sorting(
        &self,
        sorts: &[SortDescriptor],
        pagination: Option<&Pagination>,
    ) -> String {
        let mut params: Vec<String> = Vec::new();
        let mut push = |key: &str, value: &str| {
            params.push(format!("{key}={}", encode_uri_component(value)));
        };

        if !self.node_ids.is_empty() {
            push("nodeIds", &join(&self.node_ids));
        }
        if !self.source_ids.is_empty() {
            push("sourceIds", &self.source_ids.join(","));
        }
        if !self.user_ids.is_empty() {
            push("userIds", &join(&self.user_ids));
        }
        if let Some(v) = self.aggregation {
            push("aggregation", v.name());
        }
        if let Some(v) = self.start_date {
            push("startDate", &format_url_date(v));
        }
        if let Some(v) = self.end_date {
            push("endDate", &format_url_date(v));
        }
        if let Some(v) = &self.local_start_date {
            push("localStartDate", &format_naive_url_date(v));
        }
        if let Some(v) = &self.local_end_date {
            push("localEndDate", &format_naive_url_date(v));
        }
        if let Some(v) = &self.data_path {
            push("dataPath", v);
        }
        if self.most_recent {
            push("mostRecent", "true");
        }
        if self.without_total_results_count {
            push("withoutTotalResultsCount", "true");
        }

        let sorts = sorts_to_uri_encoding(sorts);
        if !sorts.is_empty() {
            params.push(sorts);
        }
        if let Some(p) = pagination {
            let p = p.to_uri_encoding();
            if !p.is_empty() {
                params.push(p);
            }
        }

        params.join("&")
    }
}

fn join(ids: &[u64]) -> String {
    ids.iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join(",")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone, Utc};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_to_uri_encoding() {
        let filter = DatumFilter::new()
            .with_node_ids([1, 2])
            .with_source_ids(["/A/1", "/B/*"])
            .with_aggregation(Aggregation::Hour)
            .with_start_date(Utc.with_ymd_and_hms(2017, 1, 1, 12, 30, 0).unwrap())
            .with_end_date(Utc.with_ymd_and_hms(2017, 2, 1, 0, 0, 0).unwrap())
            .with_most_recent(true);

        assert_eq!(
            filter.to_uri_encoding(),
            "nodeIds=1%2C2&sourceIds=%2FA%2F1%2C%2FB%2F*&aggregation=Hour\
             &startDate=2017-01-01T12%3A30&endDate=2017-02-01T00%3A00&mostRecent=true"
        );
    }

    #[test]
    fn test_local_dates_and_data_path() {
        let local = NaiveDate::from_ymd_opt(2017, 1, 1)
            .unwrap()
            .and_hms_opt(6, 0, 0)
            .unwrap();
        let filter = DatumFilter::new()
            .with_user_ids([3])
            .with_local_start_date(local)
            .with_local_end_date(local + chrono::TimeDelta::try_hours(1).unwrap())
            .with_data_path("i.watts");

        assert_eq!(
            filter.to_uri_encoding(),
            "userIds=3&localStartDate=2017-01-01T06%3A00&localEndDate=2017-01-01T07%3A00&dataPath=i.watts"
        );
    }

    #[test]
    fn test_with_sorting_and_pagination() {
        let filter = DatumFilter::new()
            .with_node_id(1)
            .with_without_total_results_count(true);
        let sorts = [SortDescriptor::new("created")];
        let pagination = Pagination::new(100, 200);

        assert_eq!(
            filter.to_uri_encoding_with_sorting(&sorts, Some(&pagination)),
            "nodeIds=1&withoutTotalResultsCount=true&sorts%5B0%5D.sortKey=created&max=100&offset=200"
        );
    }

    #[test]
    fn test_empty() {
        assert_eq!(DatumFilter::new().to_uri_encoding(), "");
    }

    #[test]
    fn test_node_id() {
        assert_eq!(DatumFilter::new().node_id(), None);
        assert_eq!(DatumFilter::new().with_node_id(7).node_id(), Some(7));
        assert_eq!(DatumFilter::new().with_node_ids([1, 2]).node_id(), None);
    }
}
