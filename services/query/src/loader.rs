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

use crate::constants::{encode_uri_component, DEFAULT_PAGINATION_SIZE, MISSING_DATA_MESSAGE};
use crate::envelope::{PageData, Response};
use crate::{Config, DatumFilter, DatumReadingType, Pagination, SolarQueryApi};
use bytes::Bytes;
use futures::stream::{self, StreamExt};
use http::header::{ACCEPT, AUTHORIZATION};
use http::Request;
use log::{debug, warn};
use serde::de::DeserializeOwned;
use solarnet_core::{Context, Error, Result};
use solarnet_snws2::{AuthorizationBuilder, X_SN_DATE};
use std::collections::BTreeMap;
use std::fmt::{Debug, Formatter};

/// Callback receiving loaded results.
///
/// Called with the cumulative results loaded so far and whether loading is
/// done, or with the error that ended loading.
pub type LoadCallback<T> = Box<dyn for<'a> FnMut(Result<&'a [T]>, bool) + Send>;

/// Lifecycle of a [`DatumLoader`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoaderState {
    /// Not started yet; configuration is accepted.
    Ready,
    /// Loading, or stopped by an error.
    Loading,
    /// All results loaded.
    Done,
}

/// DatumLoader loads every datum matching a filter, page by page.
///
/// When the total result count is requested, the first page tells how many
/// pages remain and those are fetched concurrently. Otherwise pages are
/// fetched one after another until a page comes back short. Either way the
/// results are returned in page offset order.
///
/// ```no_run
/// use serde_json::Value;
/// use solarnet_core::{Context, Environment, Result};
/// use solarnet_query::{DatumFilter, DatumLoader, SolarQueryApi};
///
/// # async fn example(ctx: Context) -> Result<()> {
/// let api = SolarQueryApi::new(Environment::default()).with_public(true);
/// let filter = DatumFilter::new().with_node_id(1).with_source_id("/power/1");
///
/// let mut loader: DatumLoader<Value> = DatumLoader::new(ctx, api, filter)
///     .with_include_total_results_count(true)
///     .with_concurrency(4);
/// let datum = loader.fetch().await?;
/// # Ok(())
/// # }
/// ```
pub struct DatumLoader<T = serde_json::Value> {
    pager: Pager,
    state: LoaderState,
    incremental: bool,
    callback: Option<LoadCallback<T>>,
}

impl<T> Debug for DatumLoader<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DatumLoader")
            .field("pager", &self.pager)
            .field("state", &self.state)
            .field("incremental", &self.incremental)
            .field("callback", &self.callback.is_some())
            .finish()
    }
}

/// Everything page requests need, shared by concurrent page futures.
#[derive(Debug, Clone)]
struct Pager {
    ctx: Context,
    api: SolarQueryApi,
    filter: DatumFilter,
    authorization: Option<AuthorizationBuilder>,
    pagination_size: usize,
    concurrency: usize,
    include_total_results_count: bool,
    readings: bool,
    proxy_url: Option<String>,
    parameters: Vec<(String, String)>,
}

impl<T: DeserializeOwned + Send> DatumLoader<T> {
    /// Create a loader of the datum matching `filter`.
    pub fn new(ctx: Context, api: SolarQueryApi, mut filter: DatumFilter) -> Self {
        // Each page decides whether totals are counted.
        filter.without_total_results_count = false;

        Self {
            pager: Pager {
                ctx,
                api,
                filter,
                authorization: None,
                pagination_size: DEFAULT_PAGINATION_SIZE,
                concurrency: 0,
                include_total_results_count: false,
                readings: false,
                proxy_url: None,
                parameters: Vec::new(),
            },
            state: LoaderState::Ready,
            incremental: false,
            callback: None,
        }
    }

    /// The current state.
    pub fn state(&self) -> LoaderState {
        self.state
    }

    fn configurable(&self, what: &str) -> bool {
        if self.state != LoaderState::Ready {
            warn!("loader is {:?}, ignoring {what}", self.state);
            return false;
        }
        true
    }

    /// Sign page requests with this builder.
    ///
    /// The builder must hold a saved signing key: pages are requested
    /// unsigned when it has none, or an expired one.
    pub fn with_authorization(mut self, builder: AuthorizationBuilder) -> Self {
        if self.configurable("authorization") {
            self.pager.authorization = Some(builder);
        }
        self
    }

    /// Set the number of results per page.
    ///
    /// Defaults to 1000, which is also used for any value below 1.
    pub fn with_pagination_size(mut self, size: i64) -> Self {
        if self.configurable("pagination size") {
            self.pager.pagination_size = match usize::try_from(size) {
                Ok(v) if v > 0 => v,
                _ => DEFAULT_PAGINATION_SIZE,
            };
        }
        self
    }

    /// The number of results per page.
    pub fn pagination_size(&self) -> usize {
        self.pager.pagination_size
    }

    /// Bound the number of pages requested at the same time.
    ///
    /// `0`, the default, leaves it unbounded.
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        if self.configurable("concurrency") {
            self.pager.concurrency = concurrency;
        }
        self
    }

    /// The maximum number of pages requested at the same time, `0` if unbounded.
    pub fn concurrency(&self) -> usize {
        self.pager.concurrency
    }

    /// Deliver every page to the callback as soon as it and all the pages
    /// before it are loaded, instead of once at the end.
    pub fn with_incremental(mut self, incremental: bool) -> Self {
        if self.configurable("incremental") {
            self.incremental = incremental;
        }
        self
    }

    /// Ask for the total result count with the first page, so the remaining
    /// pages can be requested concurrently.
    pub fn with_include_total_results_count(mut self, include: bool) -> Self {
        if self.configurable("include total results count") {
            self.pager.include_total_results_count = include;
        }
        self
    }

    /// Load `Difference` readings instead of datum.
    pub fn with_readings(mut self, readings: bool) -> Self {
        if self.configurable("readings") {
            self.pager.readings = readings;
        }
        self
    }

    /// Send requests to `url` instead of the API origin.
    ///
    /// The scheme and authority of every page URL are replaced by `url`,
    /// which may carry a path prefix. Signatures still cover the API host
    /// and path.
    pub fn with_proxy_url(mut self, url: impl Into<String>) -> Self {
        if self.configurable("proxy url") {
            self.pager.proxy_url = Some(url.into());
        }
        self
    }

    /// Add these query parameters to every page request.
    pub fn with_parameters<K, V>(mut self, params: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        if self.configurable("parameters") {
            self.pager
                .parameters
                .extend(params.into_iter().map(|(k, v)| (k.into(), v.into())));
        }
        self
    }

    /// Set the callback used by [`load`](Self::load).
    pub fn with_callback(
        mut self,
        callback: impl for<'a> FnMut(Result<&'a [T]>, bool) + Send + 'static,
    ) -> Self {
        if self.configurable("callback") {
            self.callback = Some(Box::new(callback));
        }
        self
    }

    /// Apply `config`.
    ///
    /// Pagination size and concurrency values that do not parse fall back to
    /// their defaults.
    pub fn with_config(mut self, config: &Config) -> Self {
        if let Some(v) = &config.pagination_size {
            let size = v.trim().parse::<i64>().unwrap_or_else(|_| {
                warn!("invalid pagination size {v:?}, using default");
                0
            });
            self = self.with_pagination_size(size);
        }
        if let Some(v) = &config.concurrency {
            let concurrency = v.trim().parse::<usize>().unwrap_or_else(|_| {
                warn!("invalid concurrency {v:?}, using default");
                0
            });
            self = self.with_concurrency(concurrency);
        }
        if let Some(v) = &config.proxy_url {
            self = self.with_proxy_url(v.as_str());
        }
        self
    }

    /// Load all results.
    pub async fn fetch(&mut self) -> Result<Vec<T>> {
        self.state = LoaderState::Loading;
        let results = self.pager.run(|_: &[T], _| {}).await?;
        self.state = LoaderState::Done;
        Ok(results)
    }

    /// Load all results and deliver them to `callback`, or to the callback
    /// set with [`with_callback`](Self::with_callback).
    ///
    /// Fails with "No callback provided." before any request when there is
    /// no callback. Every other error goes to the callback, with `done` set.
    /// In incremental mode the callback may have received some pages
    /// before an error.
    pub async fn load(&mut self, callback: Option<LoadCallback<T>>) -> Result<()> {
        let Some(mut callback) = callback.or_else(|| self.callback.take()) else {
            return Err(Error::config_invalid("No callback provided."));
        };

        self.state = LoaderState::Loading;
        let incremental = self.incremental;
        let result = self
            .pager
            .run(|rows: &[T], done| {
                if incremental {
                    callback(Ok(rows), done);
                }
            })
            .await;

        match result {
            Ok(results) => {
                self.state = LoaderState::Done;
                if !incremental {
                    callback(Ok(&results), true);
                }
            }
            Err(err) => callback(Err(err), true),
        }
        Ok(())
    }
}

impl Pager {
    /// Load every page, calling `on_page` with the cumulative results each
    /// time the contiguous prefix of loaded pages grows.
    async fn run<T, F>(&self, mut on_page: F) -> Result<Vec<T>>
    where
        T: DeserializeOwned + Send,
        F: FnMut(&[T], bool),
    {
        let size = self.pagination_size;
        let first = self
            .fetch_page::<T>(0, self.include_total_results_count)
            .await?;
        let returned = first.returned_result_count;
        let total = first.total_results.filter(|_| self.include_total_results_count);
        let mut results = first.results;

        let Some(total) = total else {
            // Without a total, only a short page tells there is nothing left.
            let mut returned = returned;
            let mut offset = 0;
            on_page(&results, returned < size);
            while returned >= size {
                offset += size;
                let page = self.fetch_page::<T>(offset, false).await?;
                returned = page.returned_result_count;
                results.extend(page.results);
                on_page(&results, returned < size);
            }
            return Ok(results);
        };

        let remaining = total.saturating_sub(returned).div_ceil(size);
        debug!("loaded first page of {total} results, {remaining} pages remaining");
        on_page(&results, remaining == 0);
        if remaining == 0 {
            return Ok(results);
        }

        let limit = match self.concurrency {
            0 => remaining,
            v => v.min(remaining),
        };
        let mut pages = stream::iter(1..=remaining)
            .map(|i| async move { (i, self.fetch_page::<T>(i * size, false).await) })
            .buffer_unordered(limit);

        // Pages may complete in any order; park them until their
        // predecessors have been merged.
        let mut parked = BTreeMap::new();
        let mut next = 1;
        while let Some((i, page)) = pages.next().await {
            parked.insert(i, page?.results);
            while let Some(rows) = parked.remove(&next) {
                results.extend(rows);
                on_page(&results, next == remaining);
                next += 1;
            }
        }

        Ok(results)
    }

    /// The API URL of the page at `offset`, before any proxy is applied.
    fn page_url(&self, offset: usize, with_total: bool) -> String {
        let pagination = Pagination::new(self.pagination_size, offset)
            .with_without_total_results_count(!with_total);

        let mut url = if self.readings {
            self.api.datum_reading_url(
                DatumReadingType::Difference,
                &self.filter,
                &[],
                Some(&pagination),
            )
        } else {
            self.api
                .list_datum_url(&self.filter, &[], Some(&pagination))
        };

        for (k, v) in &self.parameters {
            url.push('&');
            url.push_str(&encode_uri_component(k));
            url.push('=');
            url.push_str(&encode_uri_component(v));
        }

        url
    }

    /// The URL a request for `url` is actually sent to.
    fn send_url(&self, url: &str) -> String {
        match &self.proxy_url {
            Some(proxy) => replace_origin(url, proxy),
            None => url.to_string(),
        }
    }

    /// Compute the `X-SN-Date` and `Authorization` values for the API `url`.
    fn authorize(&self, url: &str) -> Result<Option<(String, String)>> {
        let Some(builder) = &self.authorization else {
            return Ok(None);
        };
        if !builder.signing_key_valid() {
            warn!("no valid signing key, requesting {url} unsigned");
            return Ok(None);
        }

        let mut builder = builder.clone();
        builder.reset().sn_date(true).url(url, false)?;
        let authorization = builder.build_with_saved_key()?;
        Ok(Some((builder.request_date_header_value(), authorization)))
    }

    async fn fetch_page<T: DeserializeOwned>(
        &self,
        offset: usize,
        with_total: bool,
    ) -> Result<PageData<T>> {
        let api_url = self.page_url(offset, with_total);
        let url = self.send_url(&api_url);
        debug!("requesting page at offset {offset}: {url}");

        let mut req = Request::get(&url).header(ACCEPT, "application/json");
        if let Some((date, authorization)) = self.authorize(&api_url)? {
            req = req.header(X_SN_DATE, date).header(AUTHORIZATION, authorization);
        }
        let req = req.body(Bytes::new())?;

        let request_error = |reason: &str| {
            Error::response_invalid(format!("Error requesting data for {url}: {reason}"))
        };

        let resp = self
            .ctx
            .http_send(req)
            .await
            .map_err(|e| request_error(e.message()).with_source(e))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(request_error(
                status.canonical_reason().unwrap_or(status.as_str()),
            ));
        }

        let resp: Response<PageData<T>> = serde_json::from_slice(resp.body())
            .map_err(|e| request_error(&e.to_string()).with_source(e))?;
        if !resp.success {
            return Err(request_error(
                resp.message.as_deref().unwrap_or("unknown error"),
            ));
        }

        let Some(data) = resp.data else {
            return Err(Error::data_missing(MISSING_DATA_MESSAGE));
        };
        debug!(
            "loaded page at offset {}: {} results",
            data.starting_offset, data.returned_result_count
        );
        Ok(data)
    }
}

/// Replace the scheme and authority of `url` with `proxy`.
fn replace_origin(url: &str, proxy: &str) -> String {
    let rest = url
        .split_once("://")
        .map(|(_, v)| v.find('/').map(|idx| &v[idx..]).unwrap_or(""))
        .unwrap_or(url);
    format!("{}{rest}", proxy.trim_end_matches('/'))
}
