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

//! SolarNetwork datum queries.
//!
//! This crate builds SolarQuery URLs and loads query results:
//!
//! - [`DatumFilter`], [`Pagination`] and [`SortDescriptor`] describe a query.
//! - [`SolarQueryApi`] turns them into URLs for an environment.
//! - [`DatumLoader`] loads every page of results, concurrently when the total
//!   result count is known, signing requests with an SNWS2
//!   [`AuthorizationBuilder`](solarnet_snws2::AuthorizationBuilder).
//!
//! ## Example
//!
//! ```no_run
//! use serde_json::Value;
//! use solarnet_core::{Context, Environment, Result};
//! use solarnet_query::{DatumFilter, DatumLoader, LoadCallback, SolarQueryApi};
//! use solarnet_snws2::AuthorizationBuilder;
//!
//! # async fn example(ctx: Context) -> Result<()> {
//! let env = Environment::default();
//! let mut auth = AuthorizationBuilder::new("token").with_environment(&env);
//! auth.save_signing_key("secret");
//!
//! let filter = DatumFilter::new().with_node_id(1);
//! let mut loader: DatumLoader<Value> = DatumLoader::new(ctx, SolarQueryApi::new(env), filter)
//!     .with_authorization(auth)
//!     .with_include_total_results_count(true)
//!     .with_incremental(true);
//!
//! let callback: LoadCallback<Value> = Box::new(|res: Result<&[Value]>, done: bool| match res {
//!     Ok(rows) => println!("{} datum loaded, done: {done}", rows.len()),
//!     Err(err) => eprintln!("{err}"),
//! });
//! loader.load(Some(callback)).await?;
//! # Ok(())
//! # }
//! ```

// Make sure all our public APIs have docs.
#![warn(missing_docs)]

mod constants;
pub use constants::{
    SOLARNETWORK_CONCURRENCY, SOLARNETWORK_PAGINATION_SIZE, SOLARNETWORK_PROXY_URL,
};

mod domain;
pub use domain::{Aggregation, DatumReadingType};

mod sort;
pub use sort::SortDescriptor;

mod pagination;
pub use pagination::Pagination;

mod filter;
pub use filter::DatumFilter;

mod api;
pub use api::SolarQueryApi;

mod envelope;
pub use envelope::{PageData, Response};

mod config;
pub use config::Config;

mod loader;
pub use loader::{DatumLoader, LoadCallback, LoaderState};
