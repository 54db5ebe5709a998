use std::collections::HashMap;
use std::env;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use bytes::Bytes;
use http::header::AUTHORIZATION;
use http::StatusCode;
use log::{debug, warn};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use solarnet_core::time::now;
use solarnet_core::{Context, Environment, ErrorKind, HttpSend, OsEnv};
use solarnet_http_send_reqwest::ReqwestHttpSend;
use solarnet_query::{
    Config, DatumFilter, DatumLoader, LoadCallback, LoaderState, SolarQueryApi,
};
use solarnet_snws2::{AuthorizationBuilder, X_SN_DATE};
use test_case::test_case;

const MISSING_DATA: &str =
    "One or more requests did not return a result, but no error was reported.";

/// Serves `total` datum `{"offset": n}`, later pages answering sooner.
#[derive(Debug, Clone, Default)]
struct MockApi {
    total: usize,
    missing_data_at: Option<usize>,
    gap_at: Option<usize>,
    failure_at: Option<(usize, Option<&'static str>)>,
    status_at: Option<(usize, StatusCode)>,

    requests: Arc<Mutex<Vec<MockRequest>>>,
    in_flight: Arc<AtomicUsize>,
    max_in_flight: Arc<AtomicUsize>,
}

#[derive(Debug, Clone)]
struct MockRequest {
    uri: String,
    offset: usize,
    authorization: Option<String>,
    sn_date: Option<String>,
}

impl MockApi {
    fn new(total: usize) -> Self {
        Self {
            total,
            ..Default::default()
        }
    }

    fn requests(&self) -> Vec<MockRequest> {
        self.requests.lock().unwrap().clone()
    }

    fn offsets(&self) -> Vec<usize> {
        let mut offsets: Vec<_> = self.requests().iter().map(|r| r.offset).collect();
        offsets.sort();
        offsets
    }

    fn respond(&self, params: &HashMap<String, String>) -> (StatusCode, Value) {
        let offset = params.get("offset").map_or(0, |v| v.parse().unwrap());
        let max: usize = params["max"].parse().unwrap();

        if let Some((at, status)) = self.status_at {
            if at == offset {
                return (status, json!({}));
            }
        }
        if let Some((at, message)) = self.failure_at {
            if at == offset {
                return (
                    StatusCode::OK,
                    json!({"success": false, "message": message}),
                );
            }
        }
        if self.missing_data_at == Some(offset) {
            return (StatusCode::OK, json!({"success": true}));
        }

        let results: Vec<Value> = if self.gap_at == Some(offset) {
            Vec::new()
        } else {
            (offset..self.total.min(offset + max))
                .map(|v| json!({"offset": v}))
                .collect()
        };
        let mut data = json!({
            "startingOffset": offset,
            "returnedResultCount": results.len(),
            "results": results,
        });
        if params.get("withoutTotalResultsCount").map(String::as_str) != Some("true") {
            data["totalResults"] = json!(self.total);
        }
        (StatusCode::OK, json!({"success": true, "data": data}))
    }
}

#[async_trait]
impl HttpSend for MockApi {
    async fn http_send(
        &self,
        req: http::Request<Bytes>,
    ) -> solarnet_core::Result<http::Response<Bytes>> {
        let params: HashMap<String, String> = req
            .uri()
            .query()
            .unwrap_or_default()
            .split('&')
            .filter_map(|v| v.split_once('='))
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        let offset = params.get("offset").map_or(0, |v| v.parse().unwrap());

        self.requests.lock().unwrap().push(MockRequest {
            uri: req.uri().to_string(),
            offset,
            authorization: req
                .headers()
                .get(AUTHORIZATION)
                .map(|v| v.to_str().unwrap().to_string()),
            sn_date: req
                .headers()
                .get(X_SN_DATE)
                .map(|v| v.to_str().unwrap().to_string()),
        });

        let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(current, Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(
            3 * self.total.saturating_sub(offset) as u64,
        ))
        .await;
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        let (status, body) = self.respond(&params);
        Ok(http::Response::builder()
            .status(status)
            .body(Bytes::from(body.to_string()))
            .unwrap())
    }
}

fn init_loader(api: &MockApi) -> DatumLoader<Value> {
    let _ = env_logger::builder().is_test(true).try_init();

    DatumLoader::new(
        Context::new().with_http_send(api.clone()),
        SolarQueryApi::new(Environment::default()),
        DatumFilter::new().with_node_id(1).with_source_id("/A/1"),
    )
}

fn offsets_of(rows: &[Value]) -> Vec<u64> {
    rows.iter().map(|v| v["offset"].as_u64().unwrap()).collect()
}

type Calls = Arc<Mutex<Vec<(std::result::Result<Vec<u64>, String>, bool)>>>;

fn recording_callback() -> (LoadCallback<Value>, Calls) {
    let calls: Calls = Arc::default();
    let recorded = calls.clone();
    let callback: LoadCallback<Value> =
        Box::new(move |res: solarnet_core::Result<&[Value]>, done: bool| {
            let res = res.map(offsets_of).map_err(|e| e.to_string());
            recorded.lock().unwrap().push((res, done));
        });
    (callback, calls)
}

#[test_case(1; "serial")]
#[test_case(2; "bounded")]
#[test_case(0; "unbounded")]
#[tokio::test]
async fn test_fetch_with_known_total(concurrency: usize) -> Result<()> {
    let api = MockApi::new(6);
    let mut loader = init_loader(&api)
        .with_pagination_size(2)
        .with_include_total_results_count(true)
        .with_concurrency(concurrency);

    let rows = loader.fetch().await?;
    assert_eq!(offsets_of(&rows), vec![0, 1, 2, 3, 4, 5]);
    assert_eq!(api.offsets(), vec![0, 2, 4]);
    assert_eq!(loader.state(), LoaderState::Done);

    // Only the first page asks for the total.
    let requests = api.requests();
    let first = requests.iter().find(|r| r.offset == 0).unwrap();
    assert!(!first.uri.contains("withoutTotalResultsCount"));
    assert!(requests
        .iter()
        .filter(|r| r.offset != 0)
        .all(|r| r.uri.contains("withoutTotalResultsCount=true")));
    Ok(())
}

#[tokio::test]
async fn test_fetch_respects_concurrency() -> Result<()> {
    let api = MockApi::new(20);
    let mut loader = init_loader(&api)
        .with_pagination_size(2)
        .with_include_total_results_count(true)
        .with_concurrency(3);

    let rows = loader.fetch().await?;
    assert_eq!(offsets_of(&rows), (0..20).collect::<Vec<_>>());
    assert_eq!(api.requests().len(), 10);
    assert!(api.max_in_flight.load(Ordering::SeqCst) <= 3);
    Ok(())
}

#[tokio::test]
async fn test_fetch_partial_last_page() -> Result<()> {
    let api = MockApi::new(5);
    let mut loader = init_loader(&api).with_pagination_size(2);

    let rows = loader.fetch().await?;
    assert_eq!(offsets_of(&rows), vec![0, 1, 2, 3, 4]);
    assert_eq!(api.offsets(), vec![0, 2, 4]);
    assert!(api
        .requests()
        .iter()
        .all(|r| r.uri.contains("withoutTotalResultsCount=true")));
    Ok(())
}

#[tokio::test]
async fn test_fetch_total_without_total_results() -> Result<()> {
    // Totals requested, but the result fits in the first page.
    let api = MockApi::new(3);
    let mut loader = init_loader(&api)
        .with_pagination_size(10)
        .with_include_total_results_count(true);

    let rows = loader.fetch().await?;
    assert_eq!(offsets_of(&rows), vec![0, 1, 2]);
    assert_eq!(api.offsets(), vec![0]);
    Ok(())
}

#[tokio::test]
async fn test_fetch_tolerates_gap() -> Result<()> {
    let api = MockApi {
        gap_at: Some(2),
        ..MockApi::new(6)
    };
    let mut loader = init_loader(&api)
        .with_pagination_size(2)
        .with_include_total_results_count(true);

    let rows = loader.fetch().await?;
    assert_eq!(offsets_of(&rows), vec![0, 1, 4, 5]);
    assert_eq!(api.offsets(), vec![0, 2, 4]);
    Ok(())
}

#[test_case(0; "first page")]
#[test_case(4; "later page")]
#[tokio::test]
async fn test_fetch_missing_data_is_fatal(at: usize) -> Result<()> {
    let api = MockApi {
        missing_data_at: Some(at),
        ..MockApi::new(6)
    };
    let mut loader = init_loader(&api)
        .with_pagination_size(2)
        .with_include_total_results_count(true);

    let err = loader.fetch().await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::DataMissing);
    assert_eq!(err.to_string(), MISSING_DATA);
    assert_eq!(loader.state(), LoaderState::Loading);
    Ok(())
}

#[test_case(Some("Access denied"), "Access denied"; "with message")]
#[test_case(None, "unknown error"; "without message")]
#[tokio::test]
async fn test_fetch_reports_service_failure(
    message: Option<&'static str>,
    expected: &str,
) -> Result<()> {
    let api = MockApi {
        failure_at: Some((2, message)),
        ..MockApi::new(6)
    };
    let mut loader = init_loader(&api).with_pagination_size(2);

    let err = loader.fetch().await.unwrap_err();
    let failed = api
        .requests()
        .into_iter()
        .find(|r| r.offset == 2)
        .unwrap();
    assert_eq!(
        err.to_string(),
        format!("Error requesting data for {}: {expected}", failed.uri)
    );
    // Serial paging stops at the failed page.
    assert_eq!(api.offsets(), vec![0, 2]);
    Ok(())
}

#[tokio::test]
async fn test_fetch_reports_http_status() -> Result<()> {
    let api = MockApi {
        status_at: Some((0, StatusCode::FORBIDDEN)),
        ..MockApi::new(6)
    };
    let mut loader = init_loader(&api).with_pagination_size(2);

    let err = loader.fetch().await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ResponseInvalid);
    assert!(err.to_string().starts_with("Error requesting data for https://"));
    assert!(err.to_string().ends_with(": Forbidden"));
    Ok(())
}

#[tokio::test]
async fn test_load_incremental_in_offset_order() -> Result<()> {
    let api = MockApi::new(7);
    let (callback, calls) = recording_callback();
    let mut loader = init_loader(&api)
        .with_pagination_size(2)
        .with_include_total_results_count(true)
        .with_incremental(true);

    loader.load(Some(callback)).await?;

    let calls = calls.lock().unwrap().clone();
    assert_eq!(
        calls,
        vec![
            (Ok(vec![0, 1]), false),
            (Ok(vec![0, 1, 2, 3]), false),
            (Ok(vec![0, 1, 2, 3, 4, 5]), false),
            (Ok(vec![0, 1, 2, 3, 4, 5, 6]), true),
        ]
    );
    assert_eq!(loader.state(), LoaderState::Done);
    Ok(())
}

#[tokio::test]
async fn test_load_serial_incremental() -> Result<()> {
    let api = MockApi::new(3);
    let (callback, calls) = recording_callback();
    let mut loader = init_loader(&api)
        .with_pagination_size(2)
        .with_incremental(true)
        .with_callback(callback);

    loader.load(None).await?;

    let calls = calls.lock().unwrap().clone();
    assert_eq!(
        calls,
        vec![(Ok(vec![0, 1]), false), (Ok(vec![0, 1, 2]), true)]
    );
    Ok(())
}

#[tokio::test]
async fn test_load_once_when_not_incremental() -> Result<()> {
    let api = MockApi::new(5);
    let (callback, calls) = recording_callback();
    let mut loader = init_loader(&api)
        .with_pagination_size(2)
        .with_include_total_results_count(true);

    loader.load(Some(callback)).await?;

    let calls = calls.lock().unwrap().clone();
    assert_eq!(calls, vec![(Ok(vec![0, 1, 2, 3, 4]), true)]);
    Ok(())
}

#[tokio::test]
async fn test_load_delivers_error_to_callback() -> Result<()> {
    let api = MockApi {
        missing_data_at: Some(4),
        ..MockApi::new(6)
    };
    let (callback, calls) = recording_callback();
    let mut loader = init_loader(&api)
        .with_pagination_size(2)
        .with_incremental(true);

    loader.load(Some(callback)).await?;

    let calls = calls.lock().unwrap().clone();
    assert_eq!(
        calls,
        vec![
            (Ok(vec![0, 1]), false),
            (Ok(vec![0, 1, 2, 3]), false),
            (Err(MISSING_DATA.to_string()), true),
        ]
    );
    assert_eq!(loader.state(), LoaderState::Loading);
    Ok(())
}

#[tokio::test]
async fn test_load_without_callback() -> Result<()> {
    let api = MockApi::new(6);
    let mut loader = init_loader(&api);

    let err = loader.load(None).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ConfigInvalid);
    assert_eq!(err.to_string(), "No callback provided.");
    assert!(api.requests().is_empty());
    assert_eq!(loader.state(), LoaderState::Ready);
    Ok(())
}

#[tokio::test]
async fn test_pages_are_signed() -> Result<()> {
    let mut auth = AuthorizationBuilder::new("test-token");
    auth.save_signing_key("test-secret");

    let api = MockApi::new(6);
    let mut loader = init_loader(&api)
        .with_pagination_size(2)
        .with_include_total_results_count(true)
        .with_authorization(auth.clone());
    loader.fetch().await?;

    let requests = api.requests();
    assert_eq!(requests.len(), 3);
    for r in requests {
        let authorization = r.authorization.expect("page must be signed");
        assert!(authorization
            .starts_with("SNWS2 Credential=test-token,SignedHeaders=host;x-sn-date,Signature="));
        assert!(r.sn_date.is_some());
    }
    // The builder passed in is left untouched.
    assert!(auth.header_map().is_empty());
    Ok(())
}

#[tokio::test]
async fn test_proxied_pages_sign_api_url() -> Result<()> {
    let _ = env_logger::builder().is_test(true).try_init();
    let mut auth = AuthorizationBuilder::new("test-token");
    auth.save_signing_key("test-secret");

    let api = MockApi::new(3);
    let mut loader: DatumLoader<Value> = DatumLoader::new(
        Context::new().with_http_send(api.clone()),
        SolarQueryApi::new(Environment::new("stage.solarnetwork.net")),
        DatumFilter::new().with_node_id(1),
    )
    .with_pagination_size(2)
    .with_proxy_url("http://localhost:9000/prefix")
    .with_authorization(auth.clone());
    loader.fetch().await?;

    let requests = api.requests();
    assert_eq!(requests.len(), 2);
    for r in requests {
        let path_and_query = r
            .uri
            .strip_prefix("http://localhost:9000/prefix")
            .expect("page must be sent to the proxy");
        let date = chrono::DateTime::parse_from_rfc2822(&r.sn_date.expect("must carry date"))?
            .with_timezone(&chrono::Utc);

        let mut expected = auth.clone();
        expected.reset().date(date).sn_date(true).url(
            &format!("https://stage.solarnetwork.net{path_and_query}"),
            false,
        )?;
        assert_eq!(
            r.authorization.expect("page must be signed"),
            expected.build_with_saved_key()?
        );
    }
    Ok(())
}

#[tokio::test]
async fn test_pages_unsigned_without_valid_key() -> Result<()> {
    let mut expired = AuthorizationBuilder::new("test-token");
    expired.set_signing_key(
        vec![0u8; 32],
        now() - chrono::TimeDelta::try_days(30).unwrap(),
    );

    let api = MockApi::new(2);
    let mut loader = init_loader(&api)
        .with_pagination_size(5)
        .with_authorization(expired);
    loader.fetch().await?;

    let requests = api.requests();
    assert_eq!(requests.len(), 1);
    assert!(requests[0].authorization.is_none());
    assert!(requests[0].sn_date.is_none());
    Ok(())
}

#[tokio::test]
async fn test_proxy_readings_and_parameters() -> Result<()> {
    let api = MockApi::new(2);
    let config = Config {
        pagination_size: Some("5".to_string()),
        proxy_url: Some("http://localhost:9000".to_string()),
        ..Default::default()
    };
    let mut loader = init_loader(&api)
        .with_config(&config)
        .with_readings(true)
        .with_parameters([("tolerance", "P1D")]);
    loader.fetch().await?;

    let requests = api.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(
        requests[0].uri,
        "http://localhost:9000/solarquery/api/v1/sec/datum/reading?readingType=Difference\
         &nodeIds=1&sourceIds=%2FA%2F1&max=5&withoutTotalResultsCount=true&tolerance=P1D"
    );
    Ok(())
}

#[tokio::test]
async fn test_filter_is_not_modified() -> Result<()> {
    let filter = DatumFilter::new()
        .with_node_id(1)
        .with_without_total_results_count(true);
    let api = MockApi::new(4);
    let mut loader: DatumLoader<Value> = DatumLoader::new(
        Context::new().with_http_send(api.clone()),
        SolarQueryApi::new(Environment::default()),
        filter.clone(),
    )
    .with_pagination_size(2)
    .with_include_total_results_count(true);
    loader.fetch().await?;

    assert!(filter.without_total_results_count);
    // The first page still asked for the total.
    let first = api.requests().into_iter().find(|r| r.offset == 0).unwrap();
    assert!(!first.uri.contains("withoutTotalResultsCount"));
    assert_eq!(api.offsets(), vec![0, 2]);
    Ok(())
}

#[tokio::test]
async fn test_live_list_datum() -> Result<()> {
    let _ = env_logger::builder().is_test(true).try_init();
    let _ = dotenv::dotenv();

    if env::var("SOLARNETWORK_TEST").unwrap_or_default() != "on" {
        warn!("SOLARNETWORK_TEST is not set, skipped");
        return Ok(());
    }

    let ctx = Context::new()
        .with_http_send(ReqwestHttpSend::default())
        .with_env(OsEnv);
    let node_id: u64 = env::var("SOLARNETWORK_TEST_NODE_ID")
        .expect("env SOLARNETWORK_TEST_NODE_ID must set")
        .parse()?;
    let snws2 = solarnet_snws2::Config::default().from_env(&ctx);
    let environment = snws2.environment()?;

    let filter = DatumFilter::new()
        .with_node_id(node_id)
        .with_start_date(now() - chrono::TimeDelta::try_hours(1).unwrap())
        .with_end_date(now());
    let mut loader: DatumLoader<Value> = DatumLoader::new(
        ctx.clone(),
        SolarQueryApi::new(environment.clone()).with_public(snws2.token_id.is_none()),
        filter,
    )
    .with_config(&Config::default().from_env(&ctx))
    .with_include_total_results_count(true);

    if let (Some(token_id), Some(secret)) = (snws2.token_id, snws2.secret) {
        let mut auth = AuthorizationBuilder::new(token_id).with_environment(&environment);
        auth.save_signing_key(&secret);
        loader = loader.with_authorization(auth);
    }

    let rows = loader.fetch().await?;
    debug!("loaded {} datum", rows.len());
    assert_eq!(loader.state(), LoaderState::Done);
    Ok(())
}
