use std::env;

use anyhow::Result;
use bytes::Bytes;
use chrono::{TimeZone, Utc};
use hmac::{Hmac, Mac};
use http::header::AUTHORIZATION;
use http::{Request, StatusCode};
use log::{debug, warn};
use pretty_assertions::assert_eq;
use sha2::{Digest, Sha256};
use solarnet_core::time::DateTime;
use solarnet_core::{Context, OsEnv, Signer};
use solarnet_http_send_reqwest::ReqwestHttpSend;
use solarnet_snws2::{AuthorizationBuilder, Config, DefaultCredentialProvider, RequestSigner};
use test_case::test_case;

const TOKEN_ID: &str = "test-token-id";
const TOKEN_SECRET: &str = "test-token-secret";
const LIST_URL: &str = "https://data.solarnetwork.net/solarquery/api/v1/sec/datum/list";

fn test_date() -> DateTime {
    Utc.with_ymd_and_hms(2017, 4, 25, 14, 30, 0).unwrap()
}

fn builder_for(url: &str) -> Result<AuthorizationBuilder> {
    let mut builder = AuthorizationBuilder::new(TOKEN_ID);
    builder.date(test_date()).sn_date(true).url(url, false)?;
    Ok(builder)
}

fn hmac(key: &[u8], data: &[u8]) -> Vec<u8> {
    let mut m = Hmac::<Sha256>::new_from_slice(key).expect("hmac accepts any key length");
    m.update(data);
    m.finalize().into_bytes().to_vec()
}

#[test]
fn test_canonical_request_is_deterministic() -> Result<()> {
    let a = builder_for(&format!("{LIST_URL}?nodeIds=1&sourceIds=%2FA%2F1"))?;
    let b = builder_for(&format!("{LIST_URL}?nodeIds=1&sourceIds=%2FA%2F1"))?;

    assert_eq!(
        a.build_canonical_request_data(),
        b.build_canonical_request_data()
    );
    Ok(())
}

#[test_case("a=1&b=2&c=3", "c=3&a=1&b=2"; "reversed")]
#[test_case("x=1&x=2&y=3", "y=3&x=2&x=1"; "multi valued")]
#[test_case("startDate=2017-01-01T00%3A00&nodeIds=1", "nodeIds=1&startDate=2017-01-01T00%3A00"; "encoded values")]
fn test_query_order_does_not_matter(left: &str, right: &str) -> Result<()> {
    let left = builder_for(&format!("{LIST_URL}?{left}"))?;
    let right = builder_for(&format!("{LIST_URL}?{right}"))?;

    assert_eq!(
        left.build_canonical_request_data(),
        right.build_canonical_request_data()
    );
    assert_eq!(left.build(TOKEN_SECRET), right.build(TOKEN_SECRET));
    Ok(())
}

#[test]
fn test_query_params_match_url_query() -> Result<()> {
    let from_url = builder_for(&format!("{LIST_URL}?b=2&a=%281%29"))?;

    let mut from_params = builder_for(LIST_URL)?;
    from_params.query_params([("b", "2"), ("a", "(1)")]);

    assert_eq!(
        from_url.build_canonical_request_data(),
        from_params.build_canonical_request_data()
    );
    Ok(())
}

#[test]
fn test_signature_recomputed_independently() -> Result<()> {
    let builder = builder_for(&format!("{LIST_URL}?nodeIds=1"))?;

    let canonical = [
        "GET",
        "/solarquery/api/v1/sec/datum/list",
        "nodeIds=1",
        "host:data.solarnetwork.net",
        "x-sn-date:Tue, 25 Apr 2017 14:30:00 GMT",
        "host;x-sn-date",
        "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855",
    ]
    .join("\n");
    assert_eq!(builder.build_canonical_request_data(), canonical);

    let signature_data = format!(
        "SNWS2-HMAC-SHA256\n20170425T143000Z\n{}",
        hex::encode(Sha256::digest(canonical.as_bytes()))
    );
    let key = hmac(
        &hmac(format!("SNWS2{TOKEN_SECRET}").as_bytes(), b"20170425"),
        b"snws2_request",
    );
    let signature = hex::encode(hmac(&key, signature_data.as_bytes()));

    assert_eq!(
        builder.build(TOKEN_SECRET),
        format!(
            "SNWS2 Credential={TOKEN_ID},SignedHeaders=host;x-sn-date,Signature={signature}"
        )
    );
    Ok(())
}

#[test]
fn test_signature_is_stable_within_a_day() -> Result<()> {
    let mut builder = builder_for(LIST_URL)?;
    let first = builder.build(TOKEN_SECRET);
    assert_eq!(first, builder.build(TOKEN_SECRET));

    // The key is the same all day, but the signed date is not.
    let key = builder.compute_signing_key(TOKEN_SECRET);
    builder.date(Utc.with_ymd_and_hms(2017, 4, 25, 23, 0, 0).unwrap());
    assert_eq!(key, builder.compute_signing_key(TOKEN_SECRET));
    assert_ne!(first, builder.build(TOKEN_SECRET));
    Ok(())
}

#[test]
fn test_saved_key_expires_after_seven_days() -> Result<()> {
    let mut builder = builder_for(LIST_URL)?;
    builder.save_signing_key(TOKEN_SECRET);

    let key = builder.signing_key().expect("key must be saved");
    assert_eq!(
        key.expiration(),
        Utc.with_ymd_and_hms(2017, 5, 2, 0, 0, 0).unwrap()
    );
    assert!(key.is_valid_at(Utc.with_ymd_and_hms(2017, 5, 1, 23, 59, 59).unwrap()));
    assert!(!key.is_valid_at(Utc.with_ymd_and_hms(2017, 5, 2, 0, 0, 0).unwrap()));

    // Saved keys keep signing after reset, and match a fresh derivation.
    builder.reset();
    builder.date(test_date()).sn_date(true).url(LIST_URL, false)?;
    assert_eq!(builder.build_with_saved_key()?, builder.build(TOKEN_SECRET));
    Ok(())
}

#[test]
fn test_set_signing_key_from_elsewhere() -> Result<()> {
    let source = builder_for(LIST_URL)?;
    let key = source.compute_signing_key(TOKEN_SECRET);

    let mut builder = builder_for(LIST_URL)?;
    builder.set_signing_key(key, test_date());
    assert_eq!(
        builder.build_with_saved_key()?,
        source.build(TOKEN_SECRET)
    );
    Ok(())
}

async fn init_signer() -> Option<(Context, Signer<solarnet_snws2::Credential>, String)> {
    let _ = env_logger::builder().is_test(true).try_init();
    let _ = dotenv::dotenv();

    if env::var("SOLARNETWORK_TEST").unwrap_or_default() != "on" {
        return None;
    }

    let ctx = Context::new()
        .with_http_send(ReqwestHttpSend::default())
        .with_env(OsEnv);
    let config = Config::default().from_env(&ctx);
    let origin = config
        .environment()
        .expect("env SOLARNETWORK_HOST must be valid")
        .origin();

    let signer = Signer::new(
        ctx.clone(),
        DefaultCredentialProvider::from(std::sync::Arc::new(config)),
        RequestSigner::new(),
    );
    Some((ctx, signer, origin))
}

#[tokio::test]
async fn test_whoami() -> Result<()> {
    let Some((ctx, signer, origin)) = init_signer().await else {
        warn!("SOLARNETWORK_TEST is not set, skipped");
        return Ok(());
    };

    let (mut parts, body) = Request::get(format!("{origin}/solaruser/api/v1/sec/whoami"))
        .body(Bytes::new())?
        .into_parts();
    signer.sign(&mut parts).await?;
    assert!(parts.headers.contains_key(AUTHORIZATION));

    let resp = ctx.http_send(Request::from_parts(parts, body)).await?;
    debug!("got response: {resp:?}");
    assert_eq!(StatusCode::OK, resp.status());
    Ok(())
}
