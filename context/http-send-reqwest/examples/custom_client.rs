use anyhow::Result;
use bytes::Bytes;
use reqwest::Client;
use solarnet_core::Context;
use solarnet_http_send_reqwest::ReqwestHttpSend;
use std::time::Duration;

#[tokio::main]
async fn main() -> Result<()> {
    let client = Client::builder()
        .timeout(Duration::from_secs(30))
        .user_agent("solarnet-example/1.0")
        .build()?;

    let ctx = Context::new().with_http_send(ReqwestHttpSend::new(client));

    let url = "https://data.solarnetwork.net/solarquery/api/v1/pub/datum/list?nodeIds=11&max=1";
    println!("GET {url}");

    let req = http::Request::builder()
        .method("GET")
        .uri(url)
        .header("Accept", "application/json")
        .body(Bytes::new())?;

    match ctx.http_send_as_string(req).await {
        Ok(resp) => {
            println!("Response status: {}", resp.status());
            println!("{}", resp.body());
        }
        Err(e) => eprintln!("Request failed: {e}"),
    }

    Ok(())
}
