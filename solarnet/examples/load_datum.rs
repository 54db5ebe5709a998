use anyhow::Result;
use serde_json::Value;
use solarnet::query::{DatumFilter, DatumLoader, LoadCallback, SolarQueryApi};
use solarnet::snws2::{AuthorizationBuilder, Config};
use solarnet::{default_context, time};

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    let ctx = default_context();
    let config = Config::default().from_env(&ctx);
    let env = config.environment()?;

    let node_id: u64 = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "1".to_string())
        .parse()?;
    let end = time::now();
    let filter = DatumFilter::new()
        .with_node_id(node_id)
        .with_start_date(end - chrono::TimeDelta::try_days(1).expect("in bounds"))
        .with_end_date(end);

    // Use the public API unless a token is configured.
    let api = SolarQueryApi::new(env.clone()).with_public(config.token_id.is_none());
    let mut loader: DatumLoader<Value> = DatumLoader::new(ctx.clone(), api, filter)
        .with_config(&solarnet::query::Config::default().from_env(&ctx))
        .with_include_total_results_count(true)
        .with_incremental(true);

    if let (Some(token_id), Some(secret)) = (config.token_id, config.secret) {
        let mut auth = AuthorizationBuilder::new(token_id).with_environment(&env);
        auth.save_signing_key(&secret);
        loader = loader.with_authorization(auth);
    }

    let callback: LoadCallback<Value> =
        Box::new(|res: solarnet::Result<&[Value]>, done: bool| match res {
            Ok(rows) => println!("{} datum loaded{}", rows.len(), if done { ", done" } else { "" }),
            Err(err) => eprintln!("loading failed: {err}"),
        });
    loader.load(Some(callback)).await?;

    Ok(())
}
