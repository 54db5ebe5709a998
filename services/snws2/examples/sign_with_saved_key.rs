//! Sign a datum list request with a signing key saved from the token secret.
//!
//! ```shell
//! SOLARNETWORK_TOKEN_ID=... SOLARNETWORK_TOKEN_SECRET=... \
//!     cargo run --example sign_with_saved_key
//! ```

use anyhow::Result;
use solarnet_core::{Context, OsEnv};
use solarnet_snws2::{AuthorizationBuilder, Config};

fn main() -> Result<()> {
    let _ = env_logger::builder().try_init();

    let ctx = Context::new().with_env(OsEnv);
    let config = Config::default().from_env(&ctx);
    let (Some(token_id), Some(secret)) = (config.token_id.clone(), config.secret.clone()) else {
        anyhow::bail!("SOLARNETWORK_TOKEN_ID and SOLARNETWORK_TOKEN_SECRET must be set");
    };

    let env = config.environment()?;
    let mut builder = AuthorizationBuilder::new(token_id).with_environment(&env);

    // The secret is only needed once; the saved key signs for the next 7 days.
    builder.save_signing_key(&secret);
    println!("signing key expires at {:?}", builder.signing_key_expiration());

    let url = format!(
        "{}/solarquery/api/v1/sec/datum/list?nodeIds=1&max=10",
        env.origin()
    );
    builder.reset().sn_date(true).url(&url, false)?;

    println!("GET {url}");
    println!("X-SN-Date: {}", builder.request_date_header_value());
    println!("Authorization: {}", builder.build_with_saved_key()?);
    Ok(())
}
