mod backend;
mod config;
mod error;
mod ledger;
mod storage;
mod studio;
#[cfg(test)]
mod testing;

use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;
use pm_runcomfy::RunComfyClient;
use crate::config::AppConfig;
use crate::ledger::CreditLedger;
use crate::storage::HttpObjectStore;
use crate::studio::Studio;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let conf = AppConfig::load()?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    info!(
        api = %conf.runcomfy.base_url,
        storage = %conf.storage.endpoint,
        credits = conf.initial_credits,
        max_attempts = conf.poll.max_attempts,
        "starting pet studio"
    );

    let api = RunComfyClient::new(conf.runcomfy)?;
    let store = HttpObjectStore::new(conf.storage)?;
    let studio = Arc::new(Studio::new(
        Arc::new(api),
        Arc::new(store),
        CreditLedger::new(conf.initial_credits),
        conf.poll,
    ));
    let _sweeper = studio.spawn_sweeper();

    backend::serve(conf.port, studio).await
}
