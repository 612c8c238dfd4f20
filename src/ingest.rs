use anyhow::{Context, Result};
use log::info;
use reqwest::Client;

use crate::{
    exchange_rate::Rate,
    feed::{self, RawRate},
    store::RateStore,
};

/// Downloads the feed and stores every rate in it. Any failure aborts the
/// whole run.
pub async fn ingest(client: &Client, url: &str, store: &dyn RateStore) -> Result<usize> {
    info!("fetching currency rates from {}", url);
    let raw_rates = feed::fetch_rates(client, url)
        .await
        .context("Can't fetch currency rates")?;

    store_rates(store, raw_rates).await
}

/// Validates the whole batch before the first insert, so a bad entry leaves
/// the store untouched.
pub async fn store_rates(store: &dyn RateStore, raw_rates: Vec<RawRate>) -> Result<usize> {
    let rates = raw_rates
        .into_iter()
        .map(Rate::try_from)
        .collect::<Result<Vec<_>, _>>()
        .context("Can't normalize currency rates")?;

    info!("storing {} currency rates", rates.len());
    for rate in &rates {
        store
            .insert(rate)
            .await
            .with_context(|| format!("Can't store {} rate for {}", rate.quote, rate.published_date))?;
    }

    Ok(rates.len())
}
