use std::sync::Arc;

use actix_web::{App, HttpServer, middleware::Logger, web};
use anyhow::{Context, Result};
use env_logger::Env;
use log::{error, info, warn};
use reqwest::Client;
use sqlx::postgres::PgPoolOptions;

use config::Config;
use handler::RatesHandler;
use store::{MemoryRateStore, PgRateStore, RateStore};

mod config;
mod error;
mod exchange_rate;
mod feed;
mod handler;
mod ingest;
mod routes;
mod store;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let result = match Config::from_env() {
        Ok(config) => run(config).await,
        Err(err) => Err(err),
    };

    result.inspect_err(|err| error!("startup failed: {:#}", err))
}

async fn run(config: Config) -> Result<()> {
    let store = open_store(&config).await?;

    info!("initialising schema");
    store
        .create_schema()
        .await
        .context("Can't create currency rate table")?;

    let client = Client::builder()
        .timeout(config.feed_timeout)
        .build()
        .context("Can't build http client")?;
    let stored = ingest::ingest(&client, &config.feed_url, store.as_ref()).await?;
    info!("stored {} currency rates", stored);

    let handler = web::Data::new(RatesHandler::new(store));

    info!("listening on {}", config.listen_addr);
    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .app_data(handler.clone())
            .configure(routes::configure)
    })
    .bind(config.listen_addr)
    .with_context(|| format!("Can't bind {}", config.listen_addr))?
    .run()
    .await?;

    Ok(())
}

async fn open_store(config: &Config) -> Result<Arc<dyn RateStore>> {
    let Some(url) = &config.database_url else {
        warn!("DATABASE_URL is not set, rates are kept in memory");
        return Ok(Arc::new(MemoryRateStore::new()));
    };

    let pool = PgPoolOptions::new()
        .max_connections(config.database_max_connections)
        .connect(url)
        .await
        .context("Can't connect to the database")?;

    Ok(Arc::new(PgRateStore::new(pool)))
}
