use std::{collections::BTreeMap, sync::Arc};

use log::error;
use serde::Serialize;

use crate::{
    error::QueryError,
    exchange_rate::{BASE_CURRENCY, CurrencyFilter, format_rate, parse_published_date},
    store::RateStore,
};

const LATEST_TOKEN: &str = "latest";

#[derive(Debug, Serialize, PartialEq)]
pub struct RatesResponse {
    pub base: String,
    pub rates: BTreeMap<String, String>,
}

#[derive(Debug, Serialize, PartialEq)]
pub struct RateSummary {
    pub min: String,
    pub max: String,
    pub avg: String,
}

#[derive(Debug, Serialize, PartialEq)]
pub struct AnalyzedRatesResponse {
    pub base: String,
    pub rates_analyze: BTreeMap<String, RateSummary>,
}

pub fn parse_date_token(token: &str) -> Result<CurrencyFilter, QueryError> {
    match token {
        "" => Err(QueryError::MissingDate),
        LATEST_TOKEN => Ok(CurrencyFilter::Latest),
        _ => parse_published_date(token)
            .map(CurrencyFilter::Date)
            .ok_or_else(|| QueryError::InvalidDate(token.to_string())),
    }
}

pub struct RatesHandler {
    store: Arc<dyn RateStore>,
}

impl RatesHandler {
    pub fn new(store: Arc<dyn RateStore>) -> Self {
        Self { store }
    }

    pub async fn get_currency_rates(&self, token: &str) -> Result<RatesResponse, QueryError> {
        let filter = parse_date_token(token)?;

        let rates = self.store.query_rates(filter).await.map_err(|err| {
            error!("query_rates({}) failed: {}", filter, err);
            QueryError::Internal
        })?;
        if rates.is_empty() {
            return Err(QueryError::NotFound);
        }

        // Duplicate quotes for one date: the last row wins.
        let rates = rates
            .into_iter()
            .map(|rate| (rate.quote, format_rate(rate.rate)))
            .collect();

        Ok(RatesResponse {
            base: BASE_CURRENCY.to_string(),
            rates,
        })
    }

    pub async fn get_analyzed_rates(&self) -> Result<AnalyzedRatesResponse, QueryError> {
        let rates = self.store.query_analyzed().await.map_err(|err| {
            error!("query_analyzed failed: {}", err);
            QueryError::Internal
        })?;
        if rates.is_empty() {
            return Err(QueryError::NotFound);
        }

        let rates_analyze = rates
            .into_iter()
            .map(|rate| {
                let summary = RateSummary {
                    min: format_rate(rate.min),
                    max: format_rate(rate.max),
                    avg: format_rate(rate.avg),
                };
                (rate.quote, summary)
            })
            .collect();

        Ok(AnalyzedRatesResponse {
            base: BASE_CURRENCY.to_string(),
            rates_analyze,
        })
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::str::FromStr;

    use async_trait::async_trait;
    use chrono::NaiveDate;
    use rust_decimal::Decimal;
    use uuid::Uuid;

    use super::*;
    use crate::{
        error::StorageError,
        exchange_rate::{AnalyzedRate, Rate},
        store::MemoryRateStore,
    };

    /// Store whose every call fails, as if the database were gone.
    pub(crate) struct BrokenStore;

    #[async_trait]
    impl RateStore for BrokenStore {
        async fn create_schema(&self) -> Result<(), StorageError> {
            Err(sqlx::Error::PoolTimedOut.into())
        }

        async fn insert(&self, _rate: &Rate) -> Result<Uuid, StorageError> {
            Err(sqlx::Error::PoolTimedOut.into())
        }

        async fn query_rates(&self, _filter: CurrencyFilter) -> Result<Vec<Rate>, StorageError> {
            Err(sqlx::Error::PoolTimedOut.into())
        }

        async fn query_analyzed(&self) -> Result<Vec<AnalyzedRate>, StorageError> {
            Err(sqlx::Error::PoolTimedOut.into())
        }
    }

    pub(crate) fn rate(quote: &str, value: &str, published: &str) -> Rate {
        Rate {
            base: "EUR".to_string(),
            quote: quote.to_string(),
            rate: Decimal::from_str(value).unwrap(),
            published_date: NaiveDate::parse_from_str(published, "%Y-%m-%d").unwrap(),
        }
    }

    pub(crate) async fn seeded_store() -> Arc<MemoryRateStore> {
        let store = Arc::new(MemoryRateStore::new());
        for r in [
            rate("SGD", "100.0000000000", "2023-01-05"),
            rate("AUD", "1.5520000000", "2023-01-05"),
            rate("SGD", "200", "2023-01-01"),
        ] {
            store.insert(&r).await.unwrap();
        }
        store
    }

    #[test]
    fn parses_tokens() {
        assert_eq!(parse_date_token("latest"), Ok(CurrencyFilter::Latest));
        assert_eq!(
            parse_date_token("2023-01-05"),
            Ok(CurrencyFilter::Date(NaiveDate::from_ymd_opt(2023, 1, 5).unwrap()))
        );
        assert_eq!(parse_date_token(""), Err(QueryError::MissingDate));
        assert_eq!(
            parse_date_token("not-a-date"),
            Err(QueryError::InvalidDate("not-a-date".to_string()))
        );
        assert_eq!(
            parse_date_token("2023-1-5"),
            Err(QueryError::InvalidDate("2023-1-5".to_string()))
        );
    }

    #[tokio::test]
    async fn latest_rates_keyed_by_quote() {
        let handler = RatesHandler::new(seeded_store().await);

        let response = handler.get_currency_rates("latest").await.unwrap();

        assert_eq!(response.base, "EUR");
        assert_eq!(response.rates.len(), 2);
        assert_eq!(response.rates["SGD"], "100");
        assert_eq!(response.rates["AUD"], "1.552");
    }

    #[tokio::test]
    async fn rates_for_date() {
        let handler = RatesHandler::new(seeded_store().await);

        let response = handler.get_currency_rates("2023-01-01").await.unwrap();

        assert_eq!(response.rates.len(), 1);
        assert_eq!(response.rates["SGD"], "200");
    }

    #[tokio::test]
    async fn last_duplicate_wins() {
        let store = Arc::new(MemoryRateStore::new());
        store.insert(&rate("SGD", "1.1", "2023-01-05")).await.unwrap();
        store.insert(&rate("SGD", "1.2", "2023-01-05")).await.unwrap();
        let handler = RatesHandler::new(store);

        let response = handler.get_currency_rates("2023-01-05").await.unwrap();

        assert_eq!(response.rates.len(), 1);
        assert_eq!(response.rates["SGD"], "1.2");
    }

    #[tokio::test]
    async fn no_rows_is_not_found() {
        let handler = RatesHandler::new(Arc::new(MemoryRateStore::new()));

        assert_eq!(
            handler.get_currency_rates("latest").await,
            Err(QueryError::NotFound)
        );
        assert_eq!(
            handler.get_currency_rates("2023-01-05").await,
            Err(QueryError::NotFound)
        );
        assert_eq!(
            handler.get_analyzed_rates().await,
            Err(QueryError::NotFound)
        );
    }

    #[tokio::test]
    async fn analyzed_rates_per_quote() {
        let handler = RatesHandler::new(seeded_store().await);

        let response = handler.get_analyzed_rates().await.unwrap();

        assert_eq!(response.base, "EUR");
        assert_eq!(
            response.rates_analyze["SGD"],
            RateSummary {
                min: "100".to_string(),
                max: "200".to_string(),
                avg: "150".to_string(),
            }
        );
        assert_eq!(response.rates_analyze["AUD"].avg, "1.552");
    }

    #[tokio::test]
    async fn store_failure_is_internal() {
        let handler = RatesHandler::new(Arc::new(BrokenStore));

        assert_eq!(
            handler.get_currency_rates("latest").await,
            Err(QueryError::Internal)
        );
        assert_eq!(handler.get_analyzed_rates().await, Err(QueryError::Internal));
    }
}
