use std::collections::BTreeMap;

use async_trait::async_trait;
use rust_decimal::Decimal;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{AVG_SCALE, RateStore};
use crate::{
    error::StorageError,
    exchange_rate::{AnalyzedRate, CurrencyFilter, Rate},
};

/// Keeps rows in insertion order and answers queries by linear scan.
#[derive(Default)]
pub struct MemoryRateStore {
    rows: RwLock<Vec<(Uuid, Rate)>>,
}

impl MemoryRateStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RateStore for MemoryRateStore {
    async fn create_schema(&self) -> Result<(), StorageError> {
        self.rows.write().await.clear();
        Ok(())
    }

    async fn insert(&self, rate: &Rate) -> Result<Uuid, StorageError> {
        let id = Uuid::new_v4();
        self.rows.write().await.push((id, rate.clone()));
        Ok(id)
    }

    async fn query_rates(&self, filter: CurrencyFilter) -> Result<Vec<Rate>, StorageError> {
        let rows = self.rows.read().await;

        let date = match filter {
            CurrencyFilter::Date(date) => date,
            CurrencyFilter::Latest => match rows.iter().map(|(_, r)| r.published_date).max() {
                Some(date) => date,
                None => return Ok(Vec::new()),
            },
        };

        Ok(rows
            .iter()
            .filter(|(_, r)| r.published_date == date)
            .map(|(_, r)| r.clone())
            .collect())
    }

    async fn query_analyzed(&self) -> Result<Vec<AnalyzedRate>, StorageError> {
        let rows = self.rows.read().await;

        let mut groups: BTreeMap<(&str, &str), Vec<Decimal>> = BTreeMap::new();
        for (_, rate) in rows.iter() {
            groups
                .entry((rate.base.as_str(), rate.quote.as_str()))
                .or_default()
                .push(rate.rate);
        }

        Ok(groups
            .into_iter()
            .filter_map(|((base, quote), values)| {
                let min = values.iter().min().copied()?;
                let max = values.iter().max().copied()?;
                let sum: Decimal = values.iter().sum();
                let avg = (sum / Decimal::from(values.len())).round_dp(AVG_SCALE);

                Some(AnalyzedRate {
                    base: base.to_string(),
                    quote: quote.to_string(),
                    min,
                    max,
                    avg,
                })
            })
            .collect())
    }
}
