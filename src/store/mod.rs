use async_trait::async_trait;
use uuid::Uuid;

use crate::{
    error::StorageError,
    exchange_rate::{AnalyzedRate, CurrencyFilter, Rate},
};

mod memory;
mod postgres;

pub use memory::MemoryRateStore;
pub use postgres::PgRateStore;

/// Fractional digits kept when averaging a pair's rates.
pub const AVG_SCALE: u32 = 16;

/// Persistence for ingested rates. Rows are append-only: nothing is updated
/// and nothing is removed except by `create_schema`.
#[async_trait]
pub trait RateStore: Send + Sync {
    /// Drops and recreates the rate table, discarding every stored row.
    async fn create_schema(&self) -> Result<(), StorageError>;

    /// Appends one row. The same `(base, quote, published_date)` may be
    /// inserted any number of times.
    async fn insert(&self, rate: &Rate) -> Result<Uuid, StorageError>;

    /// Rows published on the filter's date. `Latest` on an empty store
    /// yields an empty vector.
    async fn query_rates(&self, filter: CurrencyFilter) -> Result<Vec<Rate>, StorageError>;

    /// Min, max and average rate per `(base, quote)`, ordered by pair.
    async fn query_analyzed(&self) -> Result<Vec<AnalyzedRate>, StorageError>;
}
