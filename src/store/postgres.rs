use async_trait::async_trait;
use log::debug;
use sqlx::PgPool;
use uuid::Uuid;

use super::{AVG_SCALE, RateStore};
use crate::{
    error::StorageError,
    exchange_rate::{AnalyzedRate, CurrencyFilter, Rate},
};

// Reset on every start: the table only ever holds the last ingested feed.
const SCHEMA_SQL: &str = r#"
    DROP TABLE IF EXISTS currency_rate;
    CREATE TABLE currency_rate (
        id UUID DEFAULT gen_random_uuid() PRIMARY KEY,
        base VARCHAR(3) NOT NULL,
        quote VARCHAR(3) NOT NULL,
        rate NUMERIC(20, 10) NOT NULL,
        published_date DATE NOT NULL
    );
    CREATE INDEX currency_rate_published_date_idx ON currency_rate (published_date);
"#;

const INSERT_SQL: &str = r#"
    INSERT INTO currency_rate (base, quote, rate, published_date)
    VALUES ($1, $2, $3, $4)
    RETURNING id
"#;

const RATES_BY_DATE_SQL: &str = r#"
    SELECT base, quote, rate, published_date
    FROM currency_rate
    WHERE published_date = $1
"#;

const LATEST_RATES_SQL: &str = r#"
    SELECT base, quote, rate, published_date
    FROM currency_rate
    WHERE published_date = (SELECT MAX(published_date) FROM currency_rate)
"#;

const ANALYZED_SQL: &str = r#"
    SELECT
        base,
        quote,
        MIN(rate) AS min,
        MAX(rate) AS max,
        ROUND(AVG(rate), $1) AS avg
    FROM currency_rate
    GROUP BY base, quote
    ORDER BY base, quote
"#;

pub struct PgRateStore {
    pool: PgPool,
}

impl PgRateStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RateStore for PgRateStore {
    async fn create_schema(&self) -> Result<(), StorageError> {
        sqlx::raw_sql(SCHEMA_SQL).execute(&self.pool).await?;
        Ok(())
    }

    async fn insert(&self, rate: &Rate) -> Result<Uuid, StorageError> {
        let id = sqlx::query_scalar::<_, Uuid>(INSERT_SQL)
            .bind(&rate.base)
            .bind(&rate.quote)
            .bind(rate.rate)
            .bind(rate.published_date)
            .fetch_one(&self.pool)
            .await?;

        Ok(id)
    }

    async fn query_rates(&self, filter: CurrencyFilter) -> Result<Vec<Rate>, StorageError> {
        debug!("querying rates for {}", filter);

        let rates = match filter {
            CurrencyFilter::Date(date) => {
                sqlx::query_as::<_, Rate>(RATES_BY_DATE_SQL)
                    .bind(date)
                    .fetch_all(&self.pool)
                    .await?
            }
            CurrencyFilter::Latest => {
                sqlx::query_as::<_, Rate>(LATEST_RATES_SQL)
                    .fetch_all(&self.pool)
                    .await?
            }
        };

        Ok(rates)
    }

    async fn query_analyzed(&self) -> Result<Vec<AnalyzedRate>, StorageError> {
        let rates = sqlx::query_as::<_, AnalyzedRate>(ANALYZED_SQL)
            .bind(AVG_SCALE as i32)
            .fetch_all(&self.pool)
            .await?;

        Ok(rates)
    }
}
