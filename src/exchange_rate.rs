use std::{fmt, str::FromStr};

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::{error::ValidationError, feed::RawRate};

/// The feed quotes everything against the euro.
pub const BASE_CURRENCY: &str = "EUR";

#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct Rate {
    pub base: String,
    pub quote: String,
    pub rate: Decimal,
    pub published_date: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct AnalyzedRate {
    pub base: String,
    pub quote: String,
    pub min: Decimal,
    pub max: Decimal,
    pub avg: Decimal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CurrencyFilter {
    /// Rows of the most recent published date in storage.
    Latest,
    Date(NaiveDate),
}

impl fmt::Display for CurrencyFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CurrencyFilter::Latest => f.write_str("latest"),
            CurrencyFilter::Date(date) => write!(f, "{}", date.format("%Y-%m-%d")),
        }
    }
}

impl TryFrom<RawRate> for Rate {
    type Error = ValidationError;

    fn try_from(raw: RawRate) -> Result<Self, Self::Error> {
        let published_date =
            parse_published_date(&raw.date).ok_or_else(|| ValidationError::BadDate(raw.date))?;
        let rate = Decimal::from_str(&raw.rate).map_err(|_| ValidationError::BadRate {
            currency: raw.currency.clone(),
            rate: raw.rate,
        })?;

        Ok(Rate {
            base: BASE_CURRENCY.to_string(),
            quote: raw.currency,
            rate,
            published_date,
        })
    }
}

/// Parses a strict `YYYY-MM-DD` date. chrono alone accepts unpadded fields
/// such as `2023-1-5`, so the shape is checked first.
pub fn parse_published_date(s: &str) -> Option<NaiveDate> {
    let bytes = s.as_bytes();
    let well_formed = bytes.len() == 10
        && bytes.iter().enumerate().all(|(i, b)| match i {
            4 | 7 => *b == b'-',
            _ => b.is_ascii_digit(),
        });
    if !well_formed {
        return None;
    }

    NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()
}

/// Renders a decimal without trailing fractional zeros: `100.0000000000`
/// becomes `100`, `1.2300` becomes `1.23`.
pub fn format_rate(value: Decimal) -> String {
    value.normalize().to_string()
}
