use log::debug;
use reqwest::Client;
use serde::Deserialize;

use crate::error::FetchError;

pub const DEFAULT_FEED_URL: &str =
    "https://www.ecb.europa.eu/stats/eurofxref/eurofxref-hist-90d.xml";

/// One quote as found in the feed, before any validation.
#[derive(Debug, Clone, PartialEq)]
pub struct RawRate {
    pub date: String,
    pub currency: String,
    pub rate: String,
}

#[derive(Debug, Deserialize, PartialEq)]
pub struct CurrencyCube {
    #[serde(rename = "@currency")]
    pub currency: String,
    #[serde(rename = "@rate")]
    pub rate: String,
}

#[derive(Debug, Deserialize, PartialEq)]
pub struct DailyCube {
    #[serde(rename = "@time")]
    pub time: String,
    #[serde(rename = "Cube", default)]
    pub rates: Vec<CurrencyCube>,
}

#[derive(Debug, Deserialize, PartialEq)]
pub struct Cube {
    #[serde(rename = "Cube", default)]
    pub days: Vec<DailyCube>,
}

/// `<gesmes:Envelope>` root. Only the outer `Cube` is of interest, sender
/// and subject elements are skipped.
#[derive(Debug, Deserialize, PartialEq)]
pub struct Envelope {
    #[serde(rename = "Cube")]
    pub cube: Cube,
}

impl Envelope {
    /// Flattens the date groups, copying each group's date onto its quotes.
    pub fn into_raw_rates(self) -> Vec<RawRate> {
        self.cube
            .days
            .into_iter()
            .flat_map(|day| {
                let date = day.time;
                day.rates.into_iter().map(move |cube| RawRate {
                    date: date.clone(),
                    currency: cube.currency,
                    rate: cube.rate,
                })
            })
            .collect()
    }
}

pub fn parse_rates(xml: &str) -> Result<Vec<RawRate>, FetchError> {
    let envelope: Envelope = quick_xml::de::from_str(xml)?;
    Ok(envelope.into_raw_rates())
}

pub async fn fetch_rates(client: &Client, url: &str) -> Result<Vec<RawRate>, FetchError> {
    let text = load_xml(client, url).await?;
    debug!("downloaded {} bytes from {}", text.len(), url);

    parse_rates(&text)
}

async fn load_xml(client: &Client, url: &str) -> Result<String, FetchError> {
    let resp = client.get(url).send().await?;
    if !resp.status().is_success() {
        return Err(FetchError::Status(resp.status()));
    }

    let text = resp.text().await?;

    Ok(text)
}
