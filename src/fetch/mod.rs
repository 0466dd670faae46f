// src/fetch/mod.rs

use anyhow::{Context, Result};
use reqwest::Client;
use tracing::debug;
use url::Url;

use crate::process::RawRecord;
use crate::{Config, EtlError};

/// Building the SoQL query for one page.
pub mod query {
    use super::*;
    use crate::process::schema::select_clause;
    use chrono::NaiveDateTime;

    const TIMESTAMP: &str = "%Y-%m-%dT%H:%M:%S";

    fn quote(s: &str) -> String {
        s.replace('\'', "''")
    }

    /// `$where` clause: vendor substring (case-insensitive) and inclusive date range.
    pub fn where_clause(vendor: &str, from: NaiveDateTime, to: NaiveDateTime) -> String {
        format!(
            "upper(vendor_name) like '%{}%' AND date >= '{}' AND date <= '{}'",
            quote(&vendor.to_uppercase()),
            from.format(TIMESTAMP),
            to.format(TIMESTAMP),
        )
    }

    /// Full request URL for the page starting at `offset`.
    pub fn page_url(config: &Config, offset: u64) -> Result<Url> {
        let mut url = Url::parse(&config.api_url)
            .with_context(|| format!("parsing API URL {}", config.api_url))?;
        url.query_pairs_mut()
            .append_pair(
                "$where",
                &where_clause(&config.vendor, config.date_from, config.date_to),
            )
            .append_pair("$limit", &config.batch_size.to_string())
            .append_pair("$order", "date ASC")
            .append_pair("$offset", &offset.to_string())
            .append_pair("$select", &select_clause());
        Ok(url)
    }
}

/// What one page request produced.
#[derive(Debug)]
pub enum Page {
    Records(Vec<RawRecord>),
    /// The server answered with a non-success status.
    Rejected(u16),
}

/// Anything that can hand out pages by offset.
#[allow(async_fn_in_trait)]
pub trait PageSource {
    async fn fetch_page(&self, offset: u64) -> Result<Page>;
}

/// Decode a response body; anything other than an array of objects is malformed.
pub fn parse_records(body: &str) -> Result<Vec<RawRecord>, EtlError> {
    serde_json::from_str(body).map_err(EtlError::MalformedBatch)
}

/// The open-data endpoint over HTTP.
pub struct SodaClient {
    client: Client,
    config: Config,
}

impl SodaClient {
    pub fn new(client: Client, config: Config) -> Self {
        SodaClient { client, config }
    }
}

impl PageSource for SodaClient {
    async fn fetch_page(&self, offset: u64) -> Result<Page> {
        let url = query::page_url(&self.config, offset)?;
        debug!(%url, "GET page");
        let resp = self
            .client
            .get(url.clone())
            .send()
            .await
            .with_context(|| format!("GET {} failed", url))?;

        let status = resp.status();
        if !status.is_success() {
            return Ok(Page::Rejected(status.as_u16()));
        }

        let body = resp
            .text()
            .await
            .with_context(|| format!("reading body from {}", url))?;
        Ok(Page::Records(parse_records(&body)?))
    }
}
