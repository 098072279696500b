//! Block explorer client for the `account/txlist` API.
//!
//! Etherscan-family explorers (Polygonscan, BscScan, ...) return the full
//! call data of every transaction sent to an address, which is all the
//! reconciliation needs.

use anyhow::{Context, Result};
use noderewards_core::Transaction;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::config::ExplorerConfig;

/// Explorer message for an empty result set.
const NO_TRANSACTIONS: &str = "No transactions found";

/// Raw explorer envelope.
#[derive(Debug, Deserialize)]
struct Envelope {
    status: String,
    message: String,
    result: Value,
}

/// One page of parsed transactions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TxListPage {
    /// Records that parsed into transactions.
    pub transactions: Vec<Transaction>,
    /// Records returned by the explorer, including skipped ones.
    pub raw_count: usize,
    /// Records that failed to parse.
    pub skipped: usize,
}

/// Parse a `txlist` response body.
///
/// Malformed records are logged and skipped; an error status from the
/// explorer is an error.
pub fn parse_txlist_response(body: &str) -> Result<TxListPage> {
    let envelope: Envelope =
        serde_json::from_str(body).context("Explorer response is not valid JSON")?;

    if envelope.status != "1" {
        if envelope.message.starts_with(NO_TRANSACTIONS) {
            return Ok(TxListPage::default());
        }
        let detail = match &envelope.result {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        anyhow::bail!("Explorer returned error: {} ({})", envelope.message, detail);
    }

    let Value::Array(records) = envelope.result else {
        anyhow::bail!("Explorer result is not an array");
    };

    let mut page = TxListPage {
        raw_count: records.len(),
        ..TxListPage::default()
    };
    for record in records {
        match serde_json::from_value::<Transaction>(record) {
            Ok(tx) => page.transactions.push(tx),
            Err(e) => {
                // Log parsing error but continue processing other records
                warn!("Skipping malformed explorer record: {}", e);
                page.skipped += 1;
            }
        }
    }

    Ok(page)
}

/// HTTP client for one contract's transaction history.
#[derive(Clone)]
pub struct ExplorerClient {
    client: Client,
    config: ExplorerConfig,
}

impl ExplorerClient {
    /// Build a client from explorer settings.
    pub fn new(config: &ExplorerConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(concat!("noderewards/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to build explorer HTTP client")?;

        Ok(Self {
            client,
            config: config.clone(),
        })
    }

    /// Fetch one page (1-based) in ascending order.
    pub async fn fetch_page(&self, page: u32) -> Result<TxListPage> {
        let query = [
            ("module", "account".to_string()),
            ("action", "txlist".to_string()),
            ("address", format!("{:#x}", self.config.contract)),
            ("startblock", self.config.start_block.to_string()),
            ("endblock", self.config.end_block.to_string()),
            ("page", page.to_string()),
            ("offset", self.config.page_size.to_string()),
            ("sort", "asc".to_string()),
            ("apikey", self.config.api_key.clone()),
        ];

        let response = self
            .client
            .get(&self.config.api_url)
            .query(&query)
            .send()
            .await
            .with_context(|| format!("Failed to request txlist page {}", page))?
            .error_for_status()
            .with_context(|| format!("Explorer rejected txlist page {}", page))?;

        let body = response
            .text()
            .await
            .with_context(|| format!("Failed to read txlist page {}", page))?;

        parse_txlist_response(&body).with_context(|| format!("Invalid txlist page {}", page))
    }

    /// Fetch the whole history, page by page, until a short page.
    pub async fn fetch_all(&self) -> Result<Vec<Transaction>> {
        info!(
            "Fetching transactions of {:#x} (blocks {}..={})",
            self.config.contract, self.config.start_block, self.config.end_block
        );

        let page_size = self.config.page_size as usize;
        let mut transactions = Vec::new();
        let mut skipped = 0;
        let mut page = 1;

        loop {
            let batch = self.fetch_page(page).await?;
            debug!(
                page,
                records = batch.raw_count,
                skipped = batch.skipped,
                "Fetched txlist page"
            );

            skipped += batch.skipped;
            let done = batch.raw_count < page_size;
            transactions.extend(batch.transactions);
            if done {
                break;
            }

            page += 1;
            tokio::time::sleep(Duration::from_millis(self.config.request_delay_ms)).await;
        }

        info!(
            "Fetched {} transactions in {} pages ({} malformed records skipped)",
            transactions.len(),
            page,
            skipped
        );

        Ok(transactions)
    }
}
