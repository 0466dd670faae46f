// src/run.rs

use anyhow::Result;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{error, info, warn};

use crate::fetch::{Page, PageSource};
use crate::output::{append_batch, prepare_output};
use crate::process::transform_batch;
use crate::Config;

/// Why pagination ended.
#[derive(Debug, Clone, PartialEq)]
pub enum StopReason {
    /// The source returned an empty page.
    Exhausted,
    /// Non-success HTTP status.
    RequestFailed(u16),
    /// Fetch, clean or write failed; carries the error text.
    Failed(String),
}

/// Progress after one saved page.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchReport {
    pub batch: u64,
    pub offset: u64,
    /// Raw records the page returned.
    pub received: usize,
    /// Cleaned rows appended to the file.
    pub saved: usize,
    /// Running total of saved rows.
    pub total: u64,
    pub elapsed: Duration,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub batches: u64,
    pub total_rows: u64,
    pub reports: Vec<BatchReport>,
    /// Time from run start to the end of the last saved batch; zero if none.
    pub elapsed: Duration,
    pub stop: StopReason,
}

impl RunSummary {
    pub fn elapsed_minutes(&self) -> f64 {
        (self.elapsed.as_secs_f64() / 60.0 * 100.0).round() / 100.0
    }
}

enum Step {
    Done,
    Rejected(u16),
    Saved { received: usize, saved: usize },
}

async fn step<S: PageSource>(source: &S, config: &Config, offset: u64) -> Result<Step> {
    let raw = match source.fetch_page(offset).await? {
        Page::Rejected(status) => return Ok(Step::Rejected(status)),
        Page::Records(raw) if raw.is_empty() => return Ok(Step::Done),
        Page::Records(raw) => raw,
    };
    let received = raw.len();
    let clean = transform_batch(raw, &config.vendor)?;
    // header belongs to the first page only, whatever it held
    let saved = append_batch(&config.output_file, &clean, offset == 0)?;
    Ok(Step::Saved { received, saved })
}

/// Rebuild the output file from scratch, one page at a time.
///
/// Only a failure to clear the previous output is returned as an error.
/// Anything that goes wrong once paging has started ends the loop, is
/// logged, and shows up in [`RunSummary::stop`]; rows already written stay.
pub async fn run<S: PageSource>(source: &S, config: &Config) -> Result<RunSummary> {
    prepare_output(&config.output_file)?;
    info!(
        vendor = %config.vendor,
        from = %config.date_from.date(),
        to = %config.date_to.date(),
        "fetching sales"
    );

    let start = Instant::now();
    let mut offset = 0u64;
    let mut batches = 0u64;
    let mut total_rows = 0u64;
    let mut elapsed = Duration::ZERO;
    let mut reports = Vec::new();

    let stop = loop {
        match step(source, config, offset).await {
            Ok(Step::Done) => {
                info!("no more data to fetch");
                break StopReason::Exhausted;
            }
            Ok(Step::Rejected(status)) => {
                warn!(status, offset, "request failed");
                break StopReason::RequestFailed(status);
            }
            Ok(Step::Saved { received, saved }) => {
                batches += 1;
                total_rows += saved as u64;
                elapsed = start.elapsed();
                let report = BatchReport {
                    batch: batches,
                    offset,
                    received,
                    saved,
                    total: total_rows,
                    elapsed,
                };
                info!(
                    batch = report.batch,
                    received = report.received,
                    saved = report.saved,
                    total = report.total,
                    elapsed = ?report.elapsed,
                    "batch saved"
                );
                reports.push(report);
                offset += config.batch_size;
            }
            Err(e) => {
                error!(offset, "aborting run: {:#}", e);
                break StopReason::Failed(format!("{:#}", e));
            }
        }
    };

    let summary = RunSummary {
        batches,
        total_rows,
        reports,
        elapsed,
        stop,
    };
    info!(
        minutes = summary.elapsed_minutes(),
        rows = summary.total_rows,
        "finished"
    );
    info!(path = %config.output_file.display(), "output written");
    Ok(summary)
}
