// src/config.rs

use chrono::{NaiveDate, NaiveDateTime};
use std::path::PathBuf;

/// Iowa liquor sales dataset (Socrata).
pub const API_URL: &str = "https://data.iowa.gov/resource/m3tr-qhgy.json";
pub const OUTPUT_FILE: &str = "data/diageo_2021_2025.csv";
pub const BATCH_SIZE: u64 = 50_000;
pub const VENDOR: &str = "DIAGEO AMERICAS";

/// Everything a run needs to know. The binary always uses `Config::default()`.
#[derive(Debug, Clone)]
pub struct Config {
    pub api_url: String,
    pub output_file: PathBuf,
    pub batch_size: u64,
    /// Case-insensitive substring the vendor name must contain.
    pub vendor: String,
    /// Inclusive lower bound on the record date.
    pub date_from: NaiveDateTime,
    /// Inclusive upper bound on the record date.
    pub date_to: NaiveDateTime,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            api_url: API_URL.to_string(),
            output_file: PathBuf::from(OUTPUT_FILE),
            batch_size: BATCH_SIZE,
            vendor: VENDOR.to_string(),
            date_from: ymd_hms(2021, 1, 1, 0, 0, 0),
            date_to: ymd_hms(2025, 12, 31, 23, 59, 59),
        }
    }
}

fn ymd_hms(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(y, m, d)
        .and_then(|date| date.and_hms_opt(h, min, s))
        .unwrap_or_default()
}
