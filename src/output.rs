// src/output.rs

use anyhow::{Context, Result};
use chrono::{NaiveDateTime, NaiveTime};
use csv::WriterBuilder;
use std::{
    fs::{self, OpenOptions},
    path::Path,
};
use tracing::{debug, info};

use crate::process::convert::{format_number, Cell};
use crate::process::{schema::Field, CleanBatch};
use crate::EtlError;

/// Remove any previous output and make sure its directory exists.
///
/// Failing to remove the old file (typically because another program holds
/// it open) is reported as [`EtlError::OutputLocked`].
pub fn prepare_output(path: &Path) -> Result<()> {
    if path.exists() {
        fs::remove_file(path).map_err(|source| EtlError::OutputLocked {
            path: path.to_path_buf(),
            source,
        })?;
        info!(path = %path.display(), "removed previous output");
    }
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir)
            .with_context(|| format!("creating output directory {}", dir.display()))?;
    }
    Ok(())
}

fn render(cell: &Cell, integer_column: bool, date_only: bool) -> String {
    match cell {
        Cell::Missing => String::new(),
        Cell::Text(s) => s.clone(),
        Cell::Number(n) => format_number(*n, integer_column),
        Cell::Date(d) if date_only => d.format("%Y-%m-%d").to_string(),
        Cell::Date(d) => d.format("%Y-%m-%d %H:%M:%S").to_string(),
    }
}

fn at_midnight(d: &NaiveDateTime) -> bool {
    d.time() == NaiveTime::MIN
}

/// Append `batch` to the CSV at `path`, opening and closing the file for
/// this batch only. Returns the number of data rows written.
///
/// The header goes out whenever `write_header` is set, even for a batch with
/// no rows.
pub fn append_batch(path: &Path, batch: &CleanBatch, write_header: bool) -> Result<usize> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("opening {} for append", path.display()))?;
    let mut wtr = WriterBuilder::new().has_headers(false).from_writer(file);

    if write_header {
        wtr.write_record(batch.columns.iter().map(|f| f.name()))
            .context("writing CSV header")?;
    }

    // dates print without a time part when the whole batch sits on midnight
    let date_only = batch
        .records
        .iter()
        .filter_map(|r| match r.get(Field::Date) {
            Cell::Date(d) => Some(d),
            _ => None,
        })
        .all(at_midnight);

    for rec in &batch.records {
        wtr.write_record(
            batch
                .columns
                .iter()
                .map(|f| render(rec.get(*f), batch.integer_columns.contains(f), date_only)),
        )
        .context("writing CSV row")?;
    }
    wtr.flush()
        .with_context(|| format!("flushing {}", path.display()))?;

    debug!(rows = batch.len(), header = write_header, "appended batch");
    Ok(batch.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::process::{transform_batch, RawRecord};
    use serde_json::json;
    use tempfile::tempdir;

    fn batch_of(records: Vec<serde_json::Value>) -> CleanBatch {
        let raw: Vec<RawRecord> = records
            .into_iter()
            .filter_map(|v| v.as_object().cloned())
            .collect();
        transform_batch(raw, "DIAGEO AMERICAS").unwrap()
    }

    fn small(invoice: &str, date: &str, dollars: &str, city: &str) -> serde_json::Value {
        json!({
            "invoice_line_no": invoice,
            "date": date,
            "city": city,
            "zipcode": "50309.0",
            "vendor_name": "DIAGEO AMERICAS",
            "sale_dollars": dollars,
        })
    }

    #[test]
    fn prepare_removes_old_file_and_creates_dir() -> Result<()> {
        let tmp = tempdir()?;
        let out = tmp.path().join("data").join("out.csv");
        prepare_output(&out)?;
        assert!(out.parent().unwrap().is_dir());

        fs::write(&out, "stale\n")?;
        prepare_output(&out)?;
        assert!(!out.exists());
        Ok(())
    }

    #[test]
    fn prepare_reports_locked_output() {
        let tmp = tempdir().unwrap();
        // a directory in place of the file cannot be removed with remove_file
        let out = tmp.path().join("out.csv");
        fs::create_dir(&out).unwrap();

        let err = prepare_output(&out).unwrap_err();
        match err.downcast_ref::<EtlError>() {
            Some(EtlError::OutputLocked { path, .. }) => assert_eq!(path, &out),
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(err.to_string().contains("close any program"));
    }

    #[test]
    fn header_only_when_asked() -> Result<()> {
        let tmp = tempdir()?;
        let out = tmp.path().join("out.csv");

        let first = batch_of(vec![small("INV1", "2021-01-04T00:00:00.000", "12.50", "ames")]);
        let second = batch_of(vec![small("INV2", "2021-01-05T00:00:00.000", "3", "des moines\n")]);
        assert_eq!(append_batch(&out, &first, true)?, 1);
        assert_eq!(append_batch(&out, &second, false)?, 1);

        let text = fs::read_to_string(&out)?;
        assert_eq!(
            text,
            "invoice_and_item_number,date,city,zip_code,vendor_name,sale_dollars\n\
             INV1,2021-01-04,AMES,50309,DIAGEO AMERICAS,12.5\n\
             INV2,2021-01-05,DES MOINES,50309,DIAGEO AMERICAS,3\n"
        );
        Ok(())
    }

    #[test]
    fn empty_first_batch_still_writes_header() -> Result<()> {
        let tmp = tempdir()?;
        let out = tmp.path().join("out.csv");
        let none = batch_of(vec![small("ABC1", "2021-01-04", "5", "ames")]);
        assert!(none.is_empty());

        assert_eq!(append_batch(&out, &none, true)?, 0);
        let text = fs::read_to_string(&out)?;
        assert_eq!(text.lines().count(), 1);
        assert!(text.starts_with("invoice_and_item_number,"));
        Ok(())
    }

    #[test]
    fn times_kept_when_not_midnight() -> Result<()> {
        let tmp = tempdir()?;
        let out = tmp.path().join("out.csv");
        let batch = batch_of(vec![
            small("INV1", "2021-01-04T00:00:00", "1", "ames"),
            small("INV2", "2021-01-04T13:30:00", "1", "ames"),
        ]);
        append_batch(&out, &batch, false)?;
        let text = fs::read_to_string(&out)?;
        assert!(text.contains("2021-01-04 00:00:00"));
        assert!(text.contains("2021-01-04 13:30:00"));
        Ok(())
    }

    #[test]
    fn float_columns_keep_a_fraction() -> Result<()> {
        let tmp = tempdir()?;
        let out = tmp.path().join("out.csv");
        let batch = batch_of(vec![
            small("INV1", "2021-01-04", "12", "ames"),
            small("INV2", "2021-01-04", "12.50", "ames"),
        ]);
        append_batch(&out, &batch, false)?;
        let text = fs::read_to_string(&out)?;
        assert_eq!(
            text,
            "INV1,2021-01-04,AMES,50309,DIAGEO AMERICAS,12.0\n\
             INV2,2021-01-04,AMES,50309,DIAGEO AMERICAS,12.5\n"
        );
        Ok(())
    }

    #[test]
    fn commas_and_missing_values() -> Result<()> {
        let tmp = tempdir()?;
        let out = tmp.path().join("out.csv");
        let mut rec = small("INV1", "2021-01-04", "1", "ames, ia");
        rec["zipcode"] = serde_json::Value::Null;
        let batch = batch_of(vec![rec]);
        append_batch(&out, &batch, false)?;
        let text = fs::read_to_string(&out)?;
        assert_eq!(text, "INV1,2021-01-04,\"AMES, IA\",,DIAGEO AMERICAS,1\n");
        Ok(())
    }
}
