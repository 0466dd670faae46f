// src/process/mod.rs
pub mod convert;
pub mod date_parser;
pub mod schema;
pub mod trimming;

use anyhow::Result;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Value};
use std::collections::{BTreeSet, HashSet};
use tracing::debug;

use convert::{is_integer_text, is_numeric_text, to_date, to_number, value_to_text, Cell};
use schema::{Field, FIELD_COUNT, GEO_COLUMN};

/// One record exactly as the API returned it.
pub type RawRecord = Map<String, Value>;

static INVOICE_ID: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)^(INV|S[0-9])").unwrap());
static DECIMAL_LITERAL: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d+(\.\d+)?$").unwrap());

/// A fixed-schema row, one cell per canonical field.
#[derive(Debug, Clone, PartialEq)]
pub struct SaleRecord {
    cells: [Cell; FIELD_COUNT],
}

impl SaleRecord {
    fn from_raw(raw: &RawRecord) -> Self {
        SaleRecord {
            cells: std::array::from_fn(|i| {
                raw.get(Field::ALL[i].name())
                    .and_then(value_to_text)
                    .map_or(Cell::Missing, Cell::Text)
            }),
        }
    }

    pub fn get(&self, field: Field) -> &Cell {
        &self.cells[field.index()]
    }

    pub fn text(&self, field: Field) -> Option<&str> {
        self.get(field).as_text()
    }

    pub fn number(&self, field: Field) -> Option<f64> {
        self.get(field).as_number()
    }

    fn update(&mut self, field: Field, f: impl FnOnce(Cell) -> Cell) {
        let slot = &mut self.cells[field.index()];
        *slot = f(std::mem::replace(slot, Cell::Missing));
    }
}

/// The cleaned rows of one page plus the canonical columns that page carried.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CleanBatch {
    pub columns: Vec<Field>,
    /// Numeric columns whose every value was a whole number at coercion time.
    pub integer_columns: BTreeSet<Field>,
    pub records: Vec<SaleRecord>,
}

impl CleanBatch {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

fn rename_record(raw: RawRecord) -> RawRecord {
    raw.into_iter()
        .filter(|(k, _)| k != GEO_COLUMN)
        .map(|(k, v)| (schema::rename(&k).to_string(), v))
        .collect()
}

fn vendor_matches(record: &RawRecord, needle: &str) -> bool {
    record
        .get(Field::VendorName.name())
        .and_then(value_to_text)
        .is_some_and(|v| v.to_uppercase().contains(needle))
}

/// Keeps the first occurrence of each invoice id, or of each whole row when
/// the page has no invoice column at all.
fn dedupe(records: Vec<RawRecord>, by_invoice: bool) -> Vec<RawRecord> {
    let invoice = Field::InvoiceAndItemNumber.name();
    let mut seen = HashSet::new();
    records
        .into_iter()
        .filter(|r| {
            let key = if by_invoice {
                r.get(invoice).and_then(value_to_text)
            } else {
                Some(Value::Object(r.clone()).to_string())
            };
            seen.insert(key)
        })
        .collect()
}

/// Clean one page of raw records for `vendor`.
///
/// The steps run in a fixed order: rename, drop geolocation, vendor filter,
/// dedupe, parse dates, coerce numbers, drop non-positive sales, normalize
/// text and zip codes, project to canonical columns, then the validity
/// filters on invoice id, category, vendor and item description.
///
/// Field-level parse failures degrade to missing. An unparseable date fails
/// the whole batch.
pub fn transform_batch(raw: Vec<RawRecord>, vendor: &str) -> Result<CleanBatch> {
    if raw.is_empty() {
        return Ok(CleanBatch::default());
    }
    let received = raw.len();

    let renamed: Vec<RawRecord> = raw.into_iter().map(rename_record).collect();
    let present: BTreeSet<Field> = renamed
        .iter()
        .flat_map(|r| r.keys())
        .filter_map(|k| Field::from_name(k))
        .collect();

    let needle = vendor.to_uppercase();
    let mut matched = renamed;
    matched.retain(|r| vendor_matches(r, &needle));
    debug!(received, kept = matched.len(), "vendor filter");

    let unique = dedupe(matched, present.contains(&Field::InvoiceAndItemNumber));
    debug!(kept = unique.len(), "dedupe");

    let mut records: Vec<SaleRecord> = unique.iter().map(SaleRecord::from_raw).collect();
    let integer_columns: BTreeSet<Field> = Field::NUMERIC
        .into_iter()
        .filter(|f| present.contains(f) && !records.is_empty())
        .filter(|f| records.iter().all(|r| r.text(*f).is_some_and(is_integer_text)))
        .collect();

    for rec in &mut records {
        let date = std::mem::replace(&mut rec.cells[Field::Date.index()], Cell::Missing);
        rec.cells[Field::Date.index()] = to_date(date)?;
        for field in Field::NUMERIC {
            rec.update(field, to_number);
        }
    }

    records.retain(|r| r.number(Field::SaleDollars).is_some_and(|d| d > 0.0));
    debug!(kept = records.len(), "positive sales");

    for rec in &mut records {
        for field in Field::TEXT {
            rec.update(field, |c| match c {
                Cell::Text(s) => Cell::Text(trimming::normalize_text(&s)),
                other => other,
            });
        }
        rec.update(Field::ZipCode, |c| match c {
            Cell::Text(s) => Cell::Text(trimming::clean_zip(&s)),
            other => other,
        });
    }

    let columns: Vec<Field> = Field::ALL
        .into_iter()
        .filter(|f| present.contains(f))
        .collect();

    records.retain(|r| {
        r.text(Field::InvoiceAndItemNumber)
            .is_some_and(|id| INVOICE_ID.is_match(id))
    });
    records.retain(|r| !r.text(Field::CategoryName).is_some_and(is_numeric_text));
    records.retain(|r| !r.text(Field::VendorName).is_some_and(is_numeric_text));
    records.retain(|r| {
        !r.text(Field::ItemDescription)
            .is_some_and(|d| DECIMAL_LITERAL.is_match(d))
    });
    debug!(kept = records.len(), "validity filters");

    Ok(CleanBatch {
        columns,
        integer_columns,
        records,
    })
}
