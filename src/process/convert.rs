use chrono::NaiveDateTime;
use serde_json::Value;

use crate::process::date_parser;
use crate::EtlError;

/// One value of a cleaned record.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Missing,
    Text(String),
    Number(f64),
    Date(NaiveDateTime),
}

impl Cell {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Cell::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Cell::Number(n) => Some(*n),
            _ => None,
        }
    }
}

/// JSON value → text. `null` is missing; scalars use their JSON text.
pub fn value_to_text(v: &Value) -> Option<String> {
    match v {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

/// Lenient numeric parse: NaN and anything unparseable become `None`.
pub fn parse_number(s: &str) -> Option<f64> {
    s.trim().parse::<f64>().ok().filter(|n| !n.is_nan())
}

/// Coerce a cell to a number in place of raising on bad input.
pub fn to_number(cell: Cell) -> Cell {
    match cell {
        Cell::Text(s) => parse_number(&s).map_or(Cell::Missing, Cell::Number),
        Cell::Number(n) if n.is_nan() => Cell::Missing,
        Cell::Number(n) => Cell::Number(n),
        _ => Cell::Missing,
    }
}

/// Parse a date cell. Unlike numbers, an unreadable date fails the batch.
pub fn to_date(cell: Cell) -> Result<Cell, EtlError> {
    match cell {
        Cell::Text(s) => date_parser::parse_datetime(&s)
            .map(Cell::Date)
            .ok_or(EtlError::MalformedDate { value: s }),
        other => Ok(other),
    }
}

/// True when the text would read as a plain number (`"12"`, `"-3.5"`, `"1e3"`).
pub fn is_numeric_text(s: &str) -> bool {
    parse_number(s).is_some()
}

/// True when the text reads as a whole number with no fraction or exponent.
pub fn is_integer_text(s: &str) -> bool {
    s.trim().parse::<i64>().is_ok()
}

/// CSV rendering for numbers. Integer columns print bare (`12`); float
/// columns always carry a fraction (`12.0`, `12.5`).
pub fn format_number(n: f64, integer_column: bool) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        if integer_column {
            format!("{}", n as i64)
        } else {
            format!("{:.1}", n)
        }
    } else {
        format!("{}", n)
    }
}
