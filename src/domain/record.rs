//! Legacy record parsing
//!
//! Each line of a legacy order file is one fixed-width record. Fields are
//! positional, not delimited:
//!
//! | field     | offset | length |
//! |-----------|--------|--------|
//! | userId    | 0      | 10     |
//! | userName  | 10     | 45     |
//! | orderId   | 55     | 10     |
//! | productId | 65     | 10     |
//! | value     | 75     | 12     |
//! | date      | 87     | 8      |
//!
//! Offsets are byte offsets; the format predates any notion of multi-byte
//! text, so non-ASCII lines are rejected rather than sliced on uncertain
//! boundaries. Parsing is strict: short lines and non-numeric id/value
//! fields produce a typed error instead of partial records.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Minimum line width, in bytes, for a complete record.
pub const RECORD_WIDTH: usize = 95;

/// One parsed legacy record: a single user/order/product fact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LegacyRecord {
    pub user_id: i64,
    pub user_name: String,
    pub order_id: i64,
    pub product_id: i64,
    pub value: Decimal,
    /// Raw order date as it appears in the record ("YYYYMMDD").
    pub date: String,
}

/// Reasons a line fails to parse as a legacy record.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RecordError {
    #[error("record is {0} bytes, expected at least {RECORD_WIDTH}")]
    TooShort(usize),

    #[error("record contains non-ASCII bytes")]
    NotAscii,

    #[error("invalid {field} field: {value:?}")]
    InvalidField { field: &'static str, value: String },
}

impl LegacyRecord {
    /// Extract the fixed-width fields from a single line.
    ///
    /// userId and userName are trimmed of surrounding whitespace; the
    /// date substring is returned raw, reformatting happens when the
    /// order is opened.
    pub fn parse(line: &str) -> Result<Self, RecordError> {
        if line.len() < RECORD_WIDTH {
            return Err(RecordError::TooShort(line.len()));
        }
        if !line.is_ascii() {
            return Err(RecordError::NotAscii);
        }

        Ok(Self {
            user_id: parse_int(&line[0..10], "userId")?,
            user_name: line[10..55].trim().to_string(),
            order_id: parse_int(&line[55..65], "orderId")?,
            product_id: parse_int(&line[65..75], "productId")?,
            value: parse_decimal(&line[75..87], "value")?,
            date: line[87..95].to_string(),
        })
    }
}

fn parse_int(raw: &str, field: &'static str) -> Result<i64, RecordError> {
    raw.trim().parse().map_err(|_| RecordError::InvalidField {
        field,
        value: raw.trim().to_string(),
    })
}

fn parse_decimal(raw: &str, field: &'static str) -> Result<Decimal, RecordError> {
    Decimal::from_str(raw.trim()).map_err(|_| RecordError::InvalidField {
        field,
        value: raw.trim().to_string(),
    })
}
