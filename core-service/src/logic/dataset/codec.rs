//! CSV encoding of the three tables.
//!
//! Readers validate the header row before touching any data so that a missing
//! column is reported by name instead of as a generic deserialize failure.

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::constants::{COL_PREDICTED, REQUIRED_COLUMNS};
use crate::error::{PipelineError, PipelineResult};
use super::record::{PredictedRecord, RuleRecord, StudentRecord};

/// Header of the rules table
pub const RULE_COLUMNS: [&str; 7] = [
    "antecedents",
    "consequents",
    "support",
    "confidence",
    "antecedent_support",
    "consequent_support",
    "lift",
];

/// Parse a raw student table
pub fn read_students(data: &[u8]) -> PipelineResult<Vec<StudentRecord>> {
    let rows: Vec<StudentRecord> = read_rows(data, &REQUIRED_COLUMNS)?;
    if rows.is_empty() {
        return Err(PipelineError::malformed("student table has no rows"));
    }
    Ok(rows)
}

/// Parse a predictions table
pub fn read_predictions(data: &[u8]) -> PipelineResult<Vec<PredictedRecord>> {
    let mut required = REQUIRED_COLUMNS.to_vec();
    required.push(COL_PREDICTED);
    read_rows(data, &required)
}

/// Parse a rules table
pub fn read_rules(data: &[u8]) -> PipelineResult<Vec<RuleRecord>> {
    read_rows(data, &RULE_COLUMNS)
}

pub fn write_students(rows: &[StudentRecord]) -> PipelineResult<Vec<u8>> {
    write_rows(rows, &REQUIRED_COLUMNS)
}

pub fn write_predictions(rows: &[PredictedRecord]) -> PipelineResult<Vec<u8>> {
    let mut header = REQUIRED_COLUMNS.to_vec();
    header.push(COL_PREDICTED);
    write_rows(rows, &header)
}

pub fn write_rules(rows: &[RuleRecord]) -> PipelineResult<Vec<u8>> {
    write_rows(rows, &RULE_COLUMNS)
}

fn read_rows<T: DeserializeOwned>(data: &[u8], required: &[&str]) -> PipelineResult<Vec<T>> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(data);

    let headers = reader.headers()?.clone();
    let missing: Vec<&str> = required
        .iter()
        .copied()
        .filter(|col| !headers.iter().any(|h| h == *col))
        .collect();

    if !missing.is_empty() {
        return Err(PipelineError::malformed(format!(
            "missing required columns: {}",
            missing.join(", ")
        )));
    }

    let mut rows = Vec::new();
    for (idx, result) in reader.deserialize::<T>().enumerate() {
        // Row 1 is the header
        let row = result.map_err(|e| {
            PipelineError::malformed(format!("row {}: {}", idx + 2, e))
        })?;
        rows.push(row);
    }

    Ok(rows)
}

fn write_rows<T: Serialize>(rows: &[T], header: &[&str]) -> PipelineResult<Vec<u8>> {
    let mut writer = csv::WriterBuilder::new().from_writer(Vec::new());

    // `serialize` emits the header from the first row; an empty table still gets one
    if rows.is_empty() {
        writer.write_record(header)?;
    }
    for row in rows {
        writer.serialize(row)?;
    }

    writer.into_inner().map_err(|e| PipelineError::Io(e.into_error()))
}
