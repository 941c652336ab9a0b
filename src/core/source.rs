//! Reads the parent data file into records, one per non-blank row.

use crate::core::Record;
use crate::utils::error::{BridgeError, Result};
use calamine::{open_workbook_auto, Data, Reader};
use serde_json::Value;
use std::collections::HashMap;
use std::path::Path;

const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Clone, Default)]
pub struct SourceTable {
    pub headers: Vec<String>,
    pub records: Vec<Record>,
    pub skipped_blank_rows: usize,
}

/// `.csv` goes through the csv reader, everything else through calamine.
pub fn read_source(path: &str, sheet_name: Option<&str>) -> Result<SourceTable> {
    if !Path::new(path).exists() {
        return Err(BridgeError::SourceError {
            message: format!("Source file not found: {}", path),
        });
    }

    let is_csv = Path::new(path)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("csv"))
        .unwrap_or(false);

    if is_csv {
        read_csv(path)
    } else {
        read_workbook(path, sheet_name)
    }
}

pub fn read_workbook(path: &str, sheet_name: Option<&str>) -> Result<SourceTable> {
    let mut workbook = open_workbook_auto(path)?;

    let sheet = match sheet_name {
        Some(name) => name.to_string(),
        None => workbook
            .sheet_names()
            .first()
            .cloned()
            .ok_or_else(|| BridgeError::SourceError {
                message: format!("Workbook has no sheets: {}", path),
            })?,
    };

    tracing::debug!("Reading sheet '{}' from {}", sheet, path);
    let range = workbook.worksheet_range(&sheet)?;

    // range 可能不是從 A1 開始
    let header_row_number = range.start().map_or(1, |(row, _)| row as usize + 1);

    let mut rows = range.rows();
    let headers: Vec<String> = match rows.next() {
        Some(header_row) => header_row.iter().map(|c| c.to_string()).collect(),
        None => {
            return Err(BridgeError::SourceError {
                message: format!("Sheet '{}' is empty", sheet),
            })
        }
    };

    let mut records = Vec::new();
    let mut skipped_blank_rows = 0;
    for (offset, row) in rows.enumerate() {
        if row.iter().all(|c| c.to_string().trim().is_empty()) {
            skipped_blank_rows += 1;
            continue;
        }

        let mut data = HashMap::new();
        for (header, cell) in headers.iter().zip(row.iter()) {
            if header.is_empty() {
                continue;
            }
            data.insert(header.clone(), cell_to_value(cell));
        }
        records.push(Record {
            data,
            source_row: Some(header_row_number + 1 + offset),
        });
    }

    Ok(SourceTable {
        headers,
        records,
        skipped_blank_rows,
    })
}

pub fn read_csv(path: &str) -> Result<SourceTable> {
    let mut reader = csv::ReaderBuilder::new().flexible(true).from_path(path)?;
    let headers: Vec<String> = reader.headers()?.iter().map(String::from).collect();

    let mut records = Vec::new();
    let mut skipped_blank_rows = 0;
    for row in reader.records() {
        let row = row?;
        if row.iter().all(|field| field.trim().is_empty()) {
            skipped_blank_rows += 1;
            continue;
        }

        let mut data = HashMap::new();
        for (header, field) in headers.iter().zip(row.iter()) {
            let value = if field.is_empty() {
                Value::Null
            } else {
                Value::String(field.to_string())
            };
            data.insert(header.clone(), value);
        }
        records.push(Record {
            data,
            source_row: row.position().map(|p| p.line() as usize),
        });
    }

    Ok(SourceTable {
        headers,
        records,
        skipped_blank_rows,
    })
}

/// 整數值的浮點數轉成整數，日期轉成文字
pub fn cell_to_value(cell: &Data) -> Value {
    match cell {
        Data::Empty | Data::Error(_) => Value::Null,
        Data::String(s) => Value::String(s.clone()),
        Data::Int(i) => Value::from(*i),
        Data::Float(f) => {
            if f.fract() == 0.0 && f.abs() < 9.0e15 {
                Value::from(*f as i64)
            } else {
                serde_json::Number::from_f64(*f)
                    .map(Value::Number)
                    .unwrap_or(Value::Null)
            }
        }
        Data::Bool(b) => Value::Bool(*b),
        Data::DateTime(dt) => match dt.as_datetime() {
            Some(naive) => Value::String(naive.format(DATETIME_FORMAT).to_string()),
            None => Value::String(cell.to_string()),
        },
        Data::DateTimeIso(s) | Data::DurationIso(s) => Value::String(s.clone()),
    }
}
