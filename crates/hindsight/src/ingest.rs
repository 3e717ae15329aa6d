//! Loads ticket dumps (CSV or JSON) into normalized [`Ticket`] records.
//!
//! Column names are lowercased with spaces turned into underscores, so
//! "Ticket ID" and "ticket_id" are the same column. Only `ticket_id`,
//! `issue` and `description` are required.

use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::ticket::{parse_flag, Ticket};

#[derive(Error, Debug)]
pub enum IngestError {
  #[error("Unsupported file format '{extension}' for {path}")]
  UnsupportedFormat { path: PathBuf, extension: String },

  #[error("{path}: row {row} is missing required column '{column}'")]
  MissingColumn { path: PathBuf, row: usize, column: String },

  #[error("{path}: row {row} has invalid {column} value '{value}'")]
  InvalidValue { path: PathBuf, row: usize, column: String, value: String },

  #[error("{path}: unrecognized JSON layout, expected an array of rows or an object of columns")]
  UnrecognizedLayout { path: PathBuf },

  #[error("Failed to read {path}: {source}")]
  Io { path: PathBuf, source: std::io::Error },

  #[error("Failed to parse CSV {path}: {source}")]
  Csv { path: PathBuf, source: csv::Error },

  #[error("Failed to parse JSON {path}: {source}")]
  Json { path: PathBuf, source: serde_json::Error },
}

type Row = BTreeMap<String, String>;

/// Load every file in order and concatenate the records
pub fn load_files<P: AsRef<Path>>(paths: &[P]) -> Result<Vec<Ticket>, IngestError> {
  let mut tickets = Vec::new();
  for path in paths {
    tickets.extend(load_file(path.as_ref())?);
  }
  Ok(tickets)
}

pub fn load_file(path: &Path) -> Result<Vec<Ticket>, IngestError> {
  let extension = path
    .extension()
    .and_then(|ext| ext.to_str())
    .map(str::to_lowercase)
    .unwrap_or_default();

  let rows = match extension.as_str() {
    "csv" => read_csv(path)?,
    "json" => read_json(path)?,
    _ => return Err(IngestError::UnsupportedFormat { path: path.to_path_buf(), extension }),
  };

  rows
    .iter()
    .enumerate()
    .map(|(row_number, row)| to_ticket(path, row_number + 1, row))
    .collect()
}

pub fn normalize_column(name: &str) -> String {
  name.trim().to_lowercase().replace(' ', "_")
}

fn read_csv(path: &Path) -> Result<Vec<Row>, IngestError> {
  let csv_error = |source: csv::Error| IngestError::Csv { path: path.to_path_buf(), source };

  let mut reader = csv::Reader::from_path(path).map_err(csv_error)?;
  let headers: Vec<String> = reader.headers().map_err(csv_error)?.iter().map(normalize_column).collect();

  let mut rows = Vec::new();
  for record in reader.records() {
    let record = record.map_err(csv_error)?;
    rows.push(headers.iter().cloned().zip(record.iter().map(str::to_string)).collect());
  }
  Ok(rows)
}

fn read_json(path: &Path) -> Result<Vec<Row>, IngestError> {
  let content = fs::read_to_string(path).map_err(|source| IngestError::Io { path: path.to_path_buf(), source })?;
  let value: Value =
    serde_json::from_str(&content).map_err(|source| IngestError::Json { path: path.to_path_buf(), source })?;

  json_rows(value).ok_or_else(|| IngestError::UnrecognizedLayout { path: path.to_path_buf() })
}

/// Accept `[{...}, ...]` or `{"column": [..] | {"0": ..}}`
fn json_rows(value: Value) -> Option<Vec<Row>> {
  match value {
    Value::Array(items) => items
      .into_iter()
      .map(|item| match item {
        Value::Object(fields) => Some(
          fields
            .into_iter()
            .filter_map(|(key, value)| scalar(&value).map(|text| (normalize_column(&key), text)))
            .collect::<Row>(),
        ),
        _ => None,
      })
      .collect(),
    Value::Object(columns) => {
      let mut rows: BTreeMap<String, Row> = BTreeMap::new();
      let mut order: Vec<String> = Vec::new();

      for (column, cells) in columns {
        let column = normalize_column(&column);
        let cells: Vec<(String, Value)> = match cells {
          Value::Array(values) => values.into_iter().enumerate().map(|(i, v)| (i.to_string(), v)).collect(),
          Value::Object(map) => by_row_index(map),
          _ => return None,
        };

        for (key, cell) in cells {
          if !rows.contains_key(&key) {
            order.push(key.clone());
          }
          let row = rows.entry(key).or_default();
          if let Some(text) = scalar(&cell) {
            row.insert(column.clone(), text);
          }
        }
      }

      Some(order.into_iter().filter_map(|key| rows.remove(&key)).collect())
    }
    _ => None,
  }
}

/// Index-keyed cells in row order; "10" sorts after "9", not after "1"
fn by_row_index(map: Map<String, Value>) -> Vec<(String, Value)> {
  let mut cells: Vec<(String, Value)> = map.into_iter().collect();
  if cells.iter().all(|(key, _)| key.parse::<u64>().is_ok()) {
    cells.sort_by_cached_key(|(key, _)| key.parse::<u64>().unwrap_or(u64::MAX));
  }
  cells
}

fn scalar(value: &Value) -> Option<String> {
  match value {
    Value::Null => None,
    Value::String(text) => Some(text.clone()),
    Value::Bool(flag) => Some(flag.to_string()),
    Value::Number(number) => Some(match number.as_f64() {
      Some(float) if number.is_f64() && float.fract() == 0.0 && fits_i64(float) => format!("{}", float as i64),
      Some(float) if number.is_f64() && float.fract() == 0.0 => format!("{float:.0}"),
      _ => number.to_string(),
    }),
    other => Some(other.to_string()),
  }
}

fn fits_i64(float: f64) -> bool {
  (i64::MIN as f64..i64::MAX as f64).contains(&float)
}

/// Treat blank and spreadsheet-style missing markers as absent
fn present<'a>(row: &'a Row, column: &str) -> Option<&'a str> {
  row.get(column).map(|value| value.trim()).filter(|value| {
    !value.is_empty() && !value.eq_ignore_ascii_case("nan") && !value.eq_ignore_ascii_case("n/a")
  })
}

fn required(path: &Path, row_number: usize, row: &Row, column: &str) -> Result<String, IngestError> {
  row
    .get(column)
    .map(|value| value.trim().to_string())
    .filter(|value| !value.is_empty() || column != "ticket_id")
    .ok_or_else(|| IngestError::MissingColumn {
      path: path.to_path_buf(),
      row: row_number,
      column: column.to_string(),
    })
}

fn flag(path: &Path, row_number: usize, row: &Row, column: &str) -> Result<Option<bool>, IngestError> {
  match present(row, column) {
    None => Ok(None),
    Some(value) => parse_flag(value).map(Some).ok_or_else(|| IngestError::InvalidValue {
      path: path.to_path_buf(),
      row: row_number,
      column: column.to_string(),
      value: value.to_string(),
    }),
  }
}

fn to_ticket(path: &Path, row_number: usize, row: &Row) -> Result<Ticket, IngestError> {
  let mut ticket = Ticket::new(
    required(path, row_number, row, "ticket_id")?,
    required(path, row_number, row, "issue")?,
    required(path, row_number, row, "description")?,
  );

  ticket.resolution = present(row, "resolution").map(str::to_string);
  ticket.agent_name = present(row, "agent_name").map(str::to_string);
  ticket.feedback = present(row, "feedback").map(str::to_string);
  ticket.ai_suggestion_helpful = flag(path, row_number, row, "ai_suggestion_helpful")?;

  // Dumps without a resolved column count a filled-in resolution as resolved
  ticket.resolved = match flag(path, row_number, row, "resolved")? {
    Some(resolved) => resolved,
    None => ticket.resolution.is_some(),
  };

  Ok(ticket)
}
