//! Append-only log of resolved tickets, persisted as CSV.

use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};

use crate::error::{HindsightError, Result};
use crate::store::write_atomically;
use crate::ticket::ResolvedTicket;

/// Stable header of the resolved-tickets file
pub const COLUMNS: [&str; 8] = [
  "ticket_id",
  "issue",
  "description",
  "resolution",
  "resolved",
  "agent_name",
  "ai_suggestion_helpful",
  "feedback",
];

#[derive(Debug, Clone, Default)]
pub struct ResolvedLog {
  rows: Vec<ResolvedTicket>,
  path: Option<PathBuf>,
}

impl ResolvedLog {
  /// A log that is never written to disk
  pub fn in_memory() -> Self {
    Self::default()
  }

  /// Open the log at `path`, reading any rows already there
  pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
    let path = path.into();
    let rows = if path.exists() { read_rows(&path)? } else { Vec::new() };
    Ok(Self { rows, path: Some(path) })
  }

  pub fn path(&self) -> Option<&Path> {
    self.path.as_deref()
  }

  pub fn entries(&self) -> &[ResolvedTicket] {
    &self.rows
  }

  pub fn len(&self) -> usize {
    self.rows.len()
  }

  pub fn is_empty(&self) -> bool {
    self.rows.is_empty()
  }

  pub fn get(&self, ticket_id: &str) -> Option<&ResolvedTicket> {
    self.rows.iter().find(|row| row.ticket_id == ticket_id)
  }

  /// Persist one row, then record it in memory. A failed write changes nothing.
  pub fn append(&mut self, row: ResolvedTicket) -> Result<()> {
    if let Some(path) = &self.path {
      append_row(path, &row)?;
    }
    self.rows.push(row);
    Ok(())
  }

  /// Drop every row for `ticket_id` and rewrite the file; absent ids are ignored
  pub fn remove(&mut self, ticket_id: &str) -> Result<Option<ResolvedTicket>> {
    let Some(position) = self.rows.iter().position(|row| row.ticket_id == ticket_id) else {
      return Ok(None);
    };

    let remaining: Vec<ResolvedTicket> =
      self.rows.iter().filter(|row| row.ticket_id != ticket_id).cloned().collect();

    if let Some(path) = &self.path {
      write_atomically(path, &encode_rows(path, &remaining)?)?;
    }

    let removed = self.rows[position].clone();
    self.rows = remaining;
    Ok(Some(removed))
  }
}

fn read_rows(path: &Path) -> Result<Vec<ResolvedTicket>> {
  let target = path.display().to_string();
  let mut reader = csv::Reader::from_path(path).map_err(|e| HindsightError::persistence(&target, e))?;

  reader
    .deserialize()
    .map(|row| row.map_err(|e| HindsightError::persistence(&target, e)))
    .collect()
}

fn append_row(path: &Path, row: &ResolvedTicket) -> Result<()> {
  let target = path.display().to_string();

  if let Some(parent) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
    fs::create_dir_all(parent).map_err(|e| HindsightError::persistence(&target, e))?;
  }

  let file = OpenOptions::new()
    .create(true)
    .append(true)
    .open(path)
    .map_err(|e| HindsightError::persistence(&target, e))?;
  let needs_header = file.metadata().map_err(|e| HindsightError::persistence(&target, e))?.len() == 0;

  let mut writer = csv::WriterBuilder::new().has_headers(false).from_writer(file);
  if needs_header {
    writer.write_record(COLUMNS).map_err(|e| HindsightError::persistence(&target, e))?;
  }
  writer.serialize(row).map_err(|e| HindsightError::persistence(&target, e))?;
  writer.flush().map_err(|e| HindsightError::persistence(&target, e))?;

  Ok(())
}

fn encode_rows(path: &Path, rows: &[ResolvedTicket]) -> Result<Vec<u8>> {
  let target = path.display().to_string();
  let mut writer = csv::WriterBuilder::new().has_headers(false).from_writer(Vec::new());

  writer.write_record(COLUMNS).map_err(|e| HindsightError::persistence(&target, e))?;
  for row in rows {
    writer.serialize(row).map_err(|e| HindsightError::persistence(&target, e))?;
  }

  writer.into_inner().map_err(|e| HindsightError::persistence(&target, e.error()))
}
