//! Canonical, mutable collection of ticket records.
//!
//! The store keeps tickets in insertion order and maintains an id → position
//! map so lookups by id are O(1). Every mutation takes `&mut self`, so a reader
//! holding `&RecordStore` can never observe a half-applied change; callers that
//! share a store across threads serialize writers themselves.

use std::collections::HashMap;
use std::fs;
use std::io::Write;
use std::path::Path;

use crate::error::{HindsightError, Result};
use crate::ticket::{Resolution, Ticket};

#[derive(Debug, Clone, Default)]
pub struct RecordStore {
  tickets: Vec<Ticket>,
  positions: HashMap<String, usize>,
}

impl RecordStore {
  pub fn new() -> Self {
    Self::default()
  }

  /// Build a store from already-normalized records, rejecting duplicate ids
  pub fn from_records(records: impl IntoIterator<Item = Ticket>) -> Result<Self> {
    let mut store = Self::new();
    for ticket in records {
      store.add(ticket)?;
    }
    Ok(store)
  }

  pub fn len(&self) -> usize {
    self.tickets.len()
  }

  pub fn is_empty(&self) -> bool {
    self.tickets.is_empty()
  }

  pub fn contains(&self, id: &str) -> bool {
    self.positions.contains_key(id)
  }

  pub fn get_by_id(&self, id: &str) -> Option<&Ticket> {
    self.positions.get(id).map(|&position| &self.tickets[position])
  }

  /// Positional access into the current ordering, for display only
  pub fn get_by_index(&self, index: usize) -> Option<&Ticket> {
    self.tickets.get(index)
  }

  pub fn list_all(&self) -> &[Ticket] {
    &self.tickets
  }

  pub fn open_tickets(&self) -> impl Iterator<Item = &Ticket> {
    self.tickets.iter().filter(|ticket| !ticket.resolved)
  }

  pub fn resolved_tickets(&self) -> impl Iterator<Item = &Ticket> {
    self.tickets.iter().filter(|ticket| ticket.resolved)
  }

  pub fn add(&mut self, ticket: Ticket) -> Result<()> {
    if self.positions.contains_key(&ticket.id) {
      return Err(HindsightError::duplicate_id(&ticket.id));
    }

    self.positions.insert(ticket.id.clone(), self.tickets.len());
    self.tickets.push(ticket);
    Ok(())
  }

  /// Close an open ticket and take it out of the store.
  ///
  /// Fails with `NotFound` when no open ticket has this id (already-resolved
  /// tickets are not re-resolved) and with `InvalidInput` when the resolution
  /// text is blank. Nothing changes on failure.
  pub fn resolve(&mut self, id: &str, resolution: &Resolution) -> Result<Ticket> {
    resolution.validate()?;

    match self.get_by_id(id) {
      Some(ticket) if !ticket.resolved => {}
      _ => return Err(HindsightError::not_found(id)),
    }

    let mut ticket = self.take(id).ok_or_else(|| HindsightError::not_found(id))?;
    ticket.apply_resolution(resolution);
    Ok(ticket)
  }

  /// Delete a ticket outright. Missing ids are ignored.
  pub fn remove(&mut self, id: &str) -> Option<Ticket> {
    self.take(id)
  }

  fn take(&mut self, id: &str) -> Option<Ticket> {
    let position = self.positions.remove(id)?;
    let ticket = self.tickets.remove(position);

    for shifted in &self.tickets[position..] {
      if let Some(slot) = self.positions.get_mut(&shifted.id) {
        *slot -= 1;
      }
    }

    Some(ticket)
  }

  /// Write a JSON snapshot of every ticket, replacing the file atomically
  pub fn save(&self, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(&self.tickets)
      .map_err(|e| HindsightError::persistence(path.display().to_string(), e))?;
    write_atomically(path, json.as_bytes())
  }

  /// Load a snapshot written by [`RecordStore::save`]; a missing file is an empty store
  pub fn load(path: &Path) -> Result<Self> {
    if !path.exists() {
      return Ok(Self::new());
    }

    let json = fs::read_to_string(path)
      .map_err(|e| HindsightError::persistence(path.display().to_string(), e))?;
    let tickets: Vec<Ticket> = serde_json::from_str(&json)
      .map_err(|e| HindsightError::persistence(path.display().to_string(), e))?;

    Self::from_records(tickets)
  }
}

/// Replace `path` with `contents` via a temp file in the same directory
pub(crate) fn write_atomically(path: &Path, contents: &[u8]) -> Result<()> {
  let target = path.display().to_string();
  let parent = match path.parent() {
    Some(dir) if !dir.as_os_str().is_empty() => dir,
    _ => Path::new("."),
  };

  fs::create_dir_all(parent).map_err(|e| HindsightError::persistence(&target, e))?;

  let mut staged =
    tempfile::NamedTempFile::new_in(parent).map_err(|e| HindsightError::persistence(&target, e))?;
  staged.write_all(contents).map_err(|e| HindsightError::persistence(&target, e))?;
  staged.persist(path).map_err(|e| HindsightError::persistence(&target, e.error))?;

  Ok(())
}
