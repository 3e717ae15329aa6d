use crate::error::{HindsightError, Result};
use crate::resolved_log::ResolvedLog;
use crate::store::RecordStore;
use crate::ticket::{Resolution, ResolvedTicket, Ticket};

/// Moves tickets from the open store into the resolved log.
///
/// A ticket is appended to the log (and persisted) before it leaves the store,
/// so a failed write never loses the open ticket.
pub struct ResolutionWorkflow<'a> {
  store: &'a mut RecordStore,
  log: &'a mut ResolvedLog,
}

impl<'a> ResolutionWorkflow<'a> {
  pub fn new(store: &'a mut RecordStore, log: &'a mut ResolvedLog) -> Self {
    Self { store, log }
  }

  /// Resolve the open ticket `id`, returning the closed ticket
  pub fn resolve(&mut self, id: &str, resolution: &Resolution) -> Result<Ticket> {
    resolution.validate()?;

    let mut pending = match self.store.get_by_id(id) {
      Some(ticket) if !ticket.resolved => ticket.clone(),
      _ => return Err(HindsightError::not_found(id)),
    };
    pending.apply_resolution(resolution);

    self.log.append(ResolvedTicket::from_ticket(&pending))?;
    self.store.resolve(id, resolution)
  }

  /// Take a row back out of the resolved log; unknown ids are ignored
  pub fn forget(&mut self, ticket_id: &str) -> Result<Option<ResolvedTicket>> {
    self.log.remove(ticket_id)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::fs;
  use tempfile::TempDir;

  #[test]
  fn test_failed_persistence_keeps_open_ticket() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("resolved.csv");
    let mut log = ResolvedLog::open(&path).unwrap();
    // A directory where the log file should be makes every append fail
    fs::create_dir_all(&path).unwrap();

    let mut store = RecordStore::from_records(vec![Ticket::new("A", "Disk full", "C: at 100%")]).unwrap();

    let result =
      ResolutionWorkflow::new(&mut store, &mut log).resolve("A", &Resolution::new("Cleaned temp files", true));

    assert!(matches!(result, Err(HindsightError::Persistence { .. })));
    assert!(store.contains("A"));
    assert!(!store.get_by_id("A").unwrap().resolved);
    assert!(log.is_empty());
  }

  #[test]
  fn test_resolve_missing_ticket_touches_nothing() {
    let mut store = RecordStore::from_records(vec![Ticket::new("A", "a", "b")]).unwrap();
    let mut log = ResolvedLog::in_memory();

    let result = ResolutionWorkflow::new(&mut store, &mut log).resolve("Z", &Resolution::new("x", false));

    assert!(result.map_err(|e| e.is_not_found()).unwrap_err());
    assert_eq!(store.len(), 1);
    assert!(log.is_empty());
  }
}
