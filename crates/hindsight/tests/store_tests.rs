use hindsight::store::RecordStore;
use hindsight::workflow::ResolutionWorkflow;
use hindsight::{HindsightError, Resolution, ResolvedLog, Ticket};
use tempfile::TempDir;

#[cfg(test)]
mod store_tests {
  use super::*;

  fn sample_store() -> RecordStore {
    RecordStore::from_records(vec![
      Ticket::new("A", "Printer jam", "Paper stuck in tray"),
      Ticket::new("B", "VPN drops", "Tunnel resets hourly"),
      Ticket::new("C", "Outlook crash", "Closes on startup"),
    ])
    .unwrap()
  }

  #[test]
  fn test_lookup_by_id_and_index() {
    let store = sample_store();

    assert_eq!(store.get_by_id("B").unwrap().issue, "VPN drops");
    assert_eq!(store.get_by_index(2).unwrap().id, "C");
    assert!(store.get_by_id("Z").is_none());
    assert!(store.get_by_index(3).is_none());
  }

  #[test]
  fn test_list_all_keeps_insertion_order() {
    let store = sample_store();
    let ids: Vec<_> = store.list_all().iter().map(|t| t.id.as_str()).collect();
    assert_eq!(ids, vec!["A", "B", "C"]);
  }

  #[test]
  fn test_duplicate_add_leaves_store_unchanged() {
    let mut store = sample_store();

    let result = store.add(Ticket::new("A", "Other", "Different"));
    assert!(matches!(result, Err(HindsightError::DuplicateId { ref id }) if id == "A"));
    assert_eq!(store.len(), 3);
    assert_eq!(store.get_by_id("A").unwrap().issue, "Printer jam");
  }

  #[test]
  fn test_from_records_rejects_duplicates() {
    let result = RecordStore::from_records(vec![Ticket::new("A", "a", "b"), Ticket::new("A", "c", "d")]);
    assert!(matches!(result, Err(HindsightError::DuplicateId { .. })));
  }

  #[test]
  fn test_remove_shifts_positions() {
    let mut store = sample_store();

    assert_eq!(store.remove("A").unwrap().id, "A");
    assert_eq!(store.get_by_index(0).unwrap().id, "B");
    assert_eq!(store.get_by_id("C").unwrap().issue, "Outlook crash");
  }

  #[test]
  fn test_remove_missing_id_leaves_store_unchanged() {
    let mut store = sample_store();
    store.remove("A");
    let before = store.list_all().to_vec();

    assert!(store.remove("A").is_none());
    assert!(store.remove("Z").is_none());

    assert_eq!(store.len(), 2);
    assert_eq!(store.list_all(), before.as_slice());
    assert_eq!(store.get_by_id("C").unwrap().issue, "Outlook crash");
  }

  #[test]
  fn test_resolve_moves_ticket_to_log() {
    let mut store = sample_store();
    let mut log = ResolvedLog::in_memory();

    let resolved = ResolutionWorkflow::new(&mut store, &mut log)
      .resolve("B", &Resolution::new("Updated the VPN client", true).with_agent("Sam"))
      .unwrap();

    assert!(resolved.resolved);
    assert_eq!(resolved.feedback.as_deref(), Some("N/A"));
    assert!(!store.contains("B"));
    assert_eq!(store.len(), 2);

    let row = log.get("B").unwrap();
    assert_eq!(row.agent_name, "Sam");
    assert_eq!(row.feedback, "N/A");
    assert!(row.ai_suggestion_helpful);
  }

  #[test]
  fn test_resolve_twice_is_not_found() {
    let mut store = sample_store();
    let mut log = ResolvedLog::in_memory();
    let mut workflow = ResolutionWorkflow::new(&mut store, &mut log);

    workflow.resolve("A", &Resolution::new("Cleared", false)).unwrap();
    let again = workflow.resolve("A", &Resolution::new("Cleared again", false));

    assert!(matches!(again, Err(HindsightError::NotFound { .. })));
    assert_eq!(log.len(), 1);
  }

  #[test]
  fn test_blank_resolution_is_rejected() {
    let mut store = sample_store();

    let result = store.resolve("A", &Resolution::new("   ", true));
    assert!(matches!(result, Err(HindsightError::InvalidInput { ref field, .. }) if field == "resolution"));
    assert!(store.contains("A"));
  }

  #[test]
  fn test_snapshot_round_trip() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("nested").join("open.json");

    let store = sample_store();
    store.save(&path).unwrap();

    let loaded = RecordStore::load(&path).unwrap();
    assert_eq!(loaded.list_all(), store.list_all());
  }

  #[test]
  fn test_missing_snapshot_is_empty() {
    let temp = TempDir::new().unwrap();
    let store = RecordStore::load(&temp.path().join("absent.json")).unwrap();
    assert!(store.is_empty());
  }
}
