use hindsight::ingest::{self, IngestError};
use hindsight::RecordStore;
use std::fs;
use tempfile::TempDir;

#[cfg(test)]
mod ingest_tests {
  use super::*;

  #[test]
  fn test_csv_with_spreadsheet_headers() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("dump.CSV");
    fs::write(
      &path,
      "Ticket ID,Issue,Description,Resolution,Agent Name,Resolved\n\
       101,Printer jam,\"Paper stuck, tray 2\",Cleared tray,Sam,True\n\
       102,VPN drops,Every hour,,,False\n",
    )
    .unwrap();

    let tickets = ingest::load_file(&path).unwrap();
    assert_eq!(tickets.len(), 2);
    assert_eq!(tickets[0].id, "101");
    assert_eq!(tickets[0].description, "Paper stuck, tray 2");
    assert!(tickets[0].resolved);
    assert_eq!(tickets[0].agent_name.as_deref(), Some("Sam"));
    assert!(!tickets[1].resolved);
    assert!(tickets[1].resolution.is_none());
  }

  #[test]
  fn test_json_rows_with_numeric_ids() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("dump.json");
    fs::write(
      &path,
      r#"[
        {"ticket_id": 7, "issue": "Mouse lag", "description": "Cursor freezes", "resolution": "New battery", "resolved": true},
        {"ticket_id": 8, "issue": "Screen", "description": "Flicker", "resolution": null}
      ]"#,
    )
    .unwrap();

    let tickets = ingest::load_file(&path).unwrap();
    assert_eq!(tickets[0].id, "7");
    assert!(tickets[0].resolved);
    assert_eq!(tickets[1].id, "8");
    assert!(!tickets[1].resolved);
  }

  #[test]
  fn test_json_index_keyed_columns_keep_row_order() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("dump.json");

    let column = |prefix: &str| {
      (0..12).map(|i| format!("\"{i}\": \"{prefix}{i}\"")).collect::<Vec<_>>().join(", ")
    };
    fs::write(
      &path,
      format!(
        r#"{{"ticket_id": {{{}}}, "issue": {{{}}}, "description": {{{}}}}}"#,
        column("T"),
        column("Issue "),
        column("Description ")
      ),
    )
    .unwrap();

    let tickets = ingest::load_file(&path).unwrap();
    let ids: Vec<_> = tickets.iter().map(|t| t.id.as_str()).collect();
    let expected: Vec<_> = (0..12).map(|i| format!("T{i}")).collect();
    assert_eq!(ids, expected);
    assert_eq!(tickets[10].issue, "Issue 10");
    assert_eq!(tickets[2].description, "Description 2");
  }

  #[test]
  fn test_multiple_files_concatenate_in_order() {
    let temp = TempDir::new().unwrap();
    let csv_path = temp.path().join("a.csv");
    let json_path = temp.path().join("b.json");
    fs::write(&csv_path, "ticket_id,issue,description\n1,a,b\n").unwrap();
    fs::write(&json_path, r#"{"ticket_id": ["2"], "issue": ["c"], "description": ["d"]}"#).unwrap();

    let tickets = ingest::load_files(&[csv_path, json_path]).unwrap();
    let ids: Vec<_> = tickets.iter().map(|t| t.id.as_str()).collect();
    assert_eq!(ids, vec!["1", "2"]);
  }

  #[test]
  fn test_duplicate_ids_surface_at_store_construction() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("dup.csv");
    fs::write(&path, "ticket_id,issue,description\n1,a,b\n1,c,d\n").unwrap();

    let tickets = ingest::load_file(&path).unwrap();
    assert!(RecordStore::from_records(tickets).is_err());
  }

  #[test]
  fn test_unsupported_extension() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("dump.xlsx");
    fs::write(&path, "binary").unwrap();

    let result = ingest::load_file(&path);
    assert!(matches!(result, Err(IngestError::UnsupportedFormat { ref extension, .. }) if extension == "xlsx"));
  }

  #[test]
  fn test_missing_required_column() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("dump.csv");
    fs::write(&path, "ticket_id,issue\n1,a\n").unwrap();

    let error = ingest::load_file(&path).unwrap_err();
    assert!(error.to_string().contains("description"));
  }

  #[test]
  fn test_invalid_flag_value() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("dump.csv");
    fs::write(&path, "ticket_id,issue,description,resolved\n1,a,b,sometimes\n").unwrap();

    assert!(matches!(ingest::load_file(&path), Err(IngestError::InvalidValue { .. })));
  }
}
