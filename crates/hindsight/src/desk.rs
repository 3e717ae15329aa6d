//! The desk owns every piece of mutable state for one process.
//!
//! It is built once at startup and passed by reference to whatever handles
//! requests; mutating calls take `&mut self`, which gives the single-writer
//! discipline the store and log rely on.

use anyhow::{Context, Result};
use serde::Serialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::config::{Config, HISTORY_FILE, OPEN_TICKETS_FILE, RESOLVED_LOG_FILE};
use crate::error::HindsightError;
use crate::index::{CorpusEntry, IndexStats, Ranked, SimilarityIndex};
use crate::resolved_log::ResolvedLog;
use crate::retrieval::Retriever;
use crate::store::RecordStore;
use crate::suggest::SuggestionGenerator;
use crate::ticket::{Resolution, ResolvedTicket, Ticket};
use crate::workflow::ResolutionWorkflow;

/// Ranked matches for a ticket plus the generated suggestion
#[derive(Debug, Serialize)]
pub struct Suggestion<'a> {
  pub ticket_id: String,
  pub suggestion: String,
  pub similar: Vec<Ranked<'a>>,
}

pub struct Desk {
  config: Config,
  data_dir: Option<PathBuf>,
  open: RecordStore,
  history: RecordStore,
  resolved: ResolvedLog,
  retriever: Option<Retriever>,
}

impl Desk {
  pub fn new(config: Config, open: RecordStore, history: RecordStore, resolved: ResolvedLog) -> Self {
    let mut desk = Self { config, data_dir: None, open, history, resolved, retriever: None };
    desk.refresh_index();
    desk
  }

  /// Load config, snapshots and the resolved log from `data_dir`
  pub fn open_dir(data_dir: &Path) -> Result<Self> {
    let config = Config::load(data_dir)?;
    let open = RecordStore::load(&data_dir.join(OPEN_TICKETS_FILE)).context("Failed to load open tickets")?;
    let history = RecordStore::load(&data_dir.join(HISTORY_FILE)).context("Failed to load ticket history")?;
    let resolved =
      ResolvedLog::open(data_dir.join(RESOLVED_LOG_FILE)).context("Failed to load resolved tickets")?;

    tracing::debug!(
      open = open.len(),
      history = history.len(),
      resolved = resolved.len(),
      "loaded desk from {}",
      data_dir.display()
    );

    let mut desk = Self::new(config, open, history, resolved);
    desk.data_dir = Some(data_dir.to_path_buf());
    Ok(desk)
  }

  /// Write the open and history snapshots; the resolved log persists on its own
  pub fn save(&self) -> Result<()> {
    if let Some(dir) = &self.data_dir {
      self.open.save(&dir.join(OPEN_TICKETS_FILE)).context("Failed to save open tickets")?;
      self.history.save(&dir.join(HISTORY_FILE)).context("Failed to save ticket history")?;
    }
    Ok(())
  }

  pub fn config(&self) -> &Config {
    &self.config
  }

  pub fn open_tickets(&self) -> &RecordStore {
    &self.open
  }

  pub fn history(&self) -> &RecordStore {
    &self.history
  }

  pub fn resolved_log(&self) -> &ResolvedLog {
    &self.resolved
  }

  /// Queue a new ticket; ids already in the resolved log are duplicates
  pub fn add_ticket(&mut self, ticket: Ticket) -> crate::Result<()> {
    self.ensure_not_resolved(&ticket)?;
    self.open.add(ticket)
  }

  /// Add tickets to the open queue; nothing is added if any id collides
  pub fn import_open(&mut self, tickets: Vec<Ticket>) -> crate::Result<usize> {
    for ticket in &tickets {
      self.ensure_not_resolved(ticket)?;
    }
    let merged = merge(&self.open, tickets)?;
    let added = merged.len() - self.open.len();
    self.open = merged;
    Ok(added)
  }

  /// Add historical tickets and rebuild the index over the larger corpus
  pub fn import_history(&mut self, tickets: Vec<Ticket>) -> crate::Result<usize> {
    let merged = merge(&self.history, tickets)?;
    let added = merged.len() - self.history.len();
    self.history = merged;
    self.refresh_index();
    Ok(added)
  }

  // Resolved ids stay closed until forgotten
  fn ensure_not_resolved(&self, ticket: &Ticket) -> crate::Result<()> {
    match self.resolved.get(&ticket.id) {
      Some(_) => Err(HindsightError::duplicate_id(&ticket.id)),
      None => Ok(()),
    }
  }

  /// Resolved history tickets, then resolved-log rows, first occurrence of each id
  pub fn corpus(&self) -> Vec<CorpusEntry> {
    let mut seen = HashSet::new();
    let from_history = self.history.resolved_tickets().filter_map(CorpusEntry::from_ticket);
    let from_log = self
      .resolved
      .entries()
      .iter()
      .filter(|_| self.config.corpus_includes_resolved_log)
      .map(CorpusEntry::from_resolved);

    from_history.chain(from_log).filter(|entry| seen.insert(entry.ticket_id.clone())).collect()
  }

  /// Build a new index from the current corpus and swap it in
  pub fn rebuild_index(&mut self) -> crate::Result<IndexStats> {
    let index = Arc::new(SimilarityIndex::build(self.corpus())?);
    let stats = index.stats();

    self.retriever = Some(match self.retriever.take() {
      Some(mut retriever) => {
        retriever.replace_index(index);
        retriever
      }
      None => Retriever::new(index).with_top_k(self.config.top_k),
    });

    tracing::info!(documents = stats.documents, vocabulary = stats.vocabulary, "similarity index rebuilt");
    Ok(stats)
  }

  fn refresh_index(&mut self) {
    if let Err(e) = self.rebuild_index() {
      tracing::debug!("similarity search unavailable: {e}");
      self.retriever = None;
    }
  }

  pub fn retriever(&self) -> crate::Result<&Retriever> {
    self.retriever.as_ref().ok_or(HindsightError::EmptyCorpus)
  }

  pub fn search(&self, query: &str, top_k: usize) -> crate::Result<Vec<Ranked<'_>>> {
    Ok(self.retriever()?.search(query, top_k))
  }

  /// Similar historical tickets for the open ticket `id`
  pub fn similar(&self, id: &str) -> crate::Result<Vec<Ranked<'_>>> {
    let ticket = self.open.get_by_id(id).ok_or_else(|| HindsightError::not_found(id))?;
    Ok(self.retriever()?.similar_to(ticket))
  }

  pub fn suggest(&self, id: &str, generator: &dyn SuggestionGenerator) -> Result<Suggestion<'_>> {
    let ticket = self.open.get_by_id(id).ok_or_else(|| HindsightError::not_found(id))?;
    let similar = self.retriever()?.similar_to(ticket);
    let suggestion = generator
      .generate(&similar, ticket)
      .with_context(|| format!("Failed to generate a suggestion for ticket {id}"))?;

    Ok(Suggestion { ticket_id: id.to_string(), suggestion, similar })
  }

  /// Resolve an open ticket, filling in the configured agent when none is given
  pub fn resolve(&mut self, id: &str, mut resolution: Resolution) -> crate::Result<Ticket> {
    if resolution.agent_name.is_none() {
      resolution.agent_name = self.config.agent_name.clone();
    }

    let ticket = ResolutionWorkflow::new(&mut self.open, &mut self.resolved).resolve(id, &resolution)?;
    tracing::info!(ticket = %ticket.id, "ticket resolved");

    if self.config.reindex_on_resolve {
      self.refresh_index();
    }

    Ok(ticket)
  }

  pub fn forget(&mut self, ticket_id: &str) -> crate::Result<Option<ResolvedTicket>> {
    let forgotten = ResolutionWorkflow::new(&mut self.open, &mut self.resolved).forget(ticket_id)?;
    if forgotten.is_some() {
      tracing::info!(ticket = %ticket_id, "removed from resolved log");
    }
    Ok(forgotten)
  }

  pub fn remove(&mut self, id: &str) -> Option<Ticket> {
    self.open.remove(id)
  }
}

fn merge(store: &RecordStore, tickets: Vec<Ticket>) -> crate::Result<RecordStore> {
  let mut merged = store.clone();
  for ticket in tickets {
    merged.add(ticket)?;
  }
  Ok(merged)
}
