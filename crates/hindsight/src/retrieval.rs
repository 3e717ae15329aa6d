use std::sync::Arc;

use crate::index::{Ranked, SimilarityIndex};
use crate::ticket::{document_text, Ticket};

/// Number of similar tickets handed to the suggestion generator by default
pub const DEFAULT_TOP_K: usize = 3;

/// Finds the historical tickets closest to a new one
#[derive(Debug, Clone)]
pub struct Retriever {
  index: Arc<SimilarityIndex>,
  top_k: usize,
}

impl Retriever {
  pub fn new(index: Arc<SimilarityIndex>) -> Self {
    Self { index, top_k: DEFAULT_TOP_K }
  }

  pub fn with_top_k(mut self, top_k: usize) -> Self {
    self.top_k = top_k;
    self
  }

  pub fn top_k(&self) -> usize {
    self.top_k
  }

  pub fn index(&self) -> &Arc<SimilarityIndex> {
    &self.index
  }

  /// Swap in a freshly built index; in-flight callers keep their own `Arc`
  pub fn replace_index(&mut self, index: Arc<SimilarityIndex>) {
    self.index = index;
  }

  pub fn similar_to(&self, ticket: &Ticket) -> Vec<Ranked<'_>> {
    self.similar_to_text(&ticket.issue, &ticket.description, self.top_k)
  }

  pub fn similar_to_text(&self, issue: &str, description: &str, top_k: usize) -> Vec<Ranked<'_>> {
    self.index.rank(&document_text(issue, description), top_k)
  }

  /// Rank against free text rather than a ticket
  pub fn search(&self, query: &str, top_k: usize) -> Vec<Ranked<'_>> {
    self.index.rank(query, top_k)
  }
}
