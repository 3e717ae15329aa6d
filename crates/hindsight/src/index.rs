//! TF-IDF similarity index over a frozen corpus of resolved tickets.
//!
//! Each corpus document (`issue + " " + description`) becomes a sparse,
//! L2-normalized vector of `term count × smoothed idf` weights, so cosine
//! similarity reduces to a dot product. The index never changes after
//! [`SimilarityIndex::build`]; to pick up new tickets build a fresh one.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeMap;

use crate::error::{HindsightError, Result};
use crate::text::tokenize;
use crate::ticket::{document_text, ResolvedTicket, Ticket, NOT_AVAILABLE};

/// Frozen copy of a resolved ticket taken when the index is built
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorpusEntry {
  pub ticket_id: String,
  pub issue: String,
  pub description: String,
  pub resolution: String,
}

impl CorpusEntry {
  pub fn new(
    ticket_id: impl Into<String>,
    issue: impl Into<String>,
    description: impl Into<String>,
    resolution: impl Into<String>,
  ) -> Self {
    Self {
      ticket_id: ticket_id.into(),
      issue: issue.into(),
      description: description.into(),
      resolution: resolution.into(),
    }
  }

  /// Snapshot a ticket into the corpus; open tickets have no place in it
  pub fn from_ticket(ticket: &Ticket) -> Option<Self> {
    if !ticket.resolved {
      return None;
    }

    Some(Self::new(
      ticket.id.clone(),
      ticket.issue.clone(),
      ticket.description.clone(),
      ticket.resolution.clone().unwrap_or_else(|| NOT_AVAILABLE.to_string()),
    ))
  }

  pub fn from_resolved(row: &ResolvedTicket) -> Self {
    Self::new(
      row.ticket_id.clone(),
      row.issue.clone(),
      row.description.clone(),
      row.resolution.clone(),
    )
  }

  pub fn document_text(&self) -> String {
    document_text(&self.issue, &self.description)
  }
}

/// A corpus entry paired with its cosine similarity to a query
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Ranked<'a> {
  pub entry: &'a CorpusEntry,
  pub score: f64,
}

/// Summary of a built index
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndexStats {
  pub documents: usize,
  pub vocabulary: usize,
  pub built_at: DateTime<Utc>,
}

/// Sparse vector as (term column, weight) pairs sorted by column
type SparseVector = Vec<(usize, f64)>;

#[derive(Debug, Clone)]
pub struct SimilarityIndex {
  entries: Vec<CorpusEntry>,
  vocabulary: BTreeMap<String, usize>,
  idf: Vec<f64>,
  vectors: Vec<SparseVector>,
  built_at: DateTime<Utc>,
}

impl SimilarityIndex {
  /// Fit the weighting model over `corpus` and vectorize every entry
  pub fn build(corpus: Vec<CorpusEntry>) -> Result<Self> {
    if corpus.is_empty() {
      return Err(HindsightError::EmptyCorpus);
    }

    let term_counts: Vec<BTreeMap<String, usize>> =
      corpus.iter().map(|entry| count_terms(&entry.document_text())).collect();

    let mut document_frequency: BTreeMap<&str, usize> = BTreeMap::new();
    for counts in &term_counts {
      for term in counts.keys() {
        *document_frequency.entry(term.as_str()).or_insert(0) += 1;
      }
    }

    let documents = corpus.len() as f64;
    let mut vocabulary = BTreeMap::new();
    let mut idf = Vec::with_capacity(document_frequency.len());
    for (column, (term, frequency)) in document_frequency.into_iter().enumerate() {
      vocabulary.insert(term.to_string(), column);
      idf.push(((1.0 + documents) / (1.0 + frequency as f64)).ln() + 1.0);
    }

    let vectors = term_counts
      .iter()
      .map(|counts| weigh(counts, &vocabulary, &idf))
      .collect();

    Ok(Self { entries: corpus, vocabulary, idf, vectors, built_at: Utc::now() })
  }

  pub fn len(&self) -> usize {
    self.entries.len()
  }

  pub fn is_empty(&self) -> bool {
    self.entries.is_empty()
  }

  pub fn vocabulary_len(&self) -> usize {
    self.vocabulary.len()
  }

  pub fn entries(&self) -> &[CorpusEntry] {
    &self.entries
  }

  pub fn stats(&self) -> IndexStats {
    IndexStats {
      documents: self.entries.len(),
      vocabulary: self.vocabulary.len(),
      built_at: self.built_at,
    }
  }

  /// Rank corpus entries by cosine similarity to `query`.
  ///
  /// Returns at most `top_k` entries, highest score first; equal scores keep
  /// corpus order. Terms outside the fitted vocabulary are ignored, so a query
  /// with no known terms scores 0 against everything.
  pub fn rank(&self, query: &str, top_k: usize) -> Vec<Ranked<'_>> {
    let query_vector = weigh(&count_terms(query), &self.vocabulary, &self.idf);

    let mut scored: Vec<(usize, f64)> = self
      .vectors
      .iter()
      .enumerate()
      .map(|(position, vector)| (position, dot(&query_vector, vector)))
      .collect();

    scored.sort_by(|a, b| {
      b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal).then_with(|| a.0.cmp(&b.0))
    });

    scored
      .into_iter()
      .take(top_k)
      .map(|(position, score)| Ranked { entry: &self.entries[position], score })
      .collect()
  }
}

fn count_terms(text: &str) -> BTreeMap<String, usize> {
  let mut counts = BTreeMap::new();
  for token in tokenize(text) {
    *counts.entry(token).or_insert(0) += 1;
  }
  counts
}

/// Project term counts onto the vocabulary and L2-normalize
fn weigh(counts: &BTreeMap<String, usize>, vocabulary: &BTreeMap<String, usize>, idf: &[f64]) -> SparseVector {
  let mut vector: SparseVector = counts
    .iter()
    .filter_map(|(term, &count)| {
      vocabulary.get(term).map(|&column| (column, count as f64 * idf[column]))
    })
    .collect();

  vector.sort_by_key(|&(column, _)| column);

  let norm = vector.iter().map(|(_, weight)| weight * weight).sum::<f64>().sqrt();
  if norm > 0.0 {
    for (_, weight) in vector.iter_mut() {
      *weight /= norm;
    }
  }

  vector
}

fn dot(a: &SparseVector, b: &SparseVector) -> f64 {
  let (mut i, mut j) = (0, 0);
  let mut sum = 0.0;

  while i < a.len() && j < b.len() {
    match a[i].0.cmp(&b[j].0) {
      Ordering::Less => i += 1,
      Ordering::Greater => j += 1,
      Ordering::Equal => {
        sum += a[i].1 * b[j].1;
        i += 1;
        j += 1;
      }
    }
  }

  sum
}

#[cfg(test)]
mod tests {
  use super::*;

  fn entry(id: &str, issue: &str, description: &str) -> CorpusEntry {
    CorpusEntry::new(id, issue, description, format!("fix for {id}"))
  }

  #[test]
  fn test_vocabulary_excludes_stop_words() {
    let index = SimilarityIndex::build(vec![entry("1", "The printer", "is jammed")]).unwrap();
    assert_eq!(index.vocabulary_len(), 2);
  }

  #[test]
  fn test_document_vectors_are_unit_length() {
    let index = SimilarityIndex::build(vec![
      entry("1", "printer jam", "paper stuck paper"),
      entry("2", "vpn drops", "tunnel resets"),
    ])
    .unwrap();

    for vector in &index.vectors {
      let norm: f64 = vector.iter().map(|(_, w)| w * w).sum::<f64>().sqrt();
      assert!((norm - 1.0).abs() < 1e-9);
    }
  }

  #[test]
  fn test_rarer_terms_weigh_more() {
    let index = SimilarityIndex::build(vec![
      entry("1", "email sync", "outlook"),
      entry("2", "email bounce", "gateway"),
      entry("3", "email quota", "mailbox"),
    ])
    .unwrap();

    let email = index.vocabulary["email"];
    let outlook = index.vocabulary["outlook"];
    assert!(index.idf[outlook] > index.idf[email]);
    assert!((index.idf[email] - 1.0).abs() < 1e-12);
  }

  #[test]
  fn test_dot_of_disjoint_vectors_is_zero() {
    assert_eq!(dot(&vec![(0, 1.0)], &vec![(1, 1.0)]), 0.0);
    assert_eq!(dot(&vec![], &vec![(1, 1.0)]), 0.0);
  }

  #[test]
  fn test_stop_word_only_corpus_still_builds() {
    let index = SimilarityIndex::build(vec![entry("1", "the", "and of")]).unwrap();
    assert_eq!(index.vocabulary_len(), 0);

    let ranked = index.rank("anything at all", 5);
    assert_eq!(ranked.len(), 1);
    assert_eq!(ranked[0].score, 0.0);
  }
}
