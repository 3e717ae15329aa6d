//! Hindsight - Ticket Resolution From Past Tickets
//!
//! Keeps the queue of open support tickets, indexes resolved tickets with a
//! TF-IDF model and retrieves the closest historical matches for a new ticket
//! so a suggestion generator (or an operator) can resolve it.

pub mod commands;
pub mod config;
pub mod desk;
pub mod error;
pub mod index;
pub mod ingest;
pub mod resolved_log;
pub mod retrieval;
pub mod store;
pub mod suggest;
pub mod text;
pub mod ticket;
pub mod workflow;

pub use desk::Desk;
pub use error::{HindsightError, Result};
pub use index::{CorpusEntry, Ranked, SimilarityIndex};
pub use resolved_log::ResolvedLog;
pub use retrieval::Retriever;
pub use store::RecordStore;
pub use ticket::{Resolution, ResolvedTicket, Ticket};
