use anyhow::{anyhow, Context, Result};
use clap::ValueEnum;
use colored::*;
use std::fs;
use std::path::{Path, PathBuf};

use crate::config::{Config, CONFIG_FILE};
use crate::desk::Desk;
use crate::index::Ranked;
use crate::ingest;
use crate::suggest::{build_prompt, NearestResolution};
use crate::ticket::{Resolution, Ticket};

/// Where imported tickets go
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ImportTarget {
  /// The queue of tickets awaiting resolution
  Open,
  /// Past tickets that feed the similarity index
  History,
}

/// Write a default `hindsight.yaml` into the data directory
pub fn init(data_dir: &Path, force: bool) -> Result<()> {
  let path = data_dir.join(CONFIG_FILE);

  if path.exists() && !force {
    println!("Config already exists at {} (use --force to reset it)", path.display());
    return Ok(());
  }

  fs::create_dir_all(data_dir)
    .with_context(|| format!("Failed to create data directory: {}", data_dir.display()))?;
  Config::default().save_to_file(&path)?;

  println!("{} Wrote {}", "✓".green(), path.display());
  Ok(())
}

/// Load ticket dumps into the open queue or the history
pub fn import_tickets(desk: &mut Desk, paths: &[PathBuf], target: ImportTarget) -> Result<()> {
  let tickets = ingest::load_files(paths)?;

  let added = match target {
    ImportTarget::Open => desk.import_open(tickets)?,
    ImportTarget::History => desk.import_history(tickets)?,
  };

  let destination = match target {
    ImportTarget::Open => "open queue",
    ImportTarget::History => "history",
  };
  println!("{} Imported {} tickets into the {}", "✓".green(), added.to_string().cyan(), destination);
  Ok(())
}

pub fn add_ticket(desk: &mut Desk, id: &str, issue: &str, description: &str) -> Result<()> {
  desk.add_ticket(Ticket::new(id, issue, description))?;

  println!("{} Added ticket {}", "✓".green(), id.yellow());
  Ok(())
}

pub fn list_tickets(desk: &Desk, verbose: bool) -> Result<()> {
  let tickets = desk.open_tickets().list_all();

  if tickets.is_empty() {
    println!("No open tickets");
    return Ok(());
  }

  for (position, ticket) in tickets.iter().enumerate() {
    if verbose {
      println!("{:>3}. {} {} - {}", position, ticket.id.yellow(), ticket.issue.bold(), ticket.description.dimmed());
    } else {
      println!("{:>3}. {} {}", position, ticket.id.yellow(), ticket.issue);
    }
  }

  Ok(())
}

/// Show an open ticket by id, or by its position in the queue
pub fn show_ticket(desk: &Desk, id: Option<&str>, index: Option<usize>) -> Result<()> {
  let store = desk.open_tickets();
  let ticket = match (id, index) {
    (Some(id), _) => store.get_by_id(id).ok_or_else(|| anyhow!("Ticket '{}' not found", id))?,
    (None, Some(index)) => store
      .get_by_index(index)
      .ok_or_else(|| anyhow!("No ticket at position {} ({} open)", index, store.len()))?,
    (None, None) => return Err(anyhow!("Either a ticket id or --index is required")),
  };

  println!("=== {} ===", ticket.id.yellow().bold());
  println!("{} {}", "Issue:".bold(), ticket.issue);
  println!("{} {}", "Description:".bold(), ticket.description);
  Ok(())
}

pub fn search(desk: &Desk, query: &str, top_k: usize) -> Result<()> {
  let ranked = desk.search(query, top_k)?;
  display_ranked(&ranked);
  Ok(())
}

/// Retrieve similar tickets for an open ticket and print a suggestion
pub fn suggest(desk: &Desk, id: &str, prompt_only: bool, json: bool) -> Result<()> {
  if prompt_only {
    let ticket = desk.open_tickets().get_by_id(id).ok_or_else(|| anyhow!("Ticket '{}' not found", id))?;
    println!("{}", build_prompt(&desk.similar(id)?, ticket));
    return Ok(());
  }

  let suggestion = desk.suggest(id, &NearestResolution)?;

  if json {
    println!("{}", serde_json::to_string_pretty(&suggestion)?);
  } else {
    display_ranked(&suggestion.similar);
    println!("{} {}", "Suggestion:".green().bold(), suggestion.suggestion);
  }

  Ok(())
}

pub fn resolve_ticket(
  desk: &mut Desk,
  id: &str,
  resolution: &str,
  agent: Option<&str>,
  helpful: bool,
  feedback: Option<&str>,
) -> Result<()> {
  let mut input = Resolution::new(resolution, helpful);
  if let Some(agent) = agent {
    input = input.with_agent(agent);
  }
  if let Some(feedback) = feedback {
    input = input.with_feedback(feedback);
  }

  let ticket = desk.resolve(id, input)?;

  println!("{} Resolved ticket {}", "✓".green(), ticket.id.yellow());
  Ok(())
}

pub fn list_resolved(desk: &Desk) -> Result<()> {
  let rows = desk.resolved_log().entries();

  if rows.is_empty() {
    println!("No resolved tickets");
    return Ok(());
  }

  for row in rows {
    let helpful = if row.ai_suggestion_helpful { "helpful".green() } else { "not helpful".dimmed() };
    println!("{} {} [{}] by {}", row.ticket_id.yellow(), row.issue.bold(), helpful, row.agent_name.cyan());
    println!("    {}", row.resolution);
  }

  if let Some(path) = desk.resolved_log().path() {
    println!("\n{} {}", "Log:".dimmed(), path.display());
  }

  Ok(())
}

pub fn forget_resolved(desk: &mut Desk, id: &str) -> Result<()> {
  match desk.forget(id)? {
    Some(_) => println!("{} Removed {} from resolved tickets", "✓".green(), id.yellow()),
    None => println!("Ticket {} is not in the resolved log", id.yellow()),
  }
  Ok(())
}

/// Delete an open ticket without resolving it
pub fn remove_ticket(desk: &mut Desk, id: &str, force: bool) -> Result<()> {
  if !force {
    println!("Are you sure you want to remove ticket {}? [y/N]", id.yellow());

    let mut input = String::new();
    std::io::stdin().read_line(&mut input)?;

    if !input.trim().to_lowercase().starts_with('y') {
      println!("Removal cancelled");
      return Ok(());
    }
  }

  match desk.remove(id) {
    Some(_) => println!("{} Removed ticket {}", "✓".green(), id.yellow()),
    None => println!("Ticket {} was not in the open queue", id.yellow()),
  }
  Ok(())
}

pub fn reindex(desk: &mut Desk) -> Result<()> {
  let stats = desk.rebuild_index()?;

  println!(
    "{} Indexed {} tickets, {} terms ({})",
    "✓".green(),
    stats.documents.to_string().cyan(),
    stats.vocabulary.to_string().cyan(),
    stats.built_at.format("%Y-%m-%d %H:%M:%S UTC")
  );
  Ok(())
}

fn display_ranked(ranked: &[Ranked<'_>]) {
  if ranked.is_empty() {
    println!("No similar tickets found");
    return;
  }

  for (position, result) in ranked.iter().enumerate() {
    println!(
      "{}. {} {} ({:.3})",
      position + 1,
      result.entry.ticket_id.yellow(),
      result.entry.issue.bold(),
      result.score
    );
    println!("    {}", result.entry.resolution);
  }
}
