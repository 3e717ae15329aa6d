//! Boundary to whatever turns ranked matches into a suggested resolution.
//!
//! Text generation itself lives outside this crate; implementors of
//! [`SuggestionGenerator`] receive the ranked matches plus the new ticket and
//! return prose. [`build_prompt`] and [`extract_suggested_solution`] cover the
//! prompt round-trip for model-backed generators.

use anyhow::Result;

use crate::index::Ranked;
use crate::ticket::Ticket;

const SOLUTION_OPEN: &str = "<Suggested Solution>";
const SOLUTION_CLOSE: &str = "</Suggested Solution>";

pub trait SuggestionGenerator {
  fn generate(&self, similar: &[Ranked<'_>], ticket: &Ticket) -> Result<String>;
}

/// Offline generator that proposes the resolution of the closest match
#[derive(Debug, Clone, Copy, Default)]
pub struct NearestResolution;

impl SuggestionGenerator for NearestResolution {
  fn generate(&self, similar: &[Ranked<'_>], _ticket: &Ticket) -> Result<String> {
    match similar.iter().find(|ranked| ranked.score > 0.0) {
      Some(best) => Ok(format!(
        "Ticket {} ({}) looks closest: {}",
        best.entry.ticket_id, best.entry.issue, best.entry.resolution
      )),
      None => Ok("No similar tickets found; investigate from scratch.".to_string()),
    }
  }
}

/// Instruction prompt listing the new ticket and its similar predecessors
pub fn build_prompt(similar: &[Ranked<'_>], ticket: &Ticket) -> String {
  let mut prompt = format!(
    "Here is a new ticket:\nIssue: {}\nDescription: {}\n",
    ticket.issue, ticket.description
  );
  prompt.push_str("The following are similar tickets and their resolutions:\n");

  for (position, ranked) in similar.iter().enumerate() {
    let number = position + 1;
    prompt.push_str(&format!("<Similar Ticket {number}>\n"));
    prompt.push_str(&format!("Ticket ID: {}\n", ranked.entry.ticket_id));
    prompt.push_str(&format!("Issue: {}\n", ranked.entry.issue));
    prompt.push_str(&format!("Description: {}\n", ranked.entry.description));
    prompt.push_str(&format!("Resolution: {}\n", ranked.entry.resolution));
    prompt.push_str(&format!("</Similar Ticket {number}>\n"));
  }

  prompt.push_str(
    "Evaluate whether the similar tickets are relevant and, based on their resolutions, \
     suggest a solution or next steps for the new ticket.\n\
     Respond concisely in the following format:\n\
     <Suggested Solution>\n... your response ...\n</Suggested Solution>\n\
     When referring to similar tickets, use the Ticket ID.",
  );

  prompt
}

/// Pull the answer out of `<Suggested Solution>` tags, or return the trimmed text
pub fn extract_suggested_solution(answer: &str) -> String {
  let Some(start) = answer.find(SOLUTION_OPEN) else {
    return answer.trim().to_string();
  };

  let body = &answer[start + SOLUTION_OPEN.len()..];
  let end = body.find(SOLUTION_CLOSE).unwrap_or(body.len());
  body[..end].trim().to_string()
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::index::CorpusEntry;

  #[test]
  fn test_extract_tagged_solution() {
    let answer = "Thinking...\n<Suggested Solution>\nRestart the spooler\n</Suggested Solution>\nbye";
    assert_eq!(extract_suggested_solution(answer), "Restart the spooler");
  }

  #[test]
  fn test_extract_without_tags_returns_answer() {
    assert_eq!(extract_suggested_solution("  just do it \n"), "just do it");
  }

  #[test]
  fn test_extract_unterminated_tag() {
    assert_eq!(extract_suggested_solution("<Suggested Solution> reboot"), "reboot");
  }

  #[test]
  fn test_prompt_lists_every_match() {
    let first = CorpusEntry::new("11", "VPN drops", "Every hour", "Updated client");
    let second = CorpusEntry::new("12", "VPN slow", "Evenings", "Changed region");
    let similar = vec![Ranked { entry: &first, score: 0.8 }, Ranked { entry: &second, score: 0.4 }];
    let ticket = Ticket::new("N1", "VPN unstable", "Drops during calls");

    let prompt = build_prompt(&similar, &ticket);
    assert!(prompt.contains("Issue: VPN unstable"));
    assert!(prompt.contains("<Similar Ticket 2>"));
    assert!(prompt.contains("Resolution: Changed region"));
  }

  #[test]
  fn test_nearest_resolution_skips_zero_scores() {
    let entry = CorpusEntry::new("1", "Printer", "Jam", "Cleared tray");
    let ticket = Ticket::new("N", "x", "y");

    let none = NearestResolution.generate(&[Ranked { entry: &entry, score: 0.0 }], &ticket).unwrap();
    assert!(none.starts_with("No similar tickets"));

    let some = NearestResolution.generate(&[Ranked { entry: &entry, score: 0.5 }], &ticket).unwrap();
    assert!(some.contains("Cleared tray"));
  }
}
