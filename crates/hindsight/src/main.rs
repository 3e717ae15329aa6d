use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{filter::EnvFilter, fmt, prelude::*};

use hindsight::commands::{self, ImportTarget};
use hindsight::config::get_data_dir;
use hindsight::retrieval::DEFAULT_TOP_K;
use hindsight::Desk;

#[derive(Parser)]
#[command(name = "hindsight")]
#[command(about = "Hindsight - Ticket Resolution Desk\nSuggests resolutions for new tickets from similar past tickets")]
#[command(version)]
struct Cli {
  /// Enable verbose logging
  #[arg(short, long, global = true)]
  verbose: bool,

  #[command(subcommand)]
  command: Commands,
}

// violet ignore chunk
#[derive(Subcommand)]
enum Commands {
  /// Create the data directory with a default config
  Init {
    /// Overwrite an existing config with defaults
    #[arg(short, long)]
    force: bool,
  },
  /// Import tickets from CSV or JSON files
  Import {
    /// Files to load, in order
    #[arg(required = true)]
    files: Vec<PathBuf>,
    /// Destination for the imported tickets
    #[arg(long, value_enum, default_value = "open")]
    into: ImportTarget,
  },
  /// Add a new open ticket
  Add {
    /// Unique ticket id
    id: String,
    /// Short summary of the issue
    issue: String,
    /// Full description
    description: String,
  },
  /// List open tickets
  List {
    /// Show descriptions too
    #[arg(short, long)]
    long: bool,
  },
  /// Show an open ticket
  Show {
    /// Ticket id
    #[arg(required_unless_present = "index")]
    id: Option<String>,
    /// Position in the open queue instead of an id
    #[arg(short, long)]
    index: Option<usize>,
  },
  /// Rank historical tickets against free text
  Search {
    /// Search text (space-separated)
    #[arg(required = true)]
    terms: Vec<String>,
    /// Number of results
    #[arg(short = 'k', long, default_value_t = DEFAULT_TOP_K)]
    top_k: usize,
  },
  /// Suggest a resolution for an open ticket
  Suggest {
    /// Ticket id
    id: String,
    /// Print the generator prompt instead of a suggestion
    #[arg(long)]
    prompt: bool,
    /// Output as JSON
    #[arg(long)]
    json: bool,
  },
  /// Resolve an open ticket
  Resolve {
    /// Ticket id
    id: String,
    /// How the ticket was resolved
    #[arg(short, long)]
    resolution: String,
    /// Agent who resolved it
    #[arg(short, long)]
    agent: Option<String>,
    /// The suggestion was helpful
    #[arg(long)]
    helpful: bool,
    /// Free-form feedback on the suggestion
    #[arg(short, long)]
    feedback: Option<String>,
  },
  /// List resolved tickets
  Resolved,
  /// Remove a ticket from the resolved log
  Forget {
    /// Ticket id
    id: String,
  },
  /// Delete an open ticket without resolving it
  Remove {
    /// Ticket id
    id: String,
    /// Skip confirmation prompt
    #[arg(short, long)]
    force: bool,
  },
  /// Rebuild the similarity index and show its size
  Reindex,
}

fn main() -> Result<()> {
  let cli = Cli::parse();

  let filter = if cli.verbose {
    EnvFilter::new("hindsight=debug,info")
  } else {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("hindsight=warn"))
  };
  tracing_subscriber::registry().with(fmt::layer().with_writer(std::io::stderr)).with(filter).init();

  let data_dir = get_data_dir()?;
  let mut desk = match cli.command {
    Commands::Init { force } => return commands::init(&data_dir, force),
    _ => Desk::open_dir(&data_dir)?,
  };

  match cli.command {
    Commands::Init { .. } => {}
    Commands::Import { files, into } => {
      commands::import_tickets(&mut desk, &files, into)?;
      desk.save()?;
    }
    Commands::Add { id, issue, description } => {
      commands::add_ticket(&mut desk, &id, &issue, &description)?;
      desk.save()?;
    }
    Commands::List { long } => {
      commands::list_tickets(&desk, long)?;
    }
    Commands::Show { id, index } => {
      commands::show_ticket(&desk, id.as_deref(), index)?;
    }
    Commands::Search { terms, top_k } => {
      commands::search(&desk, &terms.join(" "), top_k)?;
    }
    Commands::Suggest { id, prompt, json } => {
      commands::suggest(&desk, &id, prompt, json)?;
    }
    Commands::Resolve { id, resolution, agent, helpful, feedback } => {
      commands::resolve_ticket(&mut desk, &id, &resolution, agent.as_deref(), helpful, feedback.as_deref())?;
      desk.save()?;
    }
    Commands::Resolved => {
      commands::list_resolved(&desk)?;
    }
    Commands::Forget { id } => {
      commands::forget_resolved(&mut desk, &id)?;
    }
    Commands::Remove { id, force } => {
      commands::remove_ticket(&mut desk, &id, force)?;
      desk.save()?;
    }
    Commands::Reindex => {
      commands::reindex(&mut desk)?;
    }
  }

  Ok(())
}
