use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::io::Write;
use tracing_subscriber::EnvFilter;

use px::config::Config;
use px::{FileStore, MediaKind, PexelsClient, SavedItems, SearchController, SessionState, Status, StoredCredential};

// --- CLI ---

#[derive(Parser, Debug)]
#[command(author, version = env!("CARGO_PKG_VERSION"), about, long_about = None)]
struct Args {
  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
  /// Search Pexels and print the result grid
  Search {
    /// Query text
    query: String,
    /// Search videos instead of photos
    #[arg(short, long)]
    videos: bool,
    /// Pages to fetch; later pages append, like "load more"
    #[arg(short, long, default_value_t = 1)]
    pages: u32,
    /// Save the Nth result (1-based) after fetching
    #[arg(long, value_name = "N")]
    save: Option<usize>,
  },
  /// List saved items, newest first
  Saved,
  /// Remove a saved item by id (e.g. photo_12345)
  Unsave { id: String },
}

// --- Commands ---

async fn run_search(query: &str, videos: bool, pages: u32, save: Option<usize>) -> Result<()> {
  let credentials = StoredCredential::new(Some(Box::new(prompt_for_key)));
  let mut controller = SearchController::new(PexelsClient::new(), credentials);

  let mut saved = SavedItems::new(FileStore::new()?);
  saved.load(controller.session_mut());

  if videos || Config::load().default_media.as_deref() == Some("videos") {
    controller.set_media_kind(MediaKind::Video);
  }

  controller.start_search(query);
  controller.wait_pending().await;

  for _ in 1..pages {
    if !controller.has_more() {
      break;
    }
    controller.load_more();
    controller.wait_pending().await;
    if matches!(controller.status(), Status::InvalidCredential | Status::ConnectionFailed) {
      break;
    }
  }

  let mut out = std::io::stdout().lock();
  for (i, item) in controller.displayed().iter().enumerate() {
    let marker = if saved.is_saved(controller.session(), &item.id) { "*" } else { " " };
    writeln!(out, "{marker}{:>3}. {} by {} ({})", i + 1, item.id, item.author, item.link)?;
  }
  writeln!(out, "{}", controller.status_line())?;
  if controller.has_more() {
    writeln!(out, "More results may be available; rerun with --pages {}.", pages + 1)?;
  }
  if !controller.history().is_empty() {
    writeln!(out, "Recent: {}", controller.history().join(", "))?;
  }

  if let Some(pick) = save {
    let item = controller
      .displayed()
      .get(pick.saturating_sub(1))
      .cloned()
      .with_context(|| format!("no result #{pick} to save"))?;
    let id = item.id.clone();
    saved.save(controller.session_mut(), item)?;
    writeln!(out, "Saved {id}.")?;
  }
  Ok(())
}

fn list_saved() -> Result<()> {
  let mut session = SessionState::default();
  let mut saved = SavedItems::new(FileStore::new()?);
  saved.load(&mut session);

  if saved.items().is_empty() {
    println!("No saved items yet.");
    return Ok(());
  }
  for item in saved.items() {
    println!("{}  {} by {} ({})", item.id, item.media.label(), item.author, item.link);
  }
  Ok(())
}

fn unsave(id: &str) -> Result<()> {
  let mut session = SessionState::default();
  let mut saved = SavedItems::new(FileStore::new()?);
  saved.load(&mut session);

  if !saved.is_saved(&session, id) {
    println!("{id} is not saved.");
    return Ok(());
  }
  saved.remove(&mut session, id)?;
  println!("Removed {id}.");
  Ok(())
}

// --- Helpers ---

/// Ask for an API key on the terminal. Returns None on EOF or empty input.
fn prompt_for_key() -> Option<String> {
  eprint!("Pexels API key: ");
  std::io::stderr().flush().ok()?;
  let mut line = String::new();
  std::io::stdin().read_line(&mut line).ok()?;
  let key = line.trim();
  if key.is_empty() { None } else { Some(key.to_string()) }
}

// --- Main ---

#[tokio::main]
async fn main() -> Result<()> {
  tracing_subscriber::fmt().with_env_filter(EnvFilter::from_default_env()).with_writer(std::io::stderr).init();

  let args = Args::parse();
  match args.command {
    Command::Search { query, videos, pages, save } => run_search(&query, videos, pages, save).await,
    Command::Saved => list_saved(),
    Command::Unsave { id } => unsave(&id),
  }
}
