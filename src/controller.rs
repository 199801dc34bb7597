//! The search controller: receives user intents, drives the provider, and
//! folds every outcome into a status classification for the presentation
//! layer. Fetches run in spawned tasks and come back over oneshot channels;
//! `check_pending` drains them from the host's event loop.

use std::sync::Arc;

use tokio::sync::oneshot;
use tracing::{debug, info, warn};

use crate::credentials::CredentialSource;
use crate::error::PxError;
use crate::provider::SearchProvider;
use crate::session::{MediaKind, Query, ResultItem, SearchCursor, SessionState};

// --- Types ---

type FetchResult = Result<Vec<ResultItem>, PxError>;

/// Outcome classification consumed by the presentation layer. Every provider
/// failure is folded into one of these; nothing escapes the controller as an
/// unhandled error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Status {
  /// No search issued yet.
  Idle,
  /// The submitted query text was empty.
  EmptyQuery,
  /// A request is in flight.
  Loading,
  /// Results are on display.
  Results { query: String, media: MediaKind },
  /// Page 1 of a fresh search came back empty. Not an error.
  NoResults { query: String },
  /// No API key was available and none was supplied.
  CredentialRequired,
  /// The provider rejected the API key; it has been invalidated.
  InvalidCredential,
  /// Network failure or an unusable provider response.
  ConnectionFailed,
}

impl Status {
  /// Human-readable status line.
  pub fn line(&self) -> String {
    match self {
      Status::Idle => "Search for photos and short videos.".to_string(),
      Status::EmptyQuery => "Enter a search term.".to_string(),
      Status::Loading => "Loading…".to_string(),
      Status::Results { query, media } => format!("Showing {} results for \"{}\".", media.label(), query),
      Status::NoResults { query } => format!("No results for \"{}\". Try a different keyword.", query),
      Status::CredentialRequired => "API key required. Search is disabled.".to_string(),
      Status::InvalidCredential => "Invalid API key. Enter a new one and retry.".to_string(),
      Status::ConnectionFailed => "Something went wrong. Check your connection.".to_string(),
    }
  }
}

/// An outstanding provider fetch. `seq` tags the request with the search it
/// serves; a response whose tag no longer matches the controller's current
/// sequence is stale and is dropped instead of applied.
struct InFlight {
  rx: oneshot::Receiver<FetchResult>,
  seq: u64,
  append: bool,
}

pub struct SearchController<P: SearchProvider, C: CredentialSource> {
  provider: Arc<P>,
  credentials: C,
  session: SessionState,
  status: Status,
  has_more: bool,
  seq: u64,
  pending: Option<InFlight>,
}

impl<P: SearchProvider, C: CredentialSource> SearchController<P, C> {
  pub fn new(provider: P, credentials: C) -> Self {
    Self {
      provider: Arc::new(provider),
      credentials,
      session: SessionState::default(),
      status: Status::Idle,
      has_more: false,
      seq: 0,
      pending: None,
    }
  }

  // --- Intents ---

  /// Begin a fresh search. Empty text is rejected before any network
  /// activity. A fetch already in flight is cancelled: its receiver is
  /// dropped and its sequence tag goes stale, so only this search's results
  /// can ever be applied.
  pub fn start_search(&mut self, text: &str) {
    let query = match Query::new(text, self.session.media) {
      Ok(q) => q,
      Err(_) => {
        debug!("rejected empty query");
        self.status = Status::EmptyQuery;
        return;
      }
    };
    if self.session.is_loading {
      self.cancel_pending();
    }
    info!(query = %query.text, media = query.media.label(), "search");
    self.session.push_history(&query.text);
    self.session.query = Some(query);
    self.session.cursor = SearchCursor::first_page();
    self.session.displayed.clear();
    self.has_more = false;
    self.begin_fetch(false);
  }

  /// Switch the photo/video filter. With an active query this re-issues the
  /// search under the new kind (full reset, never an append).
  pub fn set_media_kind(&mut self, kind: MediaKind) {
    if kind == self.session.media {
      return;
    }
    self.session.media = kind;
    if let Some(text) = self.session.query.as_ref().map(|q| q.text.clone()) {
      self.start_search(&text);
    }
  }

  /// Fetch the next page and append it to the displayed grid. Rejected, not
  /// queued, while a request is already in flight.
  pub fn load_more(&mut self) {
    if self.session.is_loading || self.session.query.is_none() {
      return;
    }
    self.session.cursor.page += 1;
    self.begin_fetch(true);
  }

  /// Re-issue a query from the recent list.
  pub fn rerun_from_history(&mut self, text: &str) {
    self.start_search(text);
  }

  // --- Fetch plumbing ---

  fn begin_fetch(&mut self, append: bool) {
    let Some(credential) = self.credentials.credential() else {
      warn!("no API key available, search aborted");
      self.status = Status::CredentialRequired;
      return;
    };
    let Some(query) = self.session.query.clone() else { return };
    let cursor = self.session.cursor;

    self.session.is_loading = true;
    self.status = Status::Loading;
    self.seq += 1;
    let seq = self.seq;
    debug!(seq, page = cursor.page, append, "fetch dispatched");

    let provider = Arc::clone(&self.provider);
    let (tx, rx) = oneshot::channel();
    tokio::spawn(async move {
      let _ = tx.send(provider.search(&query, &cursor, &credential).await);
    });
    self.pending = Some(InFlight { rx, seq, append });
  }

  fn cancel_pending(&mut self) {
    if self.pending.take().is_some() {
      debug!(seq = self.seq, "cancelled in-flight fetch");
    }
    self.session.is_loading = false;
  }

  /// Drain the in-flight fetch if it has completed. Never blocks; call it
  /// from the host's event loop. Stale-tagged responses are discarded
  /// without touching state.
  pub fn check_pending(&mut self) {
    let Some(mut pending) = self.pending.take() else { return };
    match pending.rx.try_recv() {
      Ok(result) => {
        if pending.seq != self.seq {
          debug!(seq = pending.seq, current = self.seq, "discarding stale response");
          return;
        }
        self.apply_fetch(result, pending.append);
      }
      Err(oneshot::error::TryRecvError::Empty) => {
        self.pending = Some(pending);
      }
      Err(oneshot::error::TryRecvError::Closed) => {
        warn!("fetch task dropped without a result");
        self.session.is_loading = false;
        self.status = Status::ConnectionFailed;
      }
    }
  }

  /// Await the in-flight fetch to completion. Convenience for callers that
  /// drive the controller without an event loop (the CLI, tests).
  pub async fn wait_pending(&mut self) {
    let Some(pending) = self.pending.take() else { return };
    match pending.rx.await {
      Ok(result) => {
        if pending.seq == self.seq {
          self.apply_fetch(result, pending.append);
        }
      }
      Err(_) => {
        warn!("fetch task dropped without a result");
        self.session.is_loading = false;
        self.status = Status::ConnectionFailed;
      }
    }
  }

  fn apply_fetch(&mut self, result: FetchResult, append: bool) {
    self.session.is_loading = false;
    match result {
      Ok(items) => {
        let Some(query) = self.session.query.clone() else { return };
        if !append {
          self.session.displayed.clear();
        }
        if items.is_empty() && !append && self.session.cursor.page == 1 {
          info!(query = %query.text, "no results");
          self.status = Status::NoResults { query: query.text };
          return;
        }
        // Hint only: a full page suggests another one may exist, but the
        // provider can return a short final page early or a full last page.
        self.has_more = items.len() as u32 == self.session.cursor.per_page;
        self.session.displayed.extend(items);
        info!(count = self.session.displayed.len(), more = self.has_more, "results applied");
        self.status = Status::Results { query: query.text, media: query.media };
      }
      Err(PxError::Auth) => {
        warn!("provider rejected the API key");
        self.credentials.invalidate();
        self.status = Status::InvalidCredential;
      }
      Err(e) => {
        warn!(err = %e, "fetch failed");
        self.status = Status::ConnectionFailed;
      }
    }
  }

  // --- Read side for presentation ---

  pub fn status(&self) -> &Status {
    &self.status
  }

  pub fn status_line(&self) -> String {
    self.status.line()
  }

  pub fn displayed(&self) -> &[ResultItem] {
    &self.session.displayed
  }

  pub fn history(&self) -> &[String] {
    &self.session.history
  }

  pub fn is_loading(&self) -> bool {
    self.session.is_loading
  }

  /// Whether a further page might exist. A heuristic, not a guarantee.
  pub fn has_more(&self) -> bool {
    self.has_more
  }

  pub fn media(&self) -> MediaKind {
    self.session.media
  }

  pub fn session(&self) -> &SessionState {
    &self.session
  }

  /// Mutable session access for the saved-items manager, which keeps its
  /// `saved_ids` mirror here.
  pub fn session_mut(&mut self) -> &mut SessionState {
    &mut self.session
  }
}
