//! The live data model for one search session: query, cursor, result items,
//! recent-search history, and the saved-set mirror. Nothing here is
//! persisted; the saved-items store in `saved.rs` is the durable side.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::constants::constants;
use crate::error::PxError;

/// Which provider endpoint family a search runs against.
///
/// Serialized with the plural names the provider (and the persisted saved
/// list) uses, so stored items round-trip unchanged.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum MediaKind {
  #[default]
  #[serde(rename = "photos")]
  Photo,
  #[serde(rename = "videos")]
  Video,
}

impl MediaKind {
  pub fn label(self) -> &'static str {
    match self {
      MediaKind::Photo => "photos",
      MediaKind::Video => "videos",
    }
  }

  /// The provider search endpoint for this kind.
  pub fn endpoint(self) -> &'static str {
    match self {
      MediaKind::Photo => constants().photo_endpoint.as_str(),
      MediaKind::Video => constants().video_endpoint.as_str(),
    }
  }
}

/// One logical search: the text plus the endpoint family it targets.
/// Replaced wholesale by the next search; never mutated in place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
  pub text: String,
  pub media: MediaKind,
}

impl Query {
  /// Build a query from user input. Empty or whitespace-only text is the
  /// single validation failure, rejected before any request goes out.
  pub fn new(text: &str, media: MediaKind) -> Result<Self, PxError> {
    let text = text.trim();
    if text.is_empty() {
      return Err(PxError::Validation);
    }
    Ok(Self { text: text.to_string(), media })
  }
}

/// Pagination position. Page is 1-based; `per_page` is fixed for the whole
/// session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchCursor {
  pub page: u32,
  pub per_page: u32,
}

impl SearchCursor {
  pub fn first_page() -> Self {
    Self { page: 1, per_page: constants().per_page }
  }
}

impl Default for SearchCursor {
  fn default() -> Self {
    Self::first_page()
  }
}

/// A provider result normalized to one shape regardless of endpoint.
///
/// `id` is namespaced by media kind (`photo_123` / `video_123`) so photo and
/// video ids from the provider can never collide in the saved set. Field
/// names match the persisted JSON produced by earlier versions of the app.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultItem {
  pub id: String,
  pub media: MediaKind,
  pub thumb: String,
  pub author: String,
  pub link: String,
}

/// Live, non-persisted record of the current session.
///
/// `saved_ids` mirrors the persisted saved list for fast membership checks;
/// the store is the sole durable owner and this set is rebuilt from it on
/// load.
#[derive(Debug, Default)]
pub struct SessionState {
  /// The active query, if a search has been issued.
  pub query: Option<Query>,
  pub cursor: SearchCursor,
  /// The current photo/video filter; copied into each new `Query`.
  pub media: MediaKind,
  pub is_loading: bool,
  /// Recent query texts, most recent first, capped at `history_limit`.
  pub history: Vec<String>,
  /// Results accumulated across load-more calls for the active query.
  pub displayed: Vec<ResultItem>,
  pub saved_ids: HashSet<String>,
}

impl SessionState {
  /// Record a query at the front of the recent list. An existing entry that
  /// matches case-insensitively is removed first, so re-searching moves the
  /// query to the front under its latest casing.
  pub fn push_history(&mut self, text: &str) {
    let lower = text.to_lowercase();
    self.history.retain(|q| q.to_lowercase() != lower);
    self.history.insert(0, text.to_string());
    self.history.truncate(constants().history_limit);
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  // --- Query validation ---

  #[test]
  fn query_trims_text() {
    let q = Query::new("  mountains  ", MediaKind::Photo).unwrap();
    assert_eq!(q.text, "mountains");
  }

  #[test]
  fn query_rejects_empty_text() {
    assert!(matches!(Query::new("", MediaKind::Photo), Err(PxError::Validation)));
    assert!(matches!(Query::new("   ", MediaKind::Video), Err(PxError::Validation)));
  }

  // --- SearchCursor ---

  #[test]
  fn cursor_starts_at_page_one() {
    let cursor = SearchCursor::first_page();
    assert_eq!(cursor.page, 1);
    assert_eq!(cursor.per_page, constants().per_page);
  }

  // --- History ---

  #[test]
  fn history_inserts_most_recent_first() {
    let mut session = SessionState::default();
    session.push_history("cats");
    session.push_history("dogs");
    assert_eq!(session.history, vec!["dogs", "cats"]);
  }

  #[test]
  fn history_dedups_case_insensitively() {
    let mut session = SessionState::default();
    session.push_history("Cat");
    session.push_history("cat");
    assert_eq!(session.history, vec!["cat"]);
  }

  #[test]
  fn history_dedup_moves_entry_to_front() {
    let mut session = SessionState::default();
    session.push_history("cats");
    session.push_history("dogs");
    session.push_history("CATS");
    assert_eq!(session.history, vec!["CATS", "dogs"]);
  }

  #[test]
  fn history_truncates_to_limit() {
    let mut session = SessionState::default();
    for q in ["a", "b", "c", "d", "e", "f"] {
      session.push_history(q);
    }
    assert_eq!(session.history.len(), constants().history_limit);
    assert_eq!(session.history, vec!["f", "e", "d", "c", "b"]);
  }

  // --- Serialization ---

  #[test]
  fn result_item_round_trips_with_plural_media_names() {
    let item = ResultItem {
      id: "photo_42".to_string(),
      media: MediaKind::Photo,
      thumb: "https://example.com/t.jpg".to_string(),
      author: "Ada".to_string(),
      link: "https://example.com/p/42".to_string(),
    };
    let json = serde_json::to_string(&item).unwrap();
    assert!(json.contains("\"media\":\"photos\""));
    let back: ResultItem = serde_json::from_str(&json).unwrap();
    assert_eq!(back, item);
  }
}
