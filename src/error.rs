use thiserror::Error;

/// Everything that can fail inside the core. Presentation never handles
/// these directly; the controller folds each one into a status
/// classification before it crosses the boundary.
#[derive(Debug, Error)]
pub enum PxError {
  /// Rejected before any network activity (empty query text).
  #[error("query text is empty")]
  Validation,

  /// The provider rejected the credential (HTTP 401/403).
  #[error("provider rejected the API key")]
  Auth,

  /// Network failure, non-success status, or an undecodable response body.
  #[error("provider request failed: {0}")]
  Transport(String),

  /// The saved-items slot could not be read or written.
  #[error("saved-items store failed: {0}")]
  Storage(String),
}
