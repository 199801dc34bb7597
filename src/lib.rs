//! Core state machine for a Pexels photo/video search session: provider
//! client, pagination, recent-search history, and a durable saved-items
//! shelf. Everything here is presentation-agnostic; rendering and input
//! belong to whoever hosts the controller (the CLI binary, here).

pub mod config;
pub mod constants;
pub mod controller;
pub mod credentials;
pub mod error;
pub mod provider;
pub mod saved;
pub mod session;

pub use controller::{SearchController, Status};
pub use credentials::{CredentialSource, StoredCredential};
pub use error::PxError;
pub use provider::{PexelsClient, SearchProvider};
pub use saved::{FileStore, MemoryStore, SavedItems, SlotStore};
pub use session::{MediaKind, Query, ResultItem, SearchCursor, SessionState};
