//! The durable saved-items shelf: a slot-store port, file and in-memory
//! backends, and the manager that keeps the persisted list and the session
//! mirror in sync.

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use directories::ProjectDirs;
use tracing::{debug, warn};

use crate::constants::constants;
use crate::error::PxError;
use crate::session::{ResultItem, SessionState};

/// A single named slot of durable text. The saved list is serialized into it
/// wholesale on every mutation; there is no incremental persistence.
pub trait SlotStore {
  /// `Ok(None)` means the slot has never been written.
  fn read(&self) -> Result<Option<String>, PxError>;
  fn write(&self, payload: &str) -> Result<(), PxError>;
}

/// File-backed slot under the platform data directory.
pub struct FileStore {
  path: PathBuf,
}

impl FileStore {
  pub fn new() -> Result<Self, PxError> {
    let proj_dirs =
      ProjectDirs::from("", "", "px").ok_or_else(|| PxError::Storage("no home directory available".to_string()))?;
    let dir = proj_dirs.data_dir();
    std::fs::create_dir_all(dir).map_err(|e| PxError::Storage(e.to_string()))?;
    Ok(Self { path: dir.join(&constants().storage_slot) })
  }
}

impl SlotStore for FileStore {
  fn read(&self) -> Result<Option<String>, PxError> {
    match std::fs::read_to_string(&self.path) {
      Ok(content) => Ok(Some(content)),
      Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
      Err(e) => Err(PxError::Storage(e.to_string())),
    }
  }

  fn write(&self, payload: &str) -> Result<(), PxError> {
    std::fs::write(&self.path, payload).map_err(|e| PxError::Storage(e.to_string()))
  }
}

/// In-memory slot sharing one cell across clones, so a test can hand the
/// same slot to a second manager and simulate a fresh session.
#[derive(Clone, Default)]
pub struct MemoryStore {
  slot: Arc<Mutex<Option<String>>>,
}

impl SlotStore for MemoryStore {
  fn read(&self) -> Result<Option<String>, PxError> {
    Ok(self.slot.lock().map_err(|_| PxError::Storage("slot lock poisoned".to_string()))?.clone())
  }

  fn write(&self, payload: &str) -> Result<(), PxError> {
    *self.slot.lock().map_err(|_| PxError::Storage("slot lock poisoned".to_string()))? = Some(payload.to_string());
    Ok(())
  }
}

/// The user-curated saved set, newest saves first.
///
/// The slot store is the sole durable owner; `SessionState.saved_ids` is a
/// derived mirror that every operation here keeps in step.
pub struct SavedItems<S: SlotStore> {
  store: S,
  items: Vec<ResultItem>,
}

impl<S: SlotStore> SavedItems<S> {
  pub fn new(store: S) -> Self {
    Self { store, items: Vec::new() }
  }

  /// Read the saved list from the store and rebuild the session mirror.
  /// A missing, empty, or corrupt slot loads as an empty list; startup must
  /// never fail on cached state.
  pub fn load(&mut self, session: &mut SessionState) {
    self.items = match self.store.read() {
      Ok(Some(raw)) if !raw.trim().is_empty() => match serde_json::from_str(&raw) {
        Ok(items) => items,
        Err(e) => {
          warn!(err = %e, "saved slot is corrupt, starting empty");
          Vec::new()
        }
      },
      Ok(_) => Vec::new(),
      Err(e) => {
        warn!(err = %e, "saved slot unreadable, starting empty");
        Vec::new()
      }
    };
    session.saved_ids = self.items.iter().map(|i| i.id.clone()).collect();
  }

  /// Membership test against the session mirror.
  pub fn is_saved(&self, session: &SessionState, id: &str) -> bool {
    session.saved_ids.contains(id)
  }

  /// Save a result at the front of the list. Already-saved ids are left
  /// alone, keeping the id-uniqueness invariant of the saved set.
  pub fn save(&mut self, session: &mut SessionState, item: ResultItem) -> Result<(), PxError> {
    if session.saved_ids.contains(&item.id) {
      return Ok(());
    }
    session.saved_ids.insert(item.id.clone());
    self.items.insert(0, item);
    self.persist()
  }

  /// Remove every entry with this id (at most one, given the invariant).
  /// Unknown ids are a no-op and do not touch the store.
  pub fn remove(&mut self, session: &mut SessionState, id: &str) -> Result<(), PxError> {
    let before = self.items.len();
    self.items.retain(|i| i.id != id);
    session.saved_ids.remove(id);
    if self.items.len() == before {
      return Ok(());
    }
    self.persist()
  }

  /// The saved list, newest first.
  pub fn items(&self) -> &[ResultItem] {
    &self.items
  }

  fn persist(&self) -> Result<(), PxError> {
    let payload = serde_json::to_string(&self.items).map_err(|e| PxError::Storage(e.to_string()))?;
    self.store.write(&payload)?;
    debug!(count = self.items.len(), "saved list persisted");
    Ok(())
  }
}
