//! Credential acquisition for provider requests.
//!
//! The core treats the API key as an opaque bearer value and never opens a
//! terminal prompt itself; whoever hosts the controller injects a source.

use tracing::debug;

use crate::config::Config;

/// Where the controller obtains the provider API key.
pub trait CredentialSource {
  /// Produce a key for the next request, or `None` when no key is available
  /// and the user declined to supply one.
  fn credential(&mut self) -> Option<String>;

  /// Forget the current key after the provider rejected it, forcing the
  /// next attempt to acquire a fresh one.
  fn invalidate(&mut self);
}

/// Optional interactive fallback wired in by the binary.
pub type PromptFn = Box<dyn FnMut() -> Option<String> + Send>;

/// Key resolution used by the CLI: the `PEXELS_API_KEY` environment
/// variable, then the key persisted in prefs, then the fallback prompt.
/// A freshly prompted key is written back to prefs for the next run.
pub struct StoredCredential {
  cached: Option<String>,
  prompt: Option<PromptFn>,
}

impl StoredCredential {
  pub fn new(prompt: Option<PromptFn>) -> Self {
    let cached =
      std::env::var("PEXELS_API_KEY").ok().filter(|k| !k.trim().is_empty()).or_else(|| Config::load().api_key);
    Self { cached, prompt }
  }
}

impl CredentialSource for StoredCredential {
  fn credential(&mut self) -> Option<String> {
    if self.cached.is_none()
      && let Some(ref mut prompt) = self.prompt
      && let Some(key) = prompt()
    {
      let key = key.trim().to_string();
      if !key.is_empty() {
        let mut config = Config::load();
        config.api_key = Some(key.clone());
        config.save();
        self.cached = Some(key);
      }
    }
    self.cached.clone()
  }

  fn invalidate(&mut self) {
    debug!("clearing rejected API key");
    self.cached = None;
    let mut config = Config::load();
    if config.api_key.take().is_some() {
      config.save();
    }
  }
}
