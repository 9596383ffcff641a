use crate::adapters::KeyProvider;
use crate::error::CoreError;
use crate::handle::KeyHandle;
use crate::types::KeyGenProfile;
use std::collections::HashSet;
use std::fmt::Debug;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, OnceLock, PoisonError, RwLock, RwLockReadGuard};

#[derive(Debug, thiserror::Error)]
pub enum KeyStoreError {
  #[error("invalid input: {0}")]
  InvalidInput(String),
  #[error("alias already exists: {0}")]
  AlreadyExists(String),
  #[error("alias not found: {0}")]
  NotFound(String),
  #[error("key handle retired: {0}")]
  Retired(String),
  #[error("refresh listener already registered")]
  AlreadyRegistered,
  #[error("provider failure: {0}")]
  ProviderFailure(String),
  #[error("position {position} out of range for {count} entries")]
  PositionOutOfRange { position: usize, count: usize },
}

impl KeyStoreError {
  /// Out-of-range positions are caller bugs rather than runtime conditions.
  pub fn is_boundary(&self) -> bool {
    matches!(self, KeyStoreError::PositionOutOfRange { .. })
  }
}

impl From<CoreError> for KeyStoreError {
  fn from(err: CoreError) -> Self {
    match err {
      CoreError::Encoding(msg) => KeyStoreError::ProviderFailure(msg),
      CoreError::Crypto(msg) => KeyStoreError::ProviderFailure(msg),
      err @ CoreError::PayloadTooLarge { .. } => KeyStoreError::ProviderFailure(err.to_string()),
      CoreError::Entropy(msg) => KeyStoreError::ProviderFailure(msg),
    }
  }
}

pub(crate) fn provider_failure<E: Debug>(operation: &str, err: E) -> KeyStoreError {
  KeyStoreError::ProviderFailure(format!("{operation}: {err:?}"))
}

#[derive(Clone, Debug)]
pub struct RegistryConfig {
  pub key_profile: KeyGenProfile,
}

impl Default for RegistryConfig {
  fn default() -> Self {
    Self {
      key_profile: KeyGenProfile::standard(),
    }
  }
}

/// Delivered to the refresh listener once the new snapshot is in place.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RefreshEvent {
  pub generation: u64,
  pub aliases: Vec<String>,
}

pub type RefreshListener = Box<dyn Fn(&RefreshEvent) + Send + Sync>;

pub(crate) struct RegistryShared<P: KeyProvider> {
  provider: Arc<P>,
  config: RegistryConfig,
  snapshot: RwLock<Vec<Arc<KeyHandle<P>>>>,
  generation: AtomicU64,
  listener: OnceLock<RefreshListener>,
}

impl<P: KeyProvider> RegistryShared<P> {
  fn read_snapshot(&self) -> RwLockReadGuard<'_, Vec<Arc<KeyHandle<P>>>> {
    // Writers only ever swap the whole vector, so a poisoned guard still holds a consistent snapshot.
    self.snapshot.read().unwrap_or_else(PoisonError::into_inner)
  }

  pub(crate) fn refresh(self: &Arc<Self>) -> Result<(), KeyStoreError> {
    let aliases = match self.provider.aliases() {
      Ok(aliases) => aliases,
      Err(e) => {
        log::warn!("alias enumeration failed, keeping previous snapshot: {e:?}");
        return Err(provider_failure("enumerate aliases", e));
      }
    };

    {
      let mut seen = HashSet::with_capacity(aliases.len());
      for alias in &aliases {
        if alias.is_empty() {
          return Err(KeyStoreError::ProviderFailure("provider enumerated an empty alias".to_string()));
        }
        if !seen.insert(alias.as_str()) {
          return Err(KeyStoreError::ProviderFailure(format!("provider enumerated alias {alias} twice")));
        }
      }
    }

    let registry = Arc::downgrade(self);
    let entries = aliases
      .iter()
      .map(|alias| Arc::new(KeyHandle::new(alias.clone(), Arc::clone(&self.provider), registry.clone())))
      .collect::<Vec<_>>();

    *self.snapshot.write().unwrap_or_else(PoisonError::into_inner) = entries;
    let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
    log::debug!("key registry refreshed: generation {generation}, {} entries", aliases.len());

    if let Some(listener) = self.listener.get() {
      listener(&RefreshEvent { generation, aliases });
    }
    Ok(())
  }
}

/// Ordered view over the aliases held by a [`KeyProvider`].
///
/// The snapshot is rebuilt wholesale on every refresh; handles obtained from an
/// older snapshot keep working only while their alias still exists.
pub struct KeyRegistry<P: KeyProvider> {
  shared: Arc<RegistryShared<P>>,
}

impl<P: KeyProvider> KeyRegistry<P> {
  pub fn new(provider: P) -> Result<Self, KeyStoreError> {
    Self::with_config(provider, RegistryConfig::default())
  }

  pub fn with_config(provider: P, config: RegistryConfig) -> Result<Self, KeyStoreError> {
    let shared = Arc::new(RegistryShared {
      provider: Arc::new(provider),
      config,
      snapshot: RwLock::new(Vec::new()),
      generation: AtomicU64::new(0),
      listener: OnceLock::new(),
    });
    shared.refresh()?;
    Ok(Self { shared })
  }

  pub fn config(&self) -> &RegistryConfig {
    &self.shared.config
  }

  pub fn on_refresh<F>(&self, listener: F) -> Result<(), KeyStoreError>
  where
    F: Fn(&RefreshEvent) + Send + Sync + 'static,
  {
    self
      .shared
      .listener
      .set(Box::new(listener))
      .map_err(|_| KeyStoreError::AlreadyRegistered)
  }

  pub fn refresh(&self) -> Result<(), KeyStoreError> {
    self.shared.refresh()
  }

  pub fn generation(&self) -> u64 {
    self.shared.generation.load(Ordering::SeqCst)
  }

  pub fn count(&self) -> usize {
    self.shared.read_snapshot().len()
  }

  pub fn aliases(&self) -> Vec<String> {
    self
      .shared
      .read_snapshot()
      .iter()
      .map(|handle| handle.alias().to_string())
      .collect()
  }

  pub fn by_position(&self, position: usize) -> Result<Arc<KeyHandle<P>>, KeyStoreError> {
    let snapshot = self.shared.read_snapshot();
    snapshot
      .get(position)
      .cloned()
      .ok_or(KeyStoreError::PositionOutOfRange {
        position,
        count: snapshot.len(),
      })
  }

  /// An empty alias is simply never found.
  pub fn by_alias(&self, alias: &str) -> Result<Arc<KeyHandle<P>>, KeyStoreError> {
    self
      .shared
      .read_snapshot()
      .iter()
      .find(|handle| handle.alias() == alias)
      .cloned()
      .ok_or_else(|| KeyStoreError::NotFound(alias.to_string()))
  }

  pub fn create(&self, alias: &str) -> Result<(), KeyStoreError> {
    if alias.is_empty() {
      return Err(KeyStoreError::InvalidInput("empty alias".to_string()));
    }
    let provider = &self.shared.provider;
    if provider
      .contains_alias(alias)
      .map_err(|e| provider_failure("check alias", e))?
    {
      return Err(KeyStoreError::AlreadyExists(alias.to_string()));
    }
    provider
      .generate_key_pair(alias, &self.shared.config.key_profile)
      .map_err(|e| provider_failure("generate key pair", e))?;
    log::info!("generated key pair for alias {alias}");

    self.shared.refresh()
  }

  /// Deletes through the snapshot's handle, which becomes retired.
  pub fn delete(&self, alias: &str) -> Result<(), KeyStoreError> {
    let handle = self.by_alias(alias)?;
    handle.delete()
  }
}

impl<P: KeyProvider> Debug for KeyRegistry<P> {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("KeyRegistry")
      .field("generation", &self.generation())
      .field("aliases", &self.aliases())
      .field("listener", &self.shared.listener.get().is_some())
      .finish()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn boundary_error_is_distinct_from_not_found() {
    let err = KeyStoreError::PositionOutOfRange { position: 2, count: 2 };
    assert!(err.is_boundary());
    assert!(!KeyStoreError::NotFound("foo".to_string()).is_boundary());
    assert_eq!(err.to_string(), "position 2 out of range for 2 entries");
  }

  #[test]
  fn core_errors_surface_as_provider_failures() {
    let err: KeyStoreError = CoreError::Encoding("bad".to_string()).into();
    assert!(matches!(err, KeyStoreError::ProviderFailure(_)));
  }

  #[test]
  fn default_config_uses_standard_profile() {
    assert_eq!(RegistryConfig::default().key_profile, KeyGenProfile::standard());
  }
}
