//! Per-alias key handles, lifecycle checks, and the fixed RSA operations.

use crate::adapters::{KeyPairEntry, KeyProvider};
use crate::crypto::{
    decode_text, decrypt_pkcs1v15, encode_text, encrypt_pkcs1v15, fingerprint,
    sign_pkcs1v15_sha256, verify_pkcs1v15_sha256,
};
use crate::registry::{provider_failure, KeyStoreError, RegistryShared};
use std::fmt;
use std::sync::{Arc, Mutex, PoisonError, Weak};
use zeroize::{Zeroize, Zeroizing};

/// `Retired` is terminal and only reached through the handle's own delete.
/// A handle whose alias vanished externally stays `Active` and fails the
/// existence check with `NotFound` instead.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum HandleState {
    Active,
    Retired,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KeyDescription {
    pub alias: String,
    pub algorithm: String,
    pub key_size_bits: usize,
    pub fingerprint: String,
}

pub struct KeyHandle<P: KeyProvider> {
    alias: String,
    state: Mutex<HandleState>,
    provider: Arc<P>,
    registry: Weak<RegistryShared<P>>,
}

impl<P: KeyProvider> fmt::Debug for KeyHandle<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyHandle")
            .field("alias", &self.alias)
            .field("state", &self.state())
            .finish()
    }
}

impl<P: KeyProvider> KeyHandle<P> {
    pub(crate) fn new(alias: String, provider: Arc<P>, registry: Weak<RegistryShared<P>>) -> Self {
        Self {
            alias,
            state: Mutex::new(HandleState::Active),
            provider,
            registry,
        }
    }

    pub fn alias(&self) -> &str {
        &self.alias
    }

    pub fn state(&self) -> HandleState {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn ensure_exists(&self) -> Result<(), KeyStoreError> {
        if self.state() == HandleState::Retired {
            return Err(KeyStoreError::Retired(self.alias.clone()));
        }
        let exists = self
            .provider
            .contains_alias(&self.alias)
            .map_err(|e| provider_failure("check alias", e))?;
        if !exists {
            return Err(KeyStoreError::NotFound(self.alias.clone()));
        }
        Ok(())
    }

    pub fn algorithm(&self) -> Result<String, KeyStoreError> {
        self.ensure_exists()?;
        Ok(self.entry()?.algorithm().as_str().to_string())
    }

    pub fn info(&self) -> Result<String, KeyStoreError> {
        self.algorithm()
    }

    pub fn describe(&self) -> Result<KeyDescription, KeyStoreError> {
        self.ensure_exists()?;
        let entry = self.entry()?;
        Ok(KeyDescription {
            alias: self.alias.clone(),
            algorithm: entry.algorithm().as_str().to_string(),
            key_size_bits: entry.key_size_bits(),
            fingerprint: fingerprint(entry.public_key()),
        })
    }

    /// Base64 SHA256withRSA (PKCS#1 v1.5) signature over the UTF-8 text.
    pub fn sign(&self, text: &str) -> Result<String, KeyStoreError> {
        self.ensure_exists()?;
        if text.is_empty() {
            return Err(KeyStoreError::InvalidInput("empty text".to_string()));
        }
        let entry = self.entry()?;
        let signature = sign_pkcs1v15_sha256(entry.private_key(), text.as_bytes())?;
        Ok(encode_text(&signature))
    }

    /// `Ok(false)` means the signature does not match; undecodable base64 is
    /// a provider failure.
    pub fn verify(&self, text: &str, signature: &str) -> Result<bool, KeyStoreError> {
        self.ensure_exists()?;
        if text.is_empty() {
            return Err(KeyStoreError::InvalidInput("empty text".to_string()));
        }
        if signature.is_empty() {
            return Err(KeyStoreError::InvalidInput("empty signature".to_string()));
        }
        let entry = self.entry()?;
        let signature = decode_text(signature)?;
        Ok(verify_pkcs1v15_sha256(
            entry.public_key(),
            text.as_bytes(),
            &signature,
        ))
    }

    pub fn encrypt(&self, plain_text: &str) -> Result<String, KeyStoreError> {
        self.ensure_exists()?;
        if plain_text.is_empty() {
            return Err(KeyStoreError::InvalidInput("empty plain text".to_string()));
        }
        let entry = self.entry()?;
        let cipher_text = encrypt_pkcs1v15(entry.public_key(), plain_text.as_bytes())?;
        Ok(encode_text(&cipher_text))
    }

    pub fn decrypt(&self, cipher_text: &str) -> Result<String, KeyStoreError> {
        self.ensure_exists()?;
        if cipher_text.is_empty() {
            return Err(KeyStoreError::InvalidInput("empty cipher text".to_string()));
        }
        let entry = self.entry()?;
        let cipher_bytes = decode_text(cipher_text)?;
        let plain = Zeroizing::new(decrypt_pkcs1v15(entry.private_key(), &cipher_bytes)?);
        match String::from_utf8(plain.to_vec()) {
            Ok(text) => Ok(text),
            Err(e) => {
                e.into_bytes().zeroize();
                Err(KeyStoreError::ProviderFailure(
                    "decrypted payload is not UTF-8".to_string(),
                ))
            }
        }
    }

    /// Removes the alias from the provider and retires this handle. The owning
    /// registry, if still alive, is refreshed afterwards.
    pub fn delete(&self) -> Result<(), KeyStoreError> {
        self.ensure_exists()?;
        self.provider
            .delete_entry(&self.alias)
            .map_err(|e| provider_failure("delete entry", e))?;
        *self.state.lock().unwrap_or_else(PoisonError::into_inner) = HandleState::Retired;
        log::info!("deleted key pair for alias {}", self.alias);

        match self.registry.upgrade() {
            Some(registry) => registry.refresh(),
            None => Ok(()),
        }
    }

    fn entry(&self) -> Result<KeyPairEntry, KeyStoreError> {
        self.provider
            .key_pair(&self.alias)
            .map_err(|e| provider_failure("load key pair", e))?
            .ok_or_else(|| KeyStoreError::NotFound(self.alias.clone()))
    }
}
