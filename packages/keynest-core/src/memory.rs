//! Software key provider holding key pairs in process memory.

use crate::adapters::{KeyPairEntry, KeyProvider};
use crate::crypto::generate_rsa_key;
use crate::types::{
    DigestId, EncryptionPadding, KeyAlgorithm, KeyGenProfile, KeyPurpose, SignaturePadding,
};
use rsa::RsaPrivateKey;
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};

const MIN_KEY_SIZE_BITS: usize = 1024;

/// Handles sign, verify, encrypt and decrypt with every key.
const REQUIRED_PURPOSES: [KeyPurpose; 4] = [
    KeyPurpose::Sign,
    KeyPurpose::Verify,
    KeyPurpose::Encrypt,
    KeyPurpose::Decrypt,
];

fn check_profile(profile: &KeyGenProfile) -> Result<(), MemoryProviderError> {
    if profile.algorithm != KeyAlgorithm::Rsa {
        return Err(MemoryProviderError::Unsupported(format!(
            "algorithm {}",
            profile.algorithm.as_str()
        )));
    }
    if profile.key_size_bits < MIN_KEY_SIZE_BITS {
        return Err(MemoryProviderError::Unsupported(format!(
            "key size {} bits",
            profile.key_size_bits
        )));
    }
    if let Some(purpose) = REQUIRED_PURPOSES.iter().find(|p| !profile.allows(**p)) {
        return Err(MemoryProviderError::Unsupported(format!(
            "purpose {} not allowed",
            purpose.as_str()
        )));
    }
    if !profile.digests.contains(&DigestId::Sha256) {
        return Err(MemoryProviderError::Unsupported(format!(
            "digest {} not allowed",
            DigestId::Sha256.as_str()
        )));
    }
    if !profile.encryption_paddings.contains(&EncryptionPadding::RsaPkcs1) {
        return Err(MemoryProviderError::Unsupported(format!(
            "encryption padding {} not allowed",
            EncryptionPadding::RsaPkcs1.as_str()
        )));
    }
    if !profile.signature_paddings.contains(&SignaturePadding::RsaPkcs1) {
        return Err(MemoryProviderError::Unsupported(format!(
            "signature padding {} not allowed",
            SignaturePadding::RsaPkcs1.as_str()
        )));
    }
    Ok(())
}

#[derive(Debug, thiserror::Error)]
pub enum MemoryProviderError {
    #[error("provider lock poisoned")]
    LockPoisoned,
    #[error("unsupported key parameters: {0}")]
    Unsupported(String),
    #[error("alias already present: {0}")]
    AliasExists(String),
    #[error("alias not present: {0}")]
    MissingAlias(String),
    #[error("key generation failed: {0}")]
    Generation(String),
}

/// In-memory provider. Clones share the same alias table, so one clone can be
/// handed to a registry while another removes entries behind its back.
#[derive(Clone, Debug, Default)]
pub struct MemoryKeyProvider {
    entries: Arc<Mutex<BTreeMap<String, KeyPairEntry>>>,
}

impl MemoryKeyProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn import_key_pair(
        &self,
        alias: &str,
        private_key: RsaPrivateKey,
    ) -> Result<(), MemoryProviderError> {
        let mut entries = self.lock()?;
        if entries.contains_key(alias) {
            return Err(MemoryProviderError::AliasExists(alias.to_string()));
        }
        entries.insert(alias.to_string(), KeyPairEntry::new(private_key));
        Ok(())
    }

    pub fn len(&self) -> Result<usize, MemoryProviderError> {
        Ok(self.lock()?.len())
    }

    pub fn is_empty(&self) -> Result<bool, MemoryProviderError> {
        Ok(self.lock()?.is_empty())
    }

    fn lock(&self) -> Result<MutexGuard<'_, BTreeMap<String, KeyPairEntry>>, MemoryProviderError> {
        self.entries
            .lock()
            .map_err(|_| MemoryProviderError::LockPoisoned)
    }
}

impl KeyProvider for MemoryKeyProvider {
    type Error = MemoryProviderError;

    fn aliases(&self) -> Result<Vec<String>, Self::Error> {
        Ok(self.lock()?.keys().cloned().collect())
    }

    fn contains_alias(&self, alias: &str) -> Result<bool, Self::Error> {
        Ok(self.lock()?.contains_key(alias))
    }

    fn generate_key_pair(&self, alias: &str, profile: &KeyGenProfile) -> Result<(), Self::Error> {
        check_profile(profile)?;
        if self.contains_alias(alias)? {
            return Err(MemoryProviderError::AliasExists(alias.to_string()));
        }

        // Generated outside the lock; enumeration stays available meanwhile.
        let private_key = generate_rsa_key(profile.key_size_bits)
            .map_err(|e| MemoryProviderError::Generation(e.to_string()))?;

        let mut entries = self.lock()?;
        if entries.contains_key(alias) {
            return Err(MemoryProviderError::AliasExists(alias.to_string()));
        }
        entries.insert(alias.to_string(), KeyPairEntry::new(private_key));
        Ok(())
    }

    fn delete_entry(&self, alias: &str) -> Result<(), Self::Error> {
        self.lock()?
            .remove(alias)
            .map(|_| ())
            .ok_or_else(|| MemoryProviderError::MissingAlias(alias.to_string()))
    }

    fn key_pair(&self, alias: &str) -> Result<Option<KeyPairEntry>, Self::Error> {
        Ok(self.lock()?.get(alias).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::STANDARD_KEY_SIZE_BITS;

    #[test]
    fn generates_standard_key_and_enumerates_sorted() {
        let provider = MemoryKeyProvider::new();
        provider
            .generate_key_pair("foo", &KeyGenProfile::standard())
            .expect("generate");
        let key = provider.key_pair("foo").unwrap().expect("entry");
        assert_eq!(key.key_size_bits(), STANDARD_KEY_SIZE_BITS);

        provider
            .import_key_pair("bar", key.private_key().clone())
            .expect("import");
        provider
            .import_key_pair("car", key.private_key().clone())
            .expect("import");
        assert_eq!(provider.aliases().unwrap(), vec!["bar", "car", "foo"]);
        assert_eq!(provider.len().unwrap(), 3);
    }

    #[test]
    fn rejects_unsupported_profiles() {
        let provider = MemoryKeyProvider::new();
        let mut profile = KeyGenProfile::standard();
        profile.algorithm = KeyAlgorithm::Ec;
        assert!(matches!(
            provider.generate_key_pair("ec", &profile),
            Err(MemoryProviderError::Unsupported(_))
        ));

        let mut profile = KeyGenProfile::standard();
        profile.key_size_bits = 512;
        assert!(matches!(
            provider.generate_key_pair("small", &profile),
            Err(MemoryProviderError::Unsupported(_))
        ));

        let mut profile = KeyGenProfile::standard();
        profile.purposes.retain(|purpose| *purpose != KeyPurpose::Decrypt);
        assert!(matches!(
            provider.generate_key_pair("no-decrypt", &profile),
            Err(MemoryProviderError::Unsupported(msg)) if msg == "purpose decrypt not allowed"
        ));

        let mut profile = KeyGenProfile::standard();
        profile.digests = vec![DigestId::Sha512];
        assert!(matches!(
            provider.generate_key_pair("sha512-only", &profile),
            Err(MemoryProviderError::Unsupported(_))
        ));

        let mut profile = KeyGenProfile::standard();
        profile.encryption_paddings = vec![EncryptionPadding::RsaOaep];
        assert!(matches!(
            provider.generate_key_pair("oaep-only", &profile),
            Err(MemoryProviderError::Unsupported(_))
        ));
        assert!(provider.is_empty().unwrap());
    }

    #[test]
    fn delete_missing_alias_fails() {
        let provider = MemoryKeyProvider::new();
        assert!(matches!(
            provider.delete_entry("ghost"),
            Err(MemoryProviderError::MissingAlias(_))
        ));
        assert!(provider.key_pair("ghost").unwrap().is_none());
    }

    #[test]
    fn clones_share_entries() {
        let provider = MemoryKeyProvider::new();
        let other = provider.clone();
        let key = generate_rsa_key(1024).expect("key");
        provider.import_key_pair("shared", key).expect("import");
        assert!(other.contains_alias("shared").unwrap());
        other.delete_entry("shared").expect("delete");
        assert!(!provider.contains_alias("shared").unwrap());
    }
}
