use crate::types::{KeyAlgorithm, KeyGenProfile};
use rsa::traits::PublicKeyParts;
use rsa::{RsaPrivateKey, RsaPublicKey};
use std::fmt::{self, Debug};

/// Secure store of asymmetric key pairs addressed by alias.
///
/// The registry is the only caller of `aliases`; handles use the remaining
/// methods for their own alias.
pub trait KeyProvider {
    type Error: Debug + Send + Sync + 'static;
    fn aliases(&self) -> Result<Vec<String>, Self::Error>;
    fn contains_alias(&self, alias: &str) -> Result<bool, Self::Error>;
    fn generate_key_pair(&self, alias: &str, profile: &KeyGenProfile) -> Result<(), Self::Error>;
    fn delete_entry(&self, alias: &str) -> Result<(), Self::Error>;
    fn key_pair(&self, alias: &str) -> Result<Option<KeyPairEntry>, Self::Error>;
}

#[derive(Clone)]
pub struct KeyPairEntry {
    private_key: RsaPrivateKey,
    public_key: RsaPublicKey,
}

impl KeyPairEntry {
    pub fn new(private_key: RsaPrivateKey) -> Self {
        let public_key = RsaPublicKey::from(&private_key);
        Self {
            private_key,
            public_key,
        }
    }

    pub fn algorithm(&self) -> KeyAlgorithm {
        KeyAlgorithm::Rsa
    }

    pub fn key_size_bits(&self) -> usize {
        self.public_key.size() * 8
    }

    pub fn private_key(&self) -> &RsaPrivateKey {
        &self.private_key
    }

    pub fn public_key(&self) -> &RsaPublicKey {
        &self.public_key
    }
}

impl Debug for KeyPairEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyPairEntry")
            .field("algorithm", &self.algorithm())
            .field("key_size_bits", &self.key_size_bits())
            .field("private_key", &"<redacted>")
            .finish()
    }
}
