/// Standard RSA modulus size for newly generated key pairs.
pub const STANDARD_KEY_SIZE_BITS: usize = 2048;

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum KeyAlgorithm {
    Rsa,
    Ec,
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum KeyPurpose {
    Encrypt,
    Decrypt,
    Sign,
    Verify,
    WrapKey,
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum DigestId {
    Sha224,
    Sha256,
    Sha384,
    Sha512,
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum EncryptionPadding {
    RsaOaep,
    RsaPkcs1,
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum SignaturePadding {
    RsaPkcs1,
    RsaPss,
}

impl KeyAlgorithm {
    pub fn as_str(&self) -> &'static str {
        match self {
            KeyAlgorithm::Rsa => "RSA",
            KeyAlgorithm::Ec => "EC",
        }
    }
}

impl KeyPurpose {
    pub fn as_str(&self) -> &'static str {
        match self {
            KeyPurpose::Encrypt => "encrypt",
            KeyPurpose::Decrypt => "decrypt",
            KeyPurpose::Sign => "sign",
            KeyPurpose::Verify => "verify",
            KeyPurpose::WrapKey => "wrap-key",
        }
    }
}

impl DigestId {
    pub fn as_str(&self) -> &'static str {
        match self {
            DigestId::Sha224 => "SHA-224",
            DigestId::Sha256 => "SHA-256",
            DigestId::Sha384 => "SHA-384",
            DigestId::Sha512 => "SHA-512",
        }
    }
}

impl EncryptionPadding {
    pub fn as_str(&self) -> &'static str {
        match self {
            EncryptionPadding::RsaOaep => "OAEPPadding",
            EncryptionPadding::RsaPkcs1 => "PKCS1Padding",
        }
    }
}

impl SignaturePadding {
    pub fn as_str(&self) -> &'static str {
        match self {
            SignaturePadding::RsaPkcs1 => "PKCS1",
            SignaturePadding::RsaPss => "PSS",
        }
    }
}

/// Parameter set handed to the provider when a key pair is generated.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KeyGenProfile {
    pub algorithm: KeyAlgorithm,
    pub key_size_bits: usize,
    pub purposes: Vec<KeyPurpose>,
    pub digests: Vec<DigestId>,
    pub encryption_paddings: Vec<EncryptionPadding>,
    pub signature_paddings: Vec<SignaturePadding>,
    pub randomized_encryption_required: bool,
    pub strongbox_backed: bool,
    pub user_authentication_required: bool,
    pub user_confirmation_required: bool,
    pub user_presence_required: bool,
    pub unlocked_device_required: bool,
}

impl KeyGenProfile {
    pub fn standard() -> Self {
        Self {
            algorithm: KeyAlgorithm::Rsa,
            key_size_bits: STANDARD_KEY_SIZE_BITS,
            purposes: vec![
                KeyPurpose::Encrypt,
                KeyPurpose::Decrypt,
                KeyPurpose::Sign,
                KeyPurpose::Verify,
                KeyPurpose::WrapKey,
            ],
            digests: vec![
                DigestId::Sha224,
                DigestId::Sha256,
                DigestId::Sha384,
                DigestId::Sha512,
            ],
            encryption_paddings: vec![EncryptionPadding::RsaOaep, EncryptionPadding::RsaPkcs1],
            signature_paddings: vec![SignaturePadding::RsaPkcs1, SignaturePadding::RsaPss],
            randomized_encryption_required: true,
            strongbox_backed: false,
            user_authentication_required: false,
            user_confirmation_required: false,
            user_presence_required: false,
            unlocked_device_required: false,
        }
    }

    pub fn allows(&self, purpose: KeyPurpose) -> bool {
        self.purposes.contains(&purpose)
    }
}

impl Default for KeyGenProfile {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_profile_matches_fixed_parameter_set() {
        let profile = KeyGenProfile::default();
        assert_eq!(profile.algorithm, KeyAlgorithm::Rsa);
        assert_eq!(profile.key_size_bits, 2048);
        assert_eq!(profile.purposes.len(), 5);
        assert!(profile.allows(KeyPurpose::WrapKey));
        assert_eq!(profile.digests.len(), 4);
        assert!(profile.randomized_encryption_required);
        assert!(!profile.user_authentication_required);
        assert!(!profile.user_presence_required);
    }

    #[test]
    fn allows_only_listed_purposes() {
        let mut profile = KeyGenProfile::standard();
        profile.purposes.retain(|purpose| *purpose != KeyPurpose::Sign);
        assert!(!profile.allows(KeyPurpose::Sign));
        assert!(profile.allows(KeyPurpose::Verify));
        assert_eq!(KeyPurpose::WrapKey.as_str(), "wrap-key");
    }
}
