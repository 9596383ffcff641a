use crate::error::{CoreError, CoreResult};
use rand_core::OsRng;
use rsa::pkcs1v15::{Signature, SigningKey, VerifyingKey};
use rsa::traits::PublicKeyParts;
use rsa::{Pkcs1v15Encrypt, RsaPrivateKey, RsaPublicKey};
use sha2::{Digest, Sha256};
use signature::{SignatureEncoding, Signer, Verifier};

/// PKCS#1 v1.5 encryption padding overhead in bytes.
pub const PKCS1_PADDING_OVERHEAD: usize = 11;

pub fn sign_pkcs1v15_sha256(private_key: &RsaPrivateKey, message: &[u8]) -> CoreResult<Vec<u8>> {
  let signing_key = SigningKey::<Sha256>::new(private_key.clone());
  let signature: Signature = signing_key
    .try_sign(message)
    .map_err(|e| CoreError::Crypto(format!("signing failed: {e}")))?;
  Ok(signature.to_vec())
}

/// A signature that does not match, including one of the wrong length, is
/// reported as `false` rather than an error.
pub fn verify_pkcs1v15_sha256(public_key: &RsaPublicKey, message: &[u8], signature: &[u8]) -> bool {
  let verifying_key = VerifyingKey::<Sha256>::new(public_key.clone());
  let signature = match Signature::try_from(signature) {
    Ok(signature) => signature,
    Err(_) => return false,
  };
  verifying_key.verify(message, &signature).is_ok()
}

pub fn max_pkcs1v15_plaintext_len(public_key: &RsaPublicKey) -> usize {
  public_key.size().saturating_sub(PKCS1_PADDING_OVERHEAD)
}

pub fn encrypt_pkcs1v15(public_key: &RsaPublicKey, plaintext: &[u8]) -> CoreResult<Vec<u8>> {
  let limit = max_pkcs1v15_plaintext_len(public_key);
  if plaintext.len() > limit {
    return Err(CoreError::PayloadTooLarge {
      len: plaintext.len(),
      limit,
    });
  }
  public_key
    .encrypt(&mut OsRng, Pkcs1v15Encrypt, plaintext)
    .map_err(|e| CoreError::Crypto(format!("encrypt failed: {e}")))
}

pub fn decrypt_pkcs1v15(private_key: &RsaPrivateKey, ciphertext: &[u8]) -> CoreResult<Vec<u8>> {
  private_key
    .decrypt(Pkcs1v15Encrypt, ciphertext)
    .map_err(|e| CoreError::Crypto(format!("decrypt failed: {e}")))
}

pub fn encode_text(bytes: &[u8]) -> String {
  base64::encode(bytes)
}

pub fn decode_text(text: &str) -> CoreResult<Vec<u8>> {
  base64::decode(text).map_err(|e| CoreError::Encoding(format!("invalid base64: {e}")))
}

/// Hex SHA-256 over the big-endian modulus followed by the big-endian exponent.
pub fn fingerprint(public_key: &RsaPublicKey) -> String {
  let mut hasher = Sha256::new();
  hasher.update(public_key.n().to_bytes_be());
  hasher.update(public_key.e().to_bytes_be());
  hex::encode(hasher.finalize())
}

pub fn generate_rsa_key(bits: usize) -> CoreResult<RsaPrivateKey> {
  RsaPrivateKey::new(&mut OsRng, bits).map_err(|e| CoreError::Entropy(format!("key generation failed: {e}")))
}
