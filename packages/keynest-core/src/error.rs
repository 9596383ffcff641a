/// Failures of the local RSA and encoding primitives, before they are mapped
/// onto the caller-facing registry errors.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
  #[error("encoding error: {0}")]
  Encoding(String),
  #[error("crypto error: {0}")]
  Crypto(String),
  #[error("payload of {len} bytes exceeds block limit of {limit} bytes")]
  PayloadTooLarge { len: usize, limit: usize },
  #[error("entropy error: {0}")]
  Entropy(String),
}

pub type CoreResult<T> = Result<T, CoreError>;
