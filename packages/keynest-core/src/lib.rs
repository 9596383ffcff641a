#![forbid(unsafe_code)]
//! Alias-indexed registry of provider-held RSA key pairs: enumeration, lifecycle
//! validation, and sign/verify/encrypt/decrypt through key handles.

pub mod adapters;
pub mod crypto;
pub mod error;
pub mod handle;
pub mod memory;
pub mod registry;
pub mod types;

pub use adapters::*;
pub use crypto::*;
pub use error::*;
pub use handle::*;
pub use memory::*;
pub use registry::*;
pub use types::*;
