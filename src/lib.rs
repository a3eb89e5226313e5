//! cedcrypt - password-based AES-256 envelope encryption for text documents
//!
//! The core turns a block-aligned byte buffer and a password into a
//! self-contained envelope (`ciphertext || iv || salt`) and back:
//!
//! ```no_run
//! use cedcrypt::CipherEngine;
//!
//! let engine = CipherEngine::new();
//! let mut plaintext = b"HELLO WORLD!!!!".to_vec();
//! engine.pad(&mut plaintext);
//! let envelope = engine.encrypt(&plaintext, b"correct horse")?;
//! assert_eq!(engine.decrypt(&envelope, b"correct horse")?, plaintext);
//! # Ok::<(), cedcrypt::error::CedError>(())
//! ```
//!
//! There is no authentication: decrypting with the wrong password returns
//! garbage instead of failing.

pub mod document;
pub mod engine;
pub mod envelope;
pub mod error;
pub mod file_ops;
pub mod kdf;
pub mod padding;
pub mod passphrase;
pub mod secmem;

pub use engine::{CipherConfig, CipherEngine, EngineOptions, SALT_LEN};
pub use envelope::Envelope;
pub use error::{CedError, ErrorCategory, ErrorKind, Result};
