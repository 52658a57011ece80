//! Signward Core Library
//!
//! Capability-based signing orchestration for cryptographic accounts.
//! Given an account that may or may not support unlocking, protected signing
//! or generic signing, this library computes a canonical, domain-separated
//! digest for an arbitrary structured payload and drives the account through
//! an unlock → sign → lock lifecycle with every external call time-boxed.

pub mod account;
pub mod canonical;
pub mod config;
pub mod crypto;
pub mod digest;
pub mod lifecycle;
pub mod orchestrator;
pub mod types;

pub use account::{
    Account, AccountError, Capabilities, Capability, Locker, MemoryAccount, ProtectingSigner,
    Signer,
};
pub use canonical::{hash_tree_root, CanonicalizationError};
pub use config::{Passphrase, SigningConfig};
pub use digest::{build_root, build_signing_digest, SigningContainer};
pub use lifecycle::{CallError, Operation, UnlockState};
pub use orchestrator::SigningOrchestrator;
pub use types::*;

use std::time::Duration;

/// Result type used throughout the library
pub type Result<T> = std::result::Result<T, Error>;

/// Core error types
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Payload canonicalization failed: {0}")]
    Canonicalization(#[from] CanonicalizationError),

    #[error("Invalid {field} length: expected 32 bytes, got {actual}")]
    InvalidLength { field: &'static str, actual: usize },

    #[error("Account {account} does not support {capability}")]
    UnsupportedCapability {
        account: String,
        capability: Capability,
    },

    #[error("Unable to ascertain if account {account} is unlocked: {source}")]
    UnlockState {
        account: String,
        #[source]
        source: AccountError,
    },

    #[error("Failed to unlock account {account} after {attempts} passphrase attempt(s)")]
    UnlockFailed { account: String, attempts: usize },

    #[error("{operation} timed out after {after:?}")]
    Timeout { operation: Operation, after: Duration },

    #[error("Failed to sign: {0}")]
    Signing(#[source] AccountError),

    /// The account was unlocked by this call and could not be locked again.
    /// `signature` is present when the signing step itself succeeded.
    #[error("Failed to lock account {account}: {source}")]
    RelockFailed {
        account: String,
        signature: Option<Signature>,
        #[source]
        source: CallError,
    },

    #[error("Failed to obtain public key for account {account}")]
    PublicKeyUnavailable { account: String },

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl Error {
    /// Signature produced before the error occurred, if any.
    pub fn signature(&self) -> Option<&Signature> {
        match self {
            Error::RelockFailed { signature, .. } => signature.as_ref(),
            _ => None,
        }
    }

    /// Consume the error, keeping the signature produced before it occurred.
    pub fn into_signature(self) -> Option<Signature> {
        match self {
            Error::RelockFailed { signature, .. } => signature,
            _ => None,
        }
    }

    /// Whether the error may have left key material exposed.
    pub fn is_security_relevant(&self) -> bool {
        matches!(self, Error::RelockFailed { .. })
    }
}
