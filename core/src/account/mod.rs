//! Account capability model
//!
//! An [`Account`] is an opaque key-holding handle owned by the caller. Its
//! optional abilities are exposed through accessor methods returning trait
//! objects, so support is checked without downcasting:
//! - [`Locker`]: unlock-state query, unlock and lock
//! - [`ProtectingSigner`]: signs a raw root and domain, building its own digest
//! - [`Signer`]: signs a digest built by the caller

pub mod capability;
pub mod memory;

pub use capability::{Capabilities, Capability};
pub use memory::MemoryAccount;

use crate::crypto::PublicKey;
use crate::types::{AccountId, Digest, Domain, Root, Signature};
use async_trait::async_trait;

/// Failure reported by an account implementation
#[derive(Debug, thiserror::Error)]
pub enum AccountError {
    #[error("Account is locked")]
    Locked,

    #[error("Incorrect passphrase")]
    IncorrectPassphrase,

    #[error("Refused: {0}")]
    Refused(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// A key-holding entity
pub trait Account: Send + Sync {
    fn id(&self) -> AccountId;

    fn name(&self) -> &str;

    fn public_key(&self) -> Option<PublicKey>;

    /// Aggregate key of a distributed account, preferred for verification
    fn composite_public_key(&self) -> Option<PublicKey> {
        None
    }

    fn as_locker(&self) -> Option<&dyn Locker> {
        None
    }

    fn as_protecting_signer(&self) -> Option<&dyn ProtectingSigner> {
        None
    }

    fn as_signer(&self) -> Option<&dyn Signer> {
        None
    }
}

/// Explicit unlock and lock of secret material
#[async_trait]
pub trait Locker: Send + Sync {
    async fn is_unlocked(&self) -> Result<bool, AccountError>;

    async fn unlock(&self, passphrase: &[u8]) -> Result<(), AccountError>;

    async fn lock(&self) -> Result<(), AccountError>;
}

/// Signer that receives the raw root and domain and performs its own digest
/// construction and replay-protection bookkeeping
#[async_trait]
pub trait ProtectingSigner: Send + Sync {
    async fn sign_generic(&self, root: &Root, domain: &Domain) -> Result<Signature, AccountError>;
}

/// Signer of caller-built digests
#[async_trait]
pub trait Signer: Send + Sync {
    async fn sign(&self, digest: &Digest) -> Result<Signature, AccountError>;
}

/// Key used to verify signatures made by `account`
pub fn best_public_key<A>(account: &A) -> Option<PublicKey>
where
    A: Account + ?Sized,
{
    account
        .composite_public_key()
        .or_else(|| account.public_key())
}
