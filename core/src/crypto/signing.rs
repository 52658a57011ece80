//! Ed25519 signing and verification

use crate::types::Signature;
use crate::{Error, Result};
use ed25519_dalek::{Signer, Verifier};
use rand::rngs::OsRng;
use std::fmt;

/// Ed25519 keypair
#[derive(Clone)]
pub struct Keypair {
    inner: ed25519_dalek::SigningKey,
}

impl Keypair {
    /// Generate a new random keypair
    pub fn generate() -> Self {
        let mut rng = OsRng;
        let inner = ed25519_dalek::SigningKey::generate(&mut rng);
        Self { inner }
    }

    /// Create keypair from secret key bytes
    pub fn from_bytes(bytes: &[u8; 32]) -> Self {
        let inner = ed25519_dalek::SigningKey::from_bytes(bytes);
        Self { inner }
    }

    /// Get the public key
    pub fn public_key(&self) -> PublicKey {
        PublicKey {
            inner: self.inner.verifying_key(),
        }
    }

    /// Sign a message
    pub fn sign(&self, message: &[u8]) -> Signature {
        let sig = self.inner.sign(message);
        Signature(sig.to_bytes())
    }
}

impl fmt::Debug for Keypair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Keypair")
            .field("public_key", &self.public_key())
            .finish_non_exhaustive()
    }
}

/// Ed25519 public key
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct PublicKey {
    inner: ed25519_dalek::VerifyingKey,
}

impl PublicKey {
    /// Create public key from bytes
    pub fn from_bytes(bytes: &[u8; 32]) -> Result<Self> {
        let inner = ed25519_dalek::VerifyingKey::from_bytes(bytes)
            .map_err(|e| Error::Other(anyhow::anyhow!("Invalid public key: {}", e)))?;
        Ok(Self { inner })
    }

    /// Get the public key bytes
    pub fn to_bytes(&self) -> [u8; 32] {
        self.inner.to_bytes()
    }

    /// Verify a signature
    pub fn verify(&self, message: &[u8], signature: &Signature) -> Result<()> {
        let sig = ed25519_dalek::Signature::from_bytes(&signature.0);
        self.inner
            .verify(message, &sig)
            .map_err(|e| Error::Other(anyhow::anyhow!("Invalid signature: {}", e)))
    }
}

impl fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PublicKey({})", hex::encode(&self.to_bytes()[..8]))
    }
}
