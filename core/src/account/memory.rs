//! In-memory account backed by an Ed25519 keypair
//!
//! Optionally lockable (passphrase-gated) and optionally protecting: a
//! protecting account builds its own signing digest and refuses to sign the
//! same root twice within a domain.

use super::{Account, AccountError, Locker, ProtectingSigner, Signer};
use crate::config::Passphrase;
use crate::crypto::{Keypair, PublicKey};
use crate::digest::build_signing_digest;
use crate::types::{AccountId, Digest, Domain, Root, Signature};
use async_trait::async_trait;
use sha2::{Digest as _, Sha256};
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

pub struct MemoryAccount {
    id: AccountId,
    name: String,
    keypair: Keypair,
    passphrase_hash: Option<[u8; 32]>,
    unlocked: AtomicBool,
    signed: Option<Mutex<HashSet<(Root, Domain)>>>,
}

impl MemoryAccount {
    /// Account without a lock or replay protection
    pub fn new(name: impl Into<String>, keypair: Keypair) -> Self {
        Self {
            id: AccountId::new(),
            name: name.into(),
            keypair,
            passphrase_hash: None,
            unlocked: AtomicBool::new(true),
            signed: None,
        }
    }

    pub fn generate(name: impl Into<String>) -> Self {
        Self::new(name, Keypair::generate())
    }

    /// Gate the key behind `passphrase`; the account starts locked
    pub fn with_passphrase(mut self, passphrase: impl Into<Passphrase>) -> Self {
        self.passphrase_hash = Some(hash_passphrase(passphrase.into().as_bytes()));
        self.unlocked = AtomicBool::new(false);
        self
    }

    /// Sign raw roots with replay protection
    pub fn protected(mut self) -> Self {
        self.signed = Some(Mutex::new(HashSet::new()));
        self
    }

    pub fn is_unlocked_now(&self) -> bool {
        self.unlocked.load(Ordering::SeqCst)
    }

    fn ensure_unlocked(&self) -> Result<(), AccountError> {
        if self.is_unlocked_now() {
            Ok(())
        } else {
            Err(AccountError::Locked)
        }
    }
}

fn hash_passphrase(passphrase: &[u8]) -> [u8; 32] {
    Sha256::digest(passphrase).into()
}

impl Account for MemoryAccount {
    fn id(&self) -> AccountId {
        self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn public_key(&self) -> Option<PublicKey> {
        Some(self.keypair.public_key())
    }

    fn as_locker(&self) -> Option<&dyn Locker> {
        self.passphrase_hash.map(|_| self as &dyn Locker)
    }

    fn as_protecting_signer(&self) -> Option<&dyn ProtectingSigner> {
        self.signed.as_ref().map(|_| self as &dyn ProtectingSigner)
    }

    fn as_signer(&self) -> Option<&dyn Signer> {
        Some(self)
    }
}

#[async_trait]
impl Locker for MemoryAccount {
    async fn is_unlocked(&self) -> Result<bool, AccountError> {
        Ok(self.is_unlocked_now())
    }

    async fn unlock(&self, passphrase: &[u8]) -> Result<(), AccountError> {
        match self.passphrase_hash {
            Some(expected) if expected == hash_passphrase(passphrase) => {
                self.unlocked.store(true, Ordering::SeqCst);
                Ok(())
            }
            Some(_) => Err(AccountError::IncorrectPassphrase),
            None => Ok(()),
        }
    }

    async fn lock(&self) -> Result<(), AccountError> {
        if self.passphrase_hash.is_some() {
            self.unlocked.store(false, Ordering::SeqCst);
        }
        Ok(())
    }
}

#[async_trait]
impl ProtectingSigner for MemoryAccount {
    async fn sign_generic(&self, root: &Root, domain: &Domain) -> Result<Signature, AccountError> {
        self.ensure_unlocked()?;

        let Some(signed) = &self.signed else {
            return Err(AccountError::Refused("account is not protecting".into()));
        };
        {
            let mut signed = signed
                .lock()
                .map_err(|_| AccountError::Other(anyhow::anyhow!("Replay record poisoned")))?;
            if !signed.insert((*root, *domain)) {
                return Err(AccountError::Refused(format!(
                    "root {} already signed in domain {}",
                    root, domain
                )));
            }
        }

        let digest = build_signing_digest(root, domain);
        Ok(self.keypair.sign(digest.as_bytes()))
    }
}

#[async_trait]
impl Signer for MemoryAccount {
    async fn sign(&self, digest: &Digest) -> Result<Signature, AccountError> {
        self.ensure_unlocked()?;
        Ok(self.keypair.sign(digest.as_bytes()))
    }
}
