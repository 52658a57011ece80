//! Shared test helpers: a recording stub account with configurable capabilities

#![allow(dead_code)]

use async_trait::async_trait;
use signward_core::crypto::{Keypair, PublicKey};
use signward_core::{
    Account, AccountError, AccountId, Digest, Domain, Locker, ProtectingSigner, Root, Signature,
    Signer, SigningConfig,
};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use std::time::Duration;

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

pub fn config(passphrases: &[&str], timeout: Duration) -> SigningConfig {
    passphrases
        .iter()
        .fold(SigningConfig::default(), |c, p| c.with_passphrase(*p))
        .with_timeout(timeout)
}

/// Account call as observed by the stub
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    IsUnlocked,
    Unlock(Vec<u8>),
    Lock,
    SignGeneric(Root, Domain),
    Sign(Digest),
}

pub struct StubAccount {
    name: String,
    keypair: Keypair,
    publishes_key: bool,
    composite: Option<Keypair>,
    lockable: bool,
    protecting: bool,
    signer: bool,
    passphrase: Vec<u8>,
    unlocked: AtomicBool,
    sign_blocks: bool,
    sign_fails: bool,
    is_unlocked_fails: bool,
    is_unlocked_blocks: bool,
    unlock_blocks: bool,
    unlock_hangs_after_effect: bool,
    lock_fails: bool,
    lock_blocks: bool,
    calls: Mutex<Vec<Call>>,
}

impl StubAccount {
    /// Generic signer only, no lock
    pub fn signer(name: &str) -> Self {
        Self {
            name: name.to_string(),
            keypair: Keypair::generate(),
            publishes_key: true,
            composite: None,
            lockable: false,
            protecting: false,
            signer: true,
            passphrase: vec![],
            unlocked: AtomicBool::new(true),
            sign_blocks: false,
            sign_fails: false,
            is_unlocked_fails: false,
            is_unlocked_blocks: false,
            unlock_blocks: false,
            unlock_hangs_after_effect: false,
            lock_fails: false,
            lock_blocks: false,
            calls: Mutex::new(vec![]),
        }
    }

    /// Lockable, starting locked, unlocked by `passphrase`
    pub fn locked_with(mut self, passphrase: &str) -> Self {
        self.lockable = true;
        self.passphrase = passphrase.as_bytes().to_vec();
        self.unlocked = AtomicBool::new(false);
        self
    }

    pub fn already_unlocked(self) -> Self {
        self.unlocked.store(true, Ordering::SeqCst);
        self
    }

    pub fn protecting(mut self) -> Self {
        self.protecting = true;
        self
    }

    pub fn without_signer(mut self) -> Self {
        self.signer = false;
        self
    }

    pub fn without_public_key(mut self) -> Self {
        self.publishes_key = false;
        self
    }

    pub fn with_composite(mut self, keypair: Keypair) -> Self {
        self.composite = Some(keypair);
        self
    }

    pub fn blocking_sign(mut self) -> Self {
        self.sign_blocks = true;
        self
    }

    pub fn failing_sign(mut self) -> Self {
        self.sign_fails = true;
        self
    }

    pub fn failing_is_unlocked(mut self) -> Self {
        self.is_unlocked_fails = true;
        self
    }

    pub fn blocking_is_unlocked(mut self) -> Self {
        self.is_unlocked_blocks = true;
        self
    }

    pub fn blocking_unlock(mut self) -> Self {
        self.unlock_blocks = true;
        self
    }

    /// Unlock takes effect, then the reply never arrives
    pub fn slow_unlock(mut self) -> Self {
        self.unlock_hangs_after_effect = true;
        self
    }

    pub fn failing_lock(mut self) -> Self {
        self.lock_fails = true;
        self
    }

    pub fn blocking_lock(mut self) -> Self {
        self.lock_blocks = true;
        self
    }

    pub fn keypair(&self) -> &Keypair {
        &self.keypair
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn is_unlocked_now(&self) -> bool {
        self.unlocked.load(Ordering::SeqCst)
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }

    fn signature_over(&self, digest: &Digest) -> Result<Signature, AccountError> {
        if self.sign_fails {
            return Err(AccountError::Refused("stub refuses to sign".into()));
        }
        if !self.is_unlocked_now() {
            return Err(AccountError::Locked);
        }
        Ok(self.keypair.sign(digest.as_bytes()))
    }
}

impl Account for StubAccount {
    fn id(&self) -> AccountId {
        AccountId::default()
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn public_key(&self) -> Option<PublicKey> {
        self.publishes_key.then(|| self.keypair.public_key())
    }

    fn composite_public_key(&self) -> Option<PublicKey> {
        self.composite.as_ref().map(Keypair::public_key)
    }

    fn as_locker(&self) -> Option<&dyn Locker> {
        self.lockable.then_some(self as &dyn Locker)
    }

    fn as_protecting_signer(&self) -> Option<&dyn ProtectingSigner> {
        self.protecting.then_some(self as &dyn ProtectingSigner)
    }

    fn as_signer(&self) -> Option<&dyn Signer> {
        self.signer.then_some(self as &dyn Signer)
    }
}

#[async_trait]
impl Locker for StubAccount {
    async fn is_unlocked(&self) -> Result<bool, AccountError> {
        self.record(Call::IsUnlocked);
        if self.is_unlocked_blocks {
            std::future::pending::<()>().await;
        }
        if self.is_unlocked_fails {
            return Err(AccountError::Refused("stub cannot report lock state".into()));
        }
        Ok(self.is_unlocked_now())
    }

    async fn unlock(&self, passphrase: &[u8]) -> Result<(), AccountError> {
        self.record(Call::Unlock(passphrase.to_vec()));
        if self.unlock_blocks {
            std::future::pending::<()>().await;
        }
        if passphrase == self.passphrase.as_slice() {
            self.unlocked.store(true, Ordering::SeqCst);
            if self.unlock_hangs_after_effect {
                std::future::pending::<()>().await;
            }
            Ok(())
        } else {
            Err(AccountError::IncorrectPassphrase)
        }
    }

    async fn lock(&self) -> Result<(), AccountError> {
        self.record(Call::Lock);
        if self.lock_blocks {
            std::future::pending::<()>().await;
        }
        if self.lock_fails {
            return Err(AccountError::Refused("stub refuses to lock".into()));
        }
        self.unlocked.store(false, Ordering::SeqCst);
        Ok(())
    }
}

#[async_trait]
impl ProtectingSigner for StubAccount {
    async fn sign_generic(&self, root: &Root, domain: &Domain) -> Result<Signature, AccountError> {
        self.record(Call::SignGeneric(*root, *domain));
        if self.sign_blocks {
            std::future::pending::<()>().await;
        }
        self.signature_over(&signward_core::build_signing_digest(root, domain))
    }
}

#[async_trait]
impl Signer for StubAccount {
    async fn sign(&self, digest: &Digest) -> Result<Signature, AccountError> {
        self.record(Call::Sign(*digest));
        if self.sign_blocks {
            std::future::pending::<()>().await;
        }
        self.signature_over(digest)
    }
}
