//! Signing and verification entry points
//!
//! Signing picks exactly one digest path per call:
//! - a [`ProtectingSigner`](crate::account::ProtectingSigner) receives the raw
//!   payload root and domain, so its own replay protection sees them
//! - any other account must be a [`Signer`](crate::account::Signer) and receives
//!   the [`SigningContainer`](crate::digest::SigningContainer) digest
//!
//! Either way the sign call runs inside an [`UnlockSession`]. Verification
//! always rebuilds the container digest and needs no unlocking.

use crate::account::{best_public_key, Account, Capabilities, Capability};
use crate::config::SigningConfig;
use crate::digest::{build_root, build_signing_digest};
use crate::lifecycle::{bounded, CallError, Operation, UnlockSession};
use crate::types::{Digest, Domain, Root, Signature};
use crate::{Error, Result};
use serde::Serialize;
use std::sync::Arc;

/// What the account is asked to sign
#[derive(Clone, Copy, Debug)]
enum SignRequest<'a> {
    Protected { root: &'a Root, domain: &'a Domain },
    Digest(&'a Digest),
}

/// Drives accounts through signing and verification
#[derive(Debug, Clone, Default)]
pub struct SigningOrchestrator {
    config: SigningConfig,
}

impl SigningOrchestrator {
    pub fn new(config: SigningConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SigningConfig {
        &self.config
    }

    /// Sign an arbitrary payload within `domain`
    pub async fn sign_payload<A, T>(&self, account: &Arc<A>, payload: &T, domain: &Domain) -> Result<Signature>
    where
        A: Account + ?Sized + 'static,
        T: ?Sized + Serialize,
    {
        let root = build_root(payload)?;
        self.sign_root(account, &root, domain).await
    }

    /// Sign a precomputed payload root within `domain`
    pub async fn sign_root<A>(&self, account: &Arc<A>, root: &Root, domain: &Domain) -> Result<Signature>
    where
        A: Account + ?Sized + 'static,
    {
        self.config.validate()?;
        let caps = Capabilities::probe(&**account);

        if caps.is_protecting_signer() {
            // The signer builds the digest itself.
            return self
                .sign_in_session(account, SignRequest::Protected { root, domain })
                .await;
        }

        let digest = build_signing_digest(root, domain);
        if !caps.is_signer() {
            return Err(Error::UnsupportedCapability {
                account: account.name().to_string(),
                capability: Capability::Signer,
            });
        }
        self.sign_in_session(account, SignRequest::Digest(&digest)).await
    }

    /// Verify `signature` over a payload within `domain`
    pub fn verify_payload<A, T>(&self, account: &A, payload: &T, domain: &Domain, signature: &Signature) -> Result<bool>
    where
        A: Account + ?Sized,
        T: ?Sized + Serialize,
    {
        let root = build_root(payload)?;
        self.verify_root(account, &root, domain, signature)
    }

    /// Verify `signature` over a payload root within `domain`
    pub fn verify_root<A>(&self, account: &A, root: &Root, domain: &Domain, signature: &Signature) -> Result<bool>
    where
        A: Account + ?Sized,
    {
        let digest = build_signing_digest(root, domain);
        let public_key = best_public_key(account).ok_or_else(|| Error::PublicKeyUnavailable {
            account: account.name().to_string(),
        })?;

        Ok(signature.verify(&digest, &public_key))
    }

    async fn sign_in_session<A>(&self, account: &Arc<A>, request: SignRequest<'_>) -> Result<Signature>
    where
        A: Account + ?Sized + 'static,
    {
        let session = UnlockSession::open(account, &self.config).await?;
        let outcome = self.dispatch(&**account, request).await;

        match (outcome, session.close().await) {
            (outcome, Ok(())) => outcome,
            (outcome, Err(source)) => {
                tracing::error!(
                    account = %account.name(),
                    error = %source,
                    "Failed to relock account"
                );
                let signature = match outcome {
                    Ok(signature) => Some(signature),
                    Err(e) => {
                        tracing::error!(account = %account.name(), error = %e, "Signing failed");
                        None
                    }
                };
                Err(Error::RelockFailed {
                    account: account.name().to_string(),
                    signature,
                    source,
                })
            }
        }
    }

    async fn dispatch<A>(&self, account: &A, request: SignRequest<'_>) -> Result<Signature>
    where
        A: Account + ?Sized,
    {
        let timeout = self.config.timeout;
        let result = match request {
            SignRequest::Protected { root, domain } => {
                let signer = account
                    .as_protecting_signer()
                    .ok_or_else(|| unsupported(account, Capability::ProtectingSigner))?;
                tracing::debug!(account = %account.name(), root = %root, domain = %domain, "Signing root");
                bounded(Operation::Sign, timeout, signer.sign_generic(root, domain)).await
            }
            SignRequest::Digest(digest) => {
                let signer = account
                    .as_signer()
                    .ok_or_else(|| unsupported(account, Capability::Signer))?;
                tracing::debug!(account = %account.name(), digest = %digest, "Signing digest");
                bounded(Operation::Sign, timeout, signer.sign(digest)).await
            }
        };

        result.map_err(|e| match e {
            CallError::TimedOut { operation, after } => Error::Timeout { operation, after },
            CallError::Failed { source, .. } => Error::Signing(source),
        })
    }
}

fn unsupported<A>(account: &A, capability: Capability) -> Error
where
    A: Account + ?Sized,
{
    Error::UnsupportedCapability {
        account: account.name().to_string(),
        capability,
    }
}
