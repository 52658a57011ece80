//! Unlock → operate → lock lifecycle
//!
//! [`UnlockSession::open`] unlocks an account only when it is locked, trying
//! each configured passphrase in order. The session relocks on
//! [`UnlockSession::close`] only if it performed the unlock itself. A session
//! dropped before closing (error path or cancelled future) hands the relock to
//! the runtime so key material is not left exposed.

use crate::account::{Account, AccountError};
use crate::config::SigningConfig;
use crate::{Error, Result};
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

/// External account call, bounded by the configured timeout
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Operation {
    IsUnlocked,
    Unlock,
    Lock,
    Sign,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Operation::IsUnlocked => "unlock state query",
            Operation::Unlock => "unlock",
            Operation::Lock => "lock",
            Operation::Sign => "sign",
        };
        f.write_str(name)
    }
}

/// Failure of a single bounded account call
#[derive(Debug, thiserror::Error)]
pub enum CallError {
    #[error("{operation} timed out after {after:?}")]
    TimedOut { operation: Operation, after: Duration },

    #[error("{operation} failed: {source}")]
    Failed {
        operation: Operation,
        #[source]
        source: AccountError,
    },
}

impl CallError {
    pub fn operation(&self) -> Operation {
        match self {
            CallError::TimedOut { operation, .. } | CallError::Failed { operation, .. } => *operation,
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, CallError::TimedOut { .. })
    }
}

/// Run one account call, cancelling it once `timeout` elapses
pub async fn bounded<F, T>(operation: Operation, timeout: Duration, call: F) -> std::result::Result<T, CallError>
where
    F: Future<Output = std::result::Result<T, AccountError>>,
{
    match tokio::time::timeout(timeout, call).await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(source)) => Err(CallError::Failed { operation, source }),
        Err(_) => Err(CallError::TimedOut {
            operation,
            after: timeout,
        }),
    }
}

/// How the account came to be usable for this call
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum UnlockState {
    /// Account has no lock; treated as always available
    NotLockable,
    /// Unlocked before this call; never relocked by it
    AlreadyUnlocked,
    /// Unlocked by this call; relocked when the session ends
    JustUnlocked,
}

/// Scoped unlock of one account
pub struct UnlockSession<A>
where
    A: Account + ?Sized + 'static,
{
    account: Arc<A>,
    timeout: Duration,
    state: UnlockState,
    armed: bool,
}

impl<A> UnlockSession<A>
where
    A: Account + ?Sized + 'static,
{
    /// Make `account` usable, unlocking it if required
    pub async fn open(account: &Arc<A>, config: &SigningConfig) -> Result<Self> {
        let state = unlock(&**account, config).await?;
        Ok(Self {
            account: Arc::clone(account),
            timeout: config.timeout,
            state,
            armed: state == UnlockState::JustUnlocked,
        })
    }

    pub fn state(&self) -> UnlockState {
        self.state
    }

    /// End the session, relocking if this session unlocked the account
    pub async fn close(mut self) -> std::result::Result<(), CallError> {
        if !self.armed {
            return Ok(());
        }
        let result = relock(&*self.account, self.timeout).await;
        self.armed = false;
        result
    }
}

impl<A> Drop for UnlockSession<A>
where
    A: Account + ?Sized + 'static,
{
    fn drop(&mut self) {
        if !self.armed {
            return;
        }

        let account = Arc::clone(&self.account);
        let timeout = self.timeout;
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                tracing::warn!(
                    account = %account.name(),
                    "Signing interrupted, relocking account"
                );
                handle.spawn(async move {
                    if let Err(e) = relock(&*account, timeout).await {
                        tracing::error!(
                            account = %account.name(),
                            error = %e,
                            "Failed to relock account after interruption"
                        );
                    }
                });
            }
            Err(_) => {
                tracing::error!(
                    account = %account.name(),
                    "No runtime available to relock account; account left unlocked"
                );
            }
        }
    }
}

async fn unlock<A>(account: &A, config: &SigningConfig) -> Result<UnlockState>
where
    A: Account + ?Sized,
{
    let Some(locker) = account.as_locker() else {
        tracing::debug!(account = %account.name(), "Account does not support unlocking");
        return Ok(UnlockState::NotLockable);
    };

    let unlocked = bounded(Operation::IsUnlocked, config.timeout, locker.is_unlocked())
        .await
        .map_err(|e| match e {
            CallError::TimedOut { operation, after } => Error::Timeout { operation, after },
            CallError::Failed { source, .. } => Error::UnlockState {
                account: account.name().to_string(),
                source,
            },
        })?;
    if unlocked {
        tracing::debug!(account = %account.name(), "Account already unlocked");
        return Ok(UnlockState::AlreadyUnlocked);
    }

    for (attempt, passphrase) in config.passphrases.iter().enumerate() {
        match bounded(Operation::Unlock, config.timeout, locker.unlock(passphrase.as_bytes())).await {
            Ok(()) => {
                tracing::debug!(account = %account.name(), attempt, "Account unlocked");
                return Ok(UnlockState::JustUnlocked);
            }
            Err(CallError::TimedOut { operation, after }) => {
                // The unlock may have taken effect before the reply was lost.
                if let Err(e) = relock(account, config.timeout).await {
                    tracing::error!(
                        account = %account.name(),
                        error = %e,
                        "Failed to relock account after unlock timeout"
                    );
                }
                return Err(Error::Timeout { operation, after });
            }
            Err(CallError::Failed { source, .. }) => {
                tracing::debug!(
                    account = %account.name(),
                    attempt,
                    error = %source,
                    "Passphrase rejected"
                );
            }
        }
    }

    Err(Error::UnlockFailed {
        account: account.name().to_string(),
        attempts: config.passphrases.len(),
    })
}

async fn relock<A>(account: &A, timeout: Duration) -> std::result::Result<(), CallError>
where
    A: Account + ?Sized,
{
    match account.as_locker() {
        Some(locker) => {
            bounded(Operation::Lock, timeout, locker.lock()).await?;
            tracing::debug!(account = %account.name(), "Account relocked");
            Ok(())
        }
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::account::MemoryAccount;

    fn config(passphrases: &[&str]) -> SigningConfig {
        passphrases
            .iter()
            .fold(SigningConfig::default(), |c, p| c.with_passphrase(*p))
            .with_timeout(Duration::from_secs(1))
    }

    #[tokio::test]
    async fn test_bounded_reports_timeout() {
        let result: std::result::Result<(), CallError> = bounded(
            Operation::Sign,
            Duration::from_millis(20),
            std::future::pending(),
        )
        .await;

        let err = result.unwrap_err();
        assert!(err.is_timeout());
        assert_eq!(err.operation(), Operation::Sign);
    }

    #[tokio::test]
    async fn test_bounded_reports_failure() {
        let result: std::result::Result<(), CallError> =
            bounded(Operation::Lock, Duration::from_secs(1), async {
                Err(AccountError::Refused("busy".into()))
            })
            .await;

        assert!(matches!(
            result,
            Err(CallError::Failed { operation: Operation::Lock, .. })
        ));
    }

    #[tokio::test]
    async fn test_session_without_locker() {
        let account = Arc::new(MemoryAccount::generate("plain"));
        let session = UnlockSession::open(&account, &config(&[])).await.unwrap();

        assert_eq!(session.state(), UnlockState::NotLockable);
        session.close().await.unwrap();
    }

    #[tokio::test]
    async fn test_session_unlocks_and_relocks() {
        let account = Arc::new(MemoryAccount::generate("vault").with_passphrase("pw"));
        let session = UnlockSession::open(&account, &config(&["nope", "pw"])).await.unwrap();

        assert_eq!(session.state(), UnlockState::JustUnlocked);
        assert!(account.is_unlocked_now());

        session.close().await.unwrap();
        assert!(!account.is_unlocked_now());
    }

    #[tokio::test]
    async fn test_session_leaves_foreign_unlock_alone() {
        let account = Arc::new(MemoryAccount::generate("vault").with_passphrase("pw"));
        crate::account::Locker::unlock(&*account, b"pw").await.unwrap();

        let session = UnlockSession::open(&account, &config(&[])).await.unwrap();
        assert_eq!(session.state(), UnlockState::AlreadyUnlocked);

        session.close().await.unwrap();
        assert!(account.is_unlocked_now());
    }

    #[tokio::test]
    async fn test_session_exhausts_passphrases() {
        let account = Arc::new(MemoryAccount::generate("vault").with_passphrase("pw"));
        let err = UnlockSession::open(&account, &config(&["a", "b"]))
            .await
            .err()
            .unwrap();

        assert!(matches!(err, Error::UnlockFailed { attempts: 2, .. }));
        assert!(!account.is_unlocked_now());
    }

    #[tokio::test]
    async fn test_dropped_session_relocks() {
        let account = Arc::new(MemoryAccount::generate("vault").with_passphrase("pw"));
        let session = UnlockSession::open(&account, &config(&["pw"])).await.unwrap();
        assert!(account.is_unlocked_now());

        drop(session);
        tokio::task::yield_now().await;
        tokio::time::sleep(Duration::from_millis(10)).await;

        assert!(!account.is_unlocked_now());
    }
}
