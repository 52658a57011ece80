//! Signing configuration
//!
//! Every signing call receives its timeout and passphrase candidates from an
//! explicit [`SigningConfig`]; nothing is read from process-wide state.

use crate::{Error, Result};
use anyhow::Context;
use serde::Deserialize;
use std::fmt;
use std::time::Duration;
use zeroize::Zeroizing;

/// Default bound applied to each external account call
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Passphrase candidate, wiped from memory on drop
#[derive(Clone)]
pub struct Passphrase(Zeroizing<Vec<u8>>);

impl Passphrase {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self(Zeroizing::new(bytes.into()))
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl From<&str> for Passphrase {
    fn from(value: &str) -> Self {
        Self::new(value.as_bytes())
    }
}

impl From<String> for Passphrase {
    fn from(value: String) -> Self {
        Self::new(value.into_bytes())
    }
}

impl From<Vec<u8>> for Passphrase {
    fn from(value: Vec<u8>) -> Self {
        Self::new(value)
    }
}

impl fmt::Debug for Passphrase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Passphrase(<redacted>)")
    }
}

/// Signing configuration
#[derive(Debug, Clone)]
pub struct SigningConfig {
    /// Bound applied to every unlock, lock and sign call
    pub timeout: Duration,

    /// Ordered passphrase candidates tried when unlocking
    pub passphrases: Vec<Passphrase>,
}

impl Default for SigningConfig {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            passphrases: vec![],
        }
    }
}

/// On-disk form of [`SigningConfig`]
#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct RawSigningConfig {
    timeout_ms: Option<u64>,
    #[serde(default)]
    passphrases: Vec<String>,
}

impl SigningConfig {
    pub fn new(timeout: Duration, passphrases: Vec<Passphrase>) -> Self {
        Self {
            timeout,
            passphrases,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_passphrase(mut self, passphrase: impl Into<Passphrase>) -> Self {
        self.passphrases.push(passphrase.into());
        self
    }

    /// Load from JSON: `{ "timeout_ms": 5000, "passphrases": ["..."] }`
    pub fn from_json(json: &str) -> Result<Self> {
        let raw: RawSigningConfig =
            serde_json::from_str(json).context("Failed to parse signing configuration")?;

        let config = Self {
            timeout: raw.timeout_ms.map_or(DEFAULT_TIMEOUT, Duration::from_millis),
            passphrases: raw.passphrases.into_iter().map(Passphrase::from).collect(),
        };
        config.validate()?;
        Ok(config)
    }

    /// Reject settings no account call could satisfy
    pub fn validate(&self) -> Result<()> {
        if self.timeout.is_zero() {
            return Err(Error::Config("timeout must be greater than zero".into()));
        }
        Ok(())
    }
}
