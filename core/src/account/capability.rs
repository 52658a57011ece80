//! Capability probing

use super::Account;
use std::fmt;

/// Optional account ability
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Capability {
    Locker,
    ProtectingSigner,
    Signer,
}

impl Capability {
    pub const ALL: [Capability; 3] = [
        Capability::Locker,
        Capability::ProtectingSigner,
        Capability::Signer,
    ];

    const fn bit(self) -> u8 {
        match self {
            Capability::Locker => 1 << 0,
            Capability::ProtectingSigner => 1 << 1,
            Capability::Signer => 1 << 2,
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Capability::Locker => "unlocking",
            Capability::ProtectingSigner => "protected signing",
            Capability::Signer => "signing",
        };
        f.write_str(name)
    }
}

/// Set of capabilities an account supports.
///
/// Capabilities are independent: an account may support none, some or all.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Capabilities(u8);

impl Capabilities {
    pub const NONE: Self = Self(0);

    /// Inspect `account` for each optional interface
    pub fn probe<A>(account: &A) -> Self
    where
        A: Account + ?Sized,
    {
        let mut caps = Self::NONE;
        if account.as_locker().is_some() {
            caps = caps.with(Capability::Locker);
        }
        if account.as_protecting_signer().is_some() {
            caps = caps.with(Capability::ProtectingSigner);
        }
        if account.as_signer().is_some() {
            caps = caps.with(Capability::Signer);
        }
        caps
    }

    pub const fn with(self, capability: Capability) -> Self {
        Self(self.0 | capability.bit())
    }

    pub const fn contains(self, capability: Capability) -> bool {
        self.0 & capability.bit() != 0
    }

    pub fn is_locker(self) -> bool {
        self.contains(Capability::Locker)
    }

    pub fn is_protecting_signer(self) -> bool {
        self.contains(Capability::ProtectingSigner)
    }

    pub fn is_signer(self) -> bool {
        self.contains(Capability::Signer)
    }

    pub fn iter(self) -> impl Iterator<Item = Capability> {
        Capability::ALL.into_iter().filter(move |c| self.contains(*c))
    }
}

impl fmt::Debug for Capabilities {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}
