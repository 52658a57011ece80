//! Digest construction
//!
//! A payload is reduced to its structural root, then bound to a signing domain
//! through a two-field [`SigningContainer`]. Accounts that build their own
//! digests receive the root and domain instead (see [`crate::orchestrator`]).

use crate::canonical::{hash_tree_root, CanonicalizationError};
use crate::types::{Digest, Domain, Root};
use serde::Serialize;

/// Container hashed to produce the digest on the manual signing path.
///
/// Both fields are exactly 32 bytes, so its root is `sha256(root || domain)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SigningContainer {
    pub root: Root,
    pub domain: Domain,
}

impl SigningContainer {
    pub fn new(root: Root, domain: Domain) -> Self {
        Self { root, domain }
    }

    /// Canonical hash of the container
    pub fn digest(&self) -> Digest {
        // Only floats, options, maps and data-carrying variants fail; neither field is one.
        let root = hash_tree_root(self)
            .expect("Two 32-byte fields should always have a canonical form");
        Digest(root.0)
    }
}

/// Compute the canonical root of an arbitrary payload
pub fn build_root<T>(payload: &T) -> Result<Root, CanonicalizationError>
where
    T: ?Sized + Serialize,
{
    let root = hash_tree_root(payload)?;
    tracing::debug!(root = %root, "Object root");
    Ok(root)
}

/// Bind a payload root to a signing domain
pub fn build_signing_digest(root: &Root, domain: &Domain) -> Digest {
    let container = SigningContainer::new(*root, *domain);
    tracing::debug!(
        root = %container.root,
        domain = %container.domain,
        "Signing container"
    );

    let digest = container.digest();
    tracing::debug!(signing_root = %digest, "Signing root");
    digest
}

/// [`build_signing_digest`] for untrusted byte slices; rejects anything but 32 bytes
pub fn build_signing_digest_from_slices(root: &[u8], domain: &[u8]) -> crate::Result<Digest> {
    let root = Root::try_from(root)?;
    let domain = Domain::try_from(domain)?;
    Ok(build_signing_digest(&root, &domain))
}
