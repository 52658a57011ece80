//! Canonical structural hashing
//!
//! Reduces any `serde::Serialize` value to a 32-byte Merkle root:
//! - basic values (bools, integers, chars, unit enum variants) are little-endian
//!   bytes packed into 32-byte chunks by their enclosing collection
//! - structs are containers: the Merkle root of their field roots
//! - sequences, strings and byte strings mix their length into the root
//! - fixed-size arrays and tuples do not
//!
//! Floats, options, maps and enum variants carrying data have no canonical form
//! and are rejected.

mod merkle;
mod serializer;

use crate::types::Root;
use serde::Serialize;
use serializer::TreeHasher;
use std::fmt;

/// Payload could not be reduced to a structural hash
#[derive(Debug, thiserror::Error)]
pub enum CanonicalizationError {
    #[error("Unsupported value kind: {0}")]
    Unsupported(&'static str),

    #[error("{0}")]
    Custom(String),
}

impl serde::ser::Error for CanonicalizationError {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        CanonicalizationError::Custom(msg.to_string())
    }
}

/// Compute the structural hash of `value`
pub fn hash_tree_root<T>(value: &T) -> Result<Root, CanonicalizationError>
where
    T: ?Sized + Serialize,
{
    let node = value.serialize(TreeHasher)?;
    Ok(Root(node.into_chunk()))
}
