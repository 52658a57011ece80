//! Cryptographic primitives module
//!
//! This module provides:
//! - Ed25519 signing and verification
//! - Key generation for in-memory accounts

pub mod signing;

pub use signing::{Keypair, PublicKey};
