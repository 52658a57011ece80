//! SHA-256 chunk merkleization

use sha2::{Digest, Sha256};

pub const CHUNK_SIZE: usize = 32;

/// 32-byte Merkle chunk
pub type Chunk = [u8; CHUNK_SIZE];

pub const ZERO_CHUNK: Chunk = [0u8; CHUNK_SIZE];

pub fn hash_pair(left: &Chunk, right: &Chunk) -> Chunk {
    let mut hasher = Sha256::new();
    hasher.update(left);
    hasher.update(right);
    hasher.finalize().into()
}

/// Split packed bytes into right-zero-padded chunks.
pub fn pack(bytes: &[u8]) -> Vec<Chunk> {
    bytes
        .chunks(CHUNK_SIZE)
        .map(|piece| {
            let mut chunk = ZERO_CHUNK;
            chunk[..piece.len()].copy_from_slice(piece);
            chunk
        })
        .collect()
}

/// Merkle root of `chunks`, padded with zero chunks to the next power of two.
pub fn merkleize(mut chunks: Vec<Chunk>) -> Chunk {
    match chunks.len() {
        0 => return ZERO_CHUNK,
        1 => return chunks[0],
        _ => {}
    }

    chunks.resize(chunks.len().next_power_of_two(), ZERO_CHUNK);
    while chunks.len() > 1 {
        chunks = chunks
            .chunks_exact(2)
            .map(|pair| hash_pair(&pair[0], &pair[1]))
            .collect();
    }
    chunks[0]
}

pub fn mix_in_length(root: &Chunk, length: usize) -> Chunk {
    let mut encoded = ZERO_CHUNK;
    encoded[..8].copy_from_slice(&(length as u64).to_le_bytes());
    hash_pair(root, &encoded)
}
