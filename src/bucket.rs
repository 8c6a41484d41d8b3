//! Grouping of `Z` blocks into a single bucket payload.

use crate::block::{Block, BLOCK_LEN};
use crate::error::OramError;

/// The two-byte separator joining serialized blocks inside a bucket payload.
pub const SEPARATOR: &[u8] = b"||";

/// Joins serialized blocks with [`SEPARATOR`] into a single plaintext
/// payload, ready for authenticated encryption. Length is
/// `Z * BLOCK_LEN + 2 * (Z - 1)` for a `Z`-sized bucket.
pub fn encode_bucket(blocks: &[Block]) -> Vec<u8> {
    let mut out = Vec::with_capacity(
        blocks.len() * BLOCK_LEN + blocks.len().saturating_sub(1) * SEPARATOR.len(),
    );
    for (i, block) in blocks.iter().enumerate() {
        if i > 0 {
            out.extend_from_slice(SEPARATOR);
        }
        out.extend_from_slice(&block.serialize());
    }
    out
}

/// Splits a decrypted bucket payload on [`SEPARATOR`] and deserializes each
/// piece. Fails with [`OramError::CorruptBucket`] if the piece count does not
/// equal `z` or any piece is not exactly [`BLOCK_LEN`] bytes.
pub fn decode_bucket(payload: &[u8], z: usize, index: usize) -> Result<Vec<Block>, OramError> {
    let pieces = split_on_separator(payload);

    if pieces.len() != z {
        return Err(OramError::CorruptBucket {
            index,
            reason: format!("bucket decoded into {} pieces, expected {z}", pieces.len()),
        });
    }

    pieces
        .into_iter()
        .map(|piece| {
            if piece.len() != BLOCK_LEN {
                return Err(OramError::CorruptBucket {
                    index,
                    reason: format!(
                        "block piece has length {}, expected {BLOCK_LEN}",
                        piece.len()
                    ),
                });
            }
            Block::deserialize(piece).map_err(|_| OramError::CorruptBucket {
                index,
                reason: "block piece failed to deserialize".into(),
            })
        })
        .collect()
}

fn split_on_separator(payload: &[u8]) -> Vec<&[u8]> {
    let mut pieces = Vec::new();
    let mut start = 0;
    let mut i = 0;
    while i + SEPARATOR.len() <= payload.len() {
        if &payload[i..i + SEPARATOR.len()] == SEPARATOR {
            pieces.push(&payload[start..i]);
            i += SEPARATOR.len();
            start = i;
        } else {
            i += 1;
        }
    }
    pieces.push(&payload[start..]);
    pieces
}
