//! The fixed-width Block codec.

use crate::error::OramError;
use static_assertions::const_assert_eq;

/// The width in bytes of a payload.
pub const PAYLOAD_LEN: usize = 4;

/// The serialized width of a `Block`: 4 bytes of address, 4 bytes of leaf,
/// 4 bytes of payload, 1 byte of dummy flag.
pub const BLOCK_LEN: usize = 13;

const_assert_eq!(BLOCK_LEN, 4 + 4 + PAYLOAD_LEN + 1);

const DUMMY_FLAG_TRUE: u8 = b'1';
const DUMMY_FLAG_FALSE: u8 = b'0';
const DUMMY_PAYLOAD: [u8; PAYLOAD_LEN] = *b"----";

/// A logical record: an address `a`, the leaf `x` it is currently mapped to,
/// a 4-byte payload, and a dummy flag.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Block {
    /// Logical address in `[0, N]`; `N` denotes a dummy block.
    pub a: u64,
    /// The leaf index this block is currently mapped to.
    pub x: u64,
    /// The 4-byte payload.
    pub data: [u8; PAYLOAD_LEN],
    /// True iff this is a filler block.
    pub dummy: bool,
}

impl Block {
    /// Constructs a dummy block with sentinel address `dummy_address` and the
    /// literal payload `"----"`.
    pub fn dummy(dummy_address: u64) -> Self {
        Self {
            a: dummy_address,
            x: 0,
            data: DUMMY_PAYLOAD,
            dummy: true,
        }
    }

    /// Serializes this block to its fixed 13-byte wire form.
    ///
    /// Truncates `a`/`x` to 32 bits; `Geometry::new` rejects any capacity or
    /// leaf count that would make that lossy, so this never loses bits for
    /// a block obtained through the public API.
    pub fn serialize(&self) -> [u8; BLOCK_LEN] {
        let mut out = [0u8; BLOCK_LEN];
        out[0..4].copy_from_slice(&(self.a as u32).to_be_bytes());
        out[4..8].copy_from_slice(&(self.x as u32).to_be_bytes());
        out[8..8 + PAYLOAD_LEN].copy_from_slice(&self.data);
        out[12] = if self.dummy {
            DUMMY_FLAG_TRUE
        } else {
            DUMMY_FLAG_FALSE
        };
        out
    }

    /// Deserializes a block from its fixed 13-byte wire form.
    pub fn deserialize(bytes: &[u8]) -> Result<Self, OramError> {
        if bytes.len() != BLOCK_LEN {
            return Err(OramError::CorruptBucket {
                index: usize::MAX,
                reason: format!("block has length {}, expected {BLOCK_LEN}", bytes.len()),
            });
        }
        let a = u32::from_be_bytes(bytes[0..4].try_into().unwrap()) as u64;
        let x = u32::from_be_bytes(bytes[4..8].try_into().unwrap()) as u64;
        let mut data = [0u8; PAYLOAD_LEN];
        data.copy_from_slice(&bytes[8..8 + PAYLOAD_LEN]);
        let dummy = bytes[12] == DUMMY_FLAG_TRUE;
        Ok(Self { a, x, data, dummy })
    }
}
