//! A non-recursive Path-ORAM client/server pair.
//!
//! The server ([`Server`]) is a trivial indexed store of opaque,
//! authenticated ciphertext blobs; it never sees plaintext addresses,
//! payloads, or leaf labels. The client ([`Client`]) holds the position
//! map, the stash, and the per-bucket key material, and is the only party
//! that performs the oblivious [`Client::access`] protocol: a root-to-leaf
//! path read followed by a leaf-to-root greedy eviction.
//!
//! ```
//! use path_oram::{Client, Server};
//! use rand::{rngs::StdRng, SeedableRng};
//!
//! let mut rng = StdRng::seed_from_u64(0);
//! let mut server = Server::new(16).unwrap();
//! let mut client = Client::new(&mut server, &mut rng).unwrap();
//!
//! client.store(&mut server, 3, b"ABCD", &mut rng).unwrap();
//! assert_eq!(
//!     client.retrieve(&mut server, 3, &mut rng).unwrap(),
//!     Some(*b"ABCD")
//! );
//! ```

#![warn(clippy::cargo, clippy::doc_markdown, missing_docs, rustdoc::all)]

mod block;
mod bucket;
mod client;
mod crypto;
mod error;
mod position_map;
mod server;
mod stash;
mod tree;

pub use block::{Block, BLOCK_LEN, PAYLOAD_LEN};
pub use client::{Client, Op};
pub use crypto::{BucketKey, Nonce96};
pub use error::OramError;
pub use server::{Server, ServerStore, DEFAULT_BLOCKS_PER_BUCKET};
pub use tree::Geometry;

/// The numeric type used to address blocks and to size an ORAM in blocks.
pub type IndexType = u64;

/// Validated `(capacity, blocks_per_bucket)` configuration for a Path-ORAM
/// instance, mirroring the builder-validation style used elsewhere in this
/// crate's dependency graph for storage configuration objects: validate
/// once at construction, then hand out infallible accessors.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Config {
    capacity: IndexType,
    blocks_per_bucket: usize,
}

impl Config {
    /// Builds a configuration with the default blocks-per-bucket
    /// ([`DEFAULT_BLOCKS_PER_BUCKET`]). Fails if `capacity` cannot support
    /// at least two buckets.
    pub fn new(capacity: IndexType) -> Result<Self, OramError> {
        Self::with_blocks_per_bucket(capacity, DEFAULT_BLOCKS_PER_BUCKET)
    }

    /// Builds a configuration with an explicit blocks-per-bucket `z`.
    /// Fails with [`OramError::InvalidConfiguration`] under the same
    /// condition as [`Geometry::new`].
    pub fn with_blocks_per_bucket(capacity: IndexType, z: usize) -> Result<Self, OramError> {
        // Validated eagerly so a bad configuration never reaches server
        // construction.
        Geometry::new(capacity, z)?;
        Ok(Self {
            capacity,
            blocks_per_bucket: z,
        })
    }

    /// The validated block capacity.
    pub fn capacity(&self) -> IndexType {
        self.capacity
    }

    /// The validated blocks-per-bucket.
    pub fn blocks_per_bucket(&self) -> usize {
        self.blocks_per_bucket
    }

    /// Constructs the [`Server`] this configuration describes.
    pub fn build_server(&self) -> Result<Server, OramError> {
        Server::with_block_size(self.capacity, self.blocks_per_bucket)
    }
}
