//! The untrusted server store: an indexed container of opaque ciphertext
//! blobs, one per tree node.

use crate::error::OramError;
use crate::tree::Geometry;

/// The blocks-per-bucket parameter `Z` used when a caller does not specify
/// one explicitly.
pub const DEFAULT_BLOCKS_PER_BUCKET: usize = 4;

/// A trivial indexed store of opaque ciphertext blobs.
///
/// The server does not parse ciphertexts; it preserves whatever bytes are
/// written and returns them verbatim. Concurrency is the client's
/// responsibility (see the crate-level docs on the single-client contract).
pub trait ServerStore {
    /// Returns the tree geometry this store was constructed with.
    fn geometry(&self) -> Geometry;
    /// Returns the ciphertext currently stored at node `index`.
    fn get(&self, index: usize) -> Vec<u8>;
    /// Overwrites the ciphertext stored at node `index`.
    fn put(&mut self, index: usize, ciphertext: Vec<u8>);
}

/// A server backed by an in-process `Vec` of ciphertext blobs.
#[derive(Debug)]
pub struct Server {
    geometry: Geometry,
    tree: Vec<Vec<u8>>,
}

impl Server {
    /// Constructs a server with block capacity `n` and the default `Z = 4`.
    pub fn new(n: u64) -> Result<Self, OramError> {
        Self::with_block_size(n, DEFAULT_BLOCKS_PER_BUCKET)
    }

    /// Constructs a server with block capacity `n` and `z` blocks per
    /// bucket. Fails with [`OramError::InvalidConfiguration`] if
    /// `num_buckets = floor(n / z) < 2`.
    pub fn with_block_size(n: u64, z: usize) -> Result<Self, OramError> {
        let geometry = Geometry::new(n, z)?;
        log::debug!(
            "Server::new -- N={}, Z={}, num_buckets={}, L={}",
            geometry.n,
            geometry.z,
            geometry.num_buckets,
            geometry.height
        );
        Ok(Self {
            tree: vec![Vec::new(); geometry.num_buckets],
            geometry,
        })
    }
}

impl ServerStore for Server {
    fn geometry(&self) -> Geometry {
        self.geometry
    }

    fn get(&self, index: usize) -> Vec<u8> {
        log::trace!("Server::get -- node {index}");
        self.tree[index].clone()
    }

    fn put(&mut self, index: usize, ciphertext: Vec<u8>) {
        log::trace!("Server::put -- node {index}, {} bytes", ciphertext.len());
        self.tree[index] = ciphertext;
    }
}
