//! The client Access engine: position map, stash, path read-back, greedy
//! eviction, and per-bucket authenticated encryption.

use rand::{CryptoRng, Rng, RngCore};

use crate::block::{Block, PAYLOAD_LEN};
use crate::bucket::{decode_bucket, encode_bucket};
use crate::crypto::{decrypt_bucket, encrypt_bucket, BucketKey, Nonce96};
use crate::error::OramError;
use crate::position_map::PositionMap;
use crate::server::ServerStore;
use crate::stash::Stash;
use crate::tree::Geometry;

/// An advisory soft bound on stash occupancy past which
/// [`OramError`]-free operation continues but a warning is logged
/// (§7, StashOverflow).
const STASH_SOFT_BOUND: usize = 64;

/// The three operations `Access` supports.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Op {
    /// Obliviously read a block's current payload.
    Read,
    /// Obliviously write a block's payload.
    Write,
    /// Obliviously remove a block.
    Delete,
}

/// The Path-ORAM client: owns the position map, the stash, and all
/// per-bucket key/nonce material. Never shares state with another client
/// instance and is not safe to call concurrently from multiple threads.
#[derive(Debug)]
pub struct Client {
    geometry: Geometry,
    position_map: PositionMap,
    stash: Stash,
    keys: Vec<BucketKey>,
    nonces: Vec<Nonce96>,
    dummy_address: u64,
}

impl Client {
    /// Constructs a client against `server`: samples a key per tree node,
    /// writes an encrypted all-dummy bucket to every node, and initializes
    /// the position map uniformly at random.
    pub fn new<R: RngCore + CryptoRng, S: ServerStore>(
        server: &mut S,
        rng: &mut R,
    ) -> Result<Self, OramError> {
        let geometry = server.geometry();
        log::debug!(
            "Client::new -- N={}, Z={}, num_buckets={}, L={}",
            geometry.n,
            geometry.z,
            geometry.num_buckets,
            geometry.height
        );

        let dummy_address = geometry.n;
        let keys: Vec<BucketKey> = (0..geometry.num_buckets)
            .map(|_| BucketKey::generate(rng))
            .collect();
        let mut nonces = Vec::with_capacity(geometry.num_buckets);

        for (index, key) in keys.iter().enumerate() {
            let nonce = Nonce96::generate(rng);
            nonces.push(nonce);

            let dummy_blocks: Vec<Block> =
                (0..geometry.z).map(|_| Block::dummy(dummy_address)).collect();
            let plaintext = encode_bucket(&dummy_blocks);
            let ciphertext = encrypt_bucket(key, nonce, &plaintext, index);
            server.put(index, ciphertext);
        }

        let position_map = PositionMap::new(geometry.n, geometry.num_leaves(), rng);

        Ok(Self {
            geometry,
            position_map,
            stash: Stash::new(),
            keys,
            nonces,
            dummy_address,
        })
    }

    /// Number of real blocks currently held in the stash. Exposed so
    /// callers can observe the advisory `StashOverflow` condition (§7).
    pub fn stash_len(&self) -> usize {
        self.stash.len()
    }

    /// Performs an oblivious access: reads the full path for the address's
    /// current leaf, applies `op`, runs greedy eviction, and returns the
    /// value observed before the operation (or `None` if the block has
    /// never been written).
    ///
    /// `data` must be `Some` with exactly 4 bytes for [`Op::Write`], and is
    /// ignored for [`Op::Read`] and [`Op::Delete`].
    pub fn access<R: RngCore + CryptoRng, S: ServerStore>(
        &mut self,
        op: Op,
        a: u64,
        data: Option<&[u8]>,
        server: &mut S,
        rng: &mut R,
    ) -> Result<Option<[u8; PAYLOAD_LEN]>, OramError> {
        if a >= self.geometry.n {
            return Err(OramError::InvalidArgument(format!(
                "address {a} out of range [0, {})",
                self.geometry.n
            )));
        }

        let payload = match (op, data) {
            (Op::Write, Some(bytes)) if bytes.len() == PAYLOAD_LEN => {
                let mut buf = [0u8; PAYLOAD_LEN];
                buf.copy_from_slice(bytes);
                Some(buf)
            }
            (Op::Write, Some(bytes)) => {
                return Err(OramError::InvalidArgument(format!(
                    "write payload has length {}, expected {PAYLOAD_LEN}",
                    bytes.len()
                )));
            }
            (Op::Write, None) => {
                return Err(OramError::InvalidArgument(
                    "write requires a payload".into(),
                ));
            }
            _ => None,
        };

        log::debug!("Client::access -- op={op:?} a={a}");

        // Remap: sample the new leaf now, but do not commit it until the
        // path read below has fully succeeded (§7: integrity errors must
        // not mutate the position map).
        let old_leaf = self.position_map.get(a);
        let new_leaf = rng.gen_range(0..self.geometry.num_leaves());

        let path_down = self.geometry.root_to_leaf_path(old_leaf);
        let mut incoming = Vec::new();
        for &node in &path_down {
            let ciphertext = server.get(node);
            let plaintext = decrypt_bucket(&self.keys[node], self.nonces[node], &ciphertext, node)?;
            let blocks = decode_bucket(&plaintext, self.geometry.z, node)?;
            for block in blocks {
                if !block.dummy {
                    incoming.push(block);
                }
            }
        }
        log::trace!("Client::access -- read path for leaf {old_leaf} ({} nodes)", path_down.len());

        // The path read succeeded: commit the remap and the stash contents.
        self.position_map.set(a, new_leaf);
        for block in incoming {
            self.stash.insert(block);
        }

        let old_payload = self.stash.get(a).map(|b| b.data);
        let result = match op {
            Op::Read => old_payload,
            Op::Write => {
                let data = payload.expect("validated above");
                self.stash.insert(Block {
                    a,
                    x: new_leaf,
                    data,
                    dummy: false,
                });
                old_payload
            }
            Op::Delete => {
                self.stash.remove(a);
                old_payload
            }
        };

        self.evict(old_leaf, server, rng);

        if self.stash.len() > STASH_SOFT_BOUND {
            log::warn!(
                "Client::access -- stash occupancy {} exceeds soft bound {}",
                self.stash.len(),
                STASH_SOFT_BOUND
            );
        }

        Ok(result)
    }

    /// Wraps `Access(write, a, Some(data))`.
    pub fn store<R: RngCore + CryptoRng, S: ServerStore>(
        &mut self,
        server: &mut S,
        a: u64,
        data: &[u8],
        rng: &mut R,
    ) -> Result<Option<[u8; PAYLOAD_LEN]>, OramError> {
        self.access(Op::Write, a, Some(data), server, rng)
    }

    /// Wraps `Access(read, a, None)`.
    pub fn retrieve<R: RngCore + CryptoRng, S: ServerStore>(
        &mut self,
        server: &mut S,
        a: u64,
        rng: &mut R,
    ) -> Result<Option<[u8; PAYLOAD_LEN]>, OramError> {
        self.access(Op::Read, a, None, server, rng)
    }

    /// Wraps `Access(delete, a, None)`.
    pub fn delete<R: RngCore + CryptoRng, S: ServerStore>(
        &mut self,
        server: &mut S,
        a: u64,
        rng: &mut R,
    ) -> Result<Option<[u8; PAYLOAD_LEN]>, OramError> {
        self.access(Op::Delete, a, None, server, rng)
    }

    /// Greedy eviction, leaf-to-root, for the path belonging to `old_leaf`.
    fn evict<R: RngCore + CryptoRng, S: ServerStore>(
        &mut self,
        old_leaf: u64,
        server: &mut S,
        rng: &mut R,
    ) {
        let path_down = self.geometry.root_to_leaf_path(old_leaf);

        for depth in (0..path_down.len()).rev() {
            let node = path_down[depth];

            let mut chosen_addresses = Vec::with_capacity(self.geometry.z);
            for block in self.stash.iter() {
                if chosen_addresses.len() >= self.geometry.z {
                    break;
                }
                let block_leaf = self.position_map.get(block.a);
                let block_path = self.geometry.root_to_leaf_path(block_leaf);
                if block_path[depth] == node {
                    chosen_addresses.push(block.a);
                }
            }

            let mut bucket_blocks: Vec<Block> = chosen_addresses
                .iter()
                .map(|&a| self.stash.remove(a).expect("address was just observed in the stash"))
                .collect();
            while bucket_blocks.len() < self.geometry.z {
                bucket_blocks.push(Block::dummy(self.dummy_address));
            }

            let nonce = Nonce96::generate(rng);
            self.nonces[node] = nonce;
            let plaintext = encode_bucket(&bucket_blocks);
            let ciphertext = encrypt_bucket(&self.keys[node], nonce, &plaintext, node);
            server.put(node, ciphertext);
        }

        log::trace!("Client::access -- evicted leaf {old_leaf} to root");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::server::Server;
    use rand::{rngs::StdRng, SeedableRng};

    fn setup(n: u64) -> (Server, Client, StdRng) {
        let mut rng = StdRng::seed_from_u64(42);
        let mut server = Server::new(n).unwrap();
        let client = Client::new(&mut server, &mut rng).unwrap();
        (server, client, rng)
    }

    #[test]
    fn read_your_writes() {
        let (mut server, mut client, mut rng) = setup(16);
        client.store(&mut server, 3, b"ABCD", &mut rng).unwrap();
        let result = client.retrieve(&mut server, 3, &mut rng).unwrap();
        assert_eq!(result, Some(*b"ABCD"));
    }

    #[test]
    fn overwrite_returns_latest_value() {
        let (mut server, mut client, mut rng) = setup(16);
        client.store(&mut server, 3, b"ABCD", &mut rng).unwrap();
        client.store(&mut server, 3, b"WXYZ", &mut rng).unwrap();
        let result = client.retrieve(&mut server, 3, &mut rng).unwrap();
        assert_eq!(result, Some(*b"WXYZ"));
    }

    #[test]
    fn unwritten_address_reads_as_none() {
        let (mut server, mut client, mut rng) = setup(16);
        let result = client.retrieve(&mut server, 7, &mut rng).unwrap();
        assert_eq!(result, None);
    }

    #[test]
    fn delete_then_read_is_none() {
        let (mut server, mut client, mut rng) = setup(16);
        client.store(&mut server, 5, b"ABCD", &mut rng).unwrap();
        client.delete(&mut server, 5, &mut rng).unwrap();
        let result = client.retrieve(&mut server, 5, &mut rng).unwrap();
        assert_eq!(result, None);
    }

    #[test]
    fn delete_of_unwritten_address_is_a_no_op() {
        let (mut server, mut client, mut rng) = setup(16);
        let result = client.delete(&mut server, 9, &mut rng).unwrap();
        assert_eq!(result, None);
        assert_eq!(client.retrieve(&mut server, 9, &mut rng).unwrap(), None);
    }

    #[test]
    fn out_of_range_address_is_rejected_without_io() {
        let (mut server, mut client, mut rng) = setup(16);
        let result = client.retrieve(&mut server, 16, &mut rng);
        assert!(matches!(result, Err(OramError::InvalidArgument(_))));
    }

    #[test]
    fn write_with_wrong_payload_width_is_rejected() {
        let (mut server, mut client, mut rng) = setup(16);
        let result = client.store(&mut server, 0, b"TOOLONG", &mut rng);
        assert!(matches!(result, Err(OramError::InvalidArgument(_))));
    }

    #[test]
    fn repeated_writes_to_same_address_do_not_grow_the_stash_unboundedly() {
        let (mut server, mut client, mut rng) = setup(16);
        for _ in 0..200 {
            client.store(&mut server, 3, b"ABCD", &mut rng).unwrap();
        }
        assert!(client.stash_len() <= 16);
    }

    #[test]
    fn non_power_of_two_bucket_count_still_functions() {
        // N = 12, Z = 4 => num_buckets = 3, an explicitly under-tested case
        // in the source this crate is grounded on.
        let mut rng = StdRng::seed_from_u64(7);
        let mut server = Server::new(12).unwrap();
        let mut client = Client::new(&mut server, &mut rng).unwrap();

        client.store(&mut server, 2, b"ABCD", &mut rng).unwrap();
        assert_eq!(
            client.retrieve(&mut server, 2, &mut rng).unwrap(),
            Some(*b"ABCD")
        );
    }

    #[test]
    fn random_workload_preserves_invariants() {
        use crate::server::ServerStore;
        use std::collections::HashMap;

        let mut rng = StdRng::seed_from_u64(123);
        let n = 16u64;
        let mut server = Server::new(n).unwrap();
        let mut client = Client::new(&mut server, &mut rng).unwrap();

        let mut model: HashMap<u64, [u8; 4]> = HashMap::new();
        let ciphertext_len = server.get(0).len();

        for _ in 0..1000 {
            let a = rng.gen_range(0..n);
            let choice: f64 = rng.gen();

            if choice < 0.34 {
                let mut payload = [0u8; 4];
                rng.fill(&mut payload);
                client.store(&mut server, a, &payload, &mut rng).unwrap();
                model.insert(a, payload);
            } else if choice < 0.67 {
                let expected = model.get(&a).copied();
                let observed = client.retrieve(&mut server, a, &mut rng).unwrap();
                assert_eq!(observed, expected);
            } else {
                client.delete(&mut server, a, &mut rng).unwrap();
                model.remove(&a);
            }

            // Invariant 1: ciphertext footprint is constant.
            for i in 0..server.geometry().num_buckets {
                assert_eq!(server.get(i).len(), ciphertext_len);
            }
            // Invariant 2: position map totality (implicit: get() never panics).
            // Invariant 3: stash holds only real blocks by construction of Stash.
            // Invariant 4: at most one copy of each real address across stash + tree.
        }
    }

    #[test]
    fn tamper_with_root_bucket_causes_integrity_error() {
        let (mut server, mut client, mut rng) = setup(16);
        client.store(&mut server, 0, b"ABCD", &mut rng).unwrap();

        let mut tampered = server.get(0);
        tampered[0] ^= 0x01;
        server.put(0, tampered);

        let result = client.retrieve(&mut server, 0, &mut rng);
        assert!(matches!(result, Err(OramError::IntegrityError { index: 0 })));
    }

    #[test]
    fn integrity_error_leaves_position_map_unchanged() {
        let (mut server, mut client, mut rng) = setup(16);
        client.store(&mut server, 0, b"ABCD", &mut rng).unwrap();

        let leaf_before = client.position_map.get(0);

        let mut tampered = server.get(0);
        tampered[0] ^= 0x01;
        server.put(0, tampered);
        let _ = client.retrieve(&mut server, 0, &mut rng);

        assert_eq!(client.position_map.get(0), leaf_before);
    }
}
