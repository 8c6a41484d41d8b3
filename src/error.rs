//! The error taxonomy shared by the server store and the client Access engine.

use thiserror::Error;

/// Errors produced by the Path-ORAM client and server.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum OramError {
    /// Raised at construction time when `N < 2*Z`, i.e. the tree would have
    /// fewer than two buckets.
    #[error("invalid configuration: capacity {capacity} is too small for {blocks_per_bucket} blocks per bucket")]
    InvalidConfiguration {
        /// The requested block capacity `N`.
        capacity: u64,
        /// The requested blocks-per-bucket `Z`.
        blocks_per_bucket: usize,
    },

    /// Raised when a caller supplies an out-of-range address or a payload of
    /// the wrong width. No I/O is performed.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Raised when a bucket fails authenticated decryption, signaling a
    /// corrupt or tampered server. Fatal to the Access in progress; client
    /// state is left unchanged.
    #[error("integrity error: bucket {index} failed authenticated decryption")]
    IntegrityError {
        /// The flat tree index of the offending bucket.
        index: usize,
    },

    /// Raised when a decrypted bucket does not decode into exactly `Z`
    /// 13-byte blocks. Treated identically to `IntegrityError`.
    #[error("corrupt bucket at index {index}: {reason}")]
    CorruptBucket {
        /// The flat tree index of the offending bucket.
        index: usize,
        /// A short description of what about the bucket was malformed.
        reason: String,
    },
}
