//! Error types for shared-region operations.

use thiserror::Error;

/// Errors that can occur while creating, attaching or validating the
/// shared data region.
#[derive(Debug, Error)]
pub enum RegionError {
    /// Another producer already holds the region's exclusive lock.
    #[error("producer already running for region '{name}'")]
    ProducerAlreadyRunning {
        /// Region name.
        name: String,
    },

    /// Region does not exist in `/dev/shm/`.
    #[error("region not found: '{name}' — is the producer running?")]
    NotFound {
        /// Region name.
        name: String,
    },

    /// Invalid magic bytes in the region header.
    #[error("invalid magic on region '{name}' — not a grill region or still initializing")]
    InvalidMagic {
        /// Region name.
        name: String,
    },

    /// Layout hash mismatch (struct layout incompatibility between builds).
    #[error("layout mismatch on '{name}': expected 0x{expected:08X}, got 0x{actual:08X}")]
    LayoutMismatch {
        /// Region name.
        name: String,
        /// Expected hash (compiled-in).
        expected: u32,
        /// Actual hash read from the region.
        actual: u32,
    },

    /// Region file exists but is smaller than the expected layout.
    #[error("region '{name}' too small: need {expected} bytes, got {actual}")]
    SizeMismatch {
        /// Region name.
        name: String,
        /// Expected minimum size in bytes.
        expected: usize,
        /// Actual file size in bytes.
        actual: usize,
    },

    /// Permission denied when opening the region.
    #[error("permission denied for region '{name}'")]
    PermissionDenied {
        /// Region name.
        name: String,
    },

    /// OS-level error from nix/libc calls.
    #[error("OS error on region '{name}': {source}")]
    Os {
        /// Region name.
        name: String,
        /// Underlying errno.
        source: nix::errno::Errno,
    },
}

/// Result type for region operations.
pub type RegionResult<T> = Result<T, RegionError>;
