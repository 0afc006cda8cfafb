//! Error types for Cauchy Reed-Solomon operations.
//!
//! This module provides a single error type covering everything that can go
//! wrong encoding or decoding a chunk set: malformed chunk headers, chunks
//! that disagree with each other about the file they belong to, integrity
//! failures, and the internal invariants the codec itself depends on.

use std::io;
use thiserror::Error;

/// The error type for Cauchy Reed-Solomon operations.
#[derive(Debug, Error)]
pub enum CrsError {
    /// I/O error from the underlying reader/writer.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Chunk header magic did not match the expected `"CRS"` marker.
    #[error("invalid chunk magic: expected {expected:02x?}, found {found:02x?}")]
    InvalidMagic {
        /// Expected magic bytes.
        expected: [u8; 3],
        /// Magic bytes actually read.
        found: [u8; 3],
    },

    /// A chunk's header is shorter than the fixed 14-byte format requires.
    #[error("truncated chunk header: need {expected} bytes, found {found}")]
    TruncatedHeader {
        /// Bytes the header format requires.
        expected: usize,
        /// Bytes actually available.
        found: usize,
    },

    /// A chunk disagreed with the first accepted chunk's `block_count`.
    #[error("chunk splits mismatch: reference says {expected}, this chunk says {found}")]
    SplitsMismatch {
        /// `block_count` recorded by the first accepted chunk.
        expected: u16,
        /// `block_count` this chunk claims.
        found: u16,
    },

    /// A chunk disagreed with the first accepted chunk's output size.
    #[error("chunk size mismatch: reference says {expected} bytes, this chunk says {found}")]
    SizeMismatch {
        /// Output size recorded by the first accepted chunk.
        expected: u64,
        /// Output size this chunk claims.
        found: u64,
    },

    /// A chunk's identifier does not fall in the range the file format allows.
    #[error("chunk identifier {ident} is out of range")]
    InvalidIdent {
        /// The out-of-range identifier.
        ident: u16,
    },

    /// A chunk was seen twice among the inputs supplied for decode.
    #[error("duplicate chunk identifier {ident}")]
    DuplicateIdent {
        /// The identifier seen more than once.
        ident: u16,
    },

    /// Fewer distinct, mutually consistent chunks were supplied than
    /// `block_count` requires.
    #[error("need {need} valid chunks but only got {got}")]
    InsufficientChunks {
        /// Chunks required to reconstruct the file.
        need: usize,
        /// Valid, mutually consistent chunks actually supplied.
        got: usize,
    },

    /// The CRC-32 recorded in the chunk header did not match the
    /// reconstructed payload.
    #[error("CRC mismatch: expected {expected:#010x}, computed {computed:#010x}")]
    CrcMismatch {
        /// CRC-32 recorded in the chunk header.
        expected: u32,
        /// CRC-32 of the reconstructed payload.
        computed: u32,
    },

    /// The decode matrix built from the supplied chunk identifiers was
    /// singular, i.e. two accepted chunks selected the same Cauchy row.
    #[error("decode matrix is singular: rows for idents {row_a} and {row_b} coincide")]
    SingularMatrix {
        /// First colliding chunk identifier.
        row_a: u16,
        /// Second colliding chunk identifier.
        row_b: u16,
    },

    /// The input to encode was empty; there is nothing to split into chunks.
    #[error("cannot encode empty input")]
    EmptyInput,

    /// The requested split count does not fit the chunk container's format.
    #[error("invalid split count {splits}: must be in 1..={max}")]
    InvalidSplitCount {
        /// The requested split count.
        splits: usize,
        /// The largest split count the format allows.
        max: usize,
    },
}

/// Result type alias for CRS operations.
pub type Result<T> = std::result::Result<T, CrsError>;

impl CrsError {
    /// Create an invalid magic error.
    pub fn invalid_magic(expected: [u8; 3], found: [u8; 3]) -> Self {
        Self::InvalidMagic { expected, found }
    }

    /// Create a truncated header error.
    pub fn truncated_header(expected: usize, found: usize) -> Self {
        Self::TruncatedHeader { expected, found }
    }

    /// Create a splits mismatch error.
    pub fn splits_mismatch(expected: u16, found: u16) -> Self {
        Self::SplitsMismatch { expected, found }
    }

    /// Create a size mismatch error.
    pub fn size_mismatch(expected: u64, found: u64) -> Self {
        Self::SizeMismatch { expected, found }
    }

    /// Create an invalid ident error.
    pub fn invalid_ident(ident: u16) -> Self {
        Self::InvalidIdent { ident }
    }

    /// Create a duplicate ident error.
    pub fn duplicate_ident(ident: u16) -> Self {
        Self::DuplicateIdent { ident }
    }

    /// Create an insufficient chunks error.
    pub fn insufficient_chunks(need: usize, got: usize) -> Self {
        Self::InsufficientChunks { need, got }
    }

    /// Create a CRC mismatch error.
    pub fn crc_mismatch(expected: u32, computed: u32) -> Self {
        Self::CrcMismatch { expected, computed }
    }

    /// Create a singular matrix error.
    pub fn singular_matrix(row_a: u16, row_b: u16) -> Self {
        Self::SingularMatrix { row_a, row_b }
    }

    /// Create an invalid split count error.
    pub fn invalid_split_count(splits: usize, max: usize) -> Self {
        Self::InvalidSplitCount { splits, max }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = CrsError::invalid_magic(*b"CRS", [0x50, 0x4B, 0x03]);
        assert!(err.to_string().contains("invalid chunk magic"));

        let err = CrsError::insufficient_chunks(8, 5);
        assert!(err.to_string().contains("need 8 valid chunks but only got 5"));

        let err = CrsError::crc_mismatch(0x1234_5678, 0xDEAD_BEEF);
        assert!(err.to_string().contains("CRC mismatch"));
    }

    #[test]
    fn io_error_conversion() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let err: CrsError = io_err.into();
        assert!(matches!(err, CrsError::Io(_)));
    }
}
