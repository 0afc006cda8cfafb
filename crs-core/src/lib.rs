//! # CRS Core
//!
//! Shared building blocks for the Cauchy Reed-Solomon erasure-coding pipeline:
//!
//! - [`container`]: the fixed-size chunk header and the container format's
//!   read-side rejection rules
//! - [`crc`]: the CRC-32 variant used to verify reconstructed files
//! - [`error`]: the crate-wide error type
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │ crs-cli                                                  │
//! │     encode/decode drivers, CLI                           │
//! ├─────────────────────────────────────────────────────────┤
//! │ crs-codec                                                │
//! │     Cauchy matrix, encode, decode (Gaussian elimination)│
//! ├─────────────────────────────────────────────────────────┤
//! │ crs-core (this crate)                                    │
//! │     chunk container format, CRC-32, error types          │
//! ├─────────────────────────────────────────────────────────┤
//! │ crs-gf                                                   │
//! │     GF(2^16) log/exp tables, mul/inv/mac                 │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Example
//!
//! ```rust
//! use crs_core::container::ChunkHeader;
//! use crs_core::crc::Crc32;
//! use std::io::Cursor;
//!
//! let crc = Crc32::compute(b"hello world\n");
//! let header = ChunkHeader::new(1, 1, 12, crc);
//!
//! let mut buf = Vec::new();
//! header.write(&mut buf).unwrap();
//! let read_back = ChunkHeader::read(&mut Cursor::new(buf)).unwrap();
//! assert_eq!(read_back, header);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod container;
pub mod crc;
pub mod error;

pub use container::{ChunkHeader, MAGIC};
pub use crc::Crc32;
pub use error::{CrsError, Result};

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::container::ChunkHeader;
    pub use crate::crc::Crc32;
    pub use crate::error::{CrsError, Result};
}
