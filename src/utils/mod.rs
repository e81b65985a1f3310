//! # Utility Functions and Types
//!
//! Bit-level helpers shared by the AV1 parser and the configuration record packer.
//!
//! ```rust
//! use av1hw::utils::{BitReader, BitWriter};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut writer = BitWriter::new();
//! writer.write_bits(0b101, 3);
//! writer.write_uvlc(5);
//! let data = writer.finish();
//!
//! let mut reader = BitReader::new(&data);
//! assert_eq!(reader.read_bits(3)?, 0b101);
//! assert_eq!(reader.read_uvlc()?, 5);
//! # Ok(())
//! # }
//! ```

/// Bit manipulation and bitstream reading/writing utilities
pub mod bits;

// Re-export commonly used types
pub use bits::*;
