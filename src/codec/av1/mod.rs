//! # AV1 Bitstream Front End
//!
//! Just enough AV1 to feed a hardware decoder:
//!
//! - OBU header parsing and temporal unit splitting
//! - Sequence header parsing (`sequence_header_obu()` through `color_config()`)
//! - [`Av1HwDecoder`], which routes each OBU to a [`FrameSessionAdapter`] callback
//!
//! Frame headers and tile data are never interpreted; their bytes are handed to the
//! hardware as they are.
//!
//! ## Example: Reading a Sequence Header
//!
//! ```rust
//! use av1hw::codec::av1::{split_obus, Av1Parser, ObuType};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! // Temporal delimiter followed by a reduced still picture sequence header
//! let data = [
//!     0x12, 0x00,
//!     0x0A, 0x05, 0x18, 0x00, 0x00, 0x00, 0x00,
//! ];
//!
//! let parser = Av1Parser::new();
//! for obu in split_obus(&data)? {
//!     if obu.obu_type() == ObuType::SequenceHeader {
//!         let seq = parser.parse_obu(&obu)?;
//!         assert!(seq.is_some());
//!     }
//! }
//! assert_eq!(parser.dimensions(), Some((1, 1)));
//! # Ok(())
//! # }
//! ```
//!
//! [`FrameSessionAdapter`]: crate::hwaccel::FrameSessionAdapter

/// Temporal unit driver for hardware decode sessions
pub mod decoder;
/// OBU framing
pub mod obu;
/// Sequence header parser
pub mod parser;
/// Type definitions for AV1 syntax structures
pub mod types;


#[doc(inline)]
pub use decoder::{Av1CodecData, Av1HwDecoder};
#[doc(inline)]
pub use obu::{parse_obu, parse_obu_header, read_leb128, split_obus, Obu};
#[doc(inline)]
pub use parser::Av1Parser;
#[doc(inline)]
pub use types::*;
