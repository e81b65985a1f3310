#![doc(html_root_url = "https://docs.rs/av1hw/0.1.0")]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![deny(rustdoc::missing_crate_level_docs)]

//! # av1hw - AV1 Hardware Decode Adaptation
//!
//! `av1hw` sits between an AV1 bitstream and a platform hardware decode session
//! (VideoToolbox and friends). It does two things:
//!
//! - builds the `av1C` configuration record a hardware decoder is initialized from
//! - collects the coded bytes of each frame into one contiguous buffer, hands it to the
//!   session once, and resets for the next frame
//!
//! ## Quick Start
//!
//! Add this to your `Cargo.toml`:
//!
//! ```toml
//! [dependencies]
//! av1hw = "0.1.0"
//! ```
//!
//! ### Driving a Decode Session
//!
//! ```rust,no_run
//! use av1hw::codec::av1::Av1HwDecoder;
//! use av1hw::hwaccel::{FrameSubmission, HwDecodeSession};
//!
//! #[derive(Default)]
//! struct PlatformSession {
//!     extradata: Vec<u8>,
//! }
//!
//! impl HwDecodeSession for PlatformSession {
//!     type Picture = usize;
//!
//!     fn submit(&mut self, frame: FrameSubmission<'_>) -> av1hw::Result<usize> {
//!         if let Some(record) = frame.configuration {
//!             // (re)create the platform session from the av1C bytes
//!             self.extradata = record.as_bytes().to_vec();
//!         }
//!         // decode frame.bitstream; the picture here is just its size
//!         Ok(frame.bitstream.len())
//!     }
//! }
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut decoder = Av1HwDecoder::new(PlatformSession::default())?;
//! # let temporal_units: Vec<Vec<u8>> = Vec::new();
//! for unit in temporal_units {
//!     if let Some(coded_bytes) = decoder.decode_temporal_unit(&unit)? {
//!         println!("decoded a frame from {} bytes", coded_bytes);
//!     }
//! }
//! let session = decoder.into_session();
//! println!("av1C record: {} bytes", session.extradata.len());
//! # Ok(())
//! # }
//! ```
//!
//! ## Module Overview
//!
//! - `hwaccel`: the hardware-facing core
//!   - `av1C` configuration record builder
//!   - Per-frame bitstream buffer
//!   - Frame callback state machine and the `HwDecodeSession` seam
//!
//! - `codec`: AV1 bitstream front end
//!   - OBU splitting
//!   - Sequence header parsing
//!   - Temporal unit decode driver
//!
//! - `av`: Codec-agnostic decoder traits
//!
//! - `error`: Error handling types and utilities
//!
//! - `config`: Buffer sizing configuration
//!
//! - `utils`: Bit reading and writing
//!
/// Audio/Video base types and traits
pub mod av;

/// AV1 bitstream handling
pub mod codec;

/// Configuration module
pub mod config;

/// Error types and utilities
pub mod error;

/// Hardware decode adaptation layer
pub mod hwaccel;

/// Common utilities and helper functions
pub mod utils;

pub use error::{Av1HwError, Result};
