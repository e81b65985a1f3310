//! # Hardware decode adaptation
//!
//! Everything a platform AV1 decode session needs from the software side:
//!
//! - [`ConfigurationRecord`]: the `av1C` record the session is initialized from
//! - [`BitstreamBuffer`]: the per-frame accumulation buffer
//! - [`FrameSessionAdapter`]: the callback state machine that fills the buffer and hands
//!   each frame to a [`HwDecodeSession`]
//!
//! ## Example
//!
//! ```rust
//! use av1hw::codec::av1::SequenceHeader;
//! use av1hw::hwaccel::{FrameSessionAdapter, FrameSubmission, HwDecodeSession};
//!
//! struct CountingSession;
//!
//! impl HwDecodeSession for CountingSession {
//!     type Picture = usize;
//!
//!     fn submit(&mut self, frame: FrameSubmission<'_>) -> av1hw::Result<usize> {
//!         Ok(frame.bitstream.len())
//!     }
//! }
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut adapter = FrameSessionAdapter::new(CountingSession)?;
//! adapter.update_sequence_header(&SequenceHeader::default(), &[0x0A, 0x00]);
//!
//! adapter.on_parameters(&[0x0A, 0x00])?;
//! adapter.on_frame_start(&[0x32, 0x00])?;
//! assert_eq!(adapter.on_frame_end()?, 4);
//! assert!(adapter.bitstream().is_empty());
//! # Ok(())
//! # }
//! ```

use crate::av::CodecType;

/// Per-frame bitstream accumulation
pub mod bitstream;
/// `av1C` configuration record packing
pub mod record;
/// Frame callback state machine and the decode session seam
pub mod session;

pub use bitstream::BitstreamBuffer;
pub use record::{ConfigurationRecord, AV1C_HEADER_LEN, AV1C_MARKER_VERSION};
pub use session::{FrameSessionAdapter, FrameState, FrameSubmission, HwDecodeSession};

/// Output surface format of a hardware decoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelFormat {
    /// Opaque platform image buffers produced by VideoToolbox.
    VideoToolbox,
}

/// Registration record of a hardware accelerator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HwAccelDescriptor {
    pub name: &'static str,
    pub codec: CodecType,
    pub pixel_format: PixelFormat,
}

pub const AV1_VIDEOTOOLBOX: HwAccelDescriptor = HwAccelDescriptor {
    name: "av1_videotoolbox",
    codec: CodecType::AV1,
    pixel_format: PixelFormat::VideoToolbox,
};
