use async_trait::async_trait;
use bytes::Bytes;

use super::obu::{split_obus, Obu};
use super::parser::Av1Parser;
use super::types::ObuType;
use crate::av::{CodecData, CodecType, VideoDecoder};
use crate::config::{self, Config};
use crate::hwaccel::{ConfigurationRecord, FrameSessionAdapter, HwDecodeSession};
use crate::{Av1HwError, Result};

/// Stream description handed to muxers and players: the `av1C` record plus the
/// maximum frame size.
#[derive(Debug, Clone)]
pub struct Av1CodecData {
    pub record: ConfigurationRecord,
    pub width: u32,
    pub height: u32,
}

impl CodecData for Av1CodecData {
    fn codec_type(&self) -> CodecType {
        CodecType::AV1
    }

    fn width(&self) -> Option<u32> {
        Some(self.width)
    }

    fn height(&self) -> Option<u32> {
        Some(self.height)
    }

    fn extra_data(&self) -> Option<&[u8]> {
        Some(self.record.as_bytes())
    }
}

/// Drives a [`FrameSessionAdapter`] from low-overhead AV1 temporal units.
///
/// Sequence header OBUs go through `on_parameters`, frame header, frame and tile group
/// OBUs through `on_frame_start`, and the frame is ended once per temporal unit.
pub struct Av1HwDecoder<S: HwDecodeSession> {
    parser: Av1Parser,
    adapter: FrameSessionAdapter<S>,
}

impl<S: HwDecodeSession> Av1HwDecoder<S> {
    pub fn new(session: S) -> Result<Self> {
        Self::with_config(session, &config::current())
    }

    pub fn with_config(session: S, config: &Config) -> Result<Self> {
        Ok(Self {
            parser: Av1Parser::new(),
            adapter: FrameSessionAdapter::with_config(session, config)?,
        })
    }

    /// Feeds one temporal unit and returns the decoded picture, if the unit held a frame.
    ///
    /// If the unit fails before its frame is ended, whether while splitting or while
    /// feeding OBUs, every byte it added is dropped. Bytes carried over from earlier
    /// units, such as a sequence header that arrived on its own, stay buffered.
    pub fn decode_temporal_unit(&mut self, data: &[u8]) -> Result<Option<S::Picture>> {
        if self.adapter.is_closed() {
            return Err(Av1HwError::SessionClosed);
        }

        let carried = self.adapter.bitstream().len();
        let mut has_frame = false;

        if let Err(e) = self.feed_unit(data, &mut has_frame) {
            log::debug!("temporal unit rejected: {}", e);
            self.adapter.rollback_to(carried);
            return Err(e);
        }

        if !has_frame {
            return Ok(None);
        }
        self.adapter.on_frame_end().map(Some)
    }

    fn feed_unit(&mut self, data: &[u8], has_frame: &mut bool) -> Result<()> {
        for obu in &split_obus(data)? {
            self.feed(obu, has_frame)?;
        }
        Ok(())
    }

    fn feed(&mut self, obu: &Obu<'_>, has_frame: &mut bool) -> Result<()> {
        let obu_type = obu.obu_type();
        match obu_type {
            ObuType::SequenceHeader => {
                if let Some(seq) = self.parser.parse_obu(obu)? {
                    self.adapter.update_sequence_header(&seq, obu.data);
                }
                self.adapter.on_parameters(obu.data)
            }
            t if t.carries_frame_data() => {
                if self.adapter.configuration_record().is_none() {
                    return Err(Av1HwError::Codec(format!(
                        "{:?} OBU before any sequence header",
                        t
                    )));
                }
                self.adapter.on_frame_start(obu.data)?;
                *has_frame = true;
                if t.carries_tile_data() {
                    self.adapter.on_slice_data(obu.payload)?;
                }
                Ok(())
            }
            other => {
                log::trace!("skipping {:?} OBU ({} bytes)", other, obu.data.len());
                Ok(())
            }
        }
    }

    /// Stream parameters of the active sequence header.
    pub fn codec_data(&self) -> Option<Av1CodecData> {
        let record = self.adapter.configuration_record()?.clone();
        let (width, height) = self.parser.dimensions()?;
        Some(Av1CodecData {
            record,
            width,
            height,
        })
    }

    pub fn parser(&self) -> &Av1Parser {
        &self.parser
    }

    pub fn adapter(&self) -> &FrameSessionAdapter<S> {
        &self.adapter
    }

    pub fn adapter_mut(&mut self) -> &mut FrameSessionAdapter<S> {
        &mut self.adapter
    }

    /// Closes the session, unless already closed, and hands it back.
    pub fn into_session(self) -> S {
        self.adapter.close()
    }
}

#[async_trait]
impl<S> VideoDecoder for Av1HwDecoder<S>
where
    S: HwDecodeSession + Send,
    S::Picture: Send,
{
    type Frame = S::Picture;

    async fn decode(&mut self, data: Bytes) -> Result<Option<S::Picture>> {
        self.decode_temporal_unit(&data)
    }

    fn close(&mut self) {
        self.adapter.shutdown();
    }
}
