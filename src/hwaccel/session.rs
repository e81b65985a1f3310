use super::bitstream::BitstreamBuffer;
use super::record::ConfigurationRecord;
use crate::codec::av1::SequenceHeader;
use crate::config::{self, Config};
use crate::{Av1HwError, Result};

/// One frame handed to the hardware decode session.
#[derive(Debug, Clone, Copy)]
pub struct FrameSubmission<'a> {
    /// Every byte accumulated for the frame, sequence header first.
    pub bitstream: &'a [u8],
    /// Present when the session must be (re)configured before decoding this frame.
    pub configuration: Option<&'a ConfigurationRecord>,
}

/// The platform decode session frames are submitted to.
pub trait HwDecodeSession {
    /// Whatever the session produces for a decoded frame.
    type Picture;

    /// Decodes one frame, reconfiguring first when `frame.configuration` is set.
    ///
    /// Errors are returned to the decode driver untouched; sessions normally report them
    /// as [`Av1HwError::Session`].
    fn submit(&mut self, frame: FrameSubmission<'_>) -> Result<Self::Picture>;

    /// Releases platform resources. The adapter calls it at most once.
    fn close(&mut self) {}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameState {
    /// Buffer empty, no frame in flight.
    Idle,
    /// At least one append landed for the current frame.
    Accumulating,
}

/// Binds the configuration record and the bitstream buffer to the per-frame callbacks
/// of a decode driver.
///
/// Callbacks arrive in the order `on_parameters`, `on_frame_start`, `on_slice_data`,
/// `on_frame_end`. Whatever happens, `on_frame_end` leaves the buffer empty so one
/// accumulation cycle always maps to exactly one frame.
pub struct FrameSessionAdapter<S: HwDecodeSession> {
    session: S,
    bitstream: BitstreamBuffer,
    record: Option<ConfigurationRecord>,
    reconfig_pending: bool,
    state: FrameState,
    abandoned: bool,
    closed: bool,
    frames_submitted: u64,
}

impl<S: HwDecodeSession> FrameSessionAdapter<S> {
    /// Creates an adapter sized by the process-wide [`Config`].
    pub fn new(session: S) -> Result<Self> {
        Self::with_config(session, &config::current())
    }

    pub fn with_config(session: S, config: &Config) -> Result<Self> {
        Ok(Self {
            session,
            bitstream: BitstreamBuffer::from_config(config)?,
            record: None,
            reconfig_pending: false,
            state: FrameState::Idle,
            abandoned: false,
            closed: false,
            frames_submitted: 0,
        })
    }

    /// Rebuilds the configuration record from a sequence header.
    ///
    /// Returns `true` when the record differs from the active one, in which case the
    /// next submitted frame carries it so the session reconfigures.
    pub fn update_sequence_header(&mut self, seq: &SequenceHeader, payload: &[u8]) -> bool {
        let record = ConfigurationRecord::build(seq, payload);
        if self.record.as_ref() == Some(&record) {
            return false;
        }

        log::debug!(
            "configuration record changed: {:02x?}, reconfiguration pending",
            record.header()
        );
        self.record = Some(record);
        self.reconfig_pending = true;
        true
    }

    /// Installs a record built elsewhere; the next frame reconfigures the session.
    pub fn set_configuration_record(&mut self, record: ConfigurationRecord) {
        self.record = Some(record);
        self.reconfig_pending = true;
    }

    /// Parameter data (sequence header OBUs) that must precede the frame payload.
    pub fn on_parameters(&mut self, header: &[u8]) -> Result<()> {
        self.accumulate(header)
    }

    /// Frame data; may be called several times for one frame.
    pub fn on_frame_start(&mut self, frame: &[u8]) -> Result<()> {
        self.accumulate(frame)
    }

    /// Accepted and ignored: the hardware decodes whole frames from the accumulated
    /// buffer, so tile data already arrived through [`on_frame_start`](Self::on_frame_start).
    pub fn on_slice_data(&mut self, _data: &[u8]) -> Result<()> {
        Ok(())
    }

    /// Hands the accumulated frame to the session and resets for the next one.
    pub fn on_frame_end(&mut self) -> Result<S::Picture> {
        let result = self.submit_current();
        self.bitstream.reset();
        self.abandoned = false;
        self.state = FrameState::Idle;
        result
    }

    /// Drops the in-flight frame without submitting it.
    pub fn abort_frame(&mut self) {
        if self.state == FrameState::Accumulating {
            log::debug!("dropping {} buffered bytes", self.bitstream.len());
        }
        self.bitstream.reset();
        self.abandoned = false;
        self.state = FrameState::Idle;
    }

    /// Drops everything buffered after the first `len` bytes, keeping what earlier
    /// callbacks carried over. Clears the abandoned mark.
    pub fn rollback_to(&mut self, len: usize) {
        self.bitstream.truncate(len);
        self.abandoned = false;
        self.state = if self.bitstream.is_empty() {
            FrameState::Idle
        } else {
            FrameState::Accumulating
        };
    }

    /// Drops the in-flight frame and closes the session. Later calls do nothing, and
    /// `on_parameters`, `on_frame_start` and `on_frame_end` fail with
    /// [`Av1HwError::SessionClosed`].
    pub fn shutdown(&mut self) {
        if self.closed {
            return;
        }
        self.abort_frame();
        self.session.close();
        self.closed = true;
        log::debug!("decode session closed after {} frames", self.frames_submitted);
    }

    /// Tears the adapter down, closing the session if still open and handing it back.
    pub fn close(mut self) -> S {
        self.shutdown();
        self.session
    }

    fn accumulate(&mut self, bytes: &[u8]) -> Result<()> {
        if self.closed {
            return Err(Av1HwError::SessionClosed);
        }
        match self.bitstream.append(bytes) {
            Ok(()) => {
                self.state = FrameState::Accumulating;
                Ok(())
            }
            Err(e) => {
                log::warn!("abandoning frame: {}", e);
                self.abandoned = true;
                self.state = FrameState::Accumulating;
                Err(e)
            }
        }
    }

    fn submit_current(&mut self) -> Result<S::Picture> {
        if self.closed {
            return Err(Av1HwError::SessionClosed);
        }
        if self.abandoned {
            return Err(Av1HwError::FrameAbandoned);
        }
        if self.bitstream.is_empty() {
            return Err(Av1HwError::Codec("no bitstream data for frame".into()));
        }

        let configuration = if self.reconfig_pending {
            self.record.as_ref()
        } else {
            None
        };
        log::debug!(
            "submitting frame #{}: {} bytes{}",
            self.frames_submitted,
            self.bitstream.len(),
            if configuration.is_some() {
                " with reconfiguration"
            } else {
                ""
            }
        );

        let picture = self.session.submit(FrameSubmission {
            bitstream: self.bitstream.snapshot(),
            configuration,
        })?;

        if configuration.is_some() {
            self.reconfig_pending = false;
        }
        self.frames_submitted += 1;
        Ok(picture)
    }

    pub fn state(&self) -> FrameState {
        self.state
    }

    pub fn bitstream(&self) -> &BitstreamBuffer {
        &self.bitstream
    }

    pub fn configuration_record(&self) -> Option<&ConfigurationRecord> {
        self.record.as_ref()
    }

    pub fn reconfiguration_pending(&self) -> bool {
        self.reconfig_pending
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Frames the session accepted so far.
    pub fn frames_submitted(&self) -> u64 {
        self.frames_submitted
    }

    pub fn session(&self) -> &S {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut S {
        &mut self.session
    }
}
