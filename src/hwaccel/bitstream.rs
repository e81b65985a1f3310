use crate::config::{Config, DEFAULT_MAX_BITSTREAM_SIZE};
use crate::{Av1HwError, Result};

/// Growable byte buffer collecting one frame's coded data.
///
/// Capacity survives [`reset`](Self::reset), so after the first few frames a stream
/// accumulates without allocating. Growth is bounded by `max_size`; anything beyond it
/// is reported as [`Av1HwError::OutOfMemory`].
#[derive(Debug)]
pub struct BitstreamBuffer {
    data: Vec<u8>,
    max_size: usize,
}

impl Default for BitstreamBuffer {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_BITSTREAM_SIZE)
    }
}

impl BitstreamBuffer {
    /// Creates an empty buffer that never grows past `max_size` bytes.
    pub fn new(max_size: usize) -> Self {
        Self {
            data: Vec::new(),
            max_size,
        }
    }

    /// Creates a buffer sized per `config`, reserving its initial capacity up front.
    pub fn from_config(config: &Config) -> Result<Self> {
        let mut buffer = Self::new(config.max_bitstream_size);
        if config.initial_bitstream_capacity > 0 {
            buffer.ensure_capacity(config.initial_bitstream_capacity)?;
        }
        Ok(buffer)
    }

    /// Makes room for at least `required` bytes in total.
    ///
    /// Over-allocates by `required / 16 + 32` bytes (never past `max_size`) so a stream
    /// of slowly growing frames does not reallocate every time. On failure nothing
    /// changes.
    pub fn ensure_capacity(&mut self, required: usize) -> Result<()> {
        if required <= self.data.capacity() {
            return Ok(());
        }
        if required > self.max_size {
            return Err(Av1HwError::OutOfMemory {
                requested: required,
            });
        }

        let target = required
            .saturating_add(required / 16)
            .saturating_add(32)
            .min(self.max_size);

        self.data
            .try_reserve_exact(target - self.data.len())
            .map_err(|e| {
                log::debug!("bitstream growth to {} bytes refused: {}", target, e);
                Av1HwError::OutOfMemory { requested: target }
            })
    }

    /// Appends `bytes` after the data already held.
    ///
    /// Either every byte is appended or, on error, the buffer is left exactly as it was.
    pub fn append(&mut self, bytes: &[u8]) -> Result<()> {
        let required = self
            .data
            .len()
            .checked_add(bytes.len())
            .ok_or(Av1HwError::OutOfMemory {
                requested: usize::MAX,
            })?;

        self.ensure_capacity(required)?;
        self.data.extend_from_slice(bytes);
        log::trace!("appended {} bytes, {} buffered", bytes.len(), self.data.len());
        Ok(())
    }

    /// The bytes accumulated since the last reset.
    pub fn snapshot(&self) -> &[u8] {
        &self.data
    }

    /// Empties the buffer, keeping its allocation.
    pub fn reset(&mut self) {
        self.data.clear();
    }

    /// Drops everything past the first `len` bytes, keeping the allocation. A `len` at or
    /// beyond the current length is a no-op.
    pub fn truncate(&mut self, len: usize) {
        self.data.truncate(len);
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.data.capacity()
    }

    pub fn max_size(&self) -> usize {
        self.max_size
    }
}
