use bytes::{BufMut, BytesMut};

use crate::error::{Av1HwError, Result};

/// A bit-level reader for parsing binary data streams.
///
/// Reads MSB-first, the order AV1 uses for every `f(n)` syntax element:
/// - Reading individual bits and flags
/// - Reading multiple bits as numbers
/// - Reading variable length unsigned codes (`uvlc()`)
///
/// Example:
/// ```
/// use av1hw::utils::BitReader;
///
/// let data = [0b10110011];
/// let mut reader = BitReader::new(&data);
///
/// assert_eq!(reader.read_bit().unwrap(), true);   // 1
/// assert_eq!(reader.read_bits(3).unwrap(), 0b011); // 011
/// ```
pub struct BitReader<'a> {
    data: &'a [u8],
    byte_offset: usize,
    bit_offset: u8,
}

impl<'a> BitReader<'a> {
    /// Creates a new BitReader from a byte slice
    pub fn new(data: &'a [u8]) -> Self {
        BitReader {
            data,
            byte_offset: 0,
            bit_offset: 0,
        }
    }

    /// Reads a single bit from the stream.
    /// Returns true for 1, false for 0.
    ///
    /// Returns error if end of data is reached.
    pub fn read_bit(&mut self) -> Result<bool> {
        if self.byte_offset >= self.data.len() {
            return Err(Av1HwError::Parser("Reached end of data".into()));
        }

        let bit = (self.data[self.byte_offset] >> (7 - self.bit_offset)) & 1;
        self.bit_offset += 1;

        if self.bit_offset == 8 {
            self.bit_offset = 0;
            self.byte_offset += 1;
        }

        Ok(bit == 1)
    }

    /// Same as [`read_bit`](Self::read_bit); reads a one-bit syntax flag.
    pub fn read_flag(&mut self) -> Result<bool> {
        self.read_bit()
    }

    /// Reads n bits and returns them as a number.
    /// The bits are interpreted as big-endian.
    ///
    /// Returns error if n > 32 or end of data is reached.
    pub fn read_bits(&mut self, n: u32) -> Result<u32> {
        if n > 32 {
            return Err(Av1HwError::Parser("Too many bits requested".into()));
        }
        if (n as usize) > self.available_bits() {
            return Err(Av1HwError::Parser("Reached end of data".into()));
        }

        let mut value = 0u64;
        for _ in 0..n {
            value = (value << 1) | self.read_bit()? as u64;
        }

        Ok(value as u32)
    }

    /// Reads a variable length unsigned code, `uvlc()` in the AV1 syntax.
    ///
    /// Format:
    /// 1. `leadingZeros` zero bits terminated by a one
    /// 2. `leadingZeros` more value bits
    /// 3. Value = value bits + 2^leadingZeros - 1
    ///
    /// 32 or more leading zeros decode to `u32::MAX`.
    pub fn read_uvlc(&mut self) -> Result<u32> {
        let mut leading_zeros = 0u32;
        while !self.read_bit()? {
            leading_zeros += 1;
        }

        if leading_zeros >= 32 {
            return Ok(u32::MAX);
        }

        let value = self.read_bits(leading_zeros)? as u64;
        Ok((value + (1u64 << leading_zeros) - 1) as u32)
    }

    /// Skips n bits in the stream.
    pub fn skip_bits(&mut self, n: u32) -> Result<()> {
        if (n as usize) > self.available_bits() {
            return Err(Av1HwError::Parser("Reached end of data".into()));
        }
        let position = self.bit_position() + n as usize;
        self.byte_offset = position / 8;
        self.bit_offset = (position % 8) as u8;
        Ok(())
    }

    /// Aligns reader to next byte boundary by skipping remaining bits in current byte.
    pub fn align_byte(&mut self) {
        if self.bit_offset != 0 {
            self.bit_offset = 0;
            self.byte_offset += 1;
        }
    }

    /// Number of bits consumed so far.
    pub fn bit_position(&self) -> usize {
        self.byte_offset * 8 + self.bit_offset as usize
    }

    /// Returns number of bits available to read.
    pub fn available_bits(&self) -> usize {
        (self.data.len() * 8).saturating_sub(self.bit_position())
    }
}

/// MSB-first bit writer, the counterpart of [`BitReader`].
///
/// Values are masked to the requested width, so a field can never spill into its
/// neighbours.
///
/// ```
/// use av1hw::utils::BitWriter;
///
/// let mut writer = BitWriter::new();
/// writer.write_bits(0b101, 3);
/// writer.write_bits(0b10011, 5);
/// assert_eq!(&writer.finish()[..], &[0b10110011]);
/// ```
#[derive(Debug, Default)]
pub struct BitWriter {
    buf: BytesMut,
    current: u8,
    bits_in_current: u8,
}

impl BitWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a writer whose buffer already holds room for `bytes` bytes.
    pub fn with_capacity(bytes: usize) -> Self {
        Self {
            buf: BytesMut::with_capacity(bytes),
            ..Self::default()
        }
    }

    pub fn write_bit(&mut self, bit: bool) {
        self.current = (self.current << 1) | bit as u8;
        self.bits_in_current += 1;
        if self.bits_in_current == 8 {
            self.buf.put_u8(self.current);
            self.current = 0;
            self.bits_in_current = 0;
        }
    }

    /// Writes the low `n` bits of `value`, most significant first. `n` is clamped to 32.
    pub fn write_bits(&mut self, value: u32, n: u32) {
        let n = n.min(32);
        for i in (0..n).rev() {
            self.write_bit((value >> i) & 1 == 1);
        }
    }

    /// Writes `value` as `uvlc()`.
    pub fn write_uvlc(&mut self, value: u32) {
        let value = value as u64 + 1;
        let bits = 64 - value.leading_zeros();
        let leading_zeros = bits - 1;
        for _ in 0..leading_zeros {
            self.write_bit(false);
        }
        self.write_bit(true);
        let rest = value - (1u64 << leading_zeros);
        for i in (0..leading_zeros).rev() {
            self.write_bit((rest >> i) & 1 == 1);
        }
    }

    /// Appends whole bytes, bit-shifted when the writer is not byte aligned.
    pub fn write_bytes(&mut self, data: &[u8]) {
        if self.is_aligned() {
            self.buf.put_slice(data);
        } else {
            for &byte in data {
                self.write_bits(byte as u32, 8);
            }
        }
    }

    pub fn is_aligned(&self) -> bool {
        self.bits_in_current == 0
    }

    /// Total bits written so far.
    pub fn bit_len(&self) -> usize {
        self.buf.len() * 8 + self.bits_in_current as usize
    }

    /// Pads with zero bits up to the next byte boundary and returns the buffer.
    pub fn finish(mut self) -> BytesMut {
        if self.bits_in_current > 0 {
            let pad = 8 - self.bits_in_current;
            self.buf.put_u8(self.current << pad);
        }
        self.buf
    }
}
