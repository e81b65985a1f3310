use bytes::Bytes;

use crate::codec::av1::SequenceHeader;
use crate::utils::BitWriter;

/// First byte of every record: marker bit set, version 1.
pub const AV1C_MARKER_VERSION: u8 = 0x81;

/// Fixed header bytes preceding the sequence header OBU.
pub const AV1C_HEADER_LEN: usize = 4;

/// AV1 codec configuration record (`av1C`), the extradata a hardware AV1 decoder is
/// initialized from.
///
/// Layout:
///
/// | byte | bits |
/// |------|------|
/// | 0 | `marker(1) version(7)` = `0x81` |
/// | 1 | `seq_profile(3) seq_level_idx_0(5)` |
/// | 2 | `seq_tier_0(1) high_bitdepth(1) twelve_bit(1) monochrome(1) chroma_subsampling_x(1) chroma_subsampling_y(1) chroma_sample_position(2)` |
/// | 3 | `reserved(3)=0 initial_presentation_delay_present(1) initial_presentation_delay_minus_one(4)` |
/// | 4.. | sequence header OBU bytes |
///
/// The record owns a copy of the payload; the caller's buffer may be reused as soon as
/// [`build`](Self::build) returns.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ConfigurationRecord {
    data: Bytes,
}

impl ConfigurationRecord {
    /// Packs `seq` and `payload` into a record of `4 + payload.len()` bytes.
    ///
    /// Pure and infallible: identical inputs always give identical bytes. An empty
    /// payload yields the bare 4-byte header.
    ///
    /// ```
    /// use av1hw::codec::av1::SequenceHeader;
    /// use av1hw::hwaccel::ConfigurationRecord;
    ///
    /// let mut seq = SequenceHeader::default();
    /// seq.seq_profile = 1;
    /// seq.operating_points[0].seq_level_idx = 5;
    ///
    /// let record = ConfigurationRecord::build(&seq, &[0x0A, 0x00]);
    /// assert_eq!(record.as_bytes(), &[0x81, 0x25, 0x0C, 0x00, 0x0A, 0x00]);
    /// ```
    pub fn build(seq: &SequenceHeader, payload: &[u8]) -> Self {
        let op = seq.operating_point();
        let cc = &seq.color_config;
        let mut writer = BitWriter::with_capacity(AV1C_HEADER_LEN + payload.len());

        writer.write_bits(AV1C_MARKER_VERSION as u32, 8);

        writer.write_bits(seq.seq_profile as u32, 3);
        writer.write_bits(op.seq_level_idx as u32, 5);

        writer.write_bits(op.seq_tier as u32, 1);
        writer.write_bit(cc.high_bitdepth);
        writer.write_bit(cc.twelve_bit);
        writer.write_bit(cc.mono_chrome);
        writer.write_bit(cc.subsampling_x);
        writer.write_bit(cc.subsampling_y);
        writer.write_bits(cc.chroma_sample_position as u32, 2);

        writer.write_bits(0, 3);
        if seq.initial_display_delay_present_flag {
            writer.write_bit(true);
            writer.write_bits(op.initial_display_delay_minus_1 as u32, 4);
        } else {
            writer.write_bits(0, 5);
        }

        writer.write_bytes(payload);

        Self {
            data: writer.finish().freeze(),
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// The four fixed header bytes.
    pub fn header(&self) -> [u8; AV1C_HEADER_LEN] {
        let mut header = [0u8; AV1C_HEADER_LEN];
        header.copy_from_slice(&self.data[..AV1C_HEADER_LEN]);
        header
    }

    /// The copied sequence header OBU bytes.
    pub fn payload(&self) -> &[u8] {
        &self.data[AV1C_HEADER_LEN..]
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Always false; a record holds at least its header.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn into_bytes(self) -> Bytes {
        self.data
    }
}

impl AsRef<[u8]> for ConfigurationRecord {
    fn as_ref(&self) -> &[u8] {
        &self.data
    }
}
