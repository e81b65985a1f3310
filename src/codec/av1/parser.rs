use parking_lot::Mutex;
use std::sync::Arc;

use super::obu::Obu;
use super::types::{
    ChromaSamplePosition, ColorConfig, DecoderModelInfo, ObuType, OperatingPoint,
    SequenceHeader, TimingInfo, CP_BT_709, CP_UNSPECIFIED, MC_IDENTITY, MC_UNSPECIFIED,
    SELECT_INTEGER_MV, SELECT_SCREEN_CONTENT_TOOLS, TC_SRGB, TC_UNSPECIFIED,
};
use crate::utils::BitReader;
use crate::{Av1HwError, Result};

#[derive(Debug, Default)]
struct ParserState {
    sequence_header: Option<SequenceHeader>,
}

/// Sequence header parser. Frame headers and tile data are left to the hardware.
#[derive(Debug, Clone, Default)]
pub struct Av1Parser {
    state: Arc<Mutex<ParserState>>,
}

impl Av1Parser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses `obu` if it is a sequence header and remembers the result.
    ///
    /// Returns the freshly parsed header, or `None` for every other OBU type.
    pub fn parse_obu(&self, obu: &Obu<'_>) -> Result<Option<SequenceHeader>> {
        if obu.obu_type() != ObuType::SequenceHeader {
            return Ok(None);
        }

        let seq = self.parse_sequence_header(obu.payload)?;
        self.state.lock().sequence_header = Some(seq.clone());
        Ok(Some(seq))
    }

    /// Parses a `sequence_header_obu()` payload (the bytes after the OBU header and size).
    pub fn parse_sequence_header(&self, payload: &[u8]) -> Result<SequenceHeader> {
        let mut reader = BitReader::new(payload);
        let mut seq = SequenceHeader {
            operating_points: Vec::new(),
            ..SequenceHeader::default()
        };

        seq.seq_profile = reader.read_bits(3)? as u8;
        if seq.seq_profile > 2 {
            return Err(Av1HwError::Parser(format!(
                "Unsupported seq_profile {}",
                seq.seq_profile
            )));
        }
        seq.still_picture = reader.read_flag()?;
        seq.reduced_still_picture_header = reader.read_flag()?;

        if seq.reduced_still_picture_header {
            seq.operating_points.push(OperatingPoint {
                seq_level_idx: reader.read_bits(5)? as u8,
                ..OperatingPoint::default()
            });
        } else {
            if reader.read_flag()? {
                seq.timing_info = Some(self.parse_timing_info(&mut reader)?);
                if reader.read_flag()? {
                    seq.decoder_model_info = Some(self.parse_decoder_model_info(&mut reader)?);
                }
            }

            seq.initial_display_delay_present_flag = reader.read_flag()?;
            let operating_points_cnt = reader.read_bits(5)? + 1;
            for _ in 0..operating_points_cnt {
                let op = self.parse_operating_point(&mut reader, &seq)?;
                seq.operating_points.push(op);
            }
        }
        log::trace!(
            "seq_profile: {}, operating points: {}",
            seq.seq_profile,
            seq.operating_points.len()
        );

        seq.frame_width_bits_minus_1 = reader.read_bits(4)? as u8;
        seq.frame_height_bits_minus_1 = reader.read_bits(4)? as u8;
        seq.max_frame_width_minus_1 = reader.read_bits(seq.frame_width_bits_minus_1 as u32 + 1)?;
        seq.max_frame_height_minus_1 =
            reader.read_bits(seq.frame_height_bits_minus_1 as u32 + 1)?;

        if !seq.reduced_still_picture_header {
            seq.frame_id_numbers_present_flag = reader.read_flag()?;
        }
        if seq.frame_id_numbers_present_flag {
            reader.skip_bits(4)?; // delta_frame_id_length_minus_2
            reader.skip_bits(3)?; // additional_frame_id_length_minus_1
        }

        seq.use_128x128_superblock = reader.read_flag()?;
        seq.enable_filter_intra = reader.read_flag()?;
        seq.enable_intra_edge_filter = reader.read_flag()?;

        if seq.reduced_still_picture_header {
            seq.seq_force_screen_content_tools = SELECT_SCREEN_CONTENT_TOOLS;
            seq.seq_force_integer_mv = SELECT_INTEGER_MV;
        } else {
            seq.enable_interintra_compound = reader.read_flag()?;
            seq.enable_masked_compound = reader.read_flag()?;
            seq.enable_warped_motion = reader.read_flag()?;
            seq.enable_dual_filter = reader.read_flag()?;
            seq.enable_order_hint = reader.read_flag()?;
            if seq.enable_order_hint {
                seq.enable_jnt_comp = reader.read_flag()?;
                seq.enable_ref_frame_mvs = reader.read_flag()?;
            }

            // seq_choose_screen_content_tools
            seq.seq_force_screen_content_tools = if reader.read_flag()? {
                SELECT_SCREEN_CONTENT_TOOLS
            } else {
                reader.read_bits(1)? as u8
            };

            seq.seq_force_integer_mv = if seq.seq_force_screen_content_tools > 0 {
                // seq_choose_integer_mv
                if reader.read_flag()? {
                    SELECT_INTEGER_MV
                } else {
                    reader.read_bits(1)? as u8
                }
            } else {
                SELECT_INTEGER_MV
            };

            if seq.enable_order_hint {
                seq.order_hint_bits_minus_1 = reader.read_bits(3)? as u8;
            }
        }

        seq.enable_superres = reader.read_flag()?;
        seq.enable_cdef = reader.read_flag()?;
        seq.enable_restoration = reader.read_flag()?;
        seq.color_config = self.parse_color_config(&mut reader, seq.seq_profile)?;
        seq.film_grain_params_present = reader.read_flag()?;

        log::debug!(
            "sequence header: profile {} level {} tier {} {}x{} {}-bit",
            seq.seq_profile,
            seq.seq_level_idx(),
            seq.seq_tier(),
            seq.max_frame_width(),
            seq.max_frame_height(),
            seq.color_config.bit_depth()
        );

        Ok(seq)
    }

    fn parse_timing_info(&self, reader: &mut BitReader) -> Result<TimingInfo> {
        let num_units_in_display_tick = reader.read_bits(32)?;
        let time_scale = reader.read_bits(32)?;
        let equal_picture_interval = reader.read_flag()?;
        let num_ticks_per_picture_minus_1 = if equal_picture_interval {
            reader.read_uvlc()?
        } else {
            0
        };

        Ok(TimingInfo {
            num_units_in_display_tick,
            time_scale,
            equal_picture_interval,
            num_ticks_per_picture_minus_1,
        })
    }

    fn parse_decoder_model_info(&self, reader: &mut BitReader) -> Result<DecoderModelInfo> {
        Ok(DecoderModelInfo {
            buffer_delay_length_minus_1: reader.read_bits(5)? as u8,
            num_units_in_decoding_tick: reader.read_bits(32)?,
            buffer_removal_time_length_minus_1: reader.read_bits(5)? as u8,
            frame_presentation_time_length_minus_1: reader.read_bits(5)? as u8,
        })
    }

    fn parse_operating_point(
        &self,
        reader: &mut BitReader,
        seq: &SequenceHeader,
    ) -> Result<OperatingPoint> {
        let mut op = OperatingPoint {
            idc: reader.read_bits(12)? as u16,
            seq_level_idx: reader.read_bits(5)? as u8,
            ..OperatingPoint::default()
        };

        if op.seq_level_idx > 7 {
            op.seq_tier = reader.read_bits(1)? as u8;
        }

        if let Some(model) = seq.decoder_model_info {
            op.decoder_model_present = reader.read_flag()?;
            if op.decoder_model_present {
                // operating_parameters_info(): decoder/encoder buffer delay, low_delay_mode_flag
                let n = model.buffer_delay_length_minus_1 as u32 + 1;
                reader.skip_bits(n)?;
                reader.skip_bits(n)?;
                reader.skip_bits(1)?;
            }
        }

        if seq.initial_display_delay_present_flag {
            op.initial_display_delay_present = reader.read_flag()?;
            if op.initial_display_delay_present {
                op.initial_display_delay_minus_1 = reader.read_bits(4)? as u8;
            }
        }

        Ok(op)
    }

    fn parse_color_config(&self, reader: &mut BitReader, seq_profile: u8) -> Result<ColorConfig> {
        let mut cc = ColorConfig {
            high_bitdepth: reader.read_flag()?,
            ..ColorConfig::default()
        };

        if seq_profile == 2 && cc.high_bitdepth {
            cc.twelve_bit = reader.read_flag()?;
        }
        let bit_depth = cc.bit_depth();

        cc.mono_chrome = if seq_profile == 1 {
            false
        } else {
            reader.read_flag()?
        };

        cc.color_description_present_flag = reader.read_flag()?;
        if cc.color_description_present_flag {
            cc.color_primaries = reader.read_bits(8)? as u8;
            cc.transfer_characteristics = reader.read_bits(8)? as u8;
            cc.matrix_coefficients = reader.read_bits(8)? as u8;
        } else {
            cc.color_primaries = CP_UNSPECIFIED;
            cc.transfer_characteristics = TC_UNSPECIFIED;
            cc.matrix_coefficients = MC_UNSPECIFIED;
        }

        if cc.mono_chrome {
            cc.color_range = reader.read_flag()?;
            cc.subsampling_x = true;
            cc.subsampling_y = true;
            cc.chroma_sample_position = ChromaSamplePosition::Unknown;
            cc.separate_uv_delta_q = false;
            return Ok(cc);
        }

        if cc.color_primaries == CP_BT_709
            && cc.transfer_characteristics == TC_SRGB
            && cc.matrix_coefficients == MC_IDENTITY
        {
            cc.color_range = true;
            cc.subsampling_x = false;
            cc.subsampling_y = false;
        } else {
            cc.color_range = reader.read_flag()?;
            match seq_profile {
                0 => {
                    cc.subsampling_x = true;
                    cc.subsampling_y = true;
                }
                1 => {
                    cc.subsampling_x = false;
                    cc.subsampling_y = false;
                }
                _ => {
                    if bit_depth == 12 {
                        cc.subsampling_x = reader.read_flag()?;
                        cc.subsampling_y = if cc.subsampling_x {
                            reader.read_flag()?
                        } else {
                            false
                        };
                    } else {
                        cc.subsampling_x = true;
                        cc.subsampling_y = false;
                    }
                }
            }
            if cc.subsampling_x && cc.subsampling_y {
                cc.chroma_sample_position = ChromaSamplePosition::from(reader.read_bits(2)? as u8);
            }
        }

        cc.separate_uv_delta_q = reader.read_flag()?;
        Ok(cc)
    }

    /// The last sequence header seen by [`parse_obu`](Self::parse_obu).
    pub fn sequence_header(&self) -> Option<SequenceHeader> {
        self.state.lock().sequence_header.clone()
    }

    /// Maximum coded frame size announced by the last sequence header.
    pub fn dimensions(&self) -> Option<(u32, u32)> {
        let state = self.state.lock();
        state
            .sequence_header
            .as_ref()
            .map(|seq| (seq.max_frame_width(), seq.max_frame_height()))
    }
}
