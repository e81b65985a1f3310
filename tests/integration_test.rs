#[cfg(test)]
mod tests {
    use bytes::Bytes;
    use parking_lot::Mutex;
    use pretty_assertions::assert_eq;
    use std::sync::Arc;

    use av1hw::av::{CodecData, CodecType, VideoDecoder};
    use av1hw::codec::av1::Av1HwDecoder;
    use av1hw::config::Config;
    use av1hw::error::{Av1HwError, Result};
    use av1hw::hwaccel::{FrameState, FrameSubmission, HwDecodeSession};
    use av1hw::utils::BitWriter;

    const OBU_SEQUENCE_HEADER: u8 = 1;
    const OBU_TEMPORAL_DELIMITER: u8 = 2;
    const OBU_FRAME_HEADER: u8 = 3;
    const OBU_TILE_GROUP: u8 = 4;
    const OBU_METADATA: u8 = 5;
    const OBU_FRAME: u8 = 6;

    #[derive(Debug, Clone, PartialEq)]
    struct Submitted {
        bitstream: Vec<u8>,
        configuration: Option<Vec<u8>>,
    }

    /// Stands in for the platform session; records everything it is handed.
    #[derive(Clone, Default)]
    struct MockSession {
        submitted: Arc<Mutex<Vec<Submitted>>>,
        fail_next: Arc<Mutex<bool>>,
        closes: Arc<Mutex<usize>>,
    }

    impl HwDecodeSession for MockSession {
        type Picture = u64;

        fn submit(&mut self, frame: FrameSubmission<'_>) -> Result<u64> {
            let mut submitted = self.submitted.lock();
            submitted.push(Submitted {
                bitstream: frame.bitstream.to_vec(),
                configuration: frame.configuration.map(|r| r.as_bytes().to_vec()),
            });

            let mut fail = self.fail_next.lock();
            if *fail {
                *fail = false;
                return Err(Av1HwError::Session("VTDecompressionSessionDecodeFrame failed".into()));
            }
            Ok(submitted.len() as u64)
        }

        fn close(&mut self) {
            *self.closes.lock() += 1;
        }
    }

    fn obu(obu_type: u8, payload: &[u8]) -> Vec<u8> {
        assert!(payload.len() < 128);
        let mut data = vec![(obu_type << 3) | 0x02, payload.len() as u8];
        data.extend_from_slice(payload);
        data
    }

    /// 640x480 8-bit 4:2:0 sequence header at the given level.
    fn sequence_header_obu(level: u8) -> Vec<u8> {
        let mut w = BitWriter::new();
        w.write_bits(0, 3); // seq_profile
        w.write_bit(false); // still_picture
        w.write_bit(false); // reduced_still_picture_header
        w.write_bit(false); // timing_info_present_flag
        w.write_bit(false); // initial_display_delay_present_flag
        w.write_bits(0, 5); // operating_points_cnt_minus_1
        w.write_bits(0, 12); // operating_point_idc[0]
        w.write_bits(level as u32, 5);
        if level > 7 {
            w.write_bit(false); // seq_tier[0]
        }
        w.write_bits(9, 4);
        w.write_bits(9, 4);
        w.write_bits(639, 10);
        w.write_bits(479, 10);
        w.write_bit(false); // frame_id_numbers_present_flag
        w.write_bits(0, 3); // superblock, filter intra, intra edge
        w.write_bits(0, 5); // interintra .. enable_order_hint
        w.write_bit(true); // seq_choose_screen_content_tools
        w.write_bit(true); // seq_choose_integer_mv
        w.write_bits(0, 3); // superres, cdef, restoration
        w.write_bit(false); // high_bitdepth
        w.write_bit(false); // mono_chrome
        w.write_bit(false); // color_description_present_flag
        w.write_bit(false); // color_range
        w.write_bits(0, 2); // chroma_sample_position
        w.write_bit(false); // separate_uv_delta_q
        w.write_bit(false); // film_grain_params_present
        obu(OBU_SEQUENCE_HEADER, &w.finish())
    }

    fn temporal_unit(obus: &[&Vec<u8>]) -> Vec<u8> {
        let mut data = obu(OBU_TEMPORAL_DELIMITER, &[]);
        for o in obus {
            data.extend_from_slice(o);
        }
        data
    }

    fn decoder() -> (Av1HwDecoder<MockSession>, MockSession) {
        let session = MockSession::default();
        let decoder = Av1HwDecoder::with_config(session.clone(), &Config::default()).unwrap();
        (decoder, session)
    }

    #[test]
    fn test_keyframe_then_inter_frame() {
        let (mut decoder, session) = decoder();
        let seq = sequence_header_obu(4);
        let key = obu(OBU_FRAME, &[0x10, 0x20, 0x30]);
        let inter = obu(OBU_FRAME, &[0x40, 0x50]);

        let picture = decoder
            .decode_temporal_unit(&temporal_unit(&[&seq, &key]))
            .unwrap();
        assert_eq!(picture, Some(1));
        decoder
            .decode_temporal_unit(&temporal_unit(&[&inter]))
            .unwrap();

        let submitted = session.submitted.lock();
        assert_eq!(submitted.len(), 2);

        let mut expected = seq.clone();
        expected.extend_from_slice(&key);
        assert_eq!(submitted[0].bitstream, expected);

        let record = submitted[0].configuration.clone().unwrap();
        assert_eq!(&record[..4], &[0x81, 0x04, 0x0C, 0x00]);
        assert_eq!(&record[4..], &seq[..]);

        assert_eq!(submitted[1].bitstream, inter);
        assert_eq!(submitted[1].configuration, None);
        assert_eq!(decoder.adapter().state(), FrameState::Idle);
    }

    #[test]
    fn test_frame_header_and_tile_groups_form_one_buffer() {
        let (mut decoder, session) = decoder();
        let seq = sequence_header_obu(4);
        let header = obu(OBU_FRAME_HEADER, &[0xAA]);
        let tiles_a = obu(OBU_TILE_GROUP, &[0x01, 0x02]);
        let metadata = obu(OBU_METADATA, &[0x04, 0x00]);
        let tiles_b = obu(OBU_TILE_GROUP, &[0x03]);

        decoder
            .decode_temporal_unit(&temporal_unit(&[&seq, &header, &tiles_a, &metadata, &tiles_b]))
            .unwrap();

        let expected: Vec<u8> = [&seq[..], &header[..], &tiles_a[..], &tiles_b[..]].concat();
        assert_eq!(session.submitted.lock()[0].bitstream, expected);
    }

    #[test]
    fn test_sequence_header_only_unit_carries_into_next_frame() {
        let (mut decoder, session) = decoder();
        let seq = sequence_header_obu(4);
        let frame = obu(OBU_FRAME, &[0x77]);

        assert_eq!(decoder.decode_temporal_unit(&temporal_unit(&[&seq])).unwrap(), None);
        assert_eq!(decoder.adapter().state(), FrameState::Accumulating);
        assert!(session.submitted.lock().is_empty());

        decoder.decode_temporal_unit(&temporal_unit(&[&frame])).unwrap();
        let expected: Vec<u8> = [&seq[..], &frame[..]].concat();
        assert_eq!(session.submitted.lock()[0].bitstream, expected);
    }

    #[test]
    fn test_frame_before_sequence_header_is_rejected() {
        let (mut decoder, session) = decoder();
        let frame = obu(OBU_FRAME, &[0x01]);

        let err = decoder
            .decode_temporal_unit(&temporal_unit(&[&frame]))
            .unwrap_err();
        assert!(matches!(err, Av1HwError::Codec(_)));
        assert!(session.submitted.lock().is_empty());
        assert!(decoder.adapter().bitstream().is_empty());
    }

    #[test]
    fn test_sequence_header_change_reconfigures() {
        let (mut decoder, session) = decoder();
        let frame = obu(OBU_FRAME, &[0x01]);
        let level4 = sequence_header_obu(4);
        let level9 = sequence_header_obu(9);

        for seq in [&level4, &level4, &level9] {
            decoder
                .decode_temporal_unit(&temporal_unit(&[seq, &frame]))
                .unwrap();
        }

        let submitted = session.submitted.lock();
        let levels: Vec<Option<u8>> = submitted
            .iter()
            .map(|s| s.configuration.as_ref().map(|r| r[1] & 0x1F))
            .collect();
        assert_eq!(levels, vec![Some(4), None, Some(9)]);
    }

    #[test]
    fn test_session_failure_does_not_leak_into_next_frame() {
        let (mut decoder, session) = decoder();
        let seq = sequence_header_obu(4);
        *session.fail_next.lock() = true;

        let err = decoder
            .decode_temporal_unit(&temporal_unit(&[&seq, &obu(OBU_FRAME, &[0x01])]))
            .unwrap_err();
        assert!(matches!(err, Av1HwError::Session(_)));

        let next = obu(OBU_FRAME, &[0x02]);
        decoder.decode_temporal_unit(&temporal_unit(&[&next])).unwrap();

        let submitted = session.submitted.lock();
        assert_eq!(submitted[1].bitstream, next);
        // The failed submission never confirmed the configuration, so it is sent again
        assert!(submitted[1].configuration.is_some());
    }

    #[test]
    fn test_oversized_frame_is_abandoned() {
        let session = MockSession::default();
        let config = Config {
            initial_bitstream_capacity: 64,
            max_bitstream_size: 64,
        };
        let mut decoder = Av1HwDecoder::with_config(session.clone(), &config).unwrap();
        let seq = sequence_header_obu(4);

        let err = decoder
            .decode_temporal_unit(&temporal_unit(&[&seq, &obu(OBU_FRAME, &[0u8; 100])]))
            .unwrap_err();
        assert!(matches!(err, Av1HwError::OutOfMemory { .. }));
        assert!(session.submitted.lock().is_empty());
        assert!(decoder.adapter().bitstream().is_empty());

        let small = obu(OBU_FRAME, &[0x05]);
        decoder.decode_temporal_unit(&temporal_unit(&[&small])).unwrap();
        assert_eq!(session.submitted.lock()[0].bitstream, small);
    }

    #[test]
    fn test_malformed_unit_is_rejected_without_side_effects() {
        let (mut decoder, session) = decoder();
        let mut data = temporal_unit(&[&sequence_header_obu(4)]);
        data.extend_from_slice(&[0x32, 0x10, 0x01]); // frame OBU claiming 16 bytes

        assert!(matches!(
            decoder.decode_temporal_unit(&data),
            Err(Av1HwError::Parser(_))
        ));
        assert!(decoder.adapter().bitstream().is_empty());
        assert!(decoder.adapter().configuration_record().is_none());
        assert!(session.submitted.lock().is_empty());
    }

    #[test]
    fn test_failed_unit_keeps_carried_sequence_header() {
        let seq = sequence_header_obu(4);
        let frame = obu(OBU_FRAME, &[0x42]);

        // seq_profile 7 fails inside the parser, after a frame OBU was already buffered
        let bad_header = temporal_unit(&[
            &obu(OBU_FRAME, &[0x01]),
            &obu(OBU_SEQUENCE_HEADER, &[0xE0, 0x00]),
        ]);
        // frame OBU claiming 16 bytes fails while splitting
        let mut truncated = temporal_unit(&[]);
        truncated.extend_from_slice(&[0x32, 0x10, 0x01]);

        for failing in [bad_header, truncated] {
            let (mut decoder, session) = decoder();
            decoder.decode_temporal_unit(&temporal_unit(&[&seq])).unwrap();
            let carried = decoder.adapter().bitstream().len();
            assert_eq!(carried, seq.len());

            assert!(matches!(
                decoder.decode_temporal_unit(&failing),
                Err(Av1HwError::Parser(_))
            ));
            assert_eq!(decoder.adapter().bitstream().snapshot(), &seq[..]);
            assert_eq!(decoder.adapter().state(), FrameState::Accumulating);

            decoder.decode_temporal_unit(&temporal_unit(&[&frame])).unwrap();
            let submitted = session.submitted.lock();
            assert_eq!(submitted.len(), 1);
            assert_eq!(submitted[0].bitstream, [&seq[..], &frame[..]].concat());
            assert!(submitted[0].configuration.is_some());
        }
    }

    #[test]
    fn test_decode_after_close_is_rejected() {
        let (mut decoder, session) = decoder();
        let seq = sequence_header_obu(4);
        decoder
            .decode_temporal_unit(&temporal_unit(&[&seq, &obu(OBU_FRAME, &[0x01])]))
            .unwrap();

        VideoDecoder::close(&mut decoder);
        VideoDecoder::close(&mut decoder);
        assert_eq!(*session.closes.lock(), 1);

        let err = decoder
            .decode_temporal_unit(&temporal_unit(&[&obu(OBU_FRAME, &[0x02])]))
            .unwrap_err();
        assert!(matches!(err, Av1HwError::SessionClosed));

        let returned = decoder.into_session();
        assert_eq!(*returned.closes.lock(), 1);
        assert_eq!(session.submitted.lock().len(), 1);
    }

    #[test]
    fn test_codec_data() {
        let (mut decoder, _session) = decoder();
        assert!(decoder.codec_data().is_none());

        let seq = sequence_header_obu(5);
        decoder
            .decode_temporal_unit(&temporal_unit(&[&seq, &obu(OBU_FRAME, &[0x01])]))
            .unwrap();

        let codec = decoder.codec_data().unwrap();
        assert_eq!(codec.codec_type(), CodecType::AV1);
        assert_eq!((codec.width(), codec.height()), (Some(640), Some(480)));
        let extra = codec.extra_data().unwrap();
        assert_eq!(&extra[..2], &[0x81, 0x05]);
        assert_eq!(&extra[4..], &seq[..]);
    }

    #[tokio::test]
    async fn test_async_decode() {
        let (mut decoder, session) = decoder();
        let unit = Bytes::from(temporal_unit(&[
            &sequence_header_obu(4),
            &obu(OBU_FRAME, &[0x01, 0x02]),
        ]));

        let picture = decoder.decode(unit).await.unwrap();
        assert_eq!(picture, Some(1));

        let empty = Bytes::from(temporal_unit(&[]));
        assert_eq!(decoder.decode(empty).await.unwrap(), None);

        VideoDecoder::close(&mut decoder);
        assert_eq!(session.submitted.lock().len(), 1);
    }

    #[test]
    fn test_decode_with_block_on() {
        let (mut decoder, _session) = decoder();
        let unit = Bytes::from(temporal_unit(&[
            &sequence_header_obu(4),
            &obu(OBU_FRAME, &[0x09]),
        ]));

        let picture = tokio_test::block_on(decoder.decode(unit)).unwrap();
        assert_eq!(picture, Some(1));

        let session = decoder.into_session();
        assert_eq!(session.submitted.lock().len(), 1);
    }
}
