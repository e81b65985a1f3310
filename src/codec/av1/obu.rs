use super::types::{ObuHeader, ObuType};
use crate::{Av1HwError, Result};

/// Longest `leb128()` the AV1 syntax allows.
pub const MAX_LEB128_BYTES: usize = 8;

/// One OBU borrowed out of a temporal unit.
#[derive(Debug, Clone, Copy)]
pub struct Obu<'a> {
    pub header: ObuHeader,
    /// The whole OBU: header, size field and payload.
    pub data: &'a [u8],
    pub payload: &'a [u8],
}

impl<'a> Obu<'a> {
    pub fn obu_type(&self) -> ObuType {
        self.header.obu_type
    }
}

/// Decodes a `leb128()` value, returning it with the number of bytes consumed.
pub fn read_leb128(data: &[u8]) -> Result<(u64, usize)> {
    let mut value = 0u64;

    for (i, &byte) in data.iter().take(MAX_LEB128_BYTES).enumerate() {
        value |= ((byte & 0x7F) as u64) << (i * 7);
        if byte & 0x80 == 0 {
            return Ok((value, i + 1));
        }
    }

    if data.len() < MAX_LEB128_BYTES {
        Err(Av1HwError::Parser("Truncated leb128 value".into()))
    } else {
        Err(Av1HwError::Parser("leb128 value longer than 8 bytes".into()))
    }
}

/// Parses the one or two byte OBU header at the start of `data`.
pub fn parse_obu_header(data: &[u8]) -> Result<ObuHeader> {
    let first = *data
        .first()
        .ok_or_else(|| Av1HwError::Parser("Empty OBU".into()))?;

    if first & 0x80 != 0 {
        return Err(Av1HwError::Parser("OBU forbidden bit is set".into()));
    }

    let has_extension = first & 0x04 != 0;
    let (temporal_id, spatial_id) = if has_extension {
        let ext = *data
            .get(1)
            .ok_or_else(|| Av1HwError::Parser("OBU extension byte missing".into()))?;
        ((ext >> 5) & 0x07, (ext >> 3) & 0x03)
    } else {
        (0, 0)
    };

    Ok(ObuHeader {
        obu_type: ObuType::from((first >> 3) & 0x0F),
        has_extension,
        has_size_field: first & 0x02 != 0,
        temporal_id,
        spatial_id,
    })
}

/// Parses the OBU at the start of `data`. An OBU without a size field runs to the end
/// of the input.
pub fn parse_obu(data: &[u8]) -> Result<Obu<'_>> {
    let header = parse_obu_header(data)?;
    let mut offset = header.header_len();

    let payload_len = if header.has_size_field {
        let (size, consumed) = read_leb128(&data[offset..])?;
        offset += consumed;
        usize::try_from(size)
            .map_err(|_| Av1HwError::Parser(format!("OBU size {} too large", size)))?
    } else {
        data.len() - offset
    };

    let end = offset
        .checked_add(payload_len)
        .filter(|&end| end <= data.len())
        .ok_or_else(|| {
            Av1HwError::Parser(format!(
                "OBU payload of {} bytes exceeds the {} remaining",
                payload_len,
                data.len() - offset
            ))
        })?;

    Ok(Obu {
        header,
        data: &data[..end],
        payload: &data[offset..end],
    })
}

/// Splits a low-overhead bitstream (a temporal unit) into its OBUs, in order.
pub fn split_obus(data: &[u8]) -> Result<Vec<Obu<'_>>> {
    let mut obus = Vec::new();
    let mut offset = 0;

    while offset < data.len() {
        let obu = parse_obu(&data[offset..])?;
        offset += obu.data.len();
        obus.push(obu);
    }

    Ok(obus)
}
