use anyhow::{bail, Result};
use byteorder::{LittleEndian, ReadBytesExt};

/// Largest value representable in an unsigned 3-byte field.
pub const MAX_SCALE: u32 = 0xFF_FFFF;

const FIXED_MIN: i64 = -(1 << 23);
const FIXED_MAX: i64 = (1 << 23) - 1;

/// Append `value` as a base-128 varint, least-significant group
/// first, continuation flag in the high bit.
pub fn write_varint(out: &mut Vec<u8>, mut value: u64) {
    while value >= 0x80 {
        out.push((value as u8 & 0x7F) | 0x80);
        value >>= 7;
    }
    out.push(value as u8);
}

/// Decode a varint starting at `*offset`, advancing the offset past
/// the encoded bytes. Running out of input mid-value is an error.
pub fn read_varint(data: &[u8], offset: &mut usize) -> Result<u64> {
    let mut value = 0u64;
    let mut shift = 0u32;
    loop {
        let Some(&byte) = data.get(*offset) else {
            bail!("truncated varint at offset {}", *offset);
        };
        *offset += 1;
        value |= u64::from(byte & 0x7F) << shift;
        if byte & 0x80 == 0 {
            return Ok(value);
        }
        shift += 7;
        if shift >= 64 {
            bail!("varint wider than 64 bits at offset {}", *offset);
        }
    }
}

/// Check that `scale` fits the 3-byte header field.
pub fn check_scale(scale: u32) -> Result<()> {
    if scale > MAX_SCALE {
        bail!("scale {scale} must fit in 3 bytes");
    }
    Ok(())
}

/// Scale a coordinate in degrees to a fixed-point integer, rounding
/// half away from zero. Fails when the result does not fit in 24
/// signed bits (roughly |deg| * scale > 8.3M).
pub fn encode_coordinate(degrees: f64, scale: u32) -> Result<i32> {
    let scaled = (degrees * f64::from(scale)).round();
    if !scaled.is_finite() {
        bail!("coordinate value {degrees} is not finite at scale {scale}");
    }
    let fixed = scaled as i64;
    if !(FIXED_MIN..=FIXED_MAX).contains(&fixed) {
        bail!("coordinate value {degrees} does not fit in 24 bits at scale {scale}");
    }
    Ok(fixed as i32)
}

/// Inverse of the 3-byte coordinate field: read a little-endian
/// two's-complement 24-bit integer at `*offset`.
pub fn read_i24(data: &[u8], offset: &mut usize) -> Result<i32> {
    let Some(mut bytes) = data.get(*offset..*offset + 3) else {
        bail!("truncated 24-bit field at offset {}", *offset);
    };
    let value = bytes.read_i24::<LittleEndian>()?;
    *offset += 3;
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use byteorder::WriteBytesExt;

    fn varint(value: u64) -> Vec<u8> {
        let mut out = Vec::new();
        write_varint(&mut out, value);
        out
    }

    #[test]
    fn varint_known_encodings() {
        assert_eq!(varint(0), vec![0x00]);
        assert_eq!(varint(1), vec![0x01]);
        assert_eq!(varint(127), vec![0x7F]);
        assert_eq!(varint(128), vec![0x80, 0x01]);
        assert_eq!(varint(300), vec![0xAC, 0x02]);
        assert_eq!(varint(16_384), vec![0x80, 0x80, 0x01]);
    }

    #[test]
    fn varint_round_trip() {
        for value in [0u64, 1, 42, 127, 128, 255, 300, 10_000, u64::from(u32::MAX), u64::MAX] {
            let encoded = varint(value);
            let mut offset = 0;
            assert_eq!(read_varint(&encoded, &mut offset).unwrap(), value);
            assert_eq!(offset, encoded.len());
        }
    }

    #[test]
    fn varint_decode_rejects_empty_input() {
        let mut offset = 0;
        assert!(read_varint(&[], &mut offset).is_err());
    }

    #[test]
    fn varint_decode_rejects_dangling_continuation() {
        let mut offset = 0;
        assert!(read_varint(&[0x80], &mut offset).is_err());
    }

    #[test]
    fn coordinate_fixed_point_rounds_half_away_from_zero() {
        assert_eq!(encode_coordinate(1.0, 10_000).unwrap(), 10_000);
        assert_eq!(encode_coordinate(-1.0, 10_000).unwrap(), -10_000);
        assert_eq!(encode_coordinate(0.00005, 10_000).unwrap(), 1);
        assert_eq!(encode_coordinate(-0.00005, 10_000).unwrap(), -1);
    }

    #[test]
    fn coordinate_extremes_encode_at_default_scale() {
        assert_eq!(encode_coordinate(180.0, 10_000).unwrap(), 1_800_000);
        assert_eq!(encode_coordinate(-180.0, 10_000).unwrap(), -1_800_000);
        assert_eq!(encode_coordinate(90.0, 10_000).unwrap(), 900_000);
        assert_eq!(encode_coordinate(-90.0, 10_000).unwrap(), -900_000);
    }

    #[test]
    fn coordinate_overflow_is_rejected() {
        assert!(encode_coordinate(840.0, 10_000).is_err());
        assert!(encode_coordinate(-840.0, 10_000).is_err());
        assert!(encode_coordinate(f64::NAN, 10_000).is_err());
        assert!(encode_coordinate(f64::INFINITY, 10_000).is_err());
    }

    #[test]
    fn scale_must_fit_three_bytes() {
        assert!(check_scale(0).is_ok());
        assert!(check_scale(10_000).is_ok());
        assert!(check_scale(MAX_SCALE).is_ok());
        assert!(check_scale(MAX_SCALE + 1).is_err());
    }

    #[test]
    fn i24_round_trip() {
        for value in [0i32, 1, -1, 10_000, -10_000, 1_800_000, -1_800_000, (1 << 23) - 1, -(1 << 23)] {
            let mut out = Vec::new();
            out.write_i24::<LittleEndian>(value).unwrap();
            assert_eq!(out.len(), 3);
            let mut offset = 0;
            assert_eq!(read_i24(&out, &mut offset).unwrap(), value);
            assert_eq!(offset, 3);
        }
    }
}
