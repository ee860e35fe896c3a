//! Variable-length quantities: MIDI's base-128 integer encoding. Each byte carries seven bits of
//! the value, most significant group first, and every byte except the last has its high bit set.

use std::error::Error;
use std::fmt::{Debug, Display, Formatter};

/// 0x7f, 127: The largest 7 bit number.
const MAX_7BIT: u8 = 0b0111_1111;

/// 0x80, 128: The highest bit is set, this bit indicates that another byte follows.
pub(crate) const CONTINUE: u8 = 0b1000_0000;

/// The largest number of bytes a MIDI file may use for one quantity.
pub const MAX_BYTES: usize = 4;

/// The largest value that fits in [`MAX_BYTES`] bytes, `0x0FFF_FFFF`.
pub const MAX_VALUE: u32 = 0x0FFF_FFFF;

/// A decoded quantity together with the number of bytes that encoded it.
#[derive(Clone, Copy, Debug, Default, Eq, Ord, PartialEq, PartialOrd, Hash)]
pub struct VariableLength {
    value: u32,
    byte_len: usize,
}

impl VariableLength {
    pub(crate) fn new(value: u32, byte_len: usize) -> Self {
        Self { value, byte_len }
    }

    /// The quantity as it would be written, with its minimal encoded length.
    pub fn encoded(value: u32) -> Result<Self, VlqError> {
        Ok(Self::new(value, encode(value)?.len()))
    }

    pub fn value(&self) -> u32 {
        self.value
    }

    /// How many bytes the value occupied in the stream.
    pub fn byte_len(&self) -> usize {
        self.byte_len
    }
}

impl From<VariableLength> for u32 {
    fn from(v: VariableLength) -> u32 {
        v.value
    }
}

#[derive(Debug, PartialEq)]
pub enum VlqError {
    /// The bytes ended while the continue bit was still set.
    IncompleteNumber,
    /// The value needs more than [`MAX_BYTES`] bytes.
    Overflow,
}

impl Display for VlqError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        Debug::fmt(self, f)
    }
}

impl Error for VlqError {}

/// Encode `value`, most significant group first. Zero encodes as a single zero byte.
pub fn encode(mut value: u32) -> Result<Vec<u8>, VlqError> {
    if value > MAX_VALUE {
        return Err(VlqError::Overflow);
    }
    if value == 0 {
        return Ok(vec![0]);
    }

    let mut result = Vec::with_capacity(MAX_BYTES);
    while value > 0 {
        // get the value of the right-most seven bits
        let mut v = (value & MAX_7BIT as u32) as u8;
        // the first group pushed becomes the last byte after reversing, it keeps a clear high bit
        if !result.is_empty() {
            v |= CONTINUE;
        }
        result.push(v);
        value >>= 7;
    }
    result.reverse();
    Ok(result)
}

/// Encode `value` in exactly `width` bytes by putting empty continuation groups (`0x80`) in front
/// of its shortest encoding. A `width` shorter than the shortest encoding is ignored.
pub fn encode_padded(value: u32, width: usize) -> Result<Vec<u8>, VlqError> {
    let minimal = encode(value)?;
    if width > MAX_BYTES {
        return Err(VlqError::Overflow);
    }
    let mut result = vec![CONTINUE; width.saturating_sub(minimal.len())];
    result.extend(minimal);
    Ok(result)
}

/// Decode the quantity at the start of `bytes`. Bytes after the first byte with a clear high bit
/// are ignored, [`VariableLength::byte_len`] tells how many were used.
pub fn decode(bytes: &[u8]) -> Result<VariableLength, VlqError> {
    let mut result: u32 = 0;
    for (i, b) in bytes.iter().enumerate() {
        if i == MAX_BYTES {
            return Err(VlqError::Overflow);
        }
        result = (result << 7) | u32::from(b & MAX_7BIT);
        if b & CONTINUE == 0 {
            return Ok(VariableLength::new(result, i + 1));
        }
    }
    Err(VlqError::IncompleteNumber)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test(vlq_bytes: &[u8], value: u32) {
        let encoded = encode(value).unwrap();
        assert_eq!(vlq_bytes, encoded.as_slice());
        let decoded = decode(&encoded).unwrap();
        assert_eq!(value, decoded.value());
        assert_eq!(vlq_bytes.len(), decoded.byte_len());
    }

    #[test]
    fn one_byte() {
        test(&[0x00], 0x00);
        test(&[0x40], 0x40);
        test(&[0x7f], 0x7f);
    }

    #[test]
    fn two_bytes() {
        test(&[0x81, 0x00], 0x80);
        test(&[0xc0, 0x00], 0x2000);
        test(&[0xff, 0x7f], 0x3fff);
    }

    #[test]
    fn three_bytes() {
        test(&[0x81, 0x80, 0x00], 0x4000);
        test(&[0xc0, 0x80, 0x00], 0x10_0000);
        test(&[0xff, 0xff, 0x7f], 0x1f_ffff);
    }

    #[test]
    fn four_bytes() {
        test(&[0x81, 0x80, 0x80, 0x00], 0x20_0000);
        test(&[0xc0, 0x80, 0x80, 0x00], 0x0800_0000);
        test(&[0xff, 0xff, 0xff, 0x7f], 0x0fff_ffff);
    }

    #[test]
    fn round_trip_across_range() {
        let samples = (0..=MAX_VALUE)
            .step_by(4093)
            .chain([127, 128, 16_383, 16_384, 2_097_151, 2_097_152, MAX_VALUE]);
        for n in samples {
            let encoded = encode(n).unwrap();
            let (last, rest) = encoded.split_last().unwrap();
            assert_eq!(0, last & CONTINUE, "last byte of {} has the continue bit", n);
            assert!(rest.iter().all(|b| b & CONTINUE == CONTINUE));
            if n > 127 {
                assert!(encoded.len() > 1);
            }
            assert_eq!(n, decode(&encoded).unwrap().value());
        }
    }

    #[test]
    fn decode_stops_at_first_clear_high_bit() {
        let v = decode(&[0x81, 0x00, 0x7f]).unwrap();
        assert_eq!(0x80, v.value());
        assert_eq!(2, v.byte_len());
    }

    #[test]
    fn encoded_length() {
        assert_eq!(1, VariableLength::encoded(0x7F).unwrap().byte_len());
        assert_eq!(2, VariableLength::encoded(0x80).unwrap().byte_len());
        assert_eq!(4, VariableLength::encoded(MAX_VALUE).unwrap().byte_len());
        assert!(VariableLength::encoded(MAX_VALUE + 1).is_err());
    }

    #[test]
    fn padded() {
        assert_eq!(vec![0x80, 0x00], encode_padded(0, 2).unwrap());
        assert_eq!(vec![0x80, 0x81, 0x00], encode_padded(0x80, 3).unwrap());
        assert_eq!(vec![0x81, 0x00], encode_padded(0x80, 1).unwrap());
        assert_eq!(Err(VlqError::Overflow), encode_padded(0, 5));
        let v = decode(&encode_padded(0x60, 4).unwrap()).unwrap();
        assert_eq!(0x60, v.value());
        assert_eq!(4, v.byte_len());
    }

    #[test]
    fn incomplete() {
        assert_eq!(Err(VlqError::IncompleteNumber), decode(&[0xff]));
        assert_eq!(Err(VlqError::IncompleteNumber), decode(&[0x80]));
        assert_eq!(Err(VlqError::IncompleteNumber), decode(&[]));
    }

    #[test]
    fn overflow() {
        assert_eq!(
            Err(VlqError::Overflow),
            decode(&[0xff, 0xff, 0xff, 0xff, 0x7f])
        );
        assert_eq!(Err(VlqError::Overflow), encode(MAX_VALUE + 1));
    }
}
