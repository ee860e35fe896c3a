/*!
The `stream` module reads and writes primitive values over any `Read` or `Write`. The byte order
is chosen when a [`ByteReader`] or [`ByteWriter`] is created and cannot be changed afterwards, so
a single session never mixes byte orders.
!*/

mod reader;
mod writer;

pub use reader::ByteReader;
pub use writer::ByteWriter;

use crate::core::vlq::VlqError;
use crate::error::ErrorKind;
use snafu::Snafu;
use std::path::PathBuf;

/// The order in which the bytes of multi-byte primitives appear in a stream.
#[derive(Clone, Copy, Debug, Eq, Ord, PartialEq, PartialOrd, Hash, Default)]
pub enum ByteOrder {
    /// Most significant byte first. MIDI files are big-endian.
    #[default]
    Big,
    /// Least significant byte first.
    Little,
}

/// The fixed-width integer layouts that can be read from or written to a stream.
#[derive(Clone, Copy, Debug, Eq, Ord, PartialEq, PartialOrd, Hash)]
pub enum Primitive {
    U8,
    I8,
    U16,
    I16,
    /// An unsigned 24-bit integer, as used by the tempo meta event.
    U24,
    U32,
    I32,
}

impl Primitive {
    /// The number of bytes this primitive occupies in a stream.
    pub const fn size(&self) -> usize {
        match self {
            Primitive::U8 | Primitive::I8 => 1,
            Primitive::U16 | Primitive::I16 => 2,
            Primitive::U24 => 3,
            Primitive::U32 | Primitive::I32 => 4,
        }
    }

    pub const fn name(&self) -> &'static str {
        match self {
            Primitive::U8 => "u8",
            Primitive::I8 => "i8",
            Primitive::U16 => "u16",
            Primitive::I16 => "i16",
            Primitive::U24 => "u24",
            Primitive::U32 => "u32",
            Primitive::I32 => "i32",
        }
    }

    /// The inclusive range of values this primitive can hold.
    pub const fn range(&self) -> (i64, i64) {
        match self {
            Primitive::U8 => (0, u8::MAX as i64),
            Primitive::I8 => (i8::MIN as i64, i8::MAX as i64),
            Primitive::U16 => (0, u16::MAX as i64),
            Primitive::I16 => (i16::MIN as i64, i16::MAX as i64),
            Primitive::U24 => (0, 0x00FF_FFFF),
            Primitive::U32 => (0, u32::MAX as i64),
            Primitive::I32 => (i32::MIN as i64, i32::MAX as i64),
        }
    }

    /// Interpret exactly `self.size()` bytes.
    pub(crate) fn from_bytes(&self, bytes: &[u8], order: ByteOrder) -> i64 {
        debug_assert_eq!(self.size(), bytes.len());
        let raw = match order {
            ByteOrder::Big => bytes.iter().fold(0u64, |acc, b| (acc << 8) | u64::from(*b)),
            ByteOrder::Little => bytes
                .iter()
                .rev()
                .fold(0u64, |acc, b| (acc << 8) | u64::from(*b)),
        };
        // sign extend
        match self {
            Primitive::I8 => i64::from(raw as u8 as i8),
            Primitive::I16 => i64::from(raw as u16 as i16),
            Primitive::I32 => i64::from(raw as u32 as i32),
            _ => raw as i64,
        }
    }

    pub(crate) fn to_bytes(&self, value: i64, order: ByteOrder) -> ByteResult<Vec<u8>> {
        let (min, max) = self.range();
        snafu::ensure!(
            value >= min && value <= max,
            RangeSnafu {
                value,
                width: self.name()
            }
        );
        let raw = value as u64;
        let size = self.size();
        let mut bytes: Vec<u8> = (0..size)
            .rev()
            .map(|i| (raw >> (8 * i)) as u8)
            .collect();
        if order == ByteOrder::Little {
            bytes.reverse();
        }
        Ok(bytes)
    }
}

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub(crate) enum ByteError {
    #[snafu(display("io error around byte {}: {}", position, source))]
    Io {
        position: u64,
        source: std::io::Error,
    },

    #[snafu(display("unexpected end reached around byte {}", position))]
    End { position: u64 },

    #[snafu(display("too many bytes while reading vlq around {}", position))]
    VlqTooBig { position: u64 },

    #[snafu(display("problem decoding vlq around {}: {}", position, source))]
    VlqDecode { position: u64, source: VlqError },

    #[snafu(display("problem encoding vlq around {}: {}", position, source))]
    VlqEncode { position: u64, source: VlqError },

    #[snafu(display("value {} does not fit in {}", value, width))]
    Range { value: i64, width: &'static str },

    #[snafu(display("unable to open '{}': {}", path.display(), source))]
    FileOpen {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl ByteError {
    pub(crate) fn kind(&self) -> ErrorKind {
        match self {
            ByteError::Io { .. } | ByteError::FileOpen { .. } => ErrorKind::Io,
            ByteError::End { .. } => ErrorKind::EndOfStream,
            ByteError::VlqTooBig { .. } | ByteError::VlqDecode { .. } => ErrorKind::InvalidFile,
            ByteError::VlqEncode { .. } | ByteError::Range { .. } => ErrorKind::OutOfRange,
        }
    }
}

pub(crate) type ByteResult<T> = std::result::Result<T, ByteError>;
