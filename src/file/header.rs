use crate::constants::{HEADER_CHUNK_ID, HEADER_CHUNK_SIZE};
use crate::error::LibResult;
use crate::file::schemas::{check_chunk_id, CHUNK_SIZE, DIVISION, FORMAT, TRACK_COUNT};
use crate::file::Division;
use crate::schema::Record;
use crate::Error;
use std::convert::TryFrom;

/// The contents of the `MThd` chunk.
#[derive(Clone, Copy, Debug, Default, Eq, Ord, PartialEq, PartialOrd, Hash)]
pub struct Header {
    format: Format,
    track_count: u16,
    division: Division,
}

impl Header {
    pub fn new(format: Format, track_count: u16, division: Division) -> Self {
        Self {
            format,
            track_count,
            division,
        }
    }

    pub fn format(&self) -> Format {
        self.format
    }

    /// The number of track chunks the file claims to hold.
    pub fn track_count(&self) -> u16 {
        self.track_count
    }

    pub fn division(&self) -> Division {
        self.division
    }

    /// Checks a decoded header record. The chunk id is checked first, then the size, the format
    /// and the time division.
    pub(crate) fn from_record(record: &Record) -> LibResult<Self> {
        check_chunk_id(record, HEADER_CHUNK_ID)?;
        let size = record.int(CHUNK_SIZE)?;
        if size != HEADER_CHUNK_SIZE {
            invalid_file!("header chunk size is {}, expected {}", size, HEADER_CHUNK_SIZE);
        }
        Ok(Self {
            format: Format::from_u16(record.int(FORMAT)? as u16)?,
            track_count: record.int(TRACK_COUNT)? as u16,
            division: Division::from_u16(record.int(DIVISION)? as u16)?,
        })
    }
}

#[repr(u16)]
#[derive(Clone, Copy, Debug, Eq, Ord, PartialEq, PartialOrd, Hash, Default)]
pub enum Format {
    /// 0 the file contains a single multi-channel track
    #[default]
    Single = 0,
    /// 1 the file contains one or more simultaneous tracks (or MIDI outputs) of a sequence
    Multi = 1,
    /// 2 the file contains one or more sequentially independent single-track patterns
    Sequential = 2,
}

impl Format {
    pub(crate) fn from_u16(value: u16) -> LibResult<Self> {
        match value {
            0 => Ok(Format::Single),
            1 => Ok(Format::Multi),
            2 => Ok(Format::Sequential),
            _ => invalid_file!("unknown file format {}", value),
        }
    }
}

impl TryFrom<u16> for Format {
    type Error = Error;

    fn try_from(value: u16) -> crate::Result<Self> {
        Ok(Self::from_u16(value)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::file::MidiSchemas;
    use crate::stream::{ByteOrder, ByteReader};
    use crate::ErrorKind;
    use std::io::Cursor;

    fn header(bytes: &[u8]) -> crate::Result<Header> {
        let schemas = MidiSchemas::new()?;
        let mut r = ByteReader::new(Cursor::new(bytes.to_vec()), ByteOrder::Big);
        let record = Record::read(schemas.header(), &mut r)?;
        Ok(Header::from_record(&record)?)
    }

    #[test]
    fn valid_header() {
        let h = header(b"MThd\0\0\0\x06\0\x01\0\x02\0\x60").unwrap();
        assert_eq!(Format::Multi, h.format());
        assert_eq!(2, h.track_count());
        assert_eq!(96, h.division().ticks_per_quarter().get());
    }

    #[test]
    fn rejections() {
        let bad_id = header(b"MThX\0\0\0\x06\0\0\0\x01\0\x60").err().unwrap();
        assert_eq!(ErrorKind::BadChunkId, bad_id.kind());
        let bad_size = header(b"MThd\0\0\0\x07\0\0\0\x01\0\x60").err().unwrap();
        assert_eq!(ErrorKind::InvalidFile, bad_size.kind());
        let bad_format = header(b"MThd\0\0\0\x06\0\x03\0\x01\0\x60").err().unwrap();
        assert_eq!(ErrorKind::InvalidFile, bad_format.kind());
        let smpte = header(b"MThd\0\0\0\x06\0\0\0\x01\x80\x01").err().unwrap();
        assert_eq!(ErrorKind::UnsupportedTimeDivision, smpte.kind());
        let short = header(b"MThd\0\0\0\x06\0\0").err().unwrap();
        assert_eq!(ErrorKind::EndOfStream, short.kind());
    }
}
