use crate::core::vlq::{self, VariableLength, CONTINUE, MAX_BYTES};
use crate::stream::{
    ByteOrder, ByteResult, EndSnafu, FileOpenSnafu, IoSnafu, Primitive, VlqDecodeSnafu,
    VlqTooBigSnafu,
};
use log::trace;
use snafu::{ensure, ResultExt};
use std::fs::File;
use std::io::{BufReader, ErrorKind, Read};
use std::path::Path;

/// Reads primitives from a `Read` in a byte order that is fixed for the life of the reader. Keeps
/// count of how many bytes have been consumed.
pub struct ByteReader<R: Read> {
    inner: R,
    order: ByteOrder,
    position: u64,
}

impl ByteReader<BufReader<File>> {
    /// Open a file for big-endian reading.
    pub fn open<P: AsRef<Path>>(path: P) -> crate::Result<Self> {
        Ok(Self::open_inner(path.as_ref()).context(io!())?)
    }

    fn open_inner(path: &Path) -> ByteResult<Self> {
        let f = File::open(path).context(FileOpenSnafu { path })?;
        let buf = BufReader::new(f);
        Ok(Self::new(buf, ByteOrder::Big))
    }
}

impl<R: Read> ByteReader<R> {
    pub fn new(inner: R, order: ByteOrder) -> Self {
        Self {
            inner,
            order,
            position: 0,
        }
    }

    pub fn order(&self) -> ByteOrder {
        self.order
    }

    /// The number of bytes consumed so far.
    pub fn position(&self) -> u64 {
        self.position
    }

    pub fn into_inner(self) -> R {
        self.inner
    }

    /// Read exactly `num_bytes` bytes, or fail with an end-of-stream error.
    pub fn read_n(&mut self, num_bytes: usize) -> crate::Result<Vec<u8>> {
        Ok(self.read_n_inner(num_bytes).context(io!())?)
    }

    /// Read one fixed-width integer in this reader's byte order.
    pub fn read_primitive(&mut self, primitive: Primitive) -> crate::Result<i64> {
        Ok(self.read_primitive_inner(primitive).context(io!())?)
    }

    /// Read a variable-length quantity, keeping the number of bytes it occupied. Padded encodings
    /// such as `80 00` are accepted.
    pub fn read_vlq(&mut self) -> crate::Result<VariableLength> {
        Ok(self.read_vlq_inner().context(io!())?)
    }

    fn read_n_inner(&mut self, num_bytes: usize) -> ByteResult<Vec<u8>> {
        let mut bytes = vec![0u8; num_bytes];
        let position = self.position;
        match self.inner.read_exact(&mut bytes) {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::UnexpectedEof => {
                return EndSnafu { position }.fail();
            }
            Err(e) => return Err(e).context(IoSnafu { position }),
        }
        self.position += num_bytes as u64;
        trace!("read {:02x?} at position {}", bytes, position);
        Ok(bytes)
    }

    fn read_or_die(&mut self) -> ByteResult<u8> {
        let bytes = self.read_n_inner(1)?;
        Ok(bytes[0])
    }

    fn read_primitive_inner(&mut self, primitive: Primitive) -> ByteResult<i64> {
        let bytes = self.read_n_inner(primitive.size())?;
        Ok(primitive.from_bytes(&bytes, self.order))
    }

    fn read_vlq_bytes(&mut self) -> ByteResult<Vec<u8>> {
        let mut retval = Vec::new();
        // initialize with the continue bit set
        let mut current_byte = CONTINUE;
        while current_byte & CONTINUE == CONTINUE {
            ensure!(
                retval.len() < MAX_BYTES,
                VlqTooBigSnafu {
                    position: self.position
                }
            );
            current_byte = self.read_or_die()?;
            retval.push(current_byte);
        }
        Ok(retval)
    }

    fn read_vlq_inner(&mut self) -> ByteResult<VariableLength> {
        let bytes = self.read_vlq_bytes()?;
        let decoded = vlq::decode(&bytes).context(VlqDecodeSnafu {
            position: self.position,
        })?;
        trace!(
            "decoded vlq value {} from {} bytes",
            decoded.value(),
            decoded.byte_len()
        );
        Ok(decoded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind as Kind;
    use std::io::Cursor;

    #[test]
    fn byte_reader_test() {
        let bytes = [0x00u8, 0x01, 0x02, 0x03, 0x04, 0x10, 0x20, 0x30, 0x40];
        let mut r = ByteReader::new(Cursor::new(bytes), ByteOrder::Big);
        assert_eq!(0x00, r.read_or_die().unwrap());
        assert_eq!(0x0102, r.read_primitive(Primitive::U16).unwrap());
        assert_eq!(3, r.position());
        assert_eq!(vec![0x03, 0x04], r.read_n(2).unwrap());
        assert_eq!(0x1020_3040, r.read_primitive(Primitive::U32).unwrap());
        assert_eq!(9, r.position());
        let e = r.read_or_die().err().unwrap();
        assert_eq!(Kind::EndOfStream, e.kind());
    }

    #[test]
    fn little_endian_session() {
        let bytes = [0x01u8, 0x02, 0xff, 0xff];
        let mut r = ByteReader::new(Cursor::new(bytes), ByteOrder::Little);
        assert_eq!(ByteOrder::Little, r.order());
        assert_eq!(0x0201, r.read_primitive(Primitive::U16).unwrap());
        assert_eq!(-1, r.read_primitive(Primitive::I16).unwrap());
    }

    #[test]
    fn short_read_does_not_advance() {
        let mut r = ByteReader::new(Cursor::new([0x01u8, 0x02]), ByteOrder::Big);
        let e = r.read_primitive(Primitive::U32).err().unwrap();
        assert_eq!(Kind::EndOfStream, e.kind());
        assert_eq!(0, r.position());
    }

    #[test]
    fn vlq_bytes() {
        let bytes = [0x81u8, 0x80, 0x00, 0x60];
        let mut r = ByteReader::new(Cursor::new(bytes), ByteOrder::Big);
        let v = r.read_vlq().unwrap();
        assert_eq!(0x4000, v.value());
        assert_eq!(3, v.byte_len());
        let v = r.read_vlq().unwrap();
        assert_eq!(0x60, v.value());
        assert_eq!(1, v.byte_len());
    }

    #[test]
    fn vlq_too_long() {
        let bytes = [0x81u8, 0x80, 0x80, 0x80, 0x00];
        let mut r = ByteReader::new(Cursor::new(bytes), ByteOrder::Big);
        let e = r.read_vlq().err().unwrap();
        assert_eq!(Kind::InvalidFile, e.kind());
    }

    #[test]
    fn vlq_truncated() {
        let mut r = ByteReader::new(Cursor::new([0x81u8]), ByteOrder::Big);
        let e = r.read_vlq().err().unwrap();
        assert_eq!(Kind::EndOfStream, e.kind());
    }

    #[test]
    fn open_uses_a_small_buffer() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        std::io::Write::write_all(&mut file, b"MThd").unwrap();
        let mut r = ByteReader::open(file.path()).unwrap();
        assert_eq!(b"MThd".to_vec(), r.read_n(4).unwrap());
        assert!(r.into_inner().capacity() <= 64 * 1024);
    }
}
