use crate::core::vlq::{self, VariableLength};
use crate::stream::{ByteOrder, ByteResult, IoSnafu, Primitive, VlqEncodeSnafu};
use log::trace;
use snafu::ResultExt;
use std::io::Write;

/// The writing counterpart of [`crate::stream::ByteReader`]: a wrapper for any `Write` which
/// encodes primitives in a byte order chosen at construction.
pub struct ByteWriter<W: Write> {
    inner: W,
    order: ByteOrder,
    position: u64,
}

impl<W: Write> ByteWriter<W> {
    pub fn new(inner: W, order: ByteOrder) -> Self {
        Self {
            inner,
            order,
            position: 0,
        }
    }

    pub fn order(&self) -> ByteOrder {
        self.order
    }

    /// The number of bytes written so far.
    pub fn position(&self) -> u64 {
        self.position
    }

    pub fn into_inner(self) -> W {
        self.inner
    }

    /// Write `bytes` as they are.
    pub fn write_bytes(&mut self, bytes: &[u8]) -> crate::Result<()> {
        Ok(self.write_bytes_inner(bytes).context(wr!())?)
    }

    /// Write one fixed-width integer in this writer's byte order, failing if it does not fit.
    pub fn write_primitive(&mut self, primitive: Primitive, value: i64) -> crate::Result<()> {
        Ok(self.write_primitive_inner(primitive, value).context(wr!())?)
    }

    /// Write `vlq` in the number of bytes it occupied when it was read, so that padded encodings
    /// survive re-encoding. Use [`VariableLength::encoded`] to get the shortest encoding.
    pub fn write_vlq(&mut self, vlq: VariableLength) -> crate::Result<()> {
        Ok(self.write_vlq_inner(vlq).context(wr!())?)
    }

    fn write_bytes_inner(&mut self, bytes: &[u8]) -> ByteResult<()> {
        let position = self.position;
        self.inner
            .write_all(bytes)
            .context(IoSnafu { position })?;
        trace!("wrote {:02x?} at position {}", bytes, position);
        self.position += bytes.len() as u64;
        Ok(())
    }

    fn write_primitive_inner(&mut self, primitive: Primitive, value: i64) -> ByteResult<()> {
        let bytes = primitive.to_bytes(value, self.order)?;
        self.write_bytes_inner(&bytes)
    }

    fn write_vlq_inner(&mut self, vlq: VariableLength) -> ByteResult<()> {
        let bytes = vlq::encode_padded(vlq.value(), vlq.byte_len()).context(VlqEncodeSnafu {
            position: self.position,
        })?;
        self.write_bytes_inner(&bytes)
    }
}
