use crate::core::bits::BitMask;
use crate::error::{LengthUnavailableSnafu, LibResult, ValueTypeSnafu};
use crate::schema::payload::{Discriminated, KeyedSchemas, Nested};
use crate::schema::{Entry, Schema, Value};
use crate::stream::{ByteReader, ByteWriter, Primitive};
use snafu::OptionExt;
use std::convert::TryFrom;
use std::io::{Read, Write};
use std::sync::Arc;

/// A by-name reference from one field to an earlier sibling in the same schema. The name is
/// resolved to a position when the schema is built.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct FieldRef {
    name: String,
    index: Option<usize>,
}

impl FieldRef {
    pub fn new<S: Into<String>>(name: S) -> Self {
        Self {
            name: name.into(),
            index: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The position of the referenced field, once resolved.
    pub fn index(&self) -> Option<usize> {
        self.index
    }

    /// Points this reference at the entry named `self.name` among `earlier`, which holds every
    /// entry declared before the referencing field.
    pub(crate) fn resolve(&mut self, owner: &str, earlier: &[Entry]) -> LibResult<()> {
        let index = match earlier.iter().position(|e| e.name() == self.name) {
            Some(index) => index,
            None => invalid_schema!(
                "field '{}' refers to '{}' which is not declared before it",
                owner,
                self.name
            ),
        };
        if !earlier[index].field().is_integer() {
            invalid_schema!(
                "field '{}' refers to '{}' which does not hold an integer",
                owner,
                self.name
            );
        }
        self.index = Some(index);
        Ok(())
    }

    pub(crate) fn value<'a>(&self, siblings: &'a [Value]) -> LibResult<&'a Value> {
        let index = self
            .index
            .with_context(|| crate::error::InvalidSchemaSnafu {
                site: site!(),
                description: format!("reference to '{}' was never resolved", self.name),
            })?;
        siblings
            .get(index)
            .with_context(|| crate::error::InvalidSchemaSnafu {
                site: site!(),
                description: format!("'{}' has not been decoded yet", self.name),
            })
    }

    /// The referenced sibling's value as an unsigned key.
    pub(crate) fn key(&self, siblings: &[Value]) -> LibResult<u32> {
        let value = self.value(siblings)?.expect_int()?;
        match u32::try_from(value) {
            Ok(key) => Ok(key),
            Err(_) => invalid_file!("'{}' holds {} which cannot be a key", self.name, value),
        }
    }
}

/// Describes how one value is laid out in a stream. A `Field` never holds a decoded value itself,
/// those live in a [`crate::schema::Record`].
#[derive(Clone, Debug)]
pub enum Field {
    /// A fixed-width integer.
    Scalar(Primitive),
    /// A fixed number of raw bytes. Writing pads with zeros or truncates to the width.
    Str(usize),
    /// A variable-length quantity, 1 to 4 bytes.
    Vlq,
    /// Bits of an earlier integer sibling. Consumes no bytes.
    Bits { container: FieldRef, mask: BitMask },
    /// `count` consecutive values of the same element field.
    Array { element: Box<Field>, count: usize },
    /// An embedded record.
    Block(Nested),
    /// A payload whose shape is chosen by an earlier sibling.
    Payload(Discriminated),
}

impl Field {
    /// A bit-subfield of `container`. Fails if `mask` is zero.
    pub fn bits<S: Into<String>>(container: S, mask: u32) -> crate::Result<Self> {
        let container = FieldRef::new(container);
        let mask = match BitMask::new(mask) {
            Some(mask) => mask,
            None => {
                return Err(crate::error::InvalidSchemaSnafu {
                    site: site!(),
                    description: format!("the mask over '{}' selects no bits", container.name()),
                }
                .build()
                .into())
            }
        };
        Ok(Field::Bits { container, mask })
    }

    pub fn array(element: Field, count: usize) -> Self {
        Field::Array {
            element: Box::new(element),
            count,
        }
    }

    pub fn block(schema: &Arc<Schema>) -> Self {
        Field::Block(Nested::Fixed(Arc::clone(schema)))
    }

    pub fn keyed(schemas: KeyedSchemas) -> Self {
        Field::Block(Nested::Keyed(schemas))
    }

    pub fn payload(payload: Discriminated) -> Self {
        Field::Payload(payload)
    }

    /// True if the decoded value is an integer that other fields may refer to.
    pub fn is_integer(&self) -> bool {
        matches!(self, Field::Scalar(_) | Field::Vlq | Field::Bits { .. })
    }

    /// True if the byte length is known without decoding anything.
    pub fn is_fixed(&self) -> bool {
        match self {
            Field::Scalar(_) | Field::Str(_) | Field::Bits { .. } => true,
            Field::Vlq | Field::Payload(_) => false,
            Field::Array { element, .. } => element.is_fixed(),
            Field::Block(Nested::Fixed(schema)) => schema.is_fixed(),
            Field::Block(Nested::Keyed(_)) => false,
        }
    }

    pub(crate) fn describe(&self) -> &'static str {
        match self {
            Field::Scalar(_) => "scalar",
            Field::Str(_) => "fixed string",
            Field::Vlq => "variable-length quantity",
            Field::Bits { .. } => "bit field",
            Field::Array { .. } => "array",
            Field::Block(_) => "block",
            Field::Payload(_) => "discriminated payload",
        }
    }

    /// Every sibling reference held by this field, for resolution at schema build time.
    pub(crate) fn references_mut(&mut self) -> Vec<&mut FieldRef> {
        match self {
            Field::Bits { container, .. } => vec![container],
            Field::Block(Nested::Keyed(keyed)) => vec![keyed.key_mut()],
            Field::Payload(payload) => payload.references_mut(),
            Field::Array { element, .. } => element.references_mut(),
            Field::Scalar(_) | Field::Str(_) | Field::Vlq | Field::Block(Nested::Fixed(_)) => {
                Vec::new()
            }
        }
    }

    /// Decode one value. `siblings` holds the values already decoded in the enclosing record, in
    /// declaration order.
    pub(crate) fn read<R: Read>(
        &self,
        r: &mut ByteReader<R>,
        siblings: &[Value],
    ) -> LibResult<Value> {
        match self {
            Field::Scalar(primitive) => Ok(Value::Int(r.read_primitive(*primitive)?)),
            Field::Str(width) => Ok(Value::Bytes(r.read_n(*width)?)),
            Field::Vlq => Ok(Value::Vlq(r.read_vlq()?)),
            Field::Bits { container, mask } => {
                // the container's bit pattern, negative scalars included
                let bits = container.value(siblings)?.expect_int()? as u32;
                Ok(Value::Int(i64::from(mask.extract(bits))))
            }
            Field::Array { element, count } => {
                let mut items = Vec::with_capacity(*count);
                for _ in 0..*count {
                    items.push(element.read(r, &[])?);
                }
                Ok(Value::List(items))
            }
            Field::Block(nested) => Ok(Value::Record(nested.read(r, siblings)?)),
            Field::Payload(payload) => payload.read(r, siblings),
        }
    }

    pub(crate) fn write<W: Write>(
        &self,
        w: &mut ByteWriter<W>,
        value: &Value,
        siblings: &[Value],
    ) -> LibResult<()> {
        match (self, value) {
            (Field::Scalar(primitive), Value::Int(i)) => {
                Ok(w.write_primitive(*primitive, *i)?)
            }
            (Field::Str(width), Value::Bytes(bytes)) => {
                let mut bytes = bytes.clone();
                bytes.resize(*width, 0);
                Ok(w.write_bytes(&bytes)?)
            }
            (Field::Vlq, Value::Vlq(v)) => Ok(w.write_vlq(*v)?),
            // the value is stored in the container
            (Field::Bits { .. }, _) => Ok(()),
            (Field::Array { element, count }, Value::List(items)) => {
                if items.len() != *count {
                    invalid_schema!("array of {} written with {} items", count, items.len());
                }
                for item in items {
                    element.write(w, item, &[])?;
                }
                Ok(())
            }
            (Field::Block(nested), Value::Record(record)) => nested.write(w, record, siblings),
            (Field::Payload(payload), _) => payload.write(w, value, siblings),
            _ => ValueTypeSnafu {
                site: site!(),
                expected: self.describe(),
                found: value.kind_name(),
            }
            .fail(),
        }
    }

    /// The number of bytes this field occupies. Fixed-width fields answer without a value,
    /// variable-width fields need the value they decoded.
    pub fn byte_length(&self, value: Option<&Value>, siblings: &[Value]) -> crate::Result<usize> {
        Ok(self.length(value, siblings)?)
    }

    pub(crate) fn length(&self, value: Option<&Value>, siblings: &[Value]) -> LibResult<usize> {
        match self {
            Field::Scalar(primitive) => Ok(primitive.size()),
            Field::Str(width) => Ok(*width),
            Field::Bits { .. } => Ok(0),
            Field::Vlq => match value {
                Some(Value::Vlq(v)) => Ok(v.byte_len()),
                Some(other) => ValueTypeSnafu {
                    site: site!(),
                    expected: self.describe(),
                    found: other.kind_name(),
                }
                .fail(),
                None => self.unavailable(),
            },
            Field::Array { element, count } => {
                if element.is_fixed() {
                    return Ok(element.length(None, &[])? * count);
                }
                match value {
                    Some(Value::List(items)) => {
                        let mut total = 0;
                        for item in items {
                            total += element.length(Some(item), &[])?;
                        }
                        Ok(total)
                    }
                    Some(other) => ValueTypeSnafu {
                        site: site!(),
                        expected: self.describe(),
                        found: other.kind_name(),
                    }
                    .fail(),
                    None => self.unavailable(),
                }
            }
            Field::Block(nested) => match (nested, value) {
                (_, Some(Value::Record(record))) => record.length(),
                (Nested::Fixed(schema), None) => schema.length(),
                (Nested::Keyed(_), None) => self.unavailable(),
                (_, Some(other)) => ValueTypeSnafu {
                    site: site!(),
                    expected: self.describe(),
                    found: other.kind_name(),
                }
                .fail(),
            },
            Field::Payload(payload) => match value {
                Some(value) => payload.length(value, siblings),
                None => self.unavailable(),
            },
        }
    }

    fn unavailable(&self) -> LibResult<usize> {
        LengthUnavailableSnafu {
            site: site!(),
            field: self.describe(),
        }
        .fail()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::vlq::VariableLength;
    use crate::error::ErrorKind;
    use crate::stream::ByteOrder;
    use std::io::Cursor;

    fn reader(bytes: &[u8]) -> ByteReader<Cursor<Vec<u8>>> {
        ByteReader::new(Cursor::new(bytes.to_vec()), ByteOrder::Big)
    }

    #[test]
    fn zero_mask_is_rejected() {
        let e = Field::bits("status", 0).err().unwrap();
        assert_eq!(ErrorKind::InvalidSchema, e.kind());
    }

    #[test]
    fn fixed_lengths_are_known_before_reading() {
        assert_eq!(2, Field::Scalar(Primitive::U16).byte_length(None, &[]).unwrap());
        assert_eq!(4, Field::Str(4).byte_length(None, &[]).unwrap());
        assert_eq!(
            6,
            Field::array(Field::Scalar(Primitive::U16), 3)
                .byte_length(None, &[])
                .unwrap()
        );
    }

    #[test]
    fn vlq_length_needs_a_value() {
        let e = Field::Vlq.byte_length(None, &[]).err().unwrap();
        assert_eq!(ErrorKind::LengthUnavailable, e.kind());
        let mut r = reader(&[0x83, 0x60]);
        let value = Field::Vlq.read(&mut r, &[]).unwrap();
        assert_eq!(Value::Vlq(VariableLength::new(0x1e0, 2)), value);
        assert_eq!(2, Field::Vlq.byte_length(Some(&value), &[]).unwrap());
    }

    #[test]
    fn bits_read_the_sibling_not_the_stream() {
        let mut field = Field::bits("status", 0xF0).unwrap();
        let earlier = vec![Entry::new("status", Field::Scalar(Primitive::U8))];
        for reference in field.references_mut() {
            reference.resolve("event_type", &earlier).unwrap();
        }
        let mut r = reader(&[]);
        let siblings = vec![Value::Int(0x95)];
        assert_eq!(Value::Int(9), field.read(&mut r, &siblings).unwrap());
        assert_eq!(0, r.position());
        assert_eq!(0, field.byte_length(None, &siblings).unwrap());
    }

    #[test]
    fn unresolved_reference_fails() {
        let field = Field::bits("status", 0x0F).unwrap();
        let mut r = reader(&[]);
        let e = field.read(&mut r, &[Value::Int(1)]).err().unwrap();
        assert_eq!(ErrorKind::InvalidSchema, e.kind());
    }

    #[test]
    fn str_write_pads_and_truncates() {
        let mut w = ByteWriter::new(Vec::new(), ByteOrder::Big);
        Field::Str(4)
            .write(&mut w, &Value::Bytes(b"MT".to_vec()), &[])
            .unwrap();
        Field::Str(2)
            .write(&mut w, &Value::Bytes(b"MTrk".to_vec()), &[])
            .unwrap();
        assert_eq!(b"MT\0\0MT".to_vec(), w.into_inner());
    }

    #[test]
    fn wrong_value_type() {
        let mut w = ByteWriter::new(Vec::new(), ByteOrder::Big);
        let e = Field::Scalar(Primitive::U8)
            .write(&mut w, &Value::Bytes(vec![1]), &[])
            .err()
            .unwrap();
        assert_eq!(ErrorKind::ValueType, e.kind());
    }
}
