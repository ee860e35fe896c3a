use crate::core::vlq::VariableLength;
use crate::error::{LibResult, ValueTypeSnafu};
use crate::schema::Schema;
use crate::stream::{ByteReader, ByteWriter};
use log::trace;
use std::io::{Read, Write};
use std::sync::Arc;

/// A decoded value. Which variant a field produces is fixed by the field's kind.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Value {
    /// From scalars and bit fields.
    Int(i64),
    /// From variable-length quantities, remembering how many bytes were used.
    Vlq(VariableLength),
    /// From fixed strings and text payloads.
    Bytes(Vec<u8>),
    /// From arrays.
    List(Vec<Value>),
    /// From nested blocks.
    Record(Record),
    /// From empty payloads.
    Empty,
}

impl Value {
    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::Int(_) => "integer",
            Value::Vlq(_) => "variable-length quantity",
            Value::Bytes(_) => "bytes",
            Value::List(_) => "list",
            Value::Record(_) => "record",
            Value::Empty => "empty",
        }
    }

    /// The integer held by `Int` or `Vlq`.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            Value::Vlq(v) => Some(i64::from(v.value())),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Value::Bytes(b) => Some(b.as_slice()),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items.as_slice()),
            _ => None,
        }
    }

    pub fn as_record(&self) -> Option<&Record> {
        match self {
            Value::Record(r) => Some(r),
            _ => None,
        }
    }

    pub(crate) fn expect_int(&self) -> LibResult<i64> {
        match self.as_int() {
            Some(i) => Ok(i),
            None => ValueTypeSnafu {
                site: site!(),
                expected: "integer",
                found: self.kind_name(),
            }
            .fail(),
        }
    }
}

/// The values decoded for one schema, in field declaration order.
#[derive(Clone, Debug)]
pub struct Record {
    schema: Arc<Schema>,
    values: Vec<Value>,
}

/// Two records are equal when they were made from the same schema instance and hold equal values.
impl PartialEq for Record {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.schema, &other.schema) && self.values == other.values
    }
}

impl Eq for Record {}

impl Record {
    /// Builds a record by hand, for writing. There must be exactly one value per field.
    pub fn new(schema: &Arc<Schema>, values: Vec<Value>) -> crate::Result<Self> {
        if values.len() != schema.len() {
            return Err(crate::error::InvalidSchemaSnafu {
                site: site!(),
                description: format!(
                    "'{}' has {} fields but {} values were given",
                    schema.name(),
                    schema.len(),
                    values.len()
                ),
            }
            .build()
            .into());
        }
        Ok(Self {
            schema: Arc::clone(schema),
            values,
        })
    }

    /// Decodes every field of `schema` in order. Nothing is returned unless every field decodes.
    pub fn read<R: Read>(schema: &Arc<Schema>, r: &mut ByteReader<R>) -> crate::Result<Self> {
        Ok(Self::parse(schema, r)?)
    }

    pub(crate) fn parse<R: Read>(schema: &Arc<Schema>, r: &mut ByteReader<R>) -> LibResult<Self> {
        trace!("reading '{}' at position {}", schema.name(), r.position());
        let mut values = Vec::with_capacity(schema.len());
        for entry in schema.entries() {
            let value = entry.field().read(r, &values)?;
            trace!("{}.{}: {:?}", schema.name(), entry.name(), value);
            values.push(value);
        }
        Ok(Self {
            schema: Arc::clone(schema),
            values,
        })
    }

    /// Encodes every field in order. Bit fields write nothing, their container carries them.
    pub fn write<W: Write>(&self, w: &mut ByteWriter<W>) -> crate::Result<()> {
        Ok(self.emit(w)?)
    }

    pub(crate) fn emit<W: Write>(&self, w: &mut ByteWriter<W>) -> LibResult<()> {
        for (i, (entry, value)) in self.schema.entries().zip(&self.values).enumerate() {
            entry.field().write(w, value, &self.values[..i])?;
        }
        Ok(())
    }

    /// The total number of bytes these values occupy.
    pub fn byte_length(&self) -> crate::Result<usize> {
        Ok(self.length()?)
    }

    pub(crate) fn length(&self) -> LibResult<usize> {
        let mut total = 0;
        for (i, (entry, value)) in self.schema.entries().zip(&self.values).enumerate() {
            total += entry.field().length(Some(value), &self.values[..i])?;
        }
        Ok(total)
    }

    pub fn schema(&self) -> &Arc<Schema> {
        &self.schema
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.schema.index_of(name).and_then(|i| self.values.get(i))
    }

    pub fn int(&self, name: &str) -> crate::Result<i64> {
        Ok(self.lookup(name)?.expect_int()?)
    }

    pub fn bytes(&self, name: &str) -> crate::Result<&[u8]> {
        let value = self.lookup(name)?;
        match value.as_bytes() {
            Some(b) => Ok(b),
            None => self.wrong_type("bytes", value),
        }
    }

    pub fn record(&self, name: &str) -> crate::Result<&Record> {
        let value = self.lookup(name)?;
        match value.as_record() {
            Some(r) => Ok(r),
            None => self.wrong_type("record", value),
        }
    }

    /// Field names in declaration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.schema.names()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.schema.names().zip(self.values.iter())
    }

    fn lookup(&self, name: &str) -> LibResult<&Value> {
        match self.get(name) {
            Some(value) => Ok(value),
            None => invalid_schema!("'{}' has no field '{}'", self.schema.name(), name),
        }
    }

    fn wrong_type<T>(&self, expected: &str, value: &Value) -> crate::Result<T> {
        Err(ValueTypeSnafu {
            site: site!(),
            expected,
            found: value.kind_name(),
        }
        .build()
        .into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::schema::Field;
    use crate::stream::{ByteOrder, Primitive};
    use std::io::Cursor;

    fn pair() -> Arc<Schema> {
        Schema::builder("pair")
            .field("tag", Field::Str(2))
            .field("delta", Field::Vlq)
            .field("items", Field::array(Field::Scalar(Primitive::I8), 2))
            .build()
            .unwrap()
    }

    #[test]
    fn values_follow_declaration_order() {
        let bytes = vec![b'o', b'k', 0x81, 0x00, 0xFF, 0x01];
        let mut r = ByteReader::new(Cursor::new(bytes), ByteOrder::Big);
        let record = Record::read(&pair(), &mut r).unwrap();
        let names: Vec<&str> = record.names().collect();
        assert_eq!(vec!["tag", "delta", "items"], names);
        assert_eq!(b"ok", record.bytes("tag").unwrap());
        assert_eq!(128, record.int("delta").unwrap());
        assert_eq!(
            Some(&[Value::Int(-1), Value::Int(1)][..]),
            record.get("items").and_then(Value::as_list)
        );
        assert_eq!(6, record.byte_length().unwrap());
    }

    #[test]
    fn failure_leaves_no_record() {
        let mut r = ByteReader::new(Cursor::new(vec![b'o', b'k', 0x05]), ByteOrder::Big);
        let e = Record::read(&pair(), &mut r).err().unwrap();
        assert_eq!(ErrorKind::EndOfStream, e.kind());
    }

    #[test]
    fn accessor_type_errors() {
        let schema = pair();
        let record = Record::new(
            &schema,
            vec![
                Value::Bytes(b"ok".to_vec()),
                Value::Vlq(VariableLength::encoded(5).unwrap()),
                Value::List(vec![Value::Int(0), Value::Int(0)]),
            ],
        )
        .unwrap();
        assert_eq!(ErrorKind::ValueType, record.int("tag").err().unwrap().kind());
        assert_eq!(ErrorKind::ValueType, record.record("tag").err().unwrap().kind());
        assert_eq!(ErrorKind::InvalidSchema, record.int("nope").err().unwrap().kind());
    }

    #[test]
    fn write_reproduces_bytes() {
        let bytes = vec![b'o', b'k', 0x83, 0x60, 0x80, 0x7F];
        let mut r = ByteReader::new(Cursor::new(bytes.clone()), ByteOrder::Big);
        let record = Record::read(&pair(), &mut r).unwrap();
        let mut w = ByteWriter::new(Vec::new(), ByteOrder::Big);
        record.write(&mut w).unwrap();
        assert_eq!(bytes, w.into_inner());
    }

    #[test]
    fn wrong_number_of_values() {
        let e = Record::new(&pair(), vec![Value::Empty]).err().unwrap();
        assert_eq!(ErrorKind::InvalidSchema, e.kind());
    }
}
