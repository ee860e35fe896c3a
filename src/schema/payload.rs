use crate::error::{LibError, LibResult, UnknownVariantSnafu, UnmatchedKeySnafu, ValueTypeSnafu};
use crate::schema::field::FieldRef;
use crate::schema::{Record, Schema, Value};
use crate::stream::{ByteReader, ByteWriter, Primitive};
use log::trace;
use std::collections::BTreeMap;
use std::io::{Read, Write};
use std::sync::Arc;

/// The schema of an embedded record, either fixed or chosen by the integer value of an earlier
/// sibling.
#[derive(Clone, Debug)]
pub enum Nested {
    Fixed(Arc<Schema>),
    Keyed(KeyedSchemas),
}

/// A table from key values to schemas. A key with no entry is an error, there is no default.
#[derive(Clone, Debug)]
pub struct KeyedSchemas {
    key: FieldRef,
    arms: BTreeMap<u32, Arc<Schema>>,
}

impl KeyedSchemas {
    /// `key` names the earlier sibling whose value selects the schema.
    pub fn new<S: Into<String>>(key: S) -> Self {
        Self {
            key: FieldRef::new(key),
            arms: BTreeMap::new(),
        }
    }

    pub fn arm(mut self, key: u32, schema: &Arc<Schema>) -> Self {
        self.arms.insert(key, Arc::clone(schema));
        self
    }

    /// Maps several keys to the same schema.
    pub fn arms<I: IntoIterator<Item = u32>>(mut self, keys: I, schema: &Arc<Schema>) -> Self {
        for key in keys {
            self.arms.insert(key, Arc::clone(schema));
        }
        self
    }

    pub fn key(&self) -> &FieldRef {
        &self.key
    }

    pub(crate) fn key_mut(&mut self) -> &mut FieldRef {
        &mut self.key
    }
}

impl Nested {
    pub(crate) fn schema_for(&self, siblings: &[Value]) -> LibResult<&Arc<Schema>> {
        match self {
            Nested::Fixed(schema) => Ok(schema),
            Nested::Keyed(keyed) => {
                let key = keyed.key.key(siblings)?;
                match keyed.arms.get(&key) {
                    Some(schema) => Ok(schema),
                    None => UnmatchedKeySnafu {
                        site: site!(),
                        field: keyed.key.name(),
                        key,
                    }
                    .fail(),
                }
            }
        }
    }

    pub(crate) fn read<R: Read>(
        &self,
        r: &mut ByteReader<R>,
        siblings: &[Value],
    ) -> LibResult<Record> {
        let schema = self.schema_for(siblings)?;
        Record::parse(schema, r)
    }

    pub(crate) fn write<W: Write>(
        &self,
        w: &mut ByteWriter<W>,
        record: &Record,
        siblings: &[Value],
    ) -> LibResult<()> {
        let schema = self.schema_for(siblings)?;
        if !Arc::ptr_eq(schema, record.schema()) {
            invalid_schema!(
                "a '{}' record cannot be written where '{}' is expected",
                record.schema().name(),
                schema.name()
            );
        }
        record.emit(w)
    }
}

/// The shapes a discriminated payload can take.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum PayloadShape {
    /// As many raw bytes as the length field says.
    Text,
    /// Nothing. The length field is not consulted.
    Empty,
    /// One integer. The length field must equal its width.
    Scalar(Primitive),
}

/// A payload whose shape is selected by one earlier sibling (`key`) and whose byte count is given
/// by another (`length`).
#[derive(Clone, Debug)]
pub struct Discriminated {
    key: FieldRef,
    length: FieldRef,
    arms: BTreeMap<u32, PayloadShape>,
    unknown: Option<fn(u32) -> LibError>,
}

impl Discriminated {
    pub fn new<K: Into<String>, L: Into<String>>(key: K, length: L) -> Self {
        Self {
            key: FieldRef::new(key),
            length: FieldRef::new(length),
            arms: BTreeMap::new(),
            unknown: None,
        }
    }

    pub fn arm(mut self, key: u32, shape: PayloadShape) -> Self {
        self.arms.insert(key, shape);
        self
    }

    pub fn arms<I: IntoIterator<Item = u32>>(mut self, keys: I, shape: PayloadShape) -> Self {
        for key in keys {
            self.arms.insert(key, shape);
        }
        self
    }

    /// Replaces the error produced when no arm matches.
    pub(crate) fn on_unknown(mut self, unknown: fn(u32) -> LibError) -> Self {
        self.unknown = Some(unknown);
        self
    }

    pub(crate) fn references_mut(&mut self) -> Vec<&mut FieldRef> {
        vec![&mut self.key, &mut self.length]
    }

    pub(crate) fn shape_for(&self, siblings: &[Value]) -> LibResult<PayloadShape> {
        let key = self.key.key(siblings)?;
        match (self.arms.get(&key), self.unknown) {
            (Some(shape), _) => Ok(*shape),
            (None, Some(unknown)) => Err(unknown(key)),
            (None, None) => UnknownVariantSnafu {
                site: site!(),
                field: self.key.name(),
                key,
            }
            .fail(),
        }
    }

    fn declared_length(&self, siblings: &[Value]) -> LibResult<usize> {
        Ok(self.length.key(siblings)? as usize)
    }

    pub(crate) fn read<R: Read>(
        &self,
        r: &mut ByteReader<R>,
        siblings: &[Value],
    ) -> LibResult<Value> {
        let shape = self.shape_for(siblings)?;
        trace!("payload shape {:?} at position {}", shape, r.position());
        match shape {
            PayloadShape::Text => {
                let length = self.declared_length(siblings)?;
                Ok(Value::Bytes(r.read_n(length)?))
            }
            PayloadShape::Empty => Ok(Value::Empty),
            PayloadShape::Scalar(primitive) => {
                let length = self.declared_length(siblings)?;
                if length != primitive.size() {
                    invalid_file!(
                        "a {} payload cannot be {} bytes long",
                        primitive.name(),
                        length
                    );
                }
                Ok(Value::Int(r.read_primitive(primitive)?))
            }
        }
    }

    pub(crate) fn write<W: Write>(
        &self,
        w: &mut ByteWriter<W>,
        value: &Value,
        siblings: &[Value],
    ) -> LibResult<()> {
        match (self.shape_for(siblings)?, value) {
            (PayloadShape::Text, Value::Bytes(bytes)) => {
                let length = self.declared_length(siblings)?;
                if bytes.len() != length {
                    invalid_schema!(
                        "payload holds {} bytes but '{}' says {}",
                        bytes.len(),
                        self.length.name(),
                        length
                    );
                }
                Ok(w.write_bytes(bytes)?)
            }
            (PayloadShape::Empty, Value::Empty) => Ok(()),
            (PayloadShape::Scalar(primitive), Value::Int(i)) => {
                Ok(w.write_primitive(primitive, *i)?)
            }
            (shape, value) => ValueTypeSnafu {
                site: site!(),
                expected: shape_name(shape),
                found: value.kind_name(),
            }
            .fail(),
        }
    }

    pub(crate) fn length(&self, value: &Value, siblings: &[Value]) -> LibResult<usize> {
        match (self.shape_for(siblings)?, value) {
            (PayloadShape::Text, Value::Bytes(bytes)) => Ok(bytes.len()),
            (PayloadShape::Empty, Value::Empty) => Ok(0),
            (PayloadShape::Scalar(primitive), Value::Int(_)) => Ok(primitive.size()),
            (shape, value) => ValueTypeSnafu {
                site: site!(),
                expected: shape_name(shape),
                found: value.kind_name(),
            }
            .fail(),
        }
    }
}

fn shape_name(shape: PayloadShape) -> &'static str {
    match shape {
        PayloadShape::Text => "bytes",
        PayloadShape::Empty => "empty",
        PayloadShape::Scalar(_) => "integer",
    }
}
