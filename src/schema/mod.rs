/*!
The `schema` module describes binary records declaratively. A [`Schema`] is an ordered list of
named [`Field`]s. Reading a schema from a stream produces a [`Record`] holding one [`Value`] per
field, and writing the record produces the same bytes again.

Fields may refer to earlier siblings by name: a bit field extracts bits from an earlier integer, a
keyed block picks its schema from an earlier integer, and a discriminated payload takes its shape
and length from two earlier integers. These names are resolved once, when
[`SchemaBuilder::build`] runs, and a reference to a later field or an unknown name fails there.

```
use midi_blocks::schema::{Field, Schema};
use midi_blocks::stream::{ByteOrder, ByteReader, Primitive};
use std::io::Cursor;

let status = Schema::builder("status")
    .field("status", Field::Scalar(Primitive::U8))
    .field("kind", Field::bits("status", 0xF0).unwrap())
    .field("channel", Field::bits("status", 0x0F).unwrap())
    .build()
    .unwrap();

let mut r = ByteReader::new(Cursor::new(vec![0x95]), ByteOrder::Big);
let record = midi_blocks::schema::Record::read(&status, &mut r).unwrap();
assert_eq!(9, record.int("kind").unwrap());
assert_eq!(5, record.int("channel").unwrap());
assert_eq!(1, status.byte_length().unwrap());
```
!*/

mod field;
mod payload;
mod record;

pub use field::{Field, FieldRef};
pub use payload::{Discriminated, KeyedSchemas, Nested, PayloadShape};
pub use record::{Record, Value};

use crate::error::LibResult;
use log::debug;
use std::collections::HashSet;
use std::sync::Arc;

/// One named field of a schema.
#[derive(Clone, Debug)]
pub struct Entry {
    name: String,
    field: Field,
}

impl Entry {
    pub(crate) fn new<S: Into<String>>(name: S, field: Field) -> Self {
        Self {
            name: name.into(),
            field,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn field(&self) -> &Field {
        &self.field
    }
}

/// An ordered, immutable list of named fields. Schemas are shared behind an `Arc` so that nested
/// blocks and the records decoded from them can all point at the same instance.
#[derive(Clone, Debug)]
pub struct Schema {
    name: String,
    entries: Vec<Entry>,
}

impl Schema {
    pub fn builder<S: Into<String>>(name: S) -> SchemaBuilder {
        SchemaBuilder::new(name)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> std::slice::Iter<'_, Entry> {
        self.entries.iter()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.name())
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.entries.iter().position(|e| e.name == name)
    }

    pub fn field(&self, name: &str) -> Option<&Field> {
        self.index_of(name).map(|i| &self.entries[i].field)
    }

    /// True when every field has a fixed width.
    pub fn is_fixed(&self) -> bool {
        self.entries.iter().all(|e| e.field.is_fixed())
    }

    /// The number of bytes a record of this schema occupies, if that is known without reading
    /// one. Fails with `LengthUnavailable` when any field is variable-width.
    pub fn byte_length(&self) -> crate::Result<usize> {
        Ok(self.length()?)
    }

    pub(crate) fn length(&self) -> LibResult<usize> {
        let mut total = 0;
        for entry in &self.entries {
            total += entry.field.length(None, &[])?;
        }
        Ok(total)
    }
}

/// Collects fields in order, then checks names and resolves references in [`Self::build`].
#[derive(Clone, Debug)]
pub struct SchemaBuilder {
    name: String,
    entries: Vec<Entry>,
}

impl SchemaBuilder {
    pub fn new<S: Into<String>>(name: S) -> Self {
        Self {
            name: name.into(),
            entries: Vec::new(),
        }
    }

    pub fn field<S: Into<String>>(mut self, name: S, field: Field) -> Self {
        self.entries.push(Entry::new(name, field));
        self
    }

    pub fn build(self) -> crate::Result<Arc<Schema>> {
        Ok(self.build_inner()?)
    }

    fn build_inner(self) -> LibResult<Arc<Schema>> {
        let SchemaBuilder { name, mut entries } = self;
        let mut seen = HashSet::new();
        for entry in &entries {
            if !seen.insert(entry.name.clone()) {
                invalid_schema!("'{}' declares field '{}' twice", name, entry.name);
            }
        }
        for i in 0..entries.len() {
            let (earlier, rest) = entries.split_at_mut(i);
            let entry = &mut rest[0];
            if let Field::Array { element, .. } = &mut entry.field {
                if !element.references_mut().is_empty() {
                    invalid_schema!("array '{}' holds fields that refer to siblings", entry.name);
                }
            }
            for reference in entry.field.references_mut() {
                reference.resolve(&entry.name, earlier)?;
            }
        }
        debug!("built schema '{}' with {} fields", name, entries.len());
        Ok(Arc::new(Schema { name, entries }))
    }
}
