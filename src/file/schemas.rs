use crate::constants::{META_CUE_POINT, META_END_OF_TRACK, META_SET_TEMPO, META_TEXT};
use crate::core::bits::{HIGH_NIBBLE, LOW_NIBBLE};
use crate::core::{
    STATUS_CHANNEL_PRESSURE, STATUS_CONTROL, STATUS_META, STATUS_NOTE_OFF, STATUS_NOTE_ON,
    STATUS_PITCH_BEND, STATUS_POLY_PRESSURE, STATUS_PROGRAM,
};
use crate::error::{BadChunkIdSnafu, LibError, LibResult, UnknownMetaEventTypeSnafu};
use crate::schema::{Discriminated, Field, KeyedSchemas, PayloadShape, Record, Schema};
use crate::stream::Primitive;
use std::sync::Arc;

pub(crate) const CHUNK_ID: &str = "chunk_id";
pub(crate) const CHUNK_SIZE: &str = "chunk_size";
pub(crate) const FORMAT: &str = "format";
pub(crate) const TRACK_COUNT: &str = "track_count";
pub(crate) const DIVISION: &str = "division";

pub(crate) const DELTA_TIME: &str = "delta_time";
pub(crate) const STATUS: &str = "status";
pub(crate) const EVENT_TYPE: &str = "event_type";
pub(crate) const CHANNEL: &str = "channel";
pub(crate) const PARAMETERS: &str = "parameters";

pub(crate) const NOTE: &str = "note";
pub(crate) const VELOCITY: &str = "velocity";
pub(crate) const PROGRAM: &str = "program";

pub(crate) const SUBTYPE: &str = "subtype";
pub(crate) const LENGTH: &str = "length";
pub(crate) const DATA: &str = "data";

/// The schemas that make up a Standard MIDI File, built once per decoding session and shared by
/// every record decoded in it.
#[derive(Clone, Debug)]
pub struct MidiSchemas {
    header: Arc<Schema>,
    track_header: Arc<Schema>,
    event: Arc<Schema>,
}

impl MidiSchemas {
    pub fn new() -> crate::Result<Self> {
        Ok(Self::build()?)
    }

    pub(crate) fn build() -> LibResult<Self> {
        Ok(Self {
            header: header_schema()?,
            track_header: track_header_schema()?,
            event: event_schema()?,
        })
    }

    /// `MThd`, size, format, track count, time division. 14 bytes.
    pub fn header(&self) -> &Arc<Schema> {
        &self.header
    }

    /// `MTrk` and the declared size of the events that follow.
    pub fn track_header(&self) -> &Arc<Schema> {
        &self.track_header
    }

    /// Delta time, status byte with its two nibbles, and parameters chosen by the high nibble.
    pub fn event(&self) -> &Arc<Schema> {
        &self.event
    }
}

fn header_schema() -> LibResult<Arc<Schema>> {
    Ok(Schema::builder("header")
        .field(CHUNK_ID, Field::Str(4))
        .field(CHUNK_SIZE, Field::Scalar(Primitive::U32))
        .field(FORMAT, Field::Scalar(Primitive::U16))
        .field(TRACK_COUNT, Field::Scalar(Primitive::U16))
        .field(DIVISION, Field::Scalar(Primitive::U16))
        .build()?)
}

fn track_header_schema() -> LibResult<Arc<Schema>> {
    Ok(Schema::builder("track_header")
        .field(CHUNK_ID, Field::Str(4))
        .field(CHUNK_SIZE, Field::Scalar(Primitive::U32))
        .build()?)
}

fn two_bytes(name: &str, first: &str, second: &str) -> LibResult<Arc<Schema>> {
    Ok(Schema::builder(name)
        .field(first, Field::Scalar(Primitive::U8))
        .field(second, Field::Scalar(Primitive::U8))
        .build()?)
}

fn one_byte(name: &str, only: &str) -> LibResult<Arc<Schema>> {
    Ok(Schema::builder(name)
        .field(only, Field::Scalar(Primitive::U8))
        .build()?)
}

fn unknown_meta_event(subtype: u32) -> LibError {
    UnknownMetaEventTypeSnafu {
        site: site!(),
        subtype: subtype as u8,
    }
    .build()
}

fn meta_schema() -> LibResult<Arc<Schema>> {
    let payload = Discriminated::new(SUBTYPE, LENGTH)
        .arms(
            u32::from(META_TEXT)..=u32::from(META_CUE_POINT),
            PayloadShape::Text,
        )
        .arm(u32::from(META_END_OF_TRACK), PayloadShape::Empty)
        .arm(
            u32::from(META_SET_TEMPO),
            PayloadShape::Scalar(Primitive::U24),
        )
        .on_unknown(unknown_meta_event);
    Ok(Schema::builder("meta")
        .field(SUBTYPE, Field::Scalar(Primitive::U8))
        .field(LENGTH, Field::Scalar(Primitive::U8))
        .field(DATA, Field::payload(payload))
        .build()?)
}

fn event_schema() -> LibResult<Arc<Schema>> {
    let note = two_bytes("note", NOTE, VELOCITY)?;
    let parameters = KeyedSchemas::new(EVENT_TYPE)
        .arms(
            vec![u32::from(STATUS_NOTE_OFF), u32::from(STATUS_NOTE_ON)],
            &note,
        )
        .arm(
            u32::from(STATUS_POLY_PRESSURE),
            &two_bytes("poly_pressure", NOTE, "pressure")?,
        )
        .arm(
            u32::from(STATUS_CONTROL),
            &two_bytes("control", "controller", "value")?,
        )
        .arm(u32::from(STATUS_PROGRAM), &one_byte("program", PROGRAM)?)
        .arm(
            u32::from(STATUS_CHANNEL_PRESSURE),
            &one_byte("channel_pressure", "pressure")?,
        )
        .arm(
            u32::from(STATUS_PITCH_BEND),
            &two_bytes("pitch_bend", "lsb", "msb")?,
        )
        .arm(u32::from(STATUS_META), &meta_schema()?);
    Ok(Schema::builder("event")
        .field(DELTA_TIME, Field::Vlq)
        .field(STATUS, Field::Scalar(Primitive::U8))
        .field(EVENT_TYPE, Field::bits(STATUS, HIGH_NIBBLE)?)
        .field(CHANNEL, Field::bits(STATUS, LOW_NIBBLE)?)
        .field(PARAMETERS, Field::keyed(parameters))
        .build()?)
}

/// Fails with `BadChunkId` unless the record's `chunk_id` is `expected`.
pub(crate) fn check_chunk_id(record: &Record, expected: &str) -> LibResult<()> {
    let found = record.bytes(CHUNK_ID)?;
    if found != expected.as_bytes() {
        return BadChunkIdSnafu {
            site: site!(),
            expected,
            found: String::from_utf8_lossy(found),
        }
        .fail();
    }
    Ok(())
}
