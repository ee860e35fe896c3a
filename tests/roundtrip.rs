mod utils;

use midi_blocks::core::vlq::VariableLength;
use midi_blocks::file::MidiSchemas;
use midi_blocks::schema::Record;
use midi_blocks::stream::{ByteOrder, ByteReader, ByteWriter, Primitive};
use midi_blocks::ErrorKind;
use std::fmt::{Debug, Display, Formatter};
use std::io::Cursor;
use utils::{
    enable_logging, smf, CONTROL_VOLUME, END_OF_TRACK, NOTE_OFF_C4, NOTE_ON_C4, PITCH_BEND,
    PROGRAM_FLUTE, TEMPO_120, TRACK_NAME,
};

struct BadByte {
    byte_position: usize,
    expected: u8,
    actual: u8,
}

impl Display for BadByte {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "round trip error, byte position: {}, expected: {:#04X}, actual: {:#04X}",
            self.byte_position, self.expected, self.actual
        )
    }
}

impl Debug for BadByte {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        Display::fmt(self, f)
    }
}

fn compare(expected: &[u8], actual: &[u8]) -> Result<(), BadByte> {
    assert_eq!(expected.len(), actual.len(), "round trip produced a different length");
    for (byte_position, (&expected, &actual)) in expected.iter().zip(actual).enumerate() {
        if expected != actual {
            return Err(BadByte {
                byte_position,
                expected,
                actual,
            });
        }
    }
    Ok(())
}

/// Reads the header, track header and every event as records, then writes them all back.
fn round_trip(bytes: &[u8]) -> Vec<u8> {
    let schemas = MidiSchemas::new().unwrap();
    let mut r = ByteReader::new(Cursor::new(bytes.to_vec()), ByteOrder::Big);
    let mut records = vec![
        Record::read(schemas.header(), &mut r).unwrap(),
        Record::read(schemas.track_header(), &mut r).unwrap(),
    ];
    let declared = records[1].int("chunk_size").unwrap() as u64;
    let start = r.position();
    while r.position() - start < declared {
        records.push(Record::read(schemas.event(), &mut r).unwrap());
    }
    let mut w = ByteWriter::new(Vec::new(), ByteOrder::Big);
    for record in &records {
        record.write(&mut w).unwrap();
    }
    assert_eq!(r.position(), w.position());
    w.into_inner()
}

#[test]
fn every_event_kind_round_trips() {
    enable_logging();
    let original = smf(&[
        TRACK_NAME,
        TEMPO_120,
        PROGRAM_FLUTE,
        CONTROL_VOLUME,
        NOTE_ON_C4,
        PITCH_BEND,
        NOTE_OFF_C4,
        END_OF_TRACK,
    ]);
    compare(&original, &round_trip(&original)).unwrap();
}

#[test]
fn byte_lengths_add_up() {
    let original = smf(&[TRACK_NAME, NOTE_ON_C4, PITCH_BEND, END_OF_TRACK]);
    let schemas = MidiSchemas::new().unwrap();
    let mut r = ByteReader::new(Cursor::new(original.clone()), ByteOrder::Big);
    let header = Record::read(schemas.header(), &mut r).unwrap();
    let track_header = Record::read(schemas.track_header(), &mut r).unwrap();
    assert_eq!(14, header.byte_length().unwrap());
    assert_eq!(8, track_header.byte_length().unwrap());
    let mut total = 0;
    for _ in 0..4 {
        total += Record::read(schemas.event(), &mut r)
            .unwrap()
            .byte_length()
            .unwrap();
    }
    assert_eq!(original.len() - 22, total);
}

#[test]
fn padded_delta_time_is_kept() {
    let padded_note_on: &[u8] = &[0x80, 0x00, 0x90, 60, 100];
    let schemas = MidiSchemas::new().unwrap();
    let mut r = ByteReader::new(Cursor::new(padded_note_on.to_vec()), ByteOrder::Big);
    let event = Record::read(schemas.event(), &mut r).unwrap();
    assert_eq!(0, event.int("delta_time").unwrap());
    assert_eq!(5, event.byte_length().unwrap());
    let mut w = ByteWriter::new(Vec::new(), ByteOrder::Big);
    event.write(&mut w).unwrap();
    compare(padded_note_on, &w.into_inner()).unwrap();

    let bytes = smf(&[padded_note_on, NOTE_OFF_C4, END_OF_TRACK]);
    compare(&bytes, &round_trip(&bytes)).unwrap();
}

#[test]
fn stream_primitives() {
    let mut w = ByteWriter::new(Vec::new(), ByteOrder::Big);
    w.write_bytes(b"MTrk").unwrap();
    w.write_primitive(Primitive::U32, 4).unwrap();
    w.write_vlq(VariableLength::encoded(0x60).unwrap()).unwrap();
    w.write_primitive(Primitive::U24, 500_000).unwrap();
    let e = w.write_primitive(Primitive::U8, 300).err().unwrap();
    assert_eq!(ErrorKind::OutOfRange, e.kind());
    assert_eq!(12, w.position());

    let mut r = ByteReader::new(Cursor::new(w.into_inner()), ByteOrder::Big);
    assert_eq!(b"MTrk".to_vec(), r.read_n(4).unwrap());
    assert_eq!(4, r.read_primitive(Primitive::U32).unwrap());
    assert_eq!(0x60, r.read_vlq().unwrap().value());
    assert_eq!(500_000, r.read_primitive(Primitive::U24).unwrap());
    let e = r.read_primitive(Primitive::U8).err().unwrap();
    assert_eq!(ErrorKind::EndOfStream, e.kind());
}
