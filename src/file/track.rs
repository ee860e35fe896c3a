use crate::constants::TRACK_CHUNK_ID;
use crate::error::{LibResult, SizeMismatchSnafu};
use crate::file::schemas::{check_chunk_id, MidiSchemas, CHUNK_SIZE};
use crate::file::{Header, TrackEvent};
use crate::schema::Record;
use crate::stream::{ByteOrder, ByteReader};
use log::{debug, trace};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

/// Where a [`Decoder`] is in the file.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum DecodeState {
    ExpectHeader,
    ExpectTrackHeader,
    /// `consumed` is the sum of the byte lengths of the events decoded so far, and `declared` is
    /// the size given in the track header.
    DecodingEvents { declared: u32, consumed: u64 },
    Done,
    /// A transition failed. Nothing more can be decoded.
    Failed,
}

/// The header of a Standard MIDI File and the events of its first track.
#[derive(Clone, Debug, Default, Eq, PartialEq, Hash)]
pub struct SmfTrack {
    header: Header,
    events: Vec<TrackEvent>,
}

impl SmfTrack {
    pub fn header(&self) -> &Header {
        &self.header
    }

    pub fn events(&self) -> &[TrackEvent] {
        &self.events
    }

    pub fn into_events(self) -> Vec<TrackEvent> {
        self.events
    }
}

/// Decodes the header chunk and the first track chunk of a Standard MIDI File. Decoding fails
/// closed: the first error ends the session and no events are returned.
pub struct Decoder<R: Read> {
    reader: ByteReader<R>,
    state: DecodeState,
    header: Option<Header>,
    events: Vec<TrackEvent>,
    /// Stream position where the first event begins.
    events_start: u64,
}

impl<R: Read> Decoder<R> {
    /// A decoder reading big-endian data from `inner`.
    pub fn new(inner: R) -> Self {
        Self::with_reader(ByteReader::new(inner, ByteOrder::Big))
    }

    pub fn with_reader(reader: ByteReader<R>) -> Self {
        Self {
            reader,
            state: DecodeState::ExpectHeader,
            header: None,
            events: Vec::new(),
            events_start: 0,
        }
    }

    pub fn state(&self) -> DecodeState {
        self.state
    }

    /// Runs the state machine to `Done`. The decoder, and with it the stream, is dropped whether
    /// or not decoding succeeds.
    pub fn decode(mut self) -> crate::Result<SmfTrack> {
        Ok(self.run()?)
    }

    fn run(&mut self) -> LibResult<SmfTrack> {
        let schemas = MidiSchemas::build()?;
        while self.state != DecodeState::Done {
            self.advance(&schemas)?;
        }
        let header = match self.header.take() {
            Some(header) => header,
            None => invalid_file!("decoding finished without a header"),
        };
        Ok(SmfTrack {
            header,
            events: std::mem::take(&mut self.events),
        })
    }

    /// Performs one transition. On error the decoder moves to `Failed`.
    pub(crate) fn advance(&mut self, schemas: &MidiSchemas) -> LibResult<()> {
        match self.step(schemas) {
            Ok(next) => {
                if next != self.state {
                    trace!("{:?} -> {:?}", self.state, next);
                }
                self.state = next;
                Ok(())
            }
            Err(e) => {
                debug!("decoding failed in {:?}: {}", self.state, e);
                self.state = DecodeState::Failed;
                Err(e)
            }
        }
    }

    fn step(&mut self, schemas: &MidiSchemas) -> LibResult<DecodeState> {
        match self.state {
            DecodeState::ExpectHeader => {
                let record = Record::parse(schemas.header(), &mut self.reader)?;
                let header = Header::from_record(&record)?;
                debug!("{:?}", header);
                self.header = Some(header);
                Ok(DecodeState::ExpectTrackHeader)
            }
            DecodeState::ExpectTrackHeader => {
                let record = Record::parse(schemas.track_header(), &mut self.reader)?;
                check_chunk_id(&record, TRACK_CHUNK_ID)?;
                let declared = record.int(CHUNK_SIZE)? as u32;
                debug!("track chunk declares {} bytes", declared);
                self.events_start = self.reader.position();
                if declared == 0 {
                    return Ok(DecodeState::Done);
                }
                Ok(DecodeState::DecodingEvents {
                    declared,
                    consumed: 0,
                })
            }
            DecodeState::DecodingEvents { declared, consumed } => {
                let record = Record::parse(schemas.event(), &mut self.reader)?;
                let consumed = consumed + record.length()? as u64;
                debug_assert_eq!(consumed, self.reader.position() - self.events_start);
                self.events.push(TrackEvent::from_record(&record)?);
                let declared_bytes = u64::from(declared);
                if consumed > declared_bytes {
                    SizeMismatchSnafu {
                        site: site!(),
                        declared,
                        consumed,
                    }
                    .fail()
                } else if consumed == declared_bytes {
                    debug!("decoded {} events", self.events.len());
                    Ok(DecodeState::Done)
                } else {
                    Ok(DecodeState::DecodingEvents { declared, consumed })
                }
            }
            DecodeState::Done => Ok(DecodeState::Done),
            DecodeState::Failed => invalid_file!("the decoder has already failed"),
        }
    }
}

/// Decodes the events of the first track of the Standard MIDI File in `inner`.
pub fn decode_track<R: Read>(inner: R) -> crate::Result<Vec<TrackEvent>> {
    Ok(Decoder::new(inner).decode()?.into_events())
}

/// Opens the file at `path` and decodes its header and first track.
pub fn load<P: AsRef<Path>>(path: P) -> crate::Result<SmfTrack> {
    let reader: ByteReader<BufReader<File>> = ByteReader::open(path)?;
    Decoder::with_reader(reader).decode()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::EventType;
    use crate::file::{MetaEvent, Parameters};
    use crate::ErrorKind;
    use std::io::Cursor;

    const HEADER: &[u8] = b"MThd\0\0\0\x06\0\0\0\x01\0\x60";

    fn file(track: &[u8], declared: u32) -> Vec<u8> {
        let mut bytes = HEADER.to_vec();
        bytes.extend_from_slice(b"MTrk");
        bytes.extend_from_slice(&declared.to_be_bytes());
        bytes.extend_from_slice(track);
        bytes
    }

    const SCENARIO: &[u8] = &[
        0x00, 0x90, 60, 100, // note on
        0x60, 0x80, 60, 0, // note off after 96 ticks
        0x00, 0xFF, 0x2F, 0x00, // end of track
    ];

    #[test]
    fn scenario() {
        let events = decode_track(Cursor::new(file(SCENARIO, 12))).unwrap();
        let deltas: Vec<u32> = events.iter().map(|e| e.delta_time()).collect();
        assert_eq!(vec![0, 96, 0], deltas);
        let types: Vec<EventType> = events.iter().map(|e| e.event_type()).collect();
        assert_eq!(
            vec![EventType::NoteOn, EventType::NoteOff, EventType::Meta],
            types
        );
        assert_eq!(
            &Parameters::Meta(MetaEvent::EndOfTrack),
            events[2].parameters()
        );
    }

    #[test]
    fn states_in_order() {
        let schemas = MidiSchemas::build().unwrap();
        let mut decoder = Decoder::new(Cursor::new(file(SCENARIO, 12)));
        assert_eq!(DecodeState::ExpectHeader, decoder.state());
        decoder.advance(&schemas).unwrap();
        assert_eq!(DecodeState::ExpectTrackHeader, decoder.state());
        decoder.advance(&schemas).unwrap();
        assert_eq!(
            DecodeState::DecodingEvents {
                declared: 12,
                consumed: 0
            },
            decoder.state()
        );
        decoder.advance(&schemas).unwrap();
        assert_eq!(
            DecodeState::DecodingEvents {
                declared: 12,
                consumed: 4
            },
            decoder.state()
        );
        decoder.advance(&schemas).unwrap();
        decoder.advance(&schemas).unwrap();
        assert_eq!(DecodeState::Done, decoder.state());
        decoder.advance(&schemas).unwrap();
        assert_eq!(DecodeState::Done, decoder.state());
    }

    #[test]
    fn failed_is_absorbing() {
        let schemas = MidiSchemas::build().unwrap();
        let mut decoder = Decoder::new(Cursor::new(b"RIFF".to_vec()));
        assert!(decoder.advance(&schemas).is_err());
        assert_eq!(DecodeState::Failed, decoder.state());
        assert!(decoder.advance(&schemas).is_err());
        assert_eq!(DecodeState::Failed, decoder.state());
    }

    #[test]
    fn size_mismatch_on_last_event() {
        // 4 + 4 + 3 bytes of events against a declared size of 10
        let track = [0x00, 0x90, 60, 100, 0x00, 0x80, 60, 0, 0x00, 0xC0, 0x01];
        let e = decode_track(Cursor::new(file(&track, 10))).err().unwrap();
        assert_eq!(ErrorKind::SizeMismatch, e.kind());
    }

    #[test]
    fn smpte_header() {
        let mut bytes = file(SCENARIO, 12);
        bytes[12] = 0x80;
        bytes[13] = 0x01;
        let e = decode_track(Cursor::new(bytes)).err().unwrap();
        assert_eq!(ErrorKind::UnsupportedTimeDivision, e.kind());
    }

    #[test]
    fn bad_track_chunk_id() {
        let mut bytes = file(SCENARIO, 12);
        bytes[17] = b'X';
        let e = decode_track(Cursor::new(bytes)).err().unwrap();
        assert_eq!(ErrorKind::BadChunkId, e.kind());
    }

    #[test]
    fn truncated_track() {
        let bytes = file(&SCENARIO[..6], 12);
        let e = decode_track(Cursor::new(bytes)).err().unwrap();
        assert_eq!(ErrorKind::EndOfStream, e.kind());
    }

    #[test]
    fn empty_track() {
        let track = Decoder::new(Cursor::new(file(&[], 0))).decode().unwrap();
        assert!(track.events().is_empty());
        assert_eq!(1, track.header().track_count());
    }

    #[test]
    fn unknown_meta_event() {
        let e = decode_track(Cursor::new(file(&[0x00, 0xFF, 99, 0x00], 4)))
            .err()
            .unwrap();
        assert_eq!(ErrorKind::UnknownMetaEventType(99), e.kind());
    }
}
