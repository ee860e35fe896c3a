use crate::core::{Channel, EventType, NoteNumber, Program, Velocity};
use crate::error::LibResult;
use crate::file::schemas::{CHANNEL, DELTA_TIME, EVENT_TYPE, NOTE, PARAMETERS, PROGRAM, VELOCITY};
use crate::file::MetaEvent;
use crate::schema::{Record, Value};
use log::trace;

/// The parameters that follow a status byte, interpreted according to its event type.
#[derive(Clone, Debug, Eq, Ord, PartialEq, PartialOrd, Hash)]
pub enum Parameters {
    /// Note-on and note-off.
    Note {
        note: NoteNumber,
        velocity: Velocity,
    },
    /// Program change.
    Program(Program),
    /// A meta event.
    Meta(MetaEvent),
    /// The raw parameter bytes of the remaining channel messages: polyphonic pressure, control
    /// change, channel pressure and pitch bend.
    Other(Vec<u8>),
}

impl Default for Parameters {
    fn default() -> Self {
        Parameters::Other(Vec::new())
    }
}

/// `<MTrk event> = <delta-time> <event>`
#[derive(Clone, Debug, Default, Eq, Ord, PartialEq, PartialOrd, Hash)]
pub struct TrackEvent {
    /// Ticks since the previous event, as specified by the header's time division.
    delta_time: u32,
    event_type: EventType,
    channel: Channel,
    parameters: Parameters,
}

impl TrackEvent {
    pub fn new(
        delta_time: u32,
        event_type: EventType,
        channel: Channel,
        parameters: Parameters,
    ) -> Self {
        Self {
            delta_time,
            event_type,
            channel,
            parameters,
        }
    }

    pub fn delta_time(&self) -> u32 {
        self.delta_time
    }

    pub fn event_type(&self) -> EventType {
        self.event_type
    }

    /// The low nibble of the status byte. For meta events it carries no meaning.
    pub fn channel(&self) -> Channel {
        self.channel
    }

    pub fn parameters(&self) -> &Parameters {
        &self.parameters
    }

    /// The meta event, if this is one.
    pub fn meta(&self) -> Option<&MetaEvent> {
        match &self.parameters {
            Parameters::Meta(meta) => Some(meta),
            _ => None,
        }
    }

    /// Returns true if the track event is a [`MetaEvent::EndOfTrack`].
    pub fn is_end(&self) -> bool {
        matches!(self.meta(), Some(MetaEvent::EndOfTrack))
    }

    /// Interprets a record decoded with the event schema.
    pub(crate) fn from_record(record: &Record) -> LibResult<Self> {
        let delta_time = record.int(DELTA_TIME)? as u32;
        let event_type = EventType::from_u8(record.int(EVENT_TYPE)? as u8)?;
        let channel = Channel::new(record.int(CHANNEL)? as u8);
        let params = record.record(PARAMETERS)?;
        let parameters = match event_type {
            EventType::NoteOn | EventType::NoteOff => Parameters::Note {
                note: NoteNumber::new(params.int(NOTE)? as u8),
                velocity: Velocity::new(params.int(VELOCITY)? as u8),
            },
            EventType::Program => Parameters::Program(Program::new(params.int(PROGRAM)? as u8)),
            EventType::Meta => Parameters::Meta(MetaEvent::from_record(params)?),
            EventType::PolyPressure
            | EventType::Control
            | EventType::ChannelPressure
            | EventType::PitchBend => Parameters::Other(
                params
                    .values()
                    .iter()
                    .filter_map(Value::as_int)
                    .map(|i| i as u8)
                    .collect(),
            ),
        };
        trace!(
            "{:?} on channel {} after {} ticks: {:?}",
            event_type,
            channel,
            delta_time,
            parameters
        );
        Ok(Self {
            delta_time,
            event_type,
            channel,
            parameters,
        })
    }
}
