use crate::error::LibResult;
use std::convert::TryFrom;

/// `0x8`: The bits that represent a `Note Off` message.
pub(crate) const STATUS_NOTE_OFF: u8 = 0b1000;

/// `0x9`: The bits that represent a `Note On` message.
pub(crate) const STATUS_NOTE_ON: u8 = 0b1001;

/// `0xA`: The bits that represent a `Polyphonic key pressure/Aftertouch` message.
pub(crate) const STATUS_POLY_PRESSURE: u8 = 0b1010;

/// `0xB`: The bits that represent a `Control change` message or a `Channel Mode` message.
pub(crate) const STATUS_CONTROL: u8 = 0b1011;

/// `0xC`: The bits that represent a `Program change` message.
pub(crate) const STATUS_PROGRAM: u8 = 0b1100;

/// `0xD`: The bits that represent a `Channel pressure/After touch` message.
pub(crate) const STATUS_CHANNEL_PRESSURE: u8 = 0b1101;

/// `0xE`: The bits that represent a `Pitch bend change` message.
pub(crate) const STATUS_PITCH_BEND: u8 = 0b1110;

/// `0xF`: The bits that represent a system message. In a file, `0xFF` begins a meta event.
pub(crate) const STATUS_META: u8 = 0b1111;

/// The high nibble of a track event's status byte.
#[repr(u8)]
#[derive(Clone, Copy, Debug, Eq, Ord, PartialEq, PartialOrd, Hash)]
pub enum EventType {
    /// `0x8`: a `Note Off` message.
    NoteOff = STATUS_NOTE_OFF,

    /// `0x9`: a `Note On` message.
    NoteOn = STATUS_NOTE_ON,

    /// `0xA`: a `Polyphonic key pressure/Aftertouch` message.
    PolyPressure = STATUS_POLY_PRESSURE,

    /// `0xB`: a `Control change` message or a `Channel Mode` message. Channel Mode messages are
    /// sent under the same Status Byte as the Control Change messages (BnH). They are
    /// differentiated by the first data byte which will have a value from 121 to 127 for Channel
    /// Mode messages.
    Control = STATUS_CONTROL,

    /// `0xC`: a `Program change` message.
    Program = STATUS_PROGRAM,

    /// `0xD`: a `Channel pressure/After touch` message.
    ChannelPressure = STATUS_CHANNEL_PRESSURE,

    /// `0xE`: a `Pitch bend change` message.
    PitchBend = STATUS_PITCH_BEND,

    /// `0xF`: a meta event.
    Meta = STATUS_META,
}

impl Default for EventType {
    fn default() -> Self {
        EventType::NoteOff
    }
}

impl EventType {
    pub(crate) fn from_u8(value: u8) -> LibResult<Self> {
        match value {
            STATUS_NOTE_OFF => Ok(EventType::NoteOff),
            STATUS_NOTE_ON => Ok(EventType::NoteOn),
            STATUS_POLY_PRESSURE => Ok(EventType::PolyPressure),
            STATUS_CONTROL => Ok(EventType::Control),
            STATUS_PROGRAM => Ok(EventType::Program),
            STATUS_CHANNEL_PRESSURE => Ok(EventType::ChannelPressure),
            STATUS_PITCH_BEND => Ok(EventType::PitchBend),
            STATUS_META => Ok(EventType::Meta),
            _ => invalid_file!("unrecognized event type {:#03X}", value),
        }
    }

    pub fn to_u8(&self) -> u8 {
        *self as u8
    }
}

impl TryFrom<u8> for EventType {
    type Error = crate::Error;

    fn try_from(value: u8) -> crate::Result<Self> {
        Ok(EventType::from_u8(value)?)
    }
}

#[test]
fn event_type_from_nibble() {
    assert_eq!(EventType::NoteOn, EventType::try_from(0x9).unwrap());
    assert_eq!(EventType::Meta, EventType::try_from(0xF).unwrap());
    assert_eq!(0xC, EventType::Program.to_u8());
    assert!(EventType::try_from(0x7).is_err());
}
