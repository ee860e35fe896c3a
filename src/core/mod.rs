/*!
The `core` module is for types and concepts that are *not* strictly related to MIDI *files*:
numeric MIDI values, the variable-length quantity codec and bit-field extraction.
!*/

pub mod bits;
mod event_type;
mod numbers;
pub mod vlq;

pub(crate) use event_type::{
    STATUS_CHANNEL_PRESSURE, STATUS_CONTROL, STATUS_META, STATUS_NOTE_OFF, STATUS_NOTE_ON,
    STATUS_PITCH_BEND, STATUS_POLY_PRESSURE, STATUS_PROGRAM,
};
pub use event_type::EventType;
pub use numbers::{Channel, NoteNumber, Program, Velocity};
