//! The `file` module decodes Standard MIDI Files. The chunk and event layouts are declared as
//! schemas in [`MidiSchemas`], and [`Decoder`] walks them through the header, the track header and
//! the track's events.

mod division;
mod event;
mod header;
mod meta_event;
mod schemas;
mod track;

pub use division::{Division, TicksPerQuarter};
pub use event::{Parameters, TrackEvent};
pub use header::{Format, Header};
pub use meta_event::{MetaEvent, MicrosecondsPerQuarter};
pub use schemas::MidiSchemas;
pub use track::{decode_track, load, DecodeState, Decoder, SmfTrack};
