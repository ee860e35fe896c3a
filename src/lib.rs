/*!
`midi_blocks` describes binary records as ordered lists of named fields and decodes them from (or
encodes them to) byte streams. Fields can be fixed-width integers, fixed strings, variable-length
quantities, bit fields that alias an earlier integer, arrays, nested records whose schema depends
on an earlier value, and payloads whose shape is picked from a table.

The [`file`] module applies this to Standard MIDI Files: it decodes the header chunk and the first
track chunk into [`file::TrackEvent`]s, checking the declared chunk size against the bytes the
events actually occupy. The [`sink`] module forwards the decoded notes to anything that implements
[`sink::NoteSink`].

```
use midi_blocks::core::EventType;

let bytes: Vec<u8> = vec![
    b'M', b'T', b'h', b'd', 0, 0, 0, 6, 0, 0, 0, 1, 0, 96,
    b'M', b'T', b'r', b'k', 0, 0, 0, 12,
    0x00, 0x90, 60, 100,
    0x60, 0x80, 60, 0,
    0x00, 0xFF, 0x2F, 0x00,
];
let events = midi_blocks::decode_track(bytes.as_slice()).unwrap();
assert_eq!(3, events.len());
assert_eq!(EventType::NoteOff, events[1].event_type());
assert_eq!(96, events[1].delta_time());
assert!(events[2].is_end());
```
!*/

#[macro_use]
mod error;
#[macro_use]
mod macros;

mod constants;
pub mod core;
pub mod file;
pub mod schema;
pub mod sink;
pub mod stream;
mod text;

pub use error::{Error, ErrorKind, Result};
pub use file::{decode_track, load, Decoder, SmfTrack};
pub use text::Text;
