//! Byte values defined by the Standard MIDI File format.

/// The identifier that opens the header chunk.
pub(crate) const HEADER_CHUNK_ID: &str = "MThd";

/// The identifier that opens every track chunk.
pub(crate) const TRACK_CHUNK_ID: &str = "MTrk";

/// The header chunk's declared size is always 6.
pub(crate) const HEADER_CHUNK_SIZE: i64 = 6;

/// When bit 15 of the time division is set, the remaining bits describe SMPTE frames rather than
/// ticks per quarter note.
pub(crate) const DIVISION_SMPTE_BIT: u16 = 0b1000_0000_0000_0000;

/// `FF 01 len text`
pub(crate) const META_TEXT: u8 = 0x01;
/// `FF 02 len text`
pub(crate) const META_COPYRIGHT: u8 = 0x02;
/// `FF 03 len text`
pub(crate) const META_TRACK_NAME: u8 = 0x03;
/// `FF 04 len text`
pub(crate) const META_INSTR_NAME: u8 = 0x04;
/// `FF 05 len text`
pub(crate) const META_LYRIC: u8 = 0x05;
/// `FF 06 len text`
pub(crate) const META_MARKER: u8 = 0x06;
/// `FF 07 len text`
pub(crate) const META_CUE_POINT: u8 = 0x07;
/// `FF 2F 00`
pub(crate) const META_END_OF_TRACK: u8 = 0x2f;
/// `FF 51 03 tttttt`
pub(crate) const META_SET_TEMPO: u8 = 0x51;
