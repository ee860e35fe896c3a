#![allow(dead_code)]

use log::LevelFilter;
use std::io::Write;
use std::sync::Once;

static LOGGER: Once = Once::new();

pub fn enable_logging() {
    LOGGER.call_once(logger_init)
}

fn logger_init() {
    env_logger::Builder::new()
        .format(|buf, record| {
            writeln!(
                buf,
                "{}:{} {} [{}] - {}",
                record.file().unwrap_or("unknown"),
                record.line().unwrap_or(0),
                chrono::Local::now().format("%Y-%m-%dT%H:%M:%S"),
                record.level(),
                record.args()
            )
        })
        .filter(None, LevelFilter::Trace)
        .is_test(true)
        .init();
}

pub const TICKS_PER_QUARTER: u16 = 96;

pub const NOTE_ON_C4: &[u8] = &[0x00, 0x90, 60, 100];
pub const NOTE_OFF_C4: &[u8] = &[0x60, 0x80, 60, 0];
pub const END_OF_TRACK: &[u8] = &[0x00, 0xFF, 0x2F, 0x00];
pub const TRACK_NAME: &[u8] = &[0x00, 0xFF, 0x03, 0x04, b'L', b'e', b'a', b'd'];
pub const TEMPO_120: &[u8] = &[0x00, 0xFF, 0x51, 0x03, 0x07, 0xA1, 0x20];
pub const PROGRAM_FLUTE: &[u8] = &[0x00, 0xC1, 73];
pub const CONTROL_VOLUME: &[u8] = &[0x00, 0xB1, 0x07, 0x64];
pub const PITCH_BEND: &[u8] = &[0x81, 0x00, 0xE1, 0x00, 0x50];

/// An `MThd` chunk.
pub fn header(format: u16, track_count: u16, division: u16) -> Vec<u8> {
    let mut bytes = b"MThd".to_vec();
    bytes.extend_from_slice(&6u32.to_be_bytes());
    bytes.extend_from_slice(&format.to_be_bytes());
    bytes.extend_from_slice(&track_count.to_be_bytes());
    bytes.extend_from_slice(&division.to_be_bytes());
    bytes
}

/// An `MTrk` chunk declaring `declared` bytes.
pub fn track_with_size(events: &[&[u8]], declared: u32) -> Vec<u8> {
    let mut bytes = b"MTrk".to_vec();
    bytes.extend_from_slice(&declared.to_be_bytes());
    for event in events {
        bytes.extend_from_slice(event);
    }
    bytes
}

/// An `MTrk` chunk whose declared size is correct.
pub fn track(events: &[&[u8]]) -> Vec<u8> {
    let size: usize = events.iter().map(|e| e.len()).sum();
    track_with_size(events, size as u32)
}

/// A format 0 file holding one track.
pub fn smf(events: &[&[u8]]) -> Vec<u8> {
    let mut bytes = header(0, 1, TICKS_PER_QUARTER);
    bytes.extend(track(events));
    bytes
}
