/*!
The `sink` module forwards decoded notes to an output device. The device itself, and whatever
wire protocol it speaks, lives behind the [`NoteSink`] trait.
!*/

use crate::core::{Channel, EventType};
use crate::file::{Parameters, TicksPerQuarter, TrackEvent};
use log::{debug, trace};

/// Something that can sound or silence a note. A positive `note` means note-on and a negated
/// `note` means note-off.
pub trait NoteSink {
    fn send(&mut self, channel: u8, note: i16, velocity: u8) -> crate::Result<()>;
}

impl<T: NoteSink + ?Sized> NoteSink for &mut T {
    fn send(&mut self, channel: u8, note: i16, velocity: u8) -> crate::Result<()> {
        (**self).send(channel, note, velocity)
    }
}

/// A track event at its absolute position in ticks from the start of the track.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub struct TimedEvent<'a> {
    tick: u64,
    event: &'a TrackEvent,
}

impl<'a> TimedEvent<'a> {
    pub fn tick(&self) -> u64 {
        self.tick
    }

    pub fn event(&self) -> &'a TrackEvent {
        self.event
    }

    /// The position in quarter notes.
    pub fn beats(&self, ticks_per_quarter: TicksPerQuarter) -> f64 {
        self.tick as f64 / f64::from(ticks_per_quarter.get())
    }
}

/// Accumulates delta-times into absolute ticks.
pub fn timeline(events: &[TrackEvent]) -> impl Iterator<Item = TimedEvent<'_>> {
    events.iter().scan(0u64, |tick, event| {
        *tick += u64::from(event.delta_time());
        Some(TimedEvent { tick: *tick, event })
    })
}

/// Options for a [`Playback`] session.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub struct PlaybackSettings {
    /// The device channel for each MIDI channel. Events on a channel mapped to `None` are not
    /// forwarded.
    pub channel_map: [Option<u8>; 16],
}

impl Default for PlaybackSettings {
    /// Every MIDI channel goes to the device channel with the same number.
    fn default() -> Self {
        let mut channel_map = [None; 16];
        for (i, device) in channel_map.iter_mut().enumerate() {
            *device = Some(i as u8);
        }
        Self { channel_map }
    }
}

impl PlaybackSettings {
    /// Forwards nothing except `channel`, which goes to `device`.
    pub fn only(channel: Channel, device: u8) -> Self {
        let mut channel_map = [None; 16];
        channel_map[usize::from(channel.get())] = Some(device);
        Self { channel_map }
    }

    pub fn device_channel(&self, channel: Channel) -> Option<u8> {
        self.channel_map[usize::from(channel.get())]
    }
}

/// One decode-and-forward session. It borrows the sink for its lifetime, so a connection is never
/// shared between sessions.
pub struct Playback<'a, S: NoteSink> {
    sink: &'a mut S,
    settings: PlaybackSettings,
    sent: usize,
}

impl<'a, S: NoteSink> Playback<'a, S> {
    pub fn new(sink: &'a mut S, settings: PlaybackSettings) -> Self {
        Self {
            sink,
            settings,
            sent: 0,
        }
    }

    pub fn settings(&self) -> &PlaybackSettings {
        &self.settings
    }

    /// Total messages sent in this session.
    pub fn sent(&self) -> usize {
        self.sent
    }

    /// Sends every note-on and note-off in `events`, in order, and returns how many messages were
    /// sent. Other events are skipped. The first sink error stops forwarding, messages delivered
    /// before it still count towards [`Playback::sent`].
    ///
    /// Note-on is sent regardless of velocity, so a note-on with velocity 0 is not turned into a
    /// note-off.
    pub fn forward(&mut self, events: &[TrackEvent]) -> crate::Result<usize> {
        let mut count = 0;
        for event in events {
            let (note, velocity) = match event.parameters() {
                Parameters::Note { note, velocity } => (i16::from(note.get()), velocity.get()),
                _ => continue,
            };
            let note = match event.event_type() {
                EventType::NoteOn => note,
                EventType::NoteOff => -note,
                _ => continue,
            };
            let device = match self.settings.device_channel(event.channel()) {
                Some(device) => device,
                None => {
                    trace!("channel {} is not mapped", event.channel());
                    continue;
                }
            };
            self.sink.send(device, note, velocity)?;
            self.sent += 1;
            count += 1;
        }
        debug!("forwarded {} note messages", count);
        Ok(count)
    }
}
