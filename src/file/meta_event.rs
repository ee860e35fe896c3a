use crate::constants::{
    META_COPYRIGHT, META_CUE_POINT, META_END_OF_TRACK, META_INSTR_NAME, META_LYRIC, META_MARKER,
    META_SET_TEMPO, META_TEXT, META_TRACK_NAME,
};
use crate::error::{LibResult, UnknownMetaEventTypeSnafu};
use crate::file::schemas::{DATA, SUBTYPE};
use crate::schema::Record;
use crate::Text;

/// The meta events this library decodes. Any other subtype fails with `UnknownMetaEventType`.
#[derive(Clone, Debug, Eq, Ord, PartialEq, PartialOrd, Hash)]
pub enum MetaEvent {
    /// `FF 01 len text`: Any amount of text describing anything.
    OtherText(Text),

    /// `FF 02 len text`: A copyright notice as printable ASCII text.
    Copyright(Text),

    /// `FF 03 len text`: If in a format 0 track, or the first track in a format 1 file, the name
    /// of the sequence. Otherwise, the name of the track.
    TrackName(Text),

    /// `FF 04 len text`: A description of the type of instrumentation to be used in that track.
    InstrumentName(Text),

    /// `FF 05 len text`: A lyric to be sung. Generally, each syllable will be a separate lyric
    /// event which begins at the event's time.
    Lyric(Text),

    /// `FF 06 len text`: The name of that point in the sequence, such as a rehearsal letter or
    /// section name ("First Verse", etc.).
    Marker(Text),

    /// `FF 07 len text`: A description of something happening on a film or video screen or stage
    /// at that point in the musical score.
    CuePoint(Text),

    /// `FF 2F 00`: An exact ending point for the track. The length byte is not consulted and no
    /// payload bytes are consumed.
    EndOfTrack,

    /// `FF 51 03 tttttt`: Set Tempo, in microseconds per MIDI quarter-note.
    SetTempo(MicrosecondsPerQuarter),
}

impl Default for MetaEvent {
    fn default() -> Self {
        MetaEvent::EndOfTrack
    }
}

impl MetaEvent {
    /// The subtype byte that follows `FF`.
    pub fn subtype(&self) -> u8 {
        match self {
            MetaEvent::OtherText(_) => META_TEXT,
            MetaEvent::Copyright(_) => META_COPYRIGHT,
            MetaEvent::TrackName(_) => META_TRACK_NAME,
            MetaEvent::InstrumentName(_) => META_INSTR_NAME,
            MetaEvent::Lyric(_) => META_LYRIC,
            MetaEvent::Marker(_) => META_MARKER,
            MetaEvent::CuePoint(_) => META_CUE_POINT,
            MetaEvent::EndOfTrack => META_END_OF_TRACK,
            MetaEvent::SetTempo(_) => META_SET_TEMPO,
        }
    }

    /// The text of the seven text events, `None` for the others.
    pub fn text(&self) -> Option<&Text> {
        match self {
            MetaEvent::OtherText(t)
            | MetaEvent::Copyright(t)
            | MetaEvent::TrackName(t)
            | MetaEvent::InstrumentName(t)
            | MetaEvent::Lyric(t)
            | MetaEvent::Marker(t)
            | MetaEvent::CuePoint(t) => Some(t),
            MetaEvent::EndOfTrack | MetaEvent::SetTempo(_) => None,
        }
    }

    pub(crate) fn from_record(meta: &Record) -> LibResult<Self> {
        let subtype = meta.int(SUBTYPE)? as u8;
        let text = || -> LibResult<Text> { Ok(Text::from(meta.bytes(DATA)?.to_vec())) };
        Ok(match subtype {
            META_TEXT => MetaEvent::OtherText(text()?),
            META_COPYRIGHT => MetaEvent::Copyright(text()?),
            META_TRACK_NAME => MetaEvent::TrackName(text()?),
            META_INSTR_NAME => MetaEvent::InstrumentName(text()?),
            META_LYRIC => MetaEvent::Lyric(text()?),
            META_MARKER => MetaEvent::Marker(text()?),
            META_CUE_POINT => MetaEvent::CuePoint(text()?),
            META_END_OF_TRACK => MetaEvent::EndOfTrack,
            META_SET_TEMPO => {
                MetaEvent::SetTempo(MicrosecondsPerQuarter::new(meta.int(DATA)? as u32))
            }
            _ => {
                return UnknownMetaEventTypeSnafu {
                    site: site!(),
                    subtype,
                }
                .fail()
            }
        })
    }
}

pub(crate) const DEFAULT_MICROSECONDS_PER_QUARTER: u32 = 500_000;
pub(crate) const MAX_24BIT_UINT_VALUE: u32 = 16_777_215;

clamp!(
    /// In MIDI tempos are given as microseconds per quarter note. Tempo microseconds are given by a
    /// 3-byte integer, hence the upper-bound (16,777,215). The default tempo is 120 beats per
    /// minute, which is `500_000` microseconds per beat. The minimum value is `1` since `0`
    /// microseconds per beat would be an infinitely fast tempo.
    MicrosecondsPerQuarter,
    u32,
    1,
    MAX_24BIT_UINT_VALUE,
    DEFAULT_MICROSECONDS_PER_QUARTER,
    pub
);

impl MicrosecondsPerQuarter {
    /// Quarter notes per minute.
    pub fn bpm(&self) -> f64 {
        60_000_000.0 / f64::from(self.get())
    }
}

#[test]
fn tempo_bpm() {
    assert!((MicrosecondsPerQuarter::default().bpm() - 120.0).abs() < f64::EPSILON);
    assert_eq!(1, MicrosecondsPerQuarter::new(0).get());
}

#[test]
fn subtype_of_text_events() {
    let name = MetaEvent::TrackName(Text::from("Bass"));
    assert_eq!(0x03, name.subtype());
    assert_eq!(Some("Bass"), name.text().map(|t| t.as_str().into_owned()).as_deref());
    assert_eq!(None, MetaEvent::EndOfTrack.text());
}
