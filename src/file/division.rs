use crate::constants::DIVISION_SMPTE_BIT;
use crate::error::{LibResult, UnsupportedTimeDivisionSnafu};
use crate::Error;
use log::warn;
use std::convert::TryFrom;

clamp!(
    /// The number of delta-time ticks in a quarter note. It is a positive `u15` and thus has the
    /// range 1 to 32,767. The default value is 96.
    TicksPerQuarter,
    u16,
    1,
    0x7FFF,
    96,
    pub
);

/// Specifies the meaning of delta-times. Only metrical time is supported, a header that asks for
/// SMPTE time-code fails to decode.
#[derive(Clone, Copy, Debug, Eq, Ord, PartialEq, PartialOrd, Hash)]
pub enum Division {
    /// Bit 15 is zero and bits 14 thru 0 are the number of ticks in a quarter note. If the division
    /// is 96, an eighth note between two events is a delta-time of 48.
    QuarterNote(TicksPerQuarter),
}

impl Default for Division {
    fn default() -> Self {
        Division::QuarterNote(TicksPerQuarter::default())
    }
}

impl Division {
    pub(crate) fn from_u16(value: u16) -> LibResult<Self> {
        if value & DIVISION_SMPTE_BIT == DIVISION_SMPTE_BIT {
            return UnsupportedTimeDivisionSnafu {
                site: site!(),
                division: value,
            }
            .fail();
        }
        let mut ticks = TicksPerQuarter::default();
        if !ticks.set(value) {
            warn!("time division {} is out of range, using {}", value, ticks);
        }
        Ok(Division::QuarterNote(ticks))
    }

    pub fn ticks_per_quarter(&self) -> TicksPerQuarter {
        match self {
            Division::QuarterNote(ticks) => *ticks,
        }
    }
}

impl TryFrom<u16> for Division {
    type Error = Error;

    fn try_from(value: u16) -> crate::Result<Self> {
        Ok(Division::from_u16(value)?)
    }
}

#[test]
fn smpte_division_is_rejected() {
    let e = Division::try_from(0x8001).err().unwrap();
    assert_eq!(crate::ErrorKind::UnsupportedTimeDivision, e.kind());
    let e = Division::try_from(0xE250).err().unwrap();
    assert_eq!(crate::ErrorKind::UnsupportedTimeDivision, e.kind());
}

#[test]
fn ticks_per_quarter() {
    let division = Division::try_from(96).unwrap();
    assert_eq!(96, division.ticks_per_quarter().get());
    let division = Division::try_from(0).unwrap();
    assert_eq!(TicksPerQuarter::MIN, division.ticks_per_quarter().get());
}
