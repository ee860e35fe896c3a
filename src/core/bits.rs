/*!

This module is for pulling bit-packed values out of a wider integer.

!*/

/// A non-zero mask selecting a group of bits. The value under the mask is shifted down by the
/// number of trailing zeros in the mask, so `0xF0` over `0x95` yields `0x9`.
#[derive(Clone, Copy, Debug, Eq, Ord, PartialEq, PartialOrd, Hash)]
pub struct BitMask {
    mask: u32,
    shift: u32,
}

impl BitMask {
    /// Returns `None` when `mask` is zero since there would be nothing to extract.
    pub const fn new(mask: u32) -> Option<Self> {
        if mask == 0 {
            return None;
        }
        Some(Self {
            mask,
            shift: mask.trailing_zeros(),
        })
    }

    pub const fn mask(&self) -> u32 {
        self.mask
    }

    pub const fn shift(&self) -> u32 {
        self.shift
    }

    #[inline]
    pub const fn extract(&self, container: u32) -> u32 {
        (container & self.mask) >> self.shift
    }
}

/// The four-bit high nibble of a status byte, i.e. the event type.
pub(crate) const HIGH_NIBBLE: u32 = 0xF0;

/// The four-bit low nibble of a status byte, i.e. the channel.
pub(crate) const LOW_NIBBLE: u32 = 0x0F;
