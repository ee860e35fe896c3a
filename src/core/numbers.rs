clamp!(
    /// Represents the MIDI channel, the low nibble of a status byte. The minimum value is `0`, the
    /// maximum value is `15`. This type will clamp values to the valid range.
    Channel,
    u8,
    0,
    15,
    0,
    pub
);

clamp!(
    /// Represents the MIDI note number (`C4` is `60`, for example). The minimum value is `0`,
    /// the maximum value is `127` (i.e. `u7`). This type will clamp values to the valid range.
    NoteNumber,
    u8,
    0,
    127,
    60,
    pub
);

clamp!(
    /// Represents the MIDI velocity. The minimum value is `0`, the maximum value is `127` (i.e.
    /// `u7`). This type will clamp values to the valid range.
    Velocity,
    u8,
    0,
    127,
    72,
    pub
);

clamp!(
    /// Represents the MIDI program (instrument) number. The minimum value is `0`, the maximum
    /// value is `127` (i.e. `u7`). This type will clamp values to the valid range.
    Program,
    u8,
    0,
    127,
    0,
    pub
);

#[test]
fn numbers_clamp() {
    assert_eq!(15, Channel::new(0x1f).get());
    assert_eq!(127, NoteNumber::new(200).get());
    assert_eq!(72, Velocity::default().get());
    assert_eq!(0, Program::default().get());
}
