//! Seven-segment patterns for the four-digit depth gauge.

/// Segment bits in TM1637 order.
pub const SEG_A: u8 = 0b0000_0001;
pub const SEG_B: u8 = 0b0000_0010;
pub const SEG_C: u8 = 0b0000_0100;
pub const SEG_D: u8 = 0b0000_1000;
pub const SEG_E: u8 = 0b0001_0000;
pub const SEG_F: u8 = 0b0010_0000;
pub const SEG_G: u8 = 0b0100_0000;
/// Decimal point; on the second digit this drives the centre colon.
pub const SEG_DP: u8 = 0b1000_0000;

/// Number of digits on the gauge.
pub const DIGITS: usize = 4;

/// Smallest value that fits with a leading minus sign.
pub const MIN_DISPLAY: i32 = -999;
/// Largest value that fits in four digits.
pub const MAX_DISPLAY: i32 = 9999;

const DIGIT_SEGMENTS: [u8; 10] = [
    SEG_A | SEG_B | SEG_C | SEG_D | SEG_E | SEG_F,
    SEG_B | SEG_C,
    SEG_A | SEG_B | SEG_D | SEG_E | SEG_G,
    SEG_A | SEG_B | SEG_C | SEG_D | SEG_G,
    SEG_B | SEG_C | SEG_F | SEG_G,
    SEG_A | SEG_C | SEG_D | SEG_F | SEG_G,
    SEG_A | SEG_C | SEG_D | SEG_E | SEG_F | SEG_G,
    SEG_A | SEG_B | SEG_C,
    SEG_A | SEG_B | SEG_C | SEG_D | SEG_E | SEG_F | SEG_G,
    SEG_A | SEG_B | SEG_C | SEG_D | SEG_F | SEG_G,
];

/// Raw segment bits for the four digits, left to right.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct GlyphPattern(pub [u8; DIGITS]);

impl GlyphPattern {
    pub const BLANK: GlyphPattern = GlyphPattern([0; DIGITS]);

    /// `dOnE`, shown once the lander reaches the surface.
    pub const DONE: GlyphPattern = GlyphPattern([
        SEG_B | SEG_C | SEG_D | SEG_E | SEG_G,
        SEG_A | SEG_B | SEG_C | SEG_D | SEG_E | SEG_F,
        SEG_C | SEG_E | SEG_G,
        SEG_A | SEG_D | SEG_E | SEG_F | SEG_G,
    ]);

    /// `nOPE`, shown when the mission configuration is rejected.
    pub const NOPE: GlyphPattern = GlyphPattern([
        SEG_C | SEG_E | SEG_G,
        SEG_A | SEG_B | SEG_C | SEG_D | SEG_E | SEG_F,
        SEG_A | SEG_B | SEG_E | SEG_F | SEG_G,
        SEG_A | SEG_D | SEG_E | SEG_F | SEG_G,
    ]);

    /// `----`, shown for numbers the gauge cannot represent.
    pub const OVERFLOW: GlyphPattern = GlyphPattern([SEG_G; DIGITS]);

    #[must_use]
    pub const fn segments(&self) -> [u8; DIGITS] {
        self.0
    }

    /// Name of a well-known status word, if this is one.
    #[must_use]
    pub fn word(&self) -> Option<&'static str> {
        const WORDS: [(GlyphPattern, &str); 4] = [
            (GlyphPattern::DONE, "dOnE"),
            (GlyphPattern::NOPE, "nOPE"),
            (GlyphPattern::OVERFLOW, "----"),
            (GlyphPattern::BLANK, "    "),
        ];
        WORDS
            .iter()
            .find(|(pattern, _)| pattern == self)
            .map(|(_, word)| *word)
    }
}

/// Encodes `value` right-aligned without leading zeros, with a minus sign
/// directly ahead of the first digit. Out-of-range values render as
/// [`GlyphPattern::OVERFLOW`].
#[must_use]
pub fn encode_number(value: i32, separator: bool) -> GlyphPattern {
    if !(MIN_DISPLAY..=MAX_DISPLAY).contains(&value) {
        return GlyphPattern::OVERFLOW;
    }

    let mut digits = [0u8; DIGITS];
    let mut magnitude = value.unsigned_abs();
    let mut position = DIGITS;
    loop {
        position -= 1;
        digits[position] = DIGIT_SEGMENTS[(magnitude % 10) as usize];
        magnitude /= 10;
        if magnitude == 0 {
            break;
        }
    }

    if value < 0 {
        digits[position - 1] = SEG_G;
    }
    if separator {
        digits[1] |= SEG_DP;
    }
    GlyphPattern(digits)
}
