//! Half-step phase table
//!
//! Eight patterns alternating one and two energized coils. Every motor
//! walks the same table; it is never modified at runtime.

/// Number of entries in the phase table
pub const PHASE_COUNT: usize = 8;

/// Energizing pattern for the four coil lines (A, B, C, D)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PhasePattern(pub [bool; 4]);

impl PhasePattern {
    /// All lines de-energized
    pub const OFF: PhasePattern = PhasePattern([false; 4]);

    /// Build a pattern from 0/1 values
    pub const fn from_bits(bits: [u8; 4]) -> Self {
        PhasePattern([bits[0] != 0, bits[1] != 0, bits[2] != 0, bits[3] != 0])
    }

    /// Level of one line
    pub fn line(&self, line: usize) -> bool {
        self.0[line]
    }

    /// Lines in table order
    pub fn lines(&self) -> [bool; 4] {
        self.0
    }

    /// Number of energized lines
    pub fn energized(&self) -> usize {
        self.0.iter().filter(|on| **on).count()
    }
}

/// The 8-phase half-step sequence
pub const PHASE_TABLE: [PhasePattern; PHASE_COUNT] = [
    PhasePattern::from_bits([1, 0, 0, 0]),
    PhasePattern::from_bits([1, 1, 0, 0]),
    PhasePattern::from_bits([0, 1, 0, 0]),
    PhasePattern::from_bits([0, 1, 1, 0]),
    PhasePattern::from_bits([0, 0, 1, 0]),
    PhasePattern::from_bits([0, 0, 1, 1]),
    PhasePattern::from_bits([0, 0, 0, 1]),
    PhasePattern::from_bits([1, 0, 0, 1]),
];

/// Position of a motor within [`PHASE_TABLE`]
///
/// Always in `0..PHASE_COUNT`; stepping wraps around.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PhaseIndex(u8);

impl PhaseIndex {
    /// Create an index, wrapping into range
    pub const fn new(index: usize) -> Self {
        PhaseIndex((index % PHASE_COUNT) as u8)
    }

    /// Raw index value
    pub const fn get(self) -> usize {
        self.0 as usize
    }

    /// Advance by a signed offset, wrapping modulo the table length
    pub fn advance(self, offset: i8) -> Self {
        let next = (self.0 as i16 + offset as i16).rem_euclid(PHASE_COUNT as i16);
        PhaseIndex(next as u8)
    }

    /// Pattern at this index
    pub fn pattern(self) -> PhasePattern {
        PHASE_TABLE[self.get()]
    }
}
