// src/types/flags.rs
use std::fmt;

/// Mains frequency where a recording was made
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum MainsFrequency {
    #[default]
    Hz50,
    Hz60,
}

impl MainsFrequency {
    pub fn hz(&self) -> u16 {
        match self {
            MainsFrequency::Hz50 => 50,
            MainsFrequency::Hz60 => 60,
        }
    }

    /// 60 maps to `Hz60`, anything else to `Hz50`.
    pub fn from_hz(hz: u16) -> Self {
        if hz == 60 {
            MainsFrequency::Hz60
        } else {
            MainsFrequency::Hz50
        }
    }
}

/// Decoded view of the format block's flags byte.
///
/// The raw byte is kept as-is, so bits without a name survive a
/// decode/encode cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct FlagSet(u8);

impl FlagSet {
    /// Unused by recorders
    pub const POLARITY: u8 = 1 << 0;
    /// Set for 60 Hz, unset for 50 Hz
    pub const MAINS_FREQUENCY_60: u8 = 1 << 1;
    pub const MAINS_FILTER: u8 = 1 << 2;
    /// Unused by recorders
    pub const LP_FILTER: u8 = 1 << 3;
    /// 0.1 Hz baseline filter
    pub const BASELINE_FILTER: u8 = 1 << 4;
    pub const NOTCH_MAINS_FILTER: u8 = 1 << 5;
    pub const ENHANCED_FILTER: u8 = 1 << 6;

    pub fn from_bits(bits: u8) -> Self {
        FlagSet(bits)
    }

    pub fn empty() -> Self {
        FlagSet(0)
    }

    pub fn bits(&self) -> u8 {
        self.0
    }

    pub fn polarity(&self) -> bool {
        self.0 & Self::POLARITY != 0
    }

    pub fn mains_frequency(&self) -> MainsFrequency {
        if self.0 & Self::MAINS_FREQUENCY_60 != 0 {
            MainsFrequency::Hz60
        } else {
            MainsFrequency::Hz50
        }
    }

    pub fn mains_filter(&self) -> bool {
        self.0 & Self::MAINS_FILTER != 0
    }

    pub fn low_pass_filter(&self) -> bool {
        self.0 & Self::LP_FILTER != 0
    }

    pub fn baseline_filter(&self) -> bool {
        self.0 & Self::BASELINE_FILTER != 0
    }

    pub fn notch_mains_filter(&self) -> bool {
        self.0 & Self::NOTCH_MAINS_FILTER != 0
    }

    pub fn enhanced_filter(&self) -> bool {
        self.0 & Self::ENHANCED_FILTER != 0
    }

    pub fn set_polarity(&mut self, value: bool) {
        self.set(Self::POLARITY, value);
    }

    pub fn set_mains_frequency(&mut self, frequency: MainsFrequency) {
        self.set(Self::MAINS_FREQUENCY_60, frequency == MainsFrequency::Hz60);
    }

    pub fn set_mains_filter(&mut self, value: bool) {
        self.set(Self::MAINS_FILTER, value);
    }

    pub fn set_low_pass_filter(&mut self, value: bool) {
        self.set(Self::LP_FILTER, value);
    }

    pub fn set_baseline_filter(&mut self, value: bool) {
        self.set(Self::BASELINE_FILTER, value);
    }

    pub fn set_notch_mains_filter(&mut self, value: bool) {
        self.set(Self::NOTCH_MAINS_FILTER, value);
    }

    pub fn set_enhanced_filter(&mut self, value: bool) {
        self.set(Self::ENHANCED_FILTER, value);
    }

    fn set(&mut self, mask: u8, value: bool) {
        if value {
            self.0 |= mask;
        } else {
            self.0 &= !mask;
        }
    }
}

impl From<u8> for FlagSet {
    fn from(bits: u8) -> Self {
        FlagSet::from_bits(bits)
    }
}

impl From<FlagSet> for u8 {
    fn from(flags: FlagSet) -> Self {
        flags.bits()
    }
}

impl fmt::Display for FlagSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "mains {} Hz", self.mains_frequency().hz())?;
        let named = [
            (self.polarity(), "polarity"),
            (self.mains_filter(), "mains filter"),
            (self.low_pass_filter(), "low-pass filter"),
            (self.baseline_filter(), "baseline filter"),
            (self.notch_mains_filter(), "notch mains filter"),
            (self.enhanced_filter(), "enhanced filter"),
        ];
        for (_, name) in named.iter().filter(|(set, _)| *set) {
            write!(f, ", {}", name)?;
        }
        Ok(())
    }
}
