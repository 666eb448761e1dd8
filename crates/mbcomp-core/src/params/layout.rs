//! Parameter identities, ranges and host-facing names
//!
//! The table here is built at compile time and never mutated. Everything
//! that needs a parameter's name, range or default reads it from
//! [`ParamId::info`].

use crate::types::{Band, MAX_DB, MAX_FREQUENCY, MIN_FREQUENCY, MIN_THRESHOLD_DB, NUM_BANDS};

/// Number of parameters exposed to the host
pub const PARAM_COUNT: usize = 25;

/// Available compression ratios (N:1)
pub const RATIO_CHOICES: [f32; 14] = [
    1.0, 1.5, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 10.0, 15.0, 20.0, 50.0, 100.0,
];

const RATIO_SLICE: &[f32] = &RATIO_CHOICES;

/// Default ratio choice (3:1)
pub const DEFAULT_RATIO_INDEX: usize = 3;

/// Parameter identifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(usize)]
pub enum ParamId {
    LowMidCrossoverFreq,
    MidHighCrossoverFreq,

    ThresholdLowBand,
    ThresholdMidBand,
    ThresholdHighBand,

    AttackLowBand,
    AttackMidBand,
    AttackHighBand,

    ReleaseLowBand,
    ReleaseMidBand,
    ReleaseHighBand,

    RatioLowBand,
    RatioMidBand,
    RatioHighBand,

    BypassedLowBand,
    BypassedMidBand,
    BypassedHighBand,

    MuteLowBand,
    MuteMidBand,
    MuteHighBand,

    SoloLowBand,
    SoloMidBand,
    SoloHighBand,

    GainIn,
    GainOut,
}

impl ParamId {
    /// All parameters in host order
    pub const ALL: [ParamId; PARAM_COUNT] = [
        ParamId::LowMidCrossoverFreq,
        ParamId::MidHighCrossoverFreq,
        ParamId::ThresholdLowBand,
        ParamId::ThresholdMidBand,
        ParamId::ThresholdHighBand,
        ParamId::AttackLowBand,
        ParamId::AttackMidBand,
        ParamId::AttackHighBand,
        ParamId::ReleaseLowBand,
        ParamId::ReleaseMidBand,
        ParamId::ReleaseHighBand,
        ParamId::RatioLowBand,
        ParamId::RatioMidBand,
        ParamId::RatioHighBand,
        ParamId::BypassedLowBand,
        ParamId::BypassedMidBand,
        ParamId::BypassedHighBand,
        ParamId::MuteLowBand,
        ParamId::MuteMidBand,
        ParamId::MuteHighBand,
        ParamId::SoloLowBand,
        ParamId::SoloMidBand,
        ParamId::SoloHighBand,
        ParamId::GainIn,
        ParamId::GainOut,
    ];

    /// Index into per-parameter arrays
    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    /// Static description of this parameter
    #[inline]
    pub fn info(self) -> &'static ParamInfo {
        &PARAM_LAYOUT[self.index()]
    }

    /// Host-facing display name
    pub fn name(self) -> &'static str {
        self.info().name
    }

    /// Look a parameter up by its display name
    pub fn from_name(name: &str) -> Option<Self> {
        PARAM_LAYOUT.iter().find(|p| p.name == name).map(|p| p.id)
    }

    pub fn threshold(band: Band) -> Self {
        [Self::ThresholdLowBand, Self::ThresholdMidBand, Self::ThresholdHighBand][band.index()]
    }

    pub fn attack(band: Band) -> Self {
        [Self::AttackLowBand, Self::AttackMidBand, Self::AttackHighBand][band.index()]
    }

    pub fn release(band: Band) -> Self {
        [Self::ReleaseLowBand, Self::ReleaseMidBand, Self::ReleaseHighBand][band.index()]
    }

    pub fn ratio(band: Band) -> Self {
        [Self::RatioLowBand, Self::RatioMidBand, Self::RatioHighBand][band.index()]
    }

    pub fn bypassed(band: Band) -> Self {
        [Self::BypassedLowBand, Self::BypassedMidBand, Self::BypassedHighBand][band.index()]
    }

    pub fn mute(band: Band) -> Self {
        [Self::MuteLowBand, Self::MuteMidBand, Self::MuteHighBand][band.index()]
    }

    pub fn solo(band: Band) -> Self {
        [Self::SoloLowBand, Self::SoloMidBand, Self::SoloHighBand][band.index()]
    }
}

/// What kind of value a parameter holds
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ParamKind {
    /// Continuous value in `min..=max`, snapped to `step` when set
    Float { min: f32, max: f32, step: f32 },
    /// Index into a fixed list of numeric choices
    Choice { choices: &'static [f32] },
    /// On/off switch
    Bool,
}

/// Static description of a parameter
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParamInfo {
    /// Identity of the parameter
    pub id: ParamId,
    /// Display name shown to the host
    pub name: &'static str,
    /// Value kind and range
    pub kind: ParamKind,
    /// Default in plain units (choice index for choices, 0/1 for bools)
    pub default: f32,
    /// Unit label (e.g., "ms", "dB", "Hz")
    pub unit: &'static str,
}

impl ParamInfo {
    const fn float(
        id: ParamId,
        name: &'static str,
        min: f32,
        max: f32,
        step: f32,
        default: f32,
        unit: &'static str,
    ) -> Self {
        Self {
            id,
            name,
            kind: ParamKind::Float { min, max, step },
            default,
            unit,
        }
    }

    const fn ratio(id: ParamId, name: &'static str) -> Self {
        Self {
            id,
            name,
            kind: ParamKind::Choice {
                choices: RATIO_SLICE,
            },
            default: DEFAULT_RATIO_INDEX as f32,
            unit: ":1",
        }
    }

    const fn toggle(id: ParamId, name: &'static str) -> Self {
        Self {
            id,
            name,
            kind: ParamKind::Bool,
            default: 0.0,
            unit: "",
        }
    }

    /// Clamp and snap a plain value into this parameter's legal set
    pub fn constrain(&self, value: f32) -> f32 {
        let value = if value.is_nan() { self.default } else { value };
        match self.kind {
            ParamKind::Float { min, max, step } => {
                let clamped = value.clamp(min, max);
                if step > 0.0 {
                    (min + ((clamped - min) / step).round() * step).clamp(min, max)
                } else {
                    clamped
                }
            }
            ParamKind::Choice { choices } => value.round().clamp(0.0, (choices.len() - 1) as f32),
            ParamKind::Bool => {
                if value >= 0.5 {
                    1.0
                } else {
                    0.0
                }
            }
        }
    }

    /// Display name of choice `index` (one decimal place, e.g. "1.5")
    pub fn choice_name(&self, index: usize) -> Option<String> {
        match self.kind {
            ParamKind::Choice { choices } => choices.get(index).map(|c| format!("{:.1}", c)),
            _ => None,
        }
    }
}

/// Attack and release share one range
const TIME_MIN_MS: f32 = 5.0;
const TIME_MAX_MS: f32 = 500.0;

/// Input and output trim share one range
const TRIM_RANGE_DB: f32 = 24.0;

/// Every parameter, in [`ParamId`] order
pub static PARAM_LAYOUT: [ParamInfo; PARAM_COUNT] = [
    ParamInfo::float(
        ParamId::LowMidCrossoverFreq,
        "Low-Mid Crossover Freq",
        MIN_FREQUENCY,
        999.0,
        1.0,
        400.0,
        "Hz",
    ),
    ParamInfo::float(
        ParamId::MidHighCrossoverFreq,
        "Mid-High Crossover Freq",
        1000.0,
        MAX_FREQUENCY,
        1.0,
        2000.0,
        "Hz",
    ),
    ParamInfo::float(ParamId::ThresholdLowBand, "Threshold Low Band", MIN_THRESHOLD_DB, MAX_DB, 1.0, 0.0, "dB"),
    ParamInfo::float(ParamId::ThresholdMidBand, "Threshold Mid Band", MIN_THRESHOLD_DB, MAX_DB, 1.0, 0.0, "dB"),
    ParamInfo::float(ParamId::ThresholdHighBand, "Threshold High Band", MIN_THRESHOLD_DB, MAX_DB, 1.0, 0.0, "dB"),
    ParamInfo::float(ParamId::AttackLowBand, "Attack Low Band", TIME_MIN_MS, TIME_MAX_MS, 1.0, 50.0, "ms"),
    ParamInfo::float(ParamId::AttackMidBand, "Attack Mid Band", TIME_MIN_MS, TIME_MAX_MS, 1.0, 50.0, "ms"),
    ParamInfo::float(ParamId::AttackHighBand, "Attack High Band", TIME_MIN_MS, TIME_MAX_MS, 1.0, 50.0, "ms"),
    ParamInfo::float(ParamId::ReleaseLowBand, "Release Low Band", TIME_MIN_MS, TIME_MAX_MS, 1.0, 250.0, "ms"),
    ParamInfo::float(ParamId::ReleaseMidBand, "Release Mid Band", TIME_MIN_MS, TIME_MAX_MS, 1.0, 250.0, "ms"),
    ParamInfo::float(ParamId::ReleaseHighBand, "Release High Band", TIME_MIN_MS, TIME_MAX_MS, 1.0, 250.0, "ms"),
    ParamInfo::ratio(ParamId::RatioLowBand, "Ratio Low Band"),
    ParamInfo::ratio(ParamId::RatioMidBand, "Ratio Mid Band"),
    ParamInfo::ratio(ParamId::RatioHighBand, "Ratio High Band"),
    ParamInfo::toggle(ParamId::BypassedLowBand, "Bypassed Low Band"),
    ParamInfo::toggle(ParamId::BypassedMidBand, "Bypassed Mid Band"),
    ParamInfo::toggle(ParamId::BypassedHighBand, "Bypassed High Band"),
    ParamInfo::toggle(ParamId::MuteLowBand, "Mute Low Band"),
    ParamInfo::toggle(ParamId::MuteMidBand, "Mute Mid Band"),
    ParamInfo::toggle(ParamId::MuteHighBand, "Mute High Band"),
    ParamInfo::toggle(ParamId::SoloLowBand, "Solo Low Band"),
    ParamInfo::toggle(ParamId::SoloMidBand, "Solo Mid Band"),
    ParamInfo::toggle(ParamId::SoloHighBand, "Solo High Band"),
    ParamInfo::float(ParamId::GainIn, "Gain In", -TRIM_RANGE_DB, TRIM_RANGE_DB, 0.5, 0.0, "dB"),
    ParamInfo::float(ParamId::GainOut, "Gain Out", -TRIM_RANGE_DB, TRIM_RANGE_DB, 0.5, 0.0, "dB"),
];

// Per-band accessors index fixed three-element arrays.
const _: () = assert!(NUM_BANDS == 3);
