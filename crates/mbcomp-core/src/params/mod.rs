//! Parameter registry shared between the host, the UI and the audio thread
//!
//! The host (or UI) writes values, the audio thread reads them once per
//! block. Components never own parameters: they hold [`ParamId`] handles
//! and an `Arc<ParameterStore>` that outlives every processor built on it.
//!
//! # Usage
//!
//! ```ignore
//! let params = Arc::new(ParameterStore::new());
//! params.set(ParamId::ThresholdLowBand, -18.0);
//! params.set_choice(ParamId::RatioLowBand, 4)?; // 4:1
//!
//! // Audio thread, start of each block
//! let threshold = params.get(ParamId::ThresholdLowBand);
//! ```

mod atomic;
mod layout;

pub use atomic::AtomicF32;
pub use layout::{
    ParamId, ParamInfo, ParamKind, DEFAULT_RATIO_INDEX, PARAM_COUNT, PARAM_LAYOUT, RATIO_CHOICES,
};

use crate::error::{ProcessorError, ProcessorResult};

/// Lock-free storage for every parameter value, in plain units
///
/// Float parameters hold their value, choice parameters their index and
/// bool parameters 0.0 / 1.0.
#[derive(Debug)]
pub struct ParameterStore {
    values: [AtomicF32; PARAM_COUNT],
}

impl ParameterStore {
    /// Create a store with every parameter at its default
    pub fn new() -> Self {
        Self {
            values: std::array::from_fn(|i| AtomicF32::new(PARAM_LAYOUT[i].default)),
        }
    }

    /// Current plain value
    #[inline]
    pub fn get(&self, id: ParamId) -> f32 {
        self.values[id.index()].load()
    }

    /// Current value of a bool parameter
    #[inline]
    pub fn get_bool(&self, id: ParamId) -> bool {
        self.get(id) >= 0.5
    }

    /// Current index of a choice parameter
    #[inline]
    pub fn get_choice(&self, id: ParamId) -> usize {
        self.get(id).max(0.0) as usize
    }

    /// Numeric value of the selected choice
    ///
    /// Falls back to 1.0 for non-choice parameters so the result is always a
    /// usable ratio.
    pub fn choice_value(&self, id: ParamId) -> f32 {
        match id.info().kind {
            ParamKind::Choice { choices } => {
                let index = self.get_choice(id).min(choices.len() - 1);
                choices[index]
            }
            _ => 1.0,
        }
    }

    /// Set a plain value, clamped and snapped to the parameter's range
    pub fn set(&self, id: ParamId, value: f32) {
        self.values[id.index()].store(id.info().constrain(value));
    }

    /// Set a bool parameter
    pub fn set_bool(&self, id: ParamId, value: bool) {
        self.set(id, if value { 1.0 } else { 0.0 });
    }

    /// Select a choice by index
    pub fn set_choice(&self, id: ParamId, index: usize) -> ProcessorResult<()> {
        let info = id.info();
        match info.kind {
            ParamKind::Choice { choices } if index < choices.len() => {
                self.values[id.index()].store(index as f32);
                Ok(())
            }
            ParamKind::Choice { choices } => Err(ProcessorError::ChoiceOutOfRange {
                param: info.name,
                index,
                count: choices.len(),
            }),
            _ => Err(ProcessorError::WrongParameterKind {
                param: info.name,
                expected: "choice",
            }),
        }
    }

    /// Set a parameter addressed by its host-facing name
    pub fn set_by_name(&self, name: &str, value: f32) -> ProcessorResult<ParamId> {
        let id = ParamId::from_name(name)
            .ok_or_else(|| ProcessorError::UnknownParameter(name.to_string()))?;
        self.set(id, value);
        Ok(id)
    }

    /// Restore every parameter to its default
    pub fn reset_to_defaults(&self) {
        for info in PARAM_LAYOUT.iter() {
            self.values[info.id.index()].store(info.default);
        }
    }
}

impl Default for ParameterStore {
    fn default() -> Self {
        Self::new()
    }
}
