//! Band recombination with solo/mute
//!
//! Solo wins: if any band is soloed, exactly the soloed bands are summed
//! and mute flags are ignored. Otherwise every unmuted band is summed.
//! Bypass is not handled here; a bypassed band still reaches the mix, it
//! just skips compression.

use crate::types::{AudioBuffer, NUM_BANDS};

/// Solo/mute state of one band, sampled once per block
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BandRouting {
    pub solo: bool,
    pub mute: bool,
}

impl BandRouting {
    pub fn new(solo: bool, mute: bool) -> Self {
        Self { solo, mute }
    }
}

/// Which bands reach the output
pub fn audible_bands(routing: &[BandRouting; NUM_BANDS]) -> [bool; NUM_BANDS] {
    let any_soloed = routing.iter().any(|r| r.solo);
    std::array::from_fn(|i| {
        if any_soloed {
            routing[i].solo
        } else {
            !routing[i].mute
        }
    })
}

/// Sum the audible bands into `output`
///
/// `output` is cleared first, so with every band silenced the result is
/// silence of the band length.
pub fn mix_bands(
    bands: &[AudioBuffer; NUM_BANDS],
    routing: &[BandRouting; NUM_BANDS],
    output: &mut AudioBuffer,
) {
    debug_assert!(
        bands.iter().all(|b| b.num_samples() == bands[0].num_samples()),
        "band buffers must share one length"
    );
    output.set_num_samples(bands[0].num_samples());
    output.clear();

    for (band, audible) in bands.iter().zip(audible_bands(routing)) {
        if audible {
            output.add_from(band);
        }
    }
}
