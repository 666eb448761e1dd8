//! Signal-chain building blocks
//!
//! - [`crossover`]: three-band Linkwitz-Riley splitter
//! - [`compressor`]: feed-forward compressor with ballistics envelope
//! - [`compressor_band`]: compressor wired to a band's parameters and meters
//! - [`router`]: solo/mute recombination
//! - [`gain`]: ramped input/output trim

pub mod compressor;
pub mod compressor_band;
pub mod crossover;
pub mod gain;
pub mod router;

pub use compressor::{BallisticsFilter, Compressor};
pub use compressor_band::{BandLevels, CompressorBand};
pub use crossover::{AllpassReference, CrossoverNetwork, FilterType, LinkwitzRileyFilter, SvfCoefficients};
pub use gain::{LinearSmoothedValue, SmoothedGain, DEFAULT_RAMP_SECONDS};
pub use router::{audible_bands, mix_bands, BandRouting};
