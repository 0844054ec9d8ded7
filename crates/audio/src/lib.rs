pub mod dsp;
pub mod envelope;
pub mod filter;
pub mod io;
pub mod resample;

pub use dsp::{downmix, normalize_buffer, PeakLevel};
pub use envelope::EnvelopeExtractor;
pub use filter::{BandpassFilter, FilterSpec, SosFilter};
pub use io::{AudioDecoder, DecodedAudio};
pub use resample::{Resampled, Resampler};
