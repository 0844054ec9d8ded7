use tracing::debug;

use stetho_domain::AnalysisError;

use crate::filter::SosFilter;

/// Fraction of the decimated Nyquist frequency kept by the anti-alias filter.
const ANTI_ALIAS_CUTOFF: f64 = 0.8;

#[derive(Clone, Debug, PartialEq)]
pub struct Resampled {
    pub samples: Vec<f64>,
    /// Effective rate after decimation; not necessarily the target rate.
    pub sample_rate: f64,
    pub factor: usize,
}

/// Integer-factor decimator toward a target working rate.
#[derive(Clone, Debug)]
pub struct Resampler {
    target_rate: u32,
    anti_alias_order: usize,
}

impl Resampler {
    pub fn new(target_rate: u32, anti_alias_order: usize) -> Self {
        Self {
            target_rate,
            anti_alias_order,
        }
    }

    pub fn factor_for(&self, source_rate: u32) -> usize {
        if self.target_rate == 0 {
            return 1;
        }
        (source_rate / self.target_rate) as usize
    }

    /// Low-passes below the new Nyquist frequency, then keeps every Nth
    /// sample starting at index 0, so the output holds `ceil(len / N)` samples.
    pub fn process(&self, samples: &[f64], source_rate: u32) -> Result<Resampled, AnalysisError> {
        if source_rate == 0 {
            return Err(AnalysisError::malformed("sample rate must be positive"));
        }
        let factor = self.factor_for(source_rate);
        if factor <= 1 {
            debug!(source_rate, "sample rate at or below target, no decimation");
            return Ok(Resampled {
                samples: samples.to_vec(),
                sample_rate: source_rate as f64,
                factor: 1,
            });
        }

        let source = source_rate as f64;
        let effective = source / factor as f64;
        let cutoff = ANTI_ALIAS_CUTOFF * effective / 2.0;
        let anti_alias = SosFilter::butterworth_lowpass(self.anti_alias_order, cutoff, source)?;
        let smoothed = anti_alias.apply_zero_phase(samples);
        let decimated: Vec<f64> = smoothed.into_iter().step_by(factor).collect();
        debug!(
            source_rate,
            factor,
            effective_rate = effective,
            samples = decimated.len(),
            "decimated"
        );
        Ok(Resampled {
            samples: decimated,
            sample_rate: effective,
            factor,
        })
    }
}

impl Default for Resampler {
    fn default() -> Self {
        Self::new(2_000, 8)
    }
}
