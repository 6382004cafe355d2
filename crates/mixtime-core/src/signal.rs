//! Impulse response signals and synthetic test signal generation
//!
//! [`Signal`] pairs samples with their sample rate. [`NoiseGenerator`]
//! produces reproducible white noise and simple synthetic room impulse
//! responses for tests, benchmarks and the `synth` command.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Mono impulse response with its sample rate
#[derive(Debug, Clone, PartialEq)]
pub struct Signal {
    /// Audio samples
    pub samples: Vec<f32>,
    /// Sample rate in Hz
    pub sample_rate: f64,
}

impl Signal {
    pub fn new(samples: Vec<f32>, sample_rate: f64) -> Self {
        Self {
            samples,
            sample_rate,
        }
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Duration in seconds
    pub fn duration_secs(&self) -> f64 {
        self.samples.len() as f64 / self.sample_rate
    }

    /// Time of each sample in seconds
    pub fn time_axis(&self) -> impl Iterator<Item = f64> + '_ {
        let rate = self.sample_rate;
        (0..self.samples.len()).map(move |i| i as f64 / rate)
    }
}

/// Seeded white noise generator
///
/// Both distributions have zero mean and unit variance. The same seed always
/// produces the same samples.
///
/// # Example
/// ```
/// use mixtime_core::signal::NoiseGenerator;
///
/// let mut gen = NoiseGenerator::new(42);
/// let ir = gen.silence_then_noise(1000, 4000);
/// assert_eq!(ir.len(), 5000);
/// assert!(ir[..1000].iter().all(|&x| x == 0.0));
/// ```
#[derive(Debug, Clone)]
pub struct NoiseGenerator {
    rng: StdRng,
}

impl NoiseGenerator {
    /// Create a generator with a fixed seed
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Uniform white noise on `[-√3, √3)`
    pub fn uniform(&mut self, len: usize) -> Vec<f32> {
        let bound = 3.0f64.sqrt();
        (0..len)
            .map(|_| self.rng.gen_range(-bound..bound) as f32)
            .collect()
    }

    /// Gaussian white noise (Box-Muller)
    pub fn gaussian(&mut self, len: usize) -> Vec<f32> {
        let mut out = Vec::with_capacity(len + 1);
        while out.len() < len {
            // 1 - u keeps the logarithm argument in (0, 1]
            let u1: f64 = 1.0 - self.rng.gen::<f64>();
            let u2: f64 = self.rng.gen();
            let radius = (-2.0 * u1.ln()).sqrt();
            let theta = 2.0 * std::f64::consts::PI * u2;
            out.push((radius * theta.cos()) as f32);
            out.push((radius * theta.sin()) as f32);
        }
        out.truncate(len);
        out
    }

    /// `silence` zeros followed by `noise_len` samples of uniform unit-variance noise
    pub fn silence_then_noise(&mut self, silence: usize, noise_len: usize) -> Vec<f32> {
        let mut out = vec![0.0f32; silence];
        out.extend(self.uniform(noise_len));
        out
    }

    /// Synthetic room impulse response
    ///
    /// `pre_delay` zeros, a unit direct-path impulse, then Gaussian noise whose
    /// envelope decays by 60 dB over `rt60_secs`. Total length is `len`.
    pub fn decaying_rir(
        &mut self,
        pre_delay: usize,
        len: usize,
        rt60_secs: f64,
        sample_rate: f64,
    ) -> Signal {
        let mut samples = vec![0.0f32; len];
        if pre_delay < len {
            samples[pre_delay] = 1.0;

            let tail_len = len - pre_delay - 1;
            let noise = self.gaussian(tail_len);
            // 60 dB amplitude decay: exp(-ln(1000) * t / rt60)
            let rate = 1000.0f64.ln() / (rt60_secs * sample_rate);
            let gain = 0.5;
            for (k, (dst, &n)) in samples[pre_delay + 1..].iter_mut().zip(&noise).enumerate() {
                *dst = (gain * n as f64 * (-rate * (k + 1) as f64).exp()) as f32;
            }
        }
        Signal::new(samples, sample_rate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn variance(x: &[f32]) -> f64 {
        let mean = x.iter().map(|&v| v as f64).sum::<f64>() / x.len() as f64;
        x.iter().map(|&v| (v as f64 - mean).powi(2)).sum::<f64>() / x.len() as f64
    }

    #[test]
    fn test_signal_duration() {
        let signal = Signal::new(vec![0.0; 48000], 48000.0);
        assert_eq!(signal.len(), 48000);
        assert_relative_eq!(signal.duration_secs(), 1.0);
        let t: Vec<f64> = signal.time_axis().take(3).collect();
        assert_relative_eq!(t[2], 2.0 / 48000.0);
    }

    #[test]
    fn test_uniform_unit_variance() {
        let noise = NoiseGenerator::new(1).uniform(100_000);
        assert_relative_eq!(variance(&noise), 1.0, epsilon = 0.03);
        let bound = 3.0f32.sqrt();
        assert!(noise.iter().all(|&x| x.abs() <= bound));
    }

    #[test]
    fn test_gaussian_unit_variance() {
        let noise = NoiseGenerator::new(2).gaussian(100_001);
        assert_eq!(noise.len(), 100_001);
        assert_relative_eq!(variance(&noise), 1.0, epsilon = 0.03);
        // About 31.7% of a Gaussian lies beyond one standard deviation
        let outliers = noise.iter().filter(|&&x| x.abs() > 1.0).count() as f64;
        assert_relative_eq!(outliers / noise.len() as f64, 0.3173, epsilon = 0.01);
    }

    #[test]
    fn test_same_seed_same_noise() {
        let a = NoiseGenerator::new(99).gaussian(256);
        let b = NoiseGenerator::new(99).gaussian(256);
        let c = NoiseGenerator::new(100).gaussian(256);
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_decaying_rir_shape() {
        let rir = NoiseGenerator::new(3).decaying_rir(480, 48000, 0.5, 48000.0);
        assert_eq!(rir.len(), 48000);
        assert!(rir.samples[..480].iter().all(|&x| x == 0.0));
        assert_eq!(rir.samples[480], 1.0);

        let early: f64 = rir.samples[600..2600].iter().map(|&x| (x as f64).powi(2)).sum();
        let late: f64 = rir.samples[40000..42000].iter().map(|&x| (x as f64).powi(2)).sum();
        assert!(early > late * 1000.0);
    }

    #[test]
    fn test_decaying_rir_pre_delay_past_end() {
        let rir = NoiseGenerator::new(4).decaying_rir(100, 50, 0.3, 8000.0);
        assert_eq!(rir.len(), 50);
        assert!(rir.samples.iter().all(|&x| x == 0.0));
    }
}
