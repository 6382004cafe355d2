//! E2E tests for mixing-time estimation
//!
//! Verifies the properties callers rely on: curve shape invariants,
//! determinism, the not-found outcome, the pre-delay shift and the
//! silence-then-noise scenario.

use approx::assert_relative_eq;
use mixtime::density::energy::cumulative_energy_fraction;
use mixtime::density::estimator::{gaussian_outlier_fraction, NOT_FOUND_DIAGNOSTIC};
use mixtime::{estimate, AnalysisWindow, EchoDensityEstimator, EstimateError, NoiseGenerator};

const SAMPLE_RATE: f64 = 48000.0;

/// 1000 samples of silence then 4000 samples of unit-variance white noise
fn silence_then_noise(seed: u64) -> Vec<f32> {
    NoiseGenerator::new(seed).silence_then_noise(1000, 4000)
}

/// Isolated unit impulses: never dense enough to cross the threshold
fn sparse_echoes(len: usize, spacing: usize) -> Vec<f32> {
    (0..len)
        .map(|i| if i % spacing == 0 { 1.0 } else { 0.0 })
        .collect()
}

#[test]
fn test_silence_then_noise_scenario() {
    let signal = silence_then_noise(2024);
    let result = estimate(&signal, SAMPLE_RATE, 1024, 0).unwrap();

    assert!(result.is_found(), "{}", result.diagnostic());
    assert_eq!(result.diagnostic(), "found");

    // Noise starts at 1000/48000 s = 20.8 ms; detection waits until noise
    // dominates the window and 10% of the energy has arrived (~400 samples later)
    let onset_ms = 1000.0 / SAMPLE_RATE * 1000.0;
    let t = result.mixing_time_ms();
    assert!(t >= onset_ms, "mixing time {} ms before noise onset", t);
    assert!(t < onset_ms + 15.0, "mixing time {} ms too late", t);
}

#[test]
fn test_scenario_across_seeds() {
    for seed in 0..8 {
        let result = estimate(&silence_then_noise(seed), SAMPLE_RATE, 1024, 0).unwrap();
        assert!(result.is_found(), "seed {}", seed);
        let index = result.crossing_index().unwrap();
        assert!((1000..2000).contains(&index), "seed {} crossing {}", seed, index);
    }
}

#[test]
fn test_estimate_is_deterministic() {
    let signal = NoiseGenerator::new(5).decaying_rir(240, 24000, 0.4, SAMPLE_RATE);
    let estimator = EchoDensityEstimator::default();

    let a = estimator.estimate(&signal.samples, SAMPLE_RATE, 240).unwrap();
    let b = estimator.estimate(&signal.samples, SAMPLE_RATE, 240).unwrap();
    assert_eq!(a.outcome, b.outcome);
    assert_eq!(a.curve.values(), b.curve.values());
}

#[test]
fn test_window_normalization_for_many_lengths() {
    for n in (2..=4096).step_by(2).filter(|n| n % 62 == 0 || *n < 16) {
        let window = AnalysisWindow::new(n).unwrap();
        let total: f64 = window.weights().iter().sum();
        assert_relative_eq!(total, 1.0, epsilon = 1e-12);
    }
}

#[test]
fn test_curve_length_invariant() {
    let mut gen = NoiseGenerator::new(6);
    for (len, window) in [(256, 256), (1024, 1024), (3333, 1024), (10_000, 2048), (501, 64)] {
        let signal = gen.gaussian(len);
        let result = estimate(&signal, SAMPLE_RATE, window, 0).unwrap();
        assert_eq!(result.curve.len(), len);
    }
}

#[test]
fn test_interpolation_fidelity() {
    let signal = NoiseGenerator::new(7).decaying_rir(100, 20_000, 0.3, SAMPLE_RATE);
    let estimator = EchoDensityEstimator::default();
    let result = estimator.estimate(&signal.samples, SAMPLE_RATE, 0).unwrap();
    let curve = &result.curve;

    assert_eq!(curve.node_indices().len(), 40);
    for (&n, &v) in curve.node_indices().iter().zip(curve.node_values()) {
        assert_eq!(curve.values()[n], v, "node {}", n);
        let local = estimator.local_density(&signal.samples, n).unwrap();
        let exact = local / gaussian_outlier_fraction();
        assert_relative_eq!(v, exact, epsilon = 1e-15);
    }
}

#[test]
fn test_energy_fraction_monotonic() {
    let signal = NoiseGenerator::new(8).decaying_rir(50, 10_000, 0.2, SAMPLE_RATE);
    let energy = cumulative_energy_fraction(&signal.samples);

    assert!(energy.windows(2).all(|w| w[1] >= w[0]));
    assert_relative_eq!(*energy.last().unwrap(), 1.0, epsilon = 1e-12);
}

#[test]
fn test_not_found_branch() {
    let signal = sparse_echoes(20_000, 2000);
    let result = estimate(&signal, SAMPLE_RATE, 1024, 0).unwrap();

    assert!(!result.is_found());
    assert_eq!(result.mixing_time_ms(), 0.0);
    assert_eq!(result.crossing_index(), None);
    assert_eq!(result.diagnostic(), NOT_FOUND_DIAGNOSTIC);
    assert_eq!(result.curve.len(), signal.len());
}

#[test]
fn test_pre_delay_shift() {
    let signal = silence_then_noise(11);
    let estimator = EchoDensityEstimator::default();
    let base = estimator.estimate(&signal, SAMPLE_RATE, 0).unwrap();

    for k in [1usize, 48, 480, 5000] {
        let shifted = estimator.estimate(&signal, SAMPLE_RATE, k).unwrap();
        assert_eq!(shifted.crossing_index(), base.crossing_index());
        assert_relative_eq!(
            base.mixing_time_ms() - shifted.mixing_time_ms(),
            k as f64 / SAMPLE_RATE * 1000.0,
            epsilon = 1e-9
        );
    }
}

#[test]
fn test_edge_window_regimes() {
    let signal = NoiseGenerator::new(12).uniform(5000);
    let window = AnalysisWindow::new(1024).unwrap();

    for n in [0, signal.len() - 1] {
        let (segment, weights) = window.segment(&signal, n).unwrap();
        assert_eq!(segment.len(), weights.len(), "n = {}", n);
        assert!(!segment.is_empty());
    }

    let estimator = EchoDensityEstimator::default();
    assert!(estimator.local_density(&signal, 0).is_some());
    assert!(estimator.local_density(&signal, signal.len() - 1).is_some());
    assert!(estimator.local_density(&signal, signal.len()).is_none());
}

#[test]
fn test_invalid_inputs() {
    let signal = vec![0.1f32; 2000];

    assert_eq!(
        estimate(&signal, SAMPLE_RATE, 1023, 0).unwrap_err(),
        EstimateError::InvalidWindowLength(1023)
    );
    assert_eq!(
        estimate(&signal, 0.0, 1024, 0).unwrap_err(),
        EstimateError::InvalidSampleRate(0.0)
    );
    assert_eq!(
        estimate(&signal, SAMPLE_RATE, 4096, 0).unwrap_err(),
        EstimateError::SignalTooShort {
            len: 2000,
            window: 4096
        }
    );
}

#[test]
fn test_estimator_shared_across_threads() {
    let estimator = EchoDensityEstimator::default();
    let signals: Vec<Vec<f32>> = (0..4).map(silence_then_noise).collect();
    let sequential: Vec<_> = signals
        .iter()
        .map(|s| estimator.estimate(s, SAMPLE_RATE, 0).unwrap().outcome)
        .collect();

    let shared = &estimator;
    let parallel: Vec<_> = std::thread::scope(|scope| {
        let handles: Vec<_> = signals
            .iter()
            .map(|s| scope.spawn(move || shared.estimate(s, SAMPLE_RATE, 0).unwrap().outcome))
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    assert_eq!(sequential, parallel);
}
