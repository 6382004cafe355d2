//! Cumulative energy of an impulse response

/// Cumulative energy fraction `E(i) = Σ_{k<=i} x[k]² / Σ x²`
///
/// The result is non-decreasing and ends at 1.0. A signal with zero total
/// energy yields all zeros, so no energy threshold is ever reached.
pub fn cumulative_energy_fraction(signal: &[f32]) -> Vec<f64> {
    let mut running = 0.0f64;
    let mut cumulative: Vec<f64> = signal
        .iter()
        .map(|&x| {
            let x = x as f64;
            running += x * x;
            running
        })
        .collect();

    let total = running;
    if total > 0.0 {
        for e in &mut cumulative {
            *e /= total;
        }
    } else {
        cumulative.fill(0.0);
    }

    cumulative
}

/// First index where the cumulative energy fraction reaches `threshold`
pub fn energy_onset(fraction: &[f64], threshold: f64) -> Option<usize> {
    fraction.iter().position(|&e| e >= threshold)
}
