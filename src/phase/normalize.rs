//! Amplitude/phase sign normalisation.
//!
//! A sinusoid with amplitude `-A` and phase `C` is the same curve as one with
//! amplitude `A` and phase `C + 180°`. The canonical representative has
//! `A >= 0` and `C` in `[0, 360)`.

use super::wrap::{HALF_TURN, wrap_degrees};

/// Canonicalise an `(amplitude, phase)` pair.
///
/// Negative amplitudes are flipped and the phase advanced by 180°; the phase
/// is then reduced to `[0, 360)`. Idempotent.
pub fn normalize_amplitude_phase(amplitude: f64, phase: f64) -> (f64, f64) {
    let (amplitude, phase) = if amplitude < 0.0 {
        (-amplitude, phase + HALF_TURN)
    } else {
        (amplitude, phase)
    };
    (amplitude, wrap_degrees(phase))
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOL: f64 = 1e-12;

    #[test]
    fn test_negative_amplitude() {
        let (a, c) = normalize_amplitude_phase(-3.0, 10.0);
        assert!((a - 3.0).abs() < TOL);
        assert!((c - 190.0).abs() < TOL);
    }

    #[test]
    fn test_negative_amplitude_wraps_past_full_turn() {
        let (a, c) = normalize_amplitude_phase(-0.5, 270.0);
        assert!((a - 0.5).abs() < TOL);
        assert!((c - 90.0).abs() < TOL);
    }

    #[test]
    fn test_positive_amplitude_phase_reduced() {
        let (a, c) = normalize_amplitude_phase(2.0, -30.0);
        assert!((a - 2.0).abs() < TOL);
        assert!((c - 330.0).abs() < TOL);

        let (_, c) = normalize_amplitude_phase(2.0, 725.0);
        assert!((c - 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_canonical_is_fixed_point() {
        for &a in &[0.0, 0.1, 1.0, 46.0] {
            for &c in &[0.0, 0.5, 90.0, 180.0, 359.999] {
                assert_eq!(normalize_amplitude_phase(a, c), (a, c));
            }
        }
    }

    #[test]
    fn test_idempotent() {
        let amplitudes = [-5.0, -1e-9, 0.0, 0.3, 12.0];
        let phases = [-1080.0, -180.0, -0.0, 0.0, 179.9, 180.0, 360.0, 1e6];

        for &a in &amplitudes {
            for &c in &phases {
                let once = normalize_amplitude_phase(a, c);
                let twice = normalize_amplitude_phase(once.0, once.1);
                assert_eq!(once, twice, "not idempotent for ({a}, {c})");
                assert!(once.0 >= 0.0);
                assert!((0.0..360.0).contains(&once.1));
            }
        }
    }
}
