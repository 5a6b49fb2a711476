//! Phase interval wrapping.

use serde::{Deserialize, Serialize};

use super::PhaseError;

/// One full revolution in degrees.
pub const FULL_TURN: f64 = 360.0;

/// Half a revolution in degrees.
pub const HALF_TURN: f64 = 180.0;

/// Reduce an angle to `[0, 360)`.
#[inline]
pub fn wrap_degrees(value: f64) -> f64 {
    let wrapped = value.rem_euclid(FULL_TURN);
    // rem_euclid rounds tiny negative inputs up to exactly 360
    if wrapped >= FULL_TURN { 0.0 } else { wrapped }
}

/// Wrap an angle into `[start, start + 360)`.
///
/// Total for finite inputs; `wrap_to_start(v, 0.0)` equals `v mod 360`.
#[inline]
pub fn wrap_to_start(value: f64, start: f64) -> f64 {
    let wrapped = wrap_degrees(value - start) + start;
    // The addition can round up onto the excluded upper bound
    if wrapped >= start + FULL_TURN { start } else { wrapped }
}

/// Map a phase difference to `(-180, 180]`.
///
/// Tie-break: a difference of exactly `+180` stays `+180`, and `-180` maps to
/// `+180`, so the two ends of the branch cut share one representative.
#[inline]
pub fn canonical_difference(diff: f64) -> f64 {
    let wrapped = wrap_degrees(diff);
    if wrapped > HALF_TURN {
        wrapped - FULL_TURN
    } else {
        wrapped
    }
}

/// Wrap `value` into the closed window `[start, end]` by whole turns.
///
/// Returns `Ok(None)` when no multiple of 360° brings the value inside the
/// window (possible when the window is narrower than a full turn); callers
/// drop such values.
///
/// # Errors
/// - `InvalidWindow` if `end <= start` or a bound is not finite
pub fn wrap_to_window(value: f64, start: f64, end: f64) -> Result<Option<f64>, PhaseError> {
    Ok(PhaseWindow::new(start, end)?.wrap(value))
}

/// A closed angular window `[start, end]` in degrees.
///
/// The width need not be 360°: a narrow window such as `[-50, 50]` keeps
/// only values that some whole-turn shift brings inside it.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PhaseWindow {
    /// Lower bound (degrees, inclusive)
    pub start: f64,
    /// Upper bound (degrees, inclusive)
    pub end: f64,
}

impl PhaseWindow {
    /// Create a validated window.
    ///
    /// # Errors
    /// - `InvalidWindow` if `end <= start` or a bound is not finite
    pub fn new(start: f64, end: f64) -> Result<Self, PhaseError> {
        let window = Self { start, end };
        window.validate()?;
        Ok(window)
    }

    /// The canonical difference window `[-180, 180]`.
    pub fn symmetric() -> Self {
        Self {
            start: -HALF_TURN,
            end: HALF_TURN,
        }
    }

    /// Check the bounds (windows built by deserialisation skip `new`).
    pub fn validate(&self) -> Result<(), PhaseError> {
        if self.start.is_finite() && self.end.is_finite() && self.end > self.start {
            Ok(())
        } else {
            Err(PhaseError::InvalidWindow {
                start: self.start,
                end: self.end,
            })
        }
    }

    /// Window width in degrees.
    pub fn width(&self) -> f64 {
        self.end - self.start
    }

    /// Check if `value` lies in the window (both ends inclusive).
    pub fn contains(&self, value: f64) -> bool {
        value >= self.start && value <= self.end
    }

    /// Wrap `value` into the window, or `None` if it cannot be represented.
    ///
    /// Shifts up by whole turns while below `start`, then down while above
    /// `end`. Shift counts are computed directly, so very large finite inputs
    /// terminate. Non-finite values are unrepresentable.
    pub fn wrap(&self, value: f64) -> Option<f64> {
        if !value.is_finite() {
            return None;
        }

        let mut v = value;
        if v < self.start {
            v += ((self.start - v) / FULL_TURN).ceil() * FULL_TURN;
            if v < self.start {
                v += FULL_TURN;
            }
        }
        if v > self.end {
            v -= ((v - self.end) / FULL_TURN).ceil() * FULL_TURN;
            if v > self.end {
                v -= FULL_TURN;
            }
        }

        if self.contains(v) { Some(v) } else { None }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOL: f64 = 1e-9;

    #[test]
    fn test_wrap_degrees() {
        assert_eq!(wrap_degrees(0.0), 0.0);
        assert_eq!(wrap_degrees(360.0), 0.0);
        assert_eq!(wrap_degrees(-90.0), 270.0);
        assert_eq!(wrap_degrees(725.0), 5.0);
        let tiny = wrap_degrees(-1e-20);
        assert!((0.0..360.0).contains(&tiny));
    }

    #[test]
    fn test_wrap_to_start_range() {
        let starts = [-180.0, -50.0, 0.0, 37.5, 200.0];
        let values = [-1000.0, -360.0, -0.1, 0.0, 90.0, 359.9, 360.0, 1234.5];

        for &s in &starts {
            for &v in &values {
                let w = wrap_to_start(v, s);
                assert!(w >= s && w < s + FULL_TURN, "{v} -> {w} outside [{s}, {})", s + 360.0);
                // Same angle modulo a full turn
                let turns = (v - w) / FULL_TURN;
                assert!((turns - turns.round()).abs() < TOL);
            }
        }
    }

    #[test]
    fn test_wrap_to_start_just_below_start() {
        let cases = [
            (235.04104685499487, 235.04104685499493),
            (362.99697824551816, 362.9969782455182),
            (-17.25 - 1e-13, -17.25),
        ];
        for (v, s) in cases {
            let w = wrap_to_start(v, s);
            assert!(w >= s && w < s + FULL_TURN, "{v} -> {w} outside [{s}, {})", s + FULL_TURN);
        }
        assert_eq!(wrap_to_start(235.04104685499487, 235.04104685499493), 235.04104685499493);
    }

    #[test]
    fn test_wrap_to_start_zero_is_mod() {
        for &v in &[-725.0, -10.0, 0.0, 10.0, 370.0] {
            assert_eq!(wrap_to_start(v, 0.0), wrap_degrees(v));
        }
    }

    #[test]
    fn test_canonical_difference() {
        assert_eq!(canonical_difference(0.0), 0.0);
        assert_eq!(canonical_difference(90.0), 90.0);
        assert_eq!(canonical_difference(-90.0), -90.0);
        assert_eq!(canonical_difference(200.0), -160.0);
        assert_eq!(canonical_difference(-200.0), 160.0);
        assert_eq!(canonical_difference(350.0), -10.0);
        assert_eq!(canonical_difference(-350.0), 10.0);
    }

    #[test]
    fn test_canonical_difference_tie_break() {
        assert_eq!(canonical_difference(180.0), 180.0);
        assert_eq!(canonical_difference(-180.0), 180.0);
        assert_eq!(canonical_difference(540.0), 180.0);
    }

    #[test]
    fn test_window_rejects_degenerate() {
        assert!(matches!(
            PhaseWindow::new(50.0, 50.0),
            Err(PhaseError::InvalidWindow { .. })
        ));
        assert!(PhaseWindow::new(50.0, -50.0).is_err());
        assert!(PhaseWindow::new(f64::NAN, 10.0).is_err());
        assert!(wrap_to_window(0.0, 10.0, 0.0).is_err());
    }

    #[test]
    fn test_symmetric_window() {
        let window = PhaseWindow::symmetric();
        assert_eq!(window.width(), FULL_TURN);
        assert_eq!(window.wrap(canonical_difference(-180.0)), Some(180.0));
        assert_eq!(PhaseWindow::new(-50.0, 50.0).unwrap().width(), 100.0);
    }

    #[test]
    fn test_window_identity_inside() {
        let window = PhaseWindow::new(-50.0, 50.0).unwrap();
        for &v in &[-50.0, -12.5, 0.0, 49.9, 50.0] {
            assert_eq!(window.wrap(v), Some(v));
        }
    }

    #[test]
    fn test_window_shifts() {
        let window = PhaseWindow::new(-50.0, 50.0).unwrap();
        assert_eq!(window.wrap(330.0), Some(-30.0));
        assert_eq!(window.wrap(-340.0), Some(20.0));
        assert_eq!(window.wrap(720.0 + 10.0), Some(10.0));
    }

    #[test]
    fn test_window_unrepresentable() {
        let window = PhaseWindow::new(-50.0, 50.0).unwrap();
        assert_eq!(window.wrap(100.0), None);
        assert_eq!(window.wrap(-180.0), None);
        assert_eq!(window.wrap(f64::NAN), None);
        assert_eq!(window.wrap(f64::INFINITY), None);
    }

    #[test]
    fn test_window_edges_inclusive() {
        let window = PhaseWindow::new(0.0, 90.0).unwrap();
        assert_eq!(window.wrap(360.0), Some(0.0));
        assert_eq!(window.wrap(450.0), Some(90.0));
        assert_eq!(window.wrap(-270.0), Some(90.0));
    }

    #[test]
    fn test_window_full_turn() {
        let window = PhaseWindow::new(0.0, 360.0).unwrap();
        // Both edges are representable, the upper one stays put
        assert_eq!(window.wrap(360.0), Some(360.0));
        assert_eq!(window.wrap(-360.0), Some(0.0));
        assert_eq!(window.wrap(725.0), Some(5.0));
    }

    #[test]
    fn test_window_huge_values_terminate() {
        let window = PhaseWindow::new(-180.0, 180.0).unwrap();
        let wrapped = window.wrap(1e300);
        if let Some(v) = wrapped {
            assert!(window.contains(v));
        }
        let wrapped = window.wrap(-1e12 - 45.0);
        assert!(wrapped.is_some());
    }
}
