use crate::{CoreError, CoreResult};

/// Floating point type used throughout system
pub type Real = f64;

pub fn ensure_finite(v: Real, what: &'static str) -> CoreResult<Real> {
    if v.is_finite() {
        Ok(v)
    } else {
        Err(CoreError::NonFinite { what, value: v })
    }
}

/// Piecewise-linear lookup table over a strictly increasing abscissa.
///
/// Lookups outside the tabulated range clamp to the first or last value.
#[derive(Clone, Copy, Debug)]
pub struct LinearTable<const N: usize> {
    x: [Real; N],
    y: [Real; N],
}

impl<const N: usize> LinearTable<N> {
    /// Build a table. The abscissa must be strictly increasing and `N >= 1`.
    pub const fn new(x: [Real; N], y: [Real; N]) -> Self {
        Self { x, y }
    }

    /// Check the table shape. Static tables are checked in tests.
    pub fn validate(&self) -> CoreResult<()> {
        if N == 0 {
            return Err(CoreError::InvalidArg {
                what: "lookup table must not be empty",
            });
        }
        if let Some(index) = self.x.windows(2).position(|w| w[1] <= w[0]) {
            return Err(CoreError::UnsortedTable { index: index + 1 });
        }
        Ok(())
    }

    /// Linear interpolation, clamped at both ends.
    pub fn interpolate(&self, at: Real) -> Real {
        if at <= self.x[0] {
            return self.y[0];
        }
        if at >= self.x[N - 1] {
            return self.y[N - 1];
        }
        // First index whose abscissa is above `at`; guaranteed in 1..N here.
        let hi = self.x.partition_point(|&x| x <= at);
        let lo = hi - 1;
        let frac = (at - self.x[lo]) / (self.x[hi] - self.x[lo]);
        self.y[lo] + frac * (self.y[hi] - self.y[lo])
    }

    /// Value of the first entry whose abscissa is at or above `at`.
    ///
    /// Returns `None` when `at` lies above the table.
    pub fn step_at_or_above(&self, at: Real) -> Option<Real> {
        let idx = self.x.partition_point(|&x| x < at);
        self.y.get(idx).copied()
    }

    pub fn last_value(&self) -> Real {
        self.y[N - 1]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ensure_finite_detects_nan() {
        let err = ensure_finite(Real::NAN, "test").unwrap_err();
        let msg = format!("{err}");
        assert!(msg.contains("Non-finite"));
    }

    #[test]
    fn interpolate_clamps_and_blends() {
        let table = LinearTable::new([0.0, 10.0, 20.0], [1.0, 2.0, 4.0]);
        table.validate().unwrap();
        assert_eq!(table.interpolate(-5.0), 1.0);
        assert_eq!(table.interpolate(25.0), 4.0);
        assert!((table.interpolate(5.0) - 1.5).abs() < 1e-12);
        assert!((table.interpolate(15.0) - 3.0).abs() < 1e-12);
        assert_eq!(table.interpolate(10.0), 2.0);
    }

    #[test]
    fn step_lookup_picks_first_at_or_above() {
        let table = LinearTable::new([0.0, 10.0, 20.0], [1.0, 2.0, 4.0]);
        assert_eq!(table.step_at_or_above(-3.0), Some(1.0));
        assert_eq!(table.step_at_or_above(10.0), Some(2.0));
        assert_eq!(table.step_at_or_above(10.5), Some(4.0));
        assert_eq!(table.step_at_or_above(20.5), None);
    }

    #[test]
    fn validate_rejects_unsorted() {
        let table = LinearTable::new([0.0, 5.0, 5.0], [1.0, 2.0, 3.0]);
        assert_eq!(
            table.validate(),
            Err(CoreError::UnsortedTable { index: 2 })
        );
    }
}
