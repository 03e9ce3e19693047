//! Undisturbed ground temperature (Kusuda-Achenbach).
//!
//! The soil far from a buried pipe follows an annual sinusoid at the surface
//! that is damped and delayed with depth:
//!
//! ```text
//! T(z, d) = T_mean - A * exp(-z * sqrt(pi / (365 a)))
//!                      * cos(2 pi / 365 * (d - d_shift - z / 2 * sqrt(365 / (pi a))))
//! ```
//!
//! with `a` the soil diffusivity in m²/day.

use crate::config::SurfaceTemperatureSource;
use tp_core::constants::DAYS_PER_YEAR;
use tp_core::numeric::Real;

/// Annual ground surface statistics.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SurfaceTemperatureStats {
    /// Annual mean surface temperature [°C]
    pub mean_c: Real,
    /// Amplitude of the annual swing [K]
    pub amplitude: Real,
    /// Day of the year with the coldest surface
    pub phase_shift_days: Real,
}

impl SurfaceTemperatureStats {
    /// Derive statistics from twelve monthly mean surface temperatures.
    ///
    /// The amplitude is the mean absolute deviation from the annual mean.
    /// The phase shift is 30 days times the 1-based index of the coldest month;
    /// when months tie, the later one is used.
    pub fn from_monthly(monthly: &[Real; 12]) -> Self {
        let mean_c = monthly.iter().sum::<Real>() / 12.0;
        let amplitude = monthly.iter().map(|t| (t - mean_c).abs()).sum::<Real>() / 12.0;

        let mut coldest = 0;
        for (month, t) in monthly.iter().enumerate() {
            if *t <= monthly[coldest] {
                coldest = month;
            }
        }

        Self {
            mean_c,
            amplitude,
            phase_shift_days: (coldest + 1) as Real * 30.0,
        }
    }
}

/// Far-field soil temperature against depth and day of year.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GroundBoundaryModel {
    stats: SurfaceTemperatureStats,
    /// Soil thermal diffusivity [m²/day]
    diffusivity_m2_per_day: Real,
}

impl GroundBoundaryModel {
    pub fn new(stats: SurfaceTemperatureStats, diffusivity_m2_per_day: Real) -> Self {
        Self {
            stats,
            diffusivity_m2_per_day,
        }
    }

    /// Build the model from a configured surface temperature source.
    pub fn from_source(source: &SurfaceTemperatureSource, diffusivity_m2_per_day: Real) -> Self {
        let stats = match source {
            SurfaceTemperatureSource::Annual {
                mean_c,
                amplitude,
                phase_shift_days,
            } => SurfaceTemperatureStats {
                mean_c: *mean_c,
                amplitude: *amplitude,
                phase_shift_days: *phase_shift_days,
            },
            SurfaceTemperatureSource::Monthly(monthly) => {
                SurfaceTemperatureStats::from_monthly(monthly)
            }
        };
        Self::new(stats, diffusivity_m2_per_day)
    }

    pub fn stats(&self) -> &SurfaceTemperatureStats {
        &self.stats
    }

    pub fn diffusivity_m2_per_day(&self) -> Real {
        self.diffusivity_m2_per_day
    }

    /// Undisturbed temperature [°C] at `depth_m` below the surface on `day`.
    pub fn temperature(&self, depth_m: Real, day: Real) -> Real {
        use std::f64::consts::PI;

        let alpha = self.diffusivity_m2_per_day;
        let damping = (-depth_m * (PI / (DAYS_PER_YEAR * alpha)).sqrt()).exp();
        let lag = depth_m / 2.0 * (DAYS_PER_YEAR / (PI * alpha)).sqrt();
        let phase = 2.0 * PI / DAYS_PER_YEAR * (day - self.stats.phase_shift_days - lag);

        self.stats.mean_c - self.stats.amplitude * damping * phase.cos()
    }
}
