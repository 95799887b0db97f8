//! Random draws shared by distributions and optimizers.

/// A uniform draw from `[low, high)`. Equal bounds give `low`.
#[inline]
pub(crate) fn uniform(rng: &mut fastrand::Rng, low: f64, high: f64) -> f64 {
    rng.f64().mul_add(high - low, low)
}
