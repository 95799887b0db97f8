//! Gaussian-process Bayesian optimization with Expected Improvement.
//!
//! The optimizer builds a Gaussian process surrogate with a **Matérn 5/2
//! kernel** (ARD lengthscales) over the non-categorical dimensions and
//! proposes the candidate that maximizes **Expected Improvement (EI)**.
//!
//! # Algorithm overview
//!
//! 1. **Initial phase.** The first `n_initial_points` proposals are drawn
//!    uniformly at random.
//! 2. **Fit GP.** Observations are standardized (zero mean, unit variance)
//!    and a GP is fitted via Cholesky decomposition. Failed observations are
//!    replaced by the worst finite objective seen so far. ARD lengthscales are
//!    set to the per-dimension standard deviation of the training inputs.
//! 3. **Maximize EI.** `n_candidates` random points are evaluated under the
//!    posterior and the one with the highest EI is proposed.
//!
//! Categorical dimensions are drawn uniformly and do not take part in the
//! model. If every dimension is categorical the optimizer is a random search.
//! At most 100 of the most recent observations are used for fitting.
//!
//! # Configuration
//!
//! | Option | Default | Description |
//! |--------|---------|-------------|
//! | `n_initial_points` | 10 | Random proposals before the GP is used |
//! | `n_candidates` | 1000 | Random candidates for EI maximization |
//! | `noise_variance` | 1e-6 | Observation noise added to the kernel diagonal |
//! | `seed` | random | RNG seed for reproducibility |
//!
//! # Examples
//!
//! ```
//! use metalg::optimizer::{BayesianOptimizer, Optimizer};
//! use metalg::{Expr, Float, SearchSpace};
//!
//! let x: Expr = Float::new(-5.0, 5.0).into();
//! let space = SearchSpace::from_expr(&x).unwrap();
//! let mut opt = BayesianOptimizer::builder()
//!     .n_initial_points(4)
//!     .n_candidates(200)
//!     .seed(42)
//!     .build(&space);
//!
//! for _ in 0..8 {
//!     let p = opt.ask().unwrap();
//!     opt.tell(&p, (p[0] - 1.0).powi(2), true).unwrap();
//! }
//! ```

use nalgebra::DMatrix;

use crate::error::Result;
use crate::optimizer::{Optimizer, check_len, random_point};
use crate::rng_util;
use crate::space::{Dimension, SearchSpace};

/// Gaussian-process optimizer over a [`SearchSpace`].
pub struct BayesianOptimizer {
    dimensions: Vec<Dimension>,
    /// `(index, internal bounds)` of every modeled dimension.
    continuous: Vec<(usize, (f64, f64))>,
    rng: fastrand::Rng,
    n_initial_points: usize,
    n_candidates: usize,
    noise_variance: f64,
    observations: Vec<(Vec<f64>, f64)>,
    model: Option<GpModel>,
    stale: bool,
}

impl BayesianOptimizer {
    /// Creates an optimizer with default settings and a random seed.
    #[must_use]
    pub fn new(space: &SearchSpace) -> Self {
        BayesianOptimizerBuilder::new().build(space)
    }

    /// Creates an optimizer with default settings and a fixed seed.
    #[must_use]
    pub fn with_seed(space: &SearchSpace, seed: u64) -> Self {
        BayesianOptimizerBuilder::new().seed(seed).build(space)
    }

    /// Creates a builder for configuring a `BayesianOptimizer`.
    #[must_use]
    pub fn builder() -> BayesianOptimizerBuilder {
        BayesianOptimizerBuilder::new()
    }

    /// All `(x, y)` pairs told so far, failures included.
    #[must_use]
    pub fn observations(&self) -> &[(Vec<f64>, f64)] {
        &self.observations
    }

    fn refit(&mut self) {
        let (x_train, y_train) = self.training_data();
        self.model = fit_gp(&x_train, &y_train, self.noise_variance);
        if self.model.is_none() {
            trace_debug!(
                n_observations = self.observations.len(),
                "GP fit failed, falling back to random candidates"
            );
        }
        self.stale = false;
    }

    /// Normalized modeled components and repaired objectives of the most
    /// recent observations.
    fn training_data(&self) -> (Vec<Vec<f64>>, Vec<f64>) {
        let start = self.observations.len().saturating_sub(MAX_TRAIN_POINTS);
        let recent = &self.observations[start..];

        let worst = recent
            .iter()
            .map(|(_, y)| *y)
            .filter(|y| y.is_finite())
            .fold(f64::NEG_INFINITY, f64::max);
        if !worst.is_finite() {
            return (Vec::new(), Vec::new());
        }

        recent
            .iter()
            .map(|(x, y)| {
                let row = self
                    .continuous
                    .iter()
                    .map(|&(i, (lo, hi))| to_normalized(x[i], lo, hi))
                    .collect();
                (row, if y.is_finite() { *y } else { worst })
            })
            .unzip()
    }

    fn propose(&mut self, model: &GpModel) -> Result<Vec<f64>> {
        let normalized = optimize_acquisition(model, self.continuous.len(), self.n_candidates, &mut self.rng);
        let mut point = random_point(&self.dimensions, &mut self.rng)?;
        for (&(i, (lo, hi)), z) in self.continuous.iter().zip(normalized) {
            // Integer dimensions are rounded by `SearchSpace::decode`.
            point[i] = from_normalized(z, lo, hi).clamp(lo, hi);
        }
        Ok(point)
    }
}

impl Optimizer for BayesianOptimizer {
    fn ask(&mut self) -> Result<Vec<f64>> {
        if self.continuous.is_empty() || self.observations.len() < self.n_initial_points {
            return random_point(&self.dimensions, &mut self.rng);
        }
        if self.stale {
            self.refit();
        }
        match self.model.take() {
            Some(model) => {
                let point = self.propose(&model);
                self.model = Some(model);
                point
            }
            None => random_point(&self.dimensions, &mut self.rng),
        }
    }

    fn tell(&mut self, x: &[f64], y: f64, fit: bool) -> Result<()> {
        check_len(&self.dimensions, x)?;
        self.observations.push((x.to_vec(), y));
        self.stale = true;
        if fit && !self.continuous.is_empty() && self.observations.len() >= self.n_initial_points {
            self.refit();
        }
        Ok(())
    }
}

/// Builder for configuring a [`BayesianOptimizer`].
///
/// Defaults:
/// - `n_initial_points`: 10
/// - `n_candidates`: 1000
/// - `noise_variance`: 1e-6
/// - `seed`: random
#[derive(Debug, Clone, Default)]
pub struct BayesianOptimizerBuilder {
    n_initial_points: Option<usize>,
    n_candidates: Option<usize>,
    noise_variance: Option<f64>,
    seed: Option<u64>,
}

impl BayesianOptimizerBuilder {
    /// Creates a new builder with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the number of random proposals before the GP is used.
    #[must_use]
    pub fn n_initial_points(mut self, n: usize) -> Self {
        self.n_initial_points = Some(n);
        self
    }

    /// Sets the number of random candidates scored per proposal.
    #[must_use]
    pub fn n_candidates(mut self, n: usize) -> Self {
        self.n_candidates = Some(n);
        self
    }

    /// Sets the observation noise variance added to the kernel diagonal.
    ///
    /// Larger values make the GP smoother.
    #[must_use]
    pub fn noise_variance(mut self, v: f64) -> Self {
        self.noise_variance = Some(v);
        self
    }

    /// Sets the random seed for reproducibility.
    #[must_use]
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Builds an optimizer over `space`.
    #[must_use]
    pub fn build(self, space: &SearchSpace) -> BayesianOptimizer {
        let dimensions = space.dimensions().to_vec();
        let continuous = dimensions
            .iter()
            .enumerate()
            .filter_map(|(i, d)| d.distribution.internal_bounds().map(|b| (i, b)))
            .collect();
        BayesianOptimizer {
            dimensions,
            continuous,
            rng: self
                .seed
                .map_or_else(fastrand::Rng::new, fastrand::Rng::with_seed),
            n_initial_points: self.n_initial_points.unwrap_or(DEFAULT_N_INITIAL),
            n_candidates: self.n_candidates.unwrap_or(DEFAULT_N_CANDIDATES).max(1),
            noise_variance: self.noise_variance.unwrap_or(DEFAULT_NOISE_VAR),
            observations: Vec::new(),
            model: None,
            stale: true,
        }
    }
}

const DEFAULT_N_INITIAL: usize = 10;
const DEFAULT_N_CANDIDATES: usize = 1000;
const DEFAULT_NOISE_VAR: f64 = 1e-6;

/// Caps fitting cost at O(`MAX_TRAIN_POINTS`^3) per proposal.
const MAX_TRAIN_POINTS: usize = 100;

const SQRT_5: f64 = 2.236_067_977_499_79;

/// A fitted GP model ready for predictions.
struct GpModel {
    /// Cholesky factor of K + σ²I.
    cholesky: nalgebra::linalg::Cholesky<f64, nalgebra::Dyn>,
    /// α = (K + σ²I)^{-1} y.
    alpha: nalgebra::DVector<f64>,
    /// Training inputs normalized to [0, 1].
    x_train: Vec<Vec<f64>>,
    lengthscales: Vec<f64>,
    signal_var: f64,
    /// Best observed standardized y.
    f_best: f64,
}

/// Matérn 5/2 kernel with ARD lengthscales.
///
/// `k(x1, x2) = σ² (1 + √5 r + 5/3 r²) exp(-√5 r)`
/// where `r = sqrt(Σ ((x1_i - x2_i) / l_i)²)`
fn matern52(x1: &[f64], x2: &[f64], lengthscales: &[f64], signal_var: f64) -> f64 {
    let r_sq: f64 = x1
        .iter()
        .zip(x2)
        .zip(lengthscales)
        .map(|((a, b), l)| ((a - b) / l).powi(2))
        .sum();
    let sqrt5_r = SQRT_5 * r_sq.sqrt();
    signal_var * (1.0 + sqrt5_r + 5.0 / 3.0 * r_sq) * (-sqrt5_r).exp()
}

/// Builds `K + σ²I`.
fn kernel_matrix(x: &[Vec<f64>], lengthscales: &[f64], signal_var: f64, noise_var: f64) -> DMatrix<f64> {
    let n = x.len();
    DMatrix::from_fn(n, n, |i, j| {
        let k = matern52(&x[i], &x[j], lengthscales, signal_var);
        if i == j { k + noise_var } else { k }
    })
}

fn kernel_vector(
    x_star: &[f64],
    x_train: &[Vec<f64>],
    lengthscales: &[f64],
    signal_var: f64,
) -> nalgebra::DVector<f64> {
    nalgebra::DVector::from_fn(x_train.len(), |i, _| {
        matern52(x_star, &x_train[i], lengthscales, signal_var)
    })
}

/// Fits a GP to the training data, or `None` if the data is empty or the
/// Cholesky decomposition fails.
#[allow(clippy::cast_precision_loss)]
fn fit_gp(x_train: &[Vec<f64>], y_train: &[f64], noise_var: f64) -> Option<GpModel> {
    let n = y_train.len();
    if n == 0 {
        return None;
    }

    let y_mean = y_train.iter().sum::<f64>() / n as f64;
    let y_var = if n > 1 {
        y_train.iter().map(|&y| (y - y_mean).powi(2)).sum::<f64>() / (n - 1) as f64
    } else {
        1.0
    };
    let y_std = y_var.sqrt().max(1e-10);
    let y_standardized: Vec<f64> = y_train.iter().map(|&y| (y - y_mean) / y_std).collect();
    let f_best = y_standardized.iter().copied().fold(f64::INFINITY, f64::min);

    let d = x_train.first().map_or(0, Vec::len);
    let lengthscales: Vec<f64> = (0..d)
        .map(|j| {
            let mean_j = x_train.iter().map(|x| x[j]).sum::<f64>() / n as f64;
            let var_j = x_train.iter().map(|x| (x[j] - mean_j).powi(2)).sum::<f64>() / n as f64;
            var_j.sqrt().max(0.01)
        })
        .collect();

    // Data is standardized.
    let signal_var = 1.0;

    let k = kernel_matrix(x_train, &lengthscales, signal_var, noise_var);
    let cholesky = nalgebra::linalg::Cholesky::new(k)?;
    let alpha = cholesky.solve(&nalgebra::DVector::from_column_slice(&y_standardized));

    Some(GpModel {
        cholesky,
        alpha,
        x_train: x_train.to_vec(),
        lengthscales,
        signal_var,
        f_best,
    })
}

/// Posterior mean and standard deviation at `x`.
fn predict(model: &GpModel, x: &[f64]) -> (f64, f64) {
    let k_star = kernel_vector(x, &model.x_train, &model.lengthscales, model.signal_var);
    let mean = k_star.dot(&model.alpha);
    let v = model.cholesky.solve(&k_star);
    let var = (model.signal_var - k_star.dot(&v)).max(0.0);
    (mean, var.sqrt())
}

fn norm_pdf(x: f64) -> f64 {
    const INV_SQRT_2PI: f64 = 0.398_942_280_401_432_7;
    INV_SQRT_2PI * (-0.5 * x * x).exp()
}

/// Standard normal CDF (Abramowitz-Stegun rational approximation).
fn norm_cdf(x: f64) -> f64 {
    if x < -8.0 {
        return 0.0;
    }
    if x > 8.0 {
        return 1.0;
    }

    let t = 1.0 / (1.0 + 0.231_641_9 * x.abs());
    let t2 = t * t;
    let t3 = t2 * t;
    let t4 = t3 * t;
    let t5 = t4 * t;
    let poly = 0.319_381_530 * t - 0.356_563_782 * t2 + 1.781_477_937 * t3 - 1.821_255_978 * t4
        + 1.330_274_429 * t5;
    let cdf = 1.0 - norm_pdf(x.abs()) * poly;

    if x >= 0.0 { cdf } else { 1.0 - cdf }
}

/// `EI(x) = (f_best - mean) Φ(z) + std φ(z)` where `z = (f_best - mean) / std`.
fn expected_improvement(mean: f64, std: f64, f_best: f64) -> f64 {
    if std < 1e-12 {
        return (f_best - mean).max(0.0);
    }
    let z = (f_best - mean) / std;
    ((f_best - mean) * norm_cdf(z) + std * norm_pdf(z)).max(0.0)
}

/// The point in [0, 1]^d with the highest EI among random candidates.
fn optimize_acquisition(model: &GpModel, n_dims: usize, n_candidates: usize, rng: &mut fastrand::Rng) -> Vec<f64> {
    let mut best_ei = f64::NEG_INFINITY;
    let mut best_x = vec![0.5; n_dims];

    for _ in 0..n_candidates {
        let x: Vec<f64> = (0..n_dims)
            .map(|_| rng_util::uniform(rng, 0.0, 1.0))
            .collect();
        let (mean, std) = predict(model, &x);
        let ei = expected_improvement(mean, std, model.f_best);
        if ei > best_ei {
            best_ei = ei;
            best_x = x;
        }
    }

    best_x
}

fn to_normalized(value: f64, lo: f64, hi: f64) -> f64 {
    if (hi - lo).abs() < 1e-15 {
        0.5
    } else {
        (value - lo) / (hi - lo)
    }
}

fn from_normalized(value: f64, lo: f64, hi: f64) -> f64 {
    lo + value * (hi - lo)
}
