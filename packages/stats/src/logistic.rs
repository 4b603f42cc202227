//! Binary logistic regression fitted by iteratively reweighted least squares.

use crate::StatsError;
use crate::distribution::two_sided_p_value;
use crate::linalg::Matrix;

const DEFAULT_MAX_ITERATIONS: u32 = 25;
const DEFAULT_TOLERANCE: f64 = 1e-8;

/// Fitted probabilities are kept this far from 0 and 1 so the working
/// weights never vanish.
const PROBABILITY_EPSILON: f64 = 1e-10;

/// One fitted coefficient with its Wald statistics.
#[derive(Debug, Clone, PartialEq)]
pub struct Coefficient {
    /// Predictor column name.
    pub name: String,
    /// Estimated log-odds effect.
    pub estimate: f64,
    /// Standard error from the inverse Fisher information.
    pub std_error: f64,
    /// Wald statistic `estimate / std_error`.
    pub z_value: f64,
    /// Two-sided p-value of the Wald statistic.
    pub p_value: f64,
}

/// Result of a logistic regression fit.
#[derive(Debug, Clone, PartialEq)]
pub struct LogisticFit {
    /// One entry per design matrix column, in column order.
    pub coefficients: Vec<Coefficient>,
    /// Deviance of the intercept-only model.
    pub null_deviance: f64,
    /// Deviance of the fitted model.
    pub residual_deviance: f64,
    /// Akaike information criterion, `deviance + 2p`.
    pub aic: f64,
    /// Rows used in the fit.
    pub observations: usize,
    /// IRLS iterations performed.
    pub iterations: u32,
}

impl LogisticFit {
    /// Looks up a coefficient by predictor name.
    #[must_use]
    pub fn coefficient(&self, name: &str) -> Option<&Coefficient> {
        self.coefficients.iter().find(|c| c.name == name)
    }
}

/// Logistic regression settings.
#[derive(Debug, Clone, Copy)]
pub struct LogisticRegression {
    max_iterations: u32,
    tolerance: f64,
}

impl Default for LogisticRegression {
    fn default() -> Self {
        Self::new()
    }
}

impl LogisticRegression {
    /// Creates a model with the default iteration limit (25) and deviance
    /// tolerance (`1e-8`).
    #[must_use]
    pub const fn new() -> Self {
        Self {
            max_iterations: DEFAULT_MAX_ITERATIONS,
            tolerance: DEFAULT_TOLERANCE,
        }
    }

    #[cfg(test)]
    const fn with_max_iterations(mut self, max_iterations: u32) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// Fits `P(y) = σ(Xβ)`.
    ///
    /// `x` must already contain the intercept column if one is wanted;
    /// `names` labels each column of `x`.
    ///
    /// # Errors
    ///
    /// * [`StatsError::Empty`] if there are no rows
    /// * [`StatsError::DimensionMismatch`] if `y` or `names` disagree with
    ///   the shape of `x`
    /// * [`StatsError::Singular`] if the design has collinear columns
    /// * [`StatsError::NotConverged`] if the deviance has not settled after
    ///   the iteration limit
    #[allow(clippy::cast_precision_loss)]
    pub fn fit(&self, x: &Matrix, y: &[bool], names: &[String]) -> Result<LogisticFit, StatsError> {
        let n = x.rows();
        let p = x.cols();

        if n == 0 {
            return Err(StatsError::Empty);
        }
        if y.len() != n {
            return Err(StatsError::DimensionMismatch {
                message: format!("{n} design rows but {} responses", y.len()),
            });
        }
        if names.len() != p {
            return Err(StatsError::DimensionMismatch {
                message: format!("{p} design columns but {} names", names.len()),
            });
        }

        let targets: Vec<f64> = y.iter().map(|&v| if v { 1.0 } else { 0.0 }).collect();
        let mut beta = vec![0.0; p];
        let mut deviance = binomial_deviance(&targets, &vec![0.5; n]);
        let mut iterations = 0;
        let mut converged = false;

        while iterations < self.max_iterations {
            iterations += 1;

            let mu = fitted(x, &beta);
            let weights: Vec<f64> = mu.iter().map(|m| m * (1.0 - m)).collect();
            let eta = x.mul_vec(&beta);
            let working: Vec<f64> = (0..n)
                .map(|i| eta[i] + (targets[i] - mu[i]) / weights[i])
                .collect();

            let (xtwx, xtwz) = x.weighted_normal_equations(&weights, &working);
            beta = xtwx.inverse()?.mul_vec(&xtwz);

            let previous = deviance;
            deviance = binomial_deviance(&targets, &fitted(x, &beta));
            log::trace!("IRLS iteration {iterations}: deviance {deviance}");

            if (deviance - previous).abs() / (deviance.abs() + 0.1) < self.tolerance {
                converged = true;
                break;
            }
        }

        if !converged {
            return Err(StatsError::NotConverged { iterations });
        }

        let mu = fitted(x, &beta);
        let weights: Vec<f64> = mu.iter().map(|m| m * (1.0 - m)).collect();
        let (information, _) = x.weighted_normal_equations(&weights, &vec![0.0; n]);
        let covariance = information.inverse()?;

        let coefficients = names
            .iter()
            .zip(&beta)
            .enumerate()
            .map(|(j, (name, &estimate))| {
                let std_error = covariance.get(j, j).max(0.0).sqrt();
                let z_value = estimate / std_error;
                Coefficient {
                    name: name.clone(),
                    estimate,
                    std_error,
                    z_value,
                    p_value: two_sided_p_value(z_value),
                }
            })
            .collect();

        let mean = targets.iter().sum::<f64>() / n as f64;
        let null_deviance = binomial_deviance(&targets, &vec![clamp_probability(mean); n]);

        log::debug!(
            "Logistic fit converged in {iterations} iterations over {n} rows: \
             null deviance {null_deviance:.3}, residual deviance {deviance:.3}"
        );

        Ok(LogisticFit {
            coefficients,
            null_deviance,
            residual_deviance: deviance,
            aic: 2.0f64.mul_add(p as f64, deviance),
            observations: n,
            iterations,
        })
    }
}

fn fitted(x: &Matrix, beta: &[f64]) -> Vec<f64> {
    x.mul_vec(beta)
        .into_iter()
        .map(|eta| clamp_probability(1.0 / (1.0 + (-eta).exp())))
        .collect()
}

fn clamp_probability(p: f64) -> f64 {
    p.clamp(PROBABILITY_EPSILON, 1.0 - PROBABILITY_EPSILON)
}

fn binomial_deviance(y: &[f64], mu: &[f64]) -> f64 {
    -2.0 * y
        .iter()
        .zip(mu)
        .map(|(&yi, &mi)| yi.mul_add(mi.ln(), (1.0 - yi) * (1.0 - mi).ln()))
        .sum::<f64>()
}
