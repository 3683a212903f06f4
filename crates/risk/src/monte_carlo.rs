use crate::stats::{mean, percentile};
use crate::types::MonteCarloResult;
use log::debug;
use nalgebra::{Cholesky, DMatrix, DVector};
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::Rng;
use rand_distr::StandardNormal;
use vigil_ports::{RiskError, RiskResult};

/// Diagonal bump applied once when the covariance matrix is not
/// positive-definite as supplied.
const REGULARIZATION_EPS: f64 = 1e-8;

/// Maximum number of histogram buckets in the result.
const HISTOGRAM_BUCKETS: usize = 100;

/// Correlated Monte Carlo simulation of total portfolio return.
///
/// Draws are generated as one standard-normal matrix of shape
/// `(simulations * days) x assets` and correlated through the Cholesky
/// factor in a single matrix product, so the cost is dominated by BLAS
/// kernels rather than per-scalar loops. Each path compounds its daily
/// returns multiplicatively.
pub fn run_monte_carlo(
    weights: &[f64],
    mean_returns: &[f64],
    covariance: &[Vec<f64>],
    days: u32,
    simulations: usize,
) -> RiskResult<MonteCarloResult> {
    let mut rng = StdRng::from_entropy();
    run_monte_carlo_with_rng(weights, mean_returns, covariance, days, simulations, &mut rng)
}

/// Same as [`run_monte_carlo`] but with a caller-supplied RNG, which
/// makes simulations reproducible.
pub fn run_monte_carlo_with_rng(
    weights: &[f64],
    mean_returns: &[f64],
    covariance: &[Vec<f64>],
    days: u32,
    simulations: usize,
    rng: &mut StdRng,
) -> RiskResult<MonteCarloResult> {
    let assets = weights.len();
    if assets == 0 {
        return Err(RiskError::InputShape("no assets".to_string()));
    }
    if mean_returns.len() != assets {
        return Err(RiskError::InputShape(format!(
            "{} weights for {} mean returns",
            assets,
            mean_returns.len()
        )));
    }
    if covariance.len() != assets || covariance.iter().any(|row| row.len() != assets) {
        return Err(RiskError::InputShape(format!(
            "covariance matrix is not {assets}x{assets}"
        )));
    }
    if days < 1 {
        return Err(RiskError::InvalidParameter(
            "horizon must be at least one day".to_string(),
        ));
    }
    if simulations < 1 {
        return Err(RiskError::InvalidParameter(
            "at least one simulation path is required".to_string(),
        ));
    }

    let cov = DMatrix::from_fn(assets, assets, |i, j| covariance[i][j]);
    let factor = cholesky_with_retry(cov)?;
    let l_t = factor.l().transpose();

    let days_usize = days as usize;
    let rows = simulations * days_usize;
    let z = DMatrix::from_fn(rows, assets, |_, _| rng.sample::<f64, _>(StandardNormal));
    let correlated = z * l_t;

    let w = DVector::from_column_slice(weights);
    let mu = DVector::from_column_slice(mean_returns);
    let drift = mu.dot(&w);
    let shocks = correlated * w;

    let mut totals = Vec::with_capacity(simulations);
    for path in 0..simulations {
        let mut compounded = 1.0;
        for day in 0..days_usize {
            compounded *= 1.0 + drift + shocks[path * days_usize + day];
        }
        totals.push((compounded - 1.0) * 100.0);
    }

    let var95_pct = percentile(&totals, 5.0);
    let var99_pct = percentile(&totals, 1.0);
    let tail: Vec<f64> = totals.iter().copied().filter(|r| *r <= var95_pct).collect();
    let cvar95_pct = if tail.is_empty() { var95_pct } else { mean(&tail) };

    Ok(MonteCarloResult {
        expected_return_pct: percentile(&totals, 50.0),
        best_case_pct: percentile(&totals, 95.0),
        worst_case_pct: percentile(&totals, 5.0),
        var95_pct,
        var99_pct,
        cvar95_pct,
        simulations,
        horizon_days: days,
        histogram: histogram(&totals),
    })
}

/// Cholesky with one regularization retry: bump the diagonal by a
/// small epsilon, and give up if the matrix still is not
/// positive-definite.
fn cholesky_with_retry(cov: DMatrix<f64>) -> RiskResult<Cholesky<f64, nalgebra::Dyn>> {
    if let Some(factor) = Cholesky::new(cov.clone()) {
        return Ok(factor);
    }
    debug!("covariance not positive-definite, regularizing diagonal");
    let n = cov.nrows();
    let mut regularized = cov;
    for i in 0..n {
        regularized[(i, i)] += REGULARIZATION_EPS;
    }
    Cholesky::new(regularized).ok_or(RiskError::IllConditionedCovariance)
}

fn histogram(totals: &[f64]) -> Vec<u32> {
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    for t in totals {
        min = min.min(*t);
        max = max.max(*t);
    }
    if !min.is_finite() || !max.is_finite() || (max - min) <= f64::EPSILON {
        return vec![totals.len() as u32];
    }

    let mut buckets = vec![0u32; HISTOGRAM_BUCKETS];
    let span = max - min;
    for t in totals {
        let idx = (((t - min) / span) * HISTOGRAM_BUCKETS as f64) as usize;
        buckets[idx.min(HISTOGRAM_BUCKETS - 1)] += 1;
    }
    buckets
}
