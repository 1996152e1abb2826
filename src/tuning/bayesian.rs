//! Bayesian tuning strategy: a Gaussian-process surrogate over the
//! numerically encoded configuration vector, with a pluggable acquisition
//! function.

use super::{Configuration, TuningStrategy};
use crate::options::{AcquisitionOpt, ContainerOpt, DataLayoutOpt, Newton3Opt, TraversalOpt};
use nalgebra::{DMatrix, DVector};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::time::Duration;

/// Squared-exponential kernel length scale in encoded space.
const LENGTH_SCALE: f64 = 0.4;
/// Observation noise added to the kernel diagonal.
const NOISE: f64 = 1e-6;
/// Exploration weight for the confidence-bound acquisitions.
const KAPPA: f64 = 2.0;
/// Random seed points measured before the surrogate takes over.
const SEED_POINTS: usize = 2;

pub struct BayesianSearch {
    space: Vec<Configuration>,
    encoded: Vec<DVector<f64>>,
    acquisition: AcquisitionOpt,
    max_evidence: usize,
    evidence: Vec<(usize, f64)>,
    current: usize,
    rng: StdRng,
}

impl BayesianSearch {
    pub fn new(
        space: Vec<Configuration>,
        acquisition: AcquisitionOpt,
        max_evidence: usize,
        seed: u64,
    ) -> Self {
        assert!(!space.is_empty());
        let encoded = space.iter().map(encode).collect();
        let mut rng = StdRng::seed_from_u64(seed);
        let current = rng.gen_range(0..space.len());
        BayesianSearch {
            max_evidence: max_evidence.clamp(1, space.len()),
            space,
            encoded,
            acquisition,
            evidence: Vec::new(),
            current,
            rng,
        }
    }

    fn index_of(&self, cfg: &Configuration) -> Option<usize> {
        self.space.iter().position(|c| c == cfg)
    }

    fn unevaluated(&self) -> Vec<usize> {
        (0..self.space.len())
            .filter(|i| !self.evidence.iter().any(|(j, _)| j == i))
            .collect()
    }

    /// Posterior (mean, variance) at every candidate index, on normalized
    /// log times.
    fn posterior(&self, candidates: &[usize]) -> Option<Vec<(f64, f64)>> {
        let n = self.evidence.len();
        if n == 0 {
            return None;
        }
        let ys: Vec<f64> = self.evidence.iter().map(|&(_, t)| t.ln()).collect();
        let mean = ys.iter().sum::<f64>() / n as f64;
        let var = (ys.iter().map(|y| (y - mean).powi(2)).sum::<f64>() / n as f64).max(1e-12);
        let std = var.sqrt();
        let y = DVector::from_iterator(n, ys.iter().map(|v| (v - mean) / std));

        let xs: Vec<&DVector<f64>> = self.evidence.iter().map(|&(i, _)| &self.encoded[i]).collect();
        let k = DMatrix::from_fn(n, n, |r, c| {
            kernel(xs[r], xs[c]) + if r == c { NOISE } else { 0.0 }
        });
        let chol = k.cholesky()?;
        let alpha = chol.solve(&y);

        let mut out = Vec::with_capacity(candidates.len());
        for &ci in candidates {
            let x = &self.encoded[ci];
            let ks = DVector::from_iterator(n, xs.iter().map(|xi| kernel(xi, x)));
            let mu = ks.dot(&alpha);
            let v = chol.solve(&ks);
            let sigma2 = (kernel(x, x) - ks.dot(&v)).max(1e-12);
            out.push((mu, sigma2));
        }
        Some(out)
    }

    /// Picks the most desirable unevaluated candidate under the current
    /// acquisition function. Times are minimized, so confidence bounds are
    /// scored negatively.
    fn pick_next(&mut self) -> usize {
        let candidates = self.unevaluated();
        if candidates.is_empty() {
            return self.current;
        }
        if self.evidence.len() < SEED_POINTS {
            return candidates[self.rng.gen_range(0..candidates.len())];
        }
        let posterior = match self.posterior(&candidates) {
            Some(p) => p,
            None => return candidates[self.rng.gen_range(0..candidates.len())],
        };
        let best = self
            .evidence
            .iter()
            .map(|&(_, t)| t.ln())
            .fold(f64::INFINITY, f64::min);
        // normalize best onto the surrogate's scale
        let ys: Vec<f64> = self.evidence.iter().map(|&(_, t)| t.ln()).collect();
        let mean = ys.iter().sum::<f64>() / ys.len() as f64;
        let var =
            (ys.iter().map(|y| (y - mean).powi(2)).sum::<f64>() / ys.len() as f64).max(1e-12);
        let best = (best - mean) / var.sqrt();

        let mut winner = candidates[0];
        let mut winner_score = f64::NEG_INFINITY;
        for (&ci, &(mu, sigma2)) in candidates.iter().zip(posterior.iter()) {
            let sigma = sigma2.sqrt();
            let score = match self.acquisition {
                AcquisitionOpt::UpperConfidenceBound => -(mu + KAPPA * sigma),
                AcquisitionOpt::LowerConfidenceBound => -(mu - KAPPA * sigma),
                AcquisitionOpt::Mean => -mu,
                AcquisitionOpt::Variance => sigma2,
                AcquisitionOpt::ProbabilityOfDecrease => normal_cdf((best - mu) / sigma),
                AcquisitionOpt::ExpectedDecrease => {
                    let z = (best - mu) / sigma;
                    (best - mu) * normal_cdf(z) + sigma * normal_pdf(z)
                }
            };
            if score > winner_score {
                winner_score = score;
                winner = ci;
            }
        }
        winner
    }
}

impl TuningStrategy for BayesianSearch {
    fn reset(&mut self) {
        self.evidence.clear();
        self.current = self.rng.gen_range(0..self.space.len());
    }

    fn current(&self) -> Configuration {
        self.space[self.current]
    }

    fn report(&mut self, cfg: Configuration, time: Duration) {
        if let Some(i) = self.index_of(&cfg) {
            self.evidence.push((i, time.as_secs_f64().max(1e-9)));
        }
    }

    fn next(&mut self) -> Option<Configuration> {
        if self.evidence.len() >= self.max_evidence {
            return None;
        }
        self.current = self.pick_next();
        Some(self.space[self.current])
    }

    fn best_so_far(&self) -> Configuration {
        self.evidence
            .iter()
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|&(i, _)| self.space[i])
            .unwrap_or(self.space[self.current])
    }
}

fn encode(cfg: &Configuration) -> DVector<f64> {
    let container = ContainerOpt::all().iter().position(|&c| c == cfg.container).unwrap() as f64
        / ContainerOpt::all().len() as f64;
    let traversal = TraversalOpt::all().iter().position(|&t| t == cfg.traversal).unwrap() as f64
        / TraversalOpt::all().len() as f64;
    let layout = DataLayoutOpt::all().iter().position(|&l| l == cfg.data_layout).unwrap() as f64
        / DataLayoutOpt::all().len() as f64;
    let newton3 = match cfg.newton3 {
        Newton3Opt::Enabled => 1.0,
        Newton3Opt::Disabled => 0.0,
    };
    DVector::from_vec(vec![
        container,
        traversal,
        layout,
        newton3,
        cfg.cell_size_factor as f64,
    ])
}

fn kernel(a: &DVector<f64>, b: &DVector<f64>) -> f64 {
    let d2 = (a - b).norm_squared();
    (-d2 / (2.0 * LENGTH_SCALE * LENGTH_SCALE)).exp()
}

fn normal_pdf(x: f64) -> f64 {
    (-(x * x) / 2.0).exp() / (2.0 * std::f64::consts::PI).sqrt()
}

fn normal_cdf(x: f64) -> f64 {
    0.5 * (1.0 + erf(x / std::f64::consts::SQRT_2))
}

/// Abramowitz & Stegun 7.1.26, max error 1.5e-7.
fn erf(x: f64) -> f64 {
    let sign = if x < 0.0 { -1.0 } else { 1.0 };
    let x = x.abs();
    let t = 1.0 / (1.0 + 0.3275911 * x);
    let y = 1.0
        - (((((1.061405429 * t - 1.453152027) * t) + 1.421413741) * t - 0.284496736) * t
            + 0.254829592)
            * t
            * (-x * x).exp();
    sign * y
}


// -- end of file --
