//! Numeric series for plotting `n^log_b(a)`, `f(n)` and `T(n)`.

use serde::{Deserialize, Serialize};

use crate::error::RecurResult;
use crate::params::RecurrenceParams;
use crate::theorem::Case;

/// Number of sample points.
pub const SAMPLE_COUNT: usize = 400;
pub const DOMAIN_START: f64 = 1.0;
pub const DOMAIN_END: f64 = 100.0;

/// Four index-aligned series over the same `n` domain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlotSeries {
    pub n: Vec<f64>,
    pub n_log_b_a: Vec<f64>,
    pub f_n: Vec<f64>,
    pub time_complexity: Vec<f64>,
}

impl PlotSeries {
    pub fn len(&self) -> usize {
        self.n.len()
    }

    pub fn is_empty(&self) -> bool {
        self.n.is_empty()
    }

    /// Rows of `(n, n_log_b_a, f_n, time_complexity)`.
    pub fn rows(&self) -> impl Iterator<Item = (f64, f64, f64, f64)> + '_ {
        self.n
            .iter()
            .zip(&self.n_log_b_a)
            .zip(&self.f_n)
            .zip(&self.time_complexity)
            .map(|(((n, l), f), t)| (*n, *l, *f, *t))
    }

    /// Keep every `step`-th point plus the last one, so the domain end survives thinning.
    pub fn every_nth(&self, step: usize) -> PlotSeries {
        let step = step.max(1);
        let last = self.len().saturating_sub(1);
        let keep: Vec<usize> = (0..self.len())
            .filter(|i| i % step == 0 || *i == last)
            .collect();
        let pick = |v: &Vec<f64>| -> Vec<f64> { keep.iter().map(|&i| v[i]).collect() };
        PlotSeries {
            n: pick(&self.n),
            n_log_b_a: pick(&self.n_log_b_a),
            f_n: pick(&self.f_n),
            time_complexity: pick(&self.time_complexity),
        }
    }
}

/// `count` evenly spaced values over `[start, end]`, endpoints included.
fn linspace(start: f64, end: f64, count: usize) -> Vec<f64> {
    match count {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (end - start) / (count - 1) as f64;
            (0..count)
                .map(|i| {
                    if i == count - 1 {
                        end
                    } else {
                        start + step * i as f64
                    }
                })
                .collect()
        }
    }
}

impl RecurrenceParams {
    pub fn sample(&self) -> PlotSeries {
        let k = self.k();
        let log_b_a = self.log_b_a();
        let case = Case::of(log_b_a, k);

        let n = linspace(DOMAIN_START, DOMAIN_END, SAMPLE_COUNT);
        let n_log_b_a: Vec<f64> = n.iter().map(|x| x.powf(log_b_a)).collect();

        let f_n: Vec<f64> = match case {
            Case::Three if k == 0 => vec![1.0; n.len()],
            _ => n.iter().map(|x| x.powf(k as f64)).collect(),
        };

        let time_complexity = match case {
            Case::One => n_log_b_a.clone(),
            Case::Two => n.iter().map(|x| x.powf(log_b_a) * x.ln()).collect(),
            Case::Three => f_n.clone(),
        };

        PlotSeries {
            n,
            n_log_b_a,
            f_n,
            time_complexity,
        }
    }
}

/// Validate `(a, b, k)` and sample the curves.
pub fn sample(a: i64, b: i64, k: i64) -> RecurResult<PlotSeries> {
    Ok(RecurrenceParams::new(a, b, k)?.sample())
}
