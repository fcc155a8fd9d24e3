//! Savitzky-Golay smoothing of monthly series
//!
//! Monthly samples from the archive are noisy: a slow month or a partially
//! processed day shows up as a dent in every language's curve. A local
//! polynomial regression removes most of that noise while keeping the overall
//! shape of the trend, which a plain moving average would flatten at the ends.

use crate::Result;
use serde::Deserialize;

/// Local polynomial regression filter
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct SavitzkyGolay {
    /// Number of consecutive samples in each local fit (odd)
    pub window: usize,

    /// Degree of the fitted polynomial (lower than `window`)
    pub degree: usize,
}
//
impl SavitzkyGolay {
    /// Set up a filter, checking its parameters
    #[cfg(test)]
    pub fn new(window: usize, degree: usize) -> Result<Self> {
        let filter = Self { window, degree };
        filter.validate()?;
        Ok(filter)
    }

    /// Check that the filter parameters describe a valid filter
    pub fn validate(&self) -> Result<()> {
        anyhow::ensure!(
            self.window % 2 == 1,
            "smoothing window must hold an odd number of samples, got {}",
            self.window
        );
        anyhow::ensure!(
            self.degree < self.window,
            "cannot fit a degree {} polynomial over {} samples",
            self.degree,
            self.window
        );
        Ok(())
    }

    /// Smooth a series of samples
    ///
    /// The output has the same length as the input. Samples that are less than
    /// half a window away from either end do not have a centred window, so
    /// they are evaluated on the polynomial fitted to the first or last full
    /// window instead. Series shorter than the window are smoothed with the
    /// largest odd window that fits.
    pub fn apply(&self, samples: &[f64]) -> Vec<f64> {
        let len = samples.len();
        if len == 0 {
            return Vec::new();
        }
        let window = if self.window <= len {
            self.window
        } else if len % 2 == 1 {
            len
        } else {
            len - 1
        };
        let degree = self.degree.min(window - 1);
        let half = window / 2;
        let offsets = (0..window)
            .map(|idx| idx as f64 - half as f64)
            .collect::<Vec<_>>();

        let mut smoothed = Vec::with_capacity(len);
        let head = fit_polynomial(&offsets, &samples[..window], degree);
        smoothed.extend(offsets[..half].iter().map(|&t| evaluate(&head, t)));
        for centre in half..len - half {
            let local = fit_polynomial(&offsets, &samples[centre - half..=centre + half], degree);
            smoothed.push(local[0]);
        }
        let tail = fit_polynomial(&offsets, &samples[len - window..], degree);
        smoothed.extend(offsets[window - half..].iter().map(|&t| evaluate(&tail, t)));
        debug_assert_eq!(smoothed.len(), len);
        smoothed
    }
}
//
impl Default for SavitzkyGolay {
    fn default() -> Self {
        Self {
            window: 7,
            degree: 1,
        }
    }
}

/// Least-squares fit of a polynomial, returns coefficients by increasing power
fn fit_polynomial(ts: &[f64], ys: &[f64], degree: usize) -> Vec<f64> {
    debug_assert_eq!(ts.len(), ys.len());
    let size = degree + 1;

    // Normal equations of the least-squares problem
    let mut lhs = vec![vec![0.0; size]; size];
    let mut rhs = vec![0.0; size];
    for (&t, &y) in ts.iter().zip(ys) {
        let powers = std::iter::successors(Some(1.0), |p| Some(p * t))
            .take(2 * size - 1)
            .collect::<Vec<f64>>();
        for row in 0..size {
            for col in 0..size {
                lhs[row][col] += powers[row + col];
            }
            rhs[row] += y * powers[row];
        }
    }
    solve(lhs, rhs)
}

/// Solve a small dense linear system by Gaussian elimination
fn solve(mut lhs: Vec<Vec<f64>>, mut rhs: Vec<f64>) -> Vec<f64> {
    let size = rhs.len();
    for col in 0..size {
        let pivot = (col..size)
            .max_by(|&a, &b| lhs[a][col].abs().total_cmp(&lhs[b][col].abs()))
            .unwrap_or(col);
        lhs.swap(col, pivot);
        rhs.swap(col, pivot);
        let pivot_row = lhs[col].clone();
        for row in col + 1..size {
            let factor = lhs[row][col] / pivot_row[col];
            for (dst, src) in lhs[row][col..].iter_mut().zip(&pivot_row[col..]) {
                *dst -= factor * src;
            }
            rhs[row] -= factor * rhs[col];
        }
    }
    let mut solution = vec![0.0; size];
    for row in (0..size).rev() {
        let known = (row + 1..size)
            .map(|col| lhs[row][col] * solution[col])
            .sum::<f64>();
        solution[row] = (rhs[row] - known) / lhs[row][row];
    }
    solution
}

/// Evaluate a polynomial given by increasing-power coefficients
fn evaluate(coefficients: &[f64], t: f64) -> f64 {
    coefficients.iter().rev().fold(0.0, |acc, c| acc * t + c)
}
