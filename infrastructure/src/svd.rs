//! Randomized truncated SVD over sparse TF-IDF rows.
//!
//! Follows Halko, Martinsson & Tropp: a seeded Gaussian sketch, a few power
//! iterations, then an exact decomposition of the small projected matrix.

use anyhow::bail;
use ndarray::parallel::prelude::*;
use ndarray::{s, Array1, Array2, Axis};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use shared::types::Result;

use crate::tfidf::SparseVector;

const OVERSAMPLES: usize = 10;
const POWER_ITERATIONS: usize = 5;
const JACOBI_MAX_SWEEPS: usize = 100;
const EPS: f64 = 1e-12;
// Eigenvalues carry absolute error near eps * max, so singular values below
// roughly sqrt(eps) * max are noise.
const SIGMA_RTOL: f64 = 1e-7;

/// Row-major sparse matrix with a known column count.
pub struct SparseMatrix<'a> {
    rows: &'a [SparseVector],
    n_cols: usize,
}

impl<'a> SparseMatrix<'a> {
    pub fn new(rows: &'a [SparseVector], n_cols: usize) -> Self {
        Self { rows, n_cols }
    }

    pub fn n_rows(&self) -> usize {
        self.rows.len()
    }

    pub fn n_cols(&self) -> usize {
        self.n_cols
    }

    /// `self · m`, with `m` of shape `n_cols x l`.
    pub fn mul_dense(&self, m: &Array2<f64>) -> Array2<f64> {
        let mut out = Array2::zeros((self.rows.len(), m.ncols()));
        out.axis_iter_mut(Axis(0))
            .into_par_iter()
            .zip(self.rows.par_iter())
            .for_each(|(mut out_row, row)| {
                for (col, value) in row.iter() {
                    out_row.scaled_add(value, &m.row(col));
                }
            });
        out
    }

    /// `selfᵀ · m`, with `m` of shape `n_rows x l`.
    pub fn t_mul_dense(&self, m: &Array2<f64>) -> Array2<f64> {
        let mut out = Array2::zeros((self.n_cols, m.ncols()));
        for (row, m_row) in self.rows.iter().zip(m.rows()) {
            for (col, value) in row.iter() {
                out.row_mut(col).scaled_add(value, &m_row);
            }
        }
        out
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TruncatedSvd {
    /// Right singular vectors, one per row (`k x n_features`).
    components: Array2<f64>,
    singular_values: Array1<f64>,
}

impl TruncatedSvd {
    /// Fit `n_components` directions. The count is clamped to the matrix rank
    /// bound `min(n_rows, n_cols)`.
    pub fn fit(x: &SparseMatrix<'_>, n_components: usize, seed: u64) -> Result<Self> {
        let max_rank = x.n_rows().min(x.n_cols());
        if max_rank == 0 {
            bail!("cannot decompose an empty matrix");
        }
        let k = n_components.clamp(1, max_rank);
        let l = (k + OVERSAMPLES).min(max_rank);

        let mut rng = StdRng::seed_from_u64(seed);
        let omega = Array2::from_shape_simple_fn((x.n_cols(), l), || standard_normal(&mut rng));

        let mut q = orthonormalize(x.mul_dense(&omega));
        for _ in 0..POWER_ITERATIONS {
            let z = orthonormalize(x.t_mul_dense(&q));
            q = orthonormalize(x.mul_dense(&z));
        }

        // b = qᵀ x, shape l x n_cols
        let b = x.t_mul_dense(&q).reversed_axes();
        let gram = b.dot(&b.t());
        let (eigenvalues, eigenvectors) = symmetric_eigen(gram);

        let mut order: Vec<usize> = (0..eigenvalues.len()).collect();
        order.sort_by(|&i, &j| eigenvalues[j].total_cmp(&eigenvalues[i]));
        order.truncate(k);

        let sigma_max = eigenvalues[order[0]].max(0.0).sqrt();
        let mut components = Array2::zeros((k, x.n_cols()));
        let mut singular_values = Array1::zeros(k);
        for (out, &i) in order.iter().enumerate() {
            let sigma = eigenvalues[i].max(0.0).sqrt();
            if sigma <= SIGMA_RTOL * sigma_max {
                continue;
            }
            let mut v = eigenvectors.column(i).dot(&b) / sigma;
            flip_sign(&mut v);
            components.row_mut(out).assign(&v);
            singular_values[out] = sigma;
        }

        Ok(Self {
            components,
            singular_values,
        })
    }

    pub fn n_components(&self) -> usize {
        self.components.nrows()
    }

    pub fn components(&self) -> &Array2<f64> {
        &self.components
    }

    pub fn singular_values(&self) -> &Array1<f64> {
        &self.singular_values
    }

    /// Project rows into component space (`x · componentsᵀ`).
    pub fn transform(&self, x: &SparseMatrix<'_>) -> Array2<f64> {
        x.mul_dense(&self.components.t().to_owned())
    }

    pub fn transform_row(&self, row: &SparseVector) -> Array1<f64> {
        let mut out = Array1::zeros(self.n_components());
        for (col, value) in row.iter() {
            if col < self.components.ncols() {
                out.scaled_add(value, &self.components.column(col));
            }
        }
        out
    }
}

fn standard_normal(rng: &mut StdRng) -> f64 {
    // Box-Muller; u1 is kept away from zero so ln() stays finite.
    let u1: f64 = rng.gen_range(f64::EPSILON..1.0);
    let u2: f64 = rng.gen();
    (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos()
}

/// Orthonormal basis for the column space of `a` (modified Gram-Schmidt, run
/// twice). Columns that collapse to zero stay zero.
fn orthonormalize(mut a: Array2<f64>) -> Array2<f64> {
    let n = a.ncols();
    for _pass in 0..2 {
        for j in 0..n {
            for i in 0..j {
                let (done, mut rest) = a.multi_slice_mut((s![.., i], s![.., j]));
                let projection = done.dot(&rest);
                rest.scaled_add(-projection, &done);
            }
            let mut column = a.column_mut(j);
            let norm = column.dot(&column).sqrt();
            if norm > EPS {
                column /= norm;
            } else {
                column.fill(0.0);
            }
        }
    }
    a
}

/// Eigen-decomposition of a symmetric matrix by cyclic Jacobi rotations.
/// Returns eigenvalues and the matching eigenvectors as columns.
fn symmetric_eigen(mut a: Array2<f64>) -> (Vec<f64>, Array2<f64>) {
    let n = a.nrows();
    let mut v = Array2::<f64>::eye(n);

    for _sweep in 0..JACOBI_MAX_SWEEPS {
        let off: f64 = (0..n)
            .flat_map(|p| (p + 1..n).map(move |q| (p, q)))
            .map(|(p, q)| a[[p, q]] * a[[p, q]])
            .sum();
        let scale: f64 = a.diag().iter().map(|d| d * d).sum::<f64>().max(EPS);
        if off <= EPS * EPS * scale {
            break;
        }

        for p in 0..n {
            for q in p + 1..n {
                let apq = a[[p, q]];
                if apq.abs() < f64::MIN_POSITIVE {
                    continue;
                }
                let theta = (a[[q, q]] - a[[p, p]]) / (2.0 * apq);
                let t = theta.signum() / (theta.abs() + (theta * theta + 1.0).sqrt());
                let c = 1.0 / (t * t + 1.0).sqrt();
                let s = t * c;
                rotate(&mut a, &mut v, p, q, c, s);
            }
        }
    }

    (a.diag().to_vec(), v)
}

fn rotate(a: &mut Array2<f64>, v: &mut Array2<f64>, p: usize, q: usize, c: f64, s: f64) {
    let n = a.nrows();
    for k in 0..n {
        let (akp, akq) = (a[[k, p]], a[[k, q]]);
        a[[k, p]] = c * akp - s * akq;
        a[[k, q]] = s * akp + c * akq;
    }
    for k in 0..n {
        let (apk, aqk) = (a[[p, k]], a[[q, k]]);
        a[[p, k]] = c * apk - s * aqk;
        a[[q, k]] = s * apk + c * aqk;
    }
    for k in 0..n {
        let (vkp, vkq) = (v[[k, p]], v[[k, q]]);
        v[[k, p]] = c * vkp - s * vkq;
        v[[k, q]] = s * vkp + c * vkq;
    }
}

/// Make the largest-magnitude entry positive so fits are sign-stable.
fn flip_sign(v: &mut Array1<f64>) {
    let pivot = v
        .iter()
        .copied()
        .max_by(|a, b| a.abs().total_cmp(&b.abs()))
        .unwrap_or(0.0);
    if pivot < 0.0 {
        v.mapv_inplace(|x| -x);
    }
}
