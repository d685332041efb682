//! Connectome normalizations and nodal degree.
//!
//! Each connectome-bearing module stores its matrices with a slightly
//! different layout and value range. [`ConnectomeProfile`] captures the
//! per-module normalization applied before the matrix is plotted and
//! before degree is computed.
//!
//! | Profile          | Normalization                                        | Degree                        |
//! |------------------|------------------------------------------------------|-------------------------------|
//! | Functional       | drop 49 subcortical rows/cols, `atanh`, non-finite → 0, symmetrize | row sums of positive values |
//! | Structural       | symmetrize, `ln`, `-inf` → 0, 0 → `ε`                | row sums of the cortical block |
//! | Microstructural  | symmetrize, drop first row/col, non-finite and 0 → `ε` | row sums                     |
//! | Geodesic         | drop first row/col                                   | row sums                      |

use qc_model::Matrix;

use crate::error::{ConnectomeError, Result};

/// Number of subcortical and cerebellar regions preceding the cortical
/// parcels in functional and structural connectomes.
pub const SUBCORTICAL_OFFSET: usize = 49;

/// Module-specific connectome handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectomeProfile {
    Functional,
    Structural,
    Microstructural,
    Geodesic,
}

/// A normalized connectome and its nodal degree.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedConnectome {
    pub matrix: Matrix,
    pub degree: Vec<f64>,
}

impl ConnectomeProfile {
    /// Applies the profile's normalization to a raw matrix.
    pub fn normalize(&self, raw: &Matrix) -> Result<Matrix> {
        ensure_square(raw)?;
        match self {
            ConnectomeProfile::Functional => {
                let mut fc = drop_leading(raw, SUBCORTICAL_OFFSET)?;
                fc.map_in_place(|value| {
                    let z = value.atanh();
                    if z.is_finite() { z } else { 0.0 }
                });
                symmetrize(&fc)
            }
            ConnectomeProfile::Structural => {
                let mut sc = symmetrize(raw)?;
                sc.map_in_place(|value| {
                    let logged = value.ln();
                    if logged == f64::NEG_INFINITY || logged == 0.0 {
                        f64::EPSILON
                    } else {
                        logged
                    }
                });
                Ok(sc)
            }
            ConnectomeProfile::Microstructural => {
                let mut mpc = drop_leading(&symmetrize(raw)?, 1)?;
                mpc.map_in_place(|value| {
                    if !value.is_finite() || value == 0.0 {
                        f64::EPSILON
                    } else {
                        value
                    }
                });
                Ok(mpc)
            }
            ConnectomeProfile::Geodesic => drop_leading(raw, 1),
        }
    }

    /// Nodal degree of a matrix already passed through [`Self::normalize`].
    pub fn degree(&self, normalized: &Matrix) -> Result<Vec<f64>> {
        match self {
            ConnectomeProfile::Functional => degree(normalized, true),
            ConnectomeProfile::Structural => {
                let cortex = drop_leading(normalized, SUBCORTICAL_OFFSET)?;
                degree(&cortex, false)
            }
            ConnectomeProfile::Microstructural | ConnectomeProfile::Geodesic => {
                degree(normalized, false)
            }
        }
    }

    /// Normalizes `raw` and computes its degree.
    pub fn process(&self, raw: &Matrix) -> Result<NormalizedConnectome> {
        let matrix = self.normalize(raw)?;
        let degree = self.degree(&matrix)?;
        Ok(NormalizedConnectome { matrix, degree })
    }
}

fn ensure_square(matrix: &Matrix) -> Result<()> {
    if matrix.is_square() {
        Ok(())
    } else {
        Err(ConnectomeError::NotSquare {
            rows: matrix.rows(),
            cols: matrix.cols(),
        })
    }
}

/// Mirrors the upper triangle onto the lower one, keeping the diagonal.
///
/// Computes `triu(M, 1) + triu(M)ᵀ`. Matrices stored as upper triangles
/// become full symmetric matrices; symmetric input is returned unchanged.
pub fn symmetrize(matrix: &Matrix) -> Result<Matrix> {
    ensure_square(matrix)?;
    let n = matrix.rows();
    let mut out = Matrix::zeros(n, n);
    for row in 0..n {
        for col in row..n {
            let value = matrix.get(row, col);
            out.set(row, col, value);
            out.set(col, row, value);
        }
    }
    Ok(out)
}

/// Removes the first `count` rows and columns.
pub fn drop_leading(matrix: &Matrix, count: usize) -> Result<Matrix> {
    ensure_square(matrix)?;
    if matrix.rows() <= count {
        return Err(ConnectomeError::TooSmall {
            size: matrix.rows(),
            offset: count,
        });
    }
    Ok(matrix.slice_from(count, count))
}

/// Row sums of `matrix`. With `positive_only`, negative entries count as 0.
///
/// Each entry depends only on its own row, so the degree of one connectome
/// never depends on which other connectomes were processed before it.
pub fn degree(matrix: &Matrix, positive_only: bool) -> Result<Vec<f64>> {
    ensure_square(matrix)?;
    let sums = matrix
        .iter_rows()
        .map(|row| {
            row.iter()
                .map(|&value| if positive_only { value.max(0.0) } else { value })
                .sum()
        })
        .collect();
    Ok(sums)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(values: &[&[f64]]) -> Matrix {
        Matrix::from_rows(values.iter().map(|row| row.to_vec()).collect()).unwrap()
    }

    fn identity(n: usize, fill: f64) -> Matrix {
        let mut m = Matrix::zeros(n, n);
        for i in 0..n {
            m.set(i, i, fill);
        }
        m
    }

    #[test]
    fn symmetrize_mirrors_upper_triangle() {
        let upper = square(&[&[1.0, 2.0, 3.0], &[0.0, 4.0, 5.0], &[0.0, 0.0, 6.0]]);
        let sym = symmetrize(&upper).unwrap();
        assert_eq!(sym.row(0), &[1.0, 2.0, 3.0]);
        assert_eq!(sym.row(1), &[2.0, 4.0, 5.0]);
        assert_eq!(sym.row(2), &[3.0, 5.0, 6.0]);
    }

    #[test]
    fn symmetrize_rejects_rectangular() {
        let m = Matrix::zeros(2, 3);
        assert_eq!(
            symmetrize(&m).unwrap_err(),
            ConnectomeError::NotSquare { rows: 2, cols: 3 }
        );
    }

    #[test]
    fn drop_leading_requires_remaining_regions() {
        let m = Matrix::zeros(2, 2);
        assert!(drop_leading(&m, 1).is_ok());
        assert_eq!(
            drop_leading(&m, 2).unwrap_err(),
            ConnectomeError::TooSmall { size: 2, offset: 2 }
        );
    }

    #[test]
    fn degree_clamps_negatives_when_requested() {
        let m = square(&[&[0.0, -1.0], &[2.0, 3.0]]);
        assert_eq!(degree(&m, false).unwrap(), vec![-1.0, 5.0]);
        assert_eq!(degree(&m, true).unwrap(), vec![0.0, 5.0]);
    }

    #[test]
    fn functional_drops_subcortex_and_zeroes_infinities() {
        let n = SUBCORTICAL_OFFSET + 2;
        let mut raw = identity(n, 1.0);
        raw.set(SUBCORTICAL_OFFSET, SUBCORTICAL_OFFSET + 1, 0.5);
        raw.set(0, SUBCORTICAL_OFFSET, 0.9);

        let result = ConnectomeProfile::Functional.process(&raw).unwrap();
        assert_eq!(result.matrix.rows(), 2);
        // atanh(1) is infinite and becomes 0 on the diagonal.
        assert_eq!(result.matrix.get(0, 0), 0.0);
        let z = 0.5_f64.atanh();
        assert_eq!(result.matrix.get(0, 1), z);
        assert_eq!(result.matrix.get(1, 0), z);
        assert_eq!(result.degree, vec![z, z]);
    }

    #[test]
    fn functional_degree_ignores_anticorrelations() {
        let n = SUBCORTICAL_OFFSET + 2;
        let mut raw = Matrix::zeros(n, n);
        raw.set(SUBCORTICAL_OFFSET, SUBCORTICAL_OFFSET + 1, -0.5);
        let result = ConnectomeProfile::Functional.process(&raw).unwrap();
        assert_eq!(result.degree, vec![0.0, 0.0]);
    }

    #[test]
    fn structural_log_transform() {
        let n = SUBCORTICAL_OFFSET + 2;
        let mut raw = Matrix::zeros(n, n);
        raw.set(SUBCORTICAL_OFFSET, SUBCORTICAL_OFFSET + 1, std::f64::consts::E);
        raw.set(0, 1, 1.0);

        let result = ConnectomeProfile::Structural.process(&raw).unwrap();
        assert_eq!(result.matrix.rows(), n);
        // ln(0) and ln(1) both collapse to epsilon.
        assert_eq!(result.matrix.get(0, 0), f64::EPSILON);
        assert_eq!(result.matrix.get(0, 1), f64::EPSILON);
        assert!((result.matrix.get(SUBCORTICAL_OFFSET + 1, SUBCORTICAL_OFFSET) - 1.0).abs() < 1e-12);
        assert_eq!(result.degree.len(), 2);
        assert!((result.degree[0] - (1.0 + f64::EPSILON)).abs() < 1e-12);
    }

    #[test]
    fn microstructural_drops_medial_wall() {
        let raw = square(&[
            &[9.0, 9.0, 9.0],
            &[0.0, 1.0, f64::NAN],
            &[0.0, 0.0, 2.0],
        ]);
        let result = ConnectomeProfile::Microstructural.process(&raw).unwrap();
        assert_eq!(result.matrix.row(0), &[1.0, f64::EPSILON]);
        assert_eq!(result.matrix.row(1), &[f64::EPSILON, 2.0]);
        assert_eq!(result.degree, vec![1.0 + f64::EPSILON, 2.0 + f64::EPSILON]);
    }

    #[test]
    fn geodesic_keeps_values() {
        let raw = square(&[&[0.0, 0.0, 0.0], &[0.0, 0.0, 10.0], &[0.0, 12.0, 0.0]]);
        let result = ConnectomeProfile::Geodesic.process(&raw).unwrap();
        assert_eq!(result.degree, vec![10.0, 12.0]);
    }

    #[test]
    fn structural_needs_cortical_regions() {
        let raw = identity(SUBCORTICAL_OFFSET, 2.0);
        assert!(matches!(
            ConnectomeProfile::Structural.process(&raw),
            Err(ConnectomeError::TooSmall { .. })
        ));
    }
}
