use nalgebra::{Complex, DMatrix, DVector, Schur, SVD};

use crate::error::{RankingError, Result};

const SCHUR_MAX_ITERATIONS: usize = 10_000;
const SVD_MAX_ITERATIONS: usize = 10_000;

/// Relative gap below which two eigenvalue real parts count as tied.
const TIE_TOLERANCE: f64 = 1e-12;

/// Relative magnitude below which an eigenvector sum counts as zero.
const DEGENERATE_SUM_TOLERANCE: f64 = 1e-12;

/// Eigenvalue with maximal real part and the real part of its eigenvector.
#[derive(Debug, Clone, PartialEq)]
pub struct DominantEigenpair {
    pub eigenvalue: Complex<f64>,
    pub eigenvector: DVector<f64>,
}

/// Dominant eigenpair of a square real matrix.
///
/// Eigenvalues come from the real Schur form. Ties on the real part go to the
/// eigenvalue with the smaller imaginary magnitude, then to the first one in
/// decomposition order.
pub fn dominant_eigenpair(a: &DMatrix<f64>) -> Result<DominantEigenpair> {
    if !a.is_square() {
        return Err(RankingError::InvalidInput(format!(
            "preference matrix must be square, got {}x{}",
            a.nrows(),
            a.ncols()
        )));
    }
    if a.is_empty() {
        return Err(RankingError::DegenerateSpectrum(
            "preference matrix is empty".to_string(),
        ));
    }
    if a.iter().any(|x| !x.is_finite()) {
        return Err(RankingError::InvalidInput(
            "preference matrix contains non-finite entries".to_string(),
        ));
    }

    let schur = Schur::try_new(a.clone(), f64::EPSILON, SCHUR_MAX_ITERATIONS).ok_or_else(|| {
        RankingError::DegenerateSpectrum("Schur decomposition did not converge".to_string())
    })?;
    let eigenvalues: Vec<Complex<f64>> = schur.complex_eigenvalues().iter().copied().collect();

    let selected = select_dominant(&eigenvalues).ok_or_else(|| {
        RankingError::DegenerateSpectrum("no finite eigenvalue found".to_string())
    })?;
    let eigenvalue = eigenvalues[selected];
    let eigenvector = real_eigenvector(a, eigenvalue)?;

    Ok(DominantEigenpair {
        eigenvalue,
        eigenvector,
    })
}

/// Keener direct method: dominant eigenvector scaled to sum to one.
pub fn direct_rank(a: &DMatrix<f64>) -> Result<DVector<f64>> {
    dominant_eigenpair_ranking(a).map(|(_, ranking)| ranking)
}

/// Direct method ranking together with the eigenvalue it came from.
pub fn dominant_eigenpair_ranking(a: &DMatrix<f64>) -> Result<(Complex<f64>, DVector<f64>)> {
    let pair = dominant_eigenpair(a)?;
    let v = &pair.eigenvector;
    let sum = v.sum();
    let scale = v.norm().max(f64::MIN_POSITIVE);

    if !sum.is_finite() || sum.abs() <= DEGENERATE_SUM_TOLERANCE * scale {
        return Err(RankingError::DegenerateSpectrum(format!(
            "eigenvector for eigenvalue {:.6}{:+.6}i sums to zero",
            pair.eigenvalue.re, pair.eigenvalue.im
        )));
    }

    let ranking = v / sum;
    tracing::debug!(
        eigenvalue_re = pair.eigenvalue.re,
        eigenvalue_im = pair.eigenvalue.im,
        ranking_sum = ranking.sum(),
        "Direct method ranking computed"
    );
    Ok((pair.eigenvalue, ranking))
}

fn select_dominant(eigenvalues: &[Complex<f64>]) -> Option<usize> {
    let mut best: Option<usize> = None;
    for (k, lambda) in eigenvalues.iter().enumerate() {
        if !lambda.re.is_finite() || !lambda.im.is_finite() {
            continue;
        }
        best = match best {
            None => Some(k),
            Some(b) => {
                let current = eigenvalues[b];
                let tol = TIE_TOLERANCE * current.re.abs().max(lambda.re.abs()).max(1.0);
                let tied = (lambda.re - current.re).abs() <= tol;
                if (!tied && lambda.re > current.re) || (tied && lambda.im.abs() < current.im.abs()) {
                    Some(k)
                } else {
                    Some(b)
                }
            }
        };
    }
    best
}

/// Null vector of `A - lambda I`, reduced to its real part.
fn real_eigenvector(a: &DMatrix<f64>, lambda: Complex<f64>) -> Result<DVector<f64>> {
    let n = a.nrows();
    let is_real = lambda.im.abs() <= f64::EPSILON * lambda.re.abs().max(1.0);

    if is_real {
        let mut shifted = a.clone();
        for k in 0..n {
            shifted[(k, k)] -= lambda.re;
        }
        let svd = SVD::try_new(shifted, false, true, f64::EPSILON, SVD_MAX_ITERATIONS)
            .ok_or_else(svd_failed)?;
        let k = smallest_index(svd.singular_values.as_slice());
        let v_t = svd.v_t.ok_or_else(svd_failed)?;
        Ok(v_t.row(k).transpose())
    } else {
        let mut shifted = a.map(|x| Complex::new(x, 0.0));
        for k in 0..n {
            shifted[(k, k)] -= lambda;
        }
        let svd = SVD::try_new(shifted, false, true, f64::EPSILON, SVD_MAX_ITERATIONS)
            .ok_or_else(svd_failed)?;
        let k = smallest_index(svd.singular_values.as_slice());
        let v_t = svd.v_t.ok_or_else(svd_failed)?;
        let v: DVector<Complex<f64>> = v_t.row(k).adjoint();

        // Rotate so the largest component is real and positive; the real
        // part is otherwise phase dependent.
        let pivot = v
            .iter()
            .copied()
            .fold(Complex::new(0.0, 0.0), |acc, c| if c.norm() > acc.norm() { c } else { acc });
        let phase = if pivot.norm() > 0.0 {
            pivot.conj() / pivot.norm()
        } else {
            Complex::new(1.0, 0.0)
        };
        Ok(v.map(|c| (c * phase).re))
    }
}

fn smallest_index(values: &[f64]) -> usize {
    values
        .iter()
        .enumerate()
        .fold((0, f64::INFINITY), |(best, min), (k, &x)| if x < min { (k, x) } else { (best, min) })
        .0
}

fn svd_failed() -> RankingError {
    RankingError::DegenerateSpectrum("singular value decomposition did not converge".to_string())
}
