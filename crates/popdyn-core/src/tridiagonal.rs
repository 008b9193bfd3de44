use crate::config::BoundaryCondition;

/// Coefficients of `lower[i-1] x[i-1] + diag[i] x[i] + upper[i] x[i+1] = d[i]`.
///
/// `lower` and `upper` have length `n - 1`.
#[derive(Clone, Debug, PartialEq)]
pub struct TridiagonalSystem {
    pub lower: Vec<f64>,
    pub diag: Vec<f64>,
    pub upper: Vec<f64>,
}

impl TridiagonalSystem {
    /// Implicit half-step matrix `I - r T` for a line of `n` cells, where `T` is
    /// the 1D second-difference operator under `boundary`.
    pub fn implicit_operator(n: usize, r: f64, boundary: BoundaryCondition) -> Self {
        if n == 1 {
            return Self {
                lower: Vec::new(),
                diag: vec![1.0],
                upper: Vec::new(),
            };
        }
        let mut diag = vec![1.0 + 2.0 * r; n];
        if boundary == BoundaryCondition::Neumann {
            diag[0] = 1.0 + r;
            diag[n - 1] = 1.0 + r;
        }
        Self {
            lower: vec![-r; n - 1],
            diag,
            upper: vec![-r; n - 1],
        }
    }

    pub fn len(&self) -> usize {
        self.diag.len()
    }

    pub fn is_empty(&self) -> bool {
        self.diag.is_empty()
    }

    /// Solve in place: `rhs` holds the solution on return. `scratch` must have length `n`.
    pub fn solve_in_place(&self, rhs: &mut [f64], scratch: &mut [f64]) {
        thomas_solve(&self.lower, &self.diag, &self.upper, rhs, scratch);
    }
}

/// Thomas algorithm: forward elimination then back substitution, no pivoting.
///
/// Overwrites `rhs` with the solution and uses `c_prime` as elimination storage.
/// The system must be diagonally dominant.
pub fn thomas_solve(
    lower: &[f64],
    diag: &[f64],
    upper: &[f64],
    rhs: &mut [f64],
    c_prime: &mut [f64],
) {
    let n = diag.len();
    if n == 0 {
        return;
    }
    assert_eq!(rhs.len(), n, "rhs length must match diagonal");
    assert!(c_prime.len() >= n, "scratch shorter than system");
    assert!(
        lower.len() == n - 1 && upper.len() == n - 1,
        "off-diagonals must have length n - 1"
    );

    c_prime[0] = if n > 1 { upper[0] / diag[0] } else { 0.0 };
    rhs[0] /= diag[0];
    for i in 1..n {
        let denom = diag[i] - lower[i - 1] * c_prime[i - 1];
        c_prime[i] = if i < n - 1 { upper[i] / denom } else { 0.0 };
        rhs[i] = (rhs[i] - lower[i - 1] * rhs[i - 1]) / denom;
    }
    for i in (0..n - 1).rev() {
        rhs[i] -= c_prime[i] * rhs[i + 1];
    }
}
