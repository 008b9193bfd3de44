use crate::constants::{DEFAULT_DISPERSION, MAX_DISPERSION};
use serde::{Deserialize, Serialize};

/// Square `S x S` coupling matrix; entry `(k, j)` is the per-unit-time
/// contribution of species `j` to the growth of species `k`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Vec<f64>>", into = "Vec<Vec<f64>>")]
pub struct InteractionMatrix {
    size: usize,
    data: Vec<f64>,
}

impl InteractionMatrix {
    pub fn zeros(size: usize) -> Self {
        Self {
            size,
            data: vec![0.0; size * size],
        }
    }

    pub fn diagonal(values: &[f64]) -> Self {
        let mut matrix = Self::zeros(values.len());
        for (k, &v) in values.iter().enumerate() {
            matrix.set(k, k, v);
        }
        matrix
    }

    /// Build from nested rows. Returns `None` when the rows are not square.
    pub fn from_rows(rows: &[Vec<f64>]) -> Option<Self> {
        let size = rows.len();
        if rows.iter().any(|r| r.len() != size) {
            return None;
        }
        Some(Self {
            size,
            data: rows.iter().flatten().copied().collect(),
        })
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn get(&self, k: usize, j: usize) -> f64 {
        self.data[k * self.size + j]
    }

    pub fn set(&mut self, k: usize, j: usize, value: f64) {
        self.data[k * self.size + j] = value;
    }

    /// Row `k` as a slice, length `size`.
    pub fn row(&self, k: usize) -> &[f64] {
        &self.data[k * self.size..(k + 1) * self.size]
    }

    /// Grow or shrink to `size`, keeping the overlapping top-left block; new entries are zero.
    pub fn resize(&mut self, size: usize) {
        let mut next = Self::zeros(size);
        let keep = self.size.min(size);
        for k in 0..keep {
            for j in 0..keep {
                next.set(k, j, self.get(k, j));
            }
        }
        *self = next;
    }

    /// Drop row and column `index`.
    pub fn remove(&mut self, index: usize) {
        assert!(index < self.size, "species index out of range");
        let size = self.size - 1;
        let mut data = Vec::with_capacity(size * size);
        for k in (0..self.size).filter(|&k| k != index) {
            for j in (0..self.size).filter(|&j| j != index) {
                data.push(self.get(k, j));
            }
        }
        self.size = size;
        self.data = data;
    }

    pub fn to_rows(&self) -> Vec<Vec<f64>> {
        self.data.chunks(self.size.max(1)).map(<[f64]>::to_vec).take(self.size).collect()
    }
}

impl TryFrom<Vec<Vec<f64>>> for InteractionMatrix {
    type Error = String;

    fn try_from(rows: Vec<Vec<f64>>) -> Result<Self, Self::Error> {
        Self::from_rows(&rows).ok_or_else(|| "interaction matrix must be square".to_string())
    }
}

impl From<InteractionMatrix> for Vec<Vec<f64>> {
    fn from(matrix: InteractionMatrix) -> Self {
        matrix.to_rows()
    }
}

/// Per-species diffusion coefficients, each held in `[0, MAX_DISPERSION]`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<f64>", into = "Vec<f64>")]
pub struct DispersionCoefficients {
    values: Vec<f64>,
}

impl DispersionCoefficients {
    pub fn clamp_value(value: f64) -> f64 {
        if value.is_nan() {
            0.0
        } else {
            value.clamp(0.0, MAX_DISPERSION)
        }
    }

    pub fn new(values: &[f64]) -> Self {
        Self {
            values: values.iter().copied().map(Self::clamp_value).collect(),
        }
    }

    pub fn uniform(count: usize, value: f64) -> Self {
        Self::new(&vec![value; count])
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn get(&self, k: usize) -> f64 {
        self.values[k]
    }

    /// Store `value` clamped into range and return what was stored.
    pub fn set(&mut self, k: usize, value: f64) -> f64 {
        let clamped = Self::clamp_value(value);
        self.values[k] = clamped;
        clamped
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.values
    }

    pub fn max(&self) -> f64 {
        self.values.iter().copied().fold(0.0, f64::max)
    }

    /// New slots take `DEFAULT_DISPERSION`.
    pub fn resize(&mut self, count: usize) {
        self.values.resize(count, DEFAULT_DISPERSION);
    }

    pub fn remove(&mut self, index: usize) {
        self.values.remove(index);
    }
}

impl From<Vec<f64>> for DispersionCoefficients {
    fn from(values: Vec<f64>) -> Self {
        Self::new(&values)
    }
}

impl From<DispersionCoefficients> for Vec<f64> {
    fn from(coefficients: DispersionCoefficients) -> Self {
        coefficients.values
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resize_keeps_top_left_block() {
        let mut m = InteractionMatrix::from_rows(&[vec![1.0, 2.0], vec![3.0, 4.0]]).unwrap();
        m.resize(3);
        assert_eq!(m.size(), 3);
        assert_eq!(m.row(0), &[1.0, 2.0, 0.0]);
        assert_eq!(m.row(1), &[3.0, 4.0, 0.0]);
        assert_eq!(m.row(2), &[0.0, 0.0, 0.0]);
        m.resize(1);
        assert_eq!(m.to_rows(), vec![vec![1.0]]);
    }

    #[test]
    fn remove_drops_row_and_column() {
        let mut m = InteractionMatrix::from_rows(&[
            vec![1.0, 2.0, 3.0],
            vec![4.0, 5.0, 6.0],
            vec![7.0, 8.0, 9.0],
        ])
        .unwrap();
        m.remove(1);
        assert_eq!(m.to_rows(), vec![vec![1.0, 3.0], vec![7.0, 9.0]]);
    }

    #[test]
    fn non_square_rows_are_rejected() {
        assert!(InteractionMatrix::from_rows(&[vec![1.0, 2.0]]).is_none());
        let err = serde_json::from_str::<InteractionMatrix>("[[1.0],[2.0, 3.0]]");
        assert!(err.is_err());
    }

    #[test]
    fn matrix_serializes_as_nested_rows() {
        let m = InteractionMatrix::diagonal(&[-0.5, 0.25]);
        let json = serde_json::to_string(&m).unwrap();
        assert_eq!(json, "[[-0.5,0.0],[0.0,0.25]]");
    }

    #[test]
    fn dispersion_is_clamped_on_every_entry_path() {
        let mut d = DispersionCoefficients::new(&[-1.0, 0.2, 3.0]);
        assert_eq!(d.as_slice(), &[0.0, 0.2, MAX_DISPERSION]);
        assert_eq!(d.set(1, f64::NAN), 0.0);
        let parsed: DispersionCoefficients = serde_json::from_str("[0.9, 0.1]").unwrap();
        assert_eq!(parsed.as_slice(), &[MAX_DISPERSION, 0.1]);
    }

    #[test]
    fn dispersion_resize_uses_default() {
        let mut d = DispersionCoefficients::new(&[0.1]);
        d.resize(3);
        assert_eq!(d.as_slice(), &[0.1, DEFAULT_DISPERSION, DEFAULT_DISPERSION]);
        d.remove(0);
        assert_eq!(d.len(), 2);
        assert!((d.max() - DEFAULT_DISPERSION).abs() < f64::EPSILON);
    }
}
