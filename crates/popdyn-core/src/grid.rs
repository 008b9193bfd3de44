//! Board of per-species densities.
//! Storage is cell-major: the `S` densities of cell `(y, x)` are contiguous.

#[derive(Clone, Debug, PartialEq)]
pub struct PopulationGrid {
    width: usize,
    height: usize,
    species: usize,
    data: Vec<f64>,
}

impl PopulationGrid {
    pub fn new(width: usize, height: usize, species: usize) -> Self {
        assert!(width > 0, "width must be positive");
        assert!(height > 0, "height must be positive");
        assert!(species > 0, "species count must be positive");
        Self {
            width,
            height,
            species,
            data: vec![0.0; width * height * species],
        }
    }

    /// Wrap an existing cell-major buffer.
    pub fn from_cell_major(width: usize, height: usize, species: usize, data: Vec<f64>) -> Self {
        assert_eq!(
            data.len(),
            width * height * species,
            "buffer length must match width * height * species"
        );
        Self {
            width,
            height,
            species,
            data,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn species_count(&self) -> usize {
        self.species
    }

    fn index(&self, y: usize, x: usize, k: usize) -> usize {
        debug_assert!(y < self.height && x < self.width && k < self.species);
        (y * self.width + x) * self.species + k
    }

    pub fn get(&self, y: usize, x: usize, k: usize) -> f64 {
        self.data[self.index(y, x, k)]
    }

    pub fn set(&mut self, y: usize, x: usize, k: usize, value: f64) {
        let idx = self.index(y, x, k);
        self.data[idx] = value;
    }

    pub fn add(&mut self, y: usize, x: usize, k: usize, delta: f64) {
        let idx = self.index(y, x, k);
        self.data[idx] += delta;
    }

    /// Densities of every species at one cell.
    pub fn cell(&self, y: usize, x: usize) -> &[f64] {
        let start = self.index(y, x, 0);
        &self.data[start..start + self.species]
    }

    pub fn cell_mut(&mut self, y: usize, x: usize) -> &mut [f64] {
        let start = self.index(y, x, 0);
        &mut self.data[start..start + self.species]
    }

    /// Iterate over cells as density slices in row-major cell order.
    pub fn cells_mut(&mut self) -> std::slice::ChunksExactMut<'_, f64> {
        self.data.chunks_exact_mut(self.species)
    }

    pub fn data(&self) -> &[f64] {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut [f64] {
        &mut self.data
    }

    /// Sum of species `k` over the whole board.
    pub fn total(&self, k: usize) -> f64 {
        self.data.iter().skip(k).step_by(self.species).sum()
    }

    pub fn totals(&self) -> Vec<f64> {
        (0..self.species).map(|k| self.total(k)).collect()
    }

    /// Keep every density finite and non-negative: negatives and NaN become
    /// zero, overflow saturates at `f64::MAX`.
    pub fn clamp_non_negative(&mut self) {
        for v in &mut self.data {
            if v.is_nan() || *v < 0.0 {
                *v = 0.0;
            } else if *v == f64::INFINITY {
                *v = f64::MAX;
            }
        }
    }

    pub fn zero(&mut self) {
        self.data.fill(0.0);
    }

    /// Change board dimensions, keeping the overlapping cells; new cells are zero.
    pub fn resize(&mut self, width: usize, height: usize) {
        let mut next = Self::new(width, height, self.species);
        for y in 0..self.height.min(height) {
            for x in 0..self.width.min(width) {
                next.cell_mut(y, x).copy_from_slice(self.cell(y, x));
            }
        }
        *self = next;
    }

    /// Grow or shrink the per-cell species vector; new species start at zero.
    pub fn set_species_count(&mut self, species: usize) {
        let mut next = Self::new(self.width, self.height, species);
        let keep = self.species.min(species);
        for y in 0..self.height {
            for x in 0..self.width {
                next.cell_mut(y, x)[..keep].copy_from_slice(&self.cell(y, x)[..keep]);
            }
        }
        *self = next;
    }

    /// Drop species `index` from every cell.
    pub fn remove_species(&mut self, index: usize) {
        assert!(index < self.species, "species index out of range");
        assert!(self.species > 1, "cannot remove the last species");
        let species = self.species - 1;
        let data = self
            .data
            .chunks_exact(self.species)
            .flat_map(|cell| {
                cell.iter()
                    .enumerate()
                    .filter(move |&(k, _)| k != index)
                    .map(|(_, &v)| v)
            })
            .collect();
        self.species = species;
        self.data = data;
    }
}
