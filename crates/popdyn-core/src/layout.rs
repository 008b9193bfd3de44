use crate::grid::PopulationGrid;
use serde::{Deserialize, Serialize};
use std::ops::Index;

/// Species-major copy of a board: the `H x W` field of each species is contiguous.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SpeciesFrame {
    width: usize,
    height: usize,
    species: usize,
    data: Vec<f64>,
}

impl SpeciesFrame {
    pub fn zeros(width: usize, height: usize, species: usize) -> Self {
        Self {
            width,
            height,
            species,
            data: vec![0.0; width * height * species],
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

    pub fn get(&self, k: usize, y: usize, x: usize) -> f64 {
        self.data[(k * self.height + y) * self.width + x]
    }

    /// Row-major `H x W` field for species `k`.
    pub fn field(&self, k: usize) -> &[f64] {
        let n = self.width * self.height;
        &self.data[k * n..(k + 1) * n]
    }

    pub fn field_mut(&mut self, k: usize) -> &mut [f64] {
        let n = self.width * self.height;
        &mut self.data[k * n..(k + 1) * n]
    }

    pub fn data(&self) -> &[f64] {
        &self.data
    }

    pub fn total(&self, k: usize) -> f64 {
        self.field(k).iter().sum()
    }

    /// `[species][y][x]` nested vectors.
    pub fn to_nested(&self) -> Vec<Vec<Vec<f64>>> {
        (0..self.species)
            .map(|k| {
                self.field(k)
                    .chunks_exact(self.width)
                    .map(<[f64]>::to_vec)
                    .collect()
            })
            .collect()
    }
}

impl Index<(usize, usize, usize)> for SpeciesFrame {
    type Output = f64;

    fn index(&self, (k, y, x): (usize, usize, usize)) -> &f64 {
        &self.data[(k * self.height + y) * self.width + x]
    }
}

/// Rearrange `[y][x][k]` into `[k][y][x]`.
pub fn to_species_major(grid: &PopulationGrid) -> SpeciesFrame {
    let mut frame = SpeciesFrame::zeros(grid.width(), grid.height(), grid.species_count());
    write_species_major(grid, &mut frame);
    frame
}

/// Same as [`to_species_major`] but reuses `frame`'s allocation.
pub fn write_species_major(grid: &PopulationGrid, frame: &mut SpeciesFrame) {
    let (w, h, s) = (grid.width(), grid.height(), grid.species_count());
    if frame.width != w || frame.height != h || frame.species != s {
        *frame = SpeciesFrame::zeros(w, h, s);
    }
    let cells = w * h;
    for (cell, densities) in grid.data().chunks_exact(s).enumerate() {
        for (k, &v) in densities.iter().enumerate() {
            frame.data[k * cells + cell] = v;
        }
    }
}

/// Rearrange `[k][y][x]` back into a cell-major grid.
pub fn to_cell_major(frame: &SpeciesFrame) -> PopulationGrid {
    let cells = frame.width * frame.height;
    let mut data = vec![0.0; frame.data.len()];
    for k in 0..frame.species {
        for (cell, &v) in frame.field(k).iter().enumerate() {
            data[cell * frame.species + k] = v;
        }
    }
    debug_assert_eq!(data.len(), cells * frame.species);
    PopulationGrid::from_cell_major(frame.width, frame.height, frame.species, data)
}
