//! Initial-condition shapes. Positions and sizes are fractions of the board so
//! a scenario looks the same at any resolution.

use crate::constants::RNG_DERIVATION_PRIME;
use crate::grid::PopulationGrid;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha12Rng;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockRegion {
    /// Full-height strip on the left, width sized against the board width.
    LeftEdge,
    /// Full-height strip on the right, width sized against the board width.
    RightEdge,
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "shape", rename_all = "snake_case")]
pub enum SeedShape {
    /// Adds `amplitude * exp(-d^2 / (2 sigma^2))` around a centre cell.
    Gaussian {
        species: usize,
        fx: f64,
        fy: f64,
        amplitude: f64,
        sigma_frac: f64,
    },
    /// Sets `value` on the annulus between the inner and outer radius.
    Ring {
        species: usize,
        fx: f64,
        fy: f64,
        inner_frac: f64,
        outer_frac: f64,
        value: f64,
    },
    /// Sets every cell to a uniform random density in `[0, amplitude)`.
    Noise { species: usize, amplitude: f64 },
    /// Sets `value` on an edge strip or a corner square.
    Block {
        species: usize,
        region: BlockRegion,
        size_frac: f64,
        #[serde(default = "default_min_cells")]
        min_cells: usize,
        value: f64,
    },
    /// Sets a single cell. Out-of-range coordinates are ignored.
    Cell {
        species: usize,
        x: usize,
        y: usize,
        value: f64,
    },
}

/// Narrowest Gaussian, in cells. A zero-width request collapses onto the centre cell.
const MIN_SIGMA: f64 = 1e-3;

fn default_min_cells() -> usize {
    1
}

fn center_cell(f: f64, len: usize) -> usize {
    let c = (f * (len - 1) as f64).round();
    if c.is_nan() || c < 0.0 {
        0
    } else {
        (c as usize).min(len - 1)
    }
}

/// Seeded densities are finite and non-negative; anything else becomes 0.
fn density(value: f64) -> f64 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        0.0
    }
}

fn board_scale(grid: &PopulationGrid) -> f64 {
    grid.width().min(grid.height()).max(1) as f64
}

fn block_size(size_frac: f64, min_cells: usize, basis: usize) -> usize {
    let scaled = (size_frac * basis as f64).round();
    let scaled = if scaled.is_finite() && scaled > 0.0 {
        scaled as usize
    } else {
        0
    };
    scaled.max(min_cells).min(basis)
}

impl SeedShape {
    pub fn species(&self) -> usize {
        match self {
            SeedShape::Gaussian { species, .. }
            | SeedShape::Ring { species, .. }
            | SeedShape::Noise { species, .. }
            | SeedShape::Block { species, .. }
            | SeedShape::Cell { species, .. } => *species,
        }
    }

    /// Paint this shape onto `grid`. `seed` and `shape_index` select the noise stream.
    ///
    /// Shapes naming a species past the grid's species count are skipped.
    pub fn apply(&self, grid: &mut PopulationGrid, seed: u64, shape_index: usize) {
        let k = self.species();
        if k >= grid.species_count() {
            log::debug!("skipping seed shape for missing species {k}");
            return;
        }
        let (w, h) = (grid.width(), grid.height());
        match *self {
            SeedShape::Gaussian {
                fx,
                fy,
                amplitude,
                sigma_frac,
                ..
            } => {
                let (cx, cy) = (center_cell(fx, w), center_cell(fy, h));
                let amplitude = density(amplitude);
                let sigma = (sigma_frac * board_scale(grid)).max(MIN_SIGMA);
                let denom = 2.0 * sigma * sigma;
                for y in 0..h {
                    for x in 0..w {
                        let dx = x as f64 - cx as f64;
                        let dy = y as f64 - cy as f64;
                        grid.add(y, x, k, amplitude * (-(dx * dx + dy * dy) / denom).exp());
                    }
                }
            }
            SeedShape::Ring {
                fx,
                fy,
                inner_frac,
                outer_frac,
                value,
                ..
            } => {
                let (cx, cy) = (center_cell(fx, w), center_cell(fy, h));
                let value = density(value);
                let scale = board_scale(grid);
                let r1 = (inner_frac * scale).max(1.0);
                let r2 = (outer_frac * scale).max(r1 + 1.0);
                for y in 0..h {
                    for x in 0..w {
                        let dx = x as f64 - cx as f64;
                        let dy = y as f64 - cy as f64;
                        let d2 = dx * dx + dy * dy;
                        if d2 >= r1 * r1 && d2 <= r2 * r2 {
                            grid.set(y, x, k, value);
                        }
                    }
                }
            }
            SeedShape::Noise { amplitude, .. } => {
                let mut rng = shape_rng(seed, shape_index);
                let amplitude = density(amplitude);
                for y in 0..h {
                    for x in 0..w {
                        grid.set(y, x, k, rng.random::<f64>() * amplitude);
                    }
                }
            }
            SeedShape::Block {
                region,
                size_frac,
                min_cells,
                value,
                ..
            } => {
                let value = density(value);
                let (xs, ys) = match region {
                    BlockRegion::LeftEdge => (0..block_size(size_frac, min_cells, w), 0..h),
                    BlockRegion::RightEdge => (w - block_size(size_frac, min_cells, w)..w, 0..h),
                    corner => {
                        let m = block_size(size_frac, min_cells, w.min(h));
                        let xs = match corner {
                            BlockRegion::TopLeft | BlockRegion::BottomLeft => 0..m,
                            _ => w - m..w,
                        };
                        let ys = match corner {
                            BlockRegion::TopLeft | BlockRegion::TopRight => 0..m,
                            _ => h - m..h,
                        };
                        (xs, ys)
                    }
                };
                for y in ys {
                    for x in xs.clone() {
                        grid.set(y, x, k, value);
                    }
                }
            }
            SeedShape::Cell { x, y, value, .. } => {
                if x < w && y < h {
                    grid.set(y, x, k, density(value));
                }
            }
        }
    }
}

/// Apply every shape in order.
pub fn apply_all(shapes: &[SeedShape], grid: &mut PopulationGrid, seed: u64) {
    for (i, shape) in shapes.iter().enumerate() {
        shape.apply(grid, seed, i);
    }
}

/// Independent stream for the `shape_index`-th shape of a scenario.
fn shape_rng(seed: u64, shape_index: usize) -> ChaCha12Rng {
    let offset = (shape_index as u64).wrapping_mul(RNG_DERIVATION_PRIME);
    ChaCha12Rng::seed_from_u64(seed.wrapping_add(offset))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shape_streams_are_reproducible_and_distinct() {
        let a: u64 = shape_rng(42, 0).random();
        assert_eq!(a, shape_rng(42, 0).random::<u64>());
        assert_ne!(a, shape_rng(42, 1).random::<u64>());
    }

    #[test]
    fn gaussian_peaks_at_fractional_centre() {
        let mut grid = PopulationGrid::new(11, 11, 1);
        SeedShape::Gaussian {
            species: 0,
            fx: 0.5,
            fy: 0.5,
            amplitude: 150.0,
            sigma_frac: 0.1,
        }
        .apply(&mut grid, 0, 0);
        assert!((grid.get(5, 5, 0) - 150.0).abs() < 1e-12);
        assert!(grid.get(5, 6, 0) < 150.0);
        assert!((grid.get(5, 6, 0) - grid.get(6, 5, 0)).abs() < 1e-12);
    }

    #[test]
    fn gaussians_accumulate() {
        let mut grid = PopulationGrid::new(3, 3, 1);
        let blob = SeedShape::Gaussian {
            species: 0,
            fx: 0.0,
            fy: 0.0,
            amplitude: 2.0,
            sigma_frac: 0.5,
        };
        apply_all(&[blob.clone(), blob], &mut grid, 0);
        assert!((grid.get(0, 0, 0) - 4.0).abs() < 1e-12);
    }

    #[test]
    fn ring_leaves_centre_empty() {
        let mut grid = PopulationGrid::new(20, 20, 1);
        SeedShape::Ring {
            species: 0,
            fx: 0.5,
            fy: 0.5,
            inner_frac: 0.16,
            outer_frac: 0.24,
            value: 100.0,
        }
        .apply(&mut grid, 0, 0);
        // centre (10, 10); r1 = 3.2, r2 = 4.8
        assert_eq!(grid.get(10, 10, 0), 0.0);
        assert_eq!(grid.get(10, 14, 0), 100.0);
        assert_eq!(grid.get(10, 16, 0), 0.0);
    }

    #[test]
    fn zero_width_gaussian_lands_on_centre_cell() {
        let mut grid = PopulationGrid::new(3, 3, 1);
        SeedShape::Gaussian {
            species: 0,
            fx: 0.5,
            fy: 0.5,
            amplitude: 10.0,
            sigma_frac: 0.0,
        }
        .apply(&mut grid, 0, 0);
        assert_eq!(grid.get(1, 1, 0), 10.0);
        assert_eq!(grid.get(0, 1, 0), 0.0);
        assert_eq!(grid.total(0), 10.0);
    }

    #[test]
    fn negative_and_non_finite_values_seed_zero() {
        let mut grid = PopulationGrid::new(4, 4, 1);
        grid.set(0, 0, 0, 3.0);
        let shapes = [
            SeedShape::Cell {
                species: 0,
                x: 0,
                y: 0,
                value: -5.0,
            },
            SeedShape::Block {
                species: 0,
                region: BlockRegion::BottomRight,
                size_frac: 0.5,
                min_cells: 1,
                value: -1.0,
            },
            SeedShape::Ring {
                species: 0,
                fx: 0.5,
                fy: 0.5,
                inner_frac: 0.0,
                outer_frac: 0.5,
                value: f64::NEG_INFINITY,
            },
            SeedShape::Gaussian {
                species: 0,
                fx: 0.0,
                fy: 1.0,
                amplitude: f64::NAN,
                sigma_frac: f64::NAN,
            },
        ];
        apply_all(&shapes, &mut grid, 7);
        assert!(grid.data().iter().all(|&v| v == 0.0));
    }

    #[test]
    fn noise_is_bounded_and_reproducible() {
        let shape = SeedShape::Noise {
            species: 1,
            amplitude: 30.0,
        };
        let mut a = PopulationGrid::new(5, 4, 2);
        let mut b = PopulationGrid::new(5, 4, 2);
        shape.apply(&mut a, 42, 0);
        shape.apply(&mut b, 42, 0);
        assert_eq!(a, b);
        assert_eq!(a.total(0), 0.0);
        for y in 0..4 {
            for x in 0..5 {
                let v = a.get(y, x, 1);
                assert!((0.0..30.0).contains(&v));
            }
        }
        let mut c = PopulationGrid::new(5, 4, 2);
        shape.apply(&mut c, 42, 1);
        assert_ne!(a, c);
    }

    #[test]
    fn edge_strips_cover_full_height() {
        let mut grid = PopulationGrid::new(10, 3, 1);
        for region in [BlockRegion::LeftEdge, BlockRegion::RightEdge] {
            SeedShape::Block {
                species: 0,
                region,
                size_frac: 0.08,
                min_cells: 1,
                value: 50.0,
            }
            .apply(&mut grid, 0, 0);
        }
        for y in 0..3 {
            assert_eq!(grid.get(y, 0, 0), 50.0);
            assert_eq!(grid.get(y, 9, 0), 50.0);
            assert_eq!(grid.get(y, 1, 0), 0.0);
        }
        assert_eq!(grid.total(0), 300.0);
    }

    #[test]
    fn corner_blocks_respect_minimum_and_board() {
        let mut grid = PopulationGrid::new(10, 10, 4);
        let corners = [
            BlockRegion::TopLeft,
            BlockRegion::BottomLeft,
            BlockRegion::TopRight,
            BlockRegion::BottomRight,
        ];
        let shapes: Vec<SeedShape> = corners
            .iter()
            .enumerate()
            .map(|(k, &region)| SeedShape::Block {
                species: k,
                region,
                size_frac: 0.1,
                min_cells: 2,
                value: 200.0,
            })
            .collect();
        apply_all(&shapes, &mut grid, 0);
        assert_eq!(grid.get(1, 1, 0), 200.0);
        assert_eq!(grid.get(8, 0, 1), 200.0);
        assert_eq!(grid.get(0, 9, 2), 200.0);
        assert_eq!(grid.get(9, 9, 3), 200.0);
        assert_eq!(grid.totals(), vec![800.0; 4]);

        let mut tiny = PopulationGrid::new(1, 1, 1);
        SeedShape::Block {
            species: 0,
            region: BlockRegion::BottomRight,
            size_frac: 0.1,
            min_cells: 2,
            value: 1.0,
        }
        .apply(&mut tiny, 0, 0);
        assert_eq!(tiny.get(0, 0, 0), 1.0);
    }

    #[test]
    fn out_of_range_targets_are_ignored() {
        let mut grid = PopulationGrid::new(2, 2, 1);
        SeedShape::Cell {
            species: 0,
            x: 5,
            y: 0,
            value: 1.0,
        }
        .apply(&mut grid, 0, 0);
        SeedShape::Cell {
            species: 3,
            x: 0,
            y: 0,
            value: 1.0,
        }
        .apply(&mut grid, 0, 0);
        assert_eq!(grid.total(0), 0.0);
    }

    #[test]
    fn shapes_parse_from_tagged_json() {
        let json = r#"[
            {"shape": "cell", "species": 0, "x": 1, "y": 0, "value": 2.5},
            {"shape": "block", "species": 0, "region": "top_left", "size_frac": 0.5, "value": 1.0}
        ]"#;
        let shapes: Vec<SeedShape> = serde_json::from_str(json).expect("shapes should parse");
        assert_eq!(shapes.len(), 2);
        assert!(matches!(
            shapes[1],
            SeedShape::Block {
                min_cells: 1,
                region: BlockRegion::TopLeft,
                ..
            }
        ));
    }
}
