//! Per-species dispersion. Both schemes share one contract: a row-major
//! `H x W` field goes in, the density increment for one tick comes out.

use crate::config::{BoundaryCondition, DiffusionMethod};
use crate::layout::SpeciesFrame;
use crate::tridiagonal::TridiagonalSystem;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DiffusionParams {
    pub coefficient: f64,
    pub dt: f64,
    pub boundary: BoundaryCondition,
}

/// Second difference of `field` along one line at position `i`.
///
/// The line starts at `start` and visits `n` cells `stride` apart. A missing
/// neighbour is 0 under Dirichlet and equal to the edge cell under Neumann.
/// A line of length 1 has no coupling and yields 0.
///
/// The Neumann ghost is deliberately the edge cell, not a mirror of the
/// interior neighbour: the end row becomes `[-1, 1]` instead of `[-2, 2]`, and
/// plain grid sums are conserved exactly. `TridiagonalSystem::implicit_operator`
/// uses the same stencil.
fn second_difference(
    field: &[f64],
    start: usize,
    stride: usize,
    n: usize,
    i: usize,
    boundary: BoundaryCondition,
) -> f64 {
    if n == 1 {
        return 0.0;
    }
    let at = |j: usize| field[start + j * stride];
    let center = at(i);
    let ghost = match boundary {
        BoundaryCondition::Dirichlet => 0.0,
        BoundaryCondition::Neumann => center,
    };
    let prev = if i > 0 { at(i - 1) } else { ghost };
    let next = if i + 1 < n { at(i + 1) } else { ghost };
    prev - 2.0 * center + next
}

/// Forward-Euler five-point stencil: `increment = D * dt * laplacian(u)`.
#[derive(Clone, Debug, Default)]
pub struct ExplicitDiffusion;

impl ExplicitDiffusion {
    pub fn increment(
        &mut self,
        field: &[f64],
        width: usize,
        height: usize,
        params: DiffusionParams,
        out: &mut [f64],
    ) {
        check_shape(field, width, height, out);
        let scale = params.coefficient * params.dt;
        for y in 0..height {
            for x in 0..width {
                let laplacian = second_difference(field, y * width, 1, width, x, params.boundary)
                    + second_difference(field, x, width, height, y, params.boundary);
                out[y * width + x] = scale * laplacian;
            }
        }
    }
}

/// Peaceman–Rachford ADI with Crank–Nicolson half-steps, `r = D * dt / 2`.
///
/// Rows are solved implicitly first with the y-operator applied explicitly,
/// then columns with the x-operator applied explicitly.
#[derive(Clone, Debug, Default)]
pub struct AdiDiffusion {
    half: Vec<f64>,
    line: Vec<f64>,
    scratch: Vec<f64>,
}

impl AdiDiffusion {
    pub fn increment(
        &mut self,
        field: &[f64],
        width: usize,
        height: usize,
        params: DiffusionParams,
        out: &mut [f64],
    ) {
        check_shape(field, width, height, out);
        let r = 0.5 * params.coefficient * params.dt;
        let boundary = params.boundary;
        let rows = TridiagonalSystem::implicit_operator(width, r, boundary);
        let cols = TridiagonalSystem::implicit_operator(height, r, boundary);

        let Self {
            half,
            line,
            scratch,
        } = self;
        half.resize(width * height, 0.0);
        let longest = width.max(height);
        line.resize(longest, 0.0);
        scratch.resize(longest, 0.0);

        // (I - r Tx) u* = (I + r Ty) u
        for y in 0..height {
            let row = &mut line[..width];
            for (x, value) in row.iter_mut().enumerate() {
                *value = field[y * width + x]
                    + r * second_difference(field, x, width, height, y, boundary);
            }
            rows.solve_in_place(row, scratch);
            half[y * width..(y + 1) * width].copy_from_slice(row);
        }

        // (I - r Ty) u' = (I + r Tx) u*
        for x in 0..width {
            let col = &mut line[..height];
            for (y, value) in col.iter_mut().enumerate() {
                *value = half[y * width + x]
                    + r * second_difference(half, y * width, 1, width, x, boundary);
            }
            cols.solve_in_place(col, scratch);
            for (y, value) in col.iter().enumerate() {
                out[y * width + x] = value - field[y * width + x];
            }
        }
    }
}

fn check_shape(field: &[f64], width: usize, height: usize, out: &[f64]) {
    assert_eq!(field.len(), width * height, "field must be width * height");
    assert_eq!(out.len(), field.len(), "increment buffer must match field");
}

#[derive(Clone, Debug)]
pub enum DiffusionEngine {
    Explicit(ExplicitDiffusion),
    Adi(AdiDiffusion),
}

impl Default for DiffusionEngine {
    fn default() -> Self {
        Self::Explicit(ExplicitDiffusion)
    }
}

impl DiffusionEngine {
    pub fn for_method(method: DiffusionMethod) -> Self {
        match method {
            DiffusionMethod::Explicit => Self::Explicit(ExplicitDiffusion),
            DiffusionMethod::Adi => Self::Adi(AdiDiffusion::default()),
        }
    }

    pub fn method(&self) -> DiffusionMethod {
        match self {
            DiffusionEngine::Explicit(_) => DiffusionMethod::Explicit,
            DiffusionEngine::Adi(_) => DiffusionMethod::Adi,
        }
    }

    pub fn increment(
        &mut self,
        field: &[f64],
        width: usize,
        height: usize,
        params: DiffusionParams,
        out: &mut [f64],
    ) {
        match self {
            DiffusionEngine::Explicit(engine) => engine.increment(field, width, height, params, out),
            DiffusionEngine::Adi(engine) => engine.increment(field, width, height, params, out),
        }
    }

    /// Fill `increments` with the diffusion increment of every species in `frame`.
    pub fn increment_frame(
        &mut self,
        frame: &SpeciesFrame,
        coefficients: &[f64],
        dt: f64,
        boundary: BoundaryCondition,
        increments: &mut SpeciesFrame,
    ) {
        let (width, height, species) = (frame.width(), frame.height(), frame.species_count());
        assert!(
            coefficients.len() >= species,
            "dispersion coefficients ({}) fewer than species ({species})",
            coefficients.len()
        );
        if increments.width() != width
            || increments.height() != height
            || increments.species_count() != species
        {
            *increments = SpeciesFrame::zeros(width, height, species);
        }
        for (k, &coefficient) in coefficients.iter().enumerate().take(species) {
            let params = DiffusionParams {
                coefficient,
                dt,
                boundary,
            };
            self.increment(frame.field(k), width, height, params, increments.field_mut(k));
        }
    }
}
