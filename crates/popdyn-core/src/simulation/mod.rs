use crate::coefficients::{DispersionCoefficients, InteractionMatrix};
use crate::config::{DiffusionMethod, SimConfig, SimConfigError};
use crate::constants::{MAX_BOARD_DIM, MAX_SPECIES};
use crate::diffusion::DiffusionEngine;
use crate::grid::PopulationGrid;
use crate::layout::{to_cell_major, to_species_major, write_species_major, SpeciesFrame};
use crate::reaction::apply_reaction;
use crate::trajectory::Trajectory;
use std::time::Instant;
use std::{error::Error, fmt};

/// Immutable bundle of everything a run needs: the initial board, the
/// coefficient tables, and the configuration.
#[derive(Clone, Debug)]
pub struct Simulation {
    initial: PopulationGrid,
    interaction: InteractionMatrix,
    dispersion: DispersionCoefficients,
    config: SimConfig,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SimulationInitError {
    Config(SimConfigError),
    EmptyBoard,
    NoSpecies,
    BoardTooLarge { max: usize, width: usize, height: usize },
    TooManySpecies { max: usize, actual: usize },
    InteractionSizeMismatch { expected: usize, actual: usize },
    DispersionLengthMismatch { expected: usize, actual: usize },
    NegativeDensity,
}

impl fmt::Display for SimulationInitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SimulationInitError::Config(e) => write!(f, "{}", e),
            SimulationInitError::EmptyBoard => write!(f, "board width and height must be positive"),
            SimulationInitError::NoSpecies => write!(f, "at least one species is required"),
            SimulationInitError::BoardTooLarge { max, width, height } => {
                write!(f, "board ({width}x{height}) exceeds supported maximum ({max}x{max})")
            }
            SimulationInitError::TooManySpecies { max, actual } => {
                write!(f, "species count ({actual}) exceeds supported maximum ({max})")
            }
            SimulationInitError::InteractionSizeMismatch { expected, actual } => write!(
                f,
                "interaction matrix size ({actual}) must match species count ({expected})"
            ),
            SimulationInitError::DispersionLengthMismatch { expected, actual } => write!(
                f,
                "dispersion coefficients ({actual}) must match species count ({expected})"
            ),
            SimulationInitError::NegativeDensity => {
                write!(f, "initial densities must be finite and non-negative")
            }
        }
    }
}

impl From<SimConfigError> for SimulationInitError {
    fn from(err: SimConfigError) -> Self {
        SimulationInitError::Config(err)
    }
}

impl Error for SimulationInitError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            SimulationInitError::Config(e) => Some(e),
            _ => None,
        }
    }
}

/// Trajectories produced by one call to [`Simulation::prepare_calculations`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RunOutput {
    /// Run with the configured scheme.
    pub primary: Trajectory,
    /// Explicit-only rerun from the same initial board, when comparison is enabled.
    pub explicit: Option<Trajectory>,
    /// ADI-only rerun from the same initial board, when comparison is enabled.
    pub adi: Option<Trajectory>,
}

/// Working state for one trajectory: the evolving board plus reusable buffers.
struct Integrator<'a> {
    sim: &'a Simulation,
    config: SimConfig,
    grid: PopulationGrid,
    engine: DiffusionEngine,
    frame: SpeciesFrame,
    increments: SpeciesFrame,
}

impl<'a> Integrator<'a> {
    fn new(sim: &'a Simulation, config: SimConfig) -> Self {
        let grid = sim.initial.clone();
        let frame = to_species_major(&grid);
        let increments = SpeciesFrame::zeros(grid.width(), grid.height(), grid.species_count());
        Self {
            sim,
            config,
            grid,
            engine: DiffusionEngine::for_method(config.method),
            frame,
            increments,
        }
    }

    /// Reaction, then diffusion of every species, then clamp to non-negative.
    fn tick(&mut self) {
        apply_reaction(&mut self.grid, &self.sim.interaction);

        write_species_major(&self.grid, &mut self.frame);
        self.engine.increment_frame(
            &self.frame,
            self.sim.dispersion.as_slice(),
            self.config.dt,
            self.config.boundary,
            &mut self.increments,
        );
        let delta = to_cell_major(&self.increments);
        for (value, d) in self.grid.data_mut().iter_mut().zip(delta.data()) {
            *value += d;
        }
        self.grid.clamp_non_negative();
    }

    fn run(mut self) -> Trajectory {
        let mut trajectory = Trajectory::with_capacity(self.config.steps + 1);
        trajectory.push(to_species_major(&self.grid));
        for _ in 0..self.config.steps {
            self.tick();
            trajectory.push(to_species_major(&self.grid));
        }
        trajectory
    }
}

impl Simulation {
    pub fn new(
        initial: PopulationGrid,
        interaction: InteractionMatrix,
        dispersion: DispersionCoefficients,
        config: SimConfig,
    ) -> Self {
        Self::try_new(initial, interaction, dispersion, config).unwrap_or_else(|e| panic!("{e}"))
    }

    pub fn try_new(
        initial: PopulationGrid,
        interaction: InteractionMatrix,
        dispersion: DispersionCoefficients,
        config: SimConfig,
    ) -> Result<Self, SimulationInitError> {
        config.validate()?;
        let (width, height, species) = (
            initial.width(),
            initial.height(),
            initial.species_count(),
        );
        if width > MAX_BOARD_DIM || height > MAX_BOARD_DIM {
            return Err(SimulationInitError::BoardTooLarge {
                max: MAX_BOARD_DIM,
                width,
                height,
            });
        }
        if species > MAX_SPECIES {
            return Err(SimulationInitError::TooManySpecies {
                max: MAX_SPECIES,
                actual: species,
            });
        }
        if interaction.size() != species {
            return Err(SimulationInitError::InteractionSizeMismatch {
                expected: species,
                actual: interaction.size(),
            });
        }
        if dispersion.len() != species {
            return Err(SimulationInitError::DispersionLengthMismatch {
                expected: species,
                actual: dispersion.len(),
            });
        }
        if initial.data().iter().any(|v| !(v.is_finite() && *v >= 0.0)) {
            return Err(SimulationInitError::NegativeDensity);
        }
        Ok(Self {
            initial,
            interaction,
            dispersion,
            config,
        })
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn initial_grid(&self) -> &PopulationGrid {
        &self.initial
    }

    pub fn interaction(&self) -> &InteractionMatrix {
        &self.interaction
    }

    pub fn dispersion(&self) -> &DispersionCoefficients {
        &self.dispersion
    }

    /// Run `config.steps` ticks from the initial board under `config`.
    ///
    /// `config` may differ from the stored configuration; the comparison reruns
    /// pass a copy with the scheme overridden.
    pub fn run_trajectory(&self, config: &SimConfig) -> Trajectory {
        Integrator::new(self, *config).run()
    }

    /// Primary run, plus the explicit-only and ADI-only reruns when
    /// `compare_methods` is set. Every run starts from the same initial board.
    pub fn prepare_calculations(&self) -> RunOutput {
        let config = self.config;
        let max_dispersion = self.dispersion.max();
        if config.explicit_stability_warning(max_dispersion) {
            log::warn!(
                "explicit scheme with D*dt = {:.3} exceeds the stability hint; expect oscillation",
                config.explicit_stability_number(max_dispersion)
            );
        }
        log::info!(
            "running {}x{} board, {} species, {:?}/{:?}, dt={}, {} steps",
            self.initial.width(),
            self.initial.height(),
            self.initial.species_count(),
            config.method,
            config.boundary,
            config.dt,
            config.steps
        );

        let started = Instant::now();
        let primary = self.run_trajectory(&config);
        let (explicit, adi) = if config.compare_methods {
            log::debug!("comparison rerun with explicit scheme");
            let explicit = self.run_trajectory(&config.with_method(DiffusionMethod::Explicit));
            log::debug!("comparison rerun with ADI scheme");
            let adi = self.run_trajectory(&config.with_method(DiffusionMethod::Adi));
            (Some(explicit), Some(adi))
        } else {
            (None, None)
        };
        log::info!(
            "run finished: {} frames in {:.1} ms",
            primary.len(),
            started.elapsed().as_secs_f64() * 1000.0
        );

        RunOutput {
            primary,
            explicit,
            adi,
        }
    }
}

#[cfg(test)]
mod tests;
