use crate::coefficients::{DispersionCoefficients, InteractionMatrix};
use crate::config::{BoundaryCondition, DiffusionMethod, SimConfig};
use crate::constants::{MAX_BOARD_DIM, MAX_SPECIES};
use crate::grid::PopulationGrid;
use crate::presets::{preset_by_index, Preset, Scenario};
use crate::seeding::{apply_all, SeedShape};
use crate::simulation::{RunOutput, Simulation, SimulationInitError};
use crate::species::Species;
use crate::trajectory::Trajectory;

/// Editable model state plus the trajectories of the most recent run.
///
/// Every mutation clamps into the supported range, and the species list,
/// interaction matrix, dispersion vector and grid always agree on the
/// species count.
#[derive(Clone, Debug)]
pub struct Session {
    species: Vec<Species>,
    grid: PopulationGrid,
    interaction: InteractionMatrix,
    dispersion: DispersionCoefficients,
    config: SimConfig,
    seed: u64,
    output: RunOutput,
}

impl Default for Session {
    fn default() -> Self {
        Self::from_scenario(&Scenario::default())
    }
}

fn clamp_dim(value: usize) -> usize {
    value.clamp(1, MAX_BOARD_DIM)
}

fn clamp_density(value: f64) -> f64 {
    if value.is_finite() {
        value.max(0.0)
    } else {
        0.0
    }
}

impl Session {
    /// Empty board with a single default species.
    pub fn new(width: usize, height: usize) -> Self {
        let (width, height) = (clamp_dim(width), clamp_dim(height));
        Self {
            species: vec![Species::default_for(0)],
            grid: PopulationGrid::new(width, height, 1),
            interaction: InteractionMatrix::zeros(1),
            dispersion: DispersionCoefficients::uniform(1, crate::constants::DEFAULT_DISPERSION),
            config: SimConfig::default(),
            seed: 0,
            output: RunOutput::default(),
        }
    }

    /// Build a session from a scenario, clamping whatever is out of range.
    ///
    /// Species beyond the maximum are dropped and the coefficient tables are
    /// resized to the resulting species count.
    pub fn from_scenario(scenario: &Scenario) -> Self {
        let mut species: Vec<Species> = scenario.species.iter().take(MAX_SPECIES).cloned().collect();
        if species.is_empty() {
            species.push(Species::default_for(0));
        }
        let count = species.len();
        let mut interaction = scenario.interaction.clone();
        if interaction.size() != count {
            log::debug!(
                "resizing interaction matrix from {} to {count}",
                interaction.size()
            );
            interaction.resize(count);
        }
        let mut dispersion = scenario.dispersion.clone();
        if dispersion.len() != count {
            log::debug!("resizing dispersion from {} to {count}", dispersion.len());
            dispersion.resize(count);
        }
        Self {
            species,
            grid: scenario.initial_grid(),
            interaction,
            dispersion,
            config: scenario.config.sanitized(),
            seed: scenario.seed,
            output: RunOutput::default(),
        }
    }

    /// Export the current state. Non-zero densities become `Cell` seed shapes.
    pub fn to_scenario(&self) -> Scenario {
        let mut seeds = Vec::new();
        for y in 0..self.grid.height() {
            for x in 0..self.grid.width() {
                for (k, &value) in self.grid.cell(y, x).iter().enumerate() {
                    if value != 0.0 {
                        seeds.push(SeedShape::Cell {
                            species: k,
                            x,
                            y,
                            value,
                        });
                    }
                }
            }
        }
        Scenario {
            width: self.grid.width(),
            height: self.grid.height(),
            seed: self.seed,
            species: self.species.clone(),
            interaction: self.interaction.clone(),
            dispersion: self.dispersion.clone(),
            config: self.config,
            seeds,
        }
    }

    pub fn species(&self) -> &[Species] {
        &self.species
    }

    pub fn species_count(&self) -> usize {
        self.species.len()
    }

    pub fn grid(&self) -> &PopulationGrid {
        &self.grid
    }

    pub fn interaction(&self) -> &InteractionMatrix {
        &self.interaction
    }

    pub fn dispersion(&self) -> &DispersionCoefficients {
        &self.dispersion
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn set_seed(&mut self, seed: u64) {
        self.seed = seed;
    }

    /// Change board dimensions, clamped to `[1, MAX_BOARD_DIM]`. Returns the applied size.
    pub fn resize(&mut self, width: usize, height: usize) -> (usize, usize) {
        let (w, h) = (clamp_dim(width), clamp_dim(height));
        if (w, h) != (width, height) {
            log::debug!("board size {width}x{height} clamped to {w}x{h}");
        }
        self.grid.resize(w, h);
        (w, h)
    }

    /// Append a default species. Returns its index, or `None` at the species limit.
    pub fn add_species(&mut self) -> Option<usize> {
        let index = self.species.len();
        if index >= MAX_SPECIES {
            log::debug!("species limit ({MAX_SPECIES}) reached");
            return None;
        }
        self.species.push(Species::default_for(index));
        self.interaction.resize(index + 1);
        self.dispersion.resize(index + 1);
        self.grid.set_species_count(index + 1);
        Some(index)
    }

    /// Remove species `index`. The last remaining species cannot be removed.
    pub fn remove_species(&mut self, index: usize) -> bool {
        if self.species.len() <= 1 || index >= self.species.len() {
            return false;
        }
        self.species.remove(index);
        self.interaction.remove(index);
        self.dispersion.remove(index);
        self.grid.remove_species(index);
        true
    }

    pub fn set_species_name(&mut self, index: usize, name: impl Into<String>) -> bool {
        match self.species.get_mut(index) {
            Some(s) => {
                s.name = name.into();
                true
            }
            None => false,
        }
    }

    pub fn set_interaction(&mut self, k: usize, j: usize, value: f64) -> bool {
        let s = self.species.len();
        if k >= s || j >= s || !value.is_finite() {
            return false;
        }
        self.interaction.set(k, j, value);
        true
    }

    /// Set a dispersion coefficient, clamped to `[0, MAX_DISPERSION]`. Returns the stored value.
    pub fn set_dispersion(&mut self, k: usize, value: f64) -> Option<f64> {
        if k >= self.species.len() {
            return None;
        }
        let stored = self.dispersion.set(k, value);
        if stored != value {
            log::debug!("dispersion {value} for species {k} clamped to {stored}");
        }
        Some(stored)
    }

    /// Set one density, clamped to be non-negative. Out-of-range targets are ignored.
    pub fn set_density(&mut self, y: usize, x: usize, k: usize, value: f64) -> bool {
        if y >= self.grid.height() || x >= self.grid.width() || k >= self.species.len() {
            return false;
        }
        self.grid.set(y, x, k, clamp_density(value));
        true
    }

    pub fn clear_grid(&mut self) {
        self.grid.zero();
    }

    /// Paint seed shapes over the current board using the session seed.
    pub fn seed_grid(&mut self, shapes: &[SeedShape]) {
        apply_all(shapes, &mut self.grid, self.seed);
    }

    pub fn set_config(&mut self, config: SimConfig) {
        let sanitized = config.sanitized();
        if sanitized != config {
            log::debug!("config clamped: {config:?} -> {sanitized:?}");
        }
        self.config = sanitized;
    }

    pub fn set_dt(&mut self, dt: f64) -> f64 {
        self.set_config(SimConfig { dt, ..self.config });
        self.config.dt
    }

    pub fn set_steps(&mut self, steps: usize) -> usize {
        self.set_config(SimConfig {
            steps,
            ..self.config
        });
        self.config.steps
    }

    pub fn set_method(&mut self, method: DiffusionMethod) {
        self.config.method = method;
    }

    pub fn set_boundary(&mut self, boundary: BoundaryCondition) {
        self.config.boundary = boundary;
    }

    pub fn set_compare_methods(&mut self, enabled: bool) {
        self.config.compare_methods = enabled;
    }

    /// Whether the explicit-scheme stability hint is exceeded for the current tables.
    pub fn stability_warning(&self) -> bool {
        self.config.explicit_stability_warning(self.dispersion.max())
    }

    /// Replace species, tables and configuration with the preset's, keep the
    /// board size and the comparison flag, zero the board and seed it.
    pub fn apply_preset(&mut self, preset: &Preset) {
        log::info!("applying preset '{}'", preset.name);
        let compare = self.config.compare_methods;
        self.species = preset.species.clone();
        self.interaction = preset.interaction.clone();
        self.dispersion = preset.dispersion.clone();
        self.config = SimConfig {
            compare_methods: compare,
            ..preset.config.sanitized()
        };
        self.grid = PopulationGrid::new(self.grid.width(), self.grid.height(), self.species.len());
        apply_all(&preset.seeds, &mut self.grid, self.seed);
    }

    /// Apply the preset at `index`; unknown indices leave the session unchanged.
    pub fn apply_preset_index(&mut self, index: usize) -> bool {
        match preset_by_index(index) {
            Some(preset) => {
                self.apply_preset(&preset);
                true
            }
            None => false,
        }
    }

    /// Immutable snapshot of the current state, ready to run.
    pub fn simulation(&self) -> Result<Simulation, SimulationInitError> {
        Simulation::try_new(
            self.grid.clone(),
            self.interaction.clone(),
            self.dispersion.clone(),
            self.config,
        )
    }

    /// Run from the current board and replace the stored trajectories.
    ///
    /// The board itself is not advanced, so it can be edited and rerun.
    pub fn run(&mut self) -> Result<&RunOutput, SimulationInitError> {
        let sim = self.simulation()?;
        self.output = sim.prepare_calculations();
        Ok(&self.output)
    }

    pub fn output(&self) -> &RunOutput {
        &self.output
    }

    pub fn trajectory(&self) -> &Trajectory {
        &self.output.primary
    }

    pub fn explicit_trajectory(&self) -> Option<&Trajectory> {
        self.output.explicit.as_ref()
    }

    pub fn adi_trajectory(&self) -> Option<&Trajectory> {
        self.output.adi.as_ref()
    }
}
