use crate::coefficients::{DispersionCoefficients, InteractionMatrix};
use crate::config::{BoundaryCondition, DiffusionMethod, SimConfig};
use crate::constants::{DEFAULT_DISPERSION, MAX_BOARD_DIM, MAX_SPECIES};
use crate::grid::PopulationGrid;
use crate::seeding::{apply_all, BlockRegion, SeedShape};
use crate::simulation::{Simulation, SimulationInitError};
use crate::species::{palette_color, Species};
use serde::{Deserialize, Serialize};

/// Complete, serializable description of a run: board, species, tables,
/// configuration, and how to seed the initial densities.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Scenario {
    pub width: usize,
    pub height: usize,
    /// Seed for noise shapes.
    pub seed: u64,
    pub species: Vec<Species>,
    pub interaction: InteractionMatrix,
    pub dispersion: DispersionCoefficients,
    pub config: SimConfig,
    pub seeds: Vec<SeedShape>,
}

impl Default for Scenario {
    fn default() -> Self {
        Self {
            width: 10,
            height: 10,
            seed: 42,
            species: vec![Species::default_for(0)],
            interaction: InteractionMatrix::zeros(1),
            dispersion: DispersionCoefficients::uniform(1, DEFAULT_DISPERSION),
            config: SimConfig::default(),
            seeds: vec![SeedShape::Gaussian {
                species: 0,
                fx: 0.5,
                fy: 0.5,
                amplitude: 100.0,
                sigma_frac: 0.1,
            }],
        }
    }
}

impl Scenario {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Zeroed board of the scenario's dimensions with every seed shape applied.
    ///
    /// Dimensions and species count are clamped into the supported range.
    pub fn initial_grid(&self) -> PopulationGrid {
        let width = self.width.clamp(1, MAX_BOARD_DIM);
        let height = self.height.clamp(1, MAX_BOARD_DIM);
        let species = self.species.len().clamp(1, MAX_SPECIES);
        let mut grid = PopulationGrid::new(width, height, species);
        apply_all(&self.seeds, &mut grid, self.seed);
        grid
    }

    /// Strict conversion: out-of-range dimensions, species counts, or table
    /// sizes are reported instead of clamped.
    pub fn to_simulation(&self) -> Result<Simulation, SimulationInitError> {
        if self.width == 0 || self.height == 0 {
            return Err(SimulationInitError::EmptyBoard);
        }
        if self.width > MAX_BOARD_DIM || self.height > MAX_BOARD_DIM {
            return Err(SimulationInitError::BoardTooLarge {
                max: MAX_BOARD_DIM,
                width: self.width,
                height: self.height,
            });
        }
        if self.species.is_empty() {
            return Err(SimulationInitError::NoSpecies);
        }
        if self.species.len() > MAX_SPECIES {
            return Err(SimulationInitError::TooManySpecies {
                max: MAX_SPECIES,
                actual: self.species.len(),
            });
        }
        Simulation::try_new(
            self.initial_grid(),
            self.interaction.clone(),
            self.dispersion.clone(),
            self.config,
        )
    }

    pub fn species_names(&self) -> Vec<String> {
        self.species.iter().map(|s| s.name.clone()).collect()
    }
}

/// Built-in scenario template. Board size and seed are chosen when it is applied.
#[derive(Clone, Debug, PartialEq)]
pub struct Preset {
    pub name: &'static str,
    pub description: &'static str,
    pub species: Vec<Species>,
    pub interaction: InteractionMatrix,
    pub dispersion: DispersionCoefficients,
    pub config: SimConfig,
    pub seeds: Vec<SeedShape>,
}

impl Preset {
    /// Lower-case name with non-alphanumeric runs replaced by `-`.
    pub fn slug(&self) -> String {
        let mut slug = String::with_capacity(self.name.len());
        for c in self.name.chars() {
            if c.is_ascii_alphanumeric() {
                slug.push(c.to_ascii_lowercase());
            } else if !slug.ends_with('-') {
                slug.push('-');
            }
        }
        slug.trim_matches('-').to_string()
    }

    pub fn to_scenario(&self, width: usize, height: usize, seed: u64) -> Scenario {
        Scenario {
            width,
            height,
            seed,
            species: self.species.clone(),
            interaction: self.interaction.clone(),
            dispersion: self.dispersion.clone(),
            config: self.config,
            seeds: self.seeds.clone(),
        }
    }
}

fn species(names: &[&str], palette: &[usize]) -> Vec<Species> {
    names
        .iter()
        .zip(palette)
        .map(|(name, &i)| Species::new(*name, palette_color(i)))
        .collect()
}

fn matrix(rows: &[&[f64]]) -> InteractionMatrix {
    let rows: Vec<Vec<f64>> = rows.iter().map(|r| r.to_vec()).collect();
    InteractionMatrix::from_rows(&rows).unwrap_or_else(|| panic!("preset matrix must be square"))
}

fn config(boundary: BoundaryCondition, method: DiffusionMethod, dt: f64, steps: usize) -> SimConfig {
    SimConfig {
        method,
        boundary,
        dt,
        steps,
        compare_methods: false,
    }
}

fn gaussian(species: usize, fx: f64, fy: f64, amplitude: f64, sigma_frac: f64) -> SeedShape {
    SeedShape::Gaussian {
        species,
        fx,
        fy,
        amplitude,
        sigma_frac,
    }
}

fn block(species: usize, region: BlockRegion, size_frac: f64, min_cells: usize, value: f64) -> SeedShape {
    SeedShape::Block {
        species,
        region,
        size_frac,
        min_cells,
        value,
    }
}

/// All built-in presets in menu order.
pub fn presets() -> Vec<Preset> {
    use BoundaryCondition::{Dirichlet, Neumann};
    use DiffusionMethod::{Adi, Explicit};

    vec![
        Preset {
            name: "Two-Front Collision",
            description: "Single species invading from left and right, colliding in the center",
            species: species(&["ink"], &[10]),
            interaction: matrix(&[&[-0.005]]),
            dispersion: DispersionCoefficients::new(&[0.12]),
            config: config(Dirichlet, Explicit, 0.8, 200),
            seeds: vec![
                block(0, BlockRegion::LeftEdge, 0.08, 1, 50.0),
                block(0, BlockRegion::RightEdge, 0.08, 1, 50.0),
            ],
        },
        Preset {
            name: "Predator Core vs Prey Ring",
            description: "Prey ring around a predator core; waves form as predator chases prey",
            species: species(&["prey", "predator"], &[0, 1]),
            interaction: matrix(&[&[0.02, -0.04], &[0.06, -0.05]]),
            dispersion: DispersionCoefficients::new(&[0.05, 0.09]),
            config: config(Neumann, Adi, 1.0, 220),
            seeds: vec![
                SeedShape::Ring {
                    species: 0,
                    fx: 0.5,
                    fy: 0.5,
                    inner_frac: 0.16,
                    outer_frac: 0.24,
                    value: 100.0,
                },
                gaussian(1, 0.5, 0.5, 150.0, 0.05),
            ],
        },
        Preset {
            name: "Cyclic Triad Waves",
            description: "Rock-paper-scissors waves seeded at three vertices",
            species: species(&["R", "P", "S"], &[0, 7, 9]),
            interaction: matrix(&[
                &[-0.02, 0.03, -0.03],
                &[-0.03, -0.02, 0.03],
                &[0.03, -0.03, -0.02],
            ]),
            dispersion: DispersionCoefficients::uniform(3, 0.06),
            config: config(Neumann, Adi, 1.0, 240),
            seeds: vec![
                gaussian(0, 0.20, 0.20, 120.0, 0.05),
                gaussian(1, 0.80, 0.25, 120.0, 0.05),
                gaussian(2, 0.50, 0.80, 120.0, 0.05),
            ],
        },
        Preset {
            name: "Competitive Domains From Noise",
            description: "Two rivals segregate into domains starting from tiny noise",
            species: species(&["blue", "yellow"], &[0, 2]),
            interaction: matrix(&[&[-0.02, -0.03], &[-0.03, -0.02]]),
            dispersion: DispersionCoefficients::uniform(2, 0.02),
            config: config(Neumann, Explicit, 0.7, 300),
            seeds: vec![
                SeedShape::Noise {
                    species: 0,
                    amplitude: 30.0,
                },
                SeedShape::Noise {
                    species: 1,
                    amplitude: 30.0,
                },
            ],
        },
        Preset {
            name: "Four Corners Convergence",
            description: "Four species seeded at corners converge and interact",
            species: species(&["A", "B", "C", "D"], &[0, 8, 12, 5]),
            interaction: InteractionMatrix::diagonal(&[-0.005; 4]),
            dispersion: DispersionCoefficients::uniform(4, 0.08),
            config: config(Dirichlet, Explicit, 0.6, 180),
            seeds: vec![
                block(0, BlockRegion::TopLeft, 0.1, 2, 200.0),
                block(1, BlockRegion::BottomLeft, 0.1, 2, 200.0),
                block(2, BlockRegion::TopRight, 0.1, 2, 200.0),
                block(3, BlockRegion::BottomRight, 0.1, 2, 200.0),
            ],
        },
        Preset {
            name: "Fast vs Slow Diffusion Twins",
            description: "Two species with identical initial blobs but very different diffusion",
            species: species(&["slow", "fast"], &[11, 5]),
            interaction: InteractionMatrix::zeros(2),
            dispersion: DispersionCoefficients::new(&[0.01, 0.18]),
            config: config(Neumann, Adi, 1.0, 200),
            seeds: vec![
                gaussian(0, 0.5, 0.5, 200.0, 0.10),
                gaussian(1, 0.5, 0.5, 200.0, 0.10),
            ],
        },
    ]
}

pub fn preset_names() -> Vec<&'static str> {
    presets().iter().map(|p| p.name).collect()
}

pub fn preset_by_index(index: usize) -> Option<Preset> {
    presets().into_iter().nth(index)
}

/// Look up by menu index, exact name (case-insensitive), or slug.
pub fn find_preset(key: &str) -> Option<Preset> {
    let key = key.trim();
    if let Ok(index) = key.parse::<usize>() {
        return preset_by_index(index);
    }
    presets()
        .into_iter()
        .find(|p| p.name.eq_ignore_ascii_case(key) || p.slug() == key.to_ascii_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn six_presets_with_consistent_tables() {
        let all = presets();
        assert_eq!(all.len(), 6);
        for p in &all {
            let s = p.species.len();
            assert_eq!(p.interaction.size(), s, "{}", p.name);
            assert_eq!(p.dispersion.len(), s, "{}", p.name);
            assert_eq!(p.config.validate(), Ok(()), "{}", p.name);
            assert!(p.seeds.iter().all(|shape| shape.species() < s), "{}", p.name);
        }
    }

    #[test]
    fn lookup_by_index_name_and_slug() {
        assert_eq!(find_preset("1").map(|p| p.name), Some("Predator Core vs Prey Ring"));
        assert_eq!(
            find_preset("cyclic triad waves").map(|p| p.name),
            Some("Cyclic Triad Waves")
        );
        assert_eq!(
            find_preset("fast-vs-slow-diffusion-twins").map(|p| p.name),
            Some("Fast vs Slow Diffusion Twins")
        );
        assert!(find_preset("6").is_none());
        assert!(find_preset("unknown").is_none());
    }

    #[test]
    fn two_front_collision_seeds_both_edges() {
        let preset = preset_by_index(0).unwrap();
        let grid = preset.to_scenario(20, 5, 0).initial_grid();
        // round(0.08 * 20) = 2 columns on each side
        assert_eq!(grid.total(0), 50.0 * 2.0 * 2.0 * 5.0);
        assert_eq!(grid.get(4, 19, 0), 50.0);
        assert_eq!(grid.get(0, 2, 0), 0.0);
    }

    #[test]
    fn preset_scenarios_build_valid_simulations() {
        for (i, p) in presets().iter().enumerate() {
            let scenario = p.to_scenario(10, 8, 7);
            let sim = scenario
                .to_simulation()
                .unwrap_or_else(|e| panic!("preset {i} failed: {e}"));
            assert_eq!(sim.initial_grid().species_count(), p.species.len());
            assert!(sim.initial_grid().data().iter().any(|&v| v > 0.0), "{}", p.name);
        }
    }

    #[test]
    fn default_scenario_round_trips_through_json() {
        let scenario = Scenario::default();
        let json = scenario.to_json_pretty().unwrap();
        assert_eq!(Scenario::from_json(&json).unwrap(), scenario);
    }

    #[test]
    fn partial_scenario_json_uses_defaults() {
        let json = r#"{ "width": 4, "config": { "method": "adi" } }"#;
        let scenario = Scenario::from_json(json).expect("partial scenario should parse");
        assert_eq!(scenario.width, 4);
        assert_eq!(scenario.height, 10);
        assert_eq!(scenario.config.method, DiffusionMethod::Adi);
        assert_eq!(scenario.species.len(), 1);
    }

    #[test]
    fn strict_conversion_reports_problems() {
        let scenario = Scenario {
            width: 0,
            ..Scenario::default()
        };
        assert_eq!(
            scenario.to_simulation().unwrap_err(),
            SimulationInitError::EmptyBoard
        );
        let scenario = Scenario {
            species: Vec::new(),
            ..Scenario::default()
        };
        assert_eq!(
            scenario.to_simulation().unwrap_err(),
            SimulationInitError::NoSpecies
        );
        let scenario = Scenario {
            species: vec![Species::default_for(0), Species::default_for(1)],
            ..Scenario::default()
        };
        assert!(matches!(
            scenario.to_simulation(),
            Err(SimulationInitError::InteractionSizeMismatch { .. })
        ));
    }
}
