use super::*;
use crate::config::BoundaryCondition;
use crate::layout::to_cell_major;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha12Rng;

fn config(method: DiffusionMethod, boundary: BoundaryCondition, dt: f64, steps: usize) -> SimConfig {
    SimConfig {
        method,
        boundary,
        dt,
        steps,
        compare_methods: false,
    }
}

fn single_species(width: usize, height: usize, cells: &[(usize, usize, f64)]) -> PopulationGrid {
    let mut grid = PopulationGrid::new(width, height, 1);
    for &(y, x, v) in cells {
        grid.set(y, x, 0, v);
    }
    grid
}

fn random_grid(seed: u64, width: usize, height: usize, species: usize) -> PopulationGrid {
    let mut rng = ChaCha12Rng::seed_from_u64(seed);
    let mut grid = PopulationGrid::new(width, height, species);
    for v in grid.data_mut() {
        *v = rng.random_range(0.0..40.0);
    }
    grid
}

fn predator_prey_matrix() -> InteractionMatrix {
    InteractionMatrix::from_rows(&[vec![0.02, -0.04], vec![0.06, -0.05]]).unwrap()
}

#[test]
fn trajectory_has_initial_frame_plus_one_per_step() {
    let sim = Simulation::new(
        random_grid(1, 4, 3, 2),
        predator_prey_matrix(),
        DispersionCoefficients::new(&[0.1, 0.2]),
        config(DiffusionMethod::Adi, BoundaryCondition::Neumann, 1.0, 7),
    );
    let out = sim.prepare_calculations();
    assert_eq!(out.primary.len(), 8);
    assert_eq!(to_cell_major(&out.primary[0]), *sim.initial_grid());
    assert!(out.explicit.is_none());
    assert!(out.adi.is_none());
}

#[test]
fn densities_never_negative_for_any_scheme_or_boundary() {
    // Strongly negative self-interaction and an unstable explicit step both
    // drive values below zero before clamping.
    let matrix = InteractionMatrix::from_rows(&[vec![-1.5, 0.3], vec![0.8, -2.0]]).unwrap();
    for method in [DiffusionMethod::Explicit, DiffusionMethod::Adi] {
        for boundary in [BoundaryCondition::Dirichlet, BoundaryCondition::Neumann] {
            let sim = Simulation::new(
                random_grid(7, 6, 5, 2),
                matrix.clone(),
                DispersionCoefficients::new(&[0.4, 0.4]),
                config(method, boundary, 3.0, 25),
            );
            let trajectory = sim.run_trajectory(sim.config());
            for frame in &trajectory {
                assert!(
                    frame.data().iter().all(|&v| v >= 0.0),
                    "{method:?}/{boundary:?} produced a negative density"
                );
            }
        }
    }
}

#[test]
fn neumann_diffusion_conserves_total_density() {
    for method in [DiffusionMethod::Explicit, DiffusionMethod::Adi] {
        let sim = Simulation::new(
            random_grid(3, 9, 7, 1),
            InteractionMatrix::zeros(1),
            DispersionCoefficients::new(&[0.2]),
            config(method, BoundaryCondition::Neumann, 1.0, 1),
        );
        let trajectory = sim.run_trajectory(sim.config());
        let before = trajectory[0].total(0);
        let after = trajectory[1].total(0);
        assert!(
            (before - after).abs() < 1e-9,
            "{method:?}: {before} -> {after}"
        );
    }
}

#[test]
fn dirichlet_diffusion_does_not_increase_total_density() {
    for method in [DiffusionMethod::Explicit, DiffusionMethod::Adi] {
        let sim = Simulation::new(
            random_grid(4, 8, 8, 1),
            InteractionMatrix::zeros(1),
            DispersionCoefficients::new(&[0.2]),
            config(method, BoundaryCondition::Dirichlet, 1.0, 10),
        );
        let trajectory = sim.run_trajectory(sim.config());
        for pair in trajectory.frames().windows(2) {
            assert!(pair[1].total(0) <= pair[0].total(0) + 1e-9, "{method:?}");
        }
    }
}

#[test]
fn center_impulse_spreads_to_four_neighbours() {
    let sim = Simulation::new(
        single_species(3, 3, &[(1, 1, 10.0)]),
        InteractionMatrix::zeros(1),
        DispersionCoefficients::new(&[0.2]),
        config(DiffusionMethod::Explicit, BoundaryCondition::Dirichlet, 1.0, 1),
    );
    let trajectory = sim.prepare_calculations().primary;
    let after = &trajectory[1];
    assert!(after[(0, 1, 1)] < 10.0);
    assert!((after[(0, 1, 1)] - 2.0).abs() < 1e-12);
    for (y, x) in [(0, 1), (1, 0), (1, 2), (2, 1)] {
        assert!((after[(0, y, x)] - 2.0).abs() < 1e-12, "neighbour ({y},{x})");
    }
    for (y, x) in [(0, 0), (0, 2), (2, 0), (2, 2)] {
        assert_eq!(after[(0, y, x)], 0.0, "corner ({y},{x})");
    }
}

#[test]
fn row_impulse_under_neumann_keeps_exact_total() {
    let sim = Simulation::new(
        single_species(5, 1, &[(0, 2, 4.0)]),
        InteractionMatrix::zeros(1),
        DispersionCoefficients::new(&[0.25]),
        config(DiffusionMethod::Explicit, BoundaryCondition::Neumann, 1.0, 1),
    );
    let trajectory = sim.prepare_calculations().primary;
    assert_eq!(trajectory[1].field(0), &[0.0, 1.0, 2.0, 1.0, 0.0]);
    assert_eq!(trajectory[1].total(0), trajectory[0].total(0));
}

#[test]
fn comparison_mode_leaves_primary_and_config_untouched() {
    let base = config(DiffusionMethod::Adi, BoundaryCondition::Neumann, 1.0, 30);
    let grid = random_grid(9, 6, 6, 2);
    let plain = Simulation::new(
        grid.clone(),
        predator_prey_matrix(),
        DispersionCoefficients::new(&[0.05, 0.09]),
        base,
    );
    let comparing = Simulation::new(
        grid,
        predator_prey_matrix(),
        DispersionCoefficients::new(&[0.05, 0.09]),
        SimConfig {
            compare_methods: true,
            ..base
        },
    );

    let reference = plain.prepare_calculations();
    let out = comparing.prepare_calculations();

    assert_eq!(comparing.config().method, DiffusionMethod::Adi);
    assert_eq!(out.primary, reference.primary);

    let explicit = out.explicit.expect("explicit comparison run");
    let adi = out.adi.expect("adi comparison run");
    assert_eq!(explicit.len(), out.primary.len());
    assert_eq!(explicit[0], out.primary[0]);
    assert_eq!(adi[0], out.primary[0]);
    assert_eq!(adi, out.primary);
    assert_ne!(explicit, out.primary);
}

#[test]
fn repeated_runs_are_deterministic() {
    let sim = Simulation::new(
        random_grid(2, 5, 4, 2),
        predator_prey_matrix(),
        DispersionCoefficients::new(&[0.1, 0.3]),
        config(DiffusionMethod::Explicit, BoundaryCondition::Dirichlet, 0.5, 12),
    );
    assert_eq!(sim.prepare_calculations(), sim.prepare_calculations());
}

#[test]
fn reaction_only_follows_linear_growth() {
    let sim = Simulation::new(
        single_species(1, 1, &[(0, 0, 1.0)]),
        InteractionMatrix::diagonal(&[0.5]),
        DispersionCoefficients::new(&[0.4]),
        config(DiffusionMethod::Adi, BoundaryCondition::Dirichlet, 1.0, 3),
    );
    let trajectory = sim.run_trajectory(sim.config());
    let totals: Vec<f64> = trajectory.iter().map(|f| f.total(0)).collect();
    assert_eq!(totals, vec![1.0, 1.5, 2.25, 3.375]);
}

#[test]
fn runaway_growth_stays_finite() {
    for method in [DiffusionMethod::Explicit, DiffusionMethod::Adi] {
        let sim = Simulation::new(
            single_species(3, 3, &[(1, 1, 5.0), (0, 2, 1.0)]),
            InteractionMatrix::diagonal(&[1.0]),
            DispersionCoefficients::new(&[0.2]),
            config(method, BoundaryCondition::Neumann, 1.0, SimConfig::MAX_STEPS),
        );
        let trajectory = sim.run_trajectory(sim.config());
        assert_eq!(trajectory.len(), SimConfig::MAX_STEPS + 1);
        for frame in &trajectory {
            assert!(frame.data().iter().all(|v| v.is_finite() && *v >= 0.0));
        }
    }
}

#[test]
fn try_new_rejects_mismatched_tables() {
    let grid = PopulationGrid::new(3, 3, 2);
    let cfg = SimConfig::default();
    assert_eq!(
        Simulation::try_new(
            grid.clone(),
            InteractionMatrix::zeros(1),
            DispersionCoefficients::new(&[0.1, 0.1]),
            cfg
        )
        .unwrap_err(),
        SimulationInitError::InteractionSizeMismatch {
            expected: 2,
            actual: 1
        }
    );
    assert_eq!(
        Simulation::try_new(
            grid,
            InteractionMatrix::zeros(2),
            DispersionCoefficients::new(&[0.1]),
            cfg
        )
        .unwrap_err(),
        SimulationInitError::DispersionLengthMismatch {
            expected: 2,
            actual: 1
        }
    );
}

#[test]
fn try_new_rejects_oversized_board_and_bad_config() {
    let err = Simulation::try_new(
        PopulationGrid::new(21, 2, 1),
        InteractionMatrix::zeros(1),
        DispersionCoefficients::new(&[0.1]),
        SimConfig::default(),
    )
    .unwrap_err();
    assert!(matches!(err, SimulationInitError::BoardTooLarge { .. }));

    let err = Simulation::try_new(
        PopulationGrid::new(2, 2, 1),
        InteractionMatrix::zeros(1),
        DispersionCoefficients::new(&[0.1]),
        SimConfig {
            steps: 0,
            ..SimConfig::default()
        },
    )
    .unwrap_err();
    assert_eq!(err, SimulationInitError::Config(SimConfigError::InvalidSteps));
    assert!(err.source().is_some());
}

#[test]
fn try_new_rejects_negative_initial_density() {
    let err = Simulation::try_new(
        single_species(2, 1, &[(0, 0, -1.0)]),
        InteractionMatrix::zeros(1),
        DispersionCoefficients::new(&[0.1]),
        SimConfig::default(),
    )
    .unwrap_err();
    assert_eq!(err, SimulationInitError::NegativeDensity);
}

#[test]
#[should_panic(expected = "must match species count")]
fn new_panics_on_precondition_violation() {
    let _ = Simulation::new(
        PopulationGrid::new(2, 2, 3),
        InteractionMatrix::zeros(2),
        DispersionCoefficients::new(&[0.1, 0.1, 0.1]),
        SimConfig::default(),
    );
}
