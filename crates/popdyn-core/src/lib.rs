pub mod coefficients;
pub mod config;
pub mod constants;
pub mod diffusion;
pub mod grid;
pub mod layout;
pub mod presets;
pub mod reaction;
pub mod seeding;
pub mod session;
pub mod simulation;
pub mod species;
pub mod trajectory;
pub mod tridiagonal;

pub use config::{BoundaryCondition, DiffusionMethod, SimConfig, SimConfigError};
pub use presets::{Preset, Scenario};
pub use session::Session;
pub use simulation::{RunOutput, Simulation, SimulationInitError};
pub use trajectory::{Trajectory, TrajectorySummary};
