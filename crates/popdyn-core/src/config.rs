use crate::constants::{EXPLICIT_STABILITY_LIMIT, MAX_STEPS, MIN_DT};
use serde::{Deserialize, Serialize};

/// Diffusion scheme used for the dispersion half of each tick.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DiffusionMethod {
    /// Forward-Euler five-point finite differences.
    #[default]
    Explicit,
    /// Alternating-direction implicit (Crank–Nicolson) with tridiagonal sweeps.
    Adi,
}

/// Treatment of the domain edge for every species.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum BoundaryCondition {
    /// Absorbing edge held at zero density.
    #[default]
    Dirichlet,
    /// Zero-flux, reflective edge. Conserves total density.
    Neumann,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SimConfig {
    /// Diffusion scheme for the primary run.
    pub method: DiffusionMethod,
    /// Boundary condition applied to every species field.
    pub boundary: BoundaryCondition,
    /// Diffusion timestep. The reaction term always advances by unit time.
    pub dt: f64,
    /// Number of ticks to simulate; the trajectory holds `steps + 1` frames.
    pub steps: usize,
    /// Additionally record explicit-only and ADI-only trajectories from the same start.
    pub compare_methods: bool,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            method: DiffusionMethod::Explicit,
            boundary: BoundaryCondition::Dirichlet,
            dt: 1.0,
            steps: 100,
            compare_methods: false,
        }
    }
}

macro_rules! define_sim_config_error {
    (
        $(
            $variant:ident $( { $($field:ident : $type:ty),* } )? => $fmt:literal $(, $arg:expr)*
        );* $(;)?
    ) => {
        #[derive(Debug, Clone, PartialEq)]
        pub enum SimConfigError {
            $(
                $variant $( { $($field : $type),* } )?,
            )*
        }

        impl std::fmt::Display for SimConfigError {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                match self {
                    $(
                        Self::$variant $( { $($field),* } )? => write!(f, $fmt $(, $arg)*),
                    )*
                }
            }
        }
    };
}

define_sim_config_error! {
    InvalidDt { min: f64, actual: f64 } => "dt ({}) must be finite and at least {}", actual, min;
    InvalidSteps => "steps must be greater than 0";
    TooManySteps { max: usize, actual: usize } => "steps ({}) exceed supported maximum ({})", actual, max;
}

impl std::error::Error for SimConfigError {}

impl SimConfig {
    pub const MIN_DT: f64 = MIN_DT;
    pub const MAX_STEPS: usize = MAX_STEPS;

    pub fn validate(&self) -> Result<(), SimConfigError> {
        if !(self.dt.is_finite() && self.dt >= Self::MIN_DT) {
            return Err(SimConfigError::InvalidDt {
                min: Self::MIN_DT,
                actual: self.dt,
            });
        }
        if self.steps == 0 {
            return Err(SimConfigError::InvalidSteps);
        }
        if self.steps > Self::MAX_STEPS {
            return Err(SimConfigError::TooManySteps {
                max: Self::MAX_STEPS,
                actual: self.steps,
            });
        }
        Ok(())
    }

    /// Copy with every field pulled into its valid range.
    ///
    /// A non-finite `dt` falls back to the floor.
    pub fn sanitized(self) -> Self {
        let dt = if self.dt.is_finite() {
            self.dt.max(Self::MIN_DT)
        } else {
            Self::MIN_DT
        };
        Self {
            dt,
            steps: self.steps.clamp(1, Self::MAX_STEPS),
            ..self
        }
    }

    /// Copy with the diffusion scheme overridden, used for comparison sub-runs.
    pub fn with_method(self, method: DiffusionMethod) -> Self {
        Self { method, ..self }
    }

    /// `max_dispersion * dt`, the quantity bounded by the explicit stability hint.
    pub fn explicit_stability_number(&self, max_dispersion: f64) -> f64 {
        max_dispersion * self.dt
    }

    /// True when the explicit scheme is selected and `D * dt` exceeds the rule-of-thumb bound.
    pub fn explicit_stability_warning(&self, max_dispersion: f64) -> bool {
        self.method == DiffusionMethod::Explicit
            && self.explicit_stability_number(max_dispersion) > EXPLICIT_STABILITY_LIMIT
    }
}
