/// Largest supported board width/height (cells).
pub const MAX_BOARD_DIM: usize = 20;

/// Hard upper bound on the number of simultaneously simulated species.
/// Shared with the colour palette, so every species has a distinct colour.
pub const MAX_SPECIES: usize = 15;

/// Largest number of timesteps a single run may record.
pub const MAX_STEPS: usize = 2000;

/// Floor applied to user-edited timesteps.
pub const MIN_DT: f64 = 1e-4;

/// Upper clamp for per-species dispersion coefficients.
pub const MAX_DISPERSION: f64 = 0.4;

/// Dispersion assigned to freshly added species.
pub const DEFAULT_DISPERSION: f64 = 0.4;

/// Rule-of-thumb stability bound `D * dt` for the explicit scheme on a unit grid.
pub const EXPLICIT_STABILITY_LIMIT: f64 = 0.25;

/// Species colours as 0xRRGGBBAA, indexed by species position.
pub const SPECIES_PALETTE: [u32; MAX_SPECIES] = [
    0xFF0000FF, // red
    0x00FF00FF, // green
    0xFFFF00FF, // yellow
    0x32CD32FF, // lime green
    0xADD8E6FF, // light blue
    0xFF00FFFF, // magenta
    0x808080FF, // grey
    0xFFA500FF, // orange
    0x800080FF, // purple
    0x008080FF, // teal
    0xFF69B4FF, // pink
    0xFFFFFFFF, // white
    0x8B0000FF, // dark red
    0x2E8B57FF, // sea green
    0x4682B4FF, // steel blue
];

/// Stride between derived RNG streams for seed shapes.
pub const RNG_DERIVATION_PRIME: u64 = 7919;
