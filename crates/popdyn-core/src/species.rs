use crate::constants::{MAX_SPECIES, SPECIES_PALETTE};
use serde::{Deserialize, Serialize};

/// Identity of one simulated species. Densities live in the grid, not here.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Species {
    pub name: String,
    /// Display colour as 0xRRGGBBAA.
    pub color: u32,
}

impl Species {
    pub fn new(name: impl Into<String>, color: u32) -> Self {
        Self {
            name: name.into(),
            color,
        }
    }

    /// Default species for slot `index`: `"specie {index + 1}"` in the palette colour.
    pub fn default_for(index: usize) -> Self {
        Self::new(format!("specie {}", index + 1), palette_color(index))
    }

    /// Colour split into normalized RGBA channels.
    pub fn rgba(&self) -> [f32; 4] {
        [
            ((self.color >> 24) & 0xFF) as f32 / 255.0,
            ((self.color >> 16) & 0xFF) as f32 / 255.0,
            ((self.color >> 8) & 0xFF) as f32 / 255.0,
            (self.color & 0xFF) as f32 / 255.0,
        ]
    }
}

/// Palette colour for a species slot, wrapping past the palette length.
pub fn palette_color(index: usize) -> u32 {
    SPECIES_PALETTE[index % MAX_SPECIES]
}
