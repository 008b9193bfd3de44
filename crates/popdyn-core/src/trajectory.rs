use crate::layout::SpeciesFrame;
use serde::{Deserialize, Serialize};
use std::ops::Index;

/// Recorded run: frame 0 is the initial board, frame `t` the board after tick `t`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Trajectory {
    frames: Vec<SpeciesFrame>,
}

impl Trajectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(frames: usize) -> Self {
        Self {
            frames: Vec::with_capacity(frames),
        }
    }

    pub fn push(&mut self, frame: SpeciesFrame) {
        self.frames.push(frame);
    }

    /// Number of frames, `steps + 1` after a completed run.
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Ticks covered by the recording.
    pub fn steps(&self) -> usize {
        self.frames.len().saturating_sub(1)
    }

    pub fn frame(&self, step: usize) -> Option<&SpeciesFrame> {
        self.frames.get(step)
    }

    pub fn first(&self) -> Option<&SpeciesFrame> {
        self.frames.first()
    }

    pub fn frames(&self) -> &[SpeciesFrame] {
        &self.frames
    }

    pub fn iter(&self) -> std::slice::Iter<'_, SpeciesFrame> {
        self.frames.iter()
    }

    /// `[step][species][y][x]` nested vectors.
    pub fn to_nested(&self) -> Vec<Vec<Vec<Vec<f64>>>> {
        self.frames.iter().map(SpeciesFrame::to_nested).collect()
    }

    pub fn summary(&self) -> TrajectorySummary {
        let (width, height, species) = self
            .first()
            .map(|f| (f.width(), f.height(), f.species_count()))
            .unwrap_or_default();
        let totals: Vec<Vec<f64>> = self
            .frames
            .iter()
            .map(|f| (0..species).map(|k| f.total(k)).collect())
            .collect();
        let mut min_density = f64::INFINITY;
        let mut max_density = f64::NEG_INFINITY;
        for &v in self.frames.iter().flat_map(|f| f.data()) {
            min_density = min_density.min(v);
            max_density = max_density.max(v);
        }
        if self.frames.is_empty() {
            min_density = 0.0;
            max_density = 0.0;
        }
        TrajectorySummary {
            schema_version: default_schema_version(),
            steps: self.steps(),
            width,
            height,
            species,
            final_totals: totals.last().cloned().unwrap_or_default(),
            totals,
            min_density,
            max_density,
        }
    }
}

impl Index<usize> for Trajectory {
    type Output = SpeciesFrame;

    fn index(&self, step: usize) -> &SpeciesFrame {
        &self.frames[step]
    }
}

impl<'a> IntoIterator for &'a Trajectory {
    type Item = &'a SpeciesFrame;
    type IntoIter = std::slice::Iter<'a, SpeciesFrame>;

    fn into_iter(self) -> Self::IntoIter {
        self.frames.iter()
    }
}

fn default_schema_version() -> u32 {
    1
}

/// Compact description of a run for reports and heatmap scaling.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct TrajectorySummary {
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,
    pub steps: usize,
    pub width: usize,
    pub height: usize,
    pub species: usize,
    /// `totals[step][species]`: board-wide density sums.
    #[serde(default)]
    pub totals: Vec<Vec<f64>>,
    pub min_density: f64,
    pub max_density: f64,
    #[serde(default)]
    pub final_totals: Vec<f64>,
}
