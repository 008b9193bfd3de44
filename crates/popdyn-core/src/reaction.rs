use crate::coefficients::InteractionMatrix;
use crate::grid::PopulationGrid;

/// Advance the local interaction term by one unit of time.
///
/// Every cell gets `P += A * P`, where `P` is the cell's density vector from
/// before the update. Negative results are left in place; clamping happens
/// after the whole tick.
pub fn apply_reaction(grid: &mut PopulationGrid, matrix: &InteractionMatrix) {
    let species = grid.species_count();
    assert!(
        matrix.size() >= species,
        "interaction matrix ({}) smaller than species count ({species})",
        matrix.size()
    );
    let mut before = vec![0.0; species];
    for cell in grid.cells_mut() {
        before.copy_from_slice(cell);
        for (k, density) in cell.iter_mut().enumerate() {
            let row = &matrix.row(k)[..species];
            *density += row.iter().zip(&before).map(|(a, p)| a * p).sum::<f64>();
        }
    }
}
