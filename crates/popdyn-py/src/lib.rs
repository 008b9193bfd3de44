use popdyn_core::presets::{preset_by_index, preset_names as core_preset_names, Scenario};
use popdyn_core::simulation::RunOutput;
use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;
use pyo3::types::PyDict;

/// Minimal PyO3 module exposing popdyn-core to Python.
#[pyfunction]
fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[pyfunction]
fn default_config_json() -> PyResult<String> {
    Scenario::default()
        .to_json_pretty()
        .map_err(|e| PyValueError::new_err(format!("failed to serialize default scenario: {e}")))
}

#[pyfunction]
fn validate_scenario_json(scenario_json: &str) -> PyResult<bool> {
    let scenario = parse_scenario(scenario_json).map_err(PyValueError::new_err)?;
    scenario
        .to_simulation()
        .map(|_| true)
        .map_err(|e| PyValueError::new_err(format!("invalid scenario: {e}")))
}

#[pyfunction]
fn preset_names() -> Vec<&'static str> {
    core_preset_names()
}

#[pyfunction]
fn run_scenario_json<'py>(py: Python<'py>, scenario_json: &str) -> PyResult<Bound<'py, PyDict>> {
    let scenario = parse_scenario(scenario_json).map_err(PyValueError::new_err)?;
    run_to_dict(py, &scenario)
}

#[pyfunction]
#[pyo3(signature = (index, width=10, height=10, seed=42, compare=false))]
fn run_preset<'py>(
    py: Python<'py>,
    index: usize,
    width: usize,
    height: usize,
    seed: u64,
    compare: bool,
) -> PyResult<Bound<'py, PyDict>> {
    let scenario =
        preset_scenario(index, width, height, seed, compare).map_err(PyValueError::new_err)?;
    run_to_dict(py, &scenario)
}

fn parse_scenario(scenario_json: &str) -> Result<Scenario, String> {
    Scenario::from_json(scenario_json).map_err(|e| format!("invalid scenario json: {e}"))
}

fn preset_scenario(
    index: usize,
    width: usize,
    height: usize,
    seed: u64,
    compare: bool,
) -> Result<Scenario, String> {
    let preset = preset_by_index(index).ok_or_else(|| {
        format!(
            "preset index ({index}) out of range (0..{})",
            core_preset_names().len()
        )
    })?;
    let mut scenario = preset.to_scenario(width, height, seed);
    scenario.config.compare_methods = compare;
    Ok(scenario)
}

fn run_to_dict<'py>(py: Python<'py>, scenario: &Scenario) -> PyResult<Bound<'py, PyDict>> {
    let sim = scenario
        .to_simulation()
        .map_err(|e| PyValueError::new_err(format!("invalid scenario: {e}")))?;
    let output = py.allow_threads(|| sim.prepare_calculations());
    output_to_dict(py, &output, scenario.species_names())
}

fn output_to_dict<'py>(
    py: Python<'py>,
    output: &RunOutput,
    species: Vec<String>,
) -> PyResult<Bound<'py, PyDict>> {
    let dict = PyDict::new(py);
    dict.set_item("species", species)?;
    dict.set_item("trajectory", output.primary.to_nested())?;
    if let Some(explicit) = &output.explicit {
        dict.set_item("explicit", explicit.to_nested())?;
    }
    if let Some(adi) = &output.adi {
        dict.set_item("adi", adi.to_nested())?;
    }
    Ok(dict)
}

#[pymodule]
fn _core(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_function(wrap_pyfunction!(version, m)?)?;
    m.add_function(wrap_pyfunction!(default_config_json, m)?)?;
    m.add_function(wrap_pyfunction!(validate_scenario_json, m)?)?;
    m.add_function(wrap_pyfunction!(preset_names, m)?)?;
    m.add_function(wrap_pyfunction!(run_scenario_json, m)?)?;
    m.add_function(wrap_pyfunction!(run_preset, m)?)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preset_scenario_rejects_out_of_range_index() {
        let result = preset_scenario(99, 10, 10, 0, false);
        assert!(result.is_err());
    }

    #[test]
    fn preset_scenario_sets_compare_flag() {
        let scenario = preset_scenario(0, 8, 6, 1, true).expect("preset 0 should exist");
        assert!(scenario.config.compare_methods);
        assert_eq!((scenario.width, scenario.height), (8, 6));
    }

    #[test]
    fn parse_scenario_reports_bad_json() {
        let err = parse_scenario("{ not json").unwrap_err();
        assert!(err.starts_with("invalid scenario json"));
    }
}
