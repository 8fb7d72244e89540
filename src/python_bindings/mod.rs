//! Python bindings for fang.

pub mod observables;

use pyo3::prelude::*;

/// Register all Python bindings with the module.
pub fn register_python_bindings(py: Python<'_>, m: &Bound<'_, PyModule>) -> PyResult<()> {
    observables::register_observables_bindings(py, m)?;
    m.add_function(wrap_pyfunction!(crate::logging::init_logging, m)?)?;
    Ok(())
}
