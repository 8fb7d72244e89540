//! Python bindings for observable refanging, detection and classification.

use pyo3::prelude::*;

use crate::observables::{self, default_engine, type_label, ScanBudget};

/// Python-visible match object for text scans.
#[pyclass]
#[derive(Clone)]
pub struct ObservableMatch {
    #[pyo3(get)]
    pub kind: String,
    #[pyo3(get)]
    pub value: String,
    #[pyo3(get)]
    pub raw: String,
    #[pyo3(get)]
    pub start: usize,
    #[pyo3(get)]
    pub end: usize,
    #[pyo3(get)]
    pub defanged: bool,
}

/// Register observable bindings under an `observables` submodule.
pub fn register_observables_bindings(py: Python<'_>, m: &Bound<'_, PyModule>) -> PyResult<()> {
    let obs_mod = pyo3::types::PyModule::new(py, "observables")?;

    obs_mod.add_class::<ObservableMatch>()?;

    obs_mod.add_function(wrap_pyfunction!(refang_py, &obs_mod)?)?;
    obs_mod.add_function(wrap_pyfunction!(is_defanged_py, &obs_mod)?)?;
    obs_mod.add_function(wrap_pyfunction!(classify_py, &obs_mod)?)?;
    obs_mod.add_function(wrap_pyfunction!(scan_text_py, &obs_mod)?)?;

    m.add_submodule(&obs_mod)?;

    Ok(())
}

/// Rewrite defanged markers to their canonical form.
#[pyfunction]
#[pyo3(name = "refang")]
fn refang_py(text: &str) -> String {
    observables::refang(text).into_owned()
}

#[pyfunction]
#[pyo3(name = "is_defanged")]
fn is_defanged_py(text: &str) -> bool {
    observables::is_defanged(text)
}

/// Indicator type label, or an empty string when unclassified.
#[pyfunction]
#[pyo3(name = "classify")]
fn classify_py(text: &str) -> &'static str {
    type_label(observables::classify(text))
}

/// Extract classified observables from free text.
#[pyfunction]
#[pyo3(name = "scan_text")]
#[pyo3(signature = (text, max_matches_total=10_000, max_matches_per_kind=1_000, time_guard_ms=25))]
fn scan_text_py(
    text: &str,
    max_matches_total: usize,
    max_matches_per_kind: usize,
    time_guard_ms: u64,
) -> Vec<ObservableMatch> {
    let budget = ScanBudget {
        max_matches_total,
        max_matches_per_kind,
        time_guard_ms,
    };
    observables::scan_text(default_engine(), text, &budget)
        .into_iter()
        .map(|m| ObservableMatch {
            kind: m.kind.as_str().to_string(),
            value: m.value,
            raw: m.raw,
            start: m.start,
            end: m.end,
            defanged: m.defanged,
        })
        .collect()
}
