//! Observable detection and normalization for threat-intelligence tooling.
//!
//! ```
//! use fang::observables::{classify, is_defanged, refang, IndicatorType};
//!
//! assert_eq!(refang("hxxps://evil[.]com/path"), "https://evil.com/path");
//! assert!(is_defanged("192[.]168[.]1[.]1"));
//! assert_eq!(classify("192[.]168[.]1[.]1"), Some(IndicatorType::Ipv4Addr));
//! assert_eq!(classify("random text"), None);
//! ```

pub mod error;
pub mod logging;
pub mod observables;

#[cfg(feature = "python-ext")]
mod python_bindings;

pub use error::{FangError, Result};
pub use observables::{
    classify, is_defanged, refang, IndicatorType, ObservableConfig, ObservableEngine,
};

#[cfg(feature = "python-ext")]
use pyo3::prelude::*;

/// A Python module implemented in Rust.
#[cfg(feature = "python-ext")]
#[pymodule]
fn fang(m: &Bound<'_, PyModule>) -> PyResult<()> {
    python_bindings::register_python_bindings(m.py(), m)
}
