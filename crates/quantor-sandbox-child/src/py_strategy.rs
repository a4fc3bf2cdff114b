use pyo3::prelude::*;
use quantor_engine::{EngineError, PortfolioView, Signal, Slice, Strategy};

use crate::conversions::{signal_from_py, slice_to_dict, view_to_dict};

/// Adapts a validated, instantiated Python object into the engine's
/// [`Strategy`] trait — the only place in this binary (or the whole repo)
/// that calls into arbitrary user code.
pub struct PyStrategy {
    instance: Py<PyAny>,
}

impl PyStrategy {
    pub fn new(instance: Py<PyAny>) -> Self {
        Self { instance }
    }
}

impl Strategy for PyStrategy {
    fn on_data(&mut self, slice: &Slice, view: &PortfolioView) -> Result<Signal, EngineError> {
        Python::with_gil(|py| {
            let slice_dict = slice_to_dict(py, slice)
                .map_err(|e| EngineError::StrategyFailed(format!("slice conversion: {e}")))?;
            let view_dict = view_to_dict(py, view)
                .map_err(|e| EngineError::StrategyFailed(format!("view conversion: {e}")))?;

            let result = self
                .instance
                .bind(py)
                .call_method1("on_data", (slice_dict, view_dict))
                .map_err(|e| EngineError::StrategyFailed(e.to_string()))?;

            signal_from_py(&result).map_err(|e| EngineError::StrategyFailed(e.to_string()))
        })
    }
}
