use std::collections::BTreeMap;

use pyo3::prelude::*;
use pyo3::types::{PyDict, PyString};
use quantor_engine::{PortfolioView, Signal, Slice};
use quantor_model::Bar;

pub fn bar_to_dict<'py>(py: Python<'py>, bar: &Bar) -> PyResult<Bound<'py, PyDict>> {
    let dict = PyDict::new(py);
    dict.set_item("date", bar.date.format("%Y-%m-%d").to_string())?;
    dict.set_item("open", bar.open)?;
    dict.set_item("high", bar.high)?;
    dict.set_item("low", bar.low)?;
    dict.set_item("close", bar.close)?;
    dict.set_item("volume", bar.volume)?;
    Ok(dict)
}

pub fn slice_to_dict<'py>(py: Python<'py>, slice: &Slice) -> PyResult<Bound<'py, PyDict>> {
    let dict = PyDict::new(py);
    for symbol in slice.symbols() {
        if let Some(bar) = slice.get(symbol) {
            dict.set_item(symbol, bar_to_dict(py, bar)?)?;
        }
    }
    Ok(dict)
}

pub fn view_to_dict<'py>(py: Python<'py>, view: &PortfolioView) -> PyResult<Bound<'py, PyDict>> {
    let dict = PyDict::new(py);
    dict.set_item("cash", view.cash)?;
    dict.set_item("equity", view.equity)?;
    dict.set_item("positions", btreemap_to_dict(py, &view.positions)?)?;
    dict.set_item("weights", btreemap_to_dict(py, &view.weights)?)?;
    Ok(dict)
}

fn btreemap_to_dict<'py>(
    py: Python<'py>,
    map: &BTreeMap<String, f64>,
) -> PyResult<Bound<'py, PyDict>> {
    let dict = PyDict::new(py);
    for (key, value) in map {
        dict.set_item(key, value)?;
    }
    Ok(dict)
}

/// Parses what a strategy's `on_data` returned into a [`Signal`].
///
/// Protocol: `None` holds, the string `"LIQUIDATE"` liquidates, and any
/// other dict is read as `{symbol: weight, ...}` target weights.
pub fn signal_from_py(result: &Bound<'_, PyAny>) -> PyResult<Signal> {
    if result.is_none() {
        return Ok(Signal::Hold);
    }

    if let Ok(text) = result.downcast::<PyString>() {
        if text.to_string().eq_ignore_ascii_case("liquidate") {
            return Ok(Signal::Liquidate);
        }
        return Err(pyo3::exceptions::PyValueError::new_err(format!(
            "on_data returned unrecognized string {text}"
        )));
    }

    let dict: &Bound<PyDict> = result.downcast()?;
    let mut weights = BTreeMap::new();
    for (key, value) in dict.iter() {
        let symbol: String = key.extract()?;
        let weight: f64 = value.extract()?;
        weights.insert(symbol, weight);
    }
    Ok(Signal::TargetWeights(weights))
}
