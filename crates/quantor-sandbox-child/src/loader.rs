use std::ffi::CString;

use pyo3::prelude::*;
use pyo3::types::{PyModule, PyType};

use crate::shim::SHIM_SOURCE;

/// Execs the validated strategy source in its own module namespace (with the
/// `hqg_algorithms` shim already registered so its imports resolve) and
/// instantiates whichever class subclasses `Strategy`.
///
/// Mirrors `entrypoint.py`'s `exec(payload.strategy_code, namespace)` +
/// "find the Strategy subclass" loop, except the class has already been
/// proven to exist and to be well-formed by the static analyzer before this
/// binary ever ran.
pub fn load_strategy(py: Python<'_>, strategy_code: &str) -> PyResult<Py<PyAny>> {
    let shim_code = CString::new(SHIM_SOURCE).expect("shim source has no interior nulls");
    let shim_file = CString::new("hqg_algorithms.py").unwrap();
    let shim_name = CString::new("hqg_algorithms").unwrap();
    let shim = PyModule::from_code(py, &shim_code, &shim_file, &shim_name)?;

    let sys = py.import("sys")?;
    sys.getattr("modules")?.set_item("hqg_algorithms", &shim)?;

    let strategy_base = shim.getattr("Strategy")?;
    let base_type: &Bound<PyType> = strategy_base.downcast()?;

    let user_code = CString::new(strategy_code).map_err(|e| {
        pyo3::exceptions::PyValueError::new_err(format!("strategy source has a NUL byte: {e}"))
    })?;
    let user_file = CString::new("strategy.py").unwrap();
    let user_name = CString::new("strategy").unwrap();
    let module = PyModule::from_code(py, &user_code, &user_file, &user_name)?;

    for (_, value) in module.dict().iter() {
        let Ok(class) = value.downcast::<PyType>() else {
            continue;
        };
        if class.is(base_type) {
            continue;
        }
        if class.is_subclass(base_type).unwrap_or(false) {
            let instance = class.call0()?;
            return Ok(instance.unbind());
        }
    }

    Err(pyo3::exceptions::PyValueError::new_err(
        "no Strategy subclass found in strategy_code",
    ))
}
