use crate::errors::EngineError;
use crate::signal::Signal;
use crate::slice::{PortfolioView, Slice};

/// What the engine calls once per bar. The sandbox's implementation wraps a
/// statically-validated Python object; tests and local tooling can implement
/// this directly in Rust.
pub trait Strategy {
    fn on_data(&mut self, slice: &Slice, view: &PortfolioView) -> Result<Signal, EngineError>;
}
