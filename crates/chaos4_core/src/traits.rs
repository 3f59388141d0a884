use crate::error::Result;
use crate::field::VectorField;
use crate::state::State;

/// The fourth time-derivative of position, `snap = f(x, v, a, j, t)`.
///
/// Implementations must be pure: multi-stage solvers evaluate the function
/// several times per step at speculative intermediate states. Errors are
/// handed back to the caller of the engine unchanged.
pub trait SnapFunction {
    fn snap(&self, x: f64, v: f64, a: f64, j: f64, t: f64) -> anyhow::Result<f64>;
}

impl<F> SnapFunction for F
where
    F: Fn(f64, f64, f64, f64, f64) -> f64,
{
    fn snap(&self, x: f64, v: f64, a: f64, j: f64, t: f64) -> anyhow::Result<f64> {
        Ok(self(x, v, a, j, t))
    }
}

/// Adapter for snap functions that can fail.
///
/// ```
/// use chaos4_core::{Fallible, SnapFunction};
///
/// let guarded = Fallible(|x: f64, _v: f64, _a: f64, _j: f64, _t: f64| {
///     if x.abs() > 1e6 {
///         anyhow::bail!("position escaped the model domain");
///     }
///     Ok(-x)
/// });
/// assert_eq!(guarded.snap(2.0, 0.0, 0.0, 0.0, 0.0).unwrap(), -2.0);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct Fallible<F>(pub F);

impl<F> SnapFunction for Fallible<F>
where
    F: Fn(f64, f64, f64, f64, f64) -> anyhow::Result<f64>,
{
    fn snap(&self, x: f64, v: f64, a: f64, j: f64, t: f64) -> anyhow::Result<f64> {
        (self.0)(x, v, a, j, t)
    }
}

/// A fixed-step algorithm that advances a state over a [`VectorField`].
pub trait Steppable {
    /// Performs one step of size dt starting from `state` at time `t`.
    /// Returns the new state; the input is left untouched.
    fn step(
        &self,
        field: &VectorField<impl SnapFunction>,
        t: f64,
        state: &State,
        dt: f64,
    ) -> Result<State>;
}
