use crate::error::Result;
use crate::state::{State, ACCELERATION, JERK, POSITION, VELOCITY};
use crate::traits::SnapFunction;

/// First-order form of `x'''' = snap(x, v, a, j, t)`.
///
/// `d/dt [x, v, a, j] = [v, a, j, snap(x, v, a, j, t)]`
#[derive(Debug, Clone)]
pub struct VectorField<S> {
    snap: S,
}

impl<S: SnapFunction> VectorField<S> {
    pub fn new(snap: S) -> Self {
        Self { snap }
    }

    /// Evaluates the snap function at a state.
    pub fn snap(&self, state: &State, t: f64) -> Result<f64> {
        let value = self.snap.snap(
            state[POSITION],
            state[VELOCITY],
            state[ACCELERATION],
            state[JERK],
            t,
        )?;
        Ok(value)
    }

    /// Time derivative of `state`. The first three slots are copied from the
    /// last three input slots.
    pub fn derivative(&self, state: &State, t: f64) -> Result<State> {
        Ok(State::new(
            state[VELOCITY],
            state[ACCELERATION],
            state[JERK],
            self.snap(state, t)?,
        ))
    }

    /// Divergence (trace of the Jacobian) of the field at `state`.
    ///
    /// The first three rows of the Jacobian are a pure shift, so the trace
    /// reduces to `∂snap/∂j`, taken here by central difference.
    pub fn divergence(&self, state: &State, t: f64) -> Result<f64> {
        let jerk = state[JERK];
        let h = f64::EPSILON.cbrt() * jerk.abs().max(1.0);
        let mut forward = *state;
        forward[JERK] = jerk + h;
        let mut backward = *state;
        backward[JERK] = jerk - h;
        let upper = self.snap(&forward, t)?;
        let lower = self.snap(&backward, t)?;
        Ok((upper - lower) / (forward[JERK] - backward[JERK]))
    }
}
