use crate::error::{Result, SolverError};
use crate::field::VectorField;
use crate::state::{State, ACCELERATION, JERK, POSITION, VELOCITY};
use crate::traits::{SnapFunction, Steppable};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

const CBRT_2: f64 = 1.259_921_049_894_873_2;

/// Forest–Ruth composition coefficient, `1 / (2 - 2^(1/3))`.
pub const FOREST_RUTH_THETA: f64 = 1.0 / (2.0 - CBRT_2);

/// Selects the stepping algorithm used for a whole trajectory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Method {
    /// Classical explicit Runge-Kutta 4th order.
    Rk4,
    /// Forest–Ruth 4th order symplectic composition.
    Symplectic,
}

impl Method {
    pub fn name(self) -> &'static str {
        match self {
            Method::Rk4 => "rk4",
            Method::Symplectic => "symplectic",
        }
    }

    /// Advances `state` by one step with the selected algorithm.
    pub fn step(
        self,
        field: &VectorField<impl SnapFunction>,
        t: f64,
        state: &State,
        dt: f64,
    ) -> Result<State> {
        match self {
            Method::Rk4 => RK4.step(field, t, state, dt),
            Method::Symplectic => ForestRuth.step(field, t, state, dt),
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Method {
    type Err = SolverError;

    fn from_str(name: &str) -> Result<Self> {
        match name {
            "rk4" => Ok(Method::Rk4),
            "symplectic" => Ok(Method::Symplectic),
            other => Err(SolverError::invalid(format!(
                "Unknown stepping method '{other}'. Available methods: rk4, symplectic."
            ))),
        }
    }
}

/// Classic Runge-Kutta 4th Order Solver
#[derive(Debug, Clone, Copy, Default)]
pub struct RK4;

impl Steppable for RK4 {
    fn step(
        &self,
        field: &VectorField<impl SnapFunction>,
        t: f64,
        state: &State,
        dt: f64,
    ) -> Result<State> {
        let half = 0.5 * dt;

        // k1 = f(t, y)
        let k1 = field.derivative(state, t)?;
        // k2 = f(t + dt/2, y + dt*k1/2)
        let k2 = field.derivative(&(state + k1 * half), t + half)?;
        // k3 = f(t + dt/2, y + dt*k2/2)
        let k3 = field.derivative(&(state + k2 * half), t + half)?;
        // k4 = f(t + dt, y + dt*k3)
        let k4 = field.derivative(&(state + k3 * dt), t + dt)?;

        // y_next = y + dt/6 * (k1 + 2k2 + 2k3 + k4)
        Ok(state + (k1 + k2 * 2.0 + k3 * 2.0 + k4) * (dt / 6.0))
    }
}

/// Forest–Ruth 4th order symplectic composition.
///
/// The field is split into a drift, the chain `x' = v, v' = a, a' = j` with the
/// jerk frozen, and a kick, `j' = snap` with `x, v, a` frozen. One step is
///
/// ```text
/// drift θ/2 · kick θ · drift (1-θ)/2 · kick (1-2θ) · drift (1-θ)/2 · kick θ · drift θ/2
/// ```
///
/// The drift is solved exactly (the chain is nilpotent, so its Taylor series
/// stops at dt³) and time advances only during drifts. For snap functions that
/// do not depend on the jerk both halves are exact flows and the composition is
/// time-reversible and fourth order. A jerk-dependent snap (damping) turns the
/// kick into an explicit Euler update of the jerk.
#[derive(Debug, Clone, Copy, Default)]
pub struct ForestRuth;

impl ForestRuth {
    const DRIFTS: [f64; 4] = [
        FOREST_RUTH_THETA / 2.0,
        (1.0 - FOREST_RUTH_THETA) / 2.0,
        (1.0 - FOREST_RUTH_THETA) / 2.0,
        FOREST_RUTH_THETA / 2.0,
    ];
    const KICKS: [f64; 3] = [
        FOREST_RUTH_THETA,
        1.0 - 2.0 * FOREST_RUTH_THETA,
        FOREST_RUTH_THETA,
    ];

    fn drift(state: &mut State, h: f64) {
        let (v, a, j) = (state[VELOCITY], state[ACCELERATION], state[JERK]);
        let h2 = h * h / 2.0;
        let h3 = h2 * h / 3.0;
        state[POSITION] += h * v + h2 * a + h3 * j;
        state[VELOCITY] += h * a + h2 * j;
        state[ACCELERATION] += h * j;
    }
}

impl Steppable for ForestRuth {
    fn step(
        &self,
        field: &VectorField<impl SnapFunction>,
        t: f64,
        state: &State,
        dt: f64,
    ) -> Result<State> {
        let mut next = *state;
        let mut time = t;
        for (drift, kick) in Self::DRIFTS.iter().zip(Self::KICKS.iter()) {
            Self::drift(&mut next, drift * dt);
            time += drift * dt;
            let snap = field.snap(&next, time)?;
            next[JERK] += kick * dt * snap;
        }
        Self::drift(&mut next, Self::DRIFTS[3] * dt);
        Ok(next)
    }
}
