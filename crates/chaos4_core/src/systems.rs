//! Ready-made snap functions.
//!
//! The saturated oscillator drives the benches. The others give a linear
//! baseline, a conservative field with a known invariant, and a chaotic
//! benchmark for sensitivity checks.

use crate::state::{State, ACCELERATION, JERK, POSITION, VELOCITY};
use crate::traits::SnapFunction;
use serde::{Deserialize, Serialize};

/// Saturated quartic oscillator,
/// `x'''' = -a j - b x'' - c v - d x + e tanh(x)`.
///
/// The `tanh` term saturates the destabilising force near the origin. With the
/// default coefficients the linear far field is itself unstable
/// (`a·b < c`), so oscillation amplitudes keep growing over long horizons.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SaturatedSnapOscillator {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub d: f64,
    pub e: f64,
}

impl Default for SaturatedSnapOscillator {
    fn default() -> Self {
        Self {
            a: 0.6,
            b: 1.5,
            c: 1.5,
            d: 0.5,
            e: 4.0,
        }
    }
}

impl SnapFunction for SaturatedSnapOscillator {
    fn snap(&self, x: f64, v: f64, a: f64, j: f64, _t: f64) -> anyhow::Result<f64> {
        Ok(-self.a * j - self.b * a - self.c * v - self.d * x + self.e * x.tanh())
    }
}

/// `x'''' = -k x`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LinearSnap {
    pub k: f64,
}

impl SnapFunction for LinearSnap {
    fn snap(&self, x: f64, _v: f64, _a: f64, _j: f64, _t: f64) -> anyhow::Result<f64> {
        Ok(-self.k * x)
    }
}

/// Pais–Uhlenbeck oscillator,
/// `x'''' = -(ω1² + ω2²) x'' - ω1² ω2² x`.
///
/// The motion is a superposition of two harmonic modes, each with its own
/// conserved energy; [`PaisUhlenbeck::energy`] returns their (positive) sum.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PaisUhlenbeck {
    pub omega1: f64,
    pub omega2: f64,
}

impl PaisUhlenbeck {
    pub fn new(omega1: f64, omega2: f64) -> Self {
        Self { omega1, omega2 }
    }

    /// Conserved quadratic invariant of the exact flow.
    ///
    /// Writing `x = u + w` with `u'' = -ω1² u` and `w'' = -ω2² w`, the modes
    /// are recovered as `u ∝ x'' + ω2² x` and `w ∝ x'' + ω1² x`.
    pub fn energy(&self, state: &State) -> f64 {
        let p = self.omega1 * self.omega1;
        let q = self.omega2 * self.omega2;
        let (x, v, a, j) = (
            state[POSITION],
            state[VELOCITY],
            state[ACCELERATION],
            state[JERK],
        );
        let slow = (j + q * v).powi(2) + p * (a + q * x).powi(2);
        let fast = (j + p * v).powi(2) + q * (a + p * x).powi(2);
        slow + fast
    }
}

impl SnapFunction for PaisUhlenbeck {
    fn snap(&self, x: f64, _v: f64, a: f64, _j: f64, _t: f64) -> anyhow::Result<f64> {
        let p = self.omega1 * self.omega1;
        let q = self.omega2 * self.omega2;
        Ok(-(p + q) * a - p * q * x)
    }
}

/// Forced Duffing oscillator `x'' + δx' + αx + βx³ = γ cos(ωt)` differentiated
/// twice into snap form.
///
/// Only states on the constraint surface reproduce Duffing motion; build them
/// with [`DrivenDuffing::initial_state`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DrivenDuffing {
    pub delta: f64,
    pub alpha: f64,
    pub beta: f64,
    pub gamma: f64,
    pub omega: f64,
}

impl Default for DrivenDuffing {
    /// Double-well parameters in the chaotic regime.
    fn default() -> Self {
        Self {
            delta: 0.3,
            alpha: -1.0,
            beta: 1.0,
            gamma: 0.5,
            omega: 1.2,
        }
    }
}

impl DrivenDuffing {
    /// Completes `(x, v)` at time `t` with the acceleration and jerk implied by
    /// the second-order equation.
    pub fn initial_state(&self, x: f64, v: f64, t: f64) -> State {
        let a = self.gamma * (self.omega * t).cos()
            - self.delta * v
            - self.alpha * x
            - self.beta * x.powi(3);
        let j = -self.gamma * self.omega * (self.omega * t).sin()
            - self.delta * a
            - self.alpha * v
            - 3.0 * self.beta * x * x * v;
        State::new(x, v, a, j)
    }
}

impl SnapFunction for DrivenDuffing {
    fn snap(&self, x: f64, v: f64, a: f64, j: f64, t: f64) -> anyhow::Result<f64> {
        let forcing = -self.gamma * self.omega * self.omega * (self.omega * t).cos();
        let cubic = 6.0 * x * v * v + 3.0 * x * x * a;
        Ok(forcing - self.delta * j - self.alpha * a - self.beta * cubic)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::VectorField;

    #[test]
    fn saturated_oscillator_uses_default_coefficients() {
        let system = SaturatedSnapOscillator::default();
        let value = system.snap(0.1, 0.0, 0.0, 0.0, 0.0).unwrap();
        let expected = -0.5 * 0.1 + 4.0 * 0.1_f64.tanh();
        assert!((value - expected).abs() < 1e-15);
    }

    #[test]
    fn pais_uhlenbeck_energy_is_invariant_along_exact_motion() {
        let system = PaisUhlenbeck::new(1.0, 2.0);
        let field = VectorField::new(system);
        let state = State::new(0.7, -0.2, 1.1, 0.4);
        let rate = field.derivative(&state, 0.0).unwrap();
        // dE/dt = ∇E · f must vanish.
        let h = 1e-6;
        let forward = system.energy(&(state + rate * h));
        let backward = system.energy(&(state - rate * h));
        assert!(((forward - backward) / (2.0 * h)).abs() < 1e-6);
    }

    #[test]
    fn duffing_initial_state_satisfies_constraint() {
        let system = DrivenDuffing::default();
        let state = system.initial_state(1.0, 0.0, 0.0);
        assert!((state[ACCELERATION] - 0.5).abs() < 1e-15);
        assert!((state[JERK] + 0.15).abs() < 1e-15);
    }
}
