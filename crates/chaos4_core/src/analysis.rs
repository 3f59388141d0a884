//! Chaos indicators computed on top of the integration engine.

use crate::engine::{IntegrationEngine, Trajectory};
use crate::error::{Result, SolverError};
use crate::solvers::Method;
use crate::state::{self, State};
use crate::traits::SnapFunction;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Euclidean distance between two trajectories at every recorded index.
pub fn separation_profile(first: &Trajectory, second: &Trajectory) -> Result<Vec<f64>> {
    if first.len() != second.len() {
        return Err(SolverError::invalid(format!(
            "Trajectories must have equal length to compare, got {} and {}.",
            first.len(),
            second.len()
        )));
    }
    Ok(first
        .states()
        .iter()
        .zip(second.states())
        .map(|(a, b)| (a - b).norm())
        .collect())
}

/// Settings for the two-trajectory (Benettin) Lyapunov estimate.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct LyapunovSettings {
    pub dt: f64,
    pub steps: usize,
    /// Separation the companion trajectory is rescaled to.
    pub perturbation: f64,
    pub renormalize_every: usize,
    pub method: Method,
}

impl Default for LyapunovSettings {
    fn default() -> Self {
        Self {
            dt: 0.01,
            steps: 10_000,
            perturbation: 1e-8,
            renormalize_every: 1,
            method: Method::Rk4,
        }
    }
}

/// Largest Lyapunov exponent along the orbit of `initial`.
///
/// A companion state is kept at distance `perturbation` from the reference
/// orbit; after every `renormalize_every` steps the logarithmic growth of the
/// separation is accumulated and the companion is pulled back along the
/// current separation direction.
pub fn largest_lyapunov_exponent<S: SnapFunction>(
    engine: &IntegrationEngine<S>,
    initial: &State,
    initial_time: f64,
    settings: &LyapunovSettings,
) -> Result<f64> {
    let LyapunovSettings {
        dt,
        steps,
        perturbation,
        renormalize_every,
        method,
    } = *settings;
    if steps == 0 {
        return Err(SolverError::invalid(
            "Lyapunov computation requires at least one integration step.",
        ));
    }
    if !dt.is_finite() || dt <= 0.0 {
        return Err(SolverError::invalid("Step size dt must be positive."));
    }
    if !perturbation.is_finite() || perturbation <= 0.0 {
        return Err(SolverError::invalid("Perturbation must be positive."));
    }
    if renormalize_every == 0 {
        return Err(SolverError::invalid("renormalize_every must be at least 1."));
    }
    if !state::is_finite(initial) {
        return Err(SolverError::invalid("Initial state must be finite."));
    }

    let direction = State::repeat(0.5);
    let mut reference = *initial;
    let mut companion = initial + direction * perturbation;
    let mut accum = 0.0;
    let mut since_last = 0usize;

    for step in 0..steps {
        let t = initial_time + step as f64 * dt;
        reference = engine.step(&reference, t, dt, method)?;
        companion = engine.step(&companion, t, dt, method)?;
        since_last += 1;

        if !state::is_finite(&reference) || !state::is_finite(&companion) {
            return Err(SolverError::NumericalDivergence {
                index: step + 1,
                time: t + dt,
                partial: Trajectory::empty(dt, method),
            });
        }

        if since_last == renormalize_every || step + 1 == steps {
            let separation = companion - reference;
            let distance = separation.norm();
            if distance <= f64::MIN_POSITIVE {
                return Err(SolverError::invalid(
                    "Companion trajectory collapsed onto the reference; increase the perturbation.",
                ));
            }
            accum += (distance / perturbation).ln();
            companion = reference + separation * (perturbation / distance);
            since_last = 0;
        }
    }

    let total_time = steps as f64 * dt;
    let exponent = accum / total_time;
    debug!(exponent, steps, %method, "largest Lyapunov exponent");
    Ok(exponent)
}

/// Logarithm of the phase-space volume ratio `ln V(t) / V(t0)` at every index
/// of `trajectory`.
///
/// Liouville's formula integrates the divergence of the field along the
/// orbit; for the snap reduction that divergence is `∂snap/∂j`. The integral
/// uses the trapezoid rule on the recorded grid.
pub fn phase_volume<S: SnapFunction>(
    engine: &IntegrationEngine<S>,
    trajectory: &Trajectory,
) -> Result<Vec<f64>> {
    let field = engine.field();
    let mut log_volume = Vec::with_capacity(trajectory.len());
    let mut previous: Option<f64> = None;
    let mut total = 0.0;
    for (time, state) in trajectory.iter() {
        let divergence = field.divergence(state, time)?;
        if let Some(last) = previous {
            total += 0.5 * trajectory.dt() * (last + divergence);
        }
        log_volume.push(total);
        previous = Some(divergence);
    }
    Ok(log_volume)
}
