use crate::error::{Result, SolverError};
use crate::field::VectorField;
use crate::solvers::Method;
use crate::state::{self, State};
use crate::traits::SnapFunction;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Integration interval `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimeSpan {
    pub start: f64,
    pub end: f64,
}

impl TimeSpan {
    pub fn new(start: f64, end: f64) -> Self {
        Self { start, end }
    }

    pub fn duration(&self) -> f64 {
        self.end - self.start
    }

    /// Number of recorded states for step size `dt`, `floor((end - start) / dt)`.
    ///
    /// The quotient is nudged by a few ulps before flooring so that spans which
    /// are an exact multiple of `dt` in decimal (e.g. `0.3 / 0.1`) are not cut
    /// one state short by representation error.
    pub fn step_count(&self, dt: f64) -> Result<usize> {
        if !self.start.is_finite() || !self.end.is_finite() {
            return Err(SolverError::invalid("Time span bounds must be finite."));
        }
        if self.end <= self.start {
            return Err(SolverError::invalid(format!(
                "Time span end ({}) must be greater than start ({}).",
                self.end, self.start
            )));
        }
        if !dt.is_finite() || dt <= 0.0 {
            return Err(SolverError::invalid(format!(
                "Step size dt must be positive and finite, got {dt}."
            )));
        }
        let ratio = self.duration() / dt;
        let count = (ratio * (1.0 + 4.0 * f64::EPSILON)).floor();
        if count < 1.0 {
            return Err(SolverError::invalid(format!(
                "Step size dt ({dt}) exceeds the time span ({}).",
                self.duration()
            )));
        }
        if count >= usize::MAX as f64 {
            return Err(SolverError::invalid("Requested step count overflows usize."));
        }
        Ok(count as usize)
    }
}

impl From<(f64, f64)> for TimeSpan {
    fn from((start, end): (f64, f64)) -> Self {
        Self::new(start, end)
    }
}

/// Time-indexed states from a single integration run.
///
/// `times[i] = start + i * dt` and `states[i]` is the state at that time. The
/// last entry lies strictly before the end of the requested span.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "TrajectoryData")]
pub struct Trajectory {
    times: Vec<f64>,
    states: Vec<State>,
    dt: f64,
    method: Method,
}

/// Unchecked wire form of a [`Trajectory`].
#[derive(Deserialize)]
struct TrajectoryData {
    times: Vec<f64>,
    states: Vec<State>,
    dt: f64,
    method: Method,
}

impl TryFrom<TrajectoryData> for Trajectory {
    type Error = SolverError;

    fn try_from(data: TrajectoryData) -> Result<Self> {
        if data.times.len() != data.states.len() {
            return Err(SolverError::invalid(format!(
                "Trajectory times and states must have equal length, got {} and {}.",
                data.times.len(),
                data.states.len()
            )));
        }
        if !data.dt.is_finite() || data.dt <= 0.0 {
            return Err(SolverError::invalid(format!(
                "Trajectory step size must be positive and finite, got {}.",
                data.dt
            )));
        }
        Ok(Self {
            times: data.times,
            states: data.states,
            dt: data.dt,
            method: data.method,
        })
    }
}

impl Trajectory {
    /// Reserves room for `capacity` states, reporting an unsatisfiable request
    /// as an error instead of aborting.
    fn try_with_capacity(capacity: usize, dt: f64, method: Method) -> Result<Self> {
        let mut trajectory = Self::empty(dt, method);
        trajectory
            .times
            .try_reserve_exact(capacity)
            .and_then(|()| trajectory.states.try_reserve_exact(capacity))
            .map_err(|err| {
                SolverError::invalid(format!(
                    "Cannot allocate storage for {capacity} states: {err}."
                ))
            })?;
        Ok(trajectory)
    }

    pub(crate) fn empty(dt: f64, method: Method) -> Self {
        Self {
            times: Vec::new(),
            states: Vec::new(),
            dt,
            method,
        }
    }

    fn push(&mut self, time: f64, state: State) {
        self.times.push(time);
        self.states.push(state);
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    pub fn times(&self) -> &[f64] {
        &self.times
    }

    pub fn states(&self) -> &[State] {
        &self.states
    }

    pub fn dt(&self) -> f64 {
        self.dt
    }

    pub fn method(&self) -> Method {
        self.method
    }

    pub fn get(&self, index: usize) -> Option<(f64, &State)> {
        Some((*self.times.get(index)?, self.states.get(index)?))
    }

    pub fn last(&self) -> Option<(f64, &State)> {
        self.len().checked_sub(1).and_then(|idx| self.get(idx))
    }

    pub fn iter(&self) -> impl Iterator<Item = (f64, &State)> + '_ {
        self.times.iter().copied().zip(self.states.iter())
    }

    pub fn positions(&self) -> Vec<f64> {
        self.states.iter().map(|s| s[state::POSITION]).collect()
    }

    /// One component across the whole trajectory (e.g. position for plotting).
    pub fn column(&self, index: usize) -> Result<Vec<f64>> {
        if index >= state::DIMENSION {
            return Err(SolverError::invalid(format!(
                "Component index {index} is out of range 0..{}.",
                state::DIMENSION
            )));
        }
        Ok(self.states.iter().map(|s| s[index]).collect())
    }
}

/// Drives a stepping algorithm over a snap-driven [`VectorField`].
#[derive(Debug, Clone)]
pub struct IntegrationEngine<S> {
    field: VectorField<S>,
}

impl<S: SnapFunction> IntegrationEngine<S> {
    pub fn new(snap: S) -> Self {
        Self {
            field: VectorField::new(snap),
        }
    }

    pub fn field(&self) -> &VectorField<S> {
        &self.field
    }

    /// Advances `state` from time `t` by `dt`. A negative `dt` integrates
    /// backwards in time.
    pub fn step(&self, state: &State, t: f64, dt: f64, method: Method) -> Result<State> {
        if !dt.is_finite() || dt == 0.0 {
            return Err(SolverError::invalid(format!(
                "Step size dt must be finite and nonzero, got {dt}."
            )));
        }
        method.step(&self.field, t, state, dt)
    }

    /// Integrates from `initial` over `span`, recording the state before each
    /// step.
    ///
    /// Fails with `NumericalDivergence` (carrying the finite prefix) as soon as a
    /// produced state is not finite.
    pub fn generate_trajectory(
        &self,
        initial: State,
        span: impl Into<TimeSpan>,
        dt: f64,
        method: Method,
    ) -> Result<Trajectory> {
        let iter = self.trajectory_iter(initial, span, dt, method)?;
        let steps = iter.remaining();
        debug!(steps, dt, %method, "generating trajectory");

        let mut trajectory = Trajectory::try_with_capacity(steps, dt, method)?;
        for item in iter {
            match item {
                Ok((time, state)) => trajectory.push(time, state),
                Err(SolverError::NumericalDivergence { index, time, .. }) => {
                    warn!(index, time, %method, "trajectory diverged");
                    return Err(SolverError::NumericalDivergence {
                        index,
                        time,
                        partial: trajectory,
                    });
                }
                Err(err) => return Err(err),
            }
        }

        debug!(recorded = trajectory.len(), "trajectory complete");
        Ok(trajectory)
    }

    /// Lazy counterpart of [`generate_trajectory`](Self::generate_trajectory).
    ///
    /// Parameters are validated here, before any stepping. The iterator keeps
    /// no history, so a `NumericalDivergence` it yields carries an empty
    /// `partial` trajectory.
    pub fn trajectory_iter(
        &self,
        initial: State,
        span: impl Into<TimeSpan>,
        dt: f64,
        method: Method,
    ) -> Result<TrajectoryIter<'_, S>> {
        let span = span.into();
        let steps = span.step_count(dt)?;
        if !state::is_finite(&initial) {
            return Err(SolverError::invalid("Initial state must be finite."));
        }
        Ok(TrajectoryIter {
            field: &self.field,
            method,
            start: span.start,
            dt,
            steps,
            index: 0,
            current: initial,
            finished: false,
        })
    }
}

impl<S: SnapFunction + Sync> IntegrationEngine<S> {
    /// Integrates several independent initial conditions on the rayon pool.
    ///
    /// Shared parameters are validated once up front; per-trajectory failures
    /// are reported in the returned vector, in input order.
    pub fn generate_batch(
        &self,
        initial_states: &[State],
        span: impl Into<TimeSpan>,
        dt: f64,
        method: Method,
    ) -> Result<Vec<Result<Trajectory>>> {
        let span = span.into();
        span.step_count(dt)?;
        debug!(count = initial_states.len(), %method, "generating trajectory batch");
        Ok(initial_states
            .par_iter()
            .map(|initial| self.generate_trajectory(*initial, span, dt, method))
            .collect())
    }
}

/// Lazily generated `(time, state)` pairs of one integration run.
pub struct TrajectoryIter<'a, S> {
    field: &'a VectorField<S>,
    method: Method,
    start: f64,
    dt: f64,
    steps: usize,
    index: usize,
    current: State,
    finished: bool,
}

impl<S> TrajectoryIter<'_, S> {
    /// States still to be produced, assuming no failure.
    pub fn remaining(&self) -> usize {
        if self.finished {
            0
        } else {
            self.steps - self.index
        }
    }

    fn time_at(&self, index: usize) -> f64 {
        self.start + index as f64 * self.dt
    }
}

impl<S: SnapFunction> Iterator for TrajectoryIter<'_, S> {
    type Item = Result<(f64, State)>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished || self.index >= self.steps {
            return None;
        }
        if self.index > 0 {
            let t = self.time_at(self.index - 1);
            let next = match self.method.step(self.field, t, &self.current, self.dt) {
                Ok(next) => next,
                Err(err) => {
                    self.finished = true;
                    return Some(Err(err));
                }
            };
            if !state::is_finite(&next) {
                self.finished = true;
                return Some(Err(SolverError::NumericalDivergence {
                    index: self.index,
                    time: self.time_at(self.index),
                    partial: Trajectory::empty(self.dt, self.method),
                }));
            }
            self.current = next;
        }
        let item = (self.time_at(self.index), self.current);
        self.index += 1;
        Some(Ok(item))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, Some(self.remaining()))
    }
}
