//! Poincaré sections: hyperplane crossings of a trajectory, resolved to
//! sub-step precision by linear interpolation.

use crate::engine::Trajectory;
use crate::error::{Result, SolverError};
use crate::state::{State, DIMENSION};
use serde::{Deserialize, Serialize};
use tracing::trace;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CrossingDirection {
    Increasing,
    Decreasing,
}

/// The plane `state[index] = threshold`, sampled only when crossed in
/// `direction`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Hyperplane {
    pub index: usize,
    pub threshold: f64,
    pub direction: CrossingDirection,
}

impl Hyperplane {
    pub fn new(index: usize, threshold: f64, direction: CrossingDirection) -> Result<Self> {
        let plane = Self {
            index,
            threshold,
            direction,
        };
        plane.validate()?;
        Ok(plane)
    }

    pub fn validate(&self) -> Result<()> {
        if self.index >= DIMENSION {
            return Err(SolverError::invalid(format!(
                "Hyperplane coordinate index {} is out of range 0..{DIMENSION}.",
                self.index
            )));
        }
        if !self.threshold.is_finite() {
            return Err(SolverError::invalid("Hyperplane threshold must be finite."));
        }
        Ok(())
    }

    /// Interpolated crossing between consecutive states, if the pair straddles
    /// the plane in the requested direction.
    ///
    /// Straddling means a strict sign change of `state[index] - threshold`;
    /// a state lying exactly on the plane never counts. Signs are compared
    /// directly instead of through their product so that tiny offsets cannot
    /// underflow to zero.
    pub fn crossing(&self, previous: &State, current: &State) -> Option<State> {
        let before = previous[self.index];
        let after = current[self.index];
        let straddles = match self.direction {
            CrossingDirection::Increasing => before < self.threshold && after > self.threshold,
            CrossingDirection::Decreasing => before > self.threshold && after < self.threshold,
        };
        if !straddles {
            return None;
        }
        let fraction = (self.threshold - before) / (after - before);
        let mut point = previous + (current - previous) * fraction;
        point[self.index] = self.threshold;
        Some(point)
    }
}

/// Single-pass crossing detector for streamed states.
#[derive(Debug, Clone)]
pub struct SectionScanner {
    plane: Hyperplane,
    previous: Option<State>,
}

impl SectionScanner {
    pub fn new(plane: Hyperplane) -> Result<Self> {
        plane.validate()?;
        Ok(Self {
            plane,
            previous: None,
        })
    }

    /// Feeds the next state and returns the crossing it completes, if any.
    pub fn push(&mut self, state: State) -> Option<State> {
        let crossing = self
            .previous
            .as_ref()
            .and_then(|previous| self.plane.crossing(previous, &state));
        self.previous = Some(state);
        crossing
    }
}

/// Section points of a finished trajectory, in time order.
pub fn extract_crossings(trajectory: &Trajectory, plane: &Hyperplane) -> Result<Vec<State>> {
    extract_crossings_from(trajectory.states().iter().copied(), plane)
}

/// Section points of any ordered state sequence, consumed in one pass.
pub fn extract_crossings_from<I>(states: I, plane: &Hyperplane) -> Result<Vec<State>>
where
    I: IntoIterator<Item = State>,
{
    let mut scanner = SectionScanner::new(*plane)?;
    let mut points = Vec::new();
    for (index, state) in states.into_iter().enumerate() {
        if let Some(point) = scanner.push(state) {
            trace!(index, "section crossing");
            points.push(point);
        }
    }
    Ok(points)
}

/// Projects section points onto two coordinates for plotting.
pub fn project(points: &[State], axes: (usize, usize)) -> Result<Vec<[f64; 2]>> {
    let (first, second) = axes;
    if first >= DIMENSION || second >= DIMENSION {
        return Err(SolverError::invalid(format!(
            "Projection axes ({first}, {second}) are out of range 0..{DIMENSION}."
        )));
    }
    Ok(points.iter().map(|p| [p[first], p[second]]).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::IntegrationEngine;
    use crate::solvers::Method;
    use crate::systems::SaturatedSnapOscillator;

    fn plane(index: usize, threshold: f64, direction: CrossingDirection) -> Hyperplane {
        Hyperplane::new(index, threshold, direction).expect("valid plane")
    }

    #[test]
    fn single_crossing_is_interpolated_exactly() {
        let states = vec![State::new(0.0, 0.0, -1.0, 0.0), State::new(0.0, 0.0, 1.0, 0.0)];
        let points =
            extract_crossings_from(states, &plane(2, 0.0, CrossingDirection::Increasing))
                .expect("extract");
        assert_eq!(points, vec![State::zeros()]);
    }

    #[test]
    fn interpolation_covers_all_components() {
        let states = vec![State::new(1.0, 2.0, -1.0, 4.0), State::new(3.0, 6.0, 3.0, 0.0)];
        let points =
            extract_crossings_from(states, &plane(2, 0.0, CrossingDirection::Increasing))
                .expect("extract");
        assert_eq!(points, vec![State::new(1.5, 3.0, 0.0, 3.0)]);
    }

    #[test]
    fn crossing_in_other_direction_is_ignored() {
        let states = vec![State::new(0.0, 0.0, -1.0, 0.0), State::new(0.0, 0.0, 1.0, 0.0)];
        let points =
            extract_crossings_from(states, &plane(2, 0.0, CrossingDirection::Decreasing))
                .expect("extract");
        assert!(points.is_empty());

        let falling = vec![State::new(0.0, 0.0, 1.0, 0.0), State::new(0.0, 0.0, -3.0, 0.0)];
        let points =
            extract_crossings_from(falling, &plane(2, 0.0, CrossingDirection::Decreasing))
                .expect("extract");
        assert_eq!(points, vec![State::new(0.0, 0.0, 0.0, 0.0)]);
    }

    #[test]
    fn exact_hit_on_threshold_is_not_a_crossing() {
        let states = vec![
            State::new(-1.0, 0.0, 0.0, 0.0),
            State::new(0.5, 0.0, 0.0, 0.0),
            State::new(2.0, 0.0, 0.0, 0.0),
        ];
        let points =
            extract_crossings_from(states, &plane(0, 0.5, CrossingDirection::Increasing))
                .expect("extract");
        assert!(points.is_empty());
    }

    #[test]
    fn tiny_offsets_still_register() {
        let states = vec![State::new(-1e-200, 0.0, 0.0, 0.0), State::new(1e-200, 0.0, 0.0, 0.0)];
        let points =
            extract_crossings_from(states, &plane(0, 0.0, CrossingDirection::Increasing))
                .expect("extract");
        assert_eq!(points.len(), 1);
    }

    #[test]
    fn out_of_range_index_is_rejected() {
        let bad = Hyperplane {
            index: 5,
            threshold: 0.0,
            direction: CrossingDirection::Increasing,
        };
        let result = extract_crossings_from(vec![State::zeros()], &bad);
        assert!(matches!(result, Err(SolverError::InvalidParameter(_))));
        assert!(Hyperplane::new(4, 0.0, CrossingDirection::Decreasing).is_err());
        assert!(Hyperplane::new(0, f64::NAN, CrossingDirection::Decreasing).is_err());
    }

    #[test]
    fn section_of_generated_trajectory_is_consistent() {
        let engine = IntegrationEngine::new(SaturatedSnapOscillator::default());
        let trajectory = engine
            .generate_trajectory(State::new(0.1, 0.0, 0.0, 0.0), (0.0, 100.0), 0.01, Method::Rk4)
            .expect("trajectory");
        let rising = extract_crossings(&trajectory, &plane(2, 0.0, CrossingDirection::Increasing))
            .expect("rising");
        let falling =
            extract_crossings(&trajectory, &plane(2, 0.0, CrossingDirection::Decreasing))
                .expect("falling");

        assert!(!rising.is_empty());
        assert!(rising.len() + falling.len() <= trajectory.len() - 1);
        assert!(rising.len().abs_diff(falling.len()) <= 1);
        assert!(rising.iter().all(|p| p[2] == 0.0));

        let projected = project(&rising, (0, 1)).expect("projection");
        assert_eq!(projected.len(), rising.len());
        assert_eq!(projected[0], [rising[0][0], rising[0][1]]);
    }

    #[test]
    fn streaming_scanner_matches_batch_extraction() {
        let engine = IntegrationEngine::new(SaturatedSnapOscillator::default());
        let y0 = State::new(0.1, 0.0, 0.0, 0.0);
        let section = plane(0, 0.0, CrossingDirection::Decreasing);
        let trajectory = engine
            .generate_trajectory(y0, (0.0, 50.0), 0.01, Method::Symplectic)
            .expect("trajectory");
        let batch = extract_crossings(&trajectory, &section).expect("batch");

        let mut scanner = SectionScanner::new(section).expect("scanner");
        let mut streamed = Vec::new();
        for item in engine
            .trajectory_iter(y0, (0.0, 50.0), 0.01, Method::Symplectic)
            .expect("iterator")
        {
            let (_, state) = item.expect("step");
            streamed.extend(scanner.push(state));
        }
        assert_eq!(streamed, batch);
    }

    #[test]
    fn extraction_leaves_trajectory_untouched() {
        let engine = IntegrationEngine::new(SaturatedSnapOscillator::default());
        let trajectory = engine
            .generate_trajectory(State::new(0.1, 0.0, 0.0, 0.0), (0.0, 10.0), 0.01, Method::Rk4)
            .expect("trajectory");
        let snapshot = trajectory.clone();
        extract_crossings(&trajectory, &plane(1, 0.0, CrossingDirection::Increasing))
            .expect("extract");
        assert_eq!(trajectory, snapshot);
    }

    #[test]
    fn projection_rejects_bad_axes() {
        assert!(project(&[State::zeros()], (0, 4)).is_err());
    }
}
