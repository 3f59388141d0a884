use nalgebra::Vector4;

/// Phase-space point `[position, velocity, acceleration, jerk]`.
pub type State = Vector4<f64>;

/// Number of components in a [`State`].
pub const DIMENSION: usize = 4;

pub const POSITION: usize = 0;
pub const VELOCITY: usize = 1;
pub const ACCELERATION: usize = 2;
pub const JERK: usize = 3;

/// Returns true when every component is finite.
pub fn is_finite(state: &State) -> bool {
    state.iter().all(|value| value.is_finite())
}
