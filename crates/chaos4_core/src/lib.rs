pub mod analysis;
pub mod config;
pub mod engine;
pub mod error;
pub mod field;
pub mod section;
pub mod solvers;
pub mod state;
pub mod systems;
/// The `chaos4_core` crate integrates fourth-order "snap" dynamics,
/// `x'''' = f(x, x', x'', x''', t)`, and extracts Poincaré sections from the
/// resulting trajectories.
///
/// Key components:
/// - **Traits**: `SnapFunction` (the user-supplied fourth derivative), `Steppable` (stepping algorithms).
/// - **Field**: `VectorField`, the reduction of the scalar equation to a first-order system in 4 dimensions.
/// - **Solvers**: classical RK4 and the Forest–Ruth symplectic composition.
/// - **Engine**: `IntegrationEngine`, which drives stepping into a `Trajectory` (eager, lazy or batched).
/// - **Section**: hyperplane crossing detection with linear sub-step interpolation.
/// - **Analysis**: separation profiles, largest Lyapunov exponent and phase-space volume.
pub mod traits;

pub use engine::{IntegrationEngine, TimeSpan, Trajectory, TrajectoryIter};
pub use error::{Result, SolverError};
pub use field::VectorField;
pub use section::{extract_crossings, CrossingDirection, Hyperplane, SectionScanner};
pub use solvers::Method;
pub use state::State;
pub use traits::{Fallible, SnapFunction, Steppable};
