//! Error types for solver setup and per-step failures.
//!
//! Configuration problems are fatal and surface before the first RHS
//! evaluation. Numerical degeneracies (dry faces, zero wave speeds) are
//! *not* errors; they are handled by explicit fallback branches in the
//! flux and time-step code.

use thiserror::Error;

use crate::config::Edge;

/// Fatal configuration errors, raised during setup and never retried.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A boundary policy string that is not one of the supported types.
    #[error("unknown boundary policy `{0}` (expected outflow, extrap, const, inflow, or periodic)")]
    UnknownBoundaryPolicy(String),

    /// A `const` or `inflow` boundary without its required value.
    #[error("boundary `{policy}` on {edge} edge, component {component} requires a value")]
    MissingBoundaryValue {
        edge: Edge,
        component: usize,
        policy: &'static str,
    },

    /// Periodic boundaries must cover a whole edge and be paired with the
    /// opposite edge.
    #[error("periodic boundary on {edge} edge: {reason}")]
    PeriodicMismatch { edge: Edge, reason: String },

    /// Grid axes must hold at least one cell.
    #[error("grid must have at least one cell along {axis}")]
    EmptyAxis { axis: &'static str },

    /// Grid spacing must be strictly positive.
    #[error("grid spacing along {axis} must be positive, got {value}")]
    NonPositiveSpacing { axis: &'static str, value: f64 },

    /// Array shapes that do not match the grid they belong to.
    #[error("shape mismatch for {what}: expected {expected:?}, got {actual:?}")]
    ShapeMismatch {
        what: &'static str,
        expected: (usize, usize),
        actual: (usize, usize),
    },

    /// The MUSCL stencil needs two ghost layers.
    #[error("ghost margin must be at least 2 cells for slope reconstruction, got {0}")]
    GhostMarginTooSmall(usize),
}

/// Failure of the external ghost-margin synchronization mechanism.
///
/// The solver core surfaces these unmodified; retry policy belongs to the
/// out-of-scope driver loop.
#[derive(Debug, Error)]
#[error("halo exchange failed: {0}")]
pub struct HaloError(pub String);

/// Errors that can abort a single RHS evaluation.
#[derive(Debug, Error)]
pub enum SolverError {
    #[error(transparent)]
    Halo(#[from] HaloError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}
