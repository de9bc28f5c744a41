//! # swe2d
//!
//! Well-balanced central-upwind (Kurganov-Petrova, 2007) finite-volume
//! core for the 2-D shallow water equations on a structured grid.
//!
//! This crate provides the per-timestep spatial pipeline:
//! - Slope-limited, positivity-preserving face reconstruction
//! - One-sided local wave-speed estimation
//! - Discontinuous SWE fluxes and the central-upwind numerical flux
//! - Explicit and stiff source terms (bed slope, Manning friction)
//! - Ghost-cell boundary conditions (outflow, extrap, const, inflow,
//!   periodic via halo exchange)
//! - CFL-based stable time-step computation, NaN-free on dry domains
//!
//! Time integration, case loading, file I/O, and process topology are
//! external collaborators; the single entry point they drive is
//! [`compute_rhs`], called once per Runge-Kutta or Euler substep.

pub mod boundary;
pub mod config;
pub mod error;
pub mod flux;
pub mod grid;
pub mod halo;
pub mod reconstruction;
pub mod rhs;
pub mod source;
pub mod state;
pub mod topography;

// Re-export the main types for convenience.
pub use boundary::GhostCellUpdater;
pub use config::{BcType, BoundaryConfig, Edge, EdgeBc, Parameters, N_COMPONENTS};
pub use error::{ConfigError, HaloError, SolverError};
pub use flux::{central_scheme, discontinuous_flux, local_speeds, SPEED_TOL};
pub use grid::Grid;
pub use halo::{GridWrapExchange, HaloExchange};
pub use reconstruction::{minmod3, reconstruct};
pub use rhs::{compute_rhs, Runtime};
pub use source::{ManningFriction, SourceTerm, StiffSourceTerm, TopographySource};
pub use state::{interior, interior_mut, FaceAxis, FaceSide, FieldVector, State, GHOST_WIDTH};
pub use topography::Topography;
