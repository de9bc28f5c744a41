//! Mutable per-timestep state: cell averages, face reconstructions,
//! wave speeds, fluxes, and the right-hand-side accumulators.
//!
//! One `State` is exclusively owned by one logical timestep/partition.
//! Every pipeline stage takes it by `&mut` and retains nothing across
//! calls; aliasing a `State` from two stages at once is a programming
//! error, not a supported mode.

use ndarray::{s, Array2, ArrayView2, ArrayViewMut2};

use crate::config::N_COMPONENTS;
use crate::error::ConfigError;
use crate::grid::Grid;

/// Ghost-margin width used by [`State::new`]. Two layers: the limited
/// slope of the first interior cell reads two cells outward.
pub const GHOST_WIDTH: usize = 2;

/// A named triple of 2-D fields over the conservative components
/// `(w, hu, hv)`. Also used for fluxes and RHS accumulators, whose
/// components align with the same equations.
#[derive(Clone, Debug)]
pub struct FieldVector {
    /// Water surface elevation component (continuity equation).
    pub w: Array2<f64>,
    /// x-discharge component (x-momentum equation).
    pub hu: Array2<f64>,
    /// y-discharge component (y-momentum equation).
    pub hv: Array2<f64>,
}

impl FieldVector {
    pub fn zeros(shape: (usize, usize)) -> Self {
        Self {
            w: Array2::zeros(shape),
            hu: Array2::zeros(shape),
            hv: Array2::zeros(shape),
        }
    }

    /// Component by index, `(w, hu, hv) = (0, 1, 2)`. The boundary
    /// subsystem dispatches per-component through this.
    pub fn var(&self, component: usize) -> &Array2<f64> {
        match component {
            0 => &self.w,
            1 => &self.hu,
            2 => &self.hv,
            _ => panic!("component index {component} out of range 0..{N_COMPONENTS}"),
        }
    }

    pub fn var_mut(&mut self, component: usize) -> &mut Array2<f64> {
        match component {
            0 => &mut self.w,
            1 => &mut self.hu,
            2 => &mut self.hv,
            _ => panic!("component index {component} out of range 0..{N_COMPONENTS}"),
        }
    }

    pub fn fill(&mut self, value: f64) {
        self.w.fill(value);
        self.hu.fill(value);
        self.hv.fill(value);
    }

    pub fn dim(&self) -> (usize, usize) {
        self.w.dim()
    }

    /// Largest absolute value over all three components.
    pub fn max_abs(&self) -> f64 {
        [&self.w, &self.hu, &self.hv]
            .iter()
            .flat_map(|a| a.iter())
            .fold(0.0_f64, |acc, v| acc.max(v.abs()))
    }

    /// True if any entry of any component is NaN or infinite.
    pub fn has_non_finite(&self) -> bool {
        [&self.w, &self.hu, &self.hv]
            .iter()
            .flat_map(|a| a.iter())
            .any(|v| !v.is_finite())
    }
}

/// One side (minus or plus) of the faces along one axis.
///
/// Holds the reconstructed conservative values, the derived primitives,
/// the one-sided wave speed, and the discontinuous flux evaluated on
/// this side's state.
#[derive(Clone, Debug)]
pub struct FaceSide {
    /// Reconstructed conservative values at the face.
    pub q: FieldVector,
    /// Non-negative water depth `h = w - z_face`.
    pub h: Array2<f64>,
    /// x-velocity, zero at dry faces.
    pub u: Array2<f64>,
    /// y-velocity, zero at dry faces.
    pub v: Array2<f64>,
    /// One-sided wave speed: `a+ >= 0` on the plus side, `a- <= 0` on
    /// the minus side.
    pub a: Array2<f64>,
    /// Discontinuous physical flux evaluated on this side's state.
    pub flux: FieldVector,
}

impl FaceSide {
    fn zeros(shape: (usize, usize)) -> Self {
        Self {
            q: FieldVector::zeros(shape),
            h: Array2::zeros(shape),
            u: Array2::zeros(shape),
            v: Array2::zeros(shape),
            a: Array2::zeros(shape),
            flux: FieldVector::zeros(shape),
        }
    }
}

/// Face storage for one axis: both one-sided states and the common
/// (central-upwind) flux.
#[derive(Clone, Debug)]
pub struct FaceAxis {
    pub minus: FaceSide,
    pub plus: FaceSide,
    /// Common numerical flux produced by the central scheme.
    pub cf: FieldVector,
}

impl FaceAxis {
    fn zeros(shape: (usize, usize)) -> Self {
        Self {
            minus: FaceSide::zeros(shape),
            plus: FaceSide::zeros(shape),
            cf: FieldVector::zeros(shape),
        }
    }
}

/// Full solver state for one structured-grid partition.
#[derive(Clone, Debug)]
pub struct State {
    /// Conservative cell averages with ghost margin, shape
    /// `(ny + 2*ngh, nx + 2*ngh)`.
    pub q: FieldVector,
    /// Face data along x, shape `(ny, nx + 1)`.
    pub face_x: FaceAxis,
    /// Face data along y, shape `(ny + 1, nx)`.
    pub face_y: FaceAxis,
    /// Explicit right-hand side (flux divergence + explicit sources),
    /// interior shape `(ny, nx)`.
    pub s: FieldVector,
    /// Stiff source accumulator, zeroed at the start of every stiff
    /// stage, interior shape `(ny, nx)`.
    pub ss: FieldVector,
    /// Ghost-margin width on every edge.
    pub ngh: usize,
    pub nx: usize,
    pub ny: usize,
}

impl State {
    /// Zero-initialized state with the default ghost width.
    pub fn new(grid: &Grid) -> Self {
        Self::with_ghost_width(grid, GHOST_WIDTH).expect("default ghost width is valid")
    }

    /// Zero-initialized state with an explicit ghost width (>= 2).
    pub fn with_ghost_width(grid: &Grid, ngh: usize) -> Result<Self, ConfigError> {
        if ngh < 2 {
            return Err(ConfigError::GhostMarginTooSmall(ngh));
        }
        let (ny, nx) = grid.cell_shape();
        Ok(Self {
            q: FieldVector::zeros((ny + 2 * ngh, nx + 2 * ngh)),
            face_x: FaceAxis::zeros((ny, nx + 1)),
            face_y: FaceAxis::zeros((ny + 1, nx)),
            s: FieldVector::zeros((ny, nx)),
            ss: FieldVector::zeros((ny, nx)),
            ngh,
            nx,
            ny,
        })
    }

    /// Fill the interior conservative fields from closures of the
    /// cell-center coordinates. Ghost cells are left untouched.
    pub fn set_from_functions<Fw, Fu, Fv>(
        &mut self,
        grid: &Grid,
        surface: Fw,
        x_discharge: Fu,
        y_discharge: Fv,
    ) where
        Fw: Fn(f64, f64) -> f64,
        Fu: Fn(f64, f64) -> f64,
        Fv: Fn(f64, f64) -> f64,
    {
        let g = self.ngh;
        for j in 0..self.ny {
            let y = grid.y_centers[j];
            for i in 0..self.nx {
                let x = grid.x_centers[i];
                self.q.w[[j + g, i + g]] = surface(x, y);
                self.q.hu[[j + g, i + g]] = x_discharge(x, y);
                self.q.hv[[j + g, i + g]] = y_discharge(x, y);
            }
        }
    }
}

/// Interior (non-ghost) view of a ghost-padded cell-centered array.
///
/// Free function rather than a `State` method so callers can hold the
/// view while mutating a sibling field of the same `State`.
pub fn interior(field: &Array2<f64>, ngh: usize) -> ArrayView2<'_, f64> {
    let (rows, cols) = field.dim();
    let g = ngh as isize;
    field.slice(s![g..rows as isize - g, g..cols as isize - g])
}

/// Mutable interior view of a ghost-padded cell-centered array.
pub fn interior_mut(field: &mut Array2<f64>, ngh: usize) -> ArrayViewMut2<'_, f64> {
    let (rows, cols) = field.dim();
    let g = ngh as isize;
    field.slice_mut(s![g..rows as isize - g, g..cols as isize - g])
}
