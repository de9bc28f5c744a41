//! Source terms for the shallow water right-hand side.
//!
//! Two families, mirroring how the time integrator treats them:
//!
//! - [`SourceTerm`]: explicit terms added in place to `state.s`, which
//!   already holds the flux divergence when they run.
//! - [`StiffSourceTerm`]: terms accumulated into the separate `state.ss`
//!   buffer (zeroed by the orchestrator at the start of the stiff
//!   stage), so a driver can treat them implicitly or sub-cycle them.

use crate::config::Parameters;
use crate::grid::Grid;
use crate::state::State;
use crate::topography::Topography;

/// An explicit source term, applied in place to the RHS accumulator.
pub trait SourceTerm: Send + Sync {
    /// Add this term's contribution to `state.s`. The flux divergence is
    /// already accumulated when this runs.
    fn apply(&self, state: &mut State, grid: &Grid, topo: &Topography, params: &Parameters);

    /// Name for setup logging.
    fn name(&self) -> &'static str;
}

/// A stiff source term, accumulated into `state.ss` for later implicit
/// or sub-cycled treatment outside this stage.
pub trait StiffSourceTerm: Send + Sync {
    fn apply(&self, state: &mut State, grid: &Grid, topo: &Topography, params: &Parameters);

    fn name(&self) -> &'static str;
}

/// Bed-slope source term: `S_hu -= g h dz/dx`, `S_hv -= g h dz/dy` with
/// `h = w - z_center`.
///
/// The center elevation is the mean of the two face elevations (see
/// [`Topography`]), so for a flat surface this term cancels the
/// `g h^2 / 2` pressure-flux divergence exactly and the lake stays at
/// rest.
#[derive(Clone, Copy, Debug, Default)]
pub struct TopographySource;

impl SourceTerm for TopographySource {
    fn apply(&self, state: &mut State, _grid: &Grid, topo: &Topography, params: &Parameters) {
        let g = state.ngh;
        let gravity = params.gravity;
        for j in 0..state.ny {
            for i in 0..state.nx {
                let h = (state.q.w[[j + g, i + g]] - topo.centers[[j, i]]).max(0.0);
                state.s.hu[[j, i]] -= gravity * h * topo.grad_x[[j, i]];
                state.s.hv[[j, i]] -= gravity * h * topo.grad_y[[j, i]];
            }
        }
    }

    fn name(&self) -> &'static str {
        "topography"
    }
}

/// Manning bed friction, treated as stiff:
///
/// `SS_(hu,hv) -= g n^2 |u| (hu, hv) / h^(4/3)`
///
/// Dry cells (h <= dry_tol) contribute nothing.
#[derive(Clone, Copy, Debug)]
pub struct ManningFriction {
    /// Manning roughness coefficient n.
    pub roughness: f64,
}

impl ManningFriction {
    pub fn new(roughness: f64) -> Self {
        Self { roughness }
    }
}

impl StiffSourceTerm for ManningFriction {
    fn apply(&self, state: &mut State, _grid: &Grid, topo: &Topography, params: &Parameters) {
        let g = state.ngh;
        let coef = params.gravity * self.roughness * self.roughness;
        for j in 0..state.ny {
            for i in 0..state.nx {
                let h = state.q.w[[j + g, i + g]] - topo.centers[[j, i]];
                if h <= params.dry_tol {
                    continue;
                }
                let hu = state.q.hu[[j + g, i + g]];
                let hv = state.q.hv[[j + g, i + g]];
                let speed = (hu * hu + hv * hv).sqrt() / h;
                let factor = coef * speed / h.powf(4.0 / 3.0);
                state.ss.hu[[j, i]] -= factor * hu;
                state.ss.hv[[j, i]] -= factor * hv;
            }
        }
    }

    fn name(&self) -> &'static str {
        "manning friction"
    }
}
