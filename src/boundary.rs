//! Ghost-cell boundary conditions.
//!
//! The boundary table is resolved once, at setup, into a flat list of
//! per-(edge, component) operations; applying them is a straight sweep
//! with no per-cell policy dispatch. The composed operation
//! [`GhostCellUpdater::update`] writes every ghost margin of a [`State`]
//! and is called once per RHS evaluation, before reconstruction.
//!
//! Periodic edges produce no operation here: their ghost data is kept
//! current by the halo-exchange mechanism (see [`crate::halo`]).

use ndarray::Array1;

use crate::config::{BcType, BoundaryConfig, Edge, Parameters, N_COMPONENTS};
use crate::error::ConfigError;
use crate::grid::Grid;
use crate::state::State;
use crate::topography::Topography;

/// Index geometry of one edge: line length, whether ghost cells vary
/// along rows or columns, the nearest interior index on the normal axis,
/// and the outward direction.
#[derive(Clone, Copy, Debug)]
struct EdgeGeometry {
    n_along: usize,
    x_normal: bool,
    interior0: usize,
    outward: isize,
}

impl EdgeGeometry {
    fn new(edge: Edge, nx: usize, ny: usize, ngh: usize) -> Self {
        let x_normal = edge.is_x_normal();
        let n_along = if x_normal { ny } else { nx };
        let (interior0, outward) = match edge {
            Edge::West | Edge::South => (ngh, -1),
            Edge::East => (ngh + nx - 1, 1),
            Edge::North => (ngh + ny - 1, 1),
        };
        Self {
            n_along,
            x_normal,
            interior0,
            outward,
        }
    }

    /// Cell index of the `k`-th ghost layer (0 = nearest) on line `t`.
    #[inline]
    fn ghost(&self, ngh: usize, t: usize, k: usize) -> (usize, usize) {
        let normal = (self.interior0 as isize + self.outward * (1 + k as isize)) as usize;
        self.place(ngh, t, normal)
    }

    /// Cell index of the `d`-th interior cell (0 = nearest) on line `t`.
    #[inline]
    fn interior(&self, ngh: usize, t: usize, d: usize) -> (usize, usize) {
        let normal = (self.interior0 as isize - self.outward * d as isize) as usize;
        self.place(ngh, t, normal)
    }

    #[inline]
    fn place(&self, ngh: usize, t: usize, normal: usize) -> (usize, usize) {
        if self.x_normal {
            (ngh + t, normal)
        } else {
            (normal, ngh + t)
        }
    }
}

/// A resolved ghost-cell kernel for one edge.
#[derive(Clone, Debug)]
enum Kernel {
    /// Ghost cells copy the nearest interior cell.
    Outflow,
    /// Linear extrapolation from the two nearest interior cells.
    Extrap,
    /// Mirror write around a precomputed per-cell target value, so the
    /// centered face value reconstructs to the target.
    Const { targets: Array1<f64> },
    /// Like `Const`, but the target is rebuilt every call from the
    /// prescribed non-conservative value, the boundary-face elevation,
    /// and the current interior surface.
    Inflow { value: f64, face_z: Array1<f64> },
}

#[derive(Clone, Debug)]
struct BoundaryOp {
    edge: Edge,
    /// `None` collapses all three components into one sweep (vectorized
    /// mode); `Some(c)` updates a single component.
    component: Option<usize>,
    kernel: Kernel,
}

/// Applies every non-periodic boundary policy to a `State`'s ghost
/// margins. Built once per run from a checked [`BoundaryConfig`].
#[derive(Clone, Debug)]
pub struct GhostCellUpdater {
    ops: Vec<BoundaryOp>,
    nx: usize,
    ny: usize,
}

impl GhostCellUpdater {
    pub fn new(
        bcs: &BoundaryConfig,
        grid: &Grid,
        topo: &Topography,
        params: &Parameters,
    ) -> Result<Self, ConfigError> {
        bcs.check()?;

        let mut ops = Vec::new();
        for edge in Edge::ALL {
            let bc = bcs.edge(edge);

            // Periodic edges are whole (checked above) and synchronized
            // by halo exchange, not by this subsystem.
            if bc.types[0] == BcType::Periodic {
                log::debug!("ghost cells: {edge} edge is periodic, delegated to halo exchange");
                continue;
            }

            // Vectorized path: one sweep for all components when they
            // share a topography-independent policy.
            if params.vectorize_bc
                && bc.is_uniform()
                && matches!(bc.types[0], BcType::Outflow | BcType::Extrap)
            {
                log::debug!(
                    "ghost cells: {edge} edge, all components, policy {} (vectorized)",
                    bc.types[0]
                );
                ops.push(BoundaryOp {
                    edge,
                    component: None,
                    kernel: Self::build_kernel(bc.types[0], None, edge, 0, grid, topo)?,
                });
                continue;
            }

            for component in 0..N_COMPONENTS {
                let bc_type = bc.types[component];
                log::debug!("ghost cells: {edge} edge, component {component}, policy {bc_type}");
                ops.push(BoundaryOp {
                    edge,
                    component: Some(component),
                    kernel: Self::build_kernel(
                        bc_type,
                        bc.values[component],
                        edge,
                        component,
                        grid,
                        topo,
                    )?,
                });
            }
        }

        Ok(Self {
            ops,
            nx: grid.nx,
            ny: grid.ny,
        })
    }

    fn build_kernel(
        bc_type: BcType,
        value: Option<f64>,
        edge: Edge,
        component: usize,
        grid: &Grid,
        topo: &Topography,
    ) -> Result<Kernel, ConfigError> {
        let require_value = || {
            value.ok_or(ConfigError::MissingBoundaryValue {
                edge,
                component,
                policy: bc_type.name(),
            })
        };

        Ok(match bc_type {
            BcType::Outflow => Kernel::Outflow,
            BcType::Extrap => Kernel::Extrap,
            BcType::Const => {
                let value = require_value()?;
                let face_z = edge_face_elevation(topo, edge, grid);
                // For the surface component the Dirichlet value may not
                // dip below the bed at the boundary face.
                let targets = if component == 0 {
                    face_z.mapv(|z| value.max(z))
                } else {
                    Array1::from_elem(face_z.len(), value)
                };
                Kernel::Const { targets }
            }
            BcType::Inflow => Kernel::Inflow {
                value: require_value()?,
                face_z: edge_face_elevation(topo, edge, grid),
            },
            // Filtered out by the caller.
            BcType::Periodic => unreachable!("periodic edges produce no ghost-cell op"),
        })
    }

    /// Update every ghost margin of `state`. Functionally identical for
    /// the vectorized and per-component paths.
    pub fn update(&self, state: &mut State) {
        debug_assert_eq!((state.ny, state.nx), (self.ny, self.nx));
        for op in &self.ops {
            let geom = EdgeGeometry::new(op.edge, state.nx, state.ny, state.ngh);
            match op.component {
                Some(component) => apply_kernel(state, &op.kernel, geom, component),
                None => {
                    for component in 0..N_COMPONENTS {
                        apply_kernel(state, &op.kernel, geom, component);
                    }
                }
            }
        }
    }
}

fn apply_kernel(state: &mut State, kernel: &Kernel, geom: EdgeGeometry, component: usize) {
    let ngh = state.ngh;

    // Inflow targets depend on the current interior surface; compute
    // them before mutably borrowing the component being written.
    if let Kernel::Inflow { value, face_z } = kernel {
        let w = &state.q.w;
        let targets: Vec<f64> = (0..geom.n_along)
            .map(|t| {
                if component == 0 {
                    // Prescribed depth on top of the local bed.
                    face_z[t] + value
                } else {
                    // Prescribed velocity times the local depth.
                    let h = (w[geom.interior(ngh, t, 0)] - face_z[t]).max(0.0);
                    value * h
                }
            })
            .collect();
        let q = state.q.var_mut(component);
        for (t, target) in targets.iter().enumerate() {
            for k in 0..ngh {
                q[geom.ghost(ngh, t, k)] = 2.0 * target - q[geom.interior(ngh, t, k)];
            }
        }
        return;
    }

    let q = state.q.var_mut(component);
    for t in 0..geom.n_along {
        match kernel {
            Kernel::Outflow => {
                let nearest = q[geom.interior(ngh, t, 0)];
                for k in 0..ngh {
                    q[geom.ghost(ngh, t, k)] = nearest;
                }
            }
            Kernel::Extrap => {
                let q0 = q[geom.interior(ngh, t, 0)];
                let slope = q0 - q[geom.interior(ngh, t, 1)];
                for k in 0..ngh {
                    q[geom.ghost(ngh, t, k)] = q0 + (k + 1) as f64 * slope;
                }
            }
            Kernel::Const { targets } => {
                for k in 0..ngh {
                    q[geom.ghost(ngh, t, k)] = 2.0 * targets[t] - q[geom.interior(ngh, t, k)];
                }
            }
            Kernel::Inflow { .. } => {}
        }
    }
}

/// Bed elevation at the boundary-face midpoints of an edge.
fn edge_face_elevation(topo: &Topography, edge: Edge, grid: &Grid) -> Array1<f64> {
    match edge {
        Edge::West => topo.x_faces.column(0).to_owned(),
        Edge::East => topo.x_faces.column(grid.nx).to_owned(),
        Edge::South => topo.y_faces.row(0).to_owned(),
        Edge::North => topo.y_faces.row(grid.ny).to_owned(),
    }
}
