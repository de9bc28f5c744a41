//! Ghost-margin synchronization between decomposition partitions.
//!
//! The solver core does not know about process topologies; it only
//! requires that something refreshes the ghost margins of periodic or
//! interior-neighbor edges before reconstruction reads them. Distributed
//! runs plug in their own [`HaloExchange`] implementation;
//! [`GridWrapExchange`] covers periodic boundaries in a single-partition
//! run by wrapping the grid onto itself.

use ndarray::{s, Array2};

use crate::config::BoundaryConfig;
use crate::error::HaloError;
use crate::state::State;

/// A mechanism that refreshes ghost margins from neighboring partitions.
///
/// `exchange` must block until the ghost data has arrived; failures are
/// surfaced unmodified to the driver loop.
pub trait HaloExchange: Send + Sync {
    fn exchange(&self, state: &mut State) -> Result<(), HaloError>;
}

/// Single-partition halo exchange: periodic edges wrap around the grid.
///
/// The x sweep runs before the y sweep so that doubly-periodic corners
/// compose correctly.
#[derive(Clone, Copy, Debug, Default)]
pub struct GridWrapExchange {
    pub x_periodic: bool,
    pub y_periodic: bool,
}

impl GridWrapExchange {
    /// Derive the periodic axes from a (checked) boundary table.
    pub fn from_config(bcs: &BoundaryConfig) -> Self {
        Self {
            x_periodic: bcs.x_periodic(),
            y_periodic: bcs.y_periodic(),
        }
    }

    fn wrap_x(field: &mut Array2<f64>, nx: usize, ngh: usize) {
        let g = ngh as isize;
        let n = nx as isize;
        // West ghosts take the last interior columns, east ghosts the
        // first.
        let west_src = field.slice(s![.., n..n + g]).to_owned();
        let east_src = field.slice(s![.., g..2 * g]).to_owned();
        field.slice_mut(s![.., ..g]).assign(&west_src);
        field.slice_mut(s![.., n + g..]).assign(&east_src);
    }

    fn wrap_y(field: &mut Array2<f64>, ny: usize, ngh: usize) {
        let g = ngh as isize;
        let n = ny as isize;
        let south_src = field.slice(s![n..n + g, ..]).to_owned();
        let north_src = field.slice(s![g..2 * g, ..]).to_owned();
        field.slice_mut(s![..g, ..]).assign(&south_src);
        field.slice_mut(s![n + g.., ..]).assign(&north_src);
    }
}

impl HaloExchange for GridWrapExchange {
    fn exchange(&self, state: &mut State) -> Result<(), HaloError> {
        let (nx, ny, ngh) = (state.nx, state.ny, state.ngh);
        for component in 0..crate::config::N_COMPONENTS {
            let field = state.q.var_mut(component);
            if self.x_periodic {
                Self::wrap_x(field, nx, ngh);
            }
            if self.y_periodic {
                Self::wrap_y(field, ny, ngh);
            }
        }
        Ok(())
    }
}
