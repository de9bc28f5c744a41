//! Structured-grid geometry: cell centers, vertices, and spacing.
//!
//! The grid is immutable for the whole run. Rows index y, columns index x
//! (array shape `(ny, nx)`), matching the layout of every field array in
//! [`crate::state`].

use ndarray::Array1;

use crate::error::ConfigError;

/// A uniform structured grid over a rectangular domain.
///
/// Invariants, checked at construction: `nx, ny >= 1`, `dx, dy > 0`, and
/// `vertices = cells + 1` per axis (guaranteed by the constructor).
#[derive(Clone, Debug)]
pub struct Grid {
    /// Number of cells along x.
    pub nx: usize,
    /// Number of cells along y.
    pub ny: usize,
    /// Cell spacing along x.
    pub dx: f64,
    /// Cell spacing along y.
    pub dy: f64,
    /// Cell-center x coordinates, length `nx`.
    pub x_centers: Array1<f64>,
    /// Vertex x coordinates, length `nx + 1`.
    pub x_vertices: Array1<f64>,
    /// Cell-center y coordinates, length `ny`.
    pub y_centers: Array1<f64>,
    /// Vertex y coordinates, length `ny + 1`.
    pub y_vertices: Array1<f64>,
}

impl Grid {
    /// Create a uniform grid covering `[x0, x1] x [y0, y1]` with
    /// `nx * ny` cells.
    pub fn uniform(
        x_range: (f64, f64),
        y_range: (f64, f64),
        nx: usize,
        ny: usize,
    ) -> Result<Self, ConfigError> {
        if nx == 0 {
            return Err(ConfigError::EmptyAxis { axis: "x" });
        }
        if ny == 0 {
            return Err(ConfigError::EmptyAxis { axis: "y" });
        }

        let (x0, x1) = x_range;
        let (y0, y1) = y_range;
        let dx = (x1 - x0) / nx as f64;
        let dy = (y1 - y0) / ny as f64;

        if !(dx > 0.0) {
            return Err(ConfigError::NonPositiveSpacing {
                axis: "x",
                value: dx,
            });
        }
        if !(dy > 0.0) {
            return Err(ConfigError::NonPositiveSpacing {
                axis: "y",
                value: dy,
            });
        }

        let x_vertices = Array1::from_iter((0..=nx).map(|i| x0 + i as f64 * dx));
        let y_vertices = Array1::from_iter((0..=ny).map(|j| y0 + j as f64 * dy));
        let x_centers = Array1::from_iter((0..nx).map(|i| x0 + (i as f64 + 0.5) * dx));
        let y_centers = Array1::from_iter((0..ny).map(|j| y0 + (j as f64 + 0.5) * dy));

        log::debug!(
            "grid: {}x{} cells, dx={:.6}, dy={:.6}",
            nx,
            ny,
            dx,
            dy
        );

        Ok(Self {
            nx,
            ny,
            dx,
            dy,
            x_centers,
            x_vertices,
            y_centers,
            y_vertices,
        })
    }

    /// Cell-count shape `(ny, nx)` of interior field arrays.
    pub fn cell_shape(&self) -> (usize, usize) {
        (self.ny, self.nx)
    }

    /// Shape of the vertex array, `(ny + 1, nx + 1)`.
    pub fn vertex_shape(&self) -> (usize, usize) {
        (self.ny + 1, self.nx + 1)
    }
}
