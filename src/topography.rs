//! Bottom topography sampled at vertices, faces, and cell centers.
//!
//! The reconstruction stage reads face elevations to form non-negative
//! depths, and the topography source term reads center values and
//! gradients. Cell centers are defined as the average of the two x-face
//! elevations (equivalently the four corner vertices), which is what
//! makes the pressure-flux divergence and the bed-slope source cancel
//! exactly for a lake at rest.

use ndarray::Array2;

use crate::error::ConfigError;
use crate::grid::Grid;

/// Bottom elevation data, immutable for the run.
#[derive(Clone, Debug)]
pub struct Topography {
    /// Elevation at grid vertices, shape `(ny + 1, nx + 1)`.
    pub vertices: Array2<f64>,
    /// Elevation at cell centers, shape `(ny, nx)`.
    pub centers: Array2<f64>,
    /// Elevation at x-face midpoints, shape `(ny, nx + 1)`.
    pub x_faces: Array2<f64>,
    /// Elevation at y-face midpoints, shape `(ny + 1, nx)`.
    pub y_faces: Array2<f64>,
    /// d(z)/dx at cell centers, shape `(ny, nx)`.
    pub grad_x: Array2<f64>,
    /// d(z)/dy at cell centers, shape `(ny, nx)`.
    pub grad_y: Array2<f64>,
}

impl Topography {
    /// Build face, center, and gradient samples from vertex elevations.
    pub fn from_vertices(grid: &Grid, vertices: Array2<f64>) -> Result<Self, ConfigError> {
        if vertices.dim() != grid.vertex_shape() {
            return Err(ConfigError::ShapeMismatch {
                what: "topography vertices",
                expected: grid.vertex_shape(),
                actual: vertices.dim(),
            });
        }

        let (ny, nx) = grid.cell_shape();

        // Face midpoints: average of the two vertices spanning the face.
        let mut x_faces = Array2::zeros((ny, nx + 1));
        for j in 0..ny {
            for i in 0..=nx {
                x_faces[[j, i]] = 0.5 * (vertices[[j, i]] + vertices[[j + 1, i]]);
            }
        }
        let mut y_faces = Array2::zeros((ny + 1, nx));
        for j in 0..=ny {
            for i in 0..nx {
                y_faces[[j, i]] = 0.5 * (vertices[[j, i]] + vertices[[j, i + 1]]);
            }
        }

        // Centers as the average of the two x-face elevations; the same
        // value as the four-vertex average.
        let mut centers = Array2::zeros((ny, nx));
        let mut grad_x = Array2::zeros((ny, nx));
        let mut grad_y = Array2::zeros((ny, nx));
        for j in 0..ny {
            for i in 0..nx {
                centers[[j, i]] = 0.5 * (x_faces[[j, i]] + x_faces[[j, i + 1]]);
                grad_x[[j, i]] = (x_faces[[j, i + 1]] - x_faces[[j, i]]) / grid.dx;
                grad_y[[j, i]] = (y_faces[[j + 1, i]] - y_faces[[j, i]]) / grid.dy;
            }
        }

        Ok(Self {
            vertices,
            centers,
            x_faces,
            y_faces,
            grad_x,
            grad_y,
        })
    }

    /// Sample a closure `z(x, y)` at the grid vertices.
    pub fn from_function<F>(grid: &Grid, elevation: F) -> Result<Self, ConfigError>
    where
        F: Fn(f64, f64) -> f64,
    {
        let mut vertices = Array2::zeros(grid.vertex_shape());
        for j in 0..=grid.ny {
            for i in 0..=grid.nx {
                vertices[[j, i]] = elevation(grid.x_vertices[i], grid.y_vertices[j]);
            }
        }
        Self::from_vertices(grid, vertices)
    }

    /// Flat bed at a constant elevation.
    pub fn flat(grid: &Grid, elevation: f64) -> Self {
        // Constant closures cannot fail the shape check.
        Self::from_function(grid, |_, _| elevation).expect("flat topography is always valid")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn center_is_mean_of_x_faces() {
        let grid = Grid::uniform((0.0, 1.0), (0.0, 1.0), 8, 8).unwrap();
        let topo = Topography::from_function(&grid, |x, y| {
            0.3 * (-((x - 0.5).powi(2) + (y - 0.5).powi(2)) / 0.02).exp()
        })
        .unwrap();

        for j in 0..grid.ny {
            for i in 0..grid.nx {
                let mean = 0.5 * (topo.x_faces[[j, i]] + topo.x_faces[[j, i + 1]]);
                assert!(
                    (topo.centers[[j, i]] - mean).abs() < 1e-15,
                    "center/face relation broken at ({}, {})",
                    j,
                    i
                );
            }
        }
    }

    #[test]
    fn gradient_of_linear_bed_is_exact() {
        let grid = Grid::uniform((0.0, 2.0), (0.0, 1.0), 10, 5).unwrap();
        let topo = Topography::from_function(&grid, |x, y| 0.5 * x - 0.25 * y).unwrap();
        for value in topo.grad_x.iter() {
            assert!((value - 0.5).abs() < 1e-12);
        }
        for value in topo.grad_y.iter() {
            assert!((value + 0.25).abs() < 1e-12);
        }
    }

    #[test]
    fn wrong_vertex_shape_is_rejected() {
        let grid = Grid::uniform((0.0, 1.0), (0.0, 1.0), 4, 4).unwrap();
        let bad = Array2::zeros((4, 5));
        assert!(matches!(
            Topography::from_vertices(&grid, bad),
            Err(ConfigError::ShapeMismatch { .. })
        ));
    }
}
