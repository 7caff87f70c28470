//! Read-only voxel grid snapshot.

use ndarray::Array3;

use crate::error::{Error, Result};
use crate::geometry::Shape;

/// A read-only voxel grid snapshot for one [`crate::simulate::simulate`] call.
///
/// `grid[i,j,k]` is negative for solid (`-2` deposit, `-1` substrate by
/// convention; any mark present in the material table is valid) and
/// non-negative for void. `surface[i,j,k]` is non-zero iff the cell is part
/// of the solid/void interface layer.
#[derive(Debug, Clone)]
pub struct GridSnapshot {
    grid: Array3<f64>,
    surface: Array3<u8>,
    shape: Shape,
    z_top: f64,
}

impl GridSnapshot {
    /// Validate and construct a grid snapshot. Raises
    /// [`Error::InvalidInput`] for shape mismatches or a non-positive
    /// `cell_dim`.
    pub fn new(grid: Array3<f64>, surface: Array3<u8>, cell_dim: f64) -> Result<Self> {
        if cell_dim <= 0.0 {
            return Err(Error::invalid_input(format!(
                "cell_dim must be positive, got {cell_dim}"
            )));
        }
        if grid.dim() != surface.dim() {
            return Err(Error::invalid_input(format!(
                "grid shape {:?} does not match surface shape {:?}",
                grid.dim(),
                surface.dim()
            )));
        }
        let (n_z, n_y, n_x) = grid.dim();
        if n_z == 0 || n_y == 0 || n_x == 0 {
            return Err(Error::invalid_input("grid must have nonzero extent on every axis"));
        }

        let shape = Shape::new(n_z, n_y, n_x, cell_dim);
        let z_top = Self::compute_z_top(&surface, cell_dim);

        Ok(Self {
            grid,
            surface,
            shape,
            z_top,
        })
    }

    /// Highest z-index containing any surface cell, scaled by `cell_dim`.
    fn compute_z_top(surface: &Array3<u8>, cell_dim: f64) -> f64 {
        let (n_z, _, _) = surface.dim();
        for i in (0..n_z).rev() {
            let layer = surface.index_axis(ndarray::Axis(0), i);
            if layer.iter().any(|&v| v != 0) {
                return i as f64 * cell_dim;
            }
        }
        0.0
    }

    pub fn shape(&self) -> Shape {
        self.shape
    }

    pub fn cell_dim(&self) -> f64 {
        self.shape.cell_dim
    }

    pub fn z_top(&self) -> f64 {
        self.z_top
    }

    /// Cell label at voxel `(i, j, k)`. Out-of-range indices are treated as
    /// void (returns `0.0`); callers at a volume boundary rely on this to
    /// avoid bounds-checking every DDA step.
    pub fn label(&self, i: isize, j: isize, k: isize) -> f64 {
        self.get(&self.grid, i, j, k).copied().unwrap_or(0.0)
    }

    /// Surface flag at voxel `(i, j, k)`. Out-of-range indices are not a
    /// surface cell.
    pub fn is_surface(&self, i: isize, j: isize, k: isize) -> bool {
        self.get(&self.surface, i, j, k).copied().unwrap_or(0) != 0
    }

    pub fn is_solid(&self, i: isize, j: isize, k: isize) -> bool {
        self.label(i, j, k) < 0.0
    }

    fn get<'a, T>(&self, arr: &'a Array3<T>, i: isize, j: isize, k: isize) -> Option<&'a T> {
        let (n_z, n_y, n_x) = arr.dim();
        if i < 0 || j < 0 || k < 0 {
            return None;
        }
        let (i, j, k) = (i as usize, j as usize, k as usize);
        if i >= n_z || j >= n_y || k >= n_x {
            return None;
        }
        Some(&arr[[i, j, k]])
    }

    /// Highest solid index along the z-column `(j, k)` fixed, or `None` if
    /// the column contains no solid cell at all (used to drop an electron
    /// entering above void straight down onto the first solid it meets).
    pub fn highest_solid_in_column(&self, j: usize, k: usize) -> Option<usize> {
        let (n_z, _, _) = self.grid.dim();
        (0..n_z).rev().find(|&i| self.grid[[i, j, k]] < 0.0)
    }
}
