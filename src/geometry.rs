//! Coordinates and bounding-box geometry.

use serde::{Deserialize, Serialize};

/// Numerical guard used throughout the core to keep recorded points strictly
/// inside the bounding box and to jitter points sitting exactly on a face.
/// This value is load-bearing for where a trajectory is considered to have
/// exited, and must not be replaced with a generic, ad hoc ε.
pub const EPS: f64 = 1e-6;

/// A point in the simulation volume, `(z, y, x)` in nanometers (z=0 is the
/// bottom face, z=Z_abs the top face).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub z: f64,
    pub y: f64,
    pub x: f64,
}

impl Coordinate {
    pub fn new(z: f64, y: f64, x: f64) -> Self {
        Self { z, y, x }
    }

    pub fn zero() -> Self {
        Self::new(0.0, 0.0, 0.0)
    }

    pub fn as_array(&self) -> [f64; 3] {
        [self.z, self.y, self.x]
    }

    pub fn from_array(a: [f64; 3]) -> Self {
        Self::new(a[0], a[1], a[2])
    }

    pub fn add(&self, other: &Coordinate) -> Coordinate {
        Coordinate::new(self.z + other.z, self.y + other.y, self.x + other.x)
    }

    pub fn sub(&self, other: &Coordinate) -> Coordinate {
        Coordinate::new(self.z - other.z, self.y - other.y, self.x - other.x)
    }

    pub fn scale(&self, s: f64) -> Coordinate {
        Coordinate::new(self.z * s, self.y * s, self.x * s)
    }

    pub fn distance_to(&self, other: &Coordinate) -> f64 {
        let d = self.sub(other);
        (d.z * d.z + d.y * d.y + d.x * d.x).sqrt()
    }

    /// Componentwise voxel index, `floor(self / cell_dim)`.
    pub fn voxel_index(&self, cell_dim: f64) -> (isize, isize, isize) {
        (
            (self.z / cell_dim).floor() as isize,
            (self.y / cell_dim).floor() as isize,
            (self.x / cell_dim).floor() as isize,
        )
    }
}

/// A unit direction, `(d_z, d_y, d_x)` with `d_z^2 + d_y^2 + d_x^2 = 1` by
/// construction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Direction {
    pub z: f64,
    pub y: f64,
    pub x: f64,
}

impl Direction {
    pub fn new(z: f64, y: f64, x: f64) -> Self {
        Self { z, y, x }
    }

    pub fn as_array(&self) -> [f64; 3] {
        [self.z, self.y, self.x]
    }
}

/// Grid dimensions in cells, and the corresponding absolute bounding box in
/// nanometers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Shape {
    pub n_z: usize,
    pub n_y: usize,
    pub n_x: usize,
    pub cell_dim: f64,
}

impl Shape {
    pub fn new(n_z: usize, n_y: usize, n_x: usize, cell_dim: f64) -> Self {
        Self {
            n_z,
            n_y,
            n_x,
            cell_dim,
        }
    }

    pub fn z_abs(&self) -> f64 {
        self.n_z as f64 * self.cell_dim
    }

    pub fn y_abs(&self) -> f64 {
        self.n_y as f64 * self.cell_dim
    }

    pub fn x_abs(&self) -> f64 {
        self.n_x as f64 * self.cell_dim
    }

    /// Clamp a proposed point to the open box `[EPS, axis_abs - EPS]` on
    /// every axis. Returns `Some(clamped)` if any coordinate needed
    /// adjustment — this doubles as the signal that the electron has left
    /// the volume; `None` if the point is already strictly inside.
    pub fn clamp_to_box(&self, p: Coordinate) -> Option<Coordinate> {
        let mut out = p;
        let mut clamped = false;

        let mut clamp_axis = |v: f64, axis_abs: f64| -> f64 {
            if v < EPS {
                clamped = true;
                EPS
            } else if v > axis_abs - EPS {
                clamped = true;
                axis_abs - EPS
            } else {
                v
            }
        };

        out.z = clamp_axis(p.z, self.z_abs());
        out.y = clamp_axis(p.y, self.y_abs());
        out.x = clamp_axis(p.x, self.x_abs());

        if clamped {
            Some(out)
        } else {
            None
        }
    }

    /// True if `p` lies within `tol` of any face of the bounding box. Takes
    /// the tolerance as a parameter since callers checking "did this
    /// trajectory end at a face" want a much looser tolerance than the
    /// recording precision `EPS`.
    pub fn near_face(&self, p: Coordinate, tol: f64) -> bool {
        p.z <= tol
            || p.z >= self.z_abs() - tol
            || p.y <= tol
            || p.y >= self.y_abs() - tol
            || p.x <= tol
            || p.x >= self.x_abs() - tol
    }
}
