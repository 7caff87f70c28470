//! Per-electron state and direction update.

use crate::error::{Error, FailureContext};
use crate::geometry::{Coordinate, Direction, Shape};
use crate::physics::{self, ScatteringAngles};
use crate::rng::ElectronRng;

/// Mutable per-electron scattering state: current/previous position, unit
/// direction, and residual energy.
#[derive(Debug, Clone)]
pub struct ElectronState {
    point: Coordinate,
    previous: Coordinate,
    direction: Direction,
    energy: f64,
}

impl ElectronState {
    /// Construct an electron entering along -z (straight down into the
    /// volume), as incident beams do at the top face.
    pub fn new(point: Coordinate, energy: f64) -> Self {
        Self {
            point,
            previous: point,
            direction: Direction::new(-1.0, 0.0, 0.0),
            energy,
        }
    }

    pub fn point(&self) -> Coordinate {
        self.point
    }

    pub fn previous(&self) -> Coordinate {
        self.previous
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn energy(&self) -> f64 {
        self.energy
    }

    pub fn set_energy(&mut self, energy: f64) {
        self.energy = energy;
    }

    /// Push `p` as the new current point, moving the old current point to
    /// `previous`.
    pub fn record_point(&mut self, p: Coordinate) {
        self.previous = self.point;
        self.point = p;
    }

    /// Move the electron directly to `p` without disturbing `previous` —
    /// used for the one-shot "drop to solid" relocation at trajectory
    /// start, which is not itself a scattering segment.
    pub fn relocate(&mut self, p: Coordinate) {
        self.point = p;
        self.previous = p;
    }

    /// `p_next = point + step * direction`.
    pub fn propose_next(&self, step: f64) -> Coordinate {
        let d = Coordinate::new(self.direction.z, self.direction.y, self.direction.x);
        self.point.add(&d.scale(step))
    }

    /// Clamp a proposed point to the bounding box. Returns the point to use
    /// (clamped, or `p` unchanged) and whether clamping occurred, which
    /// signals the electron has left the volume.
    pub fn clamp_or_pass(&self, p: Coordinate, shape: Shape) -> (Coordinate, bool) {
        match shape.clamp_to_box(p) {
            Some(clamped) => (clamped, true),
            None => (p, false),
        }
    }

    /// Sample the next scattering angles.
    pub fn sample_angles(
        &self,
        alpha: f64,
        rng: &mut ElectronRng,
        electron_index: usize,
    ) -> Result<ScatteringAngles, Error> {
        physics::scattering_angles(alpha, rng, || {
            FailureContext::with_state(electron_index, self.point.as_array(), self.energy)
        })
    }

    /// Apply the direction update given freshly sampled scattering angles.
    pub fn update_direction(
        &mut self,
        angles: ScatteringAngles,
        electron_index: usize,
    ) -> Result<(), Error> {
        let ScatteringAngles {
            cos_theta,
            sin_theta,
            psi,
        } = angles;

        let mut d_z = self.direction.z;
        let d_y = self.direction.y;
        let d_x = self.direction.x;

        if d_z == 0.0 {
            d_z = 1e-5;
        }

        let am = -d_x / d_z;
        let an = 1.0 / (1.0 + am * am).sqrt();

        let v1 = an * sin_theta;
        let v2 = an * am * sin_theta;
        let v3 = psi.cos();
        let v4 = psi.sin();

        let mut new_x = d_x * cos_theta + v1 * v3 + d_y * v2 * v4;
        let mut new_y = d_y * cos_theta + v4 * (d_z * v1 - d_x * v2);
        let mut new_z = d_z * cos_theta + v2 * v3 - d_y * v1 * v4;

        if new_x == 0.0 {
            new_x = 1e-7;
        }
        if new_y == 0.0 {
            new_y = 1e-7;
        }
        if new_z == 0.0 {
            new_z = 1e-7;
        }

        if new_x.is_nan() || new_y.is_nan() || new_z.is_nan() {
            return Err(Error::physics_invariant_broken(
                "NaN produced while updating direction",
                FailureContext::with_state(electron_index, self.point.as_array(), self.energy),
            ));
        }

        self.direction = Direction::new(new_z, new_y, new_x);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn propose_next_moves_along_direction() {
        let mut e = ElectronState::new(Coordinate::new(10.0, 5.0, 5.0), 5.0);
        e.direction = Direction::new(-1.0, 0.0, 0.0);
        let next = e.propose_next(2.0);
        assert!((next.z - 8.0).abs() < 1e-12);
        assert_eq!(next.y, 5.0);
        assert_eq!(next.x, 5.0);
    }

    #[test]
    fn clamp_or_pass_detects_exit() {
        let e = ElectronState::new(Coordinate::new(1.0, 1.0, 1.0), 5.0);
        let shape = Shape::new(10, 10, 10, 1.0);
        let (p, exited) = e.clamp_or_pass(Coordinate::new(-0.5, 1.0, 1.0), shape);
        assert!(exited);
        assert!(p.z >= 0.0);
    }

    #[test]
    fn direction_update_never_exactly_zero() {
        let mut e = ElectronState::new(Coordinate::new(5.0, 5.0, 5.0), 5.0);
        let angles = ScatteringAngles {
            cos_theta: 1.0,
            sin_theta: 0.0,
            psi: 0.0,
        };
        e.update_direction(angles, 0).unwrap();
        assert_ne!(e.direction.z, 0.0);
        assert_ne!(e.direction.y, 0.0);
        assert_ne!(e.direction.x, 0.0);
    }
}
