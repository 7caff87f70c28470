//! Unified 3D voxel DDA traversal.
//!
//! A single digital-differential-analyzer walk is shared by both crossing
//! searches: the *surface* search (looking for the first non-zero `surface`
//! cell) and the *solid* search (looking for the first cell with a negative
//! `grid` label). Both walk the same segment — from the electron's previous
//! point, along the proposed displacement to its next point — stopping at
//! the segment's end (`t > 1`) if no target voxel is found.

use crate::error::{Error, FailureContext};
use crate::geometry::Coordinate;
use crate::grid::GridSnapshot;
use crate::material::MaterialTable;
use crate::rng::ElectronRng;

/// A crossing found by the DDA: the parametric distance along the segment,
/// the (edge-nudged) crossing point, and the voxel index it lies in.
#[derive(Debug, Clone, Copy)]
pub struct Crossing {
    pub t: f64,
    pub point: Coordinate,
    pub voxel: (isize, isize, isize),
}

/// Outcome of one DDA search.
#[derive(Debug, Clone, Copy)]
pub enum TraversalResult {
    Hit(Crossing),
    Miss,
}

struct AxisState {
    t: f64,
    step_t: f64,
    sign: f64,
}

fn axis_state(p0: f64, seg: f64, h: f64, rng: &mut ElectronRng) -> AxisState {
    let mut d = seg;
    if d == 0.0 {
        d = rng.jitter_sign(1e-6);
    }
    let sign = d.signum();

    let delta = -(p0 % h);
    let mut offset = 0.0;
    if sign > 0.0 {
        offset += h;
    }
    if delta == 0.0 {
        offset += sign * h;
    }

    AxisState {
        t: ((delta + offset) / d).abs(),
        step_t: (h / d).abs(),
        sign,
    }
}

/// Walk the segment `p0 -> p0 + seg` (where `seg`'s magnitude is the full
/// proposed step length) looking for the first voxel satisfying `target`.
fn march(
    p0: Coordinate,
    seg: Coordinate,
    h: f64,
    rng: &mut ElectronRng,
    target: impl Fn(isize, isize, isize) -> bool,
) -> TraversalResult {
    let mut axes = [
        axis_state(p0.z, seg.z, h, rng),
        axis_state(p0.y, seg.y, h, rng),
        axis_state(p0.x, seg.x, h, rng),
    ];

    loop {
        let a_star = (0..3)
            .min_by(|&i, &j| axes[i].t.total_cmp(&axes[j].t))
            .expect("axes has exactly 3 elements");

        if axes[a_star].t > 1.0 {
            return TraversalResult::Miss;
        }

        let t = axes[a_star].t;
        let p = Coordinate::new(
            p0.z + t * seg.z,
            p0.y + t * seg.y,
            p0.x + t * seg.x,
        );
        let voxel = p.voxel_index(h);

        if target(voxel.0, voxel.1, voxel.2) {
            return TraversalResult::Hit(Crossing { t, point: p, voxel });
        }

        axes[a_star].t += axes[a_star].step_t;
    }
}

/// Push a crossing point `1e-3` nm along each axis, in the direction of
/// travel on that axis (`forward = true`) or against it (`forward = false`).
/// The push applies to all three axes, not just the dominant one, so a
/// crossing near a cell corner doesn't leave the point still straddling the
/// boundary on the other two.
fn nudge(p: Coordinate, seg: Coordinate, forward: bool) -> Coordinate {
    let mult = if forward { 1.0 } else { -1.0 };
    let axis = |s: f64| if s == 0.0 { 0.0 } else { mult * s.signum() * 1e-3 };
    Coordinate::new(p.z + axis(seg.z), p.y + axis(seg.y), p.x + axis(seg.x))
}

/// Find the first surface-cell crossing along `p0 -> p0 + seg`. On a hit,
/// the point is nudged `1e-3` nm backward (toward the void side) along each
/// axis, so the recorded crossing point sits just outside the surface cell
/// rather than exactly on its boundary.
pub fn find_surface_crossing(
    p0: Coordinate,
    seg: Coordinate,
    grid: &GridSnapshot,
    rng: &mut ElectronRng,
) -> TraversalResult {
    match march(p0, seg, grid.cell_dim(), rng, |i, j, k| grid.is_surface(i, j, k)) {
        TraversalResult::Hit(mut c) => {
            c.point = nudge(c.point, seg, false);
            TraversalResult::Hit(c)
        }
        TraversalResult::Miss => TraversalResult::Miss,
    }
}

/// Find the first solid-interior crossing along `p0 -> p0 + seg`. To search
/// "beyond" an already-found surface crossing `c_s`, call with `p0 =
/// c_s.point` and `seg` scaled down by the fraction of the original segment
/// already consumed, so the search continues along the same ray rather than
/// restarting from the electron's previous point. On a
/// hit, the point is nudged `1e-3` nm forward (into the solid) along each
/// axis. Raises [`Error::GridConsistencyError`] if the hit voxel's label has
/// no matching entry in `materials`.
pub fn find_solid_crossing(
    p0: Coordinate,
    seg: Coordinate,
    grid: &GridSnapshot,
    materials: &MaterialTable,
    rng: &mut ElectronRng,
    electron_index: usize,
) -> Result<TraversalResult, Error> {
    let result = march(p0, seg, grid.cell_dim(), rng, |i, j, k| grid.is_solid(i, j, k));

    match result {
        TraversalResult::Hit(mut c) => {
            let (i, j, k) = c.voxel;
            let label = grid.label(i, j, k);
            if materials.by_mark(label).is_none() {
                return Err(Error::grid_consistency(
                    format!("solid voxel {:?} has label {} with no matching material mark", c.voxel, label),
                    FailureContext::with_state(electron_index, c.point.as_array(), 0.0),
                ));
            }
            c.point = nudge(c.point, seg, true);
            Ok(TraversalResult::Hit(c))
        }
        TraversalResult::Miss => Ok(TraversalResult::Miss),
    }
}
