//! Trajectory driver: the per-incident-electron loop

use tracing::debug;

use crate::electron::ElectronState;
use crate::error::{Error, FailureContext};
use crate::geometry::Coordinate;
use crate::grid::GridSnapshot;
use crate::material::{Element, MaterialTable};
use crate::physics;
use crate::rng::ElectronRng;
use crate::traversal::{self, TraversalResult};
use crate::trajectory::TrajectoryRecord;

/// Trace one incident electron from its top-face entry point until its
/// energy drops to `e_min` or it leaves the volume.
pub fn trace_electron(
    electron_index: usize,
    y0: f64,
    x0: f64,
    e0: f64,
    e_min: f64,
    grid: &GridSnapshot,
    materials: &MaterialTable,
    rng: &mut ElectronRng,
) -> Result<TrajectoryRecord, Error> {
    let shape = grid.shape();
    let mut record = TrajectoryRecord::new();

    // Step 1: top-of-volume record.
    let entry = Coordinate::new(shape.z_abs() - 1e-3, y0, x0);
    record.push(entry, e0, 0.0);
    let mut electron = ElectronState::new(entry, e0);

    // Step 2: drop to solid.
    let (i, j, k) = entry.voxel_index(shape.cell_dim);
    if grid.label(i, j, k) > -1.0 {
        let (j_idx, k_idx) = (j as usize, k as usize);
        let j_prime = grid.highest_solid_in_column(j_idx, k_idx);
        let drop_z = match j_prime {
            Some(idx) => (idx as f64 + 1.0) * shape.cell_dim - 1e-3,
            None => shape.cell_dim - 1e-3,
        };
        let drop_point = Coordinate::new(drop_z, y0, x0);
        record.push(drop_point, e0, 0.0);
        electron.relocate(drop_point);

        if j_prime.is_none() {
            debug!(electron_index, "empty column, closing trajectory at fast path");
            return Ok(record);
        }
    }

    // Once the electron sits just above (or in) solid, the active material
    // starts as the primary deposit.
    let mut active: Element = *materials.deposit();

    // Step 3: main loop.
    loop {
        if electron.energy() <= e_min {
            break;
        }

        let alpha = physics::screening_parameter(electron.energy(), active.atomic_number);
        let sigma = physics::cross_section(electron.energy(), active.atomic_number, alpha);
        let lambda = physics::mean_free_path(active.atomic_weight, active.density, sigma);
        let mut step = physics::sample_step(lambda, rng);

        let angles = electron.sample_angles(alpha, rng, electron_index)?;
        electron.update_direction(angles, electron_index)?;

        let proposed = electron.propose_next(step);
        let (used_point, exiting) = electron.clamp_or_pass(proposed, shape);
        if exiting {
            step = electron.point().distance_to(&used_point);
        }

        let p_prev = electron.point();
        let (vi, vj, vk) = used_point.voxel_index(shape.cell_dim);

        if grid.is_solid(vi, vj, vk) {
            let label = grid.label(vi, vj, vk);
            let entered = match materials.by_mark(label) {
                Some(m) => *m,
                None => {
                    return Err(Error::grid_consistency(
                        format!("solid voxel {:?} has label {label} with no matching material mark", (vi, vj, vk)),
                        FailureContext::with_state(electron_index, used_point.as_array(), electron.energy()),
                    ));
                }
            };

            let delta_e = physics::bethe_loss(electron.energy(), &active) * step;
            let new_energy = electron.energy() + delta_e;
            if new_energy < 0.0 {
                return Err(Error::physics_invariant_broken(
                    "energy went negative in a solid segment",
                    FailureContext::with_state(electron_index, used_point.as_array(), electron.energy()),
                ));
            }

            record.push(used_point, new_energy, 1.0);
            electron.record_point(used_point);
            electron.set_energy(new_energy);
            active = entered;
        } else {
            let seg = used_point.sub(&p_prev);

            match traversal::find_surface_crossing(p_prev, seg, grid, rng) {
                TraversalResult::Miss => {
                    record.push(used_point, electron.energy(), 0.0);
                    electron.record_point(used_point);
                }
                TraversalResult::Hit(c_s) => {
                    let delta_e = physics::bethe_loss(electron.energy(), &active)
                        * p_prev.distance_to(&c_s.point);
                    let energy_after_entry = electron.energy() + delta_e;
                    if energy_after_entry < 0.0 {
                        return Err(Error::physics_invariant_broken(
                            "energy went negative crossing into solid",
                            FailureContext::with_state(electron_index, c_s.point.as_array(), electron.energy()),
                        ));
                    }
                    record.push(c_s.point, energy_after_entry, 1.0);

                    let remaining = seg.scale(1.0 - c_s.t);
                    let solid_result = traversal::find_solid_crossing(
                        c_s.point,
                        remaining,
                        grid,
                        materials,
                        rng,
                        electron_index,
                    )?;

                    match solid_result {
                        TraversalResult::Hit(c0) => {
                            record.push(c0.point, energy_after_entry, 0.0);
                            electron.record_point(c0.point);
                        }
                        TraversalResult::Miss => {
                            record.push(used_point, energy_after_entry, 0.0);
                            electron.record_point(used_point);
                        }
                    }
                    electron.set_energy(energy_after_entry);
                }
            }
        }

        if exiting {
            debug!(
                electron_index,
                segments = record.len(),
                energy = electron.energy(),
                "trajectory left the volume"
            );
            break;
        }
    }

    Ok(record)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array3;

    fn element(mark: i32, density: f64) -> Element {
        Element {
            density,
            atomic_number: 29.0,
            atomic_weight: 63.5,
            ionisation_potential: 0.3,
            electron_param: 1.0,
            escape_length: 2.0,
            mark,
        }
    }

    #[test]
    fn pure_void_closes_fast() {
        let n = 10;
        let grid_arr = Array3::from_elem((n, n, n), 1.0);
        let surface = Array3::<u8>::zeros((n, n, n));
        let grid = GridSnapshot::new(grid_arr, surface, 1.0).unwrap();
        let materials = MaterialTable::new(vec![element(-2, 8.9e-24)]).unwrap();
        let mut rng = ElectronRng::for_electron(1, 0);

        let rec = trace_electron(0, 5.0, 5.0, 5.0, 0.1, &grid, &materials, &mut rng).unwrap();
        assert_eq!(rec.len(), 2);
    }

    #[test]
    fn solid_block_absorbs_energy() {
        let n = 20;
        let mut grid_arr = Array3::from_elem((n, n, n), -2.0);
        let mut surface = Array3::<u8>::zeros((n, n, n));
        for j in 0..n {
            for k in 0..n {
                surface[[n - 1, j, k]] = 1;
                grid_arr[[n - 1, j, k]] = -2.0;
            }
        }
        let grid = GridSnapshot::new(grid_arr, surface, 1.0).unwrap();
        let materials = MaterialTable::new(vec![element(-2, 8.9e-24)]).unwrap();
        let mut rng = ElectronRng::for_electron(1, 0);

        let rec = trace_electron(0, 10.0, 10.0, 5.0, 0.1, &grid, &materials, &mut rng).unwrap();
        assert!(rec.len() >= 3);
        assert!(rec.masks()[1..].iter().all(|&m| m == 1.0));
        assert!(rec.last_energy().unwrap() <= 0.1 + 1e-9);
    }
}
