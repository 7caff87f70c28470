//! Top-level entry point.

use rayon::prelude::*;
use tracing::{info, info_span};

use crate::config::SimConfig;
use crate::error::{Error, Result};
use crate::geometry::EPS;
use crate::grid::GridSnapshot;
use crate::material::MaterialTable;
use crate::rng::ElectronRng;
use crate::trajectory::TrajectoryRecord;
use crate::driver;

/// Trace every incident electron's trajectory through `grid`.
///
/// `y0`/`x0` are the beam entry coordinates on the top face, one pair per
/// incident electron. The returned list is ordered by beam-entry index,
/// regardless of the order worker threads finish in.
///
/// # Errors
/// Returns [`Error::InvalidInput`] for malformed inputs, or propagates
/// [`Error::PhysicsInvariantBroken`] / [`Error::GridConsistencyError`] from
/// the first electron that hits either condition — the whole call is
/// aborted and no partial results are returned.
pub fn simulate(
    y0: &[f64],
    x0: &[f64],
    e0: f64,
    e_min: f64,
    grid: &GridSnapshot,
    materials: &MaterialTable,
    seed: u64,
) -> Result<Vec<TrajectoryRecord>> {
    validate_inputs(y0, x0, e0, e_min, grid, materials)?;

    let span = info_span!("simulate", electrons = y0.len(), e0, e_min);
    let _guard = span.enter();
    info!("tracing {} incident electrons", y0.len());

    let results: Result<Vec<TrajectoryRecord>> = (0..y0.len())
        .into_par_iter()
        .map(|idx| {
            let mut rng = ElectronRng::for_electron(seed, idx);
            driver::trace_electron(idx, y0[idx], x0[idx], e0, e_min, grid, materials, &mut rng)
        })
        .collect();

    let results = results?;
    info!("completed {} trajectories", results.len());
    Ok(results)
}

/// Convenience entry point for hosts that load their call-level defaults
/// from a file. Does not change [`simulate`]'s contract — this only
/// supplies `seed`/`e_min` from [`SimConfig`] instead of the caller passing
/// them directly.
pub fn simulate_with_config(
    y0: &[f64],
    x0: &[f64],
    e0: f64,
    grid: &GridSnapshot,
    materials: &MaterialTable,
    config: &SimConfig,
) -> Result<Vec<TrajectoryRecord>> {
    if let Some(workers) = config.workers {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(workers)
            .build()
            .map_err(|e| Error::invalid_input(format!("building worker pool: {e}")))?;
        pool.install(|| simulate(y0, x0, e0, config.e_min, grid, materials, config.seed))
    } else {
        simulate(y0, x0, e0, config.e_min, grid, materials, config.seed)
    }
}

fn validate_inputs(
    y0: &[f64],
    x0: &[f64],
    e0: f64,
    e_min: f64,
    grid: &GridSnapshot,
    materials: &MaterialTable,
) -> Result<()> {
    if y0.len() != x0.len() {
        return Err(Error::invalid_input(format!(
            "y0 has {} entries but x0 has {}",
            y0.len(),
            x0.len()
        )));
    }
    if materials.is_empty() {
        return Err(Error::invalid_input("material table must not be empty"));
    }
    if !(e_min > 0.0) || e_min >= e0 {
        return Err(Error::invalid_input(format!(
            "require 0 < e_min << e0, got e_min={e_min}, e0={e0}"
        )));
    }

    let shape = grid.shape();
    for (idx, (&y, &x)) in y0.iter().zip(x0.iter()).enumerate() {
        if !(EPS..=shape.y_abs() - EPS).contains(&y) {
            return Err(Error::invalid_input(format!(
                "beam entry #{idx}: y0={y} outside [{EPS}, {}]",
                shape.y_abs() - EPS
            )));
        }
        if !(EPS..=shape.x_abs() - EPS).contains(&x) {
            return Err(Error::invalid_input(format!(
                "beam entry #{idx}: x0={x} outside [{EPS}, {}]",
                shape.x_abs() - EPS
            )));
        }
    }

    Ok(())
}
