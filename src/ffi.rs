//! PyO3 / numpy host-runtime bindings, built only with the `python` feature.
//!
//! Each trajectory's three buffers are moved into `numpy::PyArray` objects
//! via [`IntoPyArray`], which transfers ownership of the Rust allocation to
//! Python rather than copying it or exposing a borrowed pointer with an
//! implicit lifetime.

use numpy::{IntoPyArray, PyArray1, PyArray2};
use ndarray::Array2;
use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;

use crate::grid::GridSnapshot;
use crate::material::{Element, MaterialTable};
use crate::simulate;

/// One material row, as accepted from Python. Mirrors [`Element`] field for
/// field; kept as a separate type so the pure-Rust `Element` stays free of
/// `#[pyclass]` bookkeeping when the `python` feature is off.
#[pyclass(name = "Element")]
#[derive(Debug, Clone, Copy)]
pub struct PyElement {
    #[pyo3(get, set)]
    pub density: f64,
    #[pyo3(get, set)]
    pub atomic_number: f64,
    #[pyo3(get, set)]
    pub atomic_weight: f64,
    #[pyo3(get, set)]
    pub ionisation_potential: f64,
    #[pyo3(get, set)]
    pub electron_param: f64,
    #[pyo3(get, set)]
    pub escape_length: f64,
    #[pyo3(get, set)]
    pub mark: i32,
}

#[pymethods]
impl PyElement {
    #[new]
    fn new(
        density: f64,
        atomic_number: f64,
        atomic_weight: f64,
        ionisation_potential: f64,
        electron_param: f64,
        escape_length: f64,
        mark: i32,
    ) -> Self {
        Self {
            density,
            atomic_number,
            atomic_weight,
            ionisation_potential,
            electron_param,
            escape_length,
            mark,
        }
    }
}

impl From<PyElement> for Element {
    fn from(e: PyElement) -> Self {
        Element {
            density: e.density,
            atomic_number: e.atomic_number,
            atomic_weight: e.atomic_weight,
            ionisation_potential: e.ionisation_potential,
            electron_param: e.electron_param,
            escape_length: e.escape_length,
            mark: e.mark,
        }
    }
}

/// `simulate(y0, x0, e0, e_min, grid, surface, cell_dim, materials, seed)`
///
/// `grid`/`surface` are `numpy.ndarray`s of shape `(n_z, n_y, n_x)`. Returns
/// a list of `(points, energies, masks)` per incident electron, where
/// `points` is an `(L, 3)` float64 array and `energies`/`masks` are
/// length-`L` float64 arrays — all zero-copy views into freshly allocated
/// Rust buffers, handed to Python via [`IntoPyArray`].
#[pyfunction]
#[pyo3(signature = (y0, x0, e0, e_min, grid, surface, cell_dim, materials, seed))]
#[allow(clippy::too_many_arguments)]
fn simulate_py<'py>(
    py: Python<'py>,
    y0: numpy::PyReadonlyArray1<'py, f64>,
    x0: numpy::PyReadonlyArray1<'py, f64>,
    e0: f64,
    e_min: f64,
    grid: numpy::PyReadonlyArray3<'py, f64>,
    surface: numpy::PyReadonlyArray3<'py, u8>,
    cell_dim: f64,
    materials: Vec<PyElement>,
    seed: u64,
) -> PyResult<Vec<(Bound<'py, PyArray2<f64>>, Bound<'py, PyArray1<f64>>, Bound<'py, PyArray1<f64>>)>> {
    let grid_owned = grid.as_array().to_owned();
    let surface_owned = surface.as_array().to_owned();

    let snapshot = GridSnapshot::new(grid_owned, surface_owned, cell_dim)
        .map_err(|e| PyValueError::new_err(e.to_string()))?;

    let elements: Vec<Element> = materials.into_iter().map(Element::from).collect();
    let table = MaterialTable::new(elements).map_err(|e| PyValueError::new_err(e.to_string()))?;

    let y0 = y0.as_slice().map_err(|e| PyValueError::new_err(e.to_string()))?;
    let x0 = x0.as_slice().map_err(|e| PyValueError::new_err(e.to_string()))?;

    let trajectories = simulate::simulate(y0, x0, e0, e_min, &snapshot, &table, seed)
        .map_err(|e| PyValueError::new_err(e.to_string()))?;

    let mut out = Vec::with_capacity(trajectories.len());
    for traj in trajectories {
        let (points, energies, masks) = traj.into_parts();
        let n = points.len();
        let flat: Vec<f64> = points.into_iter().flatten().collect();
        let points_arr = Array2::from_shape_vec((n, 3), flat)
            .expect("row-major (n, 3) layout is always valid for n points")
            .into_pyarray_bound(py);
        let energies_arr = energies.into_pyarray_bound(py);
        let masks_arr = masks.into_pyarray_bound(py);
        out.push((points_arr, energies_arr, masks_arr));
    }

    Ok(out)
}

/// Python module `febid_electron_mc`.
#[pymodule]
fn febid_electron_mc(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<PyElement>()?;
    m.add_function(wrap_pyfunction!(simulate_py, m)?)?;
    Ok(())
}
