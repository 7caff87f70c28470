//! Material table: immutable per-element physical parameters

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// One solid material row: the physical parameters a material needs for
/// both the elastic-scattering cross-section and the energy-loss
/// calculation. Index 0 in a [`MaterialTable`] is always the primary
/// deposit, index 1 the substrate, by convention of the caller's ordering.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Element {
    /// Mass density, kg/nm^3.
    pub density: f64,
    /// Atomic number.
    pub atomic_number: f64,
    /// Atomic weight, g/mol.
    pub atomic_weight: f64,
    /// Mean ionisation potential, keV. Provided for reference; the core
    /// recomputes J(Z) from `atomic_number` rather than trusting a
    /// caller-supplied value, so this field is informational.
    pub ionisation_potential: f64,
    /// Scalar electron-related parameter, as carried by the upstream model.
    pub electron_param: f64,
    /// Secondary-electron escape length, nm.
    pub escape_length: f64,
    /// Integer label matching this material's negative cells in the grid
    /// (`-2` for deposit, `-1` for substrate, by convention).
    pub mark: i32,
}

/// Ordered sequence of [`Element`] rows. Index 0 is the primary deposit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MaterialTable {
    elements: Vec<Element>,
}

impl MaterialTable {
    pub fn new(elements: Vec<Element>) -> Result<Self> {
        if elements.is_empty() {
            return Err(Error::invalid_input("material table must not be empty"));
        }
        Ok(Self { elements })
    }

    pub fn deposit(&self) -> &Element {
        &self.elements[0]
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Element> {
        self.elements.iter()
    }

    /// Find the element whose `mark` matches a grid cell label.
    ///
    /// Grid labels are the element's `mark` verbatim (e.g. `-2`, `-1`); the
    /// label is truncated toward zero before comparison since `grid` cells
    /// are stored as `f64`.
    pub fn by_mark(&self, label: f64) -> Option<&Element> {
        let mark = label.trunc() as i32;
        self.elements.iter().find(|e| e.mark == mark)
    }
}
