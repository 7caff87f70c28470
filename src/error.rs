//! Error types for the electron-scattering core

use thiserror::Error;

/// Result type alias for the electron-scattering core
pub type Result<T> = std::result::Result<T, Error>;

/// State captured at the point an error was raised, for diagnosis by the
/// calling configuration (grid authoring, physics parameters).
#[derive(Debug, Clone)]
pub struct FailureContext {
    /// Index of the incident electron (beam entry) being traced.
    pub electron_index: usize,
    /// Last recorded point before the failure, if any was recorded yet.
    pub last_point: Option<[f64; 3]>,
    /// Last recorded energy before the failure, if any was recorded yet.
    pub last_energy: Option<f64>,
}

impl FailureContext {
    pub fn new(electron_index: usize) -> Self {
        Self {
            electron_index,
            last_point: None,
            last_energy: None,
        }
    }

    pub fn with_state(electron_index: usize, last_point: [f64; 3], last_energy: f64) -> Self {
        Self {
            electron_index,
            last_point: Some(last_point),
            last_energy: Some(last_energy),
        }
    }
}

impl std::fmt::Display for FailureContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "electron #{}", self.electron_index)?;
        if let (Some(p), Some(e)) = (self.last_point, self.last_energy) {
            write!(
                f,
                " (last point [{:.6}, {:.6}, {:.6}], last energy {:.6} keV)",
                p[0], p[1], p[2], e
            )?;
        }
        Ok(())
    }
}

/// Main error type for the electron-scattering core
#[derive(Error, Debug)]
pub enum Error {
    /// Shape mismatch, non-positive cell_dim, empty material table, invalid
    /// energy bounds, or an entry coordinate outside the volume.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// NaN propagated out of angle sampling or direction update, or energy
    /// went negative. Carries the offending electron's last valid state.
    #[error("physics invariant broken for {ctx}: {reason}")]
    PhysicsInvariantBroken { reason: String, ctx: FailureContext },

    /// The solid-crossing DDA hit a voxel whose grid label has no matching
    /// material `mark` in the material table.
    #[error("grid inconsistency for {ctx}: {reason}")]
    GridConsistencyError { reason: String, ctx: FailureContext },
}

impl Error {
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    pub fn physics_invariant_broken(reason: impl Into<String>, ctx: FailureContext) -> Self {
        Self::PhysicsInvariantBroken {
            reason: reason.into(),
            ctx,
        }
    }

    pub fn grid_consistency(reason: impl Into<String>, ctx: FailureContext) -> Self {
        Self::GridConsistencyError {
            reason: reason.into(),
            ctx,
        }
    }
}
