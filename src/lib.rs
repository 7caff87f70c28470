//! febid-electron-mc: Monte Carlo electron-scattering core
//!
//! Traces primary-electron trajectories through a voxelized FEBID workpiece:
//! screened-Rutherford elastic scattering, Bethe continuous-slowing-down
//! energy loss, and a grid-aligned DDA that detects surface and solid-voxel
//! crossings. See [`simulate::simulate`] for the entry point.
//!
//! Everything above this kernel — the diffusion/heat PDE solvers, deposit
//! book-keeping, CLI, and GUI of the surrounding FEBID simulator — is out of
//! scope; this crate communicates with that host purely through in-memory
//! arrays (and, with the `python` feature, `numpy` arrays handed to Python
//! by ownership transfer).

pub mod config;
pub mod driver;
pub mod electron;
pub mod error;
pub mod geometry;
pub mod grid;
pub mod material;
pub mod physics;
pub mod rng;
pub mod simulate;
pub mod traversal;
pub mod trajectory;

#[cfg(feature = "python")]
mod ffi;

pub use error::{Error, Result};
pub use grid::GridSnapshot;
pub use material::{Element, MaterialTable};
pub use simulate::simulate;
pub use trajectory::TrajectoryRecord;

/// Version of the electron-scattering core.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Install a compact `tracing` subscriber reading `RUST_LOG` for the level
/// filter. Hosts embedding this crate as a library are free to install
/// their own subscriber instead; this is a convenience for the CLI/FFI
/// entry points and for examples.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_target(false)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .compact()
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
