//! WASM bindings for the Zeta Workbench front end.
//!
//! `WasmWorkbench` methods are grouped by panel: calculator and plotting in
//! `workbench`, the convergence panel in `convergence`, and the simulation,
//! verification and download actions in `simulation`.

mod convergence;
mod simulation;
mod workbench;

pub use simulation::verification_summary;
pub use workbench::WasmWorkbench;
