/// The `zeta_core` crate is the computational engine behind the Zeta Workbench front end.
/// Everything here is pure and synchronous; rendering and storage live in the browser.
///
/// Key components:
/// - **Equation Engine**: recursive-descent parser and bytecode VM for calculator expressions.
/// - **Sampler**: grid sampling with finite-difference derivatives for the plot panel.
/// - **Convergence / Sweep**: closed-form contraction factor, parameter bounds and sweeps.
/// - **Simulation / Fixtures / Export**: the cosmetic zero-detection run, its demo data and downloads.
/// - **Preferences / Config / Workbench**: persisted UI state, settings and the state façade.
pub mod config;
pub mod convergence;
pub mod equation_engine;
pub mod error;
pub mod export;
pub mod fixtures;
pub mod history;
pub mod preferences;
pub mod sampler;
pub mod simulation;
pub mod sweep;
pub mod traits;
pub mod workbench;

pub use equation_engine::{evaluate, EvaluationResult};
pub use error::ExpressionError;
pub use workbench::Workbench;
