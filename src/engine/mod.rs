//! Fractal Kernel Evaluator - pure host-side numeric engine
//!
//! Computes escape-time / convergence iteration ratios for one 2-D grid
//! slice of a layered fractal point cloud:
//! - numeric: polar powers, guarded reciprocals and divisions
//! - recipes: the recipe table and per-step variant dispatch
//! - grid: the per-point termination state machine and grid sweep
//!
//! Nothing here holds state between calls, so grids for different layers
//! can be evaluated concurrently without coordination.

pub mod error;
pub mod grid;
pub mod numeric;
pub mod recipes;

pub use error::EngineError;
pub use grid::{
    evaluate, evaluate_into, iterate_point, EscapeMode, GridRequest, GridResult, GridStats,
    PointOutcome,
};
pub use recipes::{effective_constant, step, Recipe, RecipeEntry, RecipeTable, ScaleMode, Seed};

/// Complex value used for iterates, constants and the one-step memory.
pub type ComplexPoint = num_complex::Complex64;
