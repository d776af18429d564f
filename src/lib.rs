//! Fractal Layers - layered escape-time point clouds
//!
//! - engine: recipe table and per-layer grid evaluation (pure, stateless)
//! - stack: bounded worker pool compositing layers into one buffer
//! - config: YAML scene manifest and .env settings
//! - logging: console + rotating file logs

pub mod config;
pub mod engine;
pub mod logging;
pub mod stack;
