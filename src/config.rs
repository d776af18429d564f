//! Configuration loader - YAML scene manifest + .env settings

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::engine::{EscapeMode, GridRequest, ScaleMode};

/// Main configuration loaded from scenes.yaml
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub scenes: Vec<Scene>,
}

/// A layered fractal stack: one grid per layer along the gamma axis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scene {
    pub id: String,
    pub name: String,
    pub recipe: u32,
    pub grid_size: usize,
    pub layers: u32,
    pub z_min: f64,
    pub dz: f64,
    pub zoom: f64,
    pub escape_radius: f64,
    pub max_iterations: u32,
    #[serde(default)]
    pub offset: [f64; 2],
    #[serde(default)]
    pub scale_mode: ScaleMode,
    /// Fixed Julia constant; `None` sweeps the constant instead
    #[serde(default)]
    pub julia: Option<[f64; 2]>,
    #[serde(default = "default_epsilon")]
    pub epsilon: f64,
    #[serde(default)]
    pub convergence_test: bool,
    #[serde(default)]
    pub escape_mode: EscapeMode,
}

fn default_epsilon() -> f64 {
    1e-6
}

/// Runtime settings loaded from .env / environment
#[derive(Debug, Clone)]
pub struct Settings {
    pub log_dir: String,
    pub output_dir: String,
    pub workers: usize,
}

impl Config {
    /// Load configuration from YAML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let config: Config = serde_yaml::from_str(&content)
            .with_context(|| format!("Invalid scene manifest {}", path.display()))?;
        Ok(config)
    }

    /// Get scene by ID
    pub fn get_scene(&self, id: &str) -> Option<&Scene> {
        self.scenes.iter().find(|s| s.id == id)
    }

    /// Built-in scenes used when no manifest exists
    pub fn builtin() -> Self {
        let base = Scene {
            id: "mandelbrot".to_string(),
            name: "Mandelbrot Stack".to_string(),
            recipe: 0,
            grid_size: 200,
            layers: 32,
            z_min: 1.0,
            dz: 0.01,
            zoom: 3.0,
            escape_radius: 4.0,
            max_iterations: 100,
            offset: [-0.5, 0.0],
            scale_mode: ScaleMode::Multiply,
            julia: None,
            epsilon: default_epsilon(),
            convergence_test: false,
            escape_mode: EscapeMode::Converge,
        };

        let scenes = vec![
            base.clone(),
            Scene {
                id: "burning_ship".to_string(),
                name: "Burning Ship Stack".to_string(),
                recipe: 2,
                offset: [-0.4, -0.5],
                zoom: 3.5,
                ..base.clone()
            },
            Scene {
                id: "phoenix".to_string(),
                name: "Phoenix Stack".to_string(),
                recipe: 6,
                offset: [0.0, 0.0],
                scale_mode: ScaleMode::Divide,
                ..base.clone()
            },
            Scene {
                id: "nova".to_string(),
                name: "Nova Convergence".to_string(),
                recipe: 26,
                offset: [0.0, 0.0],
                zoom: 2.5,
                max_iterations: 60,
                ..base.clone()
            },
            Scene {
                id: "julia_dragon".to_string(),
                name: "Dragon Julia".to_string(),
                recipe: 0,
                offset: [0.0, 0.0],
                julia: Some([-0.8, 0.156]),
                ..base.clone()
            },
            Scene {
                id: "spiral".to_string(),
                name: "Spiral Sweep".to_string(),
                recipe: 13,
                offset: [0.0, 0.0],
                z_min: 0.0,
                dz: 0.05,
                scale_mode: ScaleMode::None,
                ..base
            },
        ];

        Config { scenes }
    }
}

impl Scene {
    /// Grid request for layer `layer_index` of this scene
    pub fn layer_request(&self, layer_index: u32) -> GridRequest {
        let (julia_mode, [julia_re, julia_im]) = match self.julia {
            Some(c) => (true, c),
            None => (false, [0.0, 0.0]),
        };

        GridRequest {
            grid_size: self.grid_size,
            layer_index,
            z_min: self.z_min,
            dz: self.dz,
            zoom: self.zoom,
            escape_radius: self.escape_radius,
            max_iterations: self.max_iterations,
            recipe_id: self.recipe,
            offset: self.offset,
            scale_mode: self.scale_mode,
            julia_mode,
            julia_re,
            julia_im,
            epsilon: self.epsilon,
            convergence_test: self.convergence_test,
            escape_mode: self.escape_mode,
        }
    }

    /// Number of points across all layers, `None` if it overflows
    pub fn total_points(&self) -> Option<usize> {
        self.grid_size
            .checked_mul(self.grid_size)?
            .checked_mul(self.layers as usize)
    }
}

impl Settings {
    /// Load settings from .env file
    pub fn load() -> Self {
        dotenvy::dotenv().ok();

        Settings {
            log_dir: std::env::var("LOG_DIR").unwrap_or_else(|_| "logs".to_string()),
            output_dir: std::env::var("OUTPUT_DIR").unwrap_or_else(|_| "output".to_string()),
            workers: std::env::var("WORKERS")
                .ok()
                .and_then(|s| s.parse().ok())
                .filter(|&n: &usize| n > 0)
                .unwrap_or_else(default_workers),
        }
    }
}

fn default_workers() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(4)
}
