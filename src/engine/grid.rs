//! Grid Evaluator - sweeps one square layer of sample points
//!
//! Every point runs the state machine
//! Iterating -> {Escaped, Converged, MaxedOut}
//! and reports `iterations / max_iterations`. Points share nothing, so the
//! sweep order only fixes where results are written.

use serde::{Deserialize, Serialize};

use super::error::EngineError;
use super::numeric::norm_sqr;
use super::recipes::{effective_constant, Recipe, RecipeEntry, RecipeTable, ScaleMode};
use super::ComplexPoint;

/// Termination rule for convergence-tested points
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EscapeMode {
    /// Stop when the new iterate leaves the escape radius
    Diverge,
    /// Stop when the step displacement drops below epsilon
    #[default]
    Converge,
}

/// One evaluation pass over a single layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridRequest {
    pub grid_size: usize,
    pub layer_index: u32,
    pub z_min: f64,
    pub dz: f64,
    pub zoom: f64,
    /// Compared against the squared modulus of the iterate
    pub escape_radius: f64,
    pub max_iterations: u32,
    pub recipe_id: u32,
    #[serde(default)]
    pub offset: [f64; 2],
    #[serde(default)]
    pub scale_mode: ScaleMode,
    #[serde(default)]
    pub julia_mode: bool,
    #[serde(default)]
    pub julia_re: f64,
    #[serde(default)]
    pub julia_im: f64,
    /// Scaled by `zoom` before use
    #[serde(default)]
    pub epsilon: f64,
    #[serde(default)]
    pub convergence_test: bool,
    #[serde(default)]
    pub escape_mode: EscapeMode,
}

impl GridRequest {
    /// Reject configurations the sweep cannot run with. Nothing is clamped.
    pub fn validate(&self) -> Result<(), EngineError> {
        if self.grid_size < 2 {
            return Err(EngineError::InvalidGridSize(self.grid_size));
        }
        if self.max_iterations < 1 {
            return Err(EngineError::InvalidMaxIterations(self.max_iterations));
        }
        if !(self.escape_radius > 0.0 && self.escape_radius.is_finite()) {
            return Err(EngineError::InvalidEscapeRadius(self.escape_radius));
        }
        if !self.zoom.is_finite() {
            return Err(EngineError::InvalidZoom(self.zoom));
        }
        // positions hold three values per point
        if self
            .grid_size
            .checked_mul(self.grid_size)
            .and_then(|n| n.checked_mul(3))
            .is_none()
        {
            return Err(EngineError::GridTooLarge(self.grid_size));
        }
        Ok(())
    }

    /// Position of this layer along the parameter axis
    pub fn gamma(&self) -> f64 {
        self.z_min + self.layer_index as f64 * self.dz
    }

    /// Only meaningful once `validate()` has passed
    pub fn point_count(&self) -> usize {
        self.grid_size * self.grid_size
    }

    /// Swept complex-plane coordinate of grid cell (i, j)
    pub fn sample(&self, i: usize, j: usize) -> ComplexPoint {
        let last = (self.grid_size - 1) as f64;
        let x0 = (i as f64 / last - 0.5) * self.zoom + self.offset[0];
        let y0 = (j as f64 / last - 0.5) * self.zoom + self.offset[1];
        ComplexPoint::new(x0, y0)
    }
}

/// Flat buffers for one layer, ready to be placed at
/// `layer_index × grid_size²` in a multi-layer buffer
#[derive(Debug, Clone, PartialEq)]
pub struct GridResult {
    pub layer_index: u32,
    pub grid_size: usize,
    /// (x0, y0, gamma) per point
    pub positions: Vec<f32>,
    /// iterations / max_iterations per point
    pub ratios: Vec<f32>,
}

/// Terminal state of one grid point, with the iterations it used
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointOutcome {
    Escaped(u32),
    Converged(u32),
    MaxedOut(u32),
}

impl PointOutcome {
    pub fn iterations(self) -> u32 {
        match self {
            PointOutcome::Escaped(n) | PointOutcome::Converged(n) | PointOutcome::MaxedOut(n) => n,
        }
    }

    pub fn ratio(self, max_iterations: u32) -> f64 {
        self.iterations() as f64 / max_iterations as f64
    }
}

/// Terminal state counts for one sweep
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GridStats {
    pub escaped: usize,
    pub converged: usize,
    pub maxed_out: usize,
}

impl GridStats {
    fn record(&mut self, outcome: PointOutcome) {
        match outcome {
            PointOutcome::Escaped(_) => self.escaped += 1,
            PointOutcome::Converged(_) => self.converged += 1,
            PointOutcome::MaxedOut(_) => self.maxed_out += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.escaped + self.converged + self.maxed_out
    }
}

/// Per-request values hoisted out of the point loop
struct Sweep<'a> {
    request: &'a GridRequest,
    entry: &'a RecipeEntry,
    gamma: f64,
    escape_radius: f64,
    epsilon: f64,
    convergence_tested: bool,
    julia: ComplexPoint,
}

impl<'a> Sweep<'a> {
    fn new(request: &'a GridRequest) -> Self {
        let entry = RecipeTable::global().lookup(request.recipe_id);
        Self {
            request,
            entry,
            gamma: request.gamma(),
            escape_radius: request.escape_radius,
            epsilon: request.epsilon * request.zoom,
            convergence_tested: entry.recipe.is_convergent() || request.convergence_test,
            julia: ComplexPoint::new(request.julia_re, request.julia_im),
        }
    }

    fn run(&self, sample: ComplexPoint) -> PointOutcome {
        let request = self.request;
        let recipe: &Recipe = &self.entry.recipe;

        // Julia mode: fixed constant, the swept coordinate seeds z.
        let (c, mut z) = if request.julia_mode {
            (self.julia, sample)
        } else {
            (sample, self.entry.seed.initial(sample))
        };
        let mut z_prev = ComplexPoint::new(0.0, 0.0);

        let mut n = 0;
        while n < request.max_iterations {
            if !self.convergence_tested && norm_sqr(z) > self.escape_radius {
                return PointOutcome::Escaped(n);
            }

            let cc = effective_constant(c, self.gamma, n, request.scale_mode);
            let (next, memory) = recipe.step(z, z_prev, cc, self.gamma, n);
            // displacement is measured from the iterate the step started at
            let origin = recipe.step_origin(z, cc, n);

            if self.convergence_tested {
                match request.escape_mode {
                    EscapeMode::Diverge => {
                        if norm_sqr(next) > self.escape_radius {
                            return PointOutcome::Escaped(n + 1);
                        }
                    }
                    EscapeMode::Converge => {
                        if norm_sqr(next - origin) < self.epsilon {
                            return PointOutcome::Converged(n + 1);
                        }
                    }
                }
            }

            z = next;
            z_prev = memory;
            n += 1;
        }

        PointOutcome::MaxedOut(n)
    }

    /// Row-major sweep into buffers of already checked length
    fn fill(&self, positions: &mut [f32], ratios: &mut [f32]) -> GridStats {
        let request = self.request;
        let gamma = self.gamma as f32;
        let n = request.grid_size;
        let mut stats = GridStats::default();

        for i in 0..n {
            for j in 0..n {
                let idx = i * n + j;
                let sample = request.sample(i, j);
                let outcome = self.run(sample);

                positions[idx * 3] = sample.re as f32;
                positions[idx * 3 + 1] = sample.im as f32;
                positions[idx * 3 + 2] = gamma;
                ratios[idx] = outcome.ratio(request.max_iterations) as f32;
                stats.record(outcome);
            }
        }

        tracing::debug!(
            layer = request.layer_index,
            recipe = self.entry.name,
            escaped = stats.escaped,
            converged = stats.converged,
            maxed_out = stats.maxed_out,
            "Grid evaluated"
        );

        stats
    }
}

/// Run the termination state machine for a single sample of `request`
pub fn iterate_point(request: &GridRequest, sample: ComplexPoint) -> PointOutcome {
    Sweep::new(request).run(sample)
}

/// Fill caller-owned buffers for one layer.
///
/// `positions` must hold `3·grid_size²` values and `ratios` `grid_size²`.
/// Cell (i, j) is written at `i·grid_size + j`.
pub fn evaluate_into(
    request: &GridRequest,
    positions: &mut [f32],
    ratios: &mut [f32],
) -> Result<GridStats, EngineError> {
    request.validate()?;

    let count = request.point_count();
    if positions.len() != count * 3 {
        return Err(EngineError::BufferLength {
            buffer: "positions",
            expected: count * 3,
            actual: positions.len(),
        });
    }
    if ratios.len() != count {
        return Err(EngineError::BufferLength {
            buffer: "ratios",
            expected: count,
            actual: ratios.len(),
        });
    }

    Ok(Sweep::new(request).fill(positions, ratios))
}

/// Allocate buffers and evaluate one layer
pub fn evaluate(request: &GridRequest) -> Result<GridResult, EngineError> {
    request.validate()?;

    let count = request.point_count();
    let mut positions = vec![0.0f32; count * 3];
    let mut ratios = vec![0.0f32; count];
    let sweep = Sweep::new(request);
    sweep.fill(&mut positions, &mut ratios);

    Ok(GridResult {
        layer_index: request.layer_index,
        grid_size: request.grid_size,
        positions,
        ratios,
    })
}
