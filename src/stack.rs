//! Layer Stack - renders every layer of a scene on a bounded worker pool
//!
//! One `GridRequest` per layer is computed on tokio's blocking pool, at most
//! `workers` at a time. Results arrive in any order and are placed by their
//! own `layer_index` into the composite buffer.

use anyhow::{Context, Result};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::{mpsc, Semaphore};

use crate::config::Scene;
use crate::engine::{self, EngineError, GridRequest, GridResult};

/// Multi-layer point cloud: layer k occupies points
/// `k·grid_size² .. (k+1)·grid_size²`
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct LayerStack {
    pub grid_size: usize,
    pub layer_count: u32,
    pub positions: Vec<f32>,
    pub ratios: Vec<f32>,
}

impl LayerStack {
    /// Zeroed stack. `render_stack` checks the buffer sizes before calling this.
    pub fn new(grid_size: usize, layer_count: u32) -> Self {
        let points = grid_size * grid_size * layer_count as usize;
        Self {
            grid_size,
            layer_count,
            positions: vec![0.0; points * 3],
            ratios: vec![0.0; points],
        }
    }

    fn slab_len(&self) -> usize {
        self.grid_size * self.grid_size
    }

    /// Copy one layer's buffers into its slab
    pub fn insert(&mut self, result: &GridResult) -> Result<()> {
        if result.grid_size != self.grid_size {
            anyhow::bail!(
                "Layer {} has grid size {}, stack expects {}",
                result.layer_index,
                result.grid_size,
                self.grid_size
            );
        }
        if result.layer_index >= self.layer_count {
            anyhow::bail!(
                "Layer {} out of range for a stack of {} layers",
                result.layer_index,
                self.layer_count
            );
        }

        let n = self.slab_len();
        if result.ratios.len() != n || result.positions.len() != n * 3 {
            anyhow::bail!("Layer {} has truncated buffers", result.layer_index);
        }

        let start = result.layer_index as usize * n;
        self.ratios[start..start + n].copy_from_slice(&result.ratios);
        self.positions[start * 3..(start + n) * 3].copy_from_slice(&result.positions);
        Ok(())
    }

    /// (positions, ratios) of one layer
    pub fn layer(&self, layer_index: u32) -> Option<(&[f32], &[f32])> {
        if layer_index >= self.layer_count {
            return None;
        }
        let n = self.slab_len();
        let start = layer_index as usize * n;
        Some((
            &self.positions[start * 3..(start + n) * 3],
            &self.ratios[start..start + n],
        ))
    }

    pub fn point_count(&self) -> usize {
        self.ratios.len()
    }
}

/// Render all layers of `scene` with at most `workers` grids in flight
pub async fn render_stack(scene: &Scene, workers: usize) -> Result<LayerStack> {
    if scene.layers == 0 {
        anyhow::bail!("Scene '{}' has no layers", scene.id);
    }
    if scene
        .total_points()
        .and_then(|n| n.checked_mul(3))
        .is_none()
    {
        return Err(EngineError::GridTooLarge(scene.grid_size)).with_context(|| {
            format!("Scene '{}' with {} layers", scene.id, scene.layers)
        });
    }

    let requests: Vec<GridRequest> = (0..scene.layers).map(|k| scene.layer_request(k)).collect();
    for request in &requests {
        request
            .validate()
            .with_context(|| format!("Scene '{}' layer {}", scene.id, request.layer_index))?;
    }

    let workers = workers.max(1);
    tracing::info!(
        "Rendering scene '{}': {} layers of {}x{}, recipe {}, {} workers",
        scene.id,
        scene.layers,
        scene.grid_size,
        scene.grid_size,
        scene.recipe,
        workers
    );
    let started = Instant::now();

    let semaphore = Arc::new(Semaphore::new(workers));
    let (tx, mut rx) = mpsc::channel::<Result<GridResult, EngineError>>(workers);

    let dispatcher = tokio::spawn(async move {
        for request in requests {
            let permit = match semaphore.clone().acquire_owned().await {
                Ok(p) => p,
                Err(_) => break,
            };
            let tx = tx.clone();
            tokio::task::spawn_blocking(move || {
                let result = engine::evaluate(&request);
                // Receiver gone means the stack was abandoned
                if tx.blocking_send(result).is_err() {
                    tracing::debug!("Dropping layer {}: receiver closed", request.layer_index);
                }
                drop(permit);
            });
        }
    });

    let mut stack = LayerStack::new(scene.grid_size, scene.layers);
    let mut received = 0u32;
    while let Some(result) = rx.recv().await {
        let result = result.context("Layer evaluation failed")?;
        stack.insert(&result)?;
        received += 1;
        tracing::debug!(
            "Layer {} done ({}/{})",
            result.layer_index,
            received,
            scene.layers
        );
    }

    dispatcher.await.context("Layer dispatcher panicked")?;

    if received != scene.layers {
        anyhow::bail!(
            "Only {} of {} layers completed for scene '{}'",
            received,
            scene.layers,
            scene.id
        );
    }

    tracing::info!(
        "Scene '{}' rendered: {} points in {:.2?}",
        scene.id,
        stack.point_count(),
        started.elapsed()
    );
    Ok(stack)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{EscapeMode, ScaleMode};

    fn scene() -> Scene {
        Scene {
            id: "test".to_string(),
            name: "Test".to_string(),
            recipe: 0,
            grid_size: 6,
            layers: 5,
            z_min: 1.0,
            dz: 0.05,
            zoom: 3.0,
            escape_radius: 4.0,
            max_iterations: 30,
            offset: [-0.5, 0.0],
            scale_mode: ScaleMode::Multiply,
            julia: None,
            epsilon: 1e-6,
            convergence_test: false,
            escape_mode: EscapeMode::Converge,
        }
    }

    #[tokio::test]
    async fn test_stack_matches_direct_evaluation() {
        let scene = scene();
        let stack = render_stack(&scene, 2).await.unwrap();
        assert_eq!(Some(stack.point_count()), scene.total_points());

        for k in 0..scene.layers {
            let direct = engine::evaluate(&scene.layer_request(k)).unwrap();
            let (positions, ratios) = stack.layer(k).unwrap();
            assert_eq!(positions, direct.positions.as_slice());
            assert_eq!(ratios, direct.ratios.as_slice());
        }
    }

    #[tokio::test]
    async fn test_worker_count_does_not_change_result() {
        let scene = scene();
        let serial = render_stack(&scene, 1).await.unwrap();
        let parallel = render_stack(&scene, 8).await.unwrap();
        assert_eq!(serial, parallel);
    }

    #[tokio::test]
    async fn test_layers_carry_their_gamma() {
        let scene = scene();
        let stack = render_stack(&scene, 0).await.unwrap();
        for k in 0..scene.layers {
            let (positions, _) = stack.layer(k).unwrap();
            let gamma = scene.layer_request(k).gamma() as f32;
            assert!(positions.chunks(3).all(|p| p[2] == gamma));
        }
        assert!(stack.layer(scene.layers).is_none());
    }

    #[tokio::test]
    async fn test_invalid_scene_is_rejected() {
        let mut bad = scene();
        bad.grid_size = 1;
        assert!(render_stack(&bad, 2).await.is_err());

        let mut empty = scene();
        empty.layers = 0;
        assert!(render_stack(&empty, 2).await.is_err());
    }

    #[tokio::test]
    async fn test_oversized_stack_is_rejected() {
        // each layer is addressable on its own, the whole stack is not
        let mut huge = scene();
        huge.grid_size = 1 << 17;
        huge.layers = u32::MAX;
        assert!(huge.layer_request(0).validate().is_ok());

        let err = render_stack(&huge, 2).await.unwrap_err();
        assert_eq!(
            err.downcast_ref::<EngineError>(),
            Some(&EngineError::GridTooLarge(1 << 17))
        );
    }

    #[test]
    fn test_insert_rejects_mismatched_layers() {
        let mut stack = LayerStack::new(2, 2);
        let result = GridResult {
            layer_index: 2,
            grid_size: 2,
            positions: vec![0.0; 12],
            ratios: vec![0.0; 4],
        };
        assert!(stack.insert(&result).is_err());

        let wrong_size = GridResult {
            layer_index: 0,
            grid_size: 3,
            positions: vec![0.0; 27],
            ratios: vec![0.0; 9],
        };
        assert!(stack.insert(&wrong_size).is_err());

        let ok = GridResult {
            layer_index: 1,
            grid_size: 2,
            positions: vec![1.0; 12],
            ratios: vec![0.5; 4],
        };
        stack.insert(&ok).unwrap();
        assert_eq!(&stack.ratios[..4], &[0.0; 4]);
        assert_eq!(&stack.ratios[4..], &[0.5; 4]);
        assert_eq!(&stack.positions[12..], &[1.0; 12]);
    }
}
