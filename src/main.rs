//! Fractal Layers - CLI
//!
//! CLI commands:
//! - render: Compute every layer of a scene and write the point cloud
//! - point: Evaluate a single sample and print its outcome
//! - recipes: List the recipe table
//! - scenes: List configured scenes

use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

use fractal_layers::config::{self, Config, Scene};
use fractal_layers::engine::{self, ComplexPoint, EscapeMode, GridRequest, RecipeTable, ScaleMode};
use fractal_layers::{logging, stack};

#[derive(Parser)]
#[command(name = "fractal_layers")]
#[command(about = "Layered escape-time fractal point clouds")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to scenes.yaml config
    #[arg(short, long, default_value = "scenes.yaml")]
    config: PathBuf,
}

#[derive(Subcommand)]
enum Commands {
    /// Render all layers of a scene to JSON
    Render {
        /// Scene ID from the manifest
        #[arg(short, long)]
        scene: String,

        /// Output file (default: <OUTPUT_DIR>/<scene>.json)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Layers computed concurrently
        #[arg(short, long)]
        workers: Option<usize>,
    },

    /// Evaluate one sample point
    Point {
        /// Recipe ID (unknown IDs use Mandelbrot)
        #[arg(short, long, default_value = "0")]
        recipe: u32,

        /// Real part of the sample
        #[arg(long, allow_hyphen_values = true)]
        re: f64,

        /// Imaginary part of the sample
        #[arg(long, allow_hyphen_values = true)]
        im: f64,

        /// Layer gamma
        #[arg(long, default_value = "1.0", allow_hyphen_values = true)]
        gamma: f64,

        /// Constant scaling: 0 none, 1 multiply, 2 divide
        #[arg(long, default_value = "0")]
        scale_mode: u8,

        #[arg(long, default_value = "100")]
        max_iterations: u32,

        /// Bound on the squared modulus
        #[arg(long, default_value = "4.0")]
        escape_radius: f64,

        /// Fixed Julia constant as "re,im"
        #[arg(long, allow_hyphen_values = true)]
        julia: Option<String>,

        /// Convergence epsilon (absolute)
        #[arg(long, default_value = "1e-6")]
        epsilon: f64,

        /// Force the convergence test for any recipe
        #[arg(long)]
        convergence_test: bool,

        /// Convergence-tested points stop on escape instead of settling
        #[arg(long)]
        diverge: bool,
    },

    /// List the recipe table
    Recipes,

    /// List configured scenes
    Scenes,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = config::Settings::load();
    logging::init_logging(&settings.log_dir)?;
    tracing::info!("Fractal Layers starting up");

    let cli = Cli::parse();
    tracing::debug!("CLI args parsed: config={:?}", cli.config);

    let config = if cli.config.exists() {
        tracing::info!("Loading config from {:?}", cli.config);
        Config::load(&cli.config)?
    } else {
        tracing::warn!("Config file not found: {:?}, using built-in scenes", cli.config);
        Config::builtin()
    };
    tracing::info!("Config loaded: {} scenes", config.scenes.len());

    match cli.command {
        Commands::Render {
            scene,
            output,
            workers,
        } => {
            let scene = config
                .get_scene(&scene)
                .ok_or_else(|| anyhow::anyhow!("Scene not found: {}", scene))?;
            let output = output.unwrap_or_else(|| {
                PathBuf::from(&settings.output_dir).join(format!("{}.json", scene.id))
            });
            render(scene, &output, workers.unwrap_or(settings.workers)).await?;
        }

        Commands::Point {
            recipe,
            re,
            im,
            gamma,
            scale_mode,
            max_iterations,
            escape_radius,
            julia,
            epsilon,
            convergence_test,
            diverge,
        } => {
            let scale_mode = ScaleMode::try_from(scale_mode)
                .map_err(|code| anyhow::anyhow!("Unknown scale mode {}", code))?;
            let julia = julia.as_deref().map(parse_pair).transpose()?;
            let (julia_re, julia_im) = julia.unwrap_or((0.0, 0.0));

            let request = GridRequest {
                grid_size: 2,
                layer_index: 0,
                z_min: gamma,
                dz: 0.0,
                zoom: 1.0,
                escape_radius,
                max_iterations,
                recipe_id: recipe,
                offset: [0.0, 0.0],
                scale_mode,
                julia_mode: julia.is_some(),
                julia_re,
                julia_im,
                epsilon,
                convergence_test,
                escape_mode: if diverge {
                    EscapeMode::Diverge
                } else {
                    EscapeMode::Converge
                },
            };
            request.validate()?;

            let entry = RecipeTable::global().lookup(recipe);
            let outcome = engine::iterate_point(&request, ComplexPoint::new(re, im));
            println!("Recipe: {} [{}]", entry.name, entry.id);
            println!("Sample: ({}, {})", re, im);
            println!("Outcome: {:?}", outcome);
            println!("Ratio: {:.6}", outcome.ratio(max_iterations));
        }

        Commands::Recipes => list_recipes(),

        Commands::Scenes => list_scenes(&config),
    }

    Ok(())
}

/// JSON written by `render`: scene metadata plus the flattened layer stack
#[derive(serde::Serialize)]
struct RenderOutput<'a> {
    id: &'a str,
    name: &'a str,
    recipe: u32,
    recipe_name: &'a str,
    generated: String,
    #[serde(flatten)]
    layers: &'a stack::LayerStack,
}

/// Render a scene and write it as JSON
async fn render(scene: &Scene, output: &Path, workers: usize) -> anyhow::Result<()> {
    let layers = stack::render_stack(scene, workers).await?;

    if let Some(parent) = output.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let recipe = RecipeTable::global().lookup(scene.recipe);
    let data = RenderOutput {
        id: &scene.id,
        name: &scene.name,
        recipe: recipe.id,
        recipe_name: recipe.name,
        generated: chrono::Local::now().to_rfc3339(),
        layers: &layers,
    };

    std::fs::write(output, serde_json::to_string(&data)?)
        .with_context(|| format!("Failed to write {}", output.display()))?;
    println!(
        "  {} -> {} ({} points)",
        scene.name,
        output.display(),
        layers.point_count()
    );
    Ok(())
}

/// Parse "re,im"
fn parse_pair(s: &str) -> anyhow::Result<(f64, f64)> {
    let (re, im) = s
        .split_once(',')
        .ok_or_else(|| anyhow::anyhow!("Expected \"re,im\", got '{}'", s))?;
    Ok((re.trim().parse()?, im.trim().parse()?))
}

fn list_recipes() {
    let table = RecipeTable::global();
    println!("Recipes ({}):", table.entries().len());
    println!();
    for entry in table.entries() {
        let family = if entry.recipe.is_convergent() {
            " (convergent)"
        } else {
            ""
        };
        println!(
            "  {:>2}  {:<26} seed={:?}{}",
            entry.id, entry.name, entry.seed, family
        );
    }
}

fn list_scenes(config: &Config) {
    println!("Available scenes ({}):", config.scenes.len());
    println!();
    for scene in &config.scenes {
        let recipe = RecipeTable::global().lookup(scene.recipe);
        println!(
            "  - {} [{}] {} | {} layers of {}x{}",
            scene.name, scene.id, recipe.name, scene.layers, scene.grid_size, scene.grid_size
        );
    }
}
