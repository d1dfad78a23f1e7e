//! Schematic Viewer CLI
//!
//! Render Minecraft schematics to GLB and inspect their contents.

use clap::{Parser, Subcommand};
use schematic_viewer::{
    export_glb, place, render_schematic, schematic, AssetBase, BlockDescriptor, BlockGrid,
    BlockPosition, ModelResolver, PlacementEvent, Scene, SceneEvent, ViewerConfig,
};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

#[derive(Parser)]
#[command(name = "schematic-viewer")]
#[command(author, version, about = "Render Minecraft schematics to 3D scenes", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render a schematic to a GLB file
    Render {
        /// Input schematic (.schem)
        input: PathBuf,

        /// Output file path (defaults to the input name with .glb)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Asset base: URL, resource pack ZIP, or directory
        #[arg(short, long, env = "SCHEMATIC_VIEWER_ASSETS")]
        assets: Option<String>,

        /// Number of resolver threads
        #[arg(short, long)]
        workers: Option<usize>,

        /// HTTP request timeout in seconds
        #[arg(long)]
        timeout: Option<u64>,
    },

    /// Show dimensions and block counts of a schematic
    Inspect {
        /// Input schematic (.schem)
        input: PathBuf,
    },

    /// Resolve a single block (useful for testing asset packs)
    Block {
        /// Block key (e.g., "minecraft:oak_stairs[facing=north,half=top]")
        block: String,

        /// Asset base: URL, resource pack ZIP, or directory
        #[arg(short, long, env = "SCHEMATIC_VIEWER_ASSETS")]
        assets: Option<String>,

        /// Also export the block as GLB
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// HTTP request timeout in seconds
        #[arg(long)]
        timeout: Option<u64>,
    },
}

fn build_config(assets: Option<String>, workers: Option<usize>, timeout: Option<u64>) -> ViewerConfig {
    let mut config = ViewerConfig::default();
    if let Some(base) = assets {
        config = config.with_asset_base(AssetBase::parse(&base));
    }
    if let Some(workers) = workers {
        config = config.with_workers(workers);
    }
    if let Some(seconds) = timeout {
        config = config.with_request_timeout(Duration::from_secs(seconds));
    }
    config
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Render {
            input,
            output,
            assets,
            workers,
            timeout,
        } => {
            let config = build_config(assets, workers, timeout);
            let output = output.unwrap_or_else(|| input.with_extension("glb"));
            render(&input, &output, &config)?;
        }
        Commands::Inspect { input } => {
            inspect(&input)?;
        }
        Commands::Block {
            block,
            assets,
            output,
            timeout,
        } => {
            let config = build_config(assets, None, timeout);
            resolve_block(&block, &config, output.as_deref())?;
        }
    }

    Ok(())
}

fn render(input: &Path, output: &Path, config: &ViewerConfig) -> Result<(), Box<dyn std::error::Error>> {
    println!("Rendering {} with assets from {}", input.display(), config.asset_base);

    let bytes = fs::read(input)?;
    let scene = render_schematic(&bytes, config)?;

    let (width, height, length) = scene.dimensions();
    let report = scene.report();
    println!("Structure: {}x{}x{}", width, height, length);
    println!("  Placed: {} blocks", report.placed);
    println!("  Skipped: {} blocks", report.skipped.len());
    for ((block, reason), count) in report.skipped_by_reason() {
        println!("    {} x{}: {}", block, count, reason);
    }
    if !report.palette_misses.is_empty() {
        println!("  Unknown palette values: {} voxels", report.palette_misses.count);
    }

    let glb = export_glb(&scene)?;
    fs::write(output, glb)?;
    println!("Exported to {}", output.display());

    Ok(())
}

fn inspect(input: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let bytes = fs::read(input)?;
    let document = schematic::decode(&bytes)?;
    let grid = BlockGrid::build(&document);

    println!("Schematic: {}", input.display());
    println!("  Sponge version: {}", document.version);
    println!("  Size: {}x{}x{}", document.width, document.height, document.length);
    println!("  Palette entries: {}", document.palette.len());

    let counts = grid.block_counts();
    let total: usize = counts.values().sum();
    println!("  Non-air blocks: {}", total);

    let mut by_count: Vec<_> = counts.into_iter().collect();
    by_count.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    for (name, count) in by_count {
        println!("    {:>6}  {}", count, name);
    }

    let misses = grid.palette_misses();
    if !misses.is_empty() {
        println!(
            "  Unknown palette values: {:?} ({} voxels)",
            misses.values, misses.count
        );
    }

    Ok(())
}

fn resolve_block(
    key: &str,
    config: &ViewerConfig,
    output: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let block = Arc::new(BlockDescriptor::parse(key));
    let resolver = ModelResolver::new(config.open_source()?, config);
    let mesh = resolver.resolve(&block)?;

    println!("Block: {}", block);
    println!("  Model: {}", mesh.model);
    println!("  Cuboids: {}", mesh.cuboids.len());
    for (i, cuboid) in mesh.cuboids.iter().enumerate() {
        let textured = cuboid.faces.iter().filter(|face| !face.is_blank()).count();
        println!(
            "    [{}] size {:?} center {:?}, {} textured faces",
            i,
            cuboid.size.to_array(),
            cuboid.center.to_array(),
            textured
        );
    }
    for issue in &mesh.texture_issues {
        println!("  Texture issue: {}", issue);
    }

    let position = BlockPosition::new(0, 0, 0);
    let transform = place(position, &block.properties);
    println!(
        "  Rotation: {:?}, translation: {:?}",
        transform.rotation.to_array(),
        transform.translation.to_array()
    );

    if let Some(output) = output {
        let mut scene = Scene::new(1, 1, 1);
        scene.accept(SceneEvent::Placed(PlacementEvent {
            position,
            block,
            mesh,
            transform,
        }));
        fs::write(output, export_glb(&scene)?)?;
        println!("Exported to {}", output.display());
    }

    Ok(())
}
