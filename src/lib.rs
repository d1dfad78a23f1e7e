//! # Schematic Viewer
//!
//! A Rust library for turning Minecraft schematics into 3D scenes.
//!
//! ## Overview
//!
//! A Sponge schematic is decoded into a block grid; every block is resolved
//! into a model by walking its parent chain in a resource pack, oriented from
//! its block state, and placed into a [`Scene`] with a ground grid and an orbit
//! camera. Scenes can be exported to GLB.
//!
//! ## Quick Start
//!
//! ```ignore
//! use schematic_viewer::{export_glb, render_schematic, AssetBase, ViewerConfig};
//!
//! let config = ViewerConfig::default()
//!     .with_asset_base(AssetBase::parse("path/to/pack.zip"));
//! let scene = render_schematic(&std::fs::read("house.schem")?, &config)?;
//! let glb_bytes = export_glb(&scene)?;
//! ```
//!
//! ## Incremental rendering
//!
//! For a display loop that draws blocks as they resolve, drive the pipeline
//! directly and poll it each frame:
//!
//! ```ignore
//! let pass = pipeline::start(grid, resolver, config.workers)?;
//! while !pass.is_complete() {
//!     while let Some(event) = pass.try_next() {
//!         scene.accept(event);
//!     }
//!     draw(&scene);
//! }
//! ```

pub mod assets;
pub mod config;
pub mod error;
pub mod export;
pub mod model;
pub mod pipeline;
pub mod placement;
pub mod scene;
pub mod schematic;
pub mod types;

#[cfg(test)]
mod test_support;

// Re-export main types for convenience
pub use assets::{AssetSource, DirectorySource, MemorySource, ZipSource};
pub use config::{AssetBase, ViewerConfig};
pub use error::{AssetError, ResolveError, Result, TextureError, ViewerError};
pub use export::gltf::export_glb;
pub use model::{ModelResolver, ResolvedMesh};
pub use pipeline::{PlacementEvent, RenderPass, RenderReport, SceneEvent};
pub use placement::{place, Transform};
pub use scene::Scene;
pub use schematic::{BlockGrid, StructureDocument};
pub use types::{BlockDescriptor, BlockPosition, BlockProperties, Direction, ResourceLocation};

use std::sync::Arc;

/// Decode a schematic and resolve it into a scene using the configured assets.
pub fn render_schematic(bytes: &[u8], config: &ViewerConfig) -> Result<Scene> {
    let source = config.open_source()?;
    render_schematic_with_source(bytes, source, config)
}

/// Decode a schematic and resolve it into a scene using `source` for assets.
///
/// Only an undecodable schematic fails; blocks without a model are skipped and
/// listed in the scene's report.
pub fn render_schematic_with_source(
    bytes: &[u8],
    source: Arc<dyn AssetSource>,
    config: &ViewerConfig,
) -> Result<Scene> {
    let document = schematic::decode(bytes)?;
    let grid = Arc::new(BlockGrid::build(&document));
    let resolver = Arc::new(ModelResolver::new(source, config));

    let mut scene = Scene::for_grid(&grid);
    let pass = pipeline::start(Arc::clone(&grid), resolver, config.workers)?;
    for event in pass {
        scene.accept(event);
    }

    scene.report().log_summary();
    Ok(scene)
}
