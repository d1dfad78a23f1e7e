//! Shared fixtures for in-crate tests.

use crate::assets::{png_bytes, MemorySource};
use std::sync::Arc;

pub const STONE: &str = "block/stone";
pub const GRASS_TOP: &str = "block/grass_top";

/// `block/block` → `block/cube` → `block/cube_all` → `block/stone`, with a
/// 16x16 grey stone texture.
pub fn stone_assets() -> Arc<MemorySource> {
    let source = Arc::new(MemorySource::new());
    source.insert_model(
        "block/block",
        r#"{
            "gui_light": "side",
            "display": {
                "gui": { "rotation": [30, 225, 0], "translation": [0, 0, 0], "scale": [0.625, 0.625, 0.625] },
                "ground": { "rotation": [0, 0, 0], "translation": [0, 3, 0], "scale": [0.25, 0.25, 0.25] }
            }
        }"#,
    );
    source.insert_model(
        "block/cube",
        r##"{
            "parent": "block/block",
            "elements": [
                {
                    "from": [0, 0, 0],
                    "to": [16, 16, 16],
                    "faces": {
                        "down":  { "texture": "#down", "cullface": "down" },
                        "up":    { "texture": "#up", "cullface": "up" },
                        "north": { "texture": "#north", "cullface": "north" },
                        "south": { "texture": "#south", "cullface": "south" },
                        "west":  { "texture": "#west", "cullface": "west" },
                        "east":  { "texture": "#east", "cullface": "east" }
                    }
                }
            ]
        }"##,
    );
    source.insert_model(
        "block/cube_all",
        r##"{
            "parent": "block/cube",
            "textures": {
                "particle": "#all",
                "down": "#all",
                "up": "#all",
                "north": "#all",
                "east": "#all",
                "south": "#all",
                "west": "#all"
            }
        }"##,
    );
    source.insert_model(
        STONE,
        r#"{ "parent": "minecraft:block/cube_all", "textures": { "all": "minecraft:block/stone" } }"#,
    );
    source.insert_texture(STONE, png_bytes(16, 16, [125, 125, 125, 255]));
    source
}
