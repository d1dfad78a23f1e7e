//! Dense block grid built from a decoded schematic.

use super::StructureDocument;
use crate::types::{BlockDescriptor, BlockPosition};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::Arc;

/// One voxel of the grid.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Air,
    Block(Arc<BlockDescriptor>),
}

impl Cell {
    pub fn block(&self) -> Option<&Arc<BlockDescriptor>> {
        match self {
            Cell::Air => None,
            Cell::Block(block) => Some(block),
        }
    }

    pub fn is_air(&self) -> bool {
        matches!(self, Cell::Air)
    }
}

/// Block data values that had no palette entry.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PaletteMisses {
    /// Number of voxels treated as air because of a miss.
    pub count: usize,
    /// The distinct values that missed.
    pub values: BTreeSet<i32>,
}

impl PaletteMisses {
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }
}

/// A read-only `[y][x][z]` grid of blocks.
#[derive(Debug, Clone)]
pub struct BlockGrid {
    width: usize,
    height: usize,
    length: usize,
    cells: Vec<Cell>,
    misses: PaletteMisses,
}

impl BlockGrid {
    /// Build the grid from a decoded document.
    ///
    /// Palette lookup is by value; when several keys share a value the first
    /// in declaration order wins. Unknown values become air and are counted.
    pub fn build(doc: &StructureDocument) -> Self {
        let mut by_value: HashMap<i32, Cell> = HashMap::new();
        for (key, value) in &doc.palette {
            by_value.entry(*value).or_insert_with(|| {
                let block = BlockDescriptor::parse(key);
                if block.is_air() {
                    Cell::Air
                } else {
                    Cell::Block(Arc::new(block))
                }
            });
        }

        let (width, height, length) = (doc.width, doc.height, doc.length);
        let mut cells = vec![Cell::Air; doc.volume()];
        let mut misses = PaletteMisses::default();

        for (i, value) in doc.block_data.iter().enumerate().take(doc.volume()) {
            let x = i % width;
            let z = (i / width) % length;
            let y = i / (width * length);

            match by_value.get(value) {
                Some(cell) => cells[(y * width + x) * length + z] = cell.clone(),
                None => {
                    misses.count += 1;
                    misses.values.insert(*value);
                }
            }
        }

        if !misses.is_empty() {
            log::warn!(
                "Failed to get block data for {} voxels (palette values {:?}), treating as air",
                misses.count,
                misses.values
            );
        }

        Self {
            width,
            height,
            length,
            cells,
            misses,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn length(&self) -> usize {
        self.length
    }

    /// Total number of cells.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn palette_misses(&self) -> &PaletteMisses {
        &self.misses
    }

    /// Get the cell at a position, `None` when out of bounds.
    pub fn get(&self, x: usize, y: usize, z: usize) -> Option<&Cell> {
        if x >= self.width || y >= self.height || z >= self.length {
            return None;
        }
        self.cells.get((y * self.width + x) * self.length + z)
    }

    /// Index of a position in the schematic's flat block data.
    pub fn flat_index(&self, x: usize, y: usize, z: usize) -> usize {
        x + z * self.width + y * self.width * self.length
    }

    /// Iterate over all cells in `[y][x][z]` order.
    pub fn iter(&self) -> impl Iterator<Item = (BlockPosition, &Cell)> + '_ {
        let (width, length) = (self.width, self.length);
        self.cells.iter().enumerate().map(move |(i, cell)| {
            let z = i % length;
            let x = (i / length) % width;
            let y = i / (length * width);
            (BlockPosition::new(x as i32, y as i32, z as i32), cell)
        })
    }

    /// Iterate over all non-air blocks.
    pub fn iter_blocks(&self) -> impl Iterator<Item = (BlockPosition, &Arc<BlockDescriptor>)> + '_ {
        self.iter()
            .filter_map(|(pos, cell)| cell.block().map(|block| (pos, block)))
    }

    /// Count of non-air blocks by name.
    pub fn block_counts(&self) -> BTreeMap<String, usize> {
        let mut counts = BTreeMap::new();
        for (_, block) in self.iter_blocks() {
            *counts.entry(block.name.clone()).or_insert(0) += 1;
        }
        counts
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indexmap::IndexMap;

    fn document(dims: [usize; 3], palette: &[(&str, i32)], block_data: Vec<i32>) -> StructureDocument {
        StructureDocument {
            version: 2,
            width: dims[0],
            height: dims[1],
            length: dims[2],
            palette: palette
                .iter()
                .map(|(k, v)| (k.to_string(), *v))
                .collect::<IndexMap<_, _>>(),
            block_data,
        }
    }

    #[test]
    fn test_grid_size_and_index_bijection() {
        let (w, h, l) = (3, 4, 5);
        let volume = w * h * l;
        let palette: Vec<(String, i32)> = (0..volume as i32)
            .map(|i| (format!("minecraft:b{}", i), i))
            .collect();
        let palette_refs: Vec<(&str, i32)> = palette.iter().map(|(k, v)| (k.as_str(), *v)).collect();
        let doc = document([w, h, l], &palette_refs, (0..volume as i32).collect());

        let grid = BlockGrid::build(&doc);
        assert_eq!(grid.len(), volume);
        assert_eq!(grid.iter().count(), volume);

        let mut seen = std::collections::HashSet::new();
        for (pos, cell) in grid.iter() {
            let (x, y, z) = (pos.x as usize, pos.y as usize, pos.z as usize);
            let index = grid.flat_index(x, y, z);
            assert!(seen.insert(index));
            // Each voxel's block name encodes its own flat index.
            let block = cell.block().unwrap();
            assert_eq!(block.name, format!("minecraft:b{}", index));
        }
        assert_eq!(seen.len(), volume);
    }

    #[test]
    fn test_storage_order_x_then_z_then_y() {
        let doc = document(
            [2, 2, 2],
            &[("minecraft:air", 0), ("minecraft:stone", 1)],
            vec![0, 1, 0, 0, 0, 0, 0, 0],
        );
        let grid = BlockGrid::build(&doc);
        assert!(grid.get(1, 0, 0).unwrap().block().is_some());
        assert!(grid.get(0, 0, 1).unwrap().is_air());
        assert!(grid.get(2, 0, 0).is_none());
    }

    #[test]
    fn test_duplicate_palette_value_first_match_wins() {
        let doc = document(
            [1, 1, 1],
            &[("minecraft:granite", 1), ("minecraft:diorite", 1)],
            vec![1],
        );
        let grid = BlockGrid::build(&doc);
        let block = grid.get(0, 0, 0).unwrap().block().unwrap();
        assert_eq!(block.name, "minecraft:granite");
    }

    #[test]
    fn test_palette_miss_becomes_air() {
        let doc = document([3, 1, 1], &[("minecraft:stone", 0)], vec![0, 7, 7]);
        let grid = BlockGrid::build(&doc);

        assert!(grid.get(1, 0, 0).unwrap().is_air());
        assert!(grid.get(2, 0, 0).unwrap().is_air());
        assert_eq!(grid.palette_misses().count, 2);
        assert_eq!(grid.palette_misses().values.iter().copied().collect::<Vec<_>>(), vec![7]);
    }

    #[test]
    fn test_single_stone_block() {
        let doc = document(
            [1, 1, 1],
            &[("minecraft:air", 0), ("minecraft:stone[]", 1)],
            vec![1],
        );
        let grid = BlockGrid::build(&doc);

        let blocks: Vec<_> = grid.iter_blocks().collect();
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].0, BlockPosition::new(0, 0, 0));
        assert_eq!(blocks[0].1.name, "minecraft:stone");
        assert!(grid.palette_misses().is_empty());
    }

    #[test]
    fn test_block_counts_and_shared_descriptors() {
        let doc = document(
            [3, 1, 1],
            &[("minecraft:oak_log[axis=y]", 0), ("minecraft:air", 1)],
            vec![0, 1, 0],
        );
        let grid = BlockGrid::build(&doc);

        assert_eq!(grid.block_counts().get("minecraft:oak_log"), Some(&2));
        let a = grid.get(0, 0, 0).unwrap().block().unwrap();
        let b = grid.get(2, 0, 0).unwrap().block().unwrap();
        assert!(Arc::ptr_eq(a, b));
    }
}
