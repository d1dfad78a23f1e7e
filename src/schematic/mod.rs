//! Sponge schematic decoding.
//!
//! A schematic is a gzip (or zlib) compressed NBT compound. Versions 1 and 2
//! keep `Width`, `Height`, `Length`, `Palette` and `BlockData` at the root;
//! version 3 nests them under `Schematic` with the block tables in `Blocks`.
//! Block data is a byte array of unsigned LEB128 varints, one per voxel; an
//! int array with one value per voxel is accepted as well.

pub mod grid;

pub use grid::{BlockGrid, Cell, PaletteMisses};

use crate::error::{Result, ViewerError};
use fastnbt::Value;
use flate2::read::{GzDecoder, ZlibDecoder};
use indexmap::IndexMap;
use serde::Deserialize;
use std::io::Read;

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// Decoded structure: dimensions, palette and per-voxel palette indices.
#[derive(Debug, Clone, PartialEq)]
pub struct StructureDocument {
    /// Sponge format version (1 when the file does not say).
    pub version: i32,
    pub width: usize,
    pub height: usize,
    pub length: usize,
    /// Block key to palette index, in declaration order.
    pub palette: IndexMap<String, i32>,
    /// Palette index per voxel, x fastest, then z, then y.
    pub block_data: Vec<i32>,
}

impl StructureDocument {
    /// Number of voxels.
    pub fn volume(&self) -> usize {
        self.width * self.height * self.length
    }
}

#[derive(Deserialize)]
struct RawSchematic {
    #[serde(rename = "Version")]
    version: Option<i32>,
    #[serde(rename = "Width")]
    width: Option<i16>,
    #[serde(rename = "Height")]
    height: Option<i16>,
    #[serde(rename = "Length")]
    length: Option<i16>,
    #[serde(rename = "Palette")]
    palette: Option<IndexMap<String, i32>>,
    #[serde(rename = "BlockData")]
    block_data: Option<Value>,
    #[serde(rename = "Blocks")]
    blocks: Option<RawBlocks>,
    #[serde(rename = "Schematic")]
    schematic: Option<Box<RawSchematic>>,
}

#[derive(Deserialize)]
struct RawBlocks {
    #[serde(rename = "Palette")]
    palette: IndexMap<String, i32>,
    #[serde(rename = "Data")]
    data: Value,
}

/// Decode a compressed schematic into a [`StructureDocument`].
///
/// Any decompression failure, malformed tag stream or missing field is a
/// [`ViewerError::Format`]; nothing partial is returned.
pub fn decode(bytes: &[u8]) -> Result<StructureDocument> {
    let nbt = decompress(bytes)?;
    let raw: RawSchematic = fastnbt::from_bytes(&nbt)
        .map_err(|e| ViewerError::format(format!("malformed tag stream: {}", e)))?;

    let raw = match raw.schematic {
        Some(inner) => *inner,
        None => raw,
    };

    let width = dimension("Width", raw.width)?;
    let height = dimension("Height", raw.height)?;
    let length = dimension("Length", raw.length)?;

    let (palette, data) = match (raw.palette, raw.block_data, raw.blocks) {
        (Some(palette), Some(data), _) => (palette, data),
        (_, _, Some(blocks)) => (blocks.palette, blocks.data),
        (None, _, None) => return Err(ViewerError::format("missing field Palette")),
        (Some(_), None, None) => return Err(ViewerError::format("missing field BlockData")),
    };

    let volume = width * height * length;
    let block_data = block_values(data)?;
    if block_data.len() != volume {
        return Err(ViewerError::format(format!(
            "BlockData has {} entries, expected {} ({}x{}x{})",
            block_data.len(),
            volume,
            width,
            height,
            length
        )));
    }

    log::debug!(
        "Decoded schematic v{}: {}x{}x{}, {} palette entries",
        raw.version.unwrap_or(1),
        width,
        height,
        length,
        palette.len()
    );

    Ok(StructureDocument {
        version: raw.version.unwrap_or(1),
        width,
        height,
        length,
        palette,
        block_data,
    })
}

/// Inflate a gzip or zlib stream.
fn decompress(bytes: &[u8]) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    let read = if bytes.starts_with(&GZIP_MAGIC) {
        GzDecoder::new(bytes).read_to_end(&mut out)
    } else {
        ZlibDecoder::new(bytes).read_to_end(&mut out)
    };
    read.map_err(|e| ViewerError::format(format!("decompression failed: {}", e)))?;
    Ok(out)
}

/// Dimensions are unsigned shorts stored in signed tags.
fn dimension(name: &str, value: Option<i16>) -> Result<usize> {
    let value = value.ok_or_else(|| ViewerError::format(format!("missing field {}", name)))?;
    match value as u16 {
        0 => Err(ViewerError::format(format!("{} must be positive", name))),
        v => Ok(v as usize),
    }
}

fn block_values(data: Value) -> Result<Vec<i32>> {
    match data {
        Value::ByteArray(bytes) => decode_varints(&bytes),
        Value::IntArray(ints) => Ok(ints.to_vec()),
        _ => Err(ViewerError::format("BlockData must be a byte or int array")),
    }
}

fn decode_varints(bytes: &[i8]) -> Result<Vec<i32>> {
    let mut values = Vec::with_capacity(bytes.len());
    let mut value: u32 = 0;
    let mut shift = 0u32;

    for &byte in bytes {
        let byte = byte as u8;
        if shift > 28 {
            return Err(ViewerError::format("BlockData varint longer than 5 bytes"));
        }
        value |= ((byte & 0x7f) as u32) << shift;
        if byte & 0x80 == 0 {
            values.push(value as i32);
            value = 0;
            shift = 0;
        } else {
            shift += 7;
        }
    }

    if shift != 0 {
        return Err(ViewerError::format("BlockData ends inside a varint"));
    }
    Ok(values)
}


#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;
    use fastnbt::{ByteArray, IntArray};
    use flate2::write::ZlibEncoder;
    use flate2::Compression;
    use serde::Serialize;
    use std::io::Write;

    #[test]
    fn test_decode_v2() {
        let bytes = sponge_v2(
            [2, 1, 1],
            &[("minecraft:air", 0), ("minecraft:stone", 1)],
            &[1, 0],
        );
        let doc = decode(&bytes).unwrap();

        assert_eq!(doc.version, 2);
        assert_eq!((doc.width, doc.height, doc.length), (2, 1, 1));
        assert_eq!(doc.block_data, vec![1, 0]);
        let keys: Vec<_> = doc.palette.keys().cloned().collect();
        assert_eq!(keys, vec!["minecraft:air", "minecraft:stone"]);
    }

    #[test]
    fn test_decode_multibyte_varints() {
        let palette: Vec<(String, i32)> =
            (0..300).map(|i| (format!("minecraft:block_{}", i), i)).collect();
        let palette_refs: Vec<(&str, i32)> =
            palette.iter().map(|(k, v)| (k.as_str(), *v)).collect();
        let bytes = sponge_v2([3, 1, 1], &palette_refs, &[5, 200, 299]);

        let doc = decode(&bytes).unwrap();
        assert_eq!(doc.block_data, vec![5, 200, 299]);
    }

    #[test]
    fn test_decode_v3_layout() {
        #[derive(Serialize)]
        struct Blocks {
            #[serde(rename = "Palette")]
            palette: IndexMap<String, i32>,
            #[serde(rename = "Data")]
            data: ByteArray,
        }
        #[derive(Serialize)]
        struct Inner {
            #[serde(rename = "Version")]
            version: i32,
            #[serde(rename = "Width")]
            width: i16,
            #[serde(rename = "Height")]
            height: i16,
            #[serde(rename = "Length")]
            length: i16,
            #[serde(rename = "Blocks")]
            blocks: Blocks,
        }
        #[derive(Serialize)]
        struct Root {
            #[serde(rename = "Schematic")]
            schematic: Inner,
        }

        let root = Root {
            schematic: Inner {
                version: 3,
                width: 1,
                height: 2,
                length: 1,
                blocks: Blocks {
                    palette: [("minecraft:dirt".to_string(), 0)].into_iter().collect(),
                    data: ByteArray::new(vec![0, 0]),
                },
            },
        };
        let bytes = gzip(&fastnbt::to_bytes(&root).unwrap());

        let doc = decode(&bytes).unwrap();
        assert_eq!(doc.version, 3);
        assert_eq!(doc.height, 2);
        assert_eq!(doc.block_data, vec![0, 0]);
    }

    #[test]
    fn test_decode_int_array_block_data() {
        #[derive(Serialize)]
        struct IntSchematic {
            #[serde(rename = "Version")]
            version: i32,
            #[serde(rename = "Width")]
            width: i16,
            #[serde(rename = "Height")]
            height: i16,
            #[serde(rename = "Length")]
            length: i16,
            #[serde(rename = "Palette")]
            palette: IndexMap<String, i32>,
            #[serde(rename = "BlockData")]
            block_data: IntArray,
        }

        let doc = IntSchematic {
            version: 2,
            width: 3,
            height: 1,
            length: 1,
            palette: [("minecraft:stone".to_string(), 0), ("minecraft:dirt".to_string(), 300)]
                .into_iter()
                .collect(),
            block_data: IntArray::new(vec![300, 0, 300]),
        };
        let bytes = gzip(&fastnbt::to_bytes(&doc).unwrap());

        let decoded = decode(&bytes).unwrap();
        assert_eq!(decoded.block_data, vec![300, 0, 300]);
    }

    #[test]
    fn test_block_data_of_wrong_type_is_format_error() {
        #[derive(Serialize)]
        struct StringData {
            #[serde(rename = "Width")]
            width: i16,
            #[serde(rename = "Height")]
            height: i16,
            #[serde(rename = "Length")]
            length: i16,
            #[serde(rename = "Palette")]
            palette: IndexMap<String, i32>,
            #[serde(rename = "BlockData")]
            block_data: String,
        }

        let doc = StringData {
            width: 1,
            height: 1,
            length: 1,
            palette: [("minecraft:stone".to_string(), 0)].into_iter().collect(),
            block_data: "0".to_string(),
        };
        let bytes = gzip(&fastnbt::to_bytes(&doc).unwrap());
        assert!(matches!(decode(&bytes), Err(ViewerError::Format(_))));
    }

    #[test]
    fn test_decode_zlib_stream() {
        let gz = sponge_v2([1, 1, 1], &[("minecraft:stone", 0)], &[0]);
        let mut raw = Vec::new();
        GzDecoder::new(gz.as_slice()).read_to_end(&mut raw).unwrap();

        let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(&raw).unwrap();
        let zlib = encoder.finish().unwrap();

        assert_eq!(decode(&zlib).unwrap().block_data, vec![0]);
    }

    #[test]
    fn test_missing_field_is_format_error() {
        #[derive(Serialize)]
        struct NoWidth {
            #[serde(rename = "Height")]
            height: i16,
            #[serde(rename = "Length")]
            length: i16,
        }
        let bytes = gzip(&fastnbt::to_bytes(&NoWidth { height: 1, length: 1 }).unwrap());

        match decode(&bytes) {
            Err(ViewerError::Format(message)) => assert!(message.contains("Width")),
            other => panic!("expected format error, got {:?}", other),
        }
    }

    #[test]
    fn test_garbage_is_format_error() {
        assert!(matches!(decode(b"not a schematic"), Err(ViewerError::Format(_))));
        assert!(matches!(decode(&gzip(b"\x0a\x00")), Err(ViewerError::Format(_))));
    }

    #[test]
    fn test_block_data_length_mismatch() {
        let bytes = sponge_v2([2, 2, 2], &[("minecraft:stone", 0)], &[0, 0, 0]);
        assert!(matches!(decode(&bytes), Err(ViewerError::Format(_))));
    }

    #[test]
    fn test_zero_dimension_rejected() {
        let bytes = sponge_v2([0, 1, 1], &[("minecraft:stone", 0)], &[]);
        assert!(matches!(decode(&bytes), Err(ViewerError::Format(_))));
    }

    #[test]
    fn test_truncated_varint() {
        assert!(decode_varints(&[0x80u8 as i8]).is_err());
        assert_eq!(decode_varints(&[0x81u8 as i8, 0x01]).unwrap(), vec![129]);
    }
}
