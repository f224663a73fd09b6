//! Tile chunks: grid data, solidity queries, and the tile vertex batch
//!
//! A chunk is one fixed-size segment of the level, loaded from a
//! Tiled-flavored JSON grid file. Tile IDs are 1-based on disk with 0
//! meaning empty; they are translated to 0-based before any atlas lookup.
//! The collision grid is derived from the tileset's solid-ID set at load
//! time, so solidity queries never touch the tileset again.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use bytemuck::{Pod, Zeroable};
use glam::Vec2;
use serde::Deserialize;

use crate::assets::{AssetError, TilesetMeta};

/// UV inset in texels to stop sampling bleed between adjacent atlas cells
const UV_EPSILON: f32 = 0.5;

/// One vertex of the tile batch, in chunk-local pixels.
/// The renderer offsets by the chunk anchor (minus camera) when drawing.
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct TileVertex {
    pub position: [f32; 2],
    pub uv: [f32; 2],
}

/// On-disk grid schema (the subset of the editor format we consume)
#[derive(Debug, Deserialize)]
struct ChunkFile {
    width: u32,
    height: u32,
    layers: Vec<ChunkLayer>,
}

#[derive(Debug, Deserialize)]
struct ChunkLayer {
    data: Vec<u16>,
}

/// A streamed tile-grid segment of the level
#[derive(Debug, Clone, Default)]
pub struct Chunk {
    width: u32,
    height: u32,
    tile_size: f32,
    tiles: Vec<u16>,
    solid: Vec<bool>,
    anchor: Vec2,
    vertices: Vec<TileVertex>,
}

impl Chunk {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a grid file and rebuild the tile grid, the collision grid, and
    /// the vertex batch. A chunk whose load failed must not be used; the
    /// caller logs and skips it.
    pub fn load(
        &mut self,
        path: &Path,
        tileset: &TilesetMeta,
        tile_size: f32,
    ) -> Result<(), AssetError> {
        let file = File::open(path)?;
        let parsed: ChunkFile = serde_json::from_reader(BufReader::new(file))?;

        let layer = parsed.layers.into_iter().next().ok_or(AssetError::MissingLayer)?;
        let expected = (parsed.width * parsed.height) as usize;
        if layer.data.len() != expected {
            return Err(AssetError::BadDimensions {
                expected,
                actual: layer.data.len(),
            });
        }

        self.width = parsed.width;
        self.height = parsed.height;
        self.tile_size = tile_size;
        self.tiles = layer.data;
        self.solid = self.tiles.iter().map(|&id| tileset.is_solid_id(id)).collect();
        self.build_vertices(tileset);
        Ok(())
    }

    /// Reset grids and vertex storage for reuse. Safe to call on a chunk
    /// that was never loaded.
    pub fn clear_tiles(&mut self) {
        self.width = 0;
        self.height = 0;
        self.tiles.clear();
        self.solid.clear();
        self.vertices.clear();
    }

    /// Tile ID at local tile coordinates; 0 (empty) when out of bounds
    pub fn tile_at(&self, tx: i64, ty: i64) -> u16 {
        if tx < 0 || ty < 0 || tx >= self.width as i64 || ty >= self.height as i64 {
            return 0;
        }
        self.tiles[(ty * self.width as i64 + tx) as usize]
    }

    /// Solidity at local tile coordinates; out of bounds is not solid
    pub fn is_solid_tile(&self, tx: i64, ty: i64) -> bool {
        if tx < 0 || ty < 0 || tx >= self.width as i64 || ty >= self.height as i64 {
            return false;
        }
        self.solid[(ty * self.width as i64 + tx) as usize]
    }

    /// Solidity at a world-space point. Any query outside the chunk answers
    /// "not solid" so actors never collide with phantom geometry past the
    /// chunk edges.
    pub fn is_solid_world(&self, world_x: f32, world_y: f32) -> bool {
        if self.tile_size <= 0.0 {
            return false;
        }
        let tx = ((world_x - self.anchor.x) / self.tile_size).floor() as i64;
        let ty = ((world_y - self.anchor.y) / self.tile_size).floor() as i64;
        self.is_solid_tile(tx, ty)
    }

    fn build_vertices(&mut self, tileset: &TilesetMeta) {
        self.vertices.clear();

        let ts = self.tile_size;
        let cell = tileset.tile_size as f32;
        let atlas_w = (tileset.columns * tileset.tile_size) as f32;
        let atlas_h = (tileset.rows * tileset.tile_size) as f32;

        for ty in 0..self.height {
            for tx in 0..self.width {
                let id = self.tiles[(ty * self.width + tx) as usize];
                if id == 0 {
                    continue;
                }
                // 1-based on disk
                let id = u32::from(id - 1);
                let col = (id % tileset.columns) as f32;
                let row = (id / tileset.columns) as f32;

                let x0 = tx as f32 * ts;
                let y0 = ty as f32 * ts;
                let (x1, y1) = (x0 + ts, y0 + ts);

                let u0 = (col * cell + UV_EPSILON) / atlas_w;
                let u1 = ((col + 1.0) * cell - UV_EPSILON) / atlas_w;
                let v0 = (row * cell + UV_EPSILON) / atlas_h;
                let v1 = ((row + 1.0) * cell - UV_EPSILON) / atlas_h;

                // Two triangles per tile
                self.vertices.extend_from_slice(&[
                    TileVertex { position: [x0, y0], uv: [u0, v0] },
                    TileVertex { position: [x1, y0], uv: [u1, v0] },
                    TileVertex { position: [x0, y1], uv: [u0, v1] },
                    TileVertex { position: [x1, y0], uv: [u1, v0] },
                    TileVertex { position: [x1, y1], uv: [u1, v1] },
                    TileVertex { position: [x0, y1], uv: [u0, v1] },
                ]);
            }
        }
    }

    #[inline]
    pub fn anchor(&self) -> Vec2 {
        self.anchor
    }

    #[inline]
    pub fn set_anchor(&mut self, anchor: Vec2) {
        self.anchor = anchor;
    }

    #[inline]
    pub fn tile_size(&self) -> f32 {
        self.tile_size
    }

    /// Chunk width in world pixels
    #[inline]
    pub fn width_px(&self) -> f32 {
        self.width as f32 * self.tile_size
    }

    /// Chunk height in world pixels
    #[inline]
    pub fn height_px(&self) -> f32 {
        self.height as f32 * self.tile_size
    }

    /// World-space X of the trailing (right) edge
    #[inline]
    pub fn right_edge(&self) -> f32 {
        self.anchor.x + self.width_px()
    }

    #[inline]
    pub fn is_loaded(&self) -> bool {
        !self.tiles.is_empty()
    }

    /// The render batch: chunk-local vertices of every non-empty tile
    #[inline]
    pub fn vertices(&self) -> &[TileVertex] {
        &self.vertices
    }
}

#[cfg(test)]
impl Chunk {
    /// Build a chunk straight from grid data, bypassing the file format.
    /// Used by collision/streamer/sim tests.
    pub(crate) fn from_grid_for_tests(
        width: u32,
        height: u32,
        tile_size: f32,
        anchor: Vec2,
        tiles: Vec<u16>,
        solid_ids: &[u16],
    ) -> Self {
        assert_eq!(tiles.len(), (width * height) as usize);
        let solid = tiles
            .iter()
            .map(|id| *id != 0 && solid_ids.contains(id))
            .collect();
        Self {
            width,
            height,
            tile_size,
            tiles,
            solid,
            anchor,
            vertices: Vec::new(),
        }
    }
}
