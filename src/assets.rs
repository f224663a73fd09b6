//! Asset registry: tileset metadata cache, theme manifests, animation tables
//!
//! Actors and chunks never reach for global state; everything they need at
//! setup time is handed to them from this registry. Texture pixels are the
//! renderer's problem - the registry only carries the metadata the
//! simulation consumes (solid tile sets, sheet layouts, file paths).

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Deserialize;

use crate::sim::animation::AnimSet;
use crate::tuning::{self, Archetype};
use crate::world::theme::Theme;

/// Unified error kind for every asset-loading operation
#[derive(Debug)]
pub enum AssetError {
    Io(std::io::Error),
    Json(serde_json::Error),
    /// Grid file had no tile layer
    MissingLayer,
    /// Grid data length disagrees with the declared width x height
    BadDimensions { expected: usize, actual: usize },
    /// A theme directory contains no chunk files
    NoChunkFiles(PathBuf),
}

impl fmt::Display for AssetError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssetError::Io(e) => write!(f, "io error: {e}"),
            AssetError::Json(e) => write!(f, "malformed asset file: {e}"),
            AssetError::MissingLayer => write!(f, "grid file has no tile layer"),
            AssetError::BadDimensions { expected, actual } => {
                write!(f, "grid data length {actual} does not match dimensions (expected {expected})")
            }
            AssetError::NoChunkFiles(dir) => {
                write!(f, "no chunk files found under {}", dir.display())
            }
        }
    }
}

impl std::error::Error for AssetError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AssetError::Io(e) => Some(e),
            AssetError::Json(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for AssetError {
    fn from(e: std::io::Error) -> Self {
        AssetError::Io(e)
    }
}

impl From<serde_json::Error> for AssetError {
    fn from(e: serde_json::Error) -> Self {
        AssetError::Json(e)
    }
}

/// Tileset metadata: atlas layout plus which tile IDs block movement.
/// Solid IDs are 1-based, matching the grid files.
#[derive(Debug, Clone, Deserialize)]
pub struct TilesetMeta {
    pub columns: u32,
    pub rows: u32,
    pub tile_size: u32,
    solid: HashSet<u16>,
}

impl TilesetMeta {
    #[inline]
    pub fn is_solid_id(&self, id: u16) -> bool {
        id != 0 && self.solid.contains(&id)
    }

    #[cfg(test)]
    pub fn for_tests(columns: u32, rows: u32, tile_size: u32, solid: &[u16]) -> Self {
        Self {
            columns,
            rows,
            tile_size,
            solid: solid.iter().copied().collect(),
        }
    }
}

/// Per-path cache of tileset metadata, so repeated chunk loads against the
/// same tileset are O(1) after the first read
#[derive(Debug, Default)]
pub struct TilesetCache {
    entries: HashMap<PathBuf, Arc<TilesetMeta>>,
}

impl TilesetCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load(&mut self, path: &Path) -> Result<Arc<TilesetMeta>, AssetError> {
        if let Some(meta) = self.entries.get(path) {
            return Ok(Arc::clone(meta));
        }
        let file = File::open(path)?;
        let meta: TilesetMeta = serde_json::from_reader(BufReader::new(file))?;
        log::debug!("loaded tileset {} ({} solid ids)", path.display(), meta.solid.len());
        let meta = Arc::new(meta);
        self.entries.insert(path.to_path_buf(), Arc::clone(&meta));
        Ok(meta)
    }
}

/// Everything a theme needs on disk
#[derive(Debug, Clone)]
pub struct ThemeManifest {
    pub tileset: PathBuf,
    pub chunks: Vec<PathBuf>,
    pub background_dir: PathBuf,
}

/// Central asset registry handed into actor factories and the world loader
#[derive(Debug)]
pub struct AssetRegistry {
    root: PathBuf,
    pub tilesets: TilesetCache,
}

impl AssetRegistry {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            tilesets: TilesetCache::new(),
        }
    }

    /// Resolve a theme's on-disk manifest. Chunk files are every
    /// `chunk_*.json` under the theme directory, in name order.
    pub fn theme_manifest(&self, theme: Theme) -> Result<ThemeManifest, AssetError> {
        let dir = self.root.join("themes").join(theme.dir_name());
        let mut chunks: Vec<PathBuf> = std::fs::read_dir(&dir)?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|p| {
                p.file_name()
                    .and_then(|n| n.to_str())
                    .is_some_and(|n| n.starts_with("chunk_") && n.ends_with(".json"))
            })
            .collect();
        chunks.sort();
        if chunks.is_empty() {
            return Err(AssetError::NoChunkFiles(dir));
        }
        Ok(ThemeManifest {
            tileset: dir.join("tileset.json"),
            chunks,
            background_dir: dir.join("background"),
        })
    }

    /// Check every theme's essential assets up front. A failure here is
    /// fatal at startup; mid-game loads merely log and skip.
    pub fn verify(&mut self) -> Result<(), AssetError> {
        for theme in Theme::ALL {
            let manifest = self.theme_manifest(theme)?;
            self.tilesets.load(&manifest.tileset)?;
        }
        Ok(())
    }

    pub fn player_anims(&self) -> AnimSet {
        tuning::PLAYER_ANIMS
    }

    pub fn enemy_anims(&self, archetype: Archetype) -> AnimSet {
        archetype.anims()
    }
}
