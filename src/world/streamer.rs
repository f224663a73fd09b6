//! The chunk streaming window
//!
//! A fixed-size window of chunks slides right with the player. When the
//! player closes in on the window's trailing edge, the leftmost chunk is
//! reloaded with a freshly picked grid file and re-anchored exactly at the
//! current rightmost edge - never a gap, never an overlap.

use std::path::PathBuf;
use std::sync::Arc;

use glam::Vec2;
use rand::Rng;
use rand_pcg::Pcg32;

use crate::assets::{AssetError, ThemeManifest, TilesetCache, TilesetMeta};
use crate::consts::{CHUNK_ANCHOR_Y, STREAM_MARGIN, TILE_SIZE, VISIBLE_CHUNKS};
use crate::world::chunk::Chunk;

/// Maintains the sliding window of live chunks
#[derive(Debug, Default)]
pub struct ChunkStreamer {
    chunks: Vec<Chunk>,
    /// Uniform chunk width, measured once from the first loaded chunk
    chunk_width: f32,
    chunk_files: Vec<PathBuf>,
    tileset: Option<Arc<TilesetMeta>>,
    /// Reload target; swapped into the window only on success
    scratch: Chunk,
}

impl ChunkStreamer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a fresh contiguous row of `VISIBLE_CHUNKS` chunks for the given
    /// theme, replacing whatever was streamed before. Chunk files are drawn
    /// at random from the theme's list.
    pub fn load_row(
        &mut self,
        manifest: &ThemeManifest,
        tilesets: &mut TilesetCache,
        rng: &mut Pcg32,
    ) -> Result<(), AssetError> {
        let tileset = tilesets.load(&manifest.tileset)?;

        let mut chunks = Vec::with_capacity(VISIBLE_CHUNKS);
        let mut x = 0.0;
        for _ in 0..VISIBLE_CHUNKS {
            let file = &manifest.chunks[rng.random_range(0..manifest.chunks.len())];
            let mut chunk = Chunk::new();
            chunk.load(file, &tileset, TILE_SIZE)?;
            chunk.set_anchor(Vec2::new(x, CHUNK_ANCHOR_Y));
            x += chunk.width_px();
            chunks.push(chunk);
        }

        self.chunk_width = chunks[0].width_px();
        self.chunks = chunks;
        self.chunk_files = manifest.chunks.clone();
        self.tileset = Some(tileset);
        log::info!(
            "streamed fresh row: {} chunks of {}px from {}",
            VISIBLE_CHUNKS,
            self.chunk_width,
            manifest.tileset.display()
        );
        Ok(())
    }

    /// Re-point future recycles at another theme's files. Current chunks
    /// keep their old skin until they recycle out.
    pub fn set_theme(
        &mut self,
        manifest: &ThemeManifest,
        tilesets: &mut TilesetCache,
    ) -> Result<(), AssetError> {
        let tileset = tilesets.load(&manifest.tileset)?;
        self.chunk_files = manifest.chunks.clone();
        self.tileset = Some(tileset);
        Ok(())
    }

    /// Advance the window for the player's position, recycling the leftmost
    /// chunk when the player nears the trailing edge. A failed reload logs
    /// and leaves the window untouched; next tick retries.
    pub fn update(&mut self, player_x: f32, rng: &mut Pcg32) {
        if self.chunks.is_empty() || self.chunk_width <= 0.0 {
            return;
        }
        let Some(tileset) = self.tileset.clone() else {
            return;
        };

        let rightmost_edge = self.rightmost_edge();
        let Some(leftmost_idx) = self
            .chunks
            .iter()
            .enumerate()
            .min_by(|(_, a), (_, b)| a.anchor().x.total_cmp(&b.anchor().x))
            .map(|(i, _)| i)
        else {
            return;
        };
        let leftmost_right_edge = self.chunks[leftmost_idx].right_edge();

        let near_trailing_edge =
            player_x > rightmost_edge + STREAM_MARGIN - 2.0 * self.chunk_width;
        let passed_leftmost = player_x > leftmost_right_edge;
        if !near_trailing_edge || !passed_leftmost {
            return;
        }

        // Re-pick a grid file for variety and load off-window first
        let file = &self.chunk_files[rng.random_range(0..self.chunk_files.len())];
        self.scratch.clear_tiles();
        if let Err(e) = self.scratch.load(file, &tileset, TILE_SIZE) {
            log::warn!("chunk recycle failed for {}: {e}", file.display());
            return;
        }
        self.scratch
            .set_anchor(Vec2::new(rightmost_edge, CHUNK_ANCHOR_Y));
        std::mem::swap(&mut self.chunks[leftmost_idx], &mut self.scratch);
        log::debug!(
            "recycled chunk {} to x={:.0} ({})",
            leftmost_idx,
            rightmost_edge,
            file.display()
        );
    }

    /// World X of the window's trailing (right) edge
    pub fn rightmost_edge(&self) -> f32 {
        self.chunks
            .iter()
            .map(|c| c.right_edge())
            .fold(0.0, f32::max)
    }

    /// World X of the window's leading (left) edge
    pub fn leftmost_anchor(&self) -> f32 {
        self.chunks
            .iter()
            .map(|c| c.anchor().x)
            .fold(f32::INFINITY, f32::min)
    }

    #[inline]
    pub fn chunks(&self) -> &[Chunk] {
        &self.chunks
    }

    #[inline]
    pub fn chunk_width(&self) -> f32 {
        self.chunk_width
    }

    #[inline]
    pub fn is_loaded(&self) -> bool {
        !self.chunks.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use std::fs::File;
    use std::io::Write;
    use std::path::Path;

    /// Write a minimal theme directory: tileset plus `files` chunk grids
    /// (20x12, solid floor on the bottom two rows)
    fn write_theme(dir: &Path, files: usize) -> ThemeManifest {
        let mut f = File::create(dir.join("tileset.json")).unwrap();
        write!(
            f,
            r#"{{ "columns": 8, "rows": 8, "tile_size": 32, "solid": [1, 2] }}"#
        )
        .unwrap();

        let (w, h) = (20u32, 12u32);
        let mut data = vec![0u16; (w * h) as usize];
        for tx in 0..w {
            data[(10 * w + tx) as usize] = 1;
            data[(11 * w + tx) as usize] = 2;
        }
        for i in 0..files {
            let json = serde_json::json!({
                "width": w,
                "height": h,
                "layers": [ { "data": data } ],
            });
            let mut f = File::create(dir.join(format!("chunk_{i:02}.json"))).unwrap();
            write!(f, "{json}").unwrap();
        }

        ThemeManifest {
            tileset: dir.join("tileset.json"),
            chunks: (0..files)
                .map(|i| dir.join(format!("chunk_{i:02}.json")))
                .collect(),
            background_dir: dir.join("background"),
        }
    }

    fn window_is_contiguous(streamer: &ChunkStreamer) {
        let mut anchors: Vec<f32> = streamer.chunks().iter().map(|c| c.anchor().x).collect();
        anchors.sort_by(f32::total_cmp);
        for pair in anchors.windows(2) {
            assert_eq!(
                pair[1],
                pair[0] + streamer.chunk_width(),
                "adjacent chunks must tile exactly"
            );
        }
    }

    #[test]
    fn test_load_row_is_contiguous() {
        let dir = tempfile::tempdir().unwrap();
        let manifest = write_theme(dir.path(), 3);
        let mut tilesets = TilesetCache::new();
        let mut rng = Pcg32::seed_from_u64(1);

        let mut streamer = ChunkStreamer::new();
        streamer.load_row(&manifest, &mut tilesets, &mut rng).unwrap();

        assert_eq!(streamer.chunks().len(), VISIBLE_CHUNKS);
        assert_eq!(streamer.chunk_width(), 640.0);
        assert_eq!(streamer.leftmost_anchor(), 0.0);
        assert_eq!(streamer.rightmost_edge(), 640.0 * VISIBLE_CHUNKS as f32);
        window_is_contiguous(&streamer);
    }

    #[test]
    fn test_recycle_keeps_window_contiguous() {
        let dir = tempfile::tempdir().unwrap();
        let manifest = write_theme(dir.path(), 3);
        let mut tilesets = TilesetCache::new();
        let mut rng = Pcg32::seed_from_u64(2);

        let mut streamer = ChunkStreamer::new();
        streamer.load_row(&manifest, &mut tilesets, &mut rng).unwrap();

        // Walk the player far to the right; the window must follow with
        // exactly VISIBLE_CHUNKS live chunks and no gaps or overlaps
        let mut player_x = 0.0;
        for _ in 0..4000 {
            player_x += 7.0;
            streamer.update(player_x, &mut rng);
            assert_eq!(streamer.chunks().len(), VISIBLE_CHUNKS);
            window_is_contiguous(&streamer);
            // The ground under the player stays loaded
            assert!(streamer.leftmost_anchor() <= player_x);
        }
        // 28000px of walking crossed many recycle points
        assert!(streamer.rightmost_edge() > 28000.0);
    }

    #[test]
    fn test_no_recycle_before_trigger() {
        let dir = tempfile::tempdir().unwrap();
        let manifest = write_theme(dir.path(), 3);
        let mut tilesets = TilesetCache::new();
        let mut rng = Pcg32::seed_from_u64(3);

        let mut streamer = ChunkStreamer::new();
        streamer.load_row(&manifest, &mut tilesets, &mut rng).unwrap();

        // Standing inside the leftmost chunk never recycles
        streamer.update(100.0, &mut rng);
        assert_eq!(streamer.leftmost_anchor(), 0.0);
    }

    #[test]
    fn test_failed_recycle_leaves_window_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let manifest = write_theme(dir.path(), 3);
        let mut tilesets = TilesetCache::new();
        let mut rng = Pcg32::seed_from_u64(4);

        let mut streamer = ChunkStreamer::new();
        streamer.load_row(&manifest, &mut tilesets, &mut rng).unwrap();

        // Delete every grid file, then push past the recycle trigger
        for file in &manifest.chunks {
            std::fs::remove_file(file).unwrap();
        }
        streamer.update(1800.0, &mut rng);

        assert_eq!(streamer.chunks().len(), VISIBLE_CHUNKS);
        window_is_contiguous(&streamer);
        assert_eq!(streamer.leftmost_anchor(), 0.0);
    }

    #[test]
    fn test_update_on_empty_streamer_is_a_no_op() {
        let mut streamer = ChunkStreamer::new();
        let mut rng = Pcg32::seed_from_u64(5);
        streamer.update(1e6, &mut rng); // must not panic
        assert!(!streamer.is_loaded());
    }

    mod props {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            /// Contiguity holds across arbitrary forward walks
            #[test]
            fn prop_window_stays_contiguous(steps in prop::collection::vec(0.0f32..120.0, 1..200)) {
                let dir = tempfile::tempdir().unwrap();
                let manifest = write_theme(dir.path(), 2);
                let mut tilesets = TilesetCache::new();
                let mut rng = Pcg32::seed_from_u64(42);

                let mut streamer = ChunkStreamer::new();
                streamer.load_row(&manifest, &mut tilesets, &mut rng).unwrap();

                let mut player_x = 0.0;
                for step in steps {
                    player_x += step;
                    streamer.update(player_x, &mut rng);
                    prop_assert_eq!(streamer.chunks().len(), VISIBLE_CHUNKS);

                    let mut anchors: Vec<f32> =
                        streamer.chunks().iter().map(|c| c.anchor().x).collect();
                    anchors.sort_by(f32::total_cmp);
                    for pair in anchors.windows(2) {
                        prop_assert_eq!(pair[1], pair[0] + streamer.chunk_width());
                    }
                }
            }
        }
    }
}
