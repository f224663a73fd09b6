//! Cadence - a tempo-driven side-scrolling action game
//!
//! Core modules:
//! - `sim`: Deterministic simulation (actors, AI, collision, combat, spawning)
//! - `world`: Tile chunks, the streaming window, and audio-reactive themes
//! - `tempo`: BPM signal smoothing and the remote tempo poller
//! - `meta`: Skill tree and shop progression
//! - `assets`: Asset registry (animation tables, theme manifests, tileset cache)
//! - `tuning`: Data-driven balance numbers

pub mod assets;
pub mod meta;
pub mod sim;
pub mod tempo;
pub mod tuning;
pub mod world;

pub use assets::{AssetError, AssetRegistry};

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (60 Hz)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;

    /// Logical window dimensions (the camera's view in world pixels)
    pub const WINDOW_WIDTH: f32 = 1000.0;
    pub const WINDOW_HEIGHT: f32 = 800.0;

    /// Side-scroll camera margin: the player may roam this far from either
    /// screen edge before the camera follows
    pub const CAMERA_MARGIN: f32 = 200.0;

    /// Tile edge length in pixels
    pub const TILE_SIZE: f32 = 32.0;
    /// Number of chunks kept live in the streaming window
    pub const VISIBLE_CHUNKS: usize = 3;
    /// World-space Y of every chunk's top edge
    pub const CHUNK_ANCHOR_Y: f32 = 416.0;
    /// Extra look-ahead beyond the window before recycling kicks in
    pub const STREAM_MARGIN: f32 = 200.0;

    /// Downward acceleration applied to airborne enemies (px/s^2)
    pub const ACTOR_GRAVITY: f32 = 980.0;
}

/// Squared-distance helper that avoids the sqrt when comparing against a radius
#[inline]
pub fn within_radius(a: Vec2, b: Vec2, radius: f32) -> bool {
    a.distance_squared(b) <= radius * radius
}
