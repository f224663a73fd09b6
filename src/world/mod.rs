//! The tile world: chunks, the streaming window, and themes

pub mod chunk;
pub mod streamer;
pub mod theme;

pub use chunk::{Chunk, TileVertex};
pub use streamer::ChunkStreamer;
pub use theme::{Theme, ThemeSelector};
