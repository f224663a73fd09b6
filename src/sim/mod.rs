//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must stay pure and
//! deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - No rendering or platform dependencies; intents arrive via `TickInput`

pub mod animation;
pub mod collision;
pub mod combat;
pub mod enemy;
pub mod player;
pub mod projectile;
pub mod spawn;
pub mod state;
pub mod tick;

pub use animation::{AnimClip, AnimKind, AnimSet, Animator};
pub use enemy::{Enemy, EnemyState};
pub use player::{Player, PlayerState};
pub use projectile::Arrow;
pub use spawn::{SpawnConfig, SpawnManager};
pub use state::{GameState, Mode};
pub use tick::{FixedTimestep, TickInput, tick};
