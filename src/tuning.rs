//! Data-driven balance numbers
//!
//! Every behavior constant that distinguishes one enemy archetype from the
//! other lives here, so the state machine itself stays generic. Spawn
//! pressure presets per difficulty tier live here too.

use crate::sim::animation::{AnimClip, AnimKind, AnimSet};
use crate::sim::spawn::SpawnConfig;
use crate::tempo::BpmBand;

/// Enemy archetypes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Archetype {
    /// Melee chaser: closes distance and swings
    Bruiser,
    /// Ranged kiter: keeps a standoff distance and shoots
    Archer,
}

impl Archetype {
    #[inline]
    pub fn profile(self) -> &'static BehaviorProfile {
        match self {
            Archetype::Bruiser => &BRUISER,
            Archetype::Archer => &ARCHER,
        }
    }

    pub fn anims(self) -> AnimSet {
        match self {
            Archetype::Bruiser => BRUISER_ANIMS,
            Archetype::Archer => ARCHER_ANIMS,
        }
    }
}

/// Ranged standoff tuning: retreat below `preferred - retreat_slack`,
/// attack only between `preferred - attack_band` and the attack range
#[derive(Debug, Clone, Copy)]
pub struct Standoff {
    pub preferred: f32,
    pub retreat_slack: f32,
    pub attack_band: f32,
}

/// Everything the combatant state machine needs to know about an archetype
#[derive(Debug, Clone, Copy)]
pub struct BehaviorProfile {
    pub name: &'static str,
    /// How far the enemy senses the player
    pub detection_range: f32,
    /// How close before an attack can start
    pub attack_range: f32,
    /// Kiting behavior; `None` for melee
    pub standoff: Option<Standoff>,
    pub speed: f32,
    pub attack_cooldown: f32,
    /// Inclusive frame window of the attack clip that can deal damage
    pub damage_frames: (u32, u32),
    pub hitbox_offset: f32,
    pub hitbox_radius: f32,
    pub max_health: i32,
    /// Animator rate (frames advance at `rate * 60` per second)
    pub anim_rate: f32,
}

pub const BRUISER: BehaviorProfile = BehaviorProfile {
    name: "bruiser",
    detection_range: 450.0,
    attack_range: 120.0,
    standoff: None,
    speed: 70.0,
    attack_cooldown: 1.0,
    damage_frames: (2, 4),
    hitbox_offset: 60.0,
    hitbox_radius: 50.0,
    max_health: 2,
    anim_rate: 0.2,
};

pub const ARCHER: BehaviorProfile = BehaviorProfile {
    name: "archer",
    detection_range: 600.0,
    attack_range: 550.0,
    standoff: Some(Standoff {
        preferred: 420.0,
        retreat_slack: 80.0,
        attack_band: 20.0,
    }),
    speed: 80.0,
    attack_cooldown: 2.5,
    // The window where the arrow leaves the bow
    damage_frames: (7, 9),
    hitbox_offset: 80.0,
    hitbox_radius: 50.0,
    max_health: 2,
    anim_rate: 0.05,
};

const BRUISER_ANIMS: AnimSet = AnimSet::empty()
    .with(AnimKind::Idle, AnimClip::new(5, 96, 64))
    .with(AnimKind::Run, AnimClip::new(7, 96, 64))
    .with(AnimKind::Attack, AnimClip::new(5, 96, 64))
    .with(AnimKind::Defend, AnimClip::new(6, 96, 64));

const ARCHER_ANIMS: AnimSet = AnimSet::empty()
    .with(AnimKind::Idle, AnimClip::new(14, 96, 80))
    .with(AnimKind::Run, AnimClip::new(8, 96, 80))
    .with(AnimKind::Attack, AnimClip::new(11, 96, 80))
    .with(AnimKind::Defend, AnimClip::new(6, 96, 80));

pub const PLAYER_ANIMS: AnimSet = AnimSet::empty()
    .with(AnimKind::Idle, AnimClip::new(10, 96, 96))
    .with(AnimKind::Run, AnimClip::new(16, 96, 96))
    .with(AnimKind::Attack, AnimClip::new(7, 96, 96))
    .with(AnimKind::Defend, AnimClip::new(5, 96, 96))
    .with(AnimKind::JumpStart, AnimClip::new(3, 96, 96))
    .with(AnimKind::Jump, AnimClip::new(3, 96, 96))
    .with(AnimKind::JumpFall, AnimClip::new(3, 96, 96))
    .with(AnimKind::Heal, AnimClip::new(15, 96, 96));

/// Spawn pressure tier, selected from the live tempo band
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DifficultyTier {
    Easy,
    Normal,
    Hard,
}

impl DifficultyTier {
    pub fn from_band(band: BpmBand) -> Self {
        match band {
            BpmBand::Low => DifficultyTier::Easy,
            BpmBand::Medium => DifficultyTier::Normal,
            BpmBand::High => DifficultyTier::Hard,
        }
    }
}

/// Per-archetype spawn presets for a difficulty tier
pub fn spawn_config(archetype: Archetype, tier: DifficultyTier) -> SpawnConfig {
    match (archetype, tier) {
        (Archetype::Bruiser, DifficultyTier::Easy) => SpawnConfig {
            min_spawn_distance: 900.0,
            max_spawn_distance: 1400.0,
            cooldown: 4.5,
            max_active: 2,
        },
        (Archetype::Bruiser, DifficultyTier::Normal) => SpawnConfig {
            min_spawn_distance: 800.0,
            max_spawn_distance: 1200.0,
            cooldown: 3.0,
            max_active: 3,
        },
        (Archetype::Bruiser, DifficultyTier::Hard) => SpawnConfig {
            min_spawn_distance: 700.0,
            max_spawn_distance: 1100.0,
            cooldown: 2.0,
            max_active: 4,
        },
        (Archetype::Archer, DifficultyTier::Easy) => SpawnConfig {
            min_spawn_distance: 1000.0,
            max_spawn_distance: 1500.0,
            cooldown: 6.0,
            max_active: 1,
        },
        (Archetype::Archer, DifficultyTier::Normal) => SpawnConfig {
            min_spawn_distance: 900.0,
            max_spawn_distance: 1400.0,
            cooldown: 5.0,
            max_active: 2,
        },
        (Archetype::Archer, DifficultyTier::Hard) => SpawnConfig {
            min_spawn_distance: 800.0,
            max_spawn_distance: 1300.0,
            cooldown: 3.5,
            max_active: 3,
        },
    }
}
