//! Top-level game state
//!
//! Owns every gameplay-mutable piece: the player, both enemy pools and
//! their spawn managers, the chunk streamer, theme selection, the tempo
//! tracker, progression, camera, and the seeded RNG. All of it belongs to
//! the single simulation thread.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;

use crate::assets::{AssetError, AssetRegistry};
use crate::consts::CHUNK_ANCHOR_Y;
use crate::meta::{self, Item, SkillKind, SkillTree};
use crate::sim::collision;
use crate::sim::enemy::Enemy;
use crate::sim::player::Player;
use crate::sim::projectile::Arrow;
use crate::sim::spawn::SpawnManager;
use crate::tempo::TempoTracker;
use crate::tuning::Archetype;
use crate::world::{ChunkStreamer, Theme, ThemeSelector};

/// Where the player currently is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// The staging world: fixed chunk row, no spawning
    Hub,
    /// The streamed side-scrolling run
    Expedition,
}

pub struct GameState {
    pub mode: Mode,
    pub assets: AssetRegistry,
    pub player: Player,
    pub bruisers: Vec<Enemy>,
    pub archers: Vec<Enemy>,
    pub bruiser_spawner: SpawnManager,
    pub archer_spawner: SpawnManager,
    /// Arrows in flight, released by archer attacks
    pub arrows: Vec<Arrow>,
    pub streamer: ChunkStreamer,
    pub themes: ThemeSelector,
    pub tempo: TempoTracker,
    pub skills: SkillTree,
    /// Camera world offset (top-left of the view)
    pub camera: Vec2,
    pub rng: Pcg32,
    pub time_ticks: u64,
    pub kills: u32,
}

impl GameState {
    /// Build the initial state in the hub. Failing to load the hub world is
    /// fatal; the caller aborts startup.
    pub fn new(assets: AssetRegistry, seed: u64) -> Result<Self, AssetError> {
        let mut assets = assets;
        let mut rng = Pcg32::seed_from_u64(seed);

        let manifest = assets.theme_manifest(Theme::Hub)?;
        let mut streamer = ChunkStreamer::new();
        streamer.load_row(&manifest, &mut assets.tilesets, &mut rng)?;

        let mut player = Player::new(&assets);
        player.pos = Vec2::new(320.0, 600.0);

        Ok(Self {
            mode: Mode::Hub,
            player,
            bruisers: Vec::new(),
            archers: Vec::new(),
            bruiser_spawner: SpawnManager::new(Archetype::Bruiser, seed.wrapping_add(1)),
            archer_spawner: SpawnManager::new(Archetype::Archer, seed.wrapping_add(2)),
            arrows: Vec::new(),
            streamer,
            themes: ThemeSelector::new(Theme::Hub),
            tempo: TempoTracker::new(),
            skills: SkillTree::new(),
            camera: Vec2::ZERO,
            rng,
            time_ticks: 0,
            kills: 0,
            assets,
        })
    }

    /// Leave the hub: stream a fresh expedition row for the tempo's theme
    /// and seed the initial enemy population with scripted placements.
    pub fn begin_expedition(&mut self) -> Result<(), AssetError> {
        let theme = match Theme::from_bpm(self.tempo.bpm()) {
            // No signal yet: default run skin
            Theme::Hub => Theme::Forest,
            t => t,
        };
        let manifest = self.assets.theme_manifest(theme)?;
        self.streamer
            .load_row(&manifest, &mut self.assets.tilesets, &mut self.rng)?;
        self.themes = ThemeSelector::new(theme);

        self.player.pos = Vec2::new(90.0, 650.0);
        self.player.vel = Vec2::ZERO;
        self.camera = Vec2::ZERO;

        self.bruisers.clear();
        self.archers.clear();
        self.arrows.clear();

        // Initial world population, grounded on the freshly streamed row
        let chunks = self.streamer.chunks();
        let bruiser_spot = Vec2::new(
            self.player.pos.x + 900.0,
            collision::find_ground_y(self.player.pos.x + 900.0, CHUNK_ANCHOR_Y, chunks, 512.0),
        );
        let archer_spot = Vec2::new(
            self.player.pos.x + 1300.0,
            collision::find_ground_y(self.player.pos.x + 1300.0, CHUNK_ANCHOR_Y, chunks, 512.0),
        );
        self.bruiser_spawner
            .force_spawn(bruiser_spot, &mut self.bruisers, &self.assets);
        self.archer_spawner
            .force_spawn(archer_spot, &mut self.archers, &self.assets);

        self.mode = Mode::Expedition;
        log::info!("expedition started in {:?} theme", theme);
        Ok(())
    }

    /// Purchase a skill and apply its passive effect to the player
    pub fn unlock_skill(&mut self, index: usize) -> bool {
        if !self.skills.unlock(index) {
            return false;
        }
        match self.skills.skills()[index].kind {
            SkillKind::ExtraHeal => self.player.heal_charges += 1,
            SkillKind::ExtraHealth => {
                self.player.max_health += 1;
                self.player.restore(1);
            }
            // The remaining effects are consulted where they apply
            // (e.g. Beat Fury in combat resolution)
            _ => {}
        }
        true
    }

    /// Roll one shop offer from the game's seeded stream
    pub fn roll_shop_item(&mut self) -> Item {
        meta::random_item(&mut self.rng)
    }

    /// Live enemies across both pools
    pub fn live_enemy_count(&self) -> usize {
        self.bruisers.iter().filter(|e| e.is_alive()).count()
            + self.archers.iter().filter(|e| e.is_alive()).count()
    }
}
