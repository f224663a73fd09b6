//! The per-tick orchestrator
//!
//! One call advances the whole simulation by one fixed timestep: tempo and
//! theming, player intents and physics, chunk streaming, enemy AI, spawn
//! decisions, and combat resolution - in that order, all on the calling
//! thread.

use crate::consts::{CAMERA_MARGIN, MAX_SUBSTEPS, SIM_DT, WINDOW_WIDTH};
use crate::sim::combat;
use crate::sim::projectile;
use crate::sim::state::{GameState, Mode};
use crate::tuning::{self, Archetype, DifficultyTier};

/// Longest real frame the accumulator will accept; anything slower turns
/// into visible slowdown instead of a catch-up spiral
const MAX_FRAME_TIME: f32 = 0.1;

/// Fixed-timestep accumulator. Feed it real elapsed time, then drain whole
/// `SIM_DT` steps (re-polling input before each one):
///
/// ```ignore
/// clock.begin_frame(elapsed);
/// while clock.step() {
///     tick(&mut state, &poll_input(), SIM_DT);
/// }
/// render();
/// ```
#[derive(Debug, Default)]
pub struct FixedTimestep {
    accumulator: f32,
    substeps: u32,
}

impl FixedTimestep {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bank one frame's worth of real time (capped) and reset the substep
    /// budget
    pub fn begin_frame(&mut self, elapsed: f32) {
        self.accumulator += elapsed.min(MAX_FRAME_TIME);
        self.substeps = 0;
    }

    /// Take one whole simulation step out of the bank, if the frame still
    /// has both time and substep budget
    pub fn step(&mut self) -> bool {
        if self.accumulator >= SIM_DT && self.substeps < MAX_SUBSTEPS {
            self.accumulator -= SIM_DT;
            self.substeps += 1;
            true
        } else {
            false
        }
    }
}

/// Input commands for a single tick
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    pub move_left: bool,
    pub move_right: bool,
    pub jump: bool,
    pub attack: bool,
    pub defend: bool,
    pub heal: bool,
    /// Leave the hub and start a run
    pub start_expedition: bool,
    /// Latest tempo snapshot; 0 when unknown
    pub bpm: f32,
}

/// Advance the game state by one fixed timestep
pub fn tick(state: &mut GameState, input: &TickInput, dt: f32) {
    state.time_ticks += 1;

    // Tempo drives theming and spawn pressure
    state.tempo.push_sample(input.bpm);
    state.themes.select(state.tempo.bpm());
    state.themes.update(dt);
    if let Some(theme) = state.themes.take_completed_switch() {
        // Future recycles pick up the new skin; live chunks keep theirs
        match state.assets.theme_manifest(theme) {
            Ok(manifest) => {
                if let Err(e) = state.streamer.set_theme(&manifest, &mut state.assets.tilesets) {
                    log::warn!("theme switch kept old tileset: {e}");
                }
            }
            Err(e) => log::warn!("theme switch kept old manifest: {e}"),
        }
    }

    let tier = DifficultyTier::from_band(state.tempo.band());
    let difficulty = state.tempo.difficulty_multiplier();
    state
        .bruiser_spawner
        .set_config(tuning::spawn_config(Archetype::Bruiser, tier));
    state.bruiser_spawner.set_difficulty(difficulty);
    state
        .archer_spawner
        .set_config(tuning::spawn_config(Archetype::Archer, tier));
    state.archer_spawner.set_difficulty(difficulty);

    // Player intents
    if state.player.is_alive() {
        if input.move_left {
            state.player.move_left();
        }
        if input.move_right {
            state.player.move_right();
        }
        if input.jump {
            state.player.jump();
        }
        if input.attack {
            state.player.attack();
        }
        if input.defend {
            state.player.defend();
        }
        if input.heal {
            state.player.heal();
        }
        state.player.update(dt, state.streamer.chunks());
    }

    match state.mode {
        Mode::Hub => {
            if input.start_expedition {
                if let Err(e) = state.begin_expedition() {
                    log::error!("expedition start failed: {e}");
                }
            }
        }
        Mode::Expedition => {
            state.streamer.update(state.player.pos.x, &mut state.rng);

            let player_pos = state.player.pos;
            {
                let chunks = state.streamer.chunks();
                for enemy in &mut state.bruisers {
                    enemy.update(dt, player_pos, chunks);
                }
                for enemy in &mut state.archers {
                    enemy.update(dt, player_pos, chunks);
                }
            }

            let rightmost = state.streamer.rightmost_edge();
            state.bruiser_spawner.update(
                dt,
                player_pos,
                &mut state.bruisers,
                rightmost,
                state.streamer.chunks(),
                &state.assets,
            );
            state.archer_spawner.update(
                dt,
                player_pos,
                &mut state.archers,
                rightmost,
                state.streamer.chunks(),
                &state.assets,
            );

            // Combat resolution, both directions. Melee lands through its
            // hitbox; archers release an arrow that carries the hit.
            let band = state.tempo.band();
            combat::resolve_enemy_attacks(&mut state.player, &mut state.bruisers);
            projectile::release_arrows(&mut state.archers, &mut state.arrows);
            projectile::update_arrows(
                &mut state.arrows,
                &mut state.player,
                state.streamer.chunks(),
                state.camera.x,
                WINDOW_WIDTH,
                dt,
            );
            state.kills += combat::resolve_player_attack(
                &mut state.player,
                &mut state.bruisers,
                &mut state.skills,
                band,
            );
            state.kills += combat::resolve_player_attack(
                &mut state.player,
                &mut state.archers,
                &mut state.skills,
                band,
            );
        }
    }

    // Side-scroll camera: follow only past the screen margins
    let screen_x = state.player.pos.x - state.camera.x;
    if screen_x > WINDOW_WIDTH - CAMERA_MARGIN {
        state.camera.x += screen_x - (WINDOW_WIDTH - CAMERA_MARGIN);
    } else if screen_x < CAMERA_MARGIN {
        state.camera.x -= CAMERA_MARGIN - screen_x;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::AssetRegistry;
    use crate::consts::SIM_DT;
    use crate::world::Theme;

    fn state() -> GameState {
        GameState::new(AssetRegistry::new("assets"), 4242).unwrap()
    }

    fn expedition_state() -> GameState {
        let mut s = state();
        let input = TickInput {
            start_expedition: true,
            bpm: 100.0,
            ..Default::default()
        };
        tick(&mut s, &input, SIM_DT);
        assert_eq!(s.mode, Mode::Expedition);
        s
    }

    #[test]
    fn test_hub_ignores_combat_and_spawning() {
        let mut s = state();
        for _ in 0..(10 * 60) {
            tick(&mut s, &TickInput::default(), SIM_DT);
        }
        assert_eq!(s.mode, Mode::Hub);
        assert_eq!(s.live_enemy_count(), 0);
        assert_eq!(s.player.health, s.player.max_health);
    }

    #[test]
    fn test_spawn_caps_hold_through_a_long_run() {
        let mut s = expedition_state();
        let input = TickInput {
            move_right: true,
            bpm: 160.0, // hard tier, max pressure
            ..Default::default()
        };
        for _ in 0..(60 * 60) {
            tick(&mut s, &input, SIM_DT);
            let bruiser_cap = s.bruiser_spawner.config().max_active;
            let archer_cap = s.archer_spawner.config().max_active;
            assert!(s.bruiser_spawner.active_count(&s.bruisers) <= bruiser_cap);
            assert!(s.archer_spawner.active_count(&s.archers) <= archer_cap);
        }
        assert!(s.bruiser_spawner.total_spawned() > 1);
    }

    #[test]
    fn test_rising_tempo_hardens_difficulty() {
        let mut s = expedition_state();

        let slow = TickInput { bpm: 70.0, ..Default::default() };
        for _ in 0..600 {
            tick(&mut s, &slow, SIM_DT);
        }
        let easy_cap = s.bruiser_spawner.config().max_active;

        let fast = TickInput { bpm: 160.0, ..Default::default() };
        for _ in 0..1200 {
            tick(&mut s, &fast, SIM_DT);
        }
        let hard_cap = s.bruiser_spawner.config().max_active;
        assert!(hard_cap > easy_cap);
        assert_eq!(s.tempo.band(), crate::tempo::BpmBand::High);
    }

    #[test]
    fn test_theme_switch_repoints_streamer() {
        let mut s = expedition_state();
        // 100 BPM run starts in Forest; sustained 160 crosses into Factory
        assert_eq!(s.themes.current(), Theme::Forest);

        let fast = TickInput { bpm: 170.0, ..Default::default() };
        for _ in 0..(30 * 60) {
            tick(&mut s, &fast, SIM_DT);
        }
        assert_eq!(s.themes.current(), Theme::Factory);
    }

    #[test]
    fn test_camera_follows_past_margin() {
        let mut s = expedition_state();
        assert_eq!(s.camera.x, 0.0);

        let input = TickInput { move_right: true, ..Default::default() };
        // Walk until the player passes the right margin
        for _ in 0..(30 * 60) {
            tick(&mut s, &input, SIM_DT);
            if s.camera.x > 0.0 {
                break;
            }
        }
        assert!(s.camera.x > 0.0);
        let screen_x = s.player.pos.x - s.camera.x;
        assert!(screen_x <= WINDOW_WIDTH - CAMERA_MARGIN + 1.0);
    }

    #[test]
    fn test_same_seed_same_run() {
        let mut a = expedition_state();
        let mut b = {
            let mut s = GameState::new(AssetRegistry::new("assets"), 4242).unwrap();
            let input = TickInput {
                start_expedition: true,
                bpm: 100.0,
                ..Default::default()
            };
            tick(&mut s, &input, SIM_DT);
            s
        };

        let input = TickInput {
            move_right: true,
            bpm: 120.0,
            ..Default::default()
        };
        for _ in 0..600 {
            tick(&mut a, &input, SIM_DT);
            tick(&mut b, &input, SIM_DT);
        }
        assert_eq!(a.player.pos, b.player.pos);
        assert_eq!(a.bruisers.len(), b.bruisers.len());
        assert_eq!(a.bruiser_spawner.total_spawned(), b.bruiser_spawner.total_spawned());
    }

    #[test]
    fn test_fixed_timestep_drains_whole_steps() {
        let mut clock = FixedTimestep::new();
        clock.begin_frame(4.5 * SIM_DT);

        let mut steps = 0;
        while clock.step() {
            steps += 1;
        }
        assert_eq!(steps, 4);
        // The half-step remainder carries into the next frame
        clock.begin_frame(0.6 * SIM_DT);
        assert!(clock.step());
        assert!(!clock.step());
    }

    #[test]
    fn test_fixed_timestep_caps_catch_up() {
        let mut clock = FixedTimestep::new();
        // A ten-second stall must not replay ten seconds of simulation
        clock.begin_frame(10.0);

        let mut steps = 0;
        while clock.step() {
            steps += 1;
        }
        assert!(steps <= MAX_SUBSTEPS);
        assert!(steps >= 1);
    }

    #[test]
    fn test_dead_player_stops_receiving_intents() {
        let mut s = expedition_state();
        s.player.health = 0;
        let before = s.player.pos;
        let input = TickInput { move_right: true, ..Default::default() };
        tick(&mut s, &input, SIM_DT);
        assert_eq!(s.player.pos, before);
    }
}
