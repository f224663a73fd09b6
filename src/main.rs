//! Cadence entry point
//!
//! Runs the simulation headless with a scripted demo driver standing in
//! for a human: the rendering layer consumes the same `GameState` this
//! loop produces. The fixed-timestep accumulator drains whole simulation
//! steps (re-polling input each step) and reports once per drain.

use std::time::{Duration, Instant};

use cadence::AssetRegistry;
use cadence::consts::SIM_DT;
use cadence::sim::{FixedTimestep, GameState, Mode, TickInput, tick};
use cadence::tempo::RemoteTempo;
use cadence::tempo::poll;

struct Options {
    assets: String,
    seed: u64,
    /// Stop after this many simulation ticks (0 = run until death)
    max_ticks: u64,
    endpoint: String,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            assets: "assets".to_string(),
            seed: 0xCADE,
            max_ticks: 60 * 60,
            endpoint: poll::DEFAULT_ENDPOINT.to_string(),
        }
    }
}

fn parse_args() -> Options {
    let mut options = Options::default();
    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--assets" => {
                if let Some(v) = args.next() {
                    options.assets = v;
                }
            }
            "--seed" => {
                if let Some(v) = args.next().and_then(|v| v.parse().ok()) {
                    options.seed = v;
                }
            }
            "--ticks" => {
                if let Some(v) = args.next().and_then(|v| v.parse().ok()) {
                    options.max_ticks = v;
                }
            }
            "--tempo-url" => {
                if let Some(v) = args.next() {
                    options.endpoint = v;
                }
            }
            other => {
                eprintln!("unknown argument: {other}");
                eprintln!("usage: cadence [--assets DIR] [--seed N] [--ticks N] [--tempo-url URL]");
                std::process::exit(2);
            }
        }
    }
    options
}

/// Scripted stand-in for a human: leave the hub, press right, swing when
/// something is in reach, heal when low.
fn demo_input(state: &GameState, bpm: f32) -> TickInput {
    let mut input = TickInput {
        bpm,
        ..Default::default()
    };
    match state.mode {
        Mode::Hub => {
            // Give the hub a couple of seconds, then head out
            input.start_expedition = state.time_ticks > 120;
        }
        Mode::Expedition => {
            let player = &state.player;
            let nearest = state
                .bruisers
                .iter()
                .chain(&state.archers)
                .filter(|e| e.is_alive())
                .map(|e| e.pos.distance(player.pos))
                .fold(f32::INFINITY, f32::min);

            if player.health <= 1 && player.heal_charges > 0 {
                input.heal = true;
            } else if nearest < 110.0 {
                input.attack = true;
            } else {
                input.move_right = true;
            }
        }
    }
    input
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let options = parse_args();

    let mut assets = AssetRegistry::new(&options.assets);
    if let Err(e) = assets.verify() {
        // Missing essential world data is the one unrecoverable case
        log::error!("essential assets failed to load: {e}");
        std::process::exit(1);
    }

    let mut state = match GameState::new(assets, options.seed) {
        Ok(state) => state,
        Err(e) => {
            log::error!("initial world load failed: {e}");
            std::process::exit(1);
        }
    };

    let mut poller = RemoteTempo::start(options.endpoint.clone(), poll::DEFAULT_INTERVAL);
    log::info!(
        "cadence started: seed {}, polling {}",
        options.seed,
        options.endpoint
    );

    let mut last = Instant::now();
    let mut clock = FixedTimestep::new();
    let mut last_report = 0u64;

    while state.player.is_alive()
        && (options.max_ticks == 0 || state.time_ticks < options.max_ticks)
    {
        let now = Instant::now();
        let frame = (now - last).as_secs_f32();
        last = now;

        clock.begin_frame(frame);
        while clock.step() {
            // Input is re-polled for every simulation step
            let snapshot = poller.snapshot();
            let bpm = if snapshot.is_playing { snapshot.bpm } else { 0.0 };
            let input = demo_input(&state, bpm);
            tick(&mut state, &input, SIM_DT);
        }

        // Render hook goes here; headless, we report instead
        if state.time_ticks.saturating_sub(last_report) >= 120 {
            last_report = state.time_ticks;
            log::info!(
                "t={:>5} x={:>6.0} hp={} bpm={:>5.1} theme={:?} enemies={} kills={}",
                state.time_ticks,
                state.player.pos.x,
                state.player.health,
                state.tempo.bpm(),
                state.themes.current(),
                state.live_enemy_count(),
                state.kills,
            );
        }

        std::thread::sleep(Duration::from_millis(4));
    }

    poller.stop();
    log::info!(
        "run over after {} ticks: traveled {:.0}px, {} kills, {} hp left, {} skill points",
        state.time_ticks,
        state.player.pos.x,
        state.kills,
        state.player.health.max(0),
        state.skills.points(),
    );
}
