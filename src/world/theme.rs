//! Audio-reactive world theming
//!
//! The smoothed BPM picks the world skin through fixed thresholds. A theme
//! switch starts a timed crossfade; re-selection while a crossfade is in
//! flight is ignored, so one threshold crossing produces exactly one
//! transition.

/// Enumerated world skin. Determines which background, tileset, and chunk
/// files get loaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Theme {
    /// High-tempo industrial skin
    Factory,
    /// Mid-tempo woodland skin
    Forest,
    /// Low-tempo castle skin
    Medieval,
    /// The no-music staging world
    Hub,
}

impl Theme {
    pub const ALL: [Theme; 4] = [Theme::Factory, Theme::Forest, Theme::Medieval, Theme::Hub];

    /// Fixed selection thresholds over the smoothed BPM.
    /// 0 means "no signal" and maps to the hub.
    pub fn from_bpm(bpm: f32) -> Theme {
        if bpm <= 0.0 {
            Theme::Hub
        } else if bpm > 150.0 {
            Theme::Factory
        } else if bpm >= 90.0 {
            Theme::Forest
        } else {
            Theme::Medieval
        }
    }

    pub fn dir_name(self) -> &'static str {
        match self {
            Theme::Factory => "factory",
            Theme::Forest => "forest",
            Theme::Medieval => "medieval",
            Theme::Hub => "hub",
        }
    }
}

/// Crossfade length in seconds
const TRANSITION_DURATION: f32 = 1.2;

#[derive(Debug, Clone, Copy)]
struct Transition {
    to: Theme,
    timer: f32,
}

/// Tracks the active theme and the crossfade toward the next one
#[derive(Debug)]
pub struct ThemeSelector {
    current: Theme,
    transition: Option<Transition>,
    just_completed: Option<Theme>,
}

impl ThemeSelector {
    pub fn new(initial: Theme) -> Self {
        Self {
            current: initial,
            transition: None,
            just_completed: None,
        }
    }

    /// Re-evaluate the theme for the given smoothed BPM. A zero (unknown)
    /// BPM keeps whatever is showing rather than yanking the world back to
    /// the hub mid-run.
    pub fn select(&mut self, bpm: f32) {
        if bpm <= 0.0 {
            return;
        }
        let target = Theme::from_bpm(bpm);
        if target != self.current && self.transition.is_none() {
            log::info!("theme transition {:?} -> {:?} at {:.0} bpm", self.current, target, bpm);
            self.transition = Some(Transition { to: target, timer: 0.0 });
        }
    }

    /// Advance the crossfade
    pub fn update(&mut self, dt: f32) {
        if let Some(t) = &mut self.transition {
            t.timer += dt;
            if t.timer >= TRANSITION_DURATION {
                self.current = t.to;
                self.just_completed = Some(t.to);
                self.transition = None;
            }
        }
    }

    #[inline]
    pub fn current(&self) -> Theme {
        self.current
    }

    #[inline]
    pub fn is_transitioning(&self) -> bool {
        self.transition.is_some()
    }

    /// Crossfade progress in [0, 1], if one is running
    pub fn transition_progress(&self) -> Option<f32> {
        self.transition
            .map(|t| (t.timer / TRANSITION_DURATION).clamp(0.0, 1.0))
    }

    /// The theme a finished crossfade landed on, reported once.
    /// The orchestrator uses this to re-point the chunk streamer.
    pub fn take_completed_switch(&mut self) -> Option<Theme> {
        self.just_completed.take()
    }
}
