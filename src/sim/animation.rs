//! Animation clip metadata and frame clocks
//!
//! No texture handles live here: a clip is layout metadata (frame count and
//! cell size in the sprite sheet) and the animator is the frame clock. The
//! renderer looks up the sheet for an actor and slices it with
//! `Animator::frame()`.
//!
//! Selection is always by `AnimKind` into a fixed-size set. Nothing ever
//! caches a reference to a clip across frames.

/// Which clip an actor is showing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AnimKind {
    #[default]
    Idle,
    Run,
    Attack,
    Defend,
    JumpStart,
    Jump,
    JumpFall,
    Heal,
}

impl AnimKind {
    pub const COUNT: usize = 8;

    #[inline]
    const fn index(self) -> usize {
        match self {
            AnimKind::Idle => 0,
            AnimKind::Run => 1,
            AnimKind::Attack => 2,
            AnimKind::Defend => 3,
            AnimKind::JumpStart => 4,
            AnimKind::Jump => 5,
            AnimKind::JumpFall => 6,
            AnimKind::Heal => 7,
        }
    }
}

/// One animation strip: frame count plus cell dimensions in the sheet.
/// A zero-frame clip means "this actor has no such animation".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AnimClip {
    pub frames: u32,
    pub frame_width: u32,
    pub frame_height: u32,
}

impl AnimClip {
    pub const fn new(frames: u32, frame_width: u32, frame_height: u32) -> Self {
        Self {
            frames,
            frame_width,
            frame_height,
        }
    }
}

/// Fixed, enum-keyed clip table for one actor kind
#[derive(Debug, Clone, Copy, Default)]
pub struct AnimSet {
    clips: [AnimClip; AnimKind::COUNT],
}

impl AnimSet {
    pub const fn empty() -> Self {
        Self {
            clips: [AnimClip::new(0, 0, 0); AnimKind::COUNT],
        }
    }

    pub const fn with(mut self, kind: AnimKind, clip: AnimClip) -> Self {
        self.clips[kind.index()] = clip;
        self
    }

    #[inline]
    pub fn clip(&self, kind: AnimKind) -> AnimClip {
        self.clips[kind.index()]
    }
}

/// Frame clock for one actor
///
/// Frames advance at `rate * 60` frames per second, matching the sheet
/// layouts the clip tables describe.
#[derive(Debug, Clone)]
pub struct Animator {
    set: AnimSet,
    kind: AnimKind,
    frame: u32,
    acc: f32,
    rate: f32,
}

impl Animator {
    pub fn new(set: AnimSet, rate: f32) -> Self {
        Self {
            set,
            kind: AnimKind::Idle,
            frame: 0,
            acc: 0.0,
            rate,
        }
    }

    /// Switch clips; restarts the frame clock only on an actual change
    pub fn set_kind(&mut self, kind: AnimKind) {
        if self.kind != kind {
            self.kind = kind;
            self.frame = 0;
            self.acc = 0.0;
        }
    }

    /// Advance the frame clock by `dt` seconds
    pub fn advance(&mut self, dt: f32) {
        let clip = self.set.clip(self.kind);
        if clip.frames == 0 {
            return;
        }
        self.acc += self.rate * 60.0 * dt;
        if self.acc >= 1.0 {
            self.frame = (self.frame + 1) % clip.frames;
            self.acc = 0.0;
        }
    }

    /// Restart the current clip from frame zero
    pub fn reset(&mut self) {
        self.kind = AnimKind::Idle;
        self.frame = 0;
        self.acc = 0.0;
    }

    #[inline]
    pub fn kind(&self) -> AnimKind {
        self.kind
    }

    #[inline]
    pub fn frame(&self) -> u32 {
        self.frame
    }

    #[inline]
    pub fn clip(&self) -> AnimClip {
        self.set.clip(self.kind)
    }

    /// True once the current clip has reached its final frame
    #[inline]
    pub fn on_last_frame(&self) -> bool {
        let clip = self.set.clip(self.kind);
        clip.frames > 0 && self.frame + 1 >= clip.frames
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_set() -> AnimSet {
        AnimSet::empty()
            .with(AnimKind::Idle, AnimClip::new(4, 96, 96))
            .with(AnimKind::Attack, AnimClip::new(5, 96, 96))
    }

    #[test]
    fn test_advance_wraps() {
        let mut anim = Animator::new(test_set(), 1.0);
        // rate 1.0 => one frame per 1/60 s
        for _ in 0..4 {
            anim.advance(1.0 / 60.0);
        }
        assert_eq!(anim.frame(), 0); // wrapped 0->1->2->3->0
    }

    #[test]
    fn test_kind_change_resets_clock() {
        let mut anim = Animator::new(test_set(), 1.0);
        anim.advance(1.0 / 60.0);
        assert_eq!(anim.frame(), 1);

        anim.set_kind(AnimKind::Attack);
        assert_eq!(anim.frame(), 0);

        // Same kind again: no reset
        anim.advance(1.0 / 60.0);
        anim.set_kind(AnimKind::Attack);
        assert_eq!(anim.frame(), 1);
    }

    #[test]
    fn test_on_last_frame() {
        let mut anim = Animator::new(test_set(), 1.0);
        anim.set_kind(AnimKind::Attack);
        for _ in 0..4 {
            assert!(!anim.on_last_frame());
            anim.advance(1.0 / 60.0);
        }
        assert_eq!(anim.frame(), 4);
        assert!(anim.on_last_frame());
    }

    #[test]
    fn test_zero_frame_clip_is_inert() {
        let mut anim = Animator::new(test_set(), 1.0);
        anim.set_kind(AnimKind::Heal); // not in the set
        anim.advance(1.0);
        assert_eq!(anim.frame(), 0);
    }
}
