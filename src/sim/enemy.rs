//! The enemy combatant: one state machine, parameterized per archetype
//!
//! Melee and ranged enemies share the same four-state shape; everything
//! that differs between them (ranges, standoff, cooldown, speed, damage
//! window) comes from the archetype's `BehaviorProfile`. The optional
//! standoff block is what produces the archer's kiting.

use glam::Vec2;

use crate::assets::AssetRegistry;
use crate::sim::animation::{AnimKind, AnimSet, Animator};
use crate::sim::collision;
use crate::tuning::Archetype;
use crate::world::chunk::Chunk;

/// Behavior state shared by every archetype
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EnemyState {
    #[default]
    Idle,
    Running,
    Attacking,
    Defending,
}

impl EnemyState {
    fn anim_kind(self) -> AnimKind {
        match self {
            EnemyState::Idle => AnimKind::Idle,
            EnemyState::Running => AnimKind::Run,
            EnemyState::Attacking => AnimKind::Attack,
            EnemyState::Defending => AnimKind::Defend,
        }
    }
}

/// One enemy actor. Constructed inert, bound to animation data by
/// `set_up`, and recycled through `reset` when its slot is reused.
#[derive(Debug, Clone)]
pub struct Enemy {
    pub archetype: Archetype,
    pub pos: Vec2,
    pub vel: Vec2,
    pub health: i32,
    pub state: EnemyState,
    pub facing_right: bool,
    pub animator: Animator,
    /// Seconds until the next attack may start
    pub attack_cooldown: f32,
    /// True only on damage-window frames of an unspent attack
    pub can_damage: bool,
    /// Latched after the first hit of an attack; cleared on leaving it
    pub has_dealt_damage: bool,
    ready: bool,
}

impl Enemy {
    pub fn new(archetype: Archetype) -> Self {
        let profile = archetype.profile();
        Self {
            archetype,
            pos: Vec2::ZERO,
            vel: Vec2::ZERO,
            health: profile.max_health,
            state: EnemyState::Idle,
            facing_right: false,
            animator: Animator::new(AnimSet::empty(), profile.anim_rate),
            attack_cooldown: 0.0,
            can_damage: false,
            has_dealt_damage: false,
            ready: false,
        }
    }

    /// Bind animation data from the registry. Must run once before the
    /// first update; `reset` alone is enough afterwards.
    pub fn set_up(&mut self, assets: &AssetRegistry) {
        self.animator = Animator::new(
            assets.enemy_anims(self.archetype),
            self.archetype.profile().anim_rate,
        );
        self.ready = true;
    }

    /// Re-arm a dead slot in place without reallocating
    pub fn reset(&mut self) {
        let profile = self.archetype.profile();
        self.health = profile.max_health;
        self.state = EnemyState::Idle;
        self.vel = Vec2::ZERO;
        self.attack_cooldown = 0.0;
        self.can_damage = false;
        self.has_dealt_damage = false;
        self.animator.reset();
    }

    #[inline]
    pub fn is_alive(&self) -> bool {
        self.health > 0
    }

    /// Health clamps to [0, max]; a dead slot stays claimable by the
    /// spawn manager
    pub fn take_damage(&mut self, amount: i32) {
        let max = self.archetype.profile().max_health;
        self.health = (self.health - amount).clamp(0, max);
    }

    /// World-space attack hitbox (center, radius), in front of the actor
    pub fn attack_hitbox(&self) -> (Vec2, f32) {
        let profile = self.archetype.profile();
        let offset = if self.facing_right {
            profile.hitbox_offset
        } else {
            -profile.hitbox_offset
        };
        (Vec2::new(self.pos.x + offset, self.pos.y), profile.hitbox_radius)
    }

    /// Consume the attack: no further damage until the next activation
    pub fn mark_damage_dealt(&mut self) {
        self.has_dealt_damage = true;
        self.can_damage = false;
    }

    fn set_state(&mut self, new_state: EnemyState) {
        if self.state == new_state {
            return;
        }
        // Leaving an attack arms the cooldown and clears the latch
        if self.state == EnemyState::Attacking {
            self.attack_cooldown = self.archetype.profile().attack_cooldown;
            self.has_dealt_damage = false;
        }
        self.state = new_state;
        self.animator.set_kind(new_state.anim_kind());
    }

    /// Per-tick transition policy. Sets state and x-velocity; movement is
    /// committed by the collision pass afterwards.
    pub fn ai_behavior(&mut self, player_pos: Vec2, dt: f32) {
        let profile = self.archetype.profile();
        let distance = self.pos.distance(player_pos);

        self.facing_right = player_pos.x > self.pos.x;

        if self.attack_cooldown > 0.0 {
            self.attack_cooldown -= dt;
        }

        if let Some(standoff) = profile.standoff {
            // Too close: retreat to keep the standoff distance
            if distance < standoff.preferred - standoff.retreat_slack {
                self.set_state(EnemyState::Running);
                let dir = if self.facing_right { -1.0 } else { 1.0 };
                self.vel.x = dir * profile.speed;
                return;
            }
            // In the firing band and off cooldown: shoot
            if distance <= profile.attack_range
                && distance >= standoff.preferred - standoff.attack_band
                && self.attack_cooldown <= 0.0
            {
                self.set_state(EnemyState::Attacking);
                self.vel.x = 0.0;
                return;
            }
        } else if distance <= profile.attack_range && self.attack_cooldown <= 0.0 {
            self.set_state(EnemyState::Attacking);
            self.vel.x = 0.0;
            return;
        }

        if distance <= profile.attack_range && self.attack_cooldown > 0.0 {
            // Holds position until the cooldown clears; no re-engage
            self.set_state(EnemyState::Idle);
            self.vel.x = 0.0;
        } else if distance > profile.attack_range && distance <= profile.detection_range {
            self.set_state(EnemyState::Running);
            let dir = if self.facing_right { 1.0 } else { -1.0 };
            self.vel.x = dir * profile.speed;
        } else {
            self.set_state(EnemyState::Idle);
            self.vel.x = 0.0;
        }
    }

    /// Full per-tick update: AI, ledge guard, collision, animation, and the
    /// attack damage window. Dead or un-setup slots do nothing.
    pub fn update(&mut self, dt: f32, player_pos: Vec2, chunks: &[Chunk]) {
        if !self.ready || !self.is_alive() {
            return;
        }
        let profile = self.archetype.profile();

        self.ai_behavior(player_pos, dt);

        // Never walk off a platform edge; probe in the movement direction
        // (a kiting archer moves away from where it faces)
        if self.state == EnemyState::Running {
            collision::check_ledge(self.pos, self.vel.x > 0.0, &mut self.vel, profile.speed, chunks);
        }

        collision::resolve_horizontal(
            &mut self.pos,
            &mut self.vel,
            collision::ENEMY_HITBOX_WIDTH / 2.0,
            collision::ENEMY_HITBOX_HEIGHT / 2.0,
            chunks,
            dt,
        );
        collision::ground_actor(&mut self.pos, &mut self.vel, chunks, dt);

        self.animator.advance(dt);

        // Attack finished: fall back to chasing or idling
        if self.state == EnemyState::Attacking && self.animator.on_last_frame() {
            if self.pos.distance(player_pos) <= profile.detection_range {
                self.set_state(EnemyState::Running);
            } else {
                self.set_state(EnemyState::Idle);
            }
        }

        // Damage window bookkeeping
        if self.state != EnemyState::Attacking {
            self.has_dealt_damage = false;
            self.can_damage = false;
        } else {
            let frame = self.animator.frame();
            let (lo, hi) = profile.damage_frames;
            self.can_damage = (lo..=hi).contains(&frame) && !self.has_dealt_damage;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::SIM_DT;

    fn registry() -> AssetRegistry {
        AssetRegistry::new("assets")
    }

    fn bruiser_at(x: f32) -> Enemy {
        let mut e = Enemy::new(Archetype::Bruiser);
        e.set_up(&registry());
        e.pos = Vec2::new(x, 0.0);
        e
    }

    fn archer_at(x: f32) -> Enemy {
        let mut e = Enemy::new(Archetype::Archer);
        e.set_up(&registry());
        e.pos = Vec2::new(x, 0.0);
        e
    }

    #[test]
    fn test_melee_transition_ladder() {
        // Detection 450, attack 120
        let mut e = bruiser_at(0.0);

        // Distance 500: out of detection, stays idle
        e.ai_behavior(Vec2::new(500.0, 0.0), SIM_DT);
        assert_eq!(e.state, EnemyState::Idle);
        assert_eq!(e.vel.x, 0.0);

        // Distance 400: chases
        e.ai_behavior(Vec2::new(400.0, 0.0), SIM_DT);
        assert_eq!(e.state, EnemyState::Running);
        assert!(e.vel.x > 0.0);

        // Distance 100: attacks, velocity zeroed
        e.ai_behavior(Vec2::new(100.0, 0.0), SIM_DT);
        assert_eq!(e.state, EnemyState::Attacking);
        assert_eq!(e.vel.x, 0.0);
    }

    #[test]
    fn test_melee_cooldown_holds_idle_in_range() {
        let mut e = bruiser_at(0.0);
        let player = Vec2::new(100.0, 0.0);

        // Run one full attack without chunks under it
        e.ai_behavior(player, SIM_DT);
        assert_eq!(e.state, EnemyState::Attacking);

        // Drive the animator through the attack clip
        let mut left_attack = false;
        for _ in 0..600 {
            e.animator.advance(SIM_DT);
            if e.animator.on_last_frame() {
                // In range: falls back to Running per the completion rule,
                // then the next ai tick holds Idle on cooldown
                e.set_state(EnemyState::Running);
                left_attack = true;
                break;
            }
        }
        assert!(left_attack);
        assert!(e.attack_cooldown > 0.0);

        e.ai_behavior(player, SIM_DT);
        assert_eq!(e.state, EnemyState::Idle);

        // Cooldown expires after attack_cooldown seconds of ticks
        let ticks = (e.archetype.profile().attack_cooldown / SIM_DT).ceil() as u32 + 1;
        for _ in 0..ticks {
            e.ai_behavior(player, SIM_DT);
        }
        assert_eq!(e.state, EnemyState::Attacking);
    }

    #[test]
    fn test_archer_kites_when_crowded() {
        // Preferred 420, slack 80: retreat under 340
        let mut e = archer_at(0.0);
        e.ai_behavior(Vec2::new(200.0, 0.0), SIM_DT);
        assert_eq!(e.state, EnemyState::Running);
        // Player is to the right; archer backs off to the left
        assert!(e.vel.x < 0.0);
        assert!(e.facing_right);
    }

    #[test]
    fn test_archer_fires_only_in_band() {
        // Band is [400, 550] with cooldown ready
        let mut e = archer_at(0.0);
        e.ai_behavior(Vec2::new(450.0, 0.0), SIM_DT);
        assert_eq!(e.state, EnemyState::Attacking);

        // Inside the band floor but above retreat range: no shot, no chase
        let mut e = archer_at(0.0);
        e.ai_behavior(Vec2::new(370.0, 0.0), SIM_DT);
        assert_eq!(e.state, EnemyState::Idle);

        // Beyond attack range but detected: close in
        let mut e = archer_at(0.0);
        e.ai_behavior(Vec2::new(580.0, 0.0), SIM_DT);
        assert_eq!(e.state, EnemyState::Running);
        assert!(e.vel.x > 0.0);
    }

    #[test]
    fn test_damage_window_opens_once() {
        let mut e = bruiser_at(0.0);
        let player = Vec2::new(100.0, 0.0);
        let chunks: Vec<Chunk> = Vec::new();

        let mut windows_opened = 0;
        let mut was_open = false;
        // One attack is 5 frames at rate 0.2 (12 fps); 600 ticks covers it
        for _ in 0..600 {
            e.update(SIM_DT, player, &chunks);
            if e.can_damage && !was_open {
                windows_opened += 1;
                e.mark_damage_dealt();
            }
            was_open = e.can_damage;
            if e.attack_cooldown > 0.0 {
                break; // attack completed
            }
        }
        assert_eq!(windows_opened, 1);
        assert!(!e.can_damage);
    }

    #[test]
    fn test_health_clamps_and_frees_slot() {
        let mut e = bruiser_at(0.0);
        e.take_damage(1);
        assert_eq!(e.health, 1);
        e.take_damage(100);
        assert_eq!(e.health, 0);
        assert!(!e.is_alive());

        // Dead slots ignore updates
        let before = e.pos;
        e.update(SIM_DT, Vec2::new(100.0, 0.0), &[]);
        assert_eq!(e.pos, before);

        e.reset();
        assert_eq!(e.health, e.archetype.profile().max_health);
        assert_eq!(e.state, EnemyState::Idle);
        assert!(!e.has_dealt_damage);
    }

    #[test]
    fn test_facing_tracks_player() {
        let mut e = bruiser_at(100.0);
        e.ai_behavior(Vec2::new(400.0, 0.0), SIM_DT);
        assert!(e.facing_right);
        e.ai_behavior(Vec2::new(-200.0, 0.0), SIM_DT);
        assert!(!e.facing_right);

        let (hitbox, _) = e.attack_hitbox();
        assert!(hitbox.x < e.pos.x);
    }

    mod props {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            /// Health never escapes [0, max] under arbitrary damage sequences
            #[test]
            fn prop_health_stays_clamped(amounts in prop::collection::vec(-3i32..10, 0..64)) {
                let mut e = Enemy::new(Archetype::Bruiser);
                let max = e.archetype.profile().max_health;
                for amount in amounts {
                    e.take_damage(amount);
                    prop_assert!(e.health >= 0);
                    prop_assert!(e.health <= max);
                }
            }
        }
    }
}
