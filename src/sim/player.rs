//! The player actor
//!
//! Movement intents come in through `TickInput`; the player never reads the
//! OS directly. Attack and defend only start when standing still on the
//! ground, healing locks out every other intent until its animation ends.

use glam::Vec2;

use crate::assets::AssetRegistry;
use crate::sim::animation::{AnimKind, Animator};
use crate::sim::collision;
use crate::world::chunk::Chunk;

pub const PLAYER_SPEED: f32 = 200.0;
pub const PLAYER_MAX_SPEED: f32 = 550.0;
/// Upward jump impulse (negative Y is up)
pub const PLAYER_JUMP_IMPULSE: f32 = -90.0;
/// Player fall acceleration; deliberately floatier than enemy gravity
pub const PLAYER_GRAVITY: f32 = 50.0;
pub const PLAYER_MAX_HEALTH: i32 = 5;
pub const PLAYER_HEAL_CHARGES: u32 = 2;
/// Attack hitbox placement
pub const PLAYER_HITBOX_OFFSET: f32 = 60.0;
pub const PLAYER_HITBOX_RADIUS: f32 = 50.0;
/// Body circle used when enemies test their attacks against us
pub const PLAYER_BODY_RADIUS: f32 = 40.0;
/// Inclusive attack-clip frames that can deal damage
pub const PLAYER_DAMAGE_FRAMES: (u32, u32) = (3, 5);
/// Inclusive defend-clip frames that block incoming damage
pub const PLAYER_BLOCK_FRAMES: (u32, u32) = (1, 5);
/// Seconds of lost control after taking a hit
pub const KNOCKBACK_DURATION: f32 = 0.25;
const KNOCKBACK_SPEED: f32 = 300.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlayerState {
    #[default]
    Idle,
    Running,
    Attack,
    Defend,
    JumpStart,
    Jump,
    JumpFall,
    Healing,
}

impl PlayerState {
    fn anim_kind(self) -> AnimKind {
        match self {
            PlayerState::Idle => AnimKind::Idle,
            PlayerState::Running => AnimKind::Run,
            PlayerState::Attack => AnimKind::Attack,
            PlayerState::Defend => AnimKind::Defend,
            PlayerState::JumpStart => AnimKind::JumpStart,
            PlayerState::Jump => AnimKind::Jump,
            PlayerState::JumpFall => AnimKind::JumpFall,
            PlayerState::Healing => AnimKind::Heal,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Player {
    pub pos: Vec2,
    pub vel: Vec2,
    pub facing_right: bool,
    pub health: i32,
    pub max_health: i32,
    pub heal_charges: u32,
    pub state: PlayerState,
    pub animator: Animator,
    pub on_ground: bool,
    pub knockback_timer: f32,
    /// True only on damage-window frames of an unspent swing
    pub can_damage_enemy: bool,
    /// Latched after the first enemy hit of a swing
    pub has_dealt_damage: bool,
    /// True while the defend window is active
    pub can_block: bool,
    is_attacking: bool,
    is_defending: bool,
    is_healing: bool,
    move_held: bool,
}

impl Player {
    pub fn new(assets: &AssetRegistry) -> Self {
        Self {
            pos: Vec2::new(90.0, 650.0),
            vel: Vec2::ZERO,
            facing_right: true,
            health: PLAYER_MAX_HEALTH,
            max_health: PLAYER_MAX_HEALTH,
            heal_charges: PLAYER_HEAL_CHARGES,
            state: PlayerState::Idle,
            animator: Animator::new(assets.player_anims(), 0.2),
            on_ground: false,
            knockback_timer: 0.0,
            can_damage_enemy: false,
            has_dealt_damage: false,
            can_block: false,
            is_attacking: false,
            is_defending: false,
            is_healing: false,
            move_held: false,
        }
    }

    #[cfg(test)]
    pub(crate) fn new_for_tests() -> Self {
        Self::new(&AssetRegistry::new("assets"))
    }

    #[inline]
    pub fn is_alive(&self) -> bool {
        self.health > 0
    }

    // --- movement intents ---

    pub fn move_left(&mut self) {
        if !self.is_healing {
            self.vel.x = -PLAYER_SPEED;
            self.facing_right = false;
            self.move_held = true;
        }
    }

    pub fn move_right(&mut self) {
        if !self.is_healing {
            self.vel.x = PLAYER_SPEED;
            self.facing_right = true;
            self.move_held = true;
        }
    }

    pub fn jump(&mut self) {
        if !self.is_healing && self.on_ground {
            self.vel.y += PLAYER_JUMP_IMPULSE;
            self.on_ground = false;
            self.state = PlayerState::JumpStart;
        }
    }

    /// Swings only from a standstill on the ground
    pub fn attack(&mut self) {
        if self.vel.x == 0.0 && self.on_ground {
            self.is_attacking = true;
        }
    }

    pub fn defend(&mut self) {
        if self.vel.x == 0.0 && self.on_ground {
            self.is_defending = true;
        }
    }

    pub fn heal(&mut self) {
        if self.on_ground && !self.is_healing && self.heal_charges > 0 {
            self.is_healing = true;
            self.state = PlayerState::Healing;
        }
    }

    /// Take a hit: health clamps to [0, max], knockback pushes away from
    /// the attacker
    pub fn take_damage(&mut self, amount: i32, from_x: f32) {
        self.health = (self.health - amount).clamp(0, self.max_health);
        self.knockback_timer = KNOCKBACK_DURATION;
        self.vel.x = if self.pos.x < from_x {
            -KNOCKBACK_SPEED
        } else {
            KNOCKBACK_SPEED
        };
    }

    /// Restore health without exceeding the (skill-adjusted) maximum
    pub fn restore(&mut self, amount: i32) {
        self.health = (self.health + amount).clamp(0, self.max_health);
    }

    /// World-space attack hitbox (center, radius)
    pub fn attack_hitbox(&self) -> (Vec2, f32) {
        let offset = if self.facing_right {
            PLAYER_HITBOX_OFFSET
        } else {
            -PLAYER_HITBOX_OFFSET
        };
        (Vec2::new(self.pos.x + offset, self.pos.y), PLAYER_HITBOX_RADIUS)
    }

    pub fn mark_damage_dealt(&mut self) {
        self.has_dealt_damage = true;
        self.can_damage_enemy = false;
    }

    fn pick_state(&mut self) {
        if !self.on_ground {
            if self.state == PlayerState::JumpStart {
                if self.animator.on_last_frame() && self.vel.y >= 0.0 {
                    self.state = PlayerState::JumpFall;
                }
            } else if self.vel.y > 0.0 {
                self.state = PlayerState::JumpFall;
            } else if self.state != PlayerState::Jump {
                self.state = PlayerState::Jump;
            }
            return;
        }

        if self.is_attacking {
            self.state = PlayerState::Attack;
        } else if self.is_defending {
            self.state = PlayerState::Defend;
        } else if self.is_healing {
            self.state = PlayerState::Healing;
        } else if self.vel.x.abs() > 0.0 {
            self.state = PlayerState::Running;
        } else {
            self.state = PlayerState::Idle;
        }
    }

    /// Finish one-shot animations; healing applies its effect on the
    /// final frame
    fn finish_one_shots(&mut self) {
        if !self.animator.on_last_frame() {
            return;
        }
        match self.state {
            PlayerState::Attack => self.is_attacking = false,
            PlayerState::Defend => self.is_defending = false,
            PlayerState::Healing => {
                if self.heal_charges > 0 {
                    self.heal_charges -= 1;
                    self.health = self.max_health;
                }
                self.is_healing = false;
            }
            _ => {}
        }
    }

    /// Per-tick update; intents must already be applied
    pub fn update(&mut self, dt: f32, chunks: &[Chunk]) {
        if self.knockback_timer > 0.0 {
            self.knockback_timer -= dt;
        }

        self.pick_state();
        self.animator.set_kind(self.state.anim_kind());
        self.animator.advance(dt);
        self.finish_one_shots();

        self.vel.x = self.vel.x.clamp(-PLAYER_MAX_SPEED, PLAYER_MAX_SPEED);

        collision::resolve_horizontal(
            &mut self.pos,
            &mut self.vel,
            collision::ENEMY_HITBOX_WIDTH / 2.0,
            collision::ENEMY_HITBOX_HEIGHT / 2.0,
            chunks,
            dt,
        );
        self.on_ground =
            collision::apply_gravity_and_ground(&mut self.pos, &mut self.vel, chunks, dt, PLAYER_GRAVITY);

        // Instant stop when no move input is held, unless knocked back
        if self.knockback_timer <= 0.0 && !self.move_held {
            self.vel.x = 0.0;
        }
        self.move_held = false;

        // Damage and block windows
        let frame = self.animator.frame();
        if self.state == PlayerState::Attack {
            let (lo, hi) = PLAYER_DAMAGE_FRAMES;
            self.can_damage_enemy = (lo..=hi).contains(&frame) && !self.has_dealt_damage;
        } else {
            self.can_damage_enemy = false;
            self.has_dealt_damage = false;
        }
        let (lo, hi) = PLAYER_BLOCK_FRAMES;
        self.can_block = self.state == PlayerState::Defend && (lo..=hi).contains(&frame);
    }
}
