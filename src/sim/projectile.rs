//! Arrow projectiles released by ranged enemies
//!
//! An arrow is spawned once per archer attack activation (the release
//! window consumes the attack's damage latch) and itself damages at most
//! once: any contact with the player, blocked or not, spends it.

use glam::Vec2;

use crate::sim::enemy::Enemy;
use crate::sim::player::{self, Player};
use crate::world::chunk::Chunk;

pub const ARROW_SPEED: f32 = 400.0;
/// Collision half-extents of the arrow's bounding box
pub const ARROW_HALF_WIDTH: f32 = 20.0;
pub const ARROW_HALF_HEIGHT: f32 = 8.0;
/// How far past the view an arrow may fly before it is culled
const OFF_SCREEN_SLACK: f32 = 100.0;

#[derive(Debug, Clone)]
pub struct Arrow {
    pub pos: Vec2,
    pub vel: Vec2,
    pub active: bool,
}

impl Arrow {
    pub fn new(start: Vec2, moving_right: bool, speed: f32) -> Self {
        Self {
            pos: start,
            vel: Vec2::new(if moving_right { speed } else { -speed }, 0.0),
            active: true,
        }
    }

    pub fn update(&mut self, dt: f32) {
        if self.active {
            self.pos += self.vel * dt;
        }
    }

    /// Culling test against the camera view
    pub fn is_off_screen(&self, camera_x: f32, screen_width: f32) -> bool {
        let screen_x = self.pos.x - camera_x;
        screen_x < -OFF_SCREEN_SLACK || screen_x > screen_width + OFF_SCREEN_SLACK
    }

    /// Axis-aligned box vs circle overlap
    pub fn overlaps_circle(&self, center: Vec2, radius: f32) -> bool {
        let dx = (center.x - self.pos.x).abs() - ARROW_HALF_WIDTH;
        let dy = (center.y - self.pos.y).abs() - ARROW_HALF_HEIGHT;
        let dx = dx.max(0.0);
        let dy = dy.max(0.0);
        dx * dx + dy * dy <= radius * radius
    }

    /// An arrow stops dead in solid geometry
    pub fn hits_world(&self, chunks: &[Chunk]) -> bool {
        chunks.iter().any(|c| c.is_solid_world(self.pos.x, self.pos.y))
    }
}

/// Release arrows for every archer whose damage window is open. Consuming
/// the latch here is what keeps it to one arrow per attack activation.
pub fn release_arrows(archers: &mut [Enemy], arrows: &mut Vec<Arrow>) {
    for archer in archers.iter_mut().filter(|e| e.is_alive()) {
        if !archer.can_damage {
            continue;
        }
        let (origin, _) = archer.attack_hitbox();
        arrows.push(Arrow::new(origin, archer.facing_right, ARROW_SPEED));
        archer.mark_damage_dealt();
        log::debug!("arrow released at x={:.0}", origin.x);
    }
}

/// Fly every arrow and resolve player contact. Returns damage events
/// delivered (blocked arrows spend themselves without one).
pub fn update_arrows(
    arrows: &mut Vec<Arrow>,
    player: &mut Player,
    chunks: &[Chunk],
    camera_x: f32,
    screen_width: f32,
    dt: f32,
) -> u32 {
    let mut damage_events = 0;

    for arrow in arrows.iter_mut() {
        arrow.update(dt);

        if arrow.hits_world(chunks) {
            arrow.active = false;
            continue;
        }
        if arrow.overlaps_circle(player.pos, player::PLAYER_BODY_RADIUS) {
            if player.can_block {
                log::debug!("arrow blocked");
            } else {
                player.take_damage(1, arrow.pos.x - arrow.vel.x.signum());
                damage_events += 1;
            }
            arrow.active = false;
        }
    }

    arrows.retain(|a| a.active && !a.is_off_screen(camera_x, screen_width));
    damage_events
}
