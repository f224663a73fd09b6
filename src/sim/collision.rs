//! Shared chunk-collision helpers for all actor types
//!
//! Every query funnels through `Chunk::is_solid_world`, so everything here
//! inherits its permissive out-of-bounds policy: space past the loaded
//! window is air, never a wall.

use glam::Vec2;

use crate::consts::ACTOR_GRAVITY;
use crate::world::chunk::Chunk;

/// Generic enemy hitbox size
pub const ENEMY_HITBOX_WIDTH: f32 = 40.0;
pub const ENEMY_HITBOX_HEIGHT: f32 = 60.0;

/// Distance from an actor's position (sprite center) down to its feet
pub const FEET_OFFSET: f32 = 30.0;

/// How far ahead the AI probes for a ledge
pub const LEDGE_LOOK_AHEAD: f32 = 45.0;

#[inline]
fn solid_at(chunks: &[Chunk], x: f32, y: f32) -> bool {
    chunks.iter().any(|c| c.is_solid_world(x, y))
}

/// Snap an actor's feet onto the top of the tile row containing `feet_y`
fn snap_feet_to_tile_top(pos: &mut Vec2, chunk: &Chunk, feet_y: f32) {
    let rel = feet_y - chunk.anchor().y;
    let tile_y = (rel / chunk.tile_size()).floor();
    pos.y = chunk.anchor().y + tile_y * chunk.tile_size() - FEET_OFFSET;
}

/// Apply horizontal movement and undo it when it would push the hitbox into
/// a solid tile. Returns true when a wall was hit (x-velocity is zeroed).
pub fn resolve_horizontal(
    pos: &mut Vec2,
    vel: &mut Vec2,
    half_width: f32,
    half_height: f32,
    chunks: &[Chunk],
    dt: f32,
) -> bool {
    let old_x = pos.x;
    pos.x += vel.x * dt;

    let left = pos.x - half_width;
    let right = pos.x + half_width;
    let top = pos.y - half_height;
    // Inset so a grounded actor's bottom corners sample above the floor
    // row it is standing on, not inside it
    let bottom = pos.y + half_height - 1.0;

    let blocked = solid_at(chunks, left, top)
        || solid_at(chunks, right, top)
        || solid_at(chunks, left, bottom)
        || solid_at(chunks, right, bottom);

    if blocked {
        pos.x = old_x;
        vel.x = 0.0;
    }
    blocked
}

/// Keep an actor grounded: when a solid tile sits just below the feet, snap
/// onto it and zero the fall; otherwise integrate gravity and re-test so a
/// fast fall still lands on the tile it crossed. Returns whether the actor
/// ended the step on the ground.
pub fn apply_gravity_and_ground(
    pos: &mut Vec2,
    vel: &mut Vec2,
    chunks: &[Chunk],
    dt: f32,
    gravity: f32,
) -> bool {
    // Ground checks only apply while not moving upward, so a fresh jump
    // impulse is not immediately snapped back to the floor
    if vel.y >= 0.0 {
        let feet_y = pos.y + FEET_OFFSET;
        for chunk in chunks {
            if chunk.is_solid_world(pos.x, feet_y + 2.0) {
                snap_feet_to_tile_top(pos, chunk, feet_y + 2.0);
                vel.y = 0.0;
                return true;
            }
        }
    }

    vel.y += gravity * dt;
    pos.y += vel.y * dt;

    if vel.y >= 0.0 {
        let feet_y = pos.y + FEET_OFFSET;
        for chunk in chunks {
            if chunk.is_solid_world(pos.x, feet_y) {
                snap_feet_to_tile_top(pos, chunk, feet_y);
                vel.y = 0.0;
                return true;
            }
        }
    }
    false
}

/// Convenience wrapper using the shared actor gravity
pub fn ground_actor(pos: &mut Vec2, vel: &mut Vec2, chunks: &[Chunk], dt: f32) -> bool {
    apply_gravity_and_ground(pos, vel, chunks, dt, ACTOR_GRAVITY)
}

/// Probe ahead-and-below in the facing direction. True when no solid tile
/// is found - there is a drop the actor would walk off.
pub fn ledge_ahead(pos: Vec2, facing_right: bool, chunks: &[Chunk], look_ahead: f32) -> bool {
    let check_x = if facing_right {
        pos.x + look_ahead
    } else {
        pos.x - look_ahead
    };
    let check_y = pos.y + FEET_OFFSET + 10.0;

    let mut y_off = 0.0;
    while y_off <= 64.0 {
        if solid_at(chunks, check_x, check_y + y_off) {
            return false;
        }
        y_off += 16.0;
    }
    true
}

/// Called before committing horizontal AI movement: at a ledge the actor
/// backs away at half speed instead of advancing, so AI never walks off a
/// platform edge. Returns true when a ledge was handled.
pub fn check_ledge(
    pos: Vec2,
    facing_right: bool,
    vel: &mut Vec2,
    speed: f32,
    chunks: &[Chunk],
) -> bool {
    if vel.x != 0.0 && ledge_ahead(pos, facing_right, chunks, LEDGE_LOOK_AHEAD) {
        vel.x = if facing_right { -speed * 0.5 } else { speed * 0.5 };
        return true;
    }
    false
}

/// Scan downward from `start_y` for the first solid tile under `x` and
/// return the actor Y that stands on it. Falls back to `start_y` when the
/// scan finds nothing (spawning over a gap).
pub fn find_ground_y(x: f32, start_y: f32, chunks: &[Chunk], search_range: f32) -> f32 {
    let mut y = start_y;
    while y < start_y + search_range {
        for chunk in chunks {
            if chunk.is_solid_world(x, y) {
                let rel = y - chunk.anchor().y;
                let tile_y = (rel / chunk.tile_size()).floor();
                return chunk.anchor().y + tile_y * chunk.tile_size() - FEET_OFFSET;
            }
        }
        y += 4.0;
    }
    start_y
}

/// True when solid ground sits directly below the feet at `pos`
pub fn is_valid_spawn_position(pos: Vec2, chunks: &[Chunk]) -> bool {
    solid_at(chunks, pos.x, pos.y + FEET_OFFSET)
}
