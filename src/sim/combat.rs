//! Damage resolution between the player and the enemy pools
//!
//! Overlap tests are circle-vs-circle: attack hitboxes against body
//! circles. The at-most-one-hit guarantee lives in the actors' damage
//! latches; this module is what consumes them. A blocked swing is still a
//! spent swing.

use glam::Vec2;

use crate::meta::skills::{SkillKind, SkillTree};
use crate::sim::enemy::Enemy;
use crate::sim::player::{self, Player};
use crate::tempo::BpmBand;

/// Body circle used when the player's swing tests against an enemy
pub const ENEMY_BODY_RADIUS: f32 = 40.0;

#[inline]
pub fn circles_overlap(a: Vec2, ra: f32, b: Vec2, rb: f32) -> bool {
    crate::within_radius(a, b, ra + rb)
}

/// Resolve every pending enemy attack against the player. Returns the
/// number of damage events actually delivered (blocks don't count).
pub fn resolve_enemy_attacks(player: &mut Player, enemies: &mut [Enemy]) -> u32 {
    let mut damage_events = 0;
    for enemy in enemies.iter_mut().filter(|e| e.is_alive()) {
        if !enemy.can_damage {
            continue;
        }
        let (hitbox, radius) = enemy.attack_hitbox();
        if !circles_overlap(hitbox, radius, player.pos, player::PLAYER_BODY_RADIUS) {
            continue;
        }
        if player.can_block {
            log::debug!("{} attack blocked", enemy.archetype.profile().name);
        } else {
            player.take_damage(1, enemy.pos.x);
            damage_events += 1;
            log::debug!(
                "{} hit player for 1 ({} hp left)",
                enemy.archetype.profile().name,
                player.health
            );
        }
        enemy.mark_damage_dealt();
    }
    damage_events
}

/// Resolve the player's pending swing against one enemy pool. At most one
/// enemy takes damage per activation; a kill awards a skill point. Returns
/// the number of kills.
pub fn resolve_player_attack(
    player: &mut Player,
    enemies: &mut [Enemy],
    skills: &mut SkillTree,
    band: BpmBand,
) -> u32 {
    if !player.can_damage_enemy {
        return 0;
    }
    let (hitbox, radius) = player.attack_hitbox();

    let mut kills = 0;
    for enemy in enemies.iter_mut().filter(|e| e.is_alive()) {
        if !circles_overlap(hitbox, radius, enemy.pos, ENEMY_BODY_RADIUS) {
            continue;
        }
        // Beat Fury: heavier swings while the tempo runs hot
        let damage = if band == BpmBand::High && skills.has(SkillKind::BpmDamageBoost) {
            2
        } else {
            1
        };
        enemy.take_damage(damage);
        player.mark_damage_dealt();

        if !enemy.is_alive() {
            kills += 1;
            skills.add_point();
            if skills.has(SkillKind::HealOnKill) {
                player.restore(1);
            }
            log::info!("{} defeated", enemy.archetype.profile().name);
        }
        break;
    }
    kills
}
