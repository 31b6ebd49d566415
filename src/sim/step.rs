/// The step function: advances the world by one frame.
///
/// Processing order:
///   1. Input (run direction, jump / double jump)
///   2. Player update (invincibility, animation, X then Y collision)
///   3. Enemy patrol / death fade
///   4. River flow
///   5. Collectible pickup
///   6. Sign pickup
///   7. Enemy contact (stomp or damage)
///   8. Door
///   9. Drowning
///  10. Camera follow, notification timer
///
/// Nothing runs while paused or once the phase has left `Playing`;
/// `restart_game` is the only way back.

use crate::domain::entity::{CollectibleKind, Facing, FrameInput};
use crate::domain::physics;
use crate::domain::rules::{SCORE_ENEMY, SCORE_SIGN, STARTING_LIVES};
use super::event::GameEvent;
use super::level::LevelError;
use super::world::{Phase, WorldState, MESSAGE_FRAMES};

// ══════════════════════════════════════════════════════════════
// Main entry point
// ══════════════════════════════════════════════════════════════

/// Advance one frame. `dt` is the frame time in seconds.
pub fn step(world: &mut WorldState, input: FrameInput, dt: f32) -> Vec<GameEvent> {
    if world.paused || world.phase != Phase::Playing { return vec![]; }

    let mut events: Vec<GameEvent> = Vec::new();
    world.elapsed += dt as f64;

    resolve_input(world, input, &mut events);
    resolve_player(world, dt);
    resolve_enemies(world);
    let view_w = world.camera.view_w;
    world.river.tick(view_w);
    resolve_collectibles(world, &mut events);
    resolve_signs(world, &mut events);
    resolve_enemy_contact(world, &mut events);
    resolve_door(world, &mut events);
    resolve_drowning(world, &mut events);

    let target = world.player.rect.center_x();
    let level_w = world.width;
    world.camera.follow(target, level_w);
    world.tick_message();

    events
}

/// New session on the same level. The best time is kept.
pub fn restart_game(world: &mut WorldState) -> Result<(), LevelError> {
    world.score = 0;
    world.lives = STARTING_LIVES;
    world.kills = 0;
    world.elapsed = 0.0;
    world.paused = false;
    world.phase = Phase::Playing;
    world.setup()?;
    log::info!("game restarted");
    Ok(())
}

// ══════════════════════════════════════════════════════════════
// Player
// ══════════════════════════════════════════════════════════════

fn resolve_input(world: &mut WorldState, input: FrameInput, events: &mut Vec<GameEvent>) {
    let speed = world.physics.move_speed;
    let p = &mut world.player;
    match input.movement {
        Some(Facing::Left) => {
            p.vx = -speed;
            p.facing = Facing::Left;
        }
        Some(Facing::Right) => {
            p.vx = speed;
            p.facing = Facing::Right;
        }
        None => p.vx = 0.0,
    }

    if input.jump {
        if p.jump(world.physics.jump_velocity) {
            events.push(GameEvent::Jumped);
        } else if p.double_jump(world.physics.double_jump_velocity) {
            events.push(GameEvent::DoubleJumped);
        }
    }
}

fn resolve_player(world: &mut WorldState, dt: f32) {
    let gravity = world.physics.gravity;
    let p = &mut world.player;
    p.tick_invincibility();
    p.animate(dt);
    physics::integrate_player(p, &world.platforms, gravity);
}

// ══════════════════════════════════════════════════════════════
// Enemies
// ══════════════════════════════════════════════════════════════

fn resolve_enemies(world: &mut WorldState) {
    world.enemies.retain_mut(|e| !e.tick());
}

// ══════════════════════════════════════════════════════════════
// Interactions
// ══════════════════════════════════════════════════════════════

fn resolve_collectibles(world: &mut WorldState, events: &mut Vec<GameEvent>) {
    let player_rect = world.player.rect;
    let mut i = 0;
    while i < world.collectibles.len() {
        if !player_rect.overlaps(&world.collectibles[i].rect) {
            i += 1;
            continue;
        }
        let item = world.collectibles.remove(i);
        world.score += item.value;
        if item.kind == CollectibleKind::Beer {
            world.lives += 1;
            world.player.double_jump_enabled = true;
            world.set_message(
                &format!("Double jump unlocked! (+{} points)", item.value),
                MESSAGE_FRAMES,
            );
        }
        events.push(GameEvent::CollectiblePicked { kind: item.kind });
    }
}

fn resolve_signs(world: &mut WorldState, events: &mut Vec<GameEvent>) {
    let player_rect = world.player.rect;
    let mut i = 0;
    while i < world.signs.len() {
        if !player_rect.overlaps(&world.signs[i].rect) {
            i += 1;
            continue;
        }
        let sign = world.signs.remove(i);
        world.score += SCORE_SIGN;
        world.set_message(
            &format!("{} (+{} points)", sign.message, SCORE_SIGN),
            MESSAGE_FRAMES,
        );
        events.push(GameEvent::SignRead);
    }
}

/// At most one enemy is resolved per frame: the first stomp or hit ends it.
fn resolve_enemy_contact(world: &mut WorldState, events: &mut Vec<GameEvent>) {
    let stomp_velocity = world.physics.stomp_velocity();

    for i in 0..world.enemies.len() {
        let enemy = &world.enemies[i];
        if !world.player.rect.overlaps(&enemy.hitbox()) { continue; }

        let from_above = world.player.vy > 0.0
            && world.player.rect.bottom() <= enemy.rect.center_y();

        if from_above {
            if !enemy.dying {
                world.enemies[i].die();
                world.kills += 1;
                world.score += SCORE_ENEMY;
                world.player.vy = stomp_velocity;
                events.push(GameEvent::EnemyStomped);
                return;
            }
        } else if !world.player.invincible && !enemy.dying {
            world.lives -= 1;
            world.player.start_invincibility();
            events.push(GameEvent::PlayerHurt { lives_left: world.lives });
            if world.lives <= 0 {
                world.phase = Phase::GameOver;
                events.push(GameEvent::PlayerDied);
                log::info!("game over: out of lives (score {})", world.score);
            }
            return;
        }
    }
}

fn resolve_door(world: &mut WorldState, events: &mut Vec<GameEvent>) {
    let door = match world.door { Some(d) => d, None => return };
    if !world.player.rect.overlaps(&door.rect) { return; }
    // Phase was Playing when this step began, so anything else ended this frame.
    if world.phase != Phase::Playing {
        log::info!(
            "door reached on the frame the game ended ({:?}); completion not recorded",
            world.phase,
        );
        return;
    }

    world.phase = Phase::Complete;
    let time = world.elapsed;
    let new_best = world.best_time.map_or(true, |best| time < best);
    if new_best {
        world.best_time = Some(time);
    }
    events.push(GameEvent::LevelComplete { time, new_best });
    log::info!(
        "level complete in {:.2}s (score {}, final {})",
        time, world.score, world.final_score(),
    );
}

fn resolve_drowning(world: &mut WorldState, events: &mut Vec<GameEvent>) {
    if world.phase != Phase::Playing { return; }
    let p = &world.player;
    if p.rect.top() > world.river.rect.top() && !p.on_ground {
        world.lives = 0;
        world.phase = Phase::GameOver;
        events.push(GameEvent::PlayerDrowned);
        log::info!("game over: drowned (score {})", world.score);
    }
}

// ══════════════════════════════════════════════════════════════
// Unit tests
// ══════════════════════════════════════════════════════════════
