/// The step function: advances a level by one tick.
///
/// Processing order:
///   1. Actors act, in list order (fireballs fly, coins bob)
///   2. Player movement from the held direction
///   3. Actor contact (first overlapping actor only)
///   4. Outcome events
///   5. Finish countdown
///
/// Steps 2 and 3 are skipped once the level has an outcome; actors keep
/// moving so the end of a level is still animated.

use crate::domain::entity::ActorType;
use crate::domain::vector::Vector;
use super::event::GameEvent;
use super::level::{Level, Status, Touch};

/// Movement direction (continuous while held).
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum MoveDir {
    Left,
    Right,
    Up,
    Down,
}

impl MoveDir {
    pub fn unit(self) -> Vector {
        match self {
            MoveDir::Left => Vector::new(-1.0, 0.0),
            MoveDir::Right => Vector::new(1.0, 0.0),
            MoveDir::Up => Vector::new(0.0, -1.0),
            MoveDir::Down => Vector::new(0.0, 1.0),
        }
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct FrameInput {
    pub movement: Option<MoveDir>,
}

// ══════════════════════════════════════════════════════════════
// Main entry point
// ══════════════════════════════════════════════════════════════

/// Advance `level` by `dt` seconds. `player_speed` is in tiles per second.
pub fn step(level: &mut Level, input: FrameInput, dt: f64, player_speed: f64) -> Vec<GameEvent> {
    let mut events = Vec::new();
    let status_before = level.status();
    let coins_before = level.count_actors(ActorType::Coin);

    level.act_actors(dt);
    if level.status().is_none() {
        resolve_player_movement(level, input.movement, dt, player_speed, &mut events);
    }
    if level.status().is_none() {
        resolve_actor_contact(level, &mut events);
    }
    resolve_outcome(level, status_before, coins_before, &mut events);
    resolve_finish(level, dt, &mut events);

    events
}

// ══════════════════════════════════════════════════════════════
// Player
// ══════════════════════════════════════════════════════════════

fn resolve_player_movement(
    level: &mut Level,
    movement: Option<MoveDir>,
    dt: f64,
    player_speed: f64,
    events: &mut Vec<GameEvent>,
) {
    let Some(player) = level.player() else { return };

    let speed = movement.map_or(Vector::ZERO, |dir| dir.unit().times(player_speed));
    let next = player.pos.plus(speed.times(dt));
    let blocked = if speed == Vector::ZERO {
        None
    } else {
        level.obstacle_at(next, player.size)
    };

    if let Some(player) = level.player_mut() {
        player.speed = speed;
        if blocked.is_none() {
            player.pos = next;
        }
    }

    if let Some(obstacle) = blocked {
        if obstacle.is_lethal() {
            events.push(GameEvent::PlayerBurned { by: Touch::Obstacle(obstacle) });
        }
        level.player_touched(obstacle, None);
    }
}

fn resolve_actor_contact(level: &mut Level, events: &mut Vec<GameEvent>) {
    let Some(player) = level.player() else { return };
    let Some(other) = level.actor_at(player) else { return };
    let (id, kind, pos) = (other.id(), other.actor_type(), other.pos);

    if kind.is_lethal() {
        events.push(GameEvent::PlayerBurned { by: Touch::Actor(kind) });
    }
    level.player_touched(kind, Some(id));
    if kind == ActorType::Coin && level.actor(id).is_none() {
        events.push(GameEvent::CoinCollected { pos });
    }
}

// ══════════════════════════════════════════════════════════════
// Outcome
// ══════════════════════════════════════════════════════════════

fn resolve_outcome(
    level: &Level,
    status_before: Option<Status>,
    coins_before: usize,
    events: &mut Vec<GameEvent>,
) {
    if coins_before > 0 && level.no_more_actors(ActorType::Coin) {
        events.push(GameEvent::AllCoinsCollected);
    }
    if status_before.is_some() {
        return;
    }
    match level.status() {
        Some(Status::Won) => events.push(GameEvent::LevelWon),
        Some(Status::Lost) => events.push(GameEvent::LevelLost),
        None => {}
    }
}

fn resolve_finish(level: &mut Level, dt: f64, events: &mut Vec<GameEvent>) {
    let was_finished = level.is_finished();
    level.tick_finish_delay(dt);
    if !was_finished && level.is_finished() {
        if let Some(status) = level.status() {
            events.push(GameEvent::LevelFinished { status });
        }
    }
}
