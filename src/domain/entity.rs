/// Actors: Player, the Fireball family, Coin, and plain actors.
///
/// One `Actor` struct carries the shared geometry (position, size, speed);
/// `ActorKind` is the closed set of behaviours. The type tag reported to the
/// level ("player", "fireball", ...) is derived from the kind, never stored.

use std::f64::consts::TAU;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use rand::Rng;

use super::tile::ObstacleMap;
use super::vector::Vector;
use crate::error::SimError;

pub const PLAYER_SIZE: Vector = Vector::new(0.8, 1.5);
/// Player sprite is taller than a tile and anchored at the tile bottom.
pub const PLAYER_SPAWN_SHIFT: Vector = Vector::new(0.0, -0.5);

pub const FIREBALL_SIZE: Vector = Vector::new(1.0, 1.0);
pub const HORIZONTAL_FIREBALL_SPEED: Vector = Vector::new(2.0, 0.0);
pub const VERTICAL_FIREBALL_SPEED: Vector = Vector::new(0.0, 2.0);
pub const FIRE_RAIN_SPEED: Vector = Vector::new(0.0, 3.0);

pub const COIN_SIZE: Vector = Vector::new(0.6, 0.6);
/// Centers the coin inside its spawn tile.
pub const COIN_SPAWN_SHIFT: Vector = Vector::new(0.2, 0.1);
pub const COIN_SPRING_SPEED: f64 = 8.0;
pub const COIN_SPRING_DIST: f64 = 0.07;

static NEXT_ACTOR_ID: AtomicU64 = AtomicU64::new(1);

/// Identity of an actor. Two actors are "the same" iff their ids match;
/// structural equality of position/size says nothing about identity.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct ActorId(u64);

impl ActorId {
    fn next() -> Self {
        ActorId(NEXT_ACTOR_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// Type tag the level reasons about.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum ActorType {
    Actor,
    Player,
    Fireball,
    Coin,
}

impl ActorType {
    pub fn as_str(self) -> &'static str {
        match self {
            ActorType::Actor => "actor",
            ActorType::Player => "player",
            ActorType::Fireball => "fireball",
            ActorType::Coin => "coin",
        }
    }

    /// Does touching an actor of this type end the level in defeat?
    pub fn is_lethal(self) -> bool {
        matches!(self, ActorType::Fireball)
    }
}

impl fmt::Display for ActorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a fireball reacts when its next position is blocked.
#[derive(Clone, Copy, PartialEq, Debug)]
pub enum FireballPath {
    /// Bounces: velocity is reversed.
    Free,
    Horizontal,
    Vertical,
    /// Falls, and on impact teleports back to where it started.
    Rain { init_pos: Vector },
}

/// Coin bobbing state. The spring phase drives a vertical offset that is
/// always applied to `init_pos`, never to the current position, so the coin
/// cannot drift.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct Coin {
    pub init_pos: Vector,
    pub spring: f64,
    pub spring_speed: f64,
    pub spring_dist: f64,
}

impl Coin {
    fn new(init_pos: Vector, phase: f64) -> Self {
        Coin {
            init_pos,
            spring: phase,
            spring_speed: COIN_SPRING_SPEED,
            spring_dist: COIN_SPRING_DIST,
        }
    }

    pub fn update_spring(&mut self, dt: f64) {
        self.spring += self.spring_speed * dt;
    }

    pub fn spring_vector(&self) -> Vector {
        Vector::new(0.0, self.spring.sin() * self.spring_dist)
    }

    /// Advance the spring and return the resulting position.
    pub fn next_position(&mut self, dt: f64) -> Vector {
        self.update_spring(dt);
        self.init_pos.plus(self.spring_vector())
    }
}

#[derive(Clone, Copy, PartialEq, Debug)]
pub enum ActorKind {
    Plain,
    /// Moved by the driver; never acts on its own.
    Player,
    Fireball(FireballPath),
    Coin(Coin),
}

#[derive(Clone, PartialEq, Debug)]
pub struct Actor {
    id: ActorId,
    pub pos: Vector,
    pub size: Vector,
    pub speed: Vector,
    pub kind: ActorKind,
}

impl Default for Actor {
    fn default() -> Self {
        Actor::build(Vector::ZERO, Vector::new(1.0, 1.0), Vector::ZERO, ActorKind::Plain)
    }
}

// ── Construction ──

impl Actor {
    /// Plain actor. Sizes must be non-negative and every component finite.
    pub fn new(pos: Vector, size: Vector, speed: Vector) -> Result<Self, SimError> {
        if !pos.is_finite() || !size.is_finite() || !speed.is_finite() {
            return Err(SimError::invalid("actor vectors must be finite"));
        }
        if size.x < 0.0 || size.y < 0.0 {
            return Err(SimError::invalid(format!(
                "actor size ({}, {}) must be non-negative", size.x, size.y
            )));
        }
        Ok(Actor::build(pos, size, speed, ActorKind::Plain))
    }

    fn build(pos: Vector, size: Vector, speed: Vector, kind: ActorKind) -> Self {
        Actor { id: ActorId::next(), pos, size, speed, kind }
    }

    pub fn player(spawn: Vector) -> Self {
        Actor::build(spawn.plus(PLAYER_SPAWN_SHIFT), PLAYER_SIZE, Vector::ZERO, ActorKind::Player)
    }

    /// Free-flying fireball that bounces off obstacles.
    pub fn fireball(pos: Vector, speed: Vector) -> Self {
        Actor::build(pos, FIREBALL_SIZE, speed, ActorKind::Fireball(FireballPath::Free))
    }

    pub fn horizontal_fireball(spawn: Vector) -> Self {
        Actor::build(
            spawn, FIREBALL_SIZE, HORIZONTAL_FIREBALL_SPEED,
            ActorKind::Fireball(FireballPath::Horizontal),
        )
    }

    pub fn vertical_fireball(spawn: Vector) -> Self {
        Actor::build(
            spawn, FIREBALL_SIZE, VERTICAL_FIREBALL_SPEED,
            ActorKind::Fireball(FireballPath::Vertical),
        )
    }

    pub fn fire_rain(spawn: Vector) -> Self {
        Actor::build(
            spawn, FIREBALL_SIZE, FIRE_RAIN_SPEED,
            ActorKind::Fireball(FireballPath::Rain { init_pos: spawn }),
        )
    }

    /// Coin with a random starting spring phase in `[0, 2π)`.
    pub fn coin(spawn: Vector) -> Self {
        let phase = rand::rng().random_range(0.0..TAU);
        Actor::coin_with_phase(spawn, phase)
    }

    /// Coin with a fixed spring phase (tests, replays).
    pub fn coin_with_phase(spawn: Vector, phase: f64) -> Self {
        let pos = spawn.plus(COIN_SPAWN_SHIFT);
        Actor::build(pos, COIN_SIZE, Vector::ZERO, ActorKind::Coin(Coin::new(pos, phase)))
    }
}

// ── Queries ──

impl Actor {
    pub fn id(&self) -> ActorId {
        self.id
    }

    pub fn actor_type(&self) -> ActorType {
        match self.kind {
            ActorKind::Plain => ActorType::Actor,
            ActorKind::Player => ActorType::Player,
            ActorKind::Fireball(_) => ActorType::Fireball,
            ActorKind::Coin(_) => ActorType::Coin,
        }
    }

    pub fn left(&self) -> f64 { self.pos.x }
    pub fn right(&self) -> f64 { self.pos.x + self.size.x }
    pub fn top(&self) -> f64 { self.pos.y }
    pub fn bottom(&self) -> f64 { self.pos.y + self.size.y }

    /// Spawn anchor for fireball rain and coins.
    pub fn init_pos(&self) -> Option<Vector> {
        match self.kind {
            ActorKind::Fireball(FireballPath::Rain { init_pos }) => Some(init_pos),
            ActorKind::Coin(coin) => Some(coin.init_pos),
            _ => None,
        }
    }

    pub fn coin_state(&self) -> Option<&Coin> {
        match &self.kind {
            ActorKind::Coin(coin) => Some(coin),
            _ => None,
        }
    }

    /// Strict AABB overlap. Shared edges do not count, so actors resting on
    /// adjacent tiles never collide. An actor never intersects itself.
    pub fn is_intersect(&self, other: &Actor) -> bool {
        if self.id == other.id {
            return false;
        }
        self.right() > other.left()
            && self.left() < other.right()
            && self.bottom() > other.top()
            && self.top() < other.bottom()
    }
}

// ── Behaviour ──

impl Actor {
    /// Where this actor would be after `dt`. Coins advance their spring
    /// as a side effect; every other kind is pure here.
    pub fn next_position(&mut self, dt: f64) -> Vector {
        match &mut self.kind {
            ActorKind::Fireball(_) => {
                if dt == 0.0 {
                    self.pos
                } else {
                    self.pos.plus(self.speed.times(dt))
                }
            }
            ActorKind::Coin(coin) => coin.next_position(dt),
            ActorKind::Plain | ActorKind::Player => self.pos,
        }
    }

    /// Reaction to a blocked move: bounce, or for rain, restart the fall.
    pub fn handle_obstacle(&mut self) {
        match self.kind {
            ActorKind::Fireball(FireballPath::Rain { init_pos }) => {
                self.pos = init_pos;
            }
            ActorKind::Fireball(_) => {
                self.speed = self.speed.times(-1.0);
            }
            ActorKind::Plain | ActorKind::Player | ActorKind::Coin(_) => {}
        }
    }

    /// Advance this actor by `dt`. Only the actor itself is mutated;
    /// the map is consulted, never changed.
    pub fn act<M: ObstacleMap + ?Sized>(&mut self, dt: f64, map: &M) {
        match self.kind {
            ActorKind::Fireball(_) => {
                let next = self.next_position(dt);
                if map.obstacle_at(next, self.size).is_none() {
                    self.pos = next;
                } else {
                    self.handle_obstacle();
                }
            }
            ActorKind::Coin(_) => {
                self.pos = self.next_position(dt);
            }
            ActorKind::Plain | ActorKind::Player => {}
        }
    }
}
