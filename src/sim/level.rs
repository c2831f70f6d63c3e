/// Level: the tile grid, the actor list, and the outcome.
///
/// ## Outcome state machine
///
/// ```text
///   None ──lava / fireball touch──▶ Lost
///     │
///     └───no coin left after a touch──▶ Won
/// ```
///
/// Both outcomes are terminal: once `status` is set, `player_touched` is a
/// no-op. The driver then counts `finish_delay` down; the level is finished
/// only once it drops below zero, which leaves time for an end animation.
///
/// ## Obstacle probe
///
/// `obstacle_at` classifies a box against the grid, in this order:
///   1. left < 0, right > width, or top < 0  → Wall
///   2. bottom > height                      → Lava
///   3. first non-empty cell, row-major, over rows [floor(top), ceil(bottom))
///      and columns [round(left), round(right))
///
/// ## Player link
///
/// The player is found once, at construction, by scanning for the first
/// player-typed actor. The id is never refreshed: if that actor is later
/// removed, `player()` returns `None` while `player_id()` keeps the old id.

use crate::domain::entity::{Actor, ActorId, ActorType};
use crate::domain::tile::{Obstacle, ObstacleMap};
use crate::domain::vector::Vector;

/// Rows of cells; rows may differ in length.
pub type Grid = Vec<Vec<Option<Obstacle>>>;

pub const DEFAULT_FINISH_DELAY: f64 = 1.0;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Status {
    Won,
    Lost,
}

/// What the player ran into.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Touch {
    Obstacle(Obstacle),
    Actor(ActorType),
}

impl Touch {
    pub fn is_lethal(self) -> bool {
        match self {
            Touch::Obstacle(o) => o.is_lethal(),
            Touch::Actor(t) => t.is_lethal(),
        }
    }
}

impl From<Obstacle> for Touch {
    fn from(o: Obstacle) -> Self {
        Touch::Obstacle(o)
    }
}

impl From<ActorType> for Touch {
    fn from(t: ActorType) -> Self {
        Touch::Actor(t)
    }
}

#[derive(Clone, Debug)]
pub struct Level {
    grid: Grid,
    actors: Vec<Actor>,
    width: usize,
    height: usize,
    status: Option<Status>,
    /// Grace period after the outcome. Decremented by the driver.
    pub finish_delay: f64,
    player: Option<ActorId>,
}

// ── Construction ──

impl Level {
    pub fn new(grid: Grid, actors: Vec<Actor>) -> Self {
        let height = grid.len();
        let width = grid.iter().map(Vec::len).max().unwrap_or(0);
        let player = actors
            .iter()
            .find(|a| a.actor_type() == ActorType::Player)
            .map(Actor::id);
        Level {
            grid,
            actors,
            width,
            height,
            status: None,
            finish_delay: DEFAULT_FINISH_DELAY,
            player,
        }
    }

    pub fn with_finish_delay(mut self, delay: f64) -> Self {
        self.finish_delay = delay;
        self
    }
}

// ── Accessors ──

impl Level {
    pub fn actors(&self) -> &[Actor] { &self.actors }
    pub fn width(&self) -> usize { self.width }
    pub fn height(&self) -> usize { self.height }
    pub fn status(&self) -> Option<Status> { self.status }
    pub fn player_id(&self) -> Option<ActorId> { self.player }

    /// Grid cell at (x, y); out-of-range cells read as open air.
    pub fn cell(&self, x: usize, y: usize) -> Option<Obstacle> {
        self.grid.get(y).and_then(|row| row.get(x)).copied().flatten()
    }

    pub fn actor(&self, id: ActorId) -> Option<&Actor> {
        self.actors.iter().find(|a| a.id() == id)
    }

    pub fn actor_mut(&mut self, id: ActorId) -> Option<&mut Actor> {
        self.actors.iter_mut().find(|a| a.id() == id)
    }

    pub fn player(&self) -> Option<&Actor> {
        self.player.and_then(|id| self.actor(id))
    }

    pub fn player_mut(&mut self) -> Option<&mut Actor> {
        let id = self.player?;
        self.actor_mut(id)
    }

    pub fn is_finished(&self) -> bool {
        self.status.is_some() && self.finish_delay < 0.0
    }
}

// ── Queries ──

impl Level {
    /// First actor, in list order, overlapping `actor`. Never `actor` itself.
    pub fn actor_at(&self, actor: &Actor) -> Option<&Actor> {
        self.actors.iter().find(|a| a.is_intersect(actor))
    }

    pub fn obstacle_at(&self, pos: Vector, size: Vector) -> Option<Obstacle> {
        let left = pos.x;
        let right = pos.x + size.x;
        let top = pos.y;
        let bottom = pos.y + size.y;

        if left < 0.0 || right > self.width as f64 || top < 0.0 {
            return Some(Obstacle::Wall);
        }
        if bottom > self.height as f64 {
            return Some(Obstacle::Lava);
        }

        let rows = top.floor() as usize..bottom.ceil() as usize;
        let cols = left.round() as usize..right.round() as usize;
        for y in rows {
            for x in cols.clone() {
                if let Some(obstacle) = self.cell(x, y) {
                    return Some(obstacle);
                }
            }
        }
        None
    }

    pub fn no_more_actors(&self, actor_type: ActorType) -> bool {
        !self.actors.iter().any(|a| a.actor_type() == actor_type)
    }

    pub fn count_actors(&self, actor_type: ActorType) -> usize {
        self.actors.iter().filter(|a| a.actor_type() == actor_type).count()
    }
}

impl ObstacleMap for Level {
    fn obstacle_at(&self, pos: Vector, size: Vector) -> Option<Obstacle> {
        Level::obstacle_at(self, pos, size)
    }
}

// ── Mutation ──

impl Level {
    /// Remove the actor with this id. An unknown id leaves the list untouched.
    pub fn remove_actor(&mut self, id: ActorId) -> Option<Actor> {
        let idx = self.actors.iter().position(|a| a.id() == id)?;
        Some(self.actors.remove(idx))
    }

    /// Apply a player contact. Hazards lose the level; a coin touch with an
    /// actor collects it; any non-hazard touch wins once no coin is left.
    pub fn player_touched(&mut self, touch: impl Into<Touch>, actor: Option<ActorId>) {
        if self.status.is_some() {
            return;
        }

        let touch = touch.into();
        if touch.is_lethal() {
            log::info!("player touched {:?}: level lost", touch);
            self.status = Some(Status::Lost);
            return;
        }

        if touch == Touch::Actor(ActorType::Coin) {
            let coin = actor.filter(|&id| {
                self.actor(id).map_or(false, |a| a.actor_type() == ActorType::Coin)
            });
            if let Some(id) = coin {
                self.remove_actor(id);
            }
        }

        if self.no_more_actors(ActorType::Coin) {
            log::info!("no coins left: level won");
            self.status = Some(Status::Won);
        }
    }

    /// Count down the grace period. Does nothing while the level is running.
    pub fn tick_finish_delay(&mut self, dt: f64) {
        if self.status.is_some() {
            self.finish_delay -= dt;
        }
    }

    /// Let every actor act once, in list order.
    pub fn act_actors(&mut self, dt: f64) {
        // Actors only read the grid, so the list can be detached meanwhile.
        let mut actors = std::mem::take(&mut self.actors);
        for actor in &mut actors {
            actor.act(dt, &*self);
        }
        self.actors = actors;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::parser::LevelParser;

    fn grid(rows: &[&str]) -> Grid {
        LevelParser::create_grid(rows)
    }

    fn unit_at(x: f64, y: f64) -> Actor {
        Actor::new(Vector::new(x, y), Vector::new(1.0, 1.0), Vector::ZERO).unwrap()
    }

    fn coin_level() -> (Level, ActorId, ActorId) {
        let a = Actor::coin_with_phase(Vector::new(1.0, 1.0), 0.0);
        let b = Actor::coin_with_phase(Vector::new(3.0, 1.0), 0.0);
        let (ia, ib) = (a.id(), b.id());
        let level = Level::new(grid(&["     ", "     ", "     "]), vec![a, b]);
        (level, ia, ib)
    }

    // ── construction ──

    #[test]
    fn empty_level() {
        let level = Level::new(vec![], vec![]);
        assert_eq!(level.height(), 0);
        assert_eq!(level.width(), 0);
        assert_eq!(level.status(), None);
        assert_eq!(level.finish_delay, 1.0);
        assert!(level.player().is_none());
        assert!(!level.is_finished());
    }

    #[test]
    fn width_is_longest_row() {
        let level = Level::new(grid(&["x", "xxxx", "xx"]), vec![]);
        assert_eq!(level.height(), 3);
        assert_eq!(level.width(), 4);
    }

    #[test]
    fn player_is_first_player_actor() {
        let other = unit_at(0.0, 0.0);
        let p1 = Actor::player(Vector::new(1.0, 1.0));
        let p2 = Actor::player(Vector::new(2.0, 1.0));
        let id = p1.id();
        let level = Level::new(vec![], vec![other, p1, p2]);
        assert_eq!(level.player_id(), Some(id));
        assert_eq!(level.player().map(Actor::id), Some(id));
    }

    #[test]
    fn player_link_goes_stale_after_removal() {
        let p = Actor::player(Vector::ZERO);
        let id = p.id();
        let mut level = Level::new(vec![], vec![p]);
        level.remove_actor(id);
        assert_eq!(level.player_id(), Some(id));
        assert!(level.player().is_none());
    }

    // ── finish ──

    #[test]
    fn finished_only_after_delay_runs_out() {
        let mut level = Level::new(vec![], vec![]);
        level.tick_finish_delay(5.0);
        assert_eq!(level.finish_delay, 1.0); // still running: no countdown

        level.player_touched(Obstacle::Lava, None);
        assert!(!level.is_finished());
        level.tick_finish_delay(0.5);
        assert!(!level.is_finished());
        level.tick_finish_delay(0.5);
        assert!(!level.is_finished()); // exactly 0 is not < 0
        level.tick_finish_delay(0.1);
        assert!(level.is_finished());
    }

    #[test]
    fn negative_delay_without_status_is_not_finished() {
        let mut level = Level::new(vec![], vec![]);
        level.finish_delay = -1.0;
        assert!(!level.is_finished());
    }

    // ── actor_at ──

    #[test]
    fn actor_at_finds_first_in_list_order() {
        let probe = unit_at(0.0, 0.0);
        let far = unit_at(5.0, 5.0);
        let first = unit_at(0.5, 0.5);
        let second = unit_at(0.2, 0.2);
        let first_id = first.id();
        let level = Level::new(vec![], vec![far, first, second]);
        assert_eq!(level.actor_at(&probe).map(Actor::id), Some(first_id));
    }

    #[test]
    fn actor_at_skips_the_probe_itself() {
        let a = unit_at(0.0, 0.0);
        let probe = a.clone();
        let level = Level::new(vec![], vec![a]);
        assert!(level.actor_at(&probe).is_none());
    }

    #[test]
    fn actor_at_none_when_only_touching() {
        let level = Level::new(vec![], vec![unit_at(1.0, 0.0)]);
        assert!(level.actor_at(&unit_at(0.0, 0.0)).is_none());
    }

    // ── obstacle_at ──

    #[test]
    fn out_of_bounds_sides_and_top_are_walls() {
        let level = Level::new(grid(&["   ", "   ", "   "]), vec![]);
        let one = Vector::new(1.0, 1.0);
        assert_eq!(level.obstacle_at(Vector::new(-0.1, 1.0), one), Some(Obstacle::Wall));
        assert_eq!(level.obstacle_at(Vector::new(2.1, 1.0), one), Some(Obstacle::Wall));
        assert_eq!(level.obstacle_at(Vector::new(1.0, -0.1), one), Some(Obstacle::Wall));
    }

    #[test]
    fn below_the_floor_is_lava() {
        let level = Level::new(grid(&["   ", "   ", "   "]), vec![]);
        let one = Vector::new(1.0, 1.0);
        assert_eq!(level.obstacle_at(Vector::new(1.0, 2.1), one), Some(Obstacle::Lava));
    }

    #[test]
    fn wall_wins_over_lava_at_corners() {
        let level = Level::new(grid(&["   ", "   "]), vec![]);
        let one = Vector::new(1.0, 1.0);
        assert_eq!(level.obstacle_at(Vector::new(-1.0, 5.0), one), Some(Obstacle::Wall));
        assert_eq!(level.obstacle_at(Vector::new(3.0, 5.0), one), Some(Obstacle::Wall));
    }

    #[test]
    fn grid_cells_are_reported() {
        let rows = ["      ", "      ", "      ", "      ", "    x!", "      "];
        let level = Level::new(grid(&rows), vec![]);
        let one = Vector::new(1.0, 1.0);
        assert_eq!(level.obstacle_at(Vector::new(4.0, 4.0), one), Some(Obstacle::Wall));
        assert_eq!(level.obstacle_at(Vector::new(5.0, 4.0), one), Some(Obstacle::Lava));
        assert_eq!(level.obstacle_at(Vector::new(3.0, 4.0), one), None);
    }

    #[test]
    fn first_cell_in_scan_order_wins() {
        // Probe covers columns 0..2 of row 0: wall comes before lava.
        let level = Level::new(grid(&["x!", "  "]), vec![]);
        assert_eq!(level.obstacle_at(Vector::ZERO, Vector::new(2.0, 1.0)), Some(Obstacle::Wall));
        let level = Level::new(grid(&["!x", "  "]), vec![]);
        assert_eq!(level.obstacle_at(Vector::ZERO, Vector::new(2.0, 1.0)), Some(Obstacle::Lava));
    }

    #[test]
    fn fractional_probe_covers_partial_rows() {
        // Box spans y 0.5..2.0 → rows 0 and 1.
        let level = Level::new(grid(&[" x ", "   ", "   "]), vec![]);
        let hit = level.obstacle_at(Vector::new(1.0, 0.5), Vector::new(0.8, 1.5));
        assert_eq!(hit, Some(Obstacle::Wall));
        let miss = level.obstacle_at(Vector::new(1.0, 1.0), Vector::new(0.8, 1.5));
        assert_eq!(miss, None);
    }

    #[test]
    fn short_rows_are_open_past_their_end() {
        let level = Level::new(grid(&["xxxx", "x", "xxxx"]), vec![]);
        assert_eq!(level.obstacle_at(Vector::new(2.0, 1.0), Vector::new(1.0, 1.0)), None);
    }

    #[test]
    fn obstacle_at_is_idempotent() {
        let level = Level::new(grid(&["  x ", " !  ", "    "]), vec![]);
        let (pos, size) = (Vector::new(0.7, 0.3), Vector::new(1.2, 1.1));
        let first = level.obstacle_at(pos, size);
        assert_eq!(level.obstacle_at(pos, size), first);
        assert_eq!(level.obstacle_at(pos, size), first);
    }

    // ── remove / count ──

    #[test]
    fn remove_actor_by_identity() {
        let (mut level, a, b) = coin_level();
        let removed = level.remove_actor(a);
        assert_eq!(removed.map(|r| r.id()), Some(a));
        assert_eq!(level.actors().len(), 1);
        assert_eq!(level.actors()[0].id(), b);
    }

    #[test]
    fn removing_absent_actor_is_noop() {
        let (mut level, a, _) = coin_level();
        level.remove_actor(a);
        let before: Vec<_> = level.actors().iter().map(Actor::id).collect();
        assert!(level.remove_actor(a).is_none());
        let after: Vec<_> = level.actors().iter().map(Actor::id).collect();
        assert_eq!(before, after);
    }

    #[test]
    fn no_more_actors_by_type() {
        let (mut level, a, b) = coin_level();
        assert!(!level.no_more_actors(ActorType::Coin));
        assert!(level.no_more_actors(ActorType::Fireball));
        assert_eq!(level.count_actors(ActorType::Coin), 2);
        level.remove_actor(a);
        level.remove_actor(b);
        assert!(level.no_more_actors(ActorType::Coin));
    }

    // ── player_touched ──

    #[test]
    fn lava_loses_and_status_sticks() {
        let (mut level, a, b) = coin_level();
        level.player_touched(Obstacle::Lava, None);
        assert_eq!(level.status(), Some(Status::Lost));
        level.player_touched(ActorType::Coin, Some(a));
        level.player_touched(ActorType::Coin, Some(b));
        assert_eq!(level.status(), Some(Status::Lost));
        assert_eq!(level.actors().len(), 2);
    }

    #[test]
    fn fireball_loses() {
        let (mut level, _, _) = coin_level();
        level.player_touched(ActorType::Fireball, None);
        assert_eq!(level.status(), Some(Status::Lost));
    }

    #[test]
    fn collecting_every_coin_wins() {
        let (mut level, a, b) = coin_level();
        level.player_touched(ActorType::Coin, Some(a));
        assert_eq!(level.status(), None);
        assert_eq!(level.actors().len(), 1);
        level.player_touched(ActorType::Coin, Some(b));
        assert_eq!(level.status(), Some(Status::Won));
        assert!(level.actors().is_empty());
    }

    #[test]
    fn coin_touch_without_actor_removes_nothing() {
        let (mut level, _, _) = coin_level();
        level.player_touched(ActorType::Coin, None);
        assert_eq!(level.actors().len(), 2);
        assert_eq!(level.status(), None);
    }

    #[test]
    fn coin_touch_naming_non_coin_removes_nothing() {
        let fireball = Actor::horizontal_fireball(Vector::ZERO);
        let fid = fireball.id();
        let coin = Actor::coin_with_phase(Vector::new(2.0, 0.0), 0.0);
        let mut level = Level::new(vec![], vec![fireball, coin]);
        level.player_touched(ActorType::Coin, Some(fid));
        assert_eq!(level.actors().len(), 2);
    }

    #[test]
    fn harmless_touch_wins_when_no_coins_remain() {
        let mut level = Level::new(grid(&["   "]), vec![Actor::player(Vector::ZERO)]);
        level.player_touched(Obstacle::Wall, None);
        assert_eq!(level.status(), Some(Status::Won));
    }

    #[test]
    fn lost_level_cannot_be_won() {
        let mut level = Level::new(vec![], vec![]);
        level.player_touched(Obstacle::Lava, None);
        level.player_touched(Obstacle::Wall, None);
        assert_eq!(level.status(), Some(Status::Lost));
    }

    #[test]
    fn won_level_cannot_be_lost() {
        let (mut level, a, b) = coin_level();
        level.player_touched(ActorType::Coin, Some(a));
        level.player_touched(ActorType::Coin, Some(b));
        assert_eq!(level.status(), Some(Status::Won));
        level.player_touched(Obstacle::Lava, None);
        level.player_touched(ActorType::Fireball, None);
        assert_eq!(level.status(), Some(Status::Won));
    }

    // ── act_actors ──

    #[test]
    fn act_actors_moves_everything_once() {
        let rows = ["     ", "     ", "     "];
        let h = Actor::horizontal_fireball(Vector::new(0.0, 0.0));
        let coin = Actor::coin_with_phase(Vector::new(4.0, 2.0), 0.0);
        let (hid, cid) = (h.id(), coin.id());
        let mut level = Level::new(grid(&rows), vec![h, coin]);
        level.act_actors(1.0);
        assert_eq!(level.actor(hid).unwrap().pos, Vector::new(2.0, 0.0));
        let c = level.actor(cid).unwrap();
        assert!((c.pos.x - 4.2).abs() < 1e-12);
        assert_eq!(level.actors().len(), 2);
    }

    #[test]
    fn fireball_bounces_off_grid_wall() {
        let h = Actor::horizontal_fireball(Vector::new(0.0, 0.0));
        let id = h.id();
        let mut level = Level::new(grid(&["  x", "   "]), vec![h]);
        level.act_actors(1.0);
        let f = level.actor(id).unwrap();
        assert_eq!(f.pos, Vector::ZERO);
        assert_eq!(f.speed, Vector::new(-2.0, 0.0));
    }

    #[test]
    fn fire_rain_restarts_at_floor() {
        let rain = Actor::fire_rain(Vector::new(1.0, 0.0));
        let id = rain.id();
        let mut level = Level::new(grid(&["   ", "   ", "   ", "xxx"]), vec![rain]);
        level.act_actors(0.5); // y = 1.5, bottom 2.5 → rows 1..3 clear
        assert_eq!(level.actor(id).unwrap().pos, Vector::new(1.0, 1.5));
        level.act_actors(0.5); // y = 3.0 → row 3 is wall
        let r = level.actor(id).unwrap();
        assert_eq!(r.pos, Vector::new(1.0, 0.0));
        assert_eq!(r.speed, Vector::new(0.0, 3.0));
    }
}
