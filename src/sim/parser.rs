/// Level parser: ASCII plan → `Level`.
///
/// Obstacles are fixed (`x` wall, `!` lava). Actors come from an
/// `ActorRegistry`, a symbol → factory table. Factories are typed
/// `fn(Vector) -> Actor`, so a registry entry is an actor constructor by
/// construction; nothing is checked per spawn.
///
/// Symbols that are neither obstacles nor registered spawn nothing. Plans may
/// use them as decoration.

use std::collections::HashMap;

use crate::domain::entity::Actor;
use crate::domain::tile::Obstacle;
use crate::domain::vector::Vector;
use crate::error::SimError;
use super::level::{Grid, Level};

/// Builds a fully initialised actor at a spawn tile.
pub type ActorFactory = fn(Vector) -> Actor;

/// Actor names accepted by `ActorRegistry::from_legend`.
pub const ACTOR_NAMES: &[(&str, ActorFactory)] = &[
    ("player", Actor::player),
    ("coin", Actor::coin),
    ("horizontal_fireball", Actor::horizontal_fireball),
    ("vertical_fireball", Actor::vertical_fireball),
    ("fire_rain", Actor::fire_rain),
];

pub fn factory_by_name(name: &str) -> Option<ActorFactory> {
    ACTOR_NAMES
        .iter()
        .find(|(n, _)| n.eq_ignore_ascii_case(name.trim()))
        .map(|&(_, f)| f)
}

#[derive(Clone, Default)]
pub struct ActorRegistry {
    factories: HashMap<char, ActorFactory>,
}

impl ActorRegistry {
    pub fn new() -> Self {
        ActorRegistry::default()
    }

    /// The stock legend used by the bundled levels.
    pub fn standard() -> Self {
        ActorRegistry::new()
            .with('@', Actor::player)
            .with('o', Actor::coin)
            .with('=', Actor::horizontal_fireball)
            .with('|', Actor::vertical_fireball)
            .with('v', Actor::fire_rain)
    }

    /// Builder form of `register`.
    pub fn with(mut self, symbol: char, factory: ActorFactory) -> Self {
        self.register(symbol, factory);
        self
    }

    /// Map `symbol` to `factory`, replacing any earlier entry.
    pub fn register(&mut self, symbol: char, factory: ActorFactory) {
        self.factories.insert(symbol, factory);
    }

    pub fn get(&self, symbol: char) -> Option<ActorFactory> {
        self.factories.get(&symbol).copied()
    }

    pub fn len(&self) -> usize {
        self.factories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }

    /// Registered symbols, sorted.
    pub fn symbols(&self) -> Vec<char> {
        let mut s: Vec<char> = self.factories.keys().copied().collect();
        s.sort_unstable();
        s
    }

    /// Add entries from a textual legend (symbol → actor name), as found in
    /// `config.toml`. Keys must be exactly one character; names must be known.
    pub fn extend_from_legend<'a, I>(&mut self, legend: I) -> Result<(), SimError>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        for (key, name) in legend {
            let mut chars = key.chars();
            let symbol = match (chars.next(), chars.next()) {
                (Some(c), None) => c,
                _ => {
                    return Err(SimError::invalid(format!(
                        "legend key {key:?} must be a single character"
                    )))
                }
            };
            let factory = factory_by_name(name).ok_or_else(|| {
                SimError::invalid(format!("legend entry {key:?}: unknown actor {name:?}"))
            })?;
            log::debug!("legend: {symbol:?} -> {name}");
            self.register(symbol, factory);
        }
        Ok(())
    }

    pub fn from_legend<'a, I>(legend: I) -> Result<Self, SimError>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut registry = ActorRegistry::new();
        registry.extend_from_legend(legend)?;
        Ok(registry)
    }
}

impl std::fmt::Debug for ActorRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActorRegistry").field("symbols", &self.symbols()).finish()
    }
}

#[derive(Clone, Debug, Default)]
pub struct LevelParser {
    registry: ActorRegistry,
}

impl LevelParser {
    pub fn new(registry: ActorRegistry) -> Self {
        LevelParser { registry }
    }

    pub fn registry(&self) -> &ActorRegistry {
        &self.registry
    }

    pub fn obstacle_from_symbol(symbol: char) -> Option<Obstacle> {
        Obstacle::from_symbol(symbol)
    }

    /// One grid row per plan line; rows keep their own length.
    pub fn create_grid<S: AsRef<str>>(lines: &[S]) -> Grid {
        lines
            .iter()
            .map(|line| line.as_ref().chars().map(Obstacle::from_symbol).collect())
            .collect()
    }

    pub fn actor_from_symbol(&self, symbol: char) -> Option<ActorFactory> {
        self.registry.get(symbol)
    }

    /// Spawn actors row by row, left to right, at integer (column, row).
    pub fn create_actors<S: AsRef<str>>(&self, lines: &[S]) -> Vec<Actor> {
        let mut actors = Vec::new();
        for (y, line) in lines.iter().enumerate() {
            for (x, symbol) in line.as_ref().chars().enumerate() {
                if let Some(factory) = self.actor_from_symbol(symbol) {
                    actors.push(factory(Vector::new(x as f64, y as f64)));
                }
            }
        }
        actors
    }

    pub fn parse<S: AsRef<str>>(&self, lines: &[S]) -> Level {
        Level::new(Self::create_grid(lines), self.create_actors(lines))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entity::ActorType;

    fn standard() -> LevelParser {
        LevelParser::new(ActorRegistry::standard())
    }

    #[test]
    fn obstacle_symbols() {
        assert_eq!(LevelParser::obstacle_from_symbol('x'), Some(Obstacle::Wall));
        assert_eq!(LevelParser::obstacle_from_symbol('!'), Some(Obstacle::Lava));
        assert_eq!(LevelParser::obstacle_from_symbol(' '), None);
        assert_eq!(LevelParser::obstacle_from_symbol('@'), None);
    }

    #[test]
    fn grid_keeps_ragged_rows() {
        let grid = LevelParser::create_grid(&["x!", "", "  x"]);
        assert_eq!(grid.len(), 3);
        assert_eq!(grid[0], vec![Some(Obstacle::Wall), Some(Obstacle::Lava)]);
        assert!(grid[1].is_empty());
        assert_eq!(grid[2], vec![None, None, Some(Obstacle::Wall)]);
    }

    #[test]
    fn empty_plan() {
        let empty: [&str; 0] = [];
        assert!(LevelParser::create_grid(&empty).is_empty());
        assert!(standard().create_actors(&empty).is_empty());
        let level = standard().parse(&empty);
        assert_eq!(level.width(), 0);
        assert_eq!(level.height(), 0);
    }

    #[test]
    fn actor_lookup() {
        let p = standard();
        assert!(p.actor_from_symbol('@').is_some());
        assert!(p.actor_from_symbol('x').is_none());
        assert!(LevelParser::default().actor_from_symbol('@').is_none());
    }

    #[test]
    fn player_and_coin_from_plan() {
        let reg = ActorRegistry::new().with('@', Actor::player).with('o', Actor::coin);
        let actors = LevelParser::new(reg).create_actors(&["@ o"]);
        assert_eq!(actors.len(), 2);

        assert_eq!(actors[0].actor_type(), ActorType::Player);
        assert_eq!(actors[0].pos, Vector::new(0.0, -0.5));

        assert_eq!(actors[1].actor_type(), ActorType::Coin);
        assert!((actors[1].pos.x - 2.2).abs() < 1e-12);
        assert!((actors[1].pos.y - 0.1).abs() < 1e-12);
    }

    #[test]
    fn actors_in_row_major_order() {
        let plan = ["  =", "|  ", " v "];
        let actors = standard().create_actors(&plan);
        let positions: Vec<Vector> = actors.iter().map(|a| a.pos).collect();
        assert_eq!(
            positions,
            vec![Vector::new(2.0, 0.0), Vector::new(0.0, 1.0), Vector::new(1.0, 2.0)]
        );
        assert_eq!(actors[0].speed, Vector::new(2.0, 0.0));
        assert_eq!(actors[1].speed, Vector::new(0.0, 2.0));
        assert_eq!(actors[2].speed, Vector::new(0.0, 3.0));
    }

    #[test]
    fn unmapped_symbols_spawn_nothing() {
        let actors = standard().create_actors(&["abc#$%", "x!x!"]);
        assert!(actors.is_empty());
    }

    #[test]
    fn parse_builds_level() {
        let plan = [
            "     v   ",
            "         ",
            "  o   =  ",
            " @   xxx ",
            "xxx!!!xxx",
        ];
        let level = standard().parse(&plan);
        assert_eq!(level.height(), 5);
        assert_eq!(level.width(), 9);
        assert_eq!(level.actors().len(), 4);
        assert_eq!(level.player().map(|p| p.pos), Some(Vector::new(1.0, 2.5)));
        assert_eq!(level.cell(3, 4), Some(Obstacle::Lava));
        assert_eq!(level.cell(5, 3), Some(Obstacle::Wall));
        assert_eq!(level.status(), None);
    }

    #[test]
    fn legend_registers_named_actors() {
        let reg = ActorRegistry::from_legend([("P", "player"), ("$", "Coin")]).unwrap();
        assert_eq!(reg.symbols(), vec!['$', 'P']);
        let actors = LevelParser::new(reg).create_actors(&["P$"]);
        assert_eq!(actors[0].actor_type(), ActorType::Player);
        assert_eq!(actors[1].actor_type(), ActorType::Coin);
    }

    #[test]
    fn legend_overrides_existing_symbol() {
        let mut reg = ActorRegistry::standard();
        reg.extend_from_legend([("o", "fire_rain")]).unwrap();
        let actors = LevelParser::new(reg).create_actors(&["o"]);
        assert_eq!(actors[0].actor_type(), ActorType::Fireball);
    }

    #[test]
    fn legend_rejects_bad_keys_and_names() {
        assert!(matches!(
            ActorRegistry::from_legend([("ab", "coin")]),
            Err(SimError::InvalidArgument(_))
        ));
        assert!(ActorRegistry::from_legend([("", "coin")]).is_err());
        assert!(ActorRegistry::from_legend([("c", "dragon")]).is_err());
    }
}
