/// Static tile contents. A grid cell is `Option<Obstacle>`; `None` is
/// open air. Tile semantics are queried via methods so they live here.

use std::fmt;

use super::vector::Vector;

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Obstacle {
    Wall, // Blocks movement
    Lava, // Kills the player on contact
}

impl Obstacle {
    /// Plan symbol → obstacle. Anything else is passable.
    pub fn from_symbol(ch: char) -> Option<Obstacle> {
        match ch {
            'x' => Some(Obstacle::Wall),
            '!' => Some(Obstacle::Lava),
            _ => None,
        }
    }

    pub fn symbol(self) -> char {
        match self {
            Obstacle::Wall => 'x',
            Obstacle::Lava => '!',
        }
    }

    /// Does touching this tile end the level in defeat?
    pub fn is_lethal(self) -> bool {
        matches!(self, Obstacle::Lava)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Obstacle::Wall => "wall",
            Obstacle::Lava => "lava",
        }
    }
}

impl fmt::Display for Obstacle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Read-only obstacle query an actor consults while acting.
/// Implemented by `Level`; actors never see the rest of the level.
pub trait ObstacleMap {
    /// Obstacle overlapping the box at `pos` with extent `size`, if any.
    fn obstacle_at(&self, pos: Vector, size: Vector) -> Option<Obstacle>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn symbols_round_trip() {
        for o in [Obstacle::Wall, Obstacle::Lava] {
            assert_eq!(Obstacle::from_symbol(o.symbol()), Some(o));
        }
    }

    #[test]
    fn unknown_symbols_are_open_air() {
        for ch in [' ', '@', 'o', 'X', '#'] {
            assert_eq!(Obstacle::from_symbol(ch), None);
        }
    }

    #[test]
    fn only_lava_is_lethal() {
        assert!(Obstacle::Lava.is_lethal());
        assert!(!Obstacle::Wall.is_lethal());
    }
}
