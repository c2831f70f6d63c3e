/// Events emitted during a simulation step.
/// The presentation layer consumes these for sound and messages.

use crate::domain::vector::Vector;
use super::level::{Status, Touch};

#[derive(Clone, Debug, PartialEq)]
pub enum GameEvent {
    CoinCollected { pos: Vector },
    AllCoinsCollected,
    PlayerBurned { by: Touch },
    LevelWon,
    LevelLost,
    /// The grace period ran out; the session may move on.
    LevelFinished { status: Status },
}
