/// Events emitted during a simulation step.
/// The presentation layer consumes these for sound and logging.

use crate::domain::entity::CollectibleKind;

#[derive(Clone, Debug, PartialEq)]
pub enum GameEvent {
    Jumped,
    DoubleJumped,
    CollectiblePicked { kind: CollectibleKind },
    SignRead,
    EnemyStomped,
    PlayerHurt { lives_left: i32 },
    PlayerDied,
    PlayerDrowned,
    LevelComplete { time: f64, new_best: bool },
}
