//! Notifications the engine queues for the presentation layer.

use crate::piece::ShapeKind;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GameEvent {
    Started,
    Spawned { shape: ShapeKind },
    Moved,
    Rotated,
    BoardRotated { orientation: u8 },
    Locked { cells: usize },
    /// One cascade pass. `lines` may be zero when only honey cleared.
    LineCleared { lines: u32, combo: u32, points: u32 },
    LevelUp { level: u32 },
    Paused,
    Resumed,
    GameOver { score: u32 },
}
