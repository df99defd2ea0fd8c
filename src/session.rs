//! Session lifecycle and progress counters.

use std::fmt;

pub const LINES_PER_LEVEL: u32 = 10;
pub const BASE_FALL_INTERVAL: f64 = 0.9;
pub const FALL_INTERVAL_STEP: f64 = 0.06;
pub const MIN_FALL_INTERVAL: f64 = 0.15;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    #[default]
    Menu,
    Playing,
    Paused,
    GameOver,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Menu => "menu",
            Self::Playing => "playing",
            Self::Paused => "paused",
            Self::GameOver => "game over",
        };
        f.write_str(s)
    }
}

/// Inputs that move the session between states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionCommand {
    Start,
    Pause,
    Resume,
    TogglePause,
    Lose,
    Reset,
}

impl SessionState {
    /// Next state for `cmd`. Commands that make no sense in the current state
    /// leave it unchanged.
    pub fn apply(self, cmd: SessionCommand) -> Self {
        use SessionCommand as C;
        match (self, cmd) {
            (_, C::Reset) => Self::Menu,
            (Self::Playing, C::Lose) => Self::GameOver,
            (Self::Menu | Self::GameOver | Self::Paused, C::Start) => Self::Playing,
            (Self::Playing, C::Pause | C::TogglePause) => Self::Paused,
            (Self::Paused, C::Resume | C::TogglePause) => Self::Playing,
            (s, _) => s,
        }
    }

    /// Starting from here throws away the board and counters.
    pub fn start_is_fresh(self) -> bool {
        matches!(self, Self::Menu | Self::GameOver)
    }

    #[inline]
    pub fn is_playing(self) -> bool {
        self == Self::Playing
    }
}

/// `1 + lines / 10`.
pub fn level_for_lines(lines: u32) -> u32 {
    1 + lines / LINES_PER_LEVEL
}

/// Seconds between gravity steps at `level`, never below the floor.
pub fn fall_interval_for_level(level: u32) -> f64 {
    let steps = f64::from(level.saturating_sub(1));
    (BASE_FALL_INTERVAL - FALL_INTERVAL_STEP * steps).max(MIN_FALL_INTERVAL)
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Progress {
    pub score: u32,
    pub level: u32,
    pub lines: u32,
    pub fall_interval: f64,
}

impl Default for Progress {
    fn default() -> Self {
        Self {
            score: 0,
            level: 1,
            lines: 0,
            fall_interval: BASE_FALL_INTERVAL,
        }
    }
}

impl Progress {
    /// Count cleared lines. Returns the new level when it changed.
    pub fn add_lines(&mut self, n: u32) -> Option<u32> {
        self.lines += n;
        let level = level_for_lines(self.lines);
        if level == self.level {
            return None;
        }
        self.level = level;
        self.fall_interval = fall_interval_for_level(level);
        Some(level)
    }

    pub fn add_points(&mut self, points: u32) {
        self.score = self.score.saturating_add(points);
    }
}
