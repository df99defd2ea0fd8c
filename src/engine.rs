//! Engine: one game session owning the board, pieces, frame and counters.
//!
//! The driver calls [`Engine::tick`] once per frame and forwards player intents
//! through the `move_piece` / `rotate_piece` / `soft_drop` / `hard_drop` /
//! `rotate_board` entry points. Everything else is read-only.

use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::{debug, info, trace};

use crate::board::Board;
use crate::cascade::Cascade;
use crate::config::{ConfigError, HiveConfig};
use crate::effects::{CellEffect, EffectKind, Effects};
use crate::events::GameEvent;
use crate::frame::{DirectionMap, Frame};
use crate::hex::Axial;
use crate::piece::{Piece, ShapeKind};
use crate::session::{Progress, SessionCommand, SessionState};

/// Pieces spawn centred on the hole.
pub const SPAWN_PIVOT: Axial = Axial::ORIGIN;

/// Sideways or downward nudge, resolved through the current direction map.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Steer {
    Left,
    Right,
    Down,
}

/// Payload handed to a leaderboard once a round ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoreSubmission {
    pub score: u32,
    pub level: u32,
    pub lines_cleared: u32,
}

#[derive(Debug)]
pub struct Engine {
    config: HiveConfig,
    board: Board,
    frame: Frame,
    current: Option<Piece>,
    next: ShapeKind,
    state: SessionState,
    progress: Progress,
    fall_timer: f64,
    effects: Effects,
    events: Vec<GameEvent>,
    rng: StdRng,
}

impl Engine {
    pub fn new(config: HiveConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let mut rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let next = ShapeKind::random(&mut rng);
        Ok(Self {
            board: Board::from_config(&config),
            frame: Frame::default(),
            current: None,
            next,
            state: SessionState::Menu,
            progress: Progress::default(),
            fall_timer: 0.0,
            effects: Effects::default(),
            events: Vec::new(),
            rng,
            config,
        })
    }

    // ----- lifecycle -----

    /// Menu/GameOver: fresh round. Paused: resume. Playing: nothing.
    pub fn start(&mut self) {
        let fresh = self.state.start_is_fresh();
        let prev = self.state;
        self.state = self.state.apply(SessionCommand::Start);
        if prev == self.state {
            return;
        }
        if !fresh {
            self.events.push(GameEvent::Resumed);
            return;
        }

        self.board.clear();
        self.frame = Frame::default();
        self.progress = Progress::default();
        self.fall_timer = 0.0;
        self.effects.clear();
        self.current = None;
        info!(
            inner = self.config.inner_radius,
            outer = self.config.outer_radius,
            "session started"
        );
        self.events.push(GameEvent::Started);
        self.spawn_next();
    }

    /// Back to the menu with an empty board.
    pub fn reset(&mut self) {
        self.state = self.state.apply(SessionCommand::Reset);
        self.board.clear();
        self.frame = Frame::default();
        self.progress = Progress::default();
        self.fall_timer = 0.0;
        self.current = None;
        self.effects.clear();
    }

    pub fn pause(&mut self) {
        self.transition(SessionCommand::Pause);
    }

    pub fn resume(&mut self) {
        self.transition(SessionCommand::Resume);
    }

    pub fn toggle_pause(&mut self) {
        self.transition(SessionCommand::TogglePause);
    }

    fn transition(&mut self, cmd: SessionCommand) {
        let before = self.state;
        self.state = before.apply(cmd);
        match (before, self.state) {
            (SessionState::Playing, SessionState::Paused) => self.events.push(GameEvent::Paused),
            (SessionState::Paused, SessionState::Playing) => self.events.push(GameEvent::Resumed),
            _ => trace!(?cmd, state = %before, "session command ignored"),
        }
    }

    // ----- simulation -----

    /// Advance by `dt` seconds. Effects always age; the rest only runs while playing.
    pub fn tick(&mut self, dt: f64) {
        self.effects.tick(dt);
        if !self.state.is_playing() || self.current.is_none() {
            return;
        }

        self.fall_timer += dt;
        if self.fall_timer >= self.progress.fall_interval {
            self.fall_timer = 0.0;
            if !self.try_translate(self.frame.gravity()) {
                self.lock();
            }
        }
    }

    // ----- intents -----

    pub fn move_piece(&mut self, steer: Steer) -> bool {
        if !self.accepts_intent("move") {
            return false;
        }
        let map = self.frame.map();
        let dir = match steer {
            Steer::Left => map.left,
            Steer::Right => map.right,
            Steer::Down => map.down,
        };
        let moved = self.try_translate(dir);
        if moved {
            self.events.push(GameEvent::Moved);
        }
        moved
    }

    /// Single 60° step per unit of `delta`; no kicks.
    pub fn rotate_piece(&mut self, delta: i32) -> bool {
        if !self.accepts_intent("rotate") {
            return false;
        }
        let Some(piece) = self.current else {
            return false;
        };
        let candidate = piece.rotated(delta);
        if !candidate.can_exist(&self.board) {
            trace!(shape = piece.shape.name(), "rotation blocked");
            return false;
        }
        self.current = Some(candidate);
        self.events.push(GameEvent::Rotated);
        true
    }

    /// One step along gravity; locks in place when blocked.
    pub fn soft_drop(&mut self) -> bool {
        if !self.accepts_intent("soft drop") {
            return false;
        }
        if self.try_translate(self.frame.gravity()) {
            self.events.push(GameEvent::Moved);
            return true;
        }
        self.lock();
        false
    }

    /// Slide along gravity until blocked, then lock.
    pub fn hard_drop(&mut self) -> bool {
        if !self.accepts_intent("hard drop") {
            return false;
        }
        let Some(piece) = self.current else {
            return false;
        };
        let (landed, steps) = piece.dropped(&self.board, self.frame.gravity());
        trace!(steps, "hard drop");
        self.current = Some(landed);
        self.lock();
        true
    }

    /// Turn the hive by `delta` sixths. Locked cells keep their coordinates;
    /// only the direction map changes.
    pub fn rotate_board(&mut self, delta: i32) -> bool {
        if !self.accepts_intent("rotate board") {
            return false;
        }
        if delta.rem_euclid(6) == 0 {
            return false;
        }
        self.frame.rotate(delta);
        debug!(
            orientation = self.frame.orientation(),
            gravity = ?self.frame.gravity(),
            "board rotated"
        );
        self.events.push(GameEvent::BoardRotated {
            orientation: self.frame.orientation(),
        });
        true
    }

    // ----- read-only snapshot -----

    pub fn config(&self) -> &HiveConfig {
        &self.config
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn current_piece(&self) -> Option<&Piece> {
        self.current.as_ref()
    }

    pub fn next_shape(&self) -> ShapeKind {
        self.next
    }

    /// Where the active piece would land on a hard drop.
    pub fn ghost_piece(&self) -> Option<Piece> {
        self.current
            .map(|p| p.dropped(&self.board, self.frame.gravity()).0)
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn score(&self) -> u32 {
        self.progress.score
    }

    pub fn level(&self) -> u32 {
        self.progress.level
    }

    pub fn lines_cleared(&self) -> u32 {
        self.progress.lines
    }

    pub fn fall_interval(&self) -> f64 {
        self.progress.fall_interval
    }

    pub fn orientation(&self) -> u8 {
        self.frame.orientation()
    }

    pub fn direction_map(&self) -> DirectionMap {
        self.frame.map()
    }

    pub fn steps_to_canonical_down(&self) -> i32 {
        self.frame.steps_to_canonical_down()
    }

    pub fn effects(&self) -> &[CellEffect] {
        self.effects.as_slice()
    }

    pub fn submission(&self) -> ScoreSubmission {
        ScoreSubmission {
            score: self.progress.score,
            level: self.progress.level,
            lines_cleared: self.progress.lines,
        }
    }

    /// Take every queued event, oldest first.
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    // ----- internals -----

    fn accepts_intent(&self, what: &str) -> bool {
        if self.state.is_playing() && self.current.is_some() {
            return true;
        }
        trace!(intent = what, state = %self.state, "intent rejected");
        false
    }

    fn try_translate(&mut self, dir: Axial) -> bool {
        let Some(piece) = self.current else {
            return false;
        };
        let candidate = piece.translated(dir);
        if !candidate.can_exist(&self.board) {
            return false;
        }
        self.current = Some(candidate);
        true
    }

    fn spawn_next(&mut self) {
        let shape = self.next;
        self.next = ShapeKind::random(&mut self.rng);
        self.fall_timer = 0.0;

        let piece = Piece::spawn(shape, SPAWN_PIVOT);
        if !piece.can_exist(&self.board) {
            debug!(shape = shape.name(), "spawn blocked");
            self.current = None;
            self.game_over();
            return;
        }
        self.current = Some(piece);
        self.events.push(GameEvent::Spawned { shape });
    }

    fn lock(&mut self) {
        let Some(piece) = self.current.take() else {
            return;
        };

        let mut written = 0;
        for cell in piece.cells() {
            if self.board.set_cell(cell, piece.color) {
                self.effects.push(cell, piece.color, EffectKind::Landing);
                written += 1;
            }
        }
        debug!(shape = piece.shape.name(), pivot = ?piece.pivot, written, "piece locked");
        self.events.push(GameEvent::Locked { cells: written });

        if piece.touches_hole(&self.board) {
            debug!("piece locked inside the hole");
            self.game_over();
            return;
        }

        self.resolve_cascade();
        self.spawn_next();
    }

    fn resolve_cascade(&mut self) {
        let to_canonical = self.frame.steps_to_canonical_down();
        let passes: Vec<_> =
            Cascade::new(&mut self.board, to_canonical, self.config.honey_clusters).collect();

        for pass in passes {
            let lines = pass.line_count();
            self.progress.add_points(pass.points);
            for (cell, color) in &pass.cleared {
                self.effects.push(*cell, *color, EffectKind::Clear);
            }
            debug!(
                lines,
                combo = pass.combo,
                points = pass.points,
                clusters = pass.clusters.len(),
                "cascade pass"
            );
            self.events.push(GameEvent::LineCleared {
                lines,
                combo: pass.combo,
                points: pass.points,
            });
            if let Some(level) = self.progress.add_lines(lines) {
                debug!(level, "level up");
                self.events.push(GameEvent::LevelUp { level });
            }
        }
    }

    fn game_over(&mut self) {
        self.state = self.state.apply(SessionCommand::Lose);
        info!(
            score = self.progress.score,
            level = self.progress.level,
            lines = self.progress.lines,
            "game over"
        );
        self.events.push(GameEvent::GameOver {
            score: self.progress.score,
        });
    }
}

#[cfg(test)]
impl Engine {
    fn force_current(&mut self, shape: ShapeKind) {
        self.current = Some(Piece::spawn(shape, SPAWN_PIVOT));
    }

    fn board_mut(&mut self) -> &mut Board {
        &mut self.board
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine(outer: i32) -> Engine {
        let cfg = HiveConfig {
            outer_radius: outer,
            seed: Some(11),
            ..HiveConfig::default()
        };
        let mut e = Engine::new(cfg).unwrap();
        e.start();
        e.drain_events();
        e
    }

    fn line_events(events: &[GameEvent]) -> Vec<(u32, u32, u32)> {
        events
            .iter()
            .filter_map(|e| match e {
                GameEvent::LineCleared {
                    lines,
                    combo,
                    points,
                } => Some((*lines, *combo, *points)),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn rejects_invalid_config() {
        let cfg = HiveConfig {
            inner_radius: 3,
            outer_radius: 2,
            ..HiveConfig::default()
        };
        assert!(Engine::new(cfg).is_err());
    }

    #[test]
    fn intents_are_ignored_outside_play() {
        let mut e = Engine::new(HiveConfig::default()).unwrap();
        assert_eq!(e.state(), SessionState::Menu);
        assert!(!e.move_piece(Steer::Left));
        assert!(!e.hard_drop());
        assert!(!e.rotate_board(1));
        assert!(e.drain_events().is_empty());
    }

    #[test]
    fn start_spawns_in_the_hole() {
        let mut e = Engine::new(HiveConfig::default()).unwrap();
        e.start();
        assert_eq!(e.state(), SessionState::Playing);
        let piece = e.current_piece().copied().unwrap();
        assert_eq!(piece.pivot, SPAWN_PIVOT);
        let events = e.drain_events();
        assert_eq!(events[0], GameEvent::Started);
        assert!(matches!(events[1], GameEvent::Spawned { .. }));
    }

    #[test]
    fn seeded_engines_agree() {
        let a = engine(6);
        let b = engine(6);
        assert_eq!(a.current_piece(), b.current_piece());
        assert_eq!(a.next_shape(), b.next_shape());
    }

    #[test]
    fn hard_dropping_line_pieces_clears_the_rim_row() {
        let mut e = engine(5);
        e.force_current(ShapeKind::Line3);
        for _ in 0..4 {
            assert!(e.move_piece(Steer::Left));
        }
        assert_eq!(e.current_piece().unwrap().pivot, Axial::new(-4, 0));
        assert!(e.hard_drop());
        assert_eq!(e.board().len(), 3);
        assert_eq!(e.score(), 0);

        e.force_current(ShapeKind::Line3);
        assert!(e.move_piece(Steer::Left));
        assert!(e.hard_drop());

        assert_eq!(e.score(), 100);
        assert_eq!(e.lines_cleared(), 1);
        assert!(e.board().is_empty());
        let cleared = e
            .effects()
            .iter()
            .filter(|fx| fx.kind == EffectKind::Clear)
            .count();
        assert_eq!(cleared, 6);
        assert_eq!(line_events(&e.drain_events()), vec![(1, 1, 100)]);
    }

    #[test]
    fn cascading_clear_pays_the_combo_multiplier() {
        let mut e = engine(4);
        for t in -4..=-1 {
            e.board_mut().set_cell(Axial::new(t, 4), 0);
            e.board_mut().set_cell(Axial::new(t, 3), 1);
        }
        e.force_current(ShapeKind::Line3);
        assert!(e.rotate_piece(1));
        assert!(e.hard_drop());

        assert_eq!(e.lines_cleared(), 2);
        assert_eq!(e.score(), 100 + 140);
        assert_eq!(line_events(&e.drain_events()), vec![(1, 1, 100), (1, 2, 140)]);
        assert_eq!(e.board().len(), 1);
        assert_eq!(e.board().get(Axial::new(0, 4)), Some(0));
    }

    #[test]
    fn rotating_the_board_redirects_soft_drop() {
        let mut e = engine(6);
        let before = e.direction_map().down;
        assert!(e.rotate_board(1));
        assert!(e.rotate_board(1));
        assert_eq!(e.orientation(), 2);
        let down = e.direction_map().down;
        assert_ne!(down, before);
        assert_eq!(down.rotate(2), before);

        let start = e.current_piece().unwrap().pivot;
        assert!(e.soft_drop());
        assert_eq!(e.current_piece().unwrap().pivot, start + down);
        let ghost = e.ghost_piece().unwrap();
        assert!(ghost.can_exist(e.board()));
        assert!(!ghost.translated(down).can_exist(e.board()));
    }

    #[test]
    fn tick_applies_gravity_only_while_playing() {
        let mut e = engine(6);
        let start = e.current_piece().unwrap().pivot;
        e.tick(0.5);
        assert_eq!(e.current_piece().unwrap().pivot, start);
        e.tick(0.5);
        assert_eq!(e.current_piece().unwrap().pivot, start + Axial::new(0, 1));

        e.pause();
        e.tick(5.0);
        assert_eq!(e.current_piece().unwrap().pivot, start + Axial::new(0, 1));
        e.resume();
        assert_eq!(e.state(), SessionState::Playing);
    }

    #[test]
    fn effects_decay_while_paused() {
        let mut e = engine(6);
        assert!(e.hard_drop());
        assert!(!e.effects().is_empty());
        e.pause();
        e.tick(1.0);
        assert!(e.effects().is_empty());
    }

    #[test]
    fn locking_inside_the_hole_ends_the_round() {
        let mut e = engine(6);
        let ring2: Vec<Axial> = e.board().donut_cells().filter(|a| a.ring() == 2).collect();
        for a in ring2 {
            e.board_mut().set_cell(a, 2);
        }
        e.force_current(ShapeKind::Line3);
        assert!(e.hard_drop());
        assert_eq!(e.state(), SessionState::GameOver);
        assert!(e.current_piece().is_none());
        let events = e.drain_events();
        assert!(matches!(events.last(), Some(GameEvent::GameOver { .. })));
        assert!(!e.soft_drop());
    }

    #[test]
    fn blocked_spawn_ends_the_round() {
        let mut e = engine(6);
        e.board_mut().set_cell(Axial::new(1, 1), 0);
        e.next = ShapeKind::Zig4;
        e.current = None;
        e.spawn_next();
        assert_eq!(e.state(), SessionState::GameOver);

        e.start();
        assert_eq!(e.state(), SessionState::Playing);
        assert!(e.board().is_empty());
        assert_eq!(e.score(), 0);
    }

    #[test]
    fn huge_turn_deltas_wrap_instead_of_overflowing() {
        let mut e = engine(6);
        assert!(e.rotate_board(1));
        assert!(e.rotate_board(i32::MAX));
        assert_eq!(e.orientation(), 2);
        assert!(e.rotate_board(i32::MIN));
        assert_eq!(e.orientation(), 0);

        e.force_current(ShapeKind::Line3);
        assert!(e.rotate_piece(1));
        assert!(e.rotate_piece(i32::MIN));
        assert_eq!(e.current_piece().unwrap().rotation, 5);
        assert!(e.rotate_piece(i32::MAX));
        assert_eq!(e.current_piece().unwrap().rotation, 0);
    }

    #[test]
    fn blocked_rotation_leaves_the_piece_alone() {
        let mut e = engine(6);
        e.force_current(ShapeKind::Line3);
        assert!(e.move_piece(Steer::Down));
        assert!(e.move_piece(Steer::Down));
        let before = e.current_piece().copied().unwrap();
        assert_eq!(before.pivot, Axial::new(0, 2));

        let own: Vec<Axial> = before.cells().collect();
        let others: Vec<Axial> = e
            .board()
            .donut_cells()
            .filter(|a| !own.contains(a))
            .collect();
        for a in others {
            e.board_mut().set_cell(a, 1);
        }
        e.drain_events();

        assert!(!e.rotate_piece(1));
        assert!(!e.rotate_piece(-1));
        assert_eq!(e.current_piece(), Some(&before));
        assert!(!e.drain_events().contains(&GameEvent::Rotated));
    }

    #[test]
    fn start_from_pause_resumes_without_reset() {
        let mut e = engine(6);
        e.hard_drop();
        let cells = e.board().len();
        e.toggle_pause();
        assert_eq!(e.state(), SessionState::Paused);
        e.start();
        assert_eq!(e.state(), SessionState::Playing);
        assert_eq!(e.board().len(), cells);
    }
}
