//! App: terminal init, main loop, engine ticking and key handling.

use crate::Args;
use crate::highscores::Leaderboard;
use crate::input::{Action, key_to_action};
use crate::theme::Theme;
use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind};
use hexhive::spin::BoardSpin;
use hexhive::{Engine, GameEvent, HiveConfig, SessionState, Steer};
use ratatui::DefaultTerminal;
use std::time::{Duration, Instant};
use tachyonfx::Effect;
use tracing::{debug, info, warn};

/// DAS (Delayed Auto-Shift): delay before movement starts repeating when you hold a key.
const REPEAT_DELAY_MS: u64 = 170;
/// ARR (Auto-Repeat Rate): time between repeated moves while holding. 50 ms ≈ 20 moves/sec.
const REPEAT_INTERVAL_MS: u64 = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Menu,
    Playing,
    GameOver,
    QuitMenu,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuitOption {
    Resume,
    MainMenu,
    Exit,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuState {
    pub animation_start: Instant,
}

impl Default for MenuState {
    fn default() -> Self {
        Self {
            animation_start: Instant::now(),
        }
    }
}

/// Most recent cascade pass, for the sidebar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClearInfo {
    pub lines: u32,
    pub combo: u32,
    pub points: u32,
}

pub struct App {
    args: Args,
    theme: Theme,
    engine: Engine,
    screen: Screen,
    spin: BoardSpin,
    leaderboard: Leaderboard,
    /// Leaderboard rank of the round that just ended.
    last_rank: Option<usize>,
    last_clear: Option<ClearInfo>,
    last_frame: Instant,
    repeat_state: Option<(Action, Instant)>,
    last_repeat_fire: Option<Instant>,
    /// TachyonFX fade effect for line-clear (created when a clear starts).
    line_clear_effect: Option<Effect>,
    /// Last time we processed the line-clear effect (for delta).
    line_clear_effect_process_time: Option<Instant>,
    menu_state: MenuState,
    quit_selected: QuitOption,
}

impl App {
    pub fn new(args: Args, config: HiveConfig, theme: Theme) -> Result<Self> {
        let engine = Engine::new(config)?;
        let mut app = Self {
            theme,
            engine,
            screen: Screen::Menu,
            spin: BoardSpin::default(),
            leaderboard: Leaderboard::load(),
            last_rank: None,
            last_clear: None,
            last_frame: Instant::now(),
            repeat_state: None,
            last_repeat_fire: None,
            line_clear_effect: None,
            line_clear_effect_process_time: None,
            menu_state: MenuState::default(),
            quit_selected: QuitOption::Resume,
            args,
        };
        if app.args.no_menu {
            app.start_game();
        }
        Ok(app)
    }

    fn start_game(&mut self) {
        self.engine.start();
        self.screen = Screen::Playing;
        self.spin.snap(self.engine.orientation());
        self.last_rank = None;
        self.last_clear = None;
        self.repeat_state = None;
        self.last_repeat_fire = None;
        self.line_clear_effect = None;
        self.line_clear_effect_process_time = None;
    }

    fn back_to_menu(&mut self) {
        self.engine.reset();
        self.screen = Screen::Menu;
        self.menu_state = MenuState::default();
        self.repeat_state = None;
        self.line_clear_effect = None;
        self.line_clear_effect_process_time = None;
    }

    fn apply_action(&mut self, action: Action) {
        match action {
            Action::MoveLeft => {
                self.engine.move_piece(Steer::Left);
            }
            Action::MoveRight => {
                self.engine.move_piece(Steer::Right);
            }
            Action::RotateCw => {
                self.engine.rotate_piece(1);
            }
            Action::RotateCcw => {
                self.engine.rotate_piece(-1);
            }
            Action::SoftDrop => {
                self.engine.soft_drop();
            }
            Action::HardDrop => {
                self.engine.hard_drop();
                self.repeat_state = None;
            }
            Action::TurnHiveCw => {
                self.engine.rotate_board(1);
            }
            Action::TurnHiveCcw => {
                self.engine.rotate_board(-1);
            }
            Action::Pause | Action::Quit | Action::None => {}
        }
    }

    fn tick_repeat(&mut self, now: Instant) {
        let Some((action, first)) = self.repeat_state else {
            return;
        };
        if !action.repeats() {
            return;
        }
        if now.duration_since(first) < Duration::from_millis(REPEAT_DELAY_MS) {
            return;
        }
        let next =
            self.last_repeat_fire.unwrap_or(first) + Duration::from_millis(REPEAT_INTERVAL_MS);
        if now >= next {
            self.apply_action(action);
            self.last_repeat_fire = Some(now);
        }
    }

    /// React to what the engine reported this frame.
    fn process_events(&mut self) {
        for event in self.engine.drain_events() {
            match event {
                GameEvent::LineCleared {
                    lines,
                    combo,
                    points,
                } => {
                    self.last_clear = Some(ClearInfo {
                        lines,
                        combo,
                        points,
                    });
                    // new fade over the freshly cleared cells
                    self.line_clear_effect = None;
                    self.line_clear_effect_process_time = None;
                }
                GameEvent::Locked { .. } => {
                    // A lock ends the held key's piece; don't carry the repeat over.
                    self.repeat_state = None;
                }
                GameEvent::LevelUp { level } => debug!(level, "level up"),
                GameEvent::GameOver { .. } => self.on_game_over(),
                _ => {}
            }
        }
    }

    /// Submit once per round; a failed save is logged and otherwise ignored.
    fn on_game_over(&mut self) {
        let result = self.engine.submission();
        self.last_rank = self.leaderboard.insert(&self.args.nickname, result);
        if self.last_rank.is_some() {
            if let Err(e) = self.leaderboard.save() {
                warn!(error = %e, "could not save leaderboard");
            }
        }
        info!(score = result.score, rank = ?self.last_rank, "round finished");
        self.screen = Screen::GameOver;
        self.repeat_state = None;
    }

    pub fn run(&mut self) -> Result<()> {
        use crossterm::{
            event::{KeyboardEnhancementFlags, PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags},
            execute,
            terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
        };

        enable_raw_mode()?;
        let mut stdout = std::io::stdout();
        execute!(stdout, EnterAlternateScreen)?;

        // Attempt to enable enhanced keyboard for Release events
        let _ = execute!(
            stdout,
            PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::REPORT_EVENT_TYPES)
        );

        let mut terminal =
            ratatui::DefaultTerminal::new(ratatui::backend::CrosstermBackend::new(stdout))?;

        self.last_frame = Instant::now();
        let result = self.run_loop(&mut terminal);

        // Restore
        let _ = execute!(std::io::stdout(), PopKeyboardEnhancementFlags);
        execute!(std::io::stdout(), LeaveAlternateScreen)?;
        disable_raw_mode()?;

        result
    }

    fn run_loop(&mut self, terminal: &mut DefaultTerminal) -> Result<()> {
        let frame_duration = Duration::from_secs_f64(1.0 / self.args.frame_rate.max(1.0));
        loop {
            let now = Instant::now();
            let dt = now.duration_since(self.last_frame).as_secs_f64();
            self.last_frame = now;

            if self.screen == Screen::Playing {
                self.tick_repeat(now);
            }
            self.engine.tick(dt);
            self.process_events();

            let orientation = self.engine.orientation();
            if self.args.no_animation {
                self.spin.snap(orientation);
            } else if !self.spin.is_settled(orientation) {
                self.spin.update(orientation, dt);
            }

            terminal.draw(|f| {
                crate::ui::draw(
                    f,
                    self.screen,
                    &self.engine,
                    &self.theme,
                    self.spin.angle(),
                    f.area(),
                    &mut self.line_clear_effect,
                    &mut self.line_clear_effect_process_time,
                    &self.menu_state,
                    now,
                    self.args.no_animation,
                    (self.screen == Screen::QuitMenu).then_some(self.quit_selected),
                    &self.leaderboard,
                    self.last_clear,
                    self.last_rank,
                );
            })?;

            if self.line_clear_effect.as_ref().is_some_and(Effect::done) {
                self.line_clear_effect = None;
                self.line_clear_effect_process_time = None;
            }

            let timeout = frame_duration.saturating_sub(now.elapsed());
            if event::poll(timeout)? {
                while event::poll(Duration::ZERO)? {
                    if let Event::Key(key) = event::read()? {
                        if self.handle_key(key) {
                            return Ok(());
                        }
                    }
                }
            }
        }
    }

    /// Returns true when the app should exit.
    fn handle_key(&mut self, key: KeyEvent) -> bool {
        let action = key_to_action(key);

        // Ignore OS repeats and only process first Press.
        if key.kind != KeyEventKind::Press {
            if key.kind == KeyEventKind::Release
                && self.repeat_state.map(|(a, _)| a) == Some(action)
            {
                self.repeat_state = None;
                self.last_repeat_fire = None;
            }
            return false;
        }
        // Already repeating this action ourselves.
        if self.repeat_state.map(|(a, _)| a) == Some(action) {
            return false;
        }

        match self.screen {
            Screen::Menu => match action {
                Action::Quit => return true,
                Action::HardDrop => self.start_game(),
                _ => {}
            },
            Screen::Playing => {
                let paused = self.engine.state() == SessionState::Paused;
                match action {
                    Action::Pause => self.engine.toggle_pause(),
                    Action::Quit => {
                        self.engine.pause();
                        self.screen = Screen::QuitMenu;
                        self.quit_selected = QuitOption::Resume;
                        self.repeat_state = None;
                    }
                    _ if paused => {}
                    _ => {
                        self.apply_action(action);
                        if action.repeats() {
                            self.repeat_state = Some((action, Instant::now()));
                            self.last_repeat_fire = None;
                        }
                    }
                }
            }
            Screen::QuitMenu => match action {
                Action::SoftDrop | Action::MoveRight => {
                    self.quit_selected = match self.quit_selected {
                        QuitOption::Resume => QuitOption::MainMenu,
                        QuitOption::MainMenu => QuitOption::Exit,
                        QuitOption::Exit => QuitOption::Resume,
                    };
                }
                Action::RotateCw | Action::RotateCcw | Action::MoveLeft => {
                    self.quit_selected = match self.quit_selected {
                        QuitOption::Resume => QuitOption::Exit,
                        QuitOption::MainMenu => QuitOption::Resume,
                        QuitOption::Exit => QuitOption::MainMenu,
                    };
                }
                Action::HardDrop => match self.quit_selected {
                    QuitOption::Resume => {
                        self.engine.resume();
                        self.screen = Screen::Playing;
                    }
                    QuitOption::MainMenu => self.back_to_menu(),
                    QuitOption::Exit => return true,
                },
                Action::Pause | Action::Quit => {
                    self.engine.resume();
                    self.screen = Screen::Playing;
                }
                _ => {}
            },
            Screen::GameOver => {
                if action == Action::Quit {
                    return true;
                }
                match key.code {
                    KeyCode::Char('r' | 'R') => self.start_game(),
                    KeyCode::Char('m' | 'M') => self.back_to_menu(),
                    _ => {}
                }
            }
        }
        false
    }
}
