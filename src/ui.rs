//! Layout and drawing: menu, hive, pause, game over, next preview, stats, leaderboard.
//!
//! Each hex is a 3x2 block of terminal cells. Slot `(q, r)` sits at column
//! `3q` and row `2r + q`, which tiles flat-topped hexes like offset bricks.

use crate::app::{ClearInfo, MenuState, QuitOption, Screen};
use crate::highscores::Leaderboard;
use crate::theme::{Theme, shade};
use hexhive::effects::EffectKind;
use hexhive::hex::{Axial, axial_round, axial_to_pixel, cells_within, pixel_to_axial};
use hexhive::piece::ShapeKind;
use hexhive::{Engine, SessionState};
use ratatui::Frame;
use ratatui::buffer::Buffer;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Position, Rect};
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Gauge, Paragraph, Widget};
use std::collections::{HashMap, HashSet};
use std::time::Instant;
use tachyonfx::{
    CellFilter, Duration as TfxDuration, Effect, EffectRenderer, Interpolation, fx, ref_count,
};

const CELL_W: u16 = 3;
const CELL_H: u16 = 2;
const HEX_TOP: &str = "▟█▙";
const HEX_BOTTOM: &str = "▜█▛";
const GHOST_TOP: &str = "▗▄▖";
const GHOST_BOTTOM: &str = "▝▀▘";

const SIDEBAR_WIDTH: u16 = 26;

/// Duration of the line-clear fade (TachyonFX), a little past the engine's clear flash.
const LINE_CLEAR_FADE_MS: u32 = 260;

/// Hive size in terminal cells, without the border.
fn hive_pixel_size(outer_radius: i32) -> (u16, u16) {
    let r = outer_radius.max(0) as u16;
    ((2 * r + 1) * CELL_W, 4 * r + CELL_H)
}

/// Screen slot of `cell` when the hive is drawn turned by `angle` degrees clockwise.
/// At multiples of 60° this is exactly `cell.rotate(angle / 60)`.
pub fn screen_slot(cell: Axial, angle: f64) -> Axial {
    let (x, y) = axial_to_pixel(cell, 1.0);
    let (sin, cos) = angle.to_radians().sin_cos();
    let (rx, ry) = (x * cos - y * sin, x * sin + y * cos);
    let (fq, fr) = pixel_to_axial(rx, ry, 1.0);
    axial_round(fq, fr)
}

/// Top-left terminal position of a slot inside the hive rect, if it fits.
fn slot_origin(inner: Rect, outer_radius: i32, slot: Axial) -> Option<(u16, u16)> {
    let col = i32::from(CELL_W) * (slot.q + outer_radius);
    let row = 2 * slot.r + slot.q + 2 * outer_radius;
    if col < 0 || row < 0 {
        return None;
    }
    let (x, y) = (inner.x + col as u16, inner.y + row as u16);
    let fits = x + CELL_W <= inner.x + inner.width && y + CELL_H <= inner.y + inner.height;
    fits.then_some((x, y))
}

fn paint_hex(buf: &mut Buffer, (x, y): (u16, u16), top: &str, bottom: &str, style: Style) {
    buf.set_string(x, y, top, style);
    buf.set_string(x, y + 1, bottom, style);
}

/// Hive (with border) and sidebar rects for the play screen, centred in `area`.
fn game_layout(area: Rect, outer_radius: i32) -> (Rect, Rect) {
    let (hw, hh) = hive_pixel_size(outer_radius);
    let (pw, ph) = (hw + 2, hh + 2);
    let total_w = pw + SIDEBAR_WIDTH;

    let horiz = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Fill(1),
            Constraint::Length(total_w),
            Constraint::Fill(1),
        ])
        .split(area);
    let vert = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Fill(1),
            Constraint::Length(ph.max(20)),
            Constraint::Fill(1),
        ])
        .split(horiz[1]);
    let inner = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(pw), Constraint::Length(SIDEBAR_WIDTH)])
        .split(vert[1]);
    let hive = Rect {
        height: ph.min(inner[0].height),
        ..inner[0]
    };
    (hive, inner[1])
}

/// Terminal positions covered by cells that are clearing right now.
fn clearing_buffer_positions(
    engine: &Engine,
    inner: Rect,
    angle: f64,
) -> HashSet<(u16, u16)> {
    let outer = engine.board().outer_radius();
    let mut set = HashSet::new();
    for fx in engine.effects().iter().filter(|e| e.kind == EffectKind::Clear) {
        if let Some((x0, y0)) = slot_origin(inner, outer, screen_slot(fx.cell, angle)) {
            for bx in x0..x0 + CELL_W {
                for by in y0..y0 + CELL_H {
                    set.insert((bx, by));
                }
            }
        }
    }
    set
}

/// Create or update line-clear fade effect and process it (TachyonFX: fade clearing cells to bg).
fn apply_line_clear_effect(
    frame: &mut Frame,
    engine: &Engine,
    theme: &Theme,
    area: Rect,
    angle: f64,
    line_clear_effect: &mut Option<Effect>,
    line_clear_process_time: &mut Option<Instant>,
    now: Instant,
) {
    let (hive, _) = game_layout(area, engine.board().outer_radius());
    let inner = Block::default().borders(Borders::ALL).inner(hive);
    let delta = line_clear_process_time
        .map(|t| now.saturating_duration_since(t))
        .unwrap_or(std::time::Duration::ZERO);
    let delta_ms = delta.as_millis().min(u128::from(u32::MAX)) as u32;
    let tfx_delta = TfxDuration::from_millis(delta_ms);
    *line_clear_process_time = Some(now);

    if line_clear_effect.is_none() {
        let clearing_set = clearing_buffer_positions(engine, inner, angle);
        if clearing_set.is_empty() {
            return;
        }
        let filter = CellFilter::PositionFn(ref_count(move |pos: Position| {
            clearing_set.contains(&(pos.x, pos.y))
        }));
        let bg = theme.empty;
        let effect = fx::fade_to(bg, bg, (LINE_CLEAR_FADE_MS, Interpolation::Linear))
            .with_filter(filter)
            .with_area(inner);
        *line_clear_effect = Some(effect);
    }

    if let Some(effect) = line_clear_effect {
        frame.render_effect(effect, inner, tfx_delta);
    }
}

/// Draw current screen (menu, game, game over), with pause / quit overlays.
/// While cells are clearing and animation is on, runs the TachyonFX fade through
/// `line_clear_effect` / `line_clear_process_time`.
pub fn draw(
    frame: &mut Frame,
    screen: Screen,
    engine: &Engine,
    theme: &Theme,
    angle: f64,
    area: Rect,
    line_clear_effect: &mut Option<Effect>,
    line_clear_process_time: &mut Option<Instant>,
    menu_state: &MenuState,
    now: Instant,
    no_animation: bool,
    quit_selected: Option<QuitOption>,
    leaderboard: &Leaderboard,
    last_clear: Option<ClearInfo>,
    last_rank: Option<usize>,
) {
    frame
        .buffer_mut()
        .set_style(area, Style::default().bg(theme.bg));
    match screen {
        Screen::Menu => draw_menu(frame, theme, menu_state, leaderboard, area, now),
        Screen::Playing | Screen::QuitMenu => {
            draw_game(frame, engine, theme, angle, area, leaderboard, last_clear);
            let clearing = engine
                .effects()
                .iter()
                .any(|e| e.kind == EffectKind::Clear);
            if (clearing || line_clear_effect.is_some()) && !no_animation {
                apply_line_clear_effect(
                    frame,
                    engine,
                    theme,
                    area,
                    angle,
                    line_clear_effect,
                    line_clear_process_time,
                    now,
                );
            }
            if screen == Screen::QuitMenu {
                if let Some(opt) = quit_selected {
                    draw_quit_menu(frame, theme, opt);
                }
            } else if engine.state() == SessionState::Paused {
                draw_pause_overlay(frame, theme, area);
            }
        }
        Screen::GameOver => {
            draw_game(frame, engine, theme, angle, area, leaderboard, last_clear);
            draw_game_over(frame, engine, theme, area, leaderboard, last_rank);
        }
    }
}

fn centered(area: Rect, w: u16, h: u16) -> Rect {
    Rect {
        x: area.x + area.width.saturating_sub(w) / 2,
        y: area.y + area.height.saturating_sub(h) / 2,
        width: w.min(area.width),
        height: h.min(area.height),
    }
}

fn draw_menu(
    frame: &mut Frame,
    theme: &Theme,
    menu_state: &MenuState,
    leaderboard: &Leaderboard,
    area: Rect,
    now: Instant,
) {
    let shown = leaderboard.entries().len().min(8);
    let popup_w = 48u16;
    let popup_h = 16 + shown.max(1) as u16;
    let popup = centered(area, popup_w, popup_h);

    let title = Line::from(vec![
        Span::styled(" Hex ", Style::default().fg(theme.cell_color(0)).bold()),
        Span::styled(" hive ", Style::default().fg(theme.main_fg).bold()),
    ]);
    let key_style = Style::default().fg(theme.cell_color(3));
    let dim = Style::default().fg(theme.inactive_fg);

    let mut lines = vec![
        Line::from(""),
        title,
        Line::from(Span::styled(
            " fill any of the three hex lines ",
            dim,
        )),
        Line::from(""),
        Line::from(Span::styled(
            " ─ LEADERBOARD ─ ",
            Style::default().fg(theme.div_line),
        )),
    ];
    if leaderboard.entries().is_empty() {
        lines.push(Line::from(Span::styled(" no scores yet ", dim)));
    }
    for (i, e) in leaderboard.entries().iter().take(shown).enumerate() {
        lines.push(Line::from(vec![
            Span::styled(format!("{:>2}. ", i + 1), dim),
            Span::styled(format!("{:<12.12}", e.nickname), Style::default().fg(theme.main_fg)),
            Span::styled(format!("{:>8}", e.score), Style::default().fg(theme.title)),
            Span::styled(format!("  L{:<3}", e.level), dim),
        ]));
    }
    lines.extend([
        Line::from(""),
        Line::from(vec![
            Span::styled(" ←→ ", key_style),
            Span::from("MOVE  "),
            Span::styled(" ↑ ", key_style),
            Span::from("ROTATE  "),
            Span::styled(" A D ", key_style),
            Span::from("TURN HIVE"),
        ]),
        Line::from(""),
        Line::from(Span::styled(
            " [ ENTER ] START ",
            Style::default().fg(Color::Black).bg(theme.cell_color(0)).bold(),
        )),
        Line::from(""),
        Line::from(Span::styled(
            " [Q] QUIT ",
            Style::default().fg(theme.cell_color(2)),
        )),
    ]);

    let p = Paragraph::new(lines).alignment(Alignment::Center).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme.div_line).bg(theme.bg)),
    );

    // Startup animation: slide in from bottom, ease-out cubic
    let elapsed = now.duration_since(menu_state.animation_start).as_millis() as u32;
    let anim_duration = 500u32;
    let t = (elapsed as f32 / anim_duration as f32).min(1.0);
    let offset_t = 1.0 - (1.0 - t).powi(3);
    let mut anim_popup = popup;
    anim_popup.y += ((1.0 - offset_t) * 10.0) as u16;
    anim_popup = anim_popup.intersection(area);

    p.render(anim_popup, frame.buffer_mut());
}

fn draw_pause_overlay(frame: &mut Frame, theme: &Theme, area: Rect) {
    let popup = centered(area, 28, 5);
    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            " Paused ",
            Style::default().fg(Color::Black).bg(theme.title),
        )),
        Line::from(""),
        Line::from(Span::styled(
            " P: Resume    Q: Quit ",
            Style::default().fg(theme.main_fg),
        )),
    ];
    let p = Paragraph::new(lines).alignment(Alignment::Center).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme.div_line).bg(theme.bg)),
    );
    p.render(popup, frame.buffer_mut());
}

fn draw_game_over(
    frame: &mut Frame,
    engine: &Engine,
    theme: &Theme,
    area: Rect,
    leaderboard: &Leaderboard,
    last_rank: Option<usize>,
) {
    let popup = centered(area, 32, 12);
    let fg = Style::default().fg(theme.main_fg);
    let mut lines: Vec<Line> = vec![
        Line::from(""),
        Line::from(Span::styled(
            " Game Over ",
            Style::default().fg(Color::White).bg(theme.cell_color(2)),
        )),
        Line::from(""),
        Line::from(Span::styled(format!(" Score: {} ", engine.score()), fg)),
        Line::from(Span::styled(
            format!(" Level: {}   Lines: {} ", engine.level(), engine.lines_cleared()),
            fg,
        )),
        Line::from(Span::styled(format!(" Best: {} ", leaderboard.best()), fg)),
    ];
    if let Some(rank) = last_rank {
        lines.push(Line::from(Span::styled(
            format!(" #{} on the leaderboard! ", rank + 1),
            Style::default().fg(theme.title).bold(),
        )));
    }
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        " R: Restart  M: Menu  Q: Quit ",
        fg,
    )));
    let p = Paragraph::new(lines).alignment(Alignment::Center).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme.div_line).bg(theme.bg))
            .title(Span::styled(" Hexhive ", Style::default().fg(theme.title))),
    );
    p.render(popup, frame.buffer_mut());
}

/// Draw game: hive + sidebar, centred in the full area.
fn draw_game(
    frame: &mut Frame,
    engine: &Engine,
    theme: &Theme,
    angle: f64,
    area: Rect,
    leaderboard: &Leaderboard,
    last_clear: Option<ClearInfo>,
) {
    let (hive_area, sidebar_area) = game_layout(area, engine.board().outer_radius());
    draw_hive(frame, engine, theme, angle, hive_area);
    draw_sidebar(frame, engine, theme, sidebar_area, leaderboard, last_clear);
}

fn draw_hive(frame: &mut Frame, engine: &Engine, theme: &Theme, angle: f64, area: Rect) {
    let title = format!(" Hexhive  | Lines: {} ", engine.lines_cleared());
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.div_line).bg(theme.bg))
        .title(Span::styled(title, Style::default().fg(theme.title)));
    let inner = block.inner(area);
    block.render(area, frame.buffer_mut());

    let board = engine.board();
    let outer = board.outer_radius();
    let piece: HashSet<Axial> = engine
        .current_piece()
        .map(|p| p.cells().collect())
        .unwrap_or_default();
    let ghost: HashSet<Axial> = engine
        .ghost_piece()
        .map(|p| p.cells().collect())
        .unwrap_or_default();
    let effects: HashMap<Axial, (EffectKind, f64, u8)> = engine
        .effects()
        .iter()
        .map(|e| (e.cell, (e.kind, e.strength(), e.color)))
        .collect();
    let piece_color = engine
        .current_piece()
        .map(|p| theme.cell_color(p.color))
        .unwrap_or(theme.main_fg);

    let buf = frame.buffer_mut();
    for cell in cells_within(outer) {
        let Some(pos) = slot_origin(inner, outer, screen_slot(cell, angle)) else {
            continue;
        };

        let (top, bottom, color) = if piece.contains(&cell) {
            (HEX_TOP, HEX_BOTTOM, piece_color)
        } else if let Some(c) = board.get(cell) {
            let base = theme.cell_color(c);
            let color = match effects.get(&cell) {
                Some((EffectKind::Landing, s, _)) => shade(base, 1.0 + 0.35 * *s as f32),
                _ => base,
            };
            (HEX_TOP, HEX_BOTTOM, color)
        } else if let Some((EffectKind::Clear, s, c)) = effects.get(&cell) {
            (HEX_TOP, HEX_BOTTOM, shade(theme.cell_color(*c), 1.0 + 0.8 * *s as f32))
        } else if ghost.contains(&cell) && board.is_inside_board(cell) {
            (GHOST_TOP, GHOST_BOTTOM, theme.inactive_fg)
        } else if board.is_in_hole(cell) {
            (HEX_TOP, HEX_BOTTOM, theme.hole)
        } else {
            (HEX_TOP, HEX_BOTTOM, theme.empty)
        };
        paint_hex(buf, pos, top, bottom, Style::default().fg(color).bg(theme.bg));
    }
}

fn sidebar_block(theme: &Theme) -> Block<'static> {
    Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.div_line).bg(theme.bg))
}

fn draw_sidebar(
    frame: &mut Frame,
    engine: &Engine,
    theme: &Theme,
    area: Rect,
    leaderboard: &Leaderboard,
    last_clear: Option<ClearInfo>,
) {
    let title_style = Style::default().fg(theme.title);
    let fg_style = Style::default().fg(theme.main_fg);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(9), // Next (border + title + preview)
            Constraint::Length(1), // gap
            Constraint::Length(8), // Stats
            Constraint::Length(1), // gap
            Constraint::Length(4), // Level progress
        ])
        .split(area);

    // --- Next ---
    let next_block = sidebar_block(theme);
    let next_inner = next_block.inner(chunks[0]);
    next_block.render(chunks[0], frame.buffer_mut());
    let next_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Min(0)])
        .split(next_inner);
    Paragraph::new(Line::from(vec![
        Span::styled("Next ", title_style),
        Span::styled(engine.next_shape().name(), Style::default().fg(theme.inactive_fg)),
    ]))
    .render(next_layout[0], frame.buffer_mut());
    draw_next_preview(frame, theme, next_layout[1], engine.next_shape());

    // --- Stats ---
    let stats_block = sidebar_block(theme);
    let stats_inner = stats_block.inner(chunks[2]);
    stats_block.render(chunks[2], frame.buffer_mut());
    let stat = |label: &'static str, value: String| {
        Line::from(vec![
            Span::styled(label, title_style),
            Span::styled(value, fg_style),
        ])
    };
    let last = match last_clear {
        Some(c) if c.combo > 1 => format!("{}L +{} combo {}", c.lines, c.points, c.combo),
        Some(c) => format!("{}L +{}", c.lines, c.points),
        None => "-".to_string(),
    };
    let stats_lines = vec![
        stat("Score: ", engine.score().to_string()),
        stat("Best:  ", leaderboard.best().max(engine.score()).to_string()),
        stat("Level: ", engine.level().to_string()),
        stat("Speed: ", format!("{:.2}s", engine.fall_interval())),
        stat("Hive:  ", format!("{}°", u32::from(engine.orientation()) * 60)),
        stat("Last:  ", last),
    ];
    Paragraph::new(ratatui::text::Text::from(stats_lines)).render(stats_inner, frame.buffer_mut());

    // --- Level progress ---
    let lvl_block = sidebar_block(theme);
    let lvl_inner = lvl_block.inner(chunks[4]);
    lvl_block.render(chunks[4], frame.buffer_mut());
    let lvl_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Length(1)])
        .split(lvl_inner);
    Paragraph::new(Line::from(Span::styled("Next level", title_style)))
        .render(lvl_layout[0], frame.buffer_mut());
    let ratio = f64::from(engine.lines_cleared() % hexhive::session::LINES_PER_LEVEL)
        / f64::from(hexhive::session::LINES_PER_LEVEL);
    Gauge::default()
        .ratio(ratio)
        .gauge_style(Style::default().fg(theme.cell_color(1)))
        .render(lvl_layout[1], frame.buffer_mut());
}

/// Next shape as small hexes, centred in `area`.
fn draw_next_preview(frame: &mut Frame, theme: &Theme, area: Rect, shape: ShapeKind) {
    let offsets = shape.offsets();
    let cols: Vec<i32> = offsets.iter().map(|o| 3 * o.q).collect();
    let rows: Vec<i32> = offsets.iter().map(|o| 2 * o.r + o.q).collect();
    let (Some(&c_lo), Some(&c_hi)) = (cols.iter().min(), cols.iter().max()) else {
        return;
    };
    let (Some(&r_lo), Some(&r_hi)) = (rows.iter().min(), rows.iter().max()) else {
        return;
    };
    let bw = (c_hi - c_lo) as u16 + CELL_W;
    let bh = (r_hi - r_lo) as u16 + CELL_H;
    let off_x = area.width.saturating_sub(bw) / 2;
    let off_y = area.height.saturating_sub(bh) / 2;

    let style = Style::default().fg(theme.cell_color(shape.default_color())).bg(theme.bg);
    let buf = frame.buffer_mut();
    for (c, r) in cols.iter().zip(&rows) {
        let x = area.x + off_x + (c - c_lo) as u16;
        let y = area.y + off_y + (r - r_lo) as u16;
        if x + CELL_W <= area.x + area.width && y + CELL_H <= area.y + area.height {
            paint_hex(buf, (x, y), HEX_TOP, HEX_BOTTOM, style);
        }
    }
}

pub fn draw_quit_menu(frame: &mut Frame, theme: &Theme, selected: QuitOption) {
    let quit_rect = centered(frame.area(), 24, 8);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.title))
        .title(" Quit? ");

    frame
        .buffer_mut()
        .set_style(quit_rect, Style::default().bg(theme.bg));
    let inner = block.inner(quit_rect);
    block.render(quit_rect, frame.buffer_mut());

    let options = [
        (QuitOption::Resume, " Resume "),
        (QuitOption::MainMenu, " Main Menu "),
        (QuitOption::Exit, " Exit "),
    ];

    for (i, (opt, label)) in options.iter().enumerate() {
        let style = if *opt == selected {
            Style::default().fg(theme.bg).bg(theme.title).bold()
        } else {
            Style::default().fg(theme.title)
        };
        let rx = inner.x + (inner.width.saturating_sub(label.len() as u16)) / 2;
        let ry = inner.y + 1 + i as u16 * 2;
        if ry < inner.y + inner.height {
            frame.buffer_mut().set_string(rx, ry, label, style);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hexhive::hex::rotate_axial;

    #[test]
    fn slot_matches_discrete_rotation_at_rest() {
        for cell in cells_within(4) {
            for o in 0..6 {
                assert_eq!(screen_slot(cell, f64::from(o) * 60.0), rotate_axial(cell, o));
            }
        }
    }

    #[test]
    fn whole_hive_fits_its_rect() {
        let outer = 6;
        let (w, h) = hive_pixel_size(outer);
        let inner = Rect::new(0, 0, w, h);
        assert!(cells_within(outer).all(|c| slot_origin(inner, outer, c).is_some()));
    }

    #[test]
    fn neighbouring_slots_do_not_overlap() {
        let inner = Rect::new(0, 0, 100, 100);
        let a = slot_origin(inner, 6, Axial::ORIGIN).unwrap();
        let b = slot_origin(inner, 6, Axial::new(1, 0)).unwrap();
        let c = slot_origin(inner, 6, Axial::new(0, 1)).unwrap();
        assert_eq!(b, (a.0 + CELL_W, a.1 + 1));
        assert_eq!(c, (a.0, a.1 + CELL_H));
    }
}
