//! Clear cascade: detect → clear → collapse, repeated until a pass finds nothing.
//!
//! Each productive pass bumps the combo counter (starting at 1) and scores
//! `base(lines) * (1 + 0.4 * (combo - 1))`, floored. The multiplier is kept in
//! tenths so the floor is exact.

use crate::board::{Board, ColorIndex, Line};
use crate::hex::Axial;

/// Minimum size of a same-colour group that clears as honey.
pub const HONEY_CLUSTER_MIN: usize = 6;
/// Points per honey cell, before the combo multiplier.
pub const HONEY_POINTS_PER_CELL: u32 = 50;

/// Step function: 0 → 0, 1 → 100, 2 → 300, n ≥ 3 → 600 + 200 (n - 3).
pub fn base_line_score(lines: u32) -> u32 {
    match lines {
        0 => 0,
        1 => 100,
        2 => 300,
        n => 600 + 200 * (n - 3),
    }
}

/// Combo multiplier in tenths: combo 1 → 10, combo 2 → 14, combo 3 → 18.
pub fn combo_multiplier_tenths(combo: u32) -> u32 {
    10 + 4 * combo.saturating_sub(1)
}

/// Points for one pass, floored after applying the combo multiplier.
pub fn pass_points(lines: u32, honey_cells: u32, combo: u32) -> u32 {
    let base = base_line_score(lines) + HONEY_POINTS_PER_CELL * honey_cells;
    base * combo_multiplier_tenths(combo) / 10
}

/// What one productive pass did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PassReport {
    pub combo: u32,
    pub lines: Vec<Line>,
    /// Sizes of honey clusters cleared this pass.
    pub clusters: Vec<usize>,
    /// Every removed cell with the colour it had.
    pub cleared: Vec<(Axial, ColorIndex)>,
    pub points: u32,
}

impl PassReport {
    pub fn line_count(&self) -> u32 {
        self.lines.len() as u32
    }
}

/// Iterator over the passes triggered by one lock. Dropping it early leaves the
/// board mid-cascade, so callers drain it.
pub struct Cascade<'a> {
    board: &'a mut Board,
    to_canonical: i32,
    honey: bool,
    combo: u32,
    done: bool,
}

impl<'a> Cascade<'a> {
    pub fn new(board: &'a mut Board, to_canonical: i32, honey: bool) -> Self {
        Self {
            board,
            to_canonical,
            honey,
            combo: 0,
            done: false,
        }
    }
}

impl Iterator for Cascade<'_> {
    type Item = PassReport;

    fn next(&mut self) -> Option<PassReport> {
        if self.done {
            return None;
        }

        let lines = self.board.full_lines();
        let mut to_clear = self.board.cells_of_lines(&lines);
        let mut clusters = Vec::new();
        if self.honey {
            for group in self.board.honey_clusters(HONEY_CLUSTER_MIN) {
                clusters.push(group.len());
                to_clear.extend(group);
            }
        }

        if to_clear.is_empty() {
            self.done = true;
            return None;
        }

        self.combo += 1;
        let honey_cells: usize = clusters.iter().sum();
        let points = pass_points(lines.len() as u32, honey_cells as u32, self.combo);

        let mut cells: Vec<Axial> = to_clear.into_iter().collect();
        cells.sort_unstable();
        let cleared = cells
            .into_iter()
            .filter_map(|a| self.board.clear_cell(a).map(|c| (a, c)))
            .collect();

        self.board.collapse(self.to_canonical);

        Some(PassReport {
            combo: self.combo,
            lines,
            clusters,
            cleared,
            points,
        })
    }
}
