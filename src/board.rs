//! Board: sparse occupancy over the donut-shaped hive, line detection, gravity collapse.
//!
//! The playable region is every cell with `inner_radius < ring <= outer_radius`.
//! Cells inside the inner radius are the spawn hole; writes there (or outside the
//! hive) are ignored, so the map only ever holds donut cells.

use std::collections::{BTreeMap, HashMap, HashSet};

use crate::config::HiveConfig;
use crate::hex::{Axial, cells_within};

/// Colour index stored per occupied cell.
pub type ColorIndex = u8;

/// One of the three families of parallel lines (constant q, r, or s).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum LineFamily {
    Q,
    R,
    S,
}

impl LineFamily {
    pub const ALL: [Self; 3] = [Self::Q, Self::R, Self::S];

    fn coord(self, a: Axial) -> i32 {
        match self {
            Self::Q => a.q,
            Self::R => a.r,
            Self::S => a.s(),
        }
    }

    /// Cell on line `value` parameterised by `t`.
    fn at(self, value: i32, t: i32) -> Axial {
        match self {
            Self::Q => Axial::new(value, t),
            Self::R => Axial::new(t, value),
            Self::S => Axial::new(t, -value - t),
        }
    }
}

/// A line: every donut cell whose `family` coordinate equals `value`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Line {
    pub family: LineFamily,
    pub value: i32,
}

impl Line {
    pub const fn new(family: LineFamily, value: i32) -> Self {
        Self { family, value }
    }

    pub fn contains(&self, a: Axial) -> bool {
        self.family.coord(a) == self.value
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Board {
    inner_radius: i32,
    outer_radius: i32,
    min_line_len: usize,
    cells: HashMap<Axial, ColorIndex>,
}

impl Board {
    pub fn new(inner_radius: i32, outer_radius: i32, min_line_len: usize) -> Self {
        Self {
            inner_radius,
            outer_radius,
            min_line_len,
            cells: HashMap::new(),
        }
    }

    pub fn from_config(config: &HiveConfig) -> Self {
        Self::new(config.inner_radius, config.outer_radius, config.min_line_len)
    }

    #[inline]
    pub fn inner_radius(&self) -> i32 {
        self.inner_radius
    }

    #[inline]
    pub fn outer_radius(&self) -> i32 {
        self.outer_radius
    }

    /// Inside the outer boundary (hole included).
    #[inline]
    pub fn is_inside_hive(&self, a: Axial) -> bool {
        a.ring() <= self.outer_radius
    }

    /// Donut membership: `inner < ring <= outer`.
    #[inline]
    pub fn is_inside_board(&self, a: Axial) -> bool {
        let ring = a.ring();
        self.inner_radius < ring && ring <= self.outer_radius
    }

    #[inline]
    pub fn is_in_hole(&self, a: Axial) -> bool {
        a.ring() <= self.inner_radius
    }

    #[inline]
    pub fn get(&self, a: Axial) -> Option<ColorIndex> {
        if !self.is_inside_board(a) {
            return None;
        }
        self.cells.get(&a).copied()
    }

    #[inline]
    pub fn occupied(&self, a: Axial) -> bool {
        self.get(a).is_some()
    }

    /// Store a block. Returns false (and changes nothing) outside the donut.
    pub fn set_cell(&mut self, a: Axial, color: ColorIndex) -> bool {
        if !self.is_inside_board(a) {
            return false;
        }
        self.cells.insert(a, color);
        true
    }

    /// Remove a block, returning its colour if one was there.
    pub fn clear_cell(&mut self, a: Axial) -> Option<ColorIndex> {
        if !self.is_inside_board(a) {
            return None;
        }
        self.cells.remove(&a)
    }

    pub fn clear(&mut self) {
        self.cells.clear();
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Occupied cells in unspecified order.
    pub fn iter(&self) -> impl Iterator<Item = (Axial, ColorIndex)> + '_ {
        self.cells.iter().map(|(a, c)| (*a, *c))
    }

    /// Every donut cell, occupied or not.
    pub fn donut_cells(&self) -> impl Iterator<Item = Axial> + '_ {
        cells_within(self.outer_radius).filter(|a| self.is_inside_board(*a))
    }

    /// Donut cells of one line, ordered along the line.
    pub fn line_cells(&self, line: Line) -> Vec<Axial> {
        let r = self.outer_radius;
        let lo = (-r).max(-line.value - r);
        let hi = r.min(-line.value + r);
        (lo..=hi)
            .map(|t| line.family.at(line.value, t))
            .filter(|a| self.is_inside_board(*a))
            .collect()
    }

    /// All lines in all three families that are non-empty, long enough and fully occupied.
    pub fn full_lines(&self) -> Vec<Line> {
        let r = self.outer_radius;
        let mut out = Vec::new();
        for family in LineFamily::ALL {
            for value in -r..=r {
                let line = Line::new(family, value);
                let cells = self.line_cells(line);
                if cells.is_empty() || cells.len() < self.min_line_len {
                    continue;
                }
                if cells.iter().all(|a| self.occupied(*a)) {
                    out.push(line);
                }
            }
        }
        out
    }

    /// Union of the cells of `lines`; a cell on two lines appears once.
    pub fn cells_of_lines(&self, lines: &[Line]) -> HashSet<Axial> {
        lines
            .iter()
            .flat_map(|line| self.line_cells(*line))
            .collect()
    }

    /// Same-colour 6-connected groups with at least `min_size` cells.
    pub fn honey_clusters(&self, min_size: usize) -> Vec<Vec<Axial>> {
        let mut visited: HashSet<Axial> = HashSet::new();
        let mut clusters = Vec::new();
        let mut starts: Vec<Axial> = self.cells.keys().copied().collect();
        starts.sort_unstable();

        for start in starts {
            if visited.contains(&start) {
                continue;
            }
            let Some(color) = self.get(start) else {
                continue;
            };
            visited.insert(start);
            let mut stack = vec![start];
            let mut group = Vec::new();
            while let Some(cell) = stack.pop() {
                group.push(cell);
                for n in cell.neighbors() {
                    if !visited.contains(&n) && self.get(n) == Some(color) {
                        visited.insert(n);
                        stack.push(n);
                    }
                }
            }
            if group.len() >= min_size {
                clusters.push(group);
            }
        }
        clusters
    }

    /// Canonical-frame column `q`: donut slots sorted by ascending `r`.
    fn column_slots(&self, q: i32) -> Vec<i32> {
        let r = self.outer_radius;
        let lo = (-r).max(-q - r);
        let hi = r.min(-q + r);
        (lo..=hi)
            .filter(|&row| self.is_inside_board(Axial::new(q, row)))
            .collect()
    }

    /// Collapse every stack along gravity.
    ///
    /// `to_canonical` is the rotation mapping the live gravity direction onto `(0, +1)`.
    /// In that frame each column is compacted toward its high-`r` end (order kept,
    /// gaps removed), then the result is rotated back. Returns whether any cell moved.
    pub fn collapse(&mut self, to_canonical: i32) -> bool {
        let mut columns: BTreeMap<i32, Vec<(i32, ColorIndex)>> = BTreeMap::new();
        for (cell, color) in &self.cells {
            let c = cell.rotate(to_canonical);
            columns.entry(c.q).or_default().push((c.r, *color));
        }

        let mut next = HashMap::with_capacity(self.cells.len());
        for (q, mut stack) in columns {
            stack.sort_unstable_by_key(|(r, _)| *r);
            let slots = self.column_slots(q);
            let skip = slots.len().saturating_sub(stack.len());
            for ((_, color), row) in stack.into_iter().zip(slots.into_iter().skip(skip)) {
                let back = Axial::new(q, row).rotate(-to_canonical);
                if self.is_inside_board(back) {
                    next.insert(back, color);
                }
            }
        }

        let moved = next != self.cells;
        self.cells = next;
        moved
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn board() -> Board {
        Board::new(1, 4, 4)
    }

    #[test]
    fn writes_outside_donut_are_ignored() {
        let mut b = board();
        assert!(!b.set_cell(Axial::ORIGIN, 0));
        assert!(!b.set_cell(Axial::new(1, 0), 0));
        assert!(!b.set_cell(Axial::new(5, 0), 0));
        assert!(b.is_empty());
        assert!(!b.occupied(Axial::ORIGIN));
        assert_eq!(b.clear_cell(Axial::new(0, 1)), None);

        assert!(b.set_cell(Axial::new(2, 0), 2));
        assert_eq!(b.get(Axial::new(2, 0)), Some(2));
        assert_eq!(b.clear_cell(Axial::new(2, 0)), Some(2));
        assert!(b.is_empty());
    }

    #[test]
    fn membership_predicates() {
        let b = board();
        assert!(b.is_in_hole(Axial::new(0, -1)));
        assert!(b.is_inside_hive(Axial::new(0, -1)));
        assert!(!b.is_inside_board(Axial::new(0, -1)));
        assert!(b.is_inside_board(Axial::new(-4, 4)));
        assert!(!b.is_inside_hive(Axial::new(-4, 5)));
        assert_eq!(b.donut_cells().count(), 61 - 7);
    }

    #[test]
    fn line_through_hole_spans_both_sides() {
        let b = board();
        let cells = b.line_cells(Line::new(LineFamily::Q, 0));
        assert_eq!(cells.len(), 6);
        assert!(cells.contains(&Axial::new(0, -4)));
        assert!(cells.contains(&Axial::new(0, 4)));
        assert!(!cells.contains(&Axial::new(0, 1)));
    }

    #[test]
    fn detects_each_family() {
        for family in LineFamily::ALL {
            let mut b = board();
            let line = Line::new(family, 3);
            for a in b.line_cells(line) {
                b.set_cell(a, 1);
            }
            assert_eq!(b.full_lines(), vec![line], "{family:?}");
        }
    }

    #[test]
    fn short_lines_never_count() {
        let mut b = Board::new(1, 4, 6);
        let edge = Line::new(LineFamily::R, 4);
        for a in b.line_cells(edge) {
            b.set_cell(a, 0);
        }
        assert_eq!(b.line_cells(edge).len(), 5);
        assert!(b.full_lines().is_empty());
    }

    #[test]
    fn crossing_lines_share_a_cell_once() {
        let mut b = board();
        let a = Line::new(LineFamily::Q, 4);
        let c = Line::new(LineFamily::R, -4);
        for cell in b.line_cells(a).into_iter().chain(b.line_cells(c)) {
            b.set_cell(cell, 0);
        }
        let lines = b.full_lines();
        assert_eq!(lines.len(), 2);
        let cleared = b.cells_of_lines(&lines);
        assert_eq!(cleared.len(), 5 + 5 - 1);
        assert!(cleared.contains(&Axial::new(4, -4)));
    }

    #[test]
    fn collapse_drops_toward_canonical_down() {
        let mut b = board();
        b.set_cell(Axial::new(2, -2), 1);
        assert!(b.collapse(0));
        assert_eq!(b.get(Axial::new(2, 2)), Some(1));
        assert_eq!(b.len(), 1);
    }

    #[test]
    fn collapse_keeps_stack_order() {
        let mut b = board();
        b.set_cell(Axial::new(3, -3), 1);
        b.set_cell(Axial::new(3, -1), 2);
        b.collapse(0);
        assert_eq!(b.get(Axial::new(3, 1)), Some(2));
        assert_eq!(b.get(Axial::new(3, 0)), Some(1));
    }

    #[test]
    fn collapse_falls_through_hole() {
        let mut b = board();
        b.set_cell(Axial::new(0, -3), 4);
        b.collapse(0);
        assert_eq!(b.get(Axial::new(0, 4)), Some(4));
    }

    #[test]
    fn collapse_in_rotated_frame() {
        // gravity along (1, 0): one step maps it onto (0, 1)
        let mut b = board();
        b.set_cell(Axial::new(-2, 0), 3);
        b.collapse(1);
        assert_eq!(b.get(Axial::new(4, 0)), Some(3));
    }

    #[test]
    fn honey_clusters_need_same_colour() {
        let mut b = board();
        let ring2: Vec<Axial> = b.donut_cells().filter(|a| a.ring() == 2).collect();
        for (i, a) in ring2.iter().enumerate() {
            b.set_cell(*a, if i < 7 { 0 } else { 1 });
        }
        let clusters = b.honey_clusters(6);
        assert!(!clusters.is_empty());
        for group in &clusters {
            let color = b.get(group[0]);
            assert!(group.iter().all(|a| b.get(*a) == color));
            assert!(group.len() >= 6);
        }
    }

    proptest! {
        #[test]
        fn collapse_leaves_no_gaps(
            raw in proptest::collection::vec((-4i32..=4, -4i32..=4, 0u8..3), 0..40),
            k in 0i32..6,
        ) {
            let mut b = board();
            for (q, r, c) in raw {
                b.set_cell(Axial::new(q, r), c);
            }
            let before = b.len();
            b.collapse(k);
            prop_assert_eq!(b.len(), before);

            for q in -4..=4 {
                let slots = b.column_slots(q);
                let filled: Vec<bool> = slots
                    .iter()
                    .map(|&row| b.occupied(Axial::new(q, row).rotate(-k)))
                    .collect();
                if let Some(first) = filled.iter().position(|f| *f) {
                    prop_assert!(filled[first..].iter().all(|f| *f));
                }
            }
        }
    }
}
