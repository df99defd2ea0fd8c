//! Piece shapes (static catalog) and piece instances.

use rand::Rng;

use crate::board::{Board, ColorIndex};
use crate::hex::{Axial, rotate_axial};

/// Shape templates. Offsets are relative to the pivot `(0, 0)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShapeKind {
    Line3,
    Triangle3,
    Bent3,
    Kite4,
    Zig4,
    Crown5,
}

impl ShapeKind {
    pub const ALL: [Self; 6] = [
        Self::Line3,
        Self::Triangle3,
        Self::Bent3,
        Self::Kite4,
        Self::Zig4,
        Self::Crown5,
    ];

    pub fn offsets(self) -> &'static [Axial] {
        const LINE3: [Axial; 3] = [Axial::new(-1, 0), Axial::new(0, 0), Axial::new(1, 0)];
        const TRIANGLE3: [Axial; 3] = [Axial::new(0, 0), Axial::new(1, 0), Axial::new(0, 1)];
        const BENT3: [Axial; 3] = [Axial::new(0, 0), Axial::new(1, 0), Axial::new(1, -1)];
        const KITE4: [Axial; 4] = [
            Axial::new(0, 0),
            Axial::new(1, 0),
            Axial::new(0, 1),
            Axial::new(-1, 1),
        ];
        const ZIG4: [Axial; 4] = [
            Axial::new(-1, 0),
            Axial::new(0, 0),
            Axial::new(0, 1),
            Axial::new(1, 1),
        ];
        const CROWN5: [Axial; 5] = [
            Axial::new(0, 0),
            Axial::new(-1, 0),
            Axial::new(1, 0),
            Axial::new(0, -1),
            Axial::new(0, 1),
        ];
        match self {
            Self::Line3 => &LINE3,
            Self::Triangle3 => &TRIANGLE3,
            Self::Bent3 => &BENT3,
            Self::Kite4 => &KITE4,
            Self::Zig4 => &ZIG4,
            Self::Crown5 => &CROWN5,
        }
    }

    pub fn default_color(self) -> ColorIndex {
        match self {
            Self::Line3 | Self::Zig4 => 0,
            Self::Triangle3 | Self::Kite4 => 1,
            Self::Bent3 | Self::Crown5 => 2,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Line3 => "line3",
            Self::Triangle3 => "triangle3",
            Self::Bent3 => "bent3",
            Self::Kite4 => "kite4",
            Self::Zig4 => "zig4",
            Self::Crown5 => "crown5",
        }
    }

    /// Uniform pick over the catalog.
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self::ALL[rng.gen_range(0..Self::ALL.len())]
    }
}

/// A placed piece. Moves build a new value; the caller commits it only if valid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Piece {
    pub shape: ShapeKind,
    pub color: ColorIndex,
    pub pivot: Axial,
    /// Multiple of 60°, always in `0..6`.
    pub rotation: u8,
}

impl Piece {
    /// Fresh piece at `pivot` with rotation 0 and the shape's colour.
    pub fn spawn(shape: ShapeKind, pivot: Axial) -> Self {
        Self {
            shape,
            color: shape.default_color(),
            pivot,
            rotation: 0,
        }
    }

    /// Absolute cells: each offset rotated by `rotation` steps, then moved to the pivot.
    pub fn cells(&self) -> impl Iterator<Item = Axial> + '_ {
        self.shape
            .offsets()
            .iter()
            .map(|o| self.pivot + rotate_axial(*o, i32::from(self.rotation)))
    }

    pub fn translated(&self, dir: Axial) -> Self {
        Self {
            pivot: self.pivot + dir,
            ..*self
        }
    }

    /// `delta` steps of 60°, wrapped into `0..6`.
    pub fn rotated(&self, delta: i32) -> Self {
        let step = (i32::from(self.rotation) + delta.rem_euclid(6)) % 6;
        Self {
            rotation: step as u8,
            ..*self
        }
    }

    /// Every cell inside the hive, and no donut cell already occupied.
    /// Hole cells never collide.
    pub fn can_exist(&self, board: &Board) -> bool {
        self.cells().all(|c| {
            board.is_inside_hive(c) && (board.is_in_hole(c) || !board.occupied(c))
        })
    }

    /// True when any cell still sits in the spawn hole.
    pub fn touches_hole(&self, board: &Board) -> bool {
        self.cells().any(|c| board.is_in_hole(c))
    }

    /// Furthest valid translation along `dir`, and how many steps it took.
    pub fn dropped(&self, board: &Board, dir: Axial) -> (Self, u32) {
        let mut current = *self;
        let mut steps = 0;
        loop {
            let next = current.translated(dir);
            if !next.can_exist(board) {
                return (current, steps);
            }
            current = next;
            steps += 1;
        }
    }
}
