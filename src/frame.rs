//! Orientation mapping: which axial directions are "down", "left" and "right" on screen.
//!
//! The hive is drawn rotated by `orientation * 60°` (clockwise). A direction `d`
//! therefore appears on screen as `axial_to_pixel(rotate_axial(d, orientation))`.
//! Down is the direction with the largest screen y; left/right have the extreme
//! screen x. Ties on x (flat-topped hexes always have two) go to the candidate
//! whose y is smaller for left and larger for right, so left and right are exact
//! opposites and steering never lifts a piece against gravity.

use crate::hex::{Axial, CANONICAL_DOWN, DIRECTIONS, axial_to_pixel, rotate_axial};

const EPS: f64 = 1e-9;

/// Concrete axial directions for the abstract controls at one orientation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DirectionMap {
    pub down: Axial,
    pub left: Axial,
    pub right: Axial,
}

impl DirectionMap {
    pub fn for_orientation(orientation: u8) -> Self {
        let projected: Vec<(Axial, f64, f64)> = DIRECTIONS
            .iter()
            .map(|d| {
                let (x, y) = axial_to_pixel(rotate_axial(*d, i32::from(orientation)), 1.0);
                (*d, x, y)
            })
            .collect();

        let mut down = projected[0];
        let mut left = projected[0];
        let mut right = projected[0];
        for p in &projected[1..] {
            if p.2 > down.2 + EPS {
                down = *p;
            }
            if p.1 < left.1 - EPS || ((p.1 - left.1).abs() <= EPS && p.2 < left.2) {
                left = *p;
            }
            if p.1 > right.1 + EPS || ((p.1 - right.1).abs() <= EPS && p.2 > right.2) {
                right = *p;
            }
        }

        Self {
            down: down.0,
            left: left.0,
            right: right.0,
        }
    }
}

/// Discrete board rotation plus its cached direction map.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Frame {
    orientation: u8,
    map: DirectionMap,
}

impl Default for Frame {
    fn default() -> Self {
        Self::new(0)
    }
}

impl Frame {
    pub fn new(orientation: u8) -> Self {
        let orientation = orientation % 6;
        Self {
            orientation,
            map: DirectionMap::for_orientation(orientation),
        }
    }

    /// Current orientation in `0..6`.
    #[inline]
    pub fn orientation(&self) -> u8 {
        self.orientation
    }

    #[inline]
    pub fn map(&self) -> DirectionMap {
        self.map
    }

    #[inline]
    pub fn gravity(&self) -> Axial {
        self.map.down
    }

    /// Apply `delta` sixths of a turn and recompute the mapping.
    pub fn rotate(&mut self, delta: i32) {
        let next = (i32::from(self.orientation) + delta.rem_euclid(6)) % 6;
        *self = Self::new(next as u8);
    }

    /// Rotation count that sends the live gravity direction onto `(0, +1)`.
    pub fn steps_to_canonical_down(&self) -> i32 {
        (0..6)
            .find(|k| rotate_axial(self.map.down, *k) == CANONICAL_DOWN)
            .unwrap_or(0)
    }
}

#[cfg(test)]
impl Frame {
    /// Column index of `cell` in the gravity-aligned frame.
    fn gravity_column(&self, cell: Axial) -> i32 {
        rotate_axial(cell, self.steps_to_canonical_down()).q
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn angle_of(d: Axial) -> f64 {
        let (x, y) = axial_to_pixel(d, 1.0);
        y.atan2(x).to_degrees()
    }

    #[test]
    fn unrotated_mapping() {
        let m = DirectionMap::for_orientation(0);
        assert_eq!(m.down, Axial::new(0, 1));
        assert_eq!(m.left, Axial::new(-1, 0));
        assert_eq!(m.right, Axial::new(1, 0));
    }

    #[test]
    fn left_and_right_are_opposite_everywhere() {
        for o in 0..6 {
            let m = DirectionMap::for_orientation(o);
            assert_eq!(m.left, -m.right, "orientation {o}");
            assert_ne!(m.down, m.left);
            assert_ne!(m.down, m.right);
        }
    }

    #[test]
    fn every_orientation_has_distinct_down() {
        let downs: Vec<Axial> = (0..6).map(|o| DirectionMap::for_orientation(o).down).collect();
        for (i, a) in downs.iter().enumerate() {
            for b in &downs[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn down_appears_straight_down_on_screen() {
        for o in 0..6u8 {
            let f = Frame::new(o);
            let on_screen = rotate_axial(f.gravity(), i32::from(o));
            assert_eq!(on_screen, CANONICAL_DOWN);
            assert_eq!(rotate_axial(f.gravity(), f.steps_to_canonical_down()), CANONICAL_DOWN);
        }
    }

    #[test]
    fn two_steps_turn_gravity_by_120_degrees() {
        let mut f = Frame::default();
        let before = angle_of(f.gravity());
        f.rotate(1);
        f.rotate(1);
        let after = angle_of(f.gravity());
        let diff = (after - before).rem_euclid(360.0);
        let diff = diff.min(360.0 - diff);
        assert!((diff - 120.0).abs() < 1e-6, "diff {diff}");
        assert_eq!(f.orientation(), 2);
    }

    #[test]
    fn rotate_wraps_both_ways() {
        let mut f = Frame::default();
        f.rotate(-1);
        assert_eq!(f.orientation(), 5);
        f.rotate(7);
        assert_eq!(f.orientation(), 0);
    }

    #[test]
    fn gravity_column_is_constant_along_gravity() {
        let f = Frame::new(3);
        let c = Axial::new(2, -1);
        assert_eq!(f.gravity_column(c), f.gravity_column(c + f.gravity()));
    }
}
