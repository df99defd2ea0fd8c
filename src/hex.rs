//! Hex math: axial/cube coordinates, 60° rotation, rounding, neighbours.
//!
//! Flat-topped layout. Axial `(q, r)` maps to cube `(x, y, z) = (q, -q - r, r)`.

use std::ops::{Add, Neg, Sub};

/// Six axial unit directions, in the fixed table order used everywhere else.
pub const DIRECTIONS: [Axial; 6] = [
    Axial::new(1, 0),
    Axial::new(1, -1),
    Axial::new(0, -1),
    Axial::new(-1, 0),
    Axial::new(-1, 1),
    Axial::new(0, 1),
];

/// Fixed axial direction that gravity maps to in the canonical frame.
pub const CANONICAL_DOWN: Axial = Axial::new(0, 1);

const SQRT3: f64 = 1.732_050_807_568_877_2;

/// Integer hex address. Usable directly as a map key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Axial {
    pub q: i32,
    pub r: i32,
}

impl Axial {
    pub const ORIGIN: Self = Self::new(0, 0);

    #[inline]
    pub const fn new(q: i32, r: i32) -> Self {
        Self { q, r }
    }

    /// Third cube coordinate, `s = -q - r`.
    #[inline]
    pub const fn s(self) -> i32 {
        -self.q - self.r
    }

    /// Hex distance from the origin: `max(|q|, |r|, |s|)`.
    #[inline]
    pub fn ring(self) -> i32 {
        self.q.abs().max(self.r.abs()).max(self.s().abs())
    }

    /// Rotate about the origin by `steps * 60°` (clockwise on screen).
    pub fn rotate(self, steps: i32) -> Self {
        rotate_axial(self, steps)
    }

    pub fn neighbors(self) -> [Self; 6] {
        neighbors(self)
    }
}

impl Add for Axial {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::new(self.q + rhs.q, self.r + rhs.r)
    }
}

impl Sub for Axial {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self::new(self.q - rhs.q, self.r - rhs.r)
    }
}

impl Neg for Axial {
    type Output = Self;

    fn neg(self) -> Self {
        Self::new(-self.q, -self.r)
    }
}

/// Flat-topped axial → pixel centre for a hex of the given size.
pub fn axial_to_pixel(a: Axial, size: f64) -> (f64, f64) {
    let q = f64::from(a.q);
    let r = f64::from(a.r);
    (size * 1.5 * q, size * SQRT3 * (r + q / 2.0))
}

/// Rotate `a` by `steps` sixths of a turn using the cube permutation
/// `(x, y, z) -> (-z, -x, -y)`, applied `steps mod 6` times.
pub fn rotate_axial(a: Axial, steps: i32) -> Axial {
    let t = steps.rem_euclid(6);
    let (mut x, mut z) = (a.q, a.r);
    let mut y = -x - z;
    for _ in 0..t {
        (x, y, z) = (-z, -x, -y);
    }
    Axial::new(x, z)
}

/// Nearest integer hex to a fractional axial coordinate (cube rounding).
pub fn axial_round(fq: f64, fr: f64) -> Axial {
    let x = fq;
    let z = fr;
    let y = -x - z;

    // Halves round up, so a tie at -0.5 lands on the cell toward +inf.
    let round = |v: f64| (v + 0.5).floor();
    let mut rx = round(x);
    let ry = round(y);
    let mut rz = round(z);

    let dx = (rx - x).abs();
    let dy = (ry - y).abs();
    let dz = (rz - z).abs();

    // Only x and z are kept, so a y correction needs no write.
    if dx > dy && dx > dz {
        rx = -ry - rz;
    } else if dy <= dz {
        rz = -rx - ry;
    }
    Axial::new(rx as i32, rz as i32)
}

/// Fractional axial coordinate under a pixel position (inverse of [`axial_to_pixel`]).
pub fn pixel_to_axial(x: f64, y: f64, size: f64) -> (f64, f64) {
    let q = (2.0 / 3.0 * x) / size;
    let r = (-1.0 / 3.0 * x + SQRT3 / 3.0 * y) / size;
    (q, r)
}

pub fn neighbors(a: Axial) -> [Axial; 6] {
    DIRECTIONS.map(|d| a + d)
}

/// All cells with `ring <= radius`, in q-major order.
pub fn cells_within(radius: i32) -> impl Iterator<Item = Axial> {
    (-radius..=radius).flat_map(move |q| {
        let lo = (-radius).max(-q - radius);
        let hi = radius.min(-q + radius);
        (lo..=hi).map(move |r| Axial::new(q, r))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn arb_axial() -> impl Strategy<Value = Axial> {
        (-50i32..50, -50i32..50).prop_map(|(q, r)| Axial::new(q, r))
    }

    proptest! {
        #[test]
        fn full_turn_is_identity(v in arb_axial()) {
            prop_assert_eq!(rotate_axial(v, 6), v);
            prop_assert_eq!(rotate_axial(rotate_axial(v, 2), 4), v);
        }

        #[test]
        fn rotation_composes(v in arb_axial(), a in -12i32..12, b in -12i32..12) {
            prop_assert_eq!(
                rotate_axial(rotate_axial(v, a), b),
                rotate_axial(v, (a + b).rem_euclid(6))
            );
        }

        #[test]
        fn rotation_preserves_ring(v in arb_axial(), k in 0i32..6) {
            prop_assert_eq!(rotate_axial(v, k).ring(), v.ring());
        }

        #[test]
        fn round_trips_pixel_centres(v in arb_axial()) {
            let (x, y) = axial_to_pixel(v, 24.0);
            let (fq, fr) = pixel_to_axial(x, y, 24.0);
            prop_assert_eq!(axial_round(fq, fr), v);
        }
    }

    #[test]
    fn zero_steps_is_identity() {
        let v = Axial::new(3, -2);
        assert_eq!(rotate_axial(v, 0), v);
    }

    #[test]
    fn one_step_walks_direction_table() {
        assert_eq!(rotate_axial(Axial::new(1, 0), 1), Axial::new(0, 1));
        assert_eq!(rotate_axial(Axial::new(0, 1), 1), Axial::new(-1, 1));
        assert_eq!(rotate_axial(Axial::new(0, 1), -1), Axial::new(1, 0));
    }

    #[test]
    fn cube_coordinates_sum_to_zero() {
        let v = Axial::new(4, -7);
        assert_eq!(v.q + v.r + v.s(), 0);
        assert_eq!(v.ring(), 7);
    }

    #[test]
    fn neighbors_are_at_distance_one() {
        let c = Axial::new(2, -1);
        let ns = neighbors(c);
        assert_eq!(ns[0], Axial::new(3, -1));
        assert_eq!(ns[5], Axial::new(2, 0));
        assert!(ns.iter().all(|n| (*n - c).ring() == 1));
    }

    #[test]
    fn round_picks_nearest_hex() {
        assert_eq!(axial_round(0.2, 0.1), Axial::ORIGIN);
        assert_eq!(axial_round(0.9, -0.1), Axial::new(1, 0));
        assert_eq!(axial_round(-0.4, 0.9), Axial::new(0, 1));
    }

    #[test]
    fn round_ties_go_up() {
        assert_eq!(axial_round(-0.5, 0.0), Axial::ORIGIN);
        assert_eq!(axial_round(0.5, 0.0), Axial::new(1, 0));
    }

    #[test]
    fn pixel_layout_is_flat_topped() {
        let (x, y) = axial_to_pixel(Axial::new(0, 1), 1.0);
        assert!(x.abs() < 1e-9);
        assert!((y - SQRT3).abs() < 1e-9);
        let (x, _) = axial_to_pixel(Axial::new(2, 0), 10.0);
        assert!((x - 30.0).abs() < 1e-9);
    }

    #[test]
    fn cells_within_counts_hexagonal_numbers() {
        assert_eq!(cells_within(0).count(), 1);
        assert_eq!(cells_within(1).count(), 7);
        assert_eq!(cells_within(6).count(), 127);
        assert!(cells_within(4).all(|c| c.ring() <= 4));
    }
}
