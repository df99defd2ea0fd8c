//! Presentation-only board spin. Eases a drawn angle toward the logical
//! orientation; nothing here feeds back into the rules.

/// Degrees per second.
pub const SPIN_SPEED: f64 = 360.0;
/// Snap once closer than this.
pub const SPIN_SNAP: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct BoardSpin {
    angle: f64,
}

impl BoardSpin {
    pub fn new(orientation: u8) -> Self {
        Self {
            angle: target_angle(orientation),
        }
    }

    /// Current drawn angle in degrees, in `[0, 360)`.
    pub fn angle(&self) -> f64 {
        self.angle
    }

    /// Snap straight to `orientation` with no animation.
    pub fn snap(&mut self, orientation: u8) {
        self.angle = target_angle(orientation);
    }

    pub fn is_settled(&self, orientation: u8) -> bool {
        shortest_delta(self.angle, target_angle(orientation)).abs() < f64::EPSILON
    }

    /// Move toward `orientation * 60°` along the shorter way round.
    pub fn update(&mut self, orientation: u8, dt: f64) {
        let target = target_angle(orientation);
        let delta = shortest_delta(self.angle, target);
        let step = SPIN_SPEED * dt;
        if delta.abs() <= SPIN_SNAP || delta.abs() <= step {
            self.angle = target;
        } else {
            self.angle = (self.angle + step.copysign(delta)).rem_euclid(360.0);
        }
    }
}

fn target_angle(orientation: u8) -> f64 {
    f64::from(orientation % 6) * 60.0
}

/// Signed difference `to - from` folded into `(-180, 180]`.
fn shortest_delta(from: f64, to: f64) -> f64 {
    let d = (to - from).rem_euclid(360.0);
    if d > 180.0 { d - 360.0 } else { d }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn eases_then_snaps() {
        let mut spin = BoardSpin::new(0);
        spin.update(1, 0.1);
        assert!((spin.angle() - 36.0).abs() < 1e-9);
        spin.update(1, 0.1);
        assert_eq!(spin.angle(), 60.0);
        assert!(spin.is_settled(1));
    }

    #[test]
    fn takes_the_short_way_round() {
        let mut spin = BoardSpin::new(0);
        spin.update(5, 0.05);
        assert!((spin.angle() - 342.0).abs() < 1e-9);
    }

    #[test]
    fn snaps_inside_threshold() {
        let mut spin = BoardSpin { angle: 59.7 };
        spin.update(1, 0.0);
        assert_eq!(spin.angle(), 60.0);
    }
}
