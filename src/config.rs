//! Engine configuration: hive geometry, line rules, randomness.

use thiserror::Error;

/// Largest outer radius accepted; keeps every board query well within `i32`
/// and the terminal renderer on screen.
pub const MAX_OUTER_RADIUS: i32 = 16;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HiveConfig {
    /// Cells with `ring <= inner_radius` form the spawn hole and never hold blocks.
    pub inner_radius: i32,
    /// Cells with `ring > outer_radius` are outside the hive.
    pub outer_radius: i32,
    /// Lines shorter than this never count as full.
    pub min_line_len: usize,
    /// Also clear same-colour groups of six or more connected cells.
    pub honey_clusters: bool,
    /// Fixed RNG seed for reproducible piece sequences; entropy when `None`.
    pub seed: Option<u64>,
}

impl Default for HiveConfig {
    fn default() -> Self {
        Self {
            inner_radius: 1,
            outer_radius: 6,
            min_line_len: 4,
            honey_clusters: false,
            seed: None,
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("inner radius must be non-negative, got {0}")]
    NegativeInnerRadius(i32),
    #[error("outer radius {outer} must be larger than inner radius {inner}")]
    EmptyDonut { inner: i32, outer: i32 },
    #[error("outer radius {0} exceeds the maximum of {max}", max = MAX_OUTER_RADIUS)]
    TooLarge(i32),
    #[error("minimum line length must be at least 1")]
    ZeroLineLength,
}

impl HiveConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.inner_radius < 0 {
            return Err(ConfigError::NegativeInnerRadius(self.inner_radius));
        }
        if self.outer_radius <= self.inner_radius {
            return Err(ConfigError::EmptyDonut {
                inner: self.inner_radius,
                outer: self.outer_radius,
            });
        }
        if self.outer_radius > MAX_OUTER_RADIUS {
            return Err(ConfigError::TooLarge(self.outer_radius));
        }
        if self.min_line_len == 0 {
            return Err(ConfigError::ZeroLineLength);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_valid() {
        assert_eq!(HiveConfig::default().validate(), Ok(()));
    }

    #[test]
    fn rejects_empty_donut() {
        let cfg = HiveConfig {
            inner_radius: 4,
            outer_radius: 4,
            ..HiveConfig::default()
        };
        assert_eq!(
            cfg.validate(),
            Err(ConfigError::EmptyDonut { inner: 4, outer: 4 })
        );
    }

    #[test]
    fn rejects_oversized_and_degenerate() {
        let big = HiveConfig {
            outer_radius: MAX_OUTER_RADIUS + 1,
            ..HiveConfig::default()
        };
        assert_eq!(big.validate(), Err(ConfigError::TooLarge(MAX_OUTER_RADIUS + 1)));

        let zero = HiveConfig {
            min_line_len: 0,
            ..HiveConfig::default()
        };
        assert_eq!(zero.validate(), Err(ConfigError::ZeroLineLength));

        let neg = HiveConfig {
            inner_radius: -1,
            ..HiveConfig::default()
        };
        assert_eq!(neg.validate(), Err(ConfigError::NegativeInnerRadius(-1)));
    }
}
