use derive_more::Display;
use serde::{Deserialize, Serialize};

/// Lattice step used by the planner, constrained to [4.0, 128.0]
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Display, Serialize, Deserialize)]
#[serde(from = "f32")]
pub struct TileSize(f32);

impl TileSize {
    const MIN: f32 = 4.0;
    const MAX: f32 = 128.0;

    pub fn new(value: f32) -> Self {
        Self(value.clamp(Self::MIN, Self::MAX))
    }

    pub fn get(self) -> f32 {
        self.0
    }
}

impl From<f32> for TileSize {
    fn from(value: f32) -> Self {
        Self::new(value)
    }
}

impl Default for TileSize {
    fn default() -> Self {
        Self::new(16.0)
    }
}

/// Segment sampling distance for shortcut checks, constrained to [0.5, 64.0]
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Display, Serialize, Deserialize)]
#[serde(from = "f32")]
pub struct SampleStep(f32);

impl SampleStep {
    const MIN: f32 = 0.5;
    const MAX: f32 = 64.0;

    pub fn new(value: f32) -> Self {
        Self(value.clamp(Self::MIN, Self::MAX))
    }

    pub fn get(self) -> f32 {
        self.0
    }
}

impl From<f32> for SampleStep {
    fn from(value: f32) -> Self {
        Self::new(value)
    }
}

impl Default for SampleStep {
    fn default() -> Self {
        Self::new(4.0)
    }
}

/// A movement speed in units per second, constrained to [1.0, 2000.0]
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Display, Serialize, Deserialize)]
#[serde(from = "f32")]
pub struct MovementSpeed(f32);

impl MovementSpeed {
    const MIN: f32 = 1.0;
    const MAX: f32 = 2000.0;

    pub fn new(value: f32) -> Self {
        Self(value.clamp(Self::MIN, Self::MAX))
    }

    pub fn get(self) -> f32 {
        self.0
    }
}

impl From<f32> for MovementSpeed {
    fn from(value: f32) -> Self {
        Self::new(value)
    }
}

impl Default for MovementSpeed {
    fn default() -> Self {
        Self::new(120.0)
    }
}

/// Extra companion follow slack on top of both half-widths, constrained to [0.0, 256.0]
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Display, Serialize, Deserialize)]
#[serde(from = "f32")]
pub struct LeashMargin(f32);

impl LeashMargin {
    const MIN: f32 = 0.0;
    const MAX: f32 = 256.0;

    pub fn new(value: f32) -> Self {
        Self(value.clamp(Self::MIN, Self::MAX))
    }

    pub fn get(self) -> f32 {
        self.0
    }
}

impl From<f32> for LeashMargin {
    fn from(value: f32) -> Self {
        Self::new(value)
    }
}

impl Default for LeashMargin {
    fn default() -> Self {
        Self::new(24.0)
    }
}

/// Separation past which the companion is teleported, constrained to [64.0, 4096.0]
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Display, Serialize, Deserialize)]
#[serde(from = "f32")]
pub struct WarpDistance(f32);

impl WarpDistance {
    const MIN: f32 = 64.0;
    const MAX: f32 = 4096.0;

    pub fn new(value: f32) -> Self {
        Self(value.clamp(Self::MIN, Self::MAX))
    }

    pub fn get(self) -> f32 {
        self.0
    }
}

impl From<f32> for WarpDistance {
    fn from(value: f32) -> Self {
        Self::new(value)
    }
}

impl Default for WarpDistance {
    fn default() -> Self {
        Self::new(320.0)
    }
}

/// Per-tick displacement under which a walker counts as wedged, constrained to [0.01, 16.0]
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Display, Serialize, Deserialize)]
#[serde(from = "f32")]
pub struct StuckDistance(f32);

impl StuckDistance {
    const MIN: f32 = 0.01;
    const MAX: f32 = 16.0;

    pub fn new(value: f32) -> Self {
        Self(value.clamp(Self::MIN, Self::MAX))
    }

    pub fn get(self) -> f32 {
        self.0
    }
}

impl From<f32> for StuckDistance {
    fn from(value: f32) -> Self {
        Self::new(value)
    }
}

impl Default for StuckDistance {
    fn default() -> Self {
        Self::new(1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tile_size_clamping() {
        assert_eq!(TileSize::new(-1.0).get(), 4.0);
        assert_eq!(TileSize::new(16.0).get(), 16.0);
        assert_eq!(TileSize::new(500.0).get(), 128.0);
    }

    #[test]
    fn test_movement_speed_clamping() {
        assert_eq!(MovementSpeed::new(0.0).get(), 1.0);
        assert_eq!(MovementSpeed::new(240.0).get(), 240.0);
        assert_eq!(MovementSpeed::new(1e6).get(), 2000.0);
    }

    #[test]
    fn test_warp_distance_clamping() {
        assert_eq!(WarpDistance::new(10.0).get(), 64.0);
        assert_eq!(WarpDistance::new(9000.0).get(), 4096.0);
    }

    #[test]
    fn test_display() {
        let step = SampleStep::new(2.5);
        assert_eq!(format!("{step}"), "2.5");
    }

    #[test]
    fn test_conversion_clamps() {
        assert_eq!(SampleStep::from(0.0).get(), 0.5);
        assert_eq!(StuckDistance::from(-3.0).get(), 0.01);
        assert_eq!(LeashMargin::from(1e9).get(), 256.0);
    }

    #[test]
    fn test_defaults() {
        assert_eq!(TileSize::default().get(), 16.0);
        assert_eq!(SampleStep::default().get(), 4.0);
        assert_eq!(LeashMargin::default().get(), 24.0);
        assert_eq!(StuckDistance::default().get(), 1.0);
    }
}
