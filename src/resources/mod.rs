use crate::config::range_types::*;
use serde::{Deserialize, Serialize};

/// Every tunable navigation constant, persisted as TOML.
#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(default)]
// NOTE: When adding new fields, keep `Default` and the config tests in sync
pub struct NavigationSettings {
    // Planner
    pub tile_size: TileSize,
    pub max_search_nodes: usize,

    // Simplifier
    pub sample_step: SampleStep,

    // Escape resolver
    pub max_escape_depth: u32,

    // Integrator
    pub stuck_distance: StuckDistance,
    pub arrival_epsilon: f32,
    pub keyboard_step: f32,

    // Companion leash
    pub leash_margin: LeashMargin,
    pub warp_distance: WarpDistance,

    // Default speeds for actors without their own table
    pub walk_speed: MovementSpeed,
    pub run_speed: MovementSpeed,
}

impl Default for NavigationSettings {
    fn default() -> Self {
        Self {
            tile_size: TileSize::new(16.0),
            max_search_nodes: 20_000,

            sample_step: SampleStep::new(4.0),

            max_escape_depth: 8,

            stuck_distance: StuckDistance::new(1.0),
            arrival_epsilon: 1.0,
            keyboard_step: 32.0,

            leash_margin: LeashMargin::new(24.0),
            warp_distance: WarpDistance::new(320.0),

            walk_speed: MovementSpeed::new(120.0),
            run_speed: MovementSpeed::new(240.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings_are_consistent() {
        let settings = NavigationSettings::default();
        assert!(settings.run_speed > settings.walk_speed);
        assert!(settings.sample_step.get() < settings.tile_size.get());
        assert!(settings.warp_distance.get() > settings.leash_margin.get());
    }
}
