pub mod range_types;

use crate::game_logic::errors::{NavError, NavResult};
use crate::resources::NavigationSettings;
use bevy::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};

pub fn get_config_path() -> Option<PathBuf> {
    dirs::config_dir().and_then(|mut path| {
        path.push("fieldnav");
        fs::create_dir_all(&path).ok()?;
        path.push("config.toml");
        Some(path)
    })
}

/// Read settings from an explicit TOML file
pub fn load_settings_from(path: &Path) -> NavResult<NavigationSettings> {
    if !path.exists() {
        return Err(NavError::ConfigFileNotFound {
            path: path.to_path_buf(),
        });
    }
    let contents = fs::read_to_string(path)?;
    Ok(toml::from_str::<NavigationSettings>(&contents)?)
}

/// Load settings from the user config directory, falling back to defaults
pub fn load_settings() -> NavigationSettings {
    let Some(config_path) = get_config_path() else {
        return NavigationSettings::default();
    };
    match load_settings_from(&config_path) {
        Ok(settings) => settings,
        Err(NavError::ConfigFileNotFound { .. }) => NavigationSettings::default(),
        Err(err) => {
            warn!("Ignoring unreadable navigation config: {err}");
            NavigationSettings::default()
        }
    }
}

pub fn save_settings_to(path: &Path, settings: &NavigationSettings) -> NavResult<()> {
    let contents = toml::to_string_pretty(settings)?;
    fs::write(path, contents)?;
    Ok(())
}
