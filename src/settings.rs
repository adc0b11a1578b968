//! Collision tuning
//!
//! Persisted as JSON, either standalone or embedded in a level file.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::consts::{DEFAULT_ALPHA_THRESHOLD, DEFAULT_CELL_SIZE};
use crate::error::{CollisionError, Result};

/// Collision settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CollisionSettings {
    /// Alpha strictly above this marks a pixel solid
    pub alpha_threshold: u8,
    /// Broad-phase grid cell edge in world pixels (usually the tile size)
    pub cell_size: u32,
}

impl Default for CollisionSettings {
    fn default() -> Self {
        Self {
            alpha_threshold: DEFAULT_ALPHA_THRESHOLD,
            cell_size: DEFAULT_CELL_SIZE,
        }
    }
}

impl CollisionSettings {
    /// Reject values the core can't work with
    pub fn validate(&self) -> Result<()> {
        if self.cell_size == 0 {
            return Err(CollisionError::InvalidCellSize(self.cell_size));
        }
        Ok(())
    }

    /// Parse and validate settings from a JSON file
    pub fn try_load(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        let settings: Self = serde_json::from_str(&json)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load settings from a JSON file, falling back to defaults
    pub fn load(path: impl AsRef<Path>) -> Self {
        match Self::try_load(path.as_ref()) {
            Ok(settings) => {
                log::info!("Loaded collision settings from {:?}", path.as_ref());
                settings
            }
            Err(e) => {
                log::warn!("Using default collision settings ({})", e);
                Self::default()
            }
        }
    }

    /// Save settings as pretty JSON
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path.as_ref(), json)?;
        log::info!("Collision settings saved to {:?}", path.as_ref());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_uses_defaults() {
        let settings: CollisionSettings = serde_json::from_str(r#"{ "cell_size": 16 }"#).unwrap();
        assert_eq!(settings.cell_size, 16);
        assert_eq!(settings.alpha_threshold, DEFAULT_ALPHA_THRESHOLD);
    }

    #[test]
    fn test_validate_zero_cell() {
        let settings = CollisionSettings {
            cell_size: 0,
            ..Default::default()
        };
        assert!(matches!(
            settings.validate(),
            Err(CollisionError::InvalidCellSize(0))
        ));
    }

    #[test]
    fn test_load_missing_file_falls_back() {
        let settings = CollisionSettings::load("/nonexistent/mask-collide/settings.json");
        assert_eq!(settings, CollisionSettings::default());
    }

    #[test]
    fn test_save_then_load() {
        let path = std::env::temp_dir()
            .join(format!("mask-collide-settings-{}.json", std::process::id()));
        let settings = CollisionSettings {
            alpha_threshold: 10,
            cell_size: 48,
        };
        settings.save(&path).unwrap();
        assert_eq!(CollisionSettings::try_load(&path).unwrap(), settings);
        let _ = std::fs::remove_file(&path);
    }
}
