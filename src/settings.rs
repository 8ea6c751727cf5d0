//! Player preferences
//!
//! Persisted separately from the score cache in LocalStorage.

use serde::{Deserialize, Serialize};

/// Game settings/preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Draw field items as "?" blocks that hide which power-up they are
    pub mystery_blocks: bool,
    /// Particle bursts on pickups, expiries and bounces
    pub particles: bool,
    /// Pause automatically when the tab is hidden or loses focus
    pub pause_on_blur: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            mystery_blocks: false,
            particles: true,
            pause_on_blur: true,
        }
    }
}

impl Settings {
    /// Flip the mystery-block preference and persist it
    pub fn toggle_mystery_blocks(&mut self) -> bool {
        self.mystery_blocks = !self.mystery_blocks;
        self.save();
        self.mystery_blocks
    }

    pub fn toggle_particles(&mut self) -> bool {
        self.particles = !self.particles;
        self.save();
        self.particles
    }

    /// Label shown for a field item under the current preference
    pub fn item_label(&self, kind: crate::sim::PowerUpKind) -> &'static str {
        if self.mystery_blocks { "?" } else { kind.label() }
    }

    /// LocalStorage key
    #[allow(dead_code)]
    const STORAGE_KEY: &'static str = "fish_frenzy_settings";

    /// Load settings from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage
            && let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY)
            && let Ok(settings) = serde_json::from_str(&json)
        {
            log::info!("Loaded settings from LocalStorage");
            return settings;
        }

        log::info!("Using default settings");
        Self::default()
    }

    /// Save settings to LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn save(&self) {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage
            && let Ok(json) = serde_json::to_string(self)
        {
            let _ = storage.set_item(Self::STORAGE_KEY, &json);
            log::info!("Settings saved");
        }
    }

    /// Native stubs
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        Self::default()
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn save(&self) {
        // No-op for native
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::PowerUpKind;

    #[test]
    fn test_partial_json_fills_defaults() {
        let settings: Settings = serde_json::from_str(r#"{"mystery_blocks":true}"#)
            .unwrap_or_default();
        assert!(settings.mystery_blocks);
        assert!(settings.particles);
    }

    #[test]
    fn test_mystery_blocks_hide_labels() {
        let mut settings = Settings::default();
        assert_eq!(settings.item_label(PowerUpKind::Ice), "ICE");
        assert!(settings.toggle_mystery_blocks());
        assert_eq!(settings.item_label(PowerUpKind::Ice), "?");
    }
}
