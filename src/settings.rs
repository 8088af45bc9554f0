//! Party settings and preferences
//!
//! Persisted in LocalStorage; the start screen pre-fills from them.

use serde::{Deserialize, Serialize};

use crate::consts::{COUNTDOWN_SECONDS, MAX_PLAYERS, MAX_ROUNDS, MIN_PLAYERS, ROUND_SECONDS};
use crate::sim::{GameSetup, ThemeKind};

/// Party settings/preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // === Round flow ===
    /// Length of each turn
    pub round_seconds: f32,
    /// Countdown before each turn
    pub countdown_seconds: f32,
    /// Rounds per game
    pub max_rounds: u32,

    // === Start screen ===
    /// Player count offered by default
    pub player_count: u32,
    /// Themes ticked by default
    pub themes: Vec<ThemeKind>,

    // === Audio ===
    /// Music volume (0.0 - 1.0)
    pub music_volume: f32,
    /// Start muted
    pub muted: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            round_seconds: ROUND_SECONDS,
            countdown_seconds: COUNTDOWN_SECONDS,
            max_rounds: MAX_ROUNDS,

            player_count: 2,
            themes: ThemeKind::ALL.to_vec(),

            music_volume: 1.0,
            muted: false,
        }
    }
}

impl Settings {
    /// Setup for a new game from these defaults
    pub fn to_setup(&self) -> GameSetup {
        GameSetup {
            player_count: self.player_count.clamp(MIN_PLAYERS, MAX_PLAYERS),
            themes: self.themes.clone(),
        }
    }

    /// Remember what the start screen last used
    pub fn remember_setup(&mut self, setup: &GameSetup) {
        self.player_count = setup.player_count;
        self.themes.clone_from(&setup.themes);
    }

    /// LocalStorage key
    #[allow(dead_code)]
    const STORAGE_KEY: &'static str = "elf_party_settings";

    /// Load settings from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                match serde_json::from_str(&json) {
                    Ok(settings) => {
                        log::info!("Loaded settings from LocalStorage");
                        return settings;
                    }
                    Err(e) => log::warn!("Ignoring stored settings: {}", e),
                }
            }
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

        if let Some(storage) = storage {
            if let Ok(json) = serde_json::to_string(self) {
                let _ = storage.set_item(Self::STORAGE_KEY, &json);
                log::info!("Settings saved");
            }
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

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.round_seconds, 60.0);
        assert_eq!(settings.countdown_seconds, 5.0);
        assert_eq!(settings.max_rounds, 3);
        assert_eq!(settings.themes.len(), 6);
    }

    #[test]
    fn test_to_setup_clamps_players() {
        let mut settings = Settings::default();
        settings.player_count = 40;
        assert_eq!(settings.to_setup().player_count, MAX_PLAYERS);
        settings.player_count = 0;
        assert_eq!(settings.to_setup().player_count, MIN_PLAYERS);
    }

    #[test]
    fn test_remember_setup() {
        let mut settings = Settings::default();
        settings.remember_setup(&GameSetup {
            player_count: 4,
            themes: vec![ThemeKind::Reindeer],
        });
        assert_eq!(settings.player_count, 4);
        assert_eq!(settings.themes, vec![ThemeKind::Reindeer]);
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let settings: Settings = serde_json::from_str(r#"{"max_rounds":5,"muted":true}"#).unwrap();
        assert_eq!(settings.max_rounds, 5);
        assert_eq!(settings.round_seconds, 60.0);
        assert!(settings.muted);
        assert_eq!(settings.music_volume, 1.0);
    }
}
