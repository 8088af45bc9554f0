//! Elf Party - a camera-driven Christmas party game
//!
//! Core modules:
//! - `sim`: Deterministic game logic (themes, collisions, round flow)
//! - `renderer`: Display lists and the 2D canvas painter
//! - `music`: Procedural Christmas melody scheduler
//! - `audio`: Web Audio playback (wasm only)
//! - `ui`: HUD text and screen selection
//! - `settings` / `leaderboard`: Persisted preferences and hall of fame

#[cfg(target_arch = "wasm32")]
pub mod audio;
pub mod error;
pub mod leaderboard;
pub mod music;
pub mod renderer;
pub mod settings;
pub mod sim;
pub mod ui;

pub use error::GameError;
pub use leaderboard::HallOfFame;
pub use settings::Settings;

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Length of one turn in seconds
    pub const ROUND_SECONDS: f32 = 60.0;
    /// Countdown before each turn
    pub const COUNTDOWN_SECONDS: f32 = 5.0;
    /// Rounds per game (every player plays once per round)
    pub const MAX_ROUNDS: u32 = 3;
    /// Lives a theme starts with unless it overrides them
    pub const DEFAULT_LIVES: u32 = 15;
    /// Difficulty grows by 1.0 every this many seconds of play
    pub const DIFFICULTY_RAMP_SECONDS: f32 = 30.0;
    /// Largest frame delta fed into the simulation (tab switches etc.)
    pub const MAX_FRAME_DT: f32 = 0.1;
    /// Supported player range
    pub const MIN_PLAYERS: u32 = 1;
    pub const MAX_PLAYERS: u32 = 8;

    /// Reference frame rate for per-frame tuning values
    pub const REFERENCE_FPS: f32 = 60.0;
}

/// Map a normalized camera point to canvas pixels.
///
/// The camera feed is shown mirrored, so x is flipped.
#[inline]
pub fn mirror_to_canvas(x: f32, y: f32, width: f32, height: f32) -> Vec2 {
    Vec2::new((1.0 - x) * width, y * height)
}

/// Difficulty multiplier after `elapsed` seconds of a turn
#[inline]
pub fn difficulty_for_elapsed(elapsed: f32) -> f32 {
    1.0 + elapsed.max(0.0) / consts::DIFFICULTY_RAMP_SECONDS
}

/// Convert a per-frame factor tuned at 60 Hz into one for an arbitrary dt
#[inline]
pub fn per_frame_factor(factor_at_60hz: f32, dt: f32) -> f32 {
    factor_at_60hz.powf(dt * consts::REFERENCE_FPS)
}

/// Convert a per-frame probability tuned at 60 Hz into one for an arbitrary dt
#[inline]
pub fn per_frame_chance(chance_at_60hz: f32, dt: f32) -> f32 {
    let chance = chance_at_60hz.clamp(0.0, 1.0);
    (1.0 - (1.0 - chance).powf(dt * consts::REFERENCE_FPS)).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mirror_to_canvas() {
        let p = mirror_to_canvas(0.25, 0.5, 800.0, 600.0);
        assert!((p.x - 600.0).abs() < 1e-4);
        assert!((p.y - 300.0).abs() < 1e-4);
    }

    #[test]
    fn test_difficulty_ramp() {
        assert_eq!(difficulty_for_elapsed(0.0), 1.0);
        assert!((difficulty_for_elapsed(30.0) - 2.0).abs() < 1e-6);
        assert!((difficulty_for_elapsed(60.0) - 3.0).abs() < 1e-6);
        assert_eq!(difficulty_for_elapsed(-5.0), 1.0);
    }

    #[test]
    fn test_per_frame_conversions_at_reference_rate() {
        let dt = 1.0 / consts::REFERENCE_FPS;
        assert!((per_frame_factor(0.95, dt) - 0.95).abs() < 1e-5);
        assert!((per_frame_chance(0.01, dt) - 0.01).abs() < 1e-5);
        assert_eq!(per_frame_chance(0.5, 0.0), 0.0);
        assert!(per_frame_chance(2.0, dt) <= 1.0);
    }
}
