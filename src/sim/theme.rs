//! The mini-game interface shared by every theme variant

use rand::Rng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::landmarks::FrameInput;
use super::themes::{
    ChristmasPongTheme, ChristmasTreeTheme, DragonGrinchTheme, ReindeerTheme, SantaTheme,
    SleighFormula1Theme,
};
use crate::consts::DEFAULT_LIVES;
use crate::error::GameError;
use crate::renderer::DisplayList;

/// Which mini-game a turn plays
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ThemeKind {
    ChristmasTree,
    Santa,
    Reindeer,
    SleighFormula1,
    ChristmasPong,
    DragonGrinch,
}

impl ThemeKind {
    pub const ALL: [ThemeKind; 6] = [
        ThemeKind::ChristmasTree,
        ThemeKind::Santa,
        ThemeKind::Reindeer,
        ThemeKind::SleighFormula1,
        ThemeKind::ChristmasPong,
        ThemeKind::DragonGrinch,
    ];

    /// Selection value used by the start screen checkboxes
    pub fn index(&self) -> u32 {
        match self {
            ThemeKind::ChristmasTree => 0,
            ThemeKind::Santa => 1,
            ThemeKind::Reindeer => 2,
            ThemeKind::SleighFormula1 => 3,
            ThemeKind::ChristmasPong => 4,
            ThemeKind::DragonGrinch => 5,
        }
    }

    pub fn from_index(index: u32) -> Result<Self, GameError> {
        Self::ALL
            .get(index as usize)
            .copied()
            .ok_or(GameError::UnknownTheme(index))
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            ThemeKind::ChristmasTree => "Christmas Tree",
            ThemeKind::Santa => "Santa Claus",
            ThemeKind::Reindeer => "Reindeer",
            ThemeKind::SleighFormula1 => "Sleigh Formula 1",
            ThemeKind::ChristmasPong => "Christmas Pong",
            ThemeKind::DragonGrinch => "Dragon Grinch",
        }
    }

    /// Lives a fresh instance starts with
    pub fn starting_lives(&self) -> u32 {
        match self {
            // Fast-paced, so fewer lives
            ThemeKind::ChristmasPong => 5,
            _ => DEFAULT_LIVES,
        }
    }

    /// Build a fresh instance for a canvas of the given size
    pub fn create(&self, width: f32, height: f32, rng: &mut Pcg32) -> Box<dyn Theme> {
        match self {
            ThemeKind::ChristmasTree => Box::new(ChristmasTreeTheme::new(width, height)),
            ThemeKind::Santa => Box::new(SantaTheme::new(width, height)),
            ThemeKind::Reindeer => Box::new(ReindeerTheme::new(width, height)),
            ThemeKind::SleighFormula1 => Box::new(SleighFormula1Theme::new(width, height, rng)),
            ThemeKind::ChristmasPong => Box::new(ChristmasPongTheme::new(width, height, rng)),
            ThemeKind::DragonGrinch => Box::new(DragonGrinchTheme::new(width, height, rng)),
        }
    }
}

/// Score and lives for one turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThemeStats {
    pub score: u32,
    pub lives: u32,
}

impl ThemeStats {
    pub fn new(lives: u32) -> Self {
        Self { score: 0, lives }
    }

    #[inline]
    pub fn add_score(&mut self, points: u32) {
        self.score = self.score.saturating_add(points);
    }

    #[inline]
    pub fn lose_life(&mut self) {
        self.lives = self.lives.saturating_sub(1);
    }

    #[inline]
    pub fn is_out(&self) -> bool {
        self.lives == 0
    }
}

/// One mini-game variant
pub trait Theme {
    fn kind(&self) -> ThemeKind;

    /// Advance by `dt` seconds. `difficulty` starts at 1.0 and ramps up
    /// over the turn; themes scale speeds and spawn rates by it.
    fn update(&mut self, dt: f32, input: &FrameInput, difficulty: f32, rng: &mut Pcg32);

    fn draw(&self, out: &mut DisplayList);

    fn stats(&self) -> ThemeStats;
}

/// Pick a coordinate in `[lo, hi)` at least `min_gap` away from `last`,
/// giving up after `attempts` tries and taking a plain random value
pub fn spread_spawn(
    rng: &mut Pcg32,
    lo: f32,
    hi: f32,
    last: f32,
    min_gap: f32,
    attempts: u32,
) -> f32 {
    for _ in 0..attempts {
        let candidate = random_between(rng, lo, hi);
        if (candidate - last).abs() > min_gap {
            return candidate;
        }
    }
    random_between(rng, lo, hi)
}

/// Speed multiplier from a difficulty value (non-positive falls back to 1)
#[inline]
pub fn speed_mult(difficulty: f32) -> f32 {
    if difficulty.is_finite() && difficulty > 0.0 { difficulty } else { 1.0 }
}

/// Uniform value in `[lo, hi)`, or `lo` when the range is empty
/// (canvas smaller than the sprite)
#[inline]
pub fn random_between(rng: &mut Pcg32, lo: f32, hi: f32) -> f32 {
    if hi > lo { rng.random_range(lo..hi) } else { lo }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn test_index_round_trip() {
        for kind in ThemeKind::ALL {
            assert_eq!(ThemeKind::from_index(kind.index()).unwrap(), kind);
        }
        assert_eq!(ThemeKind::from_index(6), Err(GameError::UnknownTheme(6)));
    }

    #[test]
    fn test_create_matches_kind_and_lives() {
        let mut rng = Pcg32::seed_from_u64(1);
        for kind in ThemeKind::ALL {
            let theme = kind.create(1280.0, 720.0, &mut rng);
            assert_eq!(theme.kind(), kind);
            assert_eq!(theme.stats().score, 0);
            assert_eq!(theme.stats().lives, kind.starting_lives());
        }
        assert_eq!(ThemeKind::ChristmasPong.starting_lives(), 5);
    }

    #[test]
    fn test_stats_saturate() {
        let mut stats = ThemeStats::new(1);
        stats.lose_life();
        stats.lose_life();
        assert_eq!(stats.lives, 0);
        assert!(stats.is_out());
        stats.add_score(u32::MAX);
        stats.add_score(5);
        assert_eq!(stats.score, u32::MAX);
    }

    #[test]
    fn test_spread_spawn_respects_gap_when_possible() {
        let mut rng = Pcg32::seed_from_u64(7);
        for _ in 0..50 {
            let x = spread_spawn(&mut rng, 25.0, 1255.0, 640.0, 0.4 * 1280.0, 10);
            assert!((25.0..1255.0).contains(&x));
        }
        // Degenerate range never panics
        let x = spread_spawn(&mut rng, 10.0, 10.0, 10.0, 5.0, 3);
        assert_eq!(x, 10.0);
    }
}
