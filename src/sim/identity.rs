//! Elf identities handed out to players at the start of a game

use rand::Rng;
use rand::seq::IndexedRandom;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

const FIRST_NAMES: [&str; 10] = [
    "Jingle",
    "Sparkle",
    "Twinkle",
    "Buddy",
    "Snowball",
    "Peppermint",
    "Chestnut",
    "Holly",
    "Ivy",
    "Merry",
];

const LAST_NAMES: [&str; 8] = [
    "McPlum",
    "Snowfoot",
    "Candyane",
    "Sugarplum",
    "Winterbottom",
    "Sleighrider",
    "Evergreen",
    "Icicle",
];

/// Elf avatar shown everywhere a player appears; tinted by `color_hue`
pub const ELF_AVATAR: &str = "🧝";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub id: usize,
    pub name: String,
    /// Hue rotation in degrees, `0..360`
    pub color_hue: u32,
    pub total_score: u32,
}

impl Player {
    /// CSS filter that tints the avatar
    pub fn avatar_filter(&self) -> String {
        format!("hue-rotate({}deg)", self.color_hue)
    }
}

/// Random "First Last" elf with a random tint
pub fn generate_elf(id: usize, rng: &mut Pcg32) -> Player {
    let first = FIRST_NAMES.choose(rng).copied().unwrap_or(FIRST_NAMES[0]);
    let last = LAST_NAMES.choose(rng).copied().unwrap_or(LAST_NAMES[0]);
    Player {
        id,
        name: format!("{first} {last}"),
        color_hue: rng.random_range(0..360),
        total_score: 0,
    }
}
