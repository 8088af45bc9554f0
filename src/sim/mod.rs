//! Deterministic game logic
//!
//! Everything here is platform free:
//! - Frame delta passed in explicitly
//! - Seeded RNG only
//! - Landmarks arrive as plain data in [`FrameInput`]
//! - Drawing goes into a [`crate::renderer::DisplayList`]

pub mod collision;
pub mod deck;
pub mod identity;
pub mod landmarks;
pub mod session;
pub mod theme;
pub mod themes;

pub use collision::{Rect, circle_overlaps_rect, point_in_circle, point_in_rect};
pub use deck::ThemeDeck;
pub use identity::{ELF_AVATAR, Player, generate_elf};
pub use landmarks::{Face, FrameInput, Hand, Landmark};
pub use session::{GameEvent, GameSetup, RoundPhase, Session, TurnEndReason, TurnSummary};
pub use theme::{Theme, ThemeKind, ThemeStats};
