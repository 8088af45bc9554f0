//! The six mini-game variants

pub mod christmas_pong;
pub mod christmas_tree;
pub mod dragon_grinch;
pub mod reindeer;
pub mod santa;
pub mod sleigh_formula1;

pub use christmas_pong::ChristmasPongTheme;
pub use christmas_tree::ChristmasTreeTheme;
pub use dragon_grinch::DragonGrinchTheme;
pub use reindeer::ReindeerTheme;
pub use santa::SantaTheme;
pub use sleigh_formula1::SleighFormula1Theme;

#[cfg(test)]
pub(crate) mod test_support {
    use crate::sim::landmarks::{FrameInput, HAND_POINTS, Landmark};

    pub const W: f32 = 1280.0;
    pub const H: f32 = 720.0;

    /// A 21-point hand with every point at the canvas pixel `(px, py)`
    pub fn hand_at(px: f32, py: f32) -> Vec<Landmark> {
        vec![Landmark::new(1.0 - px / W, py / H); HAND_POINTS]
    }

    pub fn one_hand(px: f32, py: f32) -> FrameInput {
        FrameInput {
            hands: vec![hand_at(px, py)],
            faces: vec![],
        }
    }
}
