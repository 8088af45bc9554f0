//! Shuffled deck of selected themes; each round draws one
//!
//! Every selected theme is played once before any repeats.

use rand::seq::SliceRandom;
use rand_pcg::Pcg32;

use super::theme::ThemeKind;

#[derive(Debug, Clone, Default)]
pub struct ThemeDeck {
    selected: Vec<ThemeKind>,
    cards: Vec<ThemeKind>,
}

impl ThemeDeck {
    pub fn new(selected: Vec<ThemeKind>) -> Self {
        Self {
            selected,
            cards: Vec::new(),
        }
    }

    pub fn selected(&self) -> &[ThemeKind] {
        &self.selected
    }

    /// Cards left before the next reshuffle
    pub fn remaining(&self) -> usize {
        self.cards.len()
    }

    /// Put every selected theme back and shuffle
    pub fn refill(&mut self, rng: &mut Pcg32) {
        self.cards.clone_from(&self.selected);
        self.cards.shuffle(rng);
        log::debug!("Theme deck refilled with {} cards", self.cards.len());
    }

    /// Next theme, reshuffling when the deck runs out.
    /// `None` only when nothing is selected.
    pub fn draw(&mut self, rng: &mut Pcg32) -> Option<ThemeKind> {
        if self.cards.is_empty() {
            self.refill(rng);
        }
        self.cards.pop()
    }
}
